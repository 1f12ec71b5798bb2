#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use crate::VimHelpError;

pub const SHORT_HASH_LEN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginVerb {
    Install,
    Uninstall,
    Update,
}

impl PluginVerb {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Install => "Installation",
            Self::Uninstall => "Uninstallation",
            Self::Update => "Update",
        }
    }
}

/// Renders outcomes as chat text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formatter {
    markdown: bool,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Formatter {
    #[must_use]
    pub const fn new(markdown: bool) -> Self {
        Self { markdown }
    }

    #[must_use]
    pub const fn markdown(&self) -> bool {
        self.markdown
    }

    /// Fences `text` in a code block when markdown is on.
    #[must_use]
    pub fn pre(&self, text: &str) -> String {
        if self.markdown {
            format!("```\n{text}\n```")
        } else {
            text.to_string()
        }
    }

    #[must_use]
    pub fn install_success(&self, name: &str, version: &str) -> String {
        format!("Installation success: {name} ({})", short_hash(version))
    }

    #[must_use]
    pub fn uninstall_success(&self, name: &str) -> String {
        format!("Uninstallation success: {name}")
    }

    #[must_use]
    pub fn update_success(&self, name: &str, before: &str, after: &str) -> String {
        format!(
            "Update success: {name} ({} => {})",
            short_hash(before),
            short_hash(after)
        )
    }

    #[must_use]
    pub fn failure(&self, verb: PluginVerb, name: &str, error: &VimHelpError) -> String {
        format!(
            "{} failure: {name}\n{}",
            verb.label(),
            self.pre(&error.user_text())
        )
    }

    #[must_use]
    pub fn help_success(&self, help_text: &str) -> String {
        self.pre(help_text)
    }

    /// Lookup errors are shown as they are, never fenced.
    #[must_use]
    pub fn help_failure(&self, error: &VimHelpError) -> String {
        error.user_text()
    }
}

#[must_use]
pub fn short_hash(hash: &str) -> &str {
    hash.char_indices()
        .nth(SHORT_HASH_LEN)
        .map_or(hash, |(end, _)| &hash[..end])
}
