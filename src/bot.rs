#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Chat-facing entry point.
//!
//! Three listeners look at every message:
//! - `:help {subject}` at the start of the message (or of any line in
//!   multiline mode), answered with `send`;
//! - `:help {subject}` addressed to the bot, answered with `reply`;
//! - `/vimhelp ...`, routed through [`CommandRouter`].

use crate::batch::BatchRunner;
use crate::config::BotConfig;
use crate::external::{PluginManager, VimHelp};
use crate::format::Formatter;
use crate::ports::{HelpSearch, PluginRepository, ResponseSink};
use crate::router::{CommandContext, CommandRouter, Resolution};
use crate::{Result, VimHelpError};
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const PLUGIN_MANAGER_UNAVAILABLE: &str = "ERROR: Sorry, PluginManager is unavailable.";

const HELP_PATTERN: &str = r":h(?:elp)?(?:\s+(\S*))";
const VIMHELP_PATTERN: &str = r"^[!/:]vimhelp\s*([\s\S]*)$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub user: String,
    pub text: String,
}

impl IncomingMessage {
    #[must_use]
    pub fn new(user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            text: text.into(),
        }
    }
}

/// Which listener reacted to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listener {
    HearHelp { subject: String },
    RespondHelp { subject: String },
    Vimhelp { resolution: Option<Resolution> },
}

pub struct VimHelpBot {
    help: Arc<dyn HelpSearch>,
    plugins: Option<Arc<dyn PluginRepository>>,
    router: Arc<CommandRouter>,
    runner: BatchRunner,
    formatter: Formatter,
    hear_help: Regex,
    respond_help: Regex,
    vimhelp_command: Regex,
}

impl VimHelpBot {
    /// Builds the bot around the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns `VimHelpError::ConfigError` when a listener pattern cannot be compiled.
    pub fn new(
        config: &BotConfig,
        help: Arc<dyn HelpSearch>,
        plugins: Option<Arc<dyn PluginRepository>>,
    ) -> Result<Self> {
        let hear = if config.multiline {
            format!("(?m)^{HELP_PATTERN}")
        } else {
            format!("^{HELP_PATTERN}")
        };
        let respond = format!(
            r"^\s*@?(?i:{})[:,]?\s*(?:{HELP_PATTERN})",
            regex::escape(&config.bot_name)
        );

        Ok(Self {
            help,
            plugins,
            router: Arc::new(CommandRouter::vimhelp()),
            runner: BatchRunner::new(config.concurrency, config.action_timeout),
            formatter: Formatter::new(config.markdown),
            hear_help: compile(&hear)?,
            respond_help: compile(&respond)?,
            vimhelp_command: compile(VIMHELP_PATTERN)?,
        })
    }

    /// Wires `vim` and, when a plugin directory is configured, the git-backed
    /// plugin manager.
    ///
    /// # Errors
    ///
    /// Returns `VimHelpError::ConfigError` when a listener pattern cannot be compiled.
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        let manager = config.plugins_dir.as_ref().map(|dir| {
            info!("plugin manager enabled at {}", dir.display());
            Arc::new(PluginManager::new(dir, config.vim_path.clone()))
        });

        let mut vim = VimHelp::new(config.vim_path.clone()).with_helplang(config.helplang.clone());
        if let Some(manager) = &manager {
            vim = vim.with_runtime_paths(manager.clone());
        }

        let plugins = manager.map(|manager| manager as Arc<dyn PluginRepository>);
        Self::new(config, Arc::new(vim), plugins)
    }

    #[must_use]
    pub const fn plugin_manager_enabled(&self) -> bool {
        self.plugins.is_some()
    }

    /// Offers `message` to every listener and reports the ones that reacted.
    pub async fn handle(&self, message: &IncomingMessage, sink: &dyn ResponseSink) -> Vec<Listener> {
        let mut fired = Vec::new();

        if let Some(subject) = help_subject(&self.hear_help, &message.text) {
            debug!("{} asked for :help {}", message.user, subject);
            sink.send(self.help_text(&subject).await);
            fired.push(Listener::HearHelp { subject });
        }

        if let Some(subject) = help_subject(&self.respond_help, &message.text) {
            debug!("{} asked the bot for :help {}", message.user, subject);
            sink.reply(self.help_text(&subject).await);
            fired.push(Listener::RespondHelp { subject });
        }

        if let Some(argline) = self
            .vimhelp_command
            .captures(&message.text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
        {
            let resolution = self.vimhelp(&argline, sink).await;
            fired.push(Listener::Vimhelp { resolution });
        }

        fired
    }

    /// Looks up `subject` and renders the answer; lookup errors become text.
    pub async fn help_text(&self, subject: &str) -> String {
        match self.help.search(subject).await {
            Ok(text) => self.formatter.help_success(&text),
            Err(err) => {
                warn!("help lookup for {} failed: {}", subject, err);
                self.formatter.help_failure(&err)
            }
        }
    }

    /// Runs a `/vimhelp` command line. `None` means the plugin manager is off.
    pub async fn vimhelp(&self, argline: &str, sink: &dyn ResponseSink) -> Option<Resolution> {
        let Some(plugins) = self.plugins.as_deref() else {
            sink.send(PLUGIN_MANAGER_UNAVAILABLE.to_string());
            return None;
        };

        let ctx = CommandContext {
            sink,
            plugins,
            runner: &self.runner,
            formatter: &self.formatter,
        };
        Some(self.router.dispatch(argline, &ctx).await)
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| VimHelpError::ConfigError(format!("invalid listener pattern {pattern}: {e}")))
}

/// First capture of a help listener; an empty subject does not count.
fn help_subject(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|subject| !subject.is_empty())
        .map(ToString::to_string)
}
