#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use crate::Result;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

pub type PortFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateInfo {
    plugin_name: String,
    plugin_path: PathBuf,
    before_version: String,
    after_version: String,
}

impl UpdateInfo {
    #[must_use]
    pub fn new(
        plugin_name: impl Into<String>,
        plugin_path: impl Into<PathBuf>,
        before_version: impl Into<String>,
        after_version: impl Into<String>,
    ) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            plugin_path: plugin_path.into(),
            before_version: before_version.into(),
            after_version: after_version.into(),
        }
    }

    #[must_use]
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    #[must_use]
    pub fn plugin_path(&self) -> &Path {
        &self.plugin_path
    }

    #[must_use]
    pub fn before_version(&self) -> &str {
        &self.before_version
    }

    #[must_use]
    pub fn after_version(&self) -> &str {
        &self.after_version
    }

    #[must_use]
    pub fn updated(&self) -> bool {
        self.before_version != self.after_version
    }
}

/// Looks up Vim help text for a subject.
pub trait HelpSearch: Send + Sync {
    fn search<'a>(&'a self, query: &'a str) -> PortFuture<'a, String>;
}

/// Installs, removes and updates plugins by name.
pub trait PluginRepository: Send + Sync {
    /// Resolves to the installed version identifier.
    fn install<'a>(&'a self, name: &'a str) -> PortFuture<'a, String>;

    /// Resolves to the removed plugin directory.
    fn uninstall<'a>(&'a self, name: &'a str) -> PortFuture<'a, PathBuf>;

    fn update<'a>(&'a self, name: &'a str) -> PortFuture<'a, UpdateInfo>;

    /// Names of the installed plugins, in the repository's own order.
    fn plugin_names(&self) -> Vec<String>;
}

/// Directories to append to Vim's 'runtimepath' before searching help.
pub trait RuntimePathProvider: Send + Sync {
    fn runtime_paths(&self) -> Vec<PathBuf>;
}

/// Where chat responses go.
pub trait ResponseSink: Send + Sync {
    /// Posts to the room.
    fn send(&self, text: String);

    /// Answers the user who addressed the bot.
    fn reply(&self, text: String);
}
