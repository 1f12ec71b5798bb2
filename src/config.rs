#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use crate::{Result, VimHelpError};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_VIM: &str = "HUBOT_VIMHELP_VIM";
pub const ENV_PLUGINS_DIR: &str = "HUBOT_VIMHELP_PLUGINS_DIR";
pub const ENV_HELPLANG: &str = "HUBOT_VIMHELP_HELPLANG";
pub const ENV_MARKDOWN: &str = "HUBOT_VIMHELP_MARKDOWN";
pub const ENV_MULTILINE: &str = "HUBOT_VIMHELP_MULTILINE";
pub const ENV_CONCURRENCY: &str = "HUBOT_VIMHELP_CONCURRENCY";
pub const ENV_ACTION_TIMEOUT_MS: &str = "HUBOT_VIMHELP_ACTION_TIMEOUT_MS";
pub const ENV_BOT_NAME: &str = "HUBOT_NAME";

pub const DEFAULT_VIM: &str = "vim";
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 300_000;
pub const DEFAULT_BOT_NAME: &str = "hubot";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub vim_path: String,
    /// `None` turns the plugin manager off.
    pub plugins_dir: Option<PathBuf>,
    pub helplang: Vec<String>,
    pub markdown: bool,
    pub multiline: bool,
    pub concurrency: usize,
    pub action_timeout: Option<Duration>,
    pub bot_name: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            vim_path: DEFAULT_VIM.to_string(),
            plugins_dir: None,
            helplang: Vec::new(),
            markdown: true,
            multiline: false,
            concurrency: DEFAULT_CONCURRENCY,
            action_timeout: Some(Duration::from_millis(DEFAULT_ACTION_TIMEOUT_MS)),
            bot_name: DEFAULT_BOT_NAME.to_string(),
        }
    }
}

impl BotConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `VimHelpError::ConfigError` when a numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `VimHelpError::ConfigError` when a numeric variable does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let concurrency = non_empty(ENV_CONCURRENCY)
            .map(|raw| parse_number::<usize>(ENV_CONCURRENCY, &raw))
            .transpose()?
            .map_or(defaults.concurrency, |value| value.max(1));

        let action_timeout = match non_empty(ENV_ACTION_TIMEOUT_MS)
            .map(|raw| parse_number::<u64>(ENV_ACTION_TIMEOUT_MS, &raw))
            .transpose()?
        {
            None => defaults.action_timeout,
            Some(0) => None,
            Some(ms) => Some(Duration::from_millis(ms)),
        };

        Ok(Self {
            vim_path: non_empty(ENV_VIM).unwrap_or(defaults.vim_path),
            plugins_dir: non_empty(ENV_PLUGINS_DIR).map(PathBuf::from),
            helplang: non_empty(ENV_HELPLANG)
                .map(|raw| parse_helplang(&raw))
                .unwrap_or_default(),
            // Only an explicit "0" turns markdown off.
            markdown: lookup(ENV_MARKDOWN).is_none_or(|value| value != "0"),
            multiline: lookup(ENV_MULTILINE).is_some_and(|value| value == "1"),
            concurrency,
            action_timeout,
            bot_name: non_empty(ENV_BOT_NAME).unwrap_or(defaults.bot_name),
        })
    }

    #[must_use]
    pub const fn plugin_manager_enabled(&self) -> bool {
        self.plugins_dir.is_some()
    }
}

pub fn parse_helplang(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_number<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| VimHelpError::ConfigError(format!("{name} must be a number, got '{raw}': {e}")))
}
