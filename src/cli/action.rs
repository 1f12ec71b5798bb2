#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

pub const DEFAULT_USER: &str = "shell";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOptions {
    pub user: String,
    pub output: OutputFormat,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
            output: OutputFormat::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    ShowHelp,
    ShowVersion,
    RunShell(ShellOptions),
}
