#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use super::action::{CliAction, OutputFormat, ShellOptions};

pub const USAGE: &str = "\
Usage: vimhelp-bot [--user NAME] [--json]

Reads chat messages from stdin, one per line, and writes the bot's
responses to stdout. A literal \\n inside a line is a line break.

Options:
  --user NAME    name of the user sending the messages (default: shell)
  --json         print one JSON object per response
  -h, --help     show this help
  -v, --version  show the version

Environment:
  HUBOT_VIMHELP_VIM, HUBOT_VIMHELP_PLUGINS_DIR, HUBOT_VIMHELP_HELPLANG,
  HUBOT_VIMHELP_MARKDOWN, HUBOT_VIMHELP_MULTILINE,
  HUBOT_VIMHELP_CONCURRENCY, HUBOT_VIMHELP_ACTION_TIMEOUT_MS, HUBOT_NAME";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CliError {
    #[error("Missing value for {}", arg)]
    MissingRequiredArg { arg: String },
    #[error("Unknown argument: {}", arg)]
    UnknownArgument { arg: String },
    #[error("Invalid argument value for {}: {}", arg, error)]
    InvalidArgValue { arg: String, error: String },
}

/// Parses the arguments after the program name.
///
/// # Errors
///
/// Returns `CliError` for unknown flags and for `--user` without a usable value.
pub fn parse_cli_args(args: &[String]) -> Result<CliAction, CliError> {
    if args.iter().any(|arg| matches!(arg.as_str(), "-h" | "--help")) {
        return Ok(CliAction::ShowHelp);
    }
    if args.iter().any(|arg| matches!(arg.as_str(), "-v" | "--version")) {
        return Ok(CliAction::ShowVersion);
    }

    let mut options = ShellOptions::default();
    let mut rest = args.iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--json" => options.output = OutputFormat::Json,
            "--user" => options.user = parse_user(rest.next())?,
            other => {
                if let Some(value) = other.strip_prefix("--user=") {
                    options.user = parse_user(Some(&value.to_string()))?;
                } else {
                    return Err(CliError::UnknownArgument {
                        arg: other.to_string(),
                    });
                }
            }
        }
    }

    Ok(CliAction::RunShell(options))
}

fn parse_user(value: Option<&String>) -> Result<String, CliError> {
    let Some(raw) = value else {
        return Err(CliError::MissingRequiredArg {
            arg: "user".to_string(),
        });
    };
    if raw.starts_with("--") {
        return Err(CliError::MissingRequiredArg {
            arg: "user".to_string(),
        });
    }

    let user = raw.trim();
    if user.is_empty() || user.chars().any(char::is_whitespace) {
        return Err(CliError::InvalidArgValue {
            arg: "user".to_string(),
            error: format!("{raw:?} is not a single word"),
        });
    }
    Ok(user.to_string())
}
