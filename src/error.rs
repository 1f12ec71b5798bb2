#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use thiserror::Error;

/// Error code constants for type-safe error handling
pub mod code {
    pub const CLI_ERROR: &str = "CLI_ERROR";
    pub const EXEC: &str = "EXEC";
    pub const INVALID: &str = "INVALID";
    pub const DEPENDENCY: &str = "DEPENDENCY";
    pub const TIMEOUT: &str = "TIMEOUT";
    pub const UNKNOWN: &str = "UNKNOWN";
    pub const INTERNAL: &str = "INTERNAL";
}

pub const UNKNOWN_ERROR_TEXT: &str = "[Unknown Error]";

#[derive(Error, Debug)]
pub enum VimHelpError {
    /// An external program ran and reported failure. `error_text` is what
    /// users get to see.
    #[error("{error_text}")]
    Exec {
        exit_code: Option<i32>,
        stdout: String,
        error_text: String,
    },

    #[error("{0}")]
    Message(String),

    #[error("{}", UNKNOWN_ERROR_TEXT)]
    Unknown,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VimHelpError {
    #[must_use]
    pub fn exec(exit_code: Option<i32>, stdout: impl Into<String>, error_text: impl Into<String>) -> Self {
        Self::Exec {
            exit_code,
            stdout: stdout.into(),
            error_text: error_text.into(),
        }
    }

    #[must_use]
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }

    /// Text shown to chat users for this error.
    ///
    /// `Exec` errors render the collaborator's own error text, everything
    /// else renders its message, and an error with nothing to say renders
    /// `[Unknown Error]`.
    #[must_use]
    pub fn user_text(&self) -> String {
        let text = match self {
            Self::Exec { error_text, .. } => error_text.clone(),
            Self::Unknown => return UNKNOWN_ERROR_TEXT.to_string(),
            other => other.to_string(),
        };
        if text.trim().is_empty() {
            UNKNOWN_ERROR_TEXT.to_string()
        } else {
            text
        }
    }

    /// Stable machine-readable code for this error
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Exec { .. } => code::EXEC,
            Self::Message(_) | Self::Internal(_) => code::INTERNAL,
            Self::Unknown => code::UNKNOWN,
            Self::ConfigError(_) => code::INVALID,
            Self::IoError(_) => code::DEPENDENCY,
            Self::Timeout { .. } => code::TIMEOUT,
        }
    }

    /// Returns the exit code for this error
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigError(_) => 2,
            Self::Exec { .. } => 3,
            Self::Message(_) => 4,
            Self::Timeout { .. } => 5,
            Self::IoError(_) => 7,
            Self::Unknown | Self::Internal(_) => 9,
        }
    }
}

/// Error codes with a description and a suggested fix
pub const ERROR_CODES: &[(&str, &str, &str)] = &[
    (
        code::CLI_ERROR,
        "Invalid CLI usage",
        "Run 'vimhelp-bot --help' for valid options",
    ),
    (
        code::EXEC,
        "External program reported failure",
        "Read the error text; check the subject or plugin name",
    ),
    (
        code::INVALID,
        "Invalid configuration",
        "Check HUBOT_VIMHELP_* environment variables",
    ),
    (
        code::DEPENDENCY,
        "Missing system dependency",
        "Install vim and git, or set HUBOT_VIMHELP_VIM",
    ),
    (
        code::TIMEOUT,
        "Operation timed out",
        "Raise HUBOT_VIMHELP_ACTION_TIMEOUT_MS and retry",
    ),
    (
        code::UNKNOWN,
        "Error without a description",
        "Inspect logs with RUST_LOG=debug",
    ),
    (
        code::INTERNAL,
        "Unexpected internal failure",
        "Inspect logs and retry command",
    ),
];

/// Get error code details (description and fix) for a given error code
#[must_use]
pub fn get_error_info(error_code: &str) -> Option<(&'static str, &'static str)> {
    ERROR_CODES
        .iter()
        .find(|(code, _, _)| *code == error_code)
        .map(|(_, desc, fix)| (*desc, *fix))
}

pub type Result<T> = std::result::Result<T, VimHelpError>;

#[cfg(test)]
mod tests {
    use super::{get_error_info, VimHelpError, UNKNOWN_ERROR_TEXT};

    #[test]
    fn exec_error_shows_its_error_text() {
        let err = VimHelpError::exec(Some(1), "", "E149: Sorry, no help for not-existing");
        assert_eq!(err.user_text(), "E149: Sorry, no help for not-existing");
    }

    #[test]
    fn generic_error_shows_its_message() {
        assert_eq!(VimHelpError::message("Other Error").user_text(), "Other Error");
        let io = VimHelpError::from(std::io::Error::other("disk gone"));
        assert_eq!(io.user_text(), "IO error: disk gone");
    }

    #[test]
    fn errors_without_description_fall_back_to_placeholder() {
        assert_eq!(VimHelpError::Unknown.user_text(), UNKNOWN_ERROR_TEXT);
        assert_eq!(VimHelpError::message("   ").user_text(), UNKNOWN_ERROR_TEXT);
        assert_eq!(VimHelpError::exec(None, "out", "").user_text(), UNKNOWN_ERROR_TEXT);
    }

    #[test]
    fn every_code_is_documented() {
        let errors = [
            VimHelpError::exec(None, "", "x"),
            VimHelpError::message("x"),
            VimHelpError::Unknown,
            VimHelpError::ConfigError("x".to_string()),
            VimHelpError::Timeout {
                operation: "install".to_string(),
                timeout_ms: 1,
            },
            VimHelpError::Internal("x".to_string()),
        ];
        for err in errors {
            assert!(get_error_info(err.code()).is_some(), "{}", err.code());
            assert_ne!(err.exit_code(), 0);
        }
    }
}
