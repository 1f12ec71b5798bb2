#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use crate::cli::OutputFormat;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::sync::{Mutex, PoisonError};
use vimhelp::ResponseSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Send,
    Reply,
}

/// One response in `--json` output.
#[derive(Debug, Serialize)]
struct ResponseRecord<'a> {
    user: &'a str,
    kind: ResponseKind,
    text: &'a str,
    t: DateTime<Utc>,
}

/// Writes the bot's responses to a stream, one response per record.
pub struct ShellSink<W> {
    user: String,
    output: OutputFormat,
    out: Mutex<W>,
}

impl<W: Write + Send> ShellSink<W> {
    pub fn new(user: impl Into<String>, output: OutputFormat, out: W) -> Self {
        Self {
            user: user.into(),
            output,
            out: Mutex::new(out),
        }
    }

    pub fn render(&self, kind: ResponseKind, text: &str) -> String {
        match self.output {
            OutputFormat::Text => match kind {
                ResponseKind::Send => text.to_string(),
                ResponseKind::Reply => format!("@{} {}", self.user, text),
            },
            OutputFormat::Json => {
                let record = ResponseRecord {
                    user: &self.user,
                    kind,
                    text,
                    t: Utc::now(),
                };
                serde_json::to_string(&record).unwrap_or_else(|err| {
                    tracing::warn!("failed to encode response: {}", err);
                    text.to_string()
                })
            }
        }
    }

    fn emit(&self, kind: ResponseKind, text: &str) {
        let record = self.render(kind, text);
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writeln!(out, "{record}").and_then(|()| out.flush()) {
            tracing::warn!("failed to write response: {}", err);
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> ResponseSink for ShellSink<W> {
    fn send(&self, text: String) {
        self.emit(ResponseKind::Send, &text);
    }

    fn reply(&self, text: String) {
        self.emit(ResponseKind::Reply, &text);
    }
}
