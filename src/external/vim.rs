#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Help lookup backed by the `vim` binary.
//!
//! Vim runs in silent Ex mode with no user configuration. The subject and
//! extra runtime paths travel through environment variables. `:help` still
//! ends its argument at a `|` followed by anything but another `|`, or at a
//! line break, so such subjects are refused before Vim starts.

use super::process::{run_command, DEFAULT_COMMAND_TIMEOUT};
use crate::ports::{HelpSearch, PortFuture, RuntimePathProvider};
use crate::{Result, VimHelpError};
use itertools::Itertools;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const SUBJECT_VAR: &str = "VIMHELP_SUBJECT";
const RUNTIMEPATH_VAR: &str = "VIMHELP_RUNTIMEPATH";

/// Lines shown when no later tag bounds the section.
pub const MAX_SECTION_LINES: usize = 20;

pub struct VimHelp {
    vim_path: String,
    helplang: Vec<String>,
    runtime_paths: Option<Arc<dyn RuntimePathProvider>>,
    timeout: Duration,
}

impl VimHelp {
    #[must_use]
    pub fn new(vim_path: impl Into<String>) -> Self {
        Self {
            vim_path: vim_path.into(),
            helplang: Vec::new(),
            runtime_paths: None,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_helplang(mut self, helplang: Vec<String>) -> Self {
        self.helplang = helplang;
        self
    }

    #[must_use]
    pub fn with_runtime_paths(mut self, provider: Arc<dyn RuntimePathProvider>) -> Self {
        self.runtime_paths = Some(provider);
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn vim_path(&self) -> &str {
        &self.vim_path
    }

    #[must_use]
    pub fn helplang(&self) -> &[String] {
        &self.helplang
    }

    /// Value appended to 'runtimepath', commas inside paths escaped.
    #[must_use]
    pub fn extra_runtimepath(&self) -> Option<String> {
        let paths: Vec<PathBuf> = self
            .runtime_paths
            .as_ref()
            .map(|provider| provider.runtime_paths())
            .unwrap_or_default();
        if paths.is_empty() {
            return None;
        }
        Some(
            paths
                .iter()
                .map(|path| path.to_string_lossy().replace('\\', "\\\\").replace(',', "\\,"))
                .join(","),
        )
    }

    /// Arguments passed to Vim for one lookup.
    #[must_use]
    pub fn command_args(&self, with_runtimepath: bool) -> Vec<String> {
        let mut args = ["-u", "NONE", "-i", "NONE", "-N", "-n", "-e", "-s"]
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        let mut commands = Vec::new();

        if with_runtimepath {
            commands.push(format!("let &runtimepath .= ',' . ${RUNTIMEPATH_VAR}"));
        }
        if !self.helplang.is_empty() {
            commands.push(format!("set helplang={}", self.helplang.join(",")));
        }
        commands.push(format!(
            "try | execute 'help' ${SUBJECT_VAR} | catch | call setline(1, substitute(v:exception, '^Vim(help):', '', '')) | 1print | cquit! | endtry"
        ));
        commands.push(format!(
            r"let g:s = line('.') | call cursor(g:s + 1, 1) | let g:n = search('\*\S\+\*\s*$', 'cnW') | let g:e = g:n > 0 ? g:n - 1 : g:s + {MAX_SECTION_LINES}"
        ));
        commands.push(
            r"let g:e = min([g:e, line('$')]) | while g:e > g:s && getline(g:e) =~# '^\s*$' | let g:e -= 1 | endwhile"
                .to_string(),
        );
        commands.push("execute g:s . ',' . g:e . 'print'".to_string());
        commands.push("qall!".to_string());

        for command in commands {
            args.push("-c".to_string());
            args.push(command);
        }
        args
    }

    async fn lookup(&self, subject: &str) -> Result<String> {
        if subject.trim().is_empty() {
            return Err(VimHelpError::message("Help subject must not be empty"));
        }
        if splits_help_command(subject) {
            return Err(VimHelpError::message(format!("Invalid help subject: {subject}")));
        }

        let runtimepath = self.extra_runtimepath();
        let args = self.command_args(runtimepath.is_some());
        let mut envs = vec![(SUBJECT_VAR, subject)];
        if let Some(rtp) = runtimepath.as_deref() {
            envs.push((RUNTIMEPATH_VAR, rtp));
        }

        debug!("searching help for {}", subject);
        let output = run_command(&self.vim_path, &args, &envs, self.timeout)
            .await?
            .into_success()?;

        let text = output.stdout.trim_end();
        if text.trim().is_empty() {
            return Err(VimHelpError::exec(
                output.status.code(),
                output.stdout.clone(),
                format!("E149: Sorry, no help for {subject}"),
            ));
        }
        Ok(text.to_string())
    }
}

/// True when `:help` would treat part of `subject` as a following command.
#[must_use]
pub fn splits_help_command(subject: &str) -> bool {
    let mut chars = subject.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_control() {
            return true;
        }
        if c == '|' && chars.peek().is_some_and(|next| *next != '|') {
            return true;
        }
    }
    false
}

impl HelpSearch for VimHelp {
    fn search<'a>(&'a self, query: &'a str) -> PortFuture<'a, String> {
        Box::pin(self.lookup(query))
    }
}
