#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Plugins cloned with `git` into one directory per plugin.
//!
//! `owner/repo` means a GitHub repository, `host.tld/path` an https
//! repository on another host, and a full URL is used as given. The
//! directory name is the name with `/` replaced by `__`.

use super::process::{run_command, CommandOutput, DEFAULT_COMMAND_TIMEOUT};
use crate::ports::{PluginRepository, PortFuture, RuntimePathProvider, UpdateInfo};
use crate::{Result, VimHelpError};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

const DIR_SEPARATOR: &str = "__";
const GITHUB: &str = "https://github.com";
const DOC_VAR: &str = "VIMHELP_DOC";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginSource {
    name: String,
    url: Url,
}

impl PluginSource {
    /// Resolves a user-supplied plugin name.
    ///
    /// # Errors
    ///
    /// Returns `VimHelpError::Message` for names that are not a repository.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || VimHelpError::message(format!("Invalid plugin name: {raw}"));

        if raw.contains("://") {
            let url = Url::parse(raw).map_err(|_| invalid())?;
            if !matches!(url.scheme(), "https" | "http" | "git" | "ssh") {
                return Err(invalid());
            }
            let host = url.host_str().ok_or_else(invalid)?;
            let path = url.path().trim_matches('/');
            let name = format!("{host}/{}", path.trim_end_matches(".git"));
            validate_segments(&name).ok_or_else(invalid)?;
            return Ok(Self { name, url });
        }

        let segments = validate_segments(raw).ok_or_else(invalid)?;
        let url = match segments.as_slice() {
            [_, _] => Url::parse(&format!("{GITHUB}/{raw}")),
            [host, _, ..] if host.contains('.') => Url::parse(&format!("https://{raw}")),
            _ => return Err(invalid()),
        }
        .map_err(|_| invalid())?;

        Ok(Self {
            name: raw.to_string(),
            url,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn dir_name(&self) -> String {
        self.name.replace('/', DIR_SEPARATOR)
    }
}

fn validate_segments(name: &str) -> Option<Vec<&str>> {
    let segments = name.split('/').collect::<Vec<_>>();
    let valid = segments.len() >= 2
        && segments.iter().all(|segment| {
            !segment.is_empty()
                && !segment.starts_with(['.', '-'])
                && !segment.contains(DIR_SEPARATOR)
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        });
    valid.then_some(segments)
}

pub struct PluginManager {
    plugins_dir: PathBuf,
    vim_path: String,
    timeout: Duration,
}

impl PluginManager {
    #[must_use]
    pub fn new(plugins_dir: impl Into<PathBuf>, vim_path: impl Into<String>) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
            vim_path: vim_path.into(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    /// Directory a plugin lives in, whether or not it is installed.
    ///
    /// # Errors
    ///
    /// Returns `VimHelpError::Message` for names that are not a repository.
    pub fn plugin_path(&self, name: &str) -> Result<PathBuf> {
        Ok(self.plugins_dir.join(PluginSource::parse(name)?.dir_name()))
    }

    fn installed_dirs(&self) -> Vec<(String, PathBuf)> {
        let Ok(entries) = std::fs::read_dir(&self.plugins_dir) else {
            return Vec::new();
        };
        let mut dirs = entries
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_dir()))
            .filter_map(|entry| {
                let dir_name = entry.file_name().to_string_lossy().into_owned();
                (!dir_name.starts_with('.'))
                    .then(|| (dir_name.replace(DIR_SEPARATOR, "/"), entry.path()))
            })
            .collect::<Vec<_>>();
        dirs.sort_by(|a, b| a.0.cmp(&b.0));
        dirs
    }

    async fn git(&self, dir: Option<&Path>, args: &[&str]) -> Result<CommandOutput> {
        let mut full_args: Vec<&OsStr> = Vec::new();
        if let Some(dir) = dir {
            full_args.push(OsStr::new("-C"));
            full_args.push(dir.as_os_str());
        }
        full_args.extend(args.iter().map(OsStr::new));
        run_command("git", full_args, &[("GIT_TERMINAL_PROMPT", "0")], self.timeout)
            .await?
            .into_success()
    }

    async fn head(&self, dir: &Path) -> Result<String> {
        let output = self.git(Some(dir), &["rev-parse", "HEAD"]).await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Regenerates help tags. Failures are logged, not returned.
    async fn helptags(&self, dir: &Path) {
        let doc = dir.join("doc");
        if !tokio::fs::metadata(&doc).await.is_ok_and(|meta| meta.is_dir()) {
            return;
        }
        let doc_str = doc.to_string_lossy();
        let result = run_command(
            &self.vim_path,
            [
                "-u",
                "NONE",
                "-i",
                "NONE",
                "-N",
                "-n",
                "-e",
                "-s",
                "-c",
                "execute 'helptags' fnameescape($VIMHELP_DOC)",
                "-c",
                "qall!",
            ],
            &[(DOC_VAR, doc_str.as_ref())],
            self.timeout,
        )
        .await
        .and_then(CommandOutput::into_success);
        if let Err(err) = result {
            warn!("helptags failed for {}: {}", doc.display(), err);
        }
    }

    async fn require_installed(&self, name: &str) -> Result<PathBuf> {
        let dir = self.plugin_path(name)?;
        if tokio::fs::try_exists(&dir).await? {
            Ok(dir)
        } else {
            Err(VimHelpError::message(format!("Plugin is not installed: {name}")))
        }
    }

    async fn install_plugin(&self, name: &str) -> Result<String> {
        let source = PluginSource::parse(name)?;
        let dir = self.plugins_dir.join(source.dir_name());
        if tokio::fs::try_exists(&dir).await? {
            return Err(VimHelpError::message(format!(
                "Plugin is already installed: {name}"
            )));
        }
        tokio::fs::create_dir_all(&self.plugins_dir).await?;

        let dir_str = dir.to_string_lossy();
        self.git(
            None,
            &[
                "clone",
                "--quiet",
                "--depth",
                "1",
                "--",
                source.url().as_str(),
                dir_str.as_ref(),
            ],
        )
        .await?;
        self.helptags(&dir).await;

        let version = self.head(&dir).await?;
        info!("installed {} at {}", name, version);
        Ok(version)
    }

    async fn uninstall_plugin(&self, name: &str) -> Result<PathBuf> {
        let dir = self.require_installed(name).await?;
        tokio::fs::remove_dir_all(&dir).await?;
        info!("uninstalled {}", name);
        Ok(dir)
    }

    async fn update_plugin(&self, name: &str) -> Result<UpdateInfo> {
        let dir = self.require_installed(name).await?;
        let before = self.head(&dir).await?;
        self.git(Some(&dir), &["pull", "--quiet", "--ff-only"]).await?;
        let after = self.head(&dir).await?;

        let info = UpdateInfo::new(name, dir, before, after);
        if info.updated() {
            self.helptags(info.plugin_path()).await;
            info!(
                "updated {}: {} => {}",
                name,
                info.before_version(),
                info.after_version()
            );
        }
        Ok(info)
    }
}

impl PluginRepository for PluginManager {
    fn install<'a>(&'a self, name: &'a str) -> PortFuture<'a, String> {
        Box::pin(self.install_plugin(name))
    }

    fn uninstall<'a>(&'a self, name: &'a str) -> PortFuture<'a, PathBuf> {
        Box::pin(self.uninstall_plugin(name))
    }

    fn update<'a>(&'a self, name: &'a str) -> PortFuture<'a, UpdateInfo> {
        Box::pin(self.update_plugin(name))
    }

    fn plugin_names(&self) -> Vec<String> {
        self.installed_dirs()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }
}

impl RuntimePathProvider for PluginManager {
    fn runtime_paths(&self) -> Vec<PathBuf> {
        self.installed_dirs()
            .into_iter()
            .map(|(_, path)| path)
            .collect()
    }
}
