#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! `/vimhelp` command routing.
//!
//! The command line is split on whitespace and walked through a static tree
//! of groups and handlers, one token per level. Anything that does not land
//! on a handler with acceptable arguments produces the usage text of the
//! deepest group reached.

mod handlers;
mod tree;

pub use tree::{Arity, Command, CommandGroup, CommandNode, Handler, UsageReason};

use crate::batch::BatchRunner;
use crate::format::Formatter;
use crate::ports::{PluginRepository, ResponseSink};
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a>>;

pub const COMMAND_PREFIX: &str = "/vimhelp";

/// Everything a handler may touch while it runs.
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    pub sink: &'a dyn ResponseSink,
    pub plugins: &'a dyn PluginRepository,
    pub runner: &'a BatchRunner,
    pub formatter: &'a Formatter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A handler ran; `command` is the canonical verb path, e.g. `plugin install`.
    Handled { command: String },
    /// Usage text for `scope` was sent instead.
    Usage {
        scope: String,
        reason: Option<UsageReason>,
    },
}

#[derive(Debug)]
pub struct CommandRouter {
    root: CommandGroup,
}

impl Default for CommandRouter {
    fn default() -> Self {
        Self::vimhelp()
    }
}

impl CommandRouter {
    #[must_use]
    pub const fn new(root: CommandGroup) -> Self {
        Self { root }
    }

    /// The `/vimhelp` command tree.
    #[must_use]
    pub fn vimhelp() -> Self {
        let plugin = CommandGroup::new("plugin", "Plugin Manager for :help", "Manage Vim plugins")
            .command(
                "install",
                "<plugin-names..>",
                "Install Vim plugins",
                Arity::Required,
                handlers::install,
            )
            .command(
                "uninstall",
                "<plugin-names..>",
                "Uninstall Vim plugins",
                Arity::Required,
                handlers::uninstall,
            )
            .command(
                "update",
                "[plugin-names..]",
                "Update Vim plugins",
                Arity::Optional,
                handlers::update,
            )
            .command("list", "", "List Vim plugins", Arity::None, handlers::list)
            .alias("add", "install")
            .alias("rm", "uninstall")
            .alias("remove", "uninstall")
            .alias("delete", "uninstall");

        Self::new(CommandGroup::new(COMMAND_PREFIX, "Utilities for :help", "").group(plugin))
    }

    #[must_use]
    pub const fn root(&self) -> &CommandGroup {
        &self.root
    }

    /// Resolves `line` and runs the matching handler, or sends usage text.
    pub async fn dispatch(&self, line: &str, ctx: &CommandContext<'_>) -> Resolution {
        let tokens = line
            .split_whitespace()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        debug!("dispatching {:?}", tokens);

        let mut group = &self.root;
        let mut path = vec![self.root.name];
        let mut rest = tokens.as_slice();

        loop {
            let Some((token, tail)) = rest.split_first() else {
                return send_usage(ctx, group, &path, Some(UsageReason::MissingCommand));
            };
            if is_help_token(token) {
                return send_usage(ctx, group, &path, None);
            }

            match group.resolve(token) {
                Some(CommandNode::Group(child)) => {
                    group = child;
                    path.push(child.name);
                    rest = tail;
                }
                Some(CommandNode::Handler(command)) => {
                    if tail.iter().any(|arg| is_help_flag(arg)) {
                        return send_usage(ctx, group, &path, None);
                    }
                    if let Some(reason) = command.arity.check(tail.len()) {
                        return send_usage(ctx, group, &path, Some(reason));
                    }
                    let canonical = path
                        .iter()
                        .skip(1)
                        .copied()
                        .chain(std::iter::once(command.name))
                        .collect::<Vec<_>>()
                        .join(" ");
                    debug!("running {}", canonical);
                    (command.handler)(tail, ctx).await;
                    return Resolution::Handled { command: canonical };
                }
                None => {
                    let reason = UsageReason::UnknownArgument {
                        token: token.clone(),
                        suggestions: group.suggest(token),
                    };
                    return send_usage(ctx, group, &path, Some(reason));
                }
            }
        }
    }
}

fn is_help_token(token: &str) -> bool {
    token == "help" || is_help_flag(token)
}

fn is_help_flag(token: &str) -> bool {
    matches!(token, "--help" | "-h")
}

fn send_usage(
    ctx: &CommandContext<'_>,
    group: &CommandGroup,
    path: &[&'static str],
    reason: Option<UsageReason>,
) -> Resolution {
    let scope = path.join(" ");
    let usage = group.usage_text(&scope);
    let text = match &reason {
        Some(reason) => format!("{usage}\n\n{reason}"),
        None => usage,
    };
    ctx.sink.send(text);
    Resolution::Usage { scope, reason }
}
