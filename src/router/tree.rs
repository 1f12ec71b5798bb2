#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use super::{CommandContext, HandlerFuture};
use itertools::Itertools;
use std::fmt;

pub type Handler = for<'a> fn(&'a [String], &'a CommandContext<'a>) -> HandlerFuture<'a>;

/// How many trailing arguments a command takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    Optional,
    Required,
}

impl Arity {
    #[must_use]
    pub const fn check(self, got: usize) -> Option<UsageReason> {
        match self {
            Self::None if got > 0 => Some(UsageReason::TooManyArguments { got, max: 0 }),
            Self::Required if got == 0 => Some(UsageReason::NotEnoughArguments { got, need: 1 }),
            _ => None,
        }
    }
}

/// Why dispatch fell back to usage text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageReason {
    MissingCommand,
    NotEnoughArguments { got: usize, need: usize },
    TooManyArguments { got: usize, max: usize },
    UnknownArgument {
        token: String,
        suggestions: Vec<String>,
    },
}

impl fmt::Display for UsageReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCommand => {
                write!(f, "Not enough non-option arguments: got 0, need at least 1")
            }
            Self::NotEnoughArguments { got, need } => write!(
                f,
                "Not enough non-option arguments: got {got}, need at least {need}"
            ),
            Self::TooManyArguments { got, max } => write!(
                f,
                "Too many non-option arguments: got {got}, maximum of {max}"
            ),
            Self::UnknownArgument { token, suggestions } => {
                write!(f, "Unknown argument: {token}")?;
                if suggestions.is_empty() {
                    Ok(())
                } else {
                    write!(f, "\nDid you mean {}?", suggestions.iter().join(", "))
                }
            }
        }
    }
}

pub struct Command {
    pub name: &'static str,
    pub args: &'static str,
    pub describe: &'static str,
    pub arity: Arity,
    pub handler: Handler,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct CommandGroup {
    pub name: &'static str,
    pub usage: &'static str,
    pub describe: &'static str,
    children: Vec<CommandNode>,
    aliases: Vec<(&'static str, &'static str)>,
}

#[derive(Debug)]
pub enum CommandNode {
    Handler(Command),
    Group(CommandGroup),
}

impl CommandNode {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Handler(command) => command.name,
            Self::Group(group) => group.name,
        }
    }

    const fn describe(&self) -> &'static str {
        match self {
            Self::Handler(command) => command.describe,
            Self::Group(group) => group.describe,
        }
    }

    const fn args(&self) -> &'static str {
        match self {
            Self::Handler(command) => command.args,
            Self::Group(_) => "",
        }
    }
}

impl CommandGroup {
    #[must_use]
    pub const fn new(name: &'static str, usage: &'static str, describe: &'static str) -> Self {
        Self {
            name,
            usage,
            describe,
            children: Vec::new(),
            aliases: Vec::new(),
        }
    }

    #[must_use]
    pub fn command(
        mut self,
        name: &'static str,
        args: &'static str,
        describe: &'static str,
        arity: Arity,
        handler: Handler,
    ) -> Self {
        self.children.push(CommandNode::Handler(Command {
            name,
            args,
            describe,
            arity,
            handler,
        }));
        self
    }

    #[must_use]
    pub fn group(mut self, group: Self) -> Self {
        self.children.push(CommandNode::Group(group));
        self
    }

    /// Makes `alias` resolve to the node registered as `canonical`.
    #[must_use]
    pub fn alias(mut self, alias: &'static str, canonical: &'static str) -> Self {
        self.aliases.push((alias, canonical));
        self
    }

    fn canonical<'t>(&self, token: &'t str) -> &'t str {
        self.aliases
            .iter()
            .find(|(alias, _)| *alias == token)
            .map_or(token, |(_, canonical)| *canonical)
    }

    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<&CommandNode> {
        let canonical = self.canonical(token);
        self.children.iter().find(|child| child.name() == canonical)
    }

    fn aliases_of(&self, canonical: &str) -> Vec<&'static str> {
        self.aliases
            .iter()
            .filter(|(_, target)| *target == canonical)
            .map(|(alias, _)| *alias)
            .collect()
    }

    /// Known spellings within edit distance 2 of `typo`, closest first.
    #[must_use]
    pub fn suggest(&self, typo: &str) -> Vec<String> {
        self.children
            .iter()
            .map(CommandNode::name)
            .chain(self.aliases.iter().map(|(alias, _)| *alias))
            .map(|name| (name, strsim::levenshtein(typo, name)))
            .filter(|(_, dist)| *dist <= 2)
            .sorted_by_key(|(name, dist)| (*dist, *name))
            .map(|(name, _)| name.to_string())
            .take(3)
            .collect()
    }

    /// Usage text for this group; `prefix` is the command path leading to it.
    #[must_use]
    pub fn usage_text(&self, prefix: &str) -> String {
        let rows = self
            .children
            .iter()
            .map(|child| {
                let left = [prefix, child.name(), child.args()]
                    .into_iter()
                    .filter(|part| !part.is_empty())
                    .join(" ");
                let aliases = self.aliases_of(child.name());
                let right = if aliases.is_empty() {
                    child.describe().to_string()
                } else {
                    format!("{}  [aliases: {}]", child.describe(), aliases.join(", "))
                };
                (left, right)
            })
            .collect::<Vec<_>>();
        let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);

        let commands = rows
            .iter()
            .map(|(left, right)| format!("  {left:<width$}  {right}"))
            .join("\n");
        format!("{}\n\nCommands:\n{commands}", self.usage)
    }
}
