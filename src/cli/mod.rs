#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

mod action;
mod parser;

pub use action::{CliAction, OutputFormat, ShellOptions};
pub use parser::{parse_cli_args, CliError, USAGE};
