#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

mod cli;
mod shell;

use anyhow::Context;
use cli::{parse_cli_args, CliAction, ShellOptions, USAGE};
use shell::ShellSink;
use std::process::ExitCode;
use std::rc::Rc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::LocalSet;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vimhelp::error::get_error_info;
use vimhelp::{code, BotConfig, IncomingMessage, VimHelpBot, VimHelpError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let action = match parse_cli_args(&args) {
        Ok(action) => action,
        Err(err) => {
            eprintln!("{err}\n\n{USAGE}");
            print_hint(code::CLI_ERROR);
            return ExitCode::from(2);
        }
    };

    match action {
        CliAction::ShowHelp => {
            println!("{USAGE}");
            ExitCode::SUCCESS
        }
        CliAction::ShowVersion => {
            println!("vimhelp-bot {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        CliAction::RunShell(options) => {
            dotenv::dotenv().ok();
            init_tracing();
            match LocalSet::new().run_until(run_shell(options)).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("Error: {err:#}");
                    if let Some(err) = err.downcast_ref::<VimHelpError>() {
                        print_hint(err.code());
                    }
                    ExitCode::from(exit_code(&err))
                }
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_hint(error_code: &str) {
    if let Some((description, fix)) = get_error_info(error_code) {
        eprintln!("{error_code}: {description}. {fix}");
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<VimHelpError>()
        .map_or(1, |err| u8::try_from(err.exit_code()).unwrap_or(1))
}

/// Feeds stdin lines to the bot until EOF. A literal `\n` in a line stands
/// for a line break inside one message.
async fn run_shell(options: ShellOptions) -> anyhow::Result<()> {
    let config = BotConfig::from_env().context("invalid configuration")?;
    let bot = Rc::new(VimHelpBot::from_config(&config)?);
    info!(
        "vimhelp-bot ready as {} (plugin manager {})",
        config.bot_name,
        if bot.plugin_manager_enabled() { "on" } else { "off" }
    );

    let sink = Rc::new(ShellSink::new(
        options.user.clone(),
        options.output,
        std::io::stdout(),
    ));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = Vec::new();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let message = IncomingMessage::new(options.user.clone(), line.replace("\\n", "\n"));
        let bot = Rc::clone(&bot);
        let sink = Rc::clone(&sink);
        pending.push(tokio::task::spawn_local(async move {
            bot.handle(&message, &*sink).await
        }));
    }

    for handle in pending {
        let fired = handle.await.context("message handler failed")?;
        debug!("listeners fired: {:?}", fired);
    }
    Ok(())
}
