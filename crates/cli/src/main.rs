// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pynodex: thin CLI client for the pynodexd process supervisor.

mod client;
mod color;
mod commands;
mod daemon_binary;
mod exit_error;

use clap::{Parser, Subcommand};

use exit_error::ExitError;

#[derive(Debug, Parser)]
#[command(name = "pynodex", version, about = "Process supervisor CLI", styles = color::styles())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start and register a new process.
    Start(commands::StartArgs),
    /// Stop a running process and remove its registry entry.
    Stop { name: String },
    /// List every registered process and its live status.
    List,
    /// Print the tail of a process's captured log.
    Logs(commands::LogsArgs),
    /// Poll `list` on an interval until interrupted.
    Monitor,
    /// Snapshot the current registry to disk immediately.
    Save,
    /// Stop and deregister a process (or `all`), deleting its log files.
    Clear { target: Option<String> },
    /// Stop then start a process (or `all`) with its stored parameters.
    Restart { target: Option<String> },
    /// Start-before-stop variant of restart for a process (or `all`).
    Reload { target: Option<String> },
    /// Control the pynodexd background process itself.
    Daemon(commands::DaemonArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Start(args) => commands::start(args).await,
        Command::Stop { name } => commands::stop(name).await,
        Command::List => commands::list().await,
        Command::Logs(args) => commands::logs(args).await,
        Command::Monitor => commands::monitor().await,
        Command::Save => commands::save().await,
        Command::Clear { target } => commands::clear(target).await,
        Command::Restart { target } => commands::restart(target).await,
        Command::Reload { target } => commands::reload(target).await,
        Command::Daemon(args) => commands::daemon(args).await,
    };

    if let Err(err) = result {
        report_exit(err);
    }
}

fn report_exit(err: ExitError) -> ! {
    eprintln!("{}", color::header("error:"));
    eprintln!("  {}", err.message);
    std::process::exit(err.code);
}
