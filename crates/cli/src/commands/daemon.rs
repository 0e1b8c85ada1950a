// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pynodex daemon start|stop|status` — bootstrap controls. Interface-level
//! only: `start` backgrounds `pynodexd` as a plain child of the shell rather
//! than fully daemonizing (spec.md §1 puts double-fork/session-detach out
//! of scope).

use clap::{Args, Subcommand};

use pynodex_daemon::env;

use crate::exit_error::ExitError;

#[derive(Debug, Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Debug, Subcommand)]
pub enum DaemonCommand {
    Start,
    Stop,
    Status,
}

pub async fn daemon(args: DaemonArgs) -> Result<(), ExitError> {
    match args.command {
        DaemonCommand::Start => start(),
        DaemonCommand::Stop => stop(),
        DaemonCommand::Status => status(),
    }
}

fn start() -> Result<(), ExitError> {
    if let Some(pid) = running_pid() {
        return Err(ExitError::new(1, format!("pynodexd is already running (pid {pid})")));
    }

    let exe = crate::daemon_binary::find();
    std::process::Command::new(&exe)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|err| ExitError::new(1, format!("failed to start '{}': {err}", exe.display())))?;

    println!("pynodexd starting");
    Ok(())
}

fn stop() -> Result<(), ExitError> {
    let pid = running_pid().ok_or_else(|| ExitError::new(1, "pynodexd is not running".to_string()))?;

    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), nix::sys::signal::Signal::SIGTERM)
        .map_err(|err| ExitError::new(1, format!("failed to signal pynodexd (pid {pid}): {err}")))?;

    println!("sent SIGTERM to pynodexd (pid {pid})");
    Ok(())
}

fn status() -> Result<(), ExitError> {
    match running_pid() {
        Some(pid) => println!("pynodexd is running (pid {pid})"),
        None => println!("pynodexd is not running"),
    }
    Ok(())
}

/// Read the PID file and confirm the process is actually alive, per
/// spec.md's OS liveness check (`kill(pid, 0)`).
fn running_pid() -> Option<u32> {
    let contents = std::fs::read_to_string(env::pid_path()).ok()?;
    let pid: u32 = contents.trim().parse().ok()?;
    match nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), None) {
        Ok(()) => Some(pid),
        Err(_) => None,
    }
}
