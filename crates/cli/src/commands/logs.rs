// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reads log files directly from disk — `logs` has no wire-protocol verb
//! (spec.md §4.6's request table), since the CLI already knows where the
//! daemon writes per-name capture files.

use clap::Args;

use pynodex_daemon::env;

use crate::client::read_last_lines;
use crate::exit_error::ExitError;

#[derive(Debug, Args)]
pub struct LogsArgs {
    pub name: String,

    #[arg(long, default_value_t = 50)]
    pub lines: usize,

    /// Show stderr instead of stdout.
    #[arg(long)]
    pub stderr: bool,
}

pub async fn run(args: LogsArgs) -> Result<(), ExitError> {
    let suffix = if args.stderr { "stderr" } else { "stdout" };
    let path = env::logs_dir().join(format!("{}_{}.log", args.name, suffix));

    let content = read_last_lines(&path, args.lines).map_err(|err| {
        ExitError::new(1, format!("could not read log file '{}': {err}", path.display()))
    })?;

    println!("{content}");
    Ok(())
}
