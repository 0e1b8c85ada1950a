// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One module per CLI subcommand. Each `run()` talks to the daemon over
//! `crate::client::DaemonClient` and returns an `ExitError` on failure so
//! `main()` is the only place that calls `std::process::exit`.

mod clear;
mod daemon;
mod list;
mod logs;
mod monitor;
mod reload;
mod restart;
mod save;
mod start;
mod stop;

pub use clear::run as clear;
pub use daemon::{daemon, DaemonArgs};
pub use list::run as list;
pub use logs::{run as logs, LogsArgs};
pub use monitor::run as monitor;
pub use reload::run as reload;
pub use restart::run as restart;
pub use save::run as save;
pub use start::{run as start, StartArgs};
pub use stop::run as stop;

use crate::exit_error::ExitError;
use pynodex_wire::Response;

/// Map a daemon response to the CLI's success/failure contract: print the
/// message, return `Ok(())` on success or an `ExitError` on failure.
fn report(response: Response) -> Result<(), ExitError> {
    if response.is_success() {
        println!("{}", response.message);
        Ok(())
    } else {
        Err(ExitError::new(1, response.message))
    }
}

/// Parse `KEY=VALUE` environment pairs from the CLI, dropping (with a
/// warning on stderr) anything that doesn't split cleanly.
fn parse_env_pairs(pairs: &[String]) -> std::collections::HashMap<String, String> {
    let mut env = std::collections::HashMap::new();
    for pair in pairs {
        match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                env.insert(key.to_string(), value.to_string());
            }
            _ => {
                eprintln!("warning: ignoring malformed environment pair '{pair}' (expected KEY=VALUE)");
            }
        }
    }
    env
}
