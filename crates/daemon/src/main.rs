// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pynodexd: background process supervisor daemon.
//!
//! Not meant to be invoked directly outside of tests; the `pynodex` CLI's
//! `daemon start` subcommand spawns it and waits for the socket to appear.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pynodex_core::SystemClock;
use pynodex_daemon::{env, PidFile};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("pynodexd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                println!("pynodexd {}", env!("CARGO_PKG_VERSION"));
                println!("Process supervisor daemon. Normally started by `pynodex daemon start`.");
                return Ok(());
            }
            other => {
                eprintln!("error: unexpected argument '{other}'");
                std::process::exit(1);
            }
        }
    }

    let _log_guard = setup_logging()?;

    let pid_file = match PidFile::acquire(env::pid_path()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("pynodexd is already running: {err}");
            std::process::exit(1);
        }
    };

    tracing::info!(pid = std::process::id(), "pynodexd starting");

    let result = pynodex_daemon::supervisor::run(
        &env::socket_path(),
        &env::registry_path(),
        &env::logs_dir(),
        SystemClock,
    )
    .await;

    drop(pid_file);

    if let Err(err) = &result {
        tracing::error!(error = %err, "supervisor loop exited with an error");
    }
    tracing::info!("pynodexd stopped");

    Ok(result?)
}

fn setup_logging() -> std::io::Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_path = env::daemon_log_path();
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        log_path.parent().unwrap_or_else(|| std::path::Path::new(".")),
        log_path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("pynodex_daemon.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
