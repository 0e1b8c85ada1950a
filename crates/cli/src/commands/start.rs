// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Args;

use pynodex_wire::Request;

use super::{parse_env_pairs, report};
use crate::client::DaemonClient;
use crate::exit_error::ExitError;

#[derive(Debug, Args)]
pub struct StartArgs {
    /// Unique name to register the process under.
    pub name: String,

    /// Shell command, replayed verbatim on restart/reload. Multiple words
    /// are joined with a single space, never re-split by the daemon.
    #[arg(required = true, allow_hyphen_values = true, trailing_var_arg = true)]
    pub command: Vec<String>,

    #[arg(long)]
    pub cwd: Option<String>,

    /// `KEY=VALUE` pair; may be passed multiple times.
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// Combine stdout/stderr into one custom log file instead of the
    /// default per-name pair.
    #[arg(long)]
    pub log: Option<String>,

    /// Skip stdout/stderr capture entirely; the child inherits the
    /// daemon's own stdio. Takes precedence over `--log`.
    #[arg(long)]
    pub no_daemon: bool,

    #[arg(long)]
    pub max_cpu_restart: Option<f64>,

    /// e.g. `"200MB"` or `"1GB"`.
    #[arg(long)]
    pub max_memory_restart: Option<String>,

    #[arg(long)]
    pub restart_delay_ms: Option<u64>,

    #[arg(long)]
    pub no_autorestart: bool,

    #[arg(long)]
    pub watch: bool,

    #[arg(long)]
    pub cron: Option<String>,

    #[arg(long)]
    pub time_prefix_logs: bool,
}

pub async fn run(args: StartArgs) -> Result<(), ExitError> {
    let request = Request::Start(pynodex_wire::StartArgs {
        name: args.name,
        command: args.command.join(" "),
        cwd: args.cwd,
        env: parse_env_pairs(&args.env),
        port: args.port,
        log: args.log,
        no_daemon: args.no_daemon,
        max_cpu_restart: args.max_cpu_restart,
        max_memory_restart: args.max_memory_restart,
        restart_delay_ms: args.restart_delay_ms,
        no_autorestart: args.no_autorestart,
        watch: args.watch,
        cron: args.cron,
        time_prefix_logs: args.time_prefix_logs,
    });

    let client = DaemonClient::connect_or_start()
        .await
        .map_err(|err| ExitError::new(1, err.to_string()))?;
    let response = client.send(&request).await.map_err(|err| ExitError::new(1, err.to_string()))?;
    report(response)
}
