// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ProcessRecord`: the persistent description of one managed child plus its
//! last-known runtime facts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Sentinel stored in `stdout_log`/`stderr_log` for records started without
/// capture (direct, unsupervised invocation).
pub const CONSOLE_SENTINEL: &str = "N/A (console)";

/// A display string for a record's runtime status.
///
/// The OS probe can return almost any string the platform uses for process
/// state (`"sleeping"`, `"zombie"`, ...), so this is a thin wrapper around
/// `String` rather than a closed enum — the handful of statuses the
/// supervisor itself assigns are exposed as constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(pub String);

impl Status {
    pub fn running() -> Self {
        Status("running".to_string())
    }

    pub fn stopped() -> Self {
        Status("stopped".to_string())
    }

    pub fn dead_not_found() -> Self {
        Status("dead/not_found".to_string())
    }

    pub fn no_pid() -> Self {
        Status("no_pid".to_string())
    }

    pub fn access_denied() -> Self {
        Status("Access Denied".to_string())
    }

    pub fn other(raw: impl Into<String>) -> Self {
        Status(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_running(&self) -> bool {
        self.0 == "running"
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a record's standard streams were captured at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogMode {
    /// `<log-dir>/<name>_stdout.log` and `<log-dir>/<name>_stderr.log`.
    Default,
    /// A single user-supplied path, combining stdout and stderr.
    CustomPath,
    /// Inherit the caller's standard streams (direct/unsupervised start only).
    NoCapture,
}

/// The authoritative entity: one managed child plus its last-known runtime
/// facts. Identified by `name`, unique within the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub name: String,
    /// Verbatim command line, replayed through a shell unchanged — never
    /// re-split on whitespace (see restart/reload).
    pub command: String,
    pub cwd: Option<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    pub port: Option<u16>,
    pub pid: Option<u32>,
    pub status: Status,
    /// Epoch milliseconds of the last successful spawn.
    pub start_time: u64,
    pub stdout_log: String,
    pub stderr_log: String,

    pub max_cpu_restart: Option<f64>,
    pub max_memory_restart: Option<String>,
    pub restart_delay_ms: Option<u64>,
    #[serde(default)]
    pub no_autorestart: bool,
    #[serde(default)]
    pub watch: bool,
    pub cron: Option<String>,
    #[serde(default)]
    pub time_prefix_logs: bool,
}

impl ProcessRecord {
    /// Whether this record's logs are captured to real files (as opposed to
    /// the console sentinel).
    pub fn has_capture_files(&self) -> bool {
        self.stdout_log != CONSOLE_SENTINEL
    }
}

/// Parameters needed to (re)start a record, gathered before the first spawn
/// and replayed verbatim by restart/reload/the policy monitor's restart helper.
#[derive(Debug, Clone)]
pub struct ProcessRecordBuilder {
    pub name: String,
    pub command: String,
    pub cwd: Option<String>,
    pub env: HashMap<String, String>,
    pub port: Option<u16>,
    pub log_mode: LogMode,
    pub custom_log_path: Option<String>,
    pub max_cpu_restart: Option<f64>,
    pub max_memory_restart: Option<String>,
    pub restart_delay_ms: Option<u64>,
    pub no_autorestart: bool,
    pub watch: bool,
    pub cron: Option<String>,
    pub time_prefix_logs: bool,
}

impl ProcessRecordBuilder {
    /// Rebuild the parameters needed to replay this record's start, from its
    /// last-known stored state. Used by restart, reload, and the policy
    /// monitor's auto-restart helper (spec §4.5.1) — all three must replay
    /// the original `command` and `cwd`/`env`/policy fields unchanged.
    pub fn from_record(record: &ProcessRecord) -> Self {
        let (log_mode, custom_log_path) = if !record.has_capture_files() {
            (LogMode::NoCapture, None)
        } else if record.stdout_log == record.stderr_log {
            (LogMode::CustomPath, Some(record.stdout_log.clone()))
        } else {
            (LogMode::Default, None)
        };

        Self {
            name: record.name.clone(),
            command: record.command.clone(),
            cwd: record.cwd.clone(),
            env: record.env.clone(),
            port: record.port,
            log_mode,
            custom_log_path,
            max_cpu_restart: record.max_cpu_restart,
            max_memory_restart: record.max_memory_restart.clone(),
            restart_delay_ms: record.restart_delay_ms,
            no_autorestart: record.no_autorestart,
            watch: record.watch,
            cron: record.cron.clone(),
            time_prefix_logs: record.time_prefix_logs,
        }
    }
}
