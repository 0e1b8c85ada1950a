// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Requests the CLI (or any client) sends to the daemon.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Arguments for a `start` request.
///
/// `command` travels as a single string — the client joins argv tokens with
/// `" "` before sending, and the daemon never re-splits it; it is handed to
/// `sh -c` verbatim and replayed verbatim on restart/reload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StartArgs {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub port: Option<u16>,
    /// Custom combined stdout+stderr log path. Absent means the default
    /// per-name log files, unless `no_daemon` is set.
    #[serde(default)]
    pub log: Option<String>,
    /// Skip stdout/stderr capture entirely (inherit the daemon's own
    /// stdio). Takes precedence over `log`.
    #[serde(default)]
    pub no_daemon: bool,
    #[serde(default)]
    pub max_cpu_restart: Option<f64>,
    #[serde(default)]
    pub max_memory_restart: Option<String>,
    #[serde(default)]
    pub restart_delay_ms: Option<u64>,
    #[serde(default)]
    pub no_autorestart: bool,
    #[serde(default)]
    pub watch: bool,
    #[serde(default)]
    pub cron: Option<String>,
    #[serde(default)]
    pub time_prefix_logs: bool,
}

/// A request sent over the socket. Serializes as `{"type": "<verb>", "args": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "args", rename_all = "snake_case")]
pub enum Request {
    Start(StartArgs),
    Stop { name: String },
    List,
    /// `target` is a process name or the literal `"all"`.
    Restart { target: String },
    Reload { target: String },
    Save,
    Clear { target: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_request_serializes_with_tag_and_content() {
        let req = Request::Start(StartArgs {
            name: "web".to_string(),
            command: "python -m http.server 8123".to_string(),
            cwd: None,
            env: HashMap::new(),
            port: Some(8123),
            log: None,
            no_daemon: false,
            max_cpu_restart: None,
            max_memory_restart: None,
            restart_delay_ms: None,
            no_autorestart: false,
            watch: false,
            cron: None,
            time_prefix_logs: false,
        });
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "start");
        assert_eq!(json["args"]["name"], "web");
        assert_eq!(json["args"]["port"], 8123);
    }

    #[test]
    fn stop_request_round_trips() {
        let req = Request::Stop { name: "web".to_string() };
        let json = serde_json::to_string(&req).unwrap();
        let back: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(req, back);
    }

    #[test]
    fn list_and_save_have_no_args() {
        let json = serde_json::to_value(Request::List).unwrap();
        assert_eq!(json["type"], "list");
        assert!(json.get("args").is_none() || json["args"].is_null());
    }

    #[test]
    fn restart_target_defaults_to_all_is_caller_responsibility() {
        let req = Request::Restart { target: "all".to_string() };
        let json = serde_json::to_string(&req).unwrap();
        let back: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(req, back);
    }
}
