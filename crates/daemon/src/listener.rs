// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC Server: dispatches one request per connection to the lifecycle
//! engine and writes back the symmetric response.

use std::path::Path;

use serde_json::json;
use tokio::io::BufReader;
use tokio::net::UnixStream;

use pynodex_core::record::{LogMode, ProcessRecordBuilder};
use pynodex_core::Clock;
use pynodex_wire::{read_message, write_message, Request, Response, StartArgs};

use crate::error::LifecycleError;
use crate::lifecycle::LifecycleEngine;
use crate::probe::OsProbe;

/// Service one connection: read exactly one request, dispatch it, write
/// exactly one response. Malformed input is answered with an error
/// response before the connection is dropped by the caller.
pub async fn serve_connection<C: Clock>(
    stream: UnixStream,
    registry_path: &Path,
    logs_dir: &Path,
    probe: &mut OsProbe,
    clock: C,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let request: Request = match read_message(&mut reader).await {
        Ok(request) => request,
        Err(err) => {
            let response = Response::error(format!("malformed request: {err}"));
            let _ = write_message(&mut write_half, &response).await;
            return;
        }
    };

    let mut engine = LifecycleEngine::new(registry_path, logs_dir, probe, clock);
    let response = dispatch(&mut engine, request);
    let _ = write_message(&mut write_half, &response).await;
}

fn dispatch<C: Clock>(engine: &mut LifecycleEngine<'_, C>, request: Request) -> Response {
    match request {
        Request::Start(args) => match engine.start(&builder_from_start_args(args)) {
            Ok(record) => Response::ok_with_data(
                format!("started '{}'", record.name),
                serde_json::to_value(&record).unwrap_or_default(),
            ),
            Err(err) => error_response(&err),
        },
        Request::Stop { name } => match engine.stop(&name) {
            Ok(_) => Response::ok(format!("stopped '{name}'")),
            Err(err) => error_response(&err),
        },
        Request::List => match engine.list() {
            Ok(merged) => {
                let mut data = serde_json::Map::new();
                for (name, (record, live_status)) in merged {
                    let mut entry = serde_json::to_value(&record).unwrap_or_default();
                    if let Some(object) = entry.as_object_mut() {
                        object.insert("status".to_string(), json!(live_status.as_str()));
                    }
                    data.insert(name, entry);
                }
                Response::ok_with_data("ok", serde_json::Value::Object(data))
            }
            Err(err) => error_response(&err),
        },
        Request::Restart { target } => match engine.restart(&target) {
            Ok(count) => Response::ok_with_data(
                format!("restarted {count} process(es)"),
                json!({ "restarted": count }),
            ),
            Err(err) => error_response(&err),
        },
        Request::Reload { target } => match engine.reload(&target) {
            Ok(count) => {
                Response::ok_with_data(format!("reloaded {count} process(es)"), json!({ "reloaded": count }))
            }
            Err(err) => error_response(&err),
        },
        Request::Save => match engine.save_current() {
            Ok(()) => Response::ok("saved"),
            Err(err) => error_response(&err),
        },
        Request::Clear { target } => match engine.clear(&target) {
            Ok(()) => Response::ok(format!("cleared '{target}'")),
            Err(err) => error_response(&err),
        },
    }
}

fn error_response(err: &LifecycleError) -> Response {
    Response::error(err.to_string())
}

fn builder_from_start_args(args: StartArgs) -> ProcessRecordBuilder {
    let (log_mode, custom_log_path) = match (args.no_daemon, args.log) {
        (true, _) => (LogMode::NoCapture, None),
        (false, Some(path)) => (LogMode::CustomPath, Some(path)),
        (false, None) => (LogMode::Default, None),
    };

    ProcessRecordBuilder {
        name: args.name,
        command: args.command,
        cwd: args.cwd,
        env: args.env,
        port: args.port,
        log_mode,
        custom_log_path,
        max_cpu_restart: args.max_cpu_restart,
        max_memory_restart: args.max_memory_restart,
        restart_delay_ms: args.restart_delay_ms,
        no_autorestart: args.no_autorestart,
        watch: args.watch,
        cron: args.cron,
        time_prefix_logs: args.time_prefix_logs,
    }
}
