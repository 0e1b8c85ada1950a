// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use pynodex_wire::Request;

use crate::client::DaemonClient;
use crate::color;
use crate::exit_error::ExitError;

pub async fn run() -> Result<(), ExitError> {
    let client = DaemonClient::connect().await.map_err(|err| ExitError::new(1, err.to_string()))?;
    let response = client.send(&Request::List).await.map_err(|err| ExitError::new(1, err.to_string()))?;

    if !response.is_success() {
        return Err(ExitError::new(1, response.message));
    }

    let Some(serde_json::Value::Object(entries)) = response.data else {
        println!("{}", color::muted("(no processes)"));
        return Ok(());
    };

    if entries.is_empty() {
        println!("{}", color::muted("(no processes)"));
        return Ok(());
    }

    println!(
        "{:<16} {:<10} {:<8} {:<8} {}",
        color::header("NAME"),
        color::header("STATUS"),
        color::header("PID"),
        color::header("PORT"),
        color::header("COMMAND"),
    );

    let mut names: Vec<&String> = entries.keys().collect();
    names.sort();

    for name in names {
        let entry = &entries[name];
        let status = entry["status"].as_str().unwrap_or("unknown");
        let pid = entry["pid"].as_u64().map(|pid| pid.to_string()).unwrap_or_else(|| "-".to_string());
        let port = entry["port"].as_u64().map(|port| port.to_string()).unwrap_or_else(|| "-".to_string());
        let command = entry["command"].as_str().unwrap_or("");

        println!(
            "{:<16} {:<10} {:<8} {:<8} {}",
            color::literal(name),
            status,
            color::context(&pid),
            color::context(&port),
            color::muted(command),
        );
    }

    Ok(())
}
