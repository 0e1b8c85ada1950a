// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use pynodex_wire::Request;

use super::report;
use crate::client::DaemonClient;
use crate::exit_error::ExitError;

pub async fn run(target: Option<String>) -> Result<(), ExitError> {
    let target = target.unwrap_or_else(|| "all".to_string());
    let client = DaemonClient::connect().await.map_err(|err| ExitError::new(1, err.to_string()))?;
    let response =
        client.send(&Request::Restart { target }).await.map_err(|err| ExitError::new(1, err.to_string()))?;
    report(response)
}
