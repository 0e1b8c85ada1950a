// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use pynodex_wire::Request;

use super::report;
use crate::client::DaemonClient;
use crate::exit_error::ExitError;

pub async fn run(name: String) -> Result<(), ExitError> {
    let client = DaemonClient::connect().await.map_err(|err| ExitError::new(1, err.to_string()))?;
    let response =
        client.send(&Request::Stop { name }).await.map_err(|err| ExitError::new(1, err.to_string()))?;
    report(response)
}
