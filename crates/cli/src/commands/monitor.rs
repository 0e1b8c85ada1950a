// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live view of the registry. Implemented at the interface level only: it
//! re-polls `list` on a fixed interval rather than subscribing to daemon
//! push events, since the wire protocol has no subscription verb.

use std::time::Duration;

use crate::exit_error::ExitError;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

pub async fn run() -> Result<(), ExitError> {
    loop {
        print!("\x1b[2J\x1b[H");
        super::list().await?;

        tokio::select! {
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}
