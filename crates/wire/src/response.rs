// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Responses the daemon sends back to a client.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// The generic response envelope, symmetric with [`crate::Request`]'s
/// verbatim newline-delimited JSON framing: `{"status", "message", "data"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Response {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { status: ResponseStatus::Success, message: message.into(), data: None }
    }

    pub fn ok_with_data(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self { status: ResponseStatus::Success, message: message.into(), data: Some(data) }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { status: ResponseStatus::Error, message: message.into(), data: None }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_serializes_without_data_field() {
        let response = Response::ok("done");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn error_reports_failure_status() {
        let response = Response::error("port 8123 already in use by 'web'");
        assert!(!response.is_success());
        assert_eq!(response.status, ResponseStatus::Error);
    }

    #[test]
    fn ok_with_data_round_trips() {
        let response = Response::ok_with_data("ok", serde_json::json!({"count": 2}));
        let json = serde_json::to_string(&response).unwrap();
        let back: Response = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data.unwrap()["count"], 2);
    }
}
