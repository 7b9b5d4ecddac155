use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{domain::ServerRunState, error::RemoteError};

/// Handshake event sent as the first frame of every control session.
pub const REMOTE_DASHBOARD_SETUP: &str = "RemoteDashboardSetup";
/// High-frequency heartbeat event that is never forwarded to the router.
pub const REMOTE_POLLING: &str = "RemotePolling";
pub const FRAME_TERMINATOR: &str = "\r\n";

pub const START_PATH: &str = "/devices/api/start";
pub const STOP_PATH: &str = "/devices/api/stop";
pub const STATUS_PATH: &str = "/devices/api/status";
pub const DRIVERS_PATH: &str = "/devices/api/drivers";

/// Outbound control-channel frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlFrame {
    pub event: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl ControlFrame {
    pub fn new(event: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            event: event.into(),
            params,
        }
    }

    pub fn dashboard_setup() -> Self {
        Self::new(REMOTE_DASHBOARD_SETUP, Map::new())
    }
}

/// Inbound control-channel message after sanitizing and parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub event: Option<String>,
    pub body: Map<String, Value>,
}

impl InboundMessage {
    /// Returns `None` when the payload is not a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(body) = value else {
            return None;
        };
        let event = body
            .get("event")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Some(Self { event, body })
    }

    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    pub fn params(&self) -> Option<&Map<String, Value>> {
        self.body.get("params").and_then(Value::as_object)
    }

    pub fn is_heartbeat(&self) -> bool {
        self.event() == Some(REMOTE_POLLING)
    }

    pub fn remote_error(&self) -> Option<RemoteError> {
        let status = self.body.get("status").and_then(Value::as_i64)?;
        if status == 0 {
            return None;
        }
        let message = self
            .body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Some(RemoteError::new(status, message))
    }
}

/// Body of `GET /devices/api/status`. The backend reports a string-typed
/// boolean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn run_state(&self) -> ServerRunState {
        if self.status == "True" {
            ServerRunState::Running
        } else {
            ServerRunState::Stopped
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn dashboard_setup_serializes_with_empty_params() {
        let text = serde_json::to_string(&ControlFrame::dashboard_setup()).expect("encode");
        assert_eq!(text, r#"{"event":"RemoteDashboardSetup","params":{}}"#);
    }

    #[test]
    fn inbound_message_exposes_event_and_params() {
        let message = InboundMessage::from_value(json!({"event": "x", "params": {"v": null}}))
            .expect("object");
        assert_eq!(message.event(), Some("x"));
        assert_eq!(message.params().and_then(|p| p.get("v")), Some(&Value::Null));
        assert!(!message.is_heartbeat());
    }

    #[test]
    fn inbound_message_rejects_non_objects() {
        assert!(InboundMessage::from_value(json!([1, 2])).is_none());
        assert!(InboundMessage::from_value(Value::Null).is_none());
    }

    #[test]
    fn remote_error_requires_non_zero_status() {
        let ok = InboundMessage::from_value(json!({"status": 0, "message": "fine"})).expect("object");
        assert!(ok.remote_error().is_none());

        let failed = InboundMessage::from_value(json!({"status": 1, "message": "Failed to execute command"}))
            .expect("object");
        assert_eq!(
            failed.remote_error(),
            Some(RemoteError::new(1, "Failed to execute command"))
        );
    }

    #[test]
    fn only_literal_true_means_running() {
        let running = StatusResponse { status: "True".into() };
        let stopped = StatusResponse { status: "true".into() };
        assert_eq!(running.run_state(), ServerRunState::Running);
        assert_eq!(stopped.run_state(), ServerRunState::Stopped);
    }
}
