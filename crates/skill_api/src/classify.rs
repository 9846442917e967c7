//! Mapping of downstream outcomes onto directive error codes.

use device_client::DownstreamError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::error::ErrorCode;

/// How much of a control reply is trusted.
///
/// `Ignore` reports success for any 2xx reply, whatever the body says.
/// `Inspect` reads a JSON `success: false` body and its `error` hint, which is
/// the only way `TARGET_OFFLINE` and `EXPIRED_ACCESS_TOKEN` are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlBodyPolicy {
    #[default]
    Ignore,
    Inspect,
}

pub fn classify_downstream_error(error: &DownstreamError, policy: ControlBodyPolicy) -> ErrorCode {
    match (policy, error.status()) {
        (ControlBodyPolicy::Inspect, Some(401)) => ErrorCode::ExpiredAccessToken,
        _ => ErrorCode::DependentServiceUnavailable,
    }
}

/// Returns the error a control reply body signals, if any.
pub fn classify_control_body(body: &str, policy: ControlBodyPolicy) -> Option<(ErrorCode, String)> {
    if policy == ControlBodyPolicy::Ignore {
        return None;
    }
    let value: Value = serde_json::from_str(body).ok()?;
    if value.get("success").and_then(Value::as_bool) != Some(false) {
        return None;
    }
    let hint = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_ascii_lowercase();
    let outcome = match hint.as_str() {
        "offline" | "target_offline" => (ErrorCode::TargetOffline, "Target appliance is offline"),
        "expired_token" | "invalid_token" | "unauthorized" => {
            (ErrorCode::ExpiredAccessToken, "Access token has expired")
        }
        _ => (
            ErrorCode::DependentServiceUnavailable,
            "Device service reported a failure",
        ),
    };
    Some((outcome.0, outcome.1.to_string()))
}
