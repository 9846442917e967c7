use serde_json::{json, Value};
use shared::{
    error::ErrorCode,
    protocol::{
        DirectiveError, DirectiveResponse, Header, CONTROL_NAMESPACE, CONTROL_PAYLOAD_VERSION,
        DISCOVERY_NAMESPACE, DISCOVERY_PAYLOAD_VERSION, DISCOVER_APPLIANCES_RESPONSE,
        ERROR_PAYLOAD_VERSION, TURN_OFF_CONFIRMATION, TURN_ON_CONFIRMATION,
    },
};

pub fn build_response(
    namespace: &str,
    name: &str,
    payload_version: &str,
    payload: Value,
) -> DirectiveResponse {
    DirectiveResponse {
        header: Header::new(namespace, name, payload_version),
        payload,
    }
}

/// Errors always carry the control namespace, discovery failures included.
pub fn build_error(name: &str, code: ErrorCode, description: impl Into<String>) -> DirectiveError {
    DirectiveError::new(
        Header::new(CONTROL_NAMESPACE, name, ERROR_PAYLOAD_VERSION),
        code,
        description,
    )
}

pub fn discovery_response(appliances: Vec<Value>) -> DirectiveResponse {
    build_response(
        DISCOVERY_NAMESPACE,
        DISCOVER_APPLIANCES_RESPONSE,
        DISCOVERY_PAYLOAD_VERSION,
        json!({ "discoveredAppliances": appliances }),
    )
}

pub fn control_confirmation(turn_on: bool) -> DirectiveResponse {
    let name = if turn_on {
        TURN_ON_CONFIRMATION
    } else {
        TURN_OFF_CONFIRMATION
    };
    build_response(
        CONTROL_NAMESPACE,
        name,
        CONTROL_PAYLOAD_VERSION,
        json!({ "success": true }),
    )
}
