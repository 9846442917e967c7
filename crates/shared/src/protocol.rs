use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    domain::ApplianceId,
    error::{ErrorCode, ErrorPayload, Exception},
};

pub const DISCOVERY_NAMESPACE: &str = "Alexa.ConnectedHome.Discovery";
pub const CONTROL_NAMESPACE: &str = "Alexa.ConnectedHome.Control";

pub const DISCOVER_APPLIANCES_RESPONSE: &str = "DiscoverAppliancesResponse";
pub const TURN_ON_CONFIRMATION: &str = "TurnOnConfirmation";
pub const TURN_OFF_CONFIRMATION: &str = "TurnOffConfirmation";
pub const DISCOVERY_FAIL: &str = "DiscoveryFail";
pub const SWITCH_ON_OFF_REQUEST: &str = "SwitchOnOffRequest";
/// Error name used when the inbound directive carries no usable name.
pub const UNSUPPORTED_DIRECTIVE: &str = "UnsupportedDirective";

pub const DISCOVERY_PAYLOAD_VERSION: &str = "2";
pub const CONTROL_PAYLOAD_VERSION: &str = "1";
pub const ERROR_PAYLOAD_VERSION: &str = "2";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub payload_version: String,
}

impl Header {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        payload_version: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            payload_version: payload_version.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appliance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appliance_id: Option<ApplianceId>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectivePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appliance: Option<Appliance>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Inbound smart-home request from the voice platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub header: Header,
    #[serde(default)]
    pub payload: DirectivePayload,
}

impl Directive {
    pub fn appliance_id(&self) -> Option<&ApplianceId> {
        self.payload
            .appliance
            .as_ref()
            .and_then(|appliance| appliance.appliance_id.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectiveResponse {
    pub header: Header,
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{} ({}): {}", .header.name, .payload.exception.code.as_str(), .payload.exception.description)]
pub struct DirectiveError {
    pub header: Header,
    pub payload: ErrorPayload,
}

impl DirectiveError {
    pub fn new(header: Header, code: ErrorCode, description: impl Into<String>) -> Self {
        Self {
            header,
            payload: ErrorPayload {
                exception: Exception::new(code, description),
            },
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.payload.exception.code
    }
}

/// Outcome of a single directive invocation: a response or an error, never both.
pub type DirectiveOutcome = Result<DirectiveResponse, DirectiveError>;
