//! Client side of the remote device-control API.
//!
//! The directive handlers only see [`RemoteDeviceClient`]; [`HttpDeviceClient`]
//! is the production implementation backed by `reqwest`.

use async_trait::async_trait;
use serde_json::Value;
use shared::domain::{AccessToken, ApplianceId, SwitchAction};

pub mod error;
pub mod transport;

pub use error::DownstreamError;
pub use transport::{DeviceApiConfig, HttpDeviceClient};

/// Raw reply of a switch call. The body is kept verbatim; callers decide
/// whether to look inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchReply {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait RemoteDeviceClient: Send + Sync {
    /// `GET {base}/switches?access_token=...`, parsed as a JSON array.
    async fn list_appliances(&self, token: &AccessToken) -> Result<Vec<Value>, DownstreamError>;

    /// `GET {base}/switches/{id}/{on|off}?access_token=...`.
    async fn set_switch(
        &self,
        token: &AccessToken,
        appliance_id: &ApplianceId,
        action: SwitchAction,
    ) -> Result<SwitchReply, DownstreamError>;

    /// Name-addressed toggle used by the voice intent path. Requires a 200
    /// status and a body carrying `success: true`.
    async fn toggle_by_name(
        &self,
        token: &str,
        device_name: &str,
        action: &str,
    ) -> Result<Value, DownstreamError>;
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
