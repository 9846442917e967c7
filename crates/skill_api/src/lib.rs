//! Translation between smart-home directives and the device-control API.

use std::sync::Arc;

use device_client::RemoteDeviceClient;

pub mod classify;
pub mod control;
pub mod discovery;
pub mod intent;
pub mod response;
pub mod router;

pub use classify::ControlBodyPolicy;
pub use control::control;
pub use discovery::discover;
pub use intent::{IntentError, IntentRequest, IntentRouter, SkillContext, SpeechResponse};
pub use router::route;

/// Collaborators shared by every directive invocation. Holds no per-request state.
#[derive(Clone)]
pub struct DirectiveContext {
    pub devices: Arc<dyn RemoteDeviceClient>,
    pub control_body: ControlBodyPolicy,
}

impl DirectiveContext {
    pub fn new(devices: Arc<dyn RemoteDeviceClient>) -> Self {
        Self {
            devices,
            control_body: ControlBodyPolicy::default(),
        }
    }

    pub fn with_control_body(mut self, policy: ControlBodyPolicy) -> Self {
        self.control_body = policy;
        self
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
