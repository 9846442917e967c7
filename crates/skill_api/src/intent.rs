//! Voice intent handling for the conversational skill.
//!
//! Handlers are registered by intent name on an [`IntentRouter`], and every
//! invocation receives the router's [`SkillContext`] explicitly.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use device_client::RemoteDeviceClient;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const TOGGLE_SWITCH_INTENT: &str = "ToggleSwitchIntent";
pub const HELP_INTENT: &str = "AMAZON.HelpIntent";
pub const CANCEL_INTENT: &str = "AMAZON.CancelIntent";
pub const STOP_INTENT: &str = "AMAZON.StopIntent";

const HELP_TEXT: &str =
    "You can ask me to turn a device on or off, for example, turn on the kitchen light.";
const HELP_PROMPT: &str = "How can I help?";
const GOODBYE_HINT: &str =
    "Okay. Whenever you're ready, you can ask me to turn your lights on and off.";
const TROUBLE_TEXT: &str = "Hmm, I'm having trouble reaching your switches right now.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillContext {
    pub need_more_help: bool,
}

impl Default for SkillContext {
    fn default() -> Self {
        Self {
            need_more_help: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Slot {
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

impl Intent {
    pub fn slot_value(&self, slot: &str) -> Option<&str> {
        self.slots
            .get(slot)
            .and_then(|slot| slot.value.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Session {
    #[serde(default)]
    pub user: SessionUser,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntentRequest {
    pub intent: Intent,
    #[serde(default)]
    pub session: Session,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechResponse {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<String>,
    pub should_end_session: bool,
}

impl SpeechResponse {
    /// Speaks and ends the session.
    pub fn tell(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reprompt: None,
            should_end_session: true,
        }
    }

    /// Speaks and keeps the session open for an answer.
    pub fn ask(text: impl Into<String>, reprompt: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reprompt: Some(reprompt.into()),
            should_end_session: false,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntentError {
    #[error("no handler registered for intent '{0}'")]
    UnknownIntent(String),
    #[error("intent is missing slot '{0}'")]
    MissingSlot(&'static str),
    #[error("session has no access token")]
    MissingAccessToken,
}

#[async_trait]
pub trait IntentHandler: Send + Sync {
    async fn handle(
        &self,
        request: &IntentRequest,
        context: &SkillContext,
    ) -> Result<SpeechResponse, IntentError>;
}

pub struct ToggleSwitch {
    devices: Arc<dyn RemoteDeviceClient>,
}

impl ToggleSwitch {
    pub fn new(devices: Arc<dyn RemoteDeviceClient>) -> Self {
        Self { devices }
    }
}

#[async_trait]
impl IntentHandler for ToggleSwitch {
    async fn handle(
        &self,
        request: &IntentRequest,
        _context: &SkillContext,
    ) -> Result<SpeechResponse, IntentError> {
        let intent = &request.intent;
        let device_name = intent
            .slot_value("DeviceName")
            .ok_or(IntentError::MissingSlot("DeviceName"))?;
        let action = intent
            .slot_value("Action")
            .ok_or(IntentError::MissingSlot("Action"))?;
        let token = request
            .session
            .user
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(IntentError::MissingAccessToken)?;

        match self.devices.toggle_by_name(token, device_name, action).await {
            Ok(_) => {
                info!(device_name, action, "intent: switch toggled");
                Ok(SpeechResponse::tell("OK"))
            }
            Err(error) => {
                warn!(device_name, action, %error, "intent: switch toggle failed");
                Ok(SpeechResponse::tell(TROUBLE_TEXT))
            }
        }
    }
}

pub struct Help;

#[async_trait]
impl IntentHandler for Help {
    async fn handle(
        &self,
        _request: &IntentRequest,
        context: &SkillContext,
    ) -> Result<SpeechResponse, IntentError> {
        if context.need_more_help {
            Ok(SpeechResponse::ask(
                format!("{HELP_TEXT} So, how can I help?"),
                HELP_PROMPT,
            ))
        } else {
            Ok(SpeechResponse::tell(HELP_TEXT))
        }
    }
}

/// Shared by cancel and stop.
pub struct Dismiss;

#[async_trait]
impl IntentHandler for Dismiss {
    async fn handle(
        &self,
        _request: &IntentRequest,
        context: &SkillContext,
    ) -> Result<SpeechResponse, IntentError> {
        if context.need_more_help {
            Ok(SpeechResponse::tell(GOODBYE_HINT))
        } else {
            Ok(SpeechResponse::tell(""))
        }
    }
}

#[derive(Clone)]
pub struct IntentRouter {
    handlers: HashMap<String, Arc<dyn IntentHandler>>,
    context: SkillContext,
}

impl IntentRouter {
    pub fn new(handlers: HashMap<String, Arc<dyn IntentHandler>>, context: SkillContext) -> Self {
        Self { handlers, context }
    }

    pub fn with_default_intents(devices: Arc<dyn RemoteDeviceClient>, context: SkillContext) -> Self {
        let dismiss: Arc<dyn IntentHandler> = Arc::new(Dismiss);
        let mut handlers: HashMap<String, Arc<dyn IntentHandler>> = HashMap::new();
        handlers.insert(
            TOGGLE_SWITCH_INTENT.to_string(),
            Arc::new(ToggleSwitch::new(devices)),
        );
        handlers.insert(HELP_INTENT.to_string(), Arc::new(Help));
        handlers.insert(CANCEL_INTENT.to_string(), dismiss.clone());
        handlers.insert(STOP_INTENT.to_string(), dismiss);
        Self::new(handlers, context)
    }

    pub async fn dispatch(&self, request: &IntentRequest) -> Result<SpeechResponse, IntentError> {
        let name = request.intent.name.as_str();
        let Some(handler) = self.handlers.get(name) else {
            warn!(intent = name, "intent: no handler registered");
            return Err(IntentError::UnknownIntent(name.to_string()));
        };
        info!(intent = name, "intent received");
        handler.handle(request, &self.context).await
    }
}

#[cfg(test)]
#[path = "tests/intent_tests.rs"]
mod tests;
