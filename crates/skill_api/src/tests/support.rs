use std::sync::Arc;

use async_trait::async_trait;
use device_client::{DeviceApiConfig, DownstreamError, HttpDeviceClient, RemoteDeviceClient, SwitchReply};
use serde_json::{json, Value};
use shared::{
    domain::{AccessToken, ApplianceId, SwitchAction},
    protocol::Directive,
};
use tokio::{net::TcpListener, sync::Mutex};

use crate::DirectiveContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FakeCall {
    List {
        token: String,
    },
    Switch {
        token: String,
        appliance_id: String,
        action: SwitchAction,
    },
    Toggle {
        token: String,
        device_name: String,
        action: String,
    },
}

/// Scripted outcome for every call a fake receives.
#[derive(Debug, Clone)]
pub(crate) enum FakeReply {
    Ok,
    Status(u16),
    Malformed,
    Rejected,
}

pub(crate) struct FakeDeviceClient {
    pub(crate) calls: Arc<Mutex<Vec<FakeCall>>>,
    pub(crate) reply: FakeReply,
    pub(crate) appliances: Vec<Value>,
    pub(crate) switch_body: String,
}

impl FakeDeviceClient {
    pub(crate) fn ok() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            reply: FakeReply::Ok,
            appliances: vec![json!({ "id": "a" }), json!({ "id": "b" })],
            switch_body: json!({ "state": "ok" }).to_string(),
        }
    }

    pub(crate) fn replying(reply: FakeReply) -> Self {
        Self {
            reply,
            ..Self::ok()
        }
    }

    pub(crate) fn with_switch_body(mut self, body: Value) -> Self {
        self.switch_body = body.to_string();
        self
    }

    fn failure(&self, endpoint: &str) -> Option<DownstreamError> {
        let endpoint = endpoint.to_string();
        match self.reply {
            FakeReply::Ok => None,
            FakeReply::Status(status) => Some(DownstreamError::Status {
                endpoint,
                status,
                body: String::new(),
            }),
            FakeReply::Malformed => Some(DownstreamError::MalformedBody {
                endpoint,
                reason: "expected a JSON array".into(),
            }),
            FakeReply::Rejected => Some(DownstreamError::Rejected {
                endpoint,
                body: json!({ "success": false }),
            }),
        }
    }
}

#[async_trait]
impl RemoteDeviceClient for FakeDeviceClient {
    async fn list_appliances(&self, token: &AccessToken) -> Result<Vec<Value>, DownstreamError> {
        self.calls.lock().await.push(FakeCall::List {
            token: token.as_str().to_string(),
        });
        match self.failure("/switches") {
            Some(err) => Err(err),
            None => Ok(self.appliances.clone()),
        }
    }

    async fn set_switch(
        &self,
        token: &AccessToken,
        appliance_id: &ApplianceId,
        action: SwitchAction,
    ) -> Result<SwitchReply, DownstreamError> {
        self.calls.lock().await.push(FakeCall::Switch {
            token: token.as_str().to_string(),
            appliance_id: appliance_id.as_str().to_string(),
            action,
        });
        match self.failure("/switches/id/action") {
            Some(err) => Err(err),
            None => Ok(SwitchReply {
                status: 200,
                body: self.switch_body.clone(),
            }),
        }
    }

    async fn toggle_by_name(
        &self,
        token: &str,
        device_name: &str,
        action: &str,
    ) -> Result<Value, DownstreamError> {
        self.calls.lock().await.push(FakeCall::Toggle {
            token: token.to_string(),
            device_name: device_name.to_string(),
            action: action.to_string(),
        });
        match self.failure("/switches") {
            Some(err) => Err(err),
            None => Ok(json!({ "success": true })),
        }
    }
}

pub(crate) fn context_with(fake: FakeDeviceClient) -> (DirectiveContext, Arc<Mutex<Vec<FakeCall>>>) {
    let calls = fake.calls.clone();
    (DirectiveContext::new(Arc::new(fake)), calls)
}

/// A real HTTP client aimed at a port nobody listens on.
pub(crate) async fn unreachable_context() -> DirectiveContext {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let client = HttpDeviceClient::new(DeviceApiConfig::new(format!("http://{addr}/api")))
        .expect("client");
    DirectiveContext::new(Arc::new(client))
}

pub(crate) fn directive(value: Value) -> Directive {
    serde_json::from_value(value).expect("directive")
}

pub(crate) fn control_directive(name: &str, token: &str, appliance_id: &str) -> Directive {
    directive(json!({
        "header": {
            "namespace": "Alexa.ConnectedHome.Control",
            "name": name,
            "payloadVersion": "2"
        },
        "payload": {
            "accessToken": token,
            "appliance": { "applianceId": appliance_id }
        }
    }))
}

pub(crate) fn discovery_directive(token: &str) -> Directive {
    directive(json!({
        "header": {
            "namespace": "Alexa.ConnectedHome.Discovery",
            "name": "DiscoverAppliancesRequest",
            "payloadVersion": "2"
        },
        "payload": { "accessToken": token }
    }))
}
