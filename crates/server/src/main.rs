use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use device_client::{DeviceApiConfig, HttpDeviceClient};
use serde_json::{json, Value};
use shared::protocol::{Directive, DirectiveError, DirectiveResponse};
use skill_api::{route, DirectiveContext, IntentError, IntentRequest, IntentRouter, SpeechResponse};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};

mod config;

use config::load_settings;

const MAX_DIRECTIVE_BYTES: usize = 64 * 1024;

#[derive(Clone)]
struct AppState {
    directives: DirectiveContext,
    intents: IntentRouter,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let devices = HttpDeviceClient::new(DeviceApiConfig {
        base_url: settings.device_api_base_url.clone(),
        switch_url: settings.switch_url.clone(),
        request_timeout: Some(settings.request_timeout()),
    })
    .map_err(|error| {
        error!(
            base_url = %settings.device_api_base_url,
            %error,
            "failed to configure device api client"
        );
        error
    })?;
    let devices = Arc::new(devices);

    let state = AppState {
        directives: DirectiveContext::new(devices.clone())
            .with_control_body(settings.control_body_policy()),
        intents: IntentRouter::with_default_intents(devices, settings.skill_context()),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(%addr, device_api = %settings.device_api_base_url, "bridge listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/directive", post(http_directive))
        .route("/intent", post(http_intent))
        .layer(RequestBodyLimitLayer::new(MAX_DIRECTIVE_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_directive(
    State(state): State<Arc<AppState>>,
    Json(directive): Json<Directive>,
) -> Result<Json<DirectiveResponse>, (StatusCode, Json<DirectiveError>)> {
    route(&state.directives, &directive)
        .await
        .map(Json)
        .map_err(|error| (StatusCode::BAD_REQUEST, Json(error)))
}

async fn http_intent(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IntentRequest>,
) -> Result<Json<SpeechResponse>, (StatusCode, Json<Value>)> {
    state.intents.dispatch(&request).await.map(Json).map_err(|e| {
        let status = match e {
            IntentError::UnknownIntent(_) => StatusCode::NOT_FOUND,
            IntentError::MissingSlot(_) | IntentError::MissingAccessToken => {
                StatusCode::BAD_REQUEST
            }
        };
        (status, Json(json!({ "error": e.to_string() })))
    })
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
