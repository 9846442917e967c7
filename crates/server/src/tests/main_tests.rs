use super::*;
use axum::{
    body::{self, Body},
    extract::{Path, Query},
    http::Request,
};
use std::collections::HashMap;
use tokio::{net::TcpListener, sync::Mutex};
use tower::ServiceExt;

type Seen = Arc<Mutex<Vec<String>>>;

async fn device_list(
    State(seen): State<Seen>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    seen.lock().await.push(format!(
        "/api/switches?access_token={}",
        query.get("access_token").cloned().unwrap_or_default()
    ));
    Json(json!([{ "applianceId": "42", "friendlyName": "Lamp" }]))
}

async fn device_switch(
    State(seen): State<Seen>,
    Path((id, action)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    seen.lock().await.push(format!(
        "/api/switches/{id}/{action}?access_token={}",
        query.get("access_token").cloned().unwrap_or_default()
    ));
    Json(json!({ "ok": true }))
}

async fn device_toggle(State(seen): State<Seen>) -> Json<Value> {
    seen.lock().await.push("/api/toggle".into());
    Json(json!({ "success": true }))
}

async fn spawn_device_api() -> (String, Seen) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/switches", get(device_list))
        .route("/api/switches/:id/:action", get(device_switch))
        .route("/api/toggle", get(device_toggle))
        .with_state(seen.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/api"), seen)
}

async fn test_app() -> (Router, Seen) {
    let (base_url, seen) = spawn_device_api().await;
    let devices = Arc::new(
        HttpDeviceClient::new(DeviceApiConfig {
            switch_url: Some(format!("{base_url}/toggle")),
            ..DeviceApiConfig::new(base_url)
        })
        .expect("client"),
    );
    let state = AppState {
        directives: DirectiveContext::new(devices.clone()),
        intents: IntentRouter::with_default_intents(devices, Default::default()),
    };
    (build_router(Arc::new(state)), seen)
}

async fn post_json(app: Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).expect("json"))
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (app, _seen) = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn discovery_directive_round_trips_through_device_api() {
    let (app, seen) = test_app().await;

    let (status, body) = post_json(
        app,
        "/directive",
        json!({
            "header": {
                "namespace": "Alexa.ConnectedHome.Discovery",
                "name": "DiscoverAppliancesRequest",
                "payloadVersion": "2"
            },
            "payload": { "accessToken": " tok " }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["header"]["name"], "DiscoverAppliancesResponse");
    assert_eq!(
        body["payload"]["discoveredAppliances"],
        json!([{ "applianceId": "42", "friendlyName": "Lamp" }])
    );
    assert_eq!(*seen.lock().await, vec!["/api/switches?access_token=tok".to_string()]);
}

#[tokio::test]
async fn control_directive_hits_switch_endpoint() {
    let (app, seen) = test_app().await;

    let (status, body) = post_json(
        app,
        "/directive",
        json!({
            "header": {
                "namespace": "Alexa.ConnectedHome.Control",
                "name": "TurnOnRequest",
                "payloadVersion": "2"
            },
            "payload": { "accessToken": "tok ", "appliance": { "applianceId": "42" } }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "header": {
                "namespace": "Alexa.ConnectedHome.Control",
                "name": "TurnOnConfirmation",
                "payloadVersion": "1"
            },
            "payload": { "success": true }
        })
    );
    assert_eq!(
        *seen.lock().await,
        vec!["/api/switches/42/on?access_token=tok".to_string()]
    );
}

#[tokio::test]
async fn unknown_namespace_returns_structured_error() {
    let (app, seen) = test_app().await;

    let (status, body) = post_json(
        app,
        "/directive",
        json!({
            "header": { "namespace": "Alexa.ConnectedHome.System", "name": "HealthCheckRequest" },
            "payload": {}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["payload"]["exception"]["code"], "UNSUPPORTED_OPERATION");
    assert!(seen.lock().await.is_empty());
}

#[tokio::test]
async fn toggle_intent_speaks_ok() {
    let (app, seen) = test_app().await;

    let (status, body) = post_json(
        app,
        "/intent",
        json!({
            "intent": {
                "name": "ToggleSwitchIntent",
                "slots": { "DeviceName": { "value": "lamp" }, "Action": { "value": "on" } }
            },
            "session": { "user": { "accessToken": "tok" } }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "OK");
    assert_eq!(body["shouldEndSession"], true);
    assert_eq!(*seen.lock().await, vec!["/api/toggle".to_string()]);
}

#[tokio::test]
async fn unknown_intent_is_not_found() {
    let (app, _seen) = test_app().await;

    let (status, body) = post_json(
        app,
        "/intent",
        json!({ "intent": { "name": "OrderPizzaIntent" } }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]
        .as_str()
        .expect("error text")
        .contains("OrderPizzaIntent"));
}

#[tokio::test]
async fn oversized_directive_is_rejected() {
    let (app, seen) = test_app().await;
    let request = Request::post("/directive")
        .header("content-type", "application/json")
        .header("content-length", MAX_DIRECTIVE_BYTES + 1)
        .body(Body::from(vec![b' '; MAX_DIRECTIVE_BYTES + 1]))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(seen.lock().await.is_empty());
}
