use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::util::ServiceExt;

use bandwidth_extra::client::PhoneType;
use bandwidth_extra::client::memory::ApiOperation;
use bandwidth_extra::handlers::callbacks;
use bandwidth_extra::middleware::Provisioner;
use bandwidth_extra::provision::{CALL_CALLBACK_PATH, MESSAGE_CALLBACK_PATH};
use bandwidth_extra::{InMemoryBandwidthApi, ServerConfig, routes, state::AppState};

fn test_config(sip_enabled: bool) -> ServerConfig {
    ServerConfig {
        host: "0.0.0.0".to_string(),
        port: 3001,
        bandwidth_user_id: "u-test".to_string(),
        bandwidth_api_token: "t-test".to_string(),
        bandwidth_api_secret: "secret".to_string(),
        bandwidth_api_url: "http://localhost:9".to_string(),
        bandwidth_timeout_seconds: 5,
        app_name: "Demo".to_string(),
        use_https: false,
        phone_number_name: Some("main".to_string()),
        phone_type: PhoneType::Local,
        area_code: Some("910".to_string()),
        sip_enabled,
        sip_domain: None,
        cache_path: None,
        cache_ttl_seconds: Some(3600),
    }
}

async fn test_app(config: ServerConfig, api: &Arc<InMemoryBandwidthApi>) -> axum::Router {
    let options = config
        .provisioning_options()
        .with_message_callback(callbacks::message_callback())
        .with_call_callback(callbacks::call_callback());
    let provisioner = Provisioner::with_api(options, api.clone()).await.unwrap();
    let state = AppState::with_provisioner(config, Arc::new(provisioner));
    routes::create_app(state)
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let api = Arc::new(InMemoryBandwidthApi::new());
    let app = test_app(test_config(false), &api).await;

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "OK");

    // The public route does not provision anything
    assert_eq!(api.call_count(ApiOperation::ListApplications), 0);
}

#[tokio::test]
async fn test_provisioning_info() {
    let api = Arc::new(InMemoryBandwidthApi::new());
    let app = test_app(test_config(false), &api).await;

    let request = Request::builder()
        .uri("/provisioning")
        .header("host", "demo.example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert!(json["applicationId"].is_string());
    assert!(json["phoneNumber"].as_str().unwrap().starts_with("+1910"));
    assert!(json.get("domainId").is_none());

    let applications = api.applications();
    assert_eq!(applications.len(), 1);
    assert_eq!(applications[0].name, "Demo on demo.example.com");
    assert_eq!(
        applications[0].incoming_call_url.as_deref(),
        Some("http://demo.example.com/bandwidth/callback/call")
    );
}

#[tokio::test]
async fn test_create_sip_account() {
    let api = Arc::new(InMemoryBandwidthApi::new());
    let app = test_app(test_config(true), &api).await;

    let request = Request::builder()
        .method("POST")
        .uri("/sip/accounts")
        .header("host", "demo.example.com")
        .header("content-type", "application/json")
        .body(Body::from(json!({"userName": "Alice"}).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let created = json_body(response).await;
    assert_eq!(created["name"], "alice");
    assert_eq!(created["enabled"], true);

    // Same user again returns the existing endpoint
    let request = Request::builder()
        .method("POST")
        .uri("/sip/accounts")
        .header("host", "demo.example.com")
        .header("content-type", "application/json")
        .body(Body::from(json!({"userName": "alice"}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["id"], created["id"]);

    assert_eq!(api.call_count(ApiOperation::CreateEndpoint), 1);
}

#[tokio::test]
async fn test_create_sip_account_without_sip() {
    let api = Arc::new(InMemoryBandwidthApi::new());
    let app = test_app(test_config(false), &api).await;

    let request = Request::builder()
        .method("POST")
        .uri("/sip/accounts")
        .header("host", "demo.example.com")
        .header("content-type", "application/json")
        .body(Body::from(json!({"userName": "alice"}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_sip_account_requires_user_name() {
    let api = Arc::new(InMemoryBandwidthApi::new());
    let app = test_app(test_config(true), &api).await;

    let request = Request::builder()
        .method("POST")
        .uri("/sip/accounts")
        .header("host", "demo.example.com")
        .header("content-type", "application/json")
        .body(Body::from(json!({"userName": "  "}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callbacks_are_acknowledged() {
    let api = Arc::new(InMemoryBandwidthApi::new());
    let app = test_app(test_config(false), &api).await;

    for (path, event_type) in [
        (MESSAGE_CALLBACK_PATH, "sms"),
        (CALL_CALLBACK_PATH, "answer"),
        // Not in the call handler map, still acknowledged
        (CALL_CALLBACK_PATH, "gather"),
    ] {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("host", "demo.example.com")
            .header("content-type", "application/json")
            .body(Body::from(json!({"eventType": event_type}).to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{path} {event_type}");
    }

    assert_eq!(api.call_count(ApiOperation::CreateApplication), 1);
}
