// Testes end-to-end das rotas HubSpot com cache em memória e HubSpot simulado

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use httpmock::prelude::*;
use serde_json::{json, Value};
use tower::ServiceExt;

use hubspot_integration_middleware::cache::{MemoryStore, SharedStore};
use hubspot_integration_middleware::config::{
    CacheBackend, CacheSettings, HubSpotSettings, ServerSettings, Settings,
};
use hubspot_integration_middleware::{app, AppState};

fn settings_for(server: &MockServer) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        hubspot: HubSpotSettings {
            client_id: "client-123".to_string(),
            client_secret: "shh".to_string(),
            redirect_uri: "http://localhost:8000/integrations/hubspot/oauth2callback".to_string(),
            scope: "crm.objects.contacts.read".to_string(),
            authorization_url: "https://app.hubspot.com/oauth/authorize".to_string(),
            token_url: server.url("/oauth/v1/token"),
            api_base_url: server.base_url(),
            object_type: "contacts".to_string(),
            item_type: "Contact".to_string(),
            request_timeout_secs: 5,
            state_ttl_secs: 600,
            credentials_ttl_secs: 600,
        },
        cache: CacheSettings {
            backend: CacheBackend::Memory,
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
        },
    }
}

fn router_for(server: &MockServer) -> Router {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let state = tokio_test::assert_ok!(AppState::new(&settings_for(server), store));
    app(Arc::new(state))
}

fn form(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn stage(router: &Router) -> String {
    let (status, body) = send(router, get("/integrations/hubspot/status?user_id=u1&org_id=o1")).await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    value["stage"].as_str().unwrap().to_string()
}

/// Pede a URL de autorização e devolve o state já pronto para a query do callback
async fn start_authorization(router: &Router) -> String {
    let (status, body) = send(
        router,
        form("/integrations/hubspot/authorize", "user_id=u1&org_id=o1".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let url: String = serde_json::from_str(&body).unwrap();
    assert!(url.starts_with("https://app.hubspot.com/oauth/authorize?client_id=client-123"));
    url.split("state=").nth(1).unwrap().to_string()
}

#[tokio::test]
async fn test_full_authorization_flow() {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/v1/token").body_contains("code=auth-code");
            then.status(200).json_body(json!({
                "access_token": "at-1",
                "refresh_token": "rt-1",
                "token_type": "bearer",
                "expires_in": 1800
            }));
        })
        .await;
    let objects_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/crm/v3/objects/contacts")
                .header("Authorization", "Bearer at-1");
            then.status(200).json_body(json!({
                "results": [
                    {
                        "id": "101",
                        "properties": { "name": "Acme" },
                        "createdAt": "2024-01-10T12:00:00.000Z",
                        "updatedAt": "2024-02-01T08:30:00.000Z"
                    },
                    { "id": "102", "properties": {} }
                ]
            }));
        })
        .await;

    let router = router_for(&server);
    assert_eq!(stage(&router).await, "idle");

    let state = start_authorization(&router).await;
    assert_eq!(stage(&router).await, "awaiting_callback");

    let (status, body) = send(
        &router,
        get(&format!("/integrations/hubspot/oauth2callback?code=auth-code&state={}", state)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("window.close()"));
    token_mock.assert_async().await;
    assert_eq!(stage(&router).await, "exchanged");

    let (status, body) = send(
        &router,
        form("/integrations/hubspot/credentials", "user_id=u1&org_id=o1".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let credentials: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(credentials["access_token"], "at-1");
    assert_eq!(credentials["refresh_token"], "rt-1");

    // uso único
    let (status, body) = send(
        &router,
        form("/integrations/hubspot/credentials", "user_id=u1&org_id=o1".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "no_credentials");
    assert_eq!(stage(&router).await, "idle");

    let encoded = urlencoding::encode(&credentials.to_string()).into_owned();
    let (status, body) = send(
        &router,
        form("/integrations/hubspot/load", format!("credentials={}", encoded)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    objects_mock.assert_async().await;

    let items: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        items,
        json!([
            {
                "id": "101",
                "name": "Acme",
                "type": "Contact",
                "creation_time": "2024-01-10T12:00:00.000Z",
                "last_modified_time": "2024-02-01T08:30:00.000Z"
            },
            {
                "id": "102",
                "name": "No Name",
                "type": "Contact",
                "creation_time": "N/A",
                "last_modified_time": "N/A"
            }
        ])
    );
}

#[tokio::test]
async fn test_replayed_callback_is_rejected() {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/v1/token");
            then.status(200).json_body(json!({ "access_token": "at-1" }));
        })
        .await;

    let router = router_for(&server);
    let state = start_authorization(&router).await;
    let uri = format!("/integrations/hubspot/oauth2callback?code=auth-code&state={}", state);

    let (status, _) = send(&router, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&router, get(&uri)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "state_mismatch");

    token_mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_callback_without_code_is_bad_request() {
    let server = MockServer::start_async().await;
    let router = router_for(&server);
    let state = start_authorization(&router).await;

    let (status, body) = send(
        &router,
        get(&format!("/integrations/hubspot/oauth2callback?state={}", state)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "missing_parameter");

    // state continua pendente
    assert_eq!(stage(&router).await, "awaiting_callback");
}

#[tokio::test]
async fn test_denied_authorization_renders_error_page() {
    let server = MockServer::start_async().await;
    let router = router_for(&server);

    let (status, body) = send(
        &router,
        get("/integrations/hubspot/oauth2callback?error=access_denied&error_description=%3Cscript%3E"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("access_denied"));
    assert!(!body.contains("<script>"));
}

#[tokio::test]
async fn test_failed_token_exchange_is_bad_gateway() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/v1/token");
            then.status(400).json_body(json!({ "status": "BAD_AUTH_CODE" }));
        })
        .await;

    let router = router_for(&server);
    let state = start_authorization(&router).await;

    let (status, body) = send(
        &router,
        get(&format!("/integrations/hubspot/oauth2callback?code=bad&state={}", state)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "token_exchange_failed");
    assert_eq!(stage(&router).await, "idle");
}

#[tokio::test]
async fn test_authorize_requires_ids() {
    let server = MockServer::start_async().await;
    let router = router_for(&server);

    let (status, body) = send(
        &router,
        form("/integrations/hubspot/authorize", "user_id=u1".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "missing_parameter");
}

#[tokio::test]
async fn test_load_rejects_empty_credentials() {
    let server = MockServer::start_async().await;
    let router = router_for(&server);

    let (status, body) = send(&router, form("/integrations/hubspot/load", "credentials=".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "validation_error");
}

#[tokio::test]
async fn test_health_and_ready() {
    let server = MockServer::start_async().await;
    let router = router_for(&server);

    let (status, _) = send(&router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&router, get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["dependencies"]["cache"]["backend"], "memory");
    assert_eq!(value["dependencies"]["cache"]["status"], "connected");
}

#[tokio::test]
async fn test_ids_reach_every_route_unchanged() {
    let server = MockServer::start_async().await;
    let router = router_for(&server);

    let (status, _) = send(
        &router,
        form("/integrations/hubspot/authorize", "user_id=%20u1&org_id=o1".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&router, get("/integrations/hubspot/status?user_id=%20u1&org_id=o1")).await;
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["stage"], "awaiting_callback");
    assert_eq!(stage(&router).await, "idle");

    let (status, body) = send(
        &router,
        form("/integrations/hubspot/credentials", "user_id=&org_id=o1".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "missing_parameter");

    let (status, body) = send(
        &router,
        form("/integrations/hubspot/authorize", "user_id=b%3Ac&org_id=a".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "invalid_parameter");
}
