//! Drives the admin router and the gate router as two separate "services"
//! sharing one in-memory bucket, the way the real deployments share one
//! object store.

use dropgate_memory::MemoryStore;
use dropgate_server::auth::StaticTokenAuth;
use dropgate_server::{AdminServer, AdminServerConfig, GateServer};

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

const ADMIN_TOKEN: &str = "test-admin-secret";

fn services() -> (Router, Router) {
    let bucket = MemoryStore::new();
    let admin = AdminServer::new(AdminServerConfig {
        public_base_url: "http://gate.test".to_string(),
    })
    .build(bucket.clone(), StaticTokenAuth::new(ADMIN_TOKEN, "ops"));
    let gate = GateServer.build(bucket);
    (admin, gate)
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Vec<u8>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let response = router
        .clone()
        .oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn upload(admin: &Router, file_name: &str, password_query: &str) -> Value {
    let uri = format!("/assets?fileName={file_name}&folder=shared&password={password_query}");
    let (status, body) = send(
        admin,
        Method::POST,
        &uri,
        Some(ADMIN_TOKEN),
        b"payload bytes".to_vec(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn upload_then_download_round_trip() {
    let (admin, gate) = services();

    let created = upload(&admin, "report.pdf", "Abcdefg1%21").await;
    let asset_id = created["locator"]["assetId"].as_str().unwrap();
    assert_eq!(created["locator"]["token"], "Abcdefg1!");
    assert_eq!(
        created["downloadUrl"].as_str().unwrap(),
        format!("http://gate.test/d/{asset_id}?token=Abcdefg1%21")
    );
    assert_eq!(created["asset"]["cosObjectKey"], "shared/report.pdf");

    let uri = format!("/d/{asset_id}?token=Abcdefg1%21");
    let response = gate
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri(&uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"report.pdf\""
    );
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    assert_eq!(&body[..], b"payload bytes");
}

#[tokio::test]
async fn mock_auth_admits_everything() {
    let admin = AdminServer::default().build(MemoryStore::new(), dropgate_auth_mock::AllowAllAuth);

    let (status, _) = send(&admin, Method::GET, "/assets", None, Vec::new()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_requests_require_the_bearer_token() {
    let (admin, _) = services();

    let (status, _) = send(&admin, Method::GET, "/assets", None, Vec::new()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&admin, Method::GET, "/assets", Some("wrong"), Vec::new()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn weak_password_is_rejected_with_a_structured_error() {
    let (admin, _) = services();

    let (status, body) = send(
        &admin,
        Method::POST,
        "/assets?fileName=a.pdf&password=alllower1%21",
        Some(ADMIN_TOKEN),
        b"x".to_vec(),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(String::from_utf8(body).unwrap().contains("uppercase"));
}

#[tokio::test]
async fn missing_password_param_is_a_bad_request() {
    let (admin, _) = services();

    let (status, _) = send(
        &admin,
        Method::POST,
        "/assets?fileName=a.pdf",
        Some(ADMIN_TOKEN),
        b"x".to_vec(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_never_exposes_tokens() {
    let (admin, _) = services();
    upload(&admin, "a.pdf", "Abcdefg1%21").await;

    let (status, body) = send(&admin, Method::GET, "/assets", Some(ADMIN_TOKEN), Vec::new()).await;
    assert_eq!(status, StatusCode::OK);

    let listed: Value = serde_json::from_slice(&body).unwrap();
    let entries = listed.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["fileName"], "a.pdf");
    assert!(entries[0].get("password").is_none());
    assert!(entries[0].get("token").is_none());
}

#[tokio::test]
async fn object_listing_includes_the_catalog_document() {
    let (admin, _) = services();
    upload(&admin, "a.pdf", "Abcdefg1%21").await;

    let (status, body) = send(
        &admin,
        Method::GET,
        "/objects?prefix=",
        Some(ADMIN_TOKEN),
        Vec::new(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let listed: Value = serde_json::from_slice(&body).unwrap();
    let keys: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["key"].as_str().unwrap())
        .collect();
    assert!(keys.contains(&"catalog.json"));
    assert!(keys.contains(&"shared/a.pdf"));
}

#[tokio::test]
async fn revoked_assets_stop_resolving() {
    let (admin, gate) = services();

    let created = upload(&admin, "a.pdf", "Abcdefg1%21").await;
    let asset_id = created["locator"]["assetId"].as_str().unwrap().to_string();

    let (status, _) = send(
        &admin,
        Method::DELETE,
        &format!("/assets/{asset_id}"),
        Some(ADMIN_TOKEN),
        Vec::new(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Second revoke: the asset is gone and the catalog stays unchanged.
    let (status, _) = send(
        &admin,
        Method::DELETE,
        &format!("/assets/{asset_id}"),
        Some(ADMIN_TOKEN),
        Vec::new(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &gate,
        Method::GET,
        &format!("/d/{asset_id}?token=Abcdefg1%21"),
        None,
        Vec::new(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn gate_statuses_distinguish_the_failure_modes() {
    let (admin, gate) = services();

    // No catalog document yet: unavailable, not "not found".
    let (status, _) = send(&gate, Method::GET, "/d/some-id?token=x", None, Vec::new()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let created = upload(&admin, "a.pdf", "Abcdefg1%21").await;
    let asset_id = created["locator"]["assetId"].as_str().unwrap().to_string();

    // Missing token.
    let (status, _) = send(
        &gate,
        Method::GET,
        &format!("/d/{asset_id}"),
        None,
        Vec::new(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Wrong token.
    let (status, _) = send(
        &gate,
        Method::GET,
        &format!("/d/{asset_id}?token=Wrong1%21"),
        None,
        Vec::new(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Unknown id.
    let (status, _) = send(
        &gate,
        Method::GET,
        "/d/unknown-id?token=Abcdefg1%21",
        None,
        Vec::new(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
