//! Tests for the HTTP boundary.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use tower::ServiceExt;

use super::{AppState, router};
use crate::auth::{Authenticator, Claims};
use crate::model::ContentType;
use crate::reconcile::testing::{MockRemote, remote_image};
use crate::reconcile::{PatchOrdering, ReconcileEngine};
use crate::store::MetadataStore;

const SECRET: &[u8] = b"test-secret";
const PUBLIC_BASE: &str = "https://images.example.com/public";

fn app(remote: MockRemote) -> (Router, MetadataStore) {
    let store = MetadataStore::memory();
    let engine = ReconcileEngine::new(
        Arc::new(remote),
        store.clone(),
        PUBLIC_BASE,
        PatchOrdering::AfterConfirm,
    );
    let state = AppState {
        engine,
        auth: Arc::new(Authenticator::hs256(SECRET)),
    };
    (router(state), store)
}

fn token() -> String {
    let claims = Claims {
        sub: "user-1".to_string(),
        exp: 4_102_444_800, // 2100-01-01
        email: None,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap()
}

fn request(method: &str, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token()));
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        },
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn create_body() -> serde_json::Value {
    serde_json::json!({
        "data": "aGVsbG8=",
        "contentType": "image/png",
        "description": "sunset",
        "location": "pier",
    })
}

#[tokio::test]
async fn test_health_needs_no_auth() {
    let (app, _store) = app(MockRemote::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (app, _store) = app(MockRemote::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/images")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["status_code"], 401);
    assert_eq!(body["message"], "Access token invalid or not provided.");
}

#[tokio::test]
async fn test_wrong_scheme_is_unauthorized() {
    let (app, _store) = app(MockRemote::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/images")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forged_token_is_unauthorized() {
    let (app, _store) = app(MockRemote::default());

    let forged = encode(
        &Header::new(Algorithm::HS256),
        &Claims {
            sub: "intruder".to_string(),
            exp: 4_102_444_800,
            email: None,
        },
        &EncodingKey::from_secret(b"wrong-secret"),
    )
    .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/images")
                .header(header::AUTHORIZATION, format!("Bearer {forged}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_returns_synced_records() {
    let remote = MockRemote::with_images(vec![remote_image("a1", "sunset", "pier")]);
    let (app, _store) = app(remote);

    let response = app.oneshot(request("GET", "/images", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], "a1");
    assert_eq!(body[0]["description"], "sunset");
}

#[tokio::test]
async fn test_create_returns_created_record() {
    let (app, store) = app(MockRemote::default());

    let response = app
        .oneshot(request("POST", "/images", Some(create_body())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["id"], "generated-1");
    assert_eq!(body["description"], "sunset");
    assert_eq!(body["contentType"], "image/png");

    assert!(store.find_by_id("generated-1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_create_missing_fields_is_bad_request() {
    let (app, store) = app(MockRemote::default());

    let mut body = create_body();
    body.as_object_mut().unwrap().remove("location");

    let response = app
        .oneshot(request("POST", "/images", Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["status_code"], 400);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("The request cannot or will not be processed")
    );
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_malformed_json_is_bad_request() {
    let (app, _store) = app(MockRemote::default());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/images")
                .header(header::AUTHORIZATION, format!("Bearer {}", token()))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_unknown_content_type_is_bad_request() {
    let (app, _store) = app(MockRemote::default());

    let mut body = create_body();
    body["contentType"] = serde_json::json!("image/tiff");

    let response = app
        .oneshot(request("POST", "/images", Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_merges_remote_view() {
    let remote = MockRemote::with_images(vec![remote_image("abc123", "sunset", "pier")]);
    let (app, _store) = app(remote);

    let response = app
        .oneshot(request("GET", "/images/abc123", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["id"], "abc123");
    assert_eq!(body["imageUrl"], format!("{PUBLIC_BASE}/abc123"));
    assert_eq!(body["description"], "sunset");
    assert_eq!(body["location"], "pier");
}

#[tokio::test]
async fn test_get_unknown_id_is_not_found() {
    let (app, _store) = app(MockRemote::default());

    let response = app
        .oneshot(request("GET", "/images/ghost", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["message"], "The requested resource was not found.");
}

#[tokio::test]
async fn test_put_returns_replacement_record() {
    let (app, _store) = app(MockRemote::default());

    let response = app
        .oneshot(request("PUT", "/images/a1", Some(create_body())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["id"], "a1");
    assert_eq!(body["description"], "sunset");
}

#[tokio::test]
async fn test_patch_returns_no_content() {
    let remote = MockRemote::with_images(vec![remote_image("a1", "sunset", "pier")]);
    let (app, store) = app(remote);

    // Seed the mirror through the list sync.
    app.clone()
        .oneshot(request("GET", "/images", None))
        .await
        .unwrap();

    let response = app
        .oneshot(request(
            "PATCH",
            "/images/a1",
            Some(serde_json::json!({
                "description": "patched",
                "contentType": "image/gif",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let patched = store.find_by_id("a1").await.unwrap().unwrap();
    assert_eq!(patched.description, "patched");
    assert_eq!(patched.content_type, Some(ContentType::Gif));
}

#[tokio::test]
async fn test_patch_without_description_is_bad_request() {
    let remote = MockRemote::with_images(vec![remote_image("a1", "sunset", "pier")]);
    let (app, _store) = app(remote);

    app.clone()
        .oneshot(request("GET", "/images", None))
        .await
        .unwrap();

    let response = app
        .oneshot(request(
            "PATCH",
            "/images/a1",
            Some(serde_json::json!({ "contentType": "image/gif" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_then_delete_again() {
    let remote = MockRemote::with_images(vec![remote_image("a1", "sunset", "pier")]);
    let (app, store) = app(remote);

    app.clone()
        .oneshot(request("GET", "/images", None))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request("DELETE", "/images/a1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(store.find_by_id("a1").await.unwrap().is_none());

    let response = app
        .oneshot(request("DELETE", "/images/a1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remote_error_passes_through_status_and_message() {
    use crate::reconcile::testing::Failure;

    let remote = MockRemote {
        create_failure: Some(Failure::Remote(507, "insufficient storage")),
        ..MockRemote::default()
    };
    let (app, _store) = app(remote);

    let response = app
        .oneshot(request("POST", "/images", Some(create_body())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INSUFFICIENT_STORAGE);

    let body = body_json(response).await;
    assert_eq!(body["status_code"], 507);
    assert_eq!(body["message"], "insufficient storage");
}
