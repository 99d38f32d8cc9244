use async_trait::async_trait;
use atelier::api::{
    self, AVAILABLE_ROUTES, INTERNAL_MESSAGE, MALFORMED_BODY_MESSAGE, NOT_FOUND_MESSAGE,
    PERSISTENCE_MESSAGE, SUCCESS_MESSAGE, VALIDATION_MESSAGE,
};
use atelier::config::{Config, Environment};
use atelier::db::{InquiryStore, Store};
use atelier::domain::InquiryId;
use atelier::models::inquiry::NewInquiry;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

/// Store whose writes and pings always fail.
struct UnavailableStore;

#[async_trait]
impl InquiryStore for UnavailableStore {
    async fn insert_inquiry(&self, _inquiry: NewInquiry) -> anyhow::Result<InquiryId> {
        anyhow::bail!("connection refused")
    }

    async fn ping(&self) -> anyhow::Result<()> {
        anyhow::bail!("connection refused")
    }
}

async fn temp_store() -> Arc<Store> {
    let db_path =
        std::env::temp_dir().join(format!("atelier-api-test-{}.db", uuid::Uuid::new_v4()));
    Arc::new(
        Store::new(&format!("sqlite:{}", db_path.display()))
            .await
            .expect("failed to open temp store"),
    )
}

fn config_for(environment: Environment) -> Config {
    let mut config = Config::default();
    config.server.environment = environment;
    config
}

fn app_with(config: Config, store: Arc<dyn InquiryStore>) -> Router {
    let state = api::create_app_state(config, store);
    api::router(state).expect("failed to build router")
}

async fn spawn_app() -> (Router, Arc<Store>) {
    let store = temp_store().await;
    let app = app_with(config_for(Environment::Production), store.clone());
    (app, store)
}

fn post_contact(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_submit_returns_success_message_and_id() {
    let (app, store) = spawn_app().await;

    let response = app
        .oneshot(post_contact(&json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "",
            "message": "Hello"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let logged_id = response.extensions().get::<InquiryId>().cloned().unwrap();

    let body = read_json(response).await;
    assert_eq!(body["message"], SUCCESS_MESSAGE);
    let id = body["id"].as_str().unwrap();
    assert!(!id.is_empty());
    assert_eq!(logged_id.as_str(), id);

    assert_eq!(store.count_inquiries().await.unwrap(), 1);
    let stored = store.get_inquiry(id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Jane Doe");
    assert_eq!(stored.phone, "");
}

#[tokio::test]
async fn test_submit_stores_trimmed_values() {
    let (app, store) = spawn_app().await;

    let response = app
        .oneshot(post_contact(&json!({
            "name": "  Ada Lovelace\t",
            "email": " ada@example.com ",
            "phone": " +44 20 7946 0000 ",
            "message": "\n I'd like a quote for a loft conversion. \n"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let stored = store
        .get_inquiry(body["id"].as_str().unwrap())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(stored.name, "Ada Lovelace");
    assert_eq!(stored.email, "ada@example.com");
    assert_eq!(stored.phone, "+44 20 7946 0000");
    assert_eq!(stored.message, "I'd like a quote for a loft conversion.");
}

#[tokio::test]
async fn test_missing_required_fields_are_rejected_without_writes() {
    let (app, store) = spawn_app().await;

    let cases = [
        (json!({"name": "", "email": "a@b.com", "message": "hi"}), vec!["name"]),
        (json!({"name": "Jane", "message": "hi"}), vec!["email"]),
        (json!({"name": "Jane", "email": "a@b.com", "message": "   "}), vec!["message"]),
        (json!({"phone": "555-0100"}), vec!["name", "email", "message"]),
        (json!({"name": null, "email": "a@b.com", "message": "hi"}), vec!["name"]),
    ];

    for (payload, missing) in cases {
        let response = app.clone().oneshot(post_contact(&payload)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "payload: {payload}");

        let body = read_json(response).await;
        assert_eq!(body["message"], VALIDATION_MESSAGE);
        assert_eq!(body["missingFields"], json!(missing));
        // Production never echoes the payload.
        assert!(body.get("received").is_none());
    }

    assert_eq!(store.count_inquiries().await.unwrap(), 0);
}

#[tokio::test]
async fn test_development_echoes_received_payload() {
    let app = app_with(config_for(Environment::Development), temp_store().await);

    let response = app
        .oneshot(post_contact(&json!({"name": "", "email": "a@b.com", "message": "hi"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["received"]["email"], "a@b.com");
    assert_eq!(body["received"]["name"], "");
}

#[tokio::test]
async fn test_store_failure_hides_detail_in_production() {
    let app = app_with(config_for(Environment::Production), Arc::new(UnavailableStore));

    let response = app
        .oneshot(post_contact(&json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "message": "Hello"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = read_json(response).await;
    assert_eq!(body["message"], PERSISTENCE_MESSAGE);
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_store_failure_includes_detail_in_development() {
    let app = app_with(config_for(Environment::Development), Arc::new(UnavailableStore));

    let response = app
        .oneshot(post_contact(&json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "message": "Hello"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = read_json(response).await;
    assert_eq!(body["message"], PERSISTENCE_MESSAGE);
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_identical_submissions_create_distinct_records() {
    let (app, store) = spawn_app().await;
    let payload = json!({"name": "Jane", "email": "jane@example.com", "message": "Hello"});

    let first = read_json(app.clone().oneshot(post_contact(&payload)).await.unwrap()).await;
    let second = read_json(app.clone().oneshot(post_contact(&payload)).await.unwrap()).await;

    assert_ne!(first["id"], second["id"]);
    assert_eq!(store.count_inquiries().await.unwrap(), 2);
}

#[tokio::test]
async fn test_unknown_path_returns_route_list() {
    let (app, _) = spawn_app().await;

    let response = app.oneshot(get("/unknown-path")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = read_json(response).await;
    assert_eq!(body["message"], NOT_FOUND_MESSAGE);
    assert_eq!(body["requestedPath"], "/unknown-path");
    assert_eq!(body["availableRoutes"], json!(AVAILABLE_ROUTES));
}

#[tokio::test]
async fn test_wrong_method_on_known_path_is_not_found() {
    let (app, _) = spawn_app().await;

    let response = app.oneshot(get("/api/contact")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = read_json(response).await;
    assert_eq!(body["requestedPath"], "/api/contact");
}

#[tokio::test]
async fn test_malformed_bodies() {
    let (app, store) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/contact")
                .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["message"], MALFORMED_BODY_MESSAGE);

    let response = app
        .clone()
        .oneshot(post_contact(&json!({"name": 42, "email": "a@b.com", "message": "hi"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/contact")
                .body(Body::from("name=Jane"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(store.count_inquiries().await.unwrap(), 0);
}

#[tokio::test]
async fn test_body_without_json_content_type_reports_missing_fields() {
    let (app, store) = spawn_app().await;

    let empty = Request::builder()
        .method("POST")
        .uri("/api/contact")
        .body(Body::empty())
        .unwrap();

    let plain_text = Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header(header::CONTENT_TYPE, mime::TEXT_PLAIN.as_ref())
        .body(Body::from(
            json!({"name": "Jane", "email": "jane@example.com", "message": "Hi"}).to_string(),
        ))
        .unwrap();

    for request in [empty, plain_text] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = read_json(response).await;
        assert_eq!(body["message"], VALIDATION_MESSAGE);
        assert_eq!(body["missingFields"], json!(["name", "email", "message"]));
    }

    assert_eq!(store.count_inquiries().await.unwrap(), 0);
}

/// Store that panics on write, as an unexpected bug would.
struct PanickingStore;

#[async_trait]
impl InquiryStore for PanickingStore {
    async fn insert_inquiry(&self, _inquiry: NewInquiry) -> anyhow::Result<InquiryId> {
        panic!("store driver bug: pool state corrupted");
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_unhandled_failure_returns_generic_500() {
    for environment in [Environment::Production, Environment::Development] {
        let app = app_with(config_for(environment), Arc::new(PanickingStore));

        let response = app
            .oneshot(post_contact(&json!({
                "name": "Jane Doe",
                "email": "jane@example.com",
                "message": "Hello"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");

        let body = read_json(response).await;
        assert_eq!(body, json!({"message": INTERNAL_MESSAGE}));
        assert!(body.get("error").is_none());
    }
}

#[tokio::test]
async fn test_health_reports_database_state() {
    let (app, _) = spawn_app().await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert!(body["uptime"].is_u64());
    assert!(body["timestamp"].is_string());

    let app = app_with(config_for(Environment::Production), Arc::new(UnavailableStore));
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_banner() {
    let (app, _) = spawn_app().await;

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["environment"], "production");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["endpoints"], json!(AVAILABLE_ROUTES));
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let (app, _) = spawn_app().await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/api/contact")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_cors_production_allow_list() {
    let (app, _) = spawn_app().await;

    for origin in [
        "https://interior-designer-gold.vercel.app",
        "https://feature-branch.vercel.app",
    ] {
        let response = app.clone().oneshot(preflight(origin)).await.unwrap();
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            origin
        );
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
    }

    let response = app
        .clone()
        .oneshot(preflight("http://localhost:5173"))
        .await
        .unwrap();
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn test_cors_development_single_origin() {
    let app = app_with(config_for(Environment::Development), temp_store().await);

    let response = app
        .clone()
        .oneshot(preflight("http://localhost:5173"))
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );

    let response = app
        .oneshot(preflight("https://interior-designer-gold.vercel.app"))
        .await
        .unwrap();
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}
