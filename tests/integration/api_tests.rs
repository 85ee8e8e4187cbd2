// API surface: request validation, the premium gate, and the report
// envelope, all through the real router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use argus_insight::models::CompositeReport;
use argus_insight::web::{ApiResponse, create_router};

use super::{build_app_state, demand_body};

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    let app = create_router(build_app_state(&server.uri()));

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

    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "argus-insight");
}

#[tokio::test]
async fn test_analyze_rejects_empty_product_name() {
    let server = MockServer::start().await;
    let app = create_router(build_app_state(&server.uri()));

    let response = app
        .oneshot(post_json(
            "/api/v1/analyze",
            serde_json::json!({"product_name": "   "}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_analyze_returns_report_with_per_section_status() {
    let server = MockServer::start().await;
    // One catch-all demand-shaped body: demand succeeds, the HTML sources
    // find nothing and degrade to warnings, the report still comes back 200
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(demand_body()))
        .mount(&server)
        .await;

    let app = create_router(build_app_state(&server.uri()));

    let response = app
        .oneshot(post_json(
            "/api/v1/analyze",
            serde_json::json!({"product_name": "steel bottle"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let envelope: ApiResponse<CompositeReport> = serde_json::from_slice(&bytes).unwrap();

    assert!(envelope.success);
    let report = envelope.data.unwrap();
    assert_eq!(report.product_name, "steel bottle");
    assert!(report.demand.is_success());
    assert!(!report.suppliers.is_success());
    assert_eq!(report.competitors.sources.len(), 3);
}

#[tokio::test]
async fn test_leads_require_premium_subscription() {
    let server = MockServer::start().await;
    let app = create_router(build_app_state(&server.uri()));

    let response = app
        .oneshot(post_json(
            "/api/v1/leads",
            serde_json::json!({
                "product_name": "steel bottle",
                "user_email": "basic@example.com"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_leads_for_premium_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(super::DIRECTORY_PAGE))
        .mount(&server)
        .await;

    let app = create_router(build_app_state(&server.uri()));

    let response = app
        .oneshot(post_json(
            "/api/v1/leads",
            serde_json::json!({
                "product_name": "steel bottle",
                "user_email": "owner@pro-agency.example.com"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert!(body["data"]["count"].as_u64().unwrap() > 0);
    assert_eq!(body["data"]["leads"][0]["name"], "Sharma Industries");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let server = MockServer::start().await;
    let app = create_router(build_app_state(&server.uri()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
