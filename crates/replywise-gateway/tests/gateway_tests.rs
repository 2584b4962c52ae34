// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing, auth and error mapping through the real pipeline.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use replywise_core::types::ReplyStatus;
use replywise_gateway::{AuthConfig, GatewayState, HealthState, build_router};
use replywise_pipeline::ImportSettings;
use replywise_test_utils::harness::{ACCOUNT_ID, BUSINESS_ID, LOCATION_NAME, USER_ID};
use replywise_test_utils::{TestHarness, listed_review};

const TOKEN: &str = "test-token";

fn state(harness: &TestHarness, token: Option<&str>) -> GatewayState {
    GatewayState::new(
        harness.pipeline.clone(),
        ImportSettings::default(),
        AuthConfig {
            bearer_token: token.map(str::to_string),
        },
        HealthState::new(Some(
            Arc::new(|| "replywise_up 1\n".to_string()) as Arc<dyn Fn() -> String + Send + Sync>
        )),
    )
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {TOKEN}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn notification(external_id: &str, rating: u8) -> Value {
    json!({
        "reviewId": external_id,
        "rating": rating,
        "reviewerName": "Ann",
        "comment": "Lovely place",
        "attributes": { "business_id": BUSINESS_ID }
    })
}

#[tokio::test]
async fn health_and_metrics_are_public() {
    let harness = TestHarness::builder().build().await.unwrap();
    let app = build_router(state(&harness, Some(TOKEN)));

    let (status, body) = send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&text[..], b"replywise_up 1\n");
}

#[tokio::test]
async fn v1_routes_require_the_bearer_token() {
    let harness = TestHarness::builder().build().await.unwrap();
    let app = build_router(state(&harness, Some(TOKEN)));

    let missing = Request::builder()
        .method("POST")
        .uri("/v1/webhooks/reviews")
        .header("content-type", "application/json")
        .body(Body::from(notification("ext-1", 5).to_string()))
        .unwrap();
    assert_eq!(send(&app, missing).await.0, StatusCode::UNAUTHORIZED);

    let wrong = Request::builder()
        .method("POST")
        .uri("/v1/webhooks/reviews")
        .header("authorization", "Bearer nope")
        .header("content-type", "application/json")
        .body(Body::from(notification("ext-1", 5).to_string()))
        .unwrap();
    assert_eq!(send(&app, wrong).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unconfigured_token_fails_closed() {
    let harness = TestHarness::builder().build().await.unwrap();
    let app = build_router(state(&harness, None));
    let (status, _) = send(&app, post("/v1/webhooks/reviews", notification("ext-1", 5))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn webhook_ingests_once_and_processes_in_background() {
    let harness = TestHarness::builder().auto_reply(5, true).build().await.unwrap();
    let state = state(&harness, Some(TOKEN));
    let tasks = state.tasks.clone();
    let app = build_router(state);

    let (status, body) = send(&app, post("/v1/webhooks/reviews", notification("ext-1", 5))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["created"], true);
    let review_id = body["review_id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, post("/v1/webhooks/reviews", notification("ext-1", 5))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["created"], false);
    assert_eq!(body["review_id"], review_id.as_str());

    tasks.close();
    tasks.wait().await;

    assert_eq!(harness.status(&review_id).await.unwrap(), ReplyStatus::Posted);
    assert_eq!(harness.platform.posts().await.len(), 1);
    assert_eq!(harness.generator.call_count().await, 1);
}

#[tokio::test]
async fn webhook_for_unknown_business_is_not_found() {
    let harness = TestHarness::builder().build().await.unwrap();
    let app = build_router(state(&harness, Some(TOKEN)));

    let mut body = notification("ext-1", 5);
    body["attributes"]["business_id"] = json!("someone-else");
    let (status, _) = send(&app, post("/v1/webhooks/reviews", body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn webhook_with_bad_rating_is_rejected() {
    let harness = TestHarness::builder().build().await.unwrap();
    let app = build_router(state(&harness, Some(TOKEN)));
    let (status, _) = send(&app, post("/v1/webhooks/reviews", notification("ext-1", 9))).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn process_trigger_uses_camel_case_contract() {
    let harness = TestHarness::builder().build().await.unwrap();
    let ingested = harness
        .ingest(&TestHarness::payload("ext-2", 3, None))
        .await
        .unwrap();
    let app = build_router(state(&harness, Some(TOKEN)));

    let request = json!({
        "userId": USER_ID,
        "accountId": ACCOUNT_ID,
        "businessId": BUSINESS_ID,
        "reviewId": ingested.review.id,
    });
    let (status, body) = send(&app, post("/v1/reviews/process", request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "replyStatus": "pending" }));

    // Repeat is a no-op.
    let (_, body) = send(&app, post("/v1/reviews/process", request)).await;
    assert_eq!(body, json!({ "replyStatus": "pending" }));
    assert_eq!(harness.generator.call_count().await, 1);
}

#[tokio::test]
async fn human_actions_drive_the_state_machine() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (review, _) = harness.ingest_and_process("ext-3", 2, None).await.unwrap();
    let app = build_router(state(&harness, Some(TOKEN)));
    let base = format!("/v1/reviews/{}", review.id);

    // Publishing before approval conflicts.
    let (status, _) = send(&app, post(&format!("{base}/publish"), json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, post(&format!("{base}/reject"), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply_status"], "rejected");

    let (status, body) = send(
        &app,
        post(
            &format!("{base}/draft"),
            json!({ "text": "Sorry about that, call us.", "author": "owner-1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply_status"], "pending");

    let (_, body) = send(&app, post(&format!("{base}/approve"), json!({}))).await;
    assert_eq!(body["reply_status"], "approved");

    let (status, body) = send(
        &app,
        post(&format!("{base}/publish"), json!({ "actor": "owner-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply_status"], "posted");

    let posts = harness.platform.posts().await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].text, "Sorry about that, call us.");
    let replies = harness.replies(&review.id).await.unwrap();
    assert_eq!(replies.last().unwrap().posted_by.as_deref(), Some("owner-1"));
}

#[tokio::test]
async fn regenerate_on_unknown_review_is_not_found() {
    let harness = TestHarness::builder().build().await.unwrap();
    let app = build_router(state(&harness, Some(TOKEN)));
    let (status, body) = send(&app, post("/v1/reviews/missing/regenerate", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn import_route_returns_the_report() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness
        .platform
        .set_pages(vec![vec![
            listed_review(LOCATION_NAME, "h-1", 5, None, Some("Thanks!")),
            listed_review(LOCATION_NAME, "h-2", 4, Some("Nice"), None),
        ]])
        .await;
    let app = build_router(state(&harness, Some(TOKEN)));

    let (status, body) = send(
        &app,
        post(&format!("/v1/businesses/{BUSINESS_ID}/import"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pages"], 1);
    assert_eq!(body["imported"], 2);
    assert_eq!(body["replies_imported"], 1);
    assert_eq!(body["dispatched"], 1);
    assert_eq!(body["generation"]["pending"], 1);
}
