//! Daily stats and dashboard API tests.

mod common;

use axum::http::header::AUTHORIZATION;

use common::fixtures;
use common::TestContext;

#[tokio::test]
async fn test_daily_stats_start_at_zero() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (_, token) = ctx.create_test_user("alice").await;

    let body: serde_json::Value = server
        .get("/api/stats/daily")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .json();

    assert_eq!(body["date"], ctx.today().to_string());
    assert_eq!(body["pomodoro_count"], 0);
    assert_eq!(body["cards_reviewed"], 0);
    assert_eq!(body["average_quiz_score"], 0.0);
}

#[tokio::test]
async fn test_dashboard_aggregates_activity() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (_, token) = ctx.create_test_user("alice").await;

    let deck: serde_json::Value = server
        .post("/api/decks")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::deck_request("Cells", "Biology"))
        .await
        .json();
    let deck_id = deck["id"].as_i64().unwrap();

    let mut card_ids = Vec::new();
    for front in ["Nucleus", "Ribosome", "Golgi"] {
        let card: serde_json::Value = server
            .post(&format!("/api/decks/{deck_id}/cards"))
            .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
            .json(&fixtures::card_request(front, "organelle"))
            .await
            .json();
        card_ids.push(card["id"].as_i64().unwrap());
    }

    server
        .post(&format!("/api/cards/{}/review", card_ids[0]))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::review_request(4))
        .await
        .assert_status_ok();

    server
        .post("/api/quizzes")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::quiz_request("Cells quiz"))
        .await
        .assert_status_ok();

    server
        .post("/api/pomodoro/sessions")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::session_request("focus", 25))
        .await
        .assert_status_ok();

    let body: serde_json::Value = server
        .get("/api/dashboard")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .json();

    assert_eq!(body["deck_count"], 1);
    assert_eq!(body["quiz_count"], 1);
    assert_eq!(body["due_cards"], 2);
    assert_eq!(body["today"]["cards_reviewed"], 1);
    assert_eq!(body["today"]["pomodoro_count"], 1);
    assert_eq!(body["today"]["focus_minutes"], 25);
}

#[tokio::test]
async fn test_stats_are_per_user() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (_, alice) = ctx.create_test_user("alice").await;
    let (_, bob) = ctx.create_test_user("bob").await;

    server
        .post("/api/pomodoro/sessions")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&alice))
        .json(&fixtures::session_request("focus", 25))
        .await
        .assert_status_ok();

    let body: serde_json::Value = server
        .get("/api/stats/daily")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&bob))
        .await
        .json();
    assert_eq!(body["pomodoro_count"], 0);
}
