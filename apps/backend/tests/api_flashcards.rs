//! Deck, card and review API tests.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Duration;

use common::fixtures;
use common::TestContext;

async fn create_deck(server: &TestServer, token: &str, name: &str) -> i64 {
    let body: serde_json::Value = server
        .post("/api/decks")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(token))
        .json(&fixtures::deck_request(name, "Biology"))
        .await
        .json();
    body["id"].as_i64().unwrap()
}

async fn add_card(server: &TestServer, token: &str, deck_id: i64, front: &str) -> i64 {
    let body: serde_json::Value = server
        .post(&format!("/api/decks/{deck_id}/cards"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(token))
        .json(&fixtures::card_request(front, "answer"))
        .await
        .json();
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_list_decks_empty() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (_, token) = ctx.create_test_user("alice").await;

    let response = server
        .get("/api/decks")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["decks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_deck_defaults_name() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (_, token) = ctx.create_test_user("alice").await;

    let body: serde_json::Value = server
        .post("/api/decks")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&serde_json::json!({}))
        .await
        .json();
    let deck_id = body["id"].as_i64().unwrap();

    let detail: serde_json::Value = server
        .get(&format!("/api/decks/{deck_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .json();
    assert_eq!(detail["deck"]["name"], "Untitled Deck");
    assert!(detail["cards"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_decks_counts_due_cards() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (_, token) = ctx.create_test_user("alice").await;

    let deck_id = create_deck(&server, &token, "Cells").await;
    let first = add_card(&server, &token, deck_id, "Nucleus").await;
    add_card(&server, &token, deck_id, "Ribosome").await;

    server
        .post(&format!("/api/cards/{first}/review"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::review_request(5))
        .await
        .assert_status_ok();

    let body: serde_json::Value = server
        .get("/api/decks")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .json();
    let deck = &body["decks"][0];
    assert_eq!(deck["name"], "Cells");
    assert_eq!(deck["card_count"], 2);
    assert_eq!(deck["due_count"], 1);
}

#[tokio::test]
async fn test_update_deck_keeps_omitted_fields() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (_, token) = ctx.create_test_user("alice").await;
    let deck_id = create_deck(&server, &token, "Old").await;

    server
        .put(&format!("/api/decks/{deck_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&serde_json::json!({ "name": "New" }))
        .await
        .assert_status_ok();

    let detail: serde_json::Value = server
        .get(&format!("/api/decks/{deck_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .json();
    assert_eq!(detail["deck"]["name"], "New");
    assert_eq!(detail["deck"]["subject"], "Biology");
}

#[tokio::test]
async fn test_new_card_is_due_immediately() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (_, token) = ctx.create_test_user("alice").await;
    let deck_id = create_deck(&server, &token, "Cells").await;
    add_card(&server, &token, deck_id, "Nucleus").await;

    let due: serde_json::Value = server
        .get(&format!("/api/decks/{deck_id}/due"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .json();

    let due = due.as_array().unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0]["front"], "Nucleus");
    assert_eq!(due[0]["ease_factor"], 2.5);
    assert_eq!(due[0]["interval_days"], 0);
    assert_eq!(due[0]["next_review_date"], ctx.today().to_string());
}

#[tokio::test]
async fn test_review_follows_sm2() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (user_id, token) = ctx.create_test_user("alice").await;
    let deck_id = create_deck(&server, &token, "Cells").await;
    let card_id = add_card(&server, &token, deck_id, "Nucleus").await;
    let today = ctx.today();

    let first: serde_json::Value = server
        .post(&format!("/api/cards/{card_id}/review"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::review_request(5))
        .await
        .json();
    assert_eq!(first["success"], true);
    assert_eq!(first["interval_days"], 1);
    assert_eq!(first["repetitions"], 1);
    assert!((first["ease_factor"].as_f64().unwrap() - 2.6).abs() < 1e-9);
    assert_eq!(first["next_review_date"], (today + Duration::days(1)).to_string());

    let second: serde_json::Value = server
        .post(&format!("/api/cards/{card_id}/review"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::review_request(4))
        .await
        .json();
    assert_eq!(second["interval_days"], 6);
    assert_eq!(second["repetitions"], 2);
    assert_eq!(second["next_review_date"], (today + Duration::days(6)).to_string());

    let third: serde_json::Value = server
        .post(&format!("/api/cards/{card_id}/review"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::review_request(1))
        .await
        .json();
    assert_eq!(third["interval_days"], 1);
    assert_eq!(third["repetitions"], 0);
    assert!(third["ease_factor"].as_f64().unwrap() < 2.6);

    let stats = ctx.db.get_daily_stats(user_id, today).await.unwrap();
    assert_eq!(stats.cards_reviewed, 3);

    let logged: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM flashcard_reviews WHERE flashcard_id = ?")
        .bind(card_id)
        .fetch_one(ctx.db.pool())
        .await
        .unwrap();
    assert_eq!(logged, 3);
}

#[tokio::test]
async fn test_repeated_perfect_reviews_cap_the_interval() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (_, token) = ctx.create_test_user("alice").await;
    let deck_id = create_deck(&server, &token, "Cells").await;
    let card_id = add_card(&server, &token, deck_id, "Nucleus").await;

    let mut last = serde_json::Value::Null;
    for _ in 0..40 {
        let response = server
            .post(&format!("/api/cards/{card_id}/review"))
            .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
            .json(&fixtures::review_request(5))
            .await;
        response.assert_status_ok();
        last = response.json();
    }

    assert_eq!(last["interval_days"], 36_500);
    assert_eq!(last["repetitions"], 40);
    assert_eq!(
        last["next_review_date"],
        (ctx.today() + Duration::days(36_500)).to_string()
    );
}

#[tokio::test]
async fn test_review_defaults_to_quality_three() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (_, token) = ctx.create_test_user("alice").await;
    let deck_id = create_deck(&server, &token, "Cells").await;
    let card_id = add_card(&server, &token, deck_id, "Nucleus").await;

    let body: serde_json::Value = server
        .post(&format!("/api/cards/{card_id}/review"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&serde_json::json!({}))
        .await
        .json();

    // q=3 passes but lowers ease by 0.14
    assert_eq!(body["interval_days"], 1);
    assert!((body["ease_factor"].as_f64().unwrap() - 2.36).abs() < 1e-9);
}

#[tokio::test]
async fn test_review_rejects_out_of_range_quality() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (_, token) = ctx.create_test_user("alice").await;
    let deck_id = create_deck(&server, &token, "Cells").await;
    let card_id = add_card(&server, &token, deck_id, "Nucleus").await;

    server
        .post(&format!("/api/cards/{card_id}/review"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::review_request(6))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_review_unknown_card() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (_, token) = ctx.create_test_user("alice").await;

    server
        .post("/api/cards/9999/review")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::review_request(4))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cards_are_private_to_owner() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (_, alice) = ctx.create_test_user("alice").await;
    let (_, mallory) = ctx.create_test_user("mallory").await;
    let deck_id = create_deck(&server, &alice, "Private").await;
    let card_id = add_card(&server, &alice, deck_id, "Secret").await;

    server
        .get(&format!("/api/decks/{deck_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&mallory))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .post(&format!("/api/cards/{card_id}/review"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&mallory))
        .json(&fixtures::review_request(5))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .delete(&format!("/api/cards/{card_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&mallory))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_and_delete_card() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (_, token) = ctx.create_test_user("alice").await;
    let deck_id = create_deck(&server, &token, "Cells").await;
    let card_id = add_card(&server, &token, deck_id, "Nucleus").await;

    server
        .put(&format!("/api/cards/{card_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&serde_json::json!({ "back": "Holds DNA" }))
        .await
        .assert_status_ok();

    let detail: serde_json::Value = server
        .get(&format!("/api/decks/{deck_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .json();
    assert_eq!(detail["cards"][0]["front"], "Nucleus");
    assert_eq!(detail["cards"][0]["back"], "Holds DNA");

    server
        .delete(&format!("/api/cards/{card_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .assert_status_ok();

    let detail: serde_json::Value = server
        .get(&format!("/api/decks/{deck_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .json();
    assert!(detail["cards"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_deck_removes_cards_and_reviews() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (_, token) = ctx.create_test_user("alice").await;
    let deck_id = create_deck(&server, &token, "Cells").await;
    let card_id = add_card(&server, &token, deck_id, "Nucleus").await;

    server
        .post(&format!("/api/cards/{card_id}/review"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::review_request(4))
        .await
        .assert_status_ok();

    server
        .delete(&format!("/api/decks/{deck_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .assert_status_ok();

    let cards: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM flashcards")
        .fetch_one(ctx.db.pool())
        .await
        .unwrap();
    let reviews: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM flashcard_reviews")
        .fetch_one(ctx.db.pool())
        .await
        .unwrap();
    assert_eq!((cards, reviews), (0, 0));

    server
        .delete(&format!("/api/decks/{deck_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
