//! Deck, card and review endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use study_core::algorithm::{get_algorithm, SchedulingResult};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

const DEFAULT_DECK_NAME: &str = "Untitled Deck";

/// GET /api/decks
pub async fn list_decks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<DeckListResponse>> {
    let decks = state.db.list_decks(auth.user_id, state.today()).await?;
    Ok(Json(DeckListResponse { decks }))
}

/// POST /api/decks
pub async fn create_deck(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<DeckRequest>,
) -> Result<Json<CreatedResponse>> {
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_DECK_NAME);

    let id = state
        .db
        .create_deck(
            auth.user_id,
            name,
            payload.description.as_deref().unwrap_or_default(),
            payload.subject.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(CreatedResponse::new(id)))
}

/// GET /api/decks/{id}
pub async fn get_deck(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<i64>,
) -> Result<Json<DeckDetailResponse>> {
    let deck = owned_deck(&state, auth.user_id, deck_id).await?;
    let cards = state.db.get_cards(deck.id).await?;
    Ok(Json(DeckDetailResponse { deck, cards }))
}

/// PUT /api/decks/{id} - omitted fields keep their value
pub async fn update_deck(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<i64>,
    Json(payload): Json<DeckRequest>,
) -> Result<Json<SuccessResponse>> {
    let mut deck = owned_deck(&state, auth.user_id, deck_id).await?;

    if let Some(name) = payload.name {
        deck.name = name;
    }
    if let Some(description) = payload.description {
        deck.description = description;
    }
    if let Some(subject) = payload.subject {
        deck.subject = subject;
    }
    state.db.update_deck(&deck).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /api/decks/{id}
pub async fn delete_deck(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<i64>,
) -> Result<Json<SuccessResponse>> {
    if !state.db.delete_deck(auth.user_id, deck_id).await? {
        return Err(ApiError::NotFound("Deck not found".to_string()));
    }
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/decks/{id}/cards
pub async fn add_card(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<i64>,
    Json(payload): Json<CreateCardRequest>,
) -> Result<Json<CreatedResponse>> {
    let deck = owned_deck(&state, auth.user_id, deck_id).await?;
    let id = state
        .db
        .add_card(deck.id, &payload.front, &payload.back, state.today())
        .await?;
    Ok(Json(CreatedResponse::new(id)))
}

/// PUT /api/cards/{id}
pub async fn update_card(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(card_id): Path<i64>,
    Json(payload): Json<UpdateCardRequest>,
) -> Result<Json<SuccessResponse>> {
    let card = owned_card(&state, auth.user_id, card_id).await?;
    let front = payload.front.unwrap_or(card.front);
    let back = payload.back.unwrap_or(card.back);
    state.db.update_card_content(card.id, &front, &back).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /api/cards/{id}
pub async fn delete_card(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(card_id): Path<i64>,
) -> Result<Json<SuccessResponse>> {
    if !state.db.delete_card(auth.user_id, card_id).await? {
        return Err(ApiError::NotFound("Card not found".to_string()));
    }
    Ok(Json(SuccessResponse::ok()))
}

/// GET /api/decks/{id}/due
pub async fn due_cards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<i64>,
) -> Result<Json<Vec<DbFlashcard>>> {
    let deck = owned_deck(&state, auth.user_id, deck_id).await?;
    let cards = state.db.get_due_cards(deck.id, state.today()).await?;
    Ok(Json(cards))
}

/// POST /api/cards/{id}/review
pub async fn review_card(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(card_id): Path<i64>,
    payload: Option<Json<ReviewCardRequest>>,
) -> Result<Json<ReviewCardResponse>> {
    let quality = match payload.and_then(|Json(p)| p.quality) {
        Some(value) => ReviewQuality::new(value)?,
        None => ReviewQuality::default(),
    };

    let card = owned_card(&state, auth.user_id, card_id).await?;

    let algorithm = get_algorithm("sm2")
        .ok_or_else(|| ApiError::Internal("SM-2 scheduler unavailable".to_string()))?;

    let today = state.today();
    let result: SchedulingResult = algorithm.schedule(&card.to_schedule(), quality, today);

    state
        .db
        .record_review(
            auth.user_id,
            card.id,
            quality,
            &result.new_state,
            result.next_review_date,
            today,
        )
        .await?;

    tracing::debug!(
        card_id = card.id,
        quality = quality.value(),
        interval = result.new_state.interval_days,
        "card reviewed"
    );

    Ok(Json(ReviewCardResponse {
        success: true,
        next_review_date: result.next_review_date,
        interval_days: result.new_state.interval_days,
        ease_factor: result.new_state.ease_factor,
        repetitions: result.new_state.repetitions,
    }))
}

async fn owned_deck(state: &AppState, user_id: i64, deck_id: i64) -> Result<DbDeck> {
    state
        .db
        .get_deck(user_id, deck_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Deck not found".to_string()))
}

async fn owned_card(state: &AppState, user_id: i64, card_id: i64) -> Result<DbFlashcard> {
    state
        .db
        .get_card(user_id, card_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))
}
