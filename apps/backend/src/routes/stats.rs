//! Daily stats and dashboard endpoints

use axum::{extract::State, Extension, Json};

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/stats/daily
pub async fn daily(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<DailyStatsResponse>> {
    let date = state.today();
    let counters = state.db.get_daily_stats(auth.user_id, date).await?;
    Ok(Json(DailyStatsResponse { date, counters }))
}

/// GET /api/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<DashboardResponse>> {
    let date = state.today();
    let counters = state.db.get_daily_stats(auth.user_id, date).await?;
    let deck_count = state.db.count_decks(auth.user_id).await?;
    let quiz_count = state.db.count_quizzes(auth.user_id).await?;
    let due_cards = state.db.count_due_cards(auth.user_id, date).await?;

    Ok(Json(DashboardResponse {
        today: DailyStatsResponse { date, counters },
        deck_count,
        quiz_count,
        due_cards,
    }))
}
