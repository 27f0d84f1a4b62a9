//! Pomodoro settings and session log endpoints

use axum::{extract::State, Extension, Json};
use study_core::ValidationError;

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

const RECENT_SESSION_LIMIT: i64 = 20;

/// GET /api/pomodoro/settings
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<PomodoroSettings>> {
    Ok(Json(current_settings(&state, auth.user_id).await?))
}

/// PUT /api/pomodoro/settings
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<PomodoroSettingsRequest>,
) -> Result<Json<SuccessResponse>> {
    let settings = payload.into_settings();
    settings.validate()?;
    state
        .db
        .upsert_pomodoro_settings(auth.user_id, &settings)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/pomodoro/sessions
pub async fn log_session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<LogSessionRequest>,
) -> Result<Json<LogSessionResponse>> {
    let session_type = match payload.session_type.as_deref() {
        Some(kind) => SessionType::parse(kind)?,
        None => SessionType::Focus,
    };

    let settings = current_settings(&state, auth.user_id).await?;
    let duration = payload
        .duration_minutes
        .unwrap_or_else(|| i64::from(settings.duration_of(session_type)));
    if duration < 1 {
        return Err(ValidationError::BelowMinimum {
            field: "duration_minutes",
            min: 1,
            value: duration,
        }
        .into());
    }

    let counters = state
        .db
        .record_pomodoro_session(
            auth.user_id,
            session_type,
            duration,
            payload.notes.as_deref().unwrap_or_default(),
            state.today(),
        )
        .await?;

    let completed_focus = u32::try_from(counters.pomodoro_count).unwrap_or(0);
    let next_session = settings.next_session(session_type, completed_focus);

    tracing::debug!(
        session = session_type.as_str(),
        next = next_session.as_str(),
        completed_focus,
        "pomodoro session logged"
    );

    Ok(Json(LogSessionResponse {
        success: true,
        next_session,
        next_duration_minutes: settings.duration_of(next_session),
    }))
}

/// GET /api/pomodoro/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<SessionListResponse>> {
    let sessions = state
        .db
        .recent_pomodoro_sessions(auth.user_id, RECENT_SESSION_LIMIT)
        .await?;
    Ok(Json(SessionListResponse { sessions }))
}

async fn current_settings(state: &AppState, user_id: i64) -> Result<PomodoroSettings> {
    Ok(state
        .db
        .get_pomodoro_settings(user_id)
        .await?
        .map(|s| s.to_core_settings())
        .unwrap_or_default())
}
