//! Authentication middleware and account endpoints

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// Authenticated user info stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
    pub is_guest: bool,
    pub token: String,
}

/// Auth middleware - resolves the bearer token to a user
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization format".to_string()))?
        .to_string();

    let user = state
        .db
        .get_user_by_token(&token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid session token".to_string()))?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        username: user.username,
        is_guest: user.is_guest,
        token,
    });

    Ok(next.run(request).await)
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<AuthResponse>> {
    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }
    if payload.password != payload.confirm_password {
        return Err(ApiError::BadRequest("Passwords do not match".to_string()));
    }
    if state.db.get_user_by_username(username).await?.is_some() {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }

    let password_hash = hash_password(payload.password, state.config.bcrypt_cost).await?;
    let email = payload.email.as_deref().filter(|e| !e.trim().is_empty());
    let user = state
        .db
        .create_user(username, email, Some(&password_hash), false)
        .await?;
    let token = state.db.create_session(user.id).await?;

    tracing::info!(user_id = user.id, "user signed up");

    Ok(Json(AuthResponse {
        user_id: user.id,
        username: user.username,
        token,
        is_guest: false,
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let invalid = || ApiError::Unauthorized("Invalid username or password".to_string());

    let user = state
        .db
        .get_user_by_username(payload.username.trim())
        .await?
        .ok_or_else(invalid)?;
    let hash = user.password_hash.clone().ok_or_else(invalid)?;

    if !verify_password(payload.password, hash).await? {
        return Err(invalid());
    }

    let token = state.db.create_session(user.id).await?;

    Ok(Json(AuthResponse {
        user_id: user.id,
        username: user.username,
        token,
        is_guest: user.is_guest,
    }))
}

/// POST /api/auth/guest
pub async fn guest(State(state): State<AppState>) -> Result<Json<AuthResponse>> {
    let simple = Uuid::new_v4().simple().to_string();
    let username = format!("Guest_{}", &simple[..8]);

    let user = state.db.create_user(&username, None, None, true).await?;
    let token = state.db.create_session(user.id).await?;

    tracing::info!(user_id = user.id, "guest session started");

    Ok(Json(AuthResponse {
        user_id: user.id,
        username: user.username,
        token,
        is_guest: true,
    }))
}

/// POST /api/auth/logout - guests are deleted along with everything they made
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<SuccessResponse>> {
    if auth.is_guest {
        state.db.delete_user(auth.user_id).await?;
        tracing::info!(user_id = auth.user_id, "guest data removed");
    } else {
        state.db.delete_session(&auth.token).await?;
    }

    Ok(Json(SuccessResponse::ok()))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<MeResponse>> {
    let user = state
        .db
        .get_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    Ok(Json(MeResponse {
        user_id: user.id,
        username: user.username,
        email: user.email,
        is_guest: user.is_guest,
    }))
}

async fn hash_password(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ApiError::Internal(format!("password hashing task failed: {e}")))?
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("password check task failed: {e}")))?
        .map_err(|e| ApiError::Internal(format!("password check failed: {e}")))
}
