//! Quiz, question and submission endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use study_core::quiz::grade;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

const DEFAULT_QUIZ_TITLE: &str = "Untitled Quiz";

/// GET /api/quizzes
pub async fn list_quizzes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<QuizListResponse>> {
    let quizzes = state.db.list_quizzes(auth.user_id).await?;
    Ok(Json(QuizListResponse { quizzes }))
}

/// POST /api/quizzes
pub async fn create_quiz(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<QuizRequest>,
) -> Result<Json<CreatedResponse>> {
    let title = payload
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_QUIZ_TITLE);

    let id = state
        .db
        .create_quiz(
            auth.user_id,
            title,
            payload.description.as_deref().unwrap_or_default(),
            payload.subject.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(CreatedResponse::new(id)))
}

/// GET /api/quizzes/{id}
pub async fn get_quiz(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(quiz_id): Path<i64>,
) -> Result<Json<QuizDetailResponse>> {
    let quiz = owned_quiz(&state, auth.user_id, quiz_id).await?;
    let questions = state
        .db
        .get_questions(quiz.id)
        .await?
        .iter()
        .map(DbQuestion::to_api_question)
        .collect();

    Ok(Json(QuizDetailResponse { quiz, questions }))
}

/// PUT /api/quizzes/{id}
pub async fn update_quiz(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<QuizRequest>,
) -> Result<Json<SuccessResponse>> {
    let mut quiz = owned_quiz(&state, auth.user_id, quiz_id).await?;

    if let Some(title) = payload.title {
        quiz.title = title;
    }
    if let Some(description) = payload.description {
        quiz.description = description;
    }
    if let Some(subject) = payload.subject {
        quiz.subject = subject;
    }
    state.db.update_quiz(&quiz).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /api/quizzes/{id}
pub async fn delete_quiz(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(quiz_id): Path<i64>,
) -> Result<Json<SuccessResponse>> {
    if !state.db.delete_quiz(auth.user_id, quiz_id).await? {
        return Err(ApiError::NotFound("Quiz not found".to_string()));
    }
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/quizzes/{id}/questions
pub async fn add_question(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<QuestionRequest>,
) -> Result<Json<CreatedResponse>> {
    let quiz = owned_quiz(&state, auth.user_id, quiz_id).await?;
    let question = new_question(payload, None)?;
    let id = state.db.add_question(quiz.id, &question).await?;
    Ok(Json(CreatedResponse::new(id)))
}

/// PUT /api/questions/{id}
pub async fn update_question(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(question_id): Path<i64>,
    Json(payload): Json<QuestionRequest>,
) -> Result<Json<SuccessResponse>> {
    let existing = owned_question(&state, auth.user_id, question_id).await?;
    let question = new_question(payload, Some(&existing))?;
    state.db.update_question(existing.id, &question).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /api/questions/{id}
pub async fn delete_question(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(question_id): Path<i64>,
) -> Result<Json<SuccessResponse>> {
    let question = owned_question(&state, auth.user_id, question_id).await?;
    state.db.delete_question(question.id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/quizzes/{id}/submit
pub async fn submit_quiz(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<SubmitQuizRequest>,
) -> Result<Json<SubmitQuizResponse>> {
    let quiz = owned_quiz(&state, auth.user_id, quiz_id).await?;
    let keys: Vec<AnswerKey> = state
        .db
        .get_questions(quiz.id)
        .await?
        .iter()
        .map(DbQuestion::answer_key)
        .collect();

    let result = grade(&keys, &payload.answers);
    let answers_json = serde_json::to_string(&payload.answers)
        .map_err(|e| ApiError::Internal(format!("failed to encode answers: {e}")))?;

    let attempt_id = state
        .db
        .record_attempt(
            auth.user_id,
            quiz.id,
            &result,
            payload.time_taken.unwrap_or(0).max(0),
            &answers_json,
            state.today(),
        )
        .await?;

    tracing::info!(
        quiz_id = quiz.id,
        score = result.score,
        total = result.total_points,
        "quiz submitted"
    );

    Ok(Json(SubmitQuizResponse {
        attempt_id,
        grade: result,
    }))
}

/// Build a question from a request; omitted optional fields fall back to
/// `existing` when updating, otherwise to defaults
fn new_question(payload: QuestionRequest, existing: Option<&DbQuestion>) -> Result<NewQuestion> {
    let question_type = match (payload.question_type.as_deref(), existing) {
        (Some(kind), _) => QuestionType::parse(kind)?,
        (None, Some(existing)) => QuestionType::parse(&existing.question_type)?,
        (None, None) => QuestionType::MultipleChoice,
    };

    Ok(NewQuestion {
        question_text: payload.question_text,
        question_type,
        correct_answer: payload.correct_answer,
        options: payload.options,
        explanation: payload
            .explanation
            .or_else(|| existing.map(|q| q.explanation.clone()))
            .unwrap_or_default(),
        points: payload
            .points
            .or_else(|| existing.map(|q| q.points))
            .unwrap_or(1),
    })
}

async fn owned_quiz(state: &AppState, user_id: i64, quiz_id: i64) -> Result<DbQuiz> {
    state
        .db
        .get_quiz(user_id, quiz_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))
}

async fn owned_question(state: &AppState, user_id: i64, question_id: i64) -> Result<DbQuestion> {
    state
        .db
        .get_question(user_id, question_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))
}
