//! Syllabus ingestion, generation and listing endpoints

use axum::{
    extract::{Multipart, Path, State},
    Extension, Json,
};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::services::extraction::SyllabusSource;
use crate::services::generation::GenerationPipeline;
use crate::AppState;

/// Fields of the parse form; only the one matching `source_type` is used
#[derive(Debug, Default)]
struct ParseForm {
    source_type: Option<String>,
    pdf_file: Option<Vec<u8>>,
    url: Option<String>,
    text_content: Option<String>,
}

impl ParseForm {
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "pdf_file" => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;
                    form.pdf_file = Some(bytes.to_vec());
                }
                "source_type" | "url" | "text_content" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read {name}: {e}")))?;
                    match name.as_str() {
                        "source_type" => form.source_type = Some(value),
                        "url" => form.url = Some(value),
                        _ => form.text_content = Some(value),
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Missing input for the chosen source reads as empty text
    fn into_source(self) -> Result<SyllabusSource> {
        let source_type = self.source_type.unwrap_or_else(|| "text".to_string());
        match source_type.as_str() {
            "pdf" => Ok(match self.pdf_file {
                Some(bytes) if !bytes.is_empty() => SyllabusSource::Pdf(bytes),
                _ => SyllabusSource::Text(String::new()),
            }),
            "url" => Ok(match self.url.filter(|u| !u.trim().is_empty()) {
                Some(url) => SyllabusSource::Url(url),
                None => SyllabusSource::Text(String::new()),
            }),
            "text" => Ok(SyllabusSource::Text(self.text_content.unwrap_or_default())),
            other => Err(ApiError::BadRequest(format!("Unknown source type: {other}"))),
        }
    }
}

/// POST /api/syllabus/parse
pub async fn parse(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthenticatedUser>,
    multipart: Multipart,
) -> Result<Json<ParseSyllabusResponse>> {
    let source = ParseForm::read(multipart).await?.into_source()?;
    let content = state.extractor.extract(source).await?;
    let length = content.chars().count();

    Ok(Json(ParseSyllabusResponse {
        success: true,
        content,
        length,
    }))
}

/// POST /api/syllabus/generate
pub async fn generate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    let generated = GenerationPipeline::new(&state.db, state.llm.as_ref(), state.today())
        .run(
            auth.user_id,
            payload.name.as_deref(),
            &payload.content,
            payload.target,
        )
        .await?;

    Ok(Json(GenerateResponse {
        success: true,
        syllabus_id: generated.syllabus_id,
        results: generated.results,
    }))
}

/// GET /api/syllabus
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<SyllabusListResponse>> {
    let syllabi = state
        .db
        .list_syllabi(auth.user_id)
        .await?
        .iter()
        .map(DbSyllabus::to_api_syllabus)
        .collect();

    Ok(Json(SyllabusListResponse { syllabi }))
}

/// GET /api/syllabus/{id}
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(syllabus_id): Path<i64>,
) -> Result<Json<Syllabus>> {
    let syllabus = state
        .db
        .get_syllabus(auth.user_id, syllabus_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Syllabus not found".to_string()))?;

    Ok(Json(syllabus.to_api_syllabus()))
}

/// DELETE /api/syllabus/{id}
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(syllabus_id): Path<i64>,
) -> Result<Json<SuccessResponse>> {
    if !state.db.delete_syllabus(auth.user_id, syllabus_id).await? {
        return Err(ApiError::NotFound("Syllabus not found".to_string()));
    }
    Ok(Json(SuccessResponse::ok()))
}
