//! Axum route handlers for the Matching API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::extractor::{extract_text, DocumentKind};
use crate::matching::skills::{match_report, MatchReport};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct UploadMatchResponse {
    pub storage_key: String,
    pub extracted_chars: usize,
    #[serde(flatten)]
    pub report: MatchReport,
}

/// POST /api/v1/match
///
/// Scores raw resume text against a raw job description.
pub async fn handle_match(
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchReport>, AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    Ok(Json(match_report(&request.resume_text, &request.job_description)))
}

/// POST /api/v1/match/upload
///
/// Multipart fields: `candidate_id`, `job_description`, `resume` (PDF or plain text).
/// The original file is stored before its text is scored.
pub async fn handle_match_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadMatchResponse>, AppError> {
    let mut candidate_id: Option<String> = None;
    let mut job_description: Option<String> = None;
    let mut resume: Option<(DocumentKind, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "candidate_id" => candidate_id = Some(read_text_field(field).await?),
            "job_description" => job_description = Some(read_text_field(field).await?),
            "resume" => {
                let kind = DocumentKind::detect(field.file_name(), field.content_type())
                    .ok_or_else(|| {
                        AppError::Validation(
                            "resume must be a PDF or plain-text document".to_string(),
                        )
                    })?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read resume: {e}")))?;
                resume = Some((kind, data));
            }
            _ => {}
        }
    }

    let candidate_id = candidate_id
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Validation("candidate_id is required".to_string()))?;
    let job_description = job_description
        .filter(|j| !j.trim().is_empty())
        .ok_or_else(|| AppError::Validation("job_description is required".to_string()))?;
    let (kind, data) =
        resume.ok_or_else(|| AppError::Validation("resume file is required".to_string()))?;

    let storage_key = format!(
        "resumes/{}/{}.{}",
        sanitize_key_segment(&candidate_id),
        Uuid::new_v4(),
        kind.extension()
    );
    state
        .documents
        .put(&storage_key, data.clone(), kind.content_type())
        .await?;

    let resume_text = extract_text(kind, data).await?;
    let report = match_report(&resume_text, &job_description);
    info!(
        "Matched resume {} for candidate {}: {}/100",
        storage_key, candidate_id, report.match_score
    );

    Ok(Json(UploadMatchResponse {
        storage_key,
        extracted_chars: resume_text.chars().count(),
        report,
    }))
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Could not read form field: {e}")))
}

/// Keeps object keys to a safe character set.
fn sanitize_key_segment(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
