//! Axum route handlers for the Interview API.
//!
//! Responses are candidate-facing: confidence levels and the pending
//! question's evaluation are never serialized.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::engine::{StartSession, SubmitOutcome};
use crate::interview::models::{
    lenient, AnalysisResult, BodyLanguageSignals, Difficulty, Evaluation, InterviewMode, InterviewSession,
    QuestionRecord, SessionStatus,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub candidate_id: String,
    pub job_role: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub mode: InterviewMode,
    pub candidate_email: Option<String>,
    pub max_questions: Option<u32>,
}

/// A missing transcript is an empty answer. Signals the client cannot express
/// in the expected shape are dropped rather than failing the turn.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    #[serde(default)]
    pub transcript: String,
    #[serde(default, deserialize_with = "lenient")]
    pub signals: Option<BodyLanguageSignals>,
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub number: u32,
    pub question: String,
    pub difficulty: Difficulty,
}

#[derive(Debug, Serialize)]
pub struct StartInterviewResponse {
    pub session_id: Uuid,
    pub max_questions: u32,
    pub first_question: QuestionView,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub end_interview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_results: Option<AnalysisResult>,
}

/// One asked question as the candidate may see it.
#[derive(Debug, Serialize)]
pub struct QuestionRecordView {
    pub question: String,
    pub difficulty: Difficulty,
    pub answer: Option<String>,
    pub evaluation: Option<Evaluation>,
    pub feedback: Option<String>,
    pub asked_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub candidate_id: String,
    pub job_role: String,
    pub skills: Vec<String>,
    pub mode: InterviewMode,
    pub status: SessionStatus,
    pub asked_count: u32,
    pub max_questions: u32,
    pub questions: Vec<QuestionRecordView>,
    pub ai_analysis: Option<AnalysisResult>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&QuestionRecord> for QuestionRecordView {
    fn from(record: &QuestionRecord) -> Self {
        Self {
            question: record.question.clone(),
            difficulty: record.difficulty,
            answer: record.answer.clone(),
            evaluation: record.evaluation,
            feedback: record.feedback.clone(),
            asked_at: record.asked_at,
            answered_at: record.answered_at,
        }
    }
}

impl From<&InterviewSession> for SessionView {
    fn from(session: &InterviewSession) -> Self {
        Self {
            id: session.id,
            candidate_id: session.candidate_id.clone(),
            job_role: session.job_role.clone(),
            skills: session.skills.iter().cloned().collect(),
            mode: session.mode,
            status: session.status,
            asked_count: session.asked_count,
            max_questions: session.max_questions,
            questions: session.questions.iter().map(QuestionRecordView::from).collect(),
            ai_analysis: session.ai_analysis.clone(),
            created_at: session.created_at,
            completed_at: session.completed_at,
        }
    }
}

fn current_question_view(session: &InterviewSession) -> Result<QuestionView, AppError> {
    let record = session.current_question().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("session {} has no current question", session.id))
    })?;
    Ok(QuestionView {
        number: session.asked_count,
        question: record.question.clone(),
        difficulty: record.difficulty,
    })
}

/// POST /api/v1/interviews
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(request): Json<StartInterviewRequest>,
) -> Result<(StatusCode, Json<StartInterviewResponse>), AppError> {
    let session = state
        .engine
        .start_session(StartSession {
            candidate_id: request.candidate_id,
            candidate_email: request.candidate_email,
            job_role: request.job_role,
            skills: request.skills,
            mode: request.mode,
            max_questions: request.max_questions,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(StartInterviewResponse {
            session_id: session.id,
            max_questions: session.max_questions,
            first_question: current_question_view(&session)?,
        }),
    ))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.engine.get(id).await?;
    Ok(Json(SessionView::from(&session)))
}

/// POST /api/v1/interviews/:id/answers
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let outcome = state
        .engine
        .submit_answer(id, request.transcript, request.signals)
        .await?;

    let response = match outcome {
        SubmitOutcome::NextQuestion(session) => SubmitAnswerResponse {
            end_interview: false,
            next_question: Some(current_question_view(&session)?),
            final_results: None,
        },
        SubmitOutcome::Completed(session) => SubmitAnswerResponse {
            end_interview: true,
            next_question: None,
            final_results: session.ai_analysis,
        },
    };
    Ok(Json(response))
}

/// POST /api/v1/interviews/:id/abandon
pub async fn handle_abandon_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.engine.abandon(id).await?;
    Ok(Json(SessionView::from(&session)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::fixtures::{new_session, outcome};
    use crate::interview::models::ConfidenceLevel;

    #[test]
    fn test_session_view_hides_confidence() {
        let mut session = new_session(6);
        let mut answered = outcome(Evaluation::Correct, 5);
        answered.confidence = ConfidenceLevel::High;
        session.record_answer("An answer.".into(), answered).unwrap();

        let json = serde_json::to_value(SessionView::from(&session)).unwrap();
        let text = json.to_string();
        assert!(!text.contains("confidence"));
        assert!(!text.contains("penalty"));
        assert!(!text.contains("fallback_cursor"));
        assert_eq!(json["questions"][0]["evaluation"], "correct");
        assert_eq!(json["status"], "in-progress");
    }

    #[test]
    fn test_submit_response_omits_absent_parts() {
        let response = SubmitAnswerResponse {
            end_interview: false,
            next_question: Some(QuestionView {
                number: 2,
                question: "Next?".to_string(),
                difficulty: Difficulty::Medium,
            }),
            final_results: None,
        };
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["next_question"]["difficulty"], "medium");
        assert!(json.get("final_results").is_none());
    }

    #[test]
    fn test_start_request_defaults() {
        let request: StartInterviewRequest = serde_json::from_str(
            r#"{"candidate_id": "c1", "job_role": "Data Analyst"}"#,
        )
        .unwrap();
        assert_eq!(request.mode, InterviewMode::Practice);
        assert!(request.skills.is_empty());
        assert!(request.max_questions.is_none());
    }

    #[test]
    fn test_submit_request_without_transcript_is_empty_answer() {
        let request: SubmitAnswerRequest = serde_json::from_str("{}").unwrap();
        assert!(request.transcript.is_empty());
        assert!(request.signals.is_none());
    }

    #[test]
    fn test_submit_request_drops_unreadable_signals() {
        let request: SubmitAnswerRequest = serde_json::from_str(
            r#"{"transcript": "An answer.", "signals": {"posture": "leaning", "eye_contact": 0.4}}"#,
        )
        .unwrap();
        assert_eq!(request.transcript, "An answer.");
        assert!(request.signals.is_none());

        let request: SubmitAnswerRequest = serde_json::from_str(
            r#"{"transcript": "An answer.", "signals": {"posture": "slouched"}}"#,
        )
        .unwrap();
        assert_eq!(
            request.signals.and_then(|s| s.posture),
            Some(crate::interview::models::Posture::Slouched)
        );
    }
}
