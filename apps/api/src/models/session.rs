use std::collections::BTreeSet;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::interview::models::{InterviewMode, InterviewSession, SessionStatus};

/// One row of `interview_sessions`. Questions and analysis live in JSONB columns.
#[derive(Debug, Clone, FromRow)]
pub struct InterviewSessionRow {
    pub id: Uuid,
    pub candidate_id: String,
    pub candidate_email: Option<String>,
    pub job_role: String,
    pub skills: Vec<String>,
    pub mode: String,
    pub questions: Value,
    pub asked_count: i32,
    pub max_questions: i32,
    pub status: String,
    pub full_transcript: Option<String>,
    pub ai_analysis: Option<Value>,
    pub fallback_cursor: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<InterviewSessionRow> for InterviewSession {
    type Error = anyhow::Error;

    fn try_from(row: InterviewSessionRow) -> Result<Self> {
        let mode = InterviewMode::parse(&row.mode)
            .ok_or_else(|| anyhow!("session {} has unknown mode '{}'", row.id, row.mode))?;
        let status = SessionStatus::parse(&row.status)
            .ok_or_else(|| anyhow!("session {} has unknown status '{}'", row.id, row.status))?;
        let questions = serde_json::from_value(row.questions)
            .with_context(|| format!("session {} has malformed questions", row.id))?;
        let ai_analysis = row
            .ai_analysis
            .map(serde_json::from_value)
            .transpose()
            .with_context(|| format!("session {} has malformed analysis", row.id))?;

        Ok(InterviewSession {
            id: row.id,
            candidate_id: row.candidate_id,
            candidate_email: row.candidate_email,
            job_role: row.job_role,
            skills: row.skills.into_iter().collect::<BTreeSet<_>>(),
            mode,
            questions,
            asked_count: u32::try_from(row.asked_count)?,
            max_questions: u32::try_from(row.max_questions)?,
            status,
            full_transcript: row.full_transcript,
            ai_analysis,
            fallback_cursor: u32::try_from(row.fallback_cursor)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            completed_at: row.completed_at,
        })
    }
}

impl TryFrom<&InterviewSession> for InterviewSessionRow {
    type Error = anyhow::Error;

    fn try_from(session: &InterviewSession) -> Result<Self> {
        Ok(InterviewSessionRow {
            id: session.id,
            candidate_id: session.candidate_id.clone(),
            candidate_email: session.candidate_email.clone(),
            job_role: session.job_role.clone(),
            skills: session.skills.iter().cloned().collect(),
            mode: session.mode.as_str().to_string(),
            questions: serde_json::to_value(&session.questions)?,
            asked_count: i32::try_from(session.asked_count)?,
            max_questions: i32::try_from(session.max_questions)?,
            status: session.status.as_str().to_string(),
            full_transcript: session.full_transcript.clone(),
            ai_analysis: session
                .ai_analysis
                .as_ref()
                .map(serde_json::to_value)
                .transpose()?,
            fallback_cursor: i32::try_from(session.fallback_cursor)?,
            created_at: session.created_at,
            updated_at: session.updated_at,
            completed_at: session.completed_at,
        })
    }
}
