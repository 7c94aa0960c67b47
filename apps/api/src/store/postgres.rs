use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::models::InterviewSession;
use crate::models::session::InterviewSessionRow;
use crate::store::{no_longer_in_progress, SessionStore};

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<InterviewSession>, AppError> {
        let row = sqlx::query_as::<_, InterviewSessionRow>(
            "SELECT * FROM interview_sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(InterviewSession::try_from).transpose()?)
    }

    async fn save(&self, session: &InterviewSession) -> Result<(), AppError> {
        let row = InterviewSessionRow::try_from(session)?;

        let result = sqlx::query(
            r#"
            INSERT INTO interview_sessions
                (id, candidate_id, candidate_email, job_role, skills, mode, questions,
                 asked_count, max_questions, status, full_transcript, ai_analysis,
                 fallback_cursor, created_at, updated_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (id) DO UPDATE SET
                questions       = EXCLUDED.questions,
                asked_count     = EXCLUDED.asked_count,
                status          = EXCLUDED.status,
                full_transcript = EXCLUDED.full_transcript,
                ai_analysis     = EXCLUDED.ai_analysis,
                fallback_cursor = EXCLUDED.fallback_cursor,
                updated_at      = EXCLUDED.updated_at,
                completed_at    = EXCLUDED.completed_at
            WHERE interview_sessions.status = 'in-progress'
            "#,
        )
        .bind(row.id)
        .bind(&row.candidate_id)
        .bind(&row.candidate_email)
        .bind(&row.job_role)
        .bind(&row.skills)
        .bind(&row.mode)
        .bind(&row.questions)
        .bind(row.asked_count)
        .bind(row.max_questions)
        .bind(&row.status)
        .bind(&row.full_transcript)
        .bind(&row.ai_analysis)
        .bind(row.fallback_cursor)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(row.completed_at)
        .execute(&self.pool)
        .await?;

        // The conflict branch is skipped once the stored row has left in-progress.
        if result.rows_affected() == 0 {
            return Err(no_longer_in_progress(session.id));
        }
        Ok(())
    }
}
