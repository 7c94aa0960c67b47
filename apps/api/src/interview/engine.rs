//! Drives a session through start, answer and completion.
//!
//! Each call loads the session, makes at most one model call through
//! `TurnModel`, applies one transition and saves it once. The store refuses a
//! save once the stored session has left `in-progress`, so an abandon that
//! lands while a submit is waiting on the model wins. The only errors surfaced
//! here are unknown sessions, invalid transitions and storage faults.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::analyzer::analyze_session;
use crate::interview::evaluator::{evaluate_answer, EvaluationInput};
use crate::interview::models::{
    Backend, BodyLanguageSignals, InterviewMode, InterviewSession, NewSession, QuestionRecord,
};
use crate::interview::notifier::notify_results;
use crate::interview::selector::{
    choose_next_question, choose_opening_question, LastTurn, SelectionContext,
};
use crate::interview::turn::TurnModel;
use crate::llm_client::LanguageModel;
use crate::mail::Mailer;
use crate::store::SessionStore;

/// Upper bound for a per-session question limit override.
pub const MAX_QUESTIONS_LIMIT: u32 = 20;

#[derive(Debug, Clone, Default)]
pub struct StartSession {
    pub candidate_id: String,
    pub candidate_email: Option<String>,
    pub job_role: String,
    pub skills: Vec<String>,
    pub mode: InterviewMode,
    pub max_questions: Option<u32>,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// The answer was recorded and another question issued.
    NextQuestion(InterviewSession),
    /// The last answer was recorded and the session analyzed.
    Completed(InterviewSession),
}

pub struct InterviewEngine {
    store: Arc<dyn SessionStore>,
    model: TurnModel,
    mailer: Arc<dyn Mailer>,
    default_max_questions: u32,
}

impl InterviewEngine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        llm: Arc<dyn LanguageModel>,
        mailer: Arc<dyn Mailer>,
        default_max_questions: u32,
    ) -> Self {
        Self {
            store,
            model: TurnModel::new(llm),
            mailer,
            default_max_questions: default_max_questions.clamp(1, MAX_QUESTIONS_LIMIT),
        }
    }

    /// Creates a session and issues its first (easy) question.
    pub async fn start_session(&self, request: StartSession) -> Result<InterviewSession, AppError> {
        let candidate_id = request.candidate_id.trim().to_string();
        let job_role = request.job_role.trim().to_string();
        if candidate_id.is_empty() {
            return Err(AppError::Validation("candidate_id cannot be empty".to_string()));
        }
        if job_role.is_empty() {
            return Err(AppError::Validation("job_role cannot be empty".to_string()));
        }

        let skills = normalize_skills(&request.skills);
        let max_questions = request
            .max_questions
            .unwrap_or(self.default_max_questions)
            .clamp(1, MAX_QUESTIONS_LIMIT);

        let reply = self.model.opening(&job_role, &skills, max_questions).await;
        let first = choose_opening_question(&job_role, reply.question.as_deref());

        let mut session = InterviewSession::start(
            NewSession {
                candidate_id,
                candidate_email: request
                    .candidate_email
                    .map(|e| e.trim().to_string())
                    .filter(|e| !e.is_empty()),
                job_role,
                skills,
                mode: request.mode,
                max_questions,
            },
            QuestionRecord::new(first.question, first.difficulty, first.source),
        );
        if first.source == Backend::Heuristic {
            session.fallback_cursor += 1;
        }

        self.store.save(&session).await?;
        info!(
            "Started {} session {} for {} ({} questions)",
            session.mode.as_str(),
            session.id,
            session.job_role,
            session.max_questions
        );
        Ok(session)
    }

    pub async fn get(&self, id: Uuid) -> Result<InterviewSession, AppError> {
        self.store
            .load(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Interview session {id} not found")))
    }

    /// Records the answer to the current question, then either issues the
    /// next question or completes the session.
    pub async fn submit_answer(
        &self,
        id: Uuid,
        transcript: String,
        signals: Option<BodyLanguageSignals>,
    ) -> Result<SubmitOutcome, AppError> {
        let mut session = self.get(id).await?;
        session.ensure_in_progress()?;

        let current = session
            .current_question()
            .cloned()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("session {id} has no current question")))?;

        let (outcome, analysis_reply, suggestions) = {
            let answered = EvaluationInput {
                job_role: &session.job_role,
                skills: &session.skills,
                question: &current.question,
                difficulty: current.difficulty,
                answer: &transcript,
            };
            if session.is_on_last_question() {
                let earlier = &session.questions[..session.questions.len() - 1];
                let reply = self.model.final_turn(&answered, earlier).await;
                (evaluate_answer(&answered, reply.assessment), reply.analysis, None)
            } else {
                let previous = session.previous_questions();
                let reply = self
                    .model
                    .next_turn(&answered, &previous, session.max_questions)
                    .await;
                (evaluate_answer(&answered, reply.assessment), None, reply.next_questions)
            }
        };
        let last_turn = LastTurn {
            difficulty: current.difficulty,
            evaluation: outcome.evaluation,
            confidence: outcome.confidence,
        };
        session.record_answer(transcript, outcome)?;

        if session.is_due_for_completion() {
            let analysis = analyze_session(&session.job_role, &session.questions, analysis_reply);
            let full_transcript = session.build_transcript();
            session.complete(full_transcript, analysis)?;
            self.store.save(&session).await?;

            if let Some(analysis) = &session.ai_analysis {
                info!(
                    "Completed session {}: score {} ({}), total penalty {}",
                    session.id,
                    analysis.overall_score,
                    analysis.readiness.label(),
                    session.total_penalty()
                );
            }
            notify_results(self.mailer.as_ref(), &session).await;
            return Ok(SubmitOutcome::Completed(session));
        }

        // Body language only counts in voice sessions.
        let signals = match session.mode {
            InterviewMode::Voice => signals,
            InterviewMode::Practice => None,
        };

        let next = {
            let previous = session.previous_questions();
            choose_next_question(
                &SelectionContext {
                    job_role: &session.job_role,
                    skills: &session.skills,
                    previous_questions: &previous,
                    last_turn,
                    signals: signals.as_ref(),
                    fallback_cursor: session.fallback_cursor,
                },
                suggestions.as_ref(),
            )
        };

        if next.source == Backend::Heuristic {
            session.fallback_cursor += 1;
        }
        session.push_question(QuestionRecord::new(next.question, next.difficulty, next.source))?;
        self.store.save(&session).await?;

        info!(
            "Session {} advanced to question {}/{} at {} difficulty",
            session.id,
            session.asked_count,
            session.max_questions,
            next.difficulty.as_str()
        );
        Ok(SubmitOutcome::NextQuestion(session))
    }

    /// Marks an in-progress session abandoned. Completed sessions stay completed.
    pub async fn abandon(&self, id: Uuid) -> Result<InterviewSession, AppError> {
        let mut session = self.get(id).await?;
        session.abandon()?;
        self.store.save(&session).await?;
        info!("Session {} abandoned after {} questions", session.id, session.asked_count);
        Ok(session)
    }
}

/// Lowercased, trimmed, deduplicated skill names.
fn normalize_skills(skills: &[String]) -> BTreeSet<String> {
    skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
