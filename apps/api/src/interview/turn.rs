//! The interviewer's one model call per operation.
//!
//! Opening, mid-interview and final turns each send a single prompt and parse
//! the reply into independent parts. A part that is missing or malformed comes
//! back as `None` and the component that consumes it falls back on its own; a
//! failed call leaves every part `None`.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize};
use tracing::warn;

use crate::interview::analyzer::{score_lines, LlmAnalysis};
use crate::interview::evaluator::{EvaluationInput, LlmAssessment};
use crate::interview::models::{lenient, transcript_of, QuestionRecord};
use crate::interview::prompts::{
    fill, FINAL_TURN_PROMPT_TEMPLATE, NEXT_TURN_PROMPT_TEMPLATE, OPENING_PROMPT_TEMPLATE,
};
use crate::interview::selector::TieredQuestions;
use crate::llm_client::prompts::{CANDIDATE_SAFE_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{generate_json, LanguageModel};

#[derive(Debug, Default, Deserialize)]
pub struct OpeningReply {
    #[serde(default, deserialize_with = "lenient")]
    pub question: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextTurnReply {
    #[serde(default, deserialize_with = "lenient")]
    pub assessment: Option<LlmAssessment>,
    #[serde(default, deserialize_with = "lenient")]
    pub next_questions: Option<TieredQuestions>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FinalTurnReply {
    #[serde(default, deserialize_with = "lenient")]
    pub assessment: Option<LlmAssessment>,
    #[serde(default, deserialize_with = "lenient")]
    pub analysis: Option<LlmAnalysis>,
}

pub struct TurnModel {
    llm: Arc<dyn LanguageModel>,
}

impl TurnModel {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    pub async fn opening(
        &self,
        job_role: &str,
        skills: &BTreeSet<String>,
        max_questions: u32,
    ) -> OpeningReply {
        let skills = skills_line(skills);
        let max_questions = max_questions.to_string();
        let prompt = fill(
            OPENING_PROMPT_TEMPLATE,
            &[
                ("job_role", job_role),
                ("skills", skills.as_str()),
                ("max_questions", max_questions.as_str()),
                ("candidate_safe", CANDIDATE_SAFE_INSTRUCTION),
            ],
        );
        self.ask(&prompt, "Opening question").await
    }

    /// Assesses the answer and proposes the next question at every tier.
    pub async fn next_turn(
        &self,
        answered: &EvaluationInput<'_>,
        previous_questions: &[&str],
        max_questions: u32,
    ) -> NextTurnReply {
        let skills = skills_line(answered.skills);
        let previous = if previous_questions.is_empty() {
            "(none yet)".to_string()
        } else {
            previous_questions
                .iter()
                .map(|q| format!("- {q}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let question_number = (previous_questions.len() + 1).to_string();
        let max_questions = max_questions.to_string();

        let prompt = fill(
            NEXT_TURN_PROMPT_TEMPLATE,
            &[
                ("job_role", answered.job_role),
                ("skills", skills.as_str()),
                ("difficulty", answered.difficulty.as_str()),
                ("question", answered.question),
                ("answer", answer_text(answered.answer)),
                ("question_number", question_number.as_str()),
                ("max_questions", max_questions.as_str()),
                ("previous_questions", previous.as_str()),
                ("candidate_safe", CANDIDATE_SAFE_INSTRUCTION),
            ],
        );
        self.ask(&prompt, "Turn").await
    }

    /// Assesses the last answer and analyzes the session. `earlier` holds every
    /// question before the final one.
    pub async fn final_turn(
        &self,
        answered: &EvaluationInput<'_>,
        earlier: &[QuestionRecord],
    ) -> FinalTurnReply {
        let (transcript, scores) = if earlier.is_empty() {
            ("(none)".to_string(), "(none)".to_string())
        } else {
            (transcript_of(earlier), score_lines(earlier))
        };

        let prompt = fill(
            FINAL_TURN_PROMPT_TEMPLATE,
            &[
                ("job_role", answered.job_role),
                ("difficulty", answered.difficulty.as_str()),
                ("question", answered.question),
                ("answer", answer_text(answered.answer)),
                ("transcript", transcript.as_str()),
                ("scores", scores.as_str()),
                ("candidate_safe", CANDIDATE_SAFE_INSTRUCTION),
            ],
        );
        self.ask(&prompt, "Final turn").await
    }

    async fn ask<T: DeserializeOwned + Default>(&self, prompt: &str, what: &str) -> T {
        match generate_json(self.llm.as_ref(), prompt, JSON_ONLY_SYSTEM).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("{what} model call failed, using heuristics: {e}");
                T::default()
            }
        }
    }
}

fn skills_line(skills: &BTreeSet<String>) -> String {
    if skills.is_empty() {
        "(not specified)".to_string()
    } else {
        skills.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn answer_text(answer: &str) -> &str {
    match answer.trim() {
        "" => "(no answer)",
        trimmed => trimmed,
    }
}
