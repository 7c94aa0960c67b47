//! Picks the next question's tier and text.
//!
//! Tier: previous tier shifted by `signals::difficulty_delta`. Text: the model's
//! suggestion for that tier; an empty, overlong or duplicate suggestion falls
//! back to the static bank, filtered against everything already asked.

use std::collections::{BTreeSet, HashSet};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::interview::models::{
    lenient, Backend, BodyLanguageSignals, ConfidenceLevel, Difficulty, Evaluation,
};
use crate::interview::question_bank::{opening_question, questions_for};
use crate::interview::signals::difficulty_delta;
use crate::llm_client::LlmError;

const MAX_QUESTION_CHARS: usize = 600;

/// The answered turn that drives the next tier.
#[derive(Debug, Clone, Copy)]
pub struct LastTurn {
    pub difficulty: Difficulty,
    pub evaluation: Evaluation,
    pub confidence: ConfidenceLevel,
}

pub struct SelectionContext<'a> {
    pub job_role: &'a str,
    pub skills: &'a BTreeSet<String>,
    /// Every question already asked in this session, oldest first.
    pub previous_questions: &'a [&'a str],
    pub last_turn: LastTurn,
    /// Only present for voice sessions.
    pub signals: Option<&'a BodyLanguageSignals>,
    pub fallback_cursor: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedQuestion {
    pub question: String,
    pub difficulty: Difficulty,
    pub source: Backend,
}

/// The model's candidate next question at each tier. Any tier may be missing.
#[derive(Debug, Default, Deserialize)]
pub struct TieredQuestions {
    #[serde(default, deserialize_with = "lenient")]
    pub easy: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub medium: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub hard: Option<String>,
}

impl TieredQuestions {
    pub fn for_tier(&self, difficulty: Difficulty) -> Option<&str> {
        match difficulty {
            Difficulty::Easy => self.easy.as_deref(),
            Difficulty::Medium => self.medium.as_deref(),
            Difficulty::Hard => self.hard.as_deref(),
        }
    }
}

/// Opening question. Always `easy`, whatever the role or skills.
pub fn choose_opening_question(job_role: &str, suggestion: Option<&str>) -> SelectedQuestion {
    match suggestion.map(|q| accept_question(q, &[])) {
        Some(Ok(question)) => SelectedQuestion {
            question,
            difficulty: Difficulty::Easy,
            source: Backend::Llm,
        },
        rejected => {
            if let Some(Err(e)) = rejected {
                warn!("Opening question fell back to bank: {e}");
            }
            SelectedQuestion {
                question: opening_question(job_role),
                difficulty: Difficulty::Easy,
                source: Backend::Heuristic,
            }
        }
    }
}

/// Next question after an evaluated answer.
pub fn choose_next_question(
    ctx: &SelectionContext<'_>,
    suggestions: Option<&TieredQuestions>,
) -> SelectedQuestion {
    let difficulty = resolve_difficulty(Some(ctx.last_turn), ctx.signals);
    debug!(
        "Selecting question {} at {} difficulty",
        ctx.previous_questions.len() + 1,
        difficulty.as_str()
    );

    let suggestion = suggestions.and_then(|s| s.for_tier(difficulty));
    match suggestion.map(|q| accept_question(q, ctx.previous_questions)) {
        Some(Ok(question)) => SelectedQuestion {
            question,
            difficulty,
            source: Backend::Llm,
        },
        rejected => {
            if let Some(Err(e)) = rejected {
                warn!("Question selection fell back to bank: {e}");
            }
            let (question, difficulty) = select_from_bank(
                difficulty,
                ctx.job_role,
                ctx.skills,
                ctx.previous_questions,
                ctx.fallback_cursor,
            );
            SelectedQuestion {
                question,
                difficulty,
                source: Backend::Heuristic,
            }
        }
    }
}

fn accept_question(question: &str, previous: &[&str]) -> Result<String, LlmError> {
    let question = question.trim();
    if question.is_empty() || question.chars().count() > MAX_QUESTION_CHARS {
        return Err(LlmError::EmptyContent);
    }
    if is_repeat(question, previous) {
        return Err(LlmError::Parse(serde::de::Error::custom(
            "model repeated a question already asked",
        )));
    }
    Ok(question.to_string())
}

/// Tier for the next question. With no answered turn yet, always `easy`.
pub fn resolve_difficulty(
    last_turn: Option<LastTurn>,
    signals: Option<&BodyLanguageSignals>,
) -> Difficulty {
    match last_turn {
        None => Difficulty::Easy,
        Some(turn) => {
            let delta = difficulty_delta(turn.evaluation, turn.confidence, signals);
            turn.difficulty.shifted(delta)
        }
    }
}

/// Trimmed, lowercased, whitespace-collapsed form used for repeat detection.
pub fn normalize_question(question: &str) -> String {
    question
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn is_repeat(question: &str, previous: &[&str]) -> bool {
    let normalized = normalize_question(question);
    previous.iter().any(|p| normalize_question(p) == normalized)
}

/// Picks an unused bank question, starting at `target` and moving up a tier
/// when the target is exhausted, then down. `cursor` rotates among the
/// unused entries of the tier that supplies the question.
pub fn select_from_bank(
    target: Difficulty,
    job_role: &str,
    skills: &BTreeSet<String>,
    previous: &[&str],
    cursor: u32,
) -> (String, Difficulty) {
    let asked: HashSet<String> = previous.iter().map(|q| normalize_question(q)).collect();

    let mut search_order = vec![target];
    let mut up = target;
    while let Some(next) = up.harder() {
        search_order.push(next);
        up = next;
    }
    search_order.extend(
        Difficulty::ALL
            .iter()
            .rev()
            .copied()
            .filter(|d| *d < target),
    );

    for tier in search_order {
        let unused: Vec<String> = questions_for(tier, job_role, skills)
            .into_iter()
            .filter(|q| !asked.contains(&normalize_question(q)))
            .collect();
        if !unused.is_empty() {
            let index = cursor as usize % unused.len();
            return (unused[index].clone(), tier);
        }
    }

    // Every bank entry has been used; vary the first target-tier question.
    let base = questions_for(target, job_role, skills)
        .into_iter()
        .next()
        .unwrap_or_else(|| opening_question(job_role));
    let mut variation = 2;
    loop {
        let candidate = format!("{base} Please use a different example this time (#{variation}).");
        if !asked.contains(&normalize_question(&candidate)) {
            return (candidate, target);
        }
        variation += 1;
    }
}
