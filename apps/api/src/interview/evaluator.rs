//! Classifies one answer as correct, partial or incorrect.
//!
//! The model's assessment is preferred when it is present and valid; a missing
//! or out-of-range assessment drops to `heuristic_evaluation`. `evaluate_answer`
//! never errors.

use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::interview::models::{
    Backend, ConfidenceLevel, Difficulty, Evaluation, EvaluationOutcome, MAX_PENALTY,
};
use crate::interview::signals::estimate_confidence;
use crate::llm_client::LlmError;
use crate::matching::skills::extract_skills;

/// Heuristic penalties.
pub const PENALTY_CORRECT: u8 = 5;
pub const PENALTY_PARTIAL: u8 = 10;
pub const PENALTY_INCORRECT: u8 = 15;
pub const PENALTY_EMPTY: u8 = MAX_PENALTY;

/// An answer at least this long, with enough keyword hits, is `correct`.
const STRONG_ANSWER_WORDS: usize = 40;
const STRONG_ANSWER_KEYWORDS: usize = 2;
/// Below this many words an answer is `incorrect`.
const MIN_ANSWER_WORDS: usize = 8;

const STOPWORDS: &[&str] = &[
    "about", "would", "could", "should", "there", "their", "which", "where", "while", "these",
    "those", "what", "when", "have", "your", "with", "from", "that", "this", "they", "them",
    "tell", "describe", "explain", "example", "walk", "through", "time",
];

/// Everything the evaluator needs to judge one answer.
pub struct EvaluationInput<'a> {
    pub job_role: &'a str,
    pub skills: &'a BTreeSet<String>,
    pub question: &'a str,
    pub difficulty: Difficulty,
    pub answer: &'a str,
}

/// Strict shape of the model's assessment of one answer.
#[derive(Debug, Deserialize)]
pub struct LlmAssessment {
    pub evaluation: Evaluation,
    pub penalty: i64,
    pub feedback: Option<String>,
}

/// Evaluates one answer. Always returns a usable outcome.
pub fn evaluate_answer(
    input: &EvaluationInput<'_>,
    assessment: Option<LlmAssessment>,
) -> EvaluationOutcome {
    // Empty input is scored directly; there is nothing for the model to judge.
    if input.answer.trim().is_empty() {
        return empty_answer_outcome();
    }

    let Some(assessment) = assessment else {
        return heuristic_evaluation(input);
    };
    match accept_assessment(input, assessment) {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("Answer evaluation fell back to heuristic: {e}");
            heuristic_evaluation(input)
        }
    }
}

fn accept_assessment(
    input: &EvaluationInput<'_>,
    assessment: LlmAssessment,
) -> Result<EvaluationOutcome, LlmError> {
    let penalty = u8::try_from(assessment.penalty)
        .ok()
        .filter(|p| *p <= MAX_PENALTY)
        .ok_or_else(|| {
            LlmError::Parse(serde::de::Error::custom(format!(
                "penalty {} outside 0..={MAX_PENALTY}",
                assessment.penalty
            )))
        })?;

    debug!(
        "LLM evaluated answer as {:?} (penalty {penalty})",
        assessment.evaluation
    );

    Ok(EvaluationOutcome {
        evaluation: assessment.evaluation,
        penalty,
        confidence: estimate_confidence(input.answer),
        feedback: assessment.feedback.filter(|f| !f.trim().is_empty()),
        backend: Backend::Llm,
    })
}

fn empty_answer_outcome() -> EvaluationOutcome {
    EvaluationOutcome {
        evaluation: Evaluation::Incorrect,
        penalty: PENALTY_EMPTY,
        confidence: ConfidenceLevel::Low,
        feedback: Some("No answer was given for this question.".to_string()),
        backend: Backend::Heuristic,
    }
}

/// Deterministic scoring from answer length and role-relevant keyword hits.
pub fn heuristic_evaluation(input: &EvaluationInput<'_>) -> EvaluationOutcome {
    let answer = input.answer.trim();
    if answer.is_empty() {
        return empty_answer_outcome();
    }

    let word_count = answer.split_whitespace().count();
    let hits = keyword_hits(input);

    let (evaluation, penalty, feedback) = if word_count < MIN_ANSWER_WORDS {
        (
            Evaluation::Incorrect,
            PENALTY_INCORRECT,
            "The answer was too brief to demonstrate understanding. Expand with specifics.",
        )
    } else if word_count >= STRONG_ANSWER_WORDS && hits >= STRONG_ANSWER_KEYWORDS {
        (
            Evaluation::Correct,
            PENALTY_CORRECT,
            "Detailed answer that used relevant terminology.",
        )
    } else {
        (
            Evaluation::Partial,
            PENALTY_PARTIAL,
            "A reasonable start. Add concrete examples and role-specific detail.",
        )
    };

    EvaluationOutcome {
        evaluation,
        penalty,
        confidence: estimate_confidence(answer),
        feedback: Some(feedback.to_string()),
        backend: Backend::Heuristic,
    }
}

/// Number of distinct role-relevant keywords the answer mentions.
fn keyword_hits(input: &EvaluationInput<'_>) -> usize {
    let mut relevant_skills = extract_skills(input.job_role);
    relevant_skills.extend(extract_skills(input.question));
    relevant_skills.extend(input.skills.iter().map(|s| s.to_lowercase()));

    let answer_skills = extract_skills(input.answer);
    let skill_hits = answer_skills.intersection(&relevant_skills).count();

    let answer_terms = significant_terms(input.answer);
    let question_terms = significant_terms(input.question);
    let term_hits = answer_terms
        .intersection(&question_terms)
        .filter(|t| !answer_skills.contains(*t))
        .count();

    skill_hits + term_hits
}

/// Lowercased words of five or more letters, minus common stopwords.
fn significant_terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 5)
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRONG_ANSWER: &str = "In my last role I designed a Rust service backed by \
        PostgreSQL and used SQL window functions to build the reporting queries. I indexed the \
        hot columns, profiled the slow queries with explain analyze, and moved the heavy \
        aggregation into a materialized view that refreshed every five minutes. Latency for the \
        dashboard dropped from two seconds to under two hundred milliseconds.";

    fn skills() -> BTreeSet<String> {
        ["rust".to_string(), "sql".to_string()].into_iter().collect()
    }

    fn input<'a>(skills: &'a BTreeSet<String>, answer: &'a str) -> EvaluationInput<'a> {
        EvaluationInput {
            job_role: "Backend Engineer",
            skills,
            question: "How have you optimized SQL queries in a production service?",
            difficulty: Difficulty::Medium,
            answer,
        }
    }

    #[test]
    fn test_heuristic_strong_answer_is_correct() {
        let skills = skills();
        let outcome = heuristic_evaluation(&input(&skills, STRONG_ANSWER));
        assert_eq!(outcome.evaluation, Evaluation::Correct);
        assert_eq!(outcome.penalty, PENALTY_CORRECT);
        assert_eq!(outcome.backend, Backend::Heuristic);
    }

    #[test]
    fn test_heuristic_short_answer_is_incorrect() {
        let skills = skills();
        let outcome = heuristic_evaluation(&input(&skills, "I add indexes."));
        assert_eq!(outcome.evaluation, Evaluation::Incorrect);
        assert_eq!(outcome.penalty, PENALTY_INCORRECT);
        assert_eq!(outcome.confidence, ConfidenceLevel::Low);
    }

    #[test]
    fn test_heuristic_empty_answer_gets_max_penalty() {
        let skills = skills();
        let outcome = heuristic_evaluation(&input(&skills, "   "));
        assert_eq!(outcome.evaluation, Evaluation::Incorrect);
        assert_eq!(outcome.penalty, MAX_PENALTY);
    }

    #[test]
    fn test_heuristic_generic_answer_is_partial() {
        let skills = skills();
        let answer = "I usually look at what is slow and then try a few different things \
            until it gets better, and I ask teammates for help when needed.";
        let outcome = heuristic_evaluation(&input(&skills, answer));
        assert_eq!(outcome.evaluation, Evaluation::Partial);
        assert_eq!(outcome.penalty, PENALTY_PARTIAL);
    }

    #[test]
    fn test_keyword_hits_count_skills_and_question_terms() {
        let skills = skills();
        // rust, sql (skills) + "queries", "production" (question terms)
        let answer = "Rust and SQL queries in production";
        assert_eq!(keyword_hits(&input(&skills, answer)), 4);
    }

    fn assessment(evaluation: Evaluation, penalty: i64, feedback: Option<&str>) -> LlmAssessment {
        LlmAssessment {
            evaluation,
            penalty,
            feedback: feedback.map(str::to_string),
        }
    }

    #[test]
    fn test_llm_assessment_is_used_when_valid() {
        let skills = skills();
        let outcome = evaluate_answer(
            &input(&skills, STRONG_ANSWER),
            Some(assessment(Evaluation::Partial, 9, Some("Mention indexing."))),
        );

        assert_eq!(outcome.evaluation, Evaluation::Partial);
        assert_eq!(outcome.penalty, 9);
        assert_eq!(outcome.backend, Backend::Llm);
        assert_eq!(outcome.feedback.as_deref(), Some("Mention indexing."));
    }

    #[test]
    fn test_out_of_range_penalty_falls_back() {
        let skills = skills();
        for penalty in [45, -3] {
            let outcome = evaluate_answer(
                &input(&skills, STRONG_ANSWER),
                Some(assessment(Evaluation::Incorrect, penalty, None)),
            );
            assert_eq!(outcome.backend, Backend::Heuristic);
            assert_eq!(outcome.evaluation, Evaluation::Correct);
        }
    }

    #[test]
    fn test_missing_assessment_falls_back() {
        let skills = skills();
        let outcome = evaluate_answer(&input(&skills, "I add indexes."), None);
        assert_eq!(outcome.evaluation, Evaluation::Incorrect);
        assert_eq!(outcome.backend, Backend::Heuristic);
    }

    #[test]
    fn test_empty_answer_ignores_assessment() {
        let skills = skills();
        let outcome = evaluate_answer(
            &input(&skills, ""),
            Some(assessment(Evaluation::Correct, 0, Some("Great"))),
        );
        assert_eq!(outcome.penalty, MAX_PENALTY);
        assert_eq!(outcome.backend, Backend::Heuristic);
    }

    #[test]
    fn test_blank_feedback_is_dropped() {
        let skills = skills();
        let outcome = evaluate_answer(
            &input(&skills, STRONG_ANSWER),
            Some(assessment(Evaluation::Correct, 0, Some("  "))),
        );
        assert_eq!(outcome.penalty, 0);
        assert!(outcome.feedback.is_none());
    }
}
