//! Turns a finished session into an `AnalysisResult`.
//!
//! Fallback score is exactly `clamp(100 - Σ penalty, 0, 100)`; readiness always
//! comes from `ReadinessStatus::from_score`, whichever path produced the score.

use serde::Deserialize;
use tracing::warn;

use crate::interview::models::{
    AnalysisResult, Backend, Difficulty, Evaluation, QuestionRecord, ReadinessStatus,
};
use crate::llm_client::LlmError;

/// Penalty at or below which an answer counts as a strength.
const STRENGTH_PENALTY: u8 = 5;
/// Penalty at or above which an answer needs improvement.
const WEAKNESS_PENALTY: u8 = 15;
const MAX_QUOTED_CHARS: usize = 90;

#[derive(Debug, Deserialize)]
pub struct LlmAnalysis {
    pub overall_score: i64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub detailed_feedback: String,
}

/// Aggregates every answered question. Never errors.
pub fn analyze_session(
    job_role: &str,
    questions: &[QuestionRecord],
    analysis: Option<LlmAnalysis>,
) -> AnalysisResult {
    let Some(analysis) = analysis else {
        return heuristic_analysis(job_role, questions);
    };
    match accept_analysis(analysis) {
        Ok(result) => result,
        Err(e) => {
            warn!("Session analysis fell back to heuristic: {e}");
            heuristic_analysis(job_role, questions)
        }
    }
}

fn accept_analysis(analysis: LlmAnalysis) -> Result<AnalysisResult, LlmError> {
    let overall_score = u8::try_from(analysis.overall_score)
        .ok()
        .filter(|s| *s <= 100)
        .ok_or_else(|| {
            LlmError::Parse(serde::de::Error::custom(format!(
                "overall_score {} outside 0..=100",
                analysis.overall_score
            )))
        })?;
    if analysis.detailed_feedback.trim().is_empty() {
        return Err(LlmError::EmptyContent);
    }

    Ok(AnalysisResult {
        overall_score,
        readiness: ReadinessStatus::from_score(overall_score),
        strengths: non_empty(analysis.strengths),
        improvements: non_empty(analysis.improvements),
        recommendations: non_empty(analysis.recommendations),
        detailed_feedback: analysis.detailed_feedback.trim().to_string(),
        backend: Backend::Llm,
    })
}

/// One line per question: tier, evaluation and penalty.
pub fn score_lines(questions: &[QuestionRecord]) -> String {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            format!(
                "Q{}: {}, {}, penalty {}",
                i + 1,
                q.difficulty.as_str(),
                q.evaluation.map(evaluation_label).unwrap_or("unanswered"),
                q.penalty.unwrap_or(0)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `clamp(100 - Σ penalty, 0, 100)`.
pub fn fallback_score(questions: &[QuestionRecord]) -> u8 {
    let total: u32 = questions
        .iter()
        .filter_map(|q| q.penalty)
        .map(u32::from)
        .sum();
    100u32.saturating_sub(total) as u8
}

/// Deterministic analysis built only from the session's own records.
pub fn heuristic_analysis(job_role: &str, questions: &[QuestionRecord]) -> AnalysisResult {
    let overall_score = fallback_score(questions);
    let readiness = ReadinessStatus::from_score(overall_score);

    let strengths: Vec<String> = questions
        .iter()
        .filter(|q| q.penalty.is_some_and(|p| p <= STRENGTH_PENALTY))
        .map(|q| {
            format!(
                "Strong {} answer: \"{}\"",
                q.difficulty.as_str(),
                quote(&q.question)
            )
        })
        .collect();

    let improvements: Vec<String> = questions
        .iter()
        .filter(|q| q.penalty.is_some_and(|p| p >= WEAKNESS_PENALTY))
        .map(|q| {
            let reason = match q.answer.as_deref().map(str::trim) {
                None | Some("") => "no answer was given",
                _ => "the answer lacked depth or relevant detail",
            };
            format!("Revisit \"{}\": {reason}.", quote(&q.question))
        })
        .collect();

    let recommendations = build_recommendations(readiness, questions);

    let correct = questions
        .iter()
        .filter(|q| q.evaluation == Some(Evaluation::Correct))
        .count();
    let hardest = questions
        .iter()
        .map(|q| q.difficulty)
        .max()
        .unwrap_or(Difficulty::Easy);
    let detailed_feedback = format!(
        "You answered {correct} of {} questions fully for the {job_role} role and reached {} \
        difficulty. Your overall score is {overall_score}/100 ({}).",
        questions.len(),
        hardest.as_str(),
        readiness.label()
    );

    AnalysisResult {
        overall_score,
        readiness,
        strengths,
        improvements,
        recommendations,
        detailed_feedback,
        backend: Backend::Heuristic,
    }
}

fn build_recommendations(readiness: ReadinessStatus, questions: &[QuestionRecord]) -> Vec<String> {
    let mut recommendations = Vec::new();
    match readiness {
        ReadinessStatus::Ready => recommendations
            .push("You are ready for real interviews. Keep answers concise and structured.".to_string()),
        ReadinessStatus::NeedsPractice => recommendations.push(
            "Run another practice session and focus on the questions listed under improvements."
                .to_string(),
        ),
        ReadinessStatus::NotReady => recommendations.push(
            "Review the fundamentals for this role before your next practice session.".to_string(),
        ),
    }

    let unanswered = questions
        .iter()
        .filter(|q| q.answer.as_deref().map_or(true, |a| a.trim().is_empty()))
        .count();
    if unanswered > 0 {
        recommendations.push(format!(
            "Attempt every question; {unanswered} were left unanswered and scored the maximum penalty."
        ));
    }

    let partial = questions
        .iter()
        .filter(|q| q.evaluation == Some(Evaluation::Partial))
        .count();
    if partial > 0 {
        recommendations.push(
            "Use the STAR method (situation, task, action, result) to add concrete detail."
                .to_string(),
        );
    }

    recommendations
}

fn evaluation_label(evaluation: Evaluation) -> &'static str {
    match evaluation {
        Evaluation::Correct => "correct",
        Evaluation::Partial => "partial",
        Evaluation::Incorrect => "incorrect",
    }
}

fn quote(question: &str) -> String {
    if question.chars().count() <= MAX_QUOTED_CHARS {
        question.to_string()
    } else {
        let truncated: String = question.chars().take(MAX_QUOTED_CHARS).collect();
        format!("{}…", truncated.trim_end())
    }
}

fn non_empty(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
