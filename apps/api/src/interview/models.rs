//! Interview session entity and the value types that flow through the pipeline.
//!
//! The session is append-only while `in-progress`: every turn fills the pending
//! question and appends at most one new one. Once `completed` or `abandoned`
//! every mutating method refuses with `SessionError`.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Largest deduction a single answer can contribute.
pub const MAX_PENALTY: u8 = 20;

// ────────────────────────────────────────────────────────────────────────────
// Enums
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Moves `delta` tiers up (positive) or down (negative), saturating at the ends.
    pub fn shifted(self, delta: i8) -> Self {
        let index = (self.index() as i8 + delta).clamp(0, 2);
        Self::ALL[index as usize]
    }

    pub fn harder(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    fn index(self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    Correct,
    Partial,
    Incorrect,
}

/// Estimated from the transcript only. Biases difficulty; never shown to the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    Abandoned,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in-progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "in-progress" => Some(SessionStatus::InProgress),
            "completed" => Some(SessionStatus::Completed),
            "abandoned" => Some(SessionStatus::Abandoned),
            _ => None,
        }
    }
}

/// Text practice or voice practice. Only voice sessions consult body-language signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewMode {
    #[default]
    Practice,
    Voice,
}

impl InterviewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            InterviewMode::Practice => "practice",
            InterviewMode::Voice => "voice",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "practice" => Some(InterviewMode::Practice),
            "voice" => Some(InterviewMode::Voice),
            _ => None,
        }
    }
}

/// Which path produced a stored result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Llm,
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Posture {
    Stable,
    Shifting,
    Slouched,
}

/// Optional client-supplied signals from the voice/video interview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyLanguageSignals {
    /// Fraction of the answer spent looking at the camera, 0.0 – 1.0.
    pub eye_contact: Option<f32>,
    pub posture: Option<Posture>,
    /// 0.0 (calm) – 1.0 (very nervous).
    pub nervousness: Option<f32>,
}

/// Three-tier readiness label. `from_score` is the only place the thresholds live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessStatus {
    #[serde(rename = "READY")]
    Ready,
    #[serde(rename = "NEEDS PRACTICE")]
    NeedsPractice,
    #[serde(rename = "NOT READY")]
    NotReady,
}

impl ReadinessStatus {
    /// score ≥ 80 → READY, 60–79 → NEEDS PRACTICE, < 60 → NOT READY
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            ReadinessStatus::Ready
        } else if score >= 60 {
            ReadinessStatus::NeedsPractice
        } else {
            ReadinessStatus::NotReady
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReadinessStatus::Ready => "READY",
            ReadinessStatus::NeedsPractice => "NEEDS PRACTICE",
            ReadinessStatus::NotReady => "NOT READY",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Records
// ────────────────────────────────────────────────────────────────────────────

/// Result of evaluating one answer. Produced by the evaluator, persisted by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub evaluation: Evaluation,
    /// 0 – 20
    pub penalty: u8,
    pub confidence: ConfidenceLevel,
    pub feedback: Option<String>,
    pub backend: Backend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub difficulty: Difficulty,
    pub source: Backend,
    pub answer: Option<String>,
    pub evaluation: Option<Evaluation>,
    pub penalty: Option<u8>,
    pub confidence: Option<ConfidenceLevel>,
    pub feedback: Option<String>,
    pub asked_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

impl QuestionRecord {
    pub fn new(question: String, difficulty: Difficulty, source: Backend) -> Self {
        Self {
            question,
            difficulty,
            source,
            answer: None,
            evaluation: None,
            penalty: None,
            confidence: None,
            feedback: None,
            asked_at: Utc::now(),
            answered_at: None,
        }
    }

    pub fn is_answered(&self) -> bool {
        self.evaluation.is_some() && self.penalty.is_some()
    }
}

/// Final aggregate written once, at completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// 0 – 100
    pub overall_score: u8,
    pub readiness: ReadinessStatus,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub recommendations: Vec<String>,
    pub detailed_feedback: String,
    pub backend: Backend,
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("session is {} and can no longer change", .status.as_str())]
    NotInProgress { status: SessionStatus },

    #[error("the current question has already been answered")]
    AlreadyAnswered,

    #[error("the current question has not been answered yet")]
    AwaitingAnswer,

    #[error("question limit of {max} reached")]
    QuestionLimitReached { max: u32 },

    #[error("only {asked} of {max} questions have been answered")]
    Incomplete { asked: u32, max: u32 },
}

/// Parameters for starting a session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub candidate_id: String,
    pub candidate_email: Option<String>,
    pub job_role: String,
    pub skills: BTreeSet<String>,
    pub mode: InterviewMode,
    pub max_questions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSession {
    pub id: Uuid,
    pub candidate_id: String,
    pub candidate_email: Option<String>,
    pub job_role: String,
    pub skills: BTreeSet<String>,
    pub mode: InterviewMode,
    /// Chronological: index `i` is the `i + 1`-th question asked.
    pub questions: Vec<QuestionRecord>,
    /// Always equals `questions.len()`.
    pub asked_count: u32,
    pub max_questions: u32,
    pub status: SessionStatus,
    pub full_transcript: Option<String>,
    pub ai_analysis: Option<AnalysisResult>,
    /// Number of bank selections made so far; rotates which unused entry is picked.
    pub fallback_cursor: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl InterviewSession {
    /// Creates an in-progress session whose first question is already issued.
    pub fn start(params: NewSession, first_question: QuestionRecord) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            candidate_id: params.candidate_id,
            candidate_email: params.candidate_email,
            job_role: params.job_role,
            skills: params.skills,
            mode: params.mode,
            questions: vec![first_question],
            asked_count: 1,
            max_questions: params.max_questions.max(1),
            status: SessionStatus::InProgress,
            full_transcript: None,
            ai_analysis: None,
            fallback_cursor: 0,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// The question the candidate is expected to answer next: `questions[asked_count - 1]`.
    pub fn current_question(&self) -> Option<&QuestionRecord> {
        let index = (self.asked_count as usize).checked_sub(1)?;
        self.questions.get(index)
    }

    pub fn previous_questions(&self) -> Vec<&str> {
        self.questions.iter().map(|q| q.question.as_str()).collect()
    }

    pub fn ensure_in_progress(&self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::InProgress => Ok(()),
            status => Err(SessionError::NotInProgress { status }),
        }
    }

    /// True while the pending question is the last one the session allows.
    pub fn is_on_last_question(&self) -> bool {
        self.asked_count >= self.max_questions
    }

    /// True once the answer to the last permitted question has been recorded.
    pub fn is_due_for_completion(&self) -> bool {
        self.asked_count >= self.max_questions
            && self.current_question().map_or(false, QuestionRecord::is_answered)
    }

    /// Fills the pending question with the candidate's answer and its evaluation.
    pub fn record_answer(
        &mut self,
        answer: String,
        outcome: EvaluationOutcome,
    ) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        let index = (self.asked_count as usize)
            .checked_sub(1)
            .ok_or(SessionError::AlreadyAnswered)?;
        let record = self
            .questions
            .get_mut(index)
            .ok_or(SessionError::AlreadyAnswered)?;
        if record.is_answered() {
            return Err(SessionError::AlreadyAnswered);
        }

        let now = Utc::now();
        record.answer = Some(answer);
        record.evaluation = Some(outcome.evaluation);
        record.penalty = Some(outcome.penalty.min(MAX_PENALTY));
        record.confidence = Some(outcome.confidence);
        record.feedback = outcome.feedback;
        record.answered_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Appends the next question. Requires the current one to be answered.
    pub fn push_question(&mut self, record: QuestionRecord) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if self.asked_count >= self.max_questions {
            return Err(SessionError::QuestionLimitReached {
                max: self.max_questions,
            });
        }
        if !self.current_question().map_or(true, QuestionRecord::is_answered) {
            return Err(SessionError::AwaitingAnswer);
        }

        self.questions.push(record);
        self.asked_count += 1;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Freezes the terminal fields. Only valid once every question is answered.
    pub fn complete(
        &mut self,
        full_transcript: String,
        analysis: AnalysisResult,
    ) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        let answered = self.questions.iter().all(QuestionRecord::is_answered);
        if self.asked_count < self.max_questions || !answered {
            return Err(SessionError::Incomplete {
                asked: self.asked_count,
                max: self.max_questions,
            });
        }

        let now = Utc::now();
        self.full_transcript = Some(full_transcript);
        self.ai_analysis = Some(analysis);
        self.status = SessionStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn abandon(&mut self) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        self.status = SessionStatus::Abandoned;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Sum of recorded penalties across answered questions.
    pub fn total_penalty(&self) -> u32 {
        self.questions
            .iter()
            .filter_map(|q| q.penalty)
            .map(u32::from)
            .sum()
    }

    /// Plain-text Q/A transcript in the order the questions were asked.
    pub fn build_transcript(&self) -> String {
        transcript_of(&self.questions)
    }
}

/// Numbered `Q`/`A` transcript of the given questions; unanswered ones read `(no answer)`.
pub fn transcript_of(questions: &[QuestionRecord]) -> String {
    let mut transcript = String::new();
    for (i, q) in questions.iter().enumerate() {
        let n = i + 1;
        transcript.push_str(&format!(
            "Q{n} [{}]: {}\n",
            q.difficulty.as_str(),
            q.question
        ));
        let answer = q.answer.as_deref().map(str::trim).unwrap_or("");
        if answer.is_empty() {
            transcript.push_str(&format!("A{n}: (no answer)\n\n"));
        } else {
            transcript.push_str(&format!("A{n}: {answer}\n\n"));
        }
    }
    transcript.trim_end().to_string()
}

/// Deserializes an optional field, treating a value of the wrong shape as absent.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn question(text: &str) -> QuestionRecord {
        QuestionRecord::new(text.to_string(), Difficulty::Medium, Backend::Heuristic)
    }

    #[test]
    fn test_difficulty_shift_saturates() {
        assert_eq!(Difficulty::Easy.shifted(-1), Difficulty::Easy);
        assert_eq!(Difficulty::Easy.shifted(1), Difficulty::Medium);
        assert_eq!(Difficulty::Hard.shifted(1), Difficulty::Hard);
        assert_eq!(Difficulty::Medium.shifted(0), Difficulty::Medium);
        assert_eq!(Difficulty::Hard.harder(), None);
    }

    #[test]
    fn test_readiness_thresholds() {
        assert_eq!(ReadinessStatus::from_score(100), ReadinessStatus::Ready);
        assert_eq!(ReadinessStatus::from_score(80), ReadinessStatus::Ready);
        assert_eq!(ReadinessStatus::from_score(79), ReadinessStatus::NeedsPractice);
        assert_eq!(ReadinessStatus::from_score(60), ReadinessStatus::NeedsPractice);
        assert_eq!(ReadinessStatus::from_score(59), ReadinessStatus::NotReady);
        assert_eq!(ReadinessStatus::from_score(0), ReadinessStatus::NotReady);
    }

    #[test]
    fn test_readiness_mapping_is_total_and_monotonic() {
        let rank = |s: ReadinessStatus| match s {
            ReadinessStatus::NotReady => 0,
            ReadinessStatus::NeedsPractice => 1,
            ReadinessStatus::Ready => 2,
        };
        let mut last = 0;
        for score in 0..=100u8 {
            let r = rank(ReadinessStatus::from_score(score));
            assert!(r >= last, "readiness dropped at score {score}");
            last = r;
        }
    }

    #[test]
    fn test_readiness_serializes_as_labels() {
        let json = serde_json::to_string(&ReadinessStatus::NeedsPractice).unwrap();
        assert_eq!(json, r#""NEEDS PRACTICE""#);
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        let json = serde_json::to_string(&SessionStatus::InProgress).unwrap();
        assert_eq!(json, r#""in-progress""#);
        assert_eq!(SessionStatus::parse("in-progress"), Some(SessionStatus::InProgress));
    }

    #[test]
    fn test_new_session_has_one_pending_question() {
        let session = new_session(6);
        assert_eq!(session.asked_count, 1);
        assert_eq!(session.questions.len(), 1);
        assert_eq!(session.status, SessionStatus::InProgress);
        assert!(!session.current_question().unwrap().is_answered());
    }

    #[test]
    fn test_push_requires_answer_first() {
        let mut session = new_session(6);
        assert_eq!(
            session.push_question(question("Next?")),
            Err(SessionError::AwaitingAnswer)
        );
        session
            .record_answer("answer".into(), outcome(Evaluation::Partial, 10))
            .unwrap();
        session.push_question(question("Next?")).unwrap();
        assert_eq!(session.asked_count as usize, session.questions.len());
    }

    #[test]
    fn test_cannot_answer_twice() {
        let mut session = new_session(6);
        session
            .record_answer("a".into(), outcome(Evaluation::Correct, 5))
            .unwrap();
        assert_eq!(
            session.record_answer("b".into(), outcome(Evaluation::Correct, 5)),
            Err(SessionError::AlreadyAnswered)
        );
    }

    #[test]
    fn test_push_respects_question_limit() {
        let mut session = new_session(1);
        session
            .record_answer("a".into(), outcome(Evaluation::Correct, 5))
            .unwrap();
        assert_eq!(
            session.push_question(question("Extra?")),
            Err(SessionError::QuestionLimitReached { max: 1 })
        );
    }

    #[test]
    fn test_penalty_is_capped_on_record() {
        let mut session = new_session(1);
        session
            .record_answer("".into(), outcome(Evaluation::Incorrect, 55))
            .unwrap();
        assert_eq!(session.questions[0].penalty, Some(MAX_PENALTY));
    }

    #[test]
    fn test_complete_requires_all_answers() {
        let mut session = new_session(2);
        session
            .record_answer("a".into(), outcome(Evaluation::Correct, 5))
            .unwrap();
        assert!(matches!(
            session.complete(String::new(), analysis(95)),
            Err(SessionError::Incomplete { asked: 1, max: 2 })
        ));
    }

    #[test]
    fn test_completed_session_is_frozen() {
        let mut session = new_session(1);
        session
            .record_answer("a".into(), outcome(Evaluation::Correct, 5))
            .unwrap();
        assert!(session.is_due_for_completion());
        session.complete("transcript".into(), analysis(95)).unwrap();

        assert_eq!(session.status, SessionStatus::Completed);
        assert!(session.completed_at.is_some());
        assert!(matches!(
            session.record_answer("again".into(), outcome(Evaluation::Correct, 5)),
            Err(SessionError::NotInProgress { .. })
        ));
        assert!(session.abandon().is_err());
        assert_eq!(session.full_transcript.as_deref(), Some("transcript"));
    }

    #[test]
    fn test_abandon_from_in_progress() {
        let mut session = new_session(6);
        session.abandon().unwrap();
        assert_eq!(session.status, SessionStatus::Abandoned);
        assert!(session.push_question(question("x")).is_err());
    }

    #[test]
    fn test_transcript_lists_questions_in_order() {
        let mut session = new_session(2);
        session
            .record_answer("I build APIs.".into(), outcome(Evaluation::Correct, 5))
            .unwrap();
        session.push_question(question("What is SQL?")).unwrap();
        session
            .record_answer("   ".into(), outcome(Evaluation::Incorrect, 20))
            .unwrap();

        let transcript = session.build_transcript();
        assert!(transcript.starts_with("Q1 [easy]: Tell me about yourself."));
        assert!(transcript.contains("A1: I build APIs."));
        assert!(transcript.contains("Q2 [medium]: What is SQL?"));
        assert!(transcript.ends_with("A2: (no answer)"));
        assert_eq!(session.total_penalty(), 25);
    }

    #[test]
    fn test_last_question_tracks_limit() {
        let mut session = new_session(2);
        assert!(!session.is_on_last_question());
        session
            .record_answer("a".into(), outcome(Evaluation::Correct, 5))
            .unwrap();
        session.push_question(question("Next?")).unwrap();
        assert!(session.is_on_last_question());
    }

    #[derive(Debug, Deserialize)]
    struct WithPosture {
        #[serde(default, deserialize_with = "lenient")]
        posture: Option<Posture>,
    }

    #[test]
    fn test_lenient_field_drops_unknown_values() {
        let known: WithPosture = serde_json::from_str(r#"{"posture": "slouched"}"#).unwrap();
        assert_eq!(known.posture, Some(Posture::Slouched));

        let unknown: WithPosture = serde_json::from_str(r#"{"posture": "leaning"}"#).unwrap();
        assert_eq!(unknown.posture, None);

        let missing: WithPosture = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.posture, None);
    }
}
