// LLM prompt templates for the interview pipeline.
// Placeholders in braces are filled by `fill` in a single pass; responses must
// match the JSON shape shown or the affected part falls back to its heuristic.

/// Opening question. Fill `{job_role}`, `{skills}`, `{max_questions}`, `{candidate_safe}`.
pub const OPENING_PROMPT_TEMPLATE: &str = r#"You are starting a practice interview for the role of {job_role}.
Candidate skills: {skills}

Write question 1 of {max_questions} at easy difficulty: fundamentals and background.

Return a JSON object with this EXACT schema:
{
  "question": "<the question text>"
}
{candidate_safe}"#;

/// One mid-interview turn: judge the answer and propose the next question at
/// every tier. The tier actually used is decided by the caller. Fill `{job_role}`,
/// `{skills}`, `{difficulty}`, `{question}`, `{answer}`, `{question_number}`,
/// `{max_questions}`, `{previous_questions}`, `{candidate_safe}`.
pub const NEXT_TURN_PROMPT_TEMPLATE: &str = r#"You are conducting a practice interview for the role of {job_role}.
Candidate skills: {skills}

Question ({difficulty}): {question}

Candidate answer (transcribed): {answer}

1. Classify the answer and assign a score penalty.
   Penalty guide: correct ≈ 5 or less, partial ≈ 10, incorrect 15-20.
2. Write interview question {question_number} of {max_questions} once for each difficulty:
   - easy: fundamentals and background
   - medium: applied, scenario-based
   - hard: design trade-offs, depth, edge cases
   Every question MUST be different from every question already asked:
{previous_questions}

Return a JSON object with this EXACT schema:
{
  "assessment": {
    "evaluation": "correct" | "partial" | "incorrect",
    "penalty": <integer 0-20>,
    "feedback": "<one or two sentences of constructive feedback>"
  },
  "next_questions": {
    "easy": "<question>",
    "medium": "<question>",
    "hard": "<question>"
  }
}
{candidate_safe}"#;

/// The last turn: judge the final answer and analyze the whole session.
/// Fill `{job_role}`, `{difficulty}`, `{question}`, `{answer}`, `{transcript}`,
/// `{scores}`, `{candidate_safe}`.
pub const FINAL_TURN_PROMPT_TEMPLATE: &str = r#"You are finishing a practice interview for the role of {job_role}.

Final question ({difficulty}): {question}

Candidate answer (transcribed): {answer}

Earlier questions and answers:
{transcript}

Results of the earlier questions (difficulty, evaluation, penalty):
{scores}

1. Classify the final answer and assign a score penalty.
   Penalty guide: correct ≈ 5 or less, partial ≈ 10, incorrect 15-20.
2. Analyze the whole session, final answer included. Base strengths and improvements
   only on what the candidate said.

Return a JSON object with this EXACT schema:
{
  "assessment": {
    "evaluation": "correct" | "partial" | "incorrect",
    "penalty": <integer 0-20>,
    "feedback": "<one or two sentences of constructive feedback>"
  },
  "analysis": {
    "overall_score": <integer 0-100>,
    "strengths": ["..."],
    "improvements": ["..."],
    "recommendations": ["..."],
    "detailed_feedback": "<a short paragraph addressed to the candidate>"
  }
}
{candidate_safe}"#;

/// Replaces `{name}` placeholders from `vars` in one left-to-right pass.
/// Substituted values are never rescanned, and braces that do not name a
/// known placeholder (such as the JSON schemas above) are kept as written.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
