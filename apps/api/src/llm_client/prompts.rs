// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts alongside it;
// this file holds the cross-cutting fragments.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Reminder appended to every interviewer prompt: the candidate never sees scoring internals.
pub const CANDIDATE_SAFE_INSTRUCTION: &str = "\
    Never mention confidence, hesitation, body language or scoring penalties \
    in any text that could be shown to the candidate.";
