// Adaptive interview engine: answer evaluation, question selection, session
// aggregation and results mail. `turn` makes the single LLM call behind each
// operation; every component falls back to a deterministic heuristic for its
// part of the reply when the model cannot be used.

pub mod analyzer;
pub mod engine;
pub mod evaluator;
pub mod handlers;
pub mod models;
pub mod notifier;
pub mod prompts;
pub mod question_bank;
pub mod selector;
pub mod signals;
pub mod turn;
