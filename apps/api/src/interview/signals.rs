//! Hidden difficulty signals: transcript confidence and optional body language.
//!
//! Precedence is fixed and applied in one place, `difficulty_delta`:
//! 1. evaluation sets the base delta (correct +1, partial 0, incorrect -1)
//! 2. low confidence caps the delta at 0
//! 3. a struggling body-language signal subtracts one
//!
//! Positive body language never raises difficulty on its own.

use crate::interview::models::{BodyLanguageSignals, ConfidenceLevel, Evaluation, Posture};

const FILLER_WORDS: &[&str] = &["um", "umm", "uh", "uhh", "erm", "hmm", "ah"];

const HESITATION_PHRASES: &[&str] = &[
    "you know",
    "i think",
    "i guess",
    "maybe",
    "not sure",
    "kind of",
    "sort of",
    "i don't know",
    "i dont know",
];

const LOW_EYE_CONTACT: f32 = 0.4;
const HIGH_NERVOUSNESS: f32 = 0.7;

/// Estimates how confident an answer sounds from its length and hesitation markers.
pub fn estimate_confidence(transcript: &str) -> ConfidenceLevel {
    let lower = transcript.to_lowercase();
    let words: Vec<&str> = lower
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .filter(|w| !w.is_empty())
        .collect();

    if words.len() < 15 {
        return ConfidenceLevel::Low;
    }

    let fillers = words.iter().filter(|w| FILLER_WORDS.contains(w)).count();
    let phrases: usize = HESITATION_PHRASES
        .iter()
        .map(|p| lower.matches(p).count())
        .sum();
    let ratio = (fillers + phrases) as f64 / words.len() as f64;

    let sentences = lower
        .split(['.', '!', '?'])
        .filter(|s| s.split_whitespace().count() >= 3)
        .count();

    if ratio > 0.08 {
        ConfidenceLevel::Low
    } else if words.len() >= 40 && ratio <= 0.03 && sentences >= 3 {
        ConfidenceLevel::High
    } else {
        ConfidenceLevel::Medium
    }
}

/// True when any body-language signal indicates the candidate is struggling.
pub fn is_struggling(signals: &BodyLanguageSignals) -> bool {
    signals.eye_contact.is_some_and(|e| e < LOW_EYE_CONTACT)
        || signals.posture == Some(Posture::Slouched)
        || signals.nervousness.is_some_and(|n| n > HIGH_NERVOUSNESS)
}

/// Tier change for the next question: -1, 0 or +1.
///
/// `signals` is `None` outside voice sessions.
pub fn difficulty_delta(
    evaluation: Evaluation,
    confidence: ConfidenceLevel,
    signals: Option<&BodyLanguageSignals>,
) -> i8 {
    let mut delta: i8 = match evaluation {
        Evaluation::Correct => 1,
        Evaluation::Partial => 0,
        Evaluation::Incorrect => -1,
    };

    if confidence == ConfidenceLevel::Low {
        delta = delta.min(0);
    }

    if signals.is_some_and(is_struggling) {
        delta -= 1;
    }

    delta.clamp(-1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIDENT: &str = "I would start by profiling the service to find the hot path. \
        Then I would add an index on the lookup column and cache the read-heavy endpoints in Redis. \
        Finally I would load test the change in staging and compare p99 latency before rolling it out \
        behind a feature flag so we can revert quickly.";

    const HESITANT: &str = "Um, I think, uh, maybe you would, um, kind of add a cache or something, \
        I guess, you know, I'm not sure really, uh, how it works exactly in practice.";

    #[test]
    fn test_short_answer_is_low_confidence() {
        assert_eq!(estimate_confidence("Use an index."), ConfidenceLevel::Low);
        assert_eq!(estimate_confidence(""), ConfidenceLevel::Low);
    }

    #[test]
    fn test_fluent_answer_is_high_confidence() {
        assert_eq!(estimate_confidence(CONFIDENT), ConfidenceLevel::High);
    }

    #[test]
    fn test_filler_heavy_answer_is_low_confidence() {
        assert_eq!(estimate_confidence(HESITANT), ConfidenceLevel::Low);
    }

    #[test]
    fn test_base_delta_follows_evaluation() {
        let c = ConfidenceLevel::Medium;
        assert_eq!(difficulty_delta(Evaluation::Correct, c, None), 1);
        assert_eq!(difficulty_delta(Evaluation::Partial, c, None), 0);
        assert_eq!(difficulty_delta(Evaluation::Incorrect, c, None), -1);
    }

    #[test]
    fn test_low_confidence_holds_a_correct_answer() {
        assert_eq!(
            difficulty_delta(Evaluation::Correct, ConfidenceLevel::Low, None),
            0
        );
        assert_eq!(
            difficulty_delta(Evaluation::Incorrect, ConfidenceLevel::Low, None),
            -1
        );
    }

    #[test]
    fn test_struggling_body_language_downgrades() {
        let signals = BodyLanguageSignals {
            eye_contact: Some(0.2),
            ..Default::default()
        };
        assert_eq!(
            difficulty_delta(Evaluation::Correct, ConfidenceLevel::High, Some(&signals)),
            0
        );
        assert_eq!(
            difficulty_delta(Evaluation::Partial, ConfidenceLevel::High, Some(&signals)),
            -1
        );
        assert_eq!(
            difficulty_delta(Evaluation::Incorrect, ConfidenceLevel::High, Some(&signals)),
            -1
        );
    }

    #[test]
    fn test_positive_body_language_never_upgrades_alone() {
        let signals = BodyLanguageSignals {
            eye_contact: Some(0.95),
            posture: Some(Posture::Stable),
            nervousness: Some(0.1),
        };
        assert_eq!(
            difficulty_delta(Evaluation::Partial, ConfidenceLevel::High, Some(&signals)),
            0
        );
        assert_eq!(
            difficulty_delta(Evaluation::Correct, ConfidenceLevel::Low, Some(&signals)),
            0
        );
    }

    #[test]
    fn test_struggle_detection_thresholds() {
        assert!(is_struggling(&BodyLanguageSignals {
            posture: Some(Posture::Slouched),
            ..Default::default()
        }));
        assert!(is_struggling(&BodyLanguageSignals {
            nervousness: Some(0.9),
            ..Default::default()
        }));
        assert!(!is_struggling(&BodyLanguageSignals {
            posture: Some(Posture::Shifting),
            eye_contact: Some(0.5),
            nervousness: Some(0.5),
        }));
        assert!(!is_struggling(&BodyLanguageSignals::default()));
    }
}
