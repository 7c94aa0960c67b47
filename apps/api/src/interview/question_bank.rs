//! Static per-tier question bank used when the LLM cannot supply a question.
//!
//! Skill-templated questions come first so fallback sessions still follow the
//! candidate's declared skills; generic role questions follow.

use std::collections::BTreeSet;

use crate::interview::models::Difficulty;

/// Always the first question of a session unless the model supplies one.
pub const OPENING_QUESTION: &str =
    "Tell me about yourself and what draws you to the {job_role} role.";

const EASY_SKILL_TEMPLATES: &[&str] = &[
    "How did you first start working with {skill}, and what do you use it for today?",
    "What are the core concepts someone new to {skill} should learn first?",
];

const MEDIUM_SKILL_TEMPLATES: &[&str] = &[
    "Walk me through a project where {skill} was central. What was your specific contribution?",
    "Describe a bug or production issue involving {skill} and how you tracked it down.",
];

const HARD_SKILL_TEMPLATES: &[&str] = &[
    "What are the main limitations of {skill} at scale, and how would you design around them?",
    "If you had to mentor a team adopting {skill}, which trade-offs and pitfalls would you warn them about?",
];

const EASY_GENERIC: &[&str] = &[
    "Tell me about yourself and what draws you to the {job_role} role.",
    "What does a typical working day look like for you in your current or most recent role?",
    "Which accomplishment from the last year are you most proud of, and why?",
    "How do you keep your skills up to date?",
    "What kind of team environment helps you do your best work?",
];

const MEDIUM_GENERIC: &[&str] = &[
    "Describe a time you had to meet a tight deadline. How did you prioritize?",
    "Tell me about a disagreement with a colleague and how you resolved it.",
    "How would you explain a complex part of your work to a non-technical stakeholder?",
    "Describe a situation where requirements changed late. What did you do?",
    "What steps do you take to make sure your work is correct before you hand it off?",
];

const HARD_GENERIC: &[&str] = &[
    "Describe the most difficult technical or organizational decision you have made. What alternatives did you reject?",
    "Tell me about a project that failed. What would you do differently with hindsight?",
    "How would you design the first ninety days of a {job_role} joining a struggling team?",
    "Describe a time you had to influence a decision without formal authority.",
    "How do you measure whether your work as a {job_role} is having real impact?",
];

/// Ordered candidate questions for one tier, with placeholders filled in.
pub fn questions_for(
    difficulty: Difficulty,
    job_role: &str,
    skills: &BTreeSet<String>,
) -> Vec<String> {
    let (templates, generic) = match difficulty {
        Difficulty::Easy => (EASY_SKILL_TEMPLATES, EASY_GENERIC),
        Difficulty::Medium => (MEDIUM_SKILL_TEMPLATES, MEDIUM_GENERIC),
        Difficulty::Hard => (HARD_SKILL_TEMPLATES, HARD_GENERIC),
    };

    let mut questions = Vec::new();
    for skill in skills {
        for template in templates {
            questions.push(template.replace("{skill}", skill));
        }
    }
    questions.extend(generic.iter().map(|q| q.replace("{job_role}", job_role)));
    questions
}

pub fn opening_question(job_role: &str) -> String {
    OPENING_QUESTION.replace("{job_role}", job_role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_templates_come_first() {
        let skills: BTreeSet<String> = ["rust".to_string()].into_iter().collect();
        let questions = questions_for(Difficulty::Medium, "Backend Engineer", &skills);
        assert!(questions[0].contains("rust"));
        assert_eq!(
            questions.len(),
            MEDIUM_SKILL_TEMPLATES.len() + MEDIUM_GENERIC.len()
        );
    }

    #[test]
    fn test_placeholders_are_filled() {
        let questions = questions_for(Difficulty::Hard, "Data Analyst", &BTreeSet::new());
        assert!(questions.iter().all(|q| !q.contains('{')));
        assert!(questions.iter().any(|q| q.contains("Data Analyst")));
    }

    #[test]
    fn test_opening_question_is_first_easy_generic() {
        let questions = questions_for(Difficulty::Easy, "Recruiter", &BTreeSet::new());
        assert_eq!(questions[0], opening_question("Recruiter"));
    }
}
