//! Emails the final results to the candidate.
//!
//! Delivery is best-effort: failures are logged and never touch the session.

use askama::Template;
use tracing::{debug, warn};

use crate::interview::models::{Evaluation, InterviewSession, ReadinessStatus};
use crate::mail::Mailer;

/// Sends the results email if the session has an address and an analysis.
/// Returns whether a message was handed to the mailer successfully.
pub async fn notify_results(mailer: &dyn Mailer, session: &InterviewSession) -> bool {
    let Some(to) = session.candidate_email.as_deref().filter(|e| !e.trim().is_empty()) else {
        debug!("Session {} has no candidate email; skipping results mail", session.id);
        return false;
    };
    let Some(html) = render_results_email(session) else {
        return false;
    };
    let subject = results_subject(session);

    match mailer.send(to, &subject, &html).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Results mail for session {} failed: {e}", session.id);
            false
        }
    }
}

pub fn results_subject(session: &InterviewSession) -> String {
    let readiness = session
        .ai_analysis
        .as_ref()
        .map(|a| a.readiness.label())
        .unwrap_or("RESULTS");
    format!("Your {} practice interview: {readiness}", session.job_role)
}

#[derive(Template)]
#[template(source = r#"<html>
<body style="font-family: Arial, sans-serif; color: #24292f;">
<h2>Practice interview results: {{ job_role }}</h2>
<p style="font-size: 18px;">Overall score: <strong>{{ overall_score }}/100</strong>
<span style="color: {{ color }}; font-weight: bold;">{{ readiness }}</span></p>
<p>{{ detailed_feedback }}</p>
{% if has_strengths %}
<h3>Strengths</h3>
<ul>
{% for item in strengths %}<li>{{ item }}</li>
{% endfor %}</ul>
{% endif %}
{% if has_improvements %}
<h3>Areas to improve</h3>
<ul>
{% for item in improvements %}<li>{{ item }}</li>
{% endfor %}</ul>
{% endif %}
{% if has_recommendations %}
<h3>Recommendations</h3>
<ul>
{% for item in recommendations %}<li>{{ item }}</li>
{% endfor %}</ul>
{% endif %}
<h3>Questions</h3>
<table cellpadding="6" style="border-collapse: collapse;">
<tr><th align="left">#</th><th align="left">Question</th><th align="left">Level</th><th align="left">Result</th></tr>
{% for row in questions %}<tr><td>{{ row.number }}</td><td>{{ row.question }}</td><td>{{ row.difficulty }}</td><td>{{ row.result }}</td></tr>
{% endfor %}</table>
</body>
</html>"#, ext = "html")]
struct ResultsEmail<'a> {
    job_role: &'a str,
    overall_score: u8,
    readiness: &'static str,
    color: &'static str,
    detailed_feedback: &'a str,
    strengths: &'a [String],
    has_strengths: bool,
    improvements: &'a [String],
    has_improvements: bool,
    recommendations: &'a [String],
    has_recommendations: bool,
    questions: Vec<QuestionRow<'a>>,
}

struct QuestionRow<'a> {
    number: usize,
    question: &'a str,
    difficulty: &'static str,
    result: &'static str,
}

/// Renders the results email. `None` until the session has been analyzed.
pub fn render_results_email(session: &InterviewSession) -> Option<String> {
    let analysis = session.ai_analysis.as_ref()?;

    let color = match analysis.readiness {
        ReadinessStatus::Ready => "#1a7f37",
        ReadinessStatus::NeedsPractice => "#9a6700",
        ReadinessStatus::NotReady => "#cf222e",
    };

    let questions = session
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| QuestionRow {
            number: i + 1,
            question: &q.question,
            difficulty: q.difficulty.as_str(),
            result: match q.evaluation {
                Some(Evaluation::Correct) => "correct",
                Some(Evaluation::Partial) => "partial",
                Some(Evaluation::Incorrect) => "incorrect",
                None => "unanswered",
            },
        })
        .collect();

    let email = ResultsEmail {
        job_role: &session.job_role,
        overall_score: analysis.overall_score,
        readiness: analysis.readiness.label(),
        color,
        detailed_feedback: &analysis.detailed_feedback,
        strengths: &analysis.strengths,
        has_strengths: !analysis.strengths.is_empty(),
        improvements: &analysis.improvements,
        has_improvements: !analysis.improvements.is_empty(),
        recommendations: &analysis.recommendations,
        has_recommendations: !analysis.recommendations.is_empty(),
        questions,
    };

    match email.render() {
        Ok(html) => Some(html),
        Err(e) => {
            warn!("Results mail for session {} could not be rendered: {e}", session.id);
            None
        }
    }
}
