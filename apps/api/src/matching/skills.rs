//! Fixed-vocabulary skill extraction and overlap scoring.
//!
//! Pure functions: identical inputs always produce identical output.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Canonical skill name followed by the surface forms that count as a mention.
const SKILL_VOCABULARY: &[(&str, &[&str])] = &[
    // Languages
    ("javascript", &["javascript", "js", "ecmascript"]),
    ("typescript", &["typescript", "ts"]),
    ("python", &["python"]),
    ("java", &["java"]),
    ("kotlin", &["kotlin"]),
    ("swift", &["swift"]),
    ("c++", &["c++", "cpp"]),
    ("c#", &["c#", "csharp"]),
    ("go", &["golang", "go lang"]),
    ("rust", &["rust"]),
    ("ruby", &["ruby"]),
    ("php", &["php"]),
    ("scala", &["scala"]),
    ("sql", &["sql"]),
    ("html", &["html", "html5"]),
    ("css", &["css", "css3", "sass", "scss"]),
    // Frameworks & runtimes
    ("react", &["react", "reactjs", "react.js"]),
    ("angular", &["angular", "angularjs"]),
    ("vue", &["vue", "vuejs", "vue.js"]),
    ("next.js", &["next.js", "nextjs"]),
    ("node.js", &["node.js", "nodejs", "node"]),
    ("express", &["express", "express.js", "expressjs"]),
    ("django", &["django"]),
    ("flask", &["flask"]),
    ("spring", &["spring", "spring boot"]),
    (".net", &[".net", "dotnet", "asp.net"]),
    ("graphql", &["graphql"]),
    ("rest api", &["rest api", "rest apis", "restful"]),
    // Data
    ("mongodb", &["mongodb", "mongo", "mongoose"]),
    ("postgresql", &["postgresql", "postgres"]),
    ("mysql", &["mysql"]),
    ("redis", &["redis"]),
    ("elasticsearch", &["elasticsearch"]),
    ("kafka", &["kafka"]),
    // Cloud & ops
    ("aws", &["aws", "amazon web services"]),
    ("azure", &["azure"]),
    ("gcp", &["gcp", "google cloud"]),
    ("docker", &["docker"]),
    ("kubernetes", &["kubernetes", "k8s"]),
    ("terraform", &["terraform"]),
    ("ci/cd", &["ci/cd", "continuous integration", "continuous delivery"]),
    ("git", &["git"]),
    ("linux", &["linux"]),
    ("microservices", &["microservices", "microservice"]),
    // ML & data science
    ("machine learning", &["machine learning", "ml"]),
    ("deep learning", &["deep learning"]),
    ("nlp", &["nlp", "natural language processing"]),
    ("data analysis", &["data analysis", "data analytics"]),
    ("tensorflow", &["tensorflow"]),
    ("pytorch", &["pytorch"]),
    ("pandas", &["pandas"]),
    // Practices
    ("testing", &["unit testing", "test automation", "tdd", "testing"]),
    ("system design", &["system design", "distributed systems"]),
    ("data structures", &["data structures", "algorithms"]),
    ("security", &["security", "oauth", "authentication"]),
    ("agile", &["agile", "scrum", "kanban"]),
    ("figma", &["figma"]),
    ("ui/ux", &["ui/ux", "user experience", "ux design"]),
    // People skills
    ("communication", &["communication", "communicating"]),
    ("leadership", &["leadership", "mentoring", "mentored"]),
    ("teamwork", &["teamwork", "collaboration", "collaborative"]),
    ("problem solving", &["problem solving", "problem-solving", "troubleshooting"]),
    ("project management", &["project management", "stakeholder management"]),
    ("recruiting", &["recruiting", "recruitment", "talent acquisition", "sourcing"]),
    ("payroll", &["payroll"]),
    ("excel", &["excel", "spreadsheets"]),
];

struct SkillPattern {
    canonical: &'static str,
    regex: Regex,
}

fn skill_patterns() -> &'static [SkillPattern] {
    static PATTERNS: OnceLock<Vec<SkillPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        SKILL_VOCABULARY
            .iter()
            .filter_map(|(canonical, aliases)| {
                let alternation = aliases
                    .iter()
                    .map(|a| regex::escape(a))
                    .collect::<Vec<_>>()
                    .join("|");
                // Word boundaries that treat `+`, `#` and `.` as part of a token,
                // so `java` never fires inside `javascript` and `c` never alone.
                let pattern = format!(r"(?i)(?:^|[^a-z0-9+#.])(?:{alternation})(?:$|[^a-z0-9+#])");
                Regex::new(&pattern).ok().map(|regex| SkillPattern {
                    canonical,
                    regex,
                })
            })
            .collect()
    })
}

/// Extracts canonical skill names mentioned in `text`. Case-insensitive, word-bounded.
pub fn extract_skills(text: &str) -> BTreeSet<String> {
    if text.trim().is_empty() {
        return BTreeSet::new();
    }
    skill_patterns()
        .iter()
        .filter(|p| p.regex.is_match(text))
        .map(|p| p.canonical.to_string())
        .collect()
}

/// `round(100 × |resume ∩ job| / |job|)`, or 0 when the job lists no skills.
pub fn match_score(resume_skills: &BTreeSet<String>, job_skills: &BTreeSet<String>) -> u8 {
    if job_skills.is_empty() {
        return 0;
    }
    let matched = job_skills.intersection(resume_skills).count();
    ((matched as f64 / job_skills.len() as f64) * 100.0).round() as u8
}

/// Full comparison of a resume against a job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub resume_skills: BTreeSet<String>,
    pub job_skills: BTreeSet<String>,
    pub matched_skills: BTreeSet<String>,
    pub missing_skills: BTreeSet<String>,
    /// 0 – 100
    pub match_score: u8,
}

pub fn match_report(resume_text: &str, job_text: &str) -> MatchReport {
    let resume_skills = extract_skills(resume_text);
    let job_skills = extract_skills(job_text);
    let matched_skills = job_skills.intersection(&resume_skills).cloned().collect();
    let missing_skills = job_skills.difference(&resume_skills).cloned().collect();
    let match_score = match_score(&resume_skills, &job_skills);

    MatchReport {
        resume_skills,
        job_skills,
        matched_skills,
        missing_skills,
        match_score,
    }
}
