use anyhow::{bail, Context, Result};

/// Default number of questions in one interview run.
pub const DEFAULT_MAX_QUESTIONS: u32 = 6;

/// Which persistence backend holds interview sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Postgres,
    Memory,
}

impl SessionBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionBackend::Postgres => "postgres",
            SessionBackend::Memory => "memory",
        }
    }
}

/// Outbound mail settings. `api_url = None` means mail is only logged.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub session_backend: SessionBackend,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub llm_timeout_secs: u64,
    pub max_questions: u32,
    pub mail: MailConfig,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let session_backend = match optional_env("SESSION_STORE").as_deref() {
            None | Some("postgres") => SessionBackend::Postgres,
            Some("memory") => SessionBackend::Memory,
            Some(other) => bail!("SESSION_STORE must be 'postgres' or 'memory', got '{other}'"),
        };

        let database_url = match session_backend {
            SessionBackend::Postgres => Some(require_env("DATABASE_URL")?),
            SessionBackend::Memory => optional_env("DATABASE_URL"),
        };

        let max_questions = parse_env("INTERVIEW_MAX_QUESTIONS", DEFAULT_MAX_QUESTIONS)?;
        if max_questions == 0 {
            bail!("INTERVIEW_MAX_QUESTIONS must be at least 1");
        }

        Ok(Config {
            database_url,
            session_backend,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 20)?,
            max_questions,
            mail: MailConfig {
                api_url: optional_env("MAIL_API_URL"),
                api_key: optional_env("MAIL_API_KEY"),
                from: optional_env("MAIL_FROM")
                    .unwrap_or_else(|| "no-reply@interview.local".to_string()),
            },
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Returns the variable if it is set and non-blank.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .ok()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}
