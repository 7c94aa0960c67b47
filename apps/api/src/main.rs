mod config;
mod db;
mod errors;
mod interview;
mod llm_client;
mod mail;
mod matching;
mod models;
mod routes;
mod state;
mod storage;
mod store;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, SessionBackend};
use crate::db::create_pool;
use crate::interview::engine::InterviewEngine;
use crate::llm_client::LlmClient;
use crate::mail::mailer_from_config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::S3DocumentStore;
use crate::store::{MemorySessionStore, PgSessionStore, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Session persistence
    let sessions: Arc<dyn SessionStore> = match (&config.session_backend, &config.database_url) {
        (SessionBackend::Postgres, Some(url)) => Arc::new(PgSessionStore::new(create_pool(url).await?)),
        (SessionBackend::Postgres, None) => anyhow::bail!("DATABASE_URL is required for the postgres session store"),
        (SessionBackend::Memory, _) => {
            info!("Using in-memory session store; sessions are lost on restart");
            Arc::new(MemorySessionStore::new())
        }
    };

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    let documents = Arc::new(S3DocumentStore::new(s3, config.s3_bucket.clone()));
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // Initialize LLM client
    let llm = Arc::new(LlmClient::new(
        config.anthropic_api_key.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    ));
    info!(
        "LLM client initialized (model: {}, timeout: {}s)",
        llm_client::MODEL,
        config.llm_timeout_secs
    );

    let mailer = mailer_from_config(&config.mail);

    let engine = InterviewEngine::new(sessions, llm, mailer, config.max_questions);

    // Build app state
    let state = AppState {
        engine: Arc::new(engine),
        documents,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "interview-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
