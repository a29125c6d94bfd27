mod config;
mod db;
mod embed_cache;
mod errors;
mod inference;
mod llm_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::embed_cache::{EmbedCache, RedisStore};
use crate::inference::retriever::PgContextRetriever;
use crate::llm_client::{LlmClient, RetryPolicy};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TagLens API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis (embedding cache store)
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // Initialize LLM client
    let retry = RetryPolicy {
        max_attempts: config.openai_max_retries,
        backoff_min: Duration::from_secs_f64(config.openai_backoff_min_secs),
        backoff_max: Duration::from_secs_f64(config.openai_backoff_max_secs),
    };
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        Duration::from_secs_f64(config.openai_timeout_secs),
        retry,
    )?;
    info!(
        "LLM client initialized (chat: {}, embeddings: {})",
        llm_client::CHAT_MODEL,
        llm_client::EMBEDDING_MODEL
    );

    // Embedding cache + pgvector-backed context retriever
    let cache = EmbedCache::new(Arc::new(RedisStore::new(redis)), Arc::new(llm.clone()));
    let retriever = Arc::new(PgContextRetriever::new(db, cache));

    // Build app state
    let state = AppState { llm, retriever };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
