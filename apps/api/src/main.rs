mod config;
mod cover_letter;
mod cv;
mod errors;
mod jobs;
mod llm_client;
mod matching;
mod models;
mod response;
mod routes;
mod session;
mod snapshot;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::cover_letter::{CoverLetterService, TextGenerator};
use crate::jobs::source::SerpApiClient;
use crate::llm_client::OpenAiClient;
use crate::matching::embeddings::{EmbeddingProvider, OpenAiEmbeddings};
use crate::matching::strategy::SimilarityEngine;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Job Matcher API v{}", env!("CARGO_PKG_VERSION"));

    if config.serpapi_key.is_none() {
        warn!("SERPAPI_KEY not configured. Job searches will fail until it is set in .env");
    }

    // OpenAI is optional: without it matching uses keywords and letters use the template
    let openai = match &config.openai_api_key {
        Some(key) => Some(OpenAiClient::new(key.clone()).context("building OpenAI client")?),
        None => {
            warn!("OPENAI_API_KEY not configured. Using simple keyword matching instead of embeddings");
            None
        }
    };

    let job_source = SerpApiClient::new(config.serpapi_key.clone(), config.serpapi_country.clone())
        .context("building SerpAPI client")?;

    let embeddings = openai
        .clone()
        .map(|client| Arc::new(OpenAiEmbeddings(client)) as Arc<dyn EmbeddingProvider>);
    let similarity = SimilarityEngine::new(
        embeddings,
        &config.embedding_cache,
        config.use_simple_matching,
    );

    let cover_letters = CoverLetterService::new(
        openai.map(|client| Arc::new(client) as Arc<dyn TextGenerator>),
    );

    let state = AppState::new(
        config.clone(),
        Arc::new(job_source),
        Arc::new(similarity),
        Arc::new(cover_letters),
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
