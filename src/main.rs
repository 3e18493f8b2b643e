//! SmartTour India
//!
//! A single-page travel guide chat. Questions about travel in India are
//! forwarded to the Cohere chat API and the exchange is rendered as a
//! transcript, newest first.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod providers;
mod render;
mod routes;

use config::Config;
use crate::core::{ChatEngine, SessionStore};
use providers::{CohereProvider, LoggingProvider};
use render::PageRenderer;

/// How often idle sessions are purged
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChatEngine>,
    pub sessions: Arc<SessionStore>,
    pub renderer: Arc<PageRenderer>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smarttour=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let site = config.load_site()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!(
        model = %site.llm.model,
        suggestions = site.suggestions.len(),
        "🧭 Loaded site configuration"
    );

    let provider = Arc::new(LoggingProvider::new(Arc::new(CohereProvider::new(
        config.cohere_url.clone(),
        config.cohere_api_key.clone(),
    ))));

    let sessions = Arc::new(SessionStore::new(
        site.llm.system_prompt.clone(),
        config.session_ttl,
    ));

    sessions.clone().spawn_sweeper(SWEEP_INTERVAL);

    let state = AppState {
        engine: Arc::new(ChatEngine::new(provider, Arc::new(site))),
        sessions,
        renderer: Arc::new(PageRenderer::new()?),
    };

    let app = Router::new()
        .merge(routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("🔥 SmartTour running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
