mod config;
mod credits;
mod errors;
mod generation;
mod llm_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StoreBackend};
use crate::credits::local_store::LocalCreditStore;
use crate::credits::pg_store::PgCreditStore;
use crate::credits::policy::CreditPolicy;
use crate::credits::service::CreditService;
use crate::credits::store::CreditStore;
use crate::generation::mock::MockGenerator;
use crate::generation::{LlmPostGenerator, PostGenerator};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PostPilot API v{}", env!("CARGO_PKG_VERSION"));

    // Compose the credit store. The allotment policy follows the backend:
    // account-backed profiles get the larger monthly allotment.
    let (store, policy): (Arc<dyn CreditStore>, CreditPolicy) = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required when CREDIT_STORE=postgres")?;
            info!("Connecting to PostgreSQL...");
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await?;
            let policy = CreditPolicy::server();
            let store = PgCreditStore::new(pool, policy);
            store.ensure_schema().await?;
            info!("Credit store: postgres");
            (Arc::new(store), policy)
        }
        StoreBackend::Local => {
            let policy = CreditPolicy::local();
            let store = LocalCreditStore::new(&config.credit_data_path, policy);
            info!("Credit store: local blob at {}", config.credit_data_path);
            (Arc::new(store), policy)
        }
    };

    let credits = CreditService::new(store, policy);

    // Generation facade: live client when a key is configured, mock otherwise.
    let generator: Arc<dyn PostGenerator> = match &config.openai_api_key {
        Some(key) => {
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(LlmPostGenerator::new(LlmClient::new(key.clone())))
        }
        None => {
            warn!("No OpenAI API key configured — serving mock variants");
            Arc::new(MockGenerator)
        }
    };

    let state = AppState {
        credits,
        generator,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
