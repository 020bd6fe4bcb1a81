use anyhow::{bail, Context, Result};

/// Which credit store backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// One `credit_profiles` row per identity; 50-credit starter allotment.
    Postgres,
    /// One JSON blob on disk; 30-credit starter allotment. Best-effort
    /// across processes.
    Local,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    /// Required when `store_backend` is Postgres.
    pub database_url: Option<String>,
    /// Blob path for the local store.
    pub credit_data_path: String,
    /// Absent or placeholder key means the mock generator is served.
    pub openai_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let store_backend = match std::env::var("CREDIT_STORE").as_deref() {
            Ok("postgres") => StoreBackend::Postgres,
            Ok("local") | Err(_) => StoreBackend::Local,
            Ok(other) => bail!("CREDIT_STORE must be 'postgres' or 'local', got '{other}'"),
        };

        let database_url = std::env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL is required when CREDIT_STORE=postgres");
        }

        Ok(Config {
            store_backend,
            database_url,
            credit_data_path: std::env::var("CREDIT_DATA_PATH")
                .unwrap_or_else(|_| "data/postpilot_credits.json".to_string()),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| {
                // Placeholder keys from env templates count as unconfigured.
                !k.trim().is_empty() && k != "your_openai_api_key_here"
            }),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
