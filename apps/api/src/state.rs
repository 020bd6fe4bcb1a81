use std::sync::Arc;

use crate::config::Config;
use crate::credits::service::CreditService;
use crate::generation::PostGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Entitlement store + reward rules + request gate, over the backend
    /// selected at startup (Postgres row or local JSON blob).
    pub credits: CreditService,
    /// Pluggable generation facade. `LlmPostGenerator` when an API key is
    /// configured, `MockGenerator` otherwise.
    pub generator: Arc<dyn PostGenerator>,
    pub config: Config,
}
