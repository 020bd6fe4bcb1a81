pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::credits::handlers as credit_handlers;
use crate::generation::handlers as generation_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation API (gated)
        .route(
            "/api/v1/posts",
            post(generation_handlers::handle_generate_post),
        )
        // Credits API
        .route(
            "/api/v1/credits/:client_id",
            get(credit_handlers::handle_get_profile).delete(credit_handlers::handle_reset),
        )
        .route(
            "/api/v1/credits/:client_id/earnable",
            get(credit_handlers::handle_get_earnable),
        )
        .route(
            "/api/v1/credits/email",
            post(credit_handlers::handle_claim_email),
        )
        .route(
            "/api/v1/credits/feedback",
            post(credit_handlers::handle_claim_feedback),
        )
        .route(
            "/api/v1/credits/referral",
            post(credit_handlers::handle_record_referral),
        )
        .route(
            "/api/v1/credits/plan",
            post(credit_handlers::handle_activate_plan),
        )
        .with_state(state)
}
