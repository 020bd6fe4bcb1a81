//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::credits::service::ConsumeOutcome;
use crate::errors::AppError;
use crate::generation::{Mode, Tone};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GeneratePostRequest {
    pub client_id: Uuid,
    pub mode: Mode,
    pub tone: Tone,
    pub input: String,
}

#[derive(Debug, Serialize)]
pub struct GeneratePostResponse {
    pub variants: Vec<String>,
    pub remaining_credits: i64,
}

/// POST /api/v1/posts
///
/// The gated generation call: one credit is debited before the provider is
/// invoked. A provider failure after the debit does not refund the credit.
pub async fn handle_generate_post(
    State(state): State<AppState>,
    Json(request): Json<GeneratePostRequest>,
) -> Result<Json<GeneratePostResponse>, AppError> {
    if request.input.trim().is_empty() {
        return Err(AppError::Validation("input cannot be empty".to_string()));
    }

    let profile = match state.credits.try_consume(request.client_id).await? {
        ConsumeOutcome::Granted(profile) => profile,
        ConsumeOutcome::Denied => return Err(AppError::InsufficientCredits),
    };

    let variants = state
        .generator
        .generate(request.mode, request.tone, request.input.trim())
        .await?;

    Ok(Json(GeneratePostResponse {
        variants,
        remaining_credits: profile.balance,
    }))
}
