//! Axum route handlers for the Credits API.
//!
//! Handlers validate request shape only; every entitlement decision lives
//! in `credits::service` and `credits::rules`. Duplicate reward claims come
//! back as `applied: false` with HTTP 200, never as an error status.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::credits::service::RewardOutcome;
use crate::errors::AppError;
use crate::models::profile::CreditProfile;
use crate::state::AppState;

/// Feedback shorter than this is rejected before the rule runs.
const MIN_FEEDBACK_LEN: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: CreditProfile,
}

#[derive(Debug, Serialize)]
pub struct RewardResponse {
    pub applied: bool,
    pub profile: CreditProfile,
}

impl From<RewardOutcome> for RewardResponse {
    fn from(outcome: RewardOutcome) -> Self {
        RewardResponse {
            applied: outcome.applied,
            profile: outcome.profile,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EarnableResponse {
    pub earnable_credits: i64,
}

#[derive(Debug, Deserialize)]
pub struct EmailRewardRequest {
    pub client_id: Uuid,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRewardRequest {
    pub client_id: Uuid,
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct ReferralRequest {
    pub client_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ActivatePlanRequest {
    pub client_id: Uuid,
    pub subscription: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/credits/:client_id
///
/// Returns the profile, settling the plan window first.
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state.credits.profile(client_id).await?;
    Ok(Json(ProfileResponse { profile }))
}

/// GET /api/v1/credits/:client_id/earnable
pub async fn handle_get_earnable(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<EarnableResponse>, AppError> {
    let earnable_credits = state.credits.earnable_credits(client_id).await?;
    Ok(Json(EarnableResponse { earnable_credits }))
}

/// POST /api/v1/credits/email
pub async fn handle_claim_email(
    State(state): State<AppState>,
    Json(request): Json<EmailRewardRequest>,
) -> Result<Json<RewardResponse>, AppError> {
    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("a valid email is required".to_string()));
    }

    let outcome = state.credits.claim_email(request.client_id, email).await?;
    Ok(Json(outcome.into()))
}

/// POST /api/v1/credits/feedback
///
/// Rating and minimum length are checked here; the second-submission guard
/// is the rule's own and holds regardless of this validation.
pub async fn handle_claim_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRewardRequest>,
) -> Result<Json<RewardResponse>, AppError> {
    if !(1..=5).contains(&request.rating) {
        return Err(AppError::Validation(
            "rating must be between 1 and 5".to_string(),
        ));
    }
    if request.comment.trim().len() < MIN_FEEDBACK_LEN {
        return Err(AppError::Validation(format!(
            "comment must be at least {MIN_FEEDBACK_LEN} characters"
        )));
    }

    let outcome = state.credits.claim_feedback(request.client_id).await?;
    Ok(Json(outcome.into()))
}

/// POST /api/v1/credits/referral
pub async fn handle_record_referral(
    State(state): State<AppState>,
    Json(request): Json<ReferralRequest>,
) -> Result<Json<RewardResponse>, AppError> {
    let outcome = state.credits.record_referral(request.client_id).await?;
    Ok(Json(outcome.into()))
}

/// POST /api/v1/credits/plan
pub async fn handle_activate_plan(
    State(state): State<AppState>,
    Json(request): Json<ActivatePlanRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state
        .credits
        .activate_starter(request.client_id, request.subscription)
        .await?;
    Ok(Json(ProfileResponse { profile }))
}

/// DELETE /api/v1/credits/:client_id
///
/// Explicit reset: the next load recreates the default profile.
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.credits.reset(client_id).await?;
    Ok(Json(serde_json::json!({ "reset": true })))
}
