//! Reward rules — pure `(profile, now) -> Option<profile>` transformations.
//!
//! Each guarded rule returns `None` when its one-time guard has already
//! fired; the caller treats that as a silent no-op, never an error. A rule
//! that does apply returns the fully updated profile so the caller persists
//! flag and balance in a single write — a flag set without its credit is
//! never observable.

use chrono::{DateTime, Duration, Utc};

use crate::credits::policy::CreditPolicy;
use crate::models::profile::{CreditProfile, Plan};

/// Records a captured email and grants the one-time email reward.
/// No-op if an email was already captured for this profile.
pub fn claim_email(
    profile: &CreditProfile,
    email: &str,
    now: DateTime<Utc>,
    policy: &CreditPolicy,
) -> Option<CreditProfile> {
    if profile.email.is_some() {
        return None;
    }
    let mut updated = profile.clone();
    updated.email = Some(email.to_string());
    updated.balance += policy.email_reward;
    updated.updated_at = now;
    Some(updated)
}

/// Grants the one-time feedback reward. No-op on a second submission,
/// regardless of what the presentation layer validated.
pub fn claim_feedback(
    profile: &CreditProfile,
    now: DateTime<Utc>,
    policy: &CreditPolicy,
) -> Option<CreditProfile> {
    if profile.has_submitted_feedback {
        return None;
    }
    let mut updated = profile.clone();
    updated.has_submitted_feedback = true;
    updated.balance += policy.feedback_reward;
    updated.updated_at = now;
    Some(updated)
}

/// Grants a referral reward. Repeatable — no guard, each application
/// increments the referral count and credits the fixed amount.
pub fn record_referral(
    profile: &CreditProfile,
    now: DateTime<Utc>,
    policy: &CreditPolicy,
) -> CreditProfile {
    let mut updated = profile.clone();
    updated.referral_count += 1;
    updated.balance += policy.referral_reward;
    updated.updated_at = now;
    updated
}

/// Activates the starter plan.
///
/// Subscription: balance resets to the allotment and the window anchor
/// moves to now. One-time earned: the balance is raised to the allotment
/// but never lowered, and the plan lapses when the window elapses.
pub fn activate_starter(
    profile: &CreditProfile,
    subscription: bool,
    now: DateTime<Utc>,
    policy: &CreditPolicy,
) -> CreditProfile {
    let mut updated = profile.clone();
    updated.plan = Plan::Starter;
    updated.subscription_active = subscription;
    updated.plan_started_at = now;
    if subscription {
        updated.balance = policy.starter_allotment;
        updated.plan_expires_at = Some(now + Duration::days(policy.plan_period_days));
    } else {
        updated.balance = updated.balance.max(policy.starter_allotment);
    }
    updated.updated_at = now;
    updated
}

/// Applies the 30-day plan window if it has elapsed.
///
/// Active subscription: balance resets to the allotment and the anchor
/// moves to now. Lapsed one-time plan: downgrade to free with balance 0.
/// Returns `None` when nothing is due (free plan, or window still open).
pub fn refresh_plan_window(
    profile: &CreditProfile,
    now: DateTime<Utc>,
    policy: &CreditPolicy,
) -> Option<CreditProfile> {
    if profile.plan != Plan::Starter {
        return None;
    }
    if now - profile.plan_started_at < Duration::days(policy.plan_period_days) {
        return None;
    }
    let mut updated = profile.clone();
    if profile.subscription_active {
        updated.balance = policy.starter_allotment;
        updated.plan_started_at = now;
        updated.plan_expires_at = Some(now + Duration::days(policy.plan_period_days));
    } else {
        updated.plan = Plan::Free;
        updated.balance = 0;
        updated.plan_expires_at = None;
    }
    updated.updated_at = now;
    Some(updated)
}
