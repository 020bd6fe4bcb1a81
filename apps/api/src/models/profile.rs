//! Credit profile — the single durable record the entitlement system owns.
//!
//! One profile exists per identity (anonymous device token or account id).
//! It is mutated exclusively through the reward rules and the request gate;
//! handlers never touch fields directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Service tier governing the monthly allotment and reset behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Starter,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Starter => "starter",
        }
    }

    /// Parses a stored plan string. Unknown values fall back to `Free`,
    /// matching the schema-evolution defaults for every other field.
    pub fn from_stored(s: &str) -> Plan {
        match s {
            "starter" => Plan::Starter,
            _ => Plan::Free,
        }
    }
}

impl Default for Plan {
    fn default() -> Self {
        Plan::Free
    }
}

/// One identity's entitlement state.
///
/// Every field carries a serde default so that records written by an older
/// build deserialize cleanly: missing fields take the fresh-profile values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditProfile {
    pub client_id: Uuid,
    /// Remaining usable credits. Never negative — a debit is refused, not
    /// clamped, when this reaches 0.
    #[serde(default)]
    pub balance: i64,
    #[serde(default)]
    pub plan: Plan,
    /// Captured email, if the email reward has been claimed. Presence of a
    /// value IS the one-time guard for that reward.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub has_submitted_feedback: bool,
    /// Set on the first granted debit. Display bookkeeping only — the gate
    /// itself cares about `balance` alone.
    #[serde(default)]
    pub has_used_trial: bool,
    #[serde(default)]
    pub referral_count: i64,
    /// Anchor for the 30-day plan window (activation or last reset).
    #[serde(default = "Utc::now")]
    pub plan_started_at: DateTime<Utc>,
    /// Set on subscription activation; informational for clients.
    #[serde(default)]
    pub plan_expires_at: Option<DateTime<Utc>>,
    /// When true the starter plan resets each window instead of lapsing.
    #[serde(default)]
    pub subscription_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl CreditProfile {
    /// Fresh profile for a first-seen identity: one trial credit, free plan,
    /// no rewards claimed.
    pub fn new(client_id: Uuid, signup_grant: i64, now: DateTime<Utc>) -> Self {
        CreditProfile {
            client_id,
            balance: signup_grant,
            plan: Plan::Free,
            email: None,
            has_submitted_feedback: false,
            has_used_trial: false,
            referral_count: 0,
            plan_started_at: now,
            plan_expires_at: None,
            subscription_active: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_claimed_email_reward(&self) -> bool {
        self.email.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_profile_defaults() {
        let now = Utc::now();
        let p = CreditProfile::new(Uuid::new_v4(), 1, now);
        assert_eq!(p.balance, 1);
        assert_eq!(p.plan, Plan::Free);
        assert!(!p.has_submitted_feedback);
        assert!(!p.has_used_trial);
        assert!(!p.has_claimed_email_reward());
        assert_eq!(p.referral_count, 0);
        assert_eq!(p.plan_started_at, now);
        assert!(p.plan_expires_at.is_none());
        assert!(!p.subscription_active);
    }

    #[test]
    fn test_partial_record_deserializes_with_defaults() {
        // A record written before the trial/referral fields existed.
        let id = Uuid::new_v4();
        let json = format!(r#"{{"client_id": "{id}", "balance": 3}}"#);
        let p: CreditProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(p.client_id, id);
        assert_eq!(p.balance, 3);
        assert_eq!(p.plan, Plan::Free);
        assert_eq!(p.referral_count, 0);
        assert!(!p.has_used_trial);
    }

    #[test]
    fn test_plan_from_stored_unknown_falls_back_to_free() {
        assert_eq!(Plan::from_stored("starter"), Plan::Starter);
        assert_eq!(Plan::from_stored("free"), Plan::Free);
        assert_eq!(Plan::from_stored("enterprise"), Plan::Free);
    }
}
