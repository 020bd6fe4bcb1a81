//! Reward and allotment amounts, fixed at composition time.

/// Credit amounts for each qualifying event plus the starter-plan allotment.
///
/// The two deployment shapes share every rule and differ only here: the
/// device-local profile store grants 30 credits per starter window, the
/// account-backed store grants 50.
#[derive(Debug, Clone, Copy)]
pub struct CreditPolicy {
    /// Credits granted when a profile is first created.
    pub signup_grant: i64,
    pub email_reward: i64,
    pub feedback_reward: i64,
    pub referral_reward: i64,
    /// Balance a starter plan resets to each window.
    pub starter_allotment: i64,
    /// Length of the starter reset/lapse window in days.
    pub plan_period_days: i64,
}

impl CreditPolicy {
    /// Policy for the device-local (anonymous) store.
    pub fn local() -> Self {
        CreditPolicy {
            signup_grant: 1,
            email_reward: 4,
            feedback_reward: 10,
            referral_reward: 15,
            starter_allotment: 30,
            plan_period_days: 30,
        }
    }

    /// Policy for the account-backed store: larger monthly allotment.
    pub fn server() -> Self {
        CreditPolicy {
            starter_allotment: 50,
            ..Self::local()
        }
    }
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self::local()
    }
}
