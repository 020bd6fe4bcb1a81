//! Credit service — the request gate plus reward application.
//!
//! Every operation is one load, an optional pure rule from `rules`, and one
//! wholesale save. The plan window rule runs on every read, so a lapsed or
//! due-for-reset starter plan is settled before any balance is inspected.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::credits::policy::CreditPolicy;
use crate::credits::rules;
use crate::credits::store::{CreditStore, StoreError};
use crate::models::profile::CreditProfile;

/// Result of the request gate. `Denied` means no mutation occurred and the
/// caller must not invoke generation.
#[derive(Debug)]
pub enum ConsumeOutcome {
    Granted(CreditProfile),
    Denied,
}

/// Result of a reward application. A duplicate claim is not an error: it
/// comes back with `applied: false` and the unchanged profile.
#[derive(Debug)]
pub struct RewardOutcome {
    pub profile: CreditProfile,
    pub applied: bool,
}

#[derive(Clone)]
pub struct CreditService {
    store: Arc<dyn CreditStore>,
    policy: CreditPolicy,
}

impl CreditService {
    pub fn new(store: Arc<dyn CreditStore>, policy: CreditPolicy) -> Self {
        CreditService { store, policy }
    }

    /// Loads the profile and settles the plan window if it has elapsed.
    pub async fn profile(&self, client_id: Uuid) -> Result<CreditProfile, StoreError> {
        let profile = self.store.load(client_id).await?;
        match rules::refresh_plan_window(&profile, Utc::now(), &self.policy) {
            Some(updated) => {
                info!(%client_id, plan = updated.plan.as_str(), "plan window settled");
                self.store.save(&updated).await?;
                Ok(updated)
            }
            None => Ok(profile),
        }
    }

    /// The request gate: checks the balance and debits exactly one unit.
    ///
    /// The debit lands before the generation call is made; a downstream
    /// failure does not refund it. Denial leaves the profile untouched.
    pub async fn try_consume(&self, client_id: Uuid) -> Result<ConsumeOutcome, StoreError> {
        self.profile(client_id).await?;
        match self.store.try_debit(client_id).await? {
            Some(profile) => Ok(ConsumeOutcome::Granted(profile)),
            None => Ok(ConsumeOutcome::Denied),
        }
    }

    pub async fn claim_email(
        &self,
        client_id: Uuid,
        email: &str,
    ) -> Result<RewardOutcome, StoreError> {
        let profile = self.profile(client_id).await?;
        self.apply(rules::claim_email(&profile, email, Utc::now(), &self.policy), profile)
            .await
    }

    pub async fn claim_feedback(&self, client_id: Uuid) -> Result<RewardOutcome, StoreError> {
        let profile = self.profile(client_id).await?;
        self.apply(rules::claim_feedback(&profile, Utc::now(), &self.policy), profile)
            .await
    }

    pub async fn record_referral(&self, client_id: Uuid) -> Result<RewardOutcome, StoreError> {
        let profile = self.profile(client_id).await?;
        let updated = rules::record_referral(&profile, Utc::now(), &self.policy);
        self.apply(Some(updated), profile).await
    }

    pub async fn activate_starter(
        &self,
        client_id: Uuid,
        subscription: bool,
    ) -> Result<CreditProfile, StoreError> {
        let profile = self.profile(client_id).await?;
        let updated = rules::activate_starter(&profile, subscription, Utc::now(), &self.policy);
        self.store.save(&updated).await?;
        info!(%client_id, subscription, "starter plan activated");
        Ok(updated)
    }

    /// Credits still claimable by this identity: unclaimed one-time rewards
    /// plus one referral for display, plus the trial credit once spent.
    pub async fn earnable_credits(&self, client_id: Uuid) -> Result<i64, StoreError> {
        let profile = self.profile(client_id).await?;
        let mut total = 0;
        if profile.has_used_trial {
            total += 1;
        }
        if !profile.has_claimed_email_reward() {
            total += self.policy.email_reward;
        }
        if !profile.has_submitted_feedback {
            total += self.policy.feedback_reward;
        }
        total += self.policy.referral_reward;
        Ok(total)
    }

    pub async fn reset(&self, client_id: Uuid) -> Result<(), StoreError> {
        self.store.reset(client_id).await
    }

    /// Persists a rule's output, or reports an absorbed duplicate claim.
    async fn apply(
        &self,
        outcome: Option<CreditProfile>,
        unchanged: CreditProfile,
    ) -> Result<RewardOutcome, StoreError> {
        match outcome {
            Some(updated) => {
                self.store.save(&updated).await?;
                Ok(RewardOutcome {
                    profile: updated,
                    applied: true,
                })
            }
            None => Ok(RewardOutcome {
                profile: unchanged,
                applied: false,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credits::local_store::LocalCreditStore;
    use crate::models::profile::Plan;
    use chrono::Duration;

    fn service(dir: &tempfile::TempDir) -> CreditService {
        let store = LocalCreditStore::new(dir.path().join("credits.json"), CreditPolicy::local());
        CreditService::new(Arc::new(store), CreditPolicy::local())
    }

    #[tokio::test]
    async fn test_gate_grants_then_denies_at_zero() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let id = Uuid::new_v4();

        match svc.try_consume(id).await.unwrap() {
            ConsumeOutcome::Granted(p) => assert_eq!(p.balance, 0),
            ConsumeOutcome::Denied => panic!("fresh identity must be granted"),
        }
        assert!(matches!(
            svc.try_consume(id).await.unwrap(),
            ConsumeOutcome::Denied
        ));
        assert_eq!(svc.profile(id).await.unwrap().balance, 0);
    }

    #[tokio::test]
    async fn test_duplicate_feedback_reports_not_applied() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let id = Uuid::new_v4();

        let first = svc.claim_feedback(id).await.unwrap();
        assert!(first.applied);
        assert_eq!(first.profile.balance, 11); // signup 1 + feedback 10

        let second = svc.claim_feedback(id).await.unwrap();
        assert!(!second.applied);
        assert_eq!(second.profile.balance, 11);
    }

    #[tokio::test]
    async fn test_email_reward_claimed_once() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let id = Uuid::new_v4();

        let first = svc.claim_email(id, "a@example.com").await.unwrap();
        assert!(first.applied);
        assert_eq!(first.profile.balance, 5); // signup 1 + email 4

        let second = svc.claim_email(id, "other@example.com").await.unwrap();
        assert!(!second.applied);
        assert_eq!(second.profile.email.as_deref(), Some("a@example.com"));
    }

    #[tokio::test]
    async fn test_referral_repeats() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let id = Uuid::new_v4();

        let first = svc.record_referral(id).await.unwrap();
        assert_eq!(first.profile.balance, 16);
        assert_eq!(first.profile.referral_count, 1);

        let second = svc.record_referral(id).await.unwrap();
        assert_eq!(second.profile.balance, 31);
        assert_eq!(second.profile.referral_count, 2);
    }

    #[tokio::test]
    async fn test_elapsed_subscription_resets_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let store = LocalCreditStore::new(dir.path().join("credits.json"), CreditPolicy::local());
        let id = Uuid::new_v4();

        let mut p = store.load(id).await.unwrap();
        p.plan = Plan::Starter;
        p.subscription_active = true;
        p.plan_started_at = Utc::now() - Duration::days(31);
        p.balance = 2;
        store.save(&p).await.unwrap();

        let refreshed = svc.profile(id).await.unwrap();
        assert_eq!(refreshed.balance, 30);
        assert_eq!(refreshed.plan, Plan::Starter);
        assert!(refreshed.plan_started_at > Utc::now() - Duration::minutes(1));
    }

    #[tokio::test]
    async fn test_lapsed_one_time_plan_denies_before_debit() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let store = LocalCreditStore::new(dir.path().join("credits.json"), CreditPolicy::local());
        let id = Uuid::new_v4();

        let mut p = store.load(id).await.unwrap();
        p.plan = Plan::Starter;
        p.subscription_active = false;
        p.plan_started_at = Utc::now() - Duration::days(31);
        p.balance = 5;
        store.save(&p).await.unwrap();

        // The window settles to free/0 on read, so the gate denies.
        assert!(matches!(
            svc.try_consume(id).await.unwrap(),
            ConsumeOutcome::Denied
        ));
        let after = svc.profile(id).await.unwrap();
        assert_eq!(after.plan, Plan::Free);
        assert_eq!(after.balance, 0);
    }

    #[tokio::test]
    async fn test_earnable_credits_shrink_as_rewards_claim() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let id = Uuid::new_v4();

        // Fresh: email 4 + feedback 10 + one referral 15.
        assert_eq!(svc.earnable_credits(id).await.unwrap(), 29);

        svc.claim_email(id, "a@example.com").await.unwrap();
        svc.claim_feedback(id).await.unwrap();
        svc.try_consume(id).await.unwrap();

        // Trial spent counts 1; only the referral remains claimable.
        assert_eq!(svc.earnable_credits(id).await.unwrap(), 16);
    }

    #[tokio::test]
    async fn test_reset_restores_fresh_profile() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let id = Uuid::new_v4();

        svc.claim_feedback(id).await.unwrap();
        svc.reset(id).await.unwrap();

        let p = svc.profile(id).await.unwrap();
        assert_eq!(p.balance, 1);
        assert!(!p.has_submitted_feedback);
    }
}
