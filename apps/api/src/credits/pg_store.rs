//! Account-backed credit store — one `credit_profiles` row per identity.
//!
//! The debit path uses a conditional UPDATE (`balance > 0` in the WHERE
//! clause) so two concurrent requests against the same identity cannot both
//! spend the last credit; the loser observes zero rows and is denied.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::credits::policy::CreditPolicy;
use crate::credits::store::{CreditStore, StoreError};
use crate::models::profile::{CreditProfile, Plan};

pub struct PgCreditStore {
    pool: PgPool,
    policy: CreditPolicy,
}

impl PgCreditStore {
    pub fn new(pool: PgPool, policy: CreditPolicy) -> Self {
        PgCreditStore { pool, policy }
    }

    /// Creates the `credit_profiles` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS credit_profiles (
                client_id             UUID PRIMARY KEY,
                balance               BIGINT NOT NULL,
                plan                  TEXT NOT NULL,
                email                 TEXT,
                has_submitted_feedback BOOLEAN NOT NULL,
                has_used_trial        BOOLEAN NOT NULL,
                referral_count        BIGINT NOT NULL,
                plan_started_at       TIMESTAMPTZ NOT NULL,
                plan_expires_at       TIMESTAMPTZ,
                subscription_active   BOOLEAN NOT NULL,
                created_at            TIMESTAMPTZ NOT NULL,
                updated_at            TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Raw row shape. Kept separate from the domain profile so the plan column
/// stays plain TEXT and unknown values degrade to the free tier on read.
#[derive(Debug, FromRow)]
struct ProfileRow {
    client_id: Uuid,
    balance: i64,
    plan: String,
    email: Option<String>,
    has_submitted_feedback: bool,
    has_used_trial: bool,
    referral_count: i64,
    plan_started_at: DateTime<Utc>,
    plan_expires_at: Option<DateTime<Utc>>,
    subscription_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for CreditProfile {
    fn from(row: ProfileRow) -> Self {
        CreditProfile {
            client_id: row.client_id,
            balance: row.balance,
            plan: Plan::from_stored(&row.plan),
            email: row.email,
            has_submitted_feedback: row.has_submitted_feedback,
            has_used_trial: row.has_used_trial,
            referral_count: row.referral_count,
            plan_started_at: row.plan_started_at,
            plan_expires_at: row.plan_expires_at,
            subscription_active: row.subscription_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const ALL_COLUMNS: &str = "client_id, balance, plan, email, has_submitted_feedback, \
    has_used_trial, referral_count, plan_started_at, plan_expires_at, \
    subscription_active, created_at, updated_at";

#[async_trait]
impl CreditStore for PgCreditStore {
    async fn load(&self, client_id: Uuid) -> Result<CreditProfile, StoreError> {
        let defaults = CreditProfile::new(client_id, self.policy.signup_grant, Utc::now());

        // Get-or-create: insert the default row, losing to any existing one.
        sqlx::query(
            r#"
            INSERT INTO credit_profiles
                (client_id, balance, plan, email, has_submitted_feedback,
                 has_used_trial, referral_count, plan_started_at, plan_expires_at,
                 subscription_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (client_id) DO NOTHING
            "#,
        )
        .bind(defaults.client_id)
        .bind(defaults.balance)
        .bind(defaults.plan.as_str())
        .bind(&defaults.email)
        .bind(defaults.has_submitted_feedback)
        .bind(defaults.has_used_trial)
        .bind(defaults.referral_count)
        .bind(defaults.plan_started_at)
        .bind(defaults.plan_expires_at)
        .bind(defaults.subscription_active)
        .bind(defaults.created_at)
        .bind(defaults.updated_at)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {ALL_COLUMNS} FROM credit_profiles WHERE client_id = $1"
        ))
        .bind(client_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn save(&self, profile: &CreditProfile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO credit_profiles
                (client_id, balance, plan, email, has_submitted_feedback,
                 has_used_trial, referral_count, plan_started_at, plan_expires_at,
                 subscription_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (client_id) DO UPDATE SET
                balance = EXCLUDED.balance,
                plan = EXCLUDED.plan,
                email = EXCLUDED.email,
                has_submitted_feedback = EXCLUDED.has_submitted_feedback,
                has_used_trial = EXCLUDED.has_used_trial,
                referral_count = EXCLUDED.referral_count,
                plan_started_at = EXCLUDED.plan_started_at,
                plan_expires_at = EXCLUDED.plan_expires_at,
                subscription_active = EXCLUDED.subscription_active,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(profile.client_id)
        .bind(profile.balance)
        .bind(profile.plan.as_str())
        .bind(&profile.email)
        .bind(profile.has_submitted_feedback)
        .bind(profile.has_used_trial)
        .bind(profile.referral_count)
        .bind(profile.plan_started_at)
        .bind(profile.plan_expires_at)
        .bind(profile.subscription_active)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn try_debit(&self, client_id: Uuid) -> Result<Option<CreditProfile>, StoreError> {
        // Make sure the row exists so a fresh identity spends its trial credit.
        self.load(client_id).await?;

        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            UPDATE credit_profiles
            SET balance = balance - 1, has_used_trial = TRUE, updated_at = $2
            WHERE client_id = $1 AND balance > 0
            RETURNING {ALL_COLUMNS}
            "#
        ))
        .bind(client_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn reset(&self, client_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM credit_profiles WHERE client_id = $1")
            .bind(client_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
