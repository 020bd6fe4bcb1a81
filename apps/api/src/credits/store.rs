//! Storage port for credit profiles.
//!
//! Two backends implement this trait: `PgCreditStore` (one row per identity)
//! and `LocalCreditStore` (one JSON blob on disk, browser-storage style).
//! The backend is chosen at startup and carried in `AppState` as
//! `Arc<dyn CreditStore>`; nothing above this trait knows which one runs.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::profile::CreditProfile;

/// Transient storage failures. Propagated unchanged to the caller — the
/// store never retries. "Not found" is NOT represented here: `load`
/// self-heals by creating a default profile.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("profile serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait CreditStore: Send + Sync {
    /// Returns the profile for `client_id`, creating and persisting the
    /// default profile on first access. Never fails with "not found".
    async fn load(&self, client_id: Uuid) -> Result<CreditProfile, StoreError>;

    /// Replaces the persisted profile wholesale. Last write wins; every
    /// save is visible to the next `load` in this process.
    async fn save(&self, profile: &CreditProfile) -> Result<(), StoreError>;

    /// Atomically decrements the balance by one if it is positive, stamping
    /// the trial flag in the same write. Returns the updated profile on
    /// grant, `None` (with no mutation) when the balance is already 0.
    async fn try_debit(&self, client_id: Uuid) -> Result<Option<CreditProfile>, StoreError>;

    /// Deletes the stored profile. The next `load` recreates the default.
    async fn reset(&self, client_id: Uuid) -> Result<(), StoreError>;
}
