//! Device-local credit store — one JSON blob on disk.
//!
//! Mirrors browser local storage: read on demand, write on every mutation,
//! no caching layer. A process-wide mutex serializes access, so the
//! decrement re-checks the balance under the lock; across processes this
//! store is best-effort only (no file locking), which is accepted.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::credits::policy::CreditPolicy;
use crate::credits::store::{CreditStore, StoreError};
use crate::models::profile::CreditProfile;

type Blob = BTreeMap<Uuid, CreditProfile>;

pub struct LocalCreditStore {
    path: PathBuf,
    policy: CreditPolicy,
    lock: Mutex<()>,
}

impl LocalCreditStore {
    pub fn new(path: impl Into<PathBuf>, policy: CreditPolicy) -> Self {
        LocalCreditStore {
            path: path.into(),
            policy,
            lock: Mutex::new(()),
        }
    }

    /// Reads the whole blob. A missing file is an empty blob; a corrupt
    /// file is a serialization failure and propagates.
    async fn read_blob(&self) -> Result<Blob, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Blob::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_blob(&self, blob: &Blob) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| *p != Path::new("")) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(blob)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }

    /// Get-or-create inside an already-held lock. Returns whether the blob
    /// was modified (a fresh profile was inserted).
    fn entry<'a>(&self, blob: &'a mut Blob, client_id: Uuid) -> (&'a mut CreditProfile, bool) {
        let created = !blob.contains_key(&client_id);
        let profile = blob
            .entry(client_id)
            .or_insert_with(|| CreditProfile::new(client_id, self.policy.signup_grant, Utc::now()));
        (profile, created)
    }
}

#[async_trait]
impl CreditStore for LocalCreditStore {
    async fn load(&self, client_id: Uuid) -> Result<CreditProfile, StoreError> {
        let _guard = self.lock.lock().await;
        let mut blob = self.read_blob().await?;
        let (profile, created) = self.entry(&mut blob, client_id);
        let profile = profile.clone();
        if created {
            self.write_blob(&blob).await?;
        }
        Ok(profile)
    }

    async fn save(&self, profile: &CreditProfile) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut blob = self.read_blob().await?;
        blob.insert(profile.client_id, profile.clone());
        self.write_blob(&blob).await
    }

    async fn try_debit(&self, client_id: Uuid) -> Result<Option<CreditProfile>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut blob = self.read_blob().await?;
        let (profile, created) = self.entry(&mut blob, client_id);
        if profile.balance <= 0 {
            // Denied: no mutation beyond persisting a freshly created profile.
            if created {
                self.write_blob(&blob).await?;
            }
            return Ok(None);
        }
        profile.balance -= 1;
        profile.has_used_trial = true;
        profile.updated_at = Utc::now();
        let granted = profile.clone();
        self.write_blob(&blob).await?;
        Ok(Some(granted))
    }

    async fn reset(&self, client_id: Uuid) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut blob = self.read_blob().await?;
        if blob.remove(&client_id).is_some() {
            self.write_blob(&blob).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::Plan;

    fn store(dir: &tempfile::TempDir) -> LocalCreditStore {
        LocalCreditStore::new(dir.path().join("credits.json"), CreditPolicy::local())
    }

    #[tokio::test]
    async fn test_first_load_creates_default_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let id = Uuid::new_v4();

        let p = store.load(id).await.unwrap();
        assert_eq!(p.balance, 1);
        assert_eq!(p.plan, Plan::Free);
        assert!(!p.has_submitted_feedback);
        assert_eq!(p.referral_count, 0);

        // The default profile was persisted, not just returned.
        let again = store.load(id).await.unwrap();
        assert_eq!(again, p);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let id = Uuid::new_v4();

        let mut p = store.load(id).await.unwrap();
        p.balance = 42;
        p.referral_count = 3;
        p.email = Some("a@example.com".to_string());
        store.save(&p).await.unwrap();

        assert_eq!(store.load(id).await.unwrap(), p);
    }

    #[tokio::test]
    async fn test_debit_sequence_stops_at_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let id = Uuid::new_v4();

        let granted = store.try_debit(id).await.unwrap().unwrap();
        assert_eq!(granted.balance, 0);
        assert!(granted.has_used_trial);

        // Second debit is refused and the balance stays at 0, not -1.
        assert!(store.try_debit(id).await.unwrap().is_none());
        assert_eq!(store.load(id).await.unwrap().balance, 0);
    }

    #[tokio::test]
    async fn test_denied_debit_does_not_mutate() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let id = Uuid::new_v4();

        let mut p = store.load(id).await.unwrap();
        p.balance = 0;
        store.save(&p).await.unwrap();

        assert!(store.try_debit(id).await.unwrap().is_none());
        let after = store.load(id).await.unwrap();
        assert!(!after.has_used_trial, "denied debit must not stamp the trial flag");
    }

    #[tokio::test]
    async fn test_reset_recreates_default_on_next_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let id = Uuid::new_v4();

        let mut p = store.load(id).await.unwrap();
        p.balance = 99;
        store.save(&p).await.unwrap();

        store.reset(id).await.unwrap();
        assert_eq!(store.load(id).await.unwrap().balance, 1);
    }

    #[tokio::test]
    async fn test_profiles_are_isolated_per_identity() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        store.try_debit(a).await.unwrap().unwrap();
        assert_eq!(store.load(a).await.unwrap().balance, 0);
        assert_eq!(store.load(b).await.unwrap().balance, 1);
    }

    #[tokio::test]
    async fn test_blob_written_by_older_build_loads_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credits.json");
        let id = Uuid::new_v4();
        std::fs::write(&path, format!(r#"{{"{id}": {{"client_id": "{id}", "balance": 7}}}}"#))
            .unwrap();

        let store = LocalCreditStore::new(path, CreditPolicy::local());
        let p = store.load(id).await.unwrap();
        assert_eq!(p.balance, 7);
        assert_eq!(p.plan, Plan::Free);
        assert!(!p.has_used_trial);
    }
}
