//! File-backed onboarding store.
//!
//! One JSON document per identity under `data_dir/onboarding/`. Upsert is
//! a read-modify-write merge, so a patch never clobbers fields it does
//! not carry.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use aps_core::onboarding::{OnboardingPatch, OnboardingRecord};
use aps_core::ports::{JobApplication, OnboardingStorePort, StoreError};
use aps_core::session::IdentityId;

pub struct FileOnboardingStore {
    onboarding_dir: PathBuf,
    applications_dir: PathBuf,
}

impl FileOnboardingStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            onboarding_dir: data_dir.join("onboarding"),
            applications_dir: data_dir.join("applications"),
        }
    }

    fn record_path(&self, user_id: &IdentityId) -> PathBuf {
        self.onboarding_dir.join(format!("{}.json", user_id))
    }

    fn applications_path(&self, user_id: &IdentityId) -> PathBuf {
        self.applications_dir.join(format!("{}.json", user_id))
    }

    async fn read_record(
        &self,
        user_id: &IdentityId,
    ) -> Result<Option<OnboardingRecord>, StoreError> {
        let path = self.record_path(user_id);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Io(err.to_string())),
        };
        let record: OnboardingRecord =
            serde_json::from_str(&raw).map_err(|err| StoreError::Corrupt(err.to_string()))?;
        Ok(Some(record))
    }

    async fn write_record(&self, record: &OnboardingRecord) -> Result<(), StoreError> {
        fs::create_dir_all(&self.onboarding_dir)
            .await
            .map_err(|err| StoreError::Io(err.to_string()))?;
        let raw = serde_json::to_string_pretty(record)
            .map_err(|err| StoreError::Io(err.to_string()))?;
        let path = self.record_path(&record.user_id);
        // Write then rename so a crash mid-write cannot corrupt the record.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, raw)
            .await
            .map_err(|err| StoreError::Io(err.to_string()))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|err| StoreError::Io(err.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl OnboardingStorePort for FileOnboardingStore {
    async fn get(&self, user_id: &IdentityId) -> Result<Option<OnboardingRecord>, StoreError> {
        self.read_record(user_id).await
    }

    async fn upsert(
        &self,
        user_id: &IdentityId,
        patch: OnboardingPatch,
    ) -> Result<OnboardingRecord, StoreError> {
        let mut record = self
            .read_record(user_id)
            .await?
            .unwrap_or_else(|| OnboardingRecord::fresh(user_id.clone()));
        record.apply(patch);
        self.write_record(&record).await?;
        debug!(user = %user_id, "onboarding record persisted");
        Ok(record)
    }

    async fn list_applications(
        &self,
        user_id: &IdentityId,
    ) -> Result<Vec<JobApplication>, StoreError> {
        let path = self.applications_path(user_id);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::Io(err.to_string())),
        };
        let mut applications: Vec<JobApplication> =
            serde_json::from_str(&raw).map_err(|err| StoreError::Corrupt(err.to_string()))?;
        applications.sort_by(|a, b| b.applied_date.cmp(&a.applied_date));
        Ok(applications)
    }
}
