//! Onboarding persistence port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::onboarding::{OnboardingPatch, OnboardingRecord};
use crate::session::IdentityId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store io failed: {0}")]
    Io(String),

    #[error("stored record corrupt: {0}")]
    Corrupt(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// One tracked job application, read by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: String,
    pub job_title: String,
    pub company_name: String,
    pub application_status: String,
    pub applied_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub job_url: Option<String>,
}

#[async_trait]
pub trait OnboardingStorePort: Send + Sync {
    /// Fetch the record for an identity. `Ok(None)` means no record yet,
    /// which is not an error.
    async fn get(&self, user_id: &IdentityId) -> Result<Option<OnboardingRecord>, StoreError>;

    /// Merge a partial update into the stored record, creating it from
    /// defaults when absent. Keyed by identity id, so a retry after a
    /// partial failure cannot duplicate records. Must merge, not replace.
    async fn upsert(
        &self,
        user_id: &IdentityId,
        patch: OnboardingPatch,
    ) -> Result<OnboardingRecord, StoreError>;

    /// Applications for the dashboard listing, newest first.
    async fn list_applications(
        &self,
        user_id: &IdentityId,
    ) -> Result<Vec<JobApplication>, StoreError>;
}
