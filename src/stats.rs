//! Error statistics collected while talking to the backend.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Kinds of failures tracked by [`MessagingStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum StatsError {
    RegistrationSyncError,
    DeliveryReportingError,
    SeenReportingError,
    MsisdnSyncError,
    UserDataSyncError,
}

#[derive(Debug, Default)]
pub struct MessagingStats {
    errors: DashMap<StatsError, u64>,
}

impl MessagingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report_error(&self, error: StatsError) {
        *self.errors.entry(error).or_insert(0) += 1;
    }

    pub fn error_count(&self, error: StatsError) -> u64 {
        self.errors.get(&error).map(|c| *c).unwrap_or(0)
    }

    pub fn reset(&self) {
        self.errors.clear();
    }
}
