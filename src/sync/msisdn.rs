//! MSISDN (phone number) synchronization.

use crate::error::{MessagingError, Result};
use crate::events::{Event, EventDispatcher, SdkEvent};
use crate::stats::{MessagingStats, StatsError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Backend call registering the MSISDN for this installation
#[async_trait]
pub trait MsisdnRegistrar: Send + Sync {
    async fn register_msisdn(&self, msisdn: i64) -> Result<()>;
}

/// Result of a synchronization attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Registered installation already has the MSISDN on the backend
    AlreadyReported,
    /// No valid MSISDN; the reported flag was cleared
    Cleared,
    Reported,
    Failed(MessagingError),
}

pub struct MsisdnSynchronizer {
    registrar: Arc<dyn MsisdnRegistrar>,
    dispatcher: EventDispatcher,
    stats: Arc<MessagingStats>,
    reported: AtomicBool,
}

impl MsisdnSynchronizer {
    pub fn new(
        registrar: Arc<dyn MsisdnRegistrar>,
        dispatcher: EventDispatcher,
        stats: Arc<MessagingStats>,
    ) -> Self {
        Self {
            registrar,
            dispatcher,
            stats,
            reported: AtomicBool::new(false),
        }
    }

    /// Report `msisdn` unless the registered installation already did.
    ///
    /// `reported` is the persisted flag from a previous run.
    pub async fn synchronize(
        &self,
        installation_id: Option<&str>,
        msisdn: i64,
        reported: bool,
    ) -> SyncOutcome {
        if installation_id.is_some() && reported {
            self.reported.store(true, Ordering::SeqCst);
            return SyncOutcome::AlreadyReported;
        }

        if msisdn <= 0 {
            debug!("No MSISDN to report");
            self.reported.store(false, Ordering::SeqCst);
            return SyncOutcome::Cleared;
        }

        match self.registrar.register_msisdn(msisdn).await {
            Ok(()) => {
                info!("MSISDN reported");
                self.reported.store(true, Ordering::SeqCst);
                self.dispatcher
                    .emit(&SdkEvent::new(Event::MsisdnSynced).with_msisdn(msisdn));
                SyncOutcome::Reported
            }
            Err(e) => {
                error!("Error reporting MSISDN: {}", e);
                self.stats.report_error(StatsError::MsisdnSyncError);
                self.dispatcher.emit(
                    &SdkEvent::new(Event::ApiCommunicationError).with_error(e.to_string()),
                );
                SyncOutcome::Failed(e)
            }
        }
    }

    /// Whether the MSISDN is known to be on the backend
    pub fn is_reported(&self) -> bool {
        self.reported.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for MsisdnSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MsisdnSynchronizer")
            .field("reported", &self.is_reported())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct FakeRegistrar {
        calls: Mutex<Vec<i64>>,
        fail: bool,
    }

    #[async_trait]
    impl MsisdnRegistrar for FakeRegistrar {
        async fn register_msisdn(&self, msisdn: i64) -> Result<()> {
            self.calls.lock().push(msisdn);
            if self.fail {
                Err(MessagingError::api("MobileMessaging API didn't return any value"))
            } else {
                Ok(())
            }
        }
    }

    fn synchronizer(
        registrar: Arc<FakeRegistrar>,
    ) -> (MsisdnSynchronizer, EventDispatcher, Arc<MessagingStats>) {
        let dispatcher = EventDispatcher::new();
        let stats = Arc::new(MessagingStats::new());
        let sync = MsisdnSynchronizer::new(registrar, dispatcher.clone(), stats.clone());
        (sync, dispatcher, stats)
    }

    #[tokio::test]
    async fn test_skip_when_already_reported() {
        let registrar = Arc::new(FakeRegistrar::default());
        let (sync, _, _) = synchronizer(registrar.clone());

        let outcome = sync.synchronize(Some("instance"), 385_991_234_567, true).await;
        assert_eq!(outcome, SyncOutcome::AlreadyReported);
        assert!(registrar.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_reported_flag_ignored_without_installation() {
        let registrar = Arc::new(FakeRegistrar::default());
        let (sync, _, _) = synchronizer(registrar.clone());

        let outcome = sync.synchronize(None, 385_991_234_567, true).await;
        assert_eq!(outcome, SyncOutcome::Reported);
        assert_eq!(*registrar.calls.lock(), vec![385_991_234_567]);
    }

    #[tokio::test]
    async fn test_invalid_msisdn_clears_flag() {
        let registrar = Arc::new(FakeRegistrar::default());
        let (sync, _, _) = synchronizer(registrar.clone());

        assert_eq!(sync.synchronize(Some("i"), 0, false).await, SyncOutcome::Cleared);
        assert_eq!(sync.synchronize(None, -5, false).await, SyncOutcome::Cleared);
        assert!(!sync.is_reported());
        assert!(registrar.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_success_emits_synced() {
        let registrar = Arc::new(FakeRegistrar::default());
        let (sync, dispatcher, _) = synchronizer(registrar);
        let synced = Arc::new(Mutex::new(None));
        let synced_clone = synced.clone();
        dispatcher.bind(Event::MsisdnSynced, move |event| {
            *synced_clone.lock() = event.msisdn;
        });

        assert_eq!(
            sync.synchronize(Some("i"), 12345, false).await,
            SyncOutcome::Reported
        );
        assert!(sync.is_reported());
        assert_eq!(*synced.lock(), Some(12345));
    }

    #[tokio::test]
    async fn test_failure_records_error() {
        let registrar = Arc::new(FakeRegistrar {
            fail: true,
            ..Default::default()
        });
        let (sync, dispatcher, stats) = synchronizer(registrar);
        let errors = Arc::new(Mutex::new(0));
        let errors_clone = errors.clone();
        dispatcher.bind(Event::ApiCommunicationError, move |_| {
            *errors_clone.lock() += 1;
        });

        let outcome = sync.synchronize(Some("i"), 12345, false).await;
        assert!(matches!(outcome, SyncOutcome::Failed(MessagingError::ApiError { .. })));
        assert!(!sync.is_reported());
        assert_eq!(stats.error_count(StatsError::MsisdnSyncError), 1);
        assert_eq!(*errors.lock(), 1);
    }
}
