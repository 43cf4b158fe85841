//! Delivery and seen reports, flushed through the batch reporter.

use super::batch::BatchReporter;
use crate::error::Result;
use crate::events::{Event, EventDispatcher, SdkEvent};
use crate::stats::{MessagingStats, StatsError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error};

/// Backend endpoint receiving message reports
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn report_delivery(&self, message_ids: &[String]) -> Result<()>;
    async fn report_seen(&self, message_ids: &[String]) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportKind {
    Delivery,
    Seen,
}

impl ReportKind {
    fn sent_event(self) -> Event {
        match self {
            Self::Delivery => Event::DeliveryReportsSent,
            Self::Seen => Event::SeenReportsSent,
        }
    }

    fn stats_error(self) -> StatsError {
        match self {
            Self::Delivery => StatsError::DeliveryReportingError,
            Self::Seen => StatsError::SeenReportingError,
        }
    }
}

struct ReportsInner {
    delivery: Mutex<Vec<String>>,
    seen: Mutex<Vec<String>>,
    sink: Arc<dyn ReportSink>,
    dispatcher: EventDispatcher,
    stats: Arc<MessagingStats>,
}

impl ReportsInner {
    fn queue(&self, kind: ReportKind, ids: impl IntoIterator<Item = String>) {
        let mut queue = self.queue_for(kind).lock();
        for id in ids {
            if !queue.contains(&id) {
                queue.push(id);
            }
        }
    }

    fn queue_for(&self, kind: ReportKind) -> &Mutex<Vec<String>> {
        match kind {
            ReportKind::Delivery => &self.delivery,
            ReportKind::Seen => &self.seen,
        }
    }

    async fn send(&self, kind: ReportKind, ids: Vec<String>) {
        if ids.is_empty() {
            return;
        }

        debug!("Sending {:?} reports for {} messages", kind, ids.len());
        let result = match kind {
            ReportKind::Delivery => self.sink.report_delivery(&ids).await,
            ReportKind::Seen => self.sink.report_seen(&ids).await,
        };

        match result {
            Ok(()) => {
                self.dispatcher
                    .emit(&SdkEvent::new(kind.sent_event()).with_message_ids(ids));
            }
            Err(e) => {
                error!("Failed to send {:?} reports: {}", kind, e);
                self.stats.report_error(kind.stats_error());
                self.queue(kind, ids);
                self.dispatcher.emit(
                    &SdkEvent::new(Event::ApiCommunicationError).with_error(e.to_string()),
                );
            }
        }
    }
}

/// Queues delivery and seen reports and sends them in batches.
///
/// Every queued report submits a flush to the [`BatchReporter`], so reports
/// made in quick succession go out in one request per kind.
#[derive(Clone)]
pub struct MessageReports {
    inner: Arc<ReportsInner>,
    batch: Arc<BatchReporter>,
}

impl MessageReports {
    pub fn new(
        batch: Arc<BatchReporter>,
        sink: Arc<dyn ReportSink>,
        dispatcher: EventDispatcher,
        stats: Arc<MessagingStats>,
    ) -> Self {
        Self {
            inner: Arc::new(ReportsInner {
                delivery: Mutex::new(Vec::new()),
                seen: Mutex::new(Vec::new()),
                sink,
                dispatcher,
                stats,
            }),
            batch,
        }
    }

    pub fn report_delivery(&self, message_ids: impl IntoIterator<Item = String>) {
        self.inner.queue(ReportKind::Delivery, message_ids);
        self.schedule_flush();
    }

    pub fn report_seen(&self, message_ids: impl IntoIterator<Item = String>) {
        self.inner.queue(ReportKind::Seen, message_ids);
        self.schedule_flush();
    }

    pub fn pending_delivery(&self) -> Vec<String> {
        self.inner.delivery.lock().clone()
    }

    pub fn pending_seen(&self) -> Vec<String> {
        self.inner.seen.lock().clone()
    }

    fn schedule_flush(&self) {
        let inner = self.inner.clone();
        let runtime = self.batch.runtime().clone();
        self.batch.put(move || {
            let delivery = std::mem::take(&mut *inner.delivery.lock());
            let seen = std::mem::take(&mut *inner.seen.lock());
            if delivery.is_empty() && seen.is_empty() {
                return;
            }
            runtime.spawn(async move {
                inner.send(ReportKind::Delivery, delivery).await;
                inner.send(ReportKind::Seen, seen).await;
            });
        });
    }
}

impl std::fmt::Debug for MessageReports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageReports")
            .field("pending_delivery", &self.inner.delivery.lock().len())
            .field("pending_seen", &self.inner.seen.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MessagingError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    #[derive(Default)]
    struct RecordingSink {
        delivery: Mutex<Vec<Vec<String>>>,
        seen: Mutex<Vec<Vec<String>>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl ReportSink for RecordingSink {
        async fn report_delivery(&self, message_ids: &[String]) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(MessagingError::api("503"));
            }
            self.delivery.lock().push(message_ids.to_vec());
            Ok(())
        }

        async fn report_seen(&self, message_ids: &[String]) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(MessagingError::api("503"));
            }
            self.seen.lock().push(message_ids.to_vec());
            Ok(())
        }
    }

    fn setup() -> (MessageReports, Arc<RecordingSink>, EventDispatcher, Arc<MessagingStats>) {
        let batch = Arc::new(BatchReporter::new(Duration::from_millis(50)).unwrap());
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = EventDispatcher::new();
        let stats = Arc::new(MessagingStats::new());
        let reports = MessageReports::new(batch, sink.clone(), dispatcher.clone(), stats.clone());
        (reports, sink, dispatcher, stats)
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_coalesced_into_one_request() {
        let (reports, sink, dispatcher, _) = setup();
        let sent = Arc::new(Mutex::new(Vec::new()));
        let sent_clone = sent.clone();
        dispatcher.bind(Event::DeliveryReportsSent, move |event| {
            sent_clone.lock().extend(event.message_ids.clone());
        });

        reports.report_delivery(ids(&["a", "b"]));
        reports.report_delivery(ids(&["b", "c"]));
        reports.report_seen(ids(&["a"]));

        sleep(Duration::from_millis(200)).await;

        assert_eq!(*sink.delivery.lock(), vec![ids(&["a", "b", "c"])]);
        assert_eq!(*sink.seen.lock(), vec![ids(&["a"])]);
        assert_eq!(*sent.lock(), ids(&["a", "b", "c"]));
        assert!(reports.pending_delivery().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reports_requeued() {
        let (reports, sink, dispatcher, stats) = setup();
        let errors = Arc::new(Mutex::new(Vec::new()));
        let errors_clone = errors.clone();
        dispatcher.bind(Event::ApiCommunicationError, move |event| {
            errors_clone.lock().push(event.error.clone());
        });

        sink.fail.store(true, Ordering::SeqCst);
        reports.report_seen(ids(&["x"]));
        sleep(Duration::from_millis(200)).await;

        assert_eq!(reports.pending_seen(), ids(&["x"]));
        assert_eq!(stats.error_count(StatsError::SeenReportingError), 1);
        assert_eq!(errors.lock().len(), 1);

        sink.fail.store(false, Ordering::SeqCst);
        reports.report_seen(ids(&["y"]));
        sleep(Duration::from_millis(200)).await;

        assert_eq!(*sink.seen.lock(), vec![ids(&["x", "y"])]);
        assert!(reports.pending_seen().is_empty());
    }
}
