//! Coalescing of report submissions into delayed batch executions.

use crate::error::{MessagingError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Work submitted to a [`BatchReporter`]
pub type ReportTask = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Window {
    /// Most recent submission; the one that runs when the window closes
    pending: Option<ReportTask>,
    /// Submissions since the last execution
    submissions: u64,
    timer_armed: bool,
}

/// Coalesces submissions made within a delay window into one execution.
///
/// The first submission arms a timer for `delay`. Submissions made while the
/// timer is armed join the same window. When the timer fires the most recent
/// submission runs once, and the next submission opens a new window. The
/// submitted tasks are expected to be interchangeable (each one flushes
/// whatever state is pending at the time it runs).
///
/// Submissions may come from any thread, including threads outside the
/// Tokio runtime; the timer runs on the runtime captured at construction.
pub struct BatchReporter {
    delay: Duration,
    runtime: Handle,
    window: Arc<Mutex<Window>>,
    executions: Arc<AtomicU64>,
    /// Trace every coalesced submission
    verbose: bool,
}

impl BatchReporter {
    /// Create a reporter on the current Tokio runtime
    pub fn new(delay: Duration) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| {
            MessagingError::invalid_state("Batch reporter requires a Tokio runtime")
        })?;
        Ok(Self::with_runtime(delay, runtime))
    }

    pub fn with_runtime(delay: Duration, runtime: Handle) -> Self {
        Self {
            delay,
            runtime,
            window: Arc::new(Mutex::new(Window::default())),
            executions: Arc::new(AtomicU64::new(0)),
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Submit a task; it runs at the end of the current window unless a later
    /// submission replaces it.
    pub fn put(&self, task: impl FnOnce() + Send + 'static) {
        {
            let mut window = self.window.lock();
            window.pending = Some(Box::new(task));
            window.submissions += 1;
            if window.timer_armed {
                if self.verbose {
                    debug!(
                        "Coalescing report into pending batch ({} submissions)",
                        window.submissions
                    );
                }
                return;
            }
            window.timer_armed = true;
        }

        debug!("Scheduling batch report in {:?}", self.delay);
        let delay = self.delay;
        let window = self.window.clone();
        let executions = self.executions.clone();
        self.runtime.spawn(async move {
            sleep(delay).await;
            run_window(&window, &executions);
        });
    }

    /// Whether a window is open and waiting for its timer
    pub fn is_pending(&self) -> bool {
        self.window.lock().timer_armed
    }

    /// Number of executed batches
    pub fn executions(&self) -> u64 {
        self.executions.load(Ordering::SeqCst)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub(crate) fn runtime(&self) -> &Handle {
        &self.runtime
    }
}

fn run_window(window: &Mutex<Window>, executions: &AtomicU64) {
    // Disarm under the lock so a concurrent put either lands in this batch
    // or opens the next window, never neither.
    let (task, submissions) = {
        let mut window = window.lock();
        window.timer_armed = false;
        (window.pending.take(), std::mem::take(&mut window.submissions))
    };

    let Some(task) = task else {
        return;
    };

    executions.fetch_add(1, Ordering::SeqCst);
    debug!("Running batch report for {} submissions", submissions);
    if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(task)) {
        warn!("Batch report task panicked: {:?}", e);
    }
}

impl std::fmt::Debug for BatchReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchReporter")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .field("executions", &self.executions())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_task(counter: &Arc<AtomicUsize>) -> impl FnOnce() + Send + 'static {
        let counter = counter.clone();
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_multiple_run_one() {
        let reporter = BatchReporter::new(Duration::from_millis(50)).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            reporter.put(counting_task(&counter));
        }
        assert!(reporter.is_pending());

        sleep(Duration::from_millis(500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(reporter.executions(), 1);
        assert!(!reporter.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_verbose_reporter_still_coalesces() {
        let reporter = BatchReporter::new(Duration::from_millis(50))
            .unwrap()
            .verbose(true);
        let counter = Arc::new(AtomicUsize::new(0));
        assert!(reporter.is_verbose());

        for _ in 0..5 {
            reporter.put(counting_task(&counter));
        }

        sleep(Duration::from_millis(500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_multiple_run_multiple() {
        let reporter = BatchReporter::new(Duration::from_millis(50)).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            reporter.put(counting_task(&counter));
            sleep(Duration::from_millis(200)).await;
        }

        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_task_wins() {
        let reporter = BatchReporter::new(Duration::from_millis(50)).unwrap();
        let ran = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let ran = ran.clone();
            reporter.put(move || ran.lock().push(i));
        }

        sleep(Duration::from_millis(100)).await;
        assert_eq!(*ran.lock(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_not_extended_by_submissions() {
        let reporter = BatchReporter::new(Duration::from_millis(100)).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        // Submissions every 30ms: the first window closes at 100ms regardless.
        for _ in 0..3 {
            reporter.put(counting_task(&counter));
            sleep(Duration::from_millis(30)).await;
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(20)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_task_does_not_block_next_window() {
        let reporter = BatchReporter::new(Duration::from_millis(10)).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        reporter.put(|| panic!("report failed"));
        sleep(Duration::from_millis(50)).await;

        reporter.put(counting_task(&counter));
        sleep(Duration::from_millis(50)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(reporter.executions(), 2);
    }

    #[test]
    fn test_requires_runtime() {
        let err = BatchReporter::new(Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, MessagingError::InvalidState { .. }));
    }
}
