//! Foreground state tracking.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Opaque reference to a host screen (an Android activity, an iOS view controller)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct ScreenHandle {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl ScreenHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }
}

/// Snapshot of the host application's visibility
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct ForegroundState {
    pub foreground: bool,
    pub screen: Option<ScreenHandle>,
}

impl ForegroundState {
    pub fn foreground(screen: ScreenHandle) -> Self {
        Self {
            foreground: true,
            screen: Some(screen),
        }
    }

    pub fn background() -> Self {
        Self::default()
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground
    }
}

/// Answers whether the host app is currently visible
pub trait ForegroundStateMonitor: Send + Sync {
    fn foreground_state(&self) -> ForegroundState;
}

/// Called when the app moves from background to foreground
pub type ForegroundListener = Arc<dyn Fn(&ScreenHandle) + Send + Sync + 'static>;

/// Foreground monitor fed by the host's screen lifecycle callbacks.
///
/// The host forwards resume/pause of each screen; the most recently resumed
/// screen is the active one.
#[derive(Default)]
pub struct ActivityLifecycleMonitor {
    active: RwLock<Option<ScreenHandle>>,
    listeners: RwLock<Vec<ForegroundListener>>,
}

impl ActivityLifecycleMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_foreground_listener(&self, listener: impl Fn(&ScreenHandle) + Send + Sync + 'static) {
        self.listeners.write().push(Arc::new(listener));
    }

    pub fn on_screen_resumed(&self, screen: ScreenHandle) {
        let was_background = {
            let mut active = self.active.write();
            let was_background = active.is_none();
            *active = Some(screen.clone());
            was_background
        };

        debug!("Screen resumed: {}", screen.id);
        if was_background {
            self.notify_foreground(&screen);
        }
    }

    /// Pausing a screen other than the active one is ignored, so an
    /// out-of-order pause of the previous screen cannot hide the new one.
    pub fn on_screen_paused(&self, screen: &ScreenHandle) {
        let mut active = self.active.write();
        if active.as_ref() == Some(screen) {
            debug!("Screen paused, app in background: {}", screen.id);
            *active = None;
        }
    }

    fn notify_foreground(&self, screen: &ScreenHandle) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener(screen);
            })) {
                warn!("Foreground listener panicked: {:?}", e);
            }
        }
    }
}

impl ForegroundStateMonitor for ActivityLifecycleMonitor {
    fn foreground_state(&self) -> ForegroundState {
        match self.active.read().clone() {
            Some(screen) => ForegroundState::foreground(screen),
            None => ForegroundState::background(),
        }
    }
}

impl std::fmt::Debug for ActivityLifecycleMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityLifecycleMonitor")
            .field("active", &*self.active.read())
            .field("listener_count", &self.listeners.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_initially_background() {
        let monitor = ActivityLifecycleMonitor::new();
        assert!(!monitor.foreground_state().is_foreground());
        assert!(monitor.foreground_state().screen.is_none());
    }

    #[test]
    fn test_resume_and_pause() {
        let monitor = ActivityLifecycleMonitor::new();
        let main = ScreenHandle::named("1", "MainActivity");

        monitor.on_screen_resumed(main.clone());
        let state = monitor.foreground_state();
        assert!(state.is_foreground());
        assert_eq!(state.screen, Some(main.clone()));

        monitor.on_screen_paused(&main);
        assert!(!monitor.foreground_state().is_foreground());
    }

    #[test]
    fn test_screen_switch_keeps_foreground() {
        let monitor = ActivityLifecycleMonitor::new();
        let first = ScreenHandle::new("1");
        let second = ScreenHandle::new("2");

        monitor.on_screen_resumed(first.clone());
        monitor.on_screen_resumed(second.clone());
        monitor.on_screen_paused(&first);

        assert_eq!(monitor.foreground_state().screen, Some(second));
    }

    #[test]
    fn test_listener_called_on_transition_only() {
        let monitor = ActivityLifecycleMonitor::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();
        monitor.add_foreground_listener(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        let first = ScreenHandle::new("1");
        monitor.on_screen_resumed(first.clone());
        monitor.on_screen_resumed(ScreenHandle::new("2"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        monitor.on_screen_paused(&ScreenHandle::new("2"));
        monitor.on_screen_resumed(first);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
