//! Event dispatcher for managing and emitting events.

use super::callback::CallbackRegistry;
use super::event::{Event, SdkEvent};
use std::sync::Arc;
use tracing::{debug, warn};

/// Event dispatcher shared by every component that broadcasts events.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    callbacks: Arc<CallbackRegistry>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a callback to a specific event
    pub fn bind(&self, event: Event, callback: impl Fn(&SdkEvent) + Send + Sync + 'static) -> u64 {
        debug!("Binding callback for event: {}", event);
        self.callbacks.add(Some(event), callback)
    }

    /// Bind a callback to all events
    pub fn bind_global(&self, callback: impl Fn(&SdkEvent) + Send + Sync + 'static) -> u64 {
        debug!("Binding global callback");
        self.callbacks.add(None, callback)
    }

    pub fn unbind(&self, event: Option<Event>, callback_id: Option<u64>) {
        debug!("Unbinding callback: event={:?}, id={:?}", event, callback_id);
        self.callbacks.remove(event, callback_id);
    }

    /// Emit an event to global callbacks first, then to event callbacks.
    /// A panicking callback does not stop the others.
    pub fn emit(&self, event: &SdkEvent) {
        for callback in self.callbacks.listeners(event.event) {
            if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                callback.invoke(event);
            })) {
                warn!("Callback {} for '{}' panicked: {:?}", callback.id, event.event, e);
            }
        }
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_bind_and_emit() {
        let dispatcher = EventDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        dispatcher.bind(Event::MessageReceived, move |event| {
            assert_eq!(event.event, Event::MessageReceived);
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        dispatcher.emit(&SdkEvent::new(Event::MessageReceived));
        dispatcher.emit(&SdkEvent::new(Event::MessagesSent));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_global_bind() {
        let dispatcher = EventDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        dispatcher.bind_global(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        dispatcher.emit(&SdkEvent::new(Event::UserLoggedOut));
        dispatcher.emit(&SdkEvent::new(Event::PrimaryChanged));

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_panicking_callback_isolated() {
        let dispatcher = EventDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        dispatcher.bind(Event::NotificationTapped, |_| panic!("boom"));
        dispatcher.bind(Event::NotificationTapped, move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        dispatcher.emit(&SdkEvent::new(Event::NotificationTapped));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unbind() {
        let dispatcher = EventDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let id = dispatcher.bind(Event::MessageReceived, move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        dispatcher.emit(&SdkEvent::new(Event::MessageReceived));
        dispatcher.unbind(Some(Event::MessageReceived), Some(id));
        dispatcher.emit(&SdkEvent::new(Event::MessageReceived));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
