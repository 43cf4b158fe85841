//! Callback registry for library events.

use super::event::{Event, SdkEvent};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type CallbackFn = Arc<dyn Fn(&SdkEvent) + Send + Sync + 'static>;

/// A bound callback and the id returned to the caller
#[derive(Clone)]
pub struct Callback {
    pub id: u64,
    pub callback: CallbackFn,
}

impl Callback {
    pub fn invoke(&self, event: &SdkEvent) {
        (self.callback)(event);
    }
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callback").field("id", &self.id).finish()
    }
}

/// Callbacks keyed by event. The `None` key holds callbacks bound to every
/// event.
#[derive(Debug)]
pub struct CallbackRegistry {
    callbacks: DashMap<Option<Event>, Vec<Callback>>,
    next_id: AtomicU64,
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self {
            callbacks: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Bind to `event`, or to every event when `None`
    pub fn add(
        &self,
        event: Option<Event>,
        callback: impl Fn(&SdkEvent) + Send + Sync + 'static,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.callbacks.entry(event).or_default().push(Callback {
            id,
            callback: Arc::new(callback),
        });
        id
    }

    /// Snapshot of the callbacks receiving `event`, catch-all callbacks first.
    /// No map shard is held afterwards, so a callback may bind or unbind.
    pub fn listeners(&self, event: Event) -> Vec<Callback> {
        let mut listeners = self.snapshot(None);
        listeners.extend(self.snapshot(Some(event)));
        listeners
    }

    fn snapshot(&self, key: Option<Event>) -> Vec<Callback> {
        self.callbacks
            .get(&key)
            .map(|v| v.clone())
            .unwrap_or_default()
    }

    /// Remove callbacks.
    ///
    /// `(Some, Some)` removes one callback from one event, `(Some, None)` all
    /// callbacks of an event, `(None, Some)` a callback wherever it is bound and
    /// `(None, None)` everything.
    pub fn remove(&self, event: Option<Event>, callback_id: Option<u64>) {
        match (event, callback_id) {
            (Some(event), Some(id)) => {
                if let Some(mut callbacks) = self.callbacks.get_mut(&Some(event)) {
                    callbacks.retain(|cb| cb.id != id);
                }
            }
            (Some(event), None) => {
                self.callbacks.remove(&Some(event));
            }
            (None, Some(id)) => {
                for mut entry in self.callbacks.iter_mut() {
                    entry.retain(|cb| cb.id != id);
                }
            }
            (None, None) => self.callbacks.clear(),
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.iter().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
