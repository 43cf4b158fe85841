//! Presents in-app dialogs for incoming messages.

use super::category::{NotificationAction, NotificationCategory, CANCEL_ACTION};
use super::foreground::ScreenHandle;
use super::rules::{DisplayDecision, InAppRules};
use crate::events::{Event, EventDispatcher, SdkEvent};
use crate::message::Message;
use crate::reporting::MessageReports;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// Host-side dialog presentation
pub trait InAppView: Send + Sync {
    fn show(
        &self,
        message: &Message,
        category: Option<&NotificationCategory>,
        actions: &[NotificationAction],
        screen: Option<&ScreenHandle>,
    );
}

/// Runs messages through [`InAppRules`] and shows, defers or drops them.
///
/// Only the newest deferred message is kept; it is re-evaluated when the app
/// comes to the foreground.
pub struct InAppNotificationHandler {
    rules: InAppRules,
    view: Arc<dyn InAppView>,
    dispatcher: EventDispatcher,
    reports: MessageReports,
    deferred: Mutex<Option<Message>>,
    enabled: bool,
}

impl InAppNotificationHandler {
    pub fn new(
        rules: InAppRules,
        view: Arc<dyn InAppView>,
        dispatcher: EventDispatcher,
        reports: MessageReports,
        enabled: bool,
    ) -> Self {
        Self {
            rules,
            view,
            dispatcher,
            reports,
            deferred: Mutex::new(None),
            enabled,
        }
    }

    pub fn handle_message(&self, message: Message) -> DisplayDecision {
        if !self.enabled {
            return DisplayDecision::Suppress;
        }

        let decision = self.rules.should_display_dialog_for(&message);
        match &decision {
            DisplayDecision::Suppress => {}
            DisplayDecision::DeferUntilForeground => {
                debug!("Keeping message {} until foreground", message.message_id);
                *self.deferred.lock() = Some(message);
            }
            DisplayDecision::ShowNow {
                category,
                actions,
                screen,
            } => {
                info!("Showing in-app dialog for message {}", message.message_id);
                self.view
                    .show(&message, category.as_ref(), actions, screen.as_ref());
            }
        }

        // The app may have come to the foreground between the rule check and
        // the store, after the foreground listener found the cache empty.
        if decision == DisplayDecision::DeferUntilForeground && self.rules.is_app_in_foreground() {
            if let Some(redecided) = self.app_went_to_foreground() {
                return redecided;
            }
        }
        decision
    }

    /// Re-evaluate the deferred message, if any
    pub fn app_went_to_foreground(&self) -> Option<DisplayDecision> {
        let message = self.deferred.lock().take()?;
        Some(self.handle_message(message))
    }

    /// The user picked a dialog button. Any choice marks the message seen;
    /// cancel only dismisses.
    pub fn user_tapped_action(&self, message: &Message, action: &NotificationAction) {
        self.reports.report_seen([message.message_id.clone()]);
        if action.id == CANCEL_ACTION {
            return;
        }

        self.dispatcher.emit(
            &SdkEvent::new(Event::NotificationActionTapped)
                .with_message(message.clone())
                .with_action(action.clone()),
        );
    }

    pub fn deferred_message(&self) -> Option<Message> {
        self.deferred.lock().clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl std::fmt::Debug for InAppNotificationHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InAppNotificationHandler")
            .field("enabled", &self.enabled)
            .field("deferred", &self.deferred.lock().as_ref().map(|m| &m.message_id))
            .finish()
    }
}
