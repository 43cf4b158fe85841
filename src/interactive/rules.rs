//! Rules deciding whether and how a message is shown as an in-app dialog.

use super::category::{CategoryRegistry, NotificationAction, NotificationCategory};
use super::foreground::{ForegroundStateMonitor, ScreenHandle};
use crate::message::Message;
use crate::utils::is_blank;
use std::sync::Arc;
use tracing::debug;

/// Outcome of evaluating a message against the in-app rules
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum DisplayDecision {
    /// Do not show a dialog for this message
    Suppress,
    /// Show once the app comes to the foreground; re-evaluate then
    DeferUntilForeground,
    /// Show now on the given screen
    ShowNow {
        /// `None` when the default actions are used
        category: Option<NotificationCategory>,
        actions: Vec<NotificationAction>,
        screen: Option<ScreenHandle>,
    },
}

impl DisplayDecision {
    fn show_with_default_actions(screen: Option<ScreenHandle>) -> Self {
        Self::ShowNow {
            category: None,
            actions: NotificationAction::default_in_app_actions(),
            screen,
        }
    }

    pub fn should_show_now(&self) -> bool {
        matches!(self, Self::ShowNow { .. })
    }
}

/// In-app display rule engine
#[derive(Clone)]
pub struct InAppRules {
    categories: Arc<dyn CategoryRegistry>,
    foreground: Arc<dyn ForegroundStateMonitor>,
    /// Trace every decision
    verbose: bool,
}

impl InAppRules {
    pub fn new(
        categories: Arc<dyn CategoryRegistry>,
        foreground: Arc<dyn ForegroundStateMonitor>,
    ) -> Self {
        Self {
            categories,
            foreground,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn is_app_in_foreground(&self) -> bool {
        self.foreground.foreground_state().is_foreground()
    }

    pub fn should_display_dialog_for(&self, message: &Message) -> DisplayDecision {
        let decision = self.decide(message);
        if self.verbose {
            debug!("In-app decision for {}: {:?}", message.message_id, decision);
        }
        decision
    }

    fn decide(&self, message: &Message) -> DisplayDecision {
        if !message.has_in_app_enabled() {
            return DisplayDecision::Suppress;
        }

        let state = self.foreground.foreground_state();
        if !state.is_foreground() {
            return DisplayDecision::DeferUntilForeground;
        }

        let screen = state.screen;
        let category_id = match message.category() {
            Some(id) if !is_blank(id) => id,
            _ => return DisplayDecision::show_with_default_actions(screen),
        };

        let category = match self.categories.notification_category(category_id) {
            Some(category) if !category.actions.is_empty() => category,
            _ => return DisplayDecision::show_with_default_actions(screen),
        };

        let actions = filter_actions_for_in_app_dialog(&category.actions);
        if actions.is_empty() {
            return DisplayDecision::show_with_default_actions(screen);
        }

        DisplayDecision::ShowNow {
            category: Some(category),
            actions,
            screen,
        }
    }
}

/// Input actions cannot be handled by a dialog
fn filter_actions_for_in_app_dialog(actions: &[NotificationAction]) -> Vec<NotificationAction> {
    actions.iter().filter(|a| !a.has_input()).cloned().collect()
}

impl std::fmt::Debug for InAppRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InAppRules").finish_non_exhaustive()
    }
}
