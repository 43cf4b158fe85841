//! Notification categories and their actions.

use crate::error::{MessagingError, Result};
use crate::utils::is_blank;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Prefix reserved for categories and actions shipped with the library
pub const PREDEFINED_PREFIX: &str = "mm_";

pub const ACCEPT_DECLINE_CATEGORY: &str = "mm_accept_decline";
pub const ACCEPT_ACTION: &str = "mm_accept";
pub const DECLINE_ACTION: &str = "mm_decline";
pub const OPEN_ACTION: &str = "mm_open";
pub const CANCEL_ACTION: &str = "mm_cancel";

/// A button attached to a notification or in-app dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase")]
pub struct NotificationAction {
    pub id: String,
    pub title: String,
    /// Bring the app to the foreground when tapped
    #[serde(default)]
    pub foreground: bool,
    #[serde(default)]
    pub authentication_required: bool,
    /// Collects free-text input from the user
    #[serde(default)]
    pub input: bool,
    #[serde(default)]
    pub input_placeholder: Option<String>,
}

impl NotificationAction {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            foreground: false,
            authentication_required: false,
            input: false,
            input_placeholder: None,
        }
    }

    pub fn with_foreground(mut self, foreground: bool) -> Self {
        self.foreground = foreground;
        self
    }

    pub fn with_authentication_required(mut self, required: bool) -> Self {
        self.authentication_required = required;
        self
    }

    pub fn with_input(mut self, placeholder: Option<String>) -> Self {
        self.input = true;
        self.input_placeholder = placeholder;
        self
    }

    pub fn has_input(&self) -> bool {
        self.input
    }

    /// Actions shown by an in-app dialog when the message has no usable category
    pub fn default_in_app_actions() -> Vec<NotificationAction> {
        vec![
            NotificationAction::new(CANCEL_ACTION, "Cancel"),
            NotificationAction::new(OPEN_ACTION, "Open").with_foreground(true),
        ]
    }
}

/// A named, ordered set of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase")]
pub struct NotificationCategory {
    pub category_id: String,
    #[serde(default)]
    pub actions: Vec<NotificationAction>,
}

impl NotificationCategory {
    pub fn new(category_id: impl Into<String>, actions: Vec<NotificationAction>) -> Self {
        Self {
            category_id: category_id.into(),
            actions,
        }
    }

    /// Categories shipped with the library
    pub fn predefined() -> Vec<NotificationCategory> {
        vec![NotificationCategory::new(
            ACCEPT_DECLINE_CATEGORY,
            vec![
                NotificationAction::new(ACCEPT_ACTION, "Accept").with_foreground(true),
                NotificationAction::new(DECLINE_ACTION, "Decline"),
            ],
        )]
    }

    fn validate(&self) -> Result<()> {
        if is_blank(&self.category_id) {
            return Err(MessagingError::invalid_category("Category ID is required"));
        }
        if self.category_id.starts_with(PREDEFINED_PREFIX) {
            return Err(MessagingError::invalid_category(format!(
                "'{}' uses the reserved prefix '{}'",
                self.category_id, PREDEFINED_PREFIX
            )));
        }

        let mut seen = HashSet::new();
        for action in &self.actions {
            if is_blank(&action.id) {
                return Err(MessagingError::invalid_category(format!(
                    "Category '{}' has an action without ID",
                    self.category_id
                )));
            }
            if !seen.insert(action.id.as_str()) {
                return Err(MessagingError::invalid_category(format!(
                    "Category '{}' has duplicate action '{}'",
                    self.category_id, action.id
                )));
            }
        }
        Ok(())
    }
}

/// Lookup of categories by identifier
pub trait CategoryRegistry: Send + Sync {
    fn notification_category(&self, category_id: &str) -> Option<NotificationCategory>;
}

/// Registry holding the predefined categories plus those set by the host app
#[derive(Debug)]
pub struct InteractiveCategories {
    /// Replaced as a whole so lookups see either the old or the new set
    categories: RwLock<HashMap<String, NotificationCategory>>,
}

impl Default for InteractiveCategories {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractiveCategories {
    pub fn new() -> Self {
        Self {
            categories: RwLock::new(predefined_by_id()),
        }
    }

    /// Replace all custom categories. Predefined categories are kept.
    ///
    /// Nothing is changed if any of the categories is invalid.
    pub fn set_custom_categories(&self, custom: Vec<NotificationCategory>) -> Result<()> {
        let mut ids = HashSet::new();
        for category in &custom {
            category.validate()?;
            if !ids.insert(category.category_id.clone()) {
                return Err(MessagingError::invalid_category(format!(
                    "Duplicate category '{}'",
                    category.category_id
                )));
            }
        }

        let mut categories = predefined_by_id();
        for category in custom {
            debug!("Registering notification category: {}", category.category_id);
            categories.insert(category.category_id.clone(), category);
        }

        *self.categories.write() = categories;
        Ok(())
    }

    pub fn category_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.categories.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

fn predefined_by_id() -> HashMap<String, NotificationCategory> {
    NotificationCategory::predefined()
        .into_iter()
        .map(|category| (category.category_id.clone(), category))
        .collect()
}

impl CategoryRegistry for InteractiveCategories {
    fn notification_category(&self, category_id: &str) -> Option<NotificationCategory> {
        self.categories.read().get(category_id).cloned()
    }
}
