//! Push message model.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Key inside the internal data blob that enables the in-app dialog
const IN_APP_KEY: &str = "inApp";

/// A message delivered by the push backend.
///
/// `internal_data` and `custom_payload` are kept as raw JSON strings. The
/// library only looks into `internal_data` for the flags it understands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub sound: Option<String>,
    #[serde(default = "default_vibrate")]
    pub vibrate: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub internal_data: Option<String>,
    #[serde(default)]
    pub custom_payload: Option<String>,
    /// Epoch millis
    #[serde(default)]
    pub received_timestamp: i64,
    /// Epoch millis, 0 if not seen yet
    #[serde(default)]
    pub seen_timestamp: i64,
}

fn default_vibrate() -> bool {
    true
}

impl Message {
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            vibrate: true,
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_internal_data(mut self, internal_data: impl Into<String>) -> Self {
        self.internal_data = Some(internal_data.into());
        self
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn internal_data(&self) -> Option<&str> {
        self.internal_data.as_deref()
    }

    pub fn is_seen(&self) -> bool {
        self.seen_timestamp > 0
    }

    /// Whether the message asks to be shown as an in-app dialog.
    ///
    /// Missing or malformed internal data reads as `false`.
    pub fn has_in_app_enabled(&self) -> bool {
        let Some(raw) = self.internal_data() else {
            return false;
        };

        let parsed: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                debug!(
                    "Malformed internal data for message {}: {}",
                    self.message_id, e
                );
                return false;
            }
        };

        match parsed.get(IN_APP_KEY) {
            Some(Value::Bool(enabled)) => *enabled,
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
            _ => false,
        }
    }
}
