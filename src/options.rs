//! Configuration options for the mobile messaging client.

use crate::error::{MessagingError, Result};
use crate::utils::is_blank;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default backend base URI
pub const DEFAULT_API_URI: &str = "https://mobile.infobip.com";

/// Default delay for coalescing outgoing reports
pub const DEFAULT_BATCH_REPORTING_DELAY_MS: u64 = 5_000;

/// Configuration options for creating a mobile messaging client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase")]
pub struct MessagingOptions {
    /// Application code from the messaging portal
    pub application_code: String,

    /// Backend base URI
    #[serde(default)]
    pub api_uri: Option<String>,

    /// Delay window for batched reports in milliseconds (default: 5000)
    #[serde(default)]
    pub batch_reporting_delay_ms: Option<u64>,

    /// Show interactive in-app dialogs for messages that request them
    #[serde(default)]
    pub in_app_dialogs_enabled: Option<bool>,

    /// Enable debug logging
    #[serde(default)]
    pub debug: Option<bool>,
}

impl Default for MessagingOptions {
    fn default() -> Self {
        Self {
            application_code: String::new(),
            api_uri: Some(DEFAULT_API_URI.to_string()),
            batch_reporting_delay_ms: Some(DEFAULT_BATCH_REPORTING_DELAY_MS),
            in_app_dialogs_enabled: Some(true),
            debug: Some(false),
        }
    }
}

impl MessagingOptions {
    /// Create new options with just the application code
    pub fn new(application_code: impl Into<String>) -> Self {
        Self {
            application_code: application_code.into(),
            ..Default::default()
        }
    }

    /// Builder pattern: set backend base URI
    pub fn api_uri(mut self, uri: impl Into<String>) -> Self {
        self.api_uri = Some(uri.into());
        self
    }

    /// Builder pattern: set batch reporting delay
    pub fn batch_reporting_delay_ms(mut self, delay_ms: u64) -> Self {
        self.batch_reporting_delay_ms = Some(delay_ms);
        self
    }

    /// Builder pattern: enable/disable in-app dialogs
    pub fn in_app_dialogs_enabled(mut self, enabled: bool) -> Self {
        self.in_app_dialogs_enabled = Some(enabled);
        self
    }

    /// Builder pattern: enable debug mode
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = Some(enabled);
        self
    }

    /// Get batch reporting delay duration
    pub fn get_batch_reporting_delay(&self) -> Duration {
        Duration::from_millis(
            self.batch_reporting_delay_ms
                .unwrap_or(DEFAULT_BATCH_REPORTING_DELAY_MS),
        )
    }

    /// Check if debug mode is enabled
    pub fn is_debug(&self) -> bool {
        self.debug.unwrap_or(false)
    }
}

/// Internal configuration derived from MessagingOptions
#[derive(Debug, Clone)]
pub struct Config {
    pub application_code: String,
    pub api_uri: Url,
    pub batch_reporting_delay: Duration,
    pub in_app_dialogs_enabled: bool,
    pub debug: bool,
}

impl TryFrom<MessagingOptions> for Config {
    type Error = MessagingError;

    fn try_from(opts: MessagingOptions) -> Result<Self> {
        if is_blank(&opts.application_code) {
            return Err(MessagingError::config("Application code is required"));
        }

        let api_uri = Url::parse(opts.api_uri.as_deref().unwrap_or(DEFAULT_API_URI))?;
        if !matches!(api_uri.scheme(), "http" | "https") {
            return Err(MessagingError::config(format!(
                "Unsupported API URI scheme: {}",
                api_uri.scheme()
            )));
        }

        Ok(Self {
            batch_reporting_delay: opts.get_batch_reporting_delay(),
            debug: opts.is_debug(),
            in_app_dialogs_enabled: opts.in_app_dialogs_enabled.unwrap_or(true),
            application_code: opts.application_code,
            api_uri,
        })
    }
}
