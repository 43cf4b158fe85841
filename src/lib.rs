//! # Mobile Messaging
//!
//! Core of a push-notification mobile client SDK, with bindings for Kotlin
//! and Swift.
//!
//! ## Features
//!
//! - In-app interactive dialogs: rules deciding whether a message is shown
//!   now, deferred until the app is in the foreground, or suppressed
//! - Notification categories with predefined and custom actions
//! - Batched delivery and seen reports
//! - MSISDN and user data synchronization
//! - Library events for the host application
//! - Cross-platform support via UniFFI (Kotlin/Swift)
//!
//! ## Example
//!
//! ```ignore
//! use mobile_messaging::{Collaborators, Message, MessagingOptions, MobileMessaging};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = MessagingOptions::new("your-application-code")
//!         .batch_reporting_delay_ms(2_000);
//!
//!     let client = MobileMessaging::new(options, collaborators)?;
//!
//!     let message = Message::new("message-id")
//!         .with_body("Hello")
//!         .with_internal_data(r#"{"inApp":true}"#);
//!     let decision = client.message_received(message);
//!     println!("Dialog: {:?}", decision);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod events;
pub mod interactive;
pub mod reporting;
pub mod sync;
pub mod user_data;
pub mod utils;

mod client;
mod error;
#[cfg(feature = "uniffi")]
mod ffi_callbacks;
mod message;
mod options;
mod stats;

// Re-exports
pub use client::{Collaborators, MobileMessaging};
pub use error::{MessagingError, Result};
pub use events::{Event, EventDispatcher, SdkEvent};
#[cfg(feature = "uniffi")]
pub use ffi_callbacks::{
    EventCallback, ForegroundCallback, ForegroundCallbackAdapter, InAppViewCallback,
    InAppViewCallbackAdapter, MsisdnRegistrarCallback, MsisdnRegistrarCallbackAdapter,
    ReportSinkCallback, ReportSinkCallbackAdapter,
};
pub use interactive::{
    ActivityLifecycleMonitor, CategoryRegistry, DisplayDecision, ForegroundState,
    ForegroundStateMonitor, InAppNotificationHandler, InAppRules, InAppView,
    InteractiveCategories, NotificationAction, NotificationCategory, ScreenHandle,
};
pub use message::Message;
pub use options::{Config, MessagingOptions};
pub use reporting::{BatchReporter, MessageReports, ReportSink};
pub use stats::{MessagingStats, StatsError};
pub use sync::{MsisdnRegistrar, MsisdnSynchronizer, SyncOutcome};
pub use user_data::{CustomAttributeValue, Gender, UserBody, UserData};

// UniFFI setup for Kotlin/Swift bindings
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();
