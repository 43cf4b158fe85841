//! Interactive notifications: categories, foreground tracking and in-app dialogs.

pub mod category;
pub mod foreground;
pub mod handler;
pub mod rules;

pub use category::{CategoryRegistry, InteractiveCategories, NotificationAction, NotificationCategory};
pub use foreground::{
    ActivityLifecycleMonitor, ForegroundListener, ForegroundState, ForegroundStateMonitor,
    ScreenHandle,
};
pub use handler::{InAppNotificationHandler, InAppView};
pub use rules::{DisplayDecision, InAppRules};
