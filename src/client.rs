//! Main mobile messaging client.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::api::ApiHeaders;
use crate::error::{MessagingError, Result};
#[cfg(feature = "uniffi")]
use crate::ffi_callbacks::{
    forward_event, EventCallback, ForegroundCallback, ForegroundCallbackAdapter,
    InAppViewCallback, InAppViewCallbackAdapter, MsisdnRegistrarCallback,
    MsisdnRegistrarCallbackAdapter, ReportSinkCallback, ReportSinkCallbackAdapter,
};
use crate::events::{Event, EventDispatcher, SdkEvent};
use crate::interactive::{
    ActivityLifecycleMonitor, CategoryRegistry, DisplayDecision, ForegroundStateMonitor,
    InAppNotificationHandler, InAppRules, InAppView, InteractiveCategories, NotificationAction,
    NotificationCategory, ScreenHandle,
};
use crate::message::Message;
use crate::options::{Config, MessagingOptions};
use crate::reporting::{BatchReporter, MessageReports, ReportSink};
use crate::stats::MessagingStats;
use crate::sync::{MsisdnRegistrar, MsisdnSynchronizer, SyncOutcome};
use crate::user_data::{self, UserBody, UserData};

/// Host-provided implementations of the pieces the library cannot do itself
#[derive(Clone)]
pub struct Collaborators {
    /// Sends delivery and seen reports to the backend
    pub report_sink: Arc<dyn ReportSink>,
    /// Registers the MSISDN on the backend
    pub msisdn_registrar: Arc<dyn MsisdnRegistrar>,
    /// Presents in-app dialogs
    pub in_app_view: Arc<dyn InAppView>,
    /// Foreground state provider. When `None` the client tracks the
    /// foreground itself from [`MobileMessaging::on_screen_resumed`] and
    /// [`MobileMessaging::on_screen_paused`].
    pub foreground: Option<Arc<dyn ForegroundStateMonitor>>,
}

/// The mobile messaging client.
///
/// Created from Rust with [`MobileMessaging::new`] inside a Tokio runtime;
/// batched reports run on it. Kotlin/Swift hosts use the FFI constructors,
/// which start a runtime owned by the client.
///
/// # Example
///
/// ```ignore
/// use mobile_messaging::{Collaborators, MessagingOptions, MobileMessaging};
///
/// let client = MobileMessaging::new(
///     MessagingOptions::new("application-code"),
///     Collaborators {
///         report_sink,
///         msisdn_registrar,
///         in_app_view,
///         foreground: None,
///     },
/// )?;
///
/// client.on_screen_resumed(ScreenHandle::named("1", "MainActivity"));
/// client.message_received(message);
/// ```
#[cfg_attr(feature = "uniffi", derive(uniffi::Object))]
pub struct MobileMessaging {
    config: Arc<Config>,
    session_id: String,
    dispatcher: EventDispatcher,
    categories: Arc<InteractiveCategories>,
    lifecycle: Arc<ActivityLifecycleMonitor>,
    foreground: Arc<dyn ForegroundStateMonitor>,
    reports: MessageReports,
    in_app: Arc<InAppNotificationHandler>,
    msisdn: MsisdnSynchronizer,
    stats: Arc<MessagingStats>,
    push_registration_id: RwLock<Option<String>>,
    #[cfg(feature = "uniffi")]
    runtime: Handle,
    /// Set when the client started its own runtime
    #[cfg(feature = "uniffi")]
    _owned_runtime: Option<tokio::runtime::Runtime>,
}

impl MobileMessaging {
    /// Create a client on the current Tokio runtime
    pub fn new(options: MessagingOptions, collaborators: Collaborators) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| {
            MessagingError::invalid_state("Mobile messaging client requires a Tokio runtime")
        })?;
        Self::with_runtime(options, collaborators, runtime)
    }

    /// Create a client whose background work runs on `runtime`
    pub fn with_runtime(
        options: MessagingOptions,
        collaborators: Collaborators,
        runtime: Handle,
    ) -> Result<Self> {
        let config = Arc::new(Config::try_from(options)?);
        let session_id = uuid::Uuid::new_v4().to_string();

        info!(
            "Creating mobile messaging client for '{}' (session: {})",
            config.application_code, session_id
        );

        let dispatcher = EventDispatcher::new();
        let stats = Arc::new(MessagingStats::new());
        let categories = Arc::new(InteractiveCategories::new());
        let lifecycle = Arc::new(ActivityLifecycleMonitor::new());
        let foreground: Arc<dyn ForegroundStateMonitor> = match collaborators.foreground {
            Some(external) => external,
            None => lifecycle.clone() as Arc<dyn ForegroundStateMonitor>,
        };

        let batch = Arc::new(
            BatchReporter::with_runtime(config.batch_reporting_delay, runtime.clone())
                .verbose(config.debug),
        );
        let reports = MessageReports::new(
            batch,
            collaborators.report_sink,
            dispatcher.clone(),
            stats.clone(),
        );

        let rules = InAppRules::new(categories.clone(), foreground.clone()).verbose(config.debug);
        let in_app = Arc::new(InAppNotificationHandler::new(
            rules,
            collaborators.in_app_view,
            dispatcher.clone(),
            reports.clone(),
            config.in_app_dialogs_enabled,
        ));

        // Weak: the handler already reaches the monitor through the rules.
        let handler: Weak<InAppNotificationHandler> = Arc::downgrade(&in_app);
        lifecycle.add_foreground_listener(move |screen| {
            if let Some(handler) = handler.upgrade() {
                debug!("App in foreground on screen {}", screen.id);
                handler.app_went_to_foreground();
            }
        });

        let msisdn = MsisdnSynchronizer::new(
            collaborators.msisdn_registrar,
            dispatcher.clone(),
            stats.clone(),
        );

        Ok(Self {
            config,
            session_id,
            dispatcher,
            categories,
            lifecycle,
            foreground,
            reports,
            in_app,
            msisdn,
            stats,
            push_registration_id: RwLock::new(None),
            #[cfg(feature = "uniffi")]
            runtime,
            #[cfg(feature = "uniffi")]
            _owned_runtime: None,
        })
    }

    pub fn application_code(&self) -> &str {
        &self.config.application_code
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> &MessagingStats {
        &self.stats
    }

    // ---- events ----

    pub fn bind(&self, event: Event, callback: impl Fn(&SdkEvent) + Send + Sync + 'static) -> u64 {
        self.dispatcher.bind(event, callback)
    }

    pub fn bind_global(&self, callback: impl Fn(&SdkEvent) + Send + Sync + 'static) -> u64 {
        self.dispatcher.bind_global(callback)
    }

    /// Registration stored on the backend
    pub fn registration_created(&self, push_registration_id: impl Into<String>) {
        let id = push_registration_id.into();
        info!("Push registration created: {}", id);
        *self.push_registration_id.write() = Some(id);
        self.dispatcher.emit(&SdkEvent::new(Event::RegistrationCreated));
    }

    // ---- messages ----

    pub fn message_seen(&self, message_ids: impl IntoIterator<Item = String>) {
        self.reports.report_seen(message_ids);
    }

    pub fn user_tapped_action(&self, message: &Message, action: &NotificationAction) {
        self.in_app.user_tapped_action(message, action);
    }

    // ---- foreground ----

    pub fn on_screen_paused(&self, screen: &ScreenHandle) {
        self.lifecycle.on_screen_paused(screen);
    }

    // ---- sync ----

    pub async fn sync_msisdn(&self, msisdn: i64, reported: bool) -> SyncOutcome {
        let installation_id = self.push_registration_id();
        self.msisdn
            .synchronize(installation_id.as_deref(), msisdn, reported)
            .await
    }

    /// Request body for reporting `user_data`, `None` if there is nothing to send
    pub fn user_data_report_body(&self, user_data: &UserData) -> Option<UserBody> {
        let body = user_data::to_user_body(user_data);
        (!user_data::is_user_body_empty(Some(&body))).then_some(body)
    }

    /// Apply the backend's response to a user data report
    pub fn user_data_reported(&self, response: &UserBody) -> UserData {
        let user_data = user_data::from_user_body(response);
        self.dispatcher
            .emit(&SdkEvent::new(Event::UserDataReported).with_user_data(user_data.clone()));
        user_data
    }
}

// Methods usable from Rust and exported to Kotlin/Swift
#[cfg_attr(feature = "uniffi", uniffi::export)]
impl MobileMessaging {
    pub fn push_registration_id(&self) -> Option<String> {
        self.push_registration_id.read().clone()
    }

    pub fn unbind(&self, event: Option<Event>, callback_id: Option<u64>) {
        self.dispatcher.unbind(event, callback_id);
    }

    // ---- registration ----

    /// Cloud push token obtained from the platform
    pub fn registration_acquired(&self, cloud_token: &str) {
        debug!("Cloud token acquired");
        self.dispatcher
            .emit(&SdkEvent::new(Event::RegistrationAcquired).with_cloud_token(cloud_token));
    }

    // ---- categories ----

    pub fn set_notification_categories(&self, categories: Vec<NotificationCategory>) -> Result<()> {
        self.categories.set_custom_categories(categories)
    }

    pub fn notification_category(&self, category_id: &str) -> Option<NotificationCategory> {
        self.categories.notification_category(category_id)
    }

    // ---- messages ----

    /// Entry point for every push message. Queues a delivery report and
    /// decides about the in-app dialog.
    pub fn message_received(&self, message: Message) -> DisplayDecision {
        debug!("Message received: {}", message.message_id);
        self.reports.report_delivery([message.message_id.clone()]);
        self.dispatcher
            .emit(&SdkEvent::new(Event::MessageReceived).with_message(message.clone()));
        self.in_app.handle_message(message)
    }

    pub fn notification_tapped(&self, message: Message) {
        self.reports.report_seen([message.message_id.clone()]);
        self.dispatcher
            .emit(&SdkEvent::new(Event::NotificationTapped).with_message(message));
    }

    pub fn pending_delivery_reports(&self) -> Vec<String> {
        self.reports.pending_delivery()
    }

    pub fn pending_seen_reports(&self) -> Vec<String> {
        self.reports.pending_seen()
    }

    // ---- foreground ----

    pub fn on_screen_resumed(&self, screen: ScreenHandle) {
        self.lifecycle.on_screen_resumed(screen);
    }

    /// Re-evaluate the deferred in-app message. Only needed with an external
    /// foreground provider; the built-in tracker calls it on its own.
    pub fn app_went_to_foreground(&self) -> Option<DisplayDecision> {
        self.in_app.app_went_to_foreground()
    }

    pub fn is_in_foreground(&self) -> bool {
        self.foreground.foreground_state().is_foreground()
    }

    pub fn is_msisdn_reported(&self) -> bool {
        self.msisdn.is_reported()
    }

    /// Custom headers for the next backend request
    pub fn api_headers(&self) -> HashMap<String, String> {
        ApiHeaders::build(
            &self.config.application_code,
            &self.session_id,
            self.is_in_foreground(),
            self.push_registration_id().as_deref(),
        )
    }
}

// FFI-only entry points
#[cfg(feature = "uniffi")]
#[uniffi::export]
impl MobileMessaging {
    /// Create a client that tracks the foreground from
    /// `on_screen_resumed`/`on_screen_paused_ffi` (FFI version).
    #[uniffi::constructor]
    pub fn with_callbacks(
        options: MessagingOptions,
        report_sink: Box<dyn ReportSinkCallback>,
        msisdn_registrar: Box<dyn MsisdnRegistrarCallback>,
        in_app_view: Box<dyn InAppViewCallback>,
    ) -> Result<Self> {
        Self::from_ffi(options, report_sink, msisdn_registrar, in_app_view, None)
    }

    /// Create a client that asks the host for the foreground state (FFI version).
    #[uniffi::constructor]
    pub fn with_foreground_callback(
        options: MessagingOptions,
        report_sink: Box<dyn ReportSinkCallback>,
        msisdn_registrar: Box<dyn MsisdnRegistrarCallback>,
        in_app_view: Box<dyn InAppViewCallback>,
        foreground: Box<dyn ForegroundCallback>,
    ) -> Result<Self> {
        let foreground: Arc<dyn ForegroundStateMonitor> =
            Arc::new(ForegroundCallbackAdapter(foreground));
        Self::from_ffi(
            options,
            report_sink,
            msisdn_registrar,
            in_app_view,
            Some(foreground),
        )
    }

    /// Forward every event to a Kotlin/Swift callback
    pub fn bind_callback(&self, callback: Box<dyn EventCallback>) -> u64 {
        self.dispatcher.bind_global(move |event| {
            forward_event(callback.as_ref(), event);
        })
    }

    pub fn registration_created_ffi(&self, push_registration_id: String) {
        self.registration_created(push_registration_id);
    }

    pub fn message_seen_ffi(&self, message_ids: Vec<String>) {
        self.message_seen(message_ids);
    }

    pub fn user_tapped_action_ffi(&self, message: Message, action: NotificationAction) {
        self.user_tapped_action(&message, &action);
    }

    pub fn on_screen_paused_ffi(&self, screen: ScreenHandle) {
        self.on_screen_paused(&screen);
    }

    /// Blocking MSISDN sync. Returns whether the MSISDN is on the backend.
    /// Must not be called from the client's own callbacks.
    pub fn sync_msisdn_ffi(&self, msisdn: i64, reported: bool) -> Result<bool> {
        match self.runtime.block_on(self.sync_msisdn(msisdn, reported)) {
            SyncOutcome::AlreadyReported | SyncOutcome::Reported => Ok(true),
            SyncOutcome::Cleared => Ok(false),
            SyncOutcome::Failed(e) => Err(e),
        }
    }
}

#[cfg(feature = "uniffi")]
impl MobileMessaging {
    fn from_ffi(
        options: MessagingOptions,
        report_sink: Box<dyn ReportSinkCallback>,
        msisdn_registrar: Box<dyn MsisdnRegistrarCallback>,
        in_app_view: Box<dyn InAppViewCallback>,
        foreground: Option<Arc<dyn ForegroundStateMonitor>>,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("mobile-messaging")
            .enable_time()
            .build()
            .map_err(|e| MessagingError::invalid_state(format!("Cannot start runtime: {}", e)))?;

        let collaborators = Collaborators {
            report_sink: Arc::new(ReportSinkCallbackAdapter::new(report_sink)),
            msisdn_registrar: Arc::new(MsisdnRegistrarCallbackAdapter::new(msisdn_registrar)),
            in_app_view: Arc::new(InAppViewCallbackAdapter(in_app_view)),
            foreground,
        };

        let mut client = Self::with_runtime(options, collaborators, runtime.handle().clone())?;
        client._owned_runtime = Some(runtime);
        Ok(client)
    }
}

impl std::fmt::Debug for MobileMessaging {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MobileMessaging")
            .field("application_code", &self.config.application_code)
            .field("session_id", &self.session_id)
            .field("in_app", &self.in_app)
            .field("reports", &self.reports)
            .finish()
    }
}
