//! FFI callback interfaces for UniFFI bindings

#![cfg(feature = "uniffi")]

use crate::error::{MessagingError, Result};
use crate::events::{Event, SdkEvent};
use crate::interactive::{
    ForegroundState, ForegroundStateMonitor, InAppView, NotificationAction, NotificationCategory,
    ScreenHandle,
};
use crate::message::Message;
use crate::reporting::ReportSink;
use crate::sync::MsisdnRegistrar;
use async_trait::async_trait;
use std::sync::Arc;

/// Foreground state supplied by the Kotlin/Swift host
#[uniffi::export(callback_interface)]
pub trait ForegroundCallback: Send + Sync {
    fn foreground_state(&self) -> ForegroundState;
}

/// In-app dialog presentation implemented by the host
#[uniffi::export(callback_interface)]
pub trait InAppViewCallback: Send + Sync {
    fn show(
        &self,
        message: Message,
        category: Option<NotificationCategory>,
        actions: Vec<NotificationAction>,
        screen: Option<ScreenHandle>,
    );
}

/// Receives library events
#[uniffi::export(callback_interface)]
pub trait EventCallback: Send + Sync {
    fn on_event(&self, event: Event, message_ids: Vec<String>, error: Option<String>);
}

/// Report requests performed by the host's HTTP stack.
///
/// Called on a blocking worker thread; returns whether the backend accepted
/// the reports.
#[uniffi::export(callback_interface)]
pub trait ReportSinkCallback: Send + Sync {
    fn report_delivery(&self, message_ids: Vec<String>) -> bool;
    fn report_seen(&self, message_ids: Vec<String>) -> bool;
}

/// MSISDN registration performed by the host's HTTP stack
#[uniffi::export(callback_interface)]
pub trait MsisdnRegistrarCallback: Send + Sync {
    fn register_msisdn(&self, msisdn: i64) -> bool;
}

/// Adapts a host callback to [`ForegroundStateMonitor`]
pub struct ForegroundCallbackAdapter(pub Box<dyn ForegroundCallback>);

impl ForegroundStateMonitor for ForegroundCallbackAdapter {
    fn foreground_state(&self) -> ForegroundState {
        self.0.foreground_state()
    }
}

/// Adapts a host callback to [`InAppView`]
pub struct InAppViewCallbackAdapter(pub Box<dyn InAppViewCallback>);

impl InAppView for InAppViewCallbackAdapter {
    fn show(
        &self,
        message: &Message,
        category: Option<&NotificationCategory>,
        actions: &[NotificationAction],
        screen: Option<&ScreenHandle>,
    ) {
        self.0.show(
            message.clone(),
            category.cloned(),
            actions.to_vec(),
            screen.cloned(),
        );
    }
}

/// Adapts a host callback to [`ReportSink`]
pub struct ReportSinkCallbackAdapter(Arc<dyn ReportSinkCallback>);

impl ReportSinkCallbackAdapter {
    pub fn new(callback: Box<dyn ReportSinkCallback>) -> Self {
        Self(Arc::from(callback))
    }

    async fn call(
        &self,
        message_ids: &[String],
        request: fn(&dyn ReportSinkCallback, Vec<String>) -> bool,
    ) -> Result<()> {
        let callback = self.0.clone();
        let ids = message_ids.to_vec();
        let accepted = tokio::task::spawn_blocking(move || request(callback.as_ref(), ids))
            .await
            .map_err(|e| MessagingError::api(format!("Report callback failed: {}", e)))?;
        if accepted {
            Ok(())
        } else {
            Err(MessagingError::api("Backend rejected the reports"))
        }
    }
}

#[async_trait]
impl ReportSink for ReportSinkCallbackAdapter {
    async fn report_delivery(&self, message_ids: &[String]) -> Result<()> {
        self.call(message_ids, |cb, ids| cb.report_delivery(ids)).await
    }

    async fn report_seen(&self, message_ids: &[String]) -> Result<()> {
        self.call(message_ids, |cb, ids| cb.report_seen(ids)).await
    }
}

/// Adapts a host callback to [`MsisdnRegistrar`]
pub struct MsisdnRegistrarCallbackAdapter(Arc<dyn MsisdnRegistrarCallback>);

impl MsisdnRegistrarCallbackAdapter {
    pub fn new(callback: Box<dyn MsisdnRegistrarCallback>) -> Self {
        Self(Arc::from(callback))
    }
}

#[async_trait]
impl MsisdnRegistrar for MsisdnRegistrarCallbackAdapter {
    async fn register_msisdn(&self, msisdn: i64) -> Result<()> {
        let callback = self.0.clone();
        let accepted = tokio::task::spawn_blocking(move || callback.register_msisdn(msisdn))
            .await
            .map_err(|e| MessagingError::api(format!("MSISDN callback failed: {}", e)))?;
        if accepted {
            Ok(())
        } else {
            Err(MessagingError::api("Backend rejected the MSISDN"))
        }
    }
}

/// Forward an event to a host callback
pub fn forward_event(callback: &dyn EventCallback, event: &SdkEvent) {
    callback.on_event(event.event, event.message_ids.clone(), event.error.clone());
}
