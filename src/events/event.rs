//! Events broadcast by the library.

use crate::interactive::NotificationAction;
use crate::message::Message;
use crate::user_data::UserData;
use serde::{Deserialize, Serialize};

const KEY_PREFIX: &str = "org.infobip.mobile.messaging.";

/// Everything the library broadcasts to the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    /// Cloud registration token received
    RegistrationAcquired,
    /// Registration stored on the backend
    RegistrationCreated,
    MessageReceived,
    MessagesSent,
    /// Any error returned by the API
    ApiCommunicationError,
    DeliveryReportsSent,
    SeenReportsSent,
    NotificationTapped,
    /// Action button tapped on a notification or in-app dialog
    NotificationActionTapped,
    UserDataReported,
    SystemDataReported,
    UserLoggedOut,
    PushRegistrationEnabled,
    PrimaryChanged,
    MsisdnSynced,
}

impl Event {
    pub const ALL: [Event; 15] = [
        Event::RegistrationAcquired,
        Event::RegistrationCreated,
        Event::MessageReceived,
        Event::MessagesSent,
        Event::ApiCommunicationError,
        Event::DeliveryReportsSent,
        Event::SeenReportsSent,
        Event::NotificationTapped,
        Event::NotificationActionTapped,
        Event::UserDataReported,
        Event::SystemDataReported,
        Event::UserLoggedOut,
        Event::PushRegistrationEnabled,
        Event::PrimaryChanged,
        Event::MsisdnSynced,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::RegistrationAcquired => "REGISTRATION_ACQUIRED",
            Self::RegistrationCreated => "REGISTRATION_CREATED",
            Self::MessageReceived => "MESSAGE_RECEIVED",
            Self::MessagesSent => "MESSAGES_SENT",
            Self::ApiCommunicationError => "API_COMMUNICATION_ERROR",
            Self::DeliveryReportsSent => "DELIVERY_REPORTS_SENT",
            Self::SeenReportsSent => "SEEN_REPORTS_SENT",
            Self::NotificationTapped => "NOTIFICATION_TAPPED",
            Self::NotificationActionTapped => "NOTIFICATION_ACTION_TAPPED",
            Self::UserDataReported => "USER_DATA_REPORTED",
            Self::SystemDataReported => "SYSTEM_DATA_REPORTED",
            Self::UserLoggedOut => "USER_LOGGED_OUT",
            Self::PushRegistrationEnabled => "PUSH_REGISTRATION_ENABLED",
            Self::PrimaryChanged => "PRIMARY_CHANGED",
            Self::MsisdnSynced => "MSISDN_SYNCED",
        }
    }

    /// Broadcast key, stable across releases
    pub fn key(&self) -> String {
        format!("{}{}", KEY_PREFIX, self.name())
    }

    pub fn from_key(key: &str) -> Option<Event> {
        let name = key.strip_prefix(KEY_PREFIX)?;
        Self::ALL.iter().copied().find(|e| e.name() == name)
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Payload delivered with an [`Event`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkEvent {
    pub event: Event,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub message_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<NotificationAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msisdn: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<UserData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SdkEvent {
    pub fn new(event: Event) -> Self {
        Self {
            event,
            message_ids: Vec::new(),
            message: None,
            action: None,
            msisdn: None,
            user_data: None,
            cloud_token: None,
            error: None,
        }
    }

    pub fn with_message_ids(mut self, ids: Vec<String>) -> Self {
        self.message_ids = ids;
        self
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }

    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_msisdn(mut self, msisdn: i64) -> Self {
        self.msisdn = Some(msisdn);
        self
    }

    pub fn with_user_data(mut self, user_data: UserData) -> Self {
        self.user_data = Some(user_data);
        self
    }

    pub fn with_cloud_token(mut self, token: impl Into<String>) -> Self {
        self.cloud_token = Some(token.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(
            Event::MessageReceived.key(),
            "org.infobip.mobile.messaging.MESSAGE_RECEIVED"
        );
        for event in Event::ALL {
            assert_eq!(Event::from_key(&event.key()), Some(event));
        }
        assert_eq!(Event::from_key("MESSAGE_RECEIVED"), None);
    }

    #[test]
    fn test_event_serialization() {
        let event = SdkEvent::new(Event::SeenReportsSent).with_message_ids(vec!["a".into()]);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "SEEN_REPORTS_SENT");
        assert_eq!(json["messageIds"][0], "a");
        assert!(json.get("message").is_none());
    }
}
