//! Custom headers attached to backend requests.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomApiHeader {
    Foreground,
    SessionId,
    PushRegistrationId,
    InstallationId,
    /// Sent by the backend when the client should switch base URL
    NewBaseUrl,
    ApplicationCode,
}

impl CustomApiHeader {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Foreground => "foreground",
            Self::SessionId => "sessionId",
            Self::PushRegistrationId => "pushregistrationid",
            Self::InstallationId => "installationid",
            Self::NewBaseUrl => "New-Base-URL",
            Self::ApplicationCode => "applicationcode",
        }
    }
}

impl std::fmt::Display for CustomApiHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for the custom header map of a request
#[derive(Debug, Clone, Default)]
pub struct ApiHeaders {
    headers: HashMap<String, String>,
}

impl ApiHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Headers every request carries
    pub fn build(
        application_code: &str,
        session_id: &str,
        foreground: bool,
        push_registration_id: Option<&str>,
    ) -> HashMap<String, String> {
        let mut headers = Self::new()
            .with(CustomApiHeader::ApplicationCode, application_code)
            .with(CustomApiHeader::SessionId, session_id)
            .with(CustomApiHeader::Foreground, foreground.to_string());
        if let Some(id) = push_registration_id {
            headers = headers
                .with(CustomApiHeader::PushRegistrationId, id)
                .with(CustomApiHeader::InstallationId, id);
        }
        headers.into_map()
    }

    pub fn with(mut self, header: CustomApiHeader, value: impl Into<String>) -> Self {
        self.headers.insert(header.as_str().to_string(), value.into());
        self
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.headers
    }

    /// Base URL the backend asked the client to switch to, if any.
    /// Header names are matched case-insensitively.
    pub fn new_base_url(response_headers: &HashMap<String, String>) -> Option<&str> {
        response_headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(CustomApiHeader::NewBaseUrl.as_str()))
            .map(|(_, value)| value.as_str())
    }
}
