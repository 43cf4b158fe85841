//! Error types for the mobile messaging library.

use thiserror::Error;

/// Result type alias for mobile messaging operations
pub type Result<T> = std::result::Result<T, MessagingError>;

/// Main error type for the mobile messaging client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
#[cfg_attr(feature = "uniffi", uniffi(flat_error))]
pub enum MessagingError {
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Invalid category: {message}")]
    InvalidCategory { message: String },

    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    #[error("User data error: {message}")]
    UserDataError { message: String },
}

impl MessagingError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: msg.into(),
        }
    }

    pub fn invalid_category(msg: impl Into<String>) -> Self {
        Self::InvalidCategory {
            message: msg.into(),
        }
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState {
            message: msg.into(),
        }
    }

    pub fn api(msg: impl Into<String>) -> Self {
        Self::ApiError {
            message: msg.into(),
        }
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError {
            message: msg.into(),
        }
    }

    pub fn user_data(msg: impl Into<String>) -> Self {
        Self::UserDataError {
            message: msg.into(),
        }
    }
}

impl From<serde_json::Error> for MessagingError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<url::ParseError> for MessagingError {
    fn from(err: url::ParseError) -> Self {
        Self::config(format!("Invalid URL: {}", err))
    }
}

impl From<chrono::ParseError> for MessagingError {
    fn from(err: chrono::ParseError) -> Self {
        Self::user_data(format!("Invalid date: {}", err))
    }
}
