//! Shared error handling for backend calls.

use reqwest::StatusCode;
use tracing::{error, warn};

use crate::forms::FieldErrors;

pub const SESSION_EXPIRED_MESSAGE: &str = "Сессия истекла. Пожалуйста, войдите снова";
pub const CONNECTION_MESSAGE: &str = "Ошибка соединения с сервером";
pub const NOT_SIGNED_IN_MESSAGE: &str = "Требуется вход в систему";

/// Extension trait for attaching a user-facing fallback to failed calls.
pub trait ResultExt<T> {
    /// Convert the failure into the notification text shown to the user.
    fn or_notify(self, fallback: &str) -> Result<T, String>;
}

impl<T> ResultExt<T> for Result<T, ApiError> {
    fn or_notify(self, fallback: &str) -> Result<T, String> {
        self.map_err(|e| e.user_message(fallback))
    }
}

/// Failure of a backend call as observed by the client.
#[derive(Debug)]
pub enum ApiError {
    /// The call needs a session and there is none
    NotSignedIn,
    /// HTTP 401 on an authenticated call; the session has been cleared
    SessionExpired,
    /// Backend refused the request and explained why
    Rejected { status: StatusCode, message: String },
    /// Backend refused the request without a message
    Status(StatusCode),
    /// Backend unreachable
    Network(String),
    /// Response body did not have the expected shape
    Decode(String),
    /// Form rejected before anything was sent
    Validation(FieldErrors),
}

impl ApiError {
    pub fn rejected(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn transport(context: &str, e: reqwest::Error) -> Self {
        if e.is_decode() {
            error!(error = %e, "{}: malformed response", context);
            Self::Decode(e.to_string())
        } else {
            warn!(error = %e, "{}: backend unreachable", context);
            Self::Network(e.to_string())
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::SessionExpired => Some(StatusCode::UNAUTHORIZED),
            ApiError::Rejected { status, .. } | ApiError::Status(status) => Some(*status),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }

    /// Notification text for this failure. Backend messages are shown
    /// verbatim; failures without one fall back to the caller's context text.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::NotSignedIn => NOT_SIGNED_IN_MESSAGE.to_string(),
            ApiError::SessionExpired => SESSION_EXPIRED_MESSAGE.to_string(),
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::Network(_) => CONNECTION_MESSAGE.to_string(),
            ApiError::Validation(_) => "Пожалуйста, исправьте ошибки в форме".to_string(),
            ApiError::Status(_) | ApiError::Decode(_) => fallback.to_string(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotSignedIn => write!(f, "not signed in"),
            ApiError::SessionExpired => write!(f, "session expired"),
            ApiError::Rejected { status, message } => write!(f, "{}: {}", status, message),
            ApiError::Status(status) => write!(f, "request failed with {}", status),
            ApiError::Network(e) => write!(f, "connection error: {}", e),
            ApiError::Decode(e) => write!(f, "unexpected response: {}", e),
            ApiError::Validation(errors) => write!(f, "invalid form: {}", errors),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_wins_over_fallback() {
        let err = ApiError::rejected(StatusCode::BAD_REQUEST, "Кабинет уже существует");
        assert_eq!(
            err.user_message("Ошибка сохранения"),
            "Кабинет уже существует"
        );
    }

    #[test]
    fn test_fallback_for_bare_status() {
        let err = ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message("Ошибка загрузки данных"), "Ошибка загрузки данных");
    }

    #[test]
    fn test_or_notify_maps_session_expiry() {
        let result: Result<(), ApiError> = Err(ApiError::SessionExpired);
        assert_eq!(result.or_notify("x").unwrap_err(), SESSION_EXPIRED_MESSAGE);
    }
}
