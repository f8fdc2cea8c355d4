//! API client error taxonomy

use thiserror::Error;

use crate::i18n::Language;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The backend answered 401; the session has already been cleared
    #[error("Authentication required")]
    Authentication,

    /// Any other non-2xx response
    #[error("HTTP {status}{}", message_suffix(.message))]
    Http { status: u16, message: Option<String> },

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// A 2xx response whose body was not the expected JSON
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A body-bearing call was given something other than a JSON object
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Base URL and endpoint did not form a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication => Some(401),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, ApiError::Authentication)
    }

    /// Best-effort text for an inline error banner
    ///
    /// Prefers the backend's own message, falling back to a generic string in
    /// the UI language.
    pub fn user_message(&self, lang: Language) -> String {
        match self {
            ApiError::Http {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ApiError::Authentication => match lang {
                Language::En => "Your session has expired. Please log in again.".to_string(),
                Language::Ar => "انتهت صلاحية الجلسة. يرجى تسجيل الدخول مرة أخرى.".to_string(),
            },
            _ => generic_message(lang).to_string(),
        }
    }
}

fn message_suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {m}"),
        None => String::new(),
    }
}

pub(crate) fn generic_message(lang: Language) -> &'static str {
    match lang {
        Language::En => "Something went wrong. Please try again.",
        Language::Ar => "حدث خطأ ما. يرجى المحاولة مرة أخرى.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ApiError::Http {
            status: 404,
            message: Some("Project not found".to_string()),
        };
        assert_eq!(err.to_string(), "HTTP 404: Project not found");

        let err = ApiError::Http {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn test_status() {
        assert_eq!(ApiError::Authentication.status(), Some(401));
        assert_eq!(ApiError::Network("refused".into()).status(), None);
        assert_eq!(ApiError::InvalidUrl("nope".into()).status(), None);
    }

    #[test]
    fn test_user_message_prefers_backend_text() {
        let err = ApiError::Http {
            status: 422,
            message: Some("Title is required".to_string()),
        };
        assert_eq!(err.user_message(Language::Ar), "Title is required");

        let err = ApiError::Network("connection refused".to_string());
        assert_eq!(err.user_message(Language::En), generic_message(Language::En));
        assert_eq!(err.user_message(Language::Ar), generic_message(Language::Ar));
    }
}
