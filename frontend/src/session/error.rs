use thiserror::Error;

use crate::{
    api::{ApiError, FieldErrors},
    utils::storage::StorageError,
};

/// Every way a session operation can fail. Transport errors are classified
/// here, before they reach any view.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Corrupted session: {0}")]
    CorruptedSession(String),
}

impl SessionError {
    /// Token endpoints answer bad credentials (and a rejected refresh token)
    /// with 401, and a missing field with 400.
    pub(crate) fn from_token_failure(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized(_) | ApiError::BadRequest(_) => SessionError::InvalidCredentials,
            other => SessionError::Network(other.to_string()),
        }
    }

    pub(crate) fn from_registration_failure(err: ApiError) -> Self {
        match err {
            ApiError::BadRequest(fields) => SessionError::Validation(fields),
            other => SessionError::Network(other.to_string()),
        }
    }

    /// Message a form shows next to the given field, if any.
    pub fn field_message(&self, field: &str) -> Option<String> {
        match self {
            SessionError::Validation(fields) => fields.get(field).map(|m| m.join(" ")),
            _ => None,
        }
    }
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        SessionError::CorruptedSession(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_failures_classify_by_status() {
        assert_eq!(
            SessionError::from_token_failure(ApiError::Unauthorized("nope".into())),
            SessionError::InvalidCredentials
        );
        assert_eq!(
            SessionError::from_token_failure(ApiError::BadRequest(FieldErrors::new())),
            SessionError::InvalidCredentials
        );
        assert!(matches!(
            SessionError::from_token_failure(ApiError::Network("refused".into())),
            SessionError::Network(msg) if msg.contains("refused")
        ));
        assert!(matches!(
            SessionError::from_token_failure(ApiError::Server {
                status: 503,
                body: "down".into()
            }),
            SessionError::Network(_)
        ));
    }

    #[test]
    fn registration_failures_keep_field_errors() {
        let mut fields = FieldErrors::new();
        fields.push("username", "already taken");
        let err = SessionError::from_registration_failure(ApiError::BadRequest(fields.clone()));
        assert_eq!(err, SessionError::Validation(fields));
        assert_eq!(err.field_message("username").as_deref(), Some("already taken"));
        assert_eq!(err.field_message("email"), None);
    }

    #[test]
    fn storage_errors_mark_the_session_corrupted() {
        let err: SessionError = StorageError::Unavailable("quota".into()).into();
        assert!(matches!(err, SessionError::CorruptedSession(msg) if msg.contains("quota")));
    }
}
