//! Error types for the Graph client and Lambda functions.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error code Graph returns when a request cannot be routed to the target
/// mailbox. In practice this means the account is a personal Microsoft
/// account rather than an organizational one.
pub const CODE_ACCOUNT_TYPE_MISMATCH: &str = "RequestBroker-ParseUri";

/// Inner-error code indicating the account has not been migrated to support
/// the requested flow. Shows up beneath a 500 for some consumer accounts.
pub const CODE_TRANSIENT_MIGRATION: &str = "ErrorInternalServerTransientError";

/// Error payload reported by the Graph API.
///
/// `inner_error` forms a singly-linked cause chain; the terminal node has
/// no inner error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub inner_error: Option<Box<ApiError>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(inner) = &self.inner_error {
            write!(f, " (caused by {})", inner)?;
        }
        Ok(())
    }
}

/// Errors that can occur when talking to the Graph API.
#[derive(Error, Debug)]
pub enum Error {
    /// Network/connection failure, no usable response received
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response received but the body was not the JSON we expected
    #[error("Malformed response (status {status}): {body}")]
    MalformedResponse { status: u16, body: String },

    /// Well-formed error response from the Graph API
    #[error("Graph API error (status {status}): {error}")]
    Api { status: u16, error: ApiError },

    /// Credential acquisition failed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of a Graph API error, for caller-facing reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The target account is not of the expected organizational type
    AccountTypeMismatch,
    /// Server-side migration/consistency issue; may resolve on its own
    Transient,
    /// Anything else
    Unknown,
}

/// Classify a Graph API error into an [`ErrorKind`].
///
/// Total over any `ApiError` value: unrecognized codes map to
/// [`ErrorKind::Unknown`].
pub fn classify(error: &ApiError) -> ErrorKind {
    if error.code == CODE_ACCOUNT_TYPE_MISMATCH {
        return ErrorKind::AccountTypeMismatch;
    }

    let mut inner = error.inner_error.as_deref();
    while let Some(cause) = inner {
        if cause.code == CODE_TRANSIENT_MIGRATION {
            return ErrorKind::Transient;
        }
        inner = cause.inner_error.as_deref();
    }

    ErrorKind::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::distributions::{Alphanumeric, DistString};
    use rand::Rng;

    fn api_error(code: &str, inner: Option<ApiError>) -> ApiError {
        ApiError {
            code: code.to_string(),
            message: "test".to_string(),
            inner_error: inner.map(Box::new),
        }
    }

    #[test]
    fn test_classify_account_type_mismatch() {
        let err = api_error("RequestBroker-ParseUri", None);
        assert_eq!(classify(&err), ErrorKind::AccountTypeMismatch);
    }

    #[test]
    fn test_classify_transient_from_inner_chain() {
        let inner = api_error("ErrorInternalServerTransientError", None);
        let err = api_error("InternalServerError", Some(inner));
        assert_eq!(classify(&err), ErrorKind::Transient);

        // Two levels deep
        let leaf = api_error("ErrorInternalServerTransientError", None);
        let mid = api_error("SomethingElse", Some(leaf));
        let err = api_error("InternalServerError", Some(mid));
        assert_eq!(classify(&err), ErrorKind::Transient);
    }

    #[test]
    fn test_classify_unknown() {
        let err = api_error("ErrorAccessDenied", None);
        assert_eq!(classify(&err), ErrorKind::Unknown);

        // Transient code at the top level does not count; only inner errors
        // carry the migration signal.
        let err = api_error("ErrorInternalServerTransientError", None);
        assert_eq!(classify(&err), ErrorKind::Unknown);
    }

    #[test]
    fn test_classify_is_total() {
        let mut rng = rand::thread_rng();

        for _ in 0..1000 {
            let depth = rng.gen_range(0..4);
            let mut err: Option<ApiError> = None;
            for _ in 0..=depth {
                let code_len = rng.gen_range(0..24);
                let message_len = rng.gen_range(0..64);
                let code = Alphanumeric.sample_string(&mut rng, code_len);
                let message = Alphanumeric.sample_string(&mut rng, message_len);
                err = Some(ApiError {
                    code,
                    message,
                    inner_error: err.map(Box::new),
                });
            }

            let kind = classify(&err.unwrap());
            assert!(matches!(
                kind,
                ErrorKind::AccountTypeMismatch | ErrorKind::Transient | ErrorKind::Unknown
            ));
        }
    }

    #[test]
    fn test_deserialize_inner_error_chain() {
        let json = r#"{
            "code": "InternalServerError",
            "message": "An internal server error occurred.",
            "innerError": {
                "code": "ErrorInternalServerTransientError",
                "message": "Account not yet migrated."
            }
        }"#;

        let err: ApiError = serde_json::from_str(json).unwrap();
        assert_eq!(err.code, "InternalServerError");
        let inner = err.inner_error.as_deref().unwrap();
        assert_eq!(inner.code, "ErrorInternalServerTransientError");
        assert!(inner.inner_error.is_none());
    }

    #[test]
    fn test_display_includes_cause() {
        let inner = api_error("Inner-Code", None);
        let err = api_error("Outer-Code", Some(inner));
        let rendered = err.to_string();
        assert!(rendered.contains("Outer-Code"));
        assert!(rendered.contains("Inner-Code"));
    }
}
