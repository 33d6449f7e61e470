//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// The first three variants classify codec failures. Callers decide how to
/// present them; [`Error::user_message`] gives the standard wording.
#[derive(Error, Debug)]
pub enum Error {
    /// Input is not a valid envelope (bad JSON, missing or undecodable fields)
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// AEAD tag did not verify. Wrong password and tampering look identical.
    #[error("Authentication failed: incorrect password or corrupted file")]
    AuthenticationFailure,

    /// Decrypted bytes are not a valid serialized payload
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a malformed envelope error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedEnvelope(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Short machine-readable kind, safe to put in the event log
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MalformedEnvelope(_) => "malformed_envelope",
            Error::AuthenticationFailure => "authentication_failure",
            Error::Deserialization(_) => "deserialization_error",
            Error::KeyDerivation(_) => "key_derivation_error",
            Error::Encryption(_) => "encryption_error",
            Error::Validation(_) => "validation_error",
            Error::NotFound(_) => "not_found",
            Error::Cancelled => "cancelled",
            Error::Config(_) => "config_error",
            Error::Io(_) => "io_error",
            Error::Json(_) => "json_error",
        }
    }

    /// Message suitable for showing to an operator
    ///
    /// Deserialization failures after a successful decrypt are reported the
    /// same way as authentication failures.
    pub fn user_message(&self) -> String {
        match self {
            Error::MalformedEnvelope(_) => "Corrupted or invalid file.".to_string(),
            Error::AuthenticationFailure | Error::Deserialization(_) => {
                "Incorrect password or corrupted file.".to_string()
            }
            Error::Cancelled => "Operation cancelled.".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether this error came out of the codec
    pub fn is_codec_failure(&self) -> bool {
        matches!(
            self,
            Error::MalformedEnvelope(_) | Error::AuthenticationFailure | Error::Deserialization(_)
        )
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a successful result with context
    pub fn ok_with_context(data: T, context: HashMap<String, serde_json::Value>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: Some(context),
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let mut context = HashMap::new();
                context.insert("kind".to_string(), serde_json::Value::from(e.kind()));
                Self {
                    success: false,
                    data: None,
                    error: Some(e.user_message()),
                    context: Some(context),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_result_ok() {
        let result: OperationResult<i32> = OperationResult::ok(42);
        assert!(result.success);
        assert_eq!(result.data, Some(42));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_operation_result_fail() {
        let result: OperationResult<i32> = OperationResult::fail("Something went wrong");
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.error, Some("Something went wrong".to_string()));
    }

    #[test]
    fn test_from_result_carries_kind() {
        let err: Result<i32> = Err(Error::AuthenticationFailure);
        let result: OperationResult<i32> = err.into();
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Incorrect password or corrupted file.")
        );
        let context = result.context.unwrap();
        assert_eq!(context["kind"], "authentication_failure");
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            Error::malformed("no salt").user_message(),
            "Corrupted or invalid file."
        );
        assert_eq!(
            Error::Deserialization("eof".into()).user_message(),
            Error::AuthenticationFailure.user_message()
        );
        assert!(Error::validation("x").user_message().contains("Validation error"));
    }

    #[test]
    fn test_codec_failure_classification() {
        assert!(Error::AuthenticationFailure.is_codec_failure());
        assert!(Error::malformed("x").is_codec_failure());
        assert!(!Error::Cancelled.is_codec_failure());
    }
}
