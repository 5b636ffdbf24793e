// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection failed to endpoint: {0}")]
    Connection(String),

    #[error("Invalid parameter {field}: {message}")]
    InvalidParameter { field: String, message: String },

    #[error("Malformed metadata: {reason}")]
    MalformedMetadata { reason: String, payload: String },

    #[error("Attribute {0} not found")]
    AttributeNotFound(String),

    #[error("Attribute {name} cannot be read as {expected}")]
    AttributeTypeMismatch { name: String, expected: &'static str },

    #[error("No active account connected")]
    NoActiveAccount,

    #[error("Validation failed for field {field}: {message}")]
    Validation { field: String, message: String },

    #[error("ABI decode failed for {context}: {message}")]
    AbiDecode { context: String, message: String },

    #[error("{action} submission rejected: {reason}")]
    SubmissionRejected { action: String, reason: String },

    #[error("{action} confirmation failed for {hash}: {reason}")]
    ConfirmationFailed {
        action: String,
        hash: String,
        reason: String,
    },

    #[error("{action}: expected {event} log not found in {hash}")]
    ExpectedLogNotFound {
        action: String,
        event: String,
        hash: String,
    },

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid_parameter(field: &str, message: impl Into<String>) -> Self {
        AppError::InvalidParameter {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>, payload: impl Into<String>) -> Self {
        AppError::MalformedMetadata {
            reason: reason.into(),
            payload: payload.into(),
        }
    }

    /// True for transport-level failures only.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Connection(_))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_connection_errors_are_retryable() {
        assert!(AppError::Connection("timeout".into()).is_retryable());
        assert!(!AppError::NoActiveAccount.is_retryable());
        assert!(!AppError::malformed("missing name", "{}").is_retryable());
        assert!(
            !AppError::ExpectedLogNotFound {
                action: "mint".into(),
                event: "Transfer".into(),
                hash: "0x00".into(),
            }
            .is_retryable()
        );
    }
}
