use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Validation and contract errors exposed by `tickcap-core`.
///
/// `NonPositiveValue` carries the offending `f64`, so this type is only
/// `PartialEq`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} must be between {min} and {max}")]
    SymbolBadLength { len: usize, min: usize, max: usize },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("timestamp must be RFC3339: '{value}'")]
    InvalidTimestamp { value: String },

    #[error("instrument name cannot be empty")]
    EmptyInstrumentName,

    #[error("field '{field}' must be a positive finite number, got {value}")]
    NonPositiveValue { field: &'static str, value: f64 },
}

/// Capture failure classification.
///
/// `Api` covers the transport/HTTP layer (not found, rate limited, other
/// statuses, timeouts, network faults) and is potentially transient.
/// `InvalidResponse` covers payload shape and persistence-invariant
/// violations, which no retry can fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureErrorKind {
    Api,
    InvalidResponse,
}

/// Structured error shared by the ticker client and the capture
/// orchestrator. No retry policy is applied anywhere in this crate;
/// `retryable()` exists so callers can decide on one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureError {
    kind: CaptureErrorKind,
    message: String,
}

impl CaptureError {
    pub fn api(message: impl Into<String>) -> Self {
        Self {
            kind: CaptureErrorKind::Api,
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            kind: CaptureErrorKind::InvalidResponse,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> CaptureErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        matches!(self.kind, CaptureErrorKind::Api)
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            CaptureErrorKind::Api => "capture.api_error",
            CaptureErrorKind::InvalidResponse => "capture.invalid_response",
        }
    }
}

impl Display for CaptureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CaptureError {}

/// Errors surfaced by the storage port.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record violated a storage invariant (positivity, presence,
    /// referential integrity).
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Database-level fault.
    #[error("storage error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_compare_by_content() {
        let zero = ValidationError::NonPositiveValue {
            field: "last",
            value: 0.0,
        };
        assert_eq!(
            zero,
            ValidationError::NonPositiveValue {
                field: "last",
                value: 0.0,
            }
        );
        assert_ne!(
            zero,
            ValidationError::NonPositiveValue {
                field: "last",
                value: -1.0,
            }
        );
    }

    #[test]
    fn api_errors_are_retryable() {
        let error = CaptureError::api("request timeout for BTCAUD");
        assert_eq!(error.kind(), CaptureErrorKind::Api);
        assert!(error.retryable());
    }

    #[test]
    fn invalid_response_errors_are_not_retryable() {
        let error = CaptureError::invalid_response("missing required fields: bid");
        assert_eq!(error.kind(), CaptureErrorKind::InvalidResponse);
        assert!(!error.retryable());
        assert_eq!(error.message(), "missing required fields: bid");
    }
}
