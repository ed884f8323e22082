//! Unified error codes for Pantry
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Session errors
//! - 2xxx: Store / repository errors
//! - 3xxx: Scheduler errors
//! - 4xxx: Recipe generation errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::ErrorCategory;

/// Unified error code enum
///
/// All error codes are represented as u16 values so they survive any
/// front-end bridge unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,

    // ==================== 1xxx: Session ====================
    /// No user is logged in
    NoSession = 1001,
    /// Session file could not be written
    SessionPersistFailed = 1002,

    // ==================== 2xxx: Store ====================
    /// Remote store unreachable or rejected the request
    StoreUnavailable = 2001,
    /// Document could not be encoded or decoded
    DocumentMalformed = 2002,
    /// Collection path is invalid
    InvalidCollectionPath = 2003,

    // ==================== 3xxx: Scheduler ====================
    /// Job registry could not be read or written
    JobRegistryFailed = 3001,
    /// Job is not registered
    JobNotRegistered = 3002,
    /// Job run failed
    JobFailed = 3003,
    /// Job run exceeded its time budget
    JobTimedOut = 3004,

    // ==================== 4xxx: Recipe ====================
    /// Text generation failed
    GenerationFailed = 4001,
    /// Text generator is not configured
    GeneratorNotConfigured = 4002,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Network error
    NetworkError = 9003,
    /// Configuration error
    ConfigError = 9005,
    /// Notification could not be shown
    NotifyFailed = 9201,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Category derived from the code range
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }

    /// Whether a caller may reasonably retry the failed operation
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorCode::StoreUnavailable
                | ErrorCode::NetworkError
                | ErrorCode::JobFailed
                | ErrorCode::JobTimedOut
        )
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",

            // Session
            ErrorCode::NoSession => "No user is logged in",
            ErrorCode::SessionPersistFailed => "Failed to persist session",

            // Store
            ErrorCode::StoreUnavailable => "Remote store is unavailable",
            ErrorCode::DocumentMalformed => "Document is malformed",
            ErrorCode::InvalidCollectionPath => "Invalid collection path",

            // Scheduler
            ErrorCode::JobRegistryFailed => "Job registry operation failed",
            ErrorCode::JobNotRegistered => "Job is not registered",
            ErrorCode::JobFailed => "Job run failed",
            ErrorCode::JobTimedOut => "Job run timed out",

            // Recipe
            ErrorCode::GenerationFailed => "Text generation failed",
            ErrorCode::GeneratorNotConfigured => "Text generator is not configured",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::NotifyFailed => "Failed to show notification",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when a u16 does not map to any [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            2 => ErrorCode::ValidationFailed,
            3 => ErrorCode::NotFound,
            5 => ErrorCode::InvalidRequest,
            6 => ErrorCode::InvalidFormat,
            1001 => ErrorCode::NoSession,
            1002 => ErrorCode::SessionPersistFailed,
            2001 => ErrorCode::StoreUnavailable,
            2002 => ErrorCode::DocumentMalformed,
            2003 => ErrorCode::InvalidCollectionPath,
            3001 => ErrorCode::JobRegistryFailed,
            3002 => ErrorCode::JobNotRegistered,
            3003 => ErrorCode::JobFailed,
            3004 => ErrorCode::JobTimedOut,
            4001 => ErrorCode::GenerationFailed,
            4002 => ErrorCode::GeneratorNotConfigured,
            9001 => ErrorCode::InternalError,
            9003 => ErrorCode::NetworkError,
            9005 => ErrorCode::ConfigError,
            9201 => ErrorCode::NotifyFailed,
            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}
