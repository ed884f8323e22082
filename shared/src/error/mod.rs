//! Unified error system for Pantry
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Session errors
//! - 2xxx: Store errors
//! - 3xxx: Scheduler errors
//! - 4xxx: Recipe errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::StoreUnavailable);
//! assert!(err.is_transient());
//!
//! let err = AppError::not_found("Item").with_detail("id", "abc");
//! assert_eq!(err.code, ErrorCode::NotFound);
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
