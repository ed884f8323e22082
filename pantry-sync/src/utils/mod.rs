//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型 (from shared::error)
//! - [`Clock`] - 可注入的"今天"
//! - 日志初始化

pub mod logger;
pub mod time;

pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use time::{Clock, FixedClock, SystemClock};
