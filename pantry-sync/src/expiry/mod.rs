//! Expiry Scanner
//!
//! 周期作业 `expiry_check_work`：
//!
//! 1. 解析当前会话；未登录 → 成功，无副作用
//! 2. 一次性读取 Items
//! 3. 解析过期日期（无法解析的跳过并记录）
//! 4. `days = expiry_date - today`（自然日）
//! 5. 选出 `0 <= days <= threshold`
//! 6. 非空 → NotificationDispatcher
//!
//! Any read or delivery error fails the run so the scheduler backs off; a
//! failed run never posts a partial notification.

pub mod scanner;

pub use scanner::{ExpiryScanner, ScanOutcome};

use std::time::Duration;

use chrono::NaiveDate;
use shared::error::{AppError, ErrorCode};
use shared::models::Item;
use thiserror::Error;

use crate::core::Config;
use crate::notify::NotifyError;
use crate::repository::RepoError;
use crate::scheduler::{Constraints, PeriodicJobSpec};

/// Unique name of the recurring scan
pub const EXPIRY_JOB_NAME: &str = "expiry_check_work";

pub const DEFAULT_THRESHOLD_DAYS: i64 = 3;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to read items: {0}")]
    Read(#[from] RepoError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        let source: AppError = match err {
            ScanError::Read(e) => e.into(),
            ScanError::Notify(e) => e.into(),
        };
        let retryable = source.is_transient();
        AppError::with_message(ErrorCode::JobFailed, source.message.clone())
            .with_detail("cause", source.code.code())
            .with_detail("retryable", retryable)
    }
}

/// Items whose expiry falls within `[0, threshold]` days of `today`, in input order.
///
/// Unparseable dates are skipped.
pub fn select_expiring(items: &[Item], today: NaiveDate, threshold: i64) -> Vec<Item> {
    items
        .iter()
        .filter(|item| match item.days_until_expiry(today) {
            Some(days) => (0..=threshold).contains(&days),
            None => {
                tracing::debug!(id = %item.id, raw = %item.expiry_date, "Skipping item with unparseable expiry date");
                false
            }
        })
        .cloned()
        .collect()
}

/// Schedule of the recurring scan: daily, one hour after install, battery not low
pub fn default_job_spec(config: &Config) -> PeriodicJobSpec {
    PeriodicJobSpec::new(config.scan_period())
        .with_initial_delay(config.scan_initial_delay())
        .with_constraints(Constraints { battery_not_low: true })
        .with_timeout(config.scan_timeout())
}

/// Same schedule without a config (24 h period, 1 h delay, 10 min budget)
pub fn standard_job_spec() -> PeriodicJobSpec {
    PeriodicJobSpec::new(Duration::from_secs(24 * 3600))
        .with_initial_delay(Duration::from_secs(3600))
        .with_constraints(Constraints { battery_not_low: true })
        .with_timeout(Duration::from_secs(600))
}
