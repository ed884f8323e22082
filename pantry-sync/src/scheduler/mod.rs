//! Periodic Job Scheduler
//!
//! 唯一命名的周期作业，持久化到 `{work_dir}/jobs.json`，进程重启后按原计划继续。
//!
//! ```text
//! register_unique_periodic(name, spec, policy)
//!         │
//!         ├─ JobRegistry (jobs.json)   next_run_at / 失败次数 / 上次结果
//!         └─ runner task (每个作业名一个)
//!               ├─ 未到期      → sleep
//!               ├─ 约束不满足  → 推迟 CONSTRAINT_RETRY
//!               ├─ 成功        → now + period
//!               └─ 失败/超时   → now + backoff(failures)
//! ```

pub mod battery;
pub mod job;
pub mod registry;
pub mod runner;

pub use battery::{AlwaysOkBattery, BatteryProbe, SysfsBattery};
pub use job::{
    BackgroundJob, Constraints, ExistingJobPolicy, JobOutcome, JobRecord, PeriodicJobSpec,
    Registration, backoff_delay,
};
pub use registry::JobRegistry;
pub use runner::JobScheduler;

use shared::error::{AppError, ErrorCode};
use std::time::Duration;
use thiserror::Error;

/// Delay applied when a due run finds its constraints unmet
pub const CONSTRAINT_RETRY: Duration = Duration::from_secs(15 * 60);

/// First retry delay after a failure
pub const BACKOFF_BASE: Duration = Duration::from_secs(30);

/// Upper bound for the failure backoff
pub const MAX_BACKOFF: Duration = Duration::from_secs(5 * 60 * 60);

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Job not registered: {0}")]
    NotRegistered(String),

    #[error("Invalid job spec: {0}")]
    InvalidSpec(String),
}

impl From<SchedulerError> for AppError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::NotRegistered(name) => {
                AppError::with_message(ErrorCode::JobNotRegistered, format!("Job not registered: {}", name))
                    .with_detail("job", name)
            }
            SchedulerError::InvalidSpec(msg) => AppError::validation(msg),
            other => AppError::with_message(ErrorCode::JobRegistryFailed, other.to_string()),
        }
    }
}
