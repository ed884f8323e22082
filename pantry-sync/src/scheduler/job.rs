//! Job definitions and registry records

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::error::AppError;

use super::{BACKOFF_BASE, MAX_BACKOFF, SchedulerError};

/// Work executed by the scheduler
#[async_trait]
pub trait BackgroundJob: Send + Sync + 'static {
    /// One run; `Err` counts as failure and triggers backoff
    async fn run(&self) -> Result<(), AppError>;
}

/// Conditions that must hold before a due run starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default)]
    pub battery_not_low: bool,
}

/// What to do when a job with the same name is already registered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExistingJobPolicy {
    /// Leave the existing schedule untouched
    #[default]
    Keep,
    /// Overwrite the schedule and restart the initial delay
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Scheduled,
    KeptExisting,
}

/// Recurring job definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicJobSpec {
    pub period: Duration,
    pub initial_delay: Duration,
    pub constraints: Constraints,
    /// Budget for a single run; exceeding it counts as failure
    pub timeout: Duration,
}

impl PeriodicJobSpec {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            initial_delay: Duration::ZERO,
            constraints: Constraints::default(),
            timeout: Duration::from_secs(600),
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), SchedulerError> {
        if self.period.is_zero() {
            return Err(SchedulerError::InvalidSpec("period must be positive".into()));
        }
        if self.timeout.is_zero() {
            return Err(SchedulerError::InvalidSpec("timeout must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    Succeeded,
    Failed,
    TimedOut,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded)
    }
}

/// Persisted state of one registered job (times are Unix millis)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub name: String,
    pub period_secs: u64,
    pub initial_delay_secs: u64,
    pub timeout_secs: u64,
    #[serde(default)]
    pub constraints: Constraints,
    pub registered_at: i64,
    pub next_run_at: i64,
    #[serde(default)]
    pub last_run_at: Option<i64>,
    #[serde(default)]
    pub last_outcome: Option<JobOutcome>,
    #[serde(default)]
    pub consecutive_failures: u32,
}

impl JobRecord {
    pub(crate) fn from_spec(name: &str, spec: &PeriodicJobSpec, now: i64) -> Self {
        Self {
            name: name.to_string(),
            period_secs: spec.period.as_secs(),
            initial_delay_secs: spec.initial_delay.as_secs(),
            timeout_secs: spec.timeout.as_secs().max(1),
            constraints: spec.constraints,
            registered_at: now,
            next_run_at: now + millis(spec.initial_delay),
            last_run_at: None,
            last_outcome: None,
            consecutive_failures: 0,
        }
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn is_due(&self, now: i64) -> bool {
        self.next_run_at <= now
    }
}

/// `30 s × 2^(failures − 1)`, capped at [`MAX_BACKOFF`]
pub fn backoff_delay(failures: u32) -> Duration {
    let exponent = failures.saturating_sub(1).min(20);
    BACKOFF_BASE.saturating_mul(1u32 << exponent).min(MAX_BACKOFF)
}

pub(crate) fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_and_caps() {
        assert_eq!(backoff_delay(1), Duration::from_secs(30));
        assert_eq!(backoff_delay(2), Duration::from_secs(60));
        assert_eq!(backoff_delay(3), Duration::from_secs(120));
        assert_eq!(backoff_delay(10), Duration::from_secs(15_360));
        assert_eq!(backoff_delay(11), MAX_BACKOFF);
        assert_eq!(backoff_delay(u32::MAX), MAX_BACKOFF);
    }

    #[test]
    fn test_record_from_spec() {
        let spec = PeriodicJobSpec::new(Duration::from_secs(86_400))
            .with_initial_delay(Duration::from_secs(3600));
        let record = JobRecord::from_spec("job", &spec, 1_000);
        assert_eq!(record.next_run_at, 1_000 + 3_600_000);
        assert!(!record.is_due(1_000));
        assert!(record.is_due(1_000 + 3_600_000));
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(PeriodicJobSpec::new(Duration::ZERO).validate().is_err());
    }
}
