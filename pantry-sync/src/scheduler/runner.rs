//! JobScheduler - 周期作业执行

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use shared::error::{AppError, ErrorCode};
use shared::util::now_millis;
use tokio_util::sync::CancellationToken;

use super::battery::BatteryProbe;
use super::job::{BackgroundJob, ExistingJobPolicy, JobOutcome, JobRecord, PeriodicJobSpec, Registration};
use super::registry::JobRegistry;
use super::{CONSTRAINT_RETRY, SchedulerError};
use crate::core::BackgroundTasks;

/// Longest single sleep of a runner; the record is re-read after each wake
const MAX_IDLE_SLEEP: Duration = Duration::from_secs(60);

struct SchedulerInner {
    registry: JobRegistry,
    battery: Arc<dyn BatteryProbe>,
    jobs: DashMap<String, Arc<dyn BackgroundJob>>,
    /// Held across execute + record_outcome, one per job name
    run_locks: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
    /// Runner tasks. Registration and runner retirement both happen under this lock.
    tasks: Mutex<BackgroundTasks>,
    max_idle_sleep: Duration,
}

impl SchedulerInner {
    fn run_lock(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.run_locks.entry(name.to_string()).or_default().clone()
    }
}

/// Runs registered periodic jobs, one background task per job name
pub struct JobScheduler {
    inner: Arc<SchedulerInner>,
}

impl JobScheduler {
    pub fn new(registry: JobRegistry, battery: Arc<dyn BatteryProbe>) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                registry,
                battery,
                jobs: DashMap::new(),
                run_locks: DashMap::new(),
                tasks: Mutex::new(BackgroundTasks::new()),
                max_idle_sleep: MAX_IDLE_SLEEP,
            }),
        }
    }

    /// Shorter idle sleeps, for tests that move time quickly
    pub fn with_max_idle_sleep(mut self, max: Duration) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.max_idle_sleep = max;
        }
        self
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.inner.registry
    }

    /// Register a uniquely named recurring job and make sure it is running.
    ///
    /// With `Keep`, an existing registration (also one loaded from disk)
    /// keeps its schedule. At most one live runner exists per name; a runner
    /// that exited or panicked is replaced.
    pub fn register_unique_periodic(
        &self,
        name: &str,
        spec: PeriodicJobSpec,
        policy: ExistingJobPolicy,
        job: Arc<dyn BackgroundJob>,
    ) -> Result<Registration, SchedulerError> {
        let mut tasks = self.inner.tasks.lock();
        let registration = self.inner.registry.register(name, &spec, policy, now_millis())?;

        let replace_job = policy == ExistingJobPolicy::Replace || !self.inner.jobs.contains_key(name);
        if replace_job {
            self.inner.jobs.insert(name.to_string(), job);
        }

        if !tasks.is_running(name) {
            let inner = self.inner.clone();
            let token = tasks.shutdown_token();
            let job_name = name.to_string();
            tasks.spawn(name, async move {
                run_loop(inner, job_name, token).await;
            });
        }
        drop(tasks);

        match registration {
            Registration::Scheduled => tracing::info!(job = %name, ?policy, "Periodic job scheduled"),
            Registration::KeptExisting => tracing::info!(job = %name, "Periodic job already scheduled, keeping existing"),
        }
        Ok(registration)
    }

    /// Run a registered job now, outside its schedule, and record the outcome.
    ///
    /// Waits for a scheduled run of the same job that is already in flight.
    pub async fn run_job_once(&self, name: &str) -> Result<JobOutcome, SchedulerError> {
        let job = self
            .inner
            .jobs
            .get(name)
            .map(|j| j.value().clone())
            .ok_or_else(|| SchedulerError::NotRegistered(name.to_string()))?;

        match run_exclusive(&self.inner, name, job, false).await? {
            Some((outcome, _)) => Ok(outcome),
            None => Err(SchedulerError::NotRegistered(name.to_string())),
        }
    }

    /// Number of runners that ended without being shut down (logged, then forgotten)
    pub fn check_health(&self) -> usize {
        self.inner.tasks.lock().check_health()
    }

    /// Stop every runner; an in-flight run is abandoned after `grace`
    pub async fn shutdown(&self, grace: Duration) {
        let tasks = std::mem::take(&mut *self.inner.tasks.lock());
        tasks.shutdown(grace).await;
    }
}

async fn execute(name: &str, job: &dyn BackgroundJob, timeout: Duration) -> JobOutcome {
    let started = std::time::Instant::now();
    let result = match tokio::time::timeout(timeout, job.run()).await {
        Ok(result) => result,
        Err(_) => Err(AppError::new(ErrorCode::JobTimedOut).with_detail("timeout_secs", timeout.as_secs())),
    };

    match result {
        Ok(()) => {
            tracing::info!(job = %name, elapsed_ms = started.elapsed().as_millis() as u64, "Job succeeded");
            JobOutcome::Succeeded
        }
        Err(e) if e.code == ErrorCode::JobTimedOut => {
            tracing::warn!(job = %name, code = %e.code, timeout_secs = timeout.as_secs(), "Job timed out");
            JobOutcome::TimedOut
        }
        Err(e) => {
            tracing::warn!(job = %name, code = %e.code, error = %e, "Job failed");
            JobOutcome::Failed
        }
    }
}

/// One run under the job's run lock, outcome recorded before the lock is released.
///
/// With `only_if_due`, a run that another caller already performed is skipped
/// and `None` is returned.
async fn run_exclusive(
    inner: &SchedulerInner,
    name: &str,
    job: Arc<dyn BackgroundJob>,
    only_if_due: bool,
) -> Result<Option<(JobOutcome, JobRecord)>, SchedulerError> {
    let lock = inner.run_lock(name);
    let _guard = lock.lock().await;

    let record = inner
        .registry
        .get(name)
        .ok_or_else(|| SchedulerError::NotRegistered(name.to_string()))?;
    if only_if_due && !record.is_due(now_millis()) {
        return Ok(None);
    }

    let outcome = execute(name, job.as_ref(), record.timeout()).await;
    let updated = inner.registry.record_outcome(name, outcome, now_millis())?;
    Ok(Some((outcome, updated)))
}

/// Drop the runner's task entry unless the job was registered again meanwhile.
///
/// Returns `true` when the runner should exit.
fn retire(inner: &SchedulerInner, name: &str) -> bool {
    let mut tasks = inner.tasks.lock();
    if inner.registry.get(name).is_some() {
        return false;
    }
    tasks.remove(name);
    true
}

async fn run_loop(inner: Arc<SchedulerInner>, name: String, token: CancellationToken) {
    tracing::debug!(job = %name, "Job runner started");

    loop {
        if token.is_cancelled() {
            break;
        }
        let Some(record) = inner.registry.get(&name) else {
            if retire(&inner, &name) {
                tracing::info!(job = %name, "Job unregistered, runner exiting");
                break;
            }
            continue;
        };

        let now = now_millis();
        if !record.is_due(now) {
            let wait_ms = u64::try_from(record.next_run_at - now).unwrap_or(0);
            let wait = Duration::from_millis(wait_ms).min(inner.max_idle_sleep);
            tokio::select! {
                _ = tokio::time::sleep(wait) => continue,
                _ = token.cancelled() => break,
            }
        }

        if record.constraints.battery_not_low && inner.battery.is_low() {
            tracing::info!(job = %name, retry_secs = CONSTRAINT_RETRY.as_secs(), "Battery low, deferring job");
            if let Err(e) = inner.registry.defer(&name, now, CONSTRAINT_RETRY) {
                tracing::error!(job = %name, error = %e, "Failed to persist deferral");
            }
            continue;
        }

        let Some(job) = inner.jobs.get(&name).map(|j| j.value().clone()) else {
            tracing::warn!(job = %name, "No job body registered, runner exiting");
            inner.tasks.lock().remove(&name);
            break;
        };

        let result = tokio::select! {
            result = run_exclusive(&inner, &name, job, true) => result,
            _ = token.cancelled() => {
                tracing::info!(job = %name, "Shutdown during job run");
                break;
            }
        };

        match result {
            Ok(Some((_, updated))) => {
                tracing::debug!(job = %name, next_run_at = updated.next_run_at, failures = updated.consecutive_failures, "Next run scheduled");
            }
            Ok(None) => tracing::debug!(job = %name, "Run already performed by a manual trigger"),
            // Unregistered mid-run: the loop head decides whether to exit
            Err(SchedulerError::NotRegistered(_)) => {}
            Err(e) => tracing::error!(job = %name, error = %e, "Failed to persist job outcome"),
        }
    }

    tracing::debug!(job = %name, "Job runner stopped");
}
