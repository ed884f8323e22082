//! JobRegistry - 作业注册表
//!
//! 文件结构: `{ "jobs": [JobRecord, ...] }`。写入先落临时文件再 rename。
//! 内存状态先更新，持久化失败只返回错误，不回滚。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::SchedulerError;
use super::job::{ExistingJobPolicy, JobOutcome, JobRecord, PeriodicJobSpec, Registration, backoff_delay, millis};

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    jobs: Vec<JobRecord>,
}

/// Registered periodic jobs keyed by unique name
#[derive(Debug)]
pub struct JobRegistry {
    /// `None` for an in-memory registry
    file_path: Option<PathBuf>,
    jobs: Mutex<BTreeMap<String, JobRecord>>,
}

impl JobRegistry {
    pub const FILE_NAME: &'static str = "jobs.json";

    pub fn in_memory() -> Self {
        Self {
            file_path: None,
            jobs: Mutex::new(BTreeMap::new()),
        }
    }

    /// Load `{work_dir}/jobs.json`.
    ///
    /// A missing file is an empty registry. A corrupt file is logged and
    /// replaced on the next write.
    pub fn open(work_dir: &Path) -> Result<Self, SchedulerError> {
        let file_path = work_dir.join(Self::FILE_NAME);

        let file: RegistryFile = match std::fs::read_to_string(&file_path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %file_path.display(), error = %e, "Corrupt job registry, starting empty");
                RegistryFile::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => RegistryFile::default(),
            Err(e) => return Err(e.into()),
        };

        let jobs: BTreeMap<String, JobRecord> = file
            .jobs
            .into_iter()
            .map(|record| (record.name.clone(), record))
            .collect();
        tracing::debug!(path = %file_path.display(), count = jobs.len(), "Job registry loaded");

        Ok(Self {
            file_path: Some(file_path),
            jobs: Mutex::new(jobs),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Register a uniquely named job.
    ///
    /// With [`ExistingJobPolicy::Keep`] an existing record is left as is,
    /// including its `next_run_at`.
    pub fn register(
        &self,
        name: &str,
        spec: &PeriodicJobSpec,
        policy: ExistingJobPolicy,
        now: i64,
    ) -> Result<Registration, SchedulerError> {
        spec.validate()?;
        let mut jobs = self.jobs.lock();

        if jobs.contains_key(name) && policy == ExistingJobPolicy::Keep {
            return Ok(Registration::KeptExisting);
        }

        jobs.insert(name.to_string(), JobRecord::from_spec(name, spec, now));
        self.persist(&jobs)?;
        Ok(Registration::Scheduled)
    }

    pub fn unregister(&self, name: &str) -> Result<bool, SchedulerError> {
        let mut jobs = self.jobs.lock();
        let removed = jobs.remove(name).is_some();
        if removed {
            self.persist(&jobs)?;
        }
        Ok(removed)
    }

    pub fn get(&self, name: &str) -> Option<JobRecord> {
        self.jobs.lock().get(name).cloned()
    }

    pub fn records(&self) -> Vec<JobRecord> {
        self.jobs.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    /// Push the next run out without touching the failure count
    pub fn defer(&self, name: &str, now: i64, by: Duration) -> Result<JobRecord, SchedulerError> {
        self.update(name, |record| {
            record.next_run_at = now + millis(by);
        })
    }

    /// Record the result of a run and compute the next run time
    pub fn record_outcome(
        &self,
        name: &str,
        outcome: JobOutcome,
        now: i64,
    ) -> Result<JobRecord, SchedulerError> {
        self.update(name, |record| {
            record.last_run_at = Some(now);
            record.last_outcome = Some(outcome);
            if outcome.is_success() {
                record.consecutive_failures = 0;
                record.next_run_at = now + millis(record.period());
            } else {
                record.consecutive_failures = record.consecutive_failures.saturating_add(1);
                record.next_run_at = now + millis(backoff_delay(record.consecutive_failures));
            }
        })
    }

    fn update<F>(&self, name: &str, mutate: F) -> Result<JobRecord, SchedulerError>
    where
        F: FnOnce(&mut JobRecord),
    {
        let mut jobs = self.jobs.lock();
        let record = jobs
            .get_mut(name)
            .ok_or_else(|| SchedulerError::NotRegistered(name.to_string()))?;
        mutate(record);
        let updated = record.clone();
        self.persist(&jobs)?;
        Ok(updated)
    }

    fn persist(&self, jobs: &BTreeMap<String, JobRecord>) -> Result<(), SchedulerError> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = RegistryFile {
            jobs: jobs.values().cloned().collect(),
        };
        let content = serde_json::to_string_pretty(&file)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}
