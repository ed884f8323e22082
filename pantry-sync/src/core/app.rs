//! PantrySync - 组件装配
//!
//! Config → store → session → notifier → scheduler，登记临期扫描作业。

use std::sync::Arc;
use std::time::Duration;

use shared::error::AppError;

use super::config::{Config, StoreBackend};
use crate::expiry::{self, EXPIRY_JOB_NAME, ExpiryScanner};
use crate::notify::{NotificationDispatcher, Notifier};
use crate::recipes::{DisabledGenerator, GeminiGenerator, RecipeService, TextGenerator};
use crate::repository::PantryRepository;
use crate::scheduler::{BatteryProbe, ExistingJobPolicy, JobRegistry, JobScheduler, Registration, SysfsBattery};
use crate::session::{FileSessionStore, resolve_scope};
use crate::store::{HttpStore, MemoryStore, RemoteStore};
use crate::utils::{Clock, SystemClock};

/// Grace period for background tasks on shutdown
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Wired-up sync core
pub struct PantrySync {
    config: Config,
    store: Arc<dyn RemoteStore>,
    http_store: Option<HttpStore>,
    sessions: Arc<FileSessionStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    scheduler: JobScheduler,
}

impl PantrySync {
    /// Build every component from `config`. Nothing runs until [`PantrySync::start`].
    pub fn build(config: Config, notifier: Arc<dyn Notifier>) -> Result<Self, AppError> {
        Self::build_with(config, notifier, Arc::new(SysfsBattery::new()), Arc::new(SystemClock))
    }

    /// Same as [`PantrySync::build`] with explicit battery probe and clock
    pub fn build_with(
        config: Config,
        notifier: Arc<dyn Notifier>,
        battery: Arc<dyn BatteryProbe>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let work_dir = config.work_path();
        std::fs::create_dir_all(&work_dir)
            .map_err(|e| AppError::config(format!("cannot create work dir {}: {}", work_dir.display(), e)))?;

        let http_store = match config.store_backend {
            StoreBackend::Memory => None,
            StoreBackend::Http => Some(HttpStore::new(
                config.store_url.clone(),
                config.request_timeout(),
                config.store_poll_interval(),
            )?),
        };
        let store: Arc<dyn RemoteStore> = match &http_store {
            Some(http) => Arc::new(http.clone()),
            None => Arc::new(MemoryStore::new()),
        };
        tracing::info!(backend = ?config.store_backend, work_dir = %work_dir.display(), "Store initialised");

        let sessions = Arc::new(FileSessionStore::new(&work_dir));
        let registry = JobRegistry::open(&work_dir)?;
        let scheduler = JobScheduler::new(registry, battery);

        Ok(Self {
            config,
            store,
            http_store,
            sessions,
            notifier,
            clock,
            scheduler,
        })
    }

    /// Register the recurring expiry scan, keeping any existing schedule
    pub fn start(&self) -> Result<Registration, AppError> {
        let scanner = self.expiry_scanner();
        let registration = self.scheduler.register_unique_periodic(
            EXPIRY_JOB_NAME,
            expiry::default_job_spec(&self.config),
            ExistingJobPolicy::Keep,
            Arc::new(scanner),
        )?;
        Ok(registration)
    }

    /// Report runners that stopped on their own and bring the expiry runner back.
    ///
    /// Returns how many runners had stopped.
    pub fn check_health(&self) -> Result<usize, AppError> {
        let stopped = self.scheduler.check_health();
        if stopped > 0 {
            tracing::warn!(stopped, "Restarting stopped job runners");
            self.start()?;
        }
        Ok(stopped)
    }

    pub fn expiry_scanner(&self) -> ExpiryScanner {
        ExpiryScanner::new(
            self.store.clone(),
            self.sessions.clone(),
            NotificationDispatcher::new(self.notifier.clone()),
            self.clock.clone(),
        )
        .with_threshold(self.config.expiry_threshold_days)
    }

    /// Repository of the signed-in user, if any
    pub fn repository(&self) -> Option<PantryRepository> {
        resolve_scope(self.sessions.as_ref()).map(|scope| PantryRepository::new(self.store.clone(), scope))
    }

    /// Gemini when an API key is configured; otherwise every request yields an error text
    pub fn recipe_service(&self) -> Result<RecipeService, AppError> {
        let generator: Arc<dyn TextGenerator> = match &self.config.gemini_api_key {
            Some(key) => Arc::new(GeminiGenerator::new(
                key.clone(),
                self.config.gemini_model.clone(),
                self.config.gemini_timeout(),
            )?),
            None => Arc::new(DisabledGenerator),
        };
        Ok(RecipeService::new(generator))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn RemoteStore> {
        self.store.clone()
    }

    pub fn sessions(&self) -> &FileSessionStore {
        &self.sessions
    }

    pub fn scheduler(&self) -> &JobScheduler {
        &self.scheduler
    }

    /// Stop the scheduler and any store watchers
    pub async fn shutdown(&self) {
        self.scheduler.shutdown(SHUTDOWN_GRACE).await;
        if let Some(http) = &self.http_store {
            http.shutdown();
        }
        tracing::info!("Pantry sync stopped");
    }
}
