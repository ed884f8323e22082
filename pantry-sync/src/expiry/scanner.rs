//! ExpiryScanner

use std::sync::Arc;

use async_trait::async_trait;
use shared::error::AppError;
use shared::models::Item;

use super::{DEFAULT_THRESHOLD_DAYS, ScanError, select_expiring};
use crate::notify::NotificationDispatcher;
use crate::repository::CollectionRepository;
use crate::scheduler::BackgroundJob;
use crate::session::{SessionProvider, resolve_scope};
use crate::store::RemoteStore;
use crate::utils::Clock;

/// Result of one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    NoSession,
    NothingExpiring { scanned: usize },
    Notified { scanned: usize, expiring: usize },
}

/// Point-in-time expiry check for the current user
pub struct ExpiryScanner {
    store: Arc<dyn RemoteStore>,
    sessions: Arc<dyn SessionProvider>,
    dispatcher: NotificationDispatcher,
    clock: Arc<dyn Clock>,
    threshold_days: i64,
}

impl ExpiryScanner {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        sessions: Arc<dyn SessionProvider>,
        dispatcher: NotificationDispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            sessions,
            dispatcher,
            clock,
            threshold_days: DEFAULT_THRESHOLD_DAYS,
        }
    }

    pub fn with_threshold(mut self, days: i64) -> Self {
        self.threshold_days = days.max(0);
        self
    }

    pub fn threshold_days(&self) -> i64 {
        self.threshold_days
    }

    /// Run one scan.
    ///
    /// The session is resolved on every call. Holds no subscription.
    pub async fn scan(&self) -> Result<ScanOutcome, ScanError> {
        let Some(scope) = resolve_scope(self.sessions.as_ref()) else {
            tracing::debug!("No active session, skipping expiry scan");
            return Ok(ScanOutcome::NoSession);
        };

        let items: Vec<Item> = CollectionRepository::<Item>::new(self.store.clone(), &scope)
            .fetch_all()
            .await?;
        let today = self.clock.today();
        let expiring = select_expiring(&items, today, self.threshold_days);

        tracing::info!(
            user = %scope.user_id(),
            scanned = items.len(),
            expiring = expiring.len(),
            %today,
            "Expiry scan finished"
        );

        if expiring.is_empty() {
            return Ok(ScanOutcome::NothingExpiring { scanned: items.len() });
        }

        self.dispatcher.dispatch(&expiring).await?;
        Ok(ScanOutcome::Notified {
            scanned: items.len(),
            expiring: expiring.len(),
        })
    }
}

#[async_trait]
impl BackgroundJob for ExpiryScanner {
    async fn run(&self) -> Result<(), AppError> {
        self.scan().await.map(|_| ()).map_err(AppError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{EXPIRY_NOTIFICATION_ID, SlotNotifier};
    use crate::session::{StaticSessionProvider, UserScope};
    use crate::store::MemoryStore;
    use crate::utils::FixedClock;
    use chrono::NaiveDate;

    struct Fixture {
        store: Arc<MemoryStore>,
        sessions: Arc<StaticSessionProvider>,
        slots: Arc<SlotNotifier>,
        scanner: ExpiryScanner,
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let sessions = Arc::new(StaticSessionProvider::signed_in("u1", "cook@example.com"));
        let slots = Arc::new(SlotNotifier::new());
        let scanner = ExpiryScanner::new(
            store.clone(),
            sessions.clone(),
            NotificationDispatcher::new(slots.clone()),
            Arc::new(FixedClock::new(today())),
        );
        Fixture {
            store,
            sessions,
            slots,
            scanner,
        }
    }

    async fn add(f: &Fixture, name: &str, days: i64) {
        let repo = CollectionRepository::<Item>::new(f.store.clone(), &UserScope::new("u1").unwrap());
        repo.upsert(&Item::new(name, today() + chrono::Duration::days(days)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_no_session_is_silent_success() {
        let f = fixture();
        f.sessions.set(None);
        f.store.set_offline(true);
        assert_eq!(f.scanner.scan().await.unwrap(), ScanOutcome::NoSession);
        assert_eq!(f.slots.posted_count(), 0);
    }

    #[tokio::test]
    async fn test_notifies_items_in_horizon() {
        let f = fixture();
        add(&f, "Milk", 0).await;
        add(&f, "Eggs", 2).await;
        add(&f, "Rice", 30).await;
        add(&f, "Old Bread", -1).await;

        let outcome = f.scanner.scan().await.unwrap();
        assert_eq!(outcome, ScanOutcome::Notified { scanned: 4, expiring: 2 });

        let active = f.slots.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, EXPIRY_NOTIFICATION_ID);
        assert_eq!(active[0].body, "Milk, Eggs are expiring soon!");
    }

    #[tokio::test]
    async fn test_nothing_in_horizon_posts_nothing() {
        let f = fixture();
        add(&f, "Rice", 30).await;
        assert_eq!(
            f.scanner.scan().await.unwrap(),
            ScanOutcome::NothingExpiring { scanned: 1 }
        );
        assert_eq!(f.slots.posted_count(), 0);
    }

    #[tokio::test]
    async fn test_read_failure_fails_without_notification() {
        let f = fixture();
        add(&f, "Milk", 0).await;
        f.store.set_offline(true);

        assert!(matches!(f.scanner.scan().await, Err(ScanError::Read(_))));
        assert!(f.scanner.run().await.is_err());
        assert_eq!(f.slots.posted_count(), 0);
    }

    #[tokio::test]
    async fn test_threshold_is_configurable() {
        let f = fixture();
        add(&f, "Milk", 5).await;
        let scanner = f.scanner.with_threshold(7);
        assert!(matches!(scanner.scan().await.unwrap(), ScanOutcome::Notified { expiring: 1, .. }));
    }
}
