//! End-to-end: session → repository → scheduled scan → notification slot

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use pantry_sync::expiry::EXPIRY_JOB_NAME;
use pantry_sync::notify::{EXPIRY_NOTIFICATION_ID, SlotNotifier};
use pantry_sync::scheduler::{AlwaysOkBattery, JobOutcome, Registration};
use pantry_sync::utils::FixedClock;
use pantry_sync::{Config, PantrySync, ScanOutcome};
use shared::models::{Item, UserSession};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

fn config(dir: &std::path::Path) -> Config {
    let mut config = Config::with_overrides(dir.to_string_lossy().to_string());
    config.scan_initial_delay_mins = 60;
    config.scan_period_hours = 24;
    config.expiry_threshold_days = 3;
    config
}

fn build(dir: &std::path::Path, slots: Arc<SlotNotifier>) -> PantrySync {
    PantrySync::build_with(
        config(dir),
        slots,
        Arc::new(AlwaysOkBattery),
        Arc::new(FixedClock::new(today())),
    )
    .unwrap()
}

#[tokio::test]
async fn test_scan_without_session_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let slots = Arc::new(SlotNotifier::new());
    let app = build(dir.path(), slots.clone());

    assert!(app.repository().is_none());
    assert_eq!(app.expiry_scanner().scan().await.unwrap(), ScanOutcome::NoSession);
    assert_eq!(slots.posted_count(), 0);
}

#[tokio::test]
async fn test_logged_in_scan_posts_single_summary() {
    let dir = tempfile::tempdir().unwrap();
    let slots = Arc::new(SlotNotifier::new());
    let app = build(dir.path(), slots.clone());

    app.sessions()
        .save_user(&UserSession::new("u1", "cook@example.com"))
        .unwrap();
    let repo = app.repository().unwrap();

    for (name, days) in [("Milk", 0), ("Eggs", 1), ("Bread", 2), ("Cheese", 3), ("Rice", 40)] {
        repo.items()
            .upsert(&Item::new(name, today() + chrono::Duration::days(days)))
            .await
            .unwrap();
    }

    assert_eq!(app.start().unwrap(), Registration::Scheduled);
    assert_eq!(
        app.scheduler().run_job_once(EXPIRY_JOB_NAME).await.unwrap(),
        JobOutcome::Succeeded
    );

    let active = slots.active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, EXPIRY_NOTIFICATION_ID);
    assert_eq!(
        active[0].body,
        "Milk, Eggs, Bread and 1 more items are expiring soon!"
    );

    // A second run replaces the slot instead of stacking
    app.scheduler().run_job_once(EXPIRY_JOB_NAME).await.unwrap();
    assert_eq!(slots.active().len(), 1);
    assert_eq!(slots.posted_count(), 2);

    app.shutdown().await;
}

#[tokio::test]
async fn test_logout_stops_notifications() {
    let dir = tempfile::tempdir().unwrap();
    let slots = Arc::new(SlotNotifier::new());
    let app = build(dir.path(), slots.clone());

    app.sessions().save_user(&UserSession::new("u1", "a")).unwrap();
    app.repository()
        .unwrap()
        .items()
        .upsert(&Item::new("Milk", today()))
        .await
        .unwrap();
    app.sessions().logout().unwrap();

    assert_eq!(app.expiry_scanner().scan().await.unwrap(), ScanOutcome::NoSession);
    assert_eq!(slots.posted_count(), 0);
}

#[tokio::test]
async fn test_registration_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let first_next_run = {
        let app = build(dir.path(), Arc::new(SlotNotifier::new()));
        assert_eq!(app.start().unwrap(), Registration::Scheduled);
        assert_eq!(app.start().unwrap(), Registration::KeptExisting);
        let next = app.scheduler().registry().get(EXPIRY_JOB_NAME).unwrap().next_run_at;
        app.shutdown().await;
        next
    };

    tokio::time::sleep(Duration::from_millis(20)).await;

    let app = build(dir.path(), Arc::new(SlotNotifier::new()));
    assert_eq!(app.start().unwrap(), Registration::KeptExisting);
    assert_eq!(app.scheduler().registry().len(), 1);

    let record = app.scheduler().registry().get(EXPIRY_JOB_NAME).unwrap();
    assert_eq!(record.next_run_at, first_next_run);
    assert!(record.constraints.battery_not_low);
    assert_eq!(app.check_health().unwrap(), 0);
    app.shutdown().await;
}
