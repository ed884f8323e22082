//! SlotNotifier - 内存通知槽位表

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Notification, Notifier, NotifyError};

/// Keeps the latest unacknowledged notification per slot
#[derive(Debug, Default)]
pub struct SlotNotifier {
    slots: Mutex<BTreeMap<u32, Notification>>,
    posted: AtomicUsize,
    failing: AtomicBool,
}

impl SlotNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently shown notifications, ordered by slot id
    pub fn active(&self) -> Vec<Notification> {
        self.slots.lock().values().cloned().collect()
    }

    /// Dismiss a slot; returns what was shown there
    pub fn acknowledge(&self, slot: u32) -> Option<Notification> {
        self.slots.lock().remove(&slot)
    }

    /// Total successful posts, replacements included
    pub fn posted_count(&self) -> usize {
        self.posted.load(Ordering::SeqCst)
    }

    /// Make every post fail (permission revoked, service gone)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for SlotNotifier {
    async fn post(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Delivery("notifications disabled".to_string()));
        }
        self.slots.lock().insert(notification.id, notification.clone());
        self.posted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
