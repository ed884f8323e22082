//! Notification Dispatcher
//!
//! 一组临期物品 → 一条固定槽位的通知 (id 1001)。同一槽位的新通知替换旧通知。

pub mod log;
pub mod slot;

pub use log::LogNotifier;
pub use slot::SlotNotifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::Item;
use std::sync::Arc;
use thiserror::Error;

/// Fixed slot of the expiry alert
pub const EXPIRY_NOTIFICATION_ID: u32 = 1001;

pub const EXPIRY_NOTIFICATION_TITLE: &str = "Food Expiring Soon";

/// Names listed in the body before the rest is summarised as a count
const MAX_LISTED_NAMES: usize = 3;

/// Notification payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Slot id; posting to an occupied slot replaces it
    pub id: u32,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

impl From<NotifyError> for AppError {
    fn from(err: NotifyError) -> Self {
        AppError::with_message(ErrorCode::NotifyFailed, err.to_string())
    }
}

/// Platform notification sink
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Show `notification`, replacing whatever occupies its slot
    async fn post(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Body text for a list of expiring item names (list order is kept)
///
/// ```
/// use pantry_sync::notify::summarize;
///
/// assert_eq!(summarize(&["Milk"]).unwrap(), "Milk is expiring soon!");
/// assert_eq!(
///     summarize(&["Milk", "Eggs", "Bread", "Cheese"]).unwrap(),
///     "Milk, Eggs, Bread and 1 more items are expiring soon!"
/// );
/// ```
pub fn summarize<S: AsRef<str>>(names: &[S]) -> Option<String> {
    if names.is_empty() {
        return None;
    }
    let listed = names
        .iter()
        .take(MAX_LISTED_NAMES)
        .map(|n| n.as_ref())
        .collect::<Vec<_>>()
        .join(", ");

    let body = match names.len() {
        1 => format!("{} is expiring soon!", listed),
        n if n <= MAX_LISTED_NAMES => format!("{} are expiring soon!", listed),
        n => format!("{} and {} more items are expiring soon!", listed, n - MAX_LISTED_NAMES),
    };
    Some(body)
}

/// Turns expiring items into at most one alert per call
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Post the expiry alert; an empty list posts nothing and returns `None`
    pub async fn dispatch(&self, expiring: &[Item]) -> Result<Option<Notification>, NotifyError> {
        let names: Vec<&str> = expiring.iter().map(|i| i.name.as_str()).collect();
        let Some(body) = summarize(&names) else {
            return Ok(None);
        };

        let notification = Notification {
            id: EXPIRY_NOTIFICATION_ID,
            title: EXPIRY_NOTIFICATION_TITLE.to_string(),
            body,
        };
        self.notifier.post(&notification).await?;
        tracing::info!(count = expiring.len(), slot = notification.id, "Expiry notification dispatched");
        Ok(Some(notification))
    }
}
