use async_trait::async_trait;

use super::{Notification, Notifier, NotifyError};

/// Writes notifications to the log (headless daemon)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn post(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            slot = notification.id,
            title = %notification.title,
            body = %notification.body,
            "Notification"
        );
        Ok(())
    }
}
