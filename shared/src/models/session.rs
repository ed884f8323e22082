//! User Session Model

use serde::{Deserialize, Serialize};

/// The logged-in user as remembered on this device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    /// Remote-auth subject; namespaces every collection
    pub id: String,
    /// Display label (usually the account email)
    pub label: String,
}

impl UserSession {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}
