//! Error category classification

use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Session errors
/// - 2xxx: Store errors
/// - 3xxx: Scheduler errors
/// - 4xxx: Recipe errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Session errors (1xxx)
    Session,
    /// Store errors (2xxx)
    Store,
    /// Scheduler errors (3xxx)
    Scheduler,
    /// Recipe errors (4xxx)
    Recipe,
    /// System errors (9xxx and anything unassigned)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Session,
            2000..3000 => Self::Store,
            3000..4000 => Self::Scheduler,
            4000..5000 => Self::Recipe,
            _ => Self::System,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_ranges() {
        assert_eq!(ErrorCategory::from_code(3), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Session);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Store);
        assert_eq!(ErrorCategory::from_code(3004), ErrorCategory::Scheduler);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Recipe);
        assert_eq!(ErrorCategory::from_code(6000), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
    }
}
