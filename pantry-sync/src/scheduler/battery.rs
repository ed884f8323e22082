//! Battery constraint probes

use std::path::{Path, PathBuf};

/// Capacity (percent) below which the battery counts as low
pub const LOW_BATTERY_PERCENT: u8 = 15;

/// Answers the "battery not low" constraint
pub trait BatteryProbe: Send + Sync {
    fn is_low(&self) -> bool;
}

/// Mains-powered hosts
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysOkBattery;

impl BatteryProbe for AlwaysOkBattery {
    fn is_low(&self) -> bool {
        false
    }
}

/// Linux power-supply class (`/sys/class/power_supply/BAT*/capacity`)
///
/// Unreadable or missing batteries are treated as not low.
#[derive(Debug, Clone)]
pub struct SysfsBattery {
    root: PathBuf,
}

impl SysfsBattery {
    pub const DEFAULT_ROOT: &'static str = "/sys/class/power_supply";

    pub fn new() -> Self {
        Self::with_root(Self::DEFAULT_ROOT)
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn capacities(&self) -> Vec<u8> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(root = %self.root.display(), error = %e, "No power supply info");
                return Vec::new();
            }
        };

        entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("BAT"))
            .filter_map(|entry| read_capacity(&entry.path().join("capacity")))
            .collect()
    }
}

impl Default for SysfsBattery {
    fn default() -> Self {
        Self::new()
    }
}

fn read_capacity(path: &Path) -> Option<u8> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

impl BatteryProbe for SysfsBattery {
    fn is_low(&self) -> bool {
        self.capacities().iter().any(|&c| c < LOW_BATTERY_PERCENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn battery(root: &Path, name: &str, capacity: &str) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("capacity"), capacity).unwrap();
    }

    #[test]
    fn test_sysfs_levels() {
        let dir = tempfile::tempdir().unwrap();
        let probe = SysfsBattery::with_root(dir.path());
        assert!(!probe.is_low());

        battery(dir.path(), "AC", "3\n");
        battery(dir.path(), "BAT0", "80\n");
        assert!(!probe.is_low());

        battery(dir.path(), "BAT1", "14\n");
        assert!(probe.is_low());
    }

    #[test]
    fn test_unreadable_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        battery(dir.path(), "BAT0", "unknown");
        assert!(!SysfsBattery::with_root(dir.path()).is_low());
        assert!(!SysfsBattery::with_root(dir.path().join("missing")).is_low());
    }
}
