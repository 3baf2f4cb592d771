//! Runtime configuration of the sampler.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collector::DeviceSelector;

/// Default proc root.
pub const DEFAULT_PROC_PATH: &str = "/proc";
/// Default sink path (a named pipe in production).
pub const DEFAULT_SINK_PATH: &str = "/tmp/monitor_pipe";
/// Default sampling interval in seconds.
pub const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Invalid configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Everything the sampling loop needs to know.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Base path of the proc filesystem.
    pub proc_path: PathBuf,
    /// Disk device and network interface to report.
    pub selector: DeviceSelector,
    /// Where encoded snapshots are written.
    pub sink_path: PathBuf,
    /// Time between two cycles.
    pub interval: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            proc_path: PathBuf::from(DEFAULT_PROC_PATH),
            selector: DeviceSelector::default(),
            sink_path: PathBuf::from(DEFAULT_SINK_PATH),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
        }
    }
}

impl SamplerConfig {
    /// Rejects values the loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.proc_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation("proc path is empty".to_string()));
        }
        if self.sink_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation("sink path is empty".to_string()));
        }
        if self.interval.is_zero() {
            return Err(ConfigError::Validation(
                "interval must be greater than zero".to_string(),
            ));
        }
        check_name("disk device", &self.selector.disk_device)?;
        check_name("network interface", &self.selector.net_interface)?;
        Ok(())
    }
}

/// Feed names are single whitespace-free tokens; the net/dev name also
/// cannot contain the ':' separator.
fn check_name(what: &str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(format!("{what} name is empty")));
    }
    if name.chars().any(|c| c.is_whitespace() || c == ':') {
        return Err(ConfigError::Validation(format!(
            "{what} name '{name}' contains whitespace or ':'"
        )));
    }
    Ok(())
}
