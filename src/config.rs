use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default connection/read timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 3;
/// Default interval between re-scans, in minutes.
pub const DEFAULT_REFRESH_INTERVAL_MINS: u64 = 60;

/// Immutable per-run settings for the scanning engine.
///
/// Built once at startup and passed by reference to every component; nothing
/// mutates it after the scan starts.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Deadline for each TCP connect attempt.
    pub connect_timeout: Duration,
    /// Deadline for each read phase of a probe handshake.
    pub read_timeout: Duration,
    /// Number of concurrent probe workers.
    pub workers: usize,
}

impl ScanConfig {
    /// Build a config with a single timeout applied to both the connect and
    /// read phases, matching the one `--timeout` knob on the CLI.
    pub fn from_timeout_secs(timeout_secs: u64, workers: usize) -> Self {
        let t = Duration::from_secs(timeout_secs.max(1));
        Self {
            connect_timeout: t,
            read_timeout: t,
            workers: workers.max(1),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::from_timeout_secs(DEFAULT_TIMEOUT_SECS, default_workers())
    }
}

/// Default worker count: twice the available hardware parallelism.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(8)
}

/// Optional JSON configuration file. Every field is optional; missing fields
/// fall back to the CLI flag or the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub timeout: Option<u64>,
    pub workers: Option<usize>,
    pub refresh_interval: Option<u64>,
    pub output_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Load and parse a JSON config file. An unreadable or invalid file is a
/// fatal configuration error.
pub fn load_file_config(path: impl AsRef<Path>) -> Result<FileConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to read config file: {}", path.as_ref().display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid JSON config: {}", path.as_ref().display()))
}

/// Resolved settings after merging CLI flags, the optional config file, and
/// built-in defaults. CLI wins, then the file, then the default.
#[derive(Debug, Clone)]
pub struct Settings {
    pub scan: ScanConfig,
    pub refresh_interval_mins: u64,
    pub output_dir: PathBuf,
    pub log_level: String,
}

impl Settings {
    pub fn merge(
        file: FileConfig,
        timeout: Option<u64>,
        workers: Option<usize>,
        refresh_interval: Option<u64>,
        output_dir: Option<PathBuf>,
        log_level: Option<String>,
    ) -> Self {
        let timeout = timeout
            .or(file.timeout)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let workers = workers.or(file.workers).unwrap_or_else(default_workers);
        Self {
            scan: ScanConfig::from_timeout_secs(timeout, workers),
            refresh_interval_mins: refresh_interval
                .or(file.refresh_interval)
                .unwrap_or(DEFAULT_REFRESH_INTERVAL_MINS),
            output_dir: output_dir
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            log_level: log_level
                .or(file.log_level)
                .unwrap_or_else(|| "info".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_workers_is_positive() {
        assert!(default_workers() >= 1);
    }

    #[test]
    fn zero_values_are_clamped() {
        let cfg = ScanConfig::from_timeout_secs(0, 0);
        assert_eq!(cfg.connect_timeout, Duration::from_secs(1));
        assert_eq!(cfg.workers, 1);
    }

    #[test]
    fn cli_beats_file_beats_default() {
        let file = FileConfig {
            timeout: Some(7),
            workers: Some(4),
            refresh_interval: None,
            output_dir: Some(PathBuf::from("/tmp/out")),
            log_level: None,
        };
        let s = Settings::merge(file, Some(10), None, None, None, Some("debug".into()));
        // CLI timeout wins over the file value.
        assert_eq!(s.scan.connect_timeout, Duration::from_secs(10));
        // File workers win over the default.
        assert_eq!(s.scan.workers, 4);
        assert_eq!(s.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(s.log_level, "debug");
        assert_eq!(s.refresh_interval_mins, DEFAULT_REFRESH_INTERVAL_MINS);
    }

    #[test]
    fn parse_file_config_json() {
        let cfg: FileConfig =
            serde_json::from_str(r#"{"timeout": 5, "workers": 16, "log_level": "quiet"}"#).unwrap();
        assert_eq!(cfg.timeout, Some(5));
        assert_eq!(cfg.workers, Some(16));
        assert_eq!(cfg.log_level.as_deref(), Some("quiet"));
        assert!(cfg.output_dir.is_none());
    }
}
