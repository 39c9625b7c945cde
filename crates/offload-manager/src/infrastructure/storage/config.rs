//! TOML-based configuration for the manager daemon.
//!
//! Reads `ManagerConfig` from the platform-appropriate config file:
//! - Linux:    `~/.config/offload-manager/config.toml`
//! - macOS:    `~/Library/Application Support/OffloadManager/config.toml`
//! - Windows:  `%APPDATA%\OffloadManager\config.toml`
//!
//! Every field carries a serde default so a partial (or absent) file still
//! yields a working configuration.

use std::path::PathBuf;

use offload_core::ScanRequestParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level daemon configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ManagerConfig {
    #[serde(default)]
    pub manager: ManagerSection,
    #[serde(default)]
    pub service: ServiceSection,
    #[serde(default)]
    pub scan: ScanSection,
}

/// General daemon behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManagerSection {
    /// `tracing` log level used when `RUST_LOG` is unset: `"error"`,
    /// `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// How the daemon obtains its offload service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceSection {
    /// Run against the in-process mock service instead of a real transport.
    #[serde(default = "default_true")]
    pub demo_mode: bool,
    /// How often the demo service emits a simulated result batch.
    #[serde(default = "default_result_interval_ms")]
    pub result_interval_ms: u64,
}

/// Default scan request issued at daemon startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanSection {
    /// Time between scan rounds, in milliseconds.
    #[serde(default = "default_scan_interval_ms")]
    pub interval_ms: u32,
    /// Networks weaker than this RSSI (dBm) are not reported.
    #[serde(default = "default_rssi_threshold_dbm")]
    pub rssi_threshold_dbm: i32,
    /// SSIDs to scan and match, as UTF-8 strings.
    #[serde(default)]
    pub ssids: Vec<String>,
    /// Channels to scan, as centre frequencies in MHz.
    #[serde(default = "default_frequencies_mhz")]
    pub frequencies_mhz: Vec<u32>,
}

impl ScanSection {
    /// Builds the scan request the daemon issues at startup.
    ///
    /// Configured SSIDs are both probed and matched, with an open-network
    /// security flag per match entry.
    pub fn to_params(&self) -> ScanRequestParams {
        let ssids: Vec<Vec<u8>> = self.ssids.iter().map(|s| s.as_bytes().to_vec()).collect();
        ScanRequestParams {
            interval_ms: self.interval_ms,
            rssi_threshold_dbm: self.rssi_threshold_dbm,
            scan_ssids: ssids.clone(),
            match_security: vec![0x01; ssids.len()],
            match_ssids: ssids,
            frequencies_mhz: self.frequencies_mhz.clone(),
        }
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_result_interval_ms() -> u64 {
    5_000
}
fn default_scan_interval_ms() -> u32 {
    30_000
}
fn default_rssi_threshold_dbm() -> i32 {
    -76
}
fn default_frequencies_mhz() -> Vec<u32> {
    vec![2412, 2437, 2462]
}

impl Default for ManagerSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            demo_mode: default_true(),
            result_interval_ms: default_result_interval_ms(),
        }
    }
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            interval_ms: default_scan_interval_ms(),
            rssi_threshold_dbm: default_rssi_threshold_dbm(),
            ssids: Vec::new(),
            frequencies_mhz: default_frequencies_mhz(),
        }
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot
/// be determined from the environment.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .ok_or(ConfigError::NoPlatformConfigDir)
        .map(|dir| dir.join("config.toml"))
}

/// Loads `ManagerConfig` from disk, returning `ManagerConfig::default()` if
/// the file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not
/// found", and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<ManagerConfig, ConfigError> {
    let path = config_file_path()?;

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let cfg: ManagerConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ManagerConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Resolves the platform config base directory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("OffloadManager"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("offload-manager"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("OffloadManager")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_expected_scan_settings() {
        let cfg = ManagerConfig::default();
        assert_eq!(cfg.scan.interval_ms, 30_000);
        assert_eq!(cfg.scan.rssi_threshold_dbm, -76);
        assert_eq!(cfg.scan.frequencies_mhz, vec![2412, 2437, 2462]);
        assert!(cfg.scan.ssids.is_empty());
    }

    #[test]
    fn test_default_config_runs_demo_mode_at_info_level() {
        let cfg = ManagerConfig::default();
        assert!(cfg.service.demo_mode);
        assert_eq!(cfg.service.result_interval_ms, 5_000);
        assert_eq!(cfg.manager.log_level, "info");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: ManagerConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, ManagerConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides_only_named_fields() {
        let toml_str = r#"
[scan]
interval_ms = 10000
ssids = ["Home", "Guest"]
"#;
        let cfg: ManagerConfig = toml::from_str(toml_str).expect("deserialize partial");

        assert_eq!(cfg.scan.interval_ms, 10_000);
        assert_eq!(cfg.scan.ssids, vec!["Home", "Guest"]);
        // Unnamed fields keep their defaults.
        assert_eq!(cfg.scan.rssi_threshold_dbm, -76);
        assert!(cfg.service.demo_mode);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let mut cfg = ManagerConfig::default();
        cfg.service.demo_mode = false;
        cfg.scan.ssids.push("Lab".to_string());

        let encoded = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: ManagerConfig = toml::from_str(&encoded).expect("deserialize");
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let result: Result<ManagerConfig, toml::de::Error> = toml::from_str("[[[ nope");
        assert!(result.is_err());
    }

    #[test]
    fn test_to_params_builds_matching_security_flags() {
        let mut section = ScanSection::default();
        section.ssids = vec!["Home".to_string(), "Guest".to_string()];

        let params = section.to_params();

        assert_eq!(params.scan_ssids, params.match_ssids);
        assert_eq!(params.match_security.len(), 2);
        assert_eq!(params.validate(), Ok(()));
    }

    #[test]
    fn test_to_params_with_no_ssids_is_still_valid() {
        let params = ScanSection::default().to_params();
        assert_eq!(params.validate(), Ok(()));
        assert!(params.scan_ssids.is_empty());
        assert!(params.match_security.is_empty());
    }
}
