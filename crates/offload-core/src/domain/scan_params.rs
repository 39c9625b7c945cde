//! Scan request parameters.
//!
//! [`ScanRequestParams`] is the immutable value a caller hands to the
//! coordinator on every `start_scan`.  The coordinator forwards it to the
//! remote service and forgets it; only the service caches scan settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by [`ScanRequestParams::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    /// The scan interval must be non-zero.
    #[error("scan interval must be greater than zero")]
    ZeroInterval,
    /// Every match SSID needs exactly one security flag byte.
    #[error("match_security has {got} entries but match_ssids has {want}")]
    SecurityFlagMismatch { got: usize, want: usize },
    /// An SSID exceeds the 32-byte limit imposed by 802.11.
    #[error("SSID of {0} bytes exceeds the 32-byte 802.11 limit")]
    SsidTooLong(usize),
}

/// Parameters for one offload scan request.
///
/// SSIDs are raw byte strings, not UTF-8: 802.11 SSIDs are arbitrary octets.
/// `scan_ssids` are probed actively; `match_ssids` filter which networks are
/// reported back, with `match_security` carrying one security bitmask byte
/// per match entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequestParams {
    /// Time between scan rounds, in milliseconds.
    pub interval_ms: u32,
    /// Networks weaker than this RSSI (dBm) are not reported.
    pub rssi_threshold_dbm: i32,
    /// SSIDs to probe for actively.
    pub scan_ssids: Vec<Vec<u8>>,
    /// SSIDs the service should report matches for.
    pub match_ssids: Vec<Vec<u8>>,
    /// One security bitmask byte per entry of `match_ssids`.
    pub match_security: Vec<u8>,
    /// Channels to scan, as centre frequencies in MHz.
    pub frequencies_mhz: Vec<u32>,
}

impl ScanRequestParams {
    /// Checks the structural invariants the remote service would reject.
    ///
    /// # Errors
    ///
    /// Returns the first violated [`ParamError`].
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.interval_ms == 0 {
            return Err(ParamError::ZeroInterval);
        }
        if self.match_security.len() != self.match_ssids.len() {
            return Err(ParamError::SecurityFlagMismatch {
                got: self.match_security.len(),
                want: self.match_ssids.len(),
            });
        }
        for ssid in self.scan_ssids.iter().chain(self.match_ssids.iter()) {
            if ssid.len() > 32 {
                return Err(ParamError::SsidTooLong(ssid.len()));
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
