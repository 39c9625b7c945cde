//! Scan statistics kept by the offload service.

use serde::{Deserialize, Serialize};

/// Counters describing the service's scan activity since subscription.
///
/// Populated by the service on a statistics query; the coordinator passes
/// the value through without interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Scans the host explicitly requested.
    pub num_scans_requested_by_wifi: u32,
    /// Requested scans the service actually performed.
    pub num_scans_serviced_by_wifi: u32,
    /// How long the current subscription has been active, in milliseconds.
    pub subscription_duration_ms: u32,
    /// Cumulative time spent scanning, in milliseconds.
    pub scan_duration_ms: u32,
    /// Distinct channels scanned at least once.
    pub num_channels_scanned: u32,
    /// Per-channel scan counts, indexed by channel number.
    pub histogram_channels: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stats_are_all_zero() {
        let stats = ScanStats::default();
        assert_eq!(stats.num_scans_requested_by_wifi, 0);
        assert_eq!(stats.num_scans_serviced_by_wifi, 0);
        assert_eq!(stats.subscription_duration_ms, 0);
        assert_eq!(stats.scan_duration_ms, 0);
        assert_eq!(stats.num_channels_scanned, 0);
        assert!(stats.histogram_channels.is_empty());
    }

    #[test]
    fn test_stats_round_trip_through_serde() {
        let stats = ScanStats {
            num_scans_requested_by_wifi: 12,
            num_scans_serviced_by_wifi: 11,
            subscription_duration_ms: 360_000,
            scan_duration_ms: 4_200,
            num_channels_scanned: 3,
            histogram_channels: vec![0, 4, 0, 0, 0, 4, 0, 0, 0, 0, 3],
        };
        let encoded = toml::to_string(&stats).expect("serialize");
        let restored: ScanStats = toml::from_str(&encoded).expect("deserialize");
        assert_eq!(stats, restored);
    }
}
