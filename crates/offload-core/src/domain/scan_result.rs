//! Scan result records delivered by the offload service.

use serde::{Deserialize, Serialize};

/// One observed network in a scan result batch.
///
/// A batch is an ordered `Vec<ScanRecord>`; the coordinator hands batches to
/// the registered handler in delivery order and never retains them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Milliseconds since boot when the network was observed.
    pub timestamp_ms: u64,
    /// Raw SSID octets (not necessarily UTF-8).
    pub ssid: Vec<u8>,
    /// BSSID of the observed access point.
    pub bssid: [u8; 6],
    /// Received signal strength in dBm.
    pub rssi_dbm: i32,
    /// Channel centre frequency in MHz.
    pub frequency_mhz: u32,
    /// 802.11 capability field as reported in the beacon.
    pub capability: u16,
    /// Whether the device is currently associated to this network.
    pub associated: bool,
}
