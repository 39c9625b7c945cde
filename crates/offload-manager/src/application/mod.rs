//! Application layer: the scan subscription coordinator.

pub mod scan_coordinator;

pub use scan_coordinator::{ScanCoordinator, ScanResultHandler};
