//! Scan domain value types.
//!
//! Everything here is a plain value: constructed by a caller or decoded from
//! the service, passed through the coordinator, and never retained by it.

pub mod scan_params;
pub mod scan_result;
pub mod scan_stats;

pub use scan_params::{ParamError, ScanRequestParams};
pub use scan_result::ScanRecord;
pub use scan_stats::ScanStats;
