//! # offload-core
//!
//! Shared library for the WiFi offload scan coordinator containing the
//! status/reason model, the outcome→reason mapping table, and the scan
//! domain types (request parameters, result records, statistics).
//!
//! This crate is used by the manager application and by anything that wants
//! to talk about offload scans without pulling in a runtime.  It has zero
//! dependencies on OS APIs, async runtimes, or transport mechanisms.
//!
//! # Architecture overview
//!
//! An "offload scan" is a background WiFi scan performed by a dedicated
//! low-power chip in a separate service process, so the host CPU can sleep
//! while the network is surveyed.  The manager subscribes to that service
//! and receives scan result batches asynchronously.
//!
//! This crate defines:
//!
//! - **`status`** – The `StatusCode` the coordinator caches about service
//!   health, the per-call `ReasonCode` failure explanations, and the single
//!   table-driven function that interprets a service-reported [`Outcome`].
//!
//! - **`domain`** – Pure value types: [`ScanRequestParams`] passed down on
//!   every scan request, [`ScanRecord`] batches flowing back up, and the
//!   [`ScanStats`] counters the service keeps about its own activity.

pub mod domain;
pub mod status;

// Re-export the most-used types at the crate root so callers can write
// `offload_core::StatusCode` instead of `offload_core::status::StatusCode`.
pub use domain::scan_params::{ParamError, ScanRequestParams};
pub use domain::scan_result::ScanRecord;
pub use domain::scan_stats::ScanStats;
pub use status::{map_outcome, Outcome, ReasonCode, ServiceError, StatusCode};
