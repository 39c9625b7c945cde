//! Infrastructure layer: the HAL-facing seam and configuration storage.

pub mod hal;
pub mod storage;
