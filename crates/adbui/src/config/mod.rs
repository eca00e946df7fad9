//! Configuration module for adbui
//!
//! This module contains:
//! - `aliases`: Short attribute keys accepted by queries
//! - `timing`: Delays and timeouts for device operations
//! - `ocr`: Credentials for the OCR service

mod aliases;
mod ocr;
mod timing;

pub use aliases::{canonical_key, ATTRIBUTE_ALIASES};
pub use ocr::{OcrConfig, DEFAULT_OCR_ENDPOINT};
pub use timing::{DeviceTimingConfig, TimingConfig, TIMING_CONFIG};
