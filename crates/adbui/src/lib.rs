//! adbui: locate and tap Android UI elements
//!
//! This library provides:
//! - A device gateway over ADB (Android Debug Bridge) for hierarchy dumps,
//!   screenshots and taps
//! - Hierarchy normalization so XPath can target element classes (`//Button`)
//! - Element lookup by attribute, XPath, OCR text match or rectangle shape
//! - Located elements with pixel bounds and a tap action
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use adbui::{AdbGateway, ElementResolver};
//!
//! #[tokio::main]
//! async fn main() -> adbui::Result<()> {
//!     let gateway = Arc::new(AdbGateway::new()?);
//!     let mut resolver = ElementResolver::new(gateway);
//!
//!     if let Some(ok) = resolver
//!         .find_one_by_attributes(&[("id", "com.example:id/ok")], false, true)
//!         .await?
//!     {
//!         ok.tap().await?;
//!     }
//!     Ok(())
//! }
//! ```

// Core modules
pub mod error;

// Configuration module
pub mod config;

// Device backends
pub mod adb;
pub mod gateway;

// Element resolution
pub mod element;
pub mod hierarchy;
pub mod ocr;
pub mod resolver;
pub mod shape;

#[cfg(test)]
mod testing;

// Re-export commonly used types and functions
pub use error::{AdbError, Result};

// Config re-exports
pub use config::{
    canonical_key, DeviceTimingConfig, OcrConfig, TimingConfig, ATTRIBUTE_ALIASES, TIMING_CONFIG,
};

// Device re-exports
pub use adb::AdbGateway;
pub use gateway::DeviceGateway;

// Resolution re-exports
pub use element::{Bounds, ElementSource, UiElement};
pub use hierarchy::{Hierarchy, HierarchyNode};
pub use ocr::{hit_count, is_match, OcrItem, OcrRect, OcrService, YoutuOcr};
pub use resolver::ElementResolver;
pub use shape::{ContourShapeDetector, ShapeDetector};
