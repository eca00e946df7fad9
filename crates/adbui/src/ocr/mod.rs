//! OCR text recognition
//!
//! This module provides:
//! - `OcrService`: the recognizer the resolver delegates to
//! - `matching`: character-multiset scoring of recognized text
//! - `youtu`: `YoutuOcr`, a client for the Youtu general OCR API

mod matching;
mod youtu;

use async_trait::async_trait;
use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::element::Bounds;
use crate::error::{AdbError, Result};

pub use matching::{hit_count, is_match};
pub use youtu::YoutuOcr;

/// Pixel rectangle reported by the OCR service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl TryFrom<OcrRect> for Bounds {
    type Error = AdbError;

    fn try_from(rect: OcrRect) -> Result<Self> {
        Bounds::from_origin(rect.x, rect.y, rect.width, rect.height)
    }
}

/// One recognized piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrItem {
    pub text: String,
    pub rect: OcrRect,
}

impl OcrItem {
    pub fn new(text: impl Into<String>, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            text: text.into(),
            rect: OcrRect {
                x,
                y,
                width,
                height,
            },
        }
    }
}

/// Recognizes text in a screenshot
#[async_trait]
pub trait OcrService: Send + Sync {
    /// Items in the service's own order
    async fn recognize(&self, image: &RgbImage) -> Result<Vec<OcrItem>>;
}
