//! Error types for device access and element resolution

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdbError {
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    /// A capability was used before its setup call.
    #[error("Not initialized: {0}")]
    NotInitialized(&'static str),

    #[error("Malformed bounds {0:?}: expected four integers")]
    MalformedBounds(String),

    #[error("Malformed hierarchy dump: {0}")]
    MalformedDump(String),

    #[error("Invalid XPath {expression:?}: {reason}")]
    InvalidXpath { expression: String, reason: String },

    #[error("Element has no hierarchy node (located by OCR or shape)")]
    NoBackingNode,

    #[error("OCR service error {code}: {message}")]
    Ocr { code: i64, message: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AdbError>;
