//! OCR service credentials

use std::env;

use crate::error::{AdbError, Result};

/// Default endpoint of the Youtu open platform
pub const DEFAULT_OCR_ENDPOINT: &str = "https://api.youtu.qq.com";

/// Credentials and endpoint for the OCR service
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub app_id: String,
    pub secret_id: String,
    pub secret_key: String,
    pub user_id: String,
    pub endpoint: String,
}

impl OcrConfig {
    /// Create a config from an application id and secret key pair
    pub fn new(
        app_id: impl Into<String>,
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
            user_id: String::new(),
            endpoint: DEFAULT_OCR_ENDPOINT.to_string(),
        }
    }

    /// Read credentials from `ADBUI_OCR_APP_ID`, `ADBUI_OCR_SECRET_ID` and
    /// `ADBUI_OCR_SECRET_KEY`. `ADBUI_OCR_ENDPOINT` is optional.
    pub fn from_env() -> Result<Self> {
        let app_id = require_env("ADBUI_OCR_APP_ID")?;
        let secret_id = require_env("ADBUI_OCR_SECRET_ID")?;
        let secret_key = require_env("ADBUI_OCR_SECRET_KEY")?;

        let mut config = Self::new(app_id, secret_id, secret_key);
        if let Ok(endpoint) = env::var("ADBUI_OCR_ENDPOINT") {
            config.endpoint = endpoint;
        }
        Ok(config)
    }

    /// Set the user id sent in the request signature
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Set a custom endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Fail with the name of the first missing credential
    pub fn validate(&self) -> Result<()> {
        if self.app_id.is_empty() {
            return Err(AdbError::NotInitialized("OcrConfig::app_id"));
        }
        if self.secret_id.is_empty() {
            return Err(AdbError::NotInitialized("OcrConfig::secret_id"));
        }
        if self.secret_key.is_empty() {
            return Err(AdbError::NotInitialized("OcrConfig::secret_key"));
        }
        Ok(())
    }
}

fn require_env(name: &'static str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(AdbError::NotInitialized(name)),
    }
}
