//! Client for the Youtu general OCR API

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use image::{ImageFormat, RgbImage};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use std::io::Cursor;
use std::time::Duration;
use tracing::{debug, info};

use super::{OcrItem, OcrRect, OcrService};
use crate::config::OcrConfig;
use crate::error::{AdbError, Result};

type HmacSha1 = Hmac<Sha1>;

const GENERAL_OCR_PATH: &str = "/youtu/ocrapi/generalocr";
const SIGNATURE_LIFETIME_SECS: i64 = 30 * 24 * 60 * 60;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct OcrRequest<'a> {
    app_id: &'a str,
    image: String,
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(default)]
    errorcode: i64,
    #[serde(default)]
    errormsg: String,
    #[serde(default)]
    items: Vec<ResponseItem>,
}

#[derive(Debug, Deserialize)]
struct ResponseItem {
    itemstring: String,
    itemcoord: OcrRect,
}

/// Youtu general OCR client
pub struct YoutuOcr {
    config: OcrConfig,
    client: reqwest::Client,
}

impl YoutuOcr {
    /// Create a client; all credentials must be present
    pub fn new(config: OcrConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        info!("Youtu OCR client for app {} at {}", config.app_id, config.endpoint);
        Ok(Self { config, client })
    }

    fn url(&self) -> String {
        format!(
            "{}{}",
            self.config.endpoint.trim_end_matches('/'),
            GENERAL_OCR_PATH
        )
    }
}

#[async_trait]
impl OcrService for YoutuOcr {
    async fn recognize(&self, image: &RgbImage) -> Result<Vec<OcrItem>> {
        let request = OcrRequest {
            app_id: &self.config.app_id,
            image: encode_jpeg(image)?,
        };

        let now = chrono::Utc::now().timestamp();
        let nonce = (uuid::Uuid::new_v4().as_u128() % 1_000_000_000) as u64;
        let signature = sign(&self.config, now, nonce)?;

        debug!("POST {} ({}x{})", self.url(), image.width(), image.height());
        let response: OcrResponse = self
            .client
            .post(self.url())
            .header(AUTHORIZATION, signature)
            .header(CONTENT_TYPE, "text/json")
            .body(serde_json::to_vec(&request)?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        into_items(response)
    }
}

/// Base64 JPEG encoding of the raster
fn encode_jpeg(image: &RgbImage) -> Result<String> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)?;
    Ok(general_purpose::STANDARD.encode(&buffer))
}

/// Request signature: `base64(hmac_sha1(secret_key, plain) ++ plain)`
fn sign(config: &OcrConfig, now: i64, nonce: u64) -> Result<String> {
    let plain = format!(
        "a={}&k={}&e={}&t={}&r={}&u={}&f=",
        config.app_id,
        config.secret_id,
        now + SIGNATURE_LIFETIME_SECS,
        now,
        nonce,
        config.user_id
    );

    let mut mac = HmacSha1::new_from_slice(config.secret_key.as_bytes())
        .map_err(|e| AdbError::ParseError(format!("invalid secret key: {}", e)))?;
    mac.update(plain.as_bytes());

    let mut signed = mac.finalize().into_bytes().to_vec();
    signed.extend_from_slice(plain.as_bytes());
    Ok(general_purpose::STANDARD.encode(signed))
}

fn into_items(response: OcrResponse) -> Result<Vec<OcrItem>> {
    if response.errorcode != 0 {
        return Err(AdbError::Ocr {
            code: response.errorcode,
            message: response.errormsg,
        });
    }

    debug!("OCR returned {} items", response.items.len());
    Ok(response
        .items
        .into_iter()
        .map(|item| OcrItem {
            text: item.itemstring,
            rect: item.itemcoord,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OcrConfig {
        OcrConfig::new("10001", "AKID", "secret").with_user_id("42")
    }

    #[test]
    fn test_new_requires_credentials() {
        assert!(matches!(
            YoutuOcr::new(OcrConfig::new("", "AKID", "secret")),
            Err(AdbError::NotInitialized(_))
        ));
        assert!(YoutuOcr::new(config()).is_ok());
    }

    #[test]
    fn test_url_joins_endpoint() {
        let ocr = YoutuOcr::new(config().with_endpoint("http://localhost:8080/")).unwrap();
        assert_eq!(ocr.url(), "http://localhost:8080/youtu/ocrapi/generalocr");
    }

    #[test]
    fn test_signature_layout() {
        let signature = sign(&config(), 1_600_000_000, 123).unwrap();
        let raw = general_purpose::STANDARD.decode(signature).unwrap();

        let plain = "a=10001&k=AKID&e=1602592000&t=1600000000&r=123&u=42&f=";
        assert_eq!(raw.len(), 20 + plain.len());
        assert_eq!(&raw[20..], plain.as_bytes());

        let mut mac = HmacSha1::new_from_slice(b"secret").unwrap();
        mac.update(plain.as_bytes());
        mac.verify_slice(&raw[..20]).unwrap();
    }

    #[test]
    fn test_response_items_keep_order() {
        let body = r#"{
            "errorcode": 0,
            "errormsg": "OK",
            "items": [
                {"itemstring": "Settings", "itemcoord": {"x": 5, "y": 5, "width": 40, "height": 10}},
                {"itemstring": "Set", "itemcoord": {"x": 50, "y": 5, "width": 20, "height": 10}}
            ]
        }"#;
        let items = into_items(serde_json::from_str(body).unwrap()).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0], OcrItem::new("Settings", 5, 5, 40, 10));
        assert_eq!(items[1].text, "Set");
    }

    #[test]
    fn test_error_code_is_surfaced() {
        let body = r#"{"errorcode": -1101, "errormsg": "AUTH_FAILED"}"#;
        match into_items(serde_json::from_str(body).unwrap()) {
            Err(AdbError::Ocr { code, message }) => {
                assert_eq!(code, -1101);
                assert_eq!(message, "AUTH_FAILED");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_jpeg_encoding() {
        let encoded = encode_jpeg(&RgbImage::new(8, 8)).unwrap();
        let bytes = general_purpose::STANDARD.decode(encoded).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
