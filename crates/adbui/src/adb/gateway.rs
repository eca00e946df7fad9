//! Device gateway backed by the adb command-line tool

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info};

use super::command::{combined_output, AdbCommand};
use crate::config::TIMING_CONFIG;
use crate::error::{AdbError, Result};
use crate::gateway::DeviceGateway;

const REMOTE_DUMP_PATH: &str = "/sdcard/adbui_dump.xml";
const REMOTE_SCREENSHOT_PATH: &str = "/sdcard/adbui_screen.png";

/// Drives one Android device through `adb`.
///
/// Dumps and screenshots are pulled into a private temporary directory that
/// lives as long as the gateway.
pub struct AdbGateway {
    adb: AdbCommand,
    _temp_dir: TempDir,
    stem: PathBuf,
}

impl AdbGateway {
    /// Gateway for the only connected device
    pub fn new() -> Result<Self> {
        Self::build("adb".to_string(), None)
    }

    /// Gateway for the device with the given serial
    pub fn with_serial(serial: impl Into<String>) -> Result<Self> {
        Self::build("adb".to_string(), Some(serial.into()))
    }

    /// Gateway using a custom adb binary
    pub fn with_adb_path(adb_path: impl Into<String>, serial: Option<String>) -> Result<Self> {
        Self::build(adb_path.into(), serial)
    }

    fn build(adb_path: String, serial: Option<String>) -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("adbui-")
            .tempdir()
            .map_err(AdbError::Io)?;
        let stem = temp_dir.path().join("ui");

        info!(
            "adb gateway for {} using {}",
            serial.as_deref().unwrap_or("default device"),
            stem.display()
        );

        Ok(Self {
            adb: AdbCommand::new(adb_path, serial),
            _temp_dir: temp_dir,
            stem,
        })
    }

    /// Device serial this gateway is pinned to, if any
    pub fn serial(&self) -> Option<&str> {
        self.adb.serial()
    }

    /// Pull a device file to `local`, replacing any previous copy
    async fn pull(&self, remote: &str, local: &Path) -> Result<()> {
        match tokio::fs::remove_file(local).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(AdbError::Io(e)),
        }

        let local_str = local.to_string_lossy();
        let output = self
            .adb
            .run(
                &["pull", remote, &*local_str],
                TIMING_CONFIG.device.pull_timeout,
            )
            .await?;
        debug!("adb pull output: {}", combined_output(&output).trim());

        let size = tokio::fs::metadata(local)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if size == 0 {
            return Err(AdbError::CommandFailed(format!(
                "{} is missing or empty after adb pull",
                local.display()
            )));
        }

        debug!("Pulled {} ({} bytes)", local.display(), size);
        Ok(())
    }
}

#[async_trait]
impl DeviceGateway for AdbGateway {
    async fn dump(&self) -> Result<()> {
        let output = self
            .adb
            .run(
                &["shell", "uiautomator", "dump", REMOTE_DUMP_PATH],
                TIMING_CONFIG.device.dump_timeout,
            )
            .await?;

        let combined = combined_output(&output);
        debug!("uiautomator output: {}", combined.trim());
        if combined.contains("ERROR") {
            return Err(AdbError::CommandFailed(combined.trim().to_string()));
        }

        self.pull(REMOTE_DUMP_PATH, &self.dump_path()).await
    }

    async fn screenshot(&self) -> Result<()> {
        let output = self
            .adb
            .run(
                &["shell", "screencap", "-p", REMOTE_SCREENSHOT_PATH],
                TIMING_CONFIG.device.screenshot_timeout,
            )
            .await?;

        // screencap exits 0 on secure screens but reports the failure
        let combined = combined_output(&output);
        if combined.contains("Status: -1") || combined.contains("Failed") {
            return Err(AdbError::CommandFailed(format!(
                "screencap failed: {}",
                combined.trim()
            )));
        }

        self.pull(REMOTE_SCREENSHOT_PATH, &self.screenshot_path())
            .await
    }

    fn temp_path(&self) -> &Path {
        &self.stem
    }

    async fn tap(&self, x: i32, y: i32) -> Result<()> {
        let (x, y) = (x.to_string(), y.to_string());
        self.adb
            .run(
                &["shell", "input", "tap", x.as_str(), y.as_str()],
                TIMING_CONFIG.device.input_timeout,
            )
            .await?;

        tokio::time::sleep(Duration::from_secs_f64(TIMING_CONFIG.device.tap_delay)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths_share_stem() {
        let gateway = AdbGateway::with_serial("emulator-5554").unwrap();
        let stem = gateway.temp_path().to_path_buf();

        assert!(stem.parent().unwrap().exists());
        assert_eq!(gateway.dump_path(), stem.with_extension("xml"));
        assert_eq!(gateway.screenshot_path(), stem.with_extension("png"));
        assert_eq!(gateway.serial(), Some("emulator-5554"));
    }

    #[tokio::test]
    async fn test_dump_without_adb_fails() {
        let gateway = AdbGateway::with_adb_path("/nonexistent/adbui-test-adb", None).unwrap();
        assert!(gateway.dump().await.is_err());
        assert!(!gateway.dump_path().exists());
    }
}
