//! Device gateway abstraction
//!
//! The resolver never talks to a device directly. It asks a gateway to
//! refresh the hierarchy dump or the screenshot, reads the artifacts from the
//! shared path stem, and sends taps back through the same gateway.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Produces UI artifacts on demand and taps the screen.
#[async_trait]
pub trait DeviceGateway: Send + Sync {
    /// Write a fresh hierarchy dump to `<temp_path>.xml`.
    async fn dump(&self) -> Result<()>;

    /// Write a fresh screenshot to `<temp_path>.png`.
    async fn screenshot(&self) -> Result<()>;

    /// Shared path stem for both artifacts.
    fn temp_path(&self) -> &Path;

    /// Tap the screen at the given pixel.
    async fn tap(&self, x: i32, y: i32) -> Result<()>;

    fn dump_path(&self) -> PathBuf {
        with_suffix(self.temp_path(), ".xml")
    }

    fn screenshot_path(&self) -> PathBuf {
        with_suffix(self.temp_path(), ".png")
    }
}

/// Append `suffix` to a path stem without touching any existing extension.
pub(crate) fn with_suffix(stem: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = stem.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_keeps_dotted_stem() {
        let path = with_suffix(Path::new("/tmp/run.1/adbui"), ".xml");
        assert_eq!(path, PathBuf::from("/tmp/run.1/adbui.xml"));

        let path = with_suffix(Path::new("/tmp/device.serial"), ".png");
        assert_eq!(path, PathBuf::from("/tmp/device.serial.png"));
    }
}
