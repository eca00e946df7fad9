//! adb command execution

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::error::{AdbError, Result};

/// adb binary plus an optional device serial
#[derive(Debug, Clone)]
pub(crate) struct AdbCommand {
    adb_path: String,
    serial: Option<String>,
}

impl AdbCommand {
    pub(crate) fn new(adb_path: impl Into<String>, serial: Option<String>) -> Self {
        Self {
            adb_path: adb_path.into(),
            serial,
        }
    }

    pub(crate) fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// Build the argument list, including `-s <serial>` when a device is pinned
    pub(crate) fn args<'a>(&'a self, args: &[&'a str]) -> Vec<&'a str> {
        let mut full = Vec::with_capacity(args.len() + 2);
        if let Some(serial) = self.serial.as_deref() {
            full.push("-s");
            full.push(serial);
        }
        full.extend_from_slice(args);
        full
    }

    /// Run adb with `args`, failing on timeout or non-zero exit.
    pub(crate) async fn run(&self, args: &[&str], timeout: u64) -> Result<Output> {
        let full = self.args(args);
        debug!("adb {}", full.join(" "));

        let output = tokio::time::timeout(
            Duration::from_secs(timeout),
            Command::new(&self.adb_path).args(&full).output(),
        )
        .await
        .map_err(|_| AdbError::Timeout(format!("adb {} after {}s", args.join(" "), timeout)))?
        .map_err(AdbError::Io)?;

        if !output.status.success() {
            return Err(AdbError::CommandFailed(format!(
                "adb {}: {}",
                args.join(" "),
                combined_output(&output).trim()
            )));
        }

        Ok(output)
    }
}

/// stdout followed by stderr, lossily decoded
pub(crate) fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{}{}", stdout, stderr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_without_serial() {
        let cmd = AdbCommand::new("adb", None);
        assert_eq!(cmd.args(&["shell", "input", "tap"]), vec!["shell", "input", "tap"]);
    }

    #[test]
    fn test_args_with_serial() {
        let cmd = AdbCommand::new("adb", Some("emulator-5554".to_string()));
        assert_eq!(
            cmd.args(&["pull", "/sdcard/a.png"]),
            vec!["-s", "emulator-5554", "pull", "/sdcard/a.png"]
        );
        assert_eq!(cmd.serial(), Some("emulator-5554"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_io_error() {
        let cmd = AdbCommand::new("/nonexistent/adbui-test-adb", None);
        let err = cmd.run(&["devices"], 5).await.unwrap_err();
        assert!(matches!(err, AdbError::Io(_)));
    }
}
