//! Timing configuration for device operations

use lazy_static::lazy_static;
use std::env;

fn env_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Device timing configuration for adb operations
#[derive(Debug, Clone)]
pub struct DeviceTimingConfig {
    /// Seconds to wait after a tap is sent
    pub tap_delay: f64,
    /// Seconds allowed for `uiautomator dump`
    pub dump_timeout: u64,
    /// Seconds allowed for `screencap`
    pub screenshot_timeout: u64,
    /// Seconds allowed for pulling an artifact to the host
    pub pull_timeout: u64,
    /// Seconds allowed for `input tap`
    pub input_timeout: u64,
}

impl Default for DeviceTimingConfig {
    fn default() -> Self {
        Self {
            tap_delay: env_f64("ADBUI_TAP_DELAY", 0.5),
            dump_timeout: env_u64("ADBUI_DUMP_TIMEOUT", 20),
            screenshot_timeout: env_u64("ADBUI_SCREENSHOT_TIMEOUT", 10),
            pull_timeout: env_u64("ADBUI_PULL_TIMEOUT", 10),
            input_timeout: env_u64("ADBUI_INPUT_TIMEOUT", 5),
        }
    }
}

/// Master timing configuration
#[derive(Debug, Clone, Default)]
pub struct TimingConfig {
    pub device: DeviceTimingConfig,
}

lazy_static! {
    /// Global timing configuration instance
    pub static ref TIMING_CONFIG: TimingConfig = TimingConfig::default();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_fallback_on_garbage() {
        env::set_var("ADBUI_TEST_GARBAGE_DELAY", "soon");
        assert_eq!(env_f64("ADBUI_TEST_GARBAGE_DELAY", 1.5), 1.5);
        assert_eq!(env_u64("ADBUI_TEST_UNSET_TIMEOUT", 7), 7);
    }

    #[test]
    fn test_env_override() {
        env::set_var("ADBUI_TEST_PULL_TIMEOUT", "42");
        assert_eq!(env_u64("ADBUI_TEST_PULL_TIMEOUT", 10), 42);
    }
}
