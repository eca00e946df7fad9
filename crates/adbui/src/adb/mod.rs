//! ADB (Android Debug Bridge) backend for the device gateway
//!
//! This module provides:
//! - `command`: adb invocation with device selection and timeouts
//! - `gateway`: `AdbGateway`, the `DeviceGateway` over a real device

mod command;
mod gateway;

pub use gateway::AdbGateway;
