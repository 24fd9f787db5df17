//! Device Bridge interface.
//!
//! The bridge enumerates devices and runs device-side operations (shell,
//! port forwarding, file push). The driver only ever issues commands
//! through it; device handles are shared read-only.
//!
//! | Item | Description |
//! |------|-------------|
//! | [`DeviceBridge`] | Device enumeration |
//! | [`Device`] | One attached device |
//! | [`AdbBridge`] | Implementation over the `adb` command line tool |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

// ============================================================================
// Submodules
// ============================================================================

/// `adb` command line implementation.
pub mod adb;

#[cfg(test)]
pub(crate) mod mock;

pub use adb::{AdbBridge, AdbDevice};

// ============================================================================
// DeviceState
// ============================================================================

/// Connectivity state of a device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeviceState {
    /// Ready for commands.
    Online,
    /// Known to adb but not responding.
    Offline,
    /// Waiting for the user to accept the host key.
    Unauthorized,
    /// Any other adb state (`recovery`, `bootloader`, ...).
    Other(String),
}

impl DeviceState {
    /// Maps an adb state word.
    #[must_use]
    pub fn from_adb(state: &str) -> Self {
        match state.trim() {
            "device" => Self::Online,
            "offline" => Self::Offline,
            "unauthorized" => Self::Unauthorized,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns `true` if the device accepts commands.
    #[inline]
    #[must_use]
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => f.write_str("online"),
            Self::Offline => f.write_str("offline"),
            Self::Unauthorized => f.write_str("unauthorized"),
            Self::Other(state) => f.write_str(state),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// One device reachable through the bridge.
#[async_trait]
pub trait Device: Send + Sync + fmt::Debug {
    /// Returns the device serial.
    fn serial(&self) -> &str;

    /// Queries the current connectivity state.
    async fn state(&self) -> Result<DeviceState>;

    /// Forwards `local_port` on the host to `remote_port` on the device.
    async fn forward(&self, local_port: u16, remote_port: u16) -> Result<()>;

    /// Removes the forward bound to `local_port`.
    async fn forward_kill(&self, local_port: u16) -> Result<()>;

    /// Runs a shell command and returns its combined output.
    async fn run_shell_command(&self, command: &str, args: &[&str]) -> Result<String>;

    /// Writes `data` to `remote_path` on the device.
    async fn push_file(&self, data: &[u8], remote_path: &str) -> Result<()>;
}

/// Enumerates devices.
#[async_trait]
pub trait DeviceBridge: Send + Sync {
    /// Lists attached devices in the order the bridge reports them.
    async fn list_devices(&self) -> Result<Vec<Arc<dyn Device>>>;
}

// ============================================================================
// Tests
// ============================================================================
