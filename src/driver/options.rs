//! Driver configuration.
//!
//! | Field | Default | Env override |
//! |-------|---------|--------------|
//! | `agent_port` | 6790 | `UIA2_AGENT_PORT` |
//! | `device_temp_path` | `/data/local/tmp` | |
//! | `adb_host` | `localhost` | `UIA2_ADB_HOST` |
//! | `adb_port` | 5037 | `UIA2_ADB_PORT` |
//! | `command_timeout` | 60 s | `UIA2_COMMAND_TIMEOUT_MS` |
//! | `wait_timeout` | 60 s | |
//! | `wait_interval` | 500 ms | |
//! | `capabilities` | `{}` | |
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use uia2_driver::DriverOptions;
//!
//! let options = DriverOptions::from_env()?
//!     .with_agent_port(6790)
//!     .with_command_timeout(Duration::from_secs(30));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::str::FromStr;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::bridge::adb::{DEFAULT_ADB_HOST, DEFAULT_ADB_PORT};
use crate::error::{Error, Result};
use crate::transport::DEFAULT_COMMAND_TIMEOUT;
use crate::wait::{DEFAULT_WAIT_INTERVAL, DEFAULT_WAIT_TIMEOUT, Poller};

// ============================================================================
// Constants
// ============================================================================

/// Default agent port on the device.
pub const DEFAULT_AGENT_PORT: u16 = 6790;

/// Default device directory for pushed files.
pub const DEFAULT_DEVICE_TEMP_PATH: &str = "/data/local/tmp";

const ENV_AGENT_PORT: &str = "UIA2_AGENT_PORT";
const ENV_ADB_HOST: &str = "UIA2_ADB_HOST";
const ENV_ADB_PORT: &str = "UIA2_ADB_PORT";
const ENV_COMMAND_TIMEOUT_MS: &str = "UIA2_COMMAND_TIMEOUT_MS";

// ============================================================================
// DriverOptions
// ============================================================================

/// Connection and timing configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverOptions {
    /// Agent port on the device.
    pub agent_port: u16,

    /// Device directory used to stage APKs.
    pub device_temp_path: String,

    /// adb server host.
    pub adb_host: String,

    /// adb server port.
    pub adb_port: u16,

    /// Bound on every HTTP exchange.
    pub command_timeout: Duration,

    /// Default poller timeout.
    pub wait_timeout: Duration,

    /// Default poller interval.
    pub wait_interval: Duration,

    /// Capabilities sent in the session handshake.
    pub capabilities: Map<String, Value>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl DriverOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent_port: DEFAULT_AGENT_PORT,
            device_temp_path: DEFAULT_DEVICE_TEMP_PATH.to_string(),
            adb_host: DEFAULT_ADB_HOST.to_string(),
            adb_port: DEFAULT_ADB_PORT,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            wait_interval: DEFAULT_WAIT_INTERVAL,
            capabilities: Map::new(),
        }
    }

    /// Creates default options overlaid with `UIA2_*` environment variables.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if a set variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Overlays values from `lookup` onto the defaults.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut options = Self::new();

        if let Some(port) = parse_var::<u16>(&lookup, ENV_AGENT_PORT)? {
            options.agent_port = port;
        }
        if let Some(host) = lookup(ENV_ADB_HOST).filter(|h| !h.trim().is_empty()) {
            options.adb_host = host.trim().to_string();
        }
        if let Some(port) = parse_var::<u16>(&lookup, ENV_ADB_PORT)? {
            options.adb_port = port;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_COMMAND_TIMEOUT_MS)? {
            options.command_timeout = Duration::from_millis(ms);
        }

        Ok(options)
    }

    /// Returns the default poller for this configuration.
    #[inline]
    #[must_use]
    pub fn poller(&self) -> Poller {
        Poller::new(self.wait_timeout, self.wait_interval)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::config(format!("{key}: invalid value '{raw}'"))),
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl DriverOptions {
    #[inline]
    #[must_use]
    pub fn with_agent_port(mut self, port: u16) -> Self {
        self.agent_port = port;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_device_temp_path(mut self, path: impl Into<String>) -> Self {
        self.device_temp_path = path.into();
        self
    }

    /// Sets the adb server address.
    #[inline]
    #[must_use]
    pub fn with_adb_server(mut self, host: impl Into<String>, port: u16) -> Self {
        self.adb_host = host.into();
        self.adb_port = port;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Sets the default poller timeout and interval.
    #[inline]
    #[must_use]
    pub fn with_wait(mut self, timeout: Duration, interval: Duration) -> Self {
        self.wait_timeout = timeout;
        self.wait_interval = interval;
        self
    }

    /// Adds one handshake capability.
    #[inline]
    #[must_use]
    pub fn with_capability(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.capabilities.insert(name.into(), value.into());
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
