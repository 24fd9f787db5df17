//! Builder pattern for driver connections.
//!
//! # Example
//!
//! ```ignore
//! use uia2_driver::{Driver, DriverOptions};
//!
//! // First USB device, default options
//! let driver = Driver::builder().connect_usb(None).await?;
//!
//! // Network device, options from the environment
//! let driver = Driver::builder()
//!     .options(DriverOptions::from_env()?)
//!     .connect_wifi("192.168.1.28", None)
//!     .await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::bridge::{AdbBridge, Device, DeviceBridge};
use crate::error::Result;
use crate::transport::{Endpoint, HttpTransport, ReqwestTransport};

use super::connect;
use super::core::Driver;
use super::options::DriverOptions;

// ============================================================================
// DriverBuilder
// ============================================================================

/// Builder for connecting a [`Driver`].
///
/// Use [`Driver::builder()`] to create a new builder. Without explicit
/// overrides the builder uses an [`AdbBridge`] for the configured adb
/// server and a [`ReqwestTransport`] with the configured command timeout.
#[derive(Default, Clone)]
pub struct DriverBuilder {
    /// Configuration.
    options: DriverOptions,
    /// Device bridge override.
    bridge: Option<Arc<dyn DeviceBridge>>,
    /// HTTP transport override.
    transport: Option<Arc<dyn HttpTransport>>,
}

impl fmt::Debug for DriverBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverBuilder")
            .field("options", &self.options)
            .field("custom_bridge", &self.bridge.is_some())
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

// ============================================================================
// DriverBuilder Implementation
// ============================================================================

impl DriverBuilder {
    /// Creates a builder with default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: DriverOptions) -> Self {
        self.options = options;
        self
    }

    /// Uses a custom device bridge.
    #[inline]
    #[must_use]
    pub fn bridge(mut self, bridge: Arc<dyn DeviceBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Uses a custom HTTP transport.
    ///
    /// The transport is responsible for bounding each exchange.
    #[inline]
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Connects over USB through an adb port forward.
    ///
    /// Uses `device` if given, otherwise the first device the bridge lists.
    ///
    /// # Errors
    ///
    /// - [`Error::NoDevice`](crate::Error::NoDevice) if no device is attached
    /// - [`Error::Forward`](crate::Error::Forward) if the forward cannot be set up
    /// - any handshake error; the forward is removed first
    pub async fn connect_usb(self, device: Option<Arc<dyn Device>>) -> Result<Driver> {
        let (bridge, transport) = self.resolve()?;
        connect::usb(bridge.as_ref(), transport, device, self.options).await
    }

    /// Connects directly to the agent on a network device.
    ///
    /// `port` defaults to the configured agent port.
    ///
    /// # Errors
    ///
    /// - [`Error::NoMatchingDevice`](crate::Error::NoMatchingDevice) if no
    ///   online device serial starts with `address`
    /// - any handshake error
    pub async fn connect_wifi(self, address: &str, port: Option<u16>) -> Result<Driver> {
        let (bridge, transport) = self.resolve()?;
        connect::wifi(bridge.as_ref(), transport, address, port, self.options).await
    }

    /// Opens a session against an explicit endpoint without a device.
    pub async fn connect(self, endpoint: Endpoint) -> Result<Driver> {
        let transport = self.resolve_transport()?;
        connect::direct(transport, endpoint, self.options).await
    }
}

// ============================================================================
// Resolution
// ============================================================================

impl DriverBuilder {
    fn resolve(&self) -> Result<(Arc<dyn DeviceBridge>, Arc<dyn HttpTransport>)> {
        let bridge = match &self.bridge {
            Some(bridge) => Arc::clone(bridge),
            None => Arc::new(AdbBridge::new(
                self.options.adb_host.clone(),
                self.options.adb_port,
            )),
        };
        Ok((bridge, self.resolve_transport()?))
    }

    fn resolve_transport(&self) -> Result<Arc<dyn HttpTransport>> {
        match &self.transport {
            Some(transport) => Ok(Arc::clone(transport)),
            None => Ok(Arc::new(ReqwestTransport::new(self.options.command_timeout)?)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
