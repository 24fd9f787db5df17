//! Connection management.
//!
//! Resolves a target device into an open agent session:
//!
//! | Path | Device selection | Endpoint |
//! |------|------------------|----------|
//! | USB | given, or first listed | `http://forward-to-<local>:<agent>` |
//! | WiFi | serial starts with the address and device is online | `http://<address>:<port>` |
//! | Direct | none | any [`Endpoint`] |
//!
//! A USB connection owns exactly one forwarded local port. If the session
//! handshake fails the forward is removed before the error is returned.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::bridge::{Device, DeviceBridge};
use crate::error::{Error, Result};
use crate::transport::{CommandExecutor, Endpoint, HttpTransport, free_port};

use super::core::Driver;
use super::options::DriverOptions;

// ============================================================================
// USB
// ============================================================================

/// Connects through an adb port forward.
pub(crate) async fn usb(
    bridge: &dyn DeviceBridge,
    transport: Arc<dyn HttpTransport>,
    device: Option<Arc<dyn Device>>,
    options: DriverOptions,
) -> Result<Driver> {
    let device = match device {
        Some(device) => device,
        None => bridge
            .list_devices()
            .await?
            .into_iter()
            .next()
            .ok_or(Error::NoDevice)?,
    };

    let local_port = free_port().await?;
    device.forward(local_port, options.agent_port).await?;

    let endpoint = Endpoint::forwarded(local_port, options.agent_port);
    debug!(serial = device.serial(), %endpoint, "Opening session over forward");

    let capabilities = Value::Object(options.capabilities.clone());
    let executor = match CommandExecutor::open(transport, endpoint, &capabilities).await {
        Ok(executor) => executor,
        Err(e) => {
            if let Err(kill) = device.forward_kill(local_port).await {
                warn!(local_port, error = %kill, "Failed to release forward after handshake error");
            }
            return Err(e);
        }
    };

    info!(
        serial = device.serial(),
        local_port,
        session_id = %executor.session_id(),
        "Connected over USB"
    );

    Ok(Driver::new(executor, Some(device), Some(local_port), options))
}

// ============================================================================
// WiFi
// ============================================================================

/// Strips a trailing `:port` from an adb network serial.
fn host_of(address: &str) -> &str {
    match address.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => host,
        _ => address,
    }
}

/// Connects directly to the agent over the network.
///
/// `address` is matched as a prefix of the adb serial, so both `10.0.0.2`
/// and `10.0.0.2:5555` select the device `10.0.0.2:5555`.
pub(crate) async fn wifi(
    bridge: &dyn DeviceBridge,
    transport: Arc<dyn HttpTransport>,
    address: &str,
    port: Option<u16>,
    options: DriverOptions,
) -> Result<Driver> {
    let mut selected = None;
    for device in bridge.list_devices().await? {
        if !device.serial().starts_with(address) {
            continue;
        }
        match device.state().await {
            Ok(state) if state.is_online() => {
                selected = Some(device);
                break;
            }
            Ok(state) => debug!(serial = device.serial(), %state, "Skipping device"),
            Err(e) => debug!(serial = device.serial(), error = %e, "Skipping device"),
        }
    }
    let device = selected.ok_or_else(|| Error::no_matching_device(address))?;

    let endpoint = Endpoint::network(host_of(address), port.unwrap_or(options.agent_port));
    let capabilities = Value::Object(options.capabilities.clone());
    let executor = CommandExecutor::open(transport, endpoint, &capabilities).await?;

    info!(
        serial = device.serial(),
        session_id = %executor.session_id(),
        "Connected over WiFi"
    );

    Ok(Driver::new(executor, Some(device), None, options))
}

// ============================================================================
// Direct
// ============================================================================

/// Opens a session against `endpoint` without a device.
///
/// Device helpers and [`Driver::dispose`] fail with
/// [`Error::DeviceNotReady`] on such a driver.
pub(crate) async fn direct(
    transport: Arc<dyn HttpTransport>,
    endpoint: Endpoint,
    options: DriverOptions,
) -> Result<Driver> {
    let capabilities = Value::Object(options.capabilities.clone());
    let executor = CommandExecutor::open(transport, endpoint, &capabilities).await?;
    Ok(Driver::new(executor, None, None, options))
}

// ============================================================================
// Tests
// ============================================================================
