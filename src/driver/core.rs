//! Driver handle for one agent session.
//!
//! A [`Driver`] owns the session executor, the device it was attached
//! through and, for USB connections, the forwarded local port.
//!
//! # Example
//!
//! ```ignore
//! use uia2_driver::{By, Driver};
//!
//! let driver = Driver::builder().connect_usb(None).await?;
//!
//! let search = driver.wait_for_element(By::id("com.android.settings:id/search")).await?;
//! search.click().await?;
//!
//! driver.dispose().await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::bridge::Device;
use crate::error::{Error, Result};
use crate::identifiers::SessionId;
use crate::transport::{CommandExecutor, Endpoint, TransportKind};
use crate::ui::{By, Element};
use crate::wait::Poller;

use super::builder::DriverBuilder;
use super::options::DriverOptions;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the driver.
pub(crate) struct DriverInner {
    /// Session executor, shared with every element handle.
    pub executor: Arc<CommandExecutor>,

    /// Device the session was attached through.
    pub device: Option<Arc<dyn Device>>,

    /// Forwarded local port owned by this driver.
    pub forwarded_port: Mutex<Option<u16>>,

    /// Configuration.
    pub options: DriverOptions,
}

// ============================================================================
// Driver
// ============================================================================

/// Remote-control handle for one agent session.
///
/// Cheap to clone; clones share the session and the forwarded port.
/// Concurrent use is as safe as the underlying transport; for independent
/// parallel automation open independent drivers.
#[derive(Clone)]
pub struct Driver {
    /// Shared inner state.
    pub(crate) inner: Arc<DriverInner>,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("session_id", self.session_id())
            .field("endpoint", self.endpoint())
            .field("serial", &self.inner.device.as_ref().map(|d| d.serial()))
            .field("forwarded_port", &self.forwarded_port())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Driver - Constructor
// ============================================================================

impl Driver {
    pub(crate) fn new(
        executor: CommandExecutor,
        device: Option<Arc<dyn Device>>,
        forwarded_port: Option<u16>,
        options: DriverOptions,
    ) -> Self {
        Self {
            inner: Arc::new(DriverInner {
                executor: Arc::new(executor),
                device,
                forwarded_port: Mutex::new(forwarded_port),
                options,
            }),
        }
    }

    /// Creates a connection builder.
    #[inline]
    #[must_use]
    pub fn builder() -> DriverBuilder {
        DriverBuilder::new()
    }
}

// ============================================================================
// Driver - Accessors
// ============================================================================

impl Driver {
    /// Returns the session id.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        self.inner.executor.session_id()
    }

    /// Returns the agent endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        self.inner.executor.session().endpoint()
    }

    /// Returns how the agent is reached.
    #[inline]
    #[must_use]
    pub fn transport_kind(&self) -> TransportKind {
        self.inner.executor.session().kind()
    }

    /// Returns the attached device, if any.
    #[inline]
    #[must_use]
    pub fn device(&self) -> Option<&Arc<dyn Device>> {
        self.inner.device.as_ref()
    }

    /// Returns the forwarded local port still held by this driver.
    #[inline]
    #[must_use]
    pub fn forwarded_port(&self) -> Option<u16> {
        *self.inner.forwarded_port.lock()
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &DriverOptions {
        &self.inner.options
    }

    pub(crate) fn executor(&self) -> &Arc<CommandExecutor> {
        &self.inner.executor
    }

    /// Returns the device or [`Error::DeviceNotReady`].
    pub(crate) fn ready_device(&self) -> Result<&Arc<dyn Device>> {
        self.inner.device.as_ref().ok_or(Error::DeviceNotReady)
    }
}

// ============================================================================
// Driver - Lifecycle
// ============================================================================

impl Driver {
    /// Releases the forwarded local port.
    ///
    /// Safe to call repeatedly: only the first call after a USB connection
    /// removes the forward, later calls and network drivers do nothing.
    /// The session itself is left open; see
    /// [`delete_session`](Self::delete_session).
    ///
    /// # Errors
    ///
    /// - [`Error::DeviceNotReady`] if no device was ever attached
    /// - [`Error::Forward`] if the bridge fails to remove the forward; the
    ///   port stays owned so the call can be retried
    pub async fn dispose(&self) -> Result<()> {
        let device = self.ready_device()?;

        let Some(local_port) = self.inner.forwarded_port.lock().take() else {
            debug!(session_id = %self.session_id(), "No forwarded port to release");
            return Ok(());
        };

        if let Err(e) = device.forward_kill(local_port).await {
            warn!(local_port, error = %e, "Failed to release forwarded port");
            *self.inner.forwarded_port.lock() = Some(local_port);
            return Err(e);
        }

        info!(
            session_id = %self.session_id(),
            serial = device.serial(),
            local_port,
            "Forwarded port released"
        );
        Ok(())
    }
}

// ============================================================================
// Driver - Device
// ============================================================================

impl Driver {
    /// Runs a shell command on the attached device.
    pub async fn run_shell_command(&self, command: &str, args: &[&str]) -> Result<String> {
        let device = self.ready_device()?;
        debug!(serial = device.serial(), command, ?args, "Running shell command");
        device.run_shell_command(command, args).await
    }

    /// Writes `data` to `remote_path` on the attached device.
    pub async fn push(&self, data: &[u8], remote_path: &str) -> Result<()> {
        self.ready_device()?.push_file(data, remote_path).await
    }
}

// ============================================================================
// Driver - Waiting
// ============================================================================

impl Driver {
    /// Polls `condition` with the configured default timeout and interval.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use futures_util::FutureExt;
    ///
    /// driver
    ///     .wait_until(|d| async move { Ok(d.source().await?.contains("Wi-Fi")) }.boxed())
    ///     .await?;
    /// ```
    pub async fn wait_until<F>(&self, condition: F) -> Result<()>
    where
        F: for<'a> FnMut(&'a Driver) -> BoxFuture<'a, Result<bool>>,
    {
        self.wait_with(self.inner.options.poller(), condition).await
    }

    /// Polls `condition` with an explicit poller.
    pub async fn wait_with<F>(&self, poller: Poller, mut condition: F) -> Result<()>
    where
        F: for<'a> FnMut(&'a Driver) -> BoxFuture<'a, Result<bool>>,
    {
        poller.until(|| condition(self)).await
    }

    /// Waits until `by` resolves and returns the element.
    pub async fn wait_for_element(&self, by: impl Into<By>) -> Result<Element> {
        self.wait_for_element_with(by, self.inner.options.poller())
            .await
    }

    /// Waits until `by` resolves, using an explicit poller.
    pub async fn wait_for_element_with(
        &self,
        by: impl Into<By>,
        poller: Poller,
    ) -> Result<Element> {
        let by = by.into();
        poller
            .until_some(|| {
                let by = by.clone();
                async move { self.find_element(by).await.map(Some) }
            })
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================
