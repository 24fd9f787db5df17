//! Error types for the UiAutomator2 driver.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use uia2_driver::{By, Driver, Result};
//!
//! async fn example(driver: &Driver) -> Result<()> {
//!     let element = driver.find_element(By::id("com.example:id/login")).await?;
//!     element.click().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidArgument`] |
//! | Connectivity | [`Error::NoDevice`], [`Error::NoMatchingDevice`], [`Error::DeviceNotReady`], [`Error::Forward`], [`Error::Bridge`] |
//! | Transport | [`Error::Http`], [`Error::HttpStatus`] |
//! | Decode | [`Error::Json`], [`Error::Decode`], [`Error::Base64`], [`Error::Image`] |
//! | Remote | [`Error::Remote`], [`Error::ElementNotFound`], [`Error::ShellCommand`] |
//! | Waiting | [`Error::WaitTimeout`] |
//! | External | [`Error::Io`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when driver options or environment overrides are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid argument passed by the caller.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // Connectivity Errors
    // ========================================================================
    /// The device bridge reported no attached devices.
    #[error("No device found")]
    NoDevice,

    /// No online device matches the requested WiFi address.
    #[error("No matching and online device found for: {address}")]
    NoMatchingDevice {
        /// Address prefix used for the lookup.
        address: String,
    },

    /// The driver is not attached to a device.
    ///
    /// Returned by device-level helpers when the driver never got a device reference.
    #[error("Device bridge: the device is not ready")]
    DeviceNotReady,

    /// Port forwarding setup or teardown failed.
    #[error("Port forward failed on local port {local_port}: {message}")]
    Forward {
        /// Local port involved in the forward.
        local_port: u16,
        /// Description of the failure.
        message: String,
    },

    /// The device bridge (adb) failed.
    #[error("Device bridge error: {message}")]
    Bridge {
        /// Description of the bridge failure.
        message: String,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// HTTP exchange failed (network failure or transport timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The agent answered with a non-success status and no error payload.
    #[error("HTTP status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Raw reply body.
        body: String,
    },

    // ========================================================================
    // Decode Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reply did not have the expected shape.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the mismatch.
        message: String,
    },

    /// Base64 payload could not be decoded.
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Image payload could not be decoded.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    // ========================================================================
    // Remote Errors
    // ========================================================================
    /// The agent replied but reported a protocol-level failure.
    #[error("{error}: {message}")]
    Remote {
        /// Error code (e.g. `no such element`).
        error: String,
        /// Human readable message.
        message: String,
        /// Remote stacktrace, if any.
        stacktrace: Option<String>,
    },

    /// A single-element find matched nothing.
    #[error("no such element: unable to find an element using '{strategy}', value '{selector}'")]
    ElementNotFound {
        /// Locator strategy used.
        strategy: String,
        /// Selector value used.
        selector: String,
    },

    /// A device shell command ran but reported failure.
    #[error("{command}: {output}")]
    ShellCommand {
        /// Short description of the command.
        command: String,
        /// Trimmed shell output.
        output: String,
    },

    // ========================================================================
    // Waiting Errors
    // ========================================================================
    /// The condition poller deadline expired.
    #[error("Timeout after {timeout_ms}ms ({attempts} attempts)")]
    WaitTimeout {
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
        /// Number of times the condition was evaluated.
        attempts: u32,
        /// Last error observed from the condition, if any.
        #[source]
        last_error: Option<Box<Error>>,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a no matching device error.
    #[inline]
    pub fn no_matching_device(address: impl Into<String>) -> Self {
        Self::NoMatchingDevice {
            address: address.into(),
        }
    }

    /// Creates a port forward error.
    #[inline]
    pub fn forward(local_port: u16, message: impl Into<String>) -> Self {
        Self::Forward {
            local_port,
            message: message.into(),
        }
    }

    /// Creates a device bridge error.
    #[inline]
    pub fn bridge(message: impl Into<String>) -> Self {
        Self::Bridge {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    #[inline]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates a remote error.
    #[inline]
    pub fn remote(
        error: impl Into<String>,
        message: impl Into<String>,
        stacktrace: Option<String>,
    ) -> Self {
        Self::Remote {
            error: error.into(),
            message: message.into(),
            stacktrace,
        }
    }

    /// Creates an element not found error.
    #[inline]
    pub fn element_not_found(strategy: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::ElementNotFound {
            strategy: strategy.into(),
            selector: selector.into(),
        }
    }

    /// Creates a shell command error.
    #[inline]
    pub fn shell_command(command: impl Into<String>, output: impl AsRef<str>) -> Self {
        Self::ShellCommand {
            command: command.into(),
            output: output.as_ref().trim().to_string(),
        }
    }

    /// Creates a wait timeout error.
    #[inline]
    pub fn wait_timeout(timeout_ms: u64, attempts: u32, last_error: Option<Error>) -> Self {
        Self::WaitTimeout {
            timeout_ms,
            attempts,
            last_error: last_error.map(Box::new),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error (transport or wait).
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::WaitTimeout { .. } => true,
            Self::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns `true` if this is a connectivity error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::NoDevice
                | Self::NoMatchingDevice { .. }
                | Self::DeviceNotReady
                | Self::Forward { .. }
                | Self::Bridge { .. }
        )
    }

    /// Returns `true` if the agent replied with a semantic failure.
    #[inline]
    #[must_use]
    pub fn is_remote_error(&self) -> bool {
        matches!(
            self,
            Self::Remote { .. } | Self::ElementNotFound { .. }
        )
    }

    /// Returns `true` if a reply could not be decoded.
    #[inline]
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::Json(_) | Self::Decode { .. } | Self::Base64(_) | Self::Image(_)
        )
    }

    /// Returns the last condition error carried by a wait timeout.
    #[must_use]
    pub fn last_error(&self) -> Option<&Error> {
        match self {
            Self::WaitTimeout { last_error, .. } => last_error.as_deref(),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
