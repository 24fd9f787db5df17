//! Agent endpoints.
//!
//! An endpoint is either a USB-forwarded local port or a network address.
//! Forwarded endpoints are written as `http://forward-to-<localPort>:<remotePort>`;
//! the marker lets the executor dial `127.0.0.1:<localPort>` and lets the
//! driver know which local port to release on dispose.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Host prefix that marks a USB-forwarded endpoint.
pub const FORWARD_PREFIX: &str = "forward-to-";

// ============================================================================
// TransportKind
// ============================================================================

/// How the agent is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// Through an adb port forward.
    Usb,
    /// Directly over the network.
    Network,
}

// ============================================================================
// Endpoint
// ============================================================================

/// Base address of the agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Local port forwarded to the agent port on the device.
    Forwarded {
        /// Local port owned by the forward.
        local_port: u16,
        /// Agent port on the device.
        remote_port: u16,
    },

    /// Agent reachable at host:port.
    Network {
        /// Host name or IP address.
        host: String,
        /// Agent port.
        port: u16,
    },
}

impl Endpoint {
    /// Creates a forwarded endpoint.
    #[inline]
    #[must_use]
    pub const fn forwarded(local_port: u16, remote_port: u16) -> Self {
        Self::Forwarded {
            local_port,
            remote_port,
        }
    }

    /// Creates a network endpoint.
    #[inline]
    #[must_use]
    pub fn network(host: impl Into<String>, port: u16) -> Self {
        Self::Network {
            host: host.into(),
            port,
        }
    }

    /// Parses an endpoint URL.
    ///
    /// Accepts both `http://forward-to-<local>:<remote>` and `http://<host>:<port>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is malformed, not `http`, or
    /// carries an invalid forward marker.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|e| Error::config(format!("{raw}: {e}")))?;

        if url.scheme() != "http" {
            return Err(Error::config(format!(
                "{raw}: only http endpoints are supported"
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| Error::config(format!("{raw}: missing host")))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| Error::config(format!("{raw}: missing port")))?;

        match host.strip_prefix(FORWARD_PREFIX) {
            Some(local) => {
                let local_port = local.parse::<u16>().map_err(|_| {
                    Error::config(format!("{raw}: invalid forwarded port '{local}'"))
                })?;
                Ok(Self::forwarded(local_port, port))
            }
            None => Ok(Self::network(host, port)),
        }
    }

    /// Returns the transport kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> TransportKind {
        match self {
            Self::Forwarded { .. } => TransportKind::Usb,
            Self::Network { .. } => TransportKind::Network,
        }
    }

    /// Returns the forwarded local port, if any.
    #[inline]
    #[must_use]
    pub fn forwarded_port(&self) -> Option<u16> {
        match self {
            Self::Forwarded { local_port, .. } => Some(*local_port),
            Self::Network { .. } => None,
        }
    }

    /// Returns the address that is actually dialed.
    ///
    /// Forwarded endpoints dial the local loopback port.
    #[must_use]
    pub fn dial_base(&self) -> String {
        match self {
            Self::Forwarded { local_port, .. } => format!("http://127.0.0.1:{local_port}"),
            Self::Network { host, port } => format!("http://{host}:{port}"),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forwarded {
                local_port,
                remote_port,
            } => write!(f, "http://{FORWARD_PREFIX}{local_port}:{remote_port}"),
            Self::Network { host, port } => write!(f, "http://{host}:{port}"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
