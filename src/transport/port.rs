//! Local port allocation for adb forwards.
//!
//! Binds `127.0.0.1:0`, reads the OS-assigned port and releases the
//! listener so adb can take the port over.

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tokio::net::TcpListener;
use tracing::debug;

use crate::error::Result;

// ============================================================================
// Functions
// ============================================================================

/// Returns a currently free local TCP port.
///
/// The port is only free at the time of the call; another process may
/// grab it before adb binds it, in which case the forward fails.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if binding fails.
pub async fn free_port() -> Result<u16> {
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
    let listener = TcpListener::bind(addr).await?;
    let port = listener.local_addr()?.port();
    drop(listener);

    debug!(port, "Allocated free local port");
    Ok(port)
}

// ============================================================================
// Tests
// ============================================================================
