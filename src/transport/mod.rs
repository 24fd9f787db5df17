//! HTTP transport to the on-device agent.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                         ┌──────────────────┐
//! │  Driver / Element│                         │  UiAutomator2    │
//! │                  │       HTTP + JSON       │  agent (device)  │
//! │  CommandExecutor │◄───────────────────────►│                  │
//! │  → HttpTransport │  127.0.0.1:<forwarded>  │  :6790 /wd/hub   │
//! │                  │   or <host>:<port>      │                  │
//! └──────────────────┘                         └──────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `endpoint` | Forwarded and network agent addresses |
//! | `executor` | Session-scoped command execution and reply validation |
//! | `http` | Bounded request/response exchange |
//! | `port` | Free local port allocation |

// ============================================================================
// Submodules
// ============================================================================

/// Agent endpoints.
pub mod endpoint;

/// Session-scoped command execution.
pub mod executor;

/// HTTP exchange layer.
pub mod http;

/// Local port allocation.
pub mod port;

#[cfg(test)]
pub(crate) mod mock;

// ============================================================================
// Re-exports
// ============================================================================

pub use endpoint::{Endpoint, FORWARD_PREFIX, TransportKind};
pub use executor::{BASE_PATH, CommandExecutor, Session};
pub use http::{DEFAULT_COMMAND_TIMEOUT, HttpReply, HttpRequest, HttpTransport, ReqwestTransport};
pub use port::free_port;
