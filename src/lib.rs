//! UiAutomator2 driver - Android UI automation over the UiAutomator2 agent.
//!
//! This library drives the UiAutomator2 server running on an Android
//! device: it opens a session, finds UI nodes and operates on them.
//!
//! # Architecture
//!
//! The driver follows a client-server model:
//!
//! - **Local End (Rust)**: Builds commands, sends them over HTTP, decodes replies
//! - **Remote End (Agent)**: Runs on the device and performs UI automation
//!
//! Key design principles:
//!
//! - Each [`Driver`] owns one session and, over USB, one forwarded local port
//! - Commands are `{method, path segments, payload}`, scoped under the session
//! - [`Element`] is a remote reference; every accessor is a fresh round-trip
//! - Waiting is explicit through a bounded [`Poller`]
//!
//! # Quick Start
//!
//! ```no_run
//! use uia2_driver::{By, Driver, Result, UiSelector};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Forward a local port to the first USB device and open a session
//!     let driver = Driver::builder().connect_usb(None).await?;
//!
//!     // Locate by resource id, or by a compiled UiSelector expression
//!     let wifi = driver
//!         .wait_for_element(UiSelector::new().text_contains("Wi"))
//!         .await?;
//!     wifi.click().await?;
//!
//!     let toggle = driver.find_element(By::class_name("android.widget.Switch")).await?;
//!     println!("checked: {}", toggle.checked().await?);
//!
//!     driver.dispose().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bridge`] | Device discovery, shell, forwarding, push (adb) |
//! | [`driver`] | Connection manager, session commands, app helpers |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`geometry`] | [`Point`], [`Size`], [`Rect`] |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Command and reply types (internal) |
//! | [`transport`] | Endpoints, HTTP exchange, command executor (internal) |
//! | [`ui`] | [`By`], [`UiSelector`], [`Element`], gesture options |
//! | [`wait`] | Condition poller |

// ============================================================================
// Modules
// ============================================================================

/// Device bridge: discovery, shell, port forwarding and file push.
pub mod bridge;

/// Driver factory, session commands and configuration.
///
/// Use [`Driver::builder()`] to connect.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Geometric reply shapes.
pub mod geometry;

/// Type-safe identifiers for sessions and elements.
pub mod identifiers;

/// Command and reply types.
///
/// Internal module defining the agent's request/response shapes.
pub mod protocol;

/// HTTP transport layer.
///
/// Internal module handling endpoints and session-scoped execution.
pub mod transport;

/// UI locators and element handles.
pub mod ui;

/// Condition poller.
pub mod wait;

// ============================================================================
// Re-exports
// ============================================================================

// Bridge types
pub use bridge::{AdbBridge, AdbDevice, Device, DeviceBridge, DeviceState};

// Driver types
pub use driver::{
    Driver, DriverBuilder, DriverOptions, InstallOptions, LaunchOptions, UninstallOptions,
};

// Error types
pub use error::{Error, Result};

// Geometry types
pub use geometry::{Point, PointF, Rect, Size};

// Identifier types
pub use identifiers::{ElementId, SessionId};

// Transport types
pub use transport::{Endpoint, TransportKind};

// UI types
pub use ui::{By, DragOptions, Element, ScrollOptions, SendKeysOptions, SwipeOptions, UiSelector};

// Waiting
pub use wait::Poller;
