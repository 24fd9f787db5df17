//! Driver module.
//!
//! Connection management and everything done through an open session.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Driver`] | Handle for one agent session |
//! | [`DriverBuilder`] | Connects over USB, WiFi or an explicit endpoint |
//! | [`DriverOptions`] | Ports, adb server, timeouts, capabilities |
//! | [`LaunchOptions`] | App launch readiness selectors |
//! | [`InstallOptions`] / [`UninstallOptions`] | `pm` flags |
//!
//! # Example
//!
//! ```no_run
//! use uia2_driver::{By, Driver, LaunchOptions, Result};
//!
//! # async fn example() -> Result<()> {
//! let driver = Driver::builder().connect_usb(None).await?;
//!
//! driver
//!     .app_launch(
//!         "com.android.settings",
//!         LaunchOptions::new().wait_for(By::id("com.android.settings:id/search_action_bar")),
//!     )
//!     .await?;
//!
//! println!("{}", driver.active_app_package_name().await?);
//! driver.dispose().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Application lifecycle helpers.
pub mod app;

/// Fluent builder for connections.
pub mod builder;

mod connect;

/// Core driver implementation.
pub mod core;

/// Driver configuration.
pub mod options;

mod session;

// ============================================================================
// Re-exports
// ============================================================================

pub use app::{
    DEFAULT_LAUNCH_INTERVAL, DEFAULT_LAUNCH_TIMEOUT, InstallOptions, LaunchOptions,
    UninstallOptions,
};
pub use builder::DriverBuilder;
pub use core::Driver;
pub use options::{DEFAULT_AGENT_PORT, DEFAULT_DEVICE_TEMP_PATH, DriverOptions};
