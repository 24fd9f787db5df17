//! Shared utilities for demos.
//!
//! Provides common functionality used across all demos:
//! - Command-line argument parsing
//! - Logging initialization
//! - Connecting over USB or WiFi

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use tracing_subscriber::EnvFilter;
use uia2_driver::{Driver, DriverOptions, Result};

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments for demos.
#[derive(Debug, Clone, Default)]
pub struct Args {
    pub debug: bool,
    pub no_wait: bool,
    /// `--wifi <address>` connects over the network instead of USB.
    pub wifi: Option<String>,
    /// `--apk <path>` for the app lifecycle demo.
    pub apk: Option<String>,
    /// `--package <name>` installed by `--apk`.
    pub package: Option<String>,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let value_of = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .cloned()
        };
        Self {
            debug: args.iter().any(|a| a == "--debug"),
            no_wait: args.iter().any(|a| a == "--no-wait"),
            wifi: value_of("--wifi"),
            apk: value_of("--apk"),
            package: value_of("--package"),
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Initialize tracing/logging.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        "uia2_driver=debug"
    } else {
        "uia2_driver=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

/// Connect using `UIA2_*` environment options.
pub async fn connect(args: &Args) -> Result<Driver> {
    let builder = Driver::builder().options(DriverOptions::from_env()?);
    match &args.wifi {
        Some(address) => builder.connect_wifi(address, None).await,
        None => builder.connect_usb(None).await,
    }
}

/// Wait for Ctrl+C or skip if `--no-wait` flag is set.
pub async fn wait_for_exit(no_wait: bool) {
    if no_wait {
        println!("[--no-wait] Skipping wait");
        return;
    }

    println!("Press Ctrl+C to exit...");
    tokio::signal::ctrl_c().await.ok();
}
