//! Installing, launching and removing an app.
//!
//! Demonstrates:
//! - Installing a local APK
//! - Launching and reading the resumed activity
//! - Force-stopping and uninstalling
//!
//! Usage:
//!   cargo run --example 003_app_lifecycle -- --apk ./app-debug.apk --package com.example.app
//!   cargo run --example 003_app_lifecycle -- --apk ./app-debug.apk --package com.example.app --no-wait

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use common::Args;
use uia2_driver::{
    Error, InstallOptions, LaunchOptions, Poller, Result, UiSelector, UninstallOptions,
};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== 003: App Lifecycle ===\n");

    let (Some(apk), Some(package)) = (args.apk.clone(), args.package.clone()) else {
        return Err(Error::invalid_argument("pass --apk <path> --package <name>"));
    };

    let driver = common::connect(&args).await?;

    // ========================================================================
    // Install
    // ========================================================================

    println!("[1] Installing {apk}...");
    driver.app_install(&apk, InstallOptions::reinstall()).await?;
    println!("    ✓ Installed\n");

    // ========================================================================
    // Launch
    // ========================================================================

    println!("[2] Launching...");
    let before = driver.active_app_package_name().await?;
    println!("    Foreground before: {before}");

    let options = LaunchOptions::new()
        .wait_for(UiSelector::new().package_name(&package))
        .with_poller(Poller::new(Duration::from_secs(20), Duration::from_secs(1)));
    driver.app_launch(&package, options).await?;
    println!("    ✓ Foreground now: {}\n", driver.active_app_activity().await?);

    common::wait_for_exit(args.no_wait).await;

    // ========================================================================
    // Remove
    // ========================================================================

    println!("[3] Terminating and uninstalling {package}...");
    driver.app_terminate(&package).await?;
    driver
        .app_uninstall(&package, UninstallOptions::new())
        .await?;
    println!("    ✓ Removed");

    driver.dispose().await?;
    Ok(())
}
