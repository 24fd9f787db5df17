//! Connecting to the agent and reading session state.
//!
//! Demonstrates:
//! - Connecting over USB (port forward) or WiFi
//! - Agent status and session details
//! - Window size, screenshot and UI hierarchy
//! - Releasing the forwarded port
//!
//! Usage:
//!   cargo run --example 001_usb_connect
//!   cargo run --example 001_usb_connect -- --wifi 192.168.1.28
//!   cargo run --example 001_usb_connect -- --debug --no-wait

mod common;

// ============================================================================
// Imports
// ============================================================================

use common::Args;
use uia2_driver::Result;

// ============================================================================
// Constants
// ============================================================================

const SCREENSHOT_PATH: &str = "./screen.png";

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
    println!("=== 001: Connect ===\n");

    // ========================================================================
    // Connect
    // ========================================================================

    println!("[1] Connecting...");
    let driver = common::connect(&args).await?;

    println!("    ✓ Connected");
    println!("    Session:  {}", driver.session_id());
    println!("    Endpoint: {}", driver.endpoint());
    if let Some(device) = driver.device() {
        println!("    Serial:   {}", device.serial());
    }
    if let Some(port) = driver.forwarded_port() {
        println!("    Forward:  tcp:{port}");
    }
    println!();

    // ========================================================================
    // Session State
    // ========================================================================

    println!("[2] Reading session state...");
    let status = driver.status().await?;
    println!("    Status: {status}");

    let size = driver.device_size().await?;
    println!("    Window: {}x{}", size.width, size.height);

    let source = driver.source().await?;
    println!("    Hierarchy: {} bytes\n", source.len());

    // ========================================================================
    // Screenshot
    // ========================================================================

    println!("[3] Taking screenshot...");
    let image = driver.screenshot().await?;
    image.save(SCREENSHOT_PATH)?;
    println!("    ✓ {}x{} saved to {SCREENSHOT_PATH}\n", image.width(), image.height());

    common::wait_for_exit(args.no_wait).await;

    // ========================================================================
    // Cleanup
    // ========================================================================

    println!("[4] Disposing...");
    driver.delete_session().await?;
    driver.dispose().await?;
    println!("    ✓ Session deleted, forward released");

    Ok(())
}
