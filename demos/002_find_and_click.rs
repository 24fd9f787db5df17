//! Element lookup and interaction in the Settings app.
//!
//! Demonstrates:
//! - Locating by resource id, class name and compiled `UiSelector`
//! - Reading text, attributes and bounds
//! - Scrolling a list until an entry is visible
//! - Clicking and typing
//!
//! Usage:
//!   cargo run --example 002_find_and_click
//!   cargo run --example 002_find_and_click -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use common::Args;
use uia2_driver::{By, LaunchOptions, Rect, Result, ScrollOptions, UiSelector};

// ============================================================================
// Constants
// ============================================================================

const SETTINGS: &str = "com.android.settings";

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
    println!("=== 002: Find and Click ===\n");

    let driver = common::connect(&args).await?;

    // ========================================================================
    // Launch
    // ========================================================================

    println!("[1] Launching Settings...");
    driver
        .app_launch(
            SETTINGS,
            LaunchOptions::new().wait_for(UiSelector::new().package_name(SETTINGS)),
        )
        .await?;
    println!("    ✓ {}\n", driver.active_app_activity().await?);

    // ========================================================================
    // Query
    // ========================================================================

    println!("[2] Listing text views...");
    let texts = driver
        .find_elements(By::class_name("android.widget.TextView"))
        .await?;
    for element in texts.iter().take(5) {
        let bounds = element.rect().await.unwrap_or(Rect::INVALID);
        println!("    - {:?} at {bounds:?}", element.text().await?);
    }
    println!();

    // ========================================================================
    // Scroll
    // ========================================================================

    println!("[3] Scrolling to 'About phone'...");
    let about = UiSelector::new().text_contains("About");
    driver
        .scroll_to(about.clone(), ScrollOptions::new().with_max_swipes(10))
        .await?;

    let entry = driver.find_element(&about).await?;
    println!("    Found:     {}", entry.text().await?);
    println!("    Clickable: {}", entry.can_click().await);
    entry.click().await?;
    println!("    ✓ Clicked\n");

    driver.press_back().await?;

    // ========================================================================
    // Search
    // ========================================================================

    println!("[4] Typing into search...");
    let search = driver
        .find_element(UiSelector::new().resource_id_matches(".*search.*"))
        .await;
    match search {
        Ok(field) => {
            field.click().await?;
            let input = driver.wait_for_element(By::class_name("android.widget.EditText")).await?;
            input.send_keys("wifi").await?;
            println!("    ✓ Typed: {}", input.text().await?);
        }
        Err(e) => println!("    - No search field: {e}"),
    }
    println!();

    common::wait_for_exit(args.no_wait).await;

    driver.app_terminate(SETTINGS).await?;
    driver.dispose().await?;
    Ok(())
}
