//! Cursor position streaming example.
//!
//! Run with: cargo run --example cursor_watch
//!
//! Requires a running Hyprland session for the position source.

use std::time::Duration;
use waymation::positions;

fn main() -> waymation::Result<()> {
    println!("waymation cursor watch");
    println!("======================\n");
    println!("Sampling the cursor 4 times a second. Move the mouse around!\n");

    let mut last = (f64::NAN, f64::NAN);
    for sample in positions(Duration::from_millis(250))?.take(40) {
        let (x, y) = sample?;
        if (x, y) != last {
            println!("cursor at ({:.0}, {:.0})", x, y);
            last = (x, y);
        }
    }

    println!("\nDone watching.");
    Ok(())
}
