//! Swipe example: the same drag at all three speeds.
//!
//! Run with: cargo run --example swipe
//!
//! WARNING: This will actually drag your mouse!

use std::thread::sleep;
use std::time::Duration;
use waymation::{Session, SwipeSpeed};

fn main() -> waymation::Result<()> {
    println!("waymation swipe example");
    println!("=======================\n");
    println!("Dragging from (200, 400) to (800, 400) at each speed.");
    println!("Starting in 3 seconds... (Press Ctrl+C to cancel)\n");

    sleep(Duration::from_secs(3));

    let mut session = Session::new()?;

    for speed in [SwipeSpeed::Slow, SwipeSpeed::Normal, SwipeSpeed::Fast] {
        println!("Swiping at {:?} speed...", speed);
        session.swipe(200.0, 400.0, 800.0, 400.0, speed)?;
        sleep(Duration::from_millis(800));
    }

    println!("\nDone!");
    Ok(())
}
