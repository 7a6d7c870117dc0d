//! Basic gesture example.
//!
//! Run with: cargo run --example basic
//!
//! WARNING: This will actually move your mouse and type keys!

use std::thread::sleep;
use std::time::Duration;
use waymation::{Button, Key, Session};

fn main() {
    println!("waymation basic example");
    println!("=======================\n");
    println!("WARNING: This will move your mouse and simulate key presses!\n");
    println!("Starting in 3 seconds... (Press Ctrl+C to cancel)\n");

    sleep(Duration::from_secs(3));

    let mut session = match Session::new() {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Could not connect an input backend: {}", e);
            return;
        }
    };

    // Example 1: Move the cursor
    println!("1. Moving cursor to (100, 100)...");
    if let Err(e) = session.move_to(100.0, 100.0) {
        eprintln!("   Error: {}", e);
    } else {
        println!("   Done!");
    }
    sleep(Duration::from_millis(500));

    // Example 2: Click
    println!("2. Left clicking at (200, 200)...");
    if let Err(e) = session.click(200.0, 200.0, Button::Left) {
        eprintln!("   Error: {}", e);
    } else {
        println!("   Done!");
    }
    sleep(Duration::from_millis(500));

    // Example 3: Scroll
    println!("3. Scrolling down two detents...");
    if let Err(e) = session.scroll(0, -2) {
        eprintln!("   Error: {}", e);
    } else {
        println!("   Done!");
    }
    sleep(Duration::from_millis(500));

    // Example 4: Tap a key
    println!("4. Pressing and releasing 'A'...");
    if let Err(e) = session.press(Key::KeyA) {
        eprintln!("   Error: {}", e);
    } else {
        println!("   Done!");
    }
    sleep(Duration::from_millis(500));

    // Example 5: Hotkey chord
    println!("5. Pressing Ctrl+S...");
    if let Err(e) = session.hotkey(&[Key::ControlLeft, Key::KeyS]) {
        eprintln!("   Error: {}", e);
    } else {
        println!("   Done!");
    }

    println!("\nAll gestures sent!");
}
