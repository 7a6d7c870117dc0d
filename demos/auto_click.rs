//! Background auto-clicker example with Ctrl+C cancellation.
//!
//! Run with: cargo run --example auto_click
//!
//! Position your cursor over the click target during the initial delay.

use std::sync::mpsc;
use std::time::Duration;
use waymation::{AutoClicker, ClickSchedule};

fn main() {
    println!("waymation auto-click example");
    println!("============================\n");
    println!("You have 3 seconds to position the cursor.");
    println!("Clicking every 100 ms for 30 seconds. Press Ctrl+C to stop early.\n");

    let schedule = ClickSchedule::new().with_duration(Duration::from_secs(30));

    let clicker = match AutoClicker::spawn(schedule) {
        Ok(clicker) => clicker,
        Err(e) => {
            eprintln!("Could not connect an input backend: {}", e);
            return;
        }
    };

    // Handle Ctrl+C
    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .expect("Error setting Ctrl-C handler");

    // Wake up periodically so we notice when the schedule runs out.
    while clicker.is_running() {
        if rx.recv_timeout(Duration::from_millis(200)).is_ok() {
            println!("\nStopping...");
            break;
        }
    }

    match clicker.stop() {
        Ok(()) => println!("Auto-click finished."),
        Err(e) => eprintln!("Auto-click failed: {}", e),
    }
}
