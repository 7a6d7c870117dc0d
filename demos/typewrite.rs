//! Text typing example.
//!
//! Run with: cargo run --example typewrite
//!
//! Focus a text field during the countdown. The second string exercises
//! characters outside ASCII, which only the Wayland backend can type.

use std::thread::sleep;
use std::time::Duration;
use waymation::Session;

fn main() -> waymation::Result<()> {
    println!("waymation typewrite example");
    println!("===========================\n");
    println!("Focus a text input. Typing starts in 3 seconds...\n");

    sleep(Duration::from_secs(3));

    let mut session = Session::new()?;

    println!("Typing ASCII with a 50 ms interval...");
    session.typewrite("Hello from waymation!\n", Duration::from_millis(50))?;

    println!("Typing Unicode as fast as possible...");
    if let Err(e) = session.typewrite("naïve café für 42 €\n", Duration::ZERO) {
        eprintln!("   Error: {} (expected on the uinput backend)", e);
    }

    println!("\nDone!");
    Ok(())
}
