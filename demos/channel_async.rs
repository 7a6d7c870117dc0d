//! Async cursor channel example with Tokio.
//!
//! Run with: cargo run --example channel_async --features tokio
//!
//! Requires a running Hyprland session for the position source.

use std::time::Duration;
use tokio::time::interval;
use waymation::positions_async_channel;

#[tokio::main]
async fn main() {
    println!("waymation cursor channel example (async/tokio)");
    println!("==============================================\n");
    println!("Positions arrive on a tokio channel. Press Ctrl+C to exit.\n");

    let (handle, mut rx) = match positions_async_channel(100, Duration::from_millis(100)) {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("No cursor source: {}", e);
            return;
        }
    };

    let mut sample_count = 0u32;
    let mut heartbeat = interval(Duration::from_secs(5));

    loop {
        tokio::select! {
            sample = rx.recv() => {
                match sample {
                    Some((x, y)) => {
                        sample_count += 1;
                        // Only print every 10th sample to keep the output calm
                        if sample_count % 10 == 0 {
                            println!("[{}] cursor at ({:.0}, {:.0})", sample_count, x, y);
                        }
                    }
                    None => {
                        println!("Channel closed, sampler stopped.");
                        break;
                    }
                }
            }

            _ = heartbeat.tick() => {
                println!("... heartbeat ({} samples so far)", sample_count);
            }
        }
    }

    let _ = handle.stop();
}
