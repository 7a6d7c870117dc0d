//! Dry-run example: record a script instead of injecting it.
//!
//! Run with: cargo run --example dry_run
//!
//! Nothing touches your desktop here. The recording backend captures the
//! primitive operations a script would perform, which is handy for
//! debugging gesture sequences before running them for real.

use std::time::Duration;
use waymation::backend::mock::RecordingBackend;
use waymation::{Button, Key, Session, SwipeSpeed};

fn main() -> waymation::Result<()> {
    let backend = RecordingBackend::new();
    let log = backend.log();
    let mut session = Session::with_backend(Box::new(backend));

    session.click(120.0, 80.0, Button::Left)?;
    session.swipe(120.0, 80.0, 400.0, 80.0, SwipeSpeed::Fast)?;
    session.typewrite("hi", Duration::ZERO)?;
    session.hotkey(&[Key::ControlLeft, Key::KeyS])?;

    let ops = log
        .lock()
        .map_err(|_| waymation::Error::ThreadError("op log poisoned".into()))?;
    println!("The script would perform {} operations:\n", ops.len());
    for (i, op) in ops.iter().enumerate() {
        println!("{:3}. {:?}", i + 1, op);
    }

    Ok(())
}
