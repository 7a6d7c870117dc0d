//! Cursor position polling.
//!
//! Wayland deliberately hides the global cursor from clients, so position
//! readback is compositor-specific. The default source queries Hyprland's
//! IPC socket; other compositors can plug in through [`PositionSource`].

use std::thread;
use std::time::Duration;

use crate::backend::hyprland::HyprlandCursor;
use crate::error::{Error, Result};

/// Source of absolute cursor positions in desktop pixels.
pub trait PositionSource: Send {
    /// Sample the current cursor position.
    fn position(&mut self) -> Result<(f64, f64)>;
}

/// Connect the default position source for the running compositor.
pub fn default_source() -> Result<Box<dyn PositionSource>> {
    if HyprlandCursor::available() {
        return Ok(Box::new(HyprlandCursor::find()?));
    }
    Err(Error::CursorUnavailable(
        "no position source for this compositor (cursor queries work under Hyprland)".into(),
    ))
}

/// Sample the cursor position once from the default source.
pub fn mouse_position() -> Result<(f64, f64)> {
    default_source()?.position()
}

/// Infinite iterator of cursor samples; see [`positions`].
pub struct Positions {
    source: Box<dyn PositionSource>,
    interval: Duration,
    started: bool,
}

impl Iterator for Positions {
    type Item = Result<(f64, f64)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.started && !self.interval.is_zero() {
            thread::sleep(self.interval);
        }
        self.started = true;
        Some(self.source.position())
    }
}

/// Stream cursor positions from the default source.
///
/// The first sample is taken immediately and later samples are spaced by
/// `interval`. The stream never ends on its own; sampling failures surface
/// as `Err` items and the caller decides whether to continue. Drop the
/// iterator to stop sampling.
pub fn positions(interval: Duration) -> Result<Positions> {
    Ok(positions_with_source(default_source()?, interval))
}

/// Stream cursor positions from a caller-provided source.
pub fn positions_with_source(source: Box<dyn PositionSource>, interval: Duration) -> Positions {
    Positions {
        source,
        interval,
        started: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    struct ScriptedSource {
        samples: Vec<(f64, f64)>,
    }

    impl ScriptedSource {
        fn new(mut samples: Vec<(f64, f64)>) -> Self {
            samples.reverse();
            ScriptedSource { samples }
        }
    }

    impl PositionSource for ScriptedSource {
        fn position(&mut self) -> Result<(f64, f64)> {
            self.samples
                .pop()
                .ok_or_else(|| Error::CursorUnavailable("script exhausted".into()))
        }
    }

    #[test]
    fn test_positions_yield_samples_in_order() {
        let source = ScriptedSource::new(vec![(1.0, 2.0), (3.0, 4.0)]);
        let mut stream = positions_with_source(Box::new(source), Duration::ZERO);
        assert_eq!(stream.next().unwrap().unwrap(), (1.0, 2.0));
        assert_eq!(stream.next().unwrap().unwrap(), (3.0, 4.0));
    }

    #[test]
    fn test_positions_surface_source_errors() {
        let source = ScriptedSource::new(vec![(1.0, 2.0)]);
        let mut stream = positions_with_source(Box::new(source), Duration::ZERO);
        assert!(stream.next().unwrap().is_ok());
        assert!(matches!(
            stream.next().unwrap(),
            Err(Error::CursorUnavailable(_))
        ));
    }

    #[test]
    fn test_positions_pace_after_first_sample() {
        let source = ScriptedSource::new(vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        let mut stream = positions_with_source(Box::new(source), Duration::from_millis(10));
        let start = Instant::now();
        stream.next();
        let first = start.elapsed();
        stream.next();
        stream.next();
        let all = start.elapsed();
        assert!(first < Duration::from_millis(10), "first sample should be immediate");
        assert!(all >= Duration::from_millis(20), "later samples should be paced");
    }
}
