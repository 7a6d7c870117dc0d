//! Recording backend for tests and dry runs.

use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::keyboard::KeyboardInput;
use crate::keycode::Key;
use crate::pointer::{Button, PointerInput};

/// A primitive operation observed by a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    ButtonPress(Button),
    ButtonRelease(Button),
    MoveTo(f64, f64),
    Scroll(i32, i32),
    KeyPress(Key),
    KeyRelease(Key),
}

/// Backend that records every primitive instead of injecting it.
///
/// Useful for dry-running scripts and for asserting forwarding behavior in
/// tests. The op log is shared through an `Arc` so it stays readable after
/// the backend is boxed into a session. Failure can be armed for one
/// specific operation index or for every operation.
pub struct RecordingBackend {
    log: Arc<Mutex<Vec<Op>>>,
    attempts: usize,
    fail_at: Option<usize>,
    fail_always: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        RecordingBackend {
            log: Arc::new(Mutex::new(Vec::new())),
            attempts: 0,
            fail_at: None,
            fail_always: false,
        }
    }

    /// Handle to the shared op log. Clone before moving the backend into a
    /// session.
    pub fn log(&self) -> Arc<Mutex<Vec<Op>>> {
        Arc::clone(&self.log)
    }

    /// Fail the operation with the given zero-based index; operations
    /// before and after it succeed.
    pub fn set_fail_at(&mut self, index: usize) {
        self.fail_at = Some(index);
    }

    /// Fail every operation from now on.
    pub fn set_fail_always(&mut self, fail: bool) {
        self.fail_always = fail;
    }

    fn record(&mut self, op: Op) -> Result<()> {
        let index = self.attempts;
        self.attempts += 1;
        if self.fail_always || self.fail_at == Some(index) {
            return Err(Error::InjectFailed(format!("mock failure at op {index}")));
        }
        self.log
            .lock()
            .map_err(|_| Error::ThreadError("op log poisoned".into()))?
            .push(op);
        Ok(())
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerInput for RecordingBackend {
    fn press_button(&mut self, button: Button) -> Result<()> {
        self.record(Op::ButtonPress(button))
    }

    fn release_button(&mut self, button: Button) -> Result<()> {
        self.record(Op::ButtonRelease(button))
    }

    fn move_to(&mut self, x: f64, y: f64) -> Result<()> {
        self.record(Op::MoveTo(x, y))
    }

    fn scroll(&mut self, dx: i32, dy: i32) -> Result<()> {
        self.record(Op::Scroll(dx, dy))
    }
}

impl KeyboardInput for RecordingBackend {
    fn press_key(&mut self, key: Key) -> Result<()> {
        self.record(Op::KeyPress(key))
    }

    fn release_key(&mut self, key: Key) -> Result<()> {
        self.record(Op::KeyRelease(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_ops_in_order() {
        let mut backend = RecordingBackend::new();
        let log = backend.log();
        backend.move_to(1.0, 2.0).unwrap();
        backend.press_button(Button::Left).unwrap();
        backend.press_key(Key::KeyQ).unwrap();

        let ops = log.lock().unwrap();
        assert_eq!(
            *ops,
            vec![
                Op::MoveTo(1.0, 2.0),
                Op::ButtonPress(Button::Left),
                Op::KeyPress(Key::KeyQ),
            ]
        );
    }

    #[test]
    fn test_fail_always() {
        let mut backend = RecordingBackend::new();
        backend.set_fail_always(true);
        assert!(matches!(
            backend.press_button(Button::Left),
            Err(Error::InjectFailed(_))
        ));
        assert!(backend.log().lock().unwrap().is_empty());
    }

    #[test]
    fn test_fail_at_affects_single_op() {
        let mut backend = RecordingBackend::new();
        backend.set_fail_at(1);
        let log = backend.log();
        backend.scroll(0, 1).unwrap();
        assert!(backend.scroll(0, 2).is_err());
        backend.scroll(0, 3).unwrap();

        let ops = log.lock().unwrap();
        assert_eq!(*ops, vec![Op::Scroll(0, 1), Op::Scroll(0, 3)]);
    }
}
