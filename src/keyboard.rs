//! Keyboard capability trait.

use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::keycode::Key;
use crate::pointer::HOLD;

/// Spacing between successive presses inside a chord.
const CHORD_STAGGER: Duration = Duration::from_millis(15);

/// Keyboard synthesis capability.
///
/// Backends implement press and release; typing and chords are default
/// methods composed from them. Backends with native text entry (the Wayland
/// keymap path) override [`KeyboardInput::type_char`].
pub trait KeyboardInput: Send {
    /// Press a key without releasing it.
    fn press_key(&mut self, key: Key) -> Result<()>;

    /// Release a previously pressed key.
    fn release_key(&mut self, key: Key) -> Result<()>;

    /// Press and release a key once.
    fn tap_key(&mut self, key: Key) -> Result<()> {
        self.press_key(key)?;
        thread::sleep(HOLD);
        self.release_key(key)
    }

    /// Type a single character. The default resolves through the US-layout
    /// map with shift wrapping; characters outside that map are rejected
    /// with [`Error::UnsupportedChar`].
    fn type_char(&mut self, c: char) -> Result<()> {
        let (key, shifted) = Key::from_char(c).ok_or(Error::UnsupportedChar(c))?;
        if shifted {
            self.press_key(Key::ShiftLeft)?;
            let tapped = self.tap_key(key);
            let released = self.release_key(Key::ShiftLeft);
            tapped?;
            released
        } else {
            self.tap_key(key)
        }
    }

    /// Type a string, sleeping `interval` between characters. A zero
    /// interval types back to back with no sleeps at all.
    fn type_text(&mut self, text: &str, interval: Duration) -> Result<()> {
        for (i, c) in text.chars().enumerate() {
            if i > 0 && !interval.is_zero() {
                thread::sleep(interval);
            }
            self.type_char(c)?;
        }
        Ok(())
    }

    /// Press keys in order, then release them in reverse order.
    ///
    /// If a press fails partway, keys already held are released best-effort
    /// before the press error is returned.
    fn chord(&mut self, keys: &[Key]) -> Result<()> {
        for (i, &key) in keys.iter().enumerate() {
            if i > 0 {
                thread::sleep(CHORD_STAGGER);
            }
            if let Err(err) = self.press_key(key) {
                for &held in keys[..i].iter().rev() {
                    if let Err(release_err) = self.release_key(held) {
                        log::warn!("failed to release {held:?} while unwinding chord: {release_err}");
                    }
                }
                return Err(err);
            }
        }
        thread::sleep(HOLD);

        let mut first_err = None;
        for &key in keys.iter().rev() {
            if let Err(err) = self.release_key(key) {
                log::warn!("failed to release {key:?} in chord: {err}");
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{Op, RecordingBackend};

    #[test]
    fn test_tap_key_press_then_release() {
        let mut backend = RecordingBackend::new();
        let log = backend.log();
        backend.tap_key(Key::KeyA).unwrap();

        let ops = log.lock().unwrap();
        assert_eq!(*ops, vec![Op::KeyPress(Key::KeyA), Op::KeyRelease(Key::KeyA)]);
    }

    #[test]
    fn test_type_text_plain_chars_in_order() {
        let mut backend = RecordingBackend::new();
        let log = backend.log();
        backend.type_text("ab", Duration::ZERO).unwrap();

        let ops = log.lock().unwrap();
        assert_eq!(
            *ops,
            vec![
                Op::KeyPress(Key::KeyA),
                Op::KeyRelease(Key::KeyA),
                Op::KeyPress(Key::KeyB),
                Op::KeyRelease(Key::KeyB),
            ]
        );
    }

    #[test]
    fn test_type_text_wraps_shifted_chars() {
        let mut backend = RecordingBackend::new();
        let log = backend.log();
        backend.type_text("A", Duration::ZERO).unwrap();

        let ops = log.lock().unwrap();
        assert_eq!(
            *ops,
            vec![
                Op::KeyPress(Key::ShiftLeft),
                Op::KeyPress(Key::KeyA),
                Op::KeyRelease(Key::KeyA),
                Op::KeyRelease(Key::ShiftLeft),
            ]
        );
    }

    #[test]
    fn test_type_text_rejects_unmapped_char() {
        let mut backend = RecordingBackend::new();
        let result = backend.type_text("café", Duration::ZERO);
        assert!(matches!(result, Err(Error::UnsupportedChar('é'))));
    }

    #[test]
    fn test_chord_presses_in_order_releases_in_reverse() {
        let mut backend = RecordingBackend::new();
        let log = backend.log();
        backend.chord(&[Key::ControlLeft, Key::KeyS]).unwrap();

        let ops = log.lock().unwrap();
        assert_eq!(
            *ops,
            vec![
                Op::KeyPress(Key::ControlLeft),
                Op::KeyPress(Key::KeyS),
                Op::KeyRelease(Key::KeyS),
                Op::KeyRelease(Key::ControlLeft),
            ]
        );
    }

    #[test]
    fn test_chord_three_keys() {
        let mut backend = RecordingBackend::new();
        let log = backend.log();
        backend
            .chord(&[Key::ControlLeft, Key::ShiftLeft, Key::KeyT])
            .unwrap();

        let ops = log.lock().unwrap();
        assert_eq!(ops.len(), 6);
        assert_eq!(ops[0], Op::KeyPress(Key::ControlLeft));
        assert_eq!(ops[2], Op::KeyPress(Key::KeyT));
        assert_eq!(ops[3], Op::KeyRelease(Key::KeyT));
        assert_eq!(ops[5], Op::KeyRelease(Key::ControlLeft));
    }

    #[test]
    fn test_chord_unwinds_held_keys_when_press_fails() {
        let mut backend = RecordingBackend::new();
        backend.set_fail_at(2);
        let log = backend.log();
        let result = backend.chord(&[Key::ControlLeft, Key::ShiftLeft, Key::KeyT]);
        assert!(matches!(result, Err(Error::InjectFailed(_))));

        let ops = log.lock().unwrap();
        assert_eq!(
            *ops,
            vec![
                Op::KeyPress(Key::ControlLeft),
                Op::KeyPress(Key::ShiftLeft),
                Op::KeyRelease(Key::ShiftLeft),
                Op::KeyRelease(Key::ControlLeft),
            ]
        );
    }

    #[test]
    fn test_chord_empty_is_no_op() {
        let mut backend = RecordingBackend::new();
        let log = backend.log();
        backend.chord(&[]).unwrap();
        assert!(log.lock().unwrap().is_empty());
    }
}
