//! Kernel uinput backend.
//!
//! Creates a virtual evdev device to inject keyboard and mouse events
//! through the kernel input layer. Works under any compositor, but needs
//! write access to /dev/uinput.
//!
//! ## Permissions
//!
//! ```bash
//! sudo usermod -aG input $USER
//! # Then log out and back in, or add a udev rule for /dev/uinput
//! ```
//!
//! ## Absolute positioning
//!
//! The virtual device is relative, like a real mouse. Absolute moves are
//! emulated with a corner reset: a jump far past the top-left corner, which
//! the compositor clamps at (0,0), followed by the target offset. Non-flat
//! pointer acceleration profiles can distort the second jump.

use std::thread;
use std::time::Duration;

use evdev::{
    AttributeSet, EventType as EvdevEventType, InputEvent, Key as EvdevKey, RelativeAxisType,
    uinput::{VirtualDevice, VirtualDeviceBuilder},
};

use crate::error::{Error, Result};
use crate::keyboard::KeyboardInput;
use crate::keycode::Key;
use crate::pointer::{Button, PointerInput};

/// Wait after device creation so the compositor has picked the device up
/// before the first event.
const SETTLE: Duration = Duration::from_millis(500);

/// Relative jump large enough to pin the cursor at the top-left corner of
/// any realistic desktop.
const CORNER_RESET: i32 = 32_768;

/// Injection backend backed by a kernel uinput virtual device.
pub struct UinputBackend {
    device: VirtualDevice,
}

impl UinputBackend {
    /// Create the virtual device and wait for it to register.
    pub fn create() -> Result<Self> {
        let mut keys = AttributeSet::<EvdevKey>::new();
        for code in 1..256 {
            keys.insert(EvdevKey::new(code));
        }
        keys.insert(EvdevKey::BTN_LEFT);
        keys.insert(EvdevKey::BTN_RIGHT);
        keys.insert(EvdevKey::BTN_MIDDLE);
        keys.insert(EvdevKey::BTN_SIDE);
        keys.insert(EvdevKey::BTN_EXTRA);

        let mut rel_axes = AttributeSet::<RelativeAxisType>::new();
        rel_axes.insert(RelativeAxisType::REL_X);
        rel_axes.insert(RelativeAxisType::REL_Y);
        rel_axes.insert(RelativeAxisType::REL_WHEEL);
        rel_axes.insert(RelativeAxisType::REL_HWHEEL);

        let device = VirtualDeviceBuilder::new()
            .map_err(|e| Error::ConnectFailed(format!("could not open /dev/uinput: {e}")))?
            .name("waymation virtual input")
            .with_keys(&keys)
            .map_err(|e| Error::ConnectFailed(format!("could not register keys: {e}")))?
            .with_relative_axes(&rel_axes)
            .map_err(|e| Error::ConnectFailed(format!("could not register relative axes: {e}")))?
            .build()
            .map_err(|e| {
                Error::PermissionDenied(format!(
                    "could not create the uinput device: {e}; join the 'input' group \
                     or add a udev rule granting /dev/uinput access"
                ))
            })?;

        log::debug!("uinput virtual device created, settling for {SETTLE:?}");
        thread::sleep(SETTLE);
        Ok(UinputBackend { device })
    }

    fn emit_key(&mut self, code: u16, pressed: bool) -> Result<()> {
        let value = if pressed { 1 } else { 0 };
        let events = [
            InputEvent::new(EvdevEventType::KEY, code, value),
            // SYN_REPORT to flush
            InputEvent::new(EvdevEventType::SYNCHRONIZATION, 0, 0),
        ];
        self.device
            .emit(&events)
            .map_err(|e| Error::InjectFailed(format!("failed to emit key event: {e}")))
    }

    fn emit_motion(&mut self, dx: i32, dy: i32) -> Result<()> {
        let events = [
            InputEvent::new(EvdevEventType::RELATIVE, RelativeAxisType::REL_X.0, dx),
            InputEvent::new(EvdevEventType::RELATIVE, RelativeAxisType::REL_Y.0, dy),
            InputEvent::new(EvdevEventType::SYNCHRONIZATION, 0, 0),
        ];
        self.device
            .emit(&events)
            .map_err(|e| Error::InjectFailed(format!("failed to emit motion event: {e}")))
    }

    fn emit_wheel(&mut self, axis: RelativeAxisType, detents: i32) -> Result<()> {
        let events = [
            InputEvent::new(EvdevEventType::RELATIVE, axis.0, detents),
            InputEvent::new(EvdevEventType::SYNCHRONIZATION, 0, 0),
        ];
        self.device
            .emit(&events)
            .map_err(|e| Error::InjectFailed(format!("failed to emit wheel event: {e}")))
    }
}

fn button_to_evdev_key(button: Button) -> EvdevKey {
    match button {
        Button::Left => EvdevKey::BTN_LEFT,
        Button::Right => EvdevKey::BTN_RIGHT,
        Button::Middle => EvdevKey::BTN_MIDDLE,
        Button::Side => EvdevKey::BTN_SIDE,
        Button::Extra => EvdevKey::BTN_EXTRA,
    }
}

impl PointerInput for UinputBackend {
    fn press_button(&mut self, button: Button) -> Result<()> {
        self.emit_key(button_to_evdev_key(button).code(), true)
    }

    fn release_button(&mut self, button: Button) -> Result<()> {
        self.emit_key(button_to_evdev_key(button).code(), false)
    }

    fn move_to(&mut self, x: f64, y: f64) -> Result<()> {
        self.emit_motion(-CORNER_RESET, -CORNER_RESET)?;
        self.emit_motion(x.round() as i32, y.round() as i32)
    }

    fn scroll(&mut self, dx: i32, dy: i32) -> Result<()> {
        if dy != 0 {
            self.emit_wheel(RelativeAxisType::REL_WHEEL, dy)?;
        }
        if dx != 0 {
            self.emit_wheel(RelativeAxisType::REL_HWHEEL, dx)?;
        }
        Ok(())
    }
}

impl KeyboardInput for UinputBackend {
    fn press_key(&mut self, key: Key) -> Result<()> {
        self.emit_key(key.code(), true)
    }

    fn release_key(&mut self, key: Key) -> Result<()> {
        self.emit_key(key.code(), false)
    }
}
