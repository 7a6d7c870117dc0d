//! Wayland virtual-device backend.
//!
//! Injects input through the `zwlr_virtual_pointer_v1` and
//! `zwp_virtual_keyboard_v1` protocols, which wlroots-based compositors
//! (Hyprland, Sway, river) expose to unprivileged clients. No special OS
//! permissions are needed, but the compositor must offer both globals.
//!
//! Absolute pointer motion is expressed against the bounding box of all
//! advertised outputs, so multi-monitor layouts address the full desktop in
//! logical pixels. Keyboard input rides on a dynamically grown keymap (see
//! [`super::keymap`]); modifier keys additionally mirror their state through
//! the `modifiers` request so chords reach applications with correct masks.

use std::collections::HashMap;
use std::os::fd::AsFd;
use std::thread;
use std::time::Instant;

use wayland_client::{
    Connection, Dispatch, EventQueue, QueueHandle, WEnum, delegate_noop,
    globals::{GlobalListContents, registry_queue_init},
    protocol::{
        wl_keyboard,
        wl_output::{self, WlOutput},
        wl_pointer,
        wl_registry::{self, WlRegistry},
        wl_seat::WlSeat,
    },
};
use wayland_protocols_misc::zwp_virtual_keyboard_v1::client::{
    zwp_virtual_keyboard_manager_v1::ZwpVirtualKeyboardManagerV1,
    zwp_virtual_keyboard_v1::ZwpVirtualKeyboardV1,
};
use wayland_protocols_wlr::virtual_pointer::v1::client::{
    zwlr_virtual_pointer_manager_v1::ZwlrVirtualPointerManagerV1,
    zwlr_virtual_pointer_v1::ZwlrVirtualPointerV1,
};

use super::keymap::{self, KeymapBuilder};
use crate::error::{Error, Result};
use crate::keyboard::KeyboardInput;
use crate::keycode::Key;
use crate::pointer::{Button, PointerInput};

/// Axis distance of one wheel detent, matching libinput's convention.
const DETENT: f64 = 15.0;

/// Extent assumed when the compositor advertises no outputs.
const FALLBACK_EXTENT: (u32, u32) = (1920, 1080);

#[derive(Debug, Default)]
struct OutputInfo {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    scale: i32,
    transposed: bool,
}

impl OutputInfo {
    /// Size in logical pixels, accounting for scale and rotation.
    fn logical_size(&self) -> (i32, i32) {
        let scale = self.scale.max(1);
        let (w, h) = if self.transposed {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };
        (w / scale, h / scale)
    }
}

/// Event-side state: the output layout the pointer extent is computed from.
/// Outputs are keyed by their registry global name.
struct ConnectionState {
    outputs: HashMap<u32, OutputInfo>,
}

impl ConnectionState {
    /// Bounding box of all outputs in logical pixels.
    fn layout_extent(&self) -> (u32, u32) {
        if self.outputs.is_empty() {
            return FALLBACK_EXTENT;
        }
        let mut max_x = 0i32;
        let mut max_y = 0i32;
        for info in self.outputs.values() {
            let (w, h) = info.logical_size();
            max_x = max_x.max(info.x + w);
            max_y = max_y.max(info.y + h);
        }
        (max_x.max(1) as u32, max_y.max(1) as u32)
    }
}

impl Dispatch<WlRegistry, GlobalListContents> for ConnectionState {
    fn event(
        state: &mut Self,
        registry: &WlRegistry,
        event: wl_registry::Event,
        _data: &GlobalListContents,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_registry::Event::Global { name, interface, version }
                if interface == "wl_output" =>
            {
                registry.bind::<WlOutput, _, _>(name, version.min(4), qh, name);
            }
            wl_registry::Event::GlobalRemove { name } => {
                if state.outputs.remove(&name).is_some() {
                    log::debug!("output global {name} removed");
                }
            }
            _ => {}
        }
    }
}

impl Dispatch<WlOutput, u32> for ConnectionState {
    fn event(
        state: &mut Self,
        _output: &WlOutput,
        event: wl_output::Event,
        name: &u32,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        let info = state.outputs.entry(*name).or_default();
        match event {
            wl_output::Event::Geometry { x, y, transform, .. } => {
                info.x = x;
                info.y = y;
                info.transposed = matches!(
                    transform,
                    WEnum::Value(
                        wl_output::Transform::_90
                            | wl_output::Transform::_270
                            | wl_output::Transform::Flipped90
                            | wl_output::Transform::Flipped270
                    )
                );
            }
            wl_output::Event::Mode { flags, width, height, .. } => {
                if flags
                    .into_result()
                    .is_ok_and(|f| f.contains(wl_output::Mode::Current))
                {
                    info.width = width;
                    info.height = height;
                }
            }
            wl_output::Event::Scale { factor } => {
                info.scale = factor;
            }
            _ => {}
        }
    }
}

delegate_noop!(ConnectionState: ignore WlSeat);
delegate_noop!(ConnectionState: ZwlrVirtualPointerManagerV1);
delegate_noop!(ConnectionState: ZwlrVirtualPointerV1);
delegate_noop!(ConnectionState: ZwpVirtualKeyboardManagerV1);
delegate_noop!(ConnectionState: ZwpVirtualKeyboardV1);

/// Injection backend speaking the wlroots virtual-device protocols.
pub struct WaylandBackend {
    conn: Connection,
    queue: EventQueue<ConnectionState>,
    state: ConnectionState,
    pointer: ZwlrVirtualPointerV1,
    keyboard: ZwpVirtualKeyboardV1,
    keymap: KeymapBuilder,
    mods: u32,
    start: Instant,
}

impl WaylandBackend {
    /// Connect to the compositor named by `$WAYLAND_DISPLAY` and create the
    /// virtual devices.
    pub fn connect() -> Result<Self> {
        let conn = Connection::connect_to_env()
            .map_err(|e| Error::ConnectFailed(format!("no wayland display: {e}")))?;
        let (globals, mut queue) = registry_queue_init::<ConnectionState>(&conn)
            .map_err(|e| Error::ConnectFailed(format!("wayland registry init failed: {e}")))?;
        let qh = queue.handle();

        // Any seat version works; the seat is only named when creating the
        // virtual devices and its own events are ignored.
        let seat: WlSeat = globals
            .bind(&qh, 1..=7, ())
            .map_err(|e| Error::ConnectFailed(format!("failed to bind wl_seat: {e}")))?;
        let pointer_mgr: ZwlrVirtualPointerManagerV1 =
            globals.bind(&qh, 1..=2, ()).map_err(|_| {
                Error::NotSupported(
                    "compositor does not expose zwlr_virtual_pointer_manager_v1; \
                     wlroots-based compositors (Hyprland, Sway, river) do"
                        .into(),
                )
            })?;
        let keyboard_mgr: ZwpVirtualKeyboardManagerV1 =
            globals.bind(&qh, 1..=1, ()).map_err(|_| {
                Error::NotSupported(
                    "compositor does not expose zwp_virtual_keyboard_manager_v1".into(),
                )
            })?;

        for global in globals.contents().clone_list() {
            if global.interface == "wl_output" {
                globals.registry().bind::<WlOutput, _, _>(
                    global.name,
                    global.version.min(4),
                    &qh,
                    global.name,
                );
            }
        }

        let pointer = pointer_mgr.create_virtual_pointer(Some(&seat), &qh, ());
        let keyboard = keyboard_mgr.create_virtual_keyboard(&seat, &qh, ());

        let mut state = ConnectionState { outputs: HashMap::new() };
        queue
            .roundtrip(&mut state)
            .map_err(|e| Error::ConnectFailed(format!("wayland roundtrip failed: {e}")))?;
        if state.outputs.is_empty() {
            log::warn!(
                "compositor advertised no outputs, assuming a {}x{} extent",
                FALLBACK_EXTENT.0,
                FALLBACK_EXTENT.1
            );
        } else {
            log::debug!("tracking {} output(s)", state.outputs.len());
        }

        let mut keymap = KeymapBuilder::new();
        // Compositors reject empty keymaps, so seed one inert entry.
        keymap.keycode_for("VoidSymbol")?;

        let mut backend = WaylandBackend {
            conn,
            queue,
            state,
            pointer,
            keyboard,
            keymap,
            mods: 0,
            start: Instant::now(),
        };
        backend.upload_keymap()?;
        Ok(backend)
    }

    fn timestamp(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    fn flush(&self) -> Result<()> {
        self.conn
            .flush()
            .map_err(|e| Error::InjectFailed(format!("wayland flush failed: {e}")))
    }

    fn upload_keymap(&mut self) -> Result<()> {
        let text = self.keymap.render();
        let (fd, size) = keymap::keymap_fd(&text)?;
        self.keyboard
            .keymap(wl_keyboard::KeymapFormat::XkbV1 as u32, fd.as_fd(), size);
        self.flush()
    }

    /// Keycode carrying `keysym`, growing and re-uploading the keymap when
    /// the keysym is new.
    fn resolve_keysym(&mut self, keysym: &str) -> Result<u16> {
        let (code, grew) = self.keymap.keycode_for(keysym)?;
        if grew {
            self.upload_keymap()?;
        }
        Ok(code)
    }

    fn send_key(&mut self, code: u32, pressed: bool) -> Result<()> {
        let state = if pressed { 1 } else { 0 };
        self.keyboard.key(self.timestamp(), code, state);
        self.flush()
    }

    fn key_state(&mut self, key: Key, pressed: bool) -> Result<()> {
        let code = match key.keysym() {
            Some(sym) => u32::from(self.resolve_keysym(sym)?),
            // Raw codes go past the keymap's last slot; clients resolve no
            // keysym for them.
            None => keymap::RAW_CODE_BASE + u32::from(key.code()),
        };
        self.send_key(code, pressed)?;

        let mask = modifier_mask(key);
        if mask != 0 {
            if pressed {
                self.mods |= mask;
            } else {
                self.mods &= !mask;
            }
            self.keyboard.modifiers(self.mods, 0, 0, 0);
            self.flush()?;
        }
        Ok(())
    }

    fn wheel(&mut self, axis: wl_pointer::Axis, detents: i32) -> Result<()> {
        let time = self.timestamp();
        self.pointer.axis_source(wl_pointer::AxisSource::Wheel);
        self.pointer
            .axis_discrete(time, axis, detents as f64 * DETENT, detents);
        self.pointer.frame();
        self.flush()
    }
}

/// X11 real-modifier mask reported for a modifier key, zero otherwise.
fn modifier_mask(key: Key) -> u32 {
    match key {
        Key::ShiftLeft | Key::ShiftRight => 1 << 0,
        Key::ControlLeft | Key::ControlRight => 1 << 2,
        Key::AltLeft | Key::AltRight => 1 << 3,
        Key::MetaLeft | Key::MetaRight => 1 << 6,
        _ => 0,
    }
}

impl PointerInput for WaylandBackend {
    fn press_button(&mut self, button: Button) -> Result<()> {
        self.pointer.button(
            self.timestamp(),
            button.code() as u32,
            wl_pointer::ButtonState::Pressed,
        );
        self.pointer.frame();
        self.flush()
    }

    fn release_button(&mut self, button: Button) -> Result<()> {
        self.pointer.button(
            self.timestamp(),
            button.code() as u32,
            wl_pointer::ButtonState::Released,
        );
        self.pointer.frame();
        self.flush()
    }

    fn move_to(&mut self, x: f64, y: f64) -> Result<()> {
        // Pick up output hotplug and mode changes before computing extents.
        self.queue
            .roundtrip(&mut self.state)
            .map_err(|e| Error::InjectFailed(format!("wayland dispatch failed: {e}")))?;
        let (ext_x, ext_y) = self.state.layout_extent();
        let cx = x.round().clamp(0.0, ext_x as f64) as u32;
        let cy = y.round().clamp(0.0, ext_y as f64) as u32;
        self.pointer
            .motion_absolute(self.timestamp(), cx, cy, ext_x, ext_y);
        self.pointer.frame();
        self.flush()
    }

    fn scroll(&mut self, dx: i32, dy: i32) -> Result<()> {
        // Positive axis values scroll down/right in the protocol.
        if dy != 0 {
            self.wheel(wl_pointer::Axis::VerticalScroll, -dy)?;
        }
        if dx != 0 {
            self.wheel(wl_pointer::Axis::HorizontalScroll, dx)?;
        }
        Ok(())
    }
}

impl KeyboardInput for WaylandBackend {
    fn press_key(&mut self, key: Key) -> Result<()> {
        self.key_state(key, true)
    }

    fn release_key(&mut self, key: Key) -> Result<()> {
        self.key_state(key, false)
    }

    /// Types through a dedicated keysym keycode, so any character within
    /// XKB's Unicode range works regardless of layout.
    fn type_char(&mut self, c: char) -> Result<()> {
        let code = u32::from(self.resolve_keysym(&keymap::char_keysym(c))?);
        self.send_key(code, true)?;
        thread::sleep(crate::pointer::HOLD);
        self.send_key(code, false)
    }
}

impl Drop for WaylandBackend {
    fn drop(&mut self) {
        self.keyboard.destroy();
        self.pointer.destroy();
        if let Err(err) = self.conn.flush() {
            log::debug!("wayland flush on drop failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(x: i32, y: i32, width: i32, height: i32, scale: i32, transposed: bool) -> OutputInfo {
        OutputInfo { x, y, width, height, scale, transposed }
    }

    #[test]
    fn test_layout_extent_single_output() {
        let mut state = ConnectionState { outputs: HashMap::new() };
        state.outputs.insert(1, output(0, 0, 1920, 1080, 1, false));
        assert_eq!(state.layout_extent(), (1920, 1080));
    }

    #[test]
    fn test_layout_extent_side_by_side() {
        let mut state = ConnectionState { outputs: HashMap::new() };
        state.outputs.insert(1, output(0, 0, 1920, 1080, 1, false));
        state.outputs.insert(2, output(1920, 0, 1280, 1024, 1, false));
        assert_eq!(state.layout_extent(), (3200, 1080));
    }

    #[test]
    fn test_layout_extent_scaled_output() {
        let mut state = ConnectionState { outputs: HashMap::new() };
        state.outputs.insert(1, output(0, 0, 3840, 2160, 2, false));
        assert_eq!(state.layout_extent(), (1920, 1080));
    }

    #[test]
    fn test_layout_extent_rotated_output() {
        let mut state = ConnectionState { outputs: HashMap::new() };
        state.outputs.insert(1, output(0, 0, 1920, 1080, 1, true));
        assert_eq!(state.layout_extent(), (1080, 1920));
    }

    #[test]
    fn test_layout_extent_without_outputs_falls_back() {
        let state = ConnectionState { outputs: HashMap::new() };
        assert_eq!(state.layout_extent(), FALLBACK_EXTENT);
    }

    #[test]
    fn test_modifier_masks() {
        assert_eq!(modifier_mask(Key::ShiftLeft), 1);
        assert_eq!(modifier_mask(Key::ControlRight), 4);
        assert_eq!(modifier_mask(Key::AltLeft), 8);
        assert_eq!(modifier_mask(Key::MetaLeft), 64);
        assert_eq!(modifier_mask(Key::KeyA), 0);
    }
}
