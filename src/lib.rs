//! # waymation
//!
//! Mouse and keyboard automation for Wayland desktops.
//!
//! ## Features
//!
//! - Absolute-position clicks, drags and wheel scrolling
//! - Text typing with full Unicode support on the Wayland backend
//! - Hotkey chords (ordered press, reverse-order release)
//! - Cancellable background auto-clicking
//! - Cursor position streaming (Hyprland)
//! - Pluggable backends behind capability traits, with a recording backend
//!   for dry runs
//!
//! ## Quick Start
//!
//! ### One-shot gestures
//!
//! ```no_run
//! use waymation::Key;
//!
//! waymation::click(250.0, 300.0).expect("click failed");
//! waymation::typewrite("Hello!").expect("typing failed");
//! waymation::hotkey(&[Key::ControlLeft, Key::KeyS]).expect("hotkey failed");
//! ```
//!
//! ### Reusing a connection
//!
//! Every one-shot call connects a fresh backend. Scripts doing more than a
//! couple of actions should hold a [`Session`]:
//!
//! ```no_run
//! use std::time::Duration;
//! use waymation::{Button, Session, SwipeSpeed};
//!
//! let mut session = Session::new().expect("no input backend");
//! session.click(100.0, 100.0, Button::Left).unwrap();
//! session.swipe(100.0, 100.0, 500.0, 100.0, SwipeSpeed::Fast).unwrap();
//! session.typewrite("done", Duration::from_millis(50)).unwrap();
//! ```
//!
//! ## Backends
//!
//! Injection goes through one of two backends, tried in order:
//!
//! 1. **wayland** - the `zwlr_virtual_pointer_v1` and
//!    `zwp_virtual_keyboard_v1` protocols. Works on wlroots-based
//!    compositors (Hyprland, Sway, river) with no special privileges.
//! 2. **uinput** - a virtual kernel input device. Works on any compositor
//!    but needs write access to `/dev/uinput`, typically via membership in
//!    the `input` group.
//!
//! Set `WAYMATION_BACKEND=wayland` or `WAYMATION_BACKEND=uinput` to skip
//! the probing and force one.
//!
//! Cursor position queries are separate from injection and currently
//! require Hyprland's IPC socket; see [`mouse_position`] and [`positions`].

pub mod backend;
pub mod channel;
pub mod cursor;
pub mod error;
pub mod keyboard;
pub mod keycode;
pub mod pointer;
pub mod session;

// Re-exports
pub use channel::{
    PositionChannelHandle, positions_channel, positions_channel_with_source,
    positions_unbounded_channel, positions_unbounded_channel_with_source,
};
#[cfg(feature = "tokio")]
pub use channel::{positions_async_channel, positions_async_channel_with_source};
pub use cursor::{PositionSource, Positions, mouse_position, positions, positions_with_source};
pub use error::{Error, Result};
pub use keyboard::KeyboardInput;
pub use keycode::Key;
pub use pointer::{Button, ClickSchedule, PointerInput, SwipeSpeed};
pub use session::{
    AutoClicker, Backend, Session, VERSION, auto_click, click, click_with, hotkey, press,
    print_usage, swipe, swipe_with_speed, typewrite, typewrite_with_interval,
};
