//! Injection backends.
//!
//! Two real backends exist behind cargo features:
//! - **wayland** (default): wlr virtual-device protocols; unprivileged, but
//!   the compositor must expose the globals
//! - **uinput** (default): kernel virtual device; works under any
//!   compositor, needs /dev/uinput access
//!
//! [`default_backend`] probes Wayland first and falls back to uinput.
//! Setting `WAYMATION_BACKEND=wayland` or `WAYMATION_BACKEND=uinput`
//! skips probing and forces one. The recording backend is always compiled
//! for dry runs and tests, and [`hyprland`] provides cursor readback.

pub mod hyprland;
pub mod mock;

#[cfg(all(target_os = "linux", feature = "uinput"))]
pub mod uinput;

#[cfg(all(target_os = "linux", feature = "wayland"))]
mod keymap;
#[cfg(all(target_os = "linux", feature = "wayland"))]
pub mod wayland;

#[cfg(not(target_os = "linux"))]
compile_error!("waymation only supports Linux Wayland desktops");

use crate::error::{Error, Result};
use crate::session::Backend;

const WAYLAND_COMPILED: bool = cfg!(all(target_os = "linux", feature = "wayland"));
const UINPUT_COMPILED: bool = cfg!(all(target_os = "linux", feature = "uinput"));

/// Environment variable forcing the backend choice.
pub const BACKEND_ENV: &str = "WAYMATION_BACKEND";

#[cfg(all(target_os = "linux", feature = "wayland"))]
fn connect_wayland() -> Result<Box<dyn Backend>> {
    Ok(Box::new(wayland::WaylandBackend::connect()?))
}

#[cfg(not(all(target_os = "linux", feature = "wayland")))]
fn connect_wayland() -> Result<Box<dyn Backend>> {
    Err(Error::NotSupported(
        "this build lacks the 'wayland' feature".into(),
    ))
}

#[cfg(all(target_os = "linux", feature = "uinput"))]
fn connect_uinput() -> Result<Box<dyn Backend>> {
    Ok(Box::new(uinput::UinputBackend::create()?))
}

#[cfg(not(all(target_os = "linux", feature = "uinput")))]
fn connect_uinput() -> Result<Box<dyn Backend>> {
    Err(Error::NotSupported(
        "this build lacks the 'uinput' feature".into(),
    ))
}

/// Select and connect the default injection backend.
pub fn default_backend() -> Result<Box<dyn Backend>> {
    if !WAYLAND_COMPILED && !UINPUT_COMPILED {
        return Err(Error::NotSupported(
            "no injection backend enabled; rebuild with the 'wayland' or 'uinput' feature".into(),
        ));
    }
    match std::env::var(BACKEND_ENV) {
        Ok(choice) => backend_by_name(&choice),
        Err(_) => probe_backends(),
    }
}

fn backend_by_name(name: &str) -> Result<Box<dyn Backend>> {
    match name.to_ascii_lowercase().as_str() {
        "wayland" => {
            log::info!("backend forced to wayland by {BACKEND_ENV}");
            connect_wayland()
        }
        "uinput" => {
            log::info!("backend forced to uinput by {BACKEND_ENV}");
            connect_uinput()
        }
        other => Err(Error::NotSupported(format!(
            "unknown {BACKEND_ENV} value {other:?} (expected \"wayland\" or \"uinput\")"
        ))),
    }
}

fn probe_backends() -> Result<Box<dyn Backend>> {
    match connect_wayland() {
        Ok(backend) => {
            log::info!("using wayland virtual-device backend");
            Ok(backend)
        }
        Err(wayland_err) => {
            log::debug!("wayland backend unavailable: {wayland_err}");
            match connect_uinput() {
                Ok(backend) => {
                    log::info!("using uinput backend");
                    Ok(backend)
                }
                Err(uinput_err) => {
                    log::debug!("uinput backend unavailable: {uinput_err}");
                    // Surface the error of the last compiled backend tried;
                    // both are in the debug log.
                    if UINPUT_COMPILED {
                        Err(uinput_err)
                    } else {
                        Err(wayland_err)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_by_name_rejects_unknown() {
        let result = backend_by_name("x11");
        assert!(matches!(result, Err(Error::NotSupported(_))));
    }
}
