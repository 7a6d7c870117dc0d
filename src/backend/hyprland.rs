//! Hyprland IPC cursor position source.
//!
//! Core Wayland has no global cursor query and the virtual-pointer protocol
//! is write-only, so position readback goes through the compositor.
//! Hyprland answers `j/cursorpos` on its request socket with a JSON point.
//! The socket serves one command per connection, so every sample opens a
//! fresh stream.

use std::env;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

use serde::Deserialize;

use crate::cursor::PositionSource;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct CursorPos {
    x: f64,
    y: f64,
}

/// Cursor source backed by the request socket of a running Hyprland
/// instance.
pub struct HyprlandCursor {
    socket: PathBuf,
}

impl HyprlandCursor {
    /// Locate the request socket from `$XDG_RUNTIME_DIR` and
    /// `$HYPRLAND_INSTANCE_SIGNATURE`.
    pub fn find() -> Result<Self> {
        let runtime_dir = env::var("XDG_RUNTIME_DIR")
            .map_err(|_| Error::CursorUnavailable("XDG_RUNTIME_DIR is not set".into()))?;
        let signature = env::var("HYPRLAND_INSTANCE_SIGNATURE").map_err(|_| {
            Error::CursorUnavailable(
                "HYPRLAND_INSTANCE_SIGNATURE is not set (not running under Hyprland)".into(),
            )
        })?;
        let socket = PathBuf::from(runtime_dir)
            .join("hypr")
            .join(signature)
            .join(".socket.sock");
        Ok(HyprlandCursor { socket })
    }

    /// Whether the environment points at a Hyprland instance.
    pub fn available() -> bool {
        env::var_os("HYPRLAND_INSTANCE_SIGNATURE").is_some()
            && env::var_os("XDG_RUNTIME_DIR").is_some()
    }

    fn request(&self, command: &str) -> Result<String> {
        let mut stream = UnixStream::connect(&self.socket).map_err(|e| {
            Error::CursorUnavailable(format!(
                "cannot reach hyprland socket {}: {e}",
                self.socket.display()
            ))
        })?;
        stream.write_all(command.as_bytes())?;
        let mut reply = String::new();
        stream.read_to_string(&mut reply)?;
        Ok(reply)
    }
}

fn parse_cursorpos(reply: &str) -> Result<(f64, f64)> {
    let pos: CursorPos = serde_json::from_str(reply.trim())
        .map_err(|e| Error::CursorUnavailable(format!("malformed cursorpos reply: {e}")))?;
    Ok((pos.x, pos.y))
}

impl PositionSource for HyprlandCursor {
    fn position(&mut self) -> Result<(f64, f64)> {
        let reply = self.request("j/cursorpos")?;
        parse_cursorpos(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cursorpos_integers() {
        assert_eq!(parse_cursorpos(r#"{"x": 512, "y": 384}"#).unwrap(), (512.0, 384.0));
    }

    #[test]
    fn test_parse_cursorpos_floats_and_whitespace() {
        assert_eq!(
            parse_cursorpos("{\"x\": 12.5, \"y\": 0}\n").unwrap(),
            (12.5, 0.0)
        );
    }

    #[test]
    fn test_parse_cursorpos_rejects_junk() {
        assert!(matches!(
            parse_cursorpos("unknown request"),
            Err(Error::CursorUnavailable(_))
        ));
        assert!(matches!(
            parse_cursorpos(r#"{"cursor": true}"#),
            Err(Error::CursorUnavailable(_))
        ));
    }
}
