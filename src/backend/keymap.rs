//! XKB keymap composition for the virtual keyboard.
//!
//! Instead of replicating a fixed layout, the keymap gives every keysym the
//! backend sends its own keycode, assigned on first use. Arbitrary text
//! becomes typeable without shift-state bookkeeping, and Unicode characters
//! ride along as `U<hex>` keysyms. Types and compatibility are pulled from
//! the system database with include statements, which any xkbcommon-based
//! compositor resolves.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::os::fd::{FromRawFd, OwnedFd};

use crate::error::{Error, Result};

/// First evdev keycode handed out by the builder. Keycode 0 is reserved by
/// the kernel.
const FIRST_CODE: u16 = 1;

/// Highest XKB keycode declared in the rendered keymap.
const MAX_KEYCODE: u32 = 1000;

/// Offset between evdev keycodes and XKB keycodes.
const XKB_OFFSET: u32 = 8;

/// Added to raw keycodes sent without a keymap entry. The shifted codes lie
/// past [`MAX_KEYCODE`], outside the range the builder assigns from, so a
/// raw send never aliases an assigned keysym.
pub(crate) const RAW_CODE_BASE: u32 = MAX_KEYCODE;

/// Incrementally grown keysym-to-keycode assignment.
pub(crate) struct KeymapBuilder {
    syms: Vec<String>,
    index: HashMap<String, usize>,
}

impl KeymapBuilder {
    pub(crate) fn new() -> Self {
        KeymapBuilder {
            syms: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// The evdev keycode carrying `keysym`, assigning the next free code on
    /// first use. The flag reports whether the keymap grew and must be
    /// re-uploaded before the keycode is sent.
    pub(crate) fn keycode_for(&mut self, keysym: &str) -> Result<(u16, bool)> {
        if let Some(&i) = self.index.get(keysym) {
            return Ok((FIRST_CODE + i as u16, false));
        }
        let i = self.syms.len();
        if XKB_OFFSET + FIRST_CODE as u32 + i as u32 > MAX_KEYCODE {
            return Err(Error::InjectFailed(format!(
                "keymap exhausted: more than {} distinct keysyms in one session",
                self.syms.len()
            )));
        }
        self.syms.push(keysym.to_string());
        self.index.insert(keysym.to_string(), i);
        Ok((FIRST_CODE + i as u16, true))
    }

    /// Render the complete keymap in XKB text format.
    pub(crate) fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("xkb_keymap {\n");
        out.push_str("xkb_keycodes \"(unnamed)\" {\n");
        out.push_str("minimum = 8;\n");
        out.push_str(&format!("maximum = {MAX_KEYCODE};\n"));
        for i in 0..self.syms.len() {
            let code = XKB_OFFSET + FIRST_CODE as u32 + i as u32;
            out.push_str(&format!("<K{}> = {};\n", i + 1, code));
        }
        out.push_str("};\n");
        out.push_str("xkb_types \"(unnamed)\" { include \"complete\" };\n");
        out.push_str("xkb_compatibility \"(unnamed)\" { include \"complete\" };\n");
        out.push_str("xkb_symbols \"(unnamed)\" {\n");
        for (i, sym) in self.syms.iter().enumerate() {
            out.push_str(&format!("key <K{}> {{[{}]}};\n", i + 1, sym));
        }
        out.push_str("};\n");
        out.push_str("};\n");
        out
    }
}

/// The keysym name a character is typed through. Control characters map to
/// their editing keys; everything else uses the Unicode escape form.
pub(crate) fn char_keysym(c: char) -> String {
    match c {
        '\n' => "Return".to_string(),
        '\t' => "Tab".to_string(),
        _ => format!("U{:04X}", c as u32),
    }
}

/// Write the keymap text into an anonymous memory file for the `keymap`
/// request. The advertised size includes the trailing NUL the compositor's
/// parser expects.
pub(crate) fn keymap_fd(text: &str) -> Result<(OwnedFd, u32)> {
    let raw = unsafe { libc::memfd_create(c"waymation-keymap".as_ptr(), libc::MFD_CLOEXEC) };
    if raw < 0 {
        return Err(Error::Io(io::Error::last_os_error()));
    }
    let mut file = unsafe { File::from_raw_fd(raw) };
    file.write_all(text.as_bytes())?;
    file.write_all(&[0])?;
    let size = (text.len() + 1) as u32;
    log::debug!("uploading keymap of {size} bytes");
    Ok((OwnedFd::from(file), size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keycodes_assigned_densely_and_stably() {
        let mut builder = KeymapBuilder::new();
        assert_eq!(builder.keycode_for("a").unwrap(), (1, true));
        assert_eq!(builder.keycode_for("Return").unwrap(), (2, true));
        assert_eq!(builder.keycode_for("a").unwrap(), (1, false));
        assert_eq!(builder.keycode_for("U00E9").unwrap(), (3, true));
    }

    #[test]
    fn test_render_contains_assignments() {
        let mut builder = KeymapBuilder::new();
        builder.keycode_for("a").unwrap();
        builder.keycode_for("Shift_L").unwrap();
        let text = builder.render();

        assert!(text.starts_with("xkb_keymap {"));
        assert!(text.contains("<K1> = 9;"));
        assert!(text.contains("<K2> = 10;"));
        assert!(text.contains("key <K1> {[a]};"));
        assert!(text.contains("key <K2> {[Shift_L]};"));
        assert!(text.contains("xkb_compatibility \"(unnamed)\" { include \"complete\" };"));
    }

    #[test]
    fn test_char_keysym_forms() {
        assert_eq!(char_keysym('a'), "U0061");
        assert_eq!(char_keysym('A'), "U0041");
        assert_eq!(char_keysym('é'), "U00E9");
        assert_eq!(char_keysym('€'), "U20AC");
        assert_eq!(char_keysym('\n'), "Return");
        assert_eq!(char_keysym('\t'), "Tab");
    }

    #[test]
    fn test_keymap_fd_size_includes_nul() {
        let (_fd, size) = keymap_fd("xkb_keymap {};").unwrap();
        assert_eq!(size, "xkb_keymap {};".len() as u32 + 1);
    }

    #[test]
    fn test_assigned_codes_stay_below_raw_range() {
        let mut builder = KeymapBuilder::new();
        let mut last = 0u16;
        for i in 0u32.. {
            match builder.keycode_for(&format!("U{:04X}", 0x4E00 + i)) {
                Ok((code, _)) => last = code,
                Err(_) => break,
            }
        }

        // The top assignable code fills the declared keymap range exactly
        // and still sits below the raw send window.
        assert_eq!(u32::from(last) + XKB_OFFSET, MAX_KEYCODE);
        assert!(u32::from(last) < RAW_CODE_BASE);
    }
}
