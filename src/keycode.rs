//! Key definitions and name resolution.
//!
//! Keys carry Linux evdev keycodes directly, the currency both injection
//! backends speak. X11 keycodes (evdev + 8) never appear in the public API.

use std::str::FromStr;

use crate::error::{Error, Result};

/// Keyboard keys addressable by the synthesis API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    // Letters
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF,
    KeyG,
    KeyH,
    KeyI,
    KeyJ,
    KeyK,
    KeyL,
    KeyM,
    KeyN,
    KeyO,
    KeyP,
    KeyQ,
    KeyR,
    KeyS,
    KeyT,
    KeyU,
    KeyV,
    KeyW,
    KeyX,
    KeyY,
    KeyZ,

    // Numbers (top row)
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    // Modifiers
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,
    MetaLeft, // Super/Logo key
    MetaRight,

    // Navigation and editing
    Escape,
    Tab,
    CapsLock,
    Space,
    Enter,
    Backspace,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Lock and system keys
    NumLock,
    ScrollLock,
    PrintScreen,
    Pause,

    // Punctuation and symbols (US layout legends)
    Grave,        // ` ~
    Minus,        // - _
    Equal,        // = +
    BracketLeft,  // [ {
    BracketRight, // ] }
    Backslash,    // \ |
    Semicolon,    // ; :
    Quote,        // ' "
    Comma,        // , <
    Period,       // . >
    Slash,        // / ?

    // Raw evdev keycode escape hatch
    Unknown(u16),
}

impl Key {
    /// The Linux evdev keycode for this key.
    pub fn code(&self) -> u16 {
        match self {
            Key::KeyA => 30,
            Key::KeyB => 48,
            Key::KeyC => 46,
            Key::KeyD => 32,
            Key::KeyE => 18,
            Key::KeyF => 33,
            Key::KeyG => 34,
            Key::KeyH => 35,
            Key::KeyI => 23,
            Key::KeyJ => 36,
            Key::KeyK => 37,
            Key::KeyL => 38,
            Key::KeyM => 50,
            Key::KeyN => 49,
            Key::KeyO => 24,
            Key::KeyP => 25,
            Key::KeyQ => 16,
            Key::KeyR => 19,
            Key::KeyS => 31,
            Key::KeyT => 20,
            Key::KeyU => 22,
            Key::KeyV => 47,
            Key::KeyW => 17,
            Key::KeyX => 45,
            Key::KeyY => 21,
            Key::KeyZ => 44,

            Key::Num0 => 11,
            Key::Num1 => 2,
            Key::Num2 => 3,
            Key::Num3 => 4,
            Key::Num4 => 5,
            Key::Num5 => 6,
            Key::Num6 => 7,
            Key::Num7 => 8,
            Key::Num8 => 9,
            Key::Num9 => 10,

            Key::F1 => 59,
            Key::F2 => 60,
            Key::F3 => 61,
            Key::F4 => 62,
            Key::F5 => 63,
            Key::F6 => 64,
            Key::F7 => 65,
            Key::F8 => 66,
            Key::F9 => 67,
            Key::F10 => 68,
            Key::F11 => 87,
            Key::F12 => 88,

            Key::ShiftLeft => 42,
            Key::ShiftRight => 54,
            Key::ControlLeft => 29,
            Key::ControlRight => 97,
            Key::AltLeft => 56,
            Key::AltRight => 100,
            Key::MetaLeft => 125,
            Key::MetaRight => 126,

            Key::Escape => 1,
            Key::Tab => 15,
            Key::CapsLock => 58,
            Key::Space => 57,
            Key::Enter => 28,
            Key::Backspace => 14,
            Key::Insert => 110,
            Key::Delete => 111,
            Key::Home => 102,
            Key::End => 107,
            Key::PageUp => 104,
            Key::PageDown => 109,
            Key::ArrowUp => 103,
            Key::ArrowDown => 108,
            Key::ArrowLeft => 105,
            Key::ArrowRight => 106,

            Key::NumLock => 69,
            Key::ScrollLock => 70,
            Key::PrintScreen => 99,
            Key::Pause => 119,

            Key::Grave => 41,
            Key::Minus => 12,
            Key::Equal => 13,
            Key::BracketLeft => 26,
            Key::BracketRight => 27,
            Key::Backslash => 43,
            Key::Semicolon => 39,
            Key::Quote => 40,
            Key::Comma => 51,
            Key::Period => 52,
            Key::Slash => 53,

            Key::Unknown(code) => *code,
        }
    }

    /// Check if this is a modifier key.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Key::ShiftLeft
                | Key::ShiftRight
                | Key::ControlLeft
                | Key::ControlRight
                | Key::AltLeft
                | Key::AltRight
                | Key::MetaLeft
                | Key::MetaRight
        )
    }

    /// Resolve a symbolic key name.
    ///
    /// Accepts the usual scripting spellings, case-insensitively: `"ctrl"`,
    /// `"shift"`, `"alt"`, `"super"`, `"enter"`, `"esc"`, `"f5"`,
    /// `"pageup"`, `"left"`, plus any single character covered by
    /// [`Key::from_char`].
    pub fn from_name(name: &str) -> Result<Key> {
        let lower = name.to_ascii_lowercase();
        let key = match lower.as_str() {
            "ctrl" | "control" | "lctrl" | "ctrl_l" | "leftctrl" => Key::ControlLeft,
            "rctrl" | "ctrl_r" | "rightctrl" => Key::ControlRight,
            "shift" | "lshift" | "shift_l" | "leftshift" => Key::ShiftLeft,
            "rshift" | "shift_r" | "rightshift" => Key::ShiftRight,
            "alt" | "lalt" | "alt_l" | "leftalt" => Key::AltLeft,
            "ralt" | "alt_r" | "rightalt" | "altgr" => Key::AltRight,
            "super" | "meta" | "win" | "cmd" | "command" | "logo" => Key::MetaLeft,
            "rsuper" | "rmeta" | "rwin" => Key::MetaRight,

            "enter" | "return" => Key::Enter,
            "esc" | "escape" => Key::Escape,
            "space" => Key::Space,
            "tab" => Key::Tab,
            "backspace" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "insert" | "ins" => Key::Insert,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" | "page_up" | "pgup" => Key::PageUp,
            "pagedown" | "page_down" | "pgdn" => Key::PageDown,
            "up" | "arrowup" => Key::ArrowUp,
            "down" | "arrowdown" => Key::ArrowDown,
            "left" | "arrowleft" => Key::ArrowLeft,
            "right" | "arrowright" => Key::ArrowRight,
            "capslock" | "caps_lock" | "caps" => Key::CapsLock,
            "numlock" | "num_lock" => Key::NumLock,
            "scrolllock" | "scroll_lock" => Key::ScrollLock,
            "printscreen" | "print_screen" | "print" => Key::PrintScreen,
            "pause" | "break" => Key::Pause,

            "minus" | "dash" => Key::Minus,
            "equal" | "equals" => Key::Equal,
            "grave" | "backtick" => Key::Grave,
            "comma" => Key::Comma,
            "period" | "dot" => Key::Period,
            "slash" => Key::Slash,
            "backslash" => Key::Backslash,
            "semicolon" => Key::Semicolon,
            "apostrophe" | "quote" => Key::Quote,

            "f1" => Key::F1,
            "f2" => Key::F2,
            "f3" => Key::F3,
            "f4" => Key::F4,
            "f5" => Key::F5,
            "f6" => Key::F6,
            "f7" => Key::F7,
            "f8" => Key::F8,
            "f9" => Key::F9,
            "f10" => Key::F10,
            "f11" => Key::F11,
            "f12" => Key::F12,

            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => match Key::from_char(c) {
                        Some((key, _)) => key,
                        None => return Err(Error::UnknownKey(name.to_string())),
                    },
                    _ => return Err(Error::UnknownKey(name.to_string())),
                }
            }
        };
        Ok(key)
    }

    /// Map a character to the US-layout key producing it, with a flag for
    /// whether shift must be held. Returns `None` for characters outside the
    /// US map; the Wayland backend types those directly via its keymap.
    pub fn from_char(c: char) -> Option<(Key, bool)> {
        let mapping = match c {
            'a'..='z' => (LETTERS[(c as u8 - b'a') as usize], false),
            'A'..='Z' => (LETTERS[(c as u8 - b'A') as usize], true),
            '0'..='9' => (DIGITS[(c as u8 - b'0') as usize], false),

            ' ' => (Key::Space, false),
            '\n' => (Key::Enter, false),
            '\t' => (Key::Tab, false),

            '!' => (Key::Num1, true),
            '@' => (Key::Num2, true),
            '#' => (Key::Num3, true),
            '$' => (Key::Num4, true),
            '%' => (Key::Num5, true),
            '^' => (Key::Num6, true),
            '&' => (Key::Num7, true),
            '*' => (Key::Num8, true),
            '(' => (Key::Num9, true),
            ')' => (Key::Num0, true),

            '`' => (Key::Grave, false),
            '~' => (Key::Grave, true),
            '-' => (Key::Minus, false),
            '_' => (Key::Minus, true),
            '=' => (Key::Equal, false),
            '+' => (Key::Equal, true),
            '[' => (Key::BracketLeft, false),
            '{' => (Key::BracketLeft, true),
            ']' => (Key::BracketRight, false),
            '}' => (Key::BracketRight, true),
            '\\' => (Key::Backslash, false),
            '|' => (Key::Backslash, true),
            ';' => (Key::Semicolon, false),
            ':' => (Key::Semicolon, true),
            '\'' => (Key::Quote, false),
            '"' => (Key::Quote, true),
            ',' => (Key::Comma, false),
            '<' => (Key::Comma, true),
            '.' => (Key::Period, false),
            '>' => (Key::Period, true),
            '/' => (Key::Slash, false),
            '?' => (Key::Slash, true),

            _ => return None,
        };
        Some(mapping)
    }

    /// The XKB keysym name for this key, used when composing keymaps.
    /// `Unknown` codes have no keysym and are sent as bare keycodes.
    pub fn keysym(&self) -> Option<&'static str> {
        let sym = match self {
            Key::KeyA => "a",
            Key::KeyB => "b",
            Key::KeyC => "c",
            Key::KeyD => "d",
            Key::KeyE => "e",
            Key::KeyF => "f",
            Key::KeyG => "g",
            Key::KeyH => "h",
            Key::KeyI => "i",
            Key::KeyJ => "j",
            Key::KeyK => "k",
            Key::KeyL => "l",
            Key::KeyM => "m",
            Key::KeyN => "n",
            Key::KeyO => "o",
            Key::KeyP => "p",
            Key::KeyQ => "q",
            Key::KeyR => "r",
            Key::KeyS => "s",
            Key::KeyT => "t",
            Key::KeyU => "u",
            Key::KeyV => "v",
            Key::KeyW => "w",
            Key::KeyX => "x",
            Key::KeyY => "y",
            Key::KeyZ => "z",

            Key::Num0 => "0",
            Key::Num1 => "1",
            Key::Num2 => "2",
            Key::Num3 => "3",
            Key::Num4 => "4",
            Key::Num5 => "5",
            Key::Num6 => "6",
            Key::Num7 => "7",
            Key::Num8 => "8",
            Key::Num9 => "9",

            Key::F1 => "F1",
            Key::F2 => "F2",
            Key::F3 => "F3",
            Key::F4 => "F4",
            Key::F5 => "F5",
            Key::F6 => "F6",
            Key::F7 => "F7",
            Key::F8 => "F8",
            Key::F9 => "F9",
            Key::F10 => "F10",
            Key::F11 => "F11",
            Key::F12 => "F12",

            Key::ShiftLeft => "Shift_L",
            Key::ShiftRight => "Shift_R",
            Key::ControlLeft => "Control_L",
            Key::ControlRight => "Control_R",
            Key::AltLeft => "Alt_L",
            Key::AltRight => "Alt_R",
            Key::MetaLeft => "Super_L",
            Key::MetaRight => "Super_R",

            Key::Escape => "Escape",
            Key::Tab => "Tab",
            Key::CapsLock => "Caps_Lock",
            Key::Space => "space",
            Key::Enter => "Return",
            Key::Backspace => "BackSpace",
            Key::Insert => "Insert",
            Key::Delete => "Delete",
            Key::Home => "Home",
            Key::End => "End",
            Key::PageUp => "Prior",
            Key::PageDown => "Next",
            Key::ArrowUp => "Up",
            Key::ArrowDown => "Down",
            Key::ArrowLeft => "Left",
            Key::ArrowRight => "Right",

            Key::NumLock => "Num_Lock",
            Key::ScrollLock => "Scroll_Lock",
            Key::PrintScreen => "Print",
            Key::Pause => "Pause",

            Key::Grave => "grave",
            Key::Minus => "minus",
            Key::Equal => "equal",
            Key::BracketLeft => "bracketleft",
            Key::BracketRight => "bracketright",
            Key::Backslash => "backslash",
            Key::Semicolon => "semicolon",
            Key::Quote => "apostrophe",
            Key::Comma => "comma",
            Key::Period => "period",
            Key::Slash => "slash",

            Key::Unknown(_) => return None,
        };
        Some(sym)
    }
}

const LETTERS: [Key; 26] = [
    Key::KeyA,
    Key::KeyB,
    Key::KeyC,
    Key::KeyD,
    Key::KeyE,
    Key::KeyF,
    Key::KeyG,
    Key::KeyH,
    Key::KeyI,
    Key::KeyJ,
    Key::KeyK,
    Key::KeyL,
    Key::KeyM,
    Key::KeyN,
    Key::KeyO,
    Key::KeyP,
    Key::KeyQ,
    Key::KeyR,
    Key::KeyS,
    Key::KeyT,
    Key::KeyU,
    Key::KeyV,
    Key::KeyW,
    Key::KeyX,
    Key::KeyY,
    Key::KeyZ,
];

const DIGITS: [Key; 10] = [
    Key::Num0,
    Key::Num1,
    Key::Num2,
    Key::Num3,
    Key::Num4,
    Key::Num5,
    Key::Num6,
    Key::Num7,
    Key::Num8,
    Key::Num9,
];

impl FromStr for Key {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Key::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_modifiers_and_aliases() {
        assert_eq!(Key::from_name("ctrl").unwrap(), Key::ControlLeft);
        assert_eq!(Key::from_name("Control").unwrap(), Key::ControlLeft);
        assert_eq!(Key::from_name("shift").unwrap(), Key::ShiftLeft);
        assert_eq!(Key::from_name("win").unwrap(), Key::MetaLeft);
        assert_eq!(Key::from_name("super").unwrap(), Key::MetaLeft);
        assert_eq!(Key::from_name("RETURN").unwrap(), Key::Enter);
        assert_eq!(Key::from_name("esc").unwrap(), Key::Escape);
    }

    #[test]
    fn test_from_name_function_keys() {
        assert_eq!(Key::from_name("f1").unwrap(), Key::F1);
        assert_eq!(Key::from_name("F12").unwrap(), Key::F12);
    }

    #[test]
    fn test_from_name_single_characters() {
        assert_eq!(Key::from_name("a").unwrap(), Key::KeyA);
        assert_eq!(Key::from_name("Z").unwrap(), Key::KeyZ);
        assert_eq!(Key::from_name("5").unwrap(), Key::Num5);
        assert_eq!(Key::from_name("-").unwrap(), Key::Minus);
    }

    #[test]
    fn test_from_name_unknown() {
        assert!(matches!(
            Key::from_name("hyperdrive"),
            Err(Error::UnknownKey(_))
        ));
        assert!(matches!(Key::from_name(""), Err(Error::UnknownKey(_))));
    }

    #[test]
    fn test_from_str_round_trip() {
        let key: Key = "pageup".parse().unwrap();
        assert_eq!(key, Key::PageUp);
    }

    #[test]
    fn test_from_char_shift_pairs() {
        assert_eq!(Key::from_char('a'), Some((Key::KeyA, false)));
        assert_eq!(Key::from_char('A'), Some((Key::KeyA, true)));
        assert_eq!(Key::from_char('1'), Some((Key::Num1, false)));
        assert_eq!(Key::from_char('!'), Some((Key::Num1, true)));
        assert_eq!(Key::from_char(';'), Some((Key::Semicolon, false)));
        assert_eq!(Key::from_char(':'), Some((Key::Semicolon, true)));
        assert_eq!(Key::from_char('\n'), Some((Key::Enter, false)));
        assert_eq!(Key::from_char('é'), None);
    }

    #[test]
    fn test_evdev_codes() {
        assert_eq!(Key::KeyA.code(), 30);
        assert_eq!(Key::Escape.code(), 1);
        assert_eq!(Key::Space.code(), 57);
        assert_eq!(Key::Enter.code(), 28);
        assert_eq!(Key::F11.code(), 87);
        assert_eq!(Key::MetaLeft.code(), 125);
        assert_eq!(Key::Unknown(200).code(), 200);
    }

    #[test]
    fn test_is_modifier() {
        assert!(Key::ControlLeft.is_modifier());
        assert!(Key::MetaRight.is_modifier());
        assert!(!Key::KeyA.is_modifier());
        assert!(!Key::Space.is_modifier());
    }

    #[test]
    fn test_keysym_names() {
        assert_eq!(Key::KeyA.keysym(), Some("a"));
        assert_eq!(Key::Enter.keysym(), Some("Return"));
        assert_eq!(Key::ShiftLeft.keysym(), Some("Shift_L"));
        assert_eq!(Key::PageUp.keysym(), Some("Prior"));
        assert_eq!(Key::Unknown(99).keysym(), None);
    }
}
