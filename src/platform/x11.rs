use std::collections::HashMap;

use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    ButtonMask,
    ConnectionExt as _,
};
use x11rb::rust_connection::RustConnection;

use super::{
    KeyPoller,
    PlatformConfig,
};
use crate::key::PortableKey;

/// X11 keysym values, taken from `X11/keysymdef.h`. Letters and digits
/// share their keysym with their ASCII code point.
mod keysym {
    pub const BACKSPACE: u32 = 0xff08;
    pub const TAB: u32 = 0xff09;
    pub const RETURN: u32 = 0xff0d;
    pub const PAUSE: u32 = 0xff13;
    pub const SCROLL_LOCK: u32 = 0xff14;
    pub const ESCAPE: u32 = 0xff1b;
    pub const HOME: u32 = 0xff50;
    pub const LEFT: u32 = 0xff51;
    pub const UP: u32 = 0xff52;
    pub const RIGHT: u32 = 0xff53;
    pub const DOWN: u32 = 0xff54;
    pub const PAGE_UP: u32 = 0xff55;
    pub const PAGE_DOWN: u32 = 0xff56;
    pub const END: u32 = 0xff57;
    pub const PRINT: u32 = 0xff61;
    pub const INSERT: u32 = 0xff63;
    pub const NUM_LOCK: u32 = 0xff7f;
    pub const KP_0: u32 = 0xffb0;
    pub const KP_9: u32 = 0xffb9;
    pub const KP_MULTIPLY: u32 = 0xffaa;
    pub const KP_ADD: u32 = 0xffab;
    pub const KP_SUBTRACT: u32 = 0xffad;
    pub const KP_DECIMAL: u32 = 0xffae;
    pub const KP_DIVIDE: u32 = 0xffaf;
    pub const F1: u32 = 0xffbe;
    pub const F24: u32 = 0xffd5;
    pub const SHIFT_L: u32 = 0xffe1;
    pub const CONTROL_L: u32 = 0xffe3;
    pub const CAPS_LOCK: u32 = 0xffe5;
    pub const ALT_L: u32 = 0xffe9;
    pub const SUPER_L: u32 = 0xffeb;
    pub const DELETE: u32 = 0xffff;
    pub const SPACE: u32 = 0x0020;
    pub const COMMA: u32 = 0x002c;
    pub const MINUS: u32 = 0x002d;
    pub const PERIOD: u32 = 0x002e;
    pub const SLASH: u32 = 0x002f;
    pub const SEMICOLON: u32 = 0x003b;
    pub const GRAVE: u32 = 0x0060;
    pub const BRACKET_LEFT: u32 = 0x005b;
    pub const BACKSLASH: u32 = 0x005c;
    pub const BRACKET_RIGHT: u32 = 0x005d;
    pub const APOSTROPHE: u32 = 0x0027;
    pub const PLUS: u32 = 0x002b;
}

/// Maps a [`PortableKey`] to its X11 keysym, 0 if unsupported.
fn portable_to_keysym(key: PortableKey) -> u32 {
    use PortableKey::*;
    let raw = u16::from(key);
    if (u16::from(A)..=u16::from(Z)).contains(&raw) {
        return u32::from(b'A' + (raw - u16::from(A)) as u8);
    }
    if (u16::from(Number0)..=u16::from(Number9)).contains(&raw) {
        return u32::from(b'0' + (raw - u16::from(Number0)) as u8);
    }
    if (u16::from(F1)..=u16::from(F24)).contains(&raw) {
        return keysym::F1 + u32::from(raw - u16::from(F1));
    }
    if (u16::from(Numpad0)..=u16::from(Numpad9)).contains(&raw) {
        return keysym::KP_0 + u32::from(raw - u16::from(Numpad0));
    }
    match key {
        Backspace => keysym::BACKSPACE,
        Tab => keysym::TAB,
        Return => keysym::RETURN,
        Pause => keysym::PAUSE,
        Escape => keysym::ESCAPE,
        Space => keysym::SPACE,
        PageUp => keysym::PAGE_UP,
        PageDown => keysym::PAGE_DOWN,
        End => keysym::END,
        Home => keysym::HOME,
        Left => keysym::LEFT,
        Up => keysym::UP,
        Right => keysym::RIGHT,
        Down => keysym::DOWN,
        PrintScreen => keysym::PRINT,
        Insert => keysym::INSERT,
        Delete => keysym::DELETE,
        Shift => keysym::SHIFT_L,
        Control => keysym::CONTROL_L,
        Alt => keysym::ALT_L,
        Meta => keysym::SUPER_L,
        CapsLock => keysym::CAPS_LOCK,
        NumLock => keysym::NUM_LOCK,
        ScrollLock => keysym::SCROLL_LOCK,
        NumpadMultiply => keysym::KP_MULTIPLY,
        NumpadAdd => keysym::KP_ADD,
        NumpadSubtract => keysym::KP_SUBTRACT,
        NumpadDecimal => keysym::KP_DECIMAL,
        NumpadDivide => keysym::KP_DIVIDE,
        Comma => keysym::COMMA,
        Period => keysym::PERIOD,
        Minus => keysym::MINUS,
        Plus => keysym::PLUS,
        Semicolon => keysym::SEMICOLON,
        Slash => keysym::SLASH,
        Tilde => keysym::GRAVE,
        LeftBracket => keysym::BRACKET_LEFT,
        Backslash => keysym::BACKSLASH,
        RightBracket => keysym::BRACKET_RIGHT,
        Quote => keysym::APOSTROPHE,
        _ => 0,
    }
}

fn keysym_to_portable(sym: u32) -> PortableKey {
    // Base keysym -> portable lookup, built by brute-force inverting
    // `portable_to_keysym` over every non-mouse portable key.
    for raw in 0u16..u16::from(PortableKey::LastValue) {
        let key = PortableKey::from(raw);
        if key.is_mouse_button() {
            continue;
        }
        let sym_candidate = portable_to_keysym(key);
        if sym_candidate != 0 && sym_candidate == sym {
            return key;
        }
    }
    PortableKey::None
}

/// Polls keyboard and mouse state via XCB (through `x11rb`).
///
/// Builds a keysym -> keycode table at init time by querying the current
/// keyboard mapping (`obs-nix.c`'s `fill_keycodes`); [`KeyPoller::rebuild_keymap`]
/// re-queries it in response to a layout change.
pub struct X11Poller {
    conn: RustConnection,
    screen_root: u32,
    min_keycode: u8,
    max_keycode: u8,
    keycodes: HashMap<PortableKey, u8>,
}

impl X11Poller {
    fn build_keycodes(&mut self) -> std::io::Result<()> {
        let count = self.max_keycode - self.min_keycode + 1;
        let reply = self
            .conn
            .get_keyboard_mapping(self.min_keycode, count)
            .map_err(to_io_error)?
            .reply()
            .map_err(to_io_error)?;
        let syms_per_code = usize::from(reply.keysyms_per_keycode);
        if syms_per_code == 0 {
            return Ok(());
        }
        self.keycodes.clear();
        for (i, code_syms) in reply.keysyms.chunks(syms_per_code).enumerate() {
            let code = self.min_keycode + i as u8;
            for &sym in code_syms {
                if sym == 0 {
                    break;
                }
                let key = keysym_to_portable(sym);
                if key != PortableKey::None {
                    self.keycodes.entry(key).or_insert(code);
                    break;
                }
            }
        }
        Ok(())
    }
}

impl KeyPoller for X11Poller {
    fn init(config: &PlatformConfig) -> std::io::Result<Self> {
        let (conn, screen_num) =
            RustConnection::connect(config.x11_display.as_deref()).map_err(to_io_error)?;
        let screen_root = conn.setup().roots[screen_num].root;
        let min_keycode = conn.setup().min_keycode;
        let max_keycode = conn.setup().max_keycode;
        let mut poller = Self {
            conn,
            screen_root,
            min_keycode,
            max_keycode,
            keycodes: HashMap::new(),
        };
        poller.build_keycodes()?;
        Ok(poller)
    }

    fn teardown(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn rebuild_keymap(&mut self) {
        let _ = self.build_keycodes();
    }

    fn is_pressed(&mut self, key: PortableKey) -> bool {
        if let Some(index) = key.mouse_index() {
            return self.mouse_pressed(index);
        }
        let Some(&code) = self.keycodes.get(&key) else {
            return false;
        };
        let Ok(cookie) = self.conn.query_keymap() else {
            return false;
        };
        let Ok(reply) = cookie.reply() else {
            return false;
        };
        let byte = usize::from(code) / 8;
        let bit = code % 8;
        reply.keys.get(byte).is_some_and(|b| b & (1 << bit) != 0)
    }
}

impl X11Poller {
    fn mouse_pressed(&mut self, index: u16) -> bool {
        let Ok(cookie) = self.conn.query_pointer(self.screen_root) else {
            return false;
        };
        let Ok(reply) = cookie.reply() else {
            return false;
        };
        let mask = reply.mask;
        match index {
            1 => mask.contains(ButtonMask::BUTTON1),
            2 => mask.contains(ButtonMask::BUTTON3),
            3 => mask.contains(ButtonMask::BUTTON2),
            // X11 core protocol only tracks the first three buttons' modifier
            // state this way; the remaining slots never report pressed here.
            _ => false,
        }
    }
}

fn to_io_error<E: std::fmt::Display>(err: E) -> std::io::Error {
    std::io::Error::other(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keysym_round_trips_letters() {
        assert_eq!(portable_to_keysym(PortableKey::A), u32::from(b'A'));
        assert_eq!(keysym_to_portable(u32::from(b'A')), PortableKey::A);
    }

    #[test]
    fn keysym_round_trips_function_keys() {
        assert_eq!(portable_to_keysym(PortableKey::F1), keysym::F1);
        assert_eq!(keysym_to_portable(keysym::F1), PortableKey::F1);
    }

    #[test]
    fn unmapped_keysym_is_none() {
        assert_eq!(keysym_to_portable(0x1234_5678), PortableKey::None);
    }
}
