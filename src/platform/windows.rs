use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetAsyncKeyState,
    VIRTUAL_KEY,
    VK_0,
    VK_1,
    VK_2,
    VK_3,
    VK_4,
    VK_5,
    VK_6,
    VK_7,
    VK_8,
    VK_9,
    VK_A,
    VK_ADD,
    VK_B,
    VK_BACK,
    VK_C,
    VK_CAPITAL,
    VK_D,
    VK_DECIMAL,
    VK_DELETE,
    VK_DIVIDE,
    VK_DOWN,
    VK_E,
    VK_END,
    VK_ESCAPE,
    VK_F,
    VK_F1,
    VK_F10,
    VK_F11,
    VK_F12,
    VK_F13,
    VK_F14,
    VK_F15,
    VK_F16,
    VK_F17,
    VK_F18,
    VK_F19,
    VK_F2,
    VK_F20,
    VK_F21,
    VK_F22,
    VK_F23,
    VK_F24,
    VK_F3,
    VK_F4,
    VK_F5,
    VK_F6,
    VK_F7,
    VK_F8,
    VK_F9,
    VK_G,
    VK_H,
    VK_HOME,
    VK_I,
    VK_INSERT,
    VK_J,
    VK_K,
    VK_L,
    VK_LBUTTON,
    VK_LCONTROL,
    VK_LEFT,
    VK_LMENU,
    VK_LSHIFT,
    VK_LWIN,
    VK_M,
    VK_MBUTTON,
    VK_MULTIPLY,
    VK_N,
    VK_NEXT,
    VK_NUMLOCK,
    VK_NUMPAD0,
    VK_NUMPAD1,
    VK_NUMPAD2,
    VK_NUMPAD3,
    VK_NUMPAD4,
    VK_NUMPAD5,
    VK_NUMPAD6,
    VK_NUMPAD7,
    VK_NUMPAD8,
    VK_NUMPAD9,
    VK_O,
    VK_OEM_1,
    VK_OEM_2,
    VK_OEM_3,
    VK_OEM_4,
    VK_OEM_5,
    VK_OEM_6,
    VK_OEM_7,
    VK_OEM_COMMA,
    VK_OEM_MINUS,
    VK_OEM_PERIOD,
    VK_OEM_PLUS,
    VK_P,
    VK_PAUSE,
    VK_PRIOR,
    VK_Q,
    VK_R,
    VK_RBUTTON,
    VK_RCONTROL,
    VK_RETURN,
    VK_RIGHT,
    VK_RMENU,
    VK_RSHIFT,
    VK_RWIN,
    VK_S,
    VK_SCROLL,
    VK_SNAPSHOT,
    VK_SPACE,
    VK_SUBTRACT,
    VK_T,
    VK_TAB,
    VK_U,
    VK_UP,
    VK_V,
    VK_W,
    VK_X,
    VK_XBUTTON1,
    VK_XBUTTON2,
    VK_Y,
    VK_Z,
};

use super::{
    KeyPoller,
    PlatformConfig,
};
use crate::key::PortableKey;

/// Maps a [`PortableKey`] to its Win32 virtual-key code, 0 if unsupported.
pub fn portable_to_virtual(key: PortableKey) -> u16 {
    use PortableKey::*;
    let vk = match key {
        A => VK_A,
        B => VK_B,
        C => VK_C,
        D => VK_D,
        E => VK_E,
        F => VK_F,
        G => VK_G,
        H => VK_H,
        I => VK_I,
        J => VK_J,
        K => VK_K,
        L => VK_L,
        M => VK_M,
        N => VK_N,
        O => VK_O,
        P => VK_P,
        Q => VK_Q,
        R => VK_R,
        S => VK_S,
        T => VK_T,
        U => VK_U,
        V => VK_V,
        W => VK_W,
        X => VK_X,
        Y => VK_Y,
        Z => VK_Z,
        Number0 => VK_0,
        Number1 => VK_1,
        Number2 => VK_2,
        Number3 => VK_3,
        Number4 => VK_4,
        Number5 => VK_5,
        Number6 => VK_6,
        Number7 => VK_7,
        Number8 => VK_8,
        Number9 => VK_9,
        F1 => VK_F1,
        F2 => VK_F2,
        F3 => VK_F3,
        F4 => VK_F4,
        F5 => VK_F5,
        F6 => VK_F6,
        F7 => VK_F7,
        F8 => VK_F8,
        F9 => VK_F9,
        F10 => VK_F10,
        F11 => VK_F11,
        F12 => VK_F12,
        F13 => VK_F13,
        F14 => VK_F14,
        F15 => VK_F15,
        F16 => VK_F16,
        F17 => VK_F17,
        F18 => VK_F18,
        F19 => VK_F19,
        F20 => VK_F20,
        F21 => VK_F21,
        F22 => VK_F22,
        F23 => VK_F23,
        F24 => VK_F24,
        Backspace => VK_BACK,
        Tab => VK_TAB,
        Return => VK_RETURN,
        Pause => VK_PAUSE,
        Escape => VK_ESCAPE,
        Space => VK_SPACE,
        PageUp => VK_PRIOR,
        PageDown => VK_NEXT,
        End => VK_END,
        Home => VK_HOME,
        Left => VK_LEFT,
        Up => VK_UP,
        Right => VK_RIGHT,
        Down => VK_DOWN,
        PrintScreen => VK_SNAPSHOT,
        Insert => VK_INSERT,
        Delete => VK_DELETE,
        Shift => VK_LSHIFT,
        Control => VK_LCONTROL,
        Alt => VK_LMENU,
        Meta => VK_LWIN,
        CapsLock => VK_CAPITAL,
        NumLock => VK_NUMLOCK,
        ScrollLock => VK_SCROLL,
        Numpad0 => VK_NUMPAD0,
        Numpad1 => VK_NUMPAD1,
        Numpad2 => VK_NUMPAD2,
        Numpad3 => VK_NUMPAD3,
        Numpad4 => VK_NUMPAD4,
        Numpad5 => VK_NUMPAD5,
        Numpad6 => VK_NUMPAD6,
        Numpad7 => VK_NUMPAD7,
        Numpad8 => VK_NUMPAD8,
        Numpad9 => VK_NUMPAD9,
        NumpadMultiply => VK_MULTIPLY,
        NumpadAdd => VK_ADD,
        NumpadSubtract => VK_SUBTRACT,
        NumpadDecimal => VK_DECIMAL,
        NumpadDivide => VK_DIVIDE,
        Comma => VK_OEM_COMMA,
        Period => VK_OEM_PERIOD,
        Minus => VK_OEM_MINUS,
        Plus => VK_OEM_PLUS,
        Semicolon => VK_OEM_1,
        Slash => VK_OEM_2,
        Tilde => VK_OEM_3,
        LeftBracket => VK_OEM_4,
        Backslash => VK_OEM_5,
        RightBracket => VK_OEM_6,
        Quote => VK_OEM_7,
        _ => return 0,
    };
    vk.0
}

/// Maps a Win32 virtual-key code to its [`PortableKey`], `None` on miss.
pub fn virtual_to_portable(code: u16) -> PortableKey {
    use PortableKey::*;
    let vk = VIRTUAL_KEY(code);
    match vk {
        VK_A => A,
        VK_B => B,
        VK_C => C,
        VK_D => D,
        VK_E => E,
        VK_F => F,
        VK_G => G,
        VK_H => H,
        VK_I => I,
        VK_J => J,
        VK_K => K,
        VK_L => L,
        VK_M => M,
        VK_N => N,
        VK_O => O,
        VK_P => P,
        VK_Q => Q,
        VK_R => R,
        VK_S => S,
        VK_T => T,
        VK_U => U,
        VK_V => V,
        VK_W => W,
        VK_X => X,
        VK_Y => Y,
        VK_Z => Z,
        VK_0 => Number0,
        VK_1 => Number1,
        VK_2 => Number2,
        VK_3 => Number3,
        VK_4 => Number4,
        VK_5 => Number5,
        VK_6 => Number6,
        VK_7 => Number7,
        VK_8 => Number8,
        VK_9 => Number9,
        VK_F1 => F1,
        VK_F2 => F2,
        VK_F3 => F3,
        VK_F4 => F4,
        VK_F5 => F5,
        VK_F6 => F6,
        VK_F7 => F7,
        VK_F8 => F8,
        VK_F9 => F9,
        VK_F10 => F10,
        VK_F11 => F11,
        VK_F12 => F12,
        VK_F13 => F13,
        VK_F14 => F14,
        VK_F15 => F15,
        VK_F16 => F16,
        VK_F17 => F17,
        VK_F18 => F18,
        VK_F19 => F19,
        VK_F20 => F20,
        VK_F21 => F21,
        VK_F22 => F22,
        VK_F23 => F23,
        VK_F24 => F24,
        VK_BACK => Backspace,
        VK_TAB => Tab,
        VK_RETURN => Return,
        VK_PAUSE => Pause,
        VK_ESCAPE => Escape,
        VK_SPACE => Space,
        VK_PRIOR => PageUp,
        VK_NEXT => PageDown,
        VK_END => End,
        VK_HOME => Home,
        VK_LEFT => Left,
        VK_UP => Up,
        VK_RIGHT => Right,
        VK_DOWN => Down,
        VK_SNAPSHOT => PrintScreen,
        VK_INSERT => Insert,
        VK_DELETE => Delete,
        VK_LSHIFT | VK_RSHIFT => Shift,
        VK_LCONTROL | VK_RCONTROL => Control,
        VK_LMENU | VK_RMENU => Alt,
        VK_LWIN | VK_RWIN => Meta,
        VK_CAPITAL => CapsLock,
        VK_NUMLOCK => NumLock,
        VK_SCROLL => ScrollLock,
        VK_NUMPAD0 => Numpad0,
        VK_NUMPAD1 => Numpad1,
        VK_NUMPAD2 => Numpad2,
        VK_NUMPAD3 => Numpad3,
        VK_NUMPAD4 => Numpad4,
        VK_NUMPAD5 => Numpad5,
        VK_NUMPAD6 => Numpad6,
        VK_NUMPAD7 => Numpad7,
        VK_NUMPAD8 => Numpad8,
        VK_NUMPAD9 => Numpad9,
        VK_MULTIPLY => NumpadMultiply,
        VK_ADD => NumpadAdd,
        VK_SUBTRACT => NumpadSubtract,
        VK_DECIMAL => NumpadDecimal,
        VK_DIVIDE => NumpadDivide,
        VK_OEM_COMMA => Comma,
        VK_OEM_PERIOD => Period,
        VK_OEM_MINUS => Minus,
        VK_OEM_PLUS => Plus,
        VK_OEM_1 => Semicolon,
        VK_OEM_2 => Slash,
        VK_OEM_3 => Tilde,
        VK_OEM_4 => LeftBracket,
        VK_OEM_5 => Backslash,
        VK_OEM_6 => RightBracket,
        VK_OEM_7 => Quote,
        _ => PortableKey::None,
    }
}

fn mouse_virtual_key(index: u16) -> Option<VIRTUAL_KEY> {
    match index {
        1 => Some(VK_LBUTTON),
        2 => Some(VK_RBUTTON),
        3 => Some(VK_MBUTTON),
        4 => Some(VK_XBUTTON1),
        5 => Some(VK_XBUTTON2),
        // Windows has no further named X-buttons; slots 6-29 never report pressed.
        _ => None,
    }
}

/// Polls keyboard and mouse state via `GetAsyncKeyState`.
///
/// Treats "was pressed since the last query" as held: the low bit of
/// `GetAsyncKeyState`'s result is ORed into the high-bit "currently down"
/// test, so a key tapped between ticks still reports as held for that tick.
pub struct WindowsPoller;

impl KeyPoller for WindowsPoller {
    fn init(_config: &PlatformConfig) -> std::io::Result<Self> {
        Ok(Self)
    }

    fn teardown(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn is_pressed(&mut self, key: PortableKey) -> bool {
        let vk = if let Some(index) = key.mouse_index() {
            match mouse_virtual_key(index) {
                Some(vk) => vk,
                None => return false,
            }
        } else {
            let code = portable_to_virtual(key);
            if code == 0 {
                return false;
            }
            VIRTUAL_KEY(code)
        };
        let state = unsafe { GetAsyncKeyState(i32::from(vk.0)) };
        let down = state & (0x8000u16 as i16) != 0;
        let was_down = state & 1 != 0;
        down || was_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_to_portable_round_trips_letters() {
        assert_eq!(virtual_to_portable(VK_A.0), PortableKey::A);
        assert_eq!(portable_to_virtual(PortableKey::A), VK_A.0);
    }

    #[test]
    fn unsupported_code_is_none() {
        assert_eq!(virtual_to_portable(0xFFFF), PortableKey::None);
    }

    #[test]
    fn unsupported_key_has_zero_virtual_code() {
        assert_eq!(portable_to_virtual(PortableKey::Unknown(1)), 0);
    }
}
