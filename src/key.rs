/*!
Portable key enumeration and the codec between it and human-readable names.
*/

use std::ops::Add;

use num_enum::{
    FromPrimitive,
    IntoPrimitive,
};

/// A bitmask over the four hotkey-eligible modifier keys.
///
/// The empty mask is a valid value: a binding with no modifiers matches
/// whenever its key is held, regardless of what other modifiers are also
/// held.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct Modifiers(u32);

impl Modifiers {
    pub const NONE: Self = Self(0);
    pub const SHIFT: Self = Self(1 << 0);
    pub const CONTROL: Self = Self(1 << 1);
    pub const ALT: Self = Self(1 << 2);
    pub const COMMAND: Self = Self(1 << 3);

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Matching rule shared by the polling and injection paths: an empty
    /// mask always matches, otherwise every set bit must also be set in
    /// `held`.
    pub const fn matches(self, held: Self) -> bool {
        self.is_empty() || (self.0 & held.0) == self.0
    }
}

impl Add for Modifiers {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl Add<PortableKey> for Modifiers {
    type Output = KeyCombination;

    fn add(self, rhs: PortableKey) -> Self::Output {
        KeyCombination::new(self, rhs)
    }
}

/// Non-modifier and modifier keys, mouse buttons, and the two sentinels
/// `None` and `Unknown`.
///
/// Equality and hashing are by discriminant identity.
#[derive(FromPrimitive, IntoPrimitive, Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u16)]
pub enum PortableKey {
    None = 0,

    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Number0,
    Number1,
    Number2,
    Number3,
    Number4,
    Number5,
    Number6,
    Number7,
    Number8,
    Number9,

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
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,

    Backspace,
    Tab,
    Return,
    Pause,
    Escape,
    Space,
    PageUp,
    PageDown,
    End,
    Home,
    Left,
    Up,
    Right,
    Down,
    PrintScreen,
    Insert,
    Delete,

    Shift,
    Control,
    Alt,
    Meta,
    CapsLock,
    NumLock,
    ScrollLock,

    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadMultiply,
    NumpadAdd,
    NumpadSubtract,
    NumpadDecimal,
    NumpadDivide,

    Comma,
    Period,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Tilde,
    LeftBracket,
    Backslash,
    RightBracket,
    Quote,

    Mouse1,
    Mouse2,
    Mouse3,
    Mouse4,
    Mouse5,
    Mouse6,
    Mouse7,
    Mouse8,
    Mouse9,
    Mouse10,
    Mouse11,
    Mouse12,
    Mouse13,
    Mouse14,
    Mouse15,
    Mouse16,
    Mouse17,
    Mouse18,
    Mouse19,
    Mouse20,
    Mouse21,
    Mouse22,
    Mouse23,
    Mouse24,
    Mouse25,
    Mouse26,
    Mouse27,
    Mouse28,
    Mouse29,

    /// Not an actual key; permits range checks against the mouse slots.
    LastValue,

    /// Any virtual key/keysym without a portable counterpart.
    #[num_enum(catch_all)]
    Unknown(u16),
}

const FIRST_MOUSE: u16 = PortableKey::Mouse1 as u16;
const LAST_MOUSE: u16 = PortableKey::Mouse29 as u16;

impl PortableKey {
    pub fn is_mouse_button(self) -> bool {
        let raw: u16 = self.into();
        (FIRST_MOUSE..=LAST_MOUSE).contains(&raw)
    }

    /// 1-based mouse slot index, if this is a mouse button.
    pub fn mouse_index(self) -> Option<u16> {
        let raw: u16 = self.into();
        self.is_mouse_button().then_some(raw - FIRST_MOUSE + 1)
    }
}

/// The pair (modifiers, key) a [`Binding`](crate::registry::Binding) matches against.
///
/// `(Modifiers::NONE, PortableKey::None)` is the "empty" combination and
/// must never trigger a callback.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct KeyCombination {
    pub modifiers: Modifiers,
    pub key: PortableKey,
}

impl KeyCombination {
    pub const EMPTY: Self = Self {
        modifiers: Modifiers::NONE,
        key: PortableKey::None,
    };

    pub const fn new(modifiers: Modifiers, key: PortableKey) -> Self {
        Self { modifiers, key }
    }

    pub fn is_empty(self) -> bool {
        self.modifiers.is_empty() && self.key == PortableKey::None
    }
}

impl From<PortableKey> for KeyCombination {
    fn from(key: PortableKey) -> Self {
        Self::new(Modifiers::NONE, key)
    }
}

impl Default for PortableKey {
    fn default() -> Self {
        PortableKey::None
    }
}

macro_rules! key_name_table {
    ($(($variant:ident, $name:literal)),* $(,)?) => {
        /// Canonical stable ASCII identifier for a key, used in saved documents.
        ///
        /// Total function: any value not in the table (including mouse and
        /// numpad keys, handled separately below) yields `"OBS_KEY_NONE"`.
        pub fn name_of(key: PortableKey) -> &'static str {
            if let Some(index) = key.mouse_index() {
                return mouse_name(index);
            }
            match key {
                $(PortableKey::$variant => $name,)*
                _ => "OBS_KEY_NONE",
            }
        }

        /// Inverse of [`name_of`]; unrecognized names yield [`PortableKey::None`].
        pub fn key_from_name(name: &str) -> PortableKey {
            if let Some(index) = mouse_index_from_name(name) {
                return PortableKey::from(FIRST_MOUSE + index - 1);
            }
            match name {
                $($name => PortableKey::$variant,)*
                _ => PortableKey::None,
            }
        }
    };
}

key_name_table! {
    (None, "OBS_KEY_NONE"),
    (A, "OBS_KEY_A"),
    (B, "OBS_KEY_B"),
    (C, "OBS_KEY_C"),
    (D, "OBS_KEY_D"),
    (E, "OBS_KEY_E"),
    (F, "OBS_KEY_F"),
    (G, "OBS_KEY_G"),
    (H, "OBS_KEY_H"),
    (I, "OBS_KEY_I"),
    (J, "OBS_KEY_J"),
    (K, "OBS_KEY_K"),
    (L, "OBS_KEY_L"),
    (M, "OBS_KEY_M"),
    (N, "OBS_KEY_N"),
    (O, "OBS_KEY_O"),
    (P, "OBS_KEY_P"),
    (Q, "OBS_KEY_Q"),
    (R, "OBS_KEY_R"),
    (S, "OBS_KEY_S"),
    (T, "OBS_KEY_T"),
    (U, "OBS_KEY_U"),
    (V, "OBS_KEY_V"),
    (W, "OBS_KEY_W"),
    (X, "OBS_KEY_X"),
    (Y, "OBS_KEY_Y"),
    (Z, "OBS_KEY_Z"),
    (Number0, "OBS_KEY_0"),
    (Number1, "OBS_KEY_1"),
    (Number2, "OBS_KEY_2"),
    (Number3, "OBS_KEY_3"),
    (Number4, "OBS_KEY_4"),
    (Number5, "OBS_KEY_5"),
    (Number6, "OBS_KEY_6"),
    (Number7, "OBS_KEY_7"),
    (Number8, "OBS_KEY_8"),
    (Number9, "OBS_KEY_9"),
    (F1, "OBS_KEY_F1"),
    (F2, "OBS_KEY_F2"),
    (F3, "OBS_KEY_F3"),
    (F4, "OBS_KEY_F4"),
    (F5, "OBS_KEY_F5"),
    (F6, "OBS_KEY_F6"),
    (F7, "OBS_KEY_F7"),
    (F8, "OBS_KEY_F8"),
    (F9, "OBS_KEY_F9"),
    (F10, "OBS_KEY_F10"),
    (F11, "OBS_KEY_F11"),
    (F12, "OBS_KEY_F12"),
    (F13, "OBS_KEY_F13"),
    (F14, "OBS_KEY_F14"),
    (F15, "OBS_KEY_F15"),
    (F16, "OBS_KEY_F16"),
    (F17, "OBS_KEY_F17"),
    (F18, "OBS_KEY_F18"),
    (F19, "OBS_KEY_F19"),
    (F20, "OBS_KEY_F20"),
    (F21, "OBS_KEY_F21"),
    (F22, "OBS_KEY_F22"),
    (F23, "OBS_KEY_F23"),
    (F24, "OBS_KEY_F24"),
    (Backspace, "OBS_KEY_BACKSPACE"),
    (Tab, "OBS_KEY_TAB"),
    (Return, "OBS_KEY_RETURN"),
    (Pause, "OBS_KEY_PAUSE"),
    (Escape, "OBS_KEY_ESCAPE"),
    (Space, "OBS_KEY_SPACE"),
    (PageUp, "OBS_KEY_PAGEUP"),
    (PageDown, "OBS_KEY_PAGEDOWN"),
    (End, "OBS_KEY_END"),
    (Home, "OBS_KEY_HOME"),
    (Left, "OBS_KEY_LEFT"),
    (Up, "OBS_KEY_UP"),
    (Right, "OBS_KEY_RIGHT"),
    (Down, "OBS_KEY_DOWN"),
    (PrintScreen, "OBS_KEY_PRINTSCREEN"),
    (Insert, "OBS_KEY_INSERT"),
    (Delete, "OBS_KEY_DELETE"),
    (Shift, "OBS_KEY_SHIFT"),
    (Control, "OBS_KEY_CONTROL"),
    (Alt, "OBS_KEY_ALT"),
    (Meta, "OBS_KEY_META"),
    (CapsLock, "OBS_KEY_CAPSLOCK"),
    (NumLock, "OBS_KEY_NUMLOCK"),
    (ScrollLock, "OBS_KEY_SCROLLLOCK"),
    (Numpad0, "OBS_KEY_NUMPAD0"),
    (Numpad1, "OBS_KEY_NUMPAD1"),
    (Numpad2, "OBS_KEY_NUMPAD2"),
    (Numpad3, "OBS_KEY_NUMPAD3"),
    (Numpad4, "OBS_KEY_NUMPAD4"),
    (Numpad5, "OBS_KEY_NUMPAD5"),
    (Numpad6, "OBS_KEY_NUMPAD6"),
    (Numpad7, "OBS_KEY_NUMPAD7"),
    (Numpad8, "OBS_KEY_NUMPAD8"),
    (Numpad9, "OBS_KEY_NUMPAD9"),
    (NumpadMultiply, "OBS_KEY_NUMPADMULTIPLY"),
    (NumpadAdd, "OBS_KEY_NUMPADADD"),
    (NumpadSubtract, "OBS_KEY_NUMPADSUBTRACT"),
    (NumpadDecimal, "OBS_KEY_NUMPADDECIMAL"),
    (NumpadDivide, "OBS_KEY_NUMPADDIVIDE"),
    (Comma, "OBS_KEY_COMMA"),
    (Period, "OBS_KEY_PERIOD"),
    (Minus, "OBS_KEY_MINUS"),
    (Plus, "OBS_KEY_PLUS"),
    (Semicolon, "OBS_KEY_SEMICOLON"),
    (Slash, "OBS_KEY_SLASH"),
    (Tilde, "OBS_KEY_TILDE"),
    (LeftBracket, "OBS_KEY_LEFTBRACKET"),
    (Backslash, "OBS_KEY_BACKSLASH"),
    (RightBracket, "OBS_KEY_RIGHTBRACKET"),
    (Quote, "OBS_KEY_QUOTE"),
}

fn mouse_name(index: u16) -> &'static str {
    const NAMES: [&str; 29] = [
        "OBS_KEY_MOUSE1",
        "OBS_KEY_MOUSE2",
        "OBS_KEY_MOUSE3",
        "OBS_KEY_MOUSE4",
        "OBS_KEY_MOUSE5",
        "OBS_KEY_MOUSE6",
        "OBS_KEY_MOUSE7",
        "OBS_KEY_MOUSE8",
        "OBS_KEY_MOUSE9",
        "OBS_KEY_MOUSE10",
        "OBS_KEY_MOUSE11",
        "OBS_KEY_MOUSE12",
        "OBS_KEY_MOUSE13",
        "OBS_KEY_MOUSE14",
        "OBS_KEY_MOUSE15",
        "OBS_KEY_MOUSE16",
        "OBS_KEY_MOUSE17",
        "OBS_KEY_MOUSE18",
        "OBS_KEY_MOUSE19",
        "OBS_KEY_MOUSE20",
        "OBS_KEY_MOUSE21",
        "OBS_KEY_MOUSE22",
        "OBS_KEY_MOUSE23",
        "OBS_KEY_MOUSE24",
        "OBS_KEY_MOUSE25",
        "OBS_KEY_MOUSE26",
        "OBS_KEY_MOUSE27",
        "OBS_KEY_MOUSE28",
        "OBS_KEY_MOUSE29",
    ];
    NAMES[usize::from(index - 1)]
}

fn mouse_index_from_name(name: &str) -> Option<u16> {
    let digits = name.strip_prefix("OBS_KEY_MOUSE")?;
    let index: u16 = digits.parse().ok()?;
    (1..=29).contains(&index).then_some(index)
}

/// Host-localized display conventions for rendering a combination, e.g. in
/// a binding-editor UI.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PlatformNameStyle {
    /// Shift, Ctrl, Alt, Win — Windows/X11 order.
    Generic,
    /// Shift, Cmd, Alt/Option, Ctrl — macOS swaps Command and Control order.
    MacOs,
}

/// Display-label overrides for the key categories the OS can't always
/// translate on its own: mouse buttons and numpad digits. Each template
/// contains a `%1` placeholder replaced with the 1-based mouse index or
/// the digit. Mirrors the `mouse`/`numpad` fields of
/// `obs_hotkeys_translations`; every other field of that struct is an
/// OS-string override this crate leaves to the host's own localization
/// instead of reimplementing.
#[derive(Clone, Debug, Default)]
pub struct KeyLabelOverrides {
    pub mouse: Option<String>,
    pub numpad: Option<String>,
}

impl KeyLabelOverrides {
    fn mouse_label(&self, index: u16) -> String {
        match &self.mouse {
            Some(template) => template.replace("%1", &index.to_string()),
            None => format!("Mouse {index}"),
        }
    }

    fn numpad_label(&self, digit: u8) -> String {
        match &self.numpad {
            Some(template) => template.replace("%1", &digit.to_string()),
            None => format!("Numpad {digit}"),
        }
    }
}

/// Formats a key combination for display using the host's localized
/// key-name conventions.
///
/// Modifier order is Shift -> Control/Command (swapped on macOS) -> Alt ->
/// the remaining Command/Control. `overrides` supplies mouse/numpad
/// labels when the default "Mouse N"/"Numpad N" form isn't wanted;
/// pass `None` to always use that default.
pub fn format_combination(
    combo: KeyCombination,
    style: PlatformNameStyle,
    overrides: Option<&KeyLabelOverrides>,
) -> String {
    let mut parts = Vec::with_capacity(5);
    if combo.modifiers.contains(Modifiers::SHIFT) {
        parts.push("Shift");
    }
    match style {
        PlatformNameStyle::MacOs => {
            if combo.modifiers.contains(Modifiers::COMMAND) {
                parts.push("Cmd");
            }
            if combo.modifiers.contains(Modifiers::ALT) {
                parts.push("Option");
            }
            if combo.modifiers.contains(Modifiers::CONTROL) {
                parts.push("Ctrl");
            }
        }
        PlatformNameStyle::Generic => {
            if combo.modifiers.contains(Modifiers::CONTROL) {
                parts.push("Ctrl");
            }
            if combo.modifiers.contains(Modifiers::ALT) {
                parts.push("Alt");
            }
            if combo.modifiers.contains(Modifiers::COMMAND) {
                parts.push("Win");
            }
        }
    }
    let key_name = format_key_label(combo.key, overrides);
    if key_name.is_empty() {
        parts.join("+")
    } else if parts.is_empty() {
        key_name
    } else {
        format!("{}+{}", parts.join("+"), key_name)
    }
}

fn format_key_label(key: PortableKey, overrides: Option<&KeyLabelOverrides>) -> String {
    static DEFAULT_OVERRIDES: KeyLabelOverrides = KeyLabelOverrides {
        mouse: None,
        numpad: None,
    };
    let overrides = overrides.unwrap_or(&DEFAULT_OVERRIDES);
    if let Some(index) = key.mouse_index() {
        return overrides.mouse_label(index);
    }
    if let Some(digit) = numpad_digit(key) {
        return overrides.numpad_label(digit);
    }
    if key == PortableKey::None {
        return String::new();
    }
    name_of(key)
        .strip_prefix("OBS_KEY_")
        .unwrap_or("?")
        .to_string()
}

fn numpad_digit(key: PortableKey) -> Option<u8> {
    use PortableKey::*;
    Some(match key {
        Numpad0 => 0,
        Numpad1 => 1,
        Numpad2 => 2,
        Numpad3 => 3,
        Numpad4 => 4,
        Numpad5 => 5,
        Numpad6 => 6,
        Numpad7 => 7,
        Numpad8 => 8,
        Numpad9 => 9,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_of_is_total() {
        assert_eq!(name_of(PortableKey::A), "OBS_KEY_A");
        assert_eq!(name_of(PortableKey::Unknown(9999)), "OBS_KEY_NONE");
    }

    #[test]
    fn key_from_name_accepts_every_name_of_output() {
        for raw in 0u16..=(PortableKey::LastValue as u16) {
            let key = PortableKey::from(raw);
            let name = name_of(key);
            if name != "OBS_KEY_NONE" || key == PortableKey::None {
                assert_eq!(key_from_name(name), key, "round-trip failed for {name}");
            }
        }
    }

    #[test]
    fn unrecognized_name_yields_none() {
        assert_eq!(key_from_name("not a real key"), PortableKey::None);
    }

    #[test]
    fn mouse_button_name_and_index() {
        assert_eq!(name_of(PortableKey::Mouse3), "OBS_KEY_MOUSE3");
        assert_eq!(PortableKey::Mouse3.mouse_index(), Some(3));
        assert_eq!(key_from_name("OBS_KEY_MOUSE3"), PortableKey::Mouse3);
    }

    #[test]
    fn empty_combination_is_empty() {
        assert!(KeyCombination::EMPTY.is_empty());
        assert!(!KeyCombination::from(PortableKey::A).is_empty());
    }

    #[test]
    fn modifiers_match_rule() {
        let empty = Modifiers::NONE;
        let ctrl = Modifiers::CONTROL;
        let ctrl_shift = Modifiers::CONTROL + Modifiers::SHIFT;
        assert!(empty.matches(ctrl_shift));
        assert!(ctrl.matches(ctrl_shift));
        assert!(!ctrl_shift.matches(ctrl));
    }

    #[test]
    fn format_combination_generic_order() {
        let combo = Modifiers::SHIFT + Modifiers::CONTROL + Modifiers::ALT + PortableKey::A;
        assert_eq!(
            format_combination(combo, PlatformNameStyle::Generic, None),
            "Shift+Ctrl+Alt+A"
        );
    }

    #[test]
    fn format_combination_macos_swaps_command_and_control() {
        let combo = Modifiers::COMMAND + Modifiers::CONTROL + PortableKey::B;
        assert_eq!(
            format_combination(combo, PlatformNameStyle::MacOs, None),
            "Cmd+Ctrl+B"
        );
    }

    #[test]
    fn format_mouse_and_numpad_default_labels() {
        assert_eq!(
            format_combination(PortableKey::Mouse2.into(), PlatformNameStyle::Generic, None),
            "Mouse 2"
        );
        assert_eq!(
            format_combination(PortableKey::Numpad7.into(), PlatformNameStyle::Generic, None),
            "Numpad 7"
        );
    }

    #[test]
    fn format_mouse_and_numpad_honor_overrides() {
        let overrides = KeyLabelOverrides {
            mouse: Some("Button %1".to_string()),
            numpad: Some("Pavé %1".to_string()),
        };
        assert_eq!(
            format_combination(
                PortableKey::Mouse2.into(),
                PlatformNameStyle::Generic,
                Some(&overrides)
            ),
            "Button 2"
        );
        assert_eq!(
            format_combination(
                PortableKey::Numpad7.into(),
                PlatformNameStyle::Generic,
                Some(&overrides)
            ),
            "Pavé 7"
        );
    }
}
