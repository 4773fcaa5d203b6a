/*!
A global hotkey registry for a long-running media-production host
application: named hotkeys bound to zero or more physical key/modifier
combinations, polled on a background cadence, debounced into
press/release callbacks, and persisted to and from a neutral JSON
document format.
*/

pub mod document;
pub mod error;
pub mod key;
pub mod pair;
pub mod platform;
pub mod polling;
pub mod registry;
mod facade;
mod worker;

pub use error::HotkeyError;
pub use facade::{
    Core,
    Signal,
};
pub use key::{
    format_combination,
    key_from_name,
    name_of,
    KeyCombination,
    KeyLabelOverrides,
    Modifiers,
    PlatformNameStyle,
    PortableKey,
};
pub use pair::PairCallback;
pub use platform::PlatformConfig;
pub use registry::{
    Binding,
    HotkeyCallback,
    HotkeyId,
    HotkeyInfo,
    PrimaryAction,
    RegistererContext,
    RegistererHandle,
    RegistererKind,
    INVALID_HOTKEY_ID,
};
