//! The per-tick snapshot, per-binding update, and injection paths.
//!
//! Ported line-for-line from `modifiers_match`/`handle_binding`/
//! `release_pressed_binding`/`inject_hotkey`/`query_hotkey`/
//! `query_hotkeys`. Both the polling tick and synthetic injection
//! funnel through [`update_binding`]; they differ only in how
//! `pressed_hint` and `no_primary` are derived.

use crate::key::{
    KeyCombination,
    Modifiers,
    PortableKey,
};
use crate::platform::KeyPoller;
use crate::registry::{
    PrimaryAction,
    Registry,
};

/// Samples the four modifier keys via the platform poller, combining
/// them into one mask (`query_hotkeys`' modifier snapshot).
pub fn sample_modifiers(poller: &mut dyn KeyPoller) -> Modifiers {
    let mut mask = Modifiers::NONE;
    if poller.is_pressed(PortableKey::Shift) {
        mask = mask + Modifiers::SHIFT;
    }
    if poller.is_pressed(PortableKey::Control) {
        mask = mask + Modifiers::CONTROL;
    }
    if poller.is_pressed(PortableKey::Alt) {
        mask = mask + Modifiers::ALT;
    }
    if poller.is_pressed(PortableKey::Meta) {
        mask = mask + Modifiers::COMMAND;
    }
    mask
}

/// Runs one background-worker tick: sample modifiers, then update every
/// binding against current physical key state (`query_hotkey` per
/// binding, driven from `query_hotkeys`).
pub fn poll_tick(registry: &mut Registry, poller: &mut dyn KeyPoller, no_primary: bool) {
    let modifiers = sample_modifiers(poller);
    for index in 0..registry.binding_count() {
        let key = registry.binding_at(index).combination.key;
        let physical = poller.is_pressed(key);
        update_binding(registry, index, modifiers, None, physical, no_primary);
    }
}

/// Runs the injection path: a synthetic `(combination, pressed)` event
/// bypasses the OS poller. A binding whose modifiers don't match the
/// injected combination's modifiers is left untouched entirely (not
/// reset, not released) — injection only speaks for the one modifier
/// state it carries, unlike a polling tick which observes the whole
/// keyboard. Mirrors `inject_hotkey`'s own `modifiers_match` guard
/// around its call into the per-binding update.
pub fn inject(registry: &mut Registry, combination: KeyCombination, pressed: bool) {
    for index in 0..registry.binding_count() {
        let binding = registry.binding_at(index);
        if !binding.combination.modifiers.matches(combination.modifiers) {
            continue;
        }
        let hint = pressed && binding.combination.key == combination.key;
        update_binding(
            registry,
            index,
            combination.modifiers,
            Some(hint),
            false,
            false,
        );
    }
}

/// The per-binding update itself. `modifiers` is the current tick's
/// modifier mask; `pressed_hint` overrides the physical-key query when
/// present (the injection path); `fallback_physical` is what the
/// polling path already sampled for this binding's key when
/// `pressed_hint` is absent.
fn update_binding(
    registry: &mut Registry,
    binding_index: usize,
    modifiers: Modifiers,
    pressed_hint: Option<bool>,
    fallback_physical: bool,
    no_primary: bool,
) {
    let combination = registry.binding_at(binding_index).combination;
    let empty = combination.is_empty();
    let modifiers_match_now = combination.modifiers.matches(modifiers);
    let physical = pressed_hint.unwrap_or(fallback_physical);
    let hysteresis_ok = registry.binding_at(binding_index).modifiers_match;

    let active = !empty && modifiers_match_now && hysteresis_ok && physical;

    let hotkey_index = registry.hotkey_index_of(binding_index);
    let is_primary_release = registry.hotkey_primary_action_at(hotkey_index) == PrimaryAction::PressRelease;

    if active {
        if !registry.binding_at(binding_index).pressed {
            if no_primary && is_primary_release {
                return;
            }
            registry.binding_at_mut(binding_index).pressed = true;
            registry.press_hotkey(hotkey_index);
        }
        return;
    }

    registry.binding_at_mut(binding_index).modifiers_match = modifiers_match_now;

    if registry.binding_at(binding_index).pressed {
        // Unlike the press path above, a release is never suppressed by
        // `no_primary`: disabling background primary actions must not
        // leave a hotkey stuck "pressed" once its key physically lifts.
        registry.binding_at_mut(binding_index).pressed = false;
        registry.release_hotkey(hotkey_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fake::FakeKeyPoller;
    use crate::platform::{
        KeyPoller,
        PlatformConfig,
    };
    use crate::registry::{
        HotkeyCallback,
        RegistererKind,
    };
    use std::sync::{
        Arc,
        Mutex,
    };

    fn recording() -> (HotkeyCallback, Arc<Mutex<Vec<bool>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let recorded = events.clone();
        let cb: HotkeyCallback = Box::new(move |_, _, pressed| recorded.lock().unwrap().push(pressed));
        (cb, events)
    }

    #[test]
    fn plain_press_and_release_fire_once_each() {
        let mut registry = Registry::new();
        let (cb, events) = recording();
        let id = registry.register_hotkey(
            RegistererKind::Frontend,
            0,
            None,
            "test",
            "",
            PrimaryAction::None,
            cb,
        );
        registry.load_bindings(id, [Modifiers::CONTROL + PortableKey::A]);
        registry.binding_at_mut(0).modifiers_match = true;

        let mut poller = FakeKeyPoller::init(&PlatformConfig::default()).unwrap();
        poller.press(PortableKey::Control);
        poller.press(PortableKey::A);
        poll_tick(&mut registry, &mut poller, false);
        assert_eq!(*events.lock().unwrap(), vec![true]);

        poller.release(PortableKey::A);
        poller.release(PortableKey::Control);
        poll_tick(&mut registry, &mut poller, false);
        assert_eq!(*events.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn hysteresis_requires_a_mismatch_tick_before_rearming() {
        let mut registry = Registry::new();
        let (cb, events) = recording();
        let id = registry.register_hotkey(
            RegistererKind::Frontend,
            0,
            None,
            "test",
            "",
            PrimaryAction::None,
            cb,
        );
        registry.load_bindings(id, [Modifiers::SHIFT + PortableKey::A]);
        registry.binding_at_mut(0).modifiers_match = true;

        let mut poller = FakeKeyPoller::init(&PlatformConfig::default()).unwrap();
        poller.press(PortableKey::Shift);
        poller.press(PortableKey::A);
        poll_tick(&mut registry, &mut poller, false);
        assert_eq!(*events.lock().unwrap(), vec![true]);

        // release A but keep Shift held: still matches modifiers, so the
        // binding must not re-fire without an intervening mismatch tick.
        poller.release(PortableKey::A);
        poll_tick(&mut registry, &mut poller, false);
        assert_eq!(*events.lock().unwrap(), vec![true, false]);

        poller.press(PortableKey::A);
        poll_tick(&mut registry, &mut poller, false);
        assert_eq!(*events.lock().unwrap(), vec![true, false, true]);
    }

    #[test]
    fn empty_combination_never_fires() {
        let mut registry = Registry::new();
        let (cb, events) = recording();
        let id = registry.register_hotkey(
            RegistererKind::Frontend,
            0,
            None,
            "test",
            "",
            PrimaryAction::None,
            cb,
        );
        registry.load_bindings(id, [KeyCombination::EMPTY]);
        registry.binding_at_mut(0).modifiers_match = true;

        let mut poller = FakeKeyPoller::init(&PlatformConfig::default()).unwrap();
        poll_tick(&mut registry, &mut poller, false);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn no_primary_suppresses_press_of_a_key_never_pressed() {
        let mut registry = Registry::new();
        let (cb, events) = recording();
        let id = registry.register_hotkey(
            RegistererKind::Frontend,
            0,
            None,
            "test",
            "",
            PrimaryAction::PressRelease,
            cb,
        );
        registry.load_bindings(id, [KeyCombination::new(Modifiers::NONE, PortableKey::F1)]);
        registry.binding_at_mut(0).modifiers_match = true;

        let mut poller = FakeKeyPoller::init(&PlatformConfig::default()).unwrap();
        poller.press(PortableKey::F1);
        poll_tick(&mut registry, &mut poller, true);
        assert!(events.lock().unwrap().is_empty());
        assert!(!registry.binding_at(0).pressed());

        poller.release(PortableKey::F1);
        poll_tick(&mut registry, &mut poller, true);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn disabling_primary_after_a_press_still_releases_it() {
        let mut registry = Registry::new();
        let (cb, events) = recording();
        let id = registry.register_hotkey(
            RegistererKind::Frontend,
            0,
            None,
            "test",
            "",
            PrimaryAction::PressRelease,
            cb,
        );
        registry.load_bindings(id, [KeyCombination::new(Modifiers::NONE, PortableKey::F1)]);
        registry.binding_at_mut(0).modifiers_match = true;

        let mut poller = FakeKeyPoller::init(&PlatformConfig::default()).unwrap();
        poller.press(PortableKey::F1);
        poll_tick(&mut registry, &mut poller, false);
        assert_eq!(*events.lock().unwrap(), vec![true]);
        assert!(registry.binding_at(0).pressed());

        // Background primary actions get disabled while the key is still
        // physically held down.
        poller.release(PortableKey::F1);
        poll_tick(&mut registry, &mut poller, true);
        assert_eq!(
            *events.lock().unwrap(),
            vec![true, false],
            "a binding that was already pressed must still release even with no_primary set"
        );
        assert!(!registry.binding_at(0).pressed());
    }

    #[test]
    fn injection_only_fires_bindings_matching_injected_modifiers() {
        let mut registry = Registry::new();
        let (cb, events) = recording();
        let id = registry.register_hotkey(
            RegistererKind::Frontend,
            0,
            None,
            "test",
            "",
            PrimaryAction::None,
            cb,
        );
        registry.load_bindings(
            id,
            [
                Modifiers::CONTROL + PortableKey::A,
                Modifiers::SHIFT + PortableKey::A,
            ],
        );
        registry.binding_at_mut(0).modifiers_match = true;
        registry.binding_at_mut(1).modifiers_match = true;

        inject(
            &mut registry,
            KeyCombination::new(Modifiers::CONTROL, PortableKey::A),
            true,
        );
        assert_eq!(*events.lock().unwrap(), vec![true]);

        inject(
            &mut registry,
            KeyCombination::new(Modifiers::CONTROL, PortableKey::A),
            false,
        );
        assert_eq!(*events.lock().unwrap(), vec![true, false]);
    }
}
