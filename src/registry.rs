//! Owns the hotkey and binding storage: issues ids, keeps bindings'
//! cached back-reference to their owning hotkey valid across storage
//! growth, and dispatches press/release callbacks.
//!
//! Grounded on `obs_hotkey_register_internal`/`unregister_hotkey`/
//! `remove_bindings`/`fixup_pointers`/`find_id`. Binding back-references
//! are an index into `hotkeys`, not a pointer, refreshed by
//! [`Registry::fixup_pointers`] after any mutation that can relocate
//! that vector — the language-neutral fix for a relocatable-storage
//! back-reference.

use std::collections::HashMap;

use crate::key::KeyCombination;

pub type HotkeyId = u64;

pub const INVALID_HOTKEY_ID: HotkeyId = u64::MAX;

/// Opaque handle to whatever object in the host application owns a
/// hotkey. The registry never dereferences it; it is returned back to
/// callers unchanged so they can recognize their own registrations.
pub type RegistererHandle = u64;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum RegistererKind {
    Frontend,
    Source,
    Encoder,
    Output,
    Service,
}

/// Whether a hotkey's callback is itself a "primary action" whose press
/// may be suppressed by `enable_background_primary(false)`.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub enum PrimaryAction {
    #[default]
    None,
    PressRelease,
}

/// Cheap, owned snapshot of a hotkey's identity passed to its callback.
/// Kept separate from [`Hotkey`] itself so the callback closure can be
/// taken out of its slot (to satisfy the borrow checker across the call)
/// without needing a live borrow of the hotkey that holds it.
#[derive(Clone, Debug)]
pub struct HotkeyInfo {
    pub id: HotkeyId,
    pub name: String,
    pub description: String,
    pub kind: RegistererKind,
    pub primary_action: PrimaryAction,
}

impl From<&Hotkey> for HotkeyInfo {
    fn from(h: &Hotkey) -> Self {
        Self {
            id: h.id,
            name: h.name.clone(),
            description: h.description.clone(),
            kind: h.kind,
            primary_action: h.primary_action,
        }
    }
}

pub type HotkeyCallback = Box<dyn FnMut(HotkeyId, &HotkeyInfo, bool) + Send>;

pub struct Hotkey {
    id: HotkeyId,
    name: String,
    description: String,
    kind: RegistererKind,
    #[allow(dead_code)]
    registerer: RegistererHandle,
    primary_action: PrimaryAction,
    press_count: u32,
    callback: HotkeyCallback,
}

impl Hotkey {
    pub fn id(&self) -> HotkeyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn press_count(&self) -> u32 {
        self.press_count
    }
}

/// A single physical key/modifier combination bound to a hotkey.
pub struct Binding {
    pub hotkey_id: HotkeyId,
    pub combination: KeyCombination,
    pub(crate) pressed: bool,
    /// Sticky hysteresis flag: whether modifiers matched as of the last
    /// tick this binding was visited. See the polling state machine.
    ///
    /// Starts `true` (armed): a freshly created binding hasn't yet had
    /// its modifiers "stuck held" through a release, so there is no
    /// prior mismatch tick to wait for.
    pub(crate) modifiers_match: bool,
    hotkey_index: usize,
}

impl Binding {
    pub fn pressed(&self) -> bool {
        self.pressed
    }
}

/// Per-registerer record: the ids it owns (weak, lookup-based — never
/// ownership of the `Hotkey` record) and a preloaded document of
/// previously-saved bindings consulted once, at registration time.
///
/// Deliberately does not derive `Clone`: two contexts both claiming
/// `owned_ids` would let `release_context` release the same hotkeys
/// twice from what look like independent owners.
#[derive(Default)]
pub struct RegistererContext {
    owned: Vec<HotkeyId>,
    document: Option<serde_json::Value>,
}

impl RegistererContext {
    pub fn new(document: Option<serde_json::Value>) -> Self {
        Self {
            owned: Vec::new(),
            document,
        }
    }

    pub fn owned_ids(&self) -> &[HotkeyId] {
        &self.owned
    }
}

#[derive(Default)]
pub struct Registry {
    hotkeys: Vec<Hotkey>,
    bindings: Vec<Binding>,
    id_index: HashMap<HotkeyId, usize>,
    next_id: HotkeyId,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn fixup_pointers(&mut self) {
        self.id_index.clear();
        for (index, hotkey) in self.hotkeys.iter().enumerate() {
            self.id_index.insert(hotkey.id, index);
        }
        for binding in &mut self.bindings {
            if let Some(&index) = self.id_index.get(&binding.hotkey_id) {
                binding.hotkey_index = index;
            }
        }
    }

    pub fn find_id(&self, id: HotkeyId) -> Option<&Hotkey> {
        self.id_index.get(&id).map(|&index| &self.hotkeys[index])
    }

    #[allow(clippy::too_many_arguments)]
    pub fn register_hotkey(
        &mut self,
        kind: RegistererKind,
        registerer: RegistererHandle,
        context: Option<&mut RegistererContext>,
        name: impl Into<String>,
        description: impl Into<String>,
        primary_action: PrimaryAction,
        callback: HotkeyCallback,
    ) -> HotkeyId {
        assert!(
            self.next_id < INVALID_HOTKEY_ID - 1,
            "hotkey id space exhausted"
        );
        let id = self.next_id;
        self.next_id += 1;
        let name = name.into();

        let before = self.hotkeys.as_ptr();
        self.hotkeys.push(Hotkey {
            id,
            name: name.clone(),
            description: description.into(),
            kind,
            registerer,
            primary_action,
            press_count: 0,
            callback,
        });
        let new_index = self.hotkeys.len() - 1;
        let relocated = !std::ptr::eq(before, self.hotkeys.as_ptr());

        if let Some(ctx) = context {
            if let Some(array) = ctx.document.as_ref().and_then(|doc| doc.get(name.as_str())) {
                for combination in crate::document::load_combinations(array) {
                    self.bindings.push(Binding {
                        hotkey_id: id,
                        combination,
                        pressed: false,
                        modifiers_match: true,
                        hotkey_index: new_index,
                    });
                }
            }
            ctx.owned.push(id);
        }

        if relocated {
            self.fixup_pointers();
        } else {
            self.id_index.insert(id, new_index);
        }

        id
    }

    /// Registers explicit combinations for an already-registered hotkey,
    /// bypassing the document adapter.
    pub fn load_bindings(&mut self, id: HotkeyId, combinations: impl IntoIterator<Item = KeyCombination>) {
        let Some(&index) = self.id_index.get(&id) else {
            tracing::debug!(id, "load_bindings: unknown hotkey id, ignoring");
            return;
        };
        for combination in combinations {
            self.bindings.push(Binding {
                hotkey_id: id,
                combination,
                pressed: false,
                modifiers_match: true,
                hotkey_index: index,
            });
        }
    }

    pub fn bindings_for(&self, id: HotkeyId) -> impl Iterator<Item = &Binding> + '_ {
        self.bindings.iter().filter(move |b| b.hotkey_id == id)
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Removes a single hotkey and all of its bindings, releasing any
    /// that were pressed first so a caller observing the teardown never
    /// sees a hotkey vanish while still "held".
    pub fn unregister(&mut self, id: HotkeyId) {
        let Some(&index) = self.id_index.get(&id) else {
            tracing::debug!(id, "unregister: unknown hotkey id, ignoring");
            return;
        };

        let owned: Vec<usize> = self
            .bindings
            .iter()
            .enumerate()
            .filter(|(_, b)| b.hotkey_id == id)
            .map(|(i, _)| i)
            .collect();
        for &bi in &owned {
            if self.bindings[bi].pressed {
                self.release_hotkey(index);
                self.bindings[bi].pressed = false;
            }
        }

        self.hotkeys.remove(index);
        for &bi in owned.iter().rev() {
            self.bindings.remove(bi);
        }
        self.fixup_pointers();
    }

    /// Unregisters every id a context owns, then drops the context's
    /// owned-id list and preloaded document.
    pub fn release_context(&mut self, context: &mut RegistererContext) {
        let ids = std::mem::take(&mut context.owned);
        for id in ids {
            self.unregister(id);
        }
        context.document = None;
    }

    pub fn enumerate_hotkeys<F: FnMut(&HotkeyInfo) -> bool>(&self, mut visit: F) {
        for hotkey in &self.hotkeys {
            if !visit(&HotkeyInfo::from(hotkey)) {
                break;
            }
        }
    }

    pub fn enumerate_bindings<F: FnMut(&Binding) -> bool>(&self, mut visit: F) {
        for binding in &self.bindings {
            if !visit(binding) {
                break;
            }
        }
    }

    pub(crate) fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub(crate) fn binding_at(&self, index: usize) -> &Binding {
        &self.bindings[index]
    }

    pub(crate) fn binding_at_mut(&mut self, index: usize) -> &mut Binding {
        &mut self.bindings[index]
    }

    pub(crate) fn hotkey_index_of(&self, binding_index: usize) -> usize {
        self.bindings[binding_index].hotkey_index
    }

    pub(crate) fn hotkey_primary_action_at(&self, hotkey_index: usize) -> PrimaryAction {
        self.hotkeys[hotkey_index].primary_action
    }

    /// Increments the press count of the hotkey at `hotkey_index`,
    /// invoking its callback with `pressed=true` iff the count was zero.
    pub(crate) fn press_hotkey(&mut self, hotkey_index: usize) {
        let was_zero = self.hotkeys[hotkey_index].press_count == 0;
        self.hotkeys[hotkey_index].press_count += 1;
        if was_zero {
            self.invoke_callback(hotkey_index, true);
        }
    }

    /// Decrements the press count of the hotkey at `hotkey_index`,
    /// invoking its callback with `pressed=false` iff the count reaches
    /// zero.
    pub(crate) fn release_hotkey(&mut self, hotkey_index: usize) {
        let hotkey = &mut self.hotkeys[hotkey_index];
        debug_assert!(hotkey.press_count > 0);
        hotkey.press_count = hotkey.press_count.saturating_sub(1);
        if hotkey.press_count == 0 {
            self.invoke_callback(hotkey_index, false);
        }
    }

    /// Calls a hotkey's callback while it is temporarily swapped out of
    /// its slot, so the call doesn't need a live `&mut` borrow of the
    /// same `Hotkey` the closure is stored in.
    fn invoke_callback(&mut self, hotkey_index: usize, pressed: bool) {
        let info = HotkeyInfo::from(&self.hotkeys[hotkey_index]);
        let mut callback = std::mem::replace(
            &mut self.hotkeys[hotkey_index].callback,
            Box::new(|_, _, _| {}),
        );
        callback(info.id, &info, pressed);
        self.hotkeys[hotkey_index].callback = callback;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::key::{KeyCombination, Modifiers, PortableKey};

    fn recording_callback() -> (HotkeyCallback, Arc<Mutex<Vec<bool>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let recorded = events.clone();
        let callback: HotkeyCallback = Box::new(move |_, _, pressed| {
            recorded.lock().unwrap().push(pressed);
        });
        (callback, events)
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let mut registry = Registry::new();
        let mut ids = Vec::new();
        for i in 0..10 {
            let (cb, _) = recording_callback();
            ids.push(registry.register_hotkey(
                RegistererKind::Frontend,
                0,
                None,
                format!("hk{i}"),
                "",
                PrimaryAction::None,
                cb,
            ));
        }
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn unregister_releases_pressed_binding_and_drops_bindings() {
        let mut registry = Registry::new();
        let (cb, events) = recording_callback();
        let id = registry.register_hotkey(
            RegistererKind::Frontend,
            0,
            None,
            "hk",
            "",
            PrimaryAction::None,
            cb,
        );
        registry.load_bindings(id, [KeyCombination::new(Modifiers::NONE, PortableKey::A)]);
        assert_eq!(registry.binding_count(), 1);

        registry.press_hotkey(registry.hotkey_index_of(0));
        registry.binding_at_mut(0).pressed = true;

        registry.unregister(id);
        assert_eq!(registry.binding_count(), 0);
        assert!(registry.find_id(id).is_none());
        assert_eq!(*events.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn back_reference_survives_storage_growth() {
        let mut registry = Registry::new();
        let (cb, events) = recording_callback();
        let first_id = registry.register_hotkey(
            RegistererKind::Frontend,
            0,
            None,
            "first",
            "",
            PrimaryAction::None,
            cb,
        );

        for i in 0..2000 {
            let (cb, _) = recording_callback();
            registry.register_hotkey(
                RegistererKind::Frontend,
                0,
                None,
                format!("filler{i}"),
                "",
                PrimaryAction::None,
                cb,
            );
        }

        let hotkey = registry.find_id(first_id).expect("still registered");
        assert_eq!(hotkey.id(), first_id);

        registry.load_bindings(
            first_id,
            [KeyCombination::new(Modifiers::NONE, PortableKey::A)],
        );
        let binding_index = registry.binding_count() - 1;
        let hotkey_index = registry.hotkey_index_of(binding_index);
        registry.press_hotkey(hotkey_index);
        assert_eq!(*events.lock().unwrap(), vec![true]);
    }

    #[test]
    fn press_count_matches_pressed_binding_count() {
        let mut registry = Registry::new();
        let (cb, _) = recording_callback();
        let id = registry.register_hotkey(
            RegistererKind::Frontend,
            0,
            None,
            "hk",
            "",
            PrimaryAction::None,
            cb,
        );
        registry.load_bindings(
            id,
            [
                KeyCombination::new(Modifiers::NONE, PortableKey::A),
                KeyCombination::new(Modifiers::SHIFT, PortableKey::A),
            ],
        );
        let hotkey_index = registry.hotkey_index_of(0);
        registry.press_hotkey(hotkey_index);
        registry.binding_at_mut(0).pressed = true;
        registry.press_hotkey(hotkey_index);
        registry.binding_at_mut(1).pressed = true;

        assert_eq!(registry.find_id(id).unwrap().press_count(), 2);
    }
}
