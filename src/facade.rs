//! `Core`: the public façade wrapping the registry and platform poller
//! in one global lock, plus the background worker and the signal
//! observer registry.
//!
//! Grounded on the `obs_hotkey_*` public entry points (one method here
//! per C function) and on `obs->hotkeys`'s
//! single-mutex-plus-background-thread shape. `Core` is an
//! explicitly-constructed object the host application owns — nothing
//! here hides behind implicit initialization — and the worker is a
//! child of `Core`, joined on `Core`'s destruction.

use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::sync::{
    Arc,
    Mutex,
};

use serde_json::Value;

use crate::document;
use crate::error::HotkeyError;
use crate::key::KeyCombination;
use crate::pair::{
    self,
    PairCallback,
};
use crate::platform::{
    self,
    KeyPoller,
    PlatformConfig,
};
use crate::polling;
use crate::registry::{
    Binding,
    HotkeyCallback,
    HotkeyId,
    HotkeyInfo,
    PrimaryAction,
    Registry,
    RegistererContext,
    RegistererHandle,
    RegistererKind,
};
use crate::worker::Worker;

/// Observer notification emitted by [`Core`] after a state change, always
/// invoked outside the registry lock.
#[derive(Clone, Copy, Debug)]
pub enum Signal {
    /// The Key Codec's keysym/keycode mapping was rebuilt in response to
    /// an OS-reported keyboard layout change.
    LayoutChange,
    Register(HotkeyId),
    Unregister(HotkeyId),
}

type Observer = Box<dyn Fn(Signal) + Send + Sync>;

struct CoreState {
    registry: Registry,
    poller: Box<dyn KeyPoller>,
}

/// Process-wide hotkey engine: one instance per process, initialized
/// before any register call, torn down after the background worker has
/// joined.
pub struct Core {
    state: Arc<Mutex<CoreState>>,
    worker: Mutex<Option<Worker>>,
    background_primary_enabled: Arc<AtomicBool>,
    observers: Mutex<Vec<Observer>>,
    torn_down: AtomicBool,
}

impl Core {
    /// Initializes the platform poller, degrading to a no-op poller and
    /// logging a warning if it fails. A platform init failure is never
    /// propagated to the caller here; see [`Core::try_new`] for that.
    pub fn new(config: PlatformConfig) -> Self {
        Self::build(platform::init_default_or_degraded(&config))
    }

    /// Like [`Core::new`], but surfaces a platform init failure to the
    /// caller instead of degrading.
    pub fn try_new(config: PlatformConfig) -> Result<Self, HotkeyError> {
        let poller = platform::init_default(&config).map_err(HotkeyError::PlatformInit)?;
        Ok(Self::build(poller))
    }

    #[cfg(any(test, feature = "test-util"))]
    pub fn with_poller(poller: Box<dyn KeyPoller>) -> Self {
        Self::build(poller)
    }

    /// Runs one polling tick immediately, using the current background-
    /// primary setting, instead of waiting on the worker's own cadence.
    /// For tests that need to observe the polling path (as opposed to
    /// the injection path) without sleeping past the tick interval.
    #[cfg(any(test, feature = "test-util"))]
    pub fn force_poll_tick(&self) {
        let mut guard = self.state.lock().unwrap();
        let no_primary = !self.background_primary_enabled.load(Ordering::Acquire);
        let CoreState { registry, poller } = &mut *guard;
        polling::poll_tick(registry, poller.as_mut(), no_primary);
    }

    fn build(poller: Box<dyn KeyPoller>) -> Self {
        let state = Arc::new(Mutex::new(CoreState {
            registry: Registry::new(),
            poller,
        }));
        let background_primary_enabled = Arc::new(AtomicBool::new(true));

        let tick_state = state.clone();
        let tick_enabled = background_primary_enabled.clone();
        let worker = Worker::spawn(move || {
            let mut guard = tick_state.lock().unwrap();
            let no_primary = !tick_enabled.load(Ordering::Acquire);
            let CoreState { registry, poller } = &mut *guard;
            polling::poll_tick(registry, poller.as_mut(), no_primary);
        });

        Self {
            state,
            worker: Mutex::new(Some(worker)),
            background_primary_enabled,
            observers: Mutex::new(Vec::new()),
            torn_down: AtomicBool::new(false),
        }
    }

    /// Stops the background worker and tears down the platform poller.
    /// Idempotent; safe to call more than once (only the first call does
    /// anything).
    pub fn shutdown(&self) -> Result<(), HotkeyError> {
        if self
            .torn_down
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }
        if let Some(mut worker) = self.worker.lock().unwrap().take() {
            worker.shutdown();
        }
        self.state
            .lock()
            .unwrap()
            .poller
            .teardown()
            .map_err(HotkeyError::PlatformTeardown)
    }

    fn emit(&self, signal: Signal) {
        for observer in self.observers.lock().unwrap().iter() {
            observer(signal);
        }
    }

    /// Registers an observer invoked on every [`Signal`], outside the
    /// registry lock.
    pub fn on_signal(&self, observer: impl Fn(Signal) + Send + Sync + 'static) {
        self.observers.lock().unwrap().push(Box::new(observer));
    }

    fn register_internal(
        &self,
        kind: RegistererKind,
        registerer: RegistererHandle,
        context: Option<&mut RegistererContext>,
        name: impl Into<String>,
        description: impl Into<String>,
        primary_action: PrimaryAction,
        callback: HotkeyCallback,
    ) -> HotkeyId {
        let name = name.into();
        let description = description.into();
        tracing::debug!(%name, ?kind, "registering hotkey");
        let id = {
            let mut state = self.state.lock().unwrap();
            state.registry.register_hotkey(
                kind,
                registerer,
                context,
                name,
                description,
                primary_action,
                callback,
            )
        };
        self.emit(Signal::Register(id));
        id
    }

    pub fn register_frontend(
        &self,
        registerer: RegistererHandle,
        name: impl Into<String>,
        description: impl Into<String>,
        primary_action: PrimaryAction,
        callback: HotkeyCallback,
    ) -> HotkeyId {
        self.register_internal(
            RegistererKind::Frontend,
            registerer,
            None,
            name,
            description,
            primary_action,
            callback,
        )
    }

    pub fn register_source(
        &self,
        registerer: RegistererHandle,
        context: &mut RegistererContext,
        name: impl Into<String>,
        description: impl Into<String>,
        primary_action: PrimaryAction,
        callback: HotkeyCallback,
    ) -> HotkeyId {
        self.register_internal(
            RegistererKind::Source,
            registerer,
            Some(context),
            name,
            description,
            primary_action,
            callback,
        )
    }

    pub fn register_encoder(
        &self,
        registerer: RegistererHandle,
        context: &mut RegistererContext,
        name: impl Into<String>,
        description: impl Into<String>,
        primary_action: PrimaryAction,
        callback: HotkeyCallback,
    ) -> HotkeyId {
        self.register_internal(
            RegistererKind::Encoder,
            registerer,
            Some(context),
            name,
            description,
            primary_action,
            callback,
        )
    }

    pub fn register_output(
        &self,
        registerer: RegistererHandle,
        context: &mut RegistererContext,
        name: impl Into<String>,
        description: impl Into<String>,
        primary_action: PrimaryAction,
        callback: HotkeyCallback,
    ) -> HotkeyId {
        self.register_internal(
            RegistererKind::Output,
            registerer,
            Some(context),
            name,
            description,
            primary_action,
            callback,
        )
    }

    pub fn register_service(
        &self,
        registerer: RegistererHandle,
        context: &mut RegistererContext,
        name: impl Into<String>,
        description: impl Into<String>,
        primary_action: PrimaryAction,
        callback: HotkeyCallback,
    ) -> HotkeyId {
        self.register_internal(
            RegistererKind::Service,
            registerer,
            Some(context),
            name,
            description,
            primary_action,
            callback,
        )
    }

    /// Two hotkeys representing mutually exclusive press/release of a
    /// toggle; firing one suppresses the other for as long as it stays
    /// active. See [`crate::pair`].
    pub fn register_pair(
        &self,
        registerer: RegistererHandle,
        name_a: impl Into<String>,
        description_a: impl Into<String>,
        callback_a: PairCallback,
        name_b: impl Into<String>,
        description_b: impl Into<String>,
        callback_b: PairCallback,
    ) -> (HotkeyId, HotkeyId) {
        let (active_a, active_b) = pair::new_pair_flags();
        let wrapped_a = pair::wrap_pair_side(active_a.clone(), active_b.clone(), callback_a);
        let wrapped_b = pair::wrap_pair_side(active_b, active_a, callback_b);
        let id_a = self.register_frontend(registerer, name_a, description_a, PrimaryAction::None, wrapped_a);
        let id_b = self.register_frontend(registerer, name_b, description_b, PrimaryAction::None, wrapped_b);
        (id_a, id_b)
    }

    pub fn unregister(&self, id: HotkeyId) {
        self.state.lock().unwrap().registry.unregister(id);
        self.emit(Signal::Unregister(id));
    }

    /// Unregisters every hotkey the context owns, then drops the
    /// context's owned-id list and preloaded document.
    pub fn release_context(&self, context: &mut RegistererContext) {
        let released: Vec<HotkeyId> = context.owned_ids().to_vec();
        self.state.lock().unwrap().registry.release_context(context);
        for id in released {
            self.emit(Signal::Unregister(id));
        }
    }

    pub fn load_bindings(&self, id: HotkeyId, combinations: impl IntoIterator<Item = KeyCombination>) {
        self.state.lock().unwrap().registry.load_bindings(id, combinations);
    }

    pub fn load(&self, id: HotkeyId, array: &Value) {
        let combinations = document::load_combinations(array);
        self.load_bindings(id, combinations);
    }

    fn load_context(&self, context: &RegistererContext, document_value: &Value) {
        let mut state = self.state.lock().unwrap();
        for &id in context.owned_ids() {
            let Some(name) = state.registry.find_id(id).map(|h| h.name().to_string()) else {
                continue;
            };
            if let Some(array) = document_value.get(&name) {
                let combinations = document::load_combinations(array);
                state.registry.load_bindings(id, combinations);
            }
        }
    }

    pub fn load_source(&self, context: &RegistererContext, document_value: &Value) {
        self.load_context(context, document_value);
    }

    pub fn load_encoder(&self, context: &RegistererContext, document_value: &Value) {
        self.load_context(context, document_value);
    }

    pub fn load_output(&self, context: &RegistererContext, document_value: &Value) {
        self.load_context(context, document_value);
    }

    pub fn load_service(&self, context: &RegistererContext, document_value: &Value) {
        self.load_context(context, document_value);
    }

    pub fn save(&self, id: HotkeyId) -> Value {
        let state = self.state.lock().unwrap();
        document::save_hotkey(id, state.registry.bindings().iter())
    }

    fn save_context(&self, context: &RegistererContext) -> Value {
        let state = self.state.lock().unwrap();
        let named: Vec<(String, HotkeyId)> = context
            .owned_ids()
            .iter()
            .filter_map(|&id| state.registry.find_id(id).map(|h| (h.name().to_string(), id)))
            .collect();
        document::save_registerer_context(
            named.iter().map(|(name, id)| (name.as_str(), *id)),
            state.registry.bindings(),
        )
    }

    pub fn save_source(&self, context: &RegistererContext) -> Value {
        self.save_context(context)
    }

    pub fn save_encoder(&self, context: &RegistererContext) -> Value {
        self.save_context(context)
    }

    pub fn save_output(&self, context: &RegistererContext) -> Value {
        self.save_context(context)
    }

    pub fn save_service(&self, context: &RegistererContext) -> Value {
        self.save_context(context)
    }

    pub fn enumerate_hotkeys(&self, visit: impl FnMut(&HotkeyInfo) -> bool) {
        self.state.lock().unwrap().registry.enumerate_hotkeys(visit);
    }

    pub fn enumerate_bindings(&self, visit: impl FnMut(&Binding) -> bool) {
        self.state.lock().unwrap().registry.enumerate_bindings(visit);
    }

    pub fn inject_event(&self, combination: KeyCombination, pressed: bool) {
        let mut state = self.state.lock().unwrap();
        polling::inject(&mut state.registry, combination, pressed);
    }

    /// Sets the "suppress primary actions" flag consulted by the polling
    /// state machine's primary-action gate.
    pub fn enable_background_primary(&self, enabled: bool) {
        tracing::info!(enabled, "background primary actions");
        self.background_primary_enabled.store(enabled, Ordering::Release);
    }

    /// Rebuilds the platform poller's keysym/keycode cache and emits
    /// `hotkey_layout_change`, in response to an OS-reported keyboard
    /// layout change.
    pub fn notify_keyboard_layout_changed(&self) {
        self.state.lock().unwrap().poller.rebuild_keymap();
        tracing::info!("keyboard layout changed, keymap rebuilt");
        self.emit(Signal::LayoutChange);
    }
}

impl Drop for Core {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            tracing::error!(error = %err, "platform teardown failed during Core drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{
        Modifiers,
        PortableKey,
    };
    use crate::platform::fake::FakeKeyPoller;
    use std::sync::atomic::AtomicU32;

    fn test_core() -> Core {
        Core::with_poller(Box::new(FakeKeyPoller::default()))
    }

    #[test]
    fn register_and_inject_round_trip() {
        let core = test_core();
        let events: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
        let recorded = events.clone();
        let id = core.register_frontend(
            0,
            "test",
            "",
            PrimaryAction::None,
            Box::new(move |_, _, pressed| recorded.lock().unwrap().push(pressed)),
        );
        core.load_bindings(id, [Modifiers::CONTROL + PortableKey::A]);

        core.inject_event(KeyCombination::new(Modifiers::CONTROL, PortableKey::A), true);
        core.inject_event(KeyCombination::new(Modifiers::CONTROL, PortableKey::A), false);

        assert_eq!(*events.lock().unwrap(), vec![true, false]);
        core.shutdown().unwrap();
    }

    #[test]
    fn signals_fire_for_register_and_unregister() {
        let core = test_core();
        let seen = Arc::new(AtomicU32::new(0));
        let counted = seen.clone();
        core.on_signal(move |signal| {
            if matches!(signal, Signal::Register(_) | Signal::Unregister(_)) {
                counted.fetch_add(1, Ordering::SeqCst);
            }
        });

        let id = core.register_frontend(0, "test", "", PrimaryAction::None, Box::new(|_, _, _| {}));
        core.unregister(id);

        assert_eq!(seen.load(Ordering::SeqCst), 2);
        core.shutdown().unwrap();
    }

    #[test]
    fn save_round_trips_through_document() {
        let core = test_core();
        let id = core.register_frontend(0, "test", "", PrimaryAction::None, Box::new(|_, _, _| {}));
        core.load(id, &serde_json::json!([{"key": "OBS_KEY_F1"}]));
        let saved = core.save(id);
        assert_eq!(saved, serde_json::json!([{"key": "OBS_KEY_F1"}]));
        core.shutdown().unwrap();
    }
}
