//! `register_pair`: two hotkeys representing mutually exclusive press/
//! release of a toggle, where firing one suppresses the other for one
//! tick.
//!
//! The core only ever sees two ordinary hotkeys; this module is the
//! thin wrapper that gives them a shared "which side is currently
//! active" predicate and forwards through it: a shared `Arc<AtomicBool>`
//! consulted by each side's callback before it forwards to the caller's
//! pair callback.

use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::sync::Arc;

use crate::registry::{
    HotkeyId,
    HotkeyInfo,
};

/// Caller-supplied callback for one side of a pair. Mirrors the plain
/// hotkey callback signature plus a bool return: `true` if this press
/// should be considered "active" going forward, consulted by the other
/// side before it forwards its own callback.
pub type PairCallback = Box<dyn FnMut(HotkeyId, &HotkeyInfo, bool) -> bool + Send>;

/// Wraps a pair side's callback so it checks (and then updates) the
/// shared active flag before forwarding to the caller-supplied
/// callback.
pub fn wrap_pair_side(
    active: Arc<AtomicBool>,
    other_active: Arc<AtomicBool>,
    mut callback: PairCallback,
) -> Box<dyn FnMut(HotkeyId, &HotkeyInfo, bool) + Send> {
    Box::new(move |id, info, pressed| {
        if other_active.load(Ordering::Acquire) {
            // The other side fired this tick; this side is suppressed
            // for the duration of its activity.
            return;
        }
        let now_active = callback(id, info, pressed);
        active.store(now_active, Ordering::Release);
    })
}

/// Builds the pair of shared flags `register_pair` needs, one per
/// side's "am I active" predicate consulted by the other side.
pub fn new_pair_flags() -> (Arc<AtomicBool>, Arc<AtomicBool>) {
    (
        Arc::new(AtomicBool::new(false)),
        Arc::new(AtomicBool::new(false)),
    )
}
