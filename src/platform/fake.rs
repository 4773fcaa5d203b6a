use std::collections::HashSet;
use std::sync::{
    Arc,
    Mutex,
};

use super::{
    KeyPoller,
    PlatformConfig,
};
use crate::key::PortableKey;

/// Test-only [`KeyPoller`] driven directly from a set of held keys, so the
/// polling state machine can be exercised deterministically without real
/// OS input.
///
/// Backed by an `Arc<Mutex<_>>` so a [`FakeKeyPollerHandle`] taken before
/// the poller is handed to `Core` can keep driving key state afterward.
pub struct FakeKeyPoller {
    held: Arc<Mutex<HashSet<PortableKey>>>,
}

impl FakeKeyPoller {
    pub fn new() -> Self {
        Self {
            held: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn handle(&self) -> FakeKeyPollerHandle {
        FakeKeyPollerHandle(self.held.clone())
    }

    pub fn press(&mut self, key: PortableKey) {
        self.held.lock().unwrap().insert(key);
    }

    pub fn release(&mut self, key: PortableKey) {
        self.held.lock().unwrap().remove(&key);
    }
}

impl Default for FakeKeyPoller {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle to press/release keys on a [`FakeKeyPoller`] that has
/// already been moved elsewhere (e.g. into a `Core`).
#[derive(Clone)]
pub struct FakeKeyPollerHandle(Arc<Mutex<HashSet<PortableKey>>>);

impl FakeKeyPollerHandle {
    pub fn press(&self, key: PortableKey) {
        self.0.lock().unwrap().insert(key);
    }

    pub fn release(&self, key: PortableKey) {
        self.0.lock().unwrap().remove(&key);
    }
}

impl KeyPoller for FakeKeyPoller {
    fn init(_config: &PlatformConfig) -> std::io::Result<Self> {
        Ok(Self::new())
    }

    fn teardown(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn is_pressed(&mut self, key: PortableKey) -> bool {
        self.held.lock().unwrap().contains(&key)
    }
}
