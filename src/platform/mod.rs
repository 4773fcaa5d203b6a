/*!
The narrow platform capability the rest of the core consumes: "is this
portable key currently held?", plus init/teardown of whatever OS handles
that requires.
*/

use crate::key::PortableKey;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsPoller as DefaultPoller;

#[cfg(unix)]
mod x11;
#[cfg(unix)]
pub use x11::X11Poller as DefaultPoller;

#[cfg(any(test, feature = "test-util"))]
pub mod fake;

/// Configuration handed to [`KeyPoller::init`].
///
/// Currently empty; present so a platform backend can grow options (e.g. an
/// alternate X11 display name) without changing the trait signature.
#[derive(Clone, Default, Debug)]
pub struct PlatformConfig {
    /// X11 display name override; `None` uses `$DISPLAY`. Ignored on Windows.
    pub x11_display: Option<String>,
}

/// Capability to query physical keyboard/mouse state, safe to call from any
/// thread. The registry's lock is already held whenever the polling state
/// machine calls `is_pressed`, so implementations don't need their own
/// internal locking for that call path.
pub trait KeyPoller: Send {
    /// Inits whatever OS handles this backend needs.
    fn init(config: &PlatformConfig) -> std::io::Result<Self>
    where
        Self: Sized;

    /// Tears down OS handles. Called once, from the same thread that owns
    /// the poller.
    fn teardown(&mut self) -> std::io::Result<()>;

    /// True if `key` is currently held. Unknown/unsupported keys return
    /// `false`, never an error.
    fn is_pressed(&mut self, key: PortableKey) -> bool;

    /// Rebuilds any cached keysym/keycode table after an OS-reported
    /// keyboard layout change. A no-op on backends with no such cache.
    fn rebuild_keymap(&mut self) {}
}

/// Stand-in poller used when the real platform backend fails to
/// initialize; every key reports as not pressed. This is what lets the
/// core still initialize in a degraded state rather than refusing to
/// come up at all.
struct DegradedPoller;

impl KeyPoller for DegradedPoller {
    fn init(_config: &PlatformConfig) -> std::io::Result<Self> {
        Ok(Self)
    }

    fn teardown(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn is_pressed(&mut self, _key: PortableKey) -> bool {
        false
    }
}

/// Attempts to initialize the real platform backend, surfacing the
/// error to the caller rather than degrading. Used by `Core::try_new`.
pub(crate) fn init_default(
    config: &PlatformConfig,
) -> std::io::Result<Box<dyn KeyPoller>> {
    DefaultPoller::init(config).map(|p| Box::new(p) as Box<dyn KeyPoller>)
}

/// Initializes the real platform backend, falling back to
/// [`DegradedPoller`] (and logging a warning) on failure. Used by
/// `Core::new`, which never propagates a platform init failure to its
/// caller.
pub(crate) fn init_default_or_degraded(config: &PlatformConfig) -> Box<dyn KeyPoller> {
    match init_default(config) {
        Ok(poller) => poller,
        Err(err) => {
            tracing::warn!(error = %err, "platform init failed, continuing in degraded mode");
            Box::new(DegradedPoller)
        }
    }
}
