//! Error taxonomy for the operations that are allowed to fail outright.
//!
//! Most of the taxonomy this crate implements (`NotInitialized`,
//! `LookupMiss`, `SerializationShape`) is specified as silent no-op
//! behavior rather than a propagated error, so it never appears here —
//! those call sites return `Option`/empty collections and emit a
//! `tracing` event instead. `IdExhaustion` remains a panic, per its own
//! "programming error" classification. What's left is platform
//! init/teardown, which genuinely can fail and genuinely should tell
//! the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HotkeyError {
    #[error("platform init failed")]
    PlatformInit(#[source] std::io::Error),

    #[error("platform teardown failed")]
    PlatformTeardown(#[source] std::io::Error),
}
