//! # edgehook-engine
//!
//! Hook composition engine for EdgeHook. Provides:
//!
//! - Ordered before/after hook registries with sync and async runners
//! - A function wrapper that composes hooks around any host callable
//! - The six-slot interception map with nested, call-time wrapping
//! - The runtime adapter and its guarded installation sequence
//! - Install-then-run composition and built-in tracing observers
//! - An in-process host for the harness and for tests

pub mod adapter;
pub mod bootstrap;
pub mod hooks;
pub mod interception;
pub mod observers;
pub mod runtime;

pub use adapter::{InstallOutcome, RuntimeAdapter};
pub use bootstrap::bootstrap;
pub use hooks::{HookOutcome, SlotName};
pub use interception::InterceptionMap;
pub use runtime::{HostBindings, MemoryHost};
