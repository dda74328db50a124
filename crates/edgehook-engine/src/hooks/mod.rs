//! Hook system: per-slot registries and the wrappers built from them.

pub mod definitions;
pub mod index;
pub mod registry;
pub mod runner;
pub mod slot;
pub mod wrapper;

pub use definitions::{
    AsyncFn, AsyncHook, AsyncHookFn, HookOutcome, SlotName, SyncFn, SyncHook, async_fn, sync_fn,
};
pub use index::WrapIndex;
pub use registry::{AsyncRegistry, HookRegistry, SyncRegistry};
pub use slot::{AsyncSlot, SyncSlot};
pub use wrapper::{wrap_async, wrap_sync};
