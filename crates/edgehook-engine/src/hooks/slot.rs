//! Slots: a named interception point with one registry and one wrapper
//! factory.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use edgehook_core::AppResult;

use super::definitions::{
    AsyncFn, AsyncHook, AsyncHookFn, DynAsyncFn, DynSyncFn, HookOutcome, SlotName, SyncFn,
};
use super::index::WrapIndex;
use super::registry::{AsyncRegistry, SyncRegistry};
use super::wrapper::{wrap_async, wrap_sync};

/// Interception point over a synchronous target.
pub struct SyncSlot<R, A, O> {
    name: SlotName,
    registry: Arc<SyncRegistry<R, A, O>>,
    index: Arc<WrapIndex<DynSyncFn<R, A, O>>>,
}

impl<R: 'static, A: 'static, O: 'static> SyncSlot<R, A, O> {
    /// Creates a slot with an empty registry.
    pub fn new(name: SlotName) -> Self {
        Self {
            name,
            registry: Arc::new(SyncRegistry::new()),
            index: Arc::new(WrapIndex::new()),
        }
    }

    /// Which binding this slot intercepts.
    pub fn name(&self) -> SlotName {
        self.name
    }

    /// The slot's registry.
    pub fn registry(&self) -> &SyncRegistry<R, A, O> {
        &self.registry
    }

    /// Appends a before-hook over the argument tuple.
    pub fn before<F>(&self, hook: F)
    where
        F: Fn(&R, &A) -> AppResult<HookOutcome<A>> + Send + Sync + 'static,
    {
        self.registry.push_before(Arc::new(hook));
        debug!(slot = %self.name, "Before-hook registered");
    }

    /// Appends an after-hook over the result.
    pub fn after<F>(&self, hook: F)
    where
        F: Fn(&R, &O) -> AppResult<HookOutcome<O>> + Send + Sync + 'static,
    {
        self.registry.push_after(Arc::new(hook));
        debug!(slot = %self.name, "After-hook registered");
    }

    /// Returns the hooked replacement for `target`.
    ///
    /// Repeated calls with the same target, or with a wrapper this slot
    /// produced, return the same wrapper.
    pub fn hooked(&self, target: &SyncFn<R, A, O>) -> SyncFn<R, A, O> {
        self.index.get_or_wrap(target, |target| {
            debug!(slot = %self.name, "Wrapping target");
            wrap_sync(target, self.registry.clone())
        })
    }

    /// Returns whether `callable` is a wrapper produced by this slot.
    pub fn is_hooked(&self, callable: &SyncFn<R, A, O>) -> bool {
        self.index.is_wrapper(callable)
    }
}

impl<R, A, O> Clone for SyncSlot<R, A, O> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            registry: self.registry.clone(),
            index: self.index.clone(),
        }
    }
}

impl<R, A, O> std::fmt::Debug for SyncSlot<R, A, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSlot")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .finish()
    }
}

/// Interception point over an asynchronous target.
pub struct AsyncSlot<R, A, O> {
    name: SlotName,
    registry: Arc<AsyncRegistry<R, A, O>>,
    index: Arc<WrapIndex<DynAsyncFn<R, A, O>>>,
}

impl<R, A, O> AsyncSlot<R, A, O>
where
    R: Clone + Send + Sync + 'static,
    A: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    /// Creates a slot with an empty registry.
    pub fn new(name: SlotName) -> Self {
        Self {
            name,
            registry: Arc::new(AsyncRegistry::new()),
            index: Arc::new(WrapIndex::new()),
        }
    }

    /// Which binding this slot intercepts.
    pub fn name(&self) -> SlotName {
        self.name
    }

    /// The slot's registry.
    pub fn registry(&self) -> &AsyncRegistry<R, A, O> {
        &self.registry
    }

    /// Appends a before-hook over the argument tuple.
    pub fn before(&self, hook: impl AsyncHook<R, A> + 'static) {
        self.registry.push_before(Arc::new(hook));
        debug!(slot = %self.name, "Before-hook registered");
    }

    /// Appends an after-hook over the result.
    pub fn after(&self, hook: impl AsyncHook<R, O> + 'static) {
        self.registry.push_after(Arc::new(hook));
        debug!(slot = %self.name, "After-hook registered");
    }

    /// Returns the hooked replacement for `target`.
    pub fn hooked(&self, target: &AsyncFn<R, A, O>) -> AsyncFn<R, A, O> {
        self.index.get_or_wrap(target, |target| {
            debug!(slot = %self.name, "Wrapping target");
            wrap_async(target, self.registry.clone())
        })
    }

    /// Returns whether `callable` is a wrapper produced by this slot.
    pub fn is_hooked(&self, callable: &AsyncFn<R, A, O>) -> bool {
        self.index.is_wrapper(callable)
    }
}

impl<R, A, O> AsyncSlot<R, A, O>
where
    R: Clone + Send + Sync + 'static,
    A: Clone + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
{
    /// Appends a before-hook written as an async closure over owned clones.
    pub fn before_fn<F, Fut>(&self, hook: F)
    where
        F: Fn(R, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<HookOutcome<A>>> + Send + 'static,
    {
        self.before(AsyncHookFn(hook));
    }

    /// Appends an after-hook written as an async closure over owned clones.
    pub fn after_fn<F, Fut>(&self, hook: F)
    where
        F: Fn(R, O) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<HookOutcome<O>>> + Send + 'static,
    {
        self.after(AsyncHookFn(hook));
    }
}

impl<R, A, O> Clone for AsyncSlot<R, A, O> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            registry: self.registry.clone(),
            index: self.index.clone(),
        }
    }
}

impl<R, A, O> std::fmt::Debug for AsyncSlot<R, A, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncSlot")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .finish()
    }
}
