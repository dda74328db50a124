//! Hook registry: ordered, append-only before/after lists for one slot.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::definitions::{AsyncHook, SyncHook};

/// Ordered before/after hook lists owned by a single slot.
///
/// Insertion order is execution order, on the way in and on the way out.
/// Appending is the only mutation; there is no removal API.
pub struct HookRegistry<B, F> {
    /// Hooks run over the argument tuple before the target.
    before: RwLock<Vec<B>>,
    /// Hooks run over the result after the target.
    after: RwLock<Vec<F>>,
}

/// Registry for a slot wrapping a synchronous target.
pub type SyncRegistry<R, A, O> = HookRegistry<SyncHook<R, A>, SyncHook<R, O>>;

/// Registry for a slot wrapping an asynchronous target.
pub type AsyncRegistry<R, A, O> =
    HookRegistry<Arc<dyn AsyncHook<R, A>>, Arc<dyn AsyncHook<R, O>>>;

impl<B: Clone, F: Clone> HookRegistry<B, F> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            before: RwLock::new(Vec::new()),
            after: RwLock::new(Vec::new()),
        }
    }

    /// Appends a before-hook.
    pub fn push_before(&self, hook: B) {
        write(&self.before).push(hook);
    }

    /// Appends an after-hook.
    pub fn push_after(&self, hook: F) {
        write(&self.after).push(hook);
    }

    /// Snapshot of the before-hooks in registration order.
    ///
    /// Runners work on a snapshot so a hook may register further hooks
    /// without deadlocking; those take effect on the next call.
    pub fn before_hooks(&self) -> Vec<B> {
        read(&self.before).clone()
    }

    /// Snapshot of the after-hooks in registration order.
    pub fn after_hooks(&self) -> Vec<F> {
        read(&self.after).clone()
    }

    /// Returns `(before, after)` hook counts.
    pub fn len(&self) -> (usize, usize) {
        (read(&self.before).len(), read(&self.after).len())
    }

    /// Whether neither list has a hook.
    pub fn is_empty(&self) -> bool {
        self.len() == (0, 0)
    }
}

impl<B: Clone, F: Clone> Default for HookRegistry<B, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, F> std::fmt::Debug for HookRegistry<B, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("before", &read(&self.before).len())
            .field("after", &read(&self.after).len())
            .finish()
    }
}

// A panicking hook must not take the slot down with it.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let registry: HookRegistry<u32, &str> = HookRegistry::new();
        registry.push_before(1);
        registry.push_before(2);
        registry.push_after("a");
        registry.push_before(3);

        assert_eq!(registry.before_hooks(), vec![1, 2, 3]);
        assert_eq!(registry.after_hooks(), vec!["a"]);
        assert_eq!(registry.len(), (3, 1));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let registry: HookRegistry<u32, u32> = HookRegistry::new();
        registry.push_before(1);
        let snapshot = registry.before_hooks();
        registry.push_before(2);
        assert_eq!(snapshot, vec![1]);
        assert_eq!(registry.before_hooks(), vec![1, 2]);
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry: HookRegistry<u32, u32> = HookRegistry::default();
        assert!(registry.is_empty());
    }
}
