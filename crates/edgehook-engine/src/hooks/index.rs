//! Identity-keyed index from original callables to their wrappers.
//!
//! Nested interception discovers callables at call time (a listener handed
//! to `addEventListener`, the `respondWith` of an incoming event), possibly
//! many times over. The index makes wrapping idempotent: each original has
//! at most one live wrapper, and a wrapper handed back in is returned as-is.
//!
//! Entries are weak so the index never keeps a callable alive. Once the
//! last strong handle to a wrapper is dropped its entry is pruned and a later
//! observation of the original wraps it afresh.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};

use tracing::debug;

/// Per-original wrapping state. Absence from the index means unwrapped.
enum WrapState<T: ?Sized> {
    /// A wrapper is being built outside the lock; other observers wait.
    Wrapping,
    /// The original has a wrapper.
    Wrapped(Weak<T>),
}

struct Entries<T: ?Sized> {
    originals: HashMap<usize, WrapState<T>>,
    wrappers: HashMap<usize, Weak<T>>,
}

impl<T: ?Sized> Entries<T> {
    fn prune(&mut self) {
        self.originals.retain(|_, state| match state {
            WrapState::Wrapping => true,
            WrapState::Wrapped(wrapper) => wrapper.strong_count() > 0,
        });
        self.wrappers.retain(|_, wrapper| wrapper.strong_count() > 0);
    }
}

/// Identity-keyed wrap index.
pub struct WrapIndex<T: ?Sized> {
    entries: Mutex<Entries<T>>,
    published: Condvar,
}

impl<T: ?Sized> WrapIndex<T> {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Entries {
                originals: HashMap::new(),
                wrappers: HashMap::new(),
            }),
            published: Condvar::new(),
        }
    }

    /// Returns the wrapper for `original`, building it with `wrap` on first
    /// observation.
    ///
    /// If `original` is itself a live wrapper from this index it is returned
    /// unchanged. If another thread is mid-way through wrapping the same
    /// original, this call blocks until that wrapper is published and then
    /// returns it. `wrap` must not call back into the index.
    pub fn get_or_wrap(&self, original: &Arc<T>, wrap: impl FnOnce(Arc<T>) -> Arc<T>) -> Arc<T> {
        let key = identity(original);

        {
            let mut entries = self.lock();
            loop {
                entries.prune();

                if entries.wrappers.contains_key(&key) {
                    return original.clone();
                }

                match entries.originals.get(&key) {
                    Some(WrapState::Wrapped(wrapper)) => {
                        if let Some(existing) = wrapper.upgrade() {
                            return existing;
                        }
                        break;
                    }
                    Some(WrapState::Wrapping) => {
                        debug!("Wrap already in progress, waiting for it");
                        entries = self
                            .published
                            .wait(entries)
                            .unwrap_or_else(PoisonError::into_inner);
                    }
                    None => break,
                }
            }

            entries.originals.insert(key, WrapState::Wrapping);
        }

        let pending = Pending {
            index: self,
            key,
            published: false,
        };
        let wrapped = wrap(original.clone());
        pending.publish(&wrapped);
        wrapped
    }

    /// Returns whether `callable` is a live wrapper produced by this index.
    pub fn is_wrapper(&self, callable: &Arc<T>) -> bool {
        let key = identity(callable);
        self.lock()
            .wrappers
            .get(&key)
            .is_some_and(|wrapper| wrapper.strong_count() > 0)
    }

    /// Number of originals with a live wrapper.
    pub fn live_wrappers(&self) -> usize {
        let mut entries = self.lock();
        entries.prune();
        entries.wrappers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Entries<T>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: ?Sized> Default for WrapIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A `Wrapping` entry owned by the thread building the wrapper.
///
/// Dropped without publishing (the wrap closure panicked), it clears the
/// entry so waiters retry instead of blocking forever.
struct Pending<'a, T: ?Sized> {
    index: &'a WrapIndex<T>,
    key: usize,
    published: bool,
}

impl<T: ?Sized> Pending<'_, T> {
    fn publish(mut self, wrapped: &Arc<T>) {
        let mut entries = self.index.lock();
        entries
            .originals
            .insert(self.key, WrapState::Wrapped(Arc::downgrade(wrapped)));
        entries
            .wrappers
            .insert(identity(wrapped), Arc::downgrade(wrapped));
        drop(entries);

        self.published = true;
        self.index.published.notify_all();
    }
}

impl<T: ?Sized> Drop for Pending<'_, T> {
    fn drop(&mut self) {
        if !self.published {
            self.index.lock().originals.remove(&self.key);
            self.index.published.notify_all();
        }
    }
}

fn identity<T: ?Sized>(callable: &Arc<T>) -> usize {
    Arc::as_ptr(callable).cast::<()>() as usize
}
