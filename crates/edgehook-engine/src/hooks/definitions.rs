//! Slot names, hook outcomes, and the callable shapes the engine wraps.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use edgehook_core::AppResult;

/// Enumeration of every interception point the engine installs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotName {
    /// The global event-registration function.
    AddEventListener,
    /// A fetch handler passed into `addEventListener`.
    FetchListener,
    /// The `respondWith` method of an incoming fetch event.
    RespondWith,
    /// The global network-request function.
    Fetch,
    /// `crypto.subtle.encrypt`.
    Encrypt,
    /// `crypto.subtle.decrypt`.
    Decrypt,
}

impl SlotName {
    /// Every slot, in installation order.
    pub const ALL: [SlotName; 6] = [
        Self::AddEventListener,
        Self::FetchListener,
        Self::RespondWith,
        Self::Fetch,
        Self::Encrypt,
        Self::Decrypt,
    ];

    /// Returns the binding path this slot intercepts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddEventListener => "addEventListener",
            Self::FetchListener => "fetchListener",
            Self::RespondWith => "event.respondWith",
            Self::Fetch => "fetch",
            Self::Encrypt => "crypto.subtle.encrypt",
            Self::Decrypt => "crypto.subtle.decrypt",
        }
    }

    /// Returns whether the slot wraps an asynchronous target.
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Fetch | Self::Encrypt | Self::Decrypt)
    }
}

impl std::fmt::Display for SlotName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a hook decided to do with the value it was shown.
///
/// Before-hooks see the argument tuple, after-hooks see the result. A hook
/// that only observes returns [`HookOutcome::Continue`]; the value folded so
/// far then flows on untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum HookOutcome<T> {
    /// Keep the current value.
    Continue,
    /// Replace the current value.
    Replace(T),
}

impl<T> HookOutcome<T> {
    /// Folds this outcome into the current value.
    pub fn apply(self, current: T) -> T {
        match self {
            Self::Continue => current,
            Self::Replace(next) => next,
        }
    }
}

/// Unsized synchronous callable taking a receiver and an argument tuple.
pub type DynSyncFn<R, A, O> = dyn Fn(&R, A) -> AppResult<O> + Send + Sync;

/// Shared synchronous callable.
pub type SyncFn<R, A, O> = Arc<DynSyncFn<R, A, O>>;

/// Unsized asynchronous callable. The receiver is passed by value so the
/// returned future owns everything it touches.
pub type DynAsyncFn<R, A, O> = dyn Fn(R, A) -> BoxFuture<'static, AppResult<O>> + Send + Sync;

/// Shared asynchronous callable.
pub type AsyncFn<R, A, O> = Arc<DynAsyncFn<R, A, O>>;

/// A synchronous hook over values of type `T` with receiver `R`.
pub type SyncHook<R, T> = Arc<dyn Fn(&R, &T) -> AppResult<HookOutcome<T>> + Send + Sync>;

/// An asynchronous hook over values of type `T` with receiver `R`.
#[async_trait]
pub trait AsyncHook<R, T>: Send + Sync {
    /// Observes `value` and decides whether to replace it.
    async fn call(&self, receiver: &R, value: &T) -> AppResult<HookOutcome<T>>;
}

/// Adapts an async closure into an [`AsyncHook`].
///
/// The closure receives owned clones of the receiver and value, so its
/// future must not borrow from the closure itself.
pub struct AsyncHookFn<F>(pub F);

#[async_trait]
impl<R, T, F, Fut> AsyncHook<R, T> for AsyncHookFn<F>
where
    R: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    F: Fn(R, T) -> Fut + Send + Sync,
    Fut: Future<Output = AppResult<HookOutcome<T>>> + Send + 'static,
{
    async fn call(&self, receiver: &R, value: &T) -> AppResult<HookOutcome<T>> {
        (self.0)(receiver.clone(), value.clone()).await
    }
}

/// Builds a [`SyncFn`] from a closure.
pub fn sync_fn<R, A, O, F>(f: F) -> SyncFn<R, A, O>
where
    F: Fn(&R, A) -> AppResult<O> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Builds an [`AsyncFn`] from a closure returning a future.
pub fn async_fn<R, A, O, F, Fut>(f: F) -> AsyncFn<R, A, O>
where
    F: Fn(R, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<O>> + Send + 'static,
{
    Arc::new(move |receiver: R, args: A| f(receiver, args).boxed())
}
