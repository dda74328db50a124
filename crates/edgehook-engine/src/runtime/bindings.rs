//! Signatures of the host bindings the engine intercepts.

use bytes::Bytes;

use crate::hooks::{AsyncFn, SyncFn};

use super::types::{
    CryptoAlgorithm, CryptoKey, Event, FetchEvent, Request, Response, ResponseFuture, Scope,
};

/// A listener passed to `addEventListener`.
pub type EventListener = SyncFn<Scope, (Event,), ()>;

/// `addEventListener(type, listener)`.
pub type AddEventListenerFn = SyncFn<Scope, (String, EventListener), ()>;

/// `event.respondWith(response)`, with the event as receiver.
pub type RespondWithFn = SyncFn<FetchEvent, (ResponseFuture,), ()>;

/// `fetch(request)`.
pub type FetchFn = AsyncFn<Scope, (Request,), Response>;

/// `(algorithm, key, data)` for `encrypt` / `decrypt`.
pub type CryptoArgs = (CryptoAlgorithm, CryptoKey, Bytes);

/// `crypto.subtle.encrypt` / `crypto.subtle.decrypt`.
pub type CryptoFn = AsyncFn<Scope, CryptoArgs, Bytes>;

/// The original callables supplied by the host runtime.
///
/// All four are required; the engine installs no fallbacks.
#[derive(Clone)]
pub struct HostBindings {
    pub add_event_listener: AddEventListenerFn,
    pub fetch: FetchFn,
    pub encrypt: CryptoFn,
    pub decrypt: CryptoFn,
}

impl std::fmt::Debug for HostBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostBindings").finish_non_exhaustive()
    }
}
