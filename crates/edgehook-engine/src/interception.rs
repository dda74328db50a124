//! Interception map: one slot per intercepted binding.
//!
//! Payload code registers hooks here before or after installation; either
//! way they apply to every later call of the corresponding binding.

use bytes::Bytes;

use crate::hooks::{AsyncSlot, SlotName, SyncSlot};
use crate::runtime::{
    CryptoArgs, Event, EventListener, FetchEvent, Request, Response, ResponseFuture, Scope,
};

/// The six interception slots.
///
/// `encrypt` and `decrypt` own separate registries.
#[derive(Debug, Clone)]
pub struct InterceptionMap {
    /// `addEventListener(type, listener)`.
    pub add_event_listener: SyncSlot<Scope, (String, EventListener), ()>,
    /// Every listener registered for `"fetch"`.
    pub fetch_listener: SyncSlot<Scope, (Event,), ()>,
    /// `event.respondWith(response)` on each incoming fetch event.
    pub respond_with: SyncSlot<FetchEvent, (ResponseFuture,), ()>,
    /// `fetch(request)`.
    pub fetch: AsyncSlot<Scope, (Request,), Response>,
    /// `crypto.subtle.encrypt(algorithm, key, data)`.
    pub encrypt: AsyncSlot<Scope, CryptoArgs, Bytes>,
    /// `crypto.subtle.decrypt(algorithm, key, data)`.
    pub decrypt: AsyncSlot<Scope, CryptoArgs, Bytes>,
}

impl InterceptionMap {
    /// Creates a map with six empty registries.
    pub fn new() -> Self {
        Self {
            add_event_listener: SyncSlot::new(SlotName::AddEventListener),
            fetch_listener: SyncSlot::new(SlotName::FetchListener),
            respond_with: SyncSlot::new(SlotName::RespondWith),
            fetch: AsyncSlot::new(SlotName::Fetch),
            encrypt: AsyncSlot::new(SlotName::Encrypt),
            decrypt: AsyncSlot::new(SlotName::Decrypt),
        }
    }

    /// Returns `(before, after)` hook counts for `slot`.
    pub fn hook_counts(&self, slot: SlotName) -> (usize, usize) {
        match slot {
            SlotName::AddEventListener => self.add_event_listener.registry().len(),
            SlotName::FetchListener => self.fetch_listener.registry().len(),
            SlotName::RespondWith => self.respond_with.registry().len(),
            SlotName::Fetch => self.fetch.registry().len(),
            SlotName::Encrypt => self.encrypt.registry().len(),
            SlotName::Decrypt => self.decrypt.registry().len(),
        }
    }
}

impl Default for InterceptionMap {
    fn default() -> Self {
        Self::new()
    }
}
