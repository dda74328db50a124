//! Runtime adapter: owns the host bindings and installs the engine.
//!
//! Components that need "the current fetch" or "the current encrypt" hold a
//! reference to the adapter and call through it, rather than reading
//! process-wide state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use tracing::{debug, info};

use edgehook_core::{AppResult, RuntimeEnv};

use crate::hooks::{HookOutcome, SlotName};
use crate::interception::InterceptionMap;
use crate::runtime::{
    CryptoAlgorithm, CryptoKey, Event, EventListener, FETCH_EVENT, HostBindings, Request,
    Response, Scope,
};

/// Result of [`RuntimeAdapter::install`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The bindings were wrapped by this call.
    Installed,
    /// The guard was already set; nothing was wrapped.
    AlreadyInstalled,
}

/// Explicit replacement for the host's global namespace.
pub struct RuntimeAdapter {
    originals: HostBindings,
    current: RwLock<HostBindings>,
    hooks: Arc<InterceptionMap>,
    env: RuntimeEnv,
    hooked: AtomicBool,
}

impl RuntimeAdapter {
    /// Creates an adapter over the host's original bindings. Nothing is
    /// wrapped until [`install`](Self::install) runs.
    pub fn new(bindings: HostBindings, env: RuntimeEnv) -> Self {
        Self {
            current: RwLock::new(bindings.clone()),
            originals: bindings,
            hooks: Arc::new(InterceptionMap::new()),
            env,
            hooked: AtomicBool::new(false),
        }
    }

    /// The interception map. Hooks may be appended at any time.
    pub fn hooks(&self) -> &InterceptionMap {
        &self.hooks
    }

    /// The frozen runtime environment.
    pub fn env(&self) -> &RuntimeEnv {
        &self.env
    }

    /// Whether the installation guard is set.
    pub fn is_hooked(&self) -> bool {
        self.hooked.load(Ordering::Acquire)
    }

    /// The bindings as the host supplied them.
    pub fn originals(&self) -> &HostBindings {
        &self.originals
    }

    /// The current bindings, wrapped once installed.
    pub fn bindings(&self) -> HostBindings {
        self.read_current().clone()
    }

    /// Installs the engine.
    ///
    /// Wraps `addEventListener`, sets the guard, registers the nested
    /// interception hooks, then wraps `fetch`, `encrypt` and `decrypt`. The
    /// guard is checked and set under the bindings lock, so a second call
    /// wraps nothing and registers nothing.
    pub fn install(&self) -> InstallOutcome {
        let mut current = self.write_current();

        if self.hooked.swap(true, Ordering::AcqRel) {
            debug!("Hooks already installed, skipping");
            return InstallOutcome::AlreadyInstalled;
        }

        current.add_event_listener = self
            .hooks
            .add_event_listener
            .hooked(&self.originals.add_event_listener);

        self.register_nested_interception();

        current.fetch = self.hooks.fetch.hooked(&self.originals.fetch);
        current.encrypt = self.hooks.encrypt.hooked(&self.originals.encrypt);
        current.decrypt = self.hooks.decrypt.hooked(&self.originals.decrypt);

        info!(
            slots = SlotName::ALL.len(),
            env_keys = self.env.len(),
            "Hook engine installed"
        );
        InstallOutcome::Installed
    }

    /// `addEventListener(type, listener)` through the current binding.
    pub fn add_event_listener(
        &self,
        event_type: impl Into<String>,
        listener: EventListener,
    ) -> AppResult<()> {
        let add_event_listener = self.read_current().add_event_listener.clone();
        add_event_listener(&Scope::GLOBAL, (event_type.into(), listener))
    }

    /// `fetch(request)` through the current binding.
    pub async fn fetch(&self, request: Request) -> AppResult<Response> {
        let fetch = self.read_current().fetch.clone();
        fetch(Scope::GLOBAL, (request,)).await
    }

    /// `crypto.subtle.encrypt` through the current binding.
    pub async fn encrypt(
        &self,
        algorithm: CryptoAlgorithm,
        key: CryptoKey,
        data: Bytes,
    ) -> AppResult<Bytes> {
        let encrypt = self.read_current().encrypt.clone();
        encrypt(Scope::SUBTLE, (algorithm, key, data)).await
    }

    /// `crypto.subtle.decrypt` through the current binding.
    pub async fn decrypt(
        &self,
        algorithm: CryptoAlgorithm,
        key: CryptoKey,
        data: Bytes,
    ) -> AppResult<Bytes> {
        let decrypt = self.read_current().decrypt.clone();
        decrypt(Scope::SUBTLE, (algorithm, key, data)).await
    }

    /// Hooks that wrap listeners and `respondWith` as they are discovered.
    ///
    /// The hooks capture slot handles, not the map, so nothing here forms a
    /// reference cycle through the adapter.
    fn register_nested_interception(&self) {
        let fetch_listener = self.hooks.fetch_listener.clone();
        self.hooks.add_event_listener.before(
            move |_scope: &Scope, (event_type, listener): &(String, EventListener)| {
                if event_type != FETCH_EVENT {
                    return Ok(HookOutcome::Continue);
                }
                let hooked = fetch_listener.hooked(listener);
                Ok(HookOutcome::Replace((event_type.clone(), hooked)))
            },
        );

        let respond_with = self.hooks.respond_with.clone();
        self.hooks
            .fetch_listener
            .before(move |_scope: &Scope, (event,): &(Event,)| {
                if let Event::Fetch(fetch_event) = event {
                    let hooked = respond_with.hooked(&fetch_event.respond_with_fn());
                    fetch_event.set_respond_with(hooked);
                }
                Ok(HookOutcome::Continue)
            });
    }

    fn read_current(&self) -> RwLockReadGuard<'_, HostBindings> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_current(&self) -> RwLockWriteGuard<'_, HostBindings> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RuntimeAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeAdapter")
            .field("hooked", &self.is_hooked())
            .field("hooks", &self.hooks)
            .field("env", &self.env)
            .finish()
    }
}
