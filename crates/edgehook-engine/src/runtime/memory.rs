//! In-process host runtime.
//!
//! Keeps a listener table, creates fetch events, and supplies the original
//! bindings the adapter wraps. Used by the `edgehook-host` harness and by
//! tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use edgehook_core::{AppError, AppResult};

use crate::hooks::{async_fn, sync_fn};

use super::bindings::{
    AddEventListenerFn, CryptoArgs, CryptoFn, EventListener, FetchFn, HostBindings, RespondWithFn,
};
use super::types::{Event, FETCH_EVENT, FetchEvent, Request, Response, ResponseFuture, Scope};

type ListenerTable = Arc<Mutex<HashMap<String, Vec<EventListener>>>>;

/// A host runtime living in this process.
pub struct MemoryHost {
    listeners: ListenerTable,
    respond_with: RespondWithFn,
    fetch: FetchFn,
    encrypt: CryptoFn,
    decrypt: CryptoFn,
}

impl MemoryHost {
    /// Creates a host whose `fetch` is `fetch` and whose subtle crypto
    /// reports `NotImplemented`.
    pub fn new(fetch: FetchFn) -> Self {
        Self {
            listeners: Arc::new(Mutex::new(HashMap::new())),
            respond_with: sync_fn(|event: &FetchEvent, (response,): (ResponseFuture,)| {
                event.settle(response)
            }),
            fetch,
            encrypt: unsupported("encrypt"),
            decrypt: unsupported("decrypt"),
        }
    }

    /// Replaces the subtle crypto primitives.
    pub fn with_crypto(mut self, encrypt: CryptoFn, decrypt: CryptoFn) -> Self {
        self.encrypt = encrypt;
        self.decrypt = decrypt;
        self
    }

    /// The original bindings for this host.
    pub fn bindings(&self) -> HostBindings {
        let listeners = self.listeners.clone();
        let add_event_listener: AddEventListenerFn = sync_fn(
            move |_scope: &Scope, (event_type, listener): (String, EventListener)| {
                debug!(event_type = %event_type, "Listener registered with host");
                lock(&listeners).entry(event_type).or_default().push(listener);
                Ok(())
            },
        );

        HostBindings {
            add_event_listener,
            fetch: self.fetch.clone(),
            encrypt: self.encrypt.clone(),
            decrypt: self.decrypt.clone(),
        }
    }

    /// The listeners registered for `event_type`, in registration order.
    pub fn listeners(&self, event_type: &str) -> Vec<EventListener> {
        lock(&self.listeners)
            .get(event_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Delivers `event` to every listener of its type.
    pub fn dispatch(&self, event: Event) -> AppResult<()> {
        let listeners = self.listeners(event.event_type());
        debug!(
            event_type = %event.event_type(),
            listener_count = listeners.len(),
            "Dispatching event"
        );
        for listener in listeners {
            listener(&Scope::GLOBAL, (event.clone(),))?;
        }
        Ok(())
    }

    /// Creates a fetch event for `request`, delivers it, and resolves the
    /// response a listener passed to `respondWith`.
    pub async fn dispatch_fetch(&self, request: Request) -> AppResult<Response> {
        let event = FetchEvent::new(request, self.respond_with.clone());
        self.dispatch(Event::Fetch(event.clone()))?;

        match event.take_response() {
            Some(response) => response.await,
            None => Err(AppError::host(format!(
                "no {} listener called respondWith for {}",
                FETCH_EVENT,
                event.request().url
            ))),
        }
    }
}

fn unsupported(operation: &'static str) -> CryptoFn {
    async_fn(move |_scope: Scope, (algorithm, _key, _data): CryptoArgs| async move {
        Err::<bytes::Bytes, _>(AppError::not_implemented(format!(
            "crypto.subtle.{operation} ({}) is not available on this host",
            algorithm.name
        )))
    })
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::types::CryptoAlgorithm;
    use crate::runtime::types::CryptoKey;
    use edgehook_core::error::ErrorKind;

    fn echo_fetch() -> FetchFn {
        async_fn(|_scope: Scope, (request,): (Request,)| async move {
            Ok(Response::ok(request.url))
        })
    }

    #[tokio::test]
    async fn test_dispatch_fetch_resolves_response() {
        let host = MemoryHost::new(echo_fetch());
        let bindings = host.bindings();
        let listener: EventListener = sync_fn(|_: &Scope, (event,): (Event,)| {
            if let Event::Fetch(fetch) = event {
                fetch.respond_with(Response::ok("from listener"))?;
            }
            Ok(())
        });
        (bindings.add_event_listener)(&Scope::GLOBAL, ("fetch".to_string(), listener))
            .expect("register");

        let response = host
            .dispatch_fetch(Request::get("https://example.com/"))
            .await
            .expect("response");
        assert_eq!(response.text(), "from listener");
    }

    #[tokio::test]
    async fn test_unanswered_fetch_is_host_error() {
        let host = MemoryHost::new(echo_fetch());
        let err = host
            .dispatch_fetch(Request::get("https://example.com/"))
            .await
            .expect_err("no listener");
        assert_eq!(err.kind, ErrorKind::Host);
    }

    #[tokio::test]
    async fn test_default_crypto_is_not_implemented() {
        let host = MemoryHost::new(echo_fetch());
        let bindings = host.bindings();
        let err = (bindings.encrypt)(
            Scope::SUBTLE,
            (
                CryptoAlgorithm::new("AES-GCM"),
                CryptoKey::new("AES-GCM", vec![0u8; 16]),
                bytes::Bytes::from_static(b"data"),
            ),
        )
        .await
        .expect_err("unsupported");
        assert_eq!(err.kind, ErrorKind::NotImplemented);
    }
}
