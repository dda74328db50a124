//! Built-in tracing observers.
//!
//! Read-only hooks that log traffic through the intercepted surface. Each
//! returns [`HookOutcome::Continue`] except the `respondWith` observer, which
//! chains a logging step onto the pending response without altering it.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use edgehook_core::AppResult;
use edgehook_core::config::observers::ObserverConfig;

use crate::hooks::{AsyncHook, HookOutcome, SlotName};
use crate::interception::InterceptionMap;
use crate::runtime::{
    CryptoArgs, EventListener, FetchEvent, Request, Response, ResponseFuture, Scope,
};

/// Registers the observers enabled in `config`. Returns how many slots
/// received an observer.
pub fn register(map: &InterceptionMap, config: &ObserverConfig) -> usize {
    let mut slots = 0;

    if config.add_event_listener {
        map.add_event_listener.before(
            |scope: &Scope, (event_type, _): &(String, EventListener)| {
                info!(scope = %scope, event_type = %event_type, "addEventListener");
                Ok(HookOutcome::Continue)
            },
        );
        slots += 1;
    }

    if config.fetch {
        map.fetch.before(FetchRequestObserver);
        map.fetch.after(FetchResponseObserver);
        slots += 1;
    }

    if config.respond_with {
        map.respond_with.before(
            |event: &FetchEvent, (response,): &(ResponseFuture,)| {
                let url = event.request().url.clone();
                let observed = response.clone().map(move |response| {
                    info!(url = %url, status = response.status, "respondWith");
                    response
                });
                Ok(HookOutcome::Replace((observed,)))
            },
        );
        slots += 1;
    }

    if config.crypto {
        for (slot, operation) in [
            (&map.encrypt, SlotName::Encrypt),
            (&map.decrypt, SlotName::Decrypt),
        ] {
            slot.before(CryptoInputObserver { operation });
            slot.after(CryptoOutputObserver { operation });
        }
        slots += 2;
    }

    slots
}

/// Logs the method and URL of each outbound request.
struct FetchRequestObserver;

#[async_trait]
impl AsyncHook<Scope, (Request,)> for FetchRequestObserver {
    async fn call(&self, _scope: &Scope, args: &(Request,)) -> AppResult<HookOutcome<(Request,)>> {
        let (request,) = args;
        info!(method = %request.method, url = %request.url, "fetch");
        Ok(HookOutcome::Continue)
    }
}

/// Logs the status and body size of each fetch response.
struct FetchResponseObserver;

#[async_trait]
impl AsyncHook<Scope, Response> for FetchResponseObserver {
    async fn call(&self, _scope: &Scope, response: &Response) -> AppResult<HookOutcome<Response>> {
        info!(
            status = response.status,
            body_bytes = response.body.len(),
            "fetch completed"
        );
        Ok(HookOutcome::Continue)
    }
}

struct CryptoInputObserver {
    operation: SlotName,
}

#[async_trait]
impl AsyncHook<Scope, CryptoArgs> for CryptoInputObserver {
    async fn call(&self, _scope: &Scope, args: &CryptoArgs) -> AppResult<HookOutcome<CryptoArgs>> {
        let (algorithm, _key, data) = args;
        info!(
            operation = %self.operation,
            algorithm = %algorithm.name,
            input_bytes = data.len(),
            "crypto.subtle call"
        );
        Ok(HookOutcome::Continue)
    }
}

struct CryptoOutputObserver {
    operation: SlotName,
}

#[async_trait]
impl AsyncHook<Scope, Bytes> for CryptoOutputObserver {
    async fn call(&self, _scope: &Scope, output: &Bytes) -> AppResult<HookOutcome<Bytes>> {
        info!(
            operation = %self.operation,
            output_bytes = output.len(),
            "crypto.subtle completed"
        );
        Ok(HookOutcome::Continue)
    }
}
