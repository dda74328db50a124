//! Installation sequence, nested interception, and bootstrap composition
//! against the in-process host.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use edgehook_core::RuntimeEnv;
use edgehook_engine::hooks::{HookOutcome, SlotName, async_fn, sync_fn};
use edgehook_engine::runtime::{
    CryptoAlgorithm, CryptoArgs, CryptoFn, Event, EventListener, FetchFn, Request, Response,
    ResponseFuture, Scope,
};
use edgehook_engine::{InstallOutcome, MemoryHost, RuntimeAdapter, bootstrap};

fn echo_fetch() -> FetchFn {
    async_fn(|_: Scope, (request,): (Request,)| async move {
        Ok(Response::ok(format!("upstream {}", request.url)))
    })
}

fn reversing_crypto() -> CryptoFn {
    async_fn(|_: Scope, (_algorithm, _key, data): CryptoArgs| async move {
        let mut reversed = data.to_vec();
        reversed.reverse();
        Ok(Bytes::from(reversed))
    })
}

fn setup() -> (MemoryHost, RuntimeAdapter) {
    let host = MemoryHost::new(echo_fetch()).with_crypto(reversing_crypto(), reversing_crypto());
    let adapter = RuntimeAdapter::new(host.bindings(), RuntimeEnv::default());
    (host, adapter)
}

fn responding_listener() -> EventListener {
    sync_fn(|_: &Scope, (event,): (Event,)| {
        if let Event::Fetch(fetch) = event {
            let body = format!("handled {}", fetch.request().url);
            fetch.respond_with(Response::ok(body))?;
        }
        Ok(())
    })
}

#[test]
fn test_fetch_listener_is_wrapped_on_registration() {
    let (host, adapter) = setup();
    adapter.install();

    let listener = responding_listener();
    adapter
        .add_event_listener("fetch", listener.clone())
        .expect("register");

    let registered = host.listeners("fetch");
    assert_eq!(registered.len(), 1);
    assert!(!Arc::ptr_eq(&registered[0], &listener));
    assert!(adapter.hooks().fetch_listener.is_hooked(&registered[0]));
}

#[test]
fn test_other_listeners_are_passed_through() {
    let (host, adapter) = setup();
    adapter.install();

    let listener: EventListener = sync_fn(|_: &Scope, _: (Event,)| Ok(()));
    adapter
        .add_event_listener("scheduled", listener.clone())
        .expect("register");

    let registered = host.listeners("scheduled");
    assert_eq!(registered.len(), 1);
    assert!(Arc::ptr_eq(&registered[0], &listener));
}

#[test]
fn test_same_listener_is_wrapped_once() {
    let (host, adapter) = setup();
    adapter.install();

    let listener = responding_listener();
    adapter.add_event_listener("fetch", listener.clone()).expect("first");
    adapter.add_event_listener("fetch", listener).expect("second");

    let registered = host.listeners("fetch");
    assert_eq!(registered.len(), 2);
    assert!(Arc::ptr_eq(&registered[0], &registered[1]));
}

#[tokio::test]
async fn test_respond_with_is_wrapped_when_listener_runs() {
    let (host, adapter) = setup();
    adapter.install();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    adapter
        .hooks()
        .respond_with
        .before(move |event, (response,): &(ResponseFuture,)| {
            s.lock().unwrap().push(event.request().url.clone());
            let tagged = response.clone().map(|r| r.with_header("x-hooked", "1"));
            Ok(HookOutcome::Replace((tagged,)))
        });

    let hooks = adapter.hooks().clone();
    let checker: EventListener = sync_fn(move |_: &Scope, (event,): (Event,)| {
        if let Event::Fetch(fetch) = event {
            assert!(hooks.respond_with.is_hooked(&fetch.respond_with_fn()));
        }
        Ok(())
    });
    adapter.add_event_listener("fetch", checker).expect("checker");
    adapter
        .add_event_listener("fetch", responding_listener())
        .expect("register");

    let response = host
        .dispatch_fetch(Request::get("https://example.com/x"))
        .await
        .expect("response");

    assert_eq!(response.text(), "handled https://example.com/x");
    assert_eq!(response.header("x-hooked"), Some("1"));
    assert_eq!(*seen.lock().unwrap(), vec!["https://example.com/x"]);
}

#[tokio::test]
async fn test_listener_registered_before_install_is_not_intercepted() {
    let (host, adapter) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    adapter.hooks().fetch_listener.before(move |_, _| {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(HookOutcome::Continue)
    });

    adapter
        .add_event_listener("fetch", responding_listener())
        .expect("register");
    adapter.install();

    host.dispatch_fetch(Request::get("https://example.com/"))
        .await
        .expect("response");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_install_twice_does_not_double_wrap() {
    let (host, adapter) = setup();
    let fetch_calls = Arc::new(AtomicUsize::new(0));
    let listener_calls = Arc::new(AtomicUsize::new(0));

    let f = fetch_calls.clone();
    adapter.hooks().fetch.before_fn(move |_, args: (Request,)| {
        f.fetch_add(1, Ordering::SeqCst);
        async move {
            let _ = args;
            Ok(HookOutcome::Continue)
        }
    });
    let l = listener_calls.clone();
    adapter.hooks().fetch_listener.before(move |_, _| {
        l.fetch_add(1, Ordering::SeqCst);
        Ok(HookOutcome::Continue)
    });

    assert_eq!(adapter.install(), InstallOutcome::Installed);
    let first = adapter.bindings();
    assert_eq!(adapter.install(), InstallOutcome::AlreadyInstalled);
    assert!(adapter.is_hooked());

    let second = adapter.bindings();
    assert!(Arc::ptr_eq(&first.add_event_listener, &second.add_event_listener));
    assert!(Arc::ptr_eq(&first.fetch, &second.fetch));
    assert!(Arc::ptr_eq(&first.encrypt, &second.encrypt));

    adapter
        .add_event_listener("fetch", responding_listener())
        .expect("register");
    host.dispatch_fetch(Request::get("https://example.com/"))
        .await
        .expect("response");
    adapter
        .fetch(Request::get("https://example.com/api"))
        .await
        .expect("fetch");

    assert_eq!(listener_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fetch_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fetch_hooks_transform_request_and_response() {
    let (_host, adapter) = setup();
    adapter.hooks().fetch.before_fn(|_, (request,): (Request,)| async move {
        let rewritten = Request::get(request.url.replace("http://", "https://"));
        Ok(HookOutcome::Replace((rewritten,)))
    });
    adapter
        .hooks()
        .fetch
        .after_fn(|_, response: Response| async move {
            Ok(HookOutcome::Replace(response.with_header("x-observed", "yes")))
        });
    adapter.install();

    let response = adapter
        .fetch(Request::get("http://example.com/"))
        .await
        .expect("fetch");
    assert_eq!(response.text(), "upstream https://example.com/");
    assert_eq!(response.header("x-observed"), Some("yes"));
}

#[tokio::test]
async fn test_encrypt_and_decrypt_use_separate_registries() {
    let (_host, adapter) = setup();
    adapter
        .hooks()
        .encrypt
        .after_fn(|_, output: Bytes| async move {
            let mut tagged = output.to_vec();
            tagged.extend_from_slice(b"!");
            Ok(HookOutcome::Replace(Bytes::from(tagged)))
        });
    adapter.install();

    let algorithm = CryptoAlgorithm::new("AES-GCM").with_iv(vec![0u8; 12]);
    let key = edgehook_engine::runtime::CryptoKey::new("AES-GCM", vec![7u8; 16]);

    let sealed = adapter
        .encrypt(algorithm.clone(), key.clone(), Bytes::from_static(b"abc"))
        .await
        .expect("encrypt");
    assert_eq!(&sealed[..], b"cba!");

    let opened = adapter
        .decrypt(algorithm, key, Bytes::from_static(b"abc"))
        .await
        .expect("decrypt");
    assert_eq!(&opened[..], b"cba");
    assert_eq!(adapter.hooks().hook_counts(SlotName::Decrypt), (0, 0));
}

#[test]
fn test_chained_bootstrap_installs_exactly_once() {
    let (_host, adapter) = setup();
    let installs = Arc::new(AtomicUsize::new(0));
    let payload_runs = Arc::new(AtomicUsize::new(0));

    let counting_install = |installs: Arc<AtomicUsize>| {
        move |_: &RuntimeAdapter| {
            installs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    };

    let p = payload_runs.clone();
    let inner = bootstrap(counting_install(installs.clone()), move |adapter: &RuntimeAdapter| {
        p.fetch_add(1, Ordering::SeqCst);
        Ok(adapter.is_hooked())
    });
    let outer = bootstrap(counting_install(installs.clone()), inner);

    assert!(outer(&adapter).expect("run"));
    assert_eq!(installs.load(Ordering::SeqCst), 1);
    assert_eq!(payload_runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_bootstrap_skips_install_on_hooked_adapter() {
    let (_host, adapter) = setup();
    adapter.install();

    let installs = AtomicUsize::new(0);
    let unit = bootstrap(
        |_| {
            installs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
        |_| Ok(()),
    );
    unit(&adapter).expect("run");
    assert_eq!(installs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_env_is_exposed_read_only() {
    let host = MemoryHost::new(echo_fetch());
    let env = RuntimeEnv::from_injected(Some(serde_json::json!({ "region": "eu-west" })));
    let adapter = RuntimeAdapter::new(host.bindings(), env);
    assert_eq!(adapter.env().get_str("region"), Some("eu-west"));
    assert_eq!(adapter.env().len(), 1);
}
