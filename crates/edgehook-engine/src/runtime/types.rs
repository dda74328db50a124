//! Values that flow through the intercepted host surface.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use edgehook_core::{AppError, AppResult};

use super::bindings::RespondWithFn;

/// Event type that routes a listener through fetch interception.
pub const FETCH_EVENT: &str = "fetch";

/// Receiver handle for global bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scope {
    label: &'static str,
}

impl Scope {
    /// The global namespace (`addEventListener`, `fetch`, listeners).
    pub const GLOBAL: Scope = Scope {
        label: "globalThis",
    };

    /// The subtle crypto namespace (`encrypt`, `decrypt`).
    pub const SUBTLE: Scope = Scope {
        label: "crypto.subtle",
    };

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

/// An HTTP request seen by listeners and by `fetch`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Request {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// First header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response produced by `fetch` or handed to `respondWith`.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(200).with_body(body)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// A response that may still be pending.
///
/// Cloning shares the underlying future, so a hook can observe or chain onto
/// the response without consuming it.
#[derive(Clone)]
pub struct ResponseFuture {
    inner: Shared<BoxFuture<'static, AppResult<Response>>>,
}

impl ResponseFuture {
    /// Wraps a pending response.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = AppResult<Response>> + Send + 'static,
    {
        Self {
            inner: future.boxed().shared(),
        }
    }

    /// An already available response.
    pub fn ready(response: Response) -> Self {
        Self::new(async move { Ok(response) })
    }

    /// Transforms the response once it resolves.
    pub fn map<F>(self, f: F) -> Self
    where
        F: FnOnce(Response) -> Response + Send + 'static,
    {
        Self::new(async move { self.await.map(f) })
    }

    /// The resolved value, if the future has completed.
    pub fn peek(&self) -> Option<&AppResult<Response>> {
        self.inner.peek()
    }
}

impl From<Response> for ResponseFuture {
    fn from(response: Response) -> Self {
        Self::ready(response)
    }
}

impl Future for ResponseFuture {
    type Output = AppResult<Response>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl fmt::Debug for ResponseFuture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseFuture")
            .field("resolved", &self.peek().is_some())
            .finish()
    }
}

/// An incoming fetch event.
///
/// A cheap shared handle: clones refer to the same event, so replacing
/// `respondWith` through one clone is seen by every listener.
#[derive(Clone)]
pub struct FetchEvent {
    inner: Arc<FetchEventInner>,
}

struct FetchEventInner {
    request: Request,
    respond_with: RwLock<RespondWithFn>,
    responded: AtomicBool,
    response: Mutex<Option<ResponseFuture>>,
}

impl FetchEvent {
    /// Creates an event whose `respondWith` is `respond_with`.
    pub fn new(request: Request, respond_with: RespondWithFn) -> Self {
        Self {
            inner: Arc::new(FetchEventInner {
                request,
                respond_with: RwLock::new(respond_with),
                responded: AtomicBool::new(false),
                response: Mutex::new(None),
            }),
        }
    }

    pub fn request(&self) -> &Request {
        &self.inner.request
    }

    /// Calls the event's current `respondWith` binding with this event as
    /// receiver.
    pub fn respond_with(&self, response: impl Into<ResponseFuture>) -> AppResult<()> {
        let respond_with = self.respond_with_fn();
        respond_with(self, (response.into(),))
    }

    /// The current `respondWith` binding.
    pub fn respond_with_fn(&self) -> RespondWithFn {
        self.inner
            .respond_with
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the `respondWith` binding.
    pub fn set_respond_with(&self, respond_with: RespondWithFn) {
        *self
            .inner
            .respond_with
            .write()
            .unwrap_or_else(PoisonError::into_inner) = respond_with;
    }

    /// Records the response. Only the first call succeeds.
    pub fn settle(&self, response: ResponseFuture) -> AppResult<()> {
        if self.inner.responded.swap(true, Ordering::AcqRel) {
            return Err(AppError::invalid_state(
                "respondWith has already been called for this event",
            ));
        }
        *self.lock_response() = Some(response);
        Ok(())
    }

    pub fn is_settled(&self) -> bool {
        self.inner.responded.load(Ordering::Acquire)
    }

    /// Takes the recorded response, leaving the event settled.
    pub fn take_response(&self) -> Option<ResponseFuture> {
        self.lock_response().take()
    }

    /// Whether both handles refer to the same event.
    pub fn ptr_eq(&self, other: &FetchEvent) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn lock_response(&self) -> std::sync::MutexGuard<'_, Option<ResponseFuture>> {
        self.inner
            .response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for FetchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchEvent")
            .field("request", &self.inner.request)
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// An event delivered to listeners.
#[derive(Debug, Clone)]
pub enum Event {
    /// An incoming HTTP request.
    Fetch(FetchEvent),
    /// Any other event type.
    Custom {
        event_type: String,
        detail: serde_json::Value,
    },
}

impl Event {
    pub fn event_type(&self) -> &str {
        match self {
            Self::Fetch(_) => FETCH_EVENT,
            Self::Custom { event_type, .. } => event_type,
        }
    }
}

/// Algorithm parameters for `encrypt` / `decrypt`.
#[derive(Debug, Clone, PartialEq)]
pub struct CryptoAlgorithm {
    /// Algorithm name, e.g. `"AES-GCM"`.
    pub name: String,
    /// Initialisation vector, when the algorithm takes one.
    pub iv: Option<Bytes>,
    /// Additional authenticated data.
    pub additional_data: Option<Bytes>,
}

impl CryptoAlgorithm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            iv: None,
            additional_data: None,
        }
    }

    pub fn with_iv(mut self, iv: impl Into<Bytes>) -> Self {
        self.iv = Some(iv.into());
        self
    }
}

/// A key handle for subtle operations. Key material never shows up in
/// `Debug` output.
#[derive(Clone, PartialEq)]
pub struct CryptoKey {
    pub algorithm: String,
    pub usages: Vec<String>,
    material: Bytes,
}

impl CryptoKey {
    pub fn new(algorithm: impl Into<String>, material: impl Into<Bytes>) -> Self {
        Self {
            algorithm: algorithm.into(),
            usages: vec!["encrypt".to_string(), "decrypt".to_string()],
            material: material.into(),
        }
    }

    pub fn material(&self) -> &Bytes {
        &self.material
    }

    pub fn allows(&self, usage: &str) -> bool {
        self.usages.iter().any(|u| u == usage)
    }
}

impl fmt::Debug for CryptoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoKey")
            .field("algorithm", &self.algorithm)
            .field("usages", &self.usages)
            .field("material", &"[redacted]")
            .finish()
    }
}
