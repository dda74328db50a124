//! Host runtime surface: value types, binding signatures, and an in-process
//! host.

pub mod bindings;
pub mod memory;
pub mod types;

pub use bindings::{
    AddEventListenerFn, CryptoArgs, CryptoFn, EventListener, FetchFn, HostBindings, RespondWithFn,
};
pub use memory::MemoryHost;
pub use types::{
    CryptoAlgorithm, CryptoKey, Event, FETCH_EVENT, FetchEvent, Request, Response, ResponseFuture,
    Scope,
};
