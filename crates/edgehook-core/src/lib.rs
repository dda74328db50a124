//! # edgehook-core
//!
//! Core crate for EdgeHook. Contains the unified error system, the
//! configuration schemas, and the frozen runtime environment exposed to
//! payload code.
//!
//! This crate has **no** internal dependencies on other EdgeHook crates.

pub mod config;
pub mod env;
pub mod error;
pub mod result;

pub use env::RuntimeEnv;
pub use error::AppError;
pub use result::AppResult;
