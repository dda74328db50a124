//! Convenience result type alias for EdgeHook.

use crate::error::AppError;

/// A specialized `Result` type for EdgeHook operations.
///
/// Hooks, wrapped functions, and host bindings all return this type, so an
/// error raised anywhere in a hook chain travels to the caller unchanged.
pub type AppResult<T> = Result<T, AppError>;
