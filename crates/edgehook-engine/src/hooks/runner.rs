//! Hook runners: fold a hook list over a value.
//!
//! Each hook sees the receiver and the value folded so far. A
//! [`HookOutcome::Replace`] becomes the new value; [`HookOutcome::Continue`]
//! leaves it as is. The first error stops the fold and is returned as-is.

use std::sync::Arc;

use edgehook_core::AppResult;

use super::definitions::{AsyncHook, HookOutcome, SyncHook};

/// Runs synchronous hooks in order.
pub fn run_sync<R, T>(hooks: &[SyncHook<R, T>], receiver: &R, input: T) -> AppResult<T> {
    let mut value = input;
    for hook in hooks {
        value = hook(receiver, &value)?.apply(value);
    }
    Ok(value)
}

/// Runs asynchronous hooks strictly one after another.
///
/// Each hook is awaited to completion before the next one starts.
pub async fn run_async<R, T>(
    hooks: &[Arc<dyn AsyncHook<R, T>>],
    receiver: &R,
    input: T,
) -> AppResult<T> {
    let mut value = input;
    for hook in hooks {
        let outcome: HookOutcome<T> = hook.call(receiver, &value).await?;
        value = outcome.apply(value);
    }
    Ok(value)
}
