//! Install-then-run composition over a [`RuntimeAdapter`].
//!
//! The in-process counterpart of the packed artifact: an install segment
//! followed by a payload, where the install segment is skipped once the
//! adapter's guard is set. Composing a composition therefore installs once.

use tracing::debug;

use edgehook_core::AppResult;

use crate::adapter::RuntimeAdapter;

/// Composes `install` and `payload` into one runnable unit.
///
/// When the unit runs against an adapter whose guard is clear, `install`
/// registers its hooks and the installation sequence runs. `payload` always
/// runs afterwards. Errors from `install` abort the unit before `payload`.
pub fn bootstrap<I, P, T>(install: I, payload: P) -> impl FnOnce(&RuntimeAdapter) -> AppResult<T>
where
    I: FnOnce(&RuntimeAdapter) -> AppResult<()>,
    P: FnOnce(&RuntimeAdapter) -> AppResult<T>,
{
    move |adapter: &RuntimeAdapter| {
        if adapter.is_hooked() {
            debug!("Guard set, skipping install segment");
        } else {
            install(adapter)?;
            adapter.install();
        }
        payload(adapter)
    }
}
