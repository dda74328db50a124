//! Function wrapper: runs the before-chain, the target, then the after-chain.
//!
//! The wrapper is a pure pass-through: it forwards the receiver untouched to
//! the target and to every hook, and it never catches, retries, or rewrites
//! an error. Hooks are read from the registry at call time, so hooks
//! appended after wrapping still apply.

use std::sync::Arc;

use futures::FutureExt;

use super::definitions::{AsyncFn, SyncFn};
use super::registry::{AsyncRegistry, SyncRegistry};
use super::runner::{run_async, run_sync};

/// Wraps a synchronous target.
pub fn wrap_sync<R, A, O>(
    target: SyncFn<R, A, O>,
    registry: Arc<SyncRegistry<R, A, O>>,
) -> SyncFn<R, A, O>
where
    R: 'static,
    A: 'static,
    O: 'static,
{
    Arc::new(move |receiver: &R, args: A| {
        let args = run_sync(&registry.before_hooks(), receiver, args)?;
        let output = target(receiver, args)?;
        run_sync(&registry.after_hooks(), receiver, output)
    })
}

/// Wraps an asynchronous target.
///
/// Suspends at each before-hook, at the target, and at each after-hook, in
/// that order; nothing in one invocation runs concurrently.
pub fn wrap_async<R, A, O>(
    target: AsyncFn<R, A, O>,
    registry: Arc<AsyncRegistry<R, A, O>>,
) -> AsyncFn<R, A, O>
where
    R: Clone + Send + Sync + 'static,
    A: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    Arc::new(move |receiver: R, args: A| {
        let target = target.clone();
        let registry = registry.clone();
        async move {
            let before = registry.before_hooks();
            let args = run_async(&before, &receiver, args).await?;
            let output = target(receiver.clone(), args).await?;
            let after = registry.after_hooks();
            run_async(&after, &receiver, output).await
        }
        .boxed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::definitions::{AsyncHookFn, HookOutcome, async_fn, sync_fn};
    use edgehook_core::AppError;
    use std::sync::Mutex;

    #[test]
    fn test_sync_wrapper_runs_before_target_after() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let registry: Arc<SyncRegistry<(), (i32,), i32>> = Arc::new(SyncRegistry::new());

        let t = trace.clone();
        registry.push_before(Arc::new(move |_, (n,)| {
            t.lock().unwrap().push(format!("before {n}"));
            Ok(HookOutcome::Replace((n + 1,)))
        }));
        let t = trace.clone();
        registry.push_after(Arc::new(move |_, out| {
            t.lock().unwrap().push(format!("after {out}"));
            Ok(HookOutcome::Replace(out * 10))
        }));

        let t = trace.clone();
        let target = sync_fn(move |_: &(), (n,): (i32,)| {
            t.lock().unwrap().push(format!("target {n}"));
            Ok(n)
        });

        let wrapped = wrap_sync(target, registry);
        assert_eq!(wrapped(&(), (1,)).expect("call"), 20);
        assert_eq!(
            *trace.lock().unwrap(),
            vec!["before 1", "target 2", "after 2"]
        );
    }

    #[test]
    fn test_hooks_added_after_wrapping_apply() {
        let registry: Arc<SyncRegistry<(), (i32,), i32>> = Arc::new(SyncRegistry::new());
        let wrapped = wrap_sync(sync_fn(|_: &(), (n,): (i32,)| Ok(n)), registry.clone());
        assert_eq!(wrapped(&(), (1,)).expect("call"), 1);

        registry.push_after(Arc::new(|_, out| Ok(HookOutcome::Replace(out + 100))));
        assert_eq!(wrapped(&(), (1,)).expect("call"), 101);
    }

    #[tokio::test]
    async fn test_async_target_error_skips_after_hooks() {
        let registry: Arc<AsyncRegistry<(), (i32,), i32>> = Arc::new(AsyncRegistry::new());
        let after_ran = Arc::new(Mutex::new(false));
        let flag = after_ran.clone();
        registry.push_after(Arc::new(AsyncHookFn(move |_: (), _: i32| {
            let flag = flag.clone();
            async move {
                *flag.lock().unwrap() = true;
                Ok(HookOutcome::Continue)
            }
        })));

        let target = async_fn(|_: (), (_n,): (i32,)| async move {
            Err::<i32, _>(AppError::network("connection reset"))
        });
        let wrapped = wrap_async(target, registry);

        let err = wrapped((), (1,)).await.expect_err("should fail");
        assert_eq!(err, AppError::network("connection reset"));
        assert!(!*after_ran.lock().unwrap());
    }
}
