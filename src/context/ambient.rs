// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thread-local ambient context.

use super::map::Context;
use std::cell::RefCell;
use std::marker::PhantomData;

thread_local! {
    static AMBIENT: RefCell<Context> = RefCell::new(Context::new());
}

/// Access to the ambient context of the current thread.
///
/// The ambient context is attached to every entry logged on this thread, beneath
/// any logger-bound or per-call context.  It starts empty.  Each thread has its
/// own, so concurrent threads never observe each other's context.  For async
/// code, wrap futures in [`ApplyContext`](super::ApplyContext).
///
/// ```rust
/// use contextwise::{AmbientContext, context};
///
/// AmbientContext::with_scope(context! { "request_id" => "abc" }, || {
///     assert_eq!(AmbientContext::current().get("request_id").unwrap(), "abc");
/// });
/// assert!(AmbientContext::current().is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AmbientContext;

impl AmbientContext {
    /// Returns the ambient context for this thread.
    ///
    /// During thread teardown, after thread-locals are destroyed, this is empty.
    #[inline]
    pub fn current() -> Context {
        AMBIENT
            .try_with(|cell| cell.borrow().clone())
            .unwrap_or_default()
    }

    /// Installs `context` as this thread's ambient context.
    ///
    /// The returned guard restores whatever was active immediately before this
    /// call, either explicitly with [`ContextGuard::reset`] or when dropped.
    pub fn set(context: Context) -> ContextGuard {
        let previous = replace(context);
        ContextGuard {
            previous,
            _not_send: PhantomData,
        }
    }

    /// Runs `body` with the current context deep-merged with `context`.
    ///
    /// The prior context is restored however `body` exits, including by panic.
    ///
    /// ```rust
    /// use contextwise::{AmbientContext, context};
    ///
    /// let _outer = AmbientContext::set(context! { "job" => "reindex" });
    /// let result: Result<(), String> = AmbientContext::with_scope(context! { "shard" => 3 }, || {
    ///     let current = AmbientContext::current();
    ///     assert_eq!(current.get("job").unwrap(), "reindex");
    ///     assert_eq!(current.get("shard").unwrap(), 3);
    ///     Err("shard offline".to_string())
    /// });
    /// assert!(result.is_err());
    /// assert_eq!(AmbientContext::current(), context! { "job" => "reindex" });
    /// ```
    pub fn with_scope<R>(context: Context, body: impl FnOnce() -> R) -> R {
        let merged = AmbientContext::current().deep_merge(&context);
        let _guard = AmbientContext::set(merged);
        body()
    }
}

fn replace(context: Context) -> Option<Context> {
    AMBIENT.try_with(|cell| cell.replace(context)).ok()
}

/// Restores the previous ambient context when reset or dropped.
///
/// Guards are tied to the thread that created them.
#[must_use = "the ambient context is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard {
    previous: Option<Context>,
    _not_send: PhantomData<*const ()>,
}

impl ContextGuard {
    /// Restores the context that was active before the matching `set`.
    pub fn reset(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if let Some(previous) = self.previous.take() {
            replace(previous);
        }
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        self.restore();
    }
}
