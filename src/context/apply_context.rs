// SPDX-License-Identifier: MIT OR Apache-2.0

//! Async context preservation.

use std::future::Future;
use std::pin::Pin;
use std::task::Poll;

use super::ambient::AmbientContext;
use super::map::Context;

/// A [`Future`] wrapper that carries an ambient context across executor boundaries.
///
/// Executors may poll a task on any thread, and several tasks interleave on one
/// thread, so thread-local state alone cannot scope context to a task.
/// `ApplyContext` installs its context around every poll and restores the
/// poller's context afterwards (also when the poll panics).
///
/// # Examples
///
/// ```rust
/// use contextwise::{AmbientContext, ApplyContext, context};
///
/// async fn handle_request() -> String {
///     AmbientContext::current().get("request_id").unwrap().to_string()
/// }
///
/// # async fn example() {
/// let future = ApplyContext::new(context! { "request_id" => "r-17" }, handle_request());
/// assert_eq!(future.await, "\"r-17\"");
/// # }
/// ```
pub struct ApplyContext<F>(Context, F);

impl<F> ApplyContext<F> {
    /// Wraps `f` so that `context` is the ambient context while it runs.
    pub fn new(context: Context, f: F) -> Self {
        Self(context, f)
    }

    /// Wraps `f` with the caller's current ambient context deep-merged with `context`.
    ///
    /// The merge happens now, so the future keeps the context of the code that
    /// created it even if it is spawned elsewhere.
    pub fn inherit(context: Context, f: F) -> Self {
        Self(AmbientContext::current().deep_merge(&context), f)
    }

    /// The context installed around each poll.
    pub fn context(&self) -> &Context {
        &self.0
    }
}

impl<F> Future for ApplyContext<F>
where
    F: Future,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        //safety: the inner future is never moved out of `self`
        let (context, fut) = unsafe {
            let d = self.get_unchecked_mut();
            (d.0.clone(), Pin::new_unchecked(&mut d.1))
        };
        let _guard = AmbientContext::set(context);
        fut.poll(cx)
    }
}
