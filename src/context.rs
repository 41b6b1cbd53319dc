// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context maps and ambient, per-execution-unit context.
//!
//! A [`Context`] is an immutable map of metadata attached to log entries.  Contexts
//! layer: the thread's ambient context sits beneath a logger's bound context,
//! which sits beneath the context passed to a single call.  Layers combine with
//! [`Context::deep_merge`], where the later layer wins.
//!
//! # Ambient context
//!
//! Each thread has its own ambient context, managed through [`AmbientContext`]:
//!
//! ```rust
//! use contextwise::{AmbientContext, context};
//!
//! // Install a context for the rest of this scope.
//! let guard = AmbientContext::set(context! { "request_id" => "abc" });
//!
//! // Nested scopes merge on top of it and restore it afterwards.
//! AmbientContext::with_scope(context! { "step" => "parse" }, || {
//!     let current = AmbientContext::current();
//!     assert_eq!(current.get("request_id").unwrap(), "abc");
//!     assert_eq!(current.get("step").unwrap(), "parse");
//! });
//! assert!(AmbientContext::current().get("step").is_none());
//!
//! // Back to whatever was there before `set`.
//! guard.reset();
//! assert!(AmbientContext::current().is_empty());
//! ```
//!
//! # Async context preservation
//!
//! [`ApplyContext`] carries a context with a future, installing it around each poll:
//!
//! ```rust
//! use contextwise::{ApplyContext, context};
//! # async fn work() {}
//!
//! # async fn example() {
//! ApplyContext::new(context! { "job" => "reindex" }, work()).await;
//! # }
//! ```

mod ambient;
mod apply_context;
mod map;


pub use ambient::{AmbientContext, ContextGuard};
pub use apply_context::ApplyContext;
pub use map::Context;
