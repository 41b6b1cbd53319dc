// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memoized merges of a logger's bound context with per-call context.
//!
//! Call sites tend to pass the same few extra contexts over and over
//! (`{"log_source": "frontend"}` and the like), so a logger remembers the merge
//! result for each distinct extra context it has seen.  The cache is bounded.
//! By default it is flushed entirely when it would overflow; call-site shapes are
//! normally so few that this only happens under unusual diversity, and a flush
//! needs no per-entry bookkeeping.  When shapes are high-cardinality a flush
//! leaves the cache nearly useless; [`OverflowPolicy::EvictOldest`] trades a
//! little bookkeeping for a steadier hit rate.

use crate::context::Context;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

/// Number of distinct extra contexts remembered before the cache overflows.
pub const DEFAULT_CAPACITY: usize = 5000;

/// What to do when inserting a new shape into a full cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Clear every entry, then insert the new one alone.
    #[default]
    Flush,
    /// Drop the entry that was inserted first.
    EvictOldest,
}

#[derive(Debug, Default)]
struct Entries {
    merged: HashMap<Context, Context>,
    //first-seen order of the keys in `merged`
    order: VecDeque<Context>,
}

/// A bounded cache of `bound.deep_merge(extra)` keyed by `extra`.
///
/// Keys compare structurally (see [`Context`]), so two separately built but
/// equal extra contexts share an entry.  Lookup-or-insert and overflow handling
/// happen under one lock, so concurrent callers never lose an insert or see a
/// half-flushed cache.
#[derive(Debug)]
pub struct MergeCache {
    capacity: usize,
    policy: OverflowPolicy,
    entries: Mutex<Entries>,
}

impl Default for MergeCache {
    fn default() -> Self {
        MergeCache::new()
    }
}

impl MergeCache {
    /// A cache of [`DEFAULT_CAPACITY`] shapes that flushes on overflow.
    pub fn new() -> Self {
        MergeCache::with_capacity(DEFAULT_CAPACITY, OverflowPolicy::Flush)
    }

    /// A cache holding at most `capacity` shapes (at least one).
    pub fn with_capacity(capacity: usize, policy: OverflowPolicy) -> Self {
        MergeCache {
            capacity: capacity.max(1),
            policy,
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Returns `bound` deep-merged with `extra`.
    ///
    /// An empty `extra` returns `bound` itself without touching the cache.
    pub fn merged_context(&self, bound: &Context, extra: &Context) -> Context {
        if extra.is_empty() {
            return bound.clone();
        }
        let mut entries = self.lock();
        if let Some(hit) = entries.merged.get(extra) {
            return hit.clone();
        }
        let merged = bound.deep_merge(extra);
        if entries.merged.len() >= self.capacity {
            self.make_room(&mut entries);
        }
        entries.merged.insert(extra.clone(), merged.clone());
        entries.order.push_back(extra.clone());
        merged
    }

    fn make_room(&self, entries: &mut Entries) {
        match self.policy {
            OverflowPolicy::Flush => {
                tracing::debug!(
                    capacity = self.capacity,
                    "merge cache full of distinct contexts, flushing"
                );
                entries.merged.clear();
                entries.order.clear();
            }
            OverflowPolicy::EvictOldest => {
                if let Some(oldest) = entries.order.pop_front() {
                    entries.merged.remove(&oldest);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().merged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The cached extra contexts, in the order they were first seen.
    pub fn keys(&self) -> Vec<Context> {
        self.lock().order.iter().cloned().collect()
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.merged.clear();
        entries.order.clear();
    }

    //a panic while holding the lock cannot leave a half-written entry behind, so the
    //contents are still usable
    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
