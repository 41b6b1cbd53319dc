// SPDX-License-Identifier: MIT OR Apache-2.0

//! The [`Context`] map and its deep merge.

use crate::error::Error;
use serde_json::{Map, Value};
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

static EMPTY: OnceLock<Context> = OnceLock::new();

/// An immutable snapshot of key/value metadata attached to log entries.
///
/// Values are arbitrary JSON values.  Contexts are cheap to clone (the map is
/// shared behind an `Arc`) and are never mutated in place once shared; the
/// builder methods copy-on-write.
///
/// Equality is structural and ignores key order.  Hashing agrees with that,
/// so a `Context` can key a hash map by shape (see [`MergeCache`](crate::MergeCache)).
/// Rendering, on the other hand, preserves insertion order.
///
/// ```rust
/// use contextwise::{Context, context};
///
/// let base = context! { "log_source" => "redis_client", "request" => {"id": 1} };
/// let extra = context! { "request" => {"retry": true} };
/// let merged = base.deep_merge(&extra);
/// assert_eq!(merged.get("request").unwrap()["id"], 1);
/// assert_eq!(merged.get("request").unwrap()["retry"], true);
/// ```
#[derive(Clone)]
pub struct Context {
    inner: Arc<Map<String, Value>>,
}

impl Context {
    /// The empty context.
    ///
    /// All empty contexts share one allocation.
    pub fn new() -> Context {
        EMPTY
            .get_or_init(|| Context {
                inner: Arc::new(Map::new()),
            })
            .clone()
    }

    /// Wraps an existing JSON object.
    pub fn from_map(map: Map<String, Value>) -> Context {
        Context {
            inner: Arc::new(map),
        }
    }

    /// Builds a context from key/value pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Context
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs.into_iter().collect()
    }

    /// Returns a copy of this context with `key` set to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Context {
        Arc::make_mut(&mut self.inner).insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.inner.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.inner
    }

    /// Takes the map out, copying only if it is shared.
    pub fn into_map(self) -> Map<String, Value> {
        Arc::unwrap_or_clone(self.inner)
    }

    /// Whether both contexts share the same allocation.
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Right-biased deep merge.
    ///
    /// Keys in `other` win.  When both sides hold an object under the same key the
    /// objects are merged recursively; any other value is replaced outright.
    ///
    /// When either side is empty the other is returned as-is, without allocating.
    pub fn deep_merge(&self, other: &Context) -> Context {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut merged = (*self.inner).clone();
        deep_merge_into(&mut merged, &other.inner);
        Context::from_map(merged)
    }

    /// The context as a JSON object value.
    pub fn to_value(&self) -> Value {
        Value::Object((*self.inner).clone())
    }
}

/// Merges `source` into `target`, recursing where both sides are objects.
pub(crate) fn deep_merge_into(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge_into(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.inner == other.inner
    }
}

impl Eq for Context {}

impl Hash for Context {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_map(&self.inner, state);
    }
}

//keys are visited in sorted order so the hash ignores insertion order, like Eq does
fn hash_map<H: Hasher>(map: &Map<String, Value>, state: &mut H) {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
    state.write_usize(entries.len());
    for (key, value) in entries {
        key.hash(state);
        hash_value(value, state);
    }
}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::Null => state.write_u8(0),
        Value::Bool(b) => {
            state.write_u8(1);
            b.hash(state);
        }
        Value::Number(n) => {
            state.write_u8(2);
            //Number's Hash agrees with its PartialEq, including 0.0 == -0.0
            n.hash(state);
        }
        Value::String(s) => {
            state.write_u8(3);
            s.hash(state);
        }
        Value::Array(items) => {
            state.write_u8(4);
            state.write_usize(items.len());
            for item in items {
                hash_value(item, state);
            }
        }
        Value::Object(map) => {
            state.write_u8(5);
            hash_map(map, state);
        }
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Context({})", self)
    }
}

impl Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = serde_json::to_string(&*self.inner).map_err(|_| std::fmt::Error)?;
        f.write_str(&rendered)
    }
}

impl From<Map<String, Value>> for Context {
    fn from(map: Map<String, Value>) -> Self {
        Context::from_map(map)
    }
}

impl TryFrom<Value> for Context {
    type Error = Error;

    /// Only JSON objects are contexts; anything else is rejected rather than
    /// wrapped or coerced.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Context::from_map(map)),
            Value::Null => Err(Error::InvalidArgument(
                "context must be a JSON object, got null".to_string(),
            )),
            other => Err(Error::InvalidArgument(format!(
                "context must be a JSON object, got {other}"
            ))),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let map: Map<String, Value> = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if map.is_empty() {
            Context::new()
        } else {
            Context::from_map(map)
        }
    }
}

impl<'a> IntoIterator for &'a Context {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builds a [`Context`] from `key => value` pairs.
///
/// Values use [`serde_json::json!`] syntax, so nested objects and arrays can be
/// written inline.  Wrap arbitrary expressions in parentheses.
///
/// ```rust
/// use contextwise::context;
///
/// let user_id = 42;
/// let ctx = context! {
///     "log_source" => "frontend",
///     "user" => {"id": user_id, "roles": ["admin"]},
///     "attempt" => (1 + 1),
/// };
/// assert_eq!(ctx.len(), 3);
/// ```
#[macro_export]
macro_rules! context {
    () => {
        $crate::Context::new()
    };
    ($($key:expr => $value:tt),+ $(,)?) => {
        $crate::Context::from_pairs([
            $(($key, $crate::hidden::json!($value))),+
        ])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn ctx(value: Value) -> Context {
        Context::try_from(value).unwrap()
    }

    #[test]
    fn later_keys_win() {
        let a = ctx(json!({"log_source": "redis_client", "a": 1}));
        let b = ctx(json!({"log_source": "frontend"}));
        let merged = a.deep_merge(&b);
        assert_eq!(merged, ctx(json!({"log_source": "frontend", "a": 1})));
    }

    #[test]
    fn nested_maps_merge_recursively() {
        let a = ctx(json!({"request": {"id": 1, "headers": {"host": "a"}}}));
        let b = ctx(json!({"request": {"headers": {"accept": "json"}}}));
        let merged = a.deep_merge(&b);
        assert_eq!(
            merged,
            ctx(json!({"request": {"id": 1, "headers": {"host": "a", "accept": "json"}}}))
        );
    }

    #[test]
    fn non_maps_are_replaced_wholesale() {
        let a = ctx(json!({"tags": ["a", "b"], "request": {"id": 1}}));
        let b = ctx(json!({"tags": ["c"], "request": "none"}));
        let merged = a.deep_merge(&b);
        assert_eq!(merged, ctx(json!({"tags": ["c"], "request": "none"})));
    }

    #[test]
    fn merge_is_order_dependent() {
        let a = ctx(json!({"k": 1}));
        let b = ctx(json!({"k": 2}));
        assert_eq!(a.deep_merge(&b).get("k"), Some(&json!(2)));
        assert_eq!(b.deep_merge(&a).get("k"), Some(&json!(1)));
    }

    #[test]
    fn merging_empty_shares_allocation() {
        let a = ctx(json!({"k": 1}));
        assert!(a.deep_merge(&Context::new()).ptr_eq(&a));
        assert!(Context::new().deep_merge(&a).ptr_eq(&a));
        assert!(Context::new().ptr_eq(&Context::default()));
    }

    #[test]
    fn equality_and_hash_ignore_key_order() {
        let a = Context::from_pairs([("x", 1), ("y", 2)]);
        let b = Context::from_pairs([("y", 2), ("x", 1)]);
        assert_eq!(a, b);

        let mut map = HashMap::new();
        map.insert(a, "first");
        assert_eq!(map.get(&b), Some(&"first"));
    }

    #[test]
    fn rendering_keeps_insertion_order() {
        let c = context! { "log_source" => "redis_client", "call_id" => "234-123" };
        assert_eq!(
            c.to_string(),
            r#"{"log_source":"redis_client","call_id":"234-123"}"#
        );
    }

    #[test]
    fn non_objects_are_rejected() {
        assert!(matches!(
            Context::try_from(json!(["log_source"])),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Context::try_from(Value::Null),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn with_copies_on_write() {
        let a = context! { "k" => 1 };
        let shared = a.clone();
        let b = a.with("j", 2);
        assert_eq!(shared.len(), 1);
        assert_eq!(b.len(), 2);
    }
}
