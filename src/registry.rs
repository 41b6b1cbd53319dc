// SPDX-License-Identifier: MIT OR Apache-2.0

/*!
Declared context keys.

Most context is free-form, but some keys deserve rules: a value that should always
be rendered as a string, a value that needs a custom rendering, or a value that
must never be logged verbatim.  A [`ContextRegistry`] declares such keys (optionally
nested) and a [`ContextualLogger`](crate::ContextualLogger) applies it to the merged
context of every entry before formatting.

Keys that are not declared pass through untouched.

```rust
use contextwise::registry::{ContextRegistry, StringType};
use contextwise::context;

let registry = ContextRegistry::new()
    .string("user_id")
    .string_with("password", StringType::new().sensitive())
    .hash("request", ContextRegistry::new().string("id"));

let applied = registry.apply(
    &context! { "user_id" => 42, "password" => "hunter2", "request" => {"id": 7} },
    "******",
);
assert_eq!(
    applied,
    context! { "user_id" => "42", "password" => "******", "request" => {"id": "7"} }
);
```
*/

use crate::context::Context;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

/// A custom rendering for a declared value.
pub type FormatFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// How a declared string value is rendered.
#[derive(Clone)]
pub enum ValueFormatter {
    /// Strings as-is, `null` as the empty string, anything else as its JSON text.
    Display,
    Custom(FormatFn),
}

impl Debug for ValueFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueFormatter::Display => f.write_str("Display"),
            ValueFormatter::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A declared value rendered as a string.
#[derive(Debug, Clone)]
pub struct StringType {
    formatter: ValueFormatter,
    sensitive: bool,
}

impl Default for StringType {
    fn default() -> Self {
        StringType::new()
    }
}

impl StringType {
    pub fn new() -> Self {
        StringType {
            formatter: ValueFormatter::Display,
            sensitive: false,
        }
    }

    /// Renders values with `f` instead of the default display rules.
    pub fn with_formatter(mut self, f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.formatter = ValueFormatter::Custom(Arc::new(f));
        self
    }

    /// Marks the value as sensitive: it is replaced by the redaction marker.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    pub fn formatter(&self) -> &ValueFormatter {
        &self.formatter
    }

    /// Renders `value` according to the formatter.  Sensitivity is not applied here.
    pub fn format(&self, value: &Value) -> Value {
        match &self.formatter {
            ValueFormatter::Display => match value {
                Value::String(_) => value.clone(),
                Value::Null => Value::String(String::new()),
                other => Value::String(other.to_string()),
            },
            ValueFormatter::Custom(f) => f(value),
        }
    }

    /// A JSON description of this type.
    pub fn describe(&self) -> Value {
        let formatter = match self.formatter {
            ValueFormatter::Display => "to_s",
            ValueFormatter::Custom(_) => "custom",
        };
        let mut description = json!({"type": "string", "formatter": formatter});
        if self.sensitive {
            description["sensitive"] = Value::Bool(true);
        }
        description
    }
}

/// The type of one declared key.
#[derive(Debug, Clone)]
pub enum RegistryType {
    String(StringType),
    /// A nested object whose own keys are declared by a registry.
    Hash(ContextRegistry),
}

impl RegistryType {
    pub fn describe(&self) -> Value {
        match self {
            RegistryType::String(t) => t.describe(),
            RegistryType::Hash(registry) => json!({"type": "hash", "keys": registry.describe()}),
        }
    }
}

/// A set of declared context keys.
#[derive(Debug, Clone, Default)]
pub struct ContextRegistry {
    types: BTreeMap<String, RegistryType>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        ContextRegistry::default()
    }

    /// Declares `key` as a string with default rendering.
    pub fn string(self, key: impl Into<String>) -> Self {
        self.string_with(key, StringType::new())
    }

    pub fn string_with(mut self, key: impl Into<String>, string_type: StringType) -> Self {
        self.types
            .insert(key.into(), RegistryType::String(string_type));
        self
    }

    /// Declares `key` as a nested object with its own declared keys.
    pub fn hash(mut self, key: impl Into<String>, registry: ContextRegistry) -> Self {
        self.types.insert(key.into(), RegistryType::Hash(registry));
        self
    }

    pub fn get(&self, key: &str) -> Option<&RegistryType> {
        self.types.get(key)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Applies the declared rules to `context`.
    ///
    /// Sensitive values become `marker`.  Returns `context` itself when no
    /// declared key is present.
    pub fn apply(&self, context: &Context, marker: &str) -> Context {
        if self.is_empty() || !context.iter().any(|(key, _)| self.types.contains_key(key)) {
            return context.clone();
        }
        Context::from_map(self.apply_map(context.as_map(), marker))
    }

    fn apply_map(&self, map: &Map<String, Value>, marker: &str) -> Map<String, Value> {
        map.iter()
            .map(|(key, value)| {
                let applied = match self.types.get(key) {
                    None => value.clone(),
                    Some(RegistryType::String(t)) if t.is_sensitive() => {
                        Value::String(marker.to_string())
                    }
                    Some(RegistryType::String(t)) => t.format(value),
                    Some(RegistryType::Hash(nested)) => match value {
                        Value::Object(inner) => Value::Object(nested.apply_map(inner, marker)),
                        other => other.clone(),
                    },
                };
                (key.clone(), applied)
            })
            .collect()
    }

    /// A JSON description of every declared key.
    pub fn describe(&self) -> Value {
        Value::Object(
            self.types
                .iter()
                .map(|(key, t)| (key.clone(), t.describe()))
                .collect(),
        )
    }
}
