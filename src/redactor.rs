// SPDX-License-Identifier: MIT OR Apache-2.0

//! Replacing registered secrets in outgoing entries.
//!
//! A [`Redactor`] holds secret literals (passwords, tokens, keys loaded at
//! startup) and optionally regular-expression patterns.  Every entry a
//! [`ContextualLogger`](crate::ContextualLogger) writes is passed through its
//! redactor twice: every field value is redacted with [`Redactor::redact_value`]
//! before formatting, so secrets are matched before JSON escaping can change
//! them, and the formatted line is then redacted with [`Redactor::redact`] to
//! cover whatever a custom formatter adds.
//!
//! Registration is expected to be rare and redaction very frequent.  All secrets
//! are compiled into one matcher at registration time, so redacting an entry is
//! a single pass under a read lock.
//!
//! ```rust
//! use contextwise::Redactor;
//!
//! let redactor = Redactor::new();
//! redactor.register_secret("hunter2").unwrap();
//! assert_eq!(
//!     redactor.redact(r#"{"message":"login with hunter2"}"#).unwrap(),
//!     r#"{"message":"login with ******"}"#
//! );
//! ```

use crate::error::{Error, Result};
use regex::{NoExpand, Regex};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::{Arc, OnceLock, RwLock};

/// The text secrets are replaced with.
pub const REDACTION_MARKER: &str = "******";

static GLOBAL_REDACTOR: OnceLock<Arc<Redactor>> = OnceLock::new();

#[derive(Debug, Default)]
struct Secrets {
    literals: Vec<String>,
    patterns: Vec<String>,
    matcher: Option<Regex>,
}

impl Secrets {
    fn build_matcher(literals: &[String], patterns: &[String]) -> Result<Option<Regex>> {
        if literals.is_empty() && patterns.is_empty() {
            return Ok(None);
        }
        //longest literal first, so a secret containing another secret is replaced whole
        let mut sorted: Vec<&String> = literals.iter().collect();
        sorted.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternatives: Vec<String> = sorted
            .into_iter()
            .map(|literal| regex::escape(literal))
            .chain(patterns.iter().map(|pattern| format!("(?:{pattern})")))
            .collect();
        Regex::new(&alternatives.join("|"))
            .map(Some)
            .map_err(|e| Error::InvalidArgument(format!("cannot compile secret matcher: {e}")))
    }
}

/// A registry of secrets, and the scanner that removes them from text.
#[derive(Debug)]
pub struct Redactor {
    secrets: RwLock<Secrets>,
    marker: String,
}

impl Default for Redactor {
    fn default() -> Self {
        Redactor::new()
    }
}

impl Redactor {
    pub fn new() -> Self {
        Redactor::with_marker(REDACTION_MARKER)
    }

    /// A redactor that replaces secrets with `marker` instead of [`REDACTION_MARKER`].
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Redactor {
            secrets: RwLock::new(Secrets::default()),
            marker: marker.into(),
        }
    }

    /// The process-wide redactor.
    ///
    /// Loggers use it unless given their own, so a secret registered here is
    /// removed from every such logger's output.
    pub fn global() -> Arc<Redactor> {
        GLOBAL_REDACTOR
            .get_or_init(|| Arc::new(Redactor::new()))
            .clone()
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Registers a literal secret.
    ///
    /// Registering the same value again has no effect.  Empty values are ignored,
    /// since they would match between every character.
    pub fn register_secret(&self, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        if value.is_empty() {
            return Ok(());
        }
        self.update(|literals, _| {
            if literals.contains(&value) {
                false
            } else {
                literals.push(value);
                true
            }
        })
    }

    /// Registers a regular expression; every match is treated as a secret.
    ///
    /// Fails with [`Error::InvalidArgument`] if the pattern does not compile.
    pub fn register_pattern(&self, pattern: &str) -> Result<()> {
        Regex::new(pattern).map_err(|e| {
            Error::InvalidArgument(format!("invalid secret pattern {pattern:?}: {e}"))
        })?;
        let pattern = pattern.to_string();
        self.update(|_, patterns| {
            if patterns.contains(&pattern) {
                false
            } else {
                patterns.push(pattern);
                true
            }
        })
    }

    //applies `change` to copies of the lists; commits only if it changed something
    //and the new matcher compiles
    fn update(&self, change: impl FnOnce(&mut Vec<String>, &mut Vec<String>) -> bool) -> Result<()> {
        let mut secrets = self
            .secrets
            .write()
            .map_err(|_| Error::RedactionFailed("secret registry is poisoned".to_string()))?;
        let mut literals = secrets.literals.clone();
        let mut patterns = secrets.patterns.clone();
        if !change(&mut literals, &mut patterns) {
            return Ok(());
        }
        let matcher = Secrets::build_matcher(&literals, &patterns)?;
        *secrets = Secrets {
            literals,
            patterns,
            matcher,
        };
        Ok(())
    }

    /// Number of registered literals and patterns.
    pub fn len(&self) -> usize {
        self.secrets
            .read()
            .map(|s| s.literals.len() + s.patterns.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces every occurrence of a registered secret in `text` with the marker.
    ///
    /// Returns the input unchanged (and unallocated) when nothing matches.  Fails
    /// only when the registry is unusable because a thread panicked while
    /// registering; in that case nothing can be said about which secrets exist.
    pub fn redact<'t>(&self, text: &'t str) -> Result<Cow<'t, str>> {
        let secrets = self
            .secrets
            .read()
            .map_err(|_| Error::RedactionFailed("secret registry is poisoned".to_string()))?;
        Ok(match &secrets.matcher {
            Some(matcher) => matcher.replace_all(text, NoExpand(&self.marker)),
            None => Cow::Borrowed(text),
        })
    }

    /// Redacts every string inside `value`, recursing through arrays and objects.
    ///
    /// Object keys are left alone.
    pub fn redact_value(&self, value: &mut Value) -> Result<()> {
        match value {
            Value::String(s) => {
                if let Cow::Owned(redacted) = self.redact(s)? {
                    *s = redacted;
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.redact_value(item)?;
                }
            }
            Value::Object(map) => {
                for (_, item) in map.iter_mut() {
                    self.redact_value(item)?;
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = self.secrets.write();
                    panic!("poisoning the secret registry");
                })
                .join()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replaces_registered_secrets() {
        let redactor = Redactor::new();
        redactor.register_secret("s3cr3t").unwrap();
        assert_eq!(
            redactor.redact("password=s3cr3t; again s3cr3t").unwrap(),
            "password=******; again ******"
        );
    }

    #[test]
    fn leaves_look_alikes_untouched() {
        let redactor = Redactor::new();
        redactor.register_secret("s3cr3t").unwrap();
        let text = "s3cr3 S3CR3T s3cr-3t";
        assert!(matches!(redactor.redact(text).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn substrings_of_larger_values_are_redacted() {
        let redactor = Redactor::new();
        redactor.register_secret("abc123").unwrap();
        assert_eq!(
            redactor.redact("token=xxabc123yy").unwrap(),
            "token=xx******yy"
        );
    }

    #[test]
    fn registration_is_idempotent() {
        let redactor = Redactor::new();
        redactor.register_secret("token").unwrap();
        redactor.register_secret("token").unwrap();
        redactor.register_secret("").unwrap();
        assert_eq!(redactor.len(), 1);
    }

    #[test]
    fn longer_secret_wins_on_overlap() {
        let redactor = Redactor::new();
        redactor.register_secret("key").unwrap();
        redactor.register_secret("keychain").unwrap();
        assert_eq!(redactor.redact("keychain key").unwrap(), "****** ******");
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let redactor = Redactor::new();
        redactor.register_secret("a.b*c").unwrap();
        assert_eq!(redactor.redact("axbbc a.b*c").unwrap(), "axbbc ******");
    }

    #[test]
    fn patterns_match_and_invalid_patterns_fail() {
        let redactor = Redactor::new();
        redactor.register_pattern(r"sk_live_[0-9a-z]+").unwrap();
        assert_eq!(
            redactor.redact("key sk_live_9f8e7d end").unwrap(),
            "key ****** end"
        );
        assert!(matches!(
            redactor.register_pattern("(unclosed"),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(redactor.len(), 1);
    }

    #[test]
    fn marker_is_not_expanded() {
        let redactor = Redactor::with_marker("$0[gone]");
        redactor.register_secret("pw").unwrap();
        assert_eq!(redactor.redact("pw").unwrap(), "$0[gone]");
    }

    #[test]
    fn redacts_value_trees() {
        let redactor = Redactor::new();
        redactor.register_secret("hunter2").unwrap();
        let mut value = json!({
            "user": {"password": "hunter2", "hunter2": 1},
            "history": ["ok", "hunter2!"],
        });
        redactor.redact_value(&mut value).unwrap();
        assert_eq!(
            value,
            json!({
                "user": {"password": "******", "hunter2": 1},
                "history": ["ok", "******!"],
            })
        );
    }

    #[test]
    fn poisoned_registry_reports_failure() {
        let redactor = Redactor::new();
        redactor.register_secret("hunter2").unwrap();
        redactor.poison();
        assert!(matches!(
            redactor.redact("hunter2"),
            Err(Error::RedactionFailed(_))
        ));
        assert!(matches!(
            redactor.register_secret("other"),
            Err(Error::RedactionFailed(_))
        ));
    }

    #[test]
    fn concurrent_readers_and_writers() {
        let redactor = Arc::new(Redactor::new());
        redactor.register_secret("initial").unwrap();
        let writers: Vec<_> = (0..4)
            .map(|i| {
                let redactor = redactor.clone();
                std::thread::spawn(move || redactor.register_secret(format!("secret-{i}")).unwrap())
            })
            .collect();
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let redactor = redactor.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        assert_eq!(redactor.redact("initial").unwrap(), "******");
                    }
                })
            })
            .collect();
        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }
        assert_eq!(redactor.len(), 5);
    }
}
