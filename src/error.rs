// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error type for contextwise.

use thiserror::Error;

/// Errors that can occur while configuring loggers or preparing context.
///
/// Logging calls themselves never fail; these errors come from configuration
/// (levels, secret patterns) and from building contexts out of untyped values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("redaction failed: {0}")]
    RedactionFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
