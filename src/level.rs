// SPDX-License-Identifier: MIT OR Apache-2.0

//! Severity levels.

use crate::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// The severity of a log entry.
///
/// Levels are totally ordered: `Debug < Info < Warn < Error < Fatal < Unknown`.
/// `Unknown` is also what an entry gets when no severity can be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    /// Detailed information for people debugging this program
    #[default]
    Debug,
    /// Routine operational messages
    Info,
    /// Suspicious condition
    Warn,
    /// Recoverable runtime error
    Error,
    /// The program (or a request) cannot continue
    Fatal,
    /// Always logged, severity could not be determined
    Unknown,
}

impl Level {
    /// All levels, in ascending order.
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
        Level::Unknown,
    ];

    /// The label written into serialized entries.
    pub const fn label(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Unknown => "ANY",
        }
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<u8> for Level {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        Level::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| Error::InvalidArgument(format!("invalid log level: {value}")))
    }
}

impl FromStr for Level {
    type Err = Error;

    /// Parses a level name, case-insensitively.  Both `unknown` and `any` name [Level::Unknown].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            "unknown" | "any" => Ok(Level::Unknown),
            _ => Err(Error::InvalidArgument(format!("invalid log level: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        for pair in Level::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn parse_names() {
        assert_eq!("INFO".parse::<Level>().unwrap(), Level::Info);
        assert_eq!("warning".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!(" any ".parse::<Level>().unwrap(), Level::Unknown);
    }

    #[test]
    fn invalid_levels_are_rejected() {
        assert!(matches!(
            "verbose".parse::<Level>(),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(Level::try_from(6), Err(Error::InvalidArgument(_))));
        assert_eq!(Level::try_from(4).unwrap(), Level::Fatal);
    }

    #[test]
    fn round_trip_through_u8() {
        for level in Level::ALL {
            assert_eq!(Level::try_from(level.as_u8()).unwrap(), level);
        }
    }
}
