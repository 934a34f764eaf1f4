//! Log severities and the threshold filter for `notifications/message`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Log severity, ordered from least (`Debug`) to most (`Emergency`) severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl LoggingLevel {
    /// Every level in ascending severity.
    pub const ALL: [LoggingLevel; 8] = [
        LoggingLevel::Debug,
        LoggingLevel::Info,
        LoggingLevel::Notice,
        LoggingLevel::Warning,
        LoggingLevel::Error,
        LoggingLevel::Critical,
        LoggingLevel::Alert,
        LoggingLevel::Emergency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LoggingLevel::Debug => "debug",
            LoggingLevel::Info => "info",
            LoggingLevel::Notice => "notice",
            LoggingLevel::Warning => "warning",
            LoggingLevel::Error => "error",
            LoggingLevel::Critical => "critical",
            LoggingLevel::Alert => "alert",
            LoggingLevel::Emergency => "emergency",
        }
    }

    /// Position in the severity order, `0` for `debug` up to `7` for `emergency`.
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// True only for a JSON string that exactly names one of the eight levels.
    ///
    /// Case variants, numbers, `null` and the empty string are all rejected.
    pub fn is_valid_level(value: &Value) -> bool {
        value
            .as_str()
            .is_some_and(|s| s.parse::<LoggingLevel>().is_ok())
    }
}

impl fmt::Display for LoggingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid logging level: {0:?}")]
pub struct InvalidLoggingLevel(pub String);

impl FromStr for LoggingLevel {
    type Err = InvalidLoggingLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoggingLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| InvalidLoggingLevel(s.to_string()))
    }
}

/// Gate for log-message notifications at or above a configured threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingMessageNotification {
    threshold: LoggingLevel,
}

impl LoggingMessageNotification {
    pub fn new(threshold: LoggingLevel) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> LoggingLevel {
        self.threshold
    }

    pub fn should_notify(&self, candidate: LoggingLevel) -> bool {
        candidate >= self.threshold
    }
}
