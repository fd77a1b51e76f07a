//! Per-entry audit trail.
//!
//! Records are only ever appended. Insertion order is the only ordering
//! guarantee; timestamps are informational.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Severity of an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Error,
    Success,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Success => "success",
        })
    }
}

/// Something worth recording, before it is stamped.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    pub level: Level,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            details: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message)
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// A stamped audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: Timestamp,
    pub level: Level,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Append-only sequence of audit records.
///
/// Serialized as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditLog(Vec<AuditRecord>);

impl AuditLog {
    /// Stamps `event` with the current time and appends it.
    pub fn append(&mut self, event: AuditEvent) {
        self.0.push(AuditRecord {
            timestamp: Timestamp::now(),
            level: event.level,
            message: event.message,
            details: event.details,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuditRecord> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&AuditRecord> {
        self.0.last()
    }
}

impl<'a> IntoIterator for &'a AuditLog {
    type Item = &'a AuditRecord;
    type IntoIter = std::slice::Iter<'a, AuditRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_insertion_order() {
        let mut log = AuditLog::default();
        log.append(AuditEvent::info("first"));
        log.append(AuditEvent::new(Level::Warn, "second"));
        log.append(
            AuditEvent::new(Level::Success, "third")
                .with_details(serde_json::json!({ "step": 3 })),
        );

        let messages: Vec<&str> = log.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, ["first", "second", "third"]);
        assert_eq!(log.last().unwrap().details, Some(serde_json::json!({ "step": 3 })));
    }

    #[test]
    fn serializes_as_array() {
        let mut log = AuditLog::default();
        log.append(AuditEvent::info("hello"));

        let json = serde_json::to_value(&log).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["level"], "info");
        assert!(json[0].get("details").is_none());
    }
}
