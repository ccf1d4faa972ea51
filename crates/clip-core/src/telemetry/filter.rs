// ── Filter predicates for log snapshots ──
//
// Consumers filter published snapshots locally; the ingestor never sees
// a filter.

use std::sync::Arc;

use clip_api::{LogEvent, LogLevel};

/// Conjunctive log filter. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Minimum severity (inclusive).
    pub min_level: Option<LogLevel>,
    /// Exact source name, case-insensitive.
    pub source: Option<String>,
    /// Case-insensitive substring of the message.
    pub pattern: Option<String>,
    /// Keep only the newest `limit` matches.
    pub limit: Option<usize>,
}

impl LogFilter {
    pub fn matches(&self, event: &LogEvent) -> bool {
        if self.min_level.is_some_and(|min| event.level < min) {
            return false;
        }
        if let Some(source) = &self.source {
            if !event.source.eq_ignore_ascii_case(source) {
                return false;
            }
        }
        if let Some(pattern) = &self.pattern {
            if !event
                .message
                .to_lowercase()
                .contains(&pattern.to_lowercase())
            {
                return false;
            }
        }
        true
    }

    /// Matching entries in buffer order, truncated to the newest `limit`.
    pub fn apply(&self, entries: &[Arc<LogEvent>]) -> Vec<Arc<LogEvent>> {
        let matched: Vec<_> = entries
            .iter()
            .filter(|e| self.matches(e))
            .cloned()
            .collect();
        match self.limit {
            Some(limit) if matched.len() > limit => matched[matched.len() - limit..].to_vec(),
            _ => matched,
        }
    }
}
