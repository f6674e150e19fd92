// Context formatter: ranked log matches -> bounded prompt block
use serde::{Deserialize, Serialize};

use crate::types::{Match, RetrievalResult, MAX_MATCHES};

/// Returned instead of a context block when retrieval found nothing
pub const NO_RELEVANT_LOGS: &str = "No relevant logs were retrieved from the vector store.";

/// Logical fields read from heterogeneous match metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogField {
    Text,
    Timestamp,
    Service,
    Level,
}

/// Candidate metadata keys per logical field, tried in order
///
/// The first key present in a match's metadata wins, even when its value
/// is empty. Absent fields resolve to the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldAlternatives {
    pub text: Vec<String>,
    pub timestamp: Vec<String>,
    pub service: Vec<String>,
    pub level: Vec<String>,
}

impl Default for FieldAlternatives {
    fn default() -> Self {
        fn keys(names: &[&str]) -> Vec<String> {
            names.iter().map(|name| name.to_string()).collect()
        }

        Self {
            text: keys(&["text", "message"]),
            timestamp: keys(&["timestamp", "ts"]),
            service: keys(&["service", "svc"]),
            level: keys(&["level", "severity"]),
        }
    }
}

impl FieldAlternatives {
    /// Candidate keys for one logical field
    pub fn candidates(&self, field: LogField) -> &[String] {
        match field {
            LogField::Text => &self.text,
            LogField::Timestamp => &self.timestamp,
            LogField::Service => &self.service,
            LogField::Level => &self.level,
        }
    }

    /// Resolve a logical field on one match
    pub fn resolve<'a>(&self, field: LogField, entry: &'a Match) -> &'a str {
        self.candidates(field)
            .iter()
            .find_map(|key| entry.metadata.get(key))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Formatter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Maximum entries emitted, clamped to 10
    pub max_entries: usize,
    /// Maximum characters kept from each message
    pub max_message_chars: usize,
    /// Metadata key alternatives
    pub fields: FieldAlternatives,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_entries: MAX_MATCHES,
            max_message_chars: 200,
            fields: FieldAlternatives::default(),
        }
    }
}

/// Turns retrieval results into the context block given to the model
///
/// Pure: no I/O, no interior state, identical input gives identical output.
#[derive(Debug, Clone, Default)]
pub struct ContextFormatter {
    config: ContextConfig,
}

impl ContextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ContextConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Format matches in input order, one header line and one message line each
    pub fn format(&self, result: &RetrievalResult) -> String {
        if result.is_empty() {
            return NO_RELEVANT_LOGS.to_string();
        }

        let limit = self.config.max_entries.clamp(1, MAX_MATCHES);

        result
            .iter()
            .take(limit)
            .enumerate()
            .map(|(idx, entry)| self.format_entry(idx + 1, entry))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_entry(&self, index: usize, entry: &Match) -> String {
        let fields = &self.config.fields;
        let header = format!(
            "[{}] id={} score={:.3} service={} level={} ts={}",
            index,
            flatten(&entry.id),
            entry.score,
            flatten(fields.resolve(LogField::Service, entry)),
            flatten(fields.resolve(LogField::Level, entry)),
            flatten(fields.resolve(LogField::Timestamp, entry)),
        );
        let message = truncate_chars(
            &flatten(fields.resolve(LogField::Text, entry)),
            self.config.max_message_chars,
        );

        format!("{}\n    {}", header, message)
    }
}

/// Collapse every whitespace run (newlines included) into one space
fn flatten(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
