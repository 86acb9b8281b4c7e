//! Request history: one entry per completed execution, newest first.

use crate::client::{ApiCall, ApiCallResult};
use crate::executor::ExecutionRequest;
use crate::types::{HttpMethod, ServiceKey};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Maximum number of retained history entries
pub const HISTORY_CAPACITY: usize = 100;

/// Suffix appended to the label of a replayed request
pub const REPLAY_SUFFIX: &str = " (replay)";

/// A recorded execution: the request as issued plus its outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    /// Local wall-clock time, `HH:MM:SS`
    pub at: String,
    pub label: String,
    pub service: ServiceKey,
    pub method: HttpMethod,
    pub path: String,
    /// Absent for bodiless calls; a JSON `null` body stays `Some(Null)`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_body"
    )]
    pub body: Option<Value>,
    pub ok: bool,
    pub status: u16,
    pub duration_ms: u64,
}

/// A `body` key that is present is always a body, even when it is `null`
fn present_body<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl HistoryEntry {
    /// Build the entry for a finished request
    pub fn record(label: &str, call: &ApiCall, result: &ApiCallResult) -> Self {
        Self {
            id: format!("{}-{}", crate::unix_millis(), rand::random::<u32>()),
            at: chrono::Local::now().format("%H:%M:%S").to_string(),
            label: label.to_string(),
            service: call.service,
            method: call.method,
            path: call.path.clone(),
            body: call.body.clone(),
            ok: result.ok,
            status: result.status,
            duration_ms: result.duration_ms,
        }
    }

    /// The call this entry recorded
    pub fn call(&self) -> ApiCall {
        ApiCall {
            service: self.service,
            method: self.method,
            path: self.path.clone(),
            body: self.body.clone(),
        }
    }

    /// Request that re-issues this entry verbatim under a replay label
    pub fn replay_request(&self) -> ExecutionRequest {
        ExecutionRequest::new(format!("{}{}", self.label, REPLAY_SUFFIX), self.call())
    }

    /// One-line summary used by the history views
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} ({}) HTTP {} {}ms",
            self.at, self.method, self.path, self.service, self.status, self.duration_ms
        )
    }
}

/// Bounded, newest-first list of history entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    /// Build from a persisted list, dropping anything past capacity
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_CAPACITY);
        Self { entries }
    }

    /// Prepend an entry, evicting the oldest beyond capacity
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    /// Look up by entry id or by 1-based position (1 = newest)
    pub fn find(&self, reference: &str) -> Option<&HistoryEntry> {
        if let Some(entry) = self.entries.iter().find(|e| e.id == reference) {
            return Some(entry);
        }
        reference
            .parse::<usize>()
            .ok()
            .and_then(|pos| pos.checked_sub(1))
            .and_then(|index| self.entries.get(index))
    }
}
