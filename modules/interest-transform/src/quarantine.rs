// Quarantine: trait boundary + naming conventions.
//
// The transformer hands malformed or unmappable records to a QuarantineSink
// without knowing where they end up. The migration job wires in a
// filesystem-backed sink; tests use MemoryQuarantineSink.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::encode::{encode, EncodeOptions};

/// `failureKind` recorded for failures caught at the dispatcher boundary.
pub const EXCEPTION_FAILURE_KIND: &str = "TransformationException";

/// Write-once, best-effort destination for quarantine entries.
///
/// `name` is unique per event. Implementations must tolerate concurrent,
/// unordered calls and must not block on durable completion; write failures
/// stay inside the sink.
pub trait QuarantineSink: Send + Sync {
    fn put(&self, name: &str, content: Vec<u8>);
}

impl<S: QuarantineSink + ?Sized> QuarantineSink for Arc<S> {
    fn put(&self, name: &str, content: Vec<u8>) {
        (**self).put(name, content)
    }
}

/// Business-rule reasons for quarantining an item or a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuarantineReason {
    /// A weather item lacks latitude or longitude. Only that item is dropped.
    WeatherNoLatOrLon,
    /// A trending-topic item lacks a news category. The whole record is dropped.
    TrendingOnBingNoNewsCategory,
}

impl QuarantineReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuarantineReason::WeatherNoLatOrLon => "WeatherNoLatOrLon",
            QuarantineReason::TrendingOnBingNoNewsCategory => "TrendingOnBingNoNewsCategory",
        }
    }
}

impl std::fmt::Display for QuarantineReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The document written to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarantineEntry {
    pub failed_record_raw: String,
    pub owner_id: String,
    pub failure_kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

/// `Exception_{code}_{ownerId}_{unique}`
pub fn exception_entry_name(code: &str, owner_id: &str) -> String {
    format!("Exception_{code}_{owner_id}_{}", Uuid::new_v4())
}

/// `TransformationFailure_{reasonTag}_{ownerId}_{unique}`
pub fn failure_entry_name(reason: QuarantineReason, owner_id: &str) -> String {
    format!("TransformationFailure_{reason}_{owner_id}_{}", Uuid::new_v4())
}

/// Encode `entry` and hand it to the sink. Encoding failures are logged and
/// dropped; nothing is surfaced to the caller.
pub(crate) fn submit<S: QuarantineSink + ?Sized>(sink: &S, name: &str, entry: &QuarantineEntry) {
    match encode(entry, &EncodeOptions::default()) {
        Ok(bytes) => sink.put(name, bytes),
        Err(e) => tracing::error!(
            entry_name = name,
            owner_id = entry.owner_id.as_str(),
            error = %e,
            "Failed to encode quarantine entry"
        ),
    }
}

// ---------------------------------------------------------------------------
// NoopQuarantineSink
// ---------------------------------------------------------------------------

/// Discards everything.
pub struct NoopQuarantineSink;

impl QuarantineSink for NoopQuarantineSink {
    fn put(&self, _name: &str, _content: Vec<u8>) {}
}

// ---------------------------------------------------------------------------
// MemoryQuarantineSink (tests)
// ---------------------------------------------------------------------------

/// One recorded `put`.
#[derive(Debug, Clone)]
pub struct StoredQuarantine {
    pub name: String,
    pub content: Vec<u8>,
}

impl StoredQuarantine {
    /// Decode the stored bytes back into an entry.
    pub fn entry(&self) -> Option<QuarantineEntry> {
        serde_json::from_slice(&self.content).ok()
    }
}

/// Records `put()` calls for test assertions. Thread-safe.
#[derive(Default)]
pub struct MemoryQuarantineSink {
    puts: Mutex<Vec<StoredQuarantine>>,
}

impl MemoryQuarantineSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn puts(&self) -> Vec<StoredQuarantine> {
        self.puts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.puts().into_iter().map(|p| p.name).collect()
    }

    pub fn len(&self) -> usize {
        self.puts.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QuarantineSink for MemoryQuarantineSink {
    fn put(&self, name: &str, content: Vec<u8>) {
        self.puts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(StoredQuarantine {
                name: name.to_string(),
                content,
            });
    }
}
