// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Audit records for remote calls.
//!
//! One record per remote call attempt, written before the envelope returns.
//! Sinks are fire-and-forget: a failing sink never fails the operation.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

/// A single audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    /// Panel-level operation name, e.g. `provision`.
    pub operation: String,
    /// Method, URL and form fields of the request.
    pub request: Value,
    /// Outcome summary including the HTTP code when one was received.
    pub response: String,
}

impl AuditEvent {
    pub fn new(operation: impl Into<String>, request: Value, response: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: operation.into(),
            request,
            response: response.into(),
        }
    }
}

/// Receives audit records.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) {}
}

/// Emits each record as a structured tracing event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        info!(
            target: "lxc_bridge::audit",
            operation = %event.operation,
            request = %event.request,
            response = %event.response,
            "remote call"
        );
    }
}

/// Appends each record as one JSON line to a file.
pub struct JsonLinesAuditSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLinesAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, event: &AuditEvent) -> std::io::Result<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}

impl AuditSink for JsonLinesAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Err(e) = self.append(event) {
            warn!(path = %self.path.display(), error = %e, "Failed to write audit record");
        }
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemoryAuditSink::new();
        sink.record(&AuditEvent::new("suspend", json!({}), "HTTP 200: success"));
        sink.record(&AuditEvent::new("resume", json!({}), "HTTP 200: success"));

        let ops: Vec<_> = sink.events().into_iter().map(|e| e.operation).collect();
        assert_eq!(ops, vec!["suspend", "resume"]);
    }

    #[test]
    fn test_jsonl_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let sink = JsonLinesAuditSink::new(&path);

        sink.record(&AuditEvent::new("provision", json!({"name": "whmcs-1"}), "HTTP 200: success"));
        sink.record(&AuditEvent::new("terminate", json!({}), "transport error: refused"));

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: AuditEvent = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.operation, "provision");
        assert_eq!(first.request["name"], "whmcs-1");
    }

    #[test]
    fn test_jsonl_sink_swallows_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let sink = JsonLinesAuditSink::new(dir.path());
        sink.record(&AuditEvent::new("reboot", json!({}), "HTTP 200: success"));
    }
}
