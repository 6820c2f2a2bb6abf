// crates/upgrade-suite-core/src/runtime/audit.rs
// ============================================================================
// Module: Selection Audit Logging
// Description: Structured audit events emitted by the selection pipeline.
// Purpose: Record every selection decision as a JSON line.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The selection pipeline reports its progress through a
//! [`SelectionAuditSink`]. Events are flat JSON objects with an `event` label
//! and a millisecond timestamp so they can be routed to any line-oriented log
//! pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::identifiers::SuiteName;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Selection audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Requested suite name when known.
    pub suite: Option<SuiteName>,
    /// Target image when known.
    pub to_image: Option<String>,
    /// Option key for option events.
    pub option_key: Option<String>,
    /// Option value for option events.
    pub option_value: Option<String>,
    /// Number of raw options supplied.
    pub option_count: Option<usize>,
    /// Number of registry tests selected.
    pub selected_tests: Option<usize>,
    /// Number of registry tests inspected.
    pub registry_tests: Option<usize>,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Error message for failed selections.
    pub message: Option<String>,
}

impl SelectionAuditEvent {
    /// Creates an event with the given label and a consistent timestamp.
    fn labeled(event: &'static str) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            suite: None,
            to_image: None,
            option_key: None,
            option_value: None,
            option_count: None,
            selected_tests: None,
            registry_tests: None,
            error_kind: None,
            message: None,
        }
    }

    /// Empty transport; nothing was selected.
    #[must_use]
    pub fn skipped() -> Self {
        Self::labeled("selection_skipped")
    }

    /// Transport decoded; selection begins.
    #[must_use]
    pub fn started(suite: &SuiteName, to_image: &str, option_count: usize) -> Self {
        Self {
            suite: Some(suite.clone()),
            to_image: Some(to_image.to_string()),
            option_count: Some(option_count),
            ..Self::labeled("selection_started")
        }
    }

    /// An option was accepted by its setter.
    #[must_use]
    pub fn option_applied(suite: &SuiteName, key: &str, value: &str) -> Self {
        Self {
            suite: Some(suite.clone()),
            option_key: Some(key.to_string()),
            option_value: Some(value.to_string()),
            ..Self::labeled("option_applied")
        }
    }

    /// Selection finished and the configuration was committed.
    #[must_use]
    pub fn completed(
        suite: &SuiteName,
        to_image: &str,
        selected_tests: usize,
        registry_tests: usize,
    ) -> Self {
        Self {
            suite: Some(suite.clone()),
            to_image: Some(to_image.to_string()),
            selected_tests: Some(selected_tests),
            registry_tests: Some(registry_tests),
            ..Self::labeled("selection_completed")
        }
    }

    /// Selection failed at some step.
    #[must_use]
    pub fn failed(suite: Option<&SuiteName>, error_kind: &'static str, message: String) -> Self {
        Self {
            suite: suite.cloned(),
            error_kind: Some(error_kind),
            message: Some(message),
            ..Self::labeled("selection_failed")
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for selection events.
pub trait SelectionAuditSink {
    /// Record an audit event.
    fn record(&self, event: &SelectionAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl SelectionAuditSink for StderrAuditSink {
    fn record(&self, event: &SelectionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl SelectionAuditSink for FileAuditSink {
    fn record(&self, event: &SelectionAuditEvent) {
        let Ok(payload) = serde_json::to_string(event) else {
            return;
        };
        if let Ok(mut guard) = self.file.lock() {
            let _ = writeln!(guard, "{payload}");
        }
    }
}

/// Audit sink that keeps events in memory.
#[derive(Default)]
pub struct InMemoryAuditSink {
    /// Recorded events in emission order.
    events: Mutex<Vec<SelectionAuditEvent>>,
}

impl InMemoryAuditSink {
    /// Creates an empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<SelectionAuditEvent> {
        self.events.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl SelectionAuditSink for InMemoryAuditSink {
    fn record(&self, event: &SelectionAuditEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl SelectionAuditSink for NoopAuditSink {
    fn record(&self, _event: &SelectionAuditEvent) {}
}
