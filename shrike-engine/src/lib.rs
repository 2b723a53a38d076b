// Shrike Engine - payload inspection facade
//!
// This crate composes the two automaton engines behind one surface: the
// signature scanner (`shrike-automaton`) and the HTTP structural validator
// (`shrike-pda`). Callers hand the engine raw payload bytes and get back
// match lists, verdicts, and traces; transport, capture, and visualization
// all live outside.
//
// The compiled automaton is held behind an `Arc` and swapped atomically on
// signature reload, so scans already running against the previous
// signature set finish against a consistent automaton.

mod metrics;

pub use metrics::{EngineMetrics, MetricsSnapshot};

use serde::{Deserialize, Serialize};
use shrike_automaton::{Automaton, ScanReport, Scanner};
use shrike_pda::{HttpValidator, ValidationReport};
use shrike_signatures::SignatureSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Combined result of inspecting one payload: signature matches and the
/// HTTP structural verdict over the same bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionReport {
    pub scan: ScanReport,
    pub http: ValidationReport,
}

/// Payload inspection engine.
///
/// Built once from a [`SignatureSet`]; cheap to share. Scanning is
/// lock-free over the immutable automaton; each validation uses a fresh
/// validator instance, so `&self` methods are safe from any number of
/// threads.
pub struct InspectionEngine {
    automaton: Arc<Automaton>,
    metrics: Arc<EngineMetrics>,
}

impl InspectionEngine {
    /// Compile a signature set and create the engine.
    pub fn new(signatures: &SignatureSet) -> Self {
        let automaton = Arc::new(signatures.compile());
        info!(
            patterns = automaton.pattern_count(),
            nodes = automaton.node_count(),
            "Inspection engine ready"
        );

        Self {
            automaton,
            metrics: Arc::new(EngineMetrics::new()),
        }
    }

    /// Compile a new signature set and adopt it.
    ///
    /// The old automaton is not mutated; in-flight scans holding its `Arc`
    /// keep a consistent view and finish normally.
    pub fn reload(&mut self, signatures: &SignatureSet) {
        self.automaton = Arc::new(signatures.compile());
        info!(
            patterns = self.automaton.pattern_count(),
            nodes = self.automaton.node_count(),
            "Signature set reloaded"
        );
    }

    /// Shared handle to the current automaton, for export or for scans
    /// that must outlive a reload.
    pub fn automaton(&self) -> Arc<Automaton> {
        Arc::clone(&self.automaton)
    }

    /// Scan a payload for signature occurrences.
    pub fn scan(&self, payload: &[u8]) -> ScanReport {
        let report = Scanner::new(&self.automaton).scan(payload);
        self.metrics.record_scan(payload.len(), report.matches.len());
        debug!(
            bytes = payload.len(),
            matches = report.matches.len(),
            "Payload scanned"
        );
        report
    }

    /// Whether a payload contains any signature occurrence, short-circuiting
    /// at the first hit.
    pub fn has_match(&self, payload: &[u8]) -> bool {
        Scanner::new(&self.automaton).has_match(payload)
    }

    /// Validate a payload as an HTTP message.
    pub fn validate_http(&self, message: &[u8]) -> ValidationReport {
        let report = HttpValidator::new().validate(message);
        self.metrics.record_validation(report.verdict);
        debug!(verdict = ?report.verdict, "Message validated");
        report
    }

    /// Run both engines over one payload.
    pub fn inspect(&self, payload: &[u8]) -> InspectionReport {
        InspectionReport {
            scan: self.scan(payload),
            http: self.validate_http(payload),
        }
    }

    /// Point-in-time metrics.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shrike_pda::Verdict;

    fn engine() -> InspectionEngine {
        let mut signatures = SignatureSet::new();
        signatures.add("sql_injection", "UNION SELECT");
        signatures.add("sql_injection", "DROP TABLE");
        InspectionEngine::new(&signatures)
    }

    #[test]
    fn test_scan_counts_metrics() {
        let engine = engine();
        engine.scan(b"id=1 UNION SELECT * FROM t");
        engine.scan(b"clean");

        let metrics = engine.metrics();
        assert_eq!(metrics.payloads_scanned, 2);
        assert_eq!(metrics.matches_found, 1);
    }

    #[test]
    fn test_validate_counts_verdicts() {
        let engine = engine();
        engine.validate_http(b"GET / HTTP/1.1\r\n\r\n");
        engine.validate_http(b"junk");

        let metrics = engine.metrics();
        assert_eq!(metrics.messages_validated, 2);
        assert_eq!(metrics.valid, 1);
        assert_eq!(metrics.invalid, 1);
    }

    #[test]
    fn test_reload_swaps_automaton() {
        let mut engine = engine();
        assert!(engine.has_match(b"UNION SELECT"));

        let old = engine.automaton();

        let mut replacement = SignatureSet::new();
        replacement.add("xss", "<script>");
        engine.reload(&replacement);

        assert!(!engine.has_match(b"UNION SELECT"));
        assert!(engine.has_match(b"<script>alert(1)</script>"));

        // The old automaton is untouched and still scans correctly.
        assert!(Scanner::new(&old).has_match(b"UNION SELECT"));
    }

    #[test]
    fn test_inspect_combines_both_engines() {
        let engine = engine();
        let report =
            engine.inspect(b"GET /?q=UNION%20SELECT HTTP/1.1\r\nHost: a\r\n\r\n");

        assert_eq!(report.http.verdict, Verdict::Valid);
        assert!(report.scan.matches.is_empty()); // percent-encoded, no literal match
    }
}
