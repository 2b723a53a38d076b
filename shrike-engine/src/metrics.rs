// Engine metrics
//
// Lightweight counters for the inspection hot path. Counters use relaxed
// atomics; the verdict breakdown sits behind a lock because it is keyed.

use ahash::AHashMap;
use parking_lot::RwLock;
use shrike_pda::Verdict;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live metrics owned by the engine.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Payloads run through the signature scanner.
    payloads_scanned: AtomicU64,

    /// Total payload bytes scanned.
    bytes_scanned: AtomicU64,

    /// Pattern occurrences reported.
    matches_found: AtomicU64,

    /// Messages run through the HTTP validator.
    messages_validated: AtomicU64,

    /// Verdict breakdown for validated messages.
    verdicts: RwLock<AHashMap<Verdict, u64>>,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_scan(&self, payload_len: usize, matches: usize) {
        self.payloads_scanned.fetch_add(1, Ordering::Relaxed);
        self.bytes_scanned
            .fetch_add(payload_len as u64, Ordering::Relaxed);
        self.matches_found
            .fetch_add(matches as u64, Ordering::Relaxed);
    }

    pub fn record_validation(&self, verdict: Verdict) {
        self.messages_validated.fetch_add(1, Ordering::Relaxed);
        *self.verdicts.write().entry(verdict).or_insert(0) += 1;
    }

    /// Consistent point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let verdicts = self.verdicts.read();
        MetricsSnapshot {
            payloads_scanned: self.payloads_scanned.load(Ordering::Relaxed),
            bytes_scanned: self.bytes_scanned.load(Ordering::Relaxed),
            matches_found: self.matches_found.load(Ordering::Relaxed),
            messages_validated: self.messages_validated.load(Ordering::Relaxed),
            valid: verdicts.get(&Verdict::Valid).copied().unwrap_or(0),
            invalid: verdicts.get(&Verdict::Invalid).copied().unwrap_or(0),
            incomplete: verdicts.get(&Verdict::Incomplete).copied().unwrap_or(0),
        }
    }
}

/// Plain-value snapshot of [`EngineMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    pub payloads_scanned: u64,
    pub bytes_scanned: u64,
    pub matches_found: u64,
    pub messages_validated: u64,
    pub valid: u64,
    pub invalid: u64,
    pub incomplete: u64,
}
