//! Metrics registry for kvsql
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Planning and execution counters
///
/// All counters use Relaxed atomics; values are exact once the
/// incrementing threads have been joined.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    plans_built: AtomicU64,
    plans_rejected: AtomicU64,
    /// Plans with an explicit sort over the scan
    sorts_required: AtomicU64,
    /// Plans with an ORDER BY satisfied by index order
    sorts_elided: AtomicU64,
    reverse_scans: AtomicU64,
    index_lookups_planned: AtomicU64,
    queries_executed: AtomicU64,
    rows_returned: AtomicU64,
    privilege_denials: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    // Planning

    pub fn increment_plans_built(&self) {
        self.plans_built.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_plans_rejected(&self) {
        self.plans_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_sorts_required(&self) {
        self.sorts_required.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_sorts_elided(&self) {
        self.sorts_elided.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_reverse_scans(&self) {
        self.reverse_scans.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_index_lookups(&self) {
        self.index_lookups_planned.fetch_add(1, Ordering::Relaxed);
    }

    // Execution

    /// Records one successful query and the rows it returned
    pub fn record_query(&self, rows: u64) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
        self.rows_returned.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn increment_privilege_denials(&self) {
        self.privilege_denials.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            plans_built: self.plans_built.load(Ordering::Relaxed),
            plans_rejected: self.plans_rejected.load(Ordering::Relaxed),
            sorts_required: self.sorts_required.load(Ordering::Relaxed),
            sorts_elided: self.sorts_elided.load(Ordering::Relaxed),
            reverse_scans: self.reverse_scans.load(Ordering::Relaxed),
            index_lookups_planned: self.index_lookups_planned.load(Ordering::Relaxed),
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            rows_returned: self.rows_returned.load(Ordering::Relaxed),
            privilege_denials: self.privilege_denials.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub plans_built: u64,
    pub plans_rejected: u64,
    pub sorts_required: u64,
    pub sorts_elided: u64,
    pub reverse_scans: u64,
    pub index_lookups_planned: u64,
    pub queries_executed: u64,
    pub rows_returned: u64,
    pub privilege_denials: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let registry = MetricsRegistry::new();
        assert_eq!(registry.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_plans_built();
        registry.increment_plans_built();
        registry.increment_plans_rejected();
        registry.increment_sorts_required();
        registry.increment_sorts_elided();
        registry.increment_reverse_scans();
        registry.increment_index_lookups();
        registry.increment_privilege_denials();
        registry.record_query(3);
        registry.record_query(0);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.plans_built, 2);
        assert_eq!(snapshot.plans_rejected, 1);
        assert_eq!(snapshot.sorts_required, 1);
        assert_eq!(snapshot.sorts_elided, 1);
        assert_eq!(snapshot.reverse_scans, 1);
        assert_eq!(snapshot.index_lookups_planned, 1);
        assert_eq!(snapshot.privilege_denials, 1);
        assert_eq!(snapshot.queries_executed, 2);
        assert_eq!(snapshot.rows_returned, 3);
    }

    #[test]
    fn test_snapshot_serializes() {
        let registry = MetricsRegistry::new();
        registry.record_query(7);

        let parsed = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(parsed["queries_executed"], 1);
        assert_eq!(parsed["rows_returned"], 7);
        assert_eq!(parsed["sorts_elided"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_plans_built();
                    reg.record_query(2);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.plans_built, 1000);
        assert_eq!(snapshot.rows_returned, 2000);
    }
}
