//! Append-only, thread-safe verdict log with aggregate counters for one run.
//! Readers get snapshots; the lock is only ever held to append or copy.

use crate::core::models::{Disposition, RunStats, Verdict};
use parking_lot::Mutex;
use std::sync::Arc;

/// Write hook for an external cache/history collaborator. Invoked once per
/// completed verdict; the engine never reads back from the store.
pub trait VerdictStore: Send + Sync {
    fn persist(&self, verdict: &Verdict);
}

pub struct ResultSink {
    log: Mutex<Vec<Verdict>>,
    stats: Mutex<RunStats>,
    store: Option<Arc<dyn VerdictStore>>,
}

impl ResultSink {
    pub fn new(total: u64, store: Option<Arc<dyn VerdictStore>>) -> Self {
        Self {
            log: Mutex::new(Vec::with_capacity(total as usize)),
            stats: Mutex::new(RunStats {
                total,
                ..RunStats::default()
            }),
            store,
        }
    }

    /// Appends a verdict in completion order, assigning its sequence
    /// position, and returns the stored verdict with a stats snapshot.
    pub fn append(&self, mut verdict: Verdict) -> (Verdict, RunStats) {
        {
            let mut log = self.log.lock();
            verdict.completed_at = log.len() as u64;
            log.push(verdict.clone());
        }

        let snapshot = {
            let mut stats = self.stats.lock();
            stats.completed += 1;
            match verdict.disposition {
                Disposition::Valid => stats.valid += 1,
                Disposition::Risky => stats.risky += 1,
                Disposition::Invalid => stats.invalid += 1,
            }
            *stats
        };

        // Persist outside the critical sections.
        if let Some(store) = &self.store {
            store.persist(&verdict);
        }

        (verdict, snapshot)
    }

    pub fn snapshot(&self) -> RunStats {
        *self.stats.lock()
    }

    pub fn verdicts(&self) -> Vec<Verdict> {
        self.log.lock().clone()
    }
}
