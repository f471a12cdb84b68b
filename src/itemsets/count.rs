use std::sync::{Mutex, PoisonError};

use anyhow::anyhow;
use tracing::debug;

use crate::{
    pool::WorkerPool,
    types::{ItemId, Itemset, ItemsetCounts, ItemsetLength, SupportCount, Transaction},
    Result,
};

/// Whether every item of `candidate` is present in `transaction`.
#[inline]
pub fn contains_all(transaction: &Transaction, candidate: &[ItemId]) -> bool {
    candidate
        .iter()
        .all(|&item| transaction.get(item).map_or(false, |bit| *bit))
}

/// Tally support for every candidate against one chunk.
///
/// Slot `i` of the result is the support of `candidates[i]` within the chunk.
pub fn count_local(chunk: &[Transaction], candidates: &[Itemset]) -> Vec<SupportCount> {
    let mut local_support = vec![0; candidates.len()];

    for transaction in chunk {
        for (slot, candidate) in local_support.iter_mut().zip(candidates) {
            if contains_all(transaction, candidate) {
                *slot += 1;
            }
        }
    }

    local_support
}

/// Shared per-level tally that workers merge into under a single lock.
pub struct CountAccumulator {
    counts: Mutex<Vec<SupportCount>>,
}

impl CountAccumulator {
    pub fn new(num_candidates: usize) -> Self {
        Self {
            counts: Mutex::new(vec![0; num_candidates]),
        }
    }

    /// Add one worker's whole tally; the lock is taken once per call.
    pub fn merge(&self, local_support: &[SupportCount]) {
        // Poisoning only follows a failed worker, and a failed round is discarded.
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        for (count, local) in counts.iter_mut().zip(local_support) {
            *count += local;
        }
    }

    /// Pair every candidate with its merged count, zero counts included.
    pub fn into_count_distribution(self, candidates: &[Itemset]) -> Result<ItemsetCounts> {
        let counts = self
            .counts
            .into_inner()
            .map_err(|_| anyhow!("count accumulator poisoned by a failed worker"))?;

        Ok(candidates.iter().cloned().zip(counts).collect())
    }
}

/// One counting round: every worker tallies its chunk, then the tallies are
/// merged into the level's count distribution.
pub fn count_distribution(
    pool: &WorkerPool,
    chunks: &[&[Transaction]],
    candidates: &[Itemset],
    level: ItemsetLength,
) -> Result<ItemsetCounts> {
    let accumulator = CountAccumulator::new(candidates.len());

    pool.round(&format!("level {} counting", level), chunks, |worker_id, chunk| {
        let local_support = count_local(chunk, candidates);
        debug!(worker_id, level, transactions = chunk.len(), "chunk counted");
        accumulator.merge(&local_support);
    })?;

    accumulator.into_count_distribution(candidates)
}
