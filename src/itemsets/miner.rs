use std::collections::hash_map::Entry;

use anyhow::ensure;
use tracing::{debug, info, warn};

use crate::{
    config::MiningConfig,
    itemsets::{
        count::count_distribution,
        partition::partition,
        search::{generate_candidates_from_prev, initial_candidates},
    },
    pool::WorkerPool,
    types::{
        FrequentItemsets, ItemId, Itemset, ItemsetCounts, ItemsetLength, SupportCount,
        Transaction,
    },
    Result,
};

/// Output of a mining run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MinedItemsets {
    /// Frequent itemsets keyed by size. Levels without any are absent.
    pub frequent: FrequentItemsets,
    /// Support of every itemset that was ever counted as a candidate,
    /// frequent or not.
    pub counts: ItemsetCounts,
    pub num_transactions: usize,
}

impl MinedItemsets {
    /// Number of frequent itemsets over all levels.
    pub fn len(&self) -> usize {
        self.frequent.values().map(|level| level.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_level(&self) -> ItemsetLength {
        self.frequent.keys().copied().max().unwrap_or(0)
    }

    /// Support recorded for `itemset`, if it was ever a candidate.
    pub fn support(&self, itemset: &[ItemId]) -> Option<SupportCount> {
        self.counts.get(itemset).copied()
    }

    /// All frequent itemsets with their support, sorted by size then items.
    pub fn sorted(&self) -> Vec<(&Itemset, SupportCount)> {
        let mut all: Vec<_> = self
            .frequent
            .values()
            .flat_map(|level| level.iter().map(|(itemset, &count)| (itemset, count)))
            .collect();
        all.sort_unstable_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        all
    }
}

/// Run-scoped state handed from one level to the next.
struct MiningState {
    level: ItemsetLength,
    candidates: Vec<Itemset>,
    frequent: FrequentItemsets,
    counts: ItemsetCounts,
}

impl MiningState {
    fn new(candidates: Vec<Itemset>) -> Self {
        Self {
            level: 1,
            candidates,
            frequent: FrequentItemsets::new(),
            counts: ItemsetCounts::new(),
        }
    }

    /// Keep the level's frequent itemsets and file every count in the global map.
    fn prune(&mut self, count_distribution: ItemsetCounts, min_support: SupportCount) -> usize {
        let mut frequent = ItemsetCounts::with_capacity(count_distribution.len());

        for (itemset, support) in count_distribution {
            if support >= min_support {
                frequent.insert(itemset.clone(), support);
            }
            // Itemsets of different sizes never collide, so an entry is never replaced.
            if let Entry::Vacant(entry) = self.counts.entry(itemset) {
                entry.insert(support);
            }
        }

        let num_frequent = frequent.len();
        if num_frequent > 0 {
            self.frequent.insert(self.level, frequent);
        }
        num_frequent
    }

    /// Move to the next level. Returns false when no candidate survives.
    fn advance(&mut self) -> bool {
        let next = match self.frequent.get(&self.level) {
            Some(frequent) => generate_candidates_from_prev(frequent),
            None => Vec::new(),
        };
        if next.is_empty() {
            return false;
        }

        self.level += 1;
        self.candidates = next;
        true
    }

    fn finish(self, num_transactions: usize) -> MinedItemsets {
        MinedItemsets {
            frequent: self.frequent,
            counts: self.counts,
            num_transactions,
        }
    }
}

/// Level-wise frequent itemset search with count distribution.
///
/// The dataset is partitioned once; at every level each worker counts the
/// full candidate set against its own chunk and the tallies are merged before
/// the next level's candidates are generated.
#[derive(Debug, Clone)]
pub struct FrequentItemsetMiner {
    min_support: SupportCount,
    num_workers: usize,
    max_len: Option<ItemsetLength>,
}

impl FrequentItemsetMiner {
    pub fn new(min_support: SupportCount, num_workers: usize) -> Result<Self> {
        ensure!(
            min_support >= 1,
            "min_support must be at least 1, got {}",
            min_support
        );
        ensure!(
            num_workers >= 1,
            "num_workers must be at least 1, got {}",
            num_workers
        );
        Ok(Self {
            min_support,
            num_workers,
            max_len: None,
        })
    }

    pub fn from_config(config: &MiningConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.min_support, config.num_workers)?.with_max_len(config.max_len))
    }

    /// Stop after itemsets of this size.
    pub fn with_max_len(mut self, max_len: Option<ItemsetLength>) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn mine(&self, transactions: &[Transaction]) -> Result<MinedItemsets> {
        let num_transactions = transactions.len();
        let chunks = partition(transactions, self.num_workers);
        if chunks.is_empty() {
            warn!("empty dataset, nothing to mine");
            return Ok(MinedItemsets::default());
        }
        if chunks.len() < self.num_workers {
            warn!(
                requested = self.num_workers,
                used = chunks.len(),
                "more workers than transactions, clamping"
            );
        }

        let pool = WorkerPool::new(chunks.len())?;
        debug!(
            workers = pool.num_workers(),
            chunk_len = chunks[0].len(),
            last_chunk_len = chunks[chunks.len() - 1].len(),
            "dataset partitioned"
        );

        let mut state = MiningState::new(initial_candidates(transactions));

        loop {
            let level = state.level;
            let level_counts = count_distribution(&pool, &chunks, &state.candidates, level)?;
            let num_frequent = state.prune(level_counts, self.min_support);
            info!(
                level,
                candidates = state.candidates.len(),
                frequent = num_frequent,
                "level mined"
            );

            if self.max_len.map_or(false, |max_len| level >= max_len) {
                break;
            }
            if !state.advance() {
                break;
            }
        }

        let mined = state.finish(num_transactions);
        info!(
            frequent = mined.len(),
            levels = mined.max_level(),
            "frequent itemset mining done"
        );
        Ok(mined)
    }
}
