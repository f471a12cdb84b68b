use std::collections::BTreeSet;

use crate::{
    combi::join_step,
    dataset::items_of,
    types::{ItemId, Itemset, ItemsetCounts, Transaction},
};

/// Level-1 candidates: every item seen in the dataset, as a singleton.
pub fn initial_candidates(transactions: &[Transaction]) -> Vec<Itemset> {
    transactions
        .iter()
        .flat_map(items_of)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|item| vec![item])
        .collect()
}

/// Level-k candidates from the frequent (k-1)-itemsets.
///
/// Joins itemsets sharing their first k-2 items, then drops any candidate with
/// a (k-1)-subset that is not frequent. The join never repeats a candidate.
pub fn generate_candidates_from_prev(prev_frequent: &ItemsetCounts) -> Vec<Itemset> {
    join_step(prev_frequent.keys().cloned().collect())
        .into_iter()
        .filter(|candidate| !has_infrequent_subset(candidate, prev_frequent))
        .collect()
}

/// Whether some subset of `candidate` one item smaller is missing from `frequent`.
pub fn has_infrequent_subset(candidate: &[ItemId], frequent: &ItemsetCounts) -> bool {
    let mut subset = Vec::with_capacity(candidate.len().saturating_sub(1));

    (0..candidate.len()).any(|skip| {
        subset.clear();
        subset.extend(
            candidate
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != skip)
                .map(|(_, &item)| item),
        );
        !frequent.contains_key(subset.as_slice())
    })
}
