use itertools::Itertools;

use crate::types::{ItemId, Itemset};

/// Join step of candidate generation.
///
/// For every pair `(i, j)`, `i < j`, of the sorted `itemsets` that agree on all
/// but their last item, emit the union of the two. Inputs must all share one
/// length and be sorted internally; the output itemsets are sorted too.
pub fn join_step(mut itemsets: Vec<Itemset>) -> Vec<Itemset> {
    itemsets.sort_unstable();
    itemsets.dedup();

    let mut joined = Vec::new();

    for (i, itemset) in itemsets.iter().enumerate() {
        let Some((_, prefix)) = itemset.split_last() else {
            continue;
        };

        for other in &itemsets[i + 1..] {
            let Some((&other_last, other_prefix)) = other.split_last() else {
                continue;
            };
            // Sorted input keeps itemsets with the same prefix contiguous.
            if prefix != other_prefix {
                break;
            }

            let mut candidate = itemset.clone();
            candidate.push(other_last);
            joined.push(candidate);
        }
    }

    joined
}

/// Every `size`-item subset of a sorted itemset, in lexicographic order.
pub fn subsets(itemset: &[ItemId], size: usize) -> impl Iterator<Item = Itemset> + '_ {
    itemset.iter().copied().combinations(size)
}

/// Items of `itemset` that are not in `subset`. Both must be sorted.
pub fn difference(itemset: &[ItemId], subset: &[ItemId]) -> Itemset {
    let mut rest = Vec::with_capacity(itemset.len().saturating_sub(subset.len()));
    let mut subset = subset.iter().peekable();

    for &item in itemset {
        while subset.next_if(|&&other| other < item).is_some() {}
        if subset.next_if_eq(&&item).is_none() {
            rest.push(item);
        }
    }

    rest
}
