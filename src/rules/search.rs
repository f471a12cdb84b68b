use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use anyhow::{anyhow, ensure};
use tracing::{debug, info};

use crate::{
    combi::{difference, subsets},
    itemsets::{partition::partition, MinedItemsets},
    pool::WorkerPool,
    rules::rule::Rule,
    types::{ItemId, Itemset, ItemsetCounts, ItemsetLength, SupportCount},
    Result,
};

type WorkItem<'a> = (&'a Itemset, SupportCount);

/// Derive every rule reaching `min_confidence` from the mined itemsets.
///
/// Itemsets are grouped by size and each group is spread evenly over the
/// workers. Rule order depends on which worker finishes first; the set of
/// rules does not.
pub fn generate_rules(
    mined: &MinedItemsets,
    min_confidence: f64,
    num_workers: usize,
) -> Result<Vec<Rule>> {
    ensure!(
        (0.0..=1.0).contains(&min_confidence),
        "min_confidence must be in range [0,1], got {}",
        min_confidence
    );
    ensure!(
        num_workers >= 1,
        "num_workers must be at least 1, got {}",
        num_workers
    );

    let work = assign_work(mined, num_workers);
    if work.is_empty() {
        info!("no frequent itemset with two or more items, no rules");
        return Ok(Vec::new());
    }

    let pool = WorkerPool::new(work.len())?;
    let rules = Mutex::new(Vec::new());
    let num_transactions = mined.num_transactions;

    pool.round("rule generation", &work, |worker_id, itemsets| {
        let local_rules: Vec<Rule> = itemsets
            .iter()
            .flat_map(|&(itemset, support)| {
                rules_from_itemset(
                    itemset,
                    support,
                    &mined.counts,
                    min_confidence,
                    num_transactions,
                )
            })
            .collect();
        debug!(
            worker_id,
            itemsets = itemsets.len(),
            rules = local_rules.len(),
            "itemsets split into rules"
        );

        rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(local_rules);
    })?;

    let rules = rules
        .into_inner()
        .map_err(|_| anyhow!("rule collection poisoned by a failed worker"))?;
    info!(rules = rules.len(), "rule generation done");
    Ok(rules)
}

/// Per-worker lists of itemsets with at least two items.
///
/// Each size group is cut into contiguous, near-equal chunks and chunk `j` of
/// every group goes to worker `j`, so each worker sees a share of the large
/// itemsets. Workers left without work are dropped.
fn assign_work(mined: &MinedItemsets, num_workers: usize) -> Vec<Vec<WorkItem<'_>>> {
    let groups: BTreeMap<ItemsetLength, Vec<WorkItem<'_>>> = mined
        .frequent
        .iter()
        .filter(|&(&size, _)| size >= 2)
        .map(|(&size, level)| {
            let mut group: Vec<WorkItem<'_>> = level
                .iter()
                .map(|(itemset, &support)| (itemset, support))
                .collect();
            group.sort_unstable();
            (size, group)
        })
        .collect();

    // No group can keep more workers busy than it has itemsets.
    let largest_group = groups.values().map(Vec::len).max().unwrap_or(0);
    let num_workers = num_workers.min(largest_group);

    let mut work: Vec<Vec<WorkItem<'_>>> = vec![Vec::new(); num_workers];
    for group in groups.values() {
        for (worker, chunk) in work.iter_mut().zip(partition(group, num_workers)) {
            worker.extend_from_slice(chunk);
        }
    }

    work.retain(|itemsets| !itemsets.is_empty());
    work
}

/// Rules from one itemset, longest antecedents first.
///
/// Once a whole antecedent length yields nothing, shorter antecedents are not
/// tried. Every shorter antecedent is a subset of a longer one and so has at
/// least its support, which keeps its confidence at or below theirs.
pub fn rules_from_itemset(
    itemset: &[ItemId],
    support: SupportCount,
    counts: &ItemsetCounts,
    min_confidence: f64,
    num_transactions: usize,
) -> Vec<Rule> {
    let mut rules = Vec::new();

    for antecedent_len in (1..itemset.len()).rev() {
        let found_before = rules.len();

        for antecedent in subsets(itemset, antecedent_len) {
            let confidence = support as f64 / known_support(counts, &antecedent) as f64;
            if confidence < min_confidence {
                continue;
            }

            let consequent = difference(itemset, &antecedent);
            let consequent_frequency =
                known_support(counts, &consequent) as f64 / num_transactions as f64;
            rules.push(Rule {
                antecedent,
                consequent,
                confidence,
                lift: confidence / consequent_frequency,
                support,
            });
        }

        if rules.len() == found_before {
            break;
        }
    }

    rules
}

/// Support of a subset of a frequent itemset.
///
/// Every such subset was counted as a candidate at its level, so a missing or
/// zero entry means counting and rule generation disagree.
fn known_support(counts: &ItemsetCounts, itemset: &[ItemId]) -> SupportCount {
    match counts.get(itemset) {
        Some(&support) if support > 0 => support,
        _ => panic!(
            "support of {:?} missing from the count map; itemset counts are inconsistent",
            itemset
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dataset::{itemize, reverse_lookup, DatasetKind},
        itemsets::FrequentItemsetMiner,
        types::FrequentItemsets,
    };
    use maplit::hashmap;

    fn mined(frequent: FrequentItemsets, num_transactions: usize) -> MinedItemsets {
        let counts = frequent
            .values()
            .flat_map(|level| level.iter().map(|(itemset, &count)| (itemset.clone(), count)))
            .collect();
        MinedItemsets {
            frequent,
            counts,
            num_transactions,
        }
    }

    fn counter() -> FrequentItemsets {
        hashmap! {
            1 => hashmap! {
                vec![1] => 9,
                vec![2] => 8,
                vec![3] => 12,
                vec![4] => 13,
            },
            2 => hashmap! {
                vec![1, 2] => 4,
                vec![1, 3] => 5,
                vec![1, 4] => 6,
                vec![2, 3] => 3,
                vec![2, 4] => 5,
                vec![3, 4] => 3,
            },
            3 => hashmap! {
                vec![1, 2, 3] => 3,
                vec![1, 2, 4] => 3,
                vec![1, 3, 4] => 3,
                vec![2, 3, 4] => 3,
            },
            4 => hashmap! {
                vec![1, 2, 3, 4] => 2,
            },
        }
    }

    fn sorted(mut rules: Vec<Rule>) -> Vec<Rule> {
        rules.sort_by(|a, b| a.cmp_items(b));
        rules
    }

    /// Every split of every itemset, no early stop.
    fn brute_force(mined: &MinedItemsets, min_confidence: f64) -> Vec<(Itemset, Itemset)> {
        let mut found = Vec::new();
        for level in mined.frequent.values() {
            for (itemset, &support) in level {
                for len in 1..itemset.len() {
                    for antecedent in subsets(itemset, len) {
                        let confidence = support as f64 / mined.counts[&antecedent] as f64;
                        if confidence >= min_confidence {
                            let consequent = difference(itemset, &antecedent);
                            found.push((antecedent, consequent));
                        }
                    }
                }
            }
        }
        found.sort();
        found
    }

    #[test]
    fn rules_from_single_itemset() {
        let mined = mined(counter(), 20);
        let rules = sorted(rules_from_itemset(&[1, 2, 3], 3, &mined.counts, 0.7, 20));

        // {1,2} => {3} at 3/4 and {2,3} => {1} at 3/3; no single item reaches 0.7.
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].antecedent, vec![1, 2]);
        assert_eq!(rules[0].consequent, vec![3]);
        assert!((rules[0].confidence - 0.75).abs() < 1e-12);
        assert_eq!(rules[1].antecedent, vec![2, 3]);
        assert_eq!(rules[1].consequent, vec![1]);
        assert!((rules[1].confidence - 1.0).abs() < 1e-12);
        assert!((rules[1].lift - 20.0 / 9.0).abs() < 1e-12);
        assert_eq!(rules[1].support, 3);
    }

    #[test]
    fn early_stop_matches_brute_force() {
        let mined = mined(counter(), 20);
        for min_confidence in [0.0, 0.2, 0.4, 0.6, 0.8, 1.0] {
            let rules = generate_rules(&mined, min_confidence, 3).unwrap();
            let mut found: Vec<_> = rules
                .into_iter()
                .map(|rule| (rule.antecedent, rule.consequent))
                .collect();
            found.sort();
            assert_eq!(found, brute_force(&mined, min_confidence));
        }
    }

    #[test]
    fn rule_set_does_not_depend_on_worker_count() {
        let mined = mined(counter(), 20);
        let baseline = sorted(generate_rules(&mined, 0.5, 1).unwrap());
        for num_workers in 2..=6 {
            let rules = sorted(generate_rules(&mined, 0.5, num_workers).unwrap());
            assert_eq!(rules, baseline, "num_workers = {}", num_workers);
        }
    }

    #[test]
    fn rules_are_valid_splits() {
        let mined = mined(counter(), 20);
        for rule in generate_rules(&mined, 0.3, 4).unwrap() {
            let itemset = rule.itemset();
            let support = mined.frequent[&itemset.len()][&itemset];
            assert!(rule.antecedent.iter().all(|item| !rule.consequent.contains(item)));
            let expected = support as f64 / mined.counts[&rule.antecedent] as f64;
            assert!((rule.confidence - expected).abs() < 1e-12);
            assert!(rule.confidence >= 0.3);
        }
    }

    #[test]
    fn dummy_dataset_rules() {
        let (transactions, inventory) = itemize(&DatasetKind::Dummy.load());
        let lookup = reverse_lookup(&inventory);
        let mined = FrequentItemsetMiner::new(2, 1)
            .unwrap()
            .mine(&transactions)
            .unwrap();

        let rules = generate_rules(&mined, 0.7, 2).unwrap();
        let has_rule = |antecedent: &[&str], consequent: &[&str]| {
            let antecedent: Itemset = antecedent.iter().map(|&name| lookup[name]).collect();
            let consequent: Itemset = consequent.iter().map(|&name| lookup[name]).collect();
            rules
                .iter()
                .any(|rule| rule.antecedent == antecedent && rule.consequent == consequent)
        };

        assert!(has_rule(&["1", "5"], &["3"]));
        assert!(!has_rule(&["1", "3"], &["5"]));
    }

    #[test]
    fn no_rules_without_multi_item_itemsets() {
        let mined = mined(hashmap! { 1 => hashmap! { vec![0] => 3 } }, 3);
        assert!(generate_rules(&mined, 0.5, 2).unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_parameters() {
        let mined = mined(counter(), 20);
        assert!(generate_rules(&mined, 1.5, 1).is_err());
        assert!(generate_rules(&mined, 0.5, 0).is_err());
    }

    #[test]
    fn missing_antecedent_fails_the_round() {
        let mut mined = mined(counter(), 20);
        mined.counts.remove(&vec![2, 3, 4]);

        let err = generate_rules(&mined, 0.0, 2).unwrap_err();
        assert!(err.to_string().contains("rule generation"));
    }

    #[test]
    fn huge_worker_count_is_clamped() {
        let mined = mined(counter(), 20);
        let work = assign_work(&mined, usize::MAX);
        // The largest size group has 6 itemsets.
        assert_eq!(work.len(), 6);

        let baseline = sorted(generate_rules(&mined, 0.5, 1).unwrap());
        let rules = sorted(generate_rules(&mined, 0.5, usize::MAX).unwrap());
        assert_eq!(rules, baseline);
    }

    #[test]
    fn work_is_spread_per_size_group() {
        let mined = mined(counter(), 20);
        let work = assign_work(&mined, 2);

        let sizes: Vec<Vec<usize>> = work
            .iter()
            .map(|worker| worker.iter().map(|(itemset, _)| itemset.len()).collect())
            .collect();
        // 6 pairs and 4 triples split evenly; the lone 4-itemset goes to the first worker.
        assert_eq!(sizes, vec![vec![2, 2, 2, 3, 3, 4], vec![2, 2, 2, 3, 3]]);
    }
}
