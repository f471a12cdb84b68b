//! Parallel Apriori with count distribution.
//!
//! The dataset is partitioned once over a fixed pool of workers. At each level
//! every worker counts the shared candidate set against its own partition,
//! the tallies are merged, and the frequent itemsets seed the next level's
//! candidates. Association rules are then derived in a second parallel pass.
//!
//! ```
//! use parallel_apriori::{apriori, MiningConfig};
//!
//! let transactions = vec![
//!     vec!["bread", "milk"],
//!     vec!["bread", "butter"],
//!     vec!["bread", "milk", "butter"],
//! ];
//! let config = MiningConfig {
//!     min_support: 2,
//!     min_confidence: 0.6,
//!     num_workers: 2,
//!     ..Default::default()
//! };
//! let analysis = apriori(&transactions, &config).unwrap();
//! assert_eq!(analysis.itemsets.len(), 5);
//! ```

use tracing::info;

pub mod combi;
pub mod config;
pub mod dataset;
pub mod itemsets;
pub mod pool;
pub mod rules;
pub mod types;
#[cfg(feature = "python")]
mod wrapper;

pub(crate) use std::collections::HashMap;

pub use config::MiningConfig;
pub use dataset::DatasetKind;
pub use itemsets::{FrequentItemsetMiner, MinedItemsets};
pub use rules::{generate_rules, Rule};

use types::{Inventory, ItemId, SupportCount};

/// Result type alias for mining operations
pub type Result<T> = anyhow::Result<T>;

/// Everything one run produces, with the inventory needed to name items.
#[derive(Debug, Clone)]
pub struct AssociationAnalysis {
    pub inventory: Inventory,
    pub itemsets: MinedItemsets,
    /// Sorted by antecedent, then consequent.
    pub rules: Vec<Rule>,
}

impl AssociationAnalysis {
    pub fn item_names(&self, itemset: &[ItemId]) -> Vec<&str> {
        itemset
            .iter()
            .map(|&item| self.inventory[item].as_str())
            .collect()
    }

    /// Frequent itemsets by name with their support, smallest first.
    pub fn named_itemsets(&self) -> Vec<(Vec<&str>, SupportCount)> {
        self.itemsets
            .sorted()
            .into_iter()
            .map(|(itemset, support)| (self.item_names(itemset), support))
            .collect()
    }

    /// Rules by name as `(antecedent, consequent, confidence)`.
    pub fn named_rules(&self) -> Vec<(Vec<&str>, Vec<&str>, f64)> {
        self.rules
            .iter()
            .map(|rule| {
                (
                    self.item_names(&rule.antecedent),
                    self.item_names(&rule.consequent),
                    rule.confidence,
                )
            })
            .collect()
    }
}

/// Mine frequent itemsets and association rules from raw transactions.
///
/// The configuration is validated before any work starts.
pub fn apriori<S: AsRef<str>>(
    raw_transactions: &[Vec<S>],
    config: &MiningConfig,
) -> Result<AssociationAnalysis> {
    let miner = FrequentItemsetMiner::from_config(config)?;

    let (transactions, inventory) = dataset::itemize(raw_transactions);
    info!(
        transactions = transactions.len(),
        items = inventory.len(),
        min_support = config.min_support,
        num_workers = config.num_workers,
        "mining frequent itemsets"
    );
    let itemsets = miner.mine(&transactions)?;

    let mut rules = generate_rules(&itemsets, config.min_confidence, config.num_workers)?;
    rules.sort_by(|a, b| a.cmp_items(b));

    Ok(AssociationAnalysis {
        inventory,
        itemsets,
        rules,
    })
}

/// Run [`apriori`] on the dataset the configuration names.
pub fn apriori_from_config(config: &MiningConfig) -> Result<AssociationAnalysis> {
    config.validate()?;
    apriori(&config.dataset.load(), config)
}
