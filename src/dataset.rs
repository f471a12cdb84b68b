use std::collections::BTreeSet;

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    types::{Inventory, ItemId, ReverseLookup, Transaction},
    HashMap,
};

/// Built-in dataset sources, selected by name in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    /// Five-transaction sample basket.
    Dummy,
}

impl DatasetKind {
    pub fn load(self) -> Vec<Vec<String>> {
        match self {
            DatasetKind::Dummy => dummy(),
        }
    }
}

fn dummy() -> Vec<Vec<String>> {
    vec![
        vec!["1", "3", "4"],
        vec!["2", "3", "5"],
        vec!["1", "2", "3", "5"],
        vec!["2", "5"],
        vec!["1", "3", "5"],
    ]
    .into_iter()
    .map(|transaction| transaction.into_iter().map(str::to_owned).collect())
    .collect()
}

/// Assign dense ids to item names and encode every transaction as a bitset.
///
/// Ids follow the lexicographic order of the names, so sorting an itemset by
/// id sorts it by name and the same dataset always gets the same ids.
pub fn itemize<S: AsRef<str>>(raw_transactions: &[Vec<S>]) -> (Vec<Transaction>, Inventory) {
    let names: BTreeSet<&str> = raw_transactions
        .iter()
        .flat_map(|transaction| transaction.iter().map(AsRef::as_ref))
        .collect();

    let reverse_lookup: ReverseLookup = names
        .iter()
        .enumerate()
        .map(|(item_id, &name)| (name, item_id))
        .collect();
    let num_items = reverse_lookup.len();

    let transactions = raw_transactions
        .iter()
        .map(|raw_transaction| {
            let mut bits = bitvec![0; num_items];
            for item in raw_transaction {
                bits.set(reverse_lookup[item.as_ref()], true);
            }
            bits
        })
        .collect();

    let inventory: Inventory = names.into_iter().map(str::to_owned).collect();
    debug!(
        transactions = raw_transactions.len(),
        items = inventory.len(),
        "itemized dataset"
    );

    (transactions, inventory)
}

/// Ids of the items a transaction holds, ascending.
pub fn items_of(transaction: &Transaction) -> impl Iterator<Item = ItemId> + '_ {
    transaction.iter_ones()
}

/// Reverse of [`itemize`]'s id assignment, for callers that build itemsets by name.
pub fn reverse_lookup(inventory: &Inventory) -> HashMap<&str, ItemId> {
    inventory
        .iter()
        .enumerate()
        .map(|(item_id, name)| (name.as_str(), item_id))
        .collect()
}
