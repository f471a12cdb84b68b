//! Frequent itemset mining.
//!
//! [`partition`] splits the dataset once, [`count`] tallies candidates per
//! chunk and merges the tallies, [`search`] builds each level's candidates and
//! [`miner`] drives the levels.

pub mod count;
pub mod miner;
pub mod partition;
pub mod search;

pub use miner::{FrequentItemsetMiner, MinedItemsets};
