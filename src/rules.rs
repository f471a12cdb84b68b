//! Association rules from mined frequent itemsets.

pub mod rule;
pub mod search;

pub use rule::{Rule, RuleDisplay};
pub use search::generate_rules;
