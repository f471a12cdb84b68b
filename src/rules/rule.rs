use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

use crate::types::{Inventory, ItemId, Itemset, SupportCount};

/// `antecedent => consequent`, derived from one frequent itemset.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub antecedent: Itemset,
    pub consequent: Itemset,
    /// support(antecedent ∪ consequent) / support(antecedent)
    pub confidence: f64,
    /// confidence / relative support of the consequent
    pub lift: f64,
    /// Support count of the itemset the rule was derived from.
    pub support: SupportCount,
}

impl Rule {
    /// The frequent itemset the rule splits, sorted.
    pub fn itemset(&self) -> Itemset {
        let mut itemset: Itemset = self
            .antecedent
            .iter()
            .chain(&self.consequent)
            .copied()
            .collect();
        itemset.sort_unstable();
        itemset
    }

    /// Order by antecedent, then consequent.
    pub fn cmp_items(&self, other: &Self) -> Ordering {
        self.antecedent
            .cmp(&other.antecedent)
            .then_with(|| self.consequent.cmp(&other.consequent))
    }

    /// Render with item names and metrics rounded to three decimals.
    pub fn display<'a>(&'a self, inventory: &'a Inventory) -> RuleDisplay<'a> {
        RuleDisplay {
            rule: self,
            inventory,
        }
    }
}

pub struct RuleDisplay<'a> {
    rule: &'a Rule,
    inventory: &'a Inventory,
}

impl RuleDisplay<'_> {
    fn write_items(&self, f: &mut Formatter<'_>, items: &[ItemId]) -> fmt::Result {
        write!(f, "{{")?;
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match self.inventory.get(item) {
                Some(name) => write!(f, "{}", name)?,
                None => write!(f, "#{}", item)?,
            }
        }
        write!(f, "}}")
    }
}

impl Display for RuleDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_items(f, &self.rule.antecedent)?;
        write!(f, " => ")?;
        self.write_items(f, &self.rule.consequent)?;
        write!(
            f,
            ", confidence {:.3}, lift {:.3}, support {}",
            self.rule.confidence, self.rule.lift, self.rule.support
        )
    }
}
