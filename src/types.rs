use bitvec::vec::BitVec;

use crate::HashMap;

pub type ItemId = usize;
pub type ItemName = String;
pub type Itemset = Vec<ItemId>;

/// ItemId -> name. Ids index straight into it.
pub type Inventory = Vec<ItemName>;
pub type ReverseLookup<'l> = HashMap<&'l str, ItemId>;

/// One bit per ItemId, set when the transaction holds the item.
pub type Transaction = BitVec;

pub type SupportCount = u32;
pub type ItemsetCounts = HashMap<Itemset, SupportCount>;

pub type ItemsetLength = usize;
pub type FrequentItemsets = HashMap<ItemsetLength, ItemsetCounts>;
