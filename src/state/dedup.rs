use std::collections::{BTreeMap, HashSet};

use crate::deposits::DepositId;

/// Process-local set of already-emitted deposit identities, indexed by
/// block height so old entries can be evicted once the cursor has moved
/// past them. Rebuilt empty on restart.
#[derive(Debug, Default)]
pub struct SeenDeposits {
    seen: HashSet<DepositId>,
    by_block: BTreeMap<u64, Vec<DepositId>>,
}

impl SeenDeposits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-set: returns `true` when the identity was not seen
    /// before and is now marked. The `&mut` receiver is the exclusion
    /// domain; the ingestion cycle holds it exclusively.
    pub fn insert(&mut self, block_number: u64, id: DepositId) -> bool {
        if !self.seen.insert(id) {
            return false;
        }
        self.by_block.entry(block_number).or_default().push(id);
        true
    }

    pub fn contains(&self, id: &DepositId) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Drops identities recorded below `height`. Safe once the cursor
    /// has committed past them: a committed block is never re-requested.
    pub fn evict_below(&mut self, height: u64) {
        let kept = self.by_block.split_off(&height);
        let evicted = std::mem::replace(&mut self.by_block, kept);
        for id in evicted.into_values().flatten() {
            self.seen.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256;

    fn id(byte: u8, position: u32) -> DepositId {
        DepositId {
            tx_hash: B256::repeat_byte(byte),
            position,
        }
    }

    #[test]
    fn insert_is_check_and_set() {
        let mut seen = SeenDeposits::new();
        assert!(seen.insert(10, id(1, 0)));
        assert!(!seen.insert(10, id(1, 0)));
        assert!(seen.insert(10, id(1, 1)));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn eviction_drops_only_blocks_below_the_boundary() {
        let mut seen = SeenDeposits::new();
        seen.insert(10, id(1, 0));
        seen.insert(11, id(2, 0));
        seen.insert(12, id(3, 0));
        seen.evict_below(12);
        assert_eq!(seen.len(), 1);
        assert!(!seen.contains(&id(1, 0)));
        assert!(!seen.contains(&id(2, 0)));
        assert!(seen.contains(&id(3, 0)));
    }

    #[test]
    fn evicted_identity_can_be_inserted_again() {
        let mut seen = SeenDeposits::new();
        seen.insert(10, id(1, 0));
        seen.evict_below(11);
        assert!(seen.is_empty());
        assert!(seen.insert(10, id(1, 0)));
    }
}
