//! Derivation-time item order.
//!
//! The order places consequents (in declared order) before every
//! other symbol, and sorts the rest by descending depth-1 occurrence
//! count with ties broken by ascending symbol id. It is a pure
//! function of its inputs and is recomputed at every derivation entry
//! point; it is never cached across mutations.
//!
//! Stored trie paths use the canonical ascending-id layout. This
//! order only controls the sequence in which a node's children are
//! visited during enumeration.

use crate::symbols::SymbolId;

/// A total order over symbols as a rank permutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOrder {
    rank: Vec<u32>,
}

impl ItemOrder {
    /// Compute the order for `symbol_count` symbols of which the
    /// first `consequent_count` are consequents, from the depth-1
    /// occurrence counts (`frequency(id)`, 0 for symbols without a
    /// depth-1 node).
    pub fn compute(
        symbol_count: usize,
        consequent_count: usize,
        frequency: impl Fn(SymbolId) -> u64,
    ) -> Self {
        let mut rank = vec![0u32; symbol_count];
        for (id, slot) in rank.iter_mut().enumerate().take(consequent_count) {
            *slot = id as u32;
        }

        let mut others: Vec<SymbolId> = (consequent_count..symbol_count)
            .map(|i| SymbolId::from_u32(i as u32))
            .collect();
        others.sort_by_key(|&id| (std::cmp::Reverse(frequency(id)), id));
        for (position, id) in others.into_iter().enumerate() {
            rank[id.index()] = (consequent_count + position) as u32;
        }

        Self { rank }
    }

    /// Rank of a symbol; lower ranks come first.
    pub fn rank(&self, id: SymbolId) -> u32 {
        self.rank[id.index()]
    }

    /// Sort symbols ascending by rank.
    pub fn sort_symbols(&self, symbols: &mut [SymbolId]) {
        symbols.sort_by_key(|&id| self.rank(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> SymbolId {
        SymbolId::from_u32(raw)
    }

    #[test]
    fn test_consequents_keep_declared_order() {
        // Two consequents, three others; frequencies would reverse
        // the consequents if they were not pinned.
        let freq = |s: SymbolId| match s.as_u32() {
            0 => 1,
            1 => 100,
            2 => 5,
            3 => 7,
            4 => 3,
            _ => 0,
        };
        let order = ItemOrder::compute(5, 2, freq);
        assert_eq!(order.rank(id(0)), 0);
        assert_eq!(order.rank(id(1)), 1);
        // Others by descending frequency: 3 (7), 2 (5), 4 (3).
        assert_eq!(order.rank(id(3)), 2);
        assert_eq!(order.rank(id(2)), 3);
        assert_eq!(order.rank(id(4)), 4);
    }

    #[test]
    fn test_frequency_ties_break_by_id() {
        let order = ItemOrder::compute(4, 1, |_| 2);
        assert_eq!(order.rank(id(1)), 1);
        assert_eq!(order.rank(id(2)), 2);
        assert_eq!(order.rank(id(3)), 3);
    }

    #[test]
    fn test_sort_symbols() {
        let freq = |s: SymbolId| match s.as_u32() {
            1 => 1,
            2 => 9,
            3 => 4,
            _ => 0,
        };
        let order = ItemOrder::compute(4, 1, freq);
        let mut symbols = vec![id(3), id(1), id(0), id(2)];
        order.sort_symbols(&mut symbols);
        assert_eq!(symbols, vec![id(0), id(2), id(3), id(1)]);
    }

    #[test]
    fn test_zero_frequency_symbols_sort_last() {
        let freq = |s: SymbolId| if s.as_u32() == 2 { 3 } else { 0 };
        let order = ItemOrder::compute(4, 1, freq);
        assert_eq!(order.rank(id(2)), 1);
        assert_eq!(order.rank(id(1)), 2);
        assert_eq!(order.rank(id(3)), 3);
    }
}
