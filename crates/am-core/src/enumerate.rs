//! Lazy, pruned depth-first enumeration over the trie.
//!
//! All filters are evaluated at the node level so whole subtrees can
//! be skipped: occurrence counters never increase along a path, the
//! antecedent count never decreases, and a consequent once on the
//! path stays on every descendant path.

use crate::ordering::ItemOrder;
use crate::symbols::SymbolId;
use crate::trie::{NodeId, Trie};
use std::collections::BTreeSet;

/// Node-level filters for a trie walk.
#[derive(Debug, Clone, Default)]
pub(crate) struct WalkFilter {
    /// Skip nodes (and their subtrees) below this count.
    pub min_occurrences: u64,
    /// Do not descend past this depth.
    pub max_depth: Option<usize>,
    /// Skip subtrees whose paths carry more non-consequents.
    pub max_antecedents: Option<usize>,
    /// Skip subtrees whose paths carry a consequent outside this
    /// set. Emission-level equality with the set is the caller's
    /// check; the walk only guarantees compatibility.
    pub consequent_filter: Option<BTreeSet<SymbolId>>,
}

/// Depth-first walk over all nodes passing `filter`, children in
/// ≺ order. The root (empty itemset) is not visited.
pub(crate) fn walk_filtered(
    trie: &Trie,
    order: &ItemOrder,
    filter: &WalkFilter,
    mut visit: impl FnMut(NodeId, &[SymbolId]),
) {
    if trie.node(trie.root()).occurrences() < filter.min_occurrences {
        return;
    }

    let mut path: Vec<SymbolId> = Vec::new();
    let mut stack: Vec<(NodeId, usize)> = Vec::new();
    for (_, child) in trie.children_sorted(trie.root(), order).into_iter().rev() {
        stack.push((child, 1));
    }

    while let Some((id, depth)) = stack.pop() {
        let node = trie.node(id);
        path.truncate(depth - 1);

        if node.occurrences() < filter.min_occurrences {
            continue;
        }
        let symbol = node.symbol();
        if let Some(allowed) = &filter.consequent_filter {
            if trie.is_consequent(symbol) && !allowed.contains(&symbol) {
                continue;
            }
        }
        if let Some(cap) = filter.max_antecedents {
            if (node.depth() - node.consequents_count()) as usize > cap {
                continue;
            }
        }

        path.push(symbol);
        visit(id, &path);

        if filter.max_depth.is_none_or(|cap| depth < cap) {
            for (_, child) in trie.children_sorted(id, order).into_iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }
}

/// Whether a path's consequent prefix equals the given set.
pub(crate) fn consequents_equal(
    path: &[SymbolId],
    consequents_count: usize,
    wanted: &BTreeSet<SymbolId>,
) -> bool {
    consequents_count == wanted.len()
        && path[..consequents_count]
            .iter()
            .zip(wanted.iter())
            .all(|(a, b)| a == b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> SymbolId {
        SymbolId::from_u32(raw)
    }

    fn sample_trie() -> Trie {
        // Consequent 0; transactions {0,1}, {0,1}, {1,2}.
        let mut trie = Trie::new(1);
        trie.bump(trie.root(), 3);
        for path in [vec![0u32], vec![1], vec![0, 1]] {
            let p: Vec<SymbolId> = path.iter().map(|&r| id(r)).collect();
            trie.add_path_occurrences(&p, 2);
        }
        for path in [vec![1u32, 2], vec![2]] {
            let p: Vec<SymbolId> = path.iter().map(|&r| id(r)).collect();
            trie.add_path_occurrences(&p, 1);
        }
        trie.add_path_occurrences(&[id(1)], 1); // {1} occurs 3 times total
        trie
    }

    fn order_for(trie: &Trie) -> ItemOrder {
        ItemOrder::compute(3, 1, |s| trie.depth1_occurrences(s))
    }

    fn collect(trie: &Trie, filter: &WalkFilter) -> Vec<Vec<u32>> {
        let order = order_for(trie);
        let mut out = Vec::new();
        walk_filtered(trie, &order, filter, |_, path| {
            out.push(path.iter().map(|s| s.as_u32()).collect());
        });
        out
    }

    #[test]
    fn test_walk_visits_all_without_filters() {
        let trie = sample_trie();
        let paths = collect(
            &trie,
            &WalkFilter {
                min_occurrences: 1,
                ..Default::default()
            },
        );
        assert_eq!(paths.len(), trie.node_count() - 1);
    }

    #[test]
    fn test_min_occurrences_prunes_subtrees() {
        let trie = sample_trie();
        let paths = collect(
            &trie,
            &WalkFilter {
                min_occurrences: 2,
                ..Default::default()
            },
        );
        assert!(paths.contains(&vec![0, 1]));
        assert!(paths.contains(&vec![1]));
        assert!(!paths.contains(&vec![2]));
        assert!(!paths.contains(&vec![1, 2]));
    }

    #[test]
    fn test_max_depth_stops_descent() {
        let trie = sample_trie();
        let paths = collect(
            &trie,
            &WalkFilter {
                min_occurrences: 1,
                max_depth: Some(1),
                ..Default::default()
            },
        );
        assert!(paths.iter().all(|p| p.len() == 1));
        assert_eq!(paths.len(), 3);
    }

    #[test]
    fn test_max_antecedents_prunes() {
        let trie = sample_trie();
        let paths = collect(
            &trie,
            &WalkFilter {
                min_occurrences: 1,
                max_antecedents: Some(0),
                ..Default::default()
            },
        );
        // Only the pure-consequent path {0} survives.
        assert_eq!(paths, vec![vec![0]]);
    }

    #[test]
    fn test_consequent_filter_prunes_foreign_consequents() {
        // Two consequents, filter to {1} only.
        let mut trie = Trie::new(2);
        trie.bump(trie.root(), 2);
        for p in [vec![0u32], vec![1], vec![0, 1], vec![2], vec![1, 2]] {
            let p: Vec<SymbolId> = p.iter().map(|&r| id(r)).collect();
            trie.add_path_occurrences(&p, 1);
        }
        let order = ItemOrder::compute(3, 2, |s| trie.depth1_occurrences(s));
        let filter = WalkFilter {
            min_occurrences: 1,
            consequent_filter: Some([id(1)].into_iter().collect()),
            ..Default::default()
        };
        let mut paths = Vec::new();
        walk_filtered(&trie, &order, &filter, |_, p| {
            paths.push(p.iter().map(|s| s.as_u32()).collect::<Vec<_>>());
        });
        assert!(paths.contains(&vec![1]));
        assert!(paths.contains(&vec![1, 2]));
        assert!(paths.contains(&vec![2]));
        assert!(!paths.iter().any(|p| p.contains(&0)));
    }

    #[test]
    fn test_consequents_equal() {
        let wanted: BTreeSet<SymbolId> = [id(0), id(1)].into_iter().collect();
        assert!(consequents_equal(&[id(0), id(1), id(5)], 2, &wanted));
        assert!(!consequents_equal(&[id(0), id(5)], 1, &wanted));
        assert!(!consequents_equal(&[id(1), id(5)], 1, &wanted));
        let empty = BTreeSet::new();
        assert!(consequents_equal(&[id(5)], 0, &empty));
    }
}
