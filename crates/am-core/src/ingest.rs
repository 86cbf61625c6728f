//! Subset enumeration and insertion for transaction ingestion.
//!
//! For a canonicalized transaction of `n` symbols the enumerator
//! visits every non-empty subset of cardinality at most `limit`,
//! laid out in the canonical ascending-id order. The walk is
//! iterative: an index stack drives the combination enumeration and
//! a parallel node stack keeps the trie position, so each subset
//! costs exactly one child lookup instead of a root-to-leaf walk and
//! no per-subset allocation happens.

use crate::symbols::SymbolId;
use crate::trie::Trie;
use rand::rngs::StdRng;
use rand::Rng;

/// Insert every subset of `items` (canonical ascending order, no
/// duplicates) with cardinality `1..=limit` into the trie, bumping
/// each subset's terminal node.
///
/// With `sampling_ratio < 1` a biased coin decides per subset
/// whether its counter is bumped; the nodes along the way are still
/// created so later subsets can extend them. Returns the number of
/// subsets whose counters were bumped.
///
/// The root counter is not touched here; the caller increments it
/// once per transaction.
pub(crate) fn insert_subsets(
    trie: &mut Trie,
    items: &[SymbolId],
    limit: usize,
    rng: &mut StdRng,
    sampling_ratio: f64,
) -> usize {
    let n = items.len();
    if n == 0 || limit == 0 {
        return 0;
    }

    let mut inserted = 0usize;
    let mut index_stack: Vec<usize> = Vec::with_capacity(n.min(limit));
    let mut node_stack = Vec::with_capacity(n.min(limit));
    let mut idx = 0usize;

    loop {
        if idx < n && index_stack.len() < limit {
            let parent = node_stack.last().copied().unwrap_or_else(|| trie.root());
            let child = trie.child_or_create(parent, items[idx]);
            index_stack.push(idx);
            node_stack.push(child);
            if sampling_ratio >= 1.0 || rng.random_bool(sampling_ratio) {
                trie.bump(child, 1);
                inserted += 1;
            }
            idx += 1;
        } else {
            match index_stack.pop() {
                None => break,
                Some(i) => {
                    node_stack.pop();
                    idx = i + 1;
                }
            }
        }
    }
    inserted
}

/// Number of subsets `insert_subsets` visits for a transaction of
/// `n` items under `limit`.
#[cfg(test)]
fn subset_count(n: usize, limit: usize) -> usize {
    fn binomial(n: usize, k: usize) -> usize {
        let mut result = 1usize;
        for i in 0..k {
            result = result * (n - i) / (i + 1);
        }
        result
    }
    (1..=n.min(limit)).map(|k| binomial(n, k)).sum()
}
