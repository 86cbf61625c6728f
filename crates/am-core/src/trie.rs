//! Arena-allocated prefix tree over symbol ids.
//!
//! Nodes live in a `Vec` and reference children through dense ids,
//! so there are no parent pointers and no per-node heap spine. A
//! node's occurrence counter records how many ingested transactions
//! contain the set of symbols along its path as a subset. Nodes are
//! created on first insertion and never deleted; counters only grow.
//!
//! Stored paths use the canonical layout: ascending symbol id, which
//! places consequents (the lowest ids, in declared order) first.

use crate::ordering::ItemOrder;
use crate::symbols::SymbolId;
use std::collections::HashMap;

/// Dense index of a trie node. The root is node 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

const ROOT: NodeId = NodeId(0);

/// A single trie node.
#[derive(Debug, Clone)]
pub struct Node {
    symbol: SymbolId,
    occurrences: u64,
    depth: u32,
    consequents_count: u32,
    children: HashMap<SymbolId, NodeId>,
}

impl Node {
    /// The symbol on the edge into this node (meaningless for root).
    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }

    /// Transactions containing this node's path as a subset.
    pub fn occurrences(&self) -> u64 {
        self.occurrences
    }

    /// Path length from the root; equals the itemset cardinality.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of path symbols that are consequents. Consequents
    /// form a prefix of the path under the canonical layout.
    pub fn consequents_count(&self) -> u32 {
        self.consequents_count
    }

    /// Child map keyed by edge symbol.
    pub fn children(&self) -> &HashMap<SymbolId, NodeId> {
        &self.children
    }
}

/// A node emitted by [`Trie::preorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreorderEntry {
    /// Edge symbol; `None` for the root.
    pub symbol: Option<SymbolId>,
    /// Occurrence counter.
    pub occurrences: u64,
    /// Number of children.
    pub child_count: u32,
}

/// Arena prefix tree with per-node occurrence counters.
#[derive(Debug, Clone)]
pub struct Trie {
    nodes: Vec<Node>,
    consequent_count: u32,
}

impl Trie {
    /// Create a trie whose first `consequent_count` symbol ids are
    /// consequents.
    pub fn new(consequent_count: usize) -> Self {
        let root = Node {
            symbol: SymbolId::from_u32(u32::MAX),
            occurrences: 0,
            depth: 0,
            consequents_count: 0,
            children: HashMap::new(),
        };
        Self {
            nodes: vec![root],
            consequent_count: consequent_count as u32,
        }
    }

    /// The root node id.
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Total node count, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether a symbol id is a consequent.
    pub fn is_consequent(&self, symbol: SymbolId) -> bool {
        symbol.as_u32() < self.consequent_count
    }

    /// Number of consequent symbol ids this trie was built for.
    pub fn consequent_count(&self) -> usize {
        self.consequent_count as usize
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Child of `parent` along `symbol`, if present.
    pub fn child(&self, parent: NodeId, symbol: SymbolId) -> Option<NodeId> {
        self.nodes[parent.index()].children.get(&symbol).copied()
    }

    /// Child of `parent` along `symbol`, created with a zero counter
    /// when missing.
    pub fn child_or_create(&mut self, parent: NodeId, symbol: SymbolId) -> NodeId {
        if let Some(&existing) = self.nodes[parent.index()].children.get(&symbol) {
            return existing;
        }
        let id = NodeId(self.nodes.len() as u32);
        let (depth, consequents_count) = {
            let p = &self.nodes[parent.index()];
            (
                p.depth + 1,
                p.consequents_count + u32::from(self.is_consequent(symbol)),
            )
        };
        self.nodes.push(Node {
            symbol,
            occurrences: 0,
            depth,
            consequents_count,
            children: HashMap::new(),
        });
        self.nodes[parent.index()].children.insert(symbol, id);
        id
    }

    /// Add `delta` to a node's occurrence counter.
    pub fn bump(&mut self, id: NodeId, delta: u64) {
        self.nodes[id.index()].occurrences += delta;
    }

    /// Exact path lookup; `path` must be in canonical layout.
    pub fn get(&self, path: &[SymbolId]) -> Option<NodeId> {
        let mut current = ROOT;
        for &symbol in path {
            current = self.child(current, symbol)?;
        }
        Some(current)
    }

    /// Occurrences of an exact path; 0 when absent. The empty path
    /// resolves to the root (total transactions).
    pub fn occurrences_of(&self, path: &[SymbolId]) -> u64 {
        self.get(path)
            .map_or(0, |id| self.nodes[id.index()].occurrences)
    }

    /// Walk or extend the path, creating missing nodes, and add
    /// `delta` to the terminal node only.
    pub fn add_path_occurrences(&mut self, path: &[SymbolId], delta: u64) -> NodeId {
        let mut current = ROOT;
        for &symbol in path {
            current = self.child_or_create(current, symbol);
        }
        self.bump(current, delta);
        current
    }

    /// Insert one occurrence of the path, extending the trie as
    /// needed; returns the terminal node.
    pub fn insert_path(&mut self, path: &[SymbolId]) -> NodeId {
        self.add_path_occurrences(path, 1)
    }

    /// A node's children sorted by the given item order.
    pub fn children_sorted(&self, id: NodeId, order: &ItemOrder) -> Vec<(SymbolId, NodeId)> {
        let mut children: Vec<(SymbolId, NodeId)> = self.nodes[id.index()]
            .children
            .iter()
            .map(|(&symbol, &child)| (symbol, child))
            .collect();
        children.sort_by_key(|&(symbol, _)| order.rank(symbol));
        children
    }

    /// Depth-1 occurrence count of a symbol (0 when absent); the
    /// input of the derivation-time item order.
    pub fn depth1_occurrences(&self, symbol: SymbolId) -> u64 {
        self.child(ROOT, symbol)
            .map_or(0, |id| self.nodes[id.index()].occurrences)
    }

    /// Visit every node depth-first with its full path, root first
    /// with an empty path. Children are visited in ascending symbol
    /// order, so the visit sequence is deterministic.
    pub fn for_each_path<F: FnMut(NodeId, &[SymbolId])>(&self, mut f: F) {
        let mut path: Vec<SymbolId> = Vec::new();
        // (node, depth at which its symbol sits; 0 for root)
        let mut stack: Vec<(NodeId, usize)> = vec![(ROOT, 0)];
        while let Some((id, depth)) = stack.pop() {
            path.truncate(depth.saturating_sub(1));
            if depth > 0 {
                path.push(self.nodes[id.index()].symbol);
            }
            f(id, &path);
            let mut children: Vec<(SymbolId, NodeId)> = self.nodes[id.index()]
                .children
                .iter()
                .map(|(&s, &c)| (s, c))
                .collect();
            children.sort_by_key(|&(s, _)| std::cmp::Reverse(s));
            for (_, child) in children {
                stack.push((child, depth + 1));
            }
        }
    }

    /// Preorder traversal for persistence; children in ascending
    /// symbol order.
    pub fn preorder(&self) -> impl Iterator<Item = PreorderEntry> + '_ {
        let mut stack = vec![ROOT];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            let node = &self.nodes[id.index()];
            let mut children: Vec<(SymbolId, NodeId)> =
                node.children.iter().map(|(&s, &c)| (s, c)).collect();
            children.sort_by_key(|&(s, _)| std::cmp::Reverse(s));
            for (_, child) in children {
                stack.push(child);
            }
            Some(PreorderEntry {
                symbol: (id != ROOT).then_some(node.symbol),
                occurrences: node.occurrences,
                child_count: node.children.len() as u32,
            })
        })
    }

    /// Rebuild a trie from a preorder stream as produced by
    /// [`Trie::preorder`]. Validates structure: a single root entry,
    /// symbol ids below `symbol_count`, strictly ascending symbols
    /// along every path, no duplicate children, and exact child
    /// counts.
    pub fn from_preorder(
        consequent_count: usize,
        symbol_count: usize,
        entries: impl IntoIterator<Item = PreorderEntry>,
    ) -> std::result::Result<Self, String> {
        let mut entries = entries.into_iter();
        let root_entry = entries.next().ok_or("empty preorder stream")?;
        if root_entry.symbol.is_some() {
            return Err("first preorder entry must be the root".into());
        }

        let mut trie = Self::new(consequent_count);
        trie.nodes[ROOT.index()].occurrences = root_entry.occurrences;

        // Stack of nodes still expecting children.
        let mut pending: Vec<(NodeId, u32)> = vec![(ROOT, root_entry.child_count)];
        for entry in entries {
            let symbol = entry
                .symbol
                .ok_or("root sentinel repeated inside the stream")?;
            if symbol.index() >= symbol_count {
                return Err(format!("symbol id {symbol} outside the symbol table"));
            }
            while matches!(pending.last(), Some(&(_, 0))) {
                pending.pop();
            }
            let &mut (parent, ref mut remaining) = pending
                .last_mut()
                .ok_or("more nodes than announced child counts")?;
            *remaining -= 1;

            let parent_node = &trie.nodes[parent.index()];
            if parent != ROOT && symbol <= parent_node.symbol {
                return Err(format!(
                    "path symbols not strictly ascending ({} after {})",
                    symbol,
                    parent_node.symbol
                ));
            }
            if parent_node.children.contains_key(&symbol) {
                return Err(format!("duplicate child symbol {symbol}"));
            }

            let child = trie.child_or_create(parent, symbol);
            trie.nodes[child.index()].occurrences = entry.occurrences;
            pending.push((child, entry.child_count));
        }

        while matches!(pending.last(), Some(&(_, 0))) {
            pending.pop();
        }
        if !pending.is_empty() {
            return Err("fewer nodes than announced child counts".into());
        }
        Ok(trie)
    }
}

/// Structural equality: same shape and counters, independent of
/// arena allocation order.
impl PartialEq for Trie {
    fn eq(&self, other: &Self) -> bool {
        if self.consequent_count != other.consequent_count {
            return false;
        }
        let mut stack: Vec<(NodeId, NodeId)> = vec![(ROOT, ROOT)];
        while let Some((a, b)) = stack.pop() {
            let na = &self.nodes[a.index()];
            let nb = &other.nodes[b.index()];
            if na.occurrences != nb.occurrences || na.children.len() != nb.children.len() {
                return false;
            }
            for (&symbol, &ca) in &na.children {
                match nb.children.get(&symbol) {
                    Some(&cb) => stack.push((ca, cb)),
                    None => return false,
                }
            }
        }
        true
    }
}
