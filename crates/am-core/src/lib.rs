//! Association-rule mining over streams of categorical transactions.
//!
//! The engine maintains an in-memory combinatorial index: a prefix
//! tree holding every subset (up to a configurable cardinality) of
//! every ingested transaction, with per-node occurrence counters.
//! Derivation walks the tree to produce frequent itemsets, scored
//! rules, and consequent predictions; two indexes built separately
//! can be merged into one equal to an index built on both streams.
//!
//! # Example
//!
//! ```
//! use am_common::{IndexOptions, RuleQuery};
//! use am_core::RuleIndex;
//!
//! let mut index = RuleIndex::new(IndexOptions::new(["bread"]))?;
//! index.insert_transaction(["milk", "bread"])?;
//! index.insert_transaction(["milk", "bread", "butter"])?;
//! index.insert_transaction(["butter"])?;
//!
//! let rules = index.derive_rules(&RuleQuery::default())?;
//! let milk = rules.iter().find(|r| r.antecedents == ["milk"]).unwrap();
//! assert_eq!(milk.occurrences, 2);
//! assert_eq!(milk.confidence, 1.0);
//! # Ok::<(), am_common::Error>(())
//! ```

pub mod alphabet;
pub mod index;
pub mod ordering;
pub mod rules;
pub mod symbols;
pub mod tabular;
pub mod trie;

mod enumerate;
mod ingest;
mod merge;
mod predict;

pub use alphabet::AlphabetCodec;
pub use index::RuleIndex;
pub use rules::CommonSenseRule;
pub use symbols::{Normalizer, PreparedItem, SymbolId, SymbolTable};
pub use tabular::TabularInserter;
pub use trie::{NodeId, PreorderEntry, Trie};
