//! Bundle wire format.
//!
//! A bundle is a single framed blob:
//!
//! ```text
//! magic "AMBR" | schema version u32 LE | header length u32 LE
//! header JSON  | trie section
//! ```
//!
//! The header carries the configuration, the symbol table in id
//! order, the common-sense list as id sets, the node count, and a
//! sha-256 checksum of the trie section. The trie section is the
//! preorder traversal, 16 bytes per node:
//! `symbol_id u32 | occurrences u64 | child_count u32`, all
//! little-endian, with the root first under a sentinel symbol id.

use am_common::IndexOptions;
use am_core::{CommonSenseRule, RuleIndex, SymbolId};
use serde::{Deserialize, Serialize};

/// Magic identifier at byte 0.
pub const BUNDLE_MAGIC: [u8; 4] = *b"AMBR";

/// Current schema version.
pub const BUNDLE_SCHEMA_VERSION: u32 = 1;

/// Symbol id standing in for the root node in the trie section.
pub(crate) const ROOT_SYMBOL_SENTINEL: u32 = u32::MAX;

/// Bytes per trie section entry.
pub(crate) const TRIE_ENTRY_BYTES: usize = 16;

/// JSON header document of a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleHeader {
    /// Construction options of the persisted index.
    pub options: IndexOptions,

    /// Canonical symbol texts in id order; the declared consequents
    /// come first.
    pub symbols: Vec<String>,

    /// Common-sense rules as symbol id sets.
    pub common_sense: Vec<CommonSenseEntry>,

    /// Number of entries in the trie section, including the root.
    pub node_count: u64,

    /// Hex sha-256 of the trie section bytes.
    pub trie_sha256: String,
}

/// A persisted common-sense rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonSenseEntry {
    /// Antecedent symbol ids, ascending.
    pub antecedents: Vec<u32>,
    /// Consequent symbol ids, ascending.
    pub consequents: Vec<u32>,
}

impl CommonSenseEntry {
    pub(crate) fn from_rule(rule: &CommonSenseRule) -> Self {
        Self {
            antecedents: rule.antecedents.iter().map(|s| s.as_u32()).collect(),
            consequents: rule.consequents.iter().map(|s| s.as_u32()).collect(),
        }
    }

    pub(crate) fn into_rule(self) -> CommonSenseRule {
        CommonSenseRule {
            antecedents: self
                .antecedents
                .into_iter()
                .map(SymbolId::from_u32)
                .collect(),
            consequents: self
                .consequents
                .into_iter()
                .map(SymbolId::from_u32)
                .collect(),
        }
    }
}

impl BundleHeader {
    pub(crate) fn for_index(index: &RuleIndex, trie_sha256: String) -> Self {
        Self {
            options: index.options().clone(),
            symbols: index
                .symbols()
                .iter()
                .map(|(_, text)| text.to_string())
                .collect(),
            common_sense: index
                .common_sense_rules()
                .iter()
                .map(CommonSenseEntry::from_rule)
                .collect(),
            node_count: index.trie().node_count() as u64,
            trie_sha256,
        }
    }
}
