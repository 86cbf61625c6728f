//! Structural union of two indexes.
//!
//! The merged index gets a fresh symbol table, so every stored set
//! is re-laid-out under its new ids before insertion; counters add.
//! The result is observationally equal to an index built on the
//! concatenation of the two input streams.

use crate::index::RuleIndex;
use crate::rules::CommonSenseRule;
use crate::symbols::SymbolId;
use am_common::{Error, Result};
use tracing::info;

pub(crate) fn merge_indexes(left: &RuleIndex, right: &RuleIndex) -> Result<RuleIndex> {
    check_compatible(left, right)?;

    let mut merged = RuleIndex::new(left.options.clone())?;
    for source in [left, right] {
        let translation = translate_symbols(source, &mut merged)?;

        merged
            .trie
            .bump(merged.trie.root(), source.trie.node(source.trie.root()).occurrences());
        source.trie.for_each_path(|id, path| {
            if path.is_empty() {
                return;
            }
            let mut new_path: Vec<SymbolId> =
                path.iter().map(|s| translation[s.index()]).collect();
            new_path.sort_unstable();
            merged
                .trie
                .add_path_occurrences(&new_path, source.trie.node(id).occurrences());
        });

        for rule in &source.common_sense {
            let translated = CommonSenseRule {
                antecedents: rule
                    .antecedents
                    .iter()
                    .map(|s| translation[s.index()])
                    .collect(),
                consequents: rule
                    .consequents
                    .iter()
                    .map(|s| translation[s.index()])
                    .collect(),
            };
            if !merged.common_sense.contains(&translated) {
                merged.common_sense.push(translated);
            }
        }
    }

    info!(
        left_nodes = left.trie.node_count(),
        right_nodes = right.trie.node_count(),
        merged_nodes = merged.trie.node_count(),
        "merged indexes"
    );
    Ok(merged)
}

/// Map every symbol of `source` to its id in `merged`, interning as
/// needed. Canonical texts re-normalize to identical keys because
/// both sides share the normalization options.
fn translate_symbols(source: &RuleIndex, merged: &mut RuleIndex) -> Result<Vec<SymbolId>> {
    let mut translation = Vec::with_capacity(source.symbols.len());
    for (_, text) in source.symbols.iter() {
        let prepared = merged.normalizer.prepare(text)?;
        translation.push(merged.symbols.intern(&prepared));
    }
    Ok(translation)
}

fn check_compatible(left: &RuleIndex, right: &RuleIndex) -> Result<()> {
    let left_consequents = left.consequent_texts();
    let right_consequents = right.consequent_texts();
    if left_consequents != right_consequents {
        return Err(incompatible(
            "consequents",
            format!("{left_consequents:?}"),
            format!("{right_consequents:?}"),
        ));
    }
    if left.options.case_insensitive != right.options.case_insensitive {
        return Err(incompatible(
            "case_insensitive",
            left.options.case_insensitive.to_string(),
            right.options.case_insensitive.to_string(),
        ));
    }
    if left.options.normalize_whitespace != right.options.normalize_whitespace {
        return Err(incompatible(
            "normalize_whitespace",
            left.options.normalize_whitespace.to_string(),
            right.options.normalize_whitespace.to_string(),
        ));
    }
    if left.options.item_alphabet != right.options.item_alphabet {
        return Err(incompatible(
            "item_alphabet",
            format!("{:?}", left.options.item_alphabet),
            format!("{:?}", right.options.item_alphabet),
        ));
    }
    if left.options.max_antecedents_length != right.options.max_antecedents_length {
        return Err(incompatible(
            "max_antecedents_length",
            format!("{:?}", left.options.max_antecedents_length),
            format!("{:?}", right.options.max_antecedents_length),
        ));
    }
    Ok(())
}

fn incompatible(field: &'static str, left: String, right: String) -> Error {
    Error::IncompatibleMerge { field, left, right }
}
