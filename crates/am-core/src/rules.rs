//! Rule derivation: candidate generation, statistical measures,
//! common-sense suppression, and the minimality pass.
//!
//! A rule is read off a trie node whose path contains at least one
//! consequent: the consequent prefix is the right-hand side, the
//! non-consequent suffix the left-hand side. Denominators come from
//! exact lookups of the antecedent-only and consequent-only paths.

use crate::enumerate::{consequents_equal, walk_filtered, WalkFilter};
use crate::ordering::ItemOrder;
use crate::symbols::{SymbolId, SymbolTable};
use crate::trie::Trie;
use am_common::{RuleQuery, RuleRecord};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// A user-declared "already explained" pair. A derived rule is
/// suppressed when some entry's antecedents and consequents are both
/// subsets of the rule's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonSenseRule {
    /// Antecedent symbols of the entry.
    pub antecedents: BTreeSet<SymbolId>,
    /// Consequent symbols of the entry.
    pub consequents: BTreeSet<SymbolId>,
}

impl CommonSenseRule {
    /// Whether this entry suppresses a rule with the given
    /// antecedent and consequent sets (both in ascending order).
    pub(crate) fn suppresses(&self, antecedents: &[SymbolId], consequents: &[SymbolId]) -> bool {
        is_subset_of_sorted(&self.antecedents, antecedents)
            && is_subset_of_sorted(&self.consequents, consequents)
    }
}

fn is_subset_of_sorted(small: &BTreeSet<SymbolId>, sorted: &[SymbolId]) -> bool {
    small.iter().all(|id| sorted.binary_search(id).is_ok())
}

struct Candidate {
    antecedents: Vec<SymbolId>,
    consequents: Vec<SymbolId>,
    occurrences: u64,
    occurrences_antecedents: u64,
    occurrences_consequents: u64,
    support: f64,
    confidence: f64,
    lift: f64,
}

/// Derive all rules passing the query from the trie.
///
/// `consequent_filter` is the resolved form of
/// `query.filter_to_consequents`; the query's own string form is not
/// consulted here.
pub(crate) fn derive_rules(
    trie: &Trie,
    symbols: &SymbolTable,
    order: &ItemOrder,
    common_sense: &[CommonSenseRule],
    query: &RuleQuery,
    consequent_filter: Option<&BTreeSet<SymbolId>>,
) -> Vec<RuleRecord> {
    let total = trie.node(trie.root()).occurrences();
    if total == 0 {
        return Vec::new();
    }

    let filter = WalkFilter {
        min_occurrences: query.min_occurrences,
        max_depth: None,
        max_antecedents: query.max_antecedents_length,
        consequent_filter: consequent_filter.cloned(),
    };

    let mut candidates = Vec::new();
    walk_filtered(trie, order, &filter, |id, path| {
        let node = trie.node(id);
        let cc = node.consequents_count() as usize;
        if cc == 0 {
            return;
        }
        let (consequents, antecedents) = path.split_at(cc);
        if antecedents.is_empty() && !query.non_antecedents_rules {
            return;
        }
        if let Some(wanted) = consequent_filter {
            if !consequents_equal(path, cc, wanted) {
                return;
            }
        }

        let occurrences = node.occurrences();
        let occurrences_antecedents = if antecedents.is_empty() {
            total
        } else {
            trie.occurrences_of(antecedents)
        };
        let occurrences_consequents = trie.occurrences_of(consequents);

        let confidence = ratio(occurrences, occurrences_antecedents);
        let support = occurrences as f64 / total as f64;
        let support_antecedents = occurrences_antecedents as f64 / total as f64;
        let support_consequents = occurrences_consequents as f64 / total as f64;
        let expected = support_antecedents * support_consequents;
        let lift = if expected == 0.0 { 0.0 } else { support / expected };

        if confidence < query.min_confidence {
            return;
        }
        if query.min_support.is_some_and(|min| support < min) {
            return;
        }
        if query.min_lift.is_some_and(|min| lift < min) {
            return;
        }
        if common_sense
            .iter()
            .any(|cs| cs.suppresses(antecedents, consequents))
        {
            return;
        }

        candidates.push(Candidate {
            antecedents: antecedents.to_vec(),
            consequents: consequents.to_vec(),
            occurrences,
            occurrences_antecedents,
            occurrences_consequents,
            support,
            confidence,
            lift,
        });
    });

    let found = candidates.len();
    if !query.show_generalizations {
        candidates = minimal_rules(candidates);
    }
    debug!(
        candidates = found,
        emitted = candidates.len(),
        "derived rules"
    );

    candidates
        .into_iter()
        .map(|c| RuleRecord {
            rule_length: c.antecedents.len() + c.consequents.len(),
            antecedents: c.antecedents.iter().map(|&s| symbols.text(s).to_string()).collect(),
            consequents: c.consequents.iter().map(|&s| symbols.text(s).to_string()).collect(),
            occurrences: c.occurrences,
            occurrences_antecedents: c.occurrences_antecedents,
            occurrences_consequents: c.occurrences_consequents,
            support: c.support,
            confidence: c.confidence,
            lift: c.lift,
        })
        .collect()
}

/// Suppress redundant generalizations: a rule is dropped when some
/// already-kept rule over the same consequent set has a strict
/// antecedent subset and at least its confidence.
fn minimal_rules(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        a.antecedents
            .len()
            .cmp(&b.antecedents.len())
            .then_with(|| b.confidence.total_cmp(&a.confidence))
    });

    let mut kept_by_consequents: HashMap<Vec<SymbolId>, Vec<(BTreeSet<SymbolId>, f64)>> =
        HashMap::new();
    let mut emitted = Vec::new();
    for candidate in candidates {
        let antecedent_set: BTreeSet<SymbolId> = candidate.antecedents.iter().copied().collect();
        let kept = kept_by_consequents
            .entry(candidate.consequents.clone())
            .or_default();
        let redundant = kept.iter().any(|(smaller, confidence)| {
            smaller.len() < antecedent_set.len()
                && smaller.is_subset(&antecedent_set)
                && *confidence >= candidate.confidence
        });
        if !redundant {
            kept.push((antecedent_set, candidate.confidence));
            emitted.push(candidate);
        }
    }
    emitted
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
