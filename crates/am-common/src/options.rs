//! Construction and derivation options.
//!
//! [`IndexOptions`] fixes the shape of an index at construction time
//! and is part of the persisted state; the query types parameterize
//! individual derivation calls and are never stored.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Construction parameters for a rule index.
///
/// The consequent set is fixed for the lifetime of the index; the
/// remaining options tune normalization and the ingestion bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Declared consequent items, in order of interest. Must be
    /// non-empty and free of duplicates after normalization.
    pub consequents: Vec<String>,

    /// Cap on the number of antecedents per stored subset. `None`
    /// means unbounded. The maximum stored path length is
    /// `max_antecedents_length + consequents.len()` when bounded.
    pub max_antecedents_length: Option<usize>,

    /// Fold item case during normalization.
    pub case_insensitive: bool,

    /// Character set for the compact item codec. `None` disables
    /// compression and items are keyed by their UTF-8 bytes.
    pub item_alphabet: Option<String>,

    /// Trim items and collapse interior whitespace runs prior to
    /// case folding.
    pub normalize_whitespace: bool,

    /// When set, a transaction wider than the maximum stored path
    /// length fails with [`Error::MaxLenExceeded`] instead of being
    /// ingested partially up to the bound.
    pub strict_transaction_len: bool,
}

impl IndexOptions {
    /// Create options with the given consequents and defaults for
    /// everything else (unbounded antecedents, case-insensitive,
    /// whitespace-normalizing, no alphabet, non-strict).
    pub fn new(consequents: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            consequents: consequents.into_iter().map(Into::into).collect(),
            max_antecedents_length: None,
            case_insensitive: true,
            item_alphabet: None,
            normalize_whitespace: true,
            strict_transaction_len: false,
        }
    }

    /// Cap the number of antecedents per stored subset.
    pub fn with_max_antecedents_length(mut self, max: usize) -> Self {
        self.max_antecedents_length = Some(max);
        self
    }

    /// Set case folding behavior.
    pub fn with_case_insensitive(mut self, fold: bool) -> Self {
        self.case_insensitive = fold;
        self
    }

    /// Declare the item alphabet enabling compact symbol keys.
    pub fn with_item_alphabet(mut self, alphabet: impl Into<String>) -> Self {
        self.item_alphabet = Some(alphabet.into());
        self
    }

    /// Set whitespace normalization behavior.
    pub fn with_normalize_whitespace(mut self, normalize: bool) -> Self {
        self.normalize_whitespace = normalize;
        self
    }

    /// Make over-wide transactions fail instead of ingesting.
    pub fn with_strict_transaction_len(mut self, strict: bool) -> Self {
        self.strict_transaction_len = strict;
        self
    }

    /// Validate the raw option values.
    ///
    /// Duplicate detection on consequents happens again after
    /// normalization when the index is constructed; this check
    /// catches what is visible before normalization.
    pub fn validate(&self) -> Result<()> {
        if self.consequents.is_empty() {
            return Err(Error::Config("consequent set must not be empty".into()));
        }
        for item in &self.consequents {
            if item.trim().is_empty() {
                return Err(Error::Config("consequent items must not be empty".into()));
            }
        }
        if let Some(alphabet) = &self.item_alphabet {
            if alphabet.is_empty() {
                return Err(Error::Config("item alphabet must not be empty".into()));
            }
        }
        Ok(())
    }

    /// The maximum stored path length, or `None` when unbounded.
    pub fn max_len(&self) -> Option<usize> {
        self.max_antecedents_length
            .map(|cap| cap + self.consequents.len())
    }
}

/// Filters for frequent-itemset enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsetQuery {
    /// Minimum occurrence count; subtrees below it are pruned.
    pub min_occurrences: u64,

    /// Minimum itemset cardinality to report.
    pub min_length: Option<usize>,

    /// Maximum itemset cardinality to report.
    pub max_length: Option<usize>,

    /// Cap on non-consequent items per reported itemset.
    pub max_antecedents_length: Option<usize>,

    /// Report only itemsets whose consequent items equal this set.
    pub filter_to_consequents: Option<Vec<String>>,
}

impl Default for ItemsetQuery {
    fn default() -> Self {
        Self {
            min_occurrences: 1,
            min_length: None,
            max_length: None,
            max_antecedents_length: None,
            filter_to_consequents: None,
        }
    }
}

impl ItemsetQuery {
    /// Set the minimum occurrence threshold.
    pub fn with_min_occurrences(mut self, min: u64) -> Self {
        self.min_occurrences = min;
        self
    }

    /// Set the minimum reported cardinality.
    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Set the maximum reported cardinality.
    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Cap non-consequent items per reported itemset.
    pub fn with_max_antecedents_length(mut self, max: usize) -> Self {
        self.max_antecedents_length = Some(max);
        self
    }

    /// Keep only itemsets whose consequents equal the given items.
    pub fn with_filter_to_consequents(
        mut self,
        items: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.filter_to_consequents = Some(items.into_iter().map(Into::into).collect());
        self
    }

    /// Validate threshold values.
    pub fn validate(&self) -> Result<()> {
        if self.min_occurrences == 0 {
            return Err(Error::Config("min_occurrences must be at least 1".into()));
        }
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(Error::Config(format!(
                    "min_length {min} exceeds max_length {max}"
                )));
            }
        }
        Ok(())
    }
}

/// Filters and switches for rule derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleQuery {
    /// Minimum occurrence count of the full rule itemset.
    pub min_occurrences: u64,

    /// Drop rules below this confidence.
    pub min_confidence: f64,

    /// Drop rules below this lift, when set.
    pub min_lift: Option<f64>,

    /// Drop rules below this support, when set.
    pub min_support: Option<f64>,

    /// Cap on antecedents per rule.
    pub max_antecedents_length: Option<usize>,

    /// Emit only rules whose consequent set equals the given items.
    pub filter_to_consequents: Option<Vec<String>>,

    /// Also emit antecedent-free rules describing raw consequent
    /// frequencies.
    pub non_antecedents_rules: bool,

    /// Emit redundant generalizations instead of suppressing
    /// non-minimal rules.
    pub show_generalizations: bool,
}

impl Default for RuleQuery {
    fn default() -> Self {
        Self {
            min_occurrences: 1,
            min_confidence: 0.0,
            min_lift: None,
            min_support: None,
            max_antecedents_length: None,
            filter_to_consequents: None,
            non_antecedents_rules: false,
            show_generalizations: false,
        }
    }
}

impl RuleQuery {
    /// Set the minimum occurrence threshold.
    pub fn with_min_occurrences(mut self, min: u64) -> Self {
        self.min_occurrences = min;
        self
    }

    /// Set the confidence threshold.
    pub fn with_min_confidence(mut self, min: f64) -> Self {
        self.min_confidence = min;
        self
    }

    /// Set the lift threshold.
    pub fn with_min_lift(mut self, min: f64) -> Self {
        self.min_lift = Some(min);
        self
    }

    /// Set the support threshold.
    pub fn with_min_support(mut self, min: f64) -> Self {
        self.min_support = Some(min);
        self
    }

    /// Cap antecedents per rule.
    pub fn with_max_antecedents_length(mut self, max: usize) -> Self {
        self.max_antecedents_length = Some(max);
        self
    }

    /// Keep only rules whose consequent set equals the given items.
    pub fn with_filter_to_consequents(
        mut self,
        items: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.filter_to_consequents = Some(items.into_iter().map(Into::into).collect());
        self
    }

    /// Also emit antecedent-free consequent-frequency rules.
    pub fn with_non_antecedents_rules(mut self, emit: bool) -> Self {
        self.non_antecedents_rules = emit;
        self
    }

    /// Emit redundant generalizations.
    pub fn with_show_generalizations(mut self, show: bool) -> Self {
        self.show_generalizations = show;
        self
    }

    /// Validate threshold values.
    pub fn validate(&self) -> Result<()> {
        if self.min_occurrences == 0 {
            return Err(Error::Config("min_occurrences must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(Error::Config(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        if let Some(min_support) = self.min_support {
            if !(0.0..=1.0).contains(&min_support) {
                return Err(Error::Config(format!(
                    "min_support must be within [0, 1], got {min_support}"
                )));
            }
        }
        if let Some(min_lift) = self.min_lift {
            if min_lift < 0.0 || min_lift.is_nan() {
                return Err(Error::Config(format!(
                    "min_lift must be non-negative, got {min_lift}"
                )));
            }
        }
        Ok(())
    }
}

/// Options for consequent prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictOptions {
    /// Drop query items the index has never seen instead of failing
    /// with `UnknownAntecedent`.
    pub skip_unknown_antecedents: bool,
}

impl PredictOptions {
    /// Drop never-seen query items instead of failing.
    pub fn with_skip_unknown_antecedents(mut self, skip: bool) -> Self {
        self.skip_unknown_antecedents = skip;
        self
    }
}
