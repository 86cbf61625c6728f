//! The rule index: construction, ingestion, and derivation surface.
//!
//! A [`RuleIndex`] owns its arena, symbol table, and common-sense
//! list exclusively; distinct instances are independent. All calls
//! are synchronous and run to completion, and every failure leaves
//! the index in its pre-call state.

use crate::enumerate::{consequents_equal, walk_filtered, WalkFilter};
use crate::ingest::insert_subsets;
use crate::merge::merge_indexes;
use crate::ordering::ItemOrder;
use crate::predict;
use crate::rules::{derive_rules, CommonSenseRule};
use crate::symbols::{Normalizer, PreparedItem, SymbolId, SymbolTable};
use crate::tabular::TabularInserter;
use crate::trie::Trie;
use am_common::{
    Error, IndexOptions, IndexStats, ItemsetQuery, ItemsetRecord, PredictOptions, Prediction,
    Result, RuleQuery, RuleRecord,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Outcome of resolving a consequent filter's item strings.
pub(crate) enum FilterResolution {
    /// No filter was given.
    None,
    /// The filter names an item that can never match; the result is
    /// empty without walking.
    Unsatisfiable,
    /// The resolved symbol set.
    Set(BTreeSet<SymbolId>),
}

/// In-memory combinatorial index over ingested transactions.
#[derive(Debug)]
pub struct RuleIndex {
    pub(crate) options: IndexOptions,
    pub(crate) normalizer: Normalizer,
    pub(crate) symbols: SymbolTable,
    pub(crate) trie: Trie,
    pub(crate) common_sense: Vec<CommonSenseRule>,
    rng: StdRng,
}

impl RuleIndex {
    /// Build an empty index from validated options.
    pub fn new(options: IndexOptions) -> Result<Self> {
        Self::with_rng(options, StdRng::from_os_rng())
    }

    /// Build an empty index with a deterministic sampling RNG.
    pub fn with_rng_seed(options: IndexOptions, seed: u64) -> Result<Self> {
        Self::with_rng(options, StdRng::seed_from_u64(seed))
    }

    fn with_rng(options: IndexOptions, rng: StdRng) -> Result<Self> {
        options.validate()?;
        let normalizer = Normalizer::new(
            options.case_insensitive,
            options.normalize_whitespace,
            options.item_alphabet.as_deref(),
        )?;

        let mut symbols = SymbolTable::new();
        for (position, raw) in options.consequents.iter().enumerate() {
            let prepared = normalizer.prepare(raw)?;
            let id = symbols.intern(&prepared);
            if id.index() != position {
                return Err(Error::Config(format!(
                    "duplicate consequent {:?} after normalization",
                    prepared.text()
                )));
            }
        }

        let consequent_count = options.consequents.len();
        Ok(Self {
            options,
            normalizer,
            symbols,
            trie: Trie::new(consequent_count),
            common_sense: Vec::new(),
            rng,
        })
    }

    /// Rebuild an index from persisted parts. The symbol texts must
    /// be in id order and start with the canonical consequents; the
    /// trie must reference only those ids.
    pub fn from_parts(
        options: IndexOptions,
        symbol_texts: &[String],
        common_sense: Vec<CommonSenseRule>,
        trie: Trie,
    ) -> Result<Self> {
        let mut index = Self::new(options)?;
        if symbol_texts.len() < index.consequent_count() {
            return Err(Error::Config(format!(
                "symbol table lists {} symbols, fewer than the {} consequents",
                symbol_texts.len(),
                index.consequent_count()
            )));
        }
        for (position, text) in symbol_texts.iter().enumerate() {
            let prepared = index.normalizer.prepare(text)?;
            let id = index.symbols.intern(&prepared);
            if id.index() != position {
                return Err(Error::Config(format!(
                    "symbol table does not round-trip at id {position} ({text:?})"
                )));
            }
        }
        if trie.consequent_count() != index.consequent_count() {
            return Err(Error::Config(
                "trie consequent count does not match the options".into(),
            ));
        }
        for rule in &common_sense {
            let in_range = rule
                .antecedents
                .iter()
                .chain(rule.consequents.iter())
                .all(|id| id.index() < index.symbols.len());
            if !in_range {
                return Err(Error::Config(
                    "common-sense rule references an unknown symbol".into(),
                ));
            }
        }
        index.trie = trie;
        index.common_sense = common_sense;
        Ok(index)
    }

    /// The construction options.
    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    /// Number of declared consequents.
    pub fn consequent_count(&self) -> usize {
        self.options.consequents.len()
    }

    /// Canonical text forms of the declared consequents.
    pub fn consequent_texts(&self) -> Vec<&str> {
        (0..self.consequent_count())
            .map(|i| self.symbols.text(SymbolId::from_u32(i as u32)))
            .collect()
    }

    /// The symbol table (read-only).
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The trie store (read-only).
    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    /// The registered common-sense rules.
    pub fn common_sense_rules(&self) -> &[CommonSenseRule] {
        &self.common_sense
    }

    /// Number of ingested transactions.
    pub fn transactions(&self) -> u64 {
        self.trie.node(self.trie.root()).occurrences()
    }

    /// Summary statistics.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            transactions: self.transactions(),
            nodes: self.trie.node_count(),
            symbols: self.symbols.len(),
            common_sense_rules: self.common_sense.len(),
        }
    }

    /// Ingest one transaction; duplicates within it collapse to a
    /// set. Returns the number of subsets inserted.
    pub fn insert_transaction(
        &mut self,
        items: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<usize> {
        self.ingest(items, 1.0)
    }

    /// Ingest many transactions; stops at the first failure, leaving
    /// earlier transactions ingested.
    pub fn insert_transactions<T>(
        &mut self,
        transactions: impl IntoIterator<Item = T>,
    ) -> Result<usize>
    where
        T: IntoIterator<Item = String>,
    {
        let mut inserted = 0;
        for transaction in transactions {
            inserted += self.insert_transaction(transaction)?;
        }
        Ok(inserted)
    }

    /// Ingest one transaction, bumping each subset's counter only
    /// with probability `sampling_ratio`. Subsampling trades away
    /// exact counts; derived measures become best-effort.
    pub fn insert_transaction_sampled(
        &mut self,
        items: impl IntoIterator<Item = impl AsRef<str>>,
        sampling_ratio: f64,
    ) -> Result<usize> {
        validate_sampling_ratio(sampling_ratio)?;
        self.ingest(items, sampling_ratio)
    }

    /// Sampled variant of [`RuleIndex::insert_transactions`].
    pub fn insert_transactions_sampled<T>(
        &mut self,
        transactions: impl IntoIterator<Item = T>,
        sampling_ratio: f64,
    ) -> Result<usize>
    where
        T: IntoIterator<Item = String>,
    {
        validate_sampling_ratio(sampling_ratio)?;
        let mut inserted = 0;
        for transaction in transactions {
            inserted += self.ingest(transaction, sampling_ratio)?;
        }
        Ok(inserted)
    }

    /// Ingest rows through a tabular adapter.
    pub fn insert_from_tabular_rows(
        &mut self,
        rows: &[HashMap<String, String>],
        inserter: &TabularInserter,
    ) -> Result<usize> {
        let mut inserted = 0;
        for row in rows {
            inserted += inserter.insert_row(self, row)?;
        }
        Ok(inserted)
    }

    fn ingest(
        &mut self,
        items: impl IntoIterator<Item = impl AsRef<str>>,
        sampling_ratio: f64,
    ) -> Result<usize> {
        // Validate and canonicalize everything before the first
        // mutation so a failing transaction leaves no trace.
        let mut prepared: Vec<PreparedItem> = Vec::new();
        for item in items {
            prepared.push(self.normalizer.prepare(item.as_ref())?);
        }
        let unique: HashSet<&[u8]> = prepared.iter().map(|p| p.key()).collect();
        let limit = self.options.max_len().unwrap_or(usize::MAX);
        if self.options.strict_transaction_len && unique.len() > limit {
            return Err(Error::MaxLenExceeded {
                len: unique.len(),
                max_len: limit,
            });
        }

        let ids: BTreeSet<SymbolId> = prepared
            .iter()
            .map(|item| self.symbols.intern(item))
            .collect();
        let sorted: Vec<SymbolId> = ids.into_iter().collect();

        self.trie.bump(self.trie.root(), 1);
        let inserted = insert_subsets(&mut self.trie, &sorted, limit, &mut self.rng, sampling_ratio);
        debug!(
            items = sorted.len(),
            subsets = inserted,
            "ingested transaction"
        );
        Ok(inserted)
    }

    /// Enumerate frequent itemsets passing the query filters.
    pub fn frequent_itemsets(&self, query: &ItemsetQuery) -> Result<Vec<ItemsetRecord>> {
        query.validate()?;
        let consequent_filter = match self.resolve_consequent_filter(&query.filter_to_consequents)?
        {
            FilterResolution::None => None,
            FilterResolution::Unsatisfiable => return Ok(Vec::new()),
            FilterResolution::Set(set) => Some(set),
        };

        let total = self.transactions();
        if total == 0 {
            return Ok(Vec::new());
        }
        let order = self.item_order();
        let filter = WalkFilter {
            min_occurrences: query.min_occurrences,
            max_depth: query.max_length,
            max_antecedents: query.max_antecedents_length,
            consequent_filter: consequent_filter.clone(),
        };

        let min_length = query.min_length.unwrap_or(1);
        let mut records = Vec::new();
        walk_filtered(&self.trie, &order, &filter, |id, path| {
            if path.len() < min_length {
                return;
            }
            let node = self.trie.node(id);
            if let Some(wanted) = &consequent_filter {
                if !consequents_equal(path, node.consequents_count() as usize, wanted) {
                    return;
                }
            }
            records.push(ItemsetRecord {
                items: path
                    .iter()
                    .map(|&s| self.symbols.text(s).to_string())
                    .collect(),
                occurrences: node.occurrences(),
                support: node.occurrences() as f64 / total as f64,
                length: path.len(),
            });
        });
        Ok(records)
    }

    /// Derive association rules passing the query.
    pub fn derive_rules(&self, query: &RuleQuery) -> Result<Vec<RuleRecord>> {
        query.validate()?;
        let consequent_filter = match self.resolve_consequent_filter(&query.filter_to_consequents)?
        {
            FilterResolution::None => None,
            FilterResolution::Unsatisfiable => return Ok(Vec::new()),
            FilterResolution::Set(set) => Some(set),
        };
        let order = self.item_order();
        Ok(derive_rules(
            &self.trie,
            &self.symbols,
            &order,
            &self.common_sense,
            query,
            consequent_filter.as_ref(),
        ))
    }

    /// Register a common-sense rule; returns `false` when an equal
    /// pair was already present. Items not seen before are interned
    /// so the rule also applies to data that arrives later.
    pub fn insert_common_sense_rule(
        &mut self,
        antecedents: impl IntoIterator<Item = impl AsRef<str>>,
        consequents: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<bool> {
        let antecedents: Vec<PreparedItem> = antecedents
            .into_iter()
            .map(|raw| self.normalizer.prepare(raw.as_ref()))
            .collect::<Result<_>>()?;
        let consequents: Vec<PreparedItem> = consequents
            .into_iter()
            .map(|raw| self.normalizer.prepare(raw.as_ref()))
            .collect::<Result<_>>()?;
        if antecedents.is_empty() || consequents.is_empty() {
            return Err(Error::Config(
                "common-sense rules need antecedents and consequents".into(),
            ));
        }

        let rule = CommonSenseRule {
            antecedents: antecedents
                .iter()
                .map(|item| self.symbols.intern(item))
                .collect(),
            consequents: consequents
                .iter()
                .map(|item| self.symbols.intern(item))
                .collect(),
        };
        if self.common_sense.contains(&rule) {
            return Ok(false);
        }
        self.common_sense.push(rule);
        Ok(true)
    }

    /// Score every declared consequent for a partial transaction.
    pub fn predict(
        &self,
        items: impl IntoIterator<Item = impl AsRef<str>>,
        options: &PredictOptions,
    ) -> Result<Vec<Prediction>> {
        let owned: Vec<String> = items.into_iter().map(|s| s.as_ref().to_string()).collect();
        let borrowed: Vec<&str> = owned.iter().map(String::as_str).collect();
        predict::predict(
            &self.trie,
            &self.symbols,
            &self.normalizer,
            self.consequent_count(),
            &borrowed,
            options,
        )
    }

    /// Merge this index with another compatible one into a fresh
    /// index equal to one built on both input streams.
    pub fn merge(&self, other: &RuleIndex) -> Result<RuleIndex> {
        merge_indexes(self, other)
    }

    /// The derivation-time item order: consequents first, then by
    /// descending depth-1 frequency. Recomputed on every call.
    pub(crate) fn item_order(&self) -> ItemOrder {
        ItemOrder::compute(self.symbols.len(), self.consequent_count(), |s| {
            self.trie.depth1_occurrences(s)
        })
    }

    pub(crate) fn resolve_consequent_filter(
        &self,
        items: &Option<Vec<String>>,
    ) -> Result<FilterResolution> {
        let Some(items) = items else {
            return Ok(FilterResolution::None);
        };
        let mut set = BTreeSet::new();
        for raw in items {
            let prepared = self.normalizer.prepare(raw)?;
            match self.symbols.get(&prepared) {
                Some(id) if self.trie.is_consequent(id) => {
                    set.insert(id);
                }
                // A never-seen or non-consequent item cannot equal
                // any path's consequent set.
                _ => return Ok(FilterResolution::Unsatisfiable),
            }
        }
        Ok(FilterResolution::Set(set))
    }
}

/// Structural equality over the observable state; the sampling RNG
/// is excluded.
impl PartialEq for RuleIndex {
    fn eq(&self, other: &Self) -> bool {
        self.options == other.options
            && self.symbols == other.symbols
            && self.common_sense == other.common_sense
            && self.trie == other.trie
    }
}

fn validate_sampling_ratio(ratio: f64) -> Result<()> {
    if !(ratio > 0.0 && ratio <= 1.0) {
        return Err(Error::Config(format!(
            "sampling_ratio must be within (0, 1], got {ratio}"
        )));
    }
    Ok(())
}
