//! Output records emitted by derivation and prediction.

use serde::{Deserialize, Serialize};

/// A frequent itemset with its occurrence statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsetRecord {
    /// Canonical item strings, consequents first.
    pub items: Vec<String>,

    /// Number of ingested transactions containing the itemset.
    pub occurrences: u64,

    /// `occurrences / total_transactions`.
    pub support: f64,

    /// Itemset cardinality.
    pub length: usize,
}

/// A derived association rule with its statistical measures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// Left-hand side items; empty for consequent-frequency rules.
    pub antecedents: Vec<String>,

    /// Right-hand side items, a subset of the declared consequents.
    pub consequents: Vec<String>,

    /// Occurrences of the full rule itemset.
    pub occurrences: u64,

    /// Occurrences of the antecedent set alone (total transactions
    /// when the antecedent set is empty).
    pub occurrences_antecedents: u64,

    /// Occurrences of the consequent set alone.
    pub occurrences_consequents: u64,

    /// `occurrences / total_transactions`.
    pub support: f64,

    /// `occurrences / occurrences_antecedents`; 0 when the
    /// denominator is 0.
    pub confidence: f64,

    /// `support / (support_antecedents * support_consequents)`; 0
    /// when either factor is 0.
    pub lift: f64,

    /// `antecedents.len() + consequents.len()`.
    pub rule_length: usize,
}

/// A scored consequent candidate for a partial transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// The consequent item.
    pub consequent: String,

    /// Confidence of the consequent given the queried antecedents.
    pub score: f64,
}

/// Summary statistics of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of ingested transactions.
    pub transactions: u64,

    /// Number of trie nodes, including the root.
    pub nodes: usize,

    /// Number of interned symbols.
    pub symbols: usize,

    /// Number of registered common-sense rules.
    pub common_sense_rules: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_record_serde_roundtrip() {
        let rule = RuleRecord {
            antecedents: vec!["milk".into()],
            consequents: vec!["bread".into()],
            occurrences: 2,
            occurrences_antecedents: 2,
            occurrences_consequents: 3,
            support: 0.4,
            confidence: 1.0,
            lift: 5.0 / 3.0,
            rule_length: 2,
        };
        let json = serde_json::to_string(&rule).unwrap();
        let back: RuleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(rule, back);
    }

    #[test]
    fn test_itemset_record_fields_serialize_by_name() {
        let record = ItemsetRecord {
            items: vec!["bread".into(), "milk".into()],
            occurrences: 2,
            support: 0.4,
            length: 2,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["occurrences"], 2);
        assert_eq!(value["length"], 2);
    }
}
