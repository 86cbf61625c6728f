//! Item normalization and symbol interning.
//!
//! Normalization is two-phase: [`Normalizer::prepare`] validates and
//! computes the canonical text plus key bytes without touching any
//! state, and [`SymbolTable::intern`] allocates the id. Ingestion
//! prepares every item of a transaction before interning any of them,
//! so a failing transaction leaves the table untouched.

use crate::alphabet::AlphabetCodec;
use am_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Dense index of an interned item.
///
/// Consequents are interned first at construction, so they occupy
/// ids `0..consequent_count` in declared order. The canonical path
/// layout of any itemset is therefore ascending-id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Wrap a raw id (used when loading persisted state).
    pub fn from_u32(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw id value.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// The id as a table index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An item that passed normalization but has not been interned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedItem {
    text: String,
    key: Vec<u8>,
}

impl PreparedItem {
    /// The canonical display form.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The table key bytes (codec-packed or UTF-8).
    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

/// Canonicalizes raw items into table keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    case_insensitive: bool,
    normalize_whitespace: bool,
    codec: Option<AlphabetCodec>,
}

impl Normalizer {
    /// Build a normalizer; the alphabet, when given, must be valid.
    pub fn new(
        case_insensitive: bool,
        normalize_whitespace: bool,
        item_alphabet: Option<&str>,
    ) -> Result<Self> {
        let codec = item_alphabet.map(AlphabetCodec::new).transpose()?;
        Ok(Self {
            case_insensitive,
            normalize_whitespace,
            codec,
        })
    }

    /// Canonicalize a raw item without interning it.
    ///
    /// Applies whitespace normalization, then case folding, then the
    /// alphabet codec. Fails with [`Error::InvalidItem`] for items
    /// that are empty after normalization or contain characters
    /// outside the declared alphabet.
    pub fn prepare(&self, raw: &str) -> Result<PreparedItem> {
        let mut text = if self.normalize_whitespace {
            raw.split_whitespace().collect::<Vec<_>>().join(" ")
        } else {
            raw.to_string()
        };
        if self.case_insensitive {
            text = text.to_lowercase();
        }
        if text.is_empty() {
            return Err(Error::invalid_item(raw, "empty after normalization"));
        }
        let key = match &self.codec {
            Some(codec) => codec.encode(&text)?,
            None => text.as_bytes().to_vec(),
        };
        Ok(PreparedItem { text, key })
    }

    /// Whether an alphabet codec is configured.
    pub fn has_codec(&self) -> bool {
        self.codec.is_some()
    }
}

/// Interning table mapping normalized key bytes to dense symbol ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    by_key: HashMap<Vec<u8>, SymbolId>,
    texts: Vec<String>,
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of interned symbols.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Look up a prepared item without interning.
    pub fn get(&self, item: &PreparedItem) -> Option<SymbolId> {
        self.by_key.get(item.key()).copied()
    }

    /// Intern a prepared item, allocating the next id on first sight.
    pub fn intern(&mut self, item: &PreparedItem) -> SymbolId {
        if let Some(&id) = self.by_key.get(item.key()) {
            return id;
        }
        let id = SymbolId(self.texts.len() as u32);
        self.by_key.insert(item.key().to_vec(), id);
        self.texts.push(item.text().to_string());
        id
    }

    /// Canonical display text of a symbol.
    pub fn text(&self, id: SymbolId) -> &str {
        &self.texts[id.index()]
    }

    /// Iterate symbols in id order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &str)> {
        self.texts
            .iter()
            .enumerate()
            .map(|(i, text)| (SymbolId(i as u32), text.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Normalizer {
        Normalizer::new(true, true, None).unwrap()
    }

    #[test]
    fn test_prepare_folds_case_and_whitespace() {
        let norm = plain();
        let item = norm.prepare("  Father   SMOKES ").unwrap();
        assert_eq!(item.text(), "father smokes");
        assert_eq!(item.key(), b"father smokes");
    }

    #[test]
    fn test_prepare_respects_flags() {
        let norm = Normalizer::new(false, false, None).unwrap();
        let item = norm.prepare("  Father   SMOKES ").unwrap();
        assert_eq!(item.text(), "  Father   SMOKES ");
    }

    #[test]
    fn test_prepare_rejects_empty() {
        let norm = plain();
        assert!(matches!(
            norm.prepare(""),
            Err(Error::InvalidItem { .. })
        ));
        assert!(matches!(
            norm.prepare("   "),
            Err(Error::InvalidItem { .. })
        ));

        // Without whitespace normalization a blank item survives to
        // the emptiness check only if it is truly empty.
        let norm = Normalizer::new(true, false, None).unwrap();
        assert!(norm.prepare("   ").is_ok());
        assert!(norm.prepare("").is_err());
    }

    #[test]
    fn test_prepare_with_codec_keys() {
        let norm = Normalizer::new(true, true, Some("abc=01 ")).unwrap();
        let item = norm.prepare("Ab=1").unwrap();
        assert_eq!(item.text(), "ab=1");
        assert_ne!(item.key(), b"ab=1");

        // Case folding happens before the codec, so uppercase input
        // over a lowercase alphabet is fine; a truly foreign
        // character is not.
        assert!(matches!(
            norm.prepare("xyz"),
            Err(Error::InvalidItem { .. })
        ));
    }

    #[test]
    fn test_intern_is_idempotent_and_dense() {
        let norm = plain();
        let mut table = SymbolTable::new();

        let bread = table.intern(&norm.prepare("bread").unwrap());
        let milk = table.intern(&norm.prepare("Milk").unwrap());
        let bread_again = table.intern(&norm.prepare("  BREAD ").unwrap());

        assert_eq!(bread, SymbolId(0));
        assert_eq!(milk, SymbolId(1));
        assert_eq!(bread_again, bread);
        assert_eq!(table.len(), 2);
        assert_eq!(table.text(bread), "bread");
        assert_eq!(table.text(milk), "milk");
    }

    #[test]
    fn test_get_does_not_intern() {
        let norm = plain();
        let mut table = SymbolTable::new();
        let item = norm.prepare("beer").unwrap();

        assert_eq!(table.get(&item), None);
        assert_eq!(table.len(), 0);

        let id = table.intern(&item);
        assert_eq!(table.get(&item), Some(id));
    }

    #[test]
    fn test_iter_in_id_order() {
        let norm = plain();
        let mut table = SymbolTable::new();
        for raw in ["c", "a", "b"] {
            table.intern(&norm.prepare(raw).unwrap());
        }
        let texts: Vec<_> = table.iter().map(|(_, t)| t).collect();
        assert_eq!(texts, vec!["c", "a", "b"]);
    }
}
