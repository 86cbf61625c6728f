//! Bundle reader.

use crate::format::{
    BundleHeader, BUNDLE_MAGIC, BUNDLE_SCHEMA_VERSION, ROOT_SYMBOL_SENTINEL, TRIE_ENTRY_BYTES,
};
use crate::{BundleError, Result};
use am_core::{PreorderEntry, RuleIndex, SymbolId, Trie};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

/// Loads rule indexes from the versioned bundle format.
pub struct BundleReader;

impl BundleReader {
    /// Load an index from bundle bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<RuleIndex> {
        if bytes.len() < 12 {
            return Err(BundleError::Truncated("frame header"));
        }
        if bytes[0..4] != BUNDLE_MAGIC {
            return Err(BundleError::BadMagic);
        }
        let version = u32::from_le_bytes(bytes[4..8].try_into().expect("sized slice"));
        if version != BUNDLE_SCHEMA_VERSION {
            return Err(BundleError::SchemaMismatch {
                found: version,
                supported: BUNDLE_SCHEMA_VERSION,
            });
        }
        let header_len =
            u32::from_le_bytes(bytes[8..12].try_into().expect("sized slice")) as usize;
        let Some(header_bytes) = bytes.get(12..12 + header_len) else {
            return Err(BundleError::Truncated("header"));
        };
        let header: BundleHeader = serde_json::from_slice(header_bytes)?;

        let trie_bytes = &bytes[12 + header_len..];
        let expected_len = (header.node_count as usize).checked_mul(TRIE_ENTRY_BYTES);
        match expected_len {
            Some(len) if len == trie_bytes.len() => {}
            Some(len) if len > trie_bytes.len() => {
                return Err(BundleError::Truncated("trie section"))
            }
            _ => {
                return Err(BundleError::Corrupted(format!(
                    "trie section has {} bytes for {} declared nodes",
                    trie_bytes.len(),
                    header.node_count
                )))
            }
        }

        let actual = hex::encode(Sha256::digest(trie_bytes));
        if actual != header.trie_sha256 {
            return Err(BundleError::ChecksumMismatch {
                expected: header.trie_sha256.clone(),
                actual,
            });
        }

        let trie = decode_trie(&header, trie_bytes)?;
        let common_sense = header
            .common_sense
            .into_iter()
            .map(|entry| entry.into_rule())
            .collect();
        let index = RuleIndex::from_parts(header.options, &header.symbols, common_sense, trie)
            .map_err(|err| BundleError::Corrupted(err.to_string()))?;

        info!(
            nodes = index.trie().node_count(),
            symbols = index.symbols().len(),
            "bundle loaded"
        );
        Ok(index)
    }

    /// Load an index from a bundle file.
    pub fn open(path: &Path) -> Result<RuleIndex> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

fn decode_trie(header: &BundleHeader, trie_bytes: &[u8]) -> Result<Trie> {
    let entries = trie_bytes.chunks_exact(TRIE_ENTRY_BYTES).map(|chunk| {
        let symbol = u32::from_le_bytes(chunk[0..4].try_into().expect("sized slice"));
        let occurrences = u64::from_le_bytes(chunk[4..12].try_into().expect("sized slice"));
        let child_count = u32::from_le_bytes(chunk[12..16].try_into().expect("sized slice"));
        PreorderEntry {
            symbol: (symbol != ROOT_SYMBOL_SENTINEL).then(|| SymbolId::from_u32(symbol)),
            occurrences,
            child_count,
        }
    });
    Trie::from_preorder(
        header.options.consequents.len(),
        header.symbols.len(),
        entries,
    )
    .map_err(BundleError::Corrupted)
}
