//! Bundle writer.

use crate::format::{
    BundleHeader, BUNDLE_MAGIC, BUNDLE_SCHEMA_VERSION, ROOT_SYMBOL_SENTINEL, TRIE_ENTRY_BYTES,
};
use crate::Result;
use am_core::RuleIndex;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

/// Serializes a rule index into the versioned bundle format.
pub struct BundleWriter<'a> {
    index: &'a RuleIndex,
}

impl<'a> BundleWriter<'a> {
    /// Create a writer over an index.
    pub fn new(index: &'a RuleIndex) -> Self {
        Self { index }
    }

    /// Serialize the index into a byte vector.
    pub fn write_to_vec(&self) -> Result<Vec<u8>> {
        let trie = self.index.trie();
        let mut trie_bytes = Vec::with_capacity(trie.node_count() * TRIE_ENTRY_BYTES);
        for entry in trie.preorder() {
            let symbol = entry.symbol.map_or(ROOT_SYMBOL_SENTINEL, |s| s.as_u32());
            trie_bytes.extend_from_slice(&symbol.to_le_bytes());
            trie_bytes.extend_from_slice(&entry.occurrences.to_le_bytes());
            trie_bytes.extend_from_slice(&entry.child_count.to_le_bytes());
        }
        let checksum = hex::encode(Sha256::digest(&trie_bytes));

        let header = BundleHeader::for_index(self.index, checksum);
        let header_json = serde_json::to_vec(&header)?;

        let mut out = Vec::with_capacity(12 + header_json.len() + trie_bytes.len());
        out.extend_from_slice(&BUNDLE_MAGIC);
        out.extend_from_slice(&BUNDLE_SCHEMA_VERSION.to_le_bytes());
        out.extend_from_slice(&(header_json.len() as u32).to_le_bytes());
        out.extend_from_slice(&header_json);
        out.extend_from_slice(&trie_bytes);

        info!(
            nodes = trie.node_count(),
            symbols = header.symbols.len(),
            bytes = out.len(),
            "bundle written to memory"
        );
        Ok(out)
    }

    /// Serialize the index to a file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let bytes = self.write_to_vec()?;
        std::fs::write(path, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "bundle written");
        Ok(())
    }
}
