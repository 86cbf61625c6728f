//! Versioned binary persistence for ambre rule indexes.
//!
//! A bundle is a single framed blob: the `AMBR` magic, a schema
//! version, a JSON header (configuration, symbol table, common-sense
//! list, trie checksum), and the trie encoded as a preorder stream
//! of fixed-width entries. Loading verifies the magic, the version,
//! the checksum, and the structural integrity of the stream, and
//! reproduces an index equal to the saved one under every public
//! query.
//!
//! # Example
//!
//! ```
//! use am_bundle::{BundleReader, BundleWriter};
//! use am_common::IndexOptions;
//! use am_core::RuleIndex;
//!
//! let mut index = RuleIndex::new(IndexOptions::new(["bread"]))?;
//! index.insert_transaction(["milk", "bread"])?;
//!
//! let bytes = BundleWriter::new(&index).write_to_vec().unwrap();
//! let loaded = BundleReader::from_bytes(&bytes).unwrap();
//! assert_eq!(loaded, index);
//! # Ok::<(), am_common::Error>(())
//! ```

pub mod error;
pub mod format;
pub mod reader;
pub mod writer;

pub use error::{BundleError, Result};
pub use format::{BundleHeader, CommonSenseEntry, BUNDLE_MAGIC, BUNDLE_SCHEMA_VERSION};
pub use reader::BundleReader;
pub use writer::BundleWriter;
