//! Bijective compact codec over a user-declared character alphabet.
//!
//! With an alphabet of `k` characters, each position is encoded as a
//! `ceil(log2 k)`-bit field packed big-endian behind a character-count
//! prefix. The packed form is used only as the symbol table's key and
//! in persistence; the rest of the engine operates on symbol ids.

use am_common::{Error, Result};
use std::collections::HashMap;

/// Fixed-width bit-packing codec for strings over a declared alphabet.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphabetCodec {
    chars: Vec<char>,
    index: HashMap<char, u32>,
    bits: u32,
}

impl AlphabetCodec {
    /// Build a codec over the given alphabet.
    ///
    /// The alphabet must be non-empty and free of duplicate
    /// characters; character order is significant for the packed
    /// representation but not observable through `encode`/`decode`.
    pub fn new(alphabet: &str) -> Result<Self> {
        if alphabet.is_empty() {
            return Err(Error::Config("item alphabet must not be empty".into()));
        }
        let mut chars = Vec::new();
        let mut index = HashMap::new();
        for ch in alphabet.chars() {
            if index.insert(ch, chars.len() as u32).is_some() {
                return Err(Error::Config(format!(
                    "item alphabet contains duplicate character {ch:?}"
                )));
            }
            chars.push(ch);
        }
        let bits = bits_for(chars.len());
        Ok(Self { chars, index, bits })
    }

    /// Number of bits each character occupies in the packed form.
    pub fn bits_per_symbol(&self) -> u32 {
        self.bits
    }

    /// Number of characters in the alphabet.
    pub fn alphabet_len(&self) -> usize {
        self.chars.len()
    }

    /// Pack a string into its compact byte form.
    ///
    /// Fails with [`Error::InvalidItem`] when the string contains a
    /// character outside the alphabet.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let count = text.chars().count() as u32;
        let mut out =
            Vec::with_capacity(4 + (count as usize * self.bits as usize).div_ceil(8));
        out.extend_from_slice(&count.to_le_bytes());

        let mut acc: u64 = 0;
        let mut pending: u32 = 0;
        for ch in text.chars() {
            let code = *self.index.get(&ch).ok_or_else(|| {
                Error::invalid_item(text, format!("character {ch:?} is outside the alphabet"))
            })?;
            acc = (acc << self.bits) | u64::from(code);
            pending += self.bits;
            while pending >= 8 {
                pending -= 8;
                out.push((acc >> pending) as u8);
            }
        }
        if pending > 0 {
            // Left-align the final partial byte.
            out.push((acc << (8 - pending)) as u8);
        }
        Ok(out)
    }

    /// Recover the original string from its packed form.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        if bytes.len() < 4 {
            return Err(Error::invalid_item(
                "<packed>",
                "packed buffer shorter than its length prefix",
            ));
        }
        let count = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let payload = &bytes[4..];
        let needed = (count * self.bits as usize).div_ceil(8);
        if payload.len() != needed {
            return Err(Error::invalid_item(
                "<packed>",
                format!(
                    "packed buffer has {} payload bytes, expected {needed}",
                    payload.len()
                ),
            ));
        }

        let mut out = String::with_capacity(count);
        let mut acc: u64 = 0;
        let mut pending: u32 = 0;
        let mut cursor = 0usize;
        for _ in 0..count {
            while pending < self.bits {
                acc = (acc << 8) | u64::from(payload[cursor]);
                cursor += 1;
                pending += 8;
            }
            pending -= self.bits;
            let code = ((acc >> pending) & ((1u64 << self.bits) - 1)) as usize;
            acc &= (1u64 << pending) - 1;
            let ch = *self.chars.get(code).ok_or_else(|| {
                Error::invalid_item("<packed>", format!("field value {code} is outside the alphabet"))
            })?;
            out.push(ch);
        }
        Ok(out)
    }
}

/// Bits needed to address `len` distinct codes; at least 1.
fn bits_for(len: usize) -> u32 {
    let mut bits = usize::BITS - (len - 1).leading_zeros();
    if bits == 0 {
        bits = 1;
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_for() {
        assert_eq!(bits_for(1), 1);
        assert_eq!(bits_for(2), 1);
        assert_eq!(bits_for(3), 2);
        assert_eq!(bits_for(4), 2);
        assert_eq!(bits_for(5), 3);
        assert_eq!(bits_for(16), 4);
        assert_eq!(bits_for(17), 5);
    }

    #[test]
    fn test_rejects_bad_alphabets() {
        assert!(AlphabetCodec::new("").is_err());
        assert!(AlphabetCodec::new("abca").is_err());
    }

    #[test]
    fn test_encode_rejects_foreign_characters() {
        let codec = AlphabetCodec::new("abc").unwrap();
        let err = codec.encode("abd").unwrap_err();
        assert!(matches!(err, Error::InvalidItem { .. }));
    }

    #[test]
    fn test_roundtrip_small_alphabet() {
        let codec = AlphabetCodec::new("abc").unwrap();
        assert_eq!(codec.bits_per_symbol(), 2);
        for text in ["", "a", "c", "abcabc", "ccccbbbbaaaa"] {
            let packed = codec.encode(text).unwrap();
            assert_eq!(codec.decode(&packed).unwrap(), text);
        }
    }

    #[test]
    fn test_roundtrip_single_char_alphabet() {
        let codec = AlphabetCodec::new("x").unwrap();
        assert_eq!(codec.bits_per_symbol(), 1);
        let packed = codec.encode("xxxxx").unwrap();
        assert_eq!(codec.decode(&packed).unwrap(), "xxxxx");
    }

    #[test]
    fn test_packing_is_compact() {
        // 8 chars over a 4-symbol alphabet pack into 2 bits each:
        // 4 length-prefix bytes plus 2 payload bytes.
        let codec = AlphabetCodec::new("acgt").unwrap();
        let packed = codec.encode("acgtacgt").unwrap();
        assert_eq!(packed.len(), 6);
    }

    #[test]
    fn test_distinct_strings_pack_distinctly() {
        let codec = AlphabetCodec::new("ab01=").unwrap();
        let texts = ["a=0", "a=1", "b=0", "b=1", "ab", "ba", "a", "b"];
        let mut seen = std::collections::HashSet::new();
        for text in texts {
            assert!(seen.insert(codec.encode(text).unwrap()), "collision for {text:?}");
        }
    }

    #[test]
    fn test_decode_rejects_malformed_buffers() {
        let codec = AlphabetCodec::new("abc").unwrap();
        assert!(codec.decode(&[1, 0]).is_err());

        let mut packed = codec.encode("abc").unwrap();
        packed.pop();
        assert!(codec.decode(&packed).is_err());

        let mut packed = codec.encode("abc").unwrap();
        packed.push(0);
        assert!(codec.decode(&packed).is_err());
    }

    #[test]
    fn test_decode_rejects_out_of_range_field() {
        // Alphabet of 3 uses 2-bit fields; code 3 is unused.
        let codec = AlphabetCodec::new("abc").unwrap();
        let bad = vec![1, 0, 0, 0, 0b1100_0000];
        assert!(codec.decode(&bad).is_err());
    }

    #[test]
    fn test_unicode_alphabet() {
        let codec = AlphabetCodec::new("αβγδ").unwrap();
        let packed = codec.encode("γβα").unwrap();
        assert_eq!(codec.decode(&packed).unwrap(), "γβα");
    }
}
