//! Term hashing helpers for callers that index plain text.

pub fn crc32(data: &[u8]) -> u32 { crc32fast::hash(data) }

/// Maps a term to the 32-bit hash the index stores. Must be stable between
/// indexing and querying.
pub trait TermHasher {
    fn hash_term(&self, term: &str) -> u32;
}

/// IEEE CRC-32 of the term's UTF-8 bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32Hasher;

impl TermHasher for Crc32Hasher {
    fn hash_term(&self, term: &str) -> u32 { crc32(term.as_bytes()) }
}

impl<F: Fn(&str) -> u32> TermHasher for F {
    fn hash_term(&self, term: &str) -> u32 { self(term) }
}

/// Whitespace-split `text` and hash every token.
pub fn hash_terms<H: TermHasher + ?Sized>(hasher: &H, text: &str) -> Vec<u32> {
    text.split_whitespace().map(|t| hasher.hash_term(t)).collect()
}
