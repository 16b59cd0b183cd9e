//! Approximate full-text search over bloom signatures.
//!
//! Documents are sets of 32-bit term hashes. A query returns every document
//! whose signature covers the query's bits: no false negatives, a tunable
//! rate of false positives.

pub mod bitrow;
pub mod block;
pub mod config;
pub mod consts;
pub mod errors;
pub mod hash;
pub mod index;
pub mod kernel;
pub mod sharded;
pub mod utils;

/// Dense, insertion-ordered document id.
pub type DocId = u64;

pub use bitrow::{popset, BitRow};
pub use block::Block;
pub use config::{bits_needed, IndexConfig, ShardedConfig};
pub use errors::{BloomError, Result};
pub use index::Index;
pub use kernel::Kernel;
pub use sharded::{ShardStats, ShardedIndex};
pub use utils::{hash_terms, Crc32Hasher, TermHasher};
