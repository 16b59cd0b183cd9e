//! Term-count sharding over flat indexes.
//!
//! A document with `c` terms lands in shard `log2(next_power_of_two(c))`
//! (clamped to the last slot). Each shard is an `Index` whose block width is
//! sized for that term count at the target false-positive rate, created the
//! first time a document is routed to it and never resized afterwards.

use crate::config::{IndexConfig, ShardedConfig};
use crate::consts::SHARD_COUNT;
use crate::errors::Result;
use crate::index::Index;
use crate::kernel::Kernel;
use crate::DocId;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone)]
struct Shard {
    index: Index,
    // shard-local id -> global id
    global_ids: Vec<DocId>,
}

impl Shard {
    fn query(&self, terms: &[u32]) -> Vec<DocId> {
        self.index.query(terms).into_iter().map(|local| self.global_ids[local as usize]).collect()
    }
}

#[derive(Debug, Clone)]
enum ShardSlot {
    Uninit,
    Ready(Shard),
}

impl ShardSlot {
    fn get_or_try_init(&mut self, init: impl FnOnce() -> Result<Shard>) -> Result<&mut Shard> {
        if let ShardSlot::Uninit = self {
            *self = ShardSlot::Ready(init()?);
        }
        match self {
            ShardSlot::Ready(shard) => Ok(shard),
            ShardSlot::Uninit => unreachable!("shard initialised above"),
        }
    }

    fn query(&self, terms: &[u32]) -> Vec<DocId> {
        match self {
            ShardSlot::Uninit => Vec::new(),
            ShardSlot::Ready(shard) => shard.query(terms),
        }
    }
}

/// Per-shard numbers for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardStats {
    pub shard: usize,
    pub block_bits: usize,
    pub meta_bits: usize,
    pub documents: u64,
    pub blocks: usize,
    pub memory_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct ShardedIndex {
    config: ShardedConfig,
    kernel: Kernel,
    shards: Vec<ShardSlot>,
    next_id: DocId,
}

impl ShardedIndex {
    pub fn new(config: ShardedConfig) -> Result<Self> {
        Self::with_kernel(config, Kernel::detect())
    }

    pub fn with_kernel(config: ShardedConfig, kernel: Kernel) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            kernel,
            shards: (0..SHARD_COUNT).map(|_| ShardSlot::Uninit).collect(),
            next_id: 0,
        })
    }

    pub fn config(&self) -> &ShardedConfig { &self.config }

    /// Shard slot for a document with `term_count` terms.
    pub fn shard_index_for(term_count: usize) -> usize {
        term_count
            .max(1)
            .checked_next_power_of_two()
            .map_or(SHARD_COUNT - 1, |c| (c.trailing_zeros() as usize).min(SHARD_COUNT - 1))
    }

    pub fn len(&self) -> u64 { self.next_id }

    pub fn is_empty(&self) -> bool { self.next_id == 0 }

    /// The shard's index, if any document has been routed to it yet.
    pub fn shard(&self, i: usize) -> Option<&Index> {
        match self.shards.get(i)? {
            ShardSlot::Uninit => None,
            ShardSlot::Ready(shard) => Some(&shard.index),
        }
    }

    /// Route the document to its shard and return its global id.
    ///
    /// Fails only when the shard has to be created and its width cannot be
    /// represented.
    pub fn add_document(&mut self, terms: &[u32]) -> Result<DocId> {
        let s = Self::shard_index_for(terms.len());
        let (config, kernel) = (self.config, self.kernel);
        let shard = self.shards[s].get_or_try_init(|| {
            let cfg: IndexConfig = config.index_config_for(terms.len())?;
            debug!(shard = s, block_bits = cfg.block_bits, meta_bits = cfg.meta_bits, "shard created");
            Ok(Shard { index: Index::with_kernel(cfg, kernel)?, global_ids: Vec::new() })
        })?;

        let global = self.next_id;
        let local = shard.index.add_document(terms);
        debug_assert_eq!(local as usize, shard.global_ids.len());
        shard.global_ids.push(global);
        self.next_id += 1;
        Ok(global)
    }

    /// Global ids of every candidate match, concatenated in shard order;
    /// ascending within a shard.
    pub fn query(&self, terms: &[u32]) -> Vec<DocId> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            let per_shard: Vec<Vec<DocId>> = self.shards.par_iter().map(|slot| slot.query(terms)).collect();
            per_shard.concat()
        }
        #[cfg(not(feature = "parallel"))]
        {
            self.shards.iter().flat_map(|slot| slot.query(terms)).collect()
        }
    }

    pub fn stats(&self) -> Vec<ShardStats> {
        self.shards
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                ShardSlot::Uninit => None,
                ShardSlot::Ready(shard) => Some(ShardStats {
                    shard: i,
                    block_bits: shard.index.config().block_bits,
                    meta_bits: shard.index.config().meta_bits,
                    documents: shard.index.len(),
                    blocks: shard.index.num_blocks(),
                    memory_bytes: shard.index.memory_bytes(),
                }),
            })
            .collect()
    }
}
