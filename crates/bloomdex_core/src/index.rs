//! Two-level bloom index: blocks of document signatures plus meta-blocks that
//! summarise groups of blocks.
//!
//! Block `b` holds documents `[b * IDS_PER_BLOCK, (b + 1) * IDS_PER_BLOCK)`.
//! Meta-block `j` holds one slot per block in `[j * IDS_PER_BLOCK, (j + 1) * IDS_PER_BLOCK)`;
//! slot `b % IDS_PER_BLOCK` is the OR of every signature in block `b`, at meta width.
//! A query scans meta-blocks first and only visits blocks whose meta slot survives.

use crate::block::Block;
use crate::config::IndexConfig;
use crate::consts::IDS_PER_BLOCK;
use crate::errors::{BloomError, Result};
use crate::hash::{mask_for, DoubleHash};
use crate::kernel::Kernel;
use crate::DocId;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct Index {
    config: IndexConfig,
    block_mask: u32,
    meta_mask: u32,
    kernel: Kernel,
    blocks: Vec<Block>,
    meta: Vec<Block>,
}

impl Index {
    pub fn new(config: IndexConfig) -> Result<Self> {
        Self::with_kernel(config, Kernel::detect())
    }

    /// Same as `new` but pinned to one intersection kernel.
    pub fn with_kernel(config: IndexConfig, kernel: Kernel) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            block_mask: mask_for(config.block_bits),
            meta_mask: mask_for(config.meta_bits),
            kernel,
            blocks: Vec::new(),
            meta: Vec::new(),
        })
    }

    pub fn config(&self) -> &IndexConfig { &self.config }

    pub fn kernel(&self) -> Kernel { self.kernel }

    /// Number of documents added so far.
    pub fn len(&self) -> u64 {
        match self.blocks.last() {
            None => 0,
            Some(last) => ((self.blocks.len() - 1) * IDS_PER_BLOCK + last.num_documents()) as u64,
        }
    }

    pub fn is_empty(&self) -> bool { self.blocks.is_empty() }

    pub fn num_blocks(&self) -> usize { self.blocks.len() }

    pub fn num_meta_blocks(&self) -> usize { self.meta.len() }

    pub fn memory_bytes(&self) -> usize {
        self.blocks.iter().chain(self.meta.iter()).map(Block::memory_bytes).sum()
    }

    /// Add a document with the given term hashes and return its id.
    ///
    /// Ids are dense and start at 0.
    pub fn add_document(&mut self, terms: &[u32]) -> DocId {
        let doc = self.reserve_document();
        self.set_terms(doc, terms);
        doc
    }

    /// Allocate an id without terms; fill it later with `add_terms`.
    pub fn reserve_document(&mut self) -> DocId {
        loop {
            if let Some(blk) = self.blocks.last_mut() {
                if let Ok(slot) = blk.add_document() {
                    let blkid = self.blocks.len() - 1;
                    return (blkid * IDS_PER_BLOCK + slot) as DocId;
                }
            }
            self.push_block();
        }
    }

    /// OR more terms into an existing document's signature.
    pub fn add_terms(&mut self, doc: DocId, terms: &[u32]) -> Result<()> {
        if doc >= self.len() {
            return Err(BloomError::UnknownDocument(doc));
        }
        self.set_terms(doc, terms);
        Ok(())
    }

    fn set_terms(&mut self, doc: DocId, terms: &[u32]) {
        let blkid = (doc / IDS_PER_BLOCK as u64) as usize;
        let slot = (doc % IDS_PER_BLOCK as u64) as usize;
        let block = &mut self.blocks[blkid];
        let meta = &mut self.meta[blkid / IDS_PER_BLOCK];
        let meta_slot = blkid % IDS_PER_BLOCK;

        for &t in terms {
            let dh = DoubleHash::new(t);
            for i in 0..self.config.hashes {
                block.set_bit(slot, dh.nth(i, self.block_mask));
                meta.set_bit(meta_slot, dh.nth(i, self.meta_mask));
            }
        }
    }

    fn push_block(&mut self) {
        let blkid = self.blocks.len();
        if blkid % IDS_PER_BLOCK == 0 {
            self.meta.push(Block::new(self.config.meta_bits));
            debug!(meta_block = self.meta.len() - 1, width = self.config.meta_bits, "meta-block allocated");
        }
        self.blocks.push(Block::new(self.config.block_bits));
        let meta_slot = self.meta[blkid / IDS_PER_BLOCK].add_document();
        debug_assert!(matches!(meta_slot, Ok(s) if s == blkid % IDS_PER_BLOCK));
        debug!(block = blkid, width = self.config.block_bits, "block allocated");
    }

    /// Ids of every document whose signature contains all bits of `terms`,
    /// ascending. May include false positives, never misses a match.
    /// An empty term list matches nothing.
    pub fn query(&self, terms: &[u32]) -> Vec<DocId> {
        let mut docs = Vec::new();
        if terms.is_empty() || self.blocks.is_empty() {
            return docs;
        }

        let k = self.config.hashes;
        let mut bits = Vec::with_capacity(terms.len() * k as usize);
        let mut mbits = Vec::with_capacity(terms.len() * k as usize);
        for &t in terms {
            let dh = DoubleHash::new(t);
            bits.extend(dh.positions(k, self.block_mask));
            mbits.extend(dh.positions(k, self.meta_mask));
        }

        let mut candidates = 0usize;
        for (group, mblk) in self.meta.iter().enumerate() {
            for local in mblk.query_with(self.kernel, &mbits) {
                let b = group * IDS_PER_BLOCK + local;
                candidates += 1;
                for slot in self.blocks[b].query_with(self.kernel, &bits) {
                    docs.push((b * IDS_PER_BLOCK + slot) as DocId);
                }
            }
        }

        trace!(terms = terms.len(), blocks = self.blocks.len(), candidates, hits = docs.len(), "query");
        docs
    }
}
