use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bloomdex_core::{
    hash_terms, Crc32Hasher, DocId, Index, IndexConfig, ShardStats, ShardedConfig, ShardedIndex,
};

#[derive(Parser)]
#[command(name = "bloomdex", about = "bloomdex CLI: build an in-memory bloom index and query it")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Args)]
struct IndexArgs {
    /// Text file, one document per non-empty line
    #[arg(long)]
    docs: PathBuf,
    /// JSON config (IndexConfig, or ShardedConfig with --sharded)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Shard documents by term count
    #[arg(long, default_value_t = false)]
    sharded: bool,
    /// Target false-positive rate (sharded only)
    #[arg(long, default_value_t = 0.01)]
    fpr: f64,
    #[arg(long, default_value_t = 256)]
    block_bits: usize,
    /// Defaults to block_bits * 64
    #[arg(long)]
    meta_bits: Option<usize>,
    #[arg(long, default_value_t = 4)]
    hashes: u32,
}

#[derive(Subcommand)]
enum Cmd {
    Query {
        #[command(flatten)]
        index: IndexArgs,
        /// Print hits as a JSON array
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Query terms (all must match)
        #[arg(required = true, num_args = 1..)]
        terms: Vec<String>,
    },

    Stats {
        #[command(flatten)]
        index: IndexArgs,
    },
}

enum Built {
    Flat(Index),
    Sharded(ShardedIndex),
}

impl Built {
    fn query(&self, terms: &[u32]) -> Vec<DocId> {
        match self {
            Built::Flat(idx) => idx.query(terms),
            Built::Sharded(sx) => sx.query(terms),
        }
    }
}

#[derive(Serialize)]
struct Hit<'a> {
    id: DocId,
    text: &'a str,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum StatsReport {
    Flat {
        config: IndexConfig,
        documents: u64,
        blocks: usize,
        meta_blocks: usize,
        memory_bytes: usize,
        kernel: &'static str,
    },
    Sharded {
        config: ShardedConfig,
        documents: u64,
        shards: Vec<ShardStats>,
    },
}

fn load_docs(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(text.lines().filter(|l| !l.trim().is_empty()).map(str::to_owned).collect())
}

fn build(args: &IndexArgs, docs: &[String]) -> Result<Built> {
    let built = if args.sharded {
        let cfg = match &args.config {
            Some(p) => ShardedConfig::from_json_file(p)?,
            None => ShardedConfig::new(args.fpr, args.hashes),
        };
        let mut sx = ShardedIndex::new(cfg)?;
        for d in docs {
            sx.add_document(&hash_terms(&Crc32Hasher, d))?;
        }
        Built::Sharded(sx)
    } else {
        let cfg = match &args.config {
            Some(p) => IndexConfig::from_json_file(p)?,
            None => {
                let cfg = IndexConfig::new(args.block_bits, args.hashes);
                match args.meta_bits {
                    Some(m) => cfg.with_meta_bits(m),
                    None => cfg,
                }
            }
        };
        let mut idx = Index::new(cfg)?;
        for d in docs {
            idx.add_document(&hash_terms(&Crc32Hasher, d));
        }
        Built::Flat(idx)
    };
    info!(documents = docs.len(), sharded = args.sharded, "index built");
    Ok(built)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Query { index, json, terms } => {
            let docs = load_docs(&index.docs)?;
            let built = build(&index, &docs)?;
            let q = hash_terms(&Crc32Hasher, &terms.join(" "));
            if q.is_empty() {
                return Err(anyhow!("query has no terms"));
            }
            let ids = built.query(&q);
            if json {
                let hits: Vec<Hit> = ids.iter().map(|&id| Hit { id, text: &docs[id as usize] }).collect();
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else {
                for id in ids {
                    println!("{id}\t{}", docs[id as usize]);
                }
            }
        }

        Cmd::Stats { index } => {
            let docs = load_docs(&index.docs)?;
            let report = match build(&index, &docs)? {
                Built::Flat(idx) => StatsReport::Flat {
                    config: *idx.config(),
                    documents: idx.len(),
                    blocks: idx.num_blocks(),
                    meta_blocks: idx.num_meta_blocks(),
                    memory_bytes: idx.memory_bytes(),
                    kernel: idx.kernel().name(),
                },
                Built::Sharded(sx) => StatsReport::Sharded {
                    config: *sx.config(),
                    documents: sx.len(),
                    shards: sx.stats(),
                },
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
