use bloomdex_core::{popset, BitRow, Index, IndexConfig, Kernel, ShardedConfig, ShardedIndex};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_docs(n: usize, vocab: u32, seed: u64) -> Vec<Vec<u32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..rng.random_range(4..64)).map(|_| rng.random_range(0..vocab)).collect())
        .collect()
}

fn bench_kernels(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let rows: Vec<BitRow> = (0..1024)
        .map(|_| {
            let mut r = BitRow::ZERO;
            for w in r.0.iter_mut() {
                *w = rng.random::<u64>() | rng.random::<u64>() | rng.random::<u64>();
            }
            r
        })
        .collect();
    let positions: Vec<u32> = (0..16).map(|_| rng.random_range(0..1024)).collect();
    for k in Kernel::all_available() {
        c.bench_function(&format!("intersect_{}", k.name()), |b| {
            b.iter(|| {
                let mut acc = BitRow::ONES;
                k.intersect(&mut acc, black_box(&rows), black_box(&positions));
                acc
            })
        });
    }

    let dense = BitRow([0x5555_5555_5555_5555; 8]);
    c.bench_function("popset_half", |b| b.iter(|| popset(black_box(&dense))));
}

fn bench_queries(c: &mut Criterion) {
    let docs = random_docs(50_000, 20_000, 2);
    let mut idx = Index::new(IndexConfig::new(1024, 4)).unwrap();
    let mut sx = ShardedIndex::new(ShardedConfig::new(0.01, 4)).unwrap();
    for d in &docs {
        idx.add_document(d);
        sx.add_document(d).unwrap();
    }
    let q = &docs[777][..2];
    c.bench_function("index_query", |b| b.iter(|| idx.query(black_box(q))));
    c.bench_function("sharded_query", |b| b.iter(|| sx.query(black_box(q))));
    c.bench_function("index_add", |b| {
        b.iter_with_setup(
            || Index::new(IndexConfig::new(1024, 4)).unwrap(),
            |mut fresh| {
                for d in &docs[..1000] {
                    fresh.add_document(d);
                }
                fresh
            },
        )
    });
}

criterion_group!(benches, bench_kernels, bench_queries);
criterion_main!(benches);
