//! Criterion benchmarks for the Voronoi sweep.
//! Focus sizes: n in {10, 100, 1000, 10000} uniform sites.
//! Results: by default under target/criterion; to store under data/bench, run:
//!   CARGO_TARGET_DIR=data/bench cargo bench -p voronoi

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use voronoi::avl::AvlTree;
use voronoi::geom2::rand::{uniform_sites, Bounds2};
use voronoi::sweep::compute;

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep");
    for &n in &[10usize, 100, 1000, 10_000] {
        group.bench_with_input(BenchmarkId::new("compute_uniform", n), &n, |b, &n| {
            b.iter_batched(
                || uniform_sites(n, Bounds2::centered(100.0), 43),
                |sites| {
                    let _d = compute(&sites).unwrap();
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_avl(c: &mut Criterion) {
    let mut group = c.benchmark_group("avl");
    for &n in &[100usize, 10_000] {
        group.bench_with_input(BenchmarkId::new("insert_remove", n), &n, |b, &n| {
            b.iter(|| {
                let mut t: AvlTree<u64> = AvlTree::new();
                for i in 0..n as u64 {
                    // scrambled keys
                    let _ = t.insert(i.wrapping_mul(0x9e3779b97f4a7c15), |a, b| a.cmp(b));
                }
                for i in 0..n as u64 {
                    let k = i.wrapping_mul(0x9e3779b97f4a7c15);
                    let _ = t.remove(&k, |a, b| a.cmp(b));
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sweep, bench_avl);
criterion_main!(benches);
