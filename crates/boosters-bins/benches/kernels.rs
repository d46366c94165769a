//! Component benchmarks: histogram construction and split routing throughput.

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use boosters_bins::{BinData, HistogramEntry, SplitThreshold};

fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .warm_up_time(Duration::from_secs(3))
        .measurement_time(Duration::from_secs(10))
        .sample_size(20)
}

fn random_bins(rows: usize, num_bins: u32, seed: u64) -> BinData {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bins = BinData::for_num_bins(num_bins, rows);
    for row in 0..rows {
        bins.push(row, rng.gen_range(0..num_bins));
    }
    bins
}

/// Half of the rows, shuffled, as a node's index set would look deep in a tree.
fn random_node(rows: usize, seed: u64) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<u32> = (0..rows as u32).filter(|_| rng.gen_bool(0.5)).collect();
    indices.shuffle(&mut rng);
    indices
}

fn bench_histogram(c: &mut Criterion) {
    let mut group = c.benchmark_group("component/histogram");

    for (rows, num_bins) in [(100_000usize, 256u32), (100_000, 4096)] {
        let bins = random_bins(rows, num_bins, 42);
        let node = random_node(rows, 7);
        let grad = vec![0.5f32; rows];
        let hess = vec![1.0f32; rows];
        let mut histogram = vec![HistogramEntry::default(); num_bins as usize];

        group.throughput(Throughput::Elements(rows as u64));
        group.bench_function(BenchmarkId::new("full", format!("{rows}x{num_bins}")), |b| {
            b.iter(|| {
                bins.construct_histogram_full(rows, black_box(&grad), black_box(&hess), &mut histogram);
            })
        });

        group.throughput(Throughput::Elements(node.len() as u64));
        group.bench_function(BenchmarkId::new("indexed", format!("{rows}x{num_bins}")), |b| {
            b.iter(|| {
                bins.construct_histogram(black_box(&node), &grad[..node.len()], &hess[..node.len()], &mut histogram);
            })
        });
        group.bench_function(BenchmarkId::new("indexed_gradients", format!("{rows}x{num_bins}")), |b| {
            b.iter(|| {
                bins.construct_histogram_gradients(black_box(&node), &grad[..node.len()], &mut histogram);
            })
        });
    }

    group.finish();
}

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("component/split");

    let rows = 100_000usize;
    let bins = random_bins(rows, 256, 42);
    let node = random_node(rows, 7);
    let mut lte = vec![0u32; node.len()];
    let mut gt = vec![0u32; node.len()];
    let split = SplitThreshold::builder()
        .min_bin(0)
        .max_bin(255)
        .threshold(128)
        .build()
        .expect("valid threshold");

    group.throughput(Throughput::Elements(node.len() as u64));
    group.bench_function("numerical/256", |b| {
        b.iter(|| black_box(bins.split(&split, black_box(&node), &mut lte, &mut gt)))
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = default_criterion();
    targets = bench_histogram, bench_split
}
criterion_main!(benches);
