//! Benchmarks for forest training and inference over the 11-wide layout.

use botdetect::primitives::Matrix;
use botdetect::traits::Classifier;
use botdetect::tree::RandomForestClassifier;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WIDTH: usize = 11;

/// Two noisy, overlapping classes in `[0, 1]`.
fn dataset(n: usize, seed: u64) -> (Matrix<f32>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(n * WIDTH);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let label = i % 2;
        let center = if label == 1 { 0.65 } else { 0.35 };
        for _ in 0..WIDTH {
            data.push((center + rng.gen_range(-0.3f32..0.3)).clamp(0.0, 1.0));
        }
        labels.push(label);
    }
    let x = Matrix::from_vec(n, WIDTH, data).expect("n * WIDTH values");
    (x, labels)
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest_fit");
    group.sample_size(10);

    let (x, y) = dataset(500, 42);
    for &n_jobs in &[1, 2, 4] {
        group.throughput(Throughput::Elements(x.n_rows() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n_jobs), &n_jobs, |b, &n_jobs| {
            b.iter(|| {
                let mut forest = RandomForestClassifier::new(50)
                    .with_n_jobs(n_jobs)
                    .with_random_state(7);
                forest.fit(black_box(&x), black_box(&y)).expect("fit");
                forest
            });
        });
    }

    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest_predict");

    let (x, y) = dataset(500, 42);
    let mut forest = RandomForestClassifier::new(100).with_random_state(7);
    forest.fit(&x, &y).expect("fit");

    for &rows in &[10, 100, 1000] {
        let (batch, _) = dataset(rows, 99);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &batch, |b, batch| {
            b.iter(|| forest.predict(black_box(batch)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fit, bench_predict);
criterion_main!(benches);
