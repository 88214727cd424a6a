//! Benchmarks for the state-vector transform kernel
//!
//! Run with: cargo bench -p alsvid-sim

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

use alsvid_ir::QubitId;
use alsvid_sim::Environment;

fn hadamard() -> [[Complex64; 2]; 2] {
    let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
    [[h, h], [h, -h]]
}

fn cx_matrix() -> [[Complex64; 4]; 4] {
    let zero = Complex64::new(0.0, 0.0);
    let one = Complex64::new(1.0, 0.0);
    [
        [one, zero, zero, zero],
        [zero, zero, zero, one],
        [zero, zero, one, zero],
        [zero, one, zero, zero],
    ]
}

/// Benchmark the single-qubit transform at different register sizes.
fn bench_apply_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_single");
    let matrix = hadamard();

    for num_qubits in &[8usize, 12, 16, 20] {
        group.bench_with_input(
            BenchmarkId::new("hadamard", num_qubits),
            num_qubits,
            |b, &n| {
                let mut env = Environment::new(0, n);
                b.iter(|| env.apply_single(black_box(QubitId(0)), black_box(&matrix)));
            },
        );
    }

    group.finish();
}

/// Benchmark the two-qubit transform, including the worst-case qubit pair
/// (lowest and highest position).
fn bench_apply_double(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_double");
    let matrix = cx_matrix();

    for num_qubits in &[8usize, 12, 16, 20] {
        group.bench_with_input(
            BenchmarkId::new("cx_spread", num_qubits),
            num_qubits,
            |b, &n| {
                let mut env = Environment::new(0, n);
                let top = QubitId(u32::try_from(n - 1).unwrap());
                b.iter(|| env.apply_double(black_box(QubitId(0)), black_box(top), black_box(&matrix)));
            },
        );
    }

    group.finish();
}

/// Benchmark a full normalization sweep.
fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for num_qubits in &[12usize, 16, 20] {
        group.bench_with_input(BenchmarkId::new("sweep", num_qubits), num_qubits, |b, &n| {
            let mut env = Environment::new(0, n);
            env.apply_single(QubitId(0), &hadamard());
            b.iter(|| env.normalize());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_apply_single,
    bench_apply_double,
    bench_normalize
);
criterion_main!(benches);
