//! Benchmarks over the 16-piece reference puzzle.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use edgematch::index::DenseIndex;
use edgematch::layout::{EdgeClass, EdgeLayout};
use edgematch::solver::{self, Options};
use edgematch::validate::sample_pieces;
use edgematch::{PieceSet, RotationTable};

/// Benchmark the full pipeline at 1x1 tiles.
fn bench_solve_flat(c: &mut Criterion) {
    let pieces = sample_pieces();
    c.bench_function("solve_4x4_flat", |b| {
        b.iter(|| solver::solve(black_box(&pieces), &Options::new(4, 4)).unwrap())
    });
}

/// Benchmark the full pipeline with the 2x2 cascade.
fn bench_solve_cascaded(c: &mut Criterion) {
    let pieces = sample_pieces();
    let mut opts = Options::new(4, 4);
    opts.max_tile_area = 4;
    c.bench_function("solve_4x4_2x2_cascade", |b| {
        b.iter(|| solver::solve(black_box(&pieces), &opts).unwrap())
    });
}

/// Benchmark rotation generation alone.
fn bench_generate_rotations(c: &mut Criterion) {
    let pieces: PieceSet = sample_pieces();
    c.bench_function("generate_rotations", |b| {
        b.iter(|| {
            let mut table: RotationTable<DenseIndex, 1> =
                RotationTable::new(EdgeLayout::base(EdgeClass::E8));
            black_box(&pieces).generate_rotations(&mut table);
            table.len()
        })
    });
}

criterion_group!(
    benches,
    bench_solve_flat,
    bench_solve_cascaded,
    bench_generate_rotations
);
criterion_main!(benches);
