// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use criterion::{criterion_group, criterion_main, Criterion};
use graymc_sparse_sim::{
    execute::{matches_reference, run_decomposition, truth_table},
    QuantumSim,
};
use graymc_synthesis::{decompose, Decomposition, Qubit, StandardGate};

fn mcx(num_controls: u32) -> Decomposition {
    let controls: Vec<Qubit> = (0..num_controls).map(Qubit).collect();
    decompose(
        &StandardGate::X.matrix(),
        &controls,
        &[Qubit(num_controls)],
    )
    .expect("decomposition should succeed")
}

pub fn run_superposed(c: &mut Criterion) {
    let decomposition = mcx(6);
    c.bench_function("Run MCX 6 Controls In Superposition", |b| {
        b.iter(|| {
            let mut sim = QuantumSim::new(None);
            let qs: Vec<usize> = (0..7).map(|_| sim.allocate()).collect();
            for &q in &qs[..6] {
                sim.h(q);
            }
            run_decomposition(&mut sim, &decomposition);
            for q in qs {
                sim.release(q);
            }
        })
    });
}

pub fn truth_table_mcx(c: &mut Criterion) {
    let decomposition = mcx(4);
    c.bench_function("Truth Table MCX 4 Controls", |b| {
        b.iter(|| truth_table(&decomposition).len())
    });
}

pub fn reference_check(c: &mut Criterion) {
    let x = StandardGate::X.matrix();
    let decomposition = mcx(5);
    c.bench_function("Reference Check MCX 5 Controls", |b| {
        b.iter(|| matches_reference(&decomposition, &x))
    });
}

criterion_group!(benches, run_superposed, truth_table_mcx, reference_check);
criterion_main!(benches);
