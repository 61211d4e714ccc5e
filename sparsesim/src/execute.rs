// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Runs synthesized decompositions on the sparse simulator. Qubit `Qubit(i)` of a decomposition
// is simulator id `i`, so the simulator must have at least `max id + 1` qubits allocated.

use graymc_synthesis::{linalg::adjoint, Decomposition, Instruction, Qubit};
use ndarray::Array2;
use num_complex::Complex64;

use crate::QuantumSim;

/// Largest number of controls for which [`truth_table`] enumerates every assignment.
pub const MAX_TRUTH_TABLE_CONTROLS: usize = 16;

/// Applies the decomposition's instructions in emission order.
/// # Panics
///
/// Panics if a qubit of the decomposition is not allocated in `sim`.
pub fn run_decomposition(sim: &mut QuantumSim, decomposition: &Decomposition) {
    for instruction in decomposition.instructions() {
        match instruction {
            Instruction::Cx { control, target } => sim.mcx(&[control.index()], target.index()),
            Instruction::ControlledUnitary {
                control,
                target,
                matrix,
                ..
            } => sim.mcapply(&[control.index()], &matrix, target.index()),
        }
    }
}

fn allocate_register(sim: &mut QuantumSim, decomposition: &Decomposition) {
    let width = decomposition
        .qubits()
        .map(|qubit| qubit.index() + 1)
        .max()
        .unwrap_or(0);
    while sim.num_qubits() < width {
        let _ = sim.allocate();
    }
}

/// Outcome of running the decomposition on one computational basis assignment of the controls,
/// with every target starting in |0⟩.
#[derive(Debug, Clone, PartialEq)]
pub struct TruthRow {
    /// Bit `i` is the value of control `i`.
    pub assignment: u64,
    /// Probability of measuring each target as 1, in target order.
    pub target_probabilities: Vec<f64>,
    /// Whether every control ended in its starting basis state.
    pub controls_restored: bool,
}

impl TruthRow {
    /// Whether every control of the row is set.
    #[must_use]
    pub fn all_controls_set(&self, num_controls: usize) -> bool {
        self.assignment.count_ones() as usize == num_controls
    }
}

fn run_assignment(decomposition: &Decomposition, assignment: u64) -> TruthRow {
    let mut sim = QuantumSim::new(None);
    allocate_register(&mut sim, decomposition);
    let controls = decomposition.controls();
    for (bit, control) in controls.iter().enumerate() {
        if (assignment >> bit) & 1 == 1 {
            sim.x(control.index());
        }
    }

    run_decomposition(&mut sim, decomposition);

    let controls_restored = controls.iter().enumerate().all(|(bit, control)| {
        let expected = if (assignment >> bit) & 1 == 1 { 1.0 } else { 0.0 };
        (sim.joint_probability(&[control.index()]) - expected).abs() < 1e-9
    });
    let target_probabilities = decomposition
        .targets()
        .iter()
        .map(|target| sim.joint_probability(&[target.index()]))
        .collect();
    TruthRow {
        assignment,
        target_probabilities,
        controls_restored,
    }
}

/// Runs the decomposition once for every basis assignment of the controls.
/// # Panics
///
/// Panics if the decomposition has more than [`MAX_TRUTH_TABLE_CONTROLS`] controls.
#[must_use]
pub fn truth_table(decomposition: &Decomposition) -> Vec<TruthRow> {
    let num_controls = decomposition.controls().len();
    assert!(
        num_controls <= MAX_TRUTH_TABLE_CONTROLS,
        "Truth tables are limited to {MAX_TRUTH_TABLE_CONTROLS} controls, got {num_controls}."
    );
    let rows = (0..1_u64 << num_controls)
        .map(|assignment| run_assignment(decomposition, assignment))
        .collect::<Vec<_>>();
    tracing::debug!(rows = rows.len(), "computed truth table");
    rows
}

/// Checks the decomposition against "apply `u` to every target iff all controls are 1" on a
/// register where every qubit is maximally entangled with a partner. Running the decomposition
/// followed by the reference inverse must return the whole register to |0…0⟩, which only happens
/// when the two unitaries agree on every input.
/// # Panics
///
/// Panics if `u` is not a 2x2 matrix.
#[must_use]
pub fn matches_reference(decomposition: &Decomposition, u: &Array2<Complex64>) -> bool {
    let mut sim = QuantumSim::new(None);
    allocate_register(&mut sim, decomposition);

    let qubits: Vec<usize> = decomposition.qubits().map(Qubit::index).collect();
    let partners: Vec<usize> = qubits.iter().map(|_| sim.allocate()).collect();
    for (&q, &partner) in qubits.iter().zip(&partners) {
        sim.h(partner);
        sim.mcx(&[partner], q);
    }

    run_decomposition(&mut sim, decomposition);

    let controls: Vec<usize> = decomposition.controls().iter().map(|c| c.index()).collect();
    let u_dagger = adjoint(u);
    for target in decomposition.targets() {
        sim.mcapply(&controls, &u_dagger, target.index());
    }

    for (&q, &partner) in qubits.iter().zip(&partners) {
        sim.mcx(&[partner], q);
        sim.h(partner);
    }
    let matches = qubits
        .iter()
        .chain(&partners)
        .all(|&q| sim.qubit_is_zero(q));
    tracing::debug!(matches, "entangled reference check");
    matches
}
