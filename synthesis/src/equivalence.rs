// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Dense unitaries for checking a decomposition against the gate it implements. Controls occupy
//! the low bits of the basis index in the order given, followed by the targets.

use ndarray::Array2;
use num_complex::Complex64;
use rustc_hash::FxHashMap;

use crate::decompose::Decomposition;
use crate::error::{Result, SynthesisError};
use crate::gates::StandardGate;
use crate::linalg::max_abs_diff;
use crate::operation::{Instruction, Qubit};

/// Largest register, controls plus targets, that is expanded into a dense matrix.
pub const MAX_DENSE_QUBITS: usize = 12;

fn check_size(num_qubits: usize) -> Result<()> {
    if num_qubits > MAX_DENSE_QUBITS {
        return Err(SynthesisError::InvalidInput(format!(
            "Dense expansion is limited to {MAX_DENSE_QUBITS} qubits, got {num_qubits}."
        )));
    }
    Ok(())
}

/// Left-multiplies `state` by the 2x2 `gate` on `target_bit`, applied only to basis rows whose
/// bits in `control_mask` are all set.
fn apply_controlled(
    state: &mut Array2<Complex64>,
    control_mask: usize,
    target_bit: usize,
    gate: &Array2<Complex64>,
) {
    let target_mask = 1 << target_bit;
    for row in 0..state.nrows() {
        if row & control_mask != control_mask || row & target_mask != 0 {
            continue;
        }
        let partner = row | target_mask;
        for col in 0..state.ncols() {
            let (zero, one) = (state[[row, col]], state[[partner, col]]);
            state[[row, col]] = gate[[0, 0]] * zero + gate[[0, 1]] * one;
            state[[partner, col]] = gate[[1, 0]] * zero + gate[[1, 1]] * one;
        }
    }
}

/// The unitary realized by running the decomposition's instructions in order.
/// # Errors
///
/// `InvalidInput` if the decomposition spans more than [`MAX_DENSE_QUBITS`] qubits.
pub fn realized_unitary(decomposition: &Decomposition) -> Result<Array2<Complex64>> {
    let positions: FxHashMap<Qubit, usize> = decomposition
        .qubits()
        .enumerate()
        .map(|(position, qubit)| (qubit, position))
        .collect();
    check_size(positions.len())?;

    let x = StandardGate::X.matrix();
    let mut unitary = Array2::<Complex64>::eye(1 << positions.len());
    for instruction in decomposition.instructions() {
        let (control, target) = instruction.qubits();
        let gate = match &instruction {
            Instruction::Cx { .. } => &x,
            Instruction::ControlledUnitary { matrix, .. } => matrix,
        };
        apply_controlled(
            &mut unitary,
            1 << positions[&control],
            positions[&target],
            gate,
        );
    }
    Ok(unitary)
}

/// The gate being decomposed: `u` on each of the `num_targets` targets iff all
/// `num_controls` controls are 1, identity elsewhere.
/// # Errors
///
/// `InvalidInput` if the register exceeds [`MAX_DENSE_QUBITS`] qubits.
pub fn reference_unitary(
    u: &Array2<Complex64>,
    num_controls: usize,
    num_targets: usize,
) -> Result<Array2<Complex64>> {
    let num_qubits = num_controls + num_targets;
    check_size(num_qubits)?;
    let control_mask = (1 << num_controls) - 1;
    let mut unitary = Array2::<Complex64>::eye(1 << num_qubits);
    for target in num_controls..num_qubits {
        apply_controlled(&mut unitary, control_mask, target, u);
    }
    Ok(unitary)
}

/// Largest element-wise distance between the realized and the reference unitary.
/// # Errors
///
/// See [`realized_unitary`].
pub fn deviation(decomposition: &Decomposition, u: &Array2<Complex64>) -> Result<f64> {
    let realized = realized_unitary(decomposition)?;
    let reference = reference_unitary(
        u,
        decomposition.controls().len(),
        decomposition.targets().len(),
    )?;
    Ok(max_abs_diff(&realized, &reference))
}
