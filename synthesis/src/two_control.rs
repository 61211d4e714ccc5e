// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Closed-form circuit for exactly two controls. With V² = U, the target receives V from the
//! second control, V† from the parity of both controls and V from the first control, so the net
//! power of V is 2 on |11⟩ and 0 on every other control state.

use ndarray::Array2;
use num_complex::Complex64;

use crate::config::DecomposerConfig;
use crate::error::Result;
use crate::operation::{Operation, Qubit, RootVariant};
use crate::root::RootOperator;

pub const ROOT_DEGREE: u64 = 2;

const FIRST: usize = 0;
const SECOND: usize = 1;

/// The square root used by the two-control circuit, taken from the controlled extension of `u`.
/// # Errors
///
/// See [`RootOperator::from_controlled_extension`].
pub fn root_operator(u: &Array2<Complex64>, config: &DecomposerConfig) -> Result<RootOperator> {
    RootOperator::from_controlled_extension(u, ROOT_DEGREE, config)
}

fn apply_to_all(
    ops: &mut Vec<Operation>,
    control: usize,
    targets: &[Qubit],
    variant: RootVariant,
) {
    ops.extend(
        targets
            .iter()
            .map(|&target| Operation::ApplyControlledRoot {
                control,
                target,
                variant,
            }),
    );
}

/// Emits the five steps, each root step broadcast over every target.
#[must_use]
pub fn operations(targets: &[Qubit]) -> Vec<Operation> {
    let toggle = Operation::Toggle {
        source: FIRST,
        dest: SECOND,
    };
    let mut ops = Vec::with_capacity(3 * targets.len() + 2);
    apply_to_all(&mut ops, SECOND, targets, RootVariant::V);
    ops.push(toggle);
    apply_to_all(&mut ops, SECOND, targets, RootVariant::VDagger);
    ops.push(toggle);
    apply_to_all(&mut ops, FIRST, targets, RootVariant::V);
    tracing::trace!(targets = targets.len(), "emitted two-control circuit");
    ops
}
