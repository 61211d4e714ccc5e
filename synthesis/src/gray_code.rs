// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Ancilla-free construction for three or more controls. The nonzero control combinations are
//! visited in reflected Gray-code order; before each step one toggle makes the highest active
//! control carry the parity of the combination, and the root operator is applied from that
//! control with V for odd combinations and V† for even ones.

use ndarray::Array2;
use num_complex::Complex64;

use crate::config::DecomposerConfig;
use crate::error::{Result, SynthesisError};
use crate::operation::{Operation, Qubit, RootVariant};
use crate::root::RootOperator;

/// Root degree needed for `num_controls` controls, `2^(num_controls - 1)`.
#[must_use]
pub fn root_degree(num_controls: usize) -> u64 {
    debug_assert!((1..=64).contains(&num_controls));
    1_u64 << (num_controls - 1)
}

/// The root used by the Gray-code circuit, taken from `u` directly.
/// # Errors
///
/// See [`RootOperator::direct`].
pub fn root_operator(
    u: &Array2<Complex64>,
    num_controls: usize,
    config: &DecomposerConfig,
) -> Result<RootOperator> {
    RootOperator::direct(u, root_degree(num_controls), config)
}

fn most_significant_bit(value: u64) -> usize {
    debug_assert_ne!(value, 0);
    (u64::BITS - 1 - value.leading_zeros()) as usize
}

/// A single step of the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayStep {
    pub code: u64,
    pub ctrl_idx: usize,
    /// `(source, dest)` control indices of the toggle preceding the root application, absent
    /// on the first step.
    pub toggle: Option<(usize, usize)>,
    pub variant: RootVariant,
}

/// Iterates the steps for codes 1 through `2^n - 1`.
#[derive(Debug, Clone)]
pub struct GrayState {
    index: u64,
    end: u64,
    previous_code: u64,
}

impl GrayState {
    #[must_use]
    pub fn new(num_controls: usize) -> Self {
        debug_assert!((1..64).contains(&num_controls));
        Self {
            index: 1,
            end: 1 << num_controls,
            previous_code: 0,
        }
    }
}

impl Iterator for GrayState {
    type Item = GrayStep;

    fn next(&mut self) -> Option<GrayStep> {
        if self.index >= self.end {
            return None;
        }
        let code = self.index ^ (self.index >> 1);
        let ctrl_idx = most_significant_bit(code);
        let toggle = (self.index > 1).then(|| {
            let toggle_idx = most_significant_bit(code ^ self.previous_code);
            if toggle_idx == ctrl_idx {
                (ctrl_idx - 1, ctrl_idx)
            } else {
                (toggle_idx, ctrl_idx)
            }
        });
        let variant = RootVariant::for_parity(code.count_ones() % 2 == 1);

        self.previous_code = code;
        self.index += 1;
        Some(GrayStep {
            code,
            ctrl_idx,
            toggle,
            variant,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.end - self.index).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

/// Number of operations emitted for `num_controls` controls and `num_targets` targets: a root
/// application per code and target, and a toggle per code after the first. `None` if the count
/// overflows `usize`.
#[must_use]
pub fn operation_count(num_controls: usize, num_targets: usize) -> Option<usize> {
    let steps = u32::try_from(num_controls)
        .ok()
        .and_then(|n| 1_usize.checked_shl(n))?
        .checked_sub(1)?;
    steps
        .checked_mul(num_targets)?
        .checked_add(steps.saturating_sub(1))
}

fn reserve_operations(count: Option<usize>) -> Result<Vec<Operation>> {
    let mut ops = Vec::new();
    match count {
        Some(count) if ops.try_reserve_exact(count).is_ok() => Ok(ops),
        _ => Err(SynthesisError::InvalidInput(
            "The operation sequence is too large to allocate.".to_owned(),
        )),
    }
}

/// Emits the full operation sequence for `num_controls` controls, broadcasting every root
/// application over all targets.
/// # Errors
///
/// `InvalidInput` if the sequence cannot be allocated.
pub fn operations(num_controls: usize, targets: &[Qubit]) -> Result<Vec<Operation>> {
    let steps = GrayState::new(num_controls);
    let mut ops = reserve_operations(operation_count(num_controls, targets.len()))?;
    for step in steps {
        tracing::trace!(
            code = step.code,
            ctrl_idx = step.ctrl_idx,
            toggle = ?step.toggle,
            variant = %step.variant,
            "gray code step"
        );
        if let Some((source, dest)) = step.toggle {
            ops.push(Operation::Toggle { source, dest });
        }
        ops.extend(
            targets
                .iter()
                .map(|&target| Operation::ApplyControlledRoot {
                    control: step.ctrl_idx,
                    target,
                    variant: step.variant,
                }),
        );
    }
    Ok(ops)
}
