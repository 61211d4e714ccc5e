// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ndarray::Array2;
use num_complex::Complex64;
use std::{collections::HashSet, fmt};

use crate::config::DecomposerConfig;
use crate::error::{Result, SynthesisError};
use crate::gray_code;
use crate::linalg::is_unitary;
use crate::operation::{Instruction, Operation, Qubit, RootVariant};
use crate::root::RootOperator;
use crate::two_control;

/// Largest supported number of controls. The Gray-code traversal visits `2^n - 1` codes and
/// emits one operation per code and target plus a toggle per code.
pub const MAX_CONTROLS: usize = 20;

/// Construction used for a given number of controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// One control: U itself is applied from the control to every target.
    SingleControl,
    /// Two controls: closed-form circuit over the root of the controlled extension.
    TwoControl,
    /// Three or more controls: Gray-code traversal over the root of U.
    GrayCode,
}

impl Strategy {
    /// Selects the construction for `num_controls`. Zero controls has no construction.
    #[must_use]
    pub fn for_controls(num_controls: usize) -> Option<Self> {
        match num_controls {
            0 => None,
            1 => Some(Strategy::SingleControl),
            2 => Some(Strategy::TwoControl),
            _ => Some(Strategy::GrayCode),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::SingleControl => write!(f, "single-control"),
            Strategy::TwoControl => write!(f, "two-control"),
            Strategy::GrayCode => write!(f, "gray-code"),
        }
    }
}

/// The result of a decomposition: the ordered operations plus everything needed to interpret
/// them against physical qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    strategy: Strategy,
    controls: Vec<Qubit>,
    targets: Vec<Qubit>,
    root: RootOperator,
    operations: Vec<Operation>,
}

impl Decomposition {
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[must_use]
    pub fn controls(&self) -> &[Qubit] {
        &self.controls
    }

    #[must_use]
    pub fn targets(&self) -> &[Qubit] {
        &self.targets
    }

    #[must_use]
    pub fn root(&self) -> &RootOperator {
        &self.root
    }

    /// The operations in emission order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    #[must_use]
    pub fn toggle_count(&self) -> usize {
        self.operations.iter().filter(|op| op.is_toggle()).count()
    }

    #[must_use]
    pub fn root_count(&self) -> usize {
        self.operations.len() - self.toggle_count()
    }

    /// All qubits touched by the decomposition, controls first.
    pub fn qubits(&self) -> impl Iterator<Item = Qubit> + '_ {
        self.controls.iter().chain(self.targets.iter()).copied()
    }

    /// The decomposition of U†: the operations reversed, each one inverted.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            operations: self.operations.iter().rev().map(|op| op.inverse()).collect(),
            ..self.clone()
        }
    }

    /// Resolves the operations against the physical control qubits and the root matrices, in
    /// emission order.
    #[must_use]
    pub fn instructions(&self) -> Vec<Instruction> {
        self.operations
            .iter()
            .map(|op| match *op {
                Operation::Toggle { source, dest } => Instruction::Cx {
                    control: self.controls[source],
                    target: self.controls[dest],
                },
                Operation::ApplyControlledRoot {
                    control,
                    target,
                    variant,
                } => Instruction::ControlledUnitary {
                    control: self.controls[control],
                    target,
                    variant,
                    matrix: self.root.matrix(variant).clone(),
                },
            })
            .collect()
    }
}

/// Decomposes multi-controlled single-qubit unitaries into single-control root applications and
/// control toggles without ancillas.
#[derive(Debug, Clone, Default)]
pub struct Decomposer {
    config: DecomposerConfig,
}

impl Decomposer {
    #[must_use]
    pub fn new(config: DecomposerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &DecomposerConfig {
        &self.config
    }

    fn validate(&self, u: &Array2<Complex64>, controls: &[Qubit], targets: &[Qubit]) -> Result<()> {
        self.config.validate()?;

        if controls.is_empty() {
            return Err(SynthesisError::InvalidInput(
                "A multi-controlled gate requires at least one control qubit.".to_owned(),
            ));
        }
        if controls.len() > MAX_CONTROLS {
            return Err(SynthesisError::InvalidInput(format!(
                "At most {MAX_CONTROLS} control qubits are supported, got {}.",
                controls.len()
            )));
        }
        if targets.is_empty() {
            return Err(SynthesisError::InvalidInput(
                "A multi-controlled gate requires at least one target qubit.".to_owned(),
            ));
        }

        let mut seen = HashSet::with_capacity(controls.len() + targets.len());
        for qubit in controls.iter().chain(targets) {
            if !seen.insert(qubit) {
                return Err(SynthesisError::InvalidInput(format!(
                    "Qubit {qubit} appears more than once among the controls and targets."
                )));
            }
        }

        let (rows, cols) = u.dim();
        if (rows, cols) != (2, 2) {
            return Err(SynthesisError::InvalidInput(format!(
                "The base gate must be a single-qubit 2x2 matrix, got shape {rows}x{cols}."
            )));
        }
        if u.iter().any(|value| !value.is_finite()) {
            return Err(SynthesisError::InvalidInput(
                "The base gate has a non-finite entry.".to_owned(),
            ));
        }
        if !is_unitary(u, self.config.unitary_tolerance) {
            return Err(SynthesisError::InvalidInput(
                "The base gate is not unitary.".to_owned(),
            ));
        }
        Ok(())
    }

    /// Decomposes "apply `u` to every target iff all `controls` are 1" into an ordered
    /// operation sequence. The position of a qubit in `controls` is its control index.
    /// # Errors
    ///
    /// - `InvalidConfiguration` if the configuration does not validate.
    /// - `InvalidInput` for an empty, oversized or overlapping qubit set, a base gate that is
    ///   not a finite 2x2 unitary, or an operation sequence too large to allocate. No root is
    ///   computed for invalid qubits or gates.
    /// - `Numeric` if the root operator cannot be computed to tolerance.
    pub fn decompose(
        &self,
        u: &Array2<Complex64>,
        controls: &[Qubit],
        targets: &[Qubit],
    ) -> Result<Decomposition> {
        self.validate(u, controls, targets)?;

        let num_controls = controls.len();
        let strategy = Strategy::for_controls(num_controls).ok_or_else(|| {
            SynthesisError::InvalidInput("No strategy for zero controls.".to_owned())
        })?;
        tracing::debug!(
            %strategy,
            controls = num_controls,
            targets = targets.len(),
            "decomposing multi-controlled gate"
        );

        let (root, operations) = match strategy {
            Strategy::SingleControl => (
                RootOperator::base(u),
                targets
                    .iter()
                    .map(|&target| Operation::ApplyControlledRoot {
                        control: 0,
                        target,
                        variant: RootVariant::V,
                    })
                    .collect(),
            ),
            Strategy::TwoControl => (
                two_control::root_operator(u, &self.config)?,
                two_control::operations(targets),
            ),
            Strategy::GrayCode => (
                gray_code::root_operator(u, num_controls, &self.config)?,
                gray_code::operations(num_controls, targets)?,
            ),
        };

        let decomposition = Decomposition {
            strategy,
            controls: controls.to_vec(),
            targets: targets.to_vec(),
            root,
            operations,
        };
        tracing::debug!(
            toggles = decomposition.toggle_count(),
            roots = decomposition.root_count(),
            degree = decomposition.root.degree(),
            "decomposition complete"
        );
        Ok(decomposition)
    }
}

/// Decomposes with the default configuration. See [`Decomposer::decompose`].
/// # Errors
///
/// See [`Decomposer::decompose`].
pub fn decompose(
    u: &Array2<Complex64>,
    controls: &[Qubit],
    targets: &[Qubit],
) -> Result<Decomposition> {
    Decomposer::default().decompose(u, controls, targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::StandardGate;
    use crate::linalg::{adjoint, matrix_power, max_abs_diff};

    fn qubits(range: std::ops::Range<u32>) -> Vec<Qubit> {
        range.map(Qubit).collect()
    }

    #[test]
    fn strategy_by_control_count() {
        assert_eq!(Strategy::for_controls(0), None);
        assert_eq!(Strategy::for_controls(1), Some(Strategy::SingleControl));
        assert_eq!(Strategy::for_controls(2), Some(Strategy::TwoControl));
        assert_eq!(Strategy::for_controls(3), Some(Strategy::GrayCode));
        assert_eq!(Strategy::for_controls(12), Some(Strategy::GrayCode));
    }

    #[test]
    fn single_control_applies_u_directly() {
        let y = StandardGate::Y.matrix();
        let result = decompose(&y, &[Qubit(0)], &qubits(1..4)).unwrap();
        assert_eq!(result.strategy(), Strategy::SingleControl);
        assert_eq!(result.root().degree(), 1);
        assert_eq!(result.root().v(), &y);
        assert_eq!(result.toggle_count(), 0);
        assert_eq!(result.root_count(), 3);
        for (op, target) in result.operations().iter().zip(1..4) {
            assert_eq!(
                *op,
                Operation::ApplyControlledRoot {
                    control: 0,
                    target: Qubit(target),
                    variant: RootVariant::V
                }
            );
        }
    }

    #[test]
    fn two_control_counts_and_root() {
        let x = StandardGate::X.matrix();
        let result = decompose(&x, &qubits(0..2), &qubits(2..4)).unwrap();
        assert_eq!(result.strategy(), Strategy::TwoControl);
        assert_eq!(result.toggle_count(), 2);
        assert_eq!(result.root_count(), 6);
        assert_eq!(result.root().degree(), 2);
        assert!(max_abs_diff(&matrix_power(result.root().v(), 2), &x) < 1e-9);
    }

    #[test]
    fn gray_code_counts() {
        let x = StandardGate::X.matrix();
        for n in 3..=6_u32 {
            for m in 1..=3_u32 {
                let result = decompose(&x, &qubits(0..n), &qubits(n..n + m)).unwrap();
                assert_eq!(result.strategy(), Strategy::GrayCode);
                assert_eq!(result.toggle_count(), (1 << n) - 2);
                assert_eq!(result.root_count(), ((1 << n) - 1) * m as usize);
                assert_eq!(result.root().degree(), 1 << (n - 1));
            }
        }
    }

    #[test]
    fn controls_keep_their_order() {
        let x = StandardGate::X.matrix();
        let controls = [Qubit(9), Qubit(2), Qubit(5)];
        let result = decompose(&x, &controls, &[Qubit(0)]).unwrap();
        assert_eq!(result.controls(), &controls);
        let first_cx = result
            .instructions()
            .into_iter()
            .find(|instruction| matches!(instruction, Instruction::Cx { .. }))
            .unwrap();
        assert_eq!(
            first_cx,
            Instruction::Cx {
                control: Qubit(9),
                target: Qubit(2)
            }
        );
    }

    #[test]
    fn instructions_carry_root_matrices() {
        let result = decompose(&StandardGate::Z.matrix(), &qubits(0..3), &[Qubit(3)]).unwrap();
        let instructions = result.instructions();
        assert_eq!(instructions.len(), result.operations().len());
        for instruction in instructions {
            if let Instruction::ControlledUnitary {
                variant, matrix, ..
            } = instruction
            {
                assert_eq!(&matrix, result.root().matrix(variant));
            }
        }
        assert_eq!(result.root().v_dagger(), &adjoint(result.root().v()));
    }

    #[test]
    fn inverse_reverses_and_inverts() {
        let result = decompose(&StandardGate::H.matrix(), &qubits(0..3), &[Qubit(3)]).unwrap();
        let inverse = result.inverse();
        assert_eq!(inverse.operations().len(), result.operations().len());
        for (op, inverted) in result
            .operations()
            .iter()
            .zip(inverse.operations().iter().rev())
        {
            assert_eq!(op.inverse(), *inverted);
        }
        assert_eq!(inverse.inverse(), result);
    }

    #[test]
    fn rejects_missing_qubits() {
        let x = StandardGate::X.matrix();
        assert!(matches!(
            decompose(&x, &[], &[Qubit(0)]),
            Err(SynthesisError::InvalidInput(_))
        ));
        assert!(matches!(
            decompose(&x, &[Qubit(0)], &[]),
            Err(SynthesisError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_overlapping_qubits() {
        let x = StandardGate::X.matrix();
        assert_eq!(
            decompose(&x, &[Qubit(0), Qubit(1)], &[Qubit(1)]),
            Err(SynthesisError::InvalidInput(
                "Qubit q1 appears more than once among the controls and targets.".to_owned()
            ))
        );
        assert!(decompose(&x, &[Qubit(0), Qubit(0)], &[Qubit(1)]).is_err());
    }

    #[test]
    fn rejects_too_many_controls() {
        let x = StandardGate::X.matrix();
        let controls = qubits(0..21);
        assert_eq!(
            decompose(&x, &controls, &[Qubit(40)]),
            Err(SynthesisError::InvalidInput(
                "At most 20 control qubits are supported, got 21.".to_owned()
            ))
        );
        assert!(matches!(
            decompose(&StandardGate::Rz(0.3).matrix(), &qubits(0..32), &[Qubit(40)]),
            Err(SynthesisError::InvalidInput(_))
        ));
    }

    #[test]
    fn largest_control_count_is_emitted() {
        let rz = StandardGate::Rz(0.3).matrix();
        let n = u32::try_from(MAX_CONTROLS).unwrap();
        let result = decompose(&rz, &qubits(0..n), &[Qubit(n)]).unwrap();
        assert_eq!(result.strategy(), Strategy::GrayCode);
        assert_eq!(result.toggle_count(), (1 << MAX_CONTROLS) - 2);
        assert_eq!(result.root_count(), (1 << MAX_CONTROLS) - 1);
        assert_eq!(result.root().degree(), 1 << (MAX_CONTROLS - 1));
    }

    #[test]
    fn rejects_non_finite_gates() {
        for gate in ["rz(nan)", "p(pi/0)", "rx(-inf)"] {
            let u = gate.parse::<StandardGate>().unwrap().matrix();
            for n in 1..=3 {
                assert_eq!(
                    decompose(&u, &qubits(0..n), &[Qubit(10)]),
                    Err(SynthesisError::InvalidInput(
                        "The base gate has a non-finite entry.".to_owned()
                    )),
                    "gate = {gate}, n = {n}"
                );
            }
        }
    }

    #[test]
    fn rejects_non_unitary_and_wrong_shape() {
        let not_unitary = StandardGate::X.matrix() * 2.0;
        assert_eq!(
            decompose(&not_unitary, &[Qubit(0), Qubit(1)], &[Qubit(2)]),
            Err(SynthesisError::InvalidInput(
                "The base gate is not unitary.".to_owned()
            ))
        );
        let two_qubit = Array2::<Complex64>::eye(4);
        assert!(matches!(
            decompose(&two_qubit, &[Qubit(0)], &[Qubit(1)]),
            Err(SynthesisError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_invalid_configuration() {
        let decomposer = Decomposer::new(DecomposerConfig::default().with_root_tolerance(-1.0));
        assert!(matches!(
            decomposer.decompose(&StandardGate::X.matrix(), &[Qubit(0)], &[Qubit(1)]),
            Err(SynthesisError::InvalidConfiguration(_))
        ));
    }
}
