// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ndarray::Array2;
use num_complex::Complex64;
use std::fmt;

/// Identifier of a qubit in the host circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Qubit(pub u32);

impl Qubit {
    /// Returns the identifier as an index, for hosts that key their qubits by `usize`.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for Qubit {
    fn from(id: u32) -> Self {
        Qubit(id)
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Which of the two root operators a controlled application uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootVariant {
    V,
    VDagger,
}

impl RootVariant {
    /// V for an odd number of active control bits, V† for an even number.
    #[must_use]
    pub fn for_parity(odd: bool) -> Self {
        if odd {
            RootVariant::V
        } else {
            RootVariant::VDagger
        }
    }

    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            RootVariant::V => RootVariant::VDagger,
            RootVariant::VDagger => RootVariant::V,
        }
    }
}

impl fmt::Display for RootVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootVariant::V => write!(f, "V"),
            RootVariant::VDagger => write!(f, "Vdg"),
        }
    }
}

/// One step of an emitted decomposition. Control positions are indices into the control set
/// the decomposition was built for, targets are physical qubits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Controlled NOT from the control at index `source` onto the control at index `dest`.
    Toggle { source: usize, dest: usize },
    /// The root operator applied to `target`, controlled by the control at index `control`.
    ApplyControlledRoot {
        control: usize,
        target: Qubit,
        variant: RootVariant,
    },
}

impl Operation {
    /// The operation undoing this one. Toggles are self-inverse and the root variants swap.
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Operation::Toggle { .. } => self,
            Operation::ApplyControlledRoot {
                control,
                target,
                variant,
            } => Operation::ApplyControlledRoot {
                control,
                target,
                variant: variant.inverse(),
            },
        }
    }

    #[must_use]
    pub fn is_toggle(&self) -> bool {
        matches!(self, Operation::Toggle { .. })
    }
}

/// An operation resolved against physical qubits and the concrete root matrices, ready to be
/// appended to a host circuit or run on a simulator.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Cx {
        control: Qubit,
        target: Qubit,
    },
    ControlledUnitary {
        control: Qubit,
        target: Qubit,
        variant: RootVariant,
        matrix: Array2<Complex64>,
    },
}

impl Instruction {
    #[must_use]
    pub fn qubits(&self) -> (Qubit, Qubit) {
        match self {
            Instruction::Cx { control, target }
            | Instruction::ControlledUnitary {
                control, target, ..
            } => (*control, *target),
        }
    }
}
