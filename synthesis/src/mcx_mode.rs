// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Selection of a multi-controlled X construction by mode name. Only the ancilla-free mode is
//! synthesized here; the ancilla-based constructions belong to the host gate library, so this
//! module only resolves their names and ancilla requirements.

use std::{fmt, str::FromStr};

use crate::decompose::{Decomposer, Decomposition};
use crate::error::{Result, SynthesisError};
use crate::gates::StandardGate;
use crate::operation::Qubit;

/// Multi-controlled X constructions, by ancilla usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum McxMode {
    NoAncilla,
    Recursion,
    VChain,
    VChainDirty,
}

/// Accepted names, canonical names first, then the legacy aliases.
const MODE_NAMES: [(&str, McxMode); 7] = [
    ("noancilla", McxMode::NoAncilla),
    ("recursion", McxMode::Recursion),
    ("v-chain", McxMode::VChain),
    ("v-chain-dirty", McxMode::VChainDirty),
    ("advanced", McxMode::Recursion),
    ("basic", McxMode::VChain),
    ("basic-dirty-ancilla", McxMode::VChainDirty),
];

impl McxMode {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            McxMode::NoAncilla => "noancilla",
            McxMode::Recursion => "recursion",
            McxMode::VChain => "v-chain",
            McxMode::VChainDirty => "v-chain-dirty",
        }
    }

    /// Number of ancilla qubits the construction needs for `num_controls` controls.
    #[must_use]
    pub fn required_ancillas(self, num_controls: usize) -> usize {
        match self {
            McxMode::NoAncilla => 0,
            McxMode::Recursion => usize::from(num_controls > 4),
            McxMode::VChain | McxMode::VChainDirty => num_controls.saturating_sub(2),
        }
    }

    /// Whether the ancillas may start in an arbitrary state.
    #[must_use]
    pub fn allows_dirty_ancillas(self) -> bool {
        matches!(self, McxMode::Recursion | McxMode::VChainDirty)
    }
}

impl fmt::Display for McxMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for McxMode {
    type Err = SynthesisError;

    fn from_str(name: &str) -> Result<Self> {
        MODE_NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|&(_, mode)| mode)
            .ok_or_else(|| {
                let valid = MODE_NAMES
                    .iter()
                    .map(|(candidate, _)| *candidate)
                    .collect::<Vec<_>>()
                    .join(", ");
                SynthesisError::InvalidConfiguration(format!(
                    "Unsupported mode '{name}', choose one of: {valid}."
                ))
            })
    }
}

/// A multi-controlled X gate of a selected construction, holding exactly the ancillas it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McxGate {
    mode: McxMode,
    num_controls: usize,
    ancillas: Vec<Qubit>,
}

impl McxGate {
    #[must_use]
    pub fn mode(&self) -> McxMode {
        self.mode
    }

    #[must_use]
    pub fn num_controls(&self) -> usize {
        self.num_controls
    }

    #[must_use]
    pub fn ancillas(&self) -> &[Qubit] {
        &self.ancillas
    }

    /// Controls, target and ancillas.
    #[must_use]
    pub fn num_qubits(&self) -> usize {
        self.num_controls + 1 + self.ancillas.len()
    }

    /// Synthesizes the gate on the given qubits with `decomposer`.
    /// # Errors
    ///
    /// - `InvalidInput` if the number of controls does not match the gate, or for the input
    ///   errors of [`Decomposer::decompose`].
    /// - `InvalidConfiguration` for modes other than `noancilla`, or if the decomposer's
    ///   configuration does not validate.
    pub fn decompose(
        &self,
        decomposer: &Decomposer,
        controls: &[Qubit],
        target: Qubit,
    ) -> Result<Decomposition> {
        if controls.len() != self.num_controls {
            return Err(SynthesisError::InvalidInput(format!(
                "Gate was selected for {} controls, got {}.",
                self.num_controls,
                controls.len()
            )));
        }
        match self.mode {
            McxMode::NoAncilla => {
                decomposer.decompose(&StandardGate::X.matrix(), controls, &[target])
            }
            mode => Err(SynthesisError::InvalidConfiguration(format!(
                "Mode '{mode}' is provided by the host gate library and cannot be synthesized here."
            ))),
        }
    }
}

/// Resolves `mode` and checks the supplied ancillas. Surplus ancillas are dropped, keeping the
/// first ones supplied.
/// # Errors
///
/// `InvalidConfiguration` for an unknown mode name or when fewer ancillas are supplied than the
/// mode requires for `num_controls` controls.
pub fn select_mcx(mode: &str, num_controls: usize, ancillas: &[Qubit]) -> Result<McxGate> {
    let mode: McxMode = mode.parse()?;
    let required = mode.required_ancillas(num_controls);
    if ancillas.len() < required {
        return Err(SynthesisError::InvalidConfiguration(format!(
            "Mode '{mode}' with {num_controls} controls requires {required} ancilla qubits, but {} were supplied.",
            ancillas.len()
        )));
    }
    if ancillas.len() > required {
        tracing::warn!(
            %mode,
            required,
            supplied = ancillas.len(),
            "ignoring surplus ancilla qubits"
        );
    }
    Ok(McxGate {
        mode,
        num_controls,
        ancillas: ancillas[..required].to_vec(),
    })
}
