// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::{Result, SynthesisError};

/// Numeric settings shared by every decomposition call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecomposerConfig {
    /// Largest element-wise error accepted between `V^k` and `U` after a root computation.
    pub root_tolerance: f64,

    /// Largest element-wise error accepted between `U†U` and the identity when validating input.
    pub unitary_tolerance: f64,

    /// Convergence threshold handed to the Schur decomposition.
    pub schur_epsilon: f64,

    /// Iteration budget for the Schur decomposition. Zero means no limit.
    pub schur_max_iterations: usize,
}

impl Default for DecomposerConfig {
    fn default() -> Self {
        Self {
            root_tolerance: 1e-9,
            unitary_tolerance: 1e-9,
            schur_epsilon: 1e-12,
            schur_max_iterations: 100_000,
        }
    }
}

impl DecomposerConfig {
    /// Sets the root tolerance, keeping the other settings.
    #[must_use]
    pub fn with_root_tolerance(self, root_tolerance: f64) -> Self {
        Self {
            root_tolerance,
            ..self
        }
    }

    /// Checks that every tolerance is a finite, strictly positive number.
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("root_tolerance", self.root_tolerance),
            ("unitary_tolerance", self.unitary_tolerance),
            ("schur_epsilon", self.schur_epsilon),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SynthesisError::InvalidConfiguration(format!(
                    "{name} must be a finite positive number, got {value}"
                )));
            }
        }
        Ok(())
    }
}
