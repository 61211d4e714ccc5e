// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ndarray::{s, Array2};
use num_complex::Complex64;

use crate::config::DecomposerConfig;
use crate::error::{Result, SynthesisError};
use crate::linalg::{
    adjoint, controlled, max_abs_diff, max_distance, principal_root, within_tolerance,
};
use crate::operation::RootVariant;

/// The root operator V of a base unitary U together with its conjugate transpose, where
/// `V^degree = U`. Computed once per decomposition call and owned by its result.
#[derive(Debug, Clone, PartialEq)]
pub struct RootOperator {
    v: Array2<Complex64>,
    v_dagger: Array2<Complex64>,
    degree: u64,
}

impl RootOperator {
    fn from_root(v: Array2<Complex64>, degree: u64) -> Self {
        let v_dagger = adjoint(&v);
        Self {
            v,
            v_dagger,
            degree,
        }
    }

    /// The degree one operator, V = U. No root is computed.
    #[must_use]
    pub fn base(u: &Array2<Complex64>) -> Self {
        Self::from_root(u.clone(), 1)
    }

    /// Principal root of `u` taken directly.
    /// # Errors
    ///
    /// Propagates the failures of [`principal_root`].
    pub fn direct(u: &Array2<Complex64>, degree: u64, config: &DecomposerConfig) -> Result<Self> {
        let v = principal_root(u, degree, config)?;
        tracing::debug!(degree, "computed root of base unitary");
        Ok(Self::from_root(v, degree))
    }

    /// Principal root of the singly controlled extension `diag(I, u)`. The root of the
    /// extension must keep the block structure, with the identity block untouched, and its
    /// lower-right block becomes V.
    /// # Errors
    ///
    /// Propagates the failures of [`principal_root`], and returns `Numeric` if the root of the
    /// extension is not block diagonal with an identity upper-left block.
    pub fn from_controlled_extension(
        u: &Array2<Complex64>,
        degree: u64,
        config: &DecomposerConfig,
    ) -> Result<Self> {
        let dim = u.nrows();
        let root = principal_root(&controlled(u, 1), degree, config)?;

        let identity_error = max_abs_diff(
            &root.slice(s![..dim, ..dim]).to_owned(),
            &Array2::eye(dim),
        );
        let coupling = max_distance(
            root.slice(s![..dim, dim..])
                .iter()
                .chain(root.slice(s![dim.., ..dim]).iter())
                .map(|value| value.norm()),
        );
        if !within_tolerance(identity_error, config.root_tolerance)
            || !within_tolerance(coupling, config.root_tolerance)
        {
            return Err(SynthesisError::Numeric(format!(
                "Root of the controlled extension lost its block structure (identity block error {identity_error:e}, off-diagonal blocks {coupling:e})."
            )));
        }

        tracing::debug!(degree, "computed root of controlled extension");
        Ok(Self::from_root(root.slice(s![dim.., dim..]).to_owned(), degree))
    }

    #[must_use]
    pub fn v(&self) -> &Array2<Complex64> {
        &self.v
    }

    #[must_use]
    pub fn v_dagger(&self) -> &Array2<Complex64> {
        &self.v_dagger
    }

    #[must_use]
    pub fn degree(&self) -> u64 {
        self.degree
    }

    /// The matrix applied for the given variant.
    #[must_use]
    pub fn matrix(&self, variant: RootVariant) -> &Array2<Complex64> {
        match variant {
            RootVariant::V => &self.v,
            RootVariant::VDagger => &self.v_dagger,
        }
    }
}
