// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Dense complex matrix helpers. Matrices cross the public API as `ndarray` arrays; the
//! Schur and QR factorizations are delegated to `nalgebra`.

use core::f64::consts::{FRAC_1_SQRT_2, PI};
use nalgebra::{linalg::Schur, DMatrix, DVector};
use ndarray::{s, Array2};
use num_complex::Complex64;
use num_traits::{One, Zero};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::config::DecomposerConfig;
use crate::error::{Result, SynthesisError};

/// Transforms the given matrix into it's adjoint using the transpose of the complex conjugate.
#[must_use]
pub fn adjoint(u: &Array2<Complex64>) -> Array2<Complex64> {
    u.t().map(Complex64::conj)
}

/// Returns `u` extended with `num_ctls` control qubits. The controls are the most significant
/// qubits, so the result is the identity everywhere except the lower-right block, which is `u`.
#[must_use]
pub fn controlled(u: &Array2<Complex64>, num_ctls: u32) -> Array2<Complex64> {
    let dim = u.nrows();
    let total = dim << num_ctls;
    let offset = total - dim;
    let mut extended = Array2::<Complex64>::eye(total);
    extended.slice_mut(s![offset.., offset..]).assign(u);
    extended
}

/// Maximum of a sequence of distances, NaN if any of them is NaN. Empty sequences give zero.
pub(crate) fn max_distance(distances: impl IntoIterator<Item = f64>) -> f64 {
    distances.into_iter().fold(0.0, |largest, distance| {
        if largest.is_nan() || distance.is_nan() {
            f64::NAN
        } else {
            largest.max(distance)
        }
    })
}

/// Whether `distance` is within `tolerance`. NaN is never within tolerance.
pub(crate) fn within_tolerance(distance: f64, tolerance: f64) -> bool {
    distance <= tolerance
}

/// Largest element-wise distance between two matrices of the same shape, NaN if any entry
/// involved is not a number.
#[must_use]
pub fn max_abs_diff(a: &Array2<Complex64>, b: &Array2<Complex64>) -> f64 {
    assert_eq!(a.dim(), b.dim(), "Matrix shapes must match.");
    max_distance(a.iter().zip(b.iter()).map(|(x, y)| (x - y).norm()))
}

/// Checks that `u` is square and that `U†U` is the identity up to `tolerance`.
#[must_use]
pub fn is_unitary(u: &Array2<Complex64>, tolerance: f64) -> bool {
    let (rows, cols) = u.dim();
    rows == cols
        && within_tolerance(
            max_abs_diff(&adjoint(u).dot(u), &Array2::eye(rows)),
            tolerance,
        )
}

/// Raises a square matrix to a non-negative integer power by repeated squaring.
#[must_use]
pub fn matrix_power(u: &Array2<Complex64>, mut exponent: u64) -> Array2<Complex64> {
    let mut result = Array2::<Complex64>::eye(u.nrows());
    let mut base = u.clone();
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = result.dot(&base);
        }
        exponent >>= 1;
        if exponent > 0 {
            base = base.dot(&base);
        }
    }
    result
}

fn to_nalgebra(u: &Array2<Complex64>) -> DMatrix<Complex64> {
    DMatrix::from_fn(u.nrows(), u.ncols(), |i, j| u[[i, j]])
}

fn from_nalgebra(m: &DMatrix<Complex64>) -> Array2<Complex64> {
    Array2::from_shape_fn(m.shape(), |(i, j)| m[(i, j)])
}

// Arguments this close to −π are read as π, so that eigenvalues sitting on the negative real
// axis pick the same branch regardless of the sign of rounding noise in their imaginary part.
const BRANCH_CUT_TOLERANCE: f64 = 1e-10;

/// The principal `degree`-th root of a scalar: the modulus is rooted and the argument, taken in
/// (−π, π], is divided by `degree`.
#[allow(clippy::cast_precision_loss)]
fn principal_scalar_root(value: Complex64, degree: u64) -> Complex64 {
    let (radius, mut theta) = value.to_polar();
    if theta <= -PI + BRANCH_CUT_TOLERANCE {
        theta += 2.0 * PI;
    }
    let degree = degree as f64;
    Complex64::from_polar(radius.powf(degree.recip()), theta / degree)
}

/// Computes the principal `degree`-th root V of a normal matrix `u`, so that `V^degree = U`.
///
/// The matrix is brought into complex Schur form `U = Q T Q†`. For a normal matrix `T` is
/// diagonal, and every eigenvalue on its diagonal is replaced by its principal scalar root
/// (argument in (−π, π], arguments within rounding noise of −π are read as π). The result is checked by
/// raising it back to `degree`.
/// # Errors
///
/// - `InvalidInput` if `degree` is zero, `u` is not square or has a non-finite entry.
/// - `Numeric` if the Schur decomposition does not converge, if the Schur form is not diagonal
///   to within the root tolerance, or if `V^degree` deviates from `U` by more than the root
///   tolerance.
pub fn principal_root(
    u: &Array2<Complex64>,
    degree: u64,
    config: &DecomposerConfig,
) -> Result<Array2<Complex64>> {
    if degree == 0 {
        return Err(SynthesisError::InvalidInput(
            "Root degree must be positive.".to_owned(),
        ));
    }
    let (rows, cols) = u.dim();
    if rows != cols || rows == 0 {
        return Err(SynthesisError::InvalidInput(format!(
            "Expected a non-empty square matrix, got shape {rows}x{cols}."
        )));
    }
    if u.iter().any(|value| !value.is_finite()) {
        return Err(SynthesisError::InvalidInput(
            "Matrix entries must be finite.".to_owned(),
        ));
    }
    if degree == 1 {
        return Ok(u.clone());
    }

    let schur = Schur::try_new(
        to_nalgebra(u),
        config.schur_epsilon,
        config.schur_max_iterations,
    )
    .ok_or_else(|| {
        SynthesisError::Numeric(format!(
            "Schur decomposition did not converge within {} iterations.",
            config.schur_max_iterations
        ))
    })?;
    let (q, t) = schur.unpack();

    let off_diagonal = max_distance(
        (0..rows)
            .flat_map(|i| (i + 1..rows).map(move |j| (i, j)))
            .map(|(i, j)| t[(i, j)].norm()),
    );
    if !within_tolerance(off_diagonal, config.root_tolerance) {
        return Err(SynthesisError::Numeric(format!(
            "Schur form is not diagonal (largest off-diagonal entry {off_diagonal:e}), the matrix is not normal."
        )));
    }

    let roots = DVector::from_fn(rows, |i, _| principal_scalar_root(t[(i, i)], degree));
    let root = from_nalgebra(&(&q * DMatrix::from_diagonal(&roots) * q.adjoint()));

    let error = max_abs_diff(&matrix_power(&root, degree), u);
    if !within_tolerance(error, config.root_tolerance) {
        return Err(SynthesisError::Numeric(format!(
            "Root of degree {degree} reproduces the matrix only to {error:e}, above tolerance {:e}.",
            config.root_tolerance
        )));
    }

    tracing::trace!(degree, error, "computed principal root");
    Ok(root)
}

/// Principal fourth root, the `degree = 4` case of [`principal_root`].
/// # Errors
///
/// See [`principal_root`].
pub fn fourth_root(u: &Array2<Complex64>, config: &DecomposerConfig) -> Result<Array2<Complex64>> {
    principal_root(u, 4, config)
}

/// Samples a Haar-random unitary of the given dimension: a complex Ginibre matrix is QR
/// factorized and the columns of `Q` are rotated by the phases of the diagonal of `R`.
#[must_use]
pub fn haar_random_unitary<R: Rng + ?Sized>(rng: &mut R, dim: usize) -> Array2<Complex64> {
    let ginibre = DMatrix::from_fn(dim, dim, |_, _| {
        Complex64::new(rng.sample(StandardNormal), rng.sample(StandardNormal)) * FRAC_1_SQRT_2
    });
    let qr = ginibre.qr();
    let r = qr.r();
    let mut q = qr.q();
    for (j, mut column) in q.column_iter_mut().enumerate() {
        let diagonal = r[(j, j)];
        let phase = if diagonal.is_zero() {
            Complex64::one()
        } else {
            diagonal / diagonal.norm()
        };
        column *= phase;
    }
    from_nalgebra(&q)
}
