// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use num_complex::Complex64;

/// Amplitudes and probabilities at or below this magnitude are treated as zero and pruned from
/// the sparse state.
const THRESHOLD: f64 = 1e-10;

pub(crate) trait NearlyZero {
    fn is_nearly_zero(&self) -> bool;
}

impl NearlyZero for f64 {
    fn is_nearly_zero(&self) -> bool {
        self.abs() <= THRESHOLD
    }
}

impl NearlyZero for Complex64 {
    fn is_nearly_zero(&self) -> bool {
        self.re.is_nearly_zero() && self.im.is_nearly_zero()
    }
}
