// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![deny(clippy::all, clippy::pedantic)]

//! # Sparse State Quantum Simulator
//! This libary implements sparse state simulation, based on the design from
//! <a href="https://arxiv.org/abs/2105.01533">Leveraging state sparsity for more efficient quantum simulations</a>.
//! It serves as the execution backend for checking synthesized multi-controlled gates: the
//! [`execute`] module runs a decomposition's instruction stream and compares it against the
//! gate it is meant to implement.

pub mod execute;
mod nearly_zero;

use crate::nearly_zero::NearlyZero;
use ndarray::Array2;
use num_bigint::BigUint;
use num_complex::Complex64;
use num_traits::{One, Zero};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rustc_hash::{FxHashMap, FxHashSet};
use std::{cell::RefCell, f64::consts::FRAC_1_SQRT_2};

pub type SparseState = FxHashMap<BigUint, Complex64>;

/// The `QuantumSim` struct contains the necessary state for tracking the simulation. Each instance of a
/// `QuantumSim` represents an independant simulation.
pub struct QuantumSim {
    /// The structure that describes the current quantum state.
    pub(crate) state: SparseState,

    /// The mapping from qubit identifiers to internal state locations.
    pub(crate) id_map: FxHashMap<usize, usize>,

    /// The random number generator used to collapse released qubits.
    rng: RefCell<StdRng>,
}

impl Default for QuantumSim {
    fn default() -> Self {
        Self::new(None)
    }
}

impl QuantumSim {
    /// Creates a new sparse state quantum simulator object with empty initial state (no qubits allocated).
    /// Without an `rng` the generator collapsing released qubits is seeded from entropy.
    #[must_use]
    pub fn new(rng: Option<StdRng>) -> Self {
        let mut initial_state = SparseState::default();
        initial_state.insert(BigUint::zero(), Complex64::one());

        QuantumSim {
            state: initial_state,
            id_map: FxHashMap::default(),
            rng: RefCell::new(rng.unwrap_or_else(StdRng::from_entropy)),
        }
    }

    /// Number of currently allocated qubits.
    #[must_use]
    pub fn num_qubits(&self) -> usize {
        self.id_map.len()
    }

    /// Allocates a fresh qubit, returning its identifier. Note that this will use the lowest available
    /// identifier, and may result in qubits being allocated "in the middle" of an existing register
    /// if those identifiers are available.
    #[must_use]
    pub fn allocate(&mut self) -> usize {
        // Add the new entry into the FxHashMap at the first available sequential ID and first available
        // sequential location.
        let mut sorted_keys: Vec<&usize> = self.id_map.keys().collect();
        sorted_keys.sort();
        let mut sorted_vals: Vec<&usize> = self.id_map.values().collect();
        sorted_vals.sort();
        let new_key = sorted_keys
            .iter()
            .enumerate()
            .take_while(|(index, key)| index == **key)
            .last()
            .map_or(0_usize, |(_, &&key)| key + 1);
        let new_val = sorted_vals
            .iter()
            .enumerate()
            .take_while(|(index, val)| index == **val)
            .last()
            .map_or(0_usize, |(_, &&val)| val + 1);
        self.id_map.insert(new_key, new_val);

        new_key
    }

    /// Releases the given qubit, collapsing its state in the process. After release that identifier is
    /// no longer valid for use in other functions and will cause an error if used.
    /// # Panics
    ///
    /// The function will panic if the given id does not correpsond to an allocated qubit.
    pub fn release(&mut self, id: usize) {
        let loc = self
            .id_map
            .remove(&id)
            .unwrap_or_else(|| panic!("Unable to find qubit with id {id}."));

        if self.id_map.is_empty() {
            // When no qubits are allocated, we can reset the sparse state to a clean ground, so
            // any accumulated phase dissappears.
            let mut initial_state = SparseState::default();
            initial_state.insert(BigUint::zero(), Complex64::one());
            self.state = initial_state;
        } else if self.measure_impl(loc) {
            // Reset the released location to zero in every key.
            self.state = self
                .state
                .drain()
                .fold(SparseState::default(), |mut accum, (mut k, v)| {
                    k.set_bit(loc as u64, false);
                    accum.insert(k, v);
                    accum
                });
        }
    }

    /// Checks the probability of parity measurement in the computational basis for the given set of
    /// qubits.
    /// # Panics
    ///
    /// This function will panic if the given ids do not all correspond to allocated qubits.
    /// This function will panic if there are duplicate ids in the given list.
    #[must_use]
    pub fn joint_probability(&self, ids: &[usize]) -> f64 {
        Self::check_for_duplicates(ids);
        let locs: Vec<usize> = ids.iter().map(|id| self.resolve(*id)).collect();
        self.check_joint_probability(&locs)
    }

    /// Checks the internal state of the given qubit and returns true only if the given qubit is in exactly the |0⟩ state.
    #[must_use]
    pub fn qubit_is_zero(&self, id: usize) -> bool {
        self.joint_probability(&[id]).is_nearly_zero()
    }

    fn measure_impl(&mut self, loc: usize) -> bool {
        let random_sample = self.rng.borrow_mut().gen::<f64>();
        let res = random_sample < self.check_joint_probability(&[loc]);
        self.collapse(loc, res);
        res
    }

    /// Utility to get the sum of all probabilies where an odd number of the bits at the given locations
    /// are set. This corresponds to the probability of jointly measuring those qubits in the computational
    /// basis.
    fn check_joint_probability(&self, locs: &[usize]) -> f64 {
        let mask = locs.iter().fold(BigUint::zero(), |accum, loc| {
            accum | (BigUint::one() << loc)
        });
        self.state.iter().fold(0.0_f64, |accum, (index, val)| {
            if (index & &mask).count_ones() & 1 > 0 {
                accum + val.norm_sqr()
            } else {
                accum
            }
        })
    }

    /// Removes every entry whose bit at `loc` disagrees with `val` and renormalizes.
    fn collapse(&mut self, loc: usize, val: bool) {
        let mut new_state = SparseState::default();
        let mut scaling_denominator = 0.0;
        for (k, v) in self.state.drain() {
            if k.bit(loc as u64) == val {
                new_state.insert(k, v);
                scaling_denominator += v.norm_sqr();
            }
        }

        let scaling = 1.0 / f64::sqrt(scaling_denominator);
        for (k, v) in new_state.drain() {
            let scaled_value = v * scaling;
            if !scaled_value.is_nearly_zero() {
                self.state.insert(k, scaled_value);
            }
        }
    }

    pub(crate) fn check_for_duplicates(ids: &[usize]) {
        let mut unique = FxHashSet::default();
        for id in ids {
            assert!(
                unique.insert(id),
                "Duplicate qubit id '{id}' found in application."
            );
        }
    }

    fn resolve(&self, id: usize) -> usize {
        *self
            .id_map
            .get(&id)
            .unwrap_or_else(|| panic!("Unable to find qubit with id {id}"))
    }

    /// Verifies that the given target and list of controls does not contain any duplicate entries, and returns
    /// those values mapped to internal identifiers and converted to `u64`.
    fn resolve_and_check_qubits(&self, target: usize, ctls: &[usize]) -> (u64, Vec<u64>) {
        let mut ids = ctls.to_owned();
        ids.push(target);
        Self::check_for_duplicates(&ids);

        let target = self.resolve(target) as u64;
        let ctls = ctls.iter().map(|c| self.resolve(*c) as u64).collect();
        (target, ctls)
    }

    /// Multi-controlled X gate. Every entry keeps its amplitude and only moves, so the state
    /// vector keeps its size.
    /// # Panics
    ///
    /// Panics on unknown or duplicate qubit ids.
    pub fn mcx(&mut self, ctls: &[usize], target: usize) {
        let (target, ctls) = self.resolve_and_check_qubits(target, ctls);
        self.state = self
            .state
            .drain()
            .fold(SparseState::default(), |mut accum, (mut index, value)| {
                if ctls.iter().all(|c| index.bit(*c)) {
                    index.set_bit(target, !index.bit(target));
                }
                accum.insert(index, value);
                accum
            });
    }

    /// Single qubit X gate.
    pub fn x(&mut self, target: usize) {
        self.mcx(&[], target);
    }

    /// Single qubit H gate.
    pub fn h(&mut self, target: usize) {
        let one = Complex64::one();
        let h = ndarray::array![[one, one], [one, -one]] * FRAC_1_SQRT_2;
        self.mcapply(&[], &h, target);
    }

    /// Applies an arbitrary single-qubit unitary to `target` on the entries where every control is
    /// set.
    /// # Panics
    ///
    /// Panics on unknown or duplicate qubit ids, or if `matrix` is not 2x2.
    pub fn mcapply(&mut self, ctls: &[usize], matrix: &Array2<Complex64>, target: usize) {
        assert_eq!(matrix.dim(), (2, 2), "Expected a single-qubit matrix.");
        let (target, ctls) = self.resolve_and_check_qubits(target, ctls);
        let (m00, m01, m10, m11) = (
            matrix[[0, 0]],
            matrix[[0, 1]],
            matrix[[1, 0]],
            matrix[[1, 1]],
        );

        let mut flipped = BigUint::zero();
        flipped.set_bit(target, true);

        // This operation cannot be done in-place so create a new empty state vector to populate.
        let mut new_state = SparseState::default();
        let mut insert = |index: BigUint, value: Complex64| {
            if !value.is_nearly_zero() {
                new_state.insert(index, value);
            }
        };

        for (index, value) in &self.state {
            if !ctls.iter().all(|c| index.bit(*c)) {
                insert(index.clone(), *value);
                continue;
            }
            let flipped_index = index ^ &flipped;
            match self.state.get(&flipped_index) {
                // No superposition on the target for this state, so the partner entry starts at zero.
                None if index.bit(target) => {
                    insert(flipped_index, value * m01);
                    insert(index.clone(), value * m11);
                }
                None => {
                    insert(index.clone(), value * m00);
                    insert(flipped_index, value * m10);
                }
                // Both entries are present. Only the zero entry computes the pair, to avoid duplication.
                Some(flipped_value) if !index.bit(target) => {
                    insert(index.clone(), value * m00 + flipped_value * m01);
                    insert(flipped_index, value * m10 + flipped_value * m11);
                }
                Some(_) => (),
            }
        }

        self.state = new_state;
    }
}
