// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # Ancilla-free multi-controlled gate synthesis
//! Decomposes "apply a single-qubit unitary U to every target iff all controls are 1" into
//! singly controlled applications of a root V of U and CNOT toggles between controls, without
//! ancilla qubits. Two controls use a closed-form five step circuit; three or more controls
//! traverse the control combinations in Gray-code order, following
//! <a href="https://arxiv.org/abs/quant-ph/9503016">Elementary gates for quantum computation</a>.

pub mod config;
pub mod decompose;
pub mod equivalence;
pub mod error;
pub mod gates;
pub mod gray_code;
pub mod linalg;
pub mod mcx_mode;
pub mod operation;
pub mod root;
pub mod two_control;

pub use config::DecomposerConfig;
pub use decompose::{decompose, Decomposer, Decomposition, Strategy, MAX_CONTROLS};
pub use error::{Result, SynthesisError};
pub use gates::StandardGate;
pub use mcx_mode::{select_mcx, McxGate, McxMode};
pub use operation::{Instruction, Operation, Qubit, RootVariant};
pub use root::RootOperator;
