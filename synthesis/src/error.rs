// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// Failures surfaced by decomposition and mode selection. None of them are transient, so
/// callers should not retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthesisError {
    /// The supplied unitary, control set or target set cannot be decomposed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A matrix root could not be computed to the configured tolerance.
    #[error("numeric error: {0}")]
    Numeric(String),
    /// A mode name, ancilla list or configuration value was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, SynthesisError>;
