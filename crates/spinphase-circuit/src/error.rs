//! Error types for ansatz construction.

use thiserror::Error;

/// Errors produced while building a parameterized circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CircuitError {
    /// The parameter slice ran out before the recipe finished.
    #[error("parameter slice exhausted: recipe needs more than {have} parameters")]
    TooFewParams {
        /// Length of the slice that was provided.
        have: usize,
    },

    /// The ansatz needs more qubits than requested.
    #[error("{ansatz} ansatz needs at least {min} qubits, got {got}")]
    TooFewQubits {
        /// Ansatz name.
        ansatz: &'static str,
        /// Minimum qubit count.
        min: usize,
        /// Requested qubit count.
        got: usize,
    },
}

/// Result type for circuit construction.
pub type CircuitResult<T> = Result<T, CircuitError>;
