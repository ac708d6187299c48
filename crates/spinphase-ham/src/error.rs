//! Error types for the ham crate.

use thiserror::Error;

/// Errors produced while constructing Hamiltonian grids.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HamError {
    /// Chain model needs more qubits than requested.
    #[error("{model} chain needs at least {min} qubits, got {got}")]
    TooFewQubits {
        /// Model name ("ising" or "annni").
        model: &'static str,
        /// Minimum qubit count for the model's couplings.
        min: usize,
        /// Requested qubit count.
        got: usize,
    },

    /// A lattice axis has zero points.
    #[error("parameter lattice axis '{axis}' must have at least one point")]
    EmptyAxis {
        /// The offending axis name.
        axis: &'static str,
    },

    /// A recycle traversal does not cover the grid exactly once.
    #[error("recycle traversal must visit every one of the {n_states} grid indices exactly once")]
    BadTraversal {
        /// Number of grid points the traversal must cover.
        n_states: usize,
    },

    /// A Pauli string references a qubit index that is out of range.
    #[error("Pauli string references qubit {qubit} but the register only has {n_qubits} qubits")]
    QubitOutOfRange {
        /// The offending qubit index.
        qubit: u32,
        /// Register width.
        n_qubits: usize,
    },
}

/// Result type for Hamiltonian-grid operations.
pub type HamResult<T> = Result<T, HamError>;
