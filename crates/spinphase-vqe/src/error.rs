//! Error types for the VQE crate.

use thiserror::Error;

/// Errors produced by the training engine and persistence layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VqeError {
    /// A training hyperparameter must be strictly positive.
    #[error("training parameter '{name}' must be strictly positive")]
    NonPositive {
        /// Name of the offending parameter.
        name: &'static str,
    },

    /// A parameter tensor does not match the engine's expected shape.
    #[error("parameter tensor shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected (n_states, n_params).
        expected: (usize, usize),
        /// Provided shape.
        got: (usize, usize),
    },

    /// Ansatz construction failed.
    #[error(transparent)]
    Circuit(#[from] spinphase_circuit::CircuitError),

    /// Hamiltonian-grid construction failed.
    #[error(transparent)]
    Ham(#[from] spinphase_ham::HamError),

    /// The batched evaluation path could not reserve its state tensor.
    #[error("batched state tensor allocation failed ({needed_bytes} bytes)")]
    ResourceExhausted {
        /// Size of the reservation that failed.
        needed_bytes: usize,
    },

    /// Persistence I/O failure.
    #[error("persistence I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persistence blob could not be parsed.
    #[error("malformed persistence blob: {0}")]
    Json(#[from] serde_json::Error),

    /// Persistence blob was written by an incompatible schema.
    #[error("persistence schema version {found} not supported (expected {expected})")]
    SchemaVersion {
        /// Version found in the blob.
        found: u32,
        /// Version this build writes.
        expected: u32,
    },
}

/// Result type for VQE operations.
pub type VqeResult<T> = Result<T, VqeError>;
