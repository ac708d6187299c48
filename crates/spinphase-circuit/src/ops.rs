//! The gate vocabulary the ansatz recipes emit.

use serde::{Deserialize, Serialize};

/// One gate application on named qubits.
///
/// Every parameterized gate is of the form exp(-iθG/2) with G² = I, so the
/// π/2 parameter-shift rule yields exact gradients for any loss that is an
/// expectation value of a Hermitian observable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GateOp {
    /// X rotation by `theta` on qubit `q`.
    Rx {
        /// Target qubit.
        q: usize,
        /// Rotation angle.
        theta: f64,
    },
    /// Y rotation by `theta` on qubit `q`.
    Ry {
        /// Target qubit.
        q: usize,
        /// Rotation angle.
        theta: f64,
    },
    /// Z rotation by `theta` on qubit `q`.
    Rz {
        /// Target qubit.
        q: usize,
        /// Rotation angle.
        theta: f64,
    },
    /// Controlled-X.
    Cx {
        /// Control qubit.
        control: usize,
        /// Target qubit.
        target: usize,
    },
    /// Controlled-Z.
    Cz {
        /// Control qubit.
        control: usize,
        /// Target qubit.
        target: usize,
    },
    /// Ising XX coupling: exp(-iθ XX / 2).
    Rxx {
        /// First qubit.
        q0: usize,
        /// Second qubit.
        q1: usize,
        /// Coupling angle.
        theta: f64,
    },
}

impl GateOp {
    /// The rotation angle, if this gate is parameterized.
    pub fn theta(&self) -> Option<f64> {
        match *self {
            GateOp::Rx { theta, .. }
            | GateOp::Ry { theta, .. }
            | GateOp::Rz { theta, .. }
            | GateOp::Rxx { theta, .. } => Some(theta),
            GateOp::Cx { .. } | GateOp::Cz { .. } => None,
        }
    }
}
