//! Ansatz recipes: layer builders and the two chain ansätze.
//!
//! Each builder appends gates to an op list, pulling angles from a flat
//! parameter slice at a running index and returning the advanced index.
//! Composition therefore reads top-to-bottom like the circuit itself.

use serde::{Deserialize, Serialize};

use crate::error::{CircuitError, CircuitResult};
use crate::ops::GateOp;

/// Placeholder length used for parameter-count discovery.
///
/// Must exceed the consumption of any recipe at any realistic qubit count;
/// the deepest recipe here consumes 9N − 6 parameters, so this errs high by
/// orders of magnitude.
pub const DISCOVERY_PARAMS: usize = 10_000;

/// Pull the next angle from the slice, failing if it is exhausted.
fn next_param(params: &[f64], index: usize) -> CircuitResult<f64> {
    params
        .get(index)
        .copied()
        .ok_or(CircuitError::TooFewParams { have: params.len() })
}

/// A wall of RY rotations, one per qubit.
pub fn wall_ry(
    n_qubits: usize,
    params: &[f64],
    mut index: usize,
    ops: &mut Vec<GateOp>,
) -> CircuitResult<usize> {
    for q in 0..n_qubits {
        ops.push(GateOp::Ry {
            q,
            theta: next_param(params, index)?,
        });
        index += 1;
    }
    Ok(index)
}

/// A wall of RX rotations, one per qubit.
pub fn wall_rx(
    n_qubits: usize,
    params: &[f64],
    mut index: usize,
    ops: &mut Vec<GateOp>,
) -> CircuitResult<usize> {
    for q in 0..n_qubits {
        ops.push(GateOp::Rx {
            q,
            theta: next_param(params, index)?,
        });
        index += 1;
    }
    Ok(index)
}

/// Linear CX entanglement ladder: q → q+1 for every adjacent pair.
pub fn entangle_cx(n_qubits: usize, ops: &mut Vec<GateOp>) {
    for q in 0..n_qubits - 1 {
        ops.push(GateOp::Cx {
            control: q,
            target: q + 1,
        });
    }
}

/// Parameterized XX couplings between nearest neighbours.
pub fn rxx_neighbours(
    n_qubits: usize,
    params: &[f64],
    mut index: usize,
    ops: &mut Vec<GateOp>,
) -> CircuitResult<usize> {
    for q in 0..n_qubits - 1 {
        ops.push(GateOp::Rxx {
            q0: q,
            q1: q + 1,
            theta: next_param(params, index)?,
        });
        index += 1;
    }
    Ok(index)
}

/// Parameterized XX couplings between next-nearest neighbours.
pub fn rxx_next_neighbours(
    n_qubits: usize,
    params: &[f64],
    mut index: usize,
    ops: &mut Vec<GateOp>,
) -> CircuitResult<usize> {
    for q in 0..n_qubits - 2 {
        ops.push(GateOp::Rxx {
            q0: q,
            q1: q + 2,
            theta: next_param(params, index)?,
        });
        index += 1;
    }
    Ok(index)
}

/// The ansatz choice: a pure gate-composition recipe.
///
/// A plain value passed explicitly to every consumer — simulator,
/// gradients, persistence — so no closure state hides between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ansatz {
    /// For the transverse-field Ising chain: six RY-wall + CX-ladder blocks,
    /// closed by an RX wall.  Consumes 7N parameters.
    IsingChain,
    /// For the ANNNI chain: RY wall, then two blocks of
    /// [nearest-XX, RY wall, next-nearest-XX], closed by RY and RX walls.
    /// Consumes 9N − 6 parameters.
    Annni,
}

impl Ansatz {
    /// Short identifier used in logs and the persistence blob.
    pub fn name(&self) -> &'static str {
        match self {
            Ansatz::IsingChain => "ising_chain",
            Ansatz::Annni => "annni",
        }
    }

    /// Minimum qubit count the recipe's couplings need.
    fn min_qubits(&self) -> usize {
        match self {
            Ansatz::IsingChain => 2,
            Ansatz::Annni => 3,
        }
    }

    /// Append the recipe's gates to `ops`, returning the number of
    /// parameters consumed.
    ///
    /// Consumption is determined by the structure alone: any slice at least
    /// [`Self::param_count`] long produces the same gate sequence.
    pub fn build(
        &self,
        n_qubits: usize,
        params: &[f64],
        ops: &mut Vec<GateOp>,
    ) -> CircuitResult<usize> {
        if n_qubits < self.min_qubits() {
            return Err(CircuitError::TooFewQubits {
                ansatz: self.name(),
                min: self.min_qubits(),
                got: n_qubits,
            });
        }

        let mut index = 0;
        match self {
            Ansatz::IsingChain => {
                for _ in 0..6 {
                    index = wall_ry(n_qubits, params, index, ops)?;
                    entangle_cx(n_qubits, ops);
                }
                index = wall_rx(n_qubits, params, index, ops)?;
            }
            Ansatz::Annni => {
                index = wall_ry(n_qubits, params, index, ops)?;
                for _ in 0..2 {
                    index = rxx_neighbours(n_qubits, params, index, ops)?;
                    index = wall_ry(n_qubits, params, index, ops)?;
                    index = rxx_next_neighbours(n_qubits, params, index, ops)?;
                }
                index = wall_ry(n_qubits, params, index, ops)?;
                index = wall_rx(n_qubits, params, index, ops)?;
            }
        }
        Ok(index)
    }

    /// Build the gate sequence for a parameter vector.
    pub fn ops(&self, n_qubits: usize, params: &[f64]) -> CircuitResult<Vec<GateOp>> {
        let mut ops = Vec::new();
        self.build(n_qubits, params, &mut ops)?;
        Ok(ops)
    }

    /// Total parameters the recipe consumes at this width, discovered by
    /// invoking the recipe with an oversized placeholder vector.
    pub fn param_count(&self, n_qubits: usize) -> CircuitResult<usize> {
        let placeholder = vec![0.0; DISCOVERY_PARAMS];
        let mut scratch = Vec::new();
        self.build(n_qubits, &placeholder, &mut scratch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ising_param_count() {
        for n in 2..=6 {
            assert_eq!(Ansatz::IsingChain.param_count(n).unwrap(), 7 * n);
        }
    }

    #[test]
    fn annni_param_count() {
        for n in 3..=6 {
            assert_eq!(Ansatz::Annni.param_count(n).unwrap(), 9 * n - 6);
        }
    }

    #[test]
    fn consumption_ignores_excess_length() {
        let short = vec![0.3; Ansatz::IsingChain.param_count(3).unwrap()];
        let long = vec![0.3; DISCOVERY_PARAMS];
        let a = Ansatz::IsingChain.ops(3, &short).unwrap();
        let b = Ansatz::IsingChain.ops(3, &long).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn exhausted_slice_is_an_error() {
        let err = Ansatz::Annni.ops(4, &[0.1, 0.2]).unwrap_err();
        assert!(matches!(err, CircuitError::TooFewParams { have: 2 }));
    }

    #[test]
    fn narrow_register_is_an_error() {
        assert!(Ansatz::Annni.ops(2, &[0.0; 64]).is_err());
        assert!(Ansatz::IsingChain.ops(1, &[0.0; 64]).is_err());
    }

    #[test]
    fn annni_gate_structure() {
        let n = 4;
        let params = vec![0.5; Ansatz::Annni.param_count(n).unwrap()];
        let ops = Ansatz::Annni.ops(n, &params).unwrap();

        let rxx = ops
            .iter()
            .filter(|op| matches!(op, GateOp::Rxx { .. }))
            .count();
        // Two blocks of (n-1) nearest + (n-2) next-nearest couplings.
        assert_eq!(rxx, 2 * ((n - 1) + (n - 2)));
    }
}
