//! Pauli-string data structures and dense realisation.
//!
//! A [`SpinHamiltonian`] is a weighted sum of [`PauliString`]s.  Beyond the
//! symbolic form, this module realises a Hamiltonian as a dense
//! 2^N × 2^N complex Hermitian matrix, which is what the VQE loss functions
//! and the exact eigensolver consume.

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{HamError, HamResult};

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PauliOp {
    /// Identity — contributes a constant shift; omitted from strings.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

/// A tensor product of Pauli operators on named qubits.
///
/// Stored as a sorted `Vec<(qubit_index, PauliOp)>` with Identity terms
/// omitted.  Qubits not listed are implicitly I.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauliString {
    /// Non-identity terms, sorted by qubit index ascending.
    ops: Vec<(u32, PauliOp)>,
}

impl PauliString {
    /// Construct a PauliString from an iterator of (qubit, op) pairs.
    ///
    /// Identity operators are dropped; the remaining ops are sorted by qubit.
    pub fn from_ops(ops: impl IntoIterator<Item = (u32, PauliOp)>) -> Self {
        let mut v: Vec<(u32, PauliOp)> = ops
            .into_iter()
            .filter(|(_, op)| *op != PauliOp::I)
            .collect();
        v.sort_by_key(|(q, _)| *q);
        Self { ops: v }
    }

    /// Return the non-identity (qubit, op) pairs, sorted by qubit index.
    pub fn ops(&self) -> &[(u32, PauliOp)] {
        &self.ops
    }

    /// True if there are no non-identity operators (pure constant).
    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }

    /// The highest qubit index referenced, or `None` for an identity string.
    pub fn max_qubit(&self) -> Option<u32> {
        self.ops.last().map(|(q, _)| *q)
    }

    /// Apply the string to a computational-basis index.
    ///
    /// P|index⟩ = phase · |new_index⟩ for exactly one `new_index`; the pair
    /// is returned.  Qubit `q` corresponds to bit `q` of the index.
    pub fn apply_to_index(&self, index: usize) -> (usize, Complex64) {
        let mut new_index = index;
        let mut phase = Complex64::new(1.0, 0.0);

        for &(qubit, op) in &self.ops {
            let bit = (index >> qubit) & 1;
            match op {
                PauliOp::I => {}
                PauliOp::X => {
                    new_index ^= 1 << qubit;
                }
                PauliOp::Y => {
                    new_index ^= 1 << qubit;
                    phase *= if bit == 0 {
                        Complex64::new(0.0, 1.0)
                    } else {
                        Complex64::new(0.0, -1.0)
                    };
                }
                PauliOp::Z => {
                    if bit == 1 {
                        phase = -phase;
                    }
                }
            }
        }

        (new_index, phase)
    }
}

/// A single weighted Pauli term: `coeff · pauli`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinTerm {
    /// Real coefficient.
    pub coeff: f64,
    /// The Pauli string.
    pub pauli: PauliString,
}

impl SpinTerm {
    /// Create a new term.
    pub fn new(coeff: f64, pauli: PauliString) -> Self {
        Self { coeff, pauli }
    }

    /// Shorthand: single-qubit X term.
    pub fn x(qubit: u32, coeff: f64) -> Self {
        Self::new(coeff, PauliString::from_ops([(qubit, PauliOp::X)]))
    }

    /// Shorthand: single-qubit Z term.
    pub fn z(qubit: u32, coeff: f64) -> Self {
        Self::new(coeff, PauliString::from_ops([(qubit, PauliOp::Z)]))
    }

    /// Shorthand: ZZ coupling term.
    pub fn zz(q0: u32, q1: u32, coeff: f64) -> Self {
        Self::new(
            coeff,
            PauliString::from_ops([(q0, PauliOp::Z), (q1, PauliOp::Z)]),
        )
    }

    /// Shorthand: XX coupling term.
    pub fn xx(q0: u32, q1: u32, coeff: f64) -> Self {
        Self::new(
            coeff,
            PauliString::from_ops([(q0, PauliOp::X), (q1, PauliOp::X)]),
        )
    }
}

/// A sum-of-Pauli-strings Hamiltonian.
///
/// H = Σ_k  c_k · P_k
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinHamiltonian {
    terms: Vec<SpinTerm>,
}

impl SpinHamiltonian {
    /// Create from a list of terms.
    pub fn from_terms(terms: Vec<SpinTerm>) -> Self {
        Self { terms }
    }

    /// All terms.
    pub fn terms(&self) -> &[SpinTerm] {
        &self.terms
    }

    /// Number of terms.
    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    /// The minimum number of qubits required to represent this Hamiltonian.
    ///
    /// Returns 0 if the Hamiltonian is empty or purely identity.
    pub fn min_qubits(&self) -> u32 {
        self.terms
            .iter()
            .filter_map(|t| t.pauli.max_qubit())
            .max()
            .map_or(0, |q| q + 1)
    }

    /// Realise the Hamiltonian as a dense 2^N × 2^N Hermitian matrix.
    ///
    /// Each string contributes `coeff · phase` at `(new_index, index)` for
    /// every basis index, since P|index⟩ = phase · |new_index⟩.
    pub fn dense(&self, n_qubits: usize) -> HamResult<Array2<Complex64>> {
        if self.min_qubits() as usize > n_qubits {
            return Err(HamError::QubitOutOfRange {
                qubit: self.min_qubits() - 1,
                n_qubits,
            });
        }

        let dim = 1usize << n_qubits;
        let mut mat = Array2::<Complex64>::zeros((dim, dim));

        for term in &self.terms {
            let c = Complex64::new(term.coeff, 0.0);
            for col in 0..dim {
                let (row, phase) = term.pauli.apply_to_index(col);
                mat[[row, col]] += c * phase;
            }
        }

        Ok(mat)
    }
}

impl FromIterator<SpinTerm> for SpinHamiltonian {
    fn from_iter<T: IntoIterator<Item = SpinTerm>>(iter: T) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}
