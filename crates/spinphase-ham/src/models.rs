//! Spin-chain model builders.
//!
//! Two open-chain models, both with a transverse field h:
//!
//! - Transverse-field Ising:  H = -J Σᵢ ZᵢZᵢ₊₁ − h Σᵢ Xᵢ
//! - ANNNI:                   H = -J Σᵢ ZᵢZᵢ₊₁ + κJ Σᵢ ZᵢZᵢ₊₂ − h Σᵢ Xᵢ
//!
//! The ANNNI next-nearest-neighbour coupling is antiferromagnetic for
//! κ > 0, which is what produces the richer phase structure.

use crate::error::{HamError, HamResult};
use crate::pauli::{SpinHamiltonian, SpinTerm};

/// Transverse-field Ising chain on `n_qubits` spins, open boundaries.
pub fn ising_chain(n_qubits: usize, j: f64, h: f64) -> HamResult<SpinHamiltonian> {
    if n_qubits < 2 {
        return Err(HamError::TooFewQubits {
            model: "ising",
            min: 2,
            got: n_qubits,
        });
    }

    let mut terms = Vec::with_capacity(2 * n_qubits - 1);
    for q in 0..n_qubits - 1 {
        terms.push(SpinTerm::zz(q as u32, (q + 1) as u32, -j));
    }
    for q in 0..n_qubits {
        terms.push(SpinTerm::x(q as u32, -h));
    }
    Ok(SpinHamiltonian::from_terms(terms))
}

/// ANNNI chain on `n_qubits` spins, open boundaries.
///
/// `kappa` is the frustration ratio of next-nearest to nearest-neighbour
/// coupling; `kappa = 0` reduces to the Ising chain.
pub fn annni_chain(n_qubits: usize, j: f64, kappa: f64, h: f64) -> HamResult<SpinHamiltonian> {
    if n_qubits < 3 {
        return Err(HamError::TooFewQubits {
            model: "annni",
            min: 3,
            got: n_qubits,
        });
    }

    let mut terms = Vec::with_capacity(3 * n_qubits - 3);
    for q in 0..n_qubits - 1 {
        terms.push(SpinTerm::zz(q as u32, (q + 1) as u32, -j));
    }
    for q in 0..n_qubits - 2 {
        terms.push(SpinTerm::zz(q as u32, (q + 2) as u32, kappa * j));
    }
    for q in 0..n_qubits {
        terms.push(SpinTerm::x(q as u32, -h));
    }
    Ok(SpinHamiltonian::from_terms(terms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ising_term_count() {
        let h = ising_chain(4, 1.0, 0.5).unwrap();
        // 3 ZZ couplings + 4 X fields
        assert_eq!(h.n_terms(), 7);
        assert_eq!(h.min_qubits(), 4);
    }

    #[test]
    fn annni_term_count() {
        let h = annni_chain(5, 1.0, 0.3, 0.5).unwrap();
        // 4 ZZ + 3 next-nearest ZZ + 5 X
        assert_eq!(h.n_terms(), 12);
    }

    #[test]
    fn annni_at_zero_kappa_matches_ising_spectrum() {
        let a = annni_chain(3, 1.0, 0.0, 0.7).unwrap().dense(3).unwrap();
        let i = ising_chain(3, 1.0, 0.7).unwrap().dense(3).unwrap();
        // The κ=0 next-nearest terms have zero coefficient, so the dense
        // matrices agree entrywise.
        for (x, y) in a.iter().zip(i.iter()) {
            assert!((x - y).norm() < 1e-12);
        }
    }

    #[test]
    fn too_few_qubits_rejected() {
        assert!(ising_chain(1, 1.0, 0.5).is_err());
        assert!(annni_chain(2, 1.0, 0.1, 0.5).is_err());
    }
}
