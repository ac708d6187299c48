//! The Hamiltonian grid: one spin-chain Hamiltonian per (κ, h) lattice point.
//!
//! Ordering invariant: grid storage is **kappa-major** — all h values for
//! κ₀ first, then κ₁, and so on.  Every consumer (parameter tensors, state
//! tensors, diagnostics) indexes by the same flat order, so this invariant
//! must never drift from the lattice iteration below.

use ndarray::{Array1, Array2, ArrayView2};
use num_complex::Complex64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

use crate::error::{HamError, HamResult};
use crate::models::{annni_chain, ising_chain};
use crate::pauli::SpinHamiltonian;
use crate::solve::ground_states;

/// An ordered grid of spin-chain Hamiltonians over a (κ, h) lattice.
///
/// Dense matrices and exact references are computed lazily and cached; the
/// symbolic term lists are what gets serialized.
#[derive(Debug, Serialize, Deserialize)]
pub struct HamiltonianGrid {
    n_qubits: usize,
    kappas: Vec<f64>,
    hs: Vec<f64>,
    hamiltonians: Vec<SpinHamiltonian>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recycle_override: Option<Vec<usize>>,
    #[serde(skip)]
    dense: OnceLock<Vec<Array2<Complex64>>>,
    #[serde(skip)]
    reference: OnceLock<(Array1<f64>, Array2<Complex64>)>,
}

impl HamiltonianGrid {
    /// Transverse-field Ising grid: a single κ = 0 row of `n_hs` field
    /// values h ∈ [0, h_max].
    pub fn ising(n_qubits: usize, n_hs: usize, h_max: f64) -> HamResult<Self> {
        let hs = linspace(h_max, n_hs).ok_or(HamError::EmptyAxis { axis: "h" })?;
        let hamiltonians = hs
            .iter()
            .map(|&h| ising_chain(n_qubits, 1.0, h))
            .collect::<HamResult<Vec<_>>>()?;
        Self::from_parts(n_qubits, vec![0.0], hs, hamiltonians)
    }

    /// ANNNI grid: `n_kappas × n_hs` lattice with κ ∈ [0, kappa_max] and
    /// h ∈ [0, h_max], kappa-major.
    pub fn annni(
        n_qubits: usize,
        n_kappas: usize,
        n_hs: usize,
        kappa_max: f64,
        h_max: f64,
    ) -> HamResult<Self> {
        let kappas = linspace(kappa_max, n_kappas).ok_or(HamError::EmptyAxis { axis: "kappa" })?;
        let hs = linspace(h_max, n_hs).ok_or(HamError::EmptyAxis { axis: "h" })?;

        let mut hamiltonians = Vec::with_capacity(n_kappas * n_hs);
        for &kappa in &kappas {
            for &h in &hs {
                hamiltonians.push(annni_chain(n_qubits, 1.0, kappa, h)?);
            }
        }
        Self::from_parts(n_qubits, kappas, hs, hamiltonians)
    }

    /// Assemble a grid from explicit parts.
    ///
    /// `hamiltonians` must be kappa-major and match the lattice size; every
    /// Hamiltonian must fit in `n_qubits` qubits.  This is the entry point
    /// for custom lattices and for injecting permuted orderings in tests.
    pub fn from_parts(
        n_qubits: usize,
        kappas: Vec<f64>,
        hs: Vec<f64>,
        hamiltonians: Vec<SpinHamiltonian>,
    ) -> HamResult<Self> {
        if kappas.is_empty() {
            return Err(HamError::EmptyAxis { axis: "kappa" });
        }
        if hs.is_empty() {
            return Err(HamError::EmptyAxis { axis: "h" });
        }
        for h in &hamiltonians {
            if h.min_qubits() as usize > n_qubits {
                return Err(HamError::QubitOutOfRange {
                    qubit: h.min_qubits() - 1,
                    n_qubits,
                });
            }
        }
        debug_assert_eq!(hamiltonians.len(), kappas.len() * hs.len());

        Ok(Self {
            n_qubits,
            kappas,
            hs,
            hamiltonians,
            recycle_override: None,
            dense: OnceLock::new(),
            reference: OnceLock::new(),
        })
    }

    /// Number of qubits per chain.
    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    /// Hilbert-space dimension 2^N.
    pub fn dim(&self) -> usize {
        1 << self.n_qubits
    }

    /// Number of κ lattice points.
    pub fn n_kappas(&self) -> usize {
        self.kappas.len()
    }

    /// Number of h lattice points.
    pub fn n_hs(&self) -> usize {
        self.hs.len()
    }

    /// Total number of grid points.
    pub fn n_states(&self) -> usize {
        self.hamiltonians.len()
    }

    /// κ axis values.
    pub fn kappas(&self) -> &[f64] {
        &self.kappas
    }

    /// h axis values.
    pub fn hs(&self) -> &[f64] {
        &self.hs
    }

    /// Flat index of lattice point (κ index, h index) — kappa-major.
    pub fn index(&self, kappa_idx: usize, h_idx: usize) -> usize {
        kappa_idx * self.hs.len() + h_idx
    }

    /// The (κ, h) values at a flat index.
    pub fn params_at(&self, idx: usize) -> (f64, f64) {
        let n_hs = self.hs.len();
        (self.kappas[idx / n_hs], self.hs[idx % n_hs])
    }

    /// Symbolic Hamiltonian at a flat index.
    pub fn hamiltonian(&self, idx: usize) -> &SpinHamiltonian {
        &self.hamiltonians[idx]
    }

    /// Dense matrices for every grid point, realised on first use.
    pub fn matrices(&self) -> &[Array2<Complex64>] {
        self.dense.get_or_init(|| {
            debug!(
                n_states = self.hamiltonians.len(),
                dim = self.dim(),
                "realising dense Hamiltonian matrices"
            );
            self.hamiltonians
                .par_iter()
                .map(|h| {
                    h.dense(self.n_qubits)
                        .expect("qubit bounds validated at construction")
                })
                .collect()
        })
    }

    /// Dense matrix at one flat index.
    pub fn mat(&self, idx: usize) -> ArrayView2<'_, Complex64> {
        self.matrices()[idx].view()
    }

    /// Exact ground energies, one per grid point.
    pub fn true_e(&self) -> &Array1<f64> {
        &self.solve_reference().0
    }

    /// Exact ground states, row-aligned with grid order.
    pub fn true_states(&self) -> &Array2<Complex64> {
        &self.solve_reference().1
    }

    fn solve_reference(&self) -> &(Array1<f64>, Array2<Complex64>) {
        self.reference.get_or_init(|| ground_states(self.matrices()))
    }

    /// Override the traversal order handed to recycle-mode training.
    ///
    /// The order must be a permutation of the flat grid indices.  Consumers
    /// follow whatever order this grid supplies; they never re-derive it.
    pub fn set_recycle_rule(&mut self, rule: Vec<usize>) -> HamResult<()> {
        let n = self.n_states();
        let mut seen = vec![false; n];
        for &i in &rule {
            if i >= n || seen[i] {
                return Err(HamError::BadTraversal { n_states: n });
            }
            seen[i] = true;
        }
        if rule.len() != n {
            return Err(HamError::BadTraversal { n_states: n });
        }
        self.recycle_override = Some(rule);
        Ok(())
    }

    /// Traversal order for recycle-mode training.
    ///
    /// An explicitly set order wins; the default is a kappa-major snake
    /// walk — the h sweep alternates direction on each κ row, so
    /// consecutive traversal points are always lattice neighbours.
    pub fn recycle_rule(&self) -> Vec<usize> {
        if let Some(rule) = &self.recycle_override {
            return rule.clone();
        }
        let n_hs = self.hs.len();
        let mut order = Vec::with_capacity(self.n_states());
        for k in 0..self.kappas.len() {
            if k % 2 == 0 {
                order.extend((0..n_hs).map(|h| self.index(k, h)));
            } else {
                order.extend((0..n_hs).rev().map(|h| self.index(k, h)));
            }
        }
        order
    }
}

impl Clone for HamiltonianGrid {
    fn clone(&self) -> Self {
        // Caches are cheap to recompute relative to training; a clone starts
        // cold rather than cloning the dense tensors.
        Self {
            n_qubits: self.n_qubits,
            kappas: self.kappas.clone(),
            hs: self.hs.clone(),
            hamiltonians: self.hamiltonians.clone(),
            recycle_override: self.recycle_override.clone(),
            dense: OnceLock::new(),
            reference: OnceLock::new(),
        }
    }
}

/// `n` evenly spaced values from 0 to `max` inclusive; `None` for `n == 0`.
fn linspace(max: f64, n: usize) -> Option<Vec<f64>> {
    match n {
        0 => None,
        1 => Some(vec![0.0]),
        _ => Some(
            (0..n)
                .map(|i| max * i as f64 / (n - 1) as f64)
                .collect(),
        ),
    }
}
