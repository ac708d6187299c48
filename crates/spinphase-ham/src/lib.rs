//! `spinphase-ham` — spin-chain Hamiltonian grids and exact references.
//!
//! A Hamiltonian is a sum of weighted Pauli strings:
//!
//!   H = Σ_k  c_k · P_k
//!
//! where each P_k is a tensor product of single-qubit Pauli operators
//! (I, X, Y, Z) and c_k ∈ ℝ.  This crate builds the two chain models the
//! phase-diagram study needs — the transverse-field Ising chain and the
//! ANNNI chain — over a 2-D (κ, h) parameter lattice, realises each point
//! as a dense 2^N-dimensional Hermitian matrix, and computes exact ground
//! energies/states by dense eigendecomposition.
//!
//! # Quick start
//!
//! ```rust
//! use spinphase_ham::HamiltonianGrid;
//!
//! // 2-qubit Ising chain, 4 field values h ∈ [0, 2]
//! let grid = HamiltonianGrid::ising(2, 4, 2.0).unwrap();
//! assert_eq!(grid.n_states(), 4);
//! assert_eq!(grid.dim(), 4);
//! // Exact ground energies, one per grid point
//! assert_eq!(grid.true_e().len(), 4);
//! ```

pub mod error;
pub mod grid;
pub mod models;
pub mod pauli;
pub mod solve;

pub use error::{HamError, HamResult};
pub use grid::HamiltonianGrid;
pub use models::{annni_chain, ising_chain};
pub use pauli::{PauliOp, PauliString, SpinHamiltonian, SpinTerm};
pub use solve::{ground_state, ground_states};
