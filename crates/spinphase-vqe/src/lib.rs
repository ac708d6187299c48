//! `spinphase-vqe` — the VQE training engine.
//!
//! Finds, for every point of a spin-chain Hamiltonian grid, circuit
//! parameters whose simulated state minimises the expected energy.  Two
//! schedules are available:
//!
//! - **independent**: every grid point descends simultaneously under one
//!   Adam instance, with an optional fidelity coupling between adjacent
//!   points;
//! - **recycle**: points are trained sequentially along the grid's
//!   traversal order, each warm-started from its predecessor.
//!
//! Gradients are exact, via the parameter-shift rule.  Diagnostics compare
//! against exact diagonalisation.  A one-time batched→sequential evaluator
//! downgrade absorbs allocation failure on large grids.
//!
//! # Quick start
//!
//! ```no_run
//! use spinphase_ham::HamiltonianGrid;
//! use spinphase_circuit::Ansatz;
//! use spinphase_vqe::{TrainConfig, Vqe};
//!
//! let grid = HamiltonianGrid::ising(4, 16, 2.0)?;
//! let mut vqe = Vqe::new(grid, Ansatz::IsingChain)?;
//! vqe.train(&TrainConfig { n_epochs: 2000, ..TrainConfig::default() })?;
//!
//! let energies = vqe.energies().expect("populated by train");
//! println!("ground-energy estimates: {energies}");
//! # Ok::<(), spinphase_vqe::VqeError>(())
//! ```

pub mod engine;
pub mod error;
pub mod evaluator;
pub mod gradient;
pub mod losses;
pub mod optimizer;
pub mod persist;

pub use engine::{DiagnosticSample, TrainConfig, TrainingState, Vqe};
pub use error::{VqeError, VqeResult};
pub use evaluator::{Evaluator, Strategy};
pub use optimizer::{Adam, AdamConfig};
pub use persist::{load, save};
