//! `spinphase-circuit` — parameterized ansatz recipes.
//!
//! An ansatz is a pure recipe: given a qubit count and a flat parameter
//! slice, it emits an ordered gate sequence and reports how many parameters
//! it consumed.  Consumption halts based on the circuit *structure*, never
//! on the slice length, which is what makes parameter-count discovery with
//! an oversized placeholder vector work (see [`Ansatz::param_count`]).
//!
//! The recipes are layer compositions in the style of hardware-efficient
//! ansätze: rotation walls interleaved with entangling layers.
//!
//! ```rust
//! use spinphase_circuit::Ansatz;
//!
//! let ansatz = Ansatz::IsingChain;
//! let n_params = ansatz.param_count(4).unwrap();
//! let ops = ansatz.ops(4, &vec![0.1; n_params]).unwrap();
//! assert!(!ops.is_empty());
//! ```

pub mod error;
pub mod ops;
pub mod recipes;

pub use error::{CircuitError, CircuitResult};
pub use ops::GateOp;
pub use recipes::Ansatz;
