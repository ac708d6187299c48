//! The VQE training engine.
//!
//! Owns one flat parameter vector per grid point and optimizes all of them
//! against their Hamiltonians under one of two schedules:
//!
//! - **Independent** — the whole parameter tensor descends simultaneously
//!   under a single Adam instance, with an optional neighbour-fidelity
//!   coupling term and periodic diagnostics against the exact references.
//! - **Recycle** — grid points are visited in the traversal order the grid
//!   supplies, each warm-started from its predecessor's converged
//!   parameters and penalised by overlap with the predecessor's state.
//!
//! All mutable run state lives in an explicit [`TrainingState`] record; the
//! engine replaces it wholesale at the start of every training call.

use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, info};

use spinphase_circuit::Ansatz;
use spinphase_ham::HamiltonianGrid;
use spinphase_sim::Statevector;

use crate::error::{VqeError, VqeResult};
use crate::evaluator::{Evaluator, Strategy};
use crate::gradient::{batched_loss_gradient, point_loss_gradient};
use crate::losses::grid_energies;
use crate::optimizer::{Adam, AdamConfig};

/// Hyperparameters for one training run.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Adam learning rate.
    pub lr: f64,
    /// Epoch budget (the recycle head point gets ten times this).
    pub n_epochs: usize,
    /// Regularization weight; 0 disables the coupling terms.
    pub reg: f64,
    /// Sequential warm-started schedule instead of the batched one.
    pub recycle: bool,
    /// Record the full parameter tensor every 10 epochs.
    ///
    /// Memory grows without bound for long runs; enabling this is an
    /// explicit trade for post-hoc trajectory inspection.
    pub save_trajectories: bool,
    /// Epochs between diagnostic evaluations in the independent schedule.
    pub epochs_batch_size: usize,
    /// Draw a progress bar while training.
    pub progress: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            lr: 0.01,
            n_epochs: 1000,
            reg: 0.0,
            recycle: false,
            save_trajectories: false,
            epochs_batch_size: 500,
            progress: true,
        }
    }
}

/// One periodic diagnostic record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticSample {
    /// Epoch the sample was taken at (1-based).
    pub epoch: usize,
    /// Mean squared error of predicted vs. exact ground energies.
    pub energy_mse: f64,
    /// Mean fidelity of predicted vs. exact ground states.
    pub mean_fidelity: f64,
}

/// All state a training run mutates, held in one explicit record.
#[derive(Debug, Default)]
pub struct TrainingState {
    /// One flat parameter vector per grid point, shape (n_states, n_params).
    pub params: Array2<f64>,
    /// Periodic (epoch, MSE, mean fidelity) samples; cleared at run start.
    pub diagnostics: Vec<DiagnosticSample>,
    /// Parameter-tensor snapshots every 10 epochs, when requested.
    pub trajectory: Vec<Array2<f64>>,
    /// Which schedule the last run used.
    pub recycle: bool,
}

/// The training engine: grid + ansatz + mutable run state + results.
#[derive(Debug)]
pub struct Vqe {
    grid: HamiltonianGrid,
    ansatz: Ansatz,
    n_params: usize,
    rng: StdRng,
    evaluator: Evaluator,
    state: TrainingState,
    energies: Option<Array1<f64>>,
    states: Option<Array2<Complex64>>,
}

impl Vqe {
    /// Build an engine for a grid and ansatz.
    ///
    /// Discovers the parameter count by invoking the recipe with an
    /// oversized placeholder (which also validates the ansatz against the
    /// grid width), then draws independent uniform initial angles in
    /// [-π, π] — the rotation manifold is 2π-periodic, so this range covers
    /// it without bias.
    pub fn new(grid: HamiltonianGrid, ansatz: Ansatz) -> VqeResult<Self> {
        let n_params = ansatz.param_count(grid.n_qubits())?;
        let mut rng = StdRng::from_entropy();
        let params = random_params(&mut rng, grid.n_states(), n_params);

        info!(
            n_qubits = grid.n_qubits(),
            n_states = grid.n_states(),
            n_params,
            ansatz = ansatz.name(),
            "initialised VQE engine"
        );

        Ok(Self {
            grid,
            ansatz,
            n_params,
            rng,
            evaluator: Evaluator::new(),
            state: TrainingState {
                params,
                ..TrainingState::default()
            },
            energies: None,
            states: None,
        })
    }

    /// Re-seed the engine and redraw the initial parameters, for
    /// reproducible runs.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.state.params = random_params(&mut self.rng, self.grid.n_states(), self.n_params);
        self
    }

    /// The Hamiltonian grid.
    pub fn grid(&self) -> &HamiltonianGrid {
        &self.grid
    }

    /// The ansatz recipe.
    pub fn ansatz(&self) -> Ansatz {
        self.ansatz
    }

    /// Parameters per grid point.
    pub fn n_params(&self) -> usize {
        self.n_params
    }

    /// The current parameter tensor.
    pub fn params(&self) -> &Array2<f64> {
        &self.state.params
    }

    /// Replace the parameter tensor (shape-checked).
    pub fn set_params(&mut self, params: Array2<f64>) -> VqeResult<()> {
        let expected = (self.grid.n_states(), self.n_params);
        if params.dim() != expected {
            return Err(VqeError::ShapeMismatch {
                expected,
                got: params.dim(),
            });
        }
        self.state.params = params;
        self.energies = None;
        self.states = None;
        Ok(())
    }

    /// Diagnostic samples from the last run.
    pub fn diagnostics(&self) -> &[DiagnosticSample] {
        &self.state.diagnostics
    }

    /// Parameter-tensor snapshots from the last run, if recorded.
    pub fn trajectory(&self) -> &[Array2<f64>] {
        &self.state.trajectory
    }

    /// Which evaluation strategy is currently selected.
    pub fn strategy(&self) -> Strategy {
        self.evaluator.strategy()
    }

    /// Make the next batched evaluation fail, exercising the permanent
    /// sequential downgrade without real memory pressure.
    pub fn inject_batched_failure(&mut self) {
        self.evaluator.inject_batched_failure();
    }

    /// Final energies, populated by [`Self::finalize`].
    pub fn energies(&self) -> Option<&Array1<f64>> {
        self.energies.as_ref()
    }

    /// Final states, populated by [`Self::finalize`].
    pub fn states(&self) -> Option<&Array2<Complex64>> {
        self.states.as_ref()
    }

    /// Run one full training pass and finalize.
    pub fn train(&mut self, cfg: &TrainConfig) -> VqeResult<()> {
        validate_config(cfg)?;

        self.state.diagnostics.clear();
        self.state.trajectory.clear();
        self.state.recycle = cfg.recycle;
        self.energies = None;
        self.states = None;

        info!(
            recycle = cfg.recycle,
            n_epochs = cfg.n_epochs,
            lr = cfg.lr,
            reg = cfg.reg,
            "starting VQE training"
        );

        if cfg.recycle {
            self.train_recycle(cfg)?;
        } else {
            self.train_independent(cfg)?;
        }

        self.finalize()
    }

    /// Recompute the final state tensor and energies from the current
    /// parameters, using the evaluation strategy selected during training.
    ///
    /// Pure recomputation: calling this twice on unchanged parameters
    /// yields identical results.
    pub fn finalize(&mut self) -> VqeResult<()> {
        let states =
            self.evaluator
                .state_tensor(self.ansatz, self.grid.n_qubits(), &self.state.params)?;
        let energies = grid_energies(states.view(), self.grid.matrices());
        self.energies = Some(energies);
        self.states = Some(states);
        Ok(())
    }

    /// Independent schedule: the whole tensor descends at once.
    fn train_independent(&mut self, cfg: &TrainConfig) -> VqeResult<()> {
        let ansatz = self.ansatz;
        let n_qubits = self.grid.n_qubits();

        // Reference computation: exact diagonalisation of the whole grid,
        // needed by every diagnostic evaluation.
        let true_e = self.grid.true_e().clone();
        let true_states = self.grid.true_states().clone();

        let mut adam = Adam::new(AdamConfig::with_lr(cfg.lr));
        let pb = training_bar(cfg.n_epochs as u64, cfg.progress);

        for epoch in 0..cfg.n_epochs {
            // The regularizer couples adjacent grid points, so it needs the
            // whole grid's states produced before the gradient.
            let states = if cfg.reg != 0.0 {
                Some(
                    self.evaluator
                        .state_tensor(ansatz, n_qubits, &self.state.params)?,
                )
            } else {
                None
            };

            let grads = batched_loss_gradient(
                ansatz,
                n_qubits,
                &self.state.params,
                self.grid.matrices(),
                cfg.reg,
                states.as_ref().map(|s| s.view()),
            )?;
            adam.step(&mut self.state.params, &grads);

            if (epoch + 1) % cfg.epochs_batch_size == 0 {
                let (mse, mean_f) = self.evaluator.diagnostics(
                    ansatz,
                    n_qubits,
                    &self.state.params,
                    self.grid.matrices(),
                    true_e.view(),
                    true_states.view(),
                )?;
                self.state.diagnostics.push(DiagnosticSample {
                    epoch: epoch + 1,
                    energy_mse: mse,
                    mean_fidelity: mean_f,
                });
                debug!(epoch = epoch + 1, mse, mean_f, "diagnostics");
                pb.set_message(format!("MSE {mse:.4e} | mean F {mean_f:.4}"));
            }

            if cfg.save_trajectories && epoch % 10 == 0 {
                self.state.trajectory.push(self.state.params.clone());
            }

            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(())
    }

    /// Recycle schedule: walk the grid's traversal order, warm-starting
    /// each point from the previous one.
    fn train_recycle(&mut self, cfg: &TrainConfig) -> VqeResult<()> {
        let ansatz = self.ansatz;
        let n_qubits = self.grid.n_qubits();
        let rule = self.grid.recycle_rule();
        let (head, chain) = recycle_plan(&rule);

        let pb = training_bar(rule.len() as u64, cfg.progress);

        // Head of the traversal: no warm start available, so a fresh random
        // vector gets a 10× epoch budget with the bare energy loss.
        let mut param = Array1::from_shape_fn(self.n_params, |_| self.rng.gen_range(-PI..PI));
        let mut adam = Adam::new(AdamConfig::with_lr(cfg.lr));
        for _ in 0..10 * cfg.n_epochs {
            let grads = point_loss_gradient(
                ansatz,
                n_qubits,
                param.as_slice().expect("contiguous vector"),
                self.grid.mat(head),
                0.0,
                None,
            )?;
            adam.step(&mut param, &grads);
        }

        let mut previous = point_state(ansatz, n_qubits, &param)?;
        self.state.params.row_mut(head).assign(&param);
        pb.set_message(format!("point {head}"));
        pb.inc(1);

        // Each subsequent point: fresh moment accumulators, warm-started
        // parameters, overlap penalty against exactly its predecessor.
        for &(point, _predecessor) in &chain {
            let mut adam = Adam::new(AdamConfig::with_lr(cfg.lr));
            for _ in 0..cfg.n_epochs {
                let grads = point_loss_gradient(
                    ansatz,
                    n_qubits,
                    param.as_slice().expect("contiguous vector"),
                    self.grid.mat(point),
                    cfg.reg,
                    Some(previous.view()),
                )?;
                adam.step(&mut param, &grads);
            }

            previous = point_state(ansatz, n_qubits, &param)?;
            // Scatter by grid index: traversal order need not match
            // storage order.
            self.state.params.row_mut(point).assign(&param);
            pb.set_message(format!("point {point}"));
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(())
    }
}

/// The traversal plan: the head point plus each later point paired with
/// the predecessor whose converged state regularizes it.
fn recycle_plan(rule: &[usize]) -> (usize, Vec<(usize, usize)>) {
    let head = rule[0];
    let chain = rule.windows(2).map(|w| (w[1], w[0])).collect();
    (head, chain)
}

/// Simulate a single point's state from its parameter vector.
fn point_state(
    ansatz: Ansatz,
    n_qubits: usize,
    param: &Array1<f64>,
) -> VqeResult<Array1<Complex64>> {
    let ops = ansatz.ops(n_qubits, param.as_slice().expect("contiguous vector"))?;
    Ok(Statevector::run(n_qubits, &ops))
}

fn random_params(rng: &mut StdRng, n_states: usize, n_params: usize) -> Array2<f64> {
    Array2::from_shape_fn((n_states, n_params), |_| rng.gen_range(-PI..PI))
}

fn validate_config(cfg: &TrainConfig) -> VqeResult<()> {
    if !cfg.lr.is_finite() || cfg.lr <= 0.0 {
        return Err(VqeError::NonPositive { name: "lr" });
    }
    if cfg.n_epochs == 0 {
        return Err(VqeError::NonPositive { name: "n_epochs" });
    }
    if cfg.epochs_batch_size == 0 {
        return Err(VqeError::NonPositive {
            name: "epochs_batch_size",
        });
    }
    Ok(())
}

fn training_bar(len: u64, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap()
        .progress_chars("#>-"),
    );
    pb
}
