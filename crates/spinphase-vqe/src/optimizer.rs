//! Adam optimizer.
//!
//! Self-contained adaptive gradient descent with bias-corrected moment
//! estimates.  One instance serves a whole independent-schedule run; the
//! recycle schedule re-creates an instance per grid point so each point
//! starts with fresh moment accumulators.

use ndarray::{Array, Dimension, Zip};

/// Adam hyperparameters.
#[derive(Debug, Clone)]
pub struct AdamConfig {
    /// Learning rate.
    pub lr: f64,
    /// First-moment decay.
    pub beta1: f64,
    /// Second-moment decay.
    pub beta2: f64,
    /// Denominator stabiliser.
    pub epsilon: f64,
}

impl AdamConfig {
    /// Standard decay constants with the given learning rate.
    pub fn with_lr(lr: f64) -> Self {
        Self { lr, ..Self::default() }
    }
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            lr: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

/// Adam state over an arbitrary-dimensional parameter array.
///
/// Moments are allocated lazily on the first step, matching the gradient
/// shape.
#[derive(Debug)]
pub struct Adam<D: Dimension> {
    cfg: AdamConfig,
    t: i32,
    m: Option<Array<f64, D>>,
    v: Option<Array<f64, D>>,
}

impl<D: Dimension> Adam<D> {
    /// Fresh optimizer state.
    pub fn new(cfg: AdamConfig) -> Self {
        Self {
            cfg,
            t: 0,
            m: None,
            v: None,
        }
    }

    /// One bias-corrected update, applied to `params` in place.
    pub fn step(&mut self, params: &mut Array<f64, D>, grads: &Array<f64, D>) {
        let m = self
            .m
            .get_or_insert_with(|| Array::zeros(grads.raw_dim()));
        let v = self
            .v
            .get_or_insert_with(|| Array::zeros(grads.raw_dim()));

        self.t += 1;
        let b1 = self.cfg.beta1;
        let b2 = self.cfg.beta2;
        let bias1 = 1.0 - b1.powi(self.t);
        let bias2 = 1.0 - b2.powi(self.t);
        let lr = self.cfg.lr;
        let eps = self.cfg.epsilon;

        Zip::from(params)
            .and(m)
            .and(v)
            .and(grads)
            .for_each(|p, m, v, &g| {
                *m = b1 * *m + (1.0 - b1) * g;
                *v = b2 * *v + (1.0 - b2) * g * g;
                let m_hat = *m / bias1;
                let v_hat = *v / bias2;
                *p -= lr * m_hat / (v_hat.sqrt() + eps);
            });
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> i32 {
        self.t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2, array};

    #[test]
    fn converges_on_quadratic() {
        // Minimize (x-1)² + (y+2)²
        let mut params: Array1<f64> = array![4.0, 4.0];
        let mut adam = Adam::new(AdamConfig::with_lr(0.1));

        for _ in 0..500 {
            let grads = array![2.0 * (params[0] - 1.0), 2.0 * (params[1] + 2.0)];
            adam.step(&mut params, &grads);
        }

        assert!((params[0] - 1.0).abs() < 1e-2);
        assert!((params[1] + 2.0).abs() < 1e-2);
    }

    #[test]
    fn first_step_moves_by_roughly_lr() {
        // With bias correction, |Δ| ≈ lr on the first step regardless of
        // gradient magnitude.
        let mut params: Array1<f64> = array![0.0];
        let mut adam = Adam::new(AdamConfig::with_lr(0.05));
        adam.step(&mut params, &array![123.0]);
        assert!((params[0] + 0.05).abs() < 1e-6);
    }

    #[test]
    fn works_on_matrices() {
        let mut params: Array2<f64> = Array2::from_elem((3, 2), 1.0);
        let grads = Array2::from_elem((3, 2), 1.0);
        let mut adam = Adam::new(AdamConfig::with_lr(0.1));
        adam.step(&mut params, &grads);
        // All entries move identically under identical gradients.
        let first = params[[0, 0]];
        assert!(params.iter().all(|&p| (p - first).abs() < 1e-12));
        assert_eq!(adam.steps(), 1);
    }
}
