//! Loss and fidelity functions.
//!
//! All pure numerics: states in, scalars out.  The VQE losses operate on
//! complex amplitude vectors; the classification losses at the bottom serve
//! the downstream phase classifier and take probabilities plus integer
//! labels.

use ndarray::{Array2, ArrayView1, ArrayView2};
use num_complex::Complex64;

/// ⟨ψ|H|ψ⟩ for a Hermitian H.
///
/// The value is mathematically real; floating-point residue in the
/// imaginary part is dropped rather than propagated.
pub fn expected_energy(state: ArrayView1<'_, Complex64>, h: ArrayView2<'_, Complex64>) -> f64 {
    let h_psi = h.dot(&state);
    let value: Complex64 = state
        .iter()
        .zip(h_psi.iter())
        .map(|(a, b)| a.conj() * b)
        .sum();
    debug_assert!(
        value.im.abs() < 1e-8 * (1.0 + value.re.abs()),
        "non-Hermitian energy residue: {}",
        value.im
    );
    value.re
}

/// |⟨a|b⟩|² — squared overlap of two states.
///
/// Symmetric in its arguments and invariant to a global phase on either
/// input by the modulus-squared form.
pub fn fidelity(a: ArrayView1<'_, Complex64>, b: ArrayView1<'_, Complex64>) -> f64 {
    let inner: Complex64 = a.iter().zip(b.iter()).map(|(x, y)| x.conj() * y).sum();
    inner.norm_sqr()
}

/// Mean fidelity over matched rows of two state tensors.
///
/// A training-quality metric, never the primary loss.
pub fn batched_mean_fidelity(
    reference: ArrayView2<'_, Complex64>,
    candidates: ArrayView2<'_, Complex64>,
) -> f64 {
    let n = reference.nrows();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = (0..n)
        .map(|i| fidelity(reference.row(i), candidates.row(i)))
        .sum();
    total / n as f64
}

/// Mean fidelity between each state and its successor in grid order.
///
/// Couples adjacent grid points; returns 0 when there are no pairs.
pub fn neighbouring_fidelity(states: ArrayView2<'_, Complex64>) -> f64 {
    let n = states.nrows();
    if n < 2 {
        return 0.0;
    }
    let total: f64 = (0..n - 1)
        .map(|i| fidelity(states.row(i), states.row(i + 1)))
        .sum();
    total / (n - 1) as f64
}

/// Mean squared error between predicted and reference energies.
pub fn energy_mse(pred: ArrayView1<'_, f64>, truth: ArrayView1<'_, f64>) -> f64 {
    let n = pred.len();
    if n == 0 {
        return 0.0;
    }
    pred.iter()
        .zip(truth.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        / n as f64
}

/// The independent-schedule training loss over a full grid:
/// mean energy plus the optional neighbour-coupling term.
///
/// With `reg == 0` the value is invariant to permuting grid order; with
/// `reg != 0` the neighbour term couples adjacent rows.
pub fn grid_loss(
    states: ArrayView2<'_, Complex64>,
    mats: &[Array2<Complex64>],
    reg: f64,
) -> f64 {
    let n = states.nrows();
    let mean_e: f64 = (0..n)
        .map(|i| expected_energy(states.row(i), mats[i].view()))
        .sum::<f64>()
        / n as f64;

    if reg != 0.0 {
        mean_e + reg * neighbouring_fidelity(states)
    } else {
        mean_e
    }
}

/// Per-row energies of a state tensor against its aligned matrix list.
pub fn grid_energies(
    states: ArrayView2<'_, Complex64>,
    mats: &[Array2<Complex64>],
) -> ndarray::Array1<f64> {
    (0..states.nrows())
        .map(|i| expected_energy(states.row(i), mats[i].view()))
        .collect()
}

// ---------------------------------------------------------------------------
// Classification losses (downstream phase classifier)
// ---------------------------------------------------------------------------

/// Binary cross-entropy: mean negative log-likelihood of the labelled
/// column of a `(n, 2)` probability table.
pub fn cross_entropy(probs: ArrayView2<'_, f64>, labels: &[usize]) -> f64 {
    let nll: f64 = labels
        .iter()
        .enumerate()
        .map(|(i, &y)| -probs[[i, y]].ln())
        .sum();
    nll / labels.len() as f64
}

/// Multiclass cross-entropy over a `(n, k)` probability table.
pub fn cross_entropy_multiclass(probs: ArrayView2<'_, f64>, labels: &[usize]) -> f64 {
    cross_entropy(probs, labels)
}

/// Hinge loss on the positive-class column of a `(n, 2)` probability table,
/// with labels in {0, 1} mapped to margins in {-1, +1}.
pub fn hinge(probs: ArrayView2<'_, f64>, labels: &[usize]) -> f64 {
    let total: f64 = labels
        .iter()
        .enumerate()
        .map(|(i, &y)| {
            let pred = 2.0 * probs[[i, 1]] - 1.0;
            let margin = 2.0 * y as f64 - 1.0;
            1.0 - pred * margin
        })
        .sum();
    total / labels.len() as f64
}
