// src/spectral/variance.rs

use std::f64::consts::PI;

use crate::spectral::matrix::SpectrumSlots;
use crate::spectral::variable::Variable;

/// Directional spectrum of bin `i` at angle `theta`.
pub fn spectrum(slots: &SpectrumSlots, i: usize, theta: f64) -> f64 {
    let density = slots[Variable::DENSITY.slot()][i];
    let r1 = slots[Variable::R_1.slot()][i];
    let r2 = slots[Variable::R_2.slot()][i];
    let alpha1 = slots[Variable::ALPHA_1.slot()][i];
    let alpha2 = slots[Variable::ALPHA_2.slot()][i];
    density
        * (1.0 / PI)
        * (0.5 + 0.01 * r1 * (theta - alpha1).cos() + 0.01 * r2 * (2.0 * (theta - alpha2)).cos())
}

/// Sum of [`spectrum`] over `n` bins and `n` angles evenly spaced on
/// `[0, 2π)`, with `n` the shortest of the frequency vector and the slots.
///
/// Summation order is bins outer, angles inner.
pub fn compute_variance(slots: &SpectrumSlots, frequencies: &[f64]) -> f64 {
    let shortest_slot = slots.iter().map(Vec::len).min().unwrap_or(0);
    let n = frequencies.len().min(shortest_slot);
    let (theta0, theta1) = (0.0, 2.0 * PI);

    let mut sum = 0.0;
    for i in 0..n {
        for j in 0..n {
            let theta = theta0 + (theta1 - theta0) * j as f64 / n as f64;
            sum += spectrum(slots, i, theta);
        }
    }
    sum
}
