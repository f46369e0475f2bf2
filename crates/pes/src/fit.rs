use std::fmt::Display;

use nalgebra::Cholesky;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Dmat, Dvec, Equilibrium, Grid, PesError};

/// one of the two internal coordinates of the grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    R,
    Theta,
}

impl Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Axis::R => "r",
                Axis::Theta => "theta",
            }
        )
    }
}

/// a force constant along one axis with its one-standard-deviation
/// uncertainty, from a window of `2 * half_width + 1` points
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub k: f64,
    pub k_err: f64,
    pub half_width: usize,
}

impl FitResult {
    /// `k_err / k`, or infinity when the force constant was pinned at zero
    pub fn relative_error(&self) -> f64 {
        if self.k > 0.0 {
            self.k_err / self.k
        } else {
            f64::INFINITY
        }
    }

    pub fn npoints(&self) -> usize {
        2 * self.half_width + 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitSettings {
    /// spacing of the samples along r in Å
    pub r_step: f64,
    /// spacing of the samples along θ in degrees
    pub theta_step: f64,
    pub r_threshold: f64,
    pub theta_threshold: f64,
    /// the widest window tried is `2 * max_half_width + 1` points
    pub max_half_width: usize,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            r_step: 0.05,
            theta_step: 1.0,
            r_threshold: 0.05,
            theta_threshold: 0.02,
            max_half_width: 10,
        }
    }
}

impl FitSettings {
    pub fn step(&self, axis: Axis) -> f64 {
        match axis {
            Axis::R => self.r_step,
            Axis::Theta => self.theta_step,
        }
    }

    pub fn threshold(&self, axis: Axis) -> f64 {
        match axis {
            Axis::R => self.r_threshold,
            Axis::Theta => self.theta_threshold,
        }
    }
}

/// Fit `E(x) = E_eq + k/2 (x - x_eq)²` to the `2 * half_width + 1` samples
/// spaced by `step` along `axis` and centered on `eq`, holding the other
/// coordinate at its equilibrium value. `k` is bounded below by zero. Every
/// point of the window must be in `grid`.
pub fn fit_axis(
    grid: &Grid,
    eq: &Equilibrium,
    axis: Axis,
    step: f64,
    half_width: usize,
) -> Result<FitResult, PesError> {
    let rounding = grid.rounding();
    let off = rounding.offset(axis, step)?;
    let hw = i64::try_from(half_width).unwrap_or(i64::MAX);
    let (r0, t0) = rounding.coords(eq.key);
    // every point is looked up before anything is sized by `half_width`, so an
    // oversized window fails at its first missing sample
    let mut points = Vec::new();
    for j in -hw..=hw {
        let key = grid.displace(eq.key, axis, j.saturating_mul(off))?;
        let energy = grid.get(key)?;
        let (r, t) = rounding.coords(key);
        let dx = match axis {
            Axis::R => r - r0,
            Axis::Theta => t - t0,
        };
        points.push((0.5 * dx * dx, energy - eq.energy));
    }
    let n = points.len();
    let x = Dmat::from_iterator(n, 1, points.iter().map(|p| p.0));
    let y = Dvec::from_iterator(n, points.iter().map(|p| p.1));
    let (coeffs, inv) = solve_least_squares(&x, &y)?;
    let k = coeffs[0];
    if !k.is_finite() {
        return Err(PesError::FitSanity(format!(
            "non-finite force constant along {axis}"
        )));
    }
    let k = k.max(0.0);
    let resid = &y - x.column(0) * k;
    let s2 = resid.dot(&resid) / (n - 1) as f64;
    Ok(FitResult {
        k,
        k_err: (s2 * inv[(0, 0)]).sqrt(),
        half_width,
    })
}

/// Solve the ordinary least squares problem β = (XᵀX)⁻¹Xᵀy through the
/// Cholesky decomposition of XᵀX. Returns β and (XᵀX)⁻¹, the latter being the
/// unscaled covariance of the parameters
fn solve_least_squares(x: &Dmat, y: &Dvec) -> Result<(Dvec, Dmat), PesError> {
    let xt = x.transpose();
    let chol = Cholesky::new(&xt * x).ok_or_else(|| {
        PesError::FitSanity("singular normal equations".to_owned())
    })?;
    Ok((chol.solve(&(xt * y)), chol.inverse()))
}

/// Try every half-width from `settings.max_half_width` down to 1 along `axis`
/// and return the widest fit whose relative error is below the threshold for
/// that axis. Windows that run off the sampled grid are skipped. The trials
/// are independent, so they run in parallel before being scanned in order
pub fn select_window(
    grid: &Grid,
    eq: &Equilibrium,
    axis: Axis,
    settings: &FitSettings,
) -> Result<FitResult, PesError> {
    let step = settings.step(axis);
    let threshold = settings.threshold(axis);
    // a window of `2 * hw + 1` distinct points cannot be filled from fewer
    // samples
    let max_half_width =
        settings.max_half_width.min(grid.len().saturating_sub(1) / 2);
    if max_half_width < settings.max_half_width {
        log::debug!(
            "{axis}: only trying half-widths up to {max_half_width} for a grid \
             of {} samples",
            grid.len()
        );
    }
    let trials: Vec<_> = (1..max_half_width + 1)
        .into_par_iter()
        .rev()
        .map(|hw| (hw, fit_axis(grid, eq, axis, step, hw)))
        .collect();
    for (hw, trial) in trials {
        match trial {
            Ok(fit) if fit.relative_error() < threshold => {
                log::info!(
                    "{axis}: accepted {} points with k = {:.6e} ± {:.6e}",
                    fit.npoints(),
                    fit.k,
                    fit.k_err
                );
                return Ok(fit);
            }
            Ok(fit) => log::debug!(
                "{axis}: rejected half-width {hw}, relative error {:.4}",
                fit.relative_error()
            ),
            Err(e) if e.is_missing_sample() => {
                log::debug!("{axis}: skipping half-width {hw}: {e}")
            }
            Err(e) => return Err(e),
        }
    }
    Err(PesError::ExhaustedSearch { axis })
}
