use nalgebra::{Matrix2, SymmetricEigen};
use serde::{Deserialize, Serialize};

use crate::{Axis, Equilibrium, Grid, PesError};

/// displacements for the central-difference stencils, in Å and degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HessianSteps {
    /// step for ∂²E/∂r²
    pub dr: f64,
    /// step for ∂²E/∂θ²
    pub dtheta: f64,
    /// r step for the mixed derivative
    pub mixed_dr: f64,
    /// θ step for the mixed derivative
    pub mixed_dtheta: f64,
}

impl Default for HessianSteps {
    fn default() -> Self {
        Self {
            dr: 0.15,
            dtheta: 1.0,
            mixed_dr: 0.05,
            mixed_dtheta: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hessian {
    /// rows and columns ordered (r, θ)
    pub matrix: [[f64; 2]; 2],
    /// the larger eigenvalue
    pub k_stretch: f64,
    /// the smaller eigenvalue
    pub k_bend: f64,
    /// whether the eigenvector of the larger eigenvalue points mostly along r.
    /// if not, labeling it the stretch is suspect
    pub stretch_along_r: bool,
}

/// Compute the 2x2 matrix of second derivatives of the energy at `eq` by
/// central differences and diagonalize it. Stencil points are looked up with
/// the grid's own rounding, so every step must be a whole number of keys.
/// There is no fallback for a missing stencil point.
pub fn hessian(
    grid: &Grid,
    eq: &Equilibrium,
    steps: &HessianSteps,
) -> Result<Hessian, PesError> {
    let rounding = grid.rounding();
    let e = |dr: i64, dt: i64| {
        let energy = grid
            .displace(eq.key, Axis::R, dr)
            .and_then(|key| grid.displace(key, Axis::Theta, dt))
            .and_then(|key| grid.get(key));
        log::debug!("stencil point ({dr}, {dt}) -> {energy:?}");
        energy
    };
    let e0 = eq.energy;

    let dr = rounding.offset(Axis::R, steps.dr)?;
    let hrr = (e(dr, 0)? - 2.0 * e0 + e(-dr, 0)?) / steps.dr.powi(2);

    let dt = rounding.offset(Axis::Theta, steps.dtheta)?;
    let htt = (e(0, dt)? - 2.0 * e0 + e(0, -dt)?) / steps.dtheta.powi(2);

    let dr = rounding.offset(Axis::R, steps.mixed_dr)?;
    let dt = rounding.offset(Axis::Theta, steps.mixed_dtheta)?;
    let hrt = (e(-dr, -dt)? + e(dr, dt)? - e(dr, -dt)? - e(-dr, dt)?)
        / (4.0 * steps.mixed_dr * steps.mixed_dtheta);

    let matrix = Matrix2::new(hrr, hrt, hrt, htt);
    let SymmetricEigen {
        eigenvectors,
        eigenvalues,
    } = SymmetricEigen::new(matrix);
    let (big, small) = if eigenvalues[0] >= eigenvalues[1] {
        (0, 1)
    } else {
        (1, 0)
    };
    let v = eigenvectors.column(big);
    let stretch_along_r = v[0].abs() >= v[1].abs();
    if !stretch_along_r {
        log::warn!(
            "eigenvector of the largest Hessian eigenvalue ({:.6e}) is \
             dominated by theta, the stretch and bend labels may be swapped",
            eigenvalues[big]
        );
    }
    Ok(Hessian {
        matrix: [[hrr, hrt], [hrt, htt]],
        k_stretch: eigenvalues[big],
        k_bend: eigenvalues[small],
        stretch_along_r,
    })
}
