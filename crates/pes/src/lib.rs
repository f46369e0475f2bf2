//! Harmonic vibrational frequencies of a symmetric triatomic from a potential
//! energy surface sampled on a (bond length, bond angle) grid

use std::error::Error;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

pub mod fit;
pub mod freq;
pub mod grid;
pub mod hessian;
pub mod report;


pub use fit::{Axis, FitResult, FitSettings, fit_axis, select_window};
pub use freq::Units;
pub use grid::{Equilibrium, Grid, Key, Rounding, Sample};
pub use hessian::{Hessian, HessianSteps, hessian};
pub use report::{Diagonalized, Fitted, Outcome, Report};

pub type Dmat = nalgebra::DMatrix<f64>;
pub type Dvec = nalgebra::DVector<f64>;

#[derive(Debug, Clone, PartialEq)]
pub enum PesError {
    /// the grid has no samples
    EmptyGrid,
    /// no sample at this (rounded) geometry
    MissingSample { r: f64, theta: f64 },
    /// a force constant came out negative or non-finite
    FitSanity(String),
    /// no window half-width met the precision threshold along `axis`
    ExhaustedSearch { axis: Axis },
    /// attempted to insert a sample with a NaN or infinite value, or with a
    /// coordinate too large to key
    InvalidSample { r: f64, theta: f64, energy: f64 },
    /// a step size that is not a whole number of grid keys along `axis`
    UnrepresentableStep { axis: Axis, step: f64 },
}

impl PesError {
    /// Returns `true` if the error is [`MissingSample`].
    ///
    /// [`MissingSample`]: PesError::MissingSample
    #[must_use]
    pub fn is_missing_sample(&self) -> bool {
        matches!(self, Self::MissingSample { .. })
    }
}

impl Display for PesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PesError::EmptyGrid => write!(f, "no samples in the grid"),
            PesError::MissingSample { r, theta } => {
                write!(f, "no sample at r = {r}, theta = {theta}")
            }
            PesError::FitSanity(s) => write!(f, "unphysical fit: {s}"),
            PesError::ExhaustedSearch { axis } => write!(
                f,
                "no window along {axis} met the relative error threshold"
            ),
            PesError::InvalidSample { r, theta, energy } => write!(
                f,
                "unusable sample at r = {r}, theta = {theta}, E = {energy}"
            ),
            PesError::UnrepresentableStep { axis, step } => write!(
                f,
                "step of {step} along {axis} does not fall on the grid"
            ),
        }
    }
}

impl Error for PesError {}

/// Every tunable value of the analysis. The defaults reproduce the sampling of
/// the reference H₂O surfaces and the CODATA-ish constants they were
/// converted with
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub fit: FitSettings,
    pub hessian: HessianSteps,
    pub units: Units,
}

/// Run both estimation paths over `grid`. The curve fitting and the Hessian
/// diagonalization share nothing but the equilibrium point, and a failure in
/// one is recorded in the [Report] without affecting the other. The only
/// error returned directly is [PesError::EmptyGrid]
pub fn analyze(grid: &Grid, settings: &Settings) -> Result<Report, PesError> {
    let eq = grid.equilibrium()?;
    log::info!(
        "equilibrium at r = {:.2}, theta = {:.1} with E = {:.10}",
        eq.r,
        eq.theta,
        eq.energy
    );
    let fitted = curve_fit(grid, &eq, settings);
    if let Err(e) = &fitted {
        log::warn!("curve fitting failed: {e}");
    }
    let diagonalized = diagonalize(grid, &eq, settings);
    if let Err(e) = &diagonalized {
        log::warn!("Hessian diagonalization failed: {e}");
    }
    Ok(Report {
        equilibrium: eq,
        fitted: fitted.into(),
        diagonalized: diagonalized.into(),
    })
}

fn curve_fit(
    grid: &Grid,
    eq: &Equilibrium,
    settings: &Settings,
) -> Result<Fitted, PesError> {
    let r = select_window(grid, eq, Axis::R, &settings.fit)?;
    let theta = select_window(grid, eq, Axis::Theta, &settings.fit)?;
    let (stretch, bend) = settings.units.frequencies(r.k, theta.k, eq.r)?;
    let (stretch_err, bend_err) =
        settings.units.frequencies(r.k_err, theta.k_err, eq.r)?;
    Ok(Fitted {
        r,
        theta,
        stretch,
        stretch_err,
        bend,
        bend_err,
    })
}

fn diagonalize(
    grid: &Grid,
    eq: &Equilibrium,
    settings: &Settings,
) -> Result<Diagonalized, PesError> {
    let hessian = hessian(grid, eq, &settings.hessian)?;
    let (stretch, bend) =
        settings
            .units
            .frequencies(hessian.k_stretch, hessian.k_bend, eq.r)?;
    Ok(Diagonalized {
        hessian,
        stretch,
        bend,
    })
}
