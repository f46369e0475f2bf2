use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Equilibrium, FitResult, Hessian, PesError};

/// the result of one estimation path, kept as a message on failure so it can
/// be reported next to the other path
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome<T> {
    Ok(T),
    Failed(String),
}

impl<T> Outcome<T> {
    pub fn ok(&self) -> Option<&T> {
        match self {
            Outcome::Ok(t) => Some(t),
            Outcome::Failed(_) => None,
        }
    }

    /// Returns `true` if the outcome is [`Failed`].
    ///
    /// [`Failed`]: Outcome::Failed
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(..))
    }
}

impl<T> From<Result<T, PesError>> for Outcome<T> {
    fn from(value: Result<T, PesError>) -> Self {
        match value {
            Ok(t) => Outcome::Ok(t),
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }
}

/// frequencies in cm⁻¹ from the adaptive-window curve fits
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fitted {
    pub r: FitResult,
    pub theta: FitResult,
    pub stretch: f64,
    pub stretch_err: f64,
    pub bend: f64,
    pub bend_err: f64,
}

/// frequencies in cm⁻¹ from the eigenvalues of the finite-difference Hessian
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagonalized {
    pub hessian: Hessian,
    pub stretch: f64,
    pub bend: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub equilibrium: Equilibrium,
    pub fitted: Outcome<Fitted>,
    pub diagonalized: Outcome<Diagonalized>,
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Equilibrium {
            r, theta, energy, ..
        } = self.equilibrium;
        writeln!(f, "Equilibrium Geometry:")?;
        writeln!(f, "r = {r:.2} Å")?;
        writeln!(f, "theta = {theta:.1}°")?;
        writeln!(f, "E = {energy:.10} Eh")?;
        writeln!(f)?;

        writeln!(f, "Vibrational Frequencies by Curve Fitting (cm-1):")?;
        match &self.fitted {
            Outcome::Ok(fit) => {
                for (label, res, unit) in
                    [("r", &fit.r, "Eh/Å²"), ("theta", &fit.theta, "Eh/deg²")]
                {
                    writeln!(
                        f,
                        "k({label}) = {:.6e} ± {:.6e} {unit}, \
                         {:.1}% error from {} points",
                        res.k,
                        res.k_err,
                        100.0 * res.relative_error(),
                        res.npoints(),
                    )?;
                }
                writeln!(
                    f,
                    "symmetric stretch = {:.2} ± {:.2}",
                    fit.stretch, fit.stretch_err
                )?;
                writeln!(f, "bend = {:.2} ± {:.2}", fit.bend, fit.bend_err)?;
            }
            Outcome::Failed(e) => writeln!(f, "failed: {e}")?,
        }
        writeln!(f)?;

        writeln!(f, "Vibrational Frequencies by Diagonalizing the Hessian (cm-1):")?;
        match &self.diagonalized {
            Outcome::Ok(diag) => {
                let [[hrr, hrt], [_, htt]] = diag.hessian.matrix;
                writeln!(f, "H = [{hrr:.6e}, {hrt:.6e}; {hrt:.6e}, {htt:.6e}]")?;
                writeln!(f, "symmetric stretch = {:.2}", diag.stretch)?;
                writeln!(f, "bend = {:.2}", diag.bend)?;
                if !diag.hessian.stretch_along_r {
                    writeln!(
                        f,
                        "warning: the largest eigenvalue does not belong to \
                         the r direction"
                    )?;
                }
            }
            Outcome::Failed(e) => writeln!(f, "failed: {e}")?,
        }
        Ok(())
    }
}
