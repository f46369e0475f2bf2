use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::PesError;

/// SI values of the units the grid is expressed in, plus the masses and the
/// speed of light needed to turn force constants into wavenumbers
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Units {
    /// J per Hartree
    pub hartree: f64,
    /// radians per degree
    pub degree: f64,
    /// kg
    pub proton_mass: f64,
    /// m per Å
    pub angstrom: f64,
    /// cm/s, so the frequencies come out in cm⁻¹
    pub light_speed: f64,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            hartree: 4.35974465054e-18,
            degree: 0.0174533,
            proton_mass: 1.6726219e-27,
            angstrom: 1e-10,
            light_speed: 29979245800.0,
        }
    }
}

impl Units {
    /// symmetric stretch wavenumber for a force constant `k_r` in Eh/Å². The
    /// reduced mass is that of two protons moving against a heavy center
    pub fn stretch(&self, k_r: f64) -> Result<f64, PesError> {
        if k_r < 0.0 {
            return Err(PesError::FitSanity(format!(
                "negative stretching force constant {k_r}"
            )));
        }
        let k = k_r * self.hartree * self.angstrom.powi(-2);
        Ok(self.wavenumber(k / (2.0 * self.proton_mass)))
    }

    /// bending wavenumber for a force constant `k_theta` in Eh/deg² at an
    /// equilibrium bond length of `r_eq` Å
    pub fn bend(&self, k_theta: f64, r_eq: f64) -> Result<f64, PesError> {
        if k_theta < 0.0 {
            return Err(PesError::FitSanity(format!(
                "negative bending force constant {k_theta}"
            )));
        }
        if r_eq <= 0.0 {
            return Err(PesError::FitSanity(format!(
                "non-positive bond length {r_eq}"
            )));
        }
        let k = k_theta * self.hartree * self.degree.powi(-2);
        let mu = (r_eq * self.angstrom).powi(2) * (0.5 * self.proton_mass);
        Ok(self.wavenumber(k / mu))
    }

    /// (symmetric stretch, bend) in cm⁻¹
    pub fn frequencies(
        &self,
        k_r: f64,
        k_theta: f64,
        r_eq: f64,
    ) -> Result<(f64, f64), PesError> {
        Ok((self.stretch(k_r)?, self.bend(k_theta, r_eq)?))
    }

    /// ν = √(k/μ) / 2πc
    fn wavenumber(&self, k_over_mu: f64) -> f64 {
        (1.0 / (2.0 * PI * self.light_speed)) * k_over_mu.sqrt()
    }
}
