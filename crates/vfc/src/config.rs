//! Configuration settings for a vibrational frequency calculation

use std::{
    error::Error,
    fmt::{Debug, Display},
    path::Path,
};

use pes::{FitSettings, HessianSteps, Settings, Units};
use serde::{Deserialize, Serialize};

/// upper limit on `max_half_width`, far wider than any sampled surface
const MAX_HALF_WIDTH: usize = 1000;

#[cfg(test)]
mod tests;

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    /// The directory containing the Gaussian output files, one per geometry,
    /// with names like `H2O.r0.96theta104.5.out`.
    outfiles: String,

    /// A label for the molecule. Defaults to the first three characters of
    /// the name of `outfiles`.
    name: Option<String>,

    /// The largest relative error in the r force constant to accept. Defaults
    /// to 0.05.
    r_threshold: Option<f64>,

    /// The largest relative error in the θ force constant to accept. Defaults
    /// to 0.02.
    theta_threshold: Option<f64>,

    /// The largest window half-width to try when fitting. Defaults to 10, for
    /// windows of 21 points.
    max_half_width: Option<usize>,

    /// The spacing of the bond lengths in the grid in Å. Defaults to 0.05.
    r_step: Option<f64>,

    /// The spacing of the bond angles in the grid in degrees. Defaults to 1.
    theta_step: Option<f64>,

    /// Step sizes for the finite-difference Hessian. Any omitted field keeps
    /// its default.
    hessian: Option<HessianSteps>,

    /// Physical constants used to convert force constants to wavenumbers.
    /// Any omitted field keeps its default.
    units: Option<Units>,
}

/// Construct a [Config] using [Config::load] on a TOML file or [Config::new]
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(from = "RawConfig")]
pub struct Config {
    /// directory of Gaussian output files
    pub outfiles: String,

    /// label used in the output
    pub name: String,

    /// everything passed on to [pes::analyze]
    pub settings: Settings,
}

impl From<RawConfig> for Config {
    fn from(rc: RawConfig) -> Self {
        let defaults = FitSettings::default();
        let name = rc.name.unwrap_or_else(|| default_name(&rc.outfiles));
        Self {
            outfiles: rc.outfiles,
            name,
            settings: Settings {
                fit: FitSettings {
                    r_step: rc.r_step.unwrap_or(defaults.r_step),
                    theta_step: rc.theta_step.unwrap_or(defaults.theta_step),
                    r_threshold: rc.r_threshold.unwrap_or(defaults.r_threshold),
                    theta_threshold: rc
                        .theta_threshold
                        .unwrap_or(defaults.theta_threshold),
                    max_half_width: rc
                        .max_half_width
                        .unwrap_or(defaults.max_half_width),
                },
                hessian: rc.hessian.unwrap_or_default(),
                units: rc.units.unwrap_or_default(),
            },
        }
    }
}

/// the first three characters of the last component of `outfiles`, so
/// `H2Ooutfiles` becomes `H2O`
fn default_name(outfiles: &str) -> String {
    Path::new(outfiles)
        .file_name()
        .map(|s| s.to_string_lossy().chars().take(3).collect())
        .unwrap_or_default()
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    ReadError(String, std::io::ErrorKind),
    ParseError(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(file, kind) => {
                write!(f, "failed to read {file}: {kind}")
            }
            ConfigError::ParseError(e) => write!(f, "{e}"),
            ConfigError::Invalid(e) => write!(f, "invalid setting: {e}"),
        }
    }
}

impl Error for ConfigError {}

impl Config {
    /// Construct a [Config] with the default [Settings] and the name derived
    /// from `outfiles`
    pub fn new(outfiles: impl Into<String>) -> Self {
        let outfiles = outfiles.into();
        Self {
            name: default_name(&outfiles),
            outfiles,
            settings: Settings::default(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn outfiles(mut self, outfiles: impl Into<String>) -> Self {
        self.outfiles = outfiles.into();
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// load a [Config] from the TOML file specified by `filename` and check
    /// that its settings make sense
    pub fn load<P>(filename: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path> + Debug,
    {
        let contents = std::fs::read_to_string(&filename).map_err(|e| {
            ConfigError::ReadError(format!("{filename:?}"), e.kind())
        })?;
        let ret: Self = toml::from_str(&contents).map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to deserialize config file '{filename:?}' with {e}"
            ))
        })?;
        ret.validate()?;
        Ok(ret)
    }

    /// check that the thresholds, step sizes, and unit constants are positive
    /// and that `max_half_width` is in `1..=MAX_HALF_WIDTH`
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Settings {
            fit,
            hessian,
            units,
        } = &self.settings;
        let positive = [
            ("r_threshold", fit.r_threshold),
            ("theta_threshold", fit.theta_threshold),
            ("r_step", fit.r_step),
            ("theta_step", fit.theta_step),
            ("hessian.dr", hessian.dr),
            ("hessian.dtheta", hessian.dtheta),
            ("hessian.mixed_dr", hessian.mixed_dr),
            ("hessian.mixed_dtheta", hessian.mixed_dtheta),
            ("units.hartree", units.hartree),
            ("units.degree", units.degree),
            ("units.proton_mass", units.proton_mass),
            ("units.angstrom", units.angstrom),
            ("units.light_speed", units.light_speed),
        ];
        for (name, v) in positive {
            if !(v > 0.0 && v.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive, got {v}"
                )));
            }
        }
        if !(1..=MAX_HALF_WIDTH).contains(&fit.max_half_width) {
            return Err(ConfigError::Invalid(format!(
                "max_half_width must be between 1 and {MAX_HALF_WIDTH}, got {}",
                fit.max_half_width
            )));
        }
        Ok(())
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Config {
            outfiles,
            name,
            settings:
                Settings {
                    fit:
                        FitSettings {
                            r_step,
                            theta_step,
                            r_threshold,
                            theta_threshold,
                            max_half_width,
                        },
                    hessian:
                        HessianSteps {
                            dr,
                            dtheta,
                            mixed_dr,
                            mixed_dtheta,
                        },
                    units:
                        Units {
                            hartree,
                            degree,
                            proton_mass,
                            angstrom,
                            light_speed,
                        },
                },
        } = self;
        write!(
            f,
            "Configuration Options:
outfiles = {outfiles}
name = {name}
r_threshold = {r_threshold}
theta_threshold = {theta_threshold}
max_half_width = {max_half_width}
r_step = {r_step}
theta_step = {theta_step}
hessian = {{ dr = {dr}, dtheta = {dtheta}, mixed_dr = {mixed_dr}, \
mixed_dtheta = {mixed_dtheta} }}
units = {{ hartree = {hartree:e}, degree = {degree}, \
proton_mass = {proton_mass:e}, angstrom = {angstrom:e}, \
light_speed = {light_speed:e} }}
"
        )
    }
}
