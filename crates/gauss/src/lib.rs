//! Reading single-point energies out of Gaussian output files named for the
//! geometry they were run at, like `H2O.r0.70theta75.0.out`

use std::{
    error::Error,
    fmt::Display,
    fs::read_to_string,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use pes::Sample;
use rayon::prelude::*;
use regex::Regex;


#[derive(Debug, PartialEq)]
pub enum GaussError {
    FileNotFound(String),
    ReadFileError(String, std::io::ErrorKind),
    ReadDirError(String, std::io::ErrorKind),
    EnergyNotFound(String),
    EnergyParseError(String),
    GeomNotFound(String),
}

impl Display for GaussError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for GaussError {}

static GEOM_RE: OnceLock<Regex> = OnceLock::new();

/// Extract (r, θ) from a file name of the form `<prefix>.r<r>theta<θ>.out`
pub fn parse_geometry(filename: &str) -> Result<(f64, f64), GaussError> {
    let re = GEOM_RE.get_or_init(|| {
        Regex::new(r"(?:^|[^A-Za-z])r(\d+(?:\.\d*)?)theta(\d+(?:\.\d*)?)\.out$")
            .unwrap()
    });
    let err = || GaussError::GeomNotFound(filename.to_owned());
    let caps = re.captures(filename).ok_or_else(err)?;
    let r = caps[1].parse().map_err(|_| err())?;
    let theta = caps[2].parse().map_err(|_| err())?;
    Ok((r, theta))
}

/// Return the energy from the first `SCF Done:` line in `path`
pub fn read_energy(path: &Path) -> Result<f64, GaussError> {
    let name = path.display().to_string();
    if !path.exists() {
        return Err(GaussError::FileNotFound(name));
    }
    let contents = match read_to_string(path) {
        Ok(s) => s,
        Err(e) => return Err(GaussError::ReadFileError(name, e.kind())),
    };
    // SCF Done:  E(RB3LYP) =  -76.4089533233     A.U. after   10 cycles
    let line = contents
        .lines()
        .find(|line| line.contains("SCF Done:"))
        .ok_or_else(|| GaussError::EnergyNotFound(name.clone()))?;
    line.split_whitespace()
        .nth(4)
        .ok_or_else(|| GaussError::EnergyParseError(name.clone()))?
        .parse()
        .map_err(|_| GaussError::EnergyParseError(name))
}

/// Read the geometry from the name of `path` and the energy from its contents
pub fn read_sample(path: &Path) -> Result<Sample, GaussError> {
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let (r, theta) = parse_geometry(&filename)?;
    let energy = read_energy(path)?;
    Ok(Sample { r, theta, energy })
}

/// Load every `.out` file in `dir`, sorted by file name. Files that do not
/// yield a sample are logged and skipped, so the only error is failing to
/// read the directory itself
pub fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<Sample>, GaussError> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir).map_err(|e| {
        GaussError::ReadDirError(dir.display().to_string(), e.kind())
    })?;
    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "out"))
        .collect();
    paths.sort();
    let samples: Vec<_> = paths
        .par_iter()
        .filter_map(|p| match read_sample(p) {
            Ok(s) => Some(s),
            Err(e) => {
                log::warn!("skipping {} with {e}", p.display());
                None
            }
        })
        .collect();
    log::info!(
        "read {} of {} output files in {}",
        samples.len(),
        paths.len(),
        dir.display()
    );
    Ok(samples)
}
