use std::{error::Error, fmt::Display};

use gauss::GaussError;
use pes::{Grid, PesError, Report, Rounding};

pub mod config;

use config::Config;

/// print a message to stderr and exit with status 1
#[macro_export]
macro_rules! die {
    ($($t:tt)*) => {{
        eprintln!($($t)*);
        std::process::exit(1);
    }};
}

#[derive(Debug, PartialEq)]
pub enum RunError {
    Gauss(GaussError),
    Pes(PesError),
}

impl From<GaussError> for RunError {
    fn from(value: GaussError) -> Self {
        Self::Gauss(value)
    }
}

impl From<PesError> for RunError {
    fn from(value: PesError) -> Self {
        Self::Pes(value)
    }
}

impl Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Gauss(e) => write!(f, "reading output files: {e}"),
            RunError::Pes(e) => write!(f, "{e}"),
        }
    }
}

impl Error for RunError {}

/// Size the global pool that reads the output files and runs the window
/// trials. `n = 0` leaves one thread per CPU. Only the first call takes effect
pub fn max_threads(n: usize) {
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(n)
        .build_global()
    {
        log::debug!("keeping the existing thread pool: {e}");
    }
}

/// load the samples in `config.outfiles` onto a grid and analyze it
pub fn run(config: &Config) -> Result<Report, RunError> {
    let samples = gauss::load_dir(&config.outfiles)?;
    if samples.is_empty() {
        log::warn!("no usable output files in {}", config.outfiles);
    }
    let grid = Grid::from_samples(samples, Rounding::default())?;
    Ok(pes::analyze(&grid, &config.settings)?)
}
