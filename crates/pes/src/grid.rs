use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{Axis, PesError};

/// a single point on the potential energy surface: bond length in Å, bond
/// angle in degrees, and energy in Hartree
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub r: f64,
    pub theta: f64,
    pub energy: f64,
}

impl Sample {
    pub fn new(r: f64, theta: f64, energy: f64) -> Self {
        Self { r, theta, energy }
    }
}

/// Number of decimal places kept in each coordinate when it is turned into a
/// [Key]. The default of 2 for r and 1 for θ matches the resolution the
/// surfaces are sampled at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rounding {
    pub r: u32,
    pub theta: u32,
}

impl Default for Rounding {
    fn default() -> Self {
        Self { r: 2, theta: 1 }
    }
}

/// 2^53, past which not every integer is an f64. NaN fails the comparison
const MAX_EXACT: f64 = 9007199254740992.0;

impl Rounding {
    fn scale(&self, axis: Axis) -> f64 {
        let places = match axis {
            Axis::R => self.r,
            Axis::Theta => self.theta,
        };
        10f64.powi(places as i32)
    }

    /// the [Key] of (`r`, `theta`), or `None` if either coordinate is not
    /// finite or too large to be held exactly once scaled
    pub fn key(&self, r: f64, theta: f64) -> Option<Key> {
        let exact = |v: f64| {
            let v = v.round();
            (v.abs() <= MAX_EXACT).then_some(v as i64)
        };
        Some(Key {
            r: exact(r * self.scale(Axis::R))?,
            theta: exact(theta * self.scale(Axis::Theta))?,
        })
    }

    /// the (r, θ) pair represented by `key`
    pub fn coords(&self, key: Key) -> (f64, f64) {
        (
            key.r as f64 / self.scale(Axis::R),
            key.theta as f64 / self.scale(Axis::Theta),
        )
    }

    /// convert a displacement of `step` along `axis` into a whole number of
    /// key units. fails if `step` is zero or falls between keys
    pub fn offset(&self, axis: Axis, step: f64) -> Result<i64, PesError> {
        const TOL: f64 = 1e-6;
        let scaled = step * self.scale(axis);
        let off = scaled.round();
        if !scaled.is_finite() || off == 0.0 || (scaled - off).abs() > TOL {
            return Err(PesError::UnrepresentableStep { axis, step });
        }
        Ok(off as i64)
    }
}

/// integer form of a rounded geometry, r in units of 10^-[Rounding::r] Å and θ
/// in units of 10^-[Rounding::theta] degrees. The derived ordering is
/// lexicographic on (r, θ)
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub struct Key {
    pub r: i64,
    pub theta: i64,
}

impl Key {
    /// move `by` key units along `axis`, or `None` on overflow
    pub fn shift(self, axis: Axis, by: i64) -> Option<Self> {
        Some(match axis {
            Axis::R => Self {
                r: self.r.checked_add(by)?,
                ..self
            },
            Axis::Theta => Self {
                theta: self.theta.checked_add(by)?,
                ..self
            },
        })
    }
}

/// the minimum-energy point of a [Grid]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Equilibrium {
    pub key: Key,
    pub r: f64,
    pub theta: f64,
    pub energy: f64,
}

/// Energies indexed by rounded geometry. Filled once, either with
/// [Grid::from_samples] or by repeated calls to [Grid::insert], and then
/// handed out by shared reference to everything that reads it
#[derive(Clone, Debug, Default)]
pub struct Grid {
    map: FxHashMap<Key, f64>,
    rounding: Rounding,
}

impl Grid {
    pub fn new(rounding: Rounding) -> Self {
        Self {
            map: FxHashMap::default(),
            rounding,
        }
    }

    /// build a grid from `samples`. When two samples round to the same key,
    /// the later one wins
    pub fn from_samples<I>(
        samples: I,
        rounding: Rounding,
    ) -> Result<Self, PesError>
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut ret = Self::new(rounding);
        for Sample { r, theta, energy } in samples {
            if let Some(old) = ret.insert(r, theta, energy)? {
                log::warn!(
                    "duplicate sample at r = {r}, theta = {theta}, \
                     replacing {old} with {energy}"
                );
            }
        }
        log::info!("loaded {} samples into the grid", ret.len());
        Ok(ret)
    }

    /// store `energy` at the rounded (`r`, `theta`), returning the energy it
    /// replaced, if any
    pub fn insert(
        &mut self,
        r: f64,
        theta: f64,
        energy: f64,
    ) -> Result<Option<f64>, PesError> {
        let invalid = || PesError::InvalidSample { r, theta, energy };
        if !energy.is_finite() {
            return Err(invalid());
        }
        let key = self.rounding.key(r, theta).ok_or_else(invalid)?;
        Ok(self.map.insert(key, energy))
    }

    /// the energy at (`r`, `theta`). The coordinates go through the same
    /// rounding as [Grid::insert]
    pub fn lookup(&self, r: f64, theta: f64) -> Result<f64, PesError> {
        let key = self
            .rounding
            .key(r, theta)
            .ok_or(PesError::MissingSample { r, theta })?;
        self.get(key)
    }

    /// the key `by` units from `key` along `axis`. A displacement that leaves
    /// the range of [Key] is reported as a missing sample at the intended
    /// coordinates
    pub fn displace(
        &self,
        key: Key,
        axis: Axis,
        by: i64,
    ) -> Result<Key, PesError> {
        key.shift(axis, by).ok_or_else(|| {
            let (r, theta) = self.rounding.coords(key);
            let d = by as f64 / self.rounding.scale(axis);
            let (r, theta) = match axis {
                Axis::R => (r + d, theta),
                Axis::Theta => (r, theta + d),
            };
            PesError::MissingSample { r, theta }
        })
    }

    pub fn get(&self, key: Key) -> Result<f64, PesError> {
        self.map.get(&key).copied().ok_or_else(|| {
            let (r, theta) = self.rounding.coords(key);
            PesError::MissingSample { r, theta }
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.map.keys().copied()
    }

    pub fn rounding(&self) -> Rounding {
        self.rounding
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the geometry with the lowest energy. Ties go to the smallest key,
    /// so the result does not depend on the iteration order of the map
    pub fn equilibrium(&self) -> Result<Equilibrium, PesError> {
        let (&key, &energy) = self
            .map
            .iter()
            .min_by(|(ka, ea), (kb, eb)| ea.total_cmp(eb).then(ka.cmp(kb)))
            .ok_or(PesError::EmptyGrid)?;
        let (r, theta) = self.rounding.coords(key);
        Ok(Equilibrium {
            key,
            r,
            theta,
            energy,
        })
    }
}
