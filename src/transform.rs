//! Numeric transforms applied before values reach a renderer: log scaling,
//! marker sizing, pixel scaling and color mapping.

use std::{
    collections::BTreeMap,
    f64::consts::PI,
    fmt::Display,
};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ReconcileError, Result},
    series::parse_number,
};

/// Population multiplier used when sizing county markers.
pub const POPULATION_SCALE: f64 = 1.0 / 1_000_000.0;

/// What to do with values that have no base-10 logarithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NonPositivePolicy {
    /// Fail with a domain error.
    #[default]
    Reject,
    /// Leave the value out of the result.
    Skip,
}

pub fn log10_checked(key: &str, value: f64) -> Result<f64> {
    if value > 0.0 {
        Ok(value.log10())
    } else {
        Err(ReconcileError::Domain {
            key: key.to_string(),
            value,
        })
    }
}

/// Applies `log10` to every numeric value. Text that does not parse as a
/// number is left out; values `<= 0` follow `policy`.
pub fn log10_transform<I, K, V>(values: I, policy: NonPositivePolicy) -> Result<BTreeMap<K, f64>>
where
    I: IntoIterator<Item = (K, V)>,
    K: Ord + Display,
    V: AsRef<str>,
{
    let mut scaled = BTreeMap::new();
    for (key, raw) in values {
        let Some(value) = parse_number(raw.as_ref()) else {
            continue;
        };
        match log10_checked(&key.to_string(), value) {
            Ok(log) => {
                scaled.insert(key, log);
            }
            Err(err) if policy == NonPositivePolicy::Skip => {
                warn!("Skipping: {err}");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(scaled)
}

/// Marker area for a county of `population` people.
pub fn marker_area(population: f64) -> f64 {
    PI * (20.0 * population * POPULATION_SCALE).powf(1.1)
}

/// Rescales a coordinate from a `reference` extent to a `target` extent.
pub fn scale_coordinate(value: f64, reference: f64, target: f64) -> f64 {
    value * target / reference
}

/// Linear normalization of `[min, max]` onto `[0, 1]`, clipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize {
    pub min: f64,
    pub max: f64,
}

impl Normalize {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn apply(&self, value: f64) -> f64 {
        if self.max <= self.min {
            return 0.0;
        }
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

// Piecewise-linear anchor points of the "jet" colormap, per channel.
const JET_RED: &[(f64, f64)] = &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const JET_GREEN: &[(f64, f64)] = &[
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const JET_BLUE: &[(f64, f64)] = &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

/// RGBA color for a normalized position `t` in `[0, 1]`.
pub fn jet(t: f64) -> [f64; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        interpolate(JET_RED, t),
        interpolate(JET_GREEN, t),
        interpolate(JET_BLUE, t),
        1.0,
    ]
}

fn interpolate(anchors: &[(f64, f64)], t: f64) -> f64 {
    for pair in anchors.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if t <= x1 {
            return y0 + (y1 - y0) * (t - x0) / (x1 - x0);
        }
    }
    anchors.last().map(|(_, y)| *y).unwrap_or_default()
}
