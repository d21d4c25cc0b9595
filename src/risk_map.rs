//! County cancer-risk markers on a raster map of the USA.
//!
//! Input is the headerless joined risk file: identifying fields first, then
//! population, risk and the county center in a 555×352 reference frame.
//! Markers are ordered by descending risk, colored on a log10 scale between
//! the lowest and highest risk, and sized by population.

use std::path::Path;

use itertools::Itertools;
use log::{info, warn};
use serde::Serialize;

use crate::{
    error::Result,
    io_utils::CsvFormat,
    series::parse_number,
    table,
    transform::{self, NonPositivePolicy, Normalize},
};

pub const REFERENCE_WIDTH: f64 = 555.0;
pub const REFERENCE_HEIGHT: f64 = 352.0;

pub const POPULATION_COLUMN: usize = 3;
pub const RISK_COLUMN: usize = 4;
pub const X_COLUMN: usize = 5;
pub const Y_COLUMN: usize = 6;

#[derive(Debug, Clone)]
pub struct RiskMapOptions {
    /// Pixel size of the map image the markers are drawn on.
    pub width: u32,
    pub height: u32,
    /// Keep only the `limit` highest-risk counties.
    pub limit: Option<usize>,
    pub policy: NonPositivePolicy,
}

impl Default for RiskMapOptions {
    fn default() -> Self {
        Self {
            width: REFERENCE_WIDTH as u32,
            height: REFERENCE_HEIGHT as u32,
            limit: None,
            policy: NonPositivePolicy::Skip,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMarker {
    pub label: String,
    pub risk: f64,
    pub x: f64,
    pub y: f64,
    pub area: f64,
    pub color: [f64; 4],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskMap {
    pub width: u32,
    pub height: u32,
    pub log_min: f64,
    pub log_max: f64,
    pub markers: Vec<RiskMarker>,
}

#[derive(Debug)]
struct County {
    label: String,
    population: f64,
    risk: f64,
    x: f64,
    y: f64,
}

fn parse_county(record: &[String]) -> Option<County> {
    let number = |idx: usize| record.get(idx).and_then(|raw| parse_number(raw));
    Some(County {
        label: record.iter().take(POPULATION_COLUMN).join(", "),
        population: number(POPULATION_COLUMN)?,
        risk: number(RISK_COLUMN)?,
        x: number(X_COLUMN)?,
        y: number(Y_COLUMN)?,
    })
}

pub fn build_risk_map(records: &[Vec<String>], options: &RiskMapOptions) -> Result<RiskMap> {
    let mut counties = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        let Some(county) = parse_county(record) else {
            warn!("Skipping malformed risk record {}", idx + 1);
            continue;
        };
        if county.risk <= 0.0 {
            match options.policy {
                NonPositivePolicy::Skip => {
                    warn!("Skipping '{}' with non-positive risk {}", county.label, county.risk);
                    continue;
                }
                NonPositivePolicy::Reject => {
                    transform::log10_checked(&county.label, county.risk)?;
                }
            }
        }
        counties.push(county);
    }
    counties.sort_by(|a, b| b.risk.total_cmp(&a.risk));

    let mut map = RiskMap {
        width: options.width,
        height: options.height,
        ..RiskMap::default()
    };
    let (Some(highest), Some(lowest)) = (counties.first(), counties.last()) else {
        info!("No usable risk records");
        return Ok(map);
    };
    map.log_max = transform::log10_checked(&highest.label, highest.risk)?;
    map.log_min = transform::log10_checked(&lowest.label, lowest.risk)?;
    let norm = Normalize::new(map.log_min, map.log_max);

    let limit = options.limit.unwrap_or(counties.len());
    for county in counties.into_iter().take(limit) {
        let log_risk = transform::log10_checked(&county.label, county.risk)?;
        map.markers.push(RiskMarker {
            x: transform::scale_coordinate(county.x, REFERENCE_WIDTH, f64::from(options.width)),
            y: transform::scale_coordinate(county.y, REFERENCE_HEIGHT, f64::from(options.height)),
            area: transform::marker_area(county.population),
            color: transform::jet(norm.apply(log_risk)),
            risk: county.risk,
            label: county.label,
        });
    }
    info!(
        "Placed {} risk marker(s); log10 risk spans {:.3}..{:.3}",
        map.markers.len(),
        map.log_min,
        map.log_max
    );
    Ok(map)
}

pub fn load_risk_map(path: &Path, format: &CsvFormat, options: &RiskMapOptions) -> Result<RiskMap> {
    let records = table::load_records(path, format)?;
    build_risk_map(&records, options)
}
