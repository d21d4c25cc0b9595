//! Per-year GDP values bucketed for a world map.
//!
//! Each plot code ends up in exactly one of three buckets: a log10 GDP value,
//! `missing` (no matching country in the GDP data), or `no_data` (country
//! found, but nothing usable reported for the year).

use std::collections::{BTreeMap, BTreeSet};

use log::{info, warn};
use serde::Serialize;

use crate::{
    codes::CodeMap,
    error::{ReconcileError, Result},
    reconcile::{self, ReconciliationResult},
    series::parse_number,
    table::Table,
    transform::{NonPositivePolicy, log10_checked},
};

#[derive(Debug, Clone)]
pub struct MapOptions {
    pub year: String,
    pub policy: NonPositivePolicy,
    pub case_insensitive: bool,
}

impl MapOptions {
    pub fn new(year: impl Into<String>) -> Self {
        Self {
            year: year.into(),
            policy: NonPositivePolicy::default(),
            case_insensitive: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GdpMap {
    pub values: BTreeMap<String, f64>,
    pub missing: BTreeSet<String>,
    pub no_data: BTreeSet<String>,
}

/// Matches plot countries (`code -> name`) to a GDP table keyed by country
/// name.
pub fn build_map_by_name(
    gdp: &Table,
    plot_countries: &CodeMap,
    options: &MapOptions,
) -> Result<GdpMap> {
    require_year(gdp, &options.year)?;
    let reconciled = reconcile::reconcile_by_name(plot_countries, gdp, options.case_insensitive);
    bucket_values(gdp, reconciled, options)
}

/// Matches plot codes through a crosswalk to a GDP table keyed by country
/// code.
pub fn build_map_by_code<I, S>(
    gdp: &Table,
    code_map: &CodeMap,
    plot_codes: I,
    options: &MapOptions,
) -> Result<GdpMap>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    require_year(gdp, &options.year)?;
    let reconciled = reconcile::reconcile_by_code_then_key(
        plot_codes,
        code_map,
        gdp,
        options.case_insensitive,
    );
    bucket_values(gdp, reconciled, options)
}

fn require_year(gdp: &Table, year: &str) -> Result<()> {
    if gdp.has_column(year) {
        Ok(())
    } else {
        Err(ReconcileError::missing_column(year, "GDP data header"))
    }
}

fn bucket_values(
    gdp: &Table,
    reconciled: ReconciliationResult,
    options: &MapOptions,
) -> Result<GdpMap> {
    let mut map = GdpMap {
        missing: reconciled.unmatched().clone(),
        ..GdpMap::default()
    };
    for (plot, data_key) in reconciled.matched() {
        let raw = gdp
            .get(data_key)
            .and_then(|row| row.get(&options.year))
            .unwrap_or_default();
        if raw.trim().is_empty() {
            map.no_data.insert(plot.clone());
            continue;
        }
        let Some(value) = parse_number(raw) else {
            warn!("'{data_key}' reports non-numeric GDP '{raw}' for {}", options.year);
            map.no_data.insert(plot.clone());
            continue;
        };
        match log10_checked(plot, value) {
            Ok(log) => {
                map.values.insert(plot.clone(), log);
            }
            Err(err) if options.policy == NonPositivePolicy::Skip => {
                warn!("Treating '{plot}' as unreported: {err}");
                map.no_data.insert(plot.clone());
            }
            Err(err) => return Err(err),
        }
    }
    info!(
        "GDP map for {}: {} valued, {} missing, {} without data",
        options.year,
        map.values.len(),
        map.missing.len(),
        map.no_data.len()
    );
    Ok(map)
}
