//! Year/value series extracted from wide GDP rows.
//!
//! A World Bank GDP row is a mapping from column name to text; the year
//! columns become `(year, gdp)` points. Anything that is not an all-digit year
//! inside the window, or whose value is not a finite number, is dropped
//! without being reported.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::Serialize;

use crate::table::Table;

/// Keeps `(year, value)` pairs with `min_year <= year <= max_year`, sorted by
/// year. When a year appears more than once the last value wins.
pub fn filter_year_range<I, K, V>(series: I, min_year: i32, max_year: i32) -> Vec<(i32, f64)>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut points = BTreeMap::new();
    for (key, value) in series {
        let Some(year) = parse_year(key.as_ref()) else {
            continue;
        };
        if year < min_year || year > max_year {
            continue;
        }
        // Input is a mapping: a repeated year replaces the earlier value even
        // when the replacement turns out to be unusable.
        points.insert(year, parse_number(value.as_ref()));
    }
    points
        .into_iter()
        .filter_map(|(year, value)| value.map(|v| (year, v)))
        .collect()
}

fn parse_year(text: &str) -> Option<i32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// One labelled series ready for an XY chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySeries {
    pub label: String,
    pub points: Vec<(i32, f64)>,
}

/// Builds one series per requested country, in request order. Countries not
/// present in `table` are kept with an empty series.
pub fn build_plot_dict<S: AsRef<str>>(
    table: &Table,
    countries: &[S],
    min_year: i32,
    max_year: i32,
) -> Vec<CountrySeries> {
    let series = countries
        .iter()
        .map(|country| {
            let label = country.as_ref().to_string();
            let points = match table.get(&label) {
                Some(row) => filter_year_range(row.iter(), min_year, max_year),
                None => {
                    debug!("'{label}' not present in GDP data; emitting empty series");
                    Vec::new()
                }
            };
            CountrySeries { label, points }
        })
        .collect::<Vec<_>>();
    info!(
        "Built {} series for years {}..={}",
        series.len(),
        min_year,
        max_year
    );
    series
}
