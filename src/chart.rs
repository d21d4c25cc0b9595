//! Chart documents handed to an external renderer, and their writers.
//!
//! Rendering pixels or SVG is not done here. Each document carries exactly
//! the labelled data a renderer needs and is written as pretty-printed JSON.

use std::{
    collections::{BTreeMap, BTreeSet},
    io::Write,
    path::Path,
};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    gdp_map::GdpMap, io_utils, reconcile::ReconciliationResult, risk_map::RiskMap,
    series::CountrySeries,
};

#[derive(Debug, Clone, Serialize)]
pub struct XyChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<CountrySeries>,
}

impl XyChart {
    pub fn gdp(series: Vec<CountrySeries>, min_year: i32, max_year: i32) -> Self {
        Self {
            title: format!("GDP by Country, {min_year} to {max_year}"),
            x_label: "Year".to_string(),
            y_label: "GDP (current US$)".to_string(),
            series,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MapSeriesData {
    Values(BTreeMap<String, f64>),
    Codes(BTreeSet<String>),
}

#[derive(Debug, Clone, Serialize)]
pub struct MapSeries {
    pub label: String,
    pub data: MapSeriesData,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldMapChart {
    pub title: String,
    pub series: Vec<MapSeries>,
}

impl WorldMapChart {
    pub fn from_gdp_map(map: GdpMap, year: &str) -> Self {
        Self {
            title: format!("GDP as Log10() per Country in the Year {year}"),
            series: vec![
                MapSeries {
                    label: format!("GDP for {year}"),
                    data: MapSeriesData::Values(map.values),
                },
                MapSeries {
                    label: "Missing from\nBank GDP Data".to_string(),
                    data: MapSeriesData::Codes(map.missing),
                },
                MapSeries {
                    label: "No GDP Reported".to_string(),
                    data: MapSeriesData::Codes(map.no_data),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskChart {
    pub title: String,
    #[serde(flatten)]
    pub map: RiskMap,
}

impl RiskChart {
    pub fn new(map: RiskMap) -> Self {
        Self {
            title: "Cancer Risk by County (log10 color scale)".to_string(),
            map,
        }
    }
}

pub fn write_json<T: Serialize>(document: &T, path: Option<&Path>) -> Result<()> {
    let mut writer = io_utils::open_output(path)?;
    serde_json::to_writer_pretty(&mut writer, document).context("Writing chart JSON")?;
    writeln!(writer).context("Writing chart JSON")?;
    writer.flush().context("Flushing chart output")
}

pub fn write_reconciliation_csv(
    result: &ReconciliationResult,
    path: Option<&Path>,
    delimiter: u8,
) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(path, delimiter)?;
    writer
        .write_record(ReconciliationResult::record_headers())
        .context("Writing reconciliation headers")?;
    for record in result.to_records() {
        writer
            .write_record(&record)
            .context("Writing reconciliation row")?;
    }
    writer.flush().context("Flushing reconciliation output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_map_has_three_labelled_buckets() {
        let mut map = GdpMap::default();
        map.values.insert("fr".to_string(), 12.5);
        map.missing.insert("xx".to_string());
        let chart = WorldMapChart::from_gdp_map(map, "2000");

        let json = serde_json::to_value(&chart).expect("json");
        assert_eq!(json["title"], "GDP as Log10() per Country in the Year 2000");
        assert_eq!(json["series"][0]["label"], "GDP for 2000");
        assert_eq!(json["series"][0]["data"]["fr"], 12.5);
        assert_eq!(json["series"][1]["data"][0], "xx");
        assert_eq!(json["series"][2]["data"].as_array().map(Vec::len), Some(0));
    }
}
