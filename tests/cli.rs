mod common;

use std::fs;

use assert_cmd::Command;
use common::{TestWorkspace, fixture_path};
use predicates::prelude::*;
use predicates::str::contains;

fn bin() -> Command {
    Command::cargo_bin("csv-reconcile").expect("binary exists")
}

fn fixture(name: &str) -> String {
    fixture_path(name).to_str().expect("utf-8 path").to_string()
}

#[test]
fn reconcile_through_crosswalk_writes_csv() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("matches.csv");

    bin()
        .args([
            "reconcile",
            "--source",
            &fixture("plot_countries.csv"),
            "--source-key",
            "code",
            "--target",
            &fixture("isp_gdp.csv"),
            "--target-key",
            "Country Code",
            "--codes",
            &fixture("isp_country_codes.csv"),
            "--case-insensitive",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let written = fs::read_to_string(&output).expect("read output");
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "plot_key,data_key,status");
    assert!(lines.contains(&"cn,CHN,matched"));
    assert!(lines.contains(&"at,ATL,matched"));
    assert!(lines.contains(&"gl,,unmatched"));
    assert!(lines.contains(&"zz,,unmatched"));
    assert_eq!(lines.len(), 9);
}

#[test]
fn reconcile_is_case_sensitive_by_default() {
    let assert = bin()
        .args([
            "reconcile",
            "--source",
            &fixture("plot_countries.csv"),
            "--source-key",
            "code",
            "--target",
            &fixture("isp_gdp.csv"),
            "--target-key",
            "Country Code",
            "--codes",
            &fixture("isp_country_codes.csv"),
            "--table",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let rows: Vec<&str> = stdout.lines().skip(2).collect();
    assert_eq!(rows.len(), 8);
    // Lowercase plot codes never meet the uppercase crosswalk keys.
    assert!(rows.iter().all(|line| line.ends_with("unmatched")));
}

#[test]
fn reconcile_reports_missing_key_column() {
    bin()
        .args([
            "reconcile",
            "--source",
            &fixture("plot_countries.csv"),
            "--source-key",
            "iso",
            "--target",
            &fixture("isp_gdp.csv"),
            "--target-key",
            "Country Code",
        ])
        .assert()
        .failure()
        .stderr(contains("Column 'iso' not found"));
}

#[test]
fn series_emits_xy_chart_document() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("series.json");

    bin()
        .args([
            "series",
            "--gdp",
            &fixture("isp_gdp.csv"),
            "--country",
            "United Kingdom",
            "--country",
            "Atlantis",
            "--min-year",
            "1960",
            "--max-year",
            "2010",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let chart: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).expect("read")).expect("json");
    assert_eq!(chart["series"][0]["label"], "United Kingdom");
    assert_eq!(chart["series"][0]["points"].as_array().map(Vec::len), Some(4));
    assert_eq!(chart["series"][0]["points"][0][0], 1960);
    // Atlantis reports 0 for 2000, which is a number, and nothing else.
    assert_eq!(chart["series"][1]["points"].as_array().map(Vec::len), Some(1));
}

#[test]
fn series_reads_dataset_descriptor() {
    let workspace = TestWorkspace::new();
    let config = workspace.write(
        "datasets.yaml",
        &format!(
            "gdp:\n  file: '{}'\n  min_year: 2010\n  max_year: 2015\n",
            fixture("isp_gdp.csv")
        ),
    );

    bin()
        .args([
            "series",
            "--config",
            config.to_str().unwrap(),
            "--country",
            "Eritrea",
        ])
        .assert()
        .success()
        .stdout(contains("\"label\": \"Eritrea\""))
        .stdout(contains("2010"))
        .stdout(contains("2000").not());
}

#[test]
fn world_map_by_code_buckets_countries() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("map.json");

    bin()
        .args([
            "world-map",
            "--gdp",
            &fixture("isp_gdp.csv"),
            "--countries",
            &fixture("plot_countries.csv"),
            "--codes",
            &fixture("isp_country_codes.csv"),
            "--year",
            "2000",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let chart: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).expect("read")).expect("json");
    assert_eq!(chart["title"], "GDP as Log10() per Country in the Year 2000");
    assert!(chart["series"][0]["data"]["cn"].as_f64().is_some());
    assert_eq!(chart["series"][1]["data"], serde_json::json!(["gl", "zz"]));
    assert_eq!(chart["series"][2]["data"], serde_json::json!(["at"]));
}

#[test]
fn world_map_rejects_zero_gdp_on_request() {
    bin()
        .args([
            "world-map",
            "--gdp",
            &fixture("isp_gdp.csv"),
            "--countries",
            &fixture("plot_countries.csv"),
            "--by",
            "name",
            "--year",
            "2000",
            "--non-positive",
            "reject",
        ])
        .assert()
        .failure()
        .stderr(contains("outside the domain of log10"));
}

#[test]
fn world_map_unknown_year_fails() {
    bin()
        .args([
            "world-map",
            "--gdp",
            &fixture("isp_gdp.csv"),
            "--countries",
            &fixture("plot_countries.csv"),
            "--by",
            "name",
            "--year",
            "1850",
        ])
        .assert()
        .failure()
        .stderr(contains("Column '1850' not found"));
}

#[test]
fn risk_map_places_top_counties() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("risk.json");

    bin()
        .args([
            "risk-map",
            "-i",
            &fixture("cancer_risk_joined.csv"),
            "--width",
            "1110",
            "--height",
            "704",
            "--limit",
            "3",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let chart: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).expect("read")).expect("json");
    let markers = chart["markers"].as_array().expect("markers");
    assert_eq!(markers.len(), 3);
    assert!(markers[0]["label"].as_str().unwrap().contains("Kings County"));
    assert_eq!(chart["width"], 1110);
    let log_min = chart["log_min"].as_f64().unwrap();
    assert!((log_min - 1.8e-6f64.log10()).abs() < 1e-12);
}

#[test]
fn missing_input_file_fails_cleanly() {
    bin()
        .args(["risk-map", "-i", "does-not-exist.csv"])
        .assert()
        .failure()
        .stderr(contains("Unable to read input"));
}

#[test]
fn reconcile_reads_crosswalk_dialect_from_config() {
    let workspace = TestWorkspace::new();
    let codes = workspace.write(
        "codes.csv",
        "Country;ISO3166-1-Alpha-2;ISO3166-1-Alpha-3\nChina;CN;CHN\nUnited States;US;USA\n",
    );
    let config = workspace.write(
        "datasets.yaml",
        &format!(
            "codes:\n  file: '{}'\n  separator: ';'\n",
            codes.to_str().unwrap()
        ),
    );

    let assert = bin()
        .args([
            "reconcile",
            "--source",
            &fixture("plot_countries.csv"),
            "--source-key",
            "code",
            "--target",
            &fixture("isp_gdp.csv"),
            "--target-key",
            "Country Code",
            "--case-insensitive",
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines.contains(&"cn,CHN,matched"));
    assert!(lines.contains(&"us,USA,matched"));
    assert!(lines.contains(&"gb,,unmatched"));
}

#[test]
fn reconcile_table_view_refuses_output_file() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("matches.csv");

    bin()
        .args([
            "reconcile",
            "--source",
            &fixture("plot_countries.csv"),
            "--source-key",
            "code",
            "--target",
            &fixture("isp_gdp.csv"),
            "--target-key",
            "Country Code",
            "--table",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
    assert!(!output.exists());
}

#[test]
fn reconcile_reads_source_keys_from_stdin() {
    let assert = bin()
        .args([
            "reconcile",
            "--source",
            "-",
            "--source-key",
            "code",
            "--target",
            &fixture("isp_gdp.csv"),
            "--target-key",
            "Country Code",
        ])
        .write_stdin("code\nUSA\nFRA\n")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "plot_key,data_key,status");
    assert!(lines.contains(&"USA,USA,matched"));
    assert!(lines.contains(&"FRA,,unmatched"));
    assert_eq!(lines.len(), 3);
}

#[test]
fn series_decodes_latin1_input() {
    let workspace = TestWorkspace::new();
    let gdp = workspace.path().join("gdp_latin1.csv");
    let mut bytes = b"\"Country Name\",\"Country Code\",\"2000\"\n\"C".to_vec();
    bytes.push(0xF4);
    bytes.extend_from_slice(b"te d'Ivoire\",\"CIV\",\"10417060240\"\n");
    fs::write(&gdp, bytes).expect("write latin-1 fixture");

    bin()
        .args([
            "series",
            "--gdp",
            gdp.to_str().unwrap(),
            "--country",
            "C\u{f4}te d'Ivoire",
            "--min-year",
            "1990",
            "--max-year",
            "2010",
            "--input-encoding",
            "latin1",
        ])
        .assert()
        .success()
        .stdout(contains("\"label\": \"C\u{f4}te d'Ivoire\""))
        .stdout(contains("10417060240"));

    bin()
        .args([
            "series",
            "--gdp",
            gdp.to_str().unwrap(),
            "--country",
            "C\u{f4}te d'Ivoire",
        ])
        .assert()
        .failure()
        .stderr(contains("Failed to decode"));
}

#[test]
fn world_map_case_sensitive_codes_miss_uppercase_crosswalk() {
    let assert = bin()
        .args([
            "world-map",
            "--gdp",
            &fixture("isp_gdp.csv"),
            "--countries",
            &fixture("plot_countries.csv"),
            "--codes",
            &fixture("isp_country_codes.csv"),
            "--year",
            "2000",
            "--case-sensitive",
        ])
        .assert()
        .success();

    let chart: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("json");
    assert_eq!(
        chart["series"][1]["data"],
        serde_json::json!(["at", "cn", "er", "gb", "gl", "kr", "us", "zz"])
    );
}
