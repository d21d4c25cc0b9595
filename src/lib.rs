pub mod chart;
pub mod cli;
pub mod codes;
pub mod config;
pub mod error;
pub mod gdp_map;
pub mod io_utils;
pub mod preview;
pub mod reconcile;
pub mod risk_map;
pub mod series;
pub mod table;
pub mod transform;

use std::{env, path::Path, sync::OnceLock};

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    chart::{RiskChart, WorldMapChart, XyChart},
    cli::{Cli, Commands, InputFormatArgs, MatchBy},
    codes::CodeMap,
    config::DatasetConfig,
    gdp_map::MapOptions,
    io_utils::{CsvFormat, DEFAULT_QUOTE},
    reconcile::ReconciliationResult,
    risk_map::RiskMapOptions,
};

pub use error::ReconcileError;

/// Columns expected in the plot-country list used by `world-map`.
pub const PLOT_CODE_COLUMN: &str = "code";
pub const PLOT_NAME_COLUMN: &str = "name";

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_reconcile", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Reconcile(args) => handle_reconcile(&args),
        Commands::Series(args) => handle_series(&args),
        Commands::WorldMap(args) => handle_world_map(&args),
        Commands::RiskMap(args) => handle_risk_map(&args),
    }
}

/// Resolves the dialect for `path`: explicit flags win, then the descriptor
/// file (when one was given), then extension-based detection.
fn resolve_format(
    path: &Path,
    args: &InputFormatArgs,
    configured: Option<CsvFormat>,
) -> Result<CsvFormat> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let base = configured.unwrap_or_else(|| {
        CsvFormat::new(io_utils::resolve_input_delimiter(path, None), DEFAULT_QUOTE)
    });
    let format = CsvFormat::new(
        args.delimiter.unwrap_or(base.delimiter),
        args.quote.unwrap_or(base.quote),
    )
    .with_encoding(encoding);
    debug!(
        "Reading {:?} with delimiter '{}' and quote '{}'",
        path,
        printable_delimiter(format.delimiter),
        format.quote as char
    );
    Ok(format)
}

fn handle_reconcile(args: &cli::ReconcileArgs) -> Result<()> {
    let config = DatasetConfig::load_or_default(args.format.config.as_deref())?;
    let source_format = resolve_format(&args.source, &args.format, None)?;
    let target_format = resolve_format(&args.target, &args.format, None)?;

    let source = table::load_table_with(&args.source, &args.source_key, &source_format)
        .with_context(|| format!("Loading source keys from {:?}", args.source))?;
    let target = table::load_table_with(&args.target, &args.target_key, &target_format)
        .with_context(|| format!("Loading target table from {:?}", args.target))?;

    let result = match args.codes.clone().or_else(|| config.codes.file.clone()) {
        Some(codes_path) => {
            let plot_codes = args
                .plot_codes
                .clone()
                .unwrap_or_else(|| config.codes.plot_codes.clone());
            let data_codes = args
                .data_codes
                .clone()
                .unwrap_or_else(|| config.codes.data_codes.clone());
            let codes_configured = match args.format.config {
                Some(_) => Some(config.codes.format()?),
                None => None,
            };
            let codes_format = resolve_format(&codes_path, &args.format, codes_configured)?;
            let code_map =
                codes::load_code_map(&codes_path, &plot_codes, &data_codes, &codes_format)
                    .with_context(|| format!("Loading crosswalk from {codes_path:?}"))?;
            reconcile::reconcile_by_code_then_key(
                source.keys(),
                &code_map,
                &target,
                args.case_insensitive,
            )
        }
        None => reconcile::reconcile_by_key(source.keys(), &target, args.case_insensitive),
    };

    emit_reconciliation(&result, args)
}

fn emit_reconciliation(result: &ReconciliationResult, args: &cli::ReconcileArgs) -> Result<()> {
    if args.table {
        preview::print_table(&ReconciliationResult::record_headers(), &result.to_records());
    } else {
        let delimiter = args.format.delimiter.unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
        chart::write_reconciliation_csv(result, args.output.as_deref(), delimiter)?;
    }
    info!(
        "{} of {} key(s) matched",
        result.matched().len(),
        result.total()
    );
    Ok(())
}

fn handle_series(args: &cli::SeriesArgs) -> Result<()> {
    let config = DatasetConfig::load_or_default(args.format.config.as_deref())?;
    let gdp_path = args
        .gdp
        .clone()
        .or_else(|| config.gdp.file.clone())
        .ok_or_else(|| anyhow!("Provide --gdp or a config file naming the GDP data"))?;
    let min_year = args.min_year.unwrap_or(config.gdp.min_year);
    let max_year = args.max_year.unwrap_or(config.gdp.max_year);
    if min_year > max_year {
        bail!("--min-year {min_year} is after --max-year {max_year}");
    }
    let key_column = args
        .key_column
        .clone()
        .unwrap_or_else(|| config.gdp.country_name.clone());

    let configured = match args.format.config {
        Some(_) => Some(config.gdp.format()?),
        None => None,
    };
    let format = resolve_format(&gdp_path, &args.format, configured)?;
    let gdp = table::load_table_with(&gdp_path, &key_column, &format)
        .with_context(|| format!("Loading GDP data from {gdp_path:?}"))?;

    let series = series::build_plot_dict(&gdp, &args.countries, min_year, max_year);
    chart::write_json(
        &XyChart::gdp(series, min_year, max_year),
        args.output.as_deref(),
    )
}

fn handle_world_map(args: &cli::WorldMapArgs) -> Result<()> {
    let config = DatasetConfig::load_or_default(args.format.config.as_deref())?;
    let gdp_path = args
        .gdp
        .clone()
        .or_else(|| config.gdp.file.clone())
        .ok_or_else(|| anyhow!("Provide --gdp or a config file naming the GDP data"))?;
    let configured = match args.format.config {
        Some(_) => Some(config.gdp.format()?),
        None => None,
    };
    let gdp_format = resolve_format(&gdp_path, &args.format, configured)?;

    let countries_format = resolve_format(&args.countries, &args.format, None)?;
    let plot_countries = load_plot_countries(&args.countries, &countries_format)?;

    let options = MapOptions {
        year: args.year.clone(),
        policy: args.non_positive.into(),
        case_insensitive: args.case_insensitive_match(),
    };
    let map = match args.by {
        MatchBy::Name => {
            let gdp = table::load_table_with(&gdp_path, &config.gdp.country_name, &gdp_format)
                .with_context(|| format!("Loading GDP data from {gdp_path:?}"))?;
            gdp_map::build_map_by_name(&gdp, &plot_countries, &options)?
        }
        MatchBy::Code => {
            let codes_path = args
                .codes
                .clone()
                .or_else(|| config.codes.file.clone())
                .ok_or_else(|| anyhow!("Matching by code requires --codes or a config file"))?;
            let codes_configured = match args.format.config {
                Some(_) => Some(config.codes.format()?),
                None => None,
            };
            let codes_format = resolve_format(&codes_path, &args.format, codes_configured)?;
            let code_map = codes::load_code_map(
                &codes_path,
                &config.codes.plot_codes,
                &config.codes.data_codes,
                &codes_format,
            )
            .with_context(|| format!("Loading crosswalk from {codes_path:?}"))?;
            let gdp = table::load_table_with(&gdp_path, &config.gdp.country_code, &gdp_format)
                .with_context(|| format!("Loading GDP data from {gdp_path:?}"))?;
            gdp_map::build_map_by_code(&gdp, &code_map, plot_countries.keys(), &options)?
        }
    };

    chart::write_json(
        &WorldMapChart::from_gdp_map(map, &args.year),
        args.output.as_deref(),
    )
}

fn load_plot_countries(path: &Path, format: &CsvFormat) -> Result<CodeMap> {
    let table = table::load_table_with(path, PLOT_CODE_COLUMN, format)
        .with_context(|| format!("Loading plot countries from {path:?}"))?;
    codes::build_code_map(&table, PLOT_CODE_COLUMN, PLOT_NAME_COLUMN)
        .with_context(|| format!("Reading plot country names from {path:?}"))
}

fn handle_risk_map(args: &cli::RiskMapArgs) -> Result<()> {
    let format = resolve_format(&args.input, &args.format, None)?;
    let options = RiskMapOptions {
        width: args.width,
        height: args.height,
        limit: args.limit,
        policy: args.non_positive.into(),
    };
    let map = risk_map::load_risk_map(&args.input, &format, &options)
        .with_context(|| format!("Building risk map from {:?}", args.input))?;
    chart::write_json(&RiskChart::new(map), args.output.as_deref())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
