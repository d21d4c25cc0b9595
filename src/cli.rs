use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::transform::NonPositivePolicy;

#[derive(Debug, Parser)]
#[command(author, version, about = "Reconcile keyed CSV tables into chart-ready data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Match the keys of one CSV file against another, optionally through a code crosswalk
    Reconcile(ReconcileArgs),
    /// Build year/GDP series for a list of countries
    Series(SeriesArgs),
    /// Bucket GDP for one year into a world map document
    WorldMap(WorldMapArgs),
    /// Place county cancer-risk markers on a map image
    RiskMap(RiskMapArgs),
}

/// Dialect flags shared by every command that reads delimited input.
#[derive(Debug, Clone, Args)]
pub struct InputFormatArgs {
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Quote character used to wrap fields
    #[arg(long, value_parser = parse_quote)]
    pub quote: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Dataset descriptor file (YAML, or JSON by extension)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// CSV file whose key column supplies the keys to match
    #[arg(long)]
    pub source: PathBuf,
    /// Key column in the source file
    #[arg(long = "source-key")]
    pub source_key: String,
    /// CSV file to match against
    #[arg(long)]
    pub target: PathBuf,
    /// Key column in the target file
    #[arg(long = "target-key")]
    pub target_key: String,
    /// Crosswalk CSV translating source keys into target keys (overrides the config file)
    #[arg(long)]
    pub codes: Option<PathBuf>,
    /// Crosswalk column holding source-side codes
    #[arg(long = "plot-codes")]
    pub plot_codes: Option<String>,
    /// Crosswalk column holding target-side codes
    #[arg(long = "data-codes")]
    pub data_codes: Option<String>,
    /// Compare keys without regard to case
    #[arg(long = "case-insensitive")]
    pub case_insensitive: bool,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Render the result as an aligned table instead of CSV
    #[arg(long = "table", conflicts_with = "output")]
    pub table: bool,
    #[command(flatten)]
    pub format: InputFormatArgs,
}

#[derive(Debug, Args)]
pub struct SeriesArgs {
    /// World Bank GDP CSV (overrides the config file)
    #[arg(long)]
    pub gdp: Option<PathBuf>,
    /// Country to include; repeat for several
    #[arg(short = 'c', long = "country", action = clap::ArgAction::Append)]
    pub countries: Vec<String>,
    /// First year to include
    #[arg(long = "min-year")]
    pub min_year: Option<i32>,
    /// Last year to include
    #[arg(long = "max-year")]
    pub max_year: Option<i32>,
    /// Column whose values name the countries
    #[arg(long = "key-column")]
    pub key_column: Option<String>,
    /// Output JSON chart document (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub format: InputFormatArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum MatchBy {
    Name,
    Code,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum NonPositive {
    Reject,
    Skip,
}

impl From<NonPositive> for NonPositivePolicy {
    fn from(value: NonPositive) -> Self {
        match value {
            NonPositive::Reject => NonPositivePolicy::Reject,
            NonPositive::Skip => NonPositivePolicy::Skip,
        }
    }
}

#[derive(Debug, Args)]
pub struct WorldMapArgs {
    /// World Bank GDP CSV (overrides the config file)
    #[arg(long)]
    pub gdp: Option<PathBuf>,
    /// CSV of plot countries with `code` and `name` columns
    #[arg(long)]
    pub countries: PathBuf,
    /// Year column to map
    #[arg(long)]
    pub year: String,
    /// Match plot countries by name or through the code crosswalk. Codes
    /// compare without regard to case and names compare exactly unless
    /// `--case-insensitive` or `--case-sensitive` is given
    #[arg(long = "by", value_enum, default_value = "code")]
    pub by: MatchBy,
    /// Compare keys without regard to case
    #[arg(long = "case-insensitive", conflicts_with = "case_sensitive")]
    pub case_insensitive: bool,
    /// Compare keys exactly
    #[arg(long = "case-sensitive")]
    pub case_sensitive: bool,
    /// Crosswalk CSV used with `--by code` (overrides the config file)
    #[arg(long)]
    pub codes: Option<PathBuf>,
    /// How to treat zero or negative GDP values
    #[arg(long = "non-positive", value_enum, default_value = "skip")]
    pub non_positive: NonPositive,
    /// Output JSON chart document (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub format: InputFormatArgs,
}

impl WorldMapArgs {
    /// Whether plot keys are matched with case folded, after explicit flags.
    pub fn case_insensitive_match(&self) -> bool {
        if self.case_sensitive {
            false
        } else {
            self.case_insensitive || self.by == MatchBy::Code
        }
    }
}

#[derive(Debug, Args)]
pub struct RiskMapArgs {
    /// Headerless joined cancer-risk CSV
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Width in pixels of the map image
    #[arg(long, default_value_t = 1000)]
    pub width: u32,
    /// Height in pixels of the map image
    #[arg(long, default_value_t = 634)]
    pub height: u32,
    /// Keep only this many highest-risk counties
    #[arg(long)]
    pub limit: Option<usize>,
    /// How to treat zero or negative risk values
    #[arg(long = "non-positive", value_enum, default_value = "skip")]
    pub non_positive: NonPositive,
    /// Output JSON chart document (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub format: InputFormatArgs,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => single_ascii(other, "Delimiter"),
    }
}

pub fn parse_quote(value: &str) -> Result<u8, String> {
    match value {
        "double" => Ok(b'"'),
        "single" => Ok(b'\''),
        other => single_ascii(other, "Quote"),
    }
}

fn single_ascii(value: &str, what: &str) -> Result<u8, String> {
    let mut chars = value.chars();
    let first = chars
        .next()
        .ok_or_else(|| format!("{what} cannot be empty"))?;
    if chars.next().is_some() {
        return Err(format!("{what} must be a single character"));
    }
    if !first.is_ascii() {
        return Err(format!("{what} must be ASCII"));
    }
    Ok(first as u8)
}
