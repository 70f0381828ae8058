use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Summarize campaign outcome uploads", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Detect delimiter, encoding and required columns of an upload
    Sniff(SniffArgs),
    /// Print summary metrics and breakdowns for the filtered upload
    Summary(SummaryArgs),
    /// List the distinct campaign and persona values available as filters
    Values(ValuesArgs),
    /// Preview the filtered records in a formatted table
    Preview(PreviewArgs),
    /// Write the filtered records as comma-delimited UTF-8
    Export(ExportArgs),
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Uploaded delimited file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Skip delimiter detection and use this one (supports ';', ',', 'tab', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Skip encoding detection and decode with this encoding
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Keep only records of this campaign (all campaigns if omitted)
    #[arg(long)]
    pub campaign: Option<String>,
    /// Keep only records of this persona (all personas if omitted)
    #[arg(long)]
    pub persona: Option<String>,
}

#[derive(Debug, Args)]
pub struct SniffArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Emit the summary as JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ValuesArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Number of rows to display (0 = all)
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// Restrict the view to these columns, in this order
    #[arg(short = 'C', long = "columns", value_delimiter = ',')]
    pub columns: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Omit the UTF-8 byte-order mark
    #[arg(long = "no-bom")]
    pub no_bom: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" | "\\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
