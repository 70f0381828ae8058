pub mod aggregate;
pub mod canonical;
pub mod cli;
pub mod error;
pub mod export;
pub mod filter;
pub mod io_utils;
pub mod preview;
pub mod schema;
pub mod session;
pub mod sniff;
pub mod summary;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands},
    filter::FilterSelection,
    session::Session,
    sniff::{EncodingCandidate, SniffOptions},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("campaign_report", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Sniff(args) => handle_sniff(&args),
        Commands::Summary(args) => summary::execute(&args),
        Commands::Values(args) => handle_values(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::Export(args) => export::execute(&args),
    }
}

pub(crate) fn load_session(args: &cli::InputArgs) -> Result<Session> {
    let encoding = match args.input_encoding.as_deref() {
        Some(label) => {
            let encoding = io_utils::resolve_encoding(label)?;
            Some(EncodingCandidate {
                label: encoding.name(),
                encoding,
            })
        }
        None => None,
    };
    let options = SniffOptions::with_overrides(args.delimiter, encoding);
    let bytes = io_utils::read_input(&args.input)?;
    Session::load(&bytes, &options).with_context(|| format!("Loading upload {:?}", args.input))
}

pub(crate) fn selection(args: &cli::FilterArgs) -> FilterSelection {
    FilterSelection::new(args.campaign.clone(), args.persona.clone())
}

fn handle_sniff(args: &cli::SniffArgs) -> Result<()> {
    let session = load_session(&args.input)?;
    let report = session.report();
    let encodings = session.table().encodings();

    let mut rows = vec![
        vec!["delimiter".to_string(), printable_delimiter(report.delimiter)],
        vec!["encoding".to_string(), report.encoding.to_string()],
        vec!["columns".to_string(), report.source_headers.len().to_string()],
        vec!["rows".to_string(), report.raw_rows.to_string()],
        vec!["headers".to_string(), report.source_headers.join(", ")],
        vec!["records".to_string(), session.table().len().to_string()],
        vec![
            "dropped (blank persona)".to_string(),
            session.table().dropped_rows().to_string(),
        ],
        vec![
            "outcome encoding".to_string(),
            format!("{:?}", encodings.outcome).to_lowercase(),
        ],
        vec![
            "prior_contact encoding".to_string(),
            format!("{:?}", encodings.prior_contact).to_lowercase(),
        ],
    ];
    for m in &report.matches {
        rows.push(vec![
            format!("{} <-", m.field),
            format!("'{}' (column {})", m.source_header, m.position + 1),
        ]);
    }
    table::print_table(&["property".to_string(), "value".to_string()], &rows);
    info!("Sniffed {:?}", args.input.input);
    Ok(())
}

fn handle_values(args: &cli::ValuesArgs) -> Result<()> {
    let session = load_session(&args.input)?;
    let mut rows = Vec::new();
    for campaign in session.campaign_options() {
        rows.push(vec!["campaign".to_string(), campaign]);
    }
    for persona in session.persona_options() {
        rows.push(vec!["persona".to_string(), persona]);
    }
    table::print_table(&["filter".to_string(), "value".to_string()], &rows);
    info!(
        "Listed {} campaign(s) and {} persona(s)",
        session.campaign_options().len(),
        session.persona_options().len()
    );
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
