//! I/O utilities for reading uploads, decoding text and writing extracts.
//!
//! All file I/O in campaign-report flows through this module. It provides:
//!
//! - **Input**: the whole upload is read into memory (the sniffer needs to
//!   re-parse it once per delimiter/encoding candidate).
//! - **Encoding**: label resolution and strict decoding via `encoding_rs`.
//! - **Reader/writer construction**: `open_csv_reader` for in-memory text and
//!   `open_csv_writer` for extracts, optionally prefixed with a UTF-8 BOM.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::Encoding;

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

/// Resolves an encoding label. Accepts WHATWG labels plus the common
/// `latin-1` spelling, which WHATWG only knows as `latin1`.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    let trimmed = label.trim();
    Encoding::for_label(trimmed.as_bytes())
        .or_else(|| Encoding::for_label(trimmed.replace("latin-", "latin").as_bytes()))
        .ok_or_else(|| anyhow!("Unknown encoding '{label}'"))
}

pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if is_dash(path) {
        std::io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Reading upload from stdin")?;
    } else {
        File::open(path)
            .with_context(|| format!("Opening input file {path:?}"))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("Reading input file {path:?}"))?;
    }
    Ok(bytes)
}

/// Decodes `bytes` strictly, stripping a leading BOM for the encoding.
/// Returns `None` when the bytes are not valid in `encoding`.
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        None
    } else {
        Some(text.into_owned())
    }
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_writer(
    path: Option<&Path>,
    delimiter: u8,
    with_bom: bool,
) -> Result<csv::Writer<Box<dyn Write>>> {
    let mut base: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout()),
    };
    if with_bom {
        base.write_all(UTF8_BOM).context("Writing byte-order mark")?;
    }

    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    Ok(builder.from_writer(base))
}
