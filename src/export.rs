//! The "download filtered data" extract: comma-delimited UTF-8 with a header row.

use std::io::Write;

use anyhow::{Context, Result};
use log::info;

use crate::{cli::ExportArgs, filter::FilteredTable, io_utils, load_session, selection};

pub const EXPORT_DELIMITER: u8 = b',';

pub fn execute(args: &ExportArgs) -> Result<()> {
    let session = load_session(&args.input)?;
    let view = session.view(&selection(&args.filter));
    let output = args.output.as_deref();
    let mut writer = io_utils::open_csv_writer(output, EXPORT_DELIMITER, !args.no_bom)?;
    let written = write_filtered(&mut writer, &view.filtered)?;
    writer.flush().context("Flushing output")?;
    info!(
        "Wrote {written} row(s) to {}",
        output
            .filter(|p| !io_utils::is_dash(p))
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".into())
    );
    Ok(())
}

pub fn write_filtered<W: Write>(
    writer: &mut csv::Writer<W>,
    filtered: &FilteredTable<'_>,
) -> Result<usize> {
    let table = filtered.table();
    writer
        .write_record(table.headers())
        .context("Writing header row")?;
    for (idx, record) in filtered.records().iter().enumerate() {
        writer
            .write_record(table.row_cells(record).iter().map(|c| c.as_bytes()))
            .with_context(|| format!("Writing row {}", idx + 2))?;
    }
    Ok(filtered.len())
}

/// Serializes the filtered table in memory, e.g. for a download response.
pub fn to_bytes(filtered: &FilteredTable<'_>, with_bom: bool) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if with_bom {
        buffer.extend_from_slice(io_utils::UTF8_BOM);
    }
    let mut writer = csv::WriterBuilder::new()
        .delimiter(EXPORT_DELIMITER)
        .from_writer(buffer);
    write_filtered(&mut writer, filtered)?;
    writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("Flushing extract: {}", err.error()))
}
