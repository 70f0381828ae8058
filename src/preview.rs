use anyhow::{Result, anyhow};
use itertools::Itertools;
use log::info;

use crate::{
    canonical::CanonicalTable, cli::PreviewArgs, filter::FilteredTable, load_session, selection,
    table,
};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let session = load_session(&args.input)?;
    let view = session.view(&selection(&args.filter));
    let columns = resolve_columns(session.table(), &args.columns)?;
    let limit = (args.rows > 0).then_some(args.rows);
    let (headers, rows) = preview_rows(&view.filtered, &columns, limit);
    table::print_table(&headers, &rows);
    info!(
        "Displayed {} of {} filtered row(s)",
        rows.len(),
        view.filtered.len()
    );
    Ok(())
}

/// Maps requested column names onto positions; an empty request selects every column.
pub fn resolve_columns(table: &CanonicalTable, requested: &[String]) -> Result<Vec<usize>> {
    let requested = requested
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>();
    if requested.is_empty() {
        return Ok((0..table.headers().len()).collect());
    }
    requested
        .into_iter()
        .map(|name| {
            table.column_index(name).ok_or_else(|| {
                anyhow!(
                    "Column '{name}' not found; available columns: {}",
                    table.headers().iter().join(", ")
                )
            })
        })
        .collect()
}

pub fn preview_rows(
    filtered: &FilteredTable<'_>,
    columns: &[usize],
    limit: Option<usize>,
) -> (Vec<String>, Vec<Vec<String>>) {
    let table = filtered.table();
    let headers = columns
        .iter()
        .map(|&idx| table.headers()[idx].clone())
        .collect();
    let rows = filtered
        .records()
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|record| {
            let cells = table.row_cells(record);
            columns
                .iter()
                .map(|&idx| cells.get(idx).map(|c| c.to_string()).unwrap_or_default())
                .collect()
        })
        .collect();
    (headers, rows)
}
