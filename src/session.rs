//! One upload, processed once and queried many times.
//!
//! A [`Session`] owns the immutable canonical table. Every filter change goes
//! through [`Session::view`], which recomputes the filtered table and the
//! aggregates from scratch without touching the session.

use log::{debug, warn};

use crate::{
    aggregate::{AggregateView, aggregate},
    canonical::{CanonicalTable, canonicalize},
    error::PipelineError,
    filter::{FilterSelection, FilteredTable, apply_filter},
    printable_delimiter,
    schema::{HeaderMatch, normalize},
    sniff::{SniffOptions, sniff},
};

/// What the sniffer and normalizer found, kept for diagnostics.
#[derive(Debug, Clone)]
pub struct UploadReport {
    pub delimiter: u8,
    pub encoding: &'static str,
    pub source_headers: Vec<String>,
    pub matches: Vec<HeaderMatch>,
    pub raw_rows: usize,
}

#[derive(Debug, Clone)]
pub struct Session {
    table: CanonicalTable,
    report: UploadReport,
}

pub struct View<'a> {
    pub filtered: FilteredTable<'a>,
    pub aggregate: AggregateView,
}

impl Session {
    pub fn load(bytes: &[u8], options: &SniffOptions) -> Result<Self, PipelineError> {
        let raw = sniff(bytes, options)?;
        let source_headers = raw.headers.clone();
        let (delimiter, encoding, raw_rows) = (raw.delimiter, raw.encoding, raw.row_count());
        let normalized = normalize(raw)?;
        let matches = normalized.matches.clone();
        let table = canonicalize(normalized);
        debug!(
            "Loaded {} canonical record(s) from {} row(s) (delimiter '{}', {})",
            table.len(),
            raw_rows,
            printable_delimiter(delimiter),
            encoding
        );
        Ok(Self {
            table,
            report: UploadReport {
                delimiter,
                encoding,
                source_headers,
                matches,
                raw_rows,
            },
        })
    }

    pub fn table(&self) -> &CanonicalTable {
        &self.table
    }

    pub fn report(&self) -> &UploadReport {
        &self.report
    }

    /// Option list for the campaign filter control.
    pub fn campaign_options(&self) -> Vec<String> {
        self.table.distinct_campaigns()
    }

    /// Option list for the persona filter control.
    pub fn persona_options(&self) -> Vec<String> {
        self.table.distinct_personas()
    }

    pub fn view(&self, selection: &FilterSelection) -> View<'_> {
        self.warn_unobserved(selection);
        let filtered = apply_filter(&self.table, selection);
        let aggregate = aggregate(&filtered);
        View {
            filtered,
            aggregate,
        }
    }

    fn warn_unobserved(&self, selection: &FilterSelection) {
        let records = self.table.records();
        if let Some(campaign) = selection.campaign.as_deref()
            && !records.iter().any(|r| r.campaign == campaign)
        {
            warn!("Campaign '{campaign}' does not occur in the upload; the view is empty");
        }
        if let Some(persona) = selection.persona.as_deref()
            && !records.iter().any(|r| r.persona == persona)
        {
            warn!("Persona '{persona}' does not occur in the upload; the view is empty");
        }
    }
}
