//! Mapping of sniffed headers onto the four canonical fields.
//!
//! Headers are trimmed, then matched exactly after lowercasing against each
//! field's alias list. Columns outside the required set keep their name and
//! position.

use std::{collections::HashMap, fmt};

use log::debug;
use serde::Serialize;

use crate::{error::PipelineError, sniff::RawTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Campaign,
    Persona,
    Outcome,
    PriorContact,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 4] = [
        CanonicalField::Campaign,
        CanonicalField::Persona,
        CanonicalField::Outcome,
        CanonicalField::PriorContact,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::Campaign => "campaign",
            CanonicalField::Persona => "persona",
            CanonicalField::Outcome => "outcome",
            CanonicalField::PriorContact => "prior_contact",
        }
    }

    /// Lowercase header spellings accepted for this field, in lookup order.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            CanonicalField::Campaign => &["campaign"],
            CanonicalField::Persona => &["persona"],
            CanonicalField::Outcome => &["resultado", "outcome"],
            CanonicalField::PriorContact => &["previous", "previousy", "prior_contact"],
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which input header satisfied a canonical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderMatch {
    pub field: CanonicalField,
    pub source_header: String,
    pub position: usize,
}

#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub matches: Vec<HeaderMatch>,
    positions: [usize; 4],
}

impl NormalizedTable {
    pub fn position(&self, field: CanonicalField) -> usize {
        self.positions[field.slot()]
    }

    /// Builds a table whose required columns are already at known positions.
    pub(crate) fn from_parts(
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        positions: [usize; 4],
    ) -> Self {
        let matches = CanonicalField::ALL
            .iter()
            .map(|&field| HeaderMatch {
                field,
                source_header: field.name().to_string(),
                position: positions[field.slot()],
            })
            .collect();
        Self {
            headers,
            rows,
            matches,
            positions,
        }
    }

    pub fn cell<'r>(&self, row: &'r [String], field: CanonicalField) -> Option<&'r str> {
        row.get(self.position(field)).map(|s| s.as_str())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

pub fn normalize(raw: RawTable) -> Result<NormalizedTable, PipelineError> {
    let trimmed = raw
        .headers
        .iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>();

    let mut lookup: HashMap<String, usize> = HashMap::new();
    for (idx, header) in trimmed.iter().enumerate() {
        lookup.entry(header.to_lowercase()).or_insert(idx);
    }

    let mut matches = Vec::with_capacity(CanonicalField::ALL.len());
    let mut missing = Vec::new();
    for field in CanonicalField::ALL {
        let found = field
            .aliases()
            .iter()
            .find_map(|alias| lookup.get(*alias).copied());
        match found {
            Some(position) => matches.push(HeaderMatch {
                field,
                source_header: trimmed[position].clone(),
                position,
            }),
            None => missing.push(field),
        }
    }
    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns {
            missing,
            found: trimmed,
        });
    }

    let mut headers = trimmed;
    let mut positions = [0usize; 4];
    for m in &matches {
        debug!("Column '{}' mapped to {}", m.source_header, m.field);
        headers[m.position] = m.field.name().to_string();
        positions[m.field.slot()] = m.position;
    }

    Ok(NormalizedTable {
        headers,
        rows: raw.rows,
        matches,
        positions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(headers: &[&str]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: vec![headers.iter().map(|_| "v".to_string()).collect()],
            delimiter: b';',
            encoding: "UTF-8",
        }
    }

    #[test]
    fn matches_headers_case_and_whitespace_insensitively() {
        let table = normalize(raw(&["id", " Campaign ", "PERSONA", "Resultado", "previousy"]))
            .expect("normalize");
        assert_eq!(
            table.headers,
            vec!["id", "campaign", "persona", "outcome", "prior_contact"]
        );
        assert_eq!(table.position(CanonicalField::Campaign), 1);
        assert_eq!(table.position(CanonicalField::PriorContact), 4);
        assert_eq!(table.matches[0].source_header, "Campaign");
    }

    #[test]
    fn cell_borrows_from_the_row_not_the_table() {
        let row = vec!["A".to_string(), "Buyer".to_string(), "1".to_string(), "0".to_string()];
        let persona = {
            let table = normalize(raw(&["campaign", "persona", "resultado", "previous"]))
                .expect("normalize");
            table.cell(&row, CanonicalField::Persona)
        };
        assert_eq!(persona, Some("Buyer"));
    }

    #[test]
    fn previous_and_previousy_are_both_accepted() {
        for name in ["previous", "Previousy"] {
            let table = normalize(raw(&["campaign", "persona", "resultado", name]))
                .expect("normalize");
            assert_eq!(table.position(CanonicalField::PriorContact), 3);
        }
    }

    #[test]
    fn partial_header_names_do_not_match() {
        let err = normalize(raw(&["campaign_name", "persona", "resultados", "prev"]))
            .expect_err("missing columns");
        assert_eq!(
            err.missing_fields(),
            vec!["campaign", "outcome", "prior_contact"]
        );
    }

    #[test]
    fn missing_columns_reports_found_headers() {
        let err = normalize(raw(&["a", "b"])).expect_err("missing columns");
        let message = err.to_string();
        assert_eq!(err.missing_fields().len(), 4);
        assert!(message.contains("prior_contact (previous|previousy|prior_contact)"));
        assert!(message.contains("found header(s): [a, b]"));
    }
}
