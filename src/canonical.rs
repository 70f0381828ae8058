//! Value canonicalization: typed records from the normalized table.
//!
//! `outcome` and `prior_contact` go through a total classifier: try numeric,
//! else try the vocabulary, else `false`. Nothing in this module fails; rows
//! without a persona are dropped instead.

use std::{borrow::Cow, collections::BTreeSet};

use log::debug;
use serde::Serialize;

use crate::schema::{CanonicalField, NormalizedTable};

pub const SUCCESS_VOCABULARY: &[&str] = &["sucesso", "success", "1"];
pub const AFFIRMATIVE_VOCABULARY: &[&str] = &["sim", "yes", "1", "true"];

/// How a flag column is written in the upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagEncoding {
    /// Every non-blank value is a number.
    Numeric,
    /// At least one value is free text; labels are matched against a vocabulary.
    Textual,
}

impl FlagEncoding {
    pub fn detect<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let all_numeric = values
            .into_iter()
            .filter(|v| !v.trim().is_empty())
            .all(|v| parse_number(v).is_some());
        if all_numeric {
            FlagEncoding::Numeric
        } else {
            FlagEncoding::Textual
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FlagRule {
    vocabulary: &'static [&'static str],
    numeric: fn(f64) -> bool,
}

const OUTCOME_RULE: FlagRule = FlagRule {
    vocabulary: SUCCESS_VOCABULARY,
    numeric: is_one,
};

const PRIOR_CONTACT_RULE: FlagRule = FlagRule {
    vocabulary: AFFIRMATIVE_VOCABULARY,
    numeric: is_positive,
};

fn is_one(value: f64) -> bool {
    value == 1.0
}

fn is_positive(value: f64) -> bool {
    value > 0.0
}

impl FlagRule {
    fn classify(&self, raw: &str, encoding: FlagEncoding) -> bool {
        if let Some(number) = parse_number(raw) {
            return (self.numeric)(number);
        }
        match encoding {
            FlagEncoding::Numeric => false,
            FlagEncoding::Textual => {
                let lowered = raw.trim().to_lowercase();
                self.vocabulary.contains(&lowered.as_str())
            }
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `true` iff the raw value is a success label or the number 1.
pub fn classify_outcome(raw: &str, encoding: FlagEncoding) -> bool {
    OUTCOME_RULE.classify(raw, encoding)
}

/// `true` iff the raw value is an affirmative label or a positive number.
pub fn classify_prior_contact(raw: &str, encoding: FlagEncoding) -> bool {
    PRIOR_CONTACT_RULE.classify(raw, encoding)
}

pub fn flag_cell(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalRecord {
    pub campaign: String,
    pub persona: String,
    pub outcome: bool,
    pub prior_contact: bool,
    /// Pass-through cells, aligned with the table's extra columns.
    pub extra: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Field(CanonicalField),
    Extra(usize),
}

/// Encoding styles detected for the two flag columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagEncodings {
    pub outcome: FlagEncoding,
    pub prior_contact: FlagEncoding,
}

#[derive(Debug, Clone)]
pub struct CanonicalTable {
    headers: Vec<String>,
    layout: Vec<Column>,
    records: Vec<CanonicalRecord>,
    encodings: FlagEncodings,
    dropped_rows: usize,
}

impl CanonicalTable {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn encodings(&self) -> FlagEncodings {
        self.encodings
    }

    /// Rows removed because their persona was blank.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cells of one record in header order; flags render as `1`/`0`.
    pub fn row_cells<'a>(&self, record: &'a CanonicalRecord) -> Vec<Cow<'a, str>> {
        self.layout
            .iter()
            .map(|column| match column {
                Column::Field(CanonicalField::Campaign) => Cow::Borrowed(record.campaign.as_str()),
                Column::Field(CanonicalField::Persona) => Cow::Borrowed(record.persona.as_str()),
                Column::Field(CanonicalField::Outcome) => Cow::Borrowed(flag_cell(record.outcome)),
                Column::Field(CanonicalField::PriorContact) => {
                    Cow::Borrowed(flag_cell(record.prior_contact))
                }
                Column::Extra(idx) => record
                    .extra
                    .get(*idx)
                    .map(|s| Cow::Borrowed(s.as_str()))
                    .unwrap_or(Cow::Borrowed("")),
            })
            .collect()
    }

    pub fn distinct_campaigns(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.campaign.as_str()))
    }

    pub fn distinct_personas(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.persona.as_str()))
    }

    /// Serializes the table back into normalized form, as an export would.
    pub fn to_normalized(&self) -> NormalizedTable {
        let mut positions = [0usize; 4];
        for (idx, column) in self.layout.iter().enumerate() {
            if let Column::Field(field) = column {
                positions[*field as usize] = idx;
            }
        }
        let rows = self
            .records
            .iter()
            .map(|record| {
                self.row_cells(record)
                    .into_iter()
                    .map(Cow::into_owned)
                    .collect()
            })
            .collect();
        NormalizedTable::from_parts(self.headers.clone(), rows, positions)
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|v| v.to_string())
        .collect()
}

pub fn canonicalize(table: NormalizedTable) -> CanonicalTable {
    let outcome_idx = table.position(CanonicalField::Outcome);
    let prior_idx = table.position(CanonicalField::PriorContact);
    let encodings = FlagEncodings {
        outcome: FlagEncoding::detect(
            table.rows.iter().filter_map(|r| r.get(outcome_idx).map(|s| s.as_str())),
        ),
        prior_contact: FlagEncoding::detect(
            table.rows.iter().filter_map(|r| r.get(prior_idx).map(|s| s.as_str())),
        ),
    };
    debug!(
        "Flag encodings: outcome {:?}, prior_contact {:?}",
        encodings.outcome, encodings.prior_contact
    );

    let mut layout = Vec::with_capacity(table.headers.len());
    let mut extra_positions = Vec::new();
    for idx in 0..table.headers.len() {
        let field = CanonicalField::ALL
            .into_iter()
            .find(|&field| table.position(field) == idx);
        match field {
            Some(field) => layout.push(Column::Field(field)),
            None => {
                layout.push(Column::Extra(extra_positions.len()));
                extra_positions.push(idx);
            }
        }
    }

    let total_rows = table.row_count();
    let mut records = Vec::with_capacity(total_rows);
    for row in &table.rows {
        let cell = |field: CanonicalField| table.cell(row, field).unwrap_or("");
        let persona = cell(CanonicalField::Persona).trim();
        if persona.is_empty() {
            continue;
        }
        records.push(CanonicalRecord {
            campaign: cell(CanonicalField::Campaign).trim().to_string(),
            persona: persona.to_string(),
            outcome: classify_outcome(cell(CanonicalField::Outcome), encodings.outcome),
            prior_contact: classify_prior_contact(
                cell(CanonicalField::PriorContact),
                encodings.prior_contact,
            ),
            extra: extra_positions
                .iter()
                .map(|&idx| row.get(idx).cloned().unwrap_or_default())
                .collect(),
        });
    }
    let dropped_rows = total_rows - records.len();
    if dropped_rows > 0 {
        debug!("Dropped {dropped_rows} row(s) with a blank persona");
    }

    CanonicalTable {
        headers: table.headers,
        layout,
        records,
        encodings,
        dropped_rows,
    }
}
