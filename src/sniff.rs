//! Delimiter and encoding detection by trial parsing.
//!
//! Every delimiter candidate is crossed with every encoding candidate, in
//! order, and the first combination whose header row splits into more than
//! one column wins. Content is never scored: a later candidate that would
//! have produced a "better" table is not considered once an earlier one
//! succeeds.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use log::debug;

use crate::{error::PipelineError, io_utils, printable_delimiter};

pub const DEFAULT_DELIMITERS: [u8; 4] = [b';', b',', b'\t', b'|'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingCandidate {
    pub label: &'static str,
    pub encoding: &'static Encoding,
}

/// Encodings tried for every delimiter, in order. The three single-byte
/// labels all resolve to windows-1252 in `encoding_rs`, so a table decoded
/// through any of them reports `windows-1252`.
pub fn default_encodings() -> Vec<EncodingCandidate> {
    vec![
        EncodingCandidate {
            label: "utf-8",
            encoding: UTF_8,
        },
        EncodingCandidate {
            label: "latin-1",
            encoding: WINDOWS_1252,
        },
        EncodingCandidate {
            label: "iso-8859-1",
            encoding: WINDOWS_1252,
        },
        EncodingCandidate {
            label: "cp1252",
            encoding: WINDOWS_1252,
        },
    ]
}

/// Ordered candidate lists tried by [`sniff`].
#[derive(Debug, Clone)]
pub struct SniffOptions {
    pub delimiters: Vec<u8>,
    pub encodings: Vec<EncodingCandidate>,
}

impl Default for SniffOptions {
    fn default() -> Self {
        Self {
            delimiters: DEFAULT_DELIMITERS.to_vec(),
            encodings: default_encodings(),
        }
    }
}

impl SniffOptions {
    /// Narrows the candidate lists to explicit overrides, keeping defaults otherwise.
    pub fn with_overrides(delimiter: Option<u8>, encoding: Option<EncodingCandidate>) -> Self {
        let mut options = Self::default();
        if let Some(delimiter) = delimiter {
            options.delimiters = vec![delimiter];
        }
        if let Some(encoding) = encoding {
            options.encodings = vec![encoding];
        }
        options
    }
}

/// Untyped table as decoded from the upload. Short rows are padded with empty cells.
/// `encoding` names the decoder that produced the text, not the candidate label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub delimiter: u8,
    pub encoding: &'static str,
}

impl RawTable {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

pub fn sniff(bytes: &[u8], options: &SniffOptions) -> Result<RawTable, PipelineError> {
    let mut attempts = 0usize;
    for &delimiter in &options.delimiters {
        let mut tried: Vec<&'static Encoding> = Vec::new();
        for candidate in &options.encodings {
            if tried.contains(&candidate.encoding) {
                continue;
            }
            tried.push(candidate.encoding);
            attempts += 1;
            match parse_candidate(bytes, delimiter, candidate) {
                Some(table) if table.column_count() > 1 => {
                    debug!(
                        "Sniffed delimiter '{}' with encoding {} as {} ({} column(s), {} row(s))",
                        printable_delimiter(delimiter),
                        candidate.label,
                        table.encoding,
                        table.column_count(),
                        table.row_count()
                    );
                    return Ok(table);
                }
                Some(table) => debug!(
                    "Delimiter '{}' with encoding {} yields {} column(s)",
                    printable_delimiter(delimiter),
                    candidate.label,
                    table.column_count()
                ),
                None => debug!(
                    "Delimiter '{}' with encoding {} failed to parse",
                    printable_delimiter(delimiter),
                    candidate.label
                ),
            }
        }
    }
    Err(PipelineError::UnparsableFile { attempts })
}

fn parse_candidate(bytes: &[u8], delimiter: u8, candidate: &EncodingCandidate) -> Option<RawTable> {
    let text = io_utils::decode_bytes(bytes, candidate.encoding)?;
    let mut reader = io_utils::open_csv_reader(text.as_bytes(), delimiter);
    let headers = reader
        .headers()
        .ok()?
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.ok()?;
        // more cells than headers is a tokenizing error for this candidate
        if record.len() > headers.len() {
            return None;
        }
        let mut row = record.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Some(RawTable {
        headers,
        rows,
        delimiter,
        encoding: candidate.encoding.name(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semicolon_wins_over_comma_in_free_text() {
        let input = b"campaign;persona;note\nX;Buyer;likes a, b and c\n";
        let table = sniff(input, &SniffOptions::default()).expect("sniff");
        assert_eq!(table.delimiter, b';');
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows[0][2], "likes a, b and c");
    }

    #[test]
    fn first_success_wins_even_when_later_delimiter_splits_more() {
        // ';' gives 2 columns, ',' would give 3: the earlier candidate is kept
        let input = b"a;b,c,d\n1;2,3,4\n";
        let table = sniff(input, &SniffOptions::default()).expect("sniff");
        assert_eq!(table.delimiter, b';');
        assert_eq!(table.headers, vec!["a", "b,c,d"]);
    }

    #[test]
    fn falls_back_to_latin1_for_invalid_utf8() {
        let input = b"campaign,persona\nVer\xe3o,Poupador\n";
        let table = sniff(input, &SniffOptions::default()).expect("sniff");
        assert_eq!(table.encoding, "windows-1252");
        assert_eq!(table.rows[0][0], "Verão");
    }

    #[test]
    fn single_byte_fallback_reports_the_decoder_used() {
        let input = b"campaign;persona
A\x80;P\n";
        let table = sniff(input, &SniffOptions::default()).expect("sniff");
        assert_eq!(table.encoding, "windows-1252");
        assert_eq!(table.rows[0][0], "A\u{20ac}");
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_reject_candidate() {
        let input = b"a|b|c\n1|2\n";
        let table = sniff(input, &SniffOptions::default()).expect("sniff");
        assert_eq!(table.delimiter, b'|');
        assert_eq!(table.rows[0], vec!["1", "2", ""]);

        let overflowing = b"a;b\n1;2;3\n";
        let options = SniffOptions::with_overrides(Some(b';'), None);
        assert!(matches!(
            sniff(overflowing, &options),
            Err(PipelineError::UnparsableFile { .. })
        ));
    }

    #[test]
    fn single_column_and_empty_inputs_are_unparsable() {
        for input in [&b"justonecolumn\nvalue\n"[..], &b""[..]] {
            match sniff(input, &SniffOptions::default()) {
                Err(PipelineError::UnparsableFile { attempts }) => assert_eq!(attempts, 8),
                other => panic!("expected UnparsableFile, got {other:?}"),
            }
        }
    }
}
