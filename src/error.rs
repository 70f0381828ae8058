use thiserror::Error;

use crate::schema::CanonicalField;

/// Fatal pipeline failures. Either one halts the session before any view is built.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unable to parse the file: no delimiter/encoding combination produced more than one column ({attempts} attempt(s))")]
    UnparsableFile { attempts: usize },
    #[error("Missing required column(s): {}; found header(s): [{}]", describe_missing(.missing), .found.join(", "))]
    MissingColumns {
        missing: Vec<CanonicalField>,
        found: Vec<String>,
    },
}

fn describe_missing(missing: &[CanonicalField]) -> String {
    missing
        .iter()
        .map(|field| format!("{} ({})", field.name(), field.aliases().join("|")))
        .collect::<Vec<_>>()
        .join(", ")
}

impl PipelineError {
    /// Canonical names of the missing fields, empty for other variants.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        match self {
            PipelineError::MissingColumns { missing, .. } => {
                missing.iter().map(|field| field.name()).collect()
            }
            PipelineError::UnparsableFile { .. } => Vec::new(),
        }
    }
}
