//! End-to-end pipeline runs over small uploads: sniff, normalize, canonicalize,
//! filter and aggregate.

mod common;

use campaign_report::{
    aggregate::aggregate,
    canonical::canonicalize,
    error::PipelineError,
    filter::{FilterSelection, apply_filter},
    schema::normalize,
    session::Session,
    sniff::{SniffOptions, sniff},
};

use common::{NUMERIC_UPLOAD, TEXTUAL_UPLOAD};

#[test]
fn semicolon_upload_with_textual_labels() {
    let raw = sniff(TEXTUAL_UPLOAD.as_bytes(), &SniffOptions::default()).expect("sniff");
    assert_eq!(raw.delimiter, b';');
    assert_eq!(raw.column_count(), 4);

    let table = canonicalize(normalize(raw).expect("normalize"));
    assert_eq!(table.len(), 2);

    let view = aggregate(&apply_filter(&table, &FilterSelection::all()));
    assert_eq!(view.success_count, 1);
    assert_eq!(view.prior_contact_count, 1);
    assert_eq!(view.success_rate, 50.0);
}

#[test]
fn tab_upload_with_numeric_flags() {
    let input = "Campaign\tPersona\tResultado\tPrevious\nA\tSaver\t1\t3\n";
    let raw = sniff(input.as_bytes(), &SniffOptions::default()).expect("sniff");
    assert_eq!(raw.delimiter, b'\t');
    let table = canonicalize(normalize(raw).expect("normalize"));
    let record = &table.records()[0];
    assert!(record.outcome);
    assert!(record.prior_contact);
}

#[test]
fn whitespace_persona_row_is_dropped() {
    let raw = sniff(NUMERIC_UPLOAD.as_bytes(), &SniffOptions::default()).expect("sniff");
    let normalized = normalize(raw).expect("normalize");
    let before = normalized.row_count();
    let table = canonicalize(normalized);
    assert_eq!(table.len(), before - 1);
    assert!(table.records().iter().all(|r| !r.persona.trim().is_empty()));
}

#[test]
fn upload_without_required_headers_halts_before_aggregation() {
    let input = "nome;idade;cidade;nota\nAna;30;Rio;9\n";
    match Session::load(input.as_bytes(), &SniffOptions::default()) {
        Err(PipelineError::MissingColumns { missing, found }) => {
            let names = missing.iter().map(|f| f.name()).collect::<Vec<_>>();
            assert_eq!(names, vec!["campaign", "persona", "outcome", "prior_contact"]);
            assert_eq!(found, vec!["nome", "idade", "cidade", "nota"]);
        }
        Err(other) => panic!("expected MissingColumns, got {other}"),
        Ok(_) => panic!("expected MissingColumns, got a session"),
    }
}

#[test]
fn per_persona_breakdown_for_numeric_upload() {
    let session = Session::load(NUMERIC_UPLOAD.as_bytes(), &SniffOptions::default()).expect("load");
    let view = session.view(&FilterSelection::all());
    let breakdown = view
        .aggregate
        .personas
        .iter()
        .map(|p| (p.persona.as_str(), p.count, p.success_count, p.prior_contact_count))
        .collect::<Vec<_>>();
    assert_eq!(breakdown, vec![("Buyer", 1, 0, 0), ("Saver", 2, 2, 1)]);
    assert_eq!(view.aggregate.outcome_split.yes, 2);
    assert_eq!(view.aggregate.outcome_split.no, 1);
}
