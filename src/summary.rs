use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    aggregate::{AggregateView, FlagSplit},
    cli::SummaryArgs,
    filter::FilterSelection,
    load_session, selection, table,
};

#[derive(Serialize)]
struct SummaryDocument<'a> {
    campaign: Option<&'a str>,
    persona: Option<&'a str>,
    #[serde(flatten)]
    view: &'a AggregateView,
}

pub fn execute(args: &SummaryArgs) -> Result<()> {
    let session = load_session(&args.input)?;
    let selection = selection(&args.filter);
    let view = session.view(&selection);

    if args.json {
        let document = SummaryDocument {
            campaign: selection.campaign.as_deref(),
            persona: selection.persona.as_deref(),
            view: &view.aggregate,
        };
        let rendered =
            serde_json::to_string_pretty(&document).context("Serializing summary to JSON")?;
        println!("{rendered}");
    } else {
        print!("{}", render_summary(&selection, &view.aggregate));
    }
    info!(
        "Summarized {} of {} record(s)",
        view.aggregate.total,
        session.table().len()
    );
    Ok(())
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

pub fn format_rate(rate: f64) -> String {
    format!("{rate:.1}%")
}

/// Renders the metric cards, breakdown tables and chart splits as text.
pub fn render_summary(selection: &FilterSelection, view: &AggregateView) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Campaign: {}\nPersona: {}\n\n",
        selection.campaign.as_deref().unwrap_or("all"),
        selection.persona.as_deref().unwrap_or("all")
    ));

    let metrics = vec![
        vec!["total records".to_string(), view.total.to_string()],
        vec!["successes".to_string(), view.success_count.to_string()],
        vec!["success rate".to_string(), format_rate(view.success_rate)],
        vec![
            "prior contacts".to_string(),
            view.prior_contact_count.to_string(),
        ],
        vec![
            "prior contact rate".to_string(),
            format_rate(view.prior_contact_rate),
        ],
        vec![
            "unique personas".to_string(),
            view.unique_persona_count.to_string(),
        ],
    ];
    output.push_str(&table::render_table(&headers(&["metric", "value"]), &metrics));

    let persona_rows = view
        .personas
        .iter()
        .map(|p| {
            vec![
                p.persona.clone(),
                p.count.to_string(),
                p.success_count.to_string(),
                p.prior_contact_count.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    output.push_str("\nPerformance by persona\n");
    output.push_str(&table::render_table(
        &headers(&["persona", "total", "successes", "prior_contact"]),
        &persona_rows,
    ));

    let campaign_rows = view
        .campaigns
        .iter()
        .map(|c| vec![c.campaign.clone(), c.count.to_string()])
        .collect::<Vec<_>>();
    output.push_str("\nRecords by campaign\n");
    output.push_str(&table::render_table(
        &headers(&["campaign", "count"]),
        &campaign_rows,
    ));

    output.push_str("\nOutcome split\n");
    output.push_str(&render_split(&view.outcome_split, "success", "failure"));
    output.push_str("\nPrior contact split\n");
    output.push_str(&render_split(&view.prior_contact_split, "yes", "no"));
    output
}

fn render_split(split: &FlagSplit, yes: &str, no: &str) -> String {
    let rows = vec![
        vec![yes.to_string(), split.yes.to_string()],
        vec![no.to_string(), split.no.to_string()],
    ];
    table::render_table(&headers(&["value", "count"]), &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{session::Session, sniff::SniffOptions};

    #[test]
    fn renders_metric_cards_and_breakdowns() {
        let session = Session::load(
            b"campaign;persona;resultado;previousy\nX;Buyer;sucesso;sim\nX;Buyer;falha;nao\n",
            &SniffOptions::default(),
        )
        .expect("load");
        let selection = FilterSelection::all();
        let view = session.view(&selection);
        let rendered = render_summary(&selection, &view.aggregate);
        let tokens = |prefix: &str| {
            rendered
                .lines()
                .find(|line| line.starts_with(prefix))
                .map(|line| line.split_whitespace().collect::<Vec<_>>())
                .unwrap_or_default()
        };
        assert!(rendered.contains("Campaign: all"));
        assert_eq!(tokens("success rate"), vec!["success", "rate", "50.0%"]);
        assert_eq!(tokens("unique personas"), vec!["unique", "personas", "1"]);
        assert_eq!(tokens("Buyer"), vec!["Buyer", "2", "1", "1"]);
        assert_eq!(tokens("X "), vec!["X", "2"]);
        assert_eq!(tokens("failure"), vec!["failure", "1"]);
    }

    #[test]
    fn format_rate_uses_one_decimal() {
        assert_eq!(format_rate(0.0), "0.0%");
        assert_eq!(format_rate(100.0 / 3.0), "33.3%");
    }
}
