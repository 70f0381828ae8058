//! Summary metrics and grouped breakdowns over a filtered table.
//!
//! Groups are keyed by exact string equality and emitted in ascending key
//! order, so identical input always yields identical output.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{canonical::CanonicalRecord, filter::FilteredTable};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateView {
    pub total: usize,
    pub success_count: usize,
    pub success_rate: f64,
    pub prior_contact_count: usize,
    pub prior_contact_rate: f64,
    pub unique_persona_count: usize,
    pub personas: Vec<PersonaBreakdown>,
    pub campaigns: Vec<CampaignBreakdown>,
    pub outcome_split: FlagSplit,
    pub prior_contact_split: FlagSplit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonaBreakdown {
    pub persona: String,
    pub count: usize,
    pub success_count: usize,
    pub prior_contact_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignBreakdown {
    pub campaign: String,
    pub count: usize,
}

/// True/false counts behind the outcome and prior-contact donut charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagSplit {
    #[serde(rename = "true")]
    pub yes: usize,
    #[serde(rename = "false")]
    pub no: usize,
}

impl FlagSplit {
    fn from_counts(yes: usize, total: usize) -> Self {
        Self {
            yes,
            no: total - yes,
        }
    }
}

/// Percentage of `count` over `total`, defined as `0` for an empty table.
pub fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

#[derive(Default)]
struct GroupCounts {
    count: usize,
    success: usize,
    prior_contact: usize,
}

impl GroupCounts {
    fn ingest(&mut self, record: &CanonicalRecord) {
        self.count += 1;
        self.success += usize::from(record.outcome);
        self.prior_contact += usize::from(record.prior_contact);
    }
}

pub fn aggregate(filtered: &FilteredTable<'_>) -> AggregateView {
    let mut totals = GroupCounts::default();
    let mut personas: BTreeMap<&str, GroupCounts> = BTreeMap::new();
    let mut campaigns: BTreeMap<&str, usize> = BTreeMap::new();

    for record in filtered.records() {
        totals.ingest(record);
        personas
            .entry(record.persona.as_str())
            .or_default()
            .ingest(record);
        *campaigns.entry(record.campaign.as_str()).or_insert(0) += 1;
    }

    let total = totals.count;
    AggregateView {
        total,
        success_count: totals.success,
        success_rate: rate(totals.success, total),
        prior_contact_count: totals.prior_contact,
        prior_contact_rate: rate(totals.prior_contact, total),
        unique_persona_count: personas.len(),
        personas: personas
            .into_iter()
            .map(|(persona, counts)| PersonaBreakdown {
                persona: persona.to_string(),
                count: counts.count,
                success_count: counts.success,
                prior_contact_count: counts.prior_contact,
            })
            .collect(),
        campaigns: campaigns
            .into_iter()
            .map(|(campaign, count)| CampaignBreakdown {
                campaign: campaign.to_string(),
                count,
            })
            .collect(),
        outcome_split: FlagSplit::from_counts(totals.success, total),
        prior_contact_split: FlagSplit::from_counts(totals.prior_contact, total),
    }
}
