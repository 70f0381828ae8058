use crate::canonical::{CanonicalRecord, CanonicalTable};

/// Optional exact-match constraints on `campaign` and `persona`, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub campaign: Option<String>,
    pub persona: Option<String>,
}

impl FilterSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(campaign: Option<String>, persona: Option<String>) -> Self {
        Self { campaign, persona }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.campaign.is_none() && self.persona.is_none()
    }

    pub fn matches(&self, record: &CanonicalRecord) -> bool {
        self.campaign
            .as_deref()
            .is_none_or(|campaign| record.campaign == campaign)
            && self
                .persona
                .as_deref()
                .is_none_or(|persona| record.persona == persona)
    }
}

/// Borrowed view over the records of a [`CanonicalTable`] that pass a selection.
#[derive(Debug, Clone)]
pub struct FilteredTable<'a> {
    table: &'a CanonicalTable,
    records: Vec<&'a CanonicalRecord>,
}

impl<'a> FilteredTable<'a> {
    pub fn table(&self) -> &'a CanonicalTable {
        self.table
    }

    pub fn records(&self) -> &[&'a CanonicalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub fn apply_filter<'a>(
    table: &'a CanonicalTable,
    selection: &FilterSelection,
) -> FilteredTable<'a> {
    let records = if selection.is_unconstrained() {
        table.records().iter().collect()
    } else {
        table
            .records()
            .iter()
            .filter(|record| selection.matches(record))
            .collect()
    };
    FilteredTable { table, records }
}
