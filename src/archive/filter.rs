use super::models::ArchiveEntry;
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

/// Archive search. Blank fields do not filter, all others must match.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ArchiveFilter {
    /// Case-insensitive part of the strain name
    pub strain: Option<String>,
    /// Case-insensitive part of the tank label
    pub tank: Option<String>,
    /// First archive day, inclusive
    pub from: Option<NaiveDate>,
    /// Last archive day, inclusive
    pub to: Option<NaiveDate>,
}

fn needle(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

impl ArchiveFilter {
    pub fn matches(&self, entry: &ArchiveEntry) -> bool {
        if let Some(strain) = needle(self.strain.as_ref()) {
            let hit = entry
                .strain_name
                .as_ref()
                .is_some_and(|name| name.to_lowercase().contains(&strain));
            if !hit {
                return false;
            }
        }

        if let Some(tank) = needle(self.tank.as_ref()) {
            if !entry.tank_display().to_lowercase().contains(&tank) {
                return false;
            }
        }

        let archived_on = entry.entry.archived_at.date_naive();
        if self.from.is_some_and(|from| archived_on < from) {
            return false;
        }
        if self.to.is_some_and(|to| archived_on > to) {
            return false;
        }

        true
    }

    pub fn apply(&self, entries: Vec<ArchiveEntry>) -> Vec<ArchiveEntry> {
        entries.into_iter().filter(|e| self.matches(e)).collect()
    }
}
