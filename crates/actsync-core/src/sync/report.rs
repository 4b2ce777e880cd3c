//! Reports returned by engine calls

use std::fmt;

use serde::Serialize;

use crate::orchestrator::{Outcome, OutcomeStatus};

/// Per-reference outcomes of one engine call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Nothing was written when set.
    pub dry_run: bool,
    /// Outcomes in the order operations were applied.
    pub outcomes: Vec<Outcome>,
    /// Whether the manifest file changed on disk.
    pub manifest_written: bool,
}

/// Outcome counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl SyncReport {
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for outcome in &self.outcomes {
            let slot = match outcome.status {
                OutcomeStatus::Created => &mut summary.created,
                OutcomeStatus::Updated => &mut summary.updated,
                OutcomeStatus::Unchanged => &mut summary.unchanged,
                OutcomeStatus::Removed => &mut summary.removed,
                OutcomeStatus::NotFound => &mut summary.not_found,
                OutcomeStatus::Failed => &mut summary.failed,
            };
            *slot += 1;
        }
        summary
    }

    /// Generated files written or deleted, in operation order.
    pub fn files_written(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.file_written)
            .filter_map(|o| o.file.as_deref())
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(Outcome::is_failure)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }
}

impl Summary {
    pub fn total(&self) -> usize {
        self.created + self.updated + self.unchanged + self.removed + self.not_found + self.failed
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            (self.created, "created"),
            (self.updated, "updated"),
            (self.unchanged, "unchanged"),
            (self.removed, "removed"),
            (self.not_found, "not found"),
            (self.failed, "failed"),
        ]
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{count} {label}"))
        .collect();

        if parts.is_empty() {
            f.write_str("nothing to do")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}
