// src/audit/mod.rs

pub mod export;
pub mod report;
pub mod summary;
pub mod types;

use std::collections::BTreeMap;

use tracing::trace;

pub use summary::AuditSummary;
pub use types::{DropRecord, Stage, StageStats, UNKNOWN};

/// Process-lifetime record of every dropped or flagged row and of each
/// stage's before/after counts.
///
/// Drop records are append-only. Stage stats are keyed by (year, stage); a
/// second report for the same key replaces the first and keeps its position.
#[derive(Debug, Default)]
pub struct AuditLog {
    drops: Vec<DropRecord>,
    stages: BTreeMap<u16, Vec<StageStats>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_drop(&mut self, record: DropRecord) {
        trace!(
            year = record.year,
            stage = %record.stage,
            city = record.city_or_unknown(),
            reason = %record.reason,
            "drop record"
        );
        self.drops.push(record);
    }

    pub fn record_drops<I: IntoIterator<Item = DropRecord>>(&mut self, records: I) {
        for record in records {
            self.record_drop(record);
        }
    }

    pub fn record_stage(&mut self, stats: StageStats) {
        let per_year = self.stages.entry(stats.year).or_default();
        match per_year.iter_mut().find(|s| s.stage == stats.stage) {
            Some(existing) => *existing = stats,
            None => per_year.push(stats),
        }
    }

    pub fn drops(&self) -> &[DropRecord] {
        &self.drops
    }

    /// Stage stats for `year`, in the order stages first reported.
    pub fn stage_stats(&self, year: u16) -> &[StageStats] {
        self.stages.get(&year).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn stage(&self, year: u16, stage: Stage) -> Option<&StageStats> {
        self.stage_stats(year).iter().find(|s| s.stage == stage)
    }

    /// Years with at least one stage report, ascending.
    pub fn years(&self) -> impl Iterator<Item = u16> + '_ {
        self.stages.keys().copied()
    }

    pub fn drops_for_year(&self, year: u16) -> impl Iterator<Item = &DropRecord> + '_ {
        self.drops.iter().filter(move |d| d.year == year)
    }

    pub fn summary(&self) -> AuditSummary {
        AuditSummary::from_records(&self.drops)
    }
}
