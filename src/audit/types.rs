// src/audit/types.rs

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One discrete step of a year's processing that can report to the audit log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    /// The table could not be mapped onto its schema at all.
    Structure,
    /// The table failed to load or transform.
    ProcessingError,
    Reconstruction,
    MissingData,
    NumericConversion,
    ZeroCrime,
    NegativeValue,
}

impl Stage {
    /// Stages of the row filter chain, in the order they run.
    pub const FILTER_CHAIN: [Stage; 4] = [
        Stage::MissingData,
        Stage::NumericConversion,
        Stage::ZeroCrime,
        Stage::NegativeValue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Structure => "schema/structure",
            Stage::ProcessingError => "processing error",
            Stage::Reconstruction => "reconstruction",
            Stage::MissingData => "missing data filter",
            Stage::NumericConversion => "numeric conversion filter",
            Stage::ZeroCrime => "zero crime check",
            Stage::NegativeValue => "negative value filter",
        }
    }

    /// Whether records logged under this stage left the output.
    /// Reconstruction and the zero-crime check only flag rows they keep.
    pub fn is_rejecting(&self) -> bool {
        !matches!(self, Stage::Reconstruction | Stage::ZeroCrime)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audit entry for one row removed or flagged during processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropRecord {
    pub year: u16,
    pub state: Option<String>,
    pub city: Option<String>,
    pub reason: String,
    pub original_value: Option<String>,
    pub stage: Stage,
    pub timestamp: DateTime<Local>,
}

impl DropRecord {
    pub fn new(
        year: u16,
        state: Option<String>,
        city: Option<String>,
        reason: impl Into<String>,
        original_value: Option<String>,
        stage: Stage,
    ) -> Self {
        Self {
            year,
            state,
            city,
            reason: reason.into(),
            original_value,
            stage,
            timestamp: Local::now(),
        }
    }

    /// A year-level failure with no row attached.
    pub fn for_year(year: u16, reason: impl Into<String>, stage: Stage) -> Self {
        Self::new(year, None, None, reason, None, stage)
    }

    pub fn state_or_unknown(&self) -> &str {
        self.state.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn city_or_unknown(&self) -> &str {
        self.city.as_deref().unwrap_or(UNKNOWN)
    }
}

pub const UNKNOWN: &str = "UNKNOWN";

/// Row counts on either side of one stage for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStats {
    pub year: u16,
    pub stage: Stage,
    pub before: usize,
    pub after: usize,
    /// Rows the stage altered or flagged without removing them.
    #[serde(default)]
    pub touched: usize,
}

impl StageStats {
    pub fn new(year: u16, stage: Stage, before: usize, after: usize) -> Self {
        Self {
            year,
            stage,
            before,
            after,
            touched: 0,
        }
    }

    pub fn with_touched(mut self, touched: usize) -> Self {
        self.touched = touched;
        self
    }

    pub fn dropped(&self) -> usize {
        self.before.saturating_sub(self.after)
    }

    /// Fraction of rows kept, 0 when the stage saw no rows.
    pub fn retention_rate(&self) -> f64 {
        if self.before == 0 {
            0.0
        } else {
            self.after as f64 / self.before as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_labels_and_classification() {
        assert_eq!(Stage::Structure.to_string(), "schema/structure");
        assert_eq!(Stage::ZeroCrime.as_str(), "zero crime check");
        assert!(Stage::NegativeValue.is_rejecting());
        assert!(!Stage::ZeroCrime.is_rejecting());
        assert!(!Stage::Reconstruction.is_rejecting());
    }

    #[test]
    fn stats_derive_dropped_and_retention() {
        let s = StageStats::new(2019, Stage::MissingData, 200, 150);
        assert_eq!(s.dropped(), 50);
        assert!((s.retention_rate() - 0.75).abs() < 1e-9);

        let empty = StageStats::new(2019, Stage::MissingData, 0, 0);
        assert_eq!(empty.retention_rate(), 0.0);
    }
}
