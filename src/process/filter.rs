// src/process/filter.rs

use tracing::info;

use crate::{
    audit::{DropRecord, Stage, StageStats},
    process::row::WorkingRow,
};

/// A filter stage's decision on one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    /// Keep the row but log it.
    Flag(String),
    Reject(String),
}

/// One stage of the row filter chain.
pub trait RowFilter {
    fn stage(&self) -> Stage;
    fn check(&self, row: &WorkingRow) -> Verdict;
}

/// Rows without a city, state or aggregate value.
pub struct MissingDataFilter;

impl RowFilter for MissingDataFilter {
    fn stage(&self) -> Stage {
        Stage::MissingData
    }

    fn check(&self, row: &WorkingRow) -> Verdict {
        if row.city.is_none() {
            Verdict::Reject("missing city name".into())
        } else if row.state.is_none() {
            Verdict::Reject("missing state name".into())
        } else if row.aggregate.is_none() && row.raw_aggregate.is_blank() {
            Verdict::Reject("missing violent crime value".into())
        } else {
            Verdict::Keep
        }
    }
}

/// Rows whose aggregate text holds no leading number.
pub struct NumericConversionFilter;

impl RowFilter for NumericConversionFilter {
    fn stage(&self) -> Stage {
        Stage::NumericConversion
    }

    fn check(&self, row: &WorkingRow) -> Verdict {
        match row.aggregate {
            Some(_) => Verdict::Keep,
            None => Verdict::Reject("violent crime value not numeric".into()),
        }
    }
}

/// Logs rows reporting exactly zero; never removes any.
pub struct ZeroCrimeCheck;

impl RowFilter for ZeroCrimeCheck {
    fn stage(&self) -> Stage {
        Stage::ZeroCrime
    }

    fn check(&self, row: &WorkingRow) -> Verdict {
        match row.aggregate {
            Some(v) if v == 0.0 => Verdict::Flag("zero violent crime reported, kept".into()),
            _ => Verdict::Keep,
        }
    }
}

pub struct NegativeValueFilter;

impl RowFilter for NegativeValueFilter {
    fn stage(&self) -> Stage {
        Stage::NegativeValue
    }

    fn check(&self, row: &WorkingRow) -> Verdict {
        match row.aggregate {
            Some(v) if v < 0.0 => Verdict::Reject("negative violent crime value".into()),
            _ => Verdict::Keep,
        }
    }
}

/// The filter implementing `stage`, if it is a row filter stage.
pub fn filter_for(stage: Stage) -> Option<Box<dyn RowFilter>> {
    match stage {
        Stage::MissingData => Some(Box::new(MissingDataFilter)),
        Stage::NumericConversion => Some(Box::new(NumericConversionFilter)),
        Stage::ZeroCrime => Some(Box::new(ZeroCrimeCheck)),
        Stage::NegativeValue => Some(Box::new(NegativeValueFilter)),
        Stage::Structure | Stage::ProcessingError | Stage::Reconstruction => None,
    }
}

/// The chain in the order it runs, as listed by [`Stage::FILTER_CHAIN`].
pub fn filter_chain() -> Vec<Box<dyn RowFilter>> {
    Stage::FILTER_CHAIN
        .into_iter()
        .filter_map(filter_for)
        .collect()
}

/// Rows surviving a stage, with what the stage reports to the audit log.
#[derive(Debug)]
pub struct StageOutcome {
    pub rows: Vec<WorkingRow>,
    pub stats: StageStats,
    pub records: Vec<DropRecord>,
}

/// Run one stage over `rows`, partitioning them into kept and logged.
pub fn run_stage(filter: &dyn RowFilter, year: u16, rows: Vec<WorkingRow>) -> StageOutcome {
    let stage = filter.stage();
    let before = rows.len();
    let mut kept = Vec::with_capacity(before);
    let mut records = Vec::new();
    let mut flagged = 0;

    for row in rows {
        match filter.check(&row) {
            Verdict::Keep => kept.push(row),
            Verdict::Flag(reason) => {
                records.push(row.drop_record(year, reason, stage));
                flagged += 1;
                kept.push(row);
            }
            Verdict::Reject(reason) => records.push(row.drop_record(year, reason, stage)),
        }
    }

    let stats = StageStats::new(year, stage, before, kept.len()).with_touched(flagged);
    info!(
        year,
        stage = %stage,
        before = stats.before,
        after = stats.after,
        flagged,
        "stage done"
    );
    StageOutcome {
        rows: kept,
        stats,
        records,
    }
}
