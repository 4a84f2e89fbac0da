// src/process/mod.rs

pub mod filter;
pub mod load;
pub mod raw_table;
pub mod reconstruct;
pub mod record;
pub mod row;
pub mod utils;

use std::{
    ops::RangeInclusive,
    panic::{self, AssertUnwindSafe},
};

use anyhow::anyhow;
use tracing::{error, info, warn};

use crate::{
    audit::{AuditLog, DropRecord, Stage, StageStats},
    error::YearError,
    schema::{resolve, SchemaEntry, SchemaRegistry},
};

pub use load::{load_csv_table, parse_csv_table, CsvTableSource, TableSource};
pub use raw_table::{Cell, RawTable};
pub use record::{save_city_records, write_city_records, CityRecord};

/// What happened to one requested year.
#[derive(Debug, Clone, PartialEq)]
pub enum YearStatus {
    Processed { records: usize },
    /// No registry entry for the year. Nothing is logged.
    SchemaMissing,
    /// No table for the year. Nothing is logged.
    SourceUnavailable,
    /// Abandoned; one drop record under "schema/structure".
    StructuralFailure(String),
    /// Abandoned; one drop record under "processing error".
    ProcessingError(String),
}

/// Result of a whole run.
#[derive(Debug, Default)]
pub struct RunOutcome {
    /// All city records, grouped by year then by source row order.
    pub records: Vec<CityRecord>,
    pub years: Vec<(u16, YearStatus)>,
}

impl RunOutcome {
    /// False when no year produced a single record.
    pub fn produced_data(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn years_processed(&self) -> usize {
        self.years
            .iter()
            .filter(|(_, s)| matches!(s, YearStatus::Processed { .. }))
            .count()
    }
}

/// Turn one year's table into city records, reporting every stage to `audit`.
///
/// The caller's table is only read. On `Err` no records were produced and
/// nothing about the failure itself has been logged yet.
#[tracing::instrument(level = "info", skip(table, schema, audit), fields(rows = table.len()))]
pub fn process_year(
    year: u16,
    table: &RawTable,
    schema: &SchemaEntry,
    audit: &mut AuditLog,
) -> Result<Vec<CityRecord>, YearError> {
    // ─── 1) map headers onto the schema ─────────────────────────────
    let columns = resolve(&table.headers, schema).ok_or_else(|| {
        YearError::Structure(format!(
            "table has {} column(s), need at least State and City",
            table.headers.len()
        ))
    })?;
    let aggregate = columns.aggregate_col.clone().ok_or_else(|| {
        YearError::Structure(format!(
            "violent crime column not found (expected '{}')",
            schema.aggregate_name
        ))
    })?;
    if !columns.missing_components.is_empty() {
        warn!(
            missing = ?columns.missing_components,
            found = columns.component_cols.len(),
            "partial component set; summing what was found"
        );
    }

    // ─── 2) coerce values, clean + forward-fill states ──────────────
    let rows = row::working_rows(table, &columns, aggregate.index);

    // ─── 3) reconstruct aggregates from components ──────────────────
    let before = rows.len();
    let rows = if columns.component_cols.is_empty() {
        warn!("no component columns resolved; skipping reconstruction");
        rows
    } else {
        let (rows, repairs) = reconstruct::reconstruct(rows);
        for (idx, repair) in &repairs {
            audit.record_drop(rows[*idx].drop_record(year, repair.reason(), Stage::Reconstruction));
        }
        info!(touched = repairs.len(), "reconstruction done");
        audit.record_stage(
            StageStats::new(year, Stage::Reconstruction, before, rows.len())
                .with_touched(repairs.len()),
        );
        rows
    };

    // ─── 4) filter chain ────────────────────────────────────────────
    let mut rows = rows;
    for stage in filter::filter_chain() {
        let outcome = filter::run_stage(stage.as_ref(), year, rows);
        audit.record_drops(outcome.records);
        audit.record_stage(outcome.stats);
        rows = outcome.rows;
    }

    // ─── 5) project survivors ───────────────────────────────────────
    let records: Vec<CityRecord> = rows
        .iter()
        .filter_map(|r| CityRecord::from_row(year, r))
        .collect();
    info!(records = records.len(), "year done");
    Ok(records)
}

/// Run one year's transform, turning a panic into [`YearError::Processing`].
///
/// Stage reports made before the panic stay in the audit log.
fn guard_year<T>(year: u16, f: impl FnOnce() -> Result<T, YearError>) -> Result<T, YearError> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(YearError::Processing(anyhow!(
            "transform of {} panicked: {}",
            year,
            detail
        )))
    })
}

/// Process every year in `years` in order, isolating per-year failures.
///
/// Years are strictly sequential: stage stats and state forward-fill are
/// order-sensitive.
pub fn run<S: TableSource>(
    years: RangeInclusive<u16>,
    registry: &SchemaRegistry,
    source: &mut S,
    audit: &mut AuditLog,
) -> RunOutcome {
    let mut outcome = RunOutcome::default();

    for year in years {
        let Some(schema) = registry.lookup(year) else {
            warn!(year, "no schema defined; skipping");
            outcome.years.push((year, YearStatus::SchemaMissing));
            continue;
        };

        let table = match source.load(year) {
            Ok(Some(table)) => table,
            Ok(None) => {
                warn!(year, "no table available; skipping");
                outcome.years.push((year, YearStatus::SourceUnavailable));
                continue;
            }
            Err(e) => {
                let err = YearError::Processing(e);
                error!(year, "{}", err);
                audit.record_drop(DropRecord::for_year(year, err.to_string(), Stage::ProcessingError));
                outcome
                    .years
                    .push((year, YearStatus::ProcessingError(err.to_string())));
                continue;
            }
        };

        match guard_year(year, || process_year(year, &table, schema, audit)) {
            Ok(records) => {
                outcome.years.push((
                    year,
                    YearStatus::Processed {
                        records: records.len(),
                    },
                ));
                outcome.records.extend(records);
            }
            Err(YearError::Structure(detail)) => {
                warn!(year, %detail, "abandoning year");
                audit.record_drop(DropRecord::for_year(year, detail.clone(), Stage::Structure));
                outcome.years.push((year, YearStatus::StructuralFailure(detail)));
            }
            Err(err @ YearError::Processing(_)) => {
                error!(year, "{}", err);
                audit.record_drop(DropRecord::for_year(year, err.to_string(), Stage::ProcessingError));
                outcome
                    .years
                    .push((year, YearStatus::ProcessingError(err.to_string())));
            }
        }
    }

    if outcome.produced_data() {
        info!(
            records = outcome.records.len(),
            years = outcome.years_processed(),
            "run complete"
        );
    } else {
        warn!("no data produced");
    }
    outcome
}
