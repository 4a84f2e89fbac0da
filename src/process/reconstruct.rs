use tracing::debug;

use crate::process::row::WorkingRow;

/// What reconstruction did to one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    /// Aggregate was blank or unreadable and now holds the component sum.
    Filled,
    /// Aggregate was 0 while the components summed above 0.
    CorrectedZero,
}

impl Repair {
    pub fn reason(&self) -> &'static str {
        match self {
            Repair::Filled => "violent crime reconstructed from components, kept",
            Repair::CorrectedZero => "zero violent crime replaced by component sum, kept",
        }
    }
}

/// Sum of a row's components; unreadable components count as 0.
pub fn component_sum(components: &[Option<f64>]) -> f64 {
    components.iter().map(|c| c.unwrap_or(0.0)).sum()
}

/// Decide the aggregate for one row.
///
/// A missing aggregate is always filled with the component sum; an aggregate
/// of exactly 0 is replaced only when the components add up to more. Any other
/// present value is trusted over the components.
pub fn repair_value(aggregate: Option<f64>, components: &[Option<f64>]) -> Option<(f64, Repair)> {
    let sum = component_sum(components);
    match aggregate {
        None => Some((sum, Repair::Filled)),
        Some(v) if v == 0.0 && sum > 0.0 => Some((sum, Repair::CorrectedZero)),
        Some(_) => None,
    }
}

/// Apply [`repair_value`] across `rows`.
///
/// Returns the new rows and, per touched row, its position and the repair
/// made. With no component columns the rows come back unchanged.
pub fn reconstruct(rows: Vec<WorkingRow>) -> (Vec<WorkingRow>, Vec<(usize, Repair)>) {
    let mut repairs = Vec::new();
    let rows = rows
        .into_iter()
        .enumerate()
        .map(|(idx, mut row)| {
            if row.components.is_empty() {
                return row;
            }
            if let Some((value, repair)) = repair_value(row.aggregate, &row.components) {
                debug!(
                    line = row.line,
                    city = ?row.city,
                    before = ?row.aggregate,
                    after = value,
                    ?repair,
                    "aggregate reconstructed"
                );
                row.aggregate = Some(value);
                repairs.push((idx, repair));
            }
            row
        })
        .collect();
    (rows, repairs)
}
