use crate::{
    audit::{DropRecord, Stage},
    process::{
        raw_table::{Cell, RawTable},
        utils::{forward_fill_states, normalize_value},
    },
    schema::ResolvedColumnMap,
};

/// One source row narrowed to the columns the pipeline works with.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingRow {
    /// Position of the row among the table's data rows.
    pub line: usize,
    /// Cleaned and forward-filled state.
    pub state: Option<String>,
    /// City text as found, trimmed; `None` when blank.
    pub city: Option<String>,
    /// Aggregate cell before any coercion, kept for the audit trail.
    pub raw_aggregate: Cell,
    /// Aggregate as a count; `None` when blank or unreadable.
    pub aggregate: Option<f64>,
    /// Component counts in resolved-column order.
    pub components: Vec<Option<f64>>,
}

impl WorkingRow {
    pub fn drop_record(&self, year: u16, reason: impl Into<String>, stage: Stage) -> DropRecord {
        DropRecord::new(
            year,
            self.state.clone(),
            self.city.clone(),
            reason,
            self.raw_aggregate.as_text(),
            stage,
        )
    }
}

/// Build working rows from a table whose aggregate column has been resolved.
///
/// States are cleaned and forward-filled here, over every row of the table,
/// so that header rows carrying only a state still feed the rows below them.
pub fn working_rows(
    table: &RawTable,
    columns: &ResolvedColumnMap,
    aggregate_idx: usize,
) -> Vec<WorkingRow> {
    let component_idx = columns.component_indices();
    let states = forward_fill_states(
        (0..table.len()).map(|r| table.cell(r, columns.state_col.index).as_text()),
    );

    states
        .into_iter()
        .enumerate()
        .map(|(r, state)| {
            let raw_aggregate = table.cell(r, aggregate_idx).clone();
            WorkingRow {
                line: r,
                state,
                city: table
                    .cell(r, columns.city_col.index)
                    .as_text()
                    .map(|c| c.trim().to_string()),
                aggregate: normalize_value(&raw_aggregate),
                raw_aggregate,
                components: component_idx
                    .iter()
                    .map(|&c| normalize_value(table.cell(r, c)))
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{resolve, SchemaEntry};

    #[test]
    fn builds_rows_with_filled_states() {
        let headers: Vec<String> = ["State", "City", "Violent crime", "Murder", "Robbery"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![
            vec![Cell::from("TEXAS4"), Cell::Blank],
            vec![Cell::Blank, Cell::from("Austin"), Cell::from("1,200"), Cell::from("3")],
            vec![Cell::Blank, Cell::from(" Waco2 "), Cell::Blank, Cell::from("x"), Cell::from("4")],
        ];
        let table = RawTable::new(headers.clone(), rows);
        let schema = SchemaEntry::new(2019, "Violent crime", &["Murder", "Robbery"]);
        let map = resolve(&headers, &schema).unwrap();

        let out = working_rows(&table, &map, 2);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].state.as_deref(), Some("TEXAS"));
        assert_eq!(out[0].city, None);
        assert_eq!(out[1].state.as_deref(), Some("TEXAS"));
        assert_eq!(out[1].aggregate, Some(1200.0));
        assert_eq!(out[1].components, vec![Some(3.0), None]);
        assert_eq!(out[2].city.as_deref(), Some("Waco2"));
        assert_eq!(out[2].aggregate, None);
        assert_eq!(out[2].components, vec![None, Some(4.0)]);

        let rec = out[1].drop_record(2019, "why", Stage::NegativeValue);
        assert_eq!(rec.original_value.as_deref(), Some("1,200"));
        assert_eq!(rec.state.as_deref(), Some("TEXAS"));
    }
}
