// src/schema/resolve.rs

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::types::SchemaEntry;
use crate::process::utils::normalize_name;

/// Logical role given to the first raw header regardless of its text.
pub const STATE_ROLE: &str = "State";
/// Logical role given to the second raw header regardless of its text.
pub const CITY_ROLE: &str = "City";

/// A raw header matched to a logical role, with its position in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    pub header: String,
    pub index: usize,
}

/// Where each logical column of a year's schema sits in one raw table.
///
/// Recomputed per table; header sets drift from year to year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumnMap {
    pub state_col: ResolvedColumn,
    pub city_col: ResolvedColumn,
    pub aggregate_col: Option<ResolvedColumn>,
    /// Matched components, in schema order. Unmatched ones are simply absent.
    pub component_cols: Vec<ResolvedColumn>,
    /// Schema component names with no matching header.
    pub missing_components: Vec<String>,
}

impl ResolvedColumnMap {
    pub fn component_indices(&self) -> Vec<usize> {
        self.component_cols.iter().map(|c| c.index).collect()
    }
}

/// Match `raw_headers` against `schema`, ignoring case and whitespace run length.
///
/// The first two headers are always State and City and take no part in the
/// name matching. Returns `None` when there are fewer than two headers.
pub fn resolve(raw_headers: &[String], schema: &SchemaEntry) -> Option<ResolvedColumnMap> {
    if raw_headers.len() < 2 {
        return None;
    }

    // normalized → (original, index); first occurrence wins
    let mut by_name: HashMap<String, (usize, &str)> = HashMap::with_capacity(raw_headers.len());
    for (idx, header) in raw_headers.iter().enumerate().skip(2) {
        let key = normalize_name(header);
        if key.is_empty() {
            continue;
        }
        by_name.entry(key).or_insert((idx, header.as_str()));
    }

    let find = |name: &str| -> Option<ResolvedColumn> {
        by_name
            .get(&normalize_name(name))
            .map(|(index, header)| ResolvedColumn {
                header: header.to_string(),
                index: *index,
            })
    };

    let aggregate_col = find(&schema.aggregate_name);
    if aggregate_col.is_none() {
        warn!(
            year = schema.year,
            expected = %schema.aggregate_name,
            "aggregate column not found"
        );
    }

    let mut component_cols = Vec::with_capacity(schema.component_names.len());
    let mut missing_components = Vec::new();
    for name in &schema.component_names {
        match find(name) {
            Some(col) => component_cols.push(col),
            None => {
                debug!(year = schema.year, component = %name, "component column not found");
                missing_components.push(name.clone());
            }
        }
    }

    Some(ResolvedColumnMap {
        state_col: ResolvedColumn {
            header: raw_headers[0].clone(),
            index: 0,
        },
        city_col: ResolvedColumn {
            header: raw_headers[1].clone(),
            index: 1,
        },
        aggregate_col,
        component_cols,
        missing_components,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn schema_2021() -> SchemaEntry {
        SchemaEntry::new(
            2021,
            "Violent crime",
            &["Murder", "Rape", "Robbery", "Aggravated assault"],
        )
    }

    #[test]
    fn matching_ignores_case_and_whitespace_runs() {
        let raw = headers(&[
            "State",
            "City",
            "Population",
            "VIOLENT   crime",
            "Murder",
            "Rape",
            "Robbery",
            "Aggravated  Assault\n",
        ]);
        let map = resolve(&raw, &schema_2021()).unwrap();

        let agg = map.aggregate_col.clone().unwrap();
        assert_eq!(agg.header, "VIOLENT   crime");
        assert_eq!(agg.index, 3);
        assert_eq!(map.component_cols.len(), 4);
        assert_eq!(map.component_cols[3].header, "Aggravated  Assault\n");
        assert!(map.missing_components.is_empty());
        assert_eq!(map.component_indices(), vec![4, 5, 6, 7]);
    }

    #[test]
    fn first_two_headers_are_state_and_city() {
        let raw = headers(&["Table 8 TEXAS", "", "Violent crime", "Murder"]);
        let map = resolve(&raw, &schema_2021()).unwrap();
        assert_eq!(map.state_col.index, 0);
        assert_eq!(map.state_col.header, "Table 8 TEXAS");
        assert_eq!(map.city_col.index, 1);
        assert_eq!(map.aggregate_col.unwrap().index, 2);
    }

    #[test]
    fn unmatched_components_are_omitted() {
        let raw = headers(&["State", "City", "Violent crime", "Murder", "Robbery"]);
        let map = resolve(&raw, &schema_2021()).unwrap();
        let names: Vec<_> = map.component_cols.iter().map(|c| c.header.as_str()).collect();
        assert_eq!(names, vec!["Murder", "Robbery"]);
        assert_eq!(map.missing_components, vec!["Rape", "Aggravated assault"]);
    }

    #[test]
    fn duplicate_headers_keep_first() {
        let raw = headers(&["State", "City", "Violent crime", "violent  CRIME", "Murder"]);
        let map = resolve(&raw, &schema_2021()).unwrap();
        assert_eq!(map.aggregate_col.unwrap().index, 2);
    }

    #[test]
    fn missing_aggregate_and_short_tables() {
        let raw = headers(&["State", "City", "Murder"]);
        let map = resolve(&raw, &schema_2021()).unwrap();
        assert!(map.aggregate_col.is_none());

        assert!(resolve(&headers(&["State"]), &schema_2021()).is_none());
    }
}
