// src/schema/types.rs

use serde::{Deserialize, Serialize};

/// Logical column names one year's table is expected to carry.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
pub struct SchemaEntry {
    pub year: u16,
    /// Header of the total violent crime column.
    pub aggregate_name: String,
    /// Headers of the offense columns that sum to the aggregate, in order.
    pub component_names: Vec<String>,
}

impl SchemaEntry {
    pub fn new<S: Into<String>>(year: u16, aggregate_name: S, component_names: &[&str]) -> Self {
        Self {
            year,
            aggregate_name: aggregate_name.into(),
            component_names: component_names.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A schema as written in the run configuration; the year comes from the map key.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct SchemaSpec {
    pub aggregate: String,
    #[serde(default)]
    pub components: Vec<String>,
}

impl SchemaSpec {
    pub fn into_entry(self, year: u16) -> SchemaEntry {
        SchemaEntry {
            year,
            aggregate_name: self.aggregate,
            component_names: self.components,
        }
    }
}
