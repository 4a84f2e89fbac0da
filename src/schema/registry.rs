use std::collections::BTreeMap;

use tracing::debug;

use super::types::{SchemaEntry, SchemaSpec};

const MURDER_LONG: &str = "Murder and nonnegligent manslaughter";

/// Year → expected column names. Built once at startup and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: BTreeMap<u16, SchemaEntry>,
}

impl SchemaRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The column layouts of the 2012–2023 "Offenses Known" city tables.
    pub fn builtin() -> Self {
        let mut reg = Self::empty();

        reg.insert(SchemaEntry::new(
            2012,
            "Violent crime",
            &[MURDER_LONG, "Forcible rape", "Robbery", "Aggravated assault"],
        ));
        for year in 2013..=2016 {
            reg.insert(SchemaEntry::new(
                year,
                "Violent crime",
                &[
                    MURDER_LONG,
                    "Rape (revised definition) 1",
                    "Rape (legacy definition) 2",
                    "Robbery",
                    "Aggravated assault",
                ],
            ));
        }
        reg.insert(SchemaEntry::new(
            2017,
            "Violent Crime",
            &[MURDER_LONG, "Rape1", "Robbery", "Aggravated assault"],
        ));
        for year in 2018..=2019 {
            reg.insert(SchemaEntry::new(
                year,
                "Violent crime",
                &[MURDER_LONG, "Rape1", "Robbery", "Aggravated assault"],
            ));
        }
        reg.insert(SchemaEntry::new(
            2020,
            "Violent Crime Total",
            &[MURDER_LONG, "Rape 1", "Robbery", "Aggravated assault"],
        ));
        for year in 2021..=2023 {
            reg.insert(SchemaEntry::new(
                year,
                "Violent crime",
                &["Murder", "Rape", "Robbery", "Aggravated Assault"],
            ));
        }

        reg
    }

    /// Built-in entries with configured ones layered on top (same year replaces).
    pub fn with_overrides(overrides: &BTreeMap<u16, SchemaSpec>) -> Self {
        let mut reg = Self::builtin();
        for (year, spec) in overrides {
            debug!(year, aggregate = %spec.aggregate, "schema override");
            reg.insert(spec.clone().into_entry(*year));
        }
        reg
    }

    pub fn insert(&mut self, entry: SchemaEntry) -> Option<SchemaEntry> {
        self.entries.insert(entry.year, entry)
    }

    pub fn lookup(&self, year: u16) -> Option<&SchemaEntry> {
        self.entries.get(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = u16> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_2012_to_2023() {
        let reg = SchemaRegistry::builtin();
        assert_eq!(reg.years().collect::<Vec<_>>(), (2012u16..=2023).collect::<Vec<_>>());
        assert!(reg.lookup(2011).is_none());
        assert!(reg.lookup(2024).is_none());
    }

    #[test]
    fn renamed_columns_per_year() {
        let reg = SchemaRegistry::builtin();
        assert_eq!(reg.lookup(2020).unwrap().aggregate_name, "Violent Crime Total");
        assert_eq!(reg.lookup(2013).unwrap().component_names.len(), 5);
        assert_eq!(
            reg.lookup(2022).unwrap().component_names,
            vec!["Murder", "Rape", "Robbery", "Aggravated Assault"]
        );
    }

    #[test]
    fn overrides_replace_and_add() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            2024,
            SchemaSpec {
                aggregate: "Violent crime".into(),
                components: vec!["Murder".into(), "Robbery".into()],
            },
        );
        overrides.insert(
            2012,
            SchemaSpec {
                aggregate: "Violent total".into(),
                components: vec![],
            },
        );
        let reg = SchemaRegistry::with_overrides(&overrides);
        assert_eq!(reg.len(), 13);
        assert_eq!(reg.lookup(2024).unwrap().component_names.len(), 2);
        assert_eq!(reg.lookup(2012).unwrap().aggregate_name, "Violent total");
    }
}
