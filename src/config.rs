// src/config.rs

use std::{
    collections::BTreeMap,
    fs,
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::schema::SchemaSpec;

/// Everything a run needs, normally read from a YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub start_year: u16,
    pub end_year: u16,
    /// Title rows above the header row in each exported table.
    pub skip_rows: usize,
    pub output_dir: PathBuf,
    /// The table to use for each year; picking it is the caller's job.
    pub tables: BTreeMap<u16, PathBuf>,
    /// Extra or replacement schema entries.
    pub schemas: BTreeMap<u16, SchemaSpec>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            start_year: 2012,
            end_year: 2023,
            skip_rows: 3,
            output_dir: PathBuf::from("output"),
            tables: BTreeMap::new(),
            schemas: BTreeMap::new(),
        }
    }
}

impl RunConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let cfg: RunConfig = serde_yaml::from_str(text).context("parsing run config")?;
        Ok(cfg)
    }

    /// Read `path`; relative table paths are taken relative to the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        let mut cfg = Self::from_yaml(&text).with_context(|| format!("in {:?}", path))?;
        if let Some(base) = path.parent() {
            for table in cfg.tables.values_mut() {
                if table.is_relative() {
                    *table = base.join(&*table);
                }
            }
        }
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_year > self.end_year {
            bail!(
                "start_year {} is after end_year {}",
                self.start_year,
                self.end_year
            );
        }
        Ok(())
    }

    pub fn years(&self) -> RangeInclusive<u16> {
        self.start_year..=self.end_year
    }
}

/// Parse a `YEAR=PATH` command-line pair.
pub fn parse_table_arg(arg: &str) -> Result<(u16, PathBuf)> {
    let Some((year, path)) = arg.split_once('=') else {
        bail!("expected YEAR=PATH, got `{}`", arg);
    };
    let year: u16 = year
        .trim()
        .parse()
        .with_context(|| format!("invalid year in `{}`", arg))?;
    if path.trim().is_empty() {
        bail!("empty path in `{}`", arg);
    }
    Ok((year, PathBuf::from(path.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_full_config() -> Result<()> {
        let cfg = RunConfig::from_yaml(
            r#"
start_year: 2015
end_year: 2017
skip_rows: 4
output_dir: out
tables:
  2015: /data/t8_2015.csv
schemas:
  2024:
    aggregate: Violent crime
    components: [Murder, Rape]
"#,
        )?;
        assert_eq!(cfg.years(), 2015..=2017);
        assert_eq!(cfg.skip_rows, 4);
        assert_eq!(cfg.tables[&2015], PathBuf::from("/data/t8_2015.csv"));
        assert_eq!(cfg.schemas[&2024].components, vec!["Murder", "Rape"]);
        cfg.validate()
    }

    #[test]
    fn missing_fields_take_defaults() -> Result<()> {
        let cfg = RunConfig::from_yaml("end_year: 2020\n")?;
        assert_eq!(cfg.start_year, 2012);
        assert_eq!(cfg.skip_rows, 3);
        assert!(cfg.tables.is_empty());
        Ok(())
    }

    #[test]
    fn rejects_inverted_range() {
        let cfg = RunConfig {
            start_year: 2020,
            end_year: 2019,
            ..RunConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn relative_tables_resolve_against_config_dir() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "tables:\n  2012: t8_2012.csv\n  2013: /abs/t8.csv")?;
        let cfg = RunConfig::load(tmp.path())?;
        let dir = tmp.path().parent().unwrap();
        assert_eq!(cfg.tables[&2012], dir.join("t8_2012.csv"));
        assert_eq!(cfg.tables[&2013], PathBuf::from("/abs/t8.csv"));
        Ok(())
    }

    #[test]
    fn table_args() -> Result<()> {
        assert_eq!(parse_table_arg("2019=a/b.csv")?, (2019, PathBuf::from("a/b.csv")));
        assert!(parse_table_arg("2019").is_err());
        assert!(parse_table_arg("abc=x.csv").is_err());
        assert!(parse_table_arg("2019=").is_err());
        Ok(())
    }
}
