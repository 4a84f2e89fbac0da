use std::{fs::File, io::Write, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize, Serializer};
use tracing::info;

use crate::process::{row::WorkingRow, utils::clean_city};

/// One city's violent crime count for one year. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Violent Crime", serialize_with = "serialize_count")]
    pub violent_crime: f64,
    #[serde(rename = "Year")]
    pub year: u16,
}

impl CityRecord {
    /// Project a row that survived the filter chain. `None` if it somehow
    /// lacks a state, city or value.
    pub fn from_row(year: u16, row: &WorkingRow) -> Option<Self> {
        Some(Self {
            state: row.state.clone()?,
            city: clean_city(row.city.as_deref()?),
            violent_crime: row.aggregate?,
            year,
        })
    }
}

/// Whole counts are written without a fractional part.
fn serialize_count<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        s.serialize_i64(*v as i64)
    } else {
        s.serialize_f64(*v)
    }
}

/// Write records as `State,City,Violent Crime,Year`.
pub fn write_city_records<W: Write>(records: &[CityRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if records.is_empty() {
        wtr.write_record(["State", "City", "Violent Crime", "Year"])?;
    }
    for r in records {
        wtr.serialize(r).context("writing city record")?;
    }
    wtr.flush().context("flushing city records")?;
    Ok(())
}

pub fn save_city_records(records: &[CityRecord], path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    write_city_records(records, file)?;
    info!(path = %path.display(), records = records.len(), "city records saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::raw_table::Cell;

    #[test]
    fn projects_clean_city() {
        let row = WorkingRow {
            line: 3,
            state: Some("Texas".into()),
            city: Some("Aransas Pass7".into()),
            raw_aggregate: Cell::Number(41.0),
            aggregate: Some(41.0),
            components: vec![],
        };
        let rec = CityRecord::from_row(2015, &row).unwrap();
        assert_eq!(rec.city, "Aransas Pass");
        assert_eq!(rec.violent_crime, 41.0);

        let mut no_city = row;
        no_city.city = None;
        assert!(CityRecord::from_row(2015, &no_city).is_none());
    }

    #[test]
    fn csv_columns_in_output_order() -> Result<()> {
        let records = vec![CityRecord {
            state: "Texas".into(),
            city: "Austin".into(),
            violent_crime: 30.0,
            year: 2021,
        }];
        let mut buf = Vec::new();
        write_city_records(&records, &mut buf)?;
        assert_eq!(
            String::from_utf8(buf)?,
            "State,City,Violent Crime,Year\nTexas,Austin,30,2021\n"
        );
        Ok(())
    }
}
