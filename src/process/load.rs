// src/process/load.rs

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use tracing::{debug, info, warn};

use crate::process::raw_table::{Cell, RawTable};

/// Supplies the already-chosen table for a year.
pub trait TableSource {
    /// `Ok(None)` when there is no table for `year`; `Err` when there is one
    /// but it cannot be read.
    fn load(&mut self, year: u16) -> Result<Option<RawTable>>;
}

/// Tables handed over in memory, e.g. by a caller that parsed them itself.
impl TableSource for BTreeMap<u16, RawTable> {
    fn load(&mut self, year: u16) -> Result<Option<RawTable>> {
        Ok(self.get(&year).cloned())
    }
}

/// Reads the CSV export configured for each year.
#[derive(Debug, Clone)]
pub struct CsvTableSource {
    tables: BTreeMap<u16, PathBuf>,
    skip_rows: usize,
}

impl CsvTableSource {
    pub fn new(tables: BTreeMap<u16, PathBuf>, skip_rows: usize) -> Self {
        Self { tables, skip_rows }
    }
}

impl TableSource for CsvTableSource {
    fn load(&mut self, year: u16) -> Result<Option<RawTable>> {
        let Some(path) = self.tables.get(&year) else {
            warn!(year, "no table configured");
            return Ok(None);
        };
        if !path.exists() {
            warn!(year, path = %path.display(), "table file not found");
            return Ok(None);
        }
        load_csv_table(path, self.skip_rows).map(Some)
    }
}

/// Open `path` and parse it with [`parse_csv_table`].
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_csv_table<P: AsRef<Path>>(path: P, skip_rows: usize) -> Result<RawTable> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open table: {:?}", path.as_ref()))?;
    let table = parse_csv_table(BufReader::new(file), skip_rows)
        .with_context(|| format!("Failed to parse table: {:?}", path.as_ref()))?;
    info!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        "loaded table"
    );
    Ok(table)
}

/// Skip `skip_rows` title records, take the next record as headers and every
/// record after it as data.
///
/// Header text has embedded newlines flattened and is trimmed. Records of any
/// length are accepted; fully blank records are dropped.
pub fn parse_csv_table<R: Read>(reader: R, skip_rows: usize) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        if idx < skip_rows {
            continue;
        }
        match headers {
            None => {
                headers = Some(record.iter().map(flatten_header).collect());
            }
            Some(_) => {
                let row: Vec<Cell> = record.iter().map(Cell::from_raw).collect();
                if row.iter().all(Cell::is_blank) {
                    continue;
                }
                rows.push(row);
            }
        }
    }

    let headers = headers.unwrap_or_default();
    debug!(headers = ?headers, rows = rows.len(), "parsed table");
    Ok(RawTable::new(headers, rows))
}

fn flatten_header(raw: &str) -> String {
    raw.replace(['\r', '\n'], " ").trim().to_string()
}
