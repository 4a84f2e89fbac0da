// src/audit/export.rs

use std::{fs::File, io::Write, path::Path, sync::Arc};

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, StringArray, TimestampMicrosecondArray, UInt16Array},
    datatypes::{DataType, Field, Schema, TimeUnit},
    record_batch::RecordBatch,
};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use serde::Serialize;
use tracing::info;

use super::{AuditLog, DropRecord};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One line of the drop log as written to CSV.
#[derive(Debug, Serialize)]
struct DropRow<'a> {
    #[serde(rename = "Year")]
    year: u16,
    #[serde(rename = "State")]
    state: &'a str,
    #[serde(rename = "City")]
    city: &'a str,
    #[serde(rename = "Reason")]
    reason: &'a str,
    #[serde(rename = "Original_Value")]
    original_value: &'a str,
    #[serde(rename = "Processing_Step")]
    processing_step: &'a str,
    #[serde(rename = "Timestamp")]
    timestamp: String,
}

impl<'a> From<&'a DropRecord> for DropRow<'a> {
    fn from(r: &'a DropRecord) -> Self {
        DropRow {
            year: r.year,
            state: r.state_or_unknown(),
            city: r.city_or_unknown(),
            reason: &r.reason,
            original_value: r.original_value.as_deref().unwrap_or(""),
            processing_step: r.stage.as_str(),
            timestamp: r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

impl AuditLog {
    /// Write one CSV row per drop record.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        if self.drops.is_empty() {
            wtr.write_record([
                "Year",
                "State",
                "City",
                "Reason",
                "Original_Value",
                "Processing_Step",
                "Timestamp",
            ])?;
        }
        for record in &self.drops {
            wtr.serialize(DropRow::from(record))
                .context("writing drop record")?;
        }
        wtr.flush().context("flushing drop log")?;
        Ok(())
    }

    pub fn save_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating drop log {:?}", path))?;
        self.export_csv(file)?;
        info!(path = %path.display(), records = self.drops.len(), "drop log saved");
        Ok(())
    }

    /// Write the drop records as a single Parquet file.
    pub fn export_parquet(&self, path: &Path) -> Result<()> {
        let schema = Arc::new(drop_schema());
        let batch = RecordBatch::try_new(schema.clone(), drop_arrays(&self.drops))
            .context("building drop log record batch")?;

        let file =
            File::create(path).with_context(|| format!("creating drop log file {:?}", path))?;
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, schema, Some(props))
            .context("creating Arrow writer for drop log")?;
        writer.write(&batch).context("writing drop log batch")?;
        writer.close().context("closing drop log writer")?;
        info!(path = %path.display(), records = self.drops.len(), "drop log parquet saved");
        Ok(())
    }
}

fn drop_schema() -> Schema {
    Schema::new(vec![
        Field::new("year", DataType::UInt16, false),
        Field::new("state", DataType::Utf8, false),
        Field::new("city", DataType::Utf8, false),
        Field::new("reason", DataType::Utf8, false),
        Field::new("original_value", DataType::Utf8, true),
        Field::new("processing_step", DataType::Utf8, false),
        Field::new(
            "timestamp",
            DataType::Timestamp(TimeUnit::Microsecond, None),
            false,
        ),
    ])
}

fn drop_arrays(drops: &[DropRecord]) -> Vec<ArrayRef> {
    vec![
        Arc::new(UInt16Array::from_iter_values(drops.iter().map(|d| d.year))),
        Arc::new(StringArray::from_iter_values(
            drops.iter().map(|d| d.state_or_unknown()),
        )),
        Arc::new(StringArray::from_iter_values(
            drops.iter().map(|d| d.city_or_unknown()),
        )),
        Arc::new(StringArray::from_iter_values(
            drops.iter().map(|d| d.reason.as_str()),
        )),
        Arc::new(StringArray::from(
            drops
                .iter()
                .map(|d| d.original_value.as_deref())
                .collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from_iter_values(
            drops.iter().map(|d| d.stage.as_str()),
        )),
        Arc::new(TimestampMicrosecondArray::from_iter_values(
            drops.iter().map(|d| d.timestamp.timestamp_micros()),
        )),
    ]
}
