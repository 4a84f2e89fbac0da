use anyhow::{anyhow, Result};
use clap::Parser;
use crimeseries::{
    process::load_csv_table,
    schema::{resolve, SchemaRegistry},
};
use std::{io::Write, path::PathBuf};

/// Show how one table's headers map onto a year's schema.
#[derive(Parser, Debug)]
struct Args {
    /// CSV export of the table
    table: PathBuf,

    /// Year whose schema to resolve against
    #[arg(long)]
    year: u16,

    /// Title rows above the header row
    #[arg(long, default_value_t = 3)]
    skip_rows: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let registry = SchemaRegistry::builtin();
    let schema = registry
        .lookup(args.year)
        .ok_or_else(|| anyhow!("no schema defined for {}", args.year))?;

    // 1) load and resolve
    let table = load_csv_table(&args.table, args.skip_rows)?;
    let map = resolve(&table.headers, schema)
        .ok_or_else(|| anyhow!("{} has fewer than two columns", args.table.display()))?;

    // 2) emit the map as YAML
    let yaml = serde_yaml::to_string(&map)?;
    let mut out = std::io::stdout().lock();
    out.write_all(yaml.as_bytes())?;

    if map.aggregate_col.is_none() {
        eprintln!("→ aggregate column `{}` not found", schema.aggregate_name);
    }
    if !map.missing_components.is_empty() {
        eprintln!(
            "→ {} of {} components unmatched",
            map.missing_components.len(),
            schema.component_names.len()
        );
    }
    Ok(())
}
