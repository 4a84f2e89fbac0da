use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use crimeseries::{
    audit::AuditLog,
    config::{parse_table_arg, RunConfig},
    process::{self, save_city_records, CsvTableSource},
    schema::SchemaRegistry,
};
use std::{fs, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Build one violent-crime time series from yearly city tables.
#[derive(Parser, Debug)]
struct Args {
    /// YAML run configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// First year to process (inclusive)
    #[arg(long)]
    start_year: Option<u16>,

    /// Last year to process (inclusive)
    #[arg(long)]
    end_year: Option<u16>,

    /// Where the series, drop log and report are written
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Table for one year as YEAR=PATH; repeatable
    #[arg(long = "table", value_parser = parse_table_arg)]
    tables: Vec<(u16, PathBuf)>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) resolve configuration ────────────────────────────────────
    let args = Args::parse();
    let mut cfg = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(y) = args.start_year {
        cfg.start_year = y;
    }
    if let Some(y) = args.end_year {
        cfg.end_year = y;
    }
    if let Some(dir) = args.output_dir {
        cfg.output_dir = dir;
    }
    cfg.tables.extend(args.tables);
    cfg.validate()?;

    fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating output directory {:?}", cfg.output_dir))?;

    let registry = SchemaRegistry::with_overrides(&cfg.schemas);
    info!(
        start = cfg.start_year,
        end = cfg.end_year,
        tables = cfg.tables.len(),
        schemas = registry.len(),
        "configuration"
    );

    // ─── 3) run the pipeline ─────────────────────────────────────────
    let mut audit = AuditLog::new();
    let mut source = CsvTableSource::new(cfg.tables.clone(), cfg.skip_rows);
    let outcome = process::run(cfg.years(), &registry, &mut source, &mut audit);

    for (year, status) in &outcome.years {
        info!(year, ?status, "year status");
    }

    // ─── 4) write outputs ────────────────────────────────────────────
    if outcome.produced_data() {
        let series_path = cfg.output_dir.join(format!(
            "consolidated_violent_crime_data_{}-{}.csv",
            cfg.start_year, cfg.end_year
        ));
        save_city_records(&outcome.records, &series_path)?;
    } else {
        warn!("no data was processed; writing logs only");
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    if audit.drops().is_empty() {
        info!("no cities were dropped or flagged");
    } else {
        audit.save_csv(
            &cfg.output_dir
                .join(format!("crime_data_processing_log_{}.csv", ts)),
        )?;
        audit.export_parquet(
            &cfg.output_dir
                .join(format!("crime_data_processing_log_{}.parquet", ts)),
        )?;
    }

    let report_path = cfg
        .output_dir
        .join(format!("crime_data_processing_summary_{}.txt", ts));
    fs::write(&report_path, audit.render_report()?)
        .with_context(|| format!("writing report {:?}", report_path))?;

    let summary = audit.summary();
    let summary_path = cfg
        .output_dir
        .join(format!("crime_data_processing_summary_{}.json", ts));
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)
        .with_context(|| format!("writing summary {:?}", summary_path))?;

    info!(
        records = outcome.records.len(),
        dropped = summary.total_dropped,
        flagged = summary.total_flagged,
        report = %report_path.display(),
        "all done"
    );
    Ok(())
}
