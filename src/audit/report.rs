use std::fmt::{self, Write as _};

use chrono::Local;

use super::{export::TIMESTAMP_FORMAT, AuditLog};

impl AuditLog {
    /// Plain-text retention report: per-year stage counts, then the
    /// dropped-record breakdown.
    pub fn render_report(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        writeln!(out, "CRIME DATA PROCESSING SUMMARY REPORT")?;
        writeln!(out, "{}", "=".repeat(50))?;
        writeln!(out, "Generated: {}\n", Local::now().format(TIMESTAMP_FORMAT))?;

        if self.stages.is_empty() {
            writeln!(out, "No processing statistics recorded.")?;
        } else {
            writeln!(out, "PROCESSING STATISTICS BY YEAR:")?;
            writeln!(out, "{}", "-".repeat(30))?;
            for year in self.years() {
                writeln!(out, "\nYear {}:", year)?;
                let stats = self.stage_stats(year);
                for s in stats {
                    write!(
                        out,
                        "  {}: {} → {} ({:.1}% retained)",
                        s.stage,
                        s.before,
                        s.after,
                        s.retention_rate() * 100.0
                    )?;
                    if s.touched > 0 {
                        write!(out, " [{} touched]", s.touched)?;
                    }
                    out.push('\n');
                }
                if let (Some(first), Some(last)) = (stats.first(), stats.last()) {
                    if first.before > 0 {
                        writeln!(
                            out,
                            "  Overall: {} → {} ({:.1}% overall retention)",
                            first.before,
                            last.after,
                            last.after as f64 / first.before as f64 * 100.0
                        )?;
                    }
                }
            }
        }

        let summary = self.summary();
        if !summary.is_empty() {
            writeln!(out, "\nDROPPED CITIES SUMMARY:")?;
            writeln!(out, "{}", "-".repeat(30))?;
            writeln!(out, "Total records: {}", summary.total_records)?;
            writeln!(out, "Total dropped: {}", summary.total_dropped)?;
            writeln!(out, "Total flagged (kept): {}\n", summary.total_flagged)?;

            writeln!(out, "By Reason:")?;
            for (reason, count) in &summary.by_reason {
                writeln!(out, "  {}: {}", reason, count)?;
            }
            writeln!(out, "\nBy Year:")?;
            for (year, count) in &summary.by_year {
                writeln!(out, "  {}: {}", year, count)?;
            }
            writeln!(out, "\nStates with most records:")?;
            for (state, count) in &summary.top_states {
                writeln!(out, "  {}: {}", state, count)?;
            }
        }

        Ok(out)
    }
}
