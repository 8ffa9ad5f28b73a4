//! Export functionality for retainer reports
//!
//! Provides simple, testable export with proper error handling.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::allocation::hours_to_days;
use studioboard_types::RetainerReport;

fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;

    Ok(BufWriter::new(file))
}

/// Export the per-day split to CSV
///
/// CSV columns: Date, Monthly Hours, Rollover Hours, Unaccounted Hours, Total Hours, Days
/// Rows sorted chronologically.
///
/// # Errors
/// Returns error if file creation or write operations fail
///
/// # Examples
///
/// ```no_run
/// use studioboard_core::export::export_daily_splits_to_csv;
/// # fn run(report: &studioboard_types::RetainerReport) -> anyhow::Result<()> {
/// export_daily_splits_to_csv(report, std::path::Path::new("acme-daily.csv"))?;
/// # Ok(())
/// # }
/// ```
pub fn export_daily_splits_to_csv(report: &RetainerReport, path: &Path) -> Result<()> {
    let mut writer = create_writer(path)?;

    writeln!(
        writer,
        "Date,Monthly Hours,Rollover Hours,Unaccounted Hours,Total Hours,Days"
    )
    .context("Failed to write CSV header")?;

    for (date, split) in &report.daily {
        writeln!(
            writer,
            "{},{:.2},{:.2},{:.2},{:.2},{:.2}",
            date.format("%Y-%m-%d"),
            split.monthly_hours_used,
            split.rollover_hours_used,
            split.unaccounted_hours(),
            split.total_hours,
            hours_to_days(split.total_hours, report.hours_per_day)
        )
        .with_context(|| format!("Failed to write row for {}", date))?;
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

/// Export the full report to pretty JSON
///
/// Daily splits are keyed by ISO date with camelCase fields.
pub fn export_report_to_json(report: &RetainerReport, path: &Path) -> Result<()> {
    let mut writer = create_writer(path)?;

    serde_json::to_writer_pretty(&mut writer, report).context("Failed to serialize report")?;
    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush JSON writer")?;

    Ok(())
}

/// Export month summaries as a Markdown table
pub fn export_months_to_markdown(report: &RetainerReport, path: &Path) -> Result<()> {
    let mut writer = create_writer(path)?;

    writeln!(writer, "# {} retainer report", report.client_name)?;
    writeln!(writer)?;
    writeln!(
        writer,
        "Period: {} to {}",
        report.period.start.format("%Y-%m-%d"),
        report.period.end.format("%Y-%m-%d")
    )?;
    writeln!(
        writer,
        "Rollover: {:.2}h used of {:.2}h ({:.2}h remaining)",
        report.rollover_used, report.rollover_budget, report.rollover_remaining
    )?;
    if let Some(agreed) = &report.agreed_days {
        writeln!(writer, "Agreed: {}", agreed)?;
    }
    writeln!(writer)?;

    writeln!(
        writer,
        "| Month | Hours | Days | Rollover (h) | Rollover (days) | Remaining | Status |"
    )?;
    writeln!(writer, "|---|---:|---:|---:|---:|---:|---|")?;

    for month in &report.months {
        let remaining = month
            .capacity_remaining
            .map(|r| format!("{:.2}", r))
            .unwrap_or_else(|| "-".to_string());

        writeln!(
            writer,
            "| {} | {:.2} | {:.2} | {:.2} | {:.2} | {} | {} |",
            month.month,
            month.total_hours,
            month.total_days,
            month.rollover_hours,
            month.rollover_days,
            remaining,
            month.status.label()
        )
        .with_context(|| format!("Failed to write row for {}", month.month))?;
    }

    writer.flush().context("Failed to flush Markdown writer")?;

    Ok(())
}
