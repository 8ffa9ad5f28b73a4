//! CLI helpers: date arguments, period resolution and table formatters
//!
//! Kept free of I/O so the formatting can be tested without a data directory.

use chrono::NaiveDate;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use std::sync::Arc;
use studioboard_core::allocation::hours_to_days;
use studioboard_core::{CapacityForecast, CoreError};
use studioboard_types::{CapacityStatus, Client, DateRange, MonthKey, RetainerReport};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug)]
pub enum CliError {
    InvalidDate { input: String },
    Core(CoreError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::InvalidDate { input } => {
                write!(f, "Invalid date '{}' (expected YYYY-MM-DD or YYYY-MM)", input)
            }
            CliError::Core(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<CoreError> for CliError {
    fn from(e: CoreError) -> Self {
        CliError::Core(e)
    }
}

// ============================================================================
// Date arguments
// ============================================================================

/// Which end of a month a `YYYY-MM` argument expands to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Parse `YYYY-MM-DD`, or `YYYY-MM` expanded to the first/last day of that month
pub fn parse_date_arg(input: &str, bound: Bound) -> Result<NaiveDate, CliError> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    let month = parse_month_arg(trimmed)?;
    Ok(match bound {
        Bound::Start => month.first_day(),
        Bound::End => month.last_day(),
    })
}

/// Parse a `YYYY-MM` month argument
pub fn parse_month_arg(input: &str) -> Result<MonthKey, CliError> {
    input.trim().parse().map_err(|_| CliError::InvalidDate {
        input: input.to_string(),
    })
}

/// Resolve `--from`/`--to` into a reporting period
///
/// Missing bounds fall back to `fallback`, which callers derive from the
/// client's logged history.
pub fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
    fallback: DateRange,
) -> Result<DateRange, CliError> {
    let start = match from {
        Some(s) => parse_date_arg(s, Bound::Start)?,
        None => fallback.start,
    };
    let end = match to {
        Some(s) => parse_date_arg(s, Bound::End)?,
        None => fallback.end,
    };

    let range = DateRange::new(start, end).ok_or(CoreError::InvalidDateRange { start, end })?;
    Ok(range)
}

/// Default reporting period for a client
///
/// Starts at the retainer start date (or the first logged month) and runs to
/// the end of the last logged month. Clients with no history get `today`'s month.
pub fn default_range(client: &Client, logged: Option<DateRange>, today: NaiveDate) -> DateRange {
    let Some(logged) = logged else {
        let start = client
            .retainer
            .start_date
            .unwrap_or_else(|| MonthKey::of(today).first_day());
        let end = MonthKey::of(today.max(start)).last_day();
        return DateRange { start, end };
    };

    let start = client
        .retainer
        .start_date
        .filter(|d| *d <= logged.start)
        .unwrap_or_else(|| MonthKey::of(logged.start).first_day());
    let end = MonthKey::of(logged.end).last_day();

    DateRange { start, end }
}

// ============================================================================
// Formatters
// ============================================================================

fn header(table: &mut Table, columns: &[&str], no_color: bool) {
    if no_color {
        table.set_header(columns.to_vec());
    } else {
        table.set_header(
            columns
                .iter()
                .map(|c| Cell::new(c).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format the client list as table (human) or JSON
pub fn format_client_table(clients: &[Arc<Client>], json: bool, no_color: bool) -> String {
    if json {
        let clients: Vec<&Client> = clients.iter().map(|c| c.as_ref()).collect();
        return serde_json::to_string_pretty(&clients).unwrap_or_else(|_| "[]".to_string());
    }

    if clients.is_empty() {
        return "No clients found.".to_string();
    }

    let mut table = new_table();
    header(
        &mut table,
        &["ID", "Name", "Monthly", "Rollover", "Hours/Day", "Agreed"],
        no_color,
    );

    for client in clients {
        let resolved = client.retainer.resolve();
        let monthly = resolved
            .monthly_hours
            .map(format_hours)
            .unwrap_or_else(|| "-".to_string());
        let agreed = client
            .retainer
            .agreed_days_label()
            .unwrap_or_else(|| "-".to_string());

        table.add_row(Row::from(vec![
            client.id.clone(),
            client.name.clone(),
            monthly,
            format_hours(resolved.rollover_budget),
            format_hours(resolved.hours_per_day),
            agreed,
        ]));
    }

    table.to_string()
}

/// Format the per-day split of a report
pub fn format_daily_table(report: &RetainerReport, json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
    }

    let mut lines = vec![report_heading(report)];

    if report.daily.is_empty() {
        lines.push("No time logged in this period.".to_string());
        return lines.join("\n");
    }

    let mut table = new_table();
    header(
        &mut table,
        &["Date", "Monthly", "Rollover", "Unaccounted", "Total", "Days"],
        no_color,
    );

    for (date, split) in &report.daily {
        let unaccounted = split.unaccounted_hours();
        let unaccounted_cell = if unaccounted > 0.0 && !no_color {
            Cell::new(format_hours(unaccounted)).fg(Color::Red)
        } else {
            Cell::new(format_hours(unaccounted))
        };

        table.add_row(Row::from(vec![
            Cell::new(date.format("%Y-%m-%d")),
            Cell::new(format_hours(split.monthly_hours_used)),
            Cell::new(format_hours(split.rollover_hours_used)),
            unaccounted_cell,
            Cell::new(format_hours(split.total_hours)),
            Cell::new(format!(
                "{:.2}",
                hours_to_days(split.total_hours, report.hours_per_day)
            )),
        ]));
    }

    lines.push(table.to_string());
    lines.push(rollover_line(report));
    lines.join("\n")
}

/// Format month summaries of a report
pub fn format_month_table(report: &RetainerReport, json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(&report.months).unwrap_or_else(|_| "[]".to_string());
    }

    let mut table = new_table();
    header(
        &mut table,
        &[
            "Month",
            "Hours",
            "Days",
            "Rollover (h)",
            "Rollover (d)",
            "Allowance",
            "Remaining",
            "Status",
        ],
        no_color,
    );

    for month in &report.months {
        let allowance = month
            .monthly_hours
            .map(format_hours)
            .unwrap_or_else(|| "-".to_string());
        let remaining = month
            .capacity_remaining
            .map(format_hours)
            .unwrap_or_else(|| "-".to_string());

        table.add_row(Row::from(vec![
            Cell::new(month.month),
            Cell::new(format_hours(month.total_hours)),
            Cell::new(format!("{:.2}", month.total_days)),
            Cell::new(format_hours(month.rollover_hours)),
            Cell::new(format!("{:.2}", month.rollover_days)),
            Cell::new(allowance),
            Cell::new(remaining),
            status_cell(month.status, no_color),
        ]));
    }

    [report_heading(report), table.to_string(), rollover_line(report)].join("\n")
}

/// Format a capacity forecast (human or JSON)
pub fn format_forecast(client: &Client, forecast: &CapacityForecast, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(forecast).unwrap_or_else(|_| "{}".to_string());
    }

    let mut lines = vec![format!(
        "{} - {} (as of {})",
        client.name,
        forecast.month,
        forecast.as_of.format("%Y-%m-%d")
    )];

    if let Some(reason) = &forecast.unavailable_reason {
        lines.push(format!("Forecast unavailable: {}", reason));
        return lines.join("\n");
    }

    lines.push(format!(
        "Working days:     {} elapsed, {} remaining",
        forecast.working_days_elapsed, forecast.working_days_remaining
    ));
    lines.push(format!(
        "Run rate:         {}/day",
        format_hours(forecast.daily_run_rate)
    ));
    lines.push(format!(
        "Projected:        {} ({:.0}% of allowance)",
        format_hours(forecast.projected_hours),
        forecast.projected_utilisation_pct
    ));
    lines.push(format!(
        "Remaining:        {} ({:.2} days)",
        format_hours(forecast.capacity_remaining_hours),
        forecast.capacity_remaining_days
    ));
    if let Some(needed) = forecast.hours_needed_per_day {
        lines.push(format!("Needed to fill:   {}/day", format_hours(needed)));
    }
    lines.push(format!("Likelihood:       {}", forecast.likelihood.label()));

    lines.join("\n")
}

// ============================================================================
// Utilities
// ============================================================================

fn report_heading(report: &RetainerReport) -> String {
    let mut heading = format!(
        "{} ({} to {})",
        report.client_name,
        report.period.start.format("%Y-%m-%d"),
        report.period.end.format("%Y-%m-%d")
    );
    if let Some(agreed) = &report.agreed_days {
        heading.push_str(&format!(" - agreed {}", agreed));
    }
    heading
}

fn rollover_line(report: &RetainerReport) -> String {
    format!(
        "Rollover: {} used of {} ({} remaining)",
        format_hours(report.rollover_used),
        format_hours(report.rollover_budget),
        format_hours(report.rollover_remaining)
    )
}

fn status_cell(status: CapacityStatus, no_color: bool) -> Cell {
    let cell = Cell::new(status.label());
    if no_color {
        return cell;
    }
    match status {
        CapacityStatus::Over => cell.fg(Color::Red),
        CapacityStatus::AtCapacity => cell.fg(Color::Yellow),
        CapacityStatus::Under => cell.fg(Color::Green),
        CapacityStatus::NoAllowance => cell,
    }
}

fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{:.0}h", hours)
    } else {
        format!("{:.2}h", hours)
    }
}

// ============================================================================
// Tests
// ============================================================================
