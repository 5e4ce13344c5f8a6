//! CLI entry point for the lead dashboard.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, NaiveDate};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use lead_insights::{
    CsvSource, Dashboard, DashboardSnapshot, DateRange, FileStore, FilterState, LeadCache,
    SheetSource, SyncOutcome,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[cfg(feature = "sheets")]
use lead_insights::{GoogleSheetsSource, SheetsConfig};

/// CLI-compatible date range selector
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliDateRange {
    /// No time filtering
    All,
    /// Since midnight today
    Today,
    /// Since midnight three days ago
    Last3days,
    /// Since midnight seven days ago
    Last7days,
    /// Since the first of the month
    Mtd,
    /// Since midnight 28 days ago
    Last4weeks,
    /// Rolling 7 days
    Week,
    /// Rolling 1 month
    Month,
    /// Rolling 3 months
    Quarter,
    /// Between --start and --end
    Custom,
}

impl CliDateRange {
    fn into_range(self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> DateRange {
        match self {
            CliDateRange::All => DateRange::All,
            CliDateRange::Today => DateRange::Today,
            CliDateRange::Last3days => DateRange::Last3Days,
            CliDateRange::Last7days => DateRange::Last7Days,
            CliDateRange::Mtd => DateRange::Mtd,
            CliDateRange::Last4weeks => DateRange::Last4Weeks,
            CliDateRange::Week => DateRange::Week,
            CliDateRange::Month => DateRange::Month,
            CliDateRange::Quarter => DateRange::Quarter,
            CliDateRange::Custom => DateRange::custom(start, end),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Lead reporting dashboard",
    long_about = "Fetches leads from a Google Sheet (or a CSV export), filters them and \
                  prints the dashboard views.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  GOOGLE_SHEETS_API_KEY    API key for the Sheets values API\n  \
                  GOOGLE_SPREADSHEET_ID    Spreadsheet id from the sheet URL\n  \
                  GOOGLE_SHEET_NAME        Sheet (tab) name, default Sheet1\n\n\
                  EXAMPLES:\n  \
                  # Everything in the sheet\n  \
                  lead-insights\n\n  \
                  # Last 7 days, one tag, from a CSV export\n  \
                  lead-insights --csv leads.csv --range last7days --tag Web\n\n  \
                  # Custom range as JSON\n  \
                  lead-insights --start 2024-05-01 --end 2024-05-31 --json"
)]
struct Args {
    /// Read leads from a CSV export instead of Google Sheets
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Date range selector
    #[arg(long, value_enum, default_value = "all")]
    range: CliDateRange,

    /// Custom range start (YYYY-MM-DD); implies --range custom
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,

    /// Custom range end (YYYY-MM-DD); implies --range custom
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,

    /// Tag to keep ("all" keeps every tag)
    #[arg(long, default_value = "all")]
    tag: String,

    /// Directory of the lead cache
    #[arg(long, default_value = ".lead-cache")]
    cache_dir: PathBuf,

    /// Do not read or write the lead cache
    #[arg(long)]
    no_cache: bool,

    /// Empty the lead cache before syncing
    #[arg(long)]
    clear_cache: bool,

    /// Output JSON to stdout instead of the human-readable report
    ///
    /// Disables all logs; only the final JSON is written.
    #[arg(long)]
    json: bool,

    /// Also write the JSON report to this file
    #[arg(long)]
    emit_report: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only show warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{}': {}", value, e))
}

/// Everything the CLI prints with `--json` or writes with `--emit-report`.
#[derive(Debug, Serialize)]
struct Report<'a> {
    source: &'a str,
    generated_at: DateTime<Local>,
    sync: &'a SyncOutcome,
    filters: &'a FilterState,
    snapshot: &'a DashboardSnapshot,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    let filters = build_filters(&args);
    let source = build_source(&args)?;

    let cache = if args.no_cache {
        None
    } else {
        Some(LeadCache::new(Arc::new(FileStore::new(&args.cache_dir))))
    };
    if args.clear_cache {
        match &cache {
            Some(cache) => {
                cache.clear();
                info!("Cleared lead cache in {}", args.cache_dir.display());
            }
            None => warn!("--clear-cache has no effect with --no-cache"),
        }
    }

    let dashboard = Dashboard::new(source, cache);
    dashboard.load_cached();

    let outcome = dashboard
        .sync()
        .map_err(|e| anyhow!("[{}] {}", e.error_code(), e))?;

    let now = Local::now();
    let snapshot = dashboard.snapshot(&filters, &now);
    let report = Report {
        source: dashboard.source_name(),
        generated_at: now,
        sync: &outcome,
        filters: &filters,
        snapshot: &snapshot,
    };

    if let Some(path) = &args.emit_report {
        write_report(&report, path)?;
        info!("Report written to {}", path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_human_readable_report(&report);
    }

    Ok(())
}

fn build_filters(args: &Args) -> FilterState {
    let range = if args.start.is_some() || args.end.is_some() {
        CliDateRange::Custom
    } else {
        args.range
    };

    let date_range = range.into_range(args.start, args.end);
    if date_range.is_incomplete_custom() {
        warn!("Custom range needs both --start and --end; showing all dates");
    }

    FilterState::new(date_range, args.tag.clone())
}

fn build_source(args: &Args) -> Result<Box<dyn SheetSource>> {
    if let Some(path) = &args.csv {
        if !path.exists() {
            return Err(anyhow!("Input file not found: {}", path.display()));
        }
        return Ok(Box::new(CsvSource::new(path)));
    }

    #[cfg(feature = "sheets")]
    {
        let source = GoogleSheetsSource::new(SheetsConfig::from_env())
            .map_err(|e| anyhow!("[{}] {}", e.error_code(), e))?;
        Ok(Box::new(source))
    }

    #[cfg(not(feature = "sheets"))]
    {
        Err(anyhow!(
            "Built without the 'sheets' feature; pass --csv <path> to read a CSV export"
        ))
    }
}

fn write_report(report: &Report<'_>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Print the dashboard views.
///
/// Uses `println!` on purpose: this is the command's output, not a log.
fn print_human_readable_report(report: &Report<'_>) {
    let snapshot = report.snapshot;

    println!("\n{}", "=".repeat(60));
    println!("LEAD DASHBOARD");
    println!("{}", "=".repeat(60));
    println!("  Source:     {}", report.source);
    println!("  Date range: {}", report.filters.date_range);
    println!("  Tag:        {}", report.filters.tag);
    match report.sync {
        SyncOutcome::Fresh { count } => println!("  Synced:     {} leads", count),
        SyncOutcome::Cached {
            count,
            timestamp,
            error,
        } => {
            println!(
                "  Synced:     {} cached leads from {} (refresh failed)",
                count,
                timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
            println!("  Error:      {}", error);
        }
    }
    println!();

    println!("METRICS");
    println!("{}", "-".repeat(40));
    println!("  Total leads:     {}", snapshot.metrics.total);
    println!("  In radius:       {}", snapshot.metrics.in_radius);
    println!("  Out of radius:   {}", snapshot.metrics.out_of_radius);
    println!();

    if snapshot.metrics.total == 0 {
        println!("No leads match the current filters.");
        println!("Available tags: {}", snapshot.tags.join(", "));
        return;
    }

    println!("LEADS PER TAG");
    println!("{}", "-".repeat(40));
    for entry in &snapshot.client_lead_counts {
        println!("  {:<24} {:>6}", truncate_str(&entry.client, 23), entry.count);
    }
    println!();

    println!("STATUS BY TAG");
    println!("{}", "-".repeat(40));
    println!("  {:<24} {:>8} {:>8}", "Tag", "Approved", "Discard");
    for entry in &snapshot.status_percentages {
        println!(
            "  {:<24} {:>8} {:>8}",
            truncate_str(&entry.client, 23),
            entry.approved,
            entry.discard
        );
    }
    println!();

    println!("TAG DISTRIBUTION");
    println!("{}", "-".repeat(40));
    for entry in &snapshot.tag_distribution {
        println!(
            "  {:<24} {:>6} {:>6.1}%",
            truncate_str(&entry.tag, 23),
            entry.count,
            entry.percentage
        );
    }
    println!();

    println!("STATUS DISTRIBUTION");
    println!("{}", "-".repeat(40));
    for entry in &snapshot.status_distribution {
        println!(
            "  {:<24} {:>6} {:>6.1}%",
            entry.status, entry.count, entry.percentage
        );
    }
    println!();

    println!("Available tags: {}", snapshot.tags.join(", "));
    println!("{}", "=".repeat(60));
}

/// Truncate a string to a maximum number of characters, adding "..." if truncated.
fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
