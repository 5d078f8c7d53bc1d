use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use time::OffsetDateTime;
use unicode_width::UnicodeWidthStr;

use crate::config::AppConfig;
use crate::debounce::DebouncedFilter;
use crate::expiry::{days_until, parse_target, Clock, SystemClock};
use crate::filter::{Row, Table};
use crate::geo::{distance_km, Coordinates};
use crate::listing::{build_views, refresh_all, stats, to_table, Donation, StatusFilter};
use crate::urgency::classify;

#[derive(Args, Debug, Clone)]
pub struct ExpiryArgs {
    /// Dates to check (YYYY-MM-DD, RFC 3339 or "October 19, 2026")
    #[arg(required = true)]
    pub dates: Vec<String>,
    /// Pretend today is this date
    #[arg(long)]
    pub today: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Case-insensitive text to look for (not trimmed)
    pub query: String,
    /// Tab-separated file; the first line is the header
    #[arg(long)]
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct DistanceArgs {
    #[arg(allow_negative_numbers = true)]
    pub from_lat: f64,
    #[arg(allow_negative_numbers = true)]
    pub from_lng: f64,
    #[arg(allow_negative_numbers = true)]
    pub to_lat: f64,
    #[arg(allow_negative_numbers = true)]
    pub to_lng: f64,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// JSON array of donations
    #[arg(long)]
    pub file: PathBuf,
    /// Only show rows containing this text
    #[arg(long)]
    pub query: Option<String>,
    /// Sort by distance from LAT LNG (defaults to the configured home)
    #[arg(long, num_args = 2, value_names = ["LAT", "LNG"], allow_negative_numbers = true)]
    pub near: Option<Vec<f64>>,
    /// Which donations to show: available, claimed, completed, expired or all
    #[arg(long, default_value_t = StatusFilter::Available)]
    pub status: StatusFilter,
    /// Pretend today is this date
    #[arg(long)]
    pub today: Option<String>,
}

pub fn expiry(_config: &AppConfig, args: ExpiryArgs) -> Result<()> {
    let now = resolve_now(args.today.as_deref())?;
    print!("{}", run_expiry(&args.dates, now)?);
    Ok(())
}

pub fn filter(config: &AppConfig, args: FilterArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.file)
        .with_context(|| format!("reading table {}", args.file.display()))?;
    let mut table = parse_tsv(&raw);
    // A single query is one keystroke burst; flush it straight away.
    let mut filter = DebouncedFilter::from_config(&config.filter);
    filter.on_input(args.query, Instant::now());
    filter.flush(Some(&mut table));
    print!("{}", render_table(&table));
    Ok(())
}

pub fn distance(args: DistanceArgs) -> Result<()> {
    let from = Coordinates::new(args.from_lat, args.from_lng).context("origin")?;
    let to = Coordinates::new(args.to_lat, args.to_lng).context("destination")?;
    println!("{:.2} km", distance_km(from, to));
    Ok(())
}

pub fn list(config: &AppConfig, args: ListArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.file)
        .with_context(|| format!("reading donations {}", args.file.display()))?;
    let mut donations: Vec<Donation> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing donations {}", args.file.display()))?;
    let now = resolve_now(args.today.as_deref())?;
    let origin = match args.near.as_deref() {
        Some([lat, lng]) => Some(Coordinates::new(*lat, *lng).context("--near")?),
        _ => config.location.home,
    };
    let query = args.query.as_deref();
    print!(
        "{}",
        run_list(&mut donations, now, origin, args.status, query, config)
    );
    Ok(())
}

fn run_expiry(dates: &[String], now: OffsetDateTime) -> Result<String> {
    let mut out = String::new();
    for input in dates {
        let target = parse_target(input, now)?;
        let days = days_until(target, now);
        let badge = classify(days);
        let label = if badge.is_visible() {
            badge.label.as_str()
        } else {
            "-"
        };
        let _ = writeln!(&mut out, "{input}\t{days}\t{label}\t{}", badge.tier);
    }
    Ok(out)
}

/// The board table followed by a line of per-status counts. Counts cover
/// every donation, not only the rows shown.
fn run_list(
    donations: &mut [Donation],
    now: OffsetDateTime,
    origin: Option<Coordinates>,
    status: StatusFilter,
    query: Option<&str>,
    config: &AppConfig,
) -> String {
    let expired = refresh_all(donations, now);
    tracing::debug!(expired, %status, "donation statuses refreshed");
    let views = build_views(donations, now, origin, status);
    let mut table = to_table(&views, config.display.date_style);
    if let Some(query) = query {
        let mut filter = DebouncedFilter::from_config(&config.filter);
        filter.on_input(query, Instant::now());
        filter.flush(Some(&mut table));
    }
    let mut out = render_table(&table);
    let _ = writeln!(&mut out, "{}", stats(donations));
    out
}

fn resolve_now(today: Option<&str>) -> Result<OffsetDateTime> {
    let now = SystemClock.now();
    let Some(raw) = today else {
        return Ok(now);
    };
    let date = parse_target(raw, now).context("--today")?;
    Ok(date.midnight().assume_offset(now.offset()))
}

fn parse_tsv(raw: &str) -> Table {
    let mut lines = raw.lines().filter(|line| !line.trim().is_empty());
    let header = lines
        .next()
        .map(|line| Row::new(line.split('\t')))
        .unwrap_or_else(|| Row::new(Vec::<String>::new()));
    let mut table = Table::new(header);
    for line in lines {
        table.push(Row::new(line.split('\t')));
    }
    table
}

/// Header, a rule, then the visible rows, columns padded by display width.
fn render_table(table: &Table) -> String {
    let Some(header) = table.header() else {
        return String::new();
    };
    let shown: Vec<&Row> = std::iter::once(header).chain(table.visible_rows()).collect();
    let columns = shown.iter().map(|row| row.cells.len()).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in &shown {
        for (i, cell) in row.cells.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let mut out = String::new();
    for (index, row) in shown.iter().enumerate() {
        let mut line = String::new();
        for (i, cell) in row.cells.iter().enumerate() {
            if i > 0 {
                line.push_str("  ");
            }
            line.push_str(cell);
            line.extend(std::iter::repeat(' ').take(widths[i] - cell.width()));
        }
        let _ = writeln!(&mut out, "{}", line.trim_end());
        if index == 0 {
            let rule: usize = widths.iter().sum::<usize>() + 2 * columns.saturating_sub(1);
            let _ = writeln!(&mut out, "{}", "-".repeat(rule));
        }
    }
    if shown.len() == 1 {
        out.push_str("No matches found.\n");
    }
    out
}
