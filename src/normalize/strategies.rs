//! Timestamp resolution as an ordered strategy chain, followed by the ISO
//! fast path and row-level recovery.
//!
//! Each strategy either resolves the whole table or passes; the first one
//! that resolves wins. The fast path and the recovery pass only ever add
//! information on top of the chain's result.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use tracing::debug;

use super::datetime::{
    as_utc, column_order, full_serial_to_utc, is_bare_time, is_numeric_column, is_strict_iso,
    parse_datetime, parse_duration_text, parse_iso_exact, parse_time_of_day, resolve_column,
    resolved_count, DateOrder, TimestampSeries, MILLIS_PER_DAY,
};
use super::roles::{ColumnRole, RoleTable};
use super::text::normalize_text;
use crate::config::NormalizerConfig;
use crate::table::{Cell, RawTable};

pub enum StrategyOutcome {
    Resolved(TimestampSeries),
    Pass,
}

pub trait TimestampStrategy {
    fn name(&self) -> &'static str;
    fn resolve(&self, table: &RoleTable, config: &NormalizerConfig) -> StrategyOutcome;
}

/// A single column holding date and time together.
pub struct CombinedColumn;

impl TimestampStrategy for CombinedColumn {
    fn name(&self) -> &'static str {
        "combined_column"
    }

    fn resolve(&self, table: &RoleTable, config: &NormalizerConfig) -> StrategyOutcome {
        let cols = table.roles.columns_for(ColumnRole::Timestamp);
        if cols.is_empty() {
            return StrategyOutcome::Pass;
        }
        let cells = table.table.unified_column(&cols);
        let parsed = resolve_column(&cells, config);
        debug!(
            "Combined column {:?}: order {:?}, {} resolved",
            table.labels_for(ColumnRole::Timestamp),
            parsed.order,
            resolved_count(&parsed.series)
        );
        StrategyOutcome::Resolved(parsed.series)
    }
}

/// A "time" column with no date column. Some loggers label full date+time
/// values as "Time"; genuine time-of-day values have no anchor and stay
/// unresolved.
pub struct TimeWithoutDate;

impl TimestampStrategy for TimeWithoutDate {
    fn name(&self) -> &'static str {
        "time_without_date"
    }

    fn resolve(&self, table: &RoleTable, config: &NormalizerConfig) -> StrategyOutcome {
        let cols = table.roles.columns_for(ColumnRole::Time);
        if cols.is_empty() || table.roles.has(ColumnRole::Date) {
            return StrategyOutcome::Pass;
        }
        let cells = table.table.unified_column(&cols);
        let unresolved = || vec![None; cells.len()];

        if is_numeric_column(&cells) {
            let series: TimestampSeries = cells
                .iter()
                .map(|c| match c {
                    Cell::Number(f) => full_serial_to_utc(*f),
                    _ => None,
                })
                .collect();
            let ratio = resolved_count(&series) as f64 / cells.len().max(1) as f64;
            if ratio > config.full_serial_ratio {
                return StrategyOutcome::Resolved(series);
            }
            debug!(
                "Numeric time column resolves only {:.0}% as full serials; treating as time of day",
                ratio * 100.0
            );
            return StrategyOutcome::Resolved(unresolved());
        }

        let time_only = cells.iter().filter(|c| !c.is_empty()).all(|c| match c {
            Cell::Text(s) => is_bare_time(&normalize_text(s)),
            _ => false,
        });
        if time_only {
            debug!("Time column holds bare times without a date anchor");
            return StrategyOutcome::Resolved(unresolved());
        }

        let parsed = resolve_column(&cells, config);
        debug!(
            "Time column parsed as full datetimes: order {:?}, {} resolved",
            parsed.order,
            resolved_count(&parsed.series)
        );
        StrategyOutcome::Resolved(parsed.series)
    }
}

/// Separate date column, optionally completed by a time column.
pub struct DateWithOptionalTime;

impl TimestampStrategy for DateWithOptionalTime {
    fn name(&self) -> &'static str {
        "date_with_optional_time"
    }

    fn resolve(&self, table: &RoleTable, config: &NormalizerConfig) -> StrategyOutcome {
        let date_cols = table.roles.columns_for(ColumnRole::Date);
        if date_cols.is_empty() {
            return StrategyOutcome::Pass;
        }
        let date_cells = table.table.unified_column(&date_cols);
        let dates = resolve_column(&date_cells, config);

        let time_cols = table.roles.columns_for(ColumnRole::Time);
        if time_cols.is_empty() {
            return StrategyOutcome::Resolved(dates.series);
        }

        let time_cells = table.table.unified_column(&time_cols);
        let series = dates
            .series
            .iter()
            .zip(time_cells.iter())
            .map(|(date, time)| {
                let midnight = date.map(|d| as_utc(d.date_naive().and_time(NaiveTime::MIN)))?;
                // Unparsed time keeps the date at midnight
                let offset = time_offset(time).unwrap_or_else(Duration::zero);
                Some(midnight.checked_add_signed(offset).unwrap_or(midnight))
            })
            .collect();
        StrategyOutcome::Resolved(series)
    }
}

/// Nothing date-bearing: every row unresolved.
pub struct NoDateColumns;

impl TimestampStrategy for NoDateColumns {
    fn name(&self) -> &'static str {
        "no_date_columns"
    }

    fn resolve(&self, table: &RoleTable, _config: &NormalizerConfig) -> StrategyOutcome {
        StrategyOutcome::Resolved(vec![None; table.table.height()])
    }
}

/// Strategies in precedence order.
pub fn default_chain() -> Vec<Box<dyn TimestampStrategy>> {
    vec![
        Box::new(CombinedColumn),
        Box::new(TimeWithoutDate),
        Box::new(DateWithOptionalTime),
        Box::new(NoDateColumns),
    ]
}

/// Elapsed time since midnight carried by a time cell. Negative or
/// out-of-range numbers carry no time.
pub fn time_offset(cell: &Cell) -> Option<Duration> {
    match cell {
        Cell::Number(f) if f.is_finite() && *f >= 0.0 => {
            let millis = (f * MILLIS_PER_DAY).round();
            if millis >= i64::MAX as f64 {
                return None;
            }
            Duration::try_milliseconds(millis as i64)
        }
        Cell::DateTime(dt) => Some(dt.time().signed_duration_since(NaiveTime::MIN)),
        Cell::Text(s) => {
            let text = normalize_text(s).replace(',', ".");
            if text.is_empty() {
                return None;
            }
            parse_duration_text(&text).or_else(|| {
                parse_datetime(&format!("1970-01-01 {text}"), DateOrder::MonthFirst)
                    .map(|dt| dt.time().signed_duration_since(NaiveTime::MIN))
            })
        }
        _ => None,
    }
}

/// Parse one column with the strict ISO formats, falling back for the
/// remainder when fewer than half of the values resolve.
fn parse_iso_column(texts: &[String], non_empty: usize) -> TimestampSeries {
    let enough = (non_empty / 2).max(1);
    let mut series: TimestampSeries = texts
        .iter()
        .map(|t| if t.is_empty() { None } else { parse_iso_exact(t, false) })
        .collect();

    type Fallback = fn(&str) -> Option<DateTime<Utc>>;
    let fallbacks: [Fallback; 2] = [
        |t| parse_iso_exact(t, true),
        |t| parse_datetime(t, DateOrder::MonthFirst),
    ];
    for fallback in fallbacks {
        if resolved_count(&series) >= enough {
            break;
        }
        for (slot, text) in series.iter_mut().zip(texts) {
            if slot.is_none() && !text.is_empty() {
                *slot = fallback(text);
            }
        }
    }
    series
}

/// Columns with enough strict ISO timestamps are parsed with the exact
/// format; the best such column is returned when it beats `current`.
pub fn iso_fast_path(
    table: &RoleTable,
    current: &[Option<DateTime<Utc>>],
    config: &NormalizerConfig,
) -> Option<TimestampSeries> {
    let threshold = if table.roles.has_date_bearing() {
        config.iso_column_ratio
    } else {
        config.iso_table_ratio
    };

    let mut best: Option<TimestampSeries> = None;
    let mut best_count = resolved_count(current);

    for col in 0..table.table.width() {
        let texts: Vec<String> = table
            .table
            .column(col)
            .iter()
            .map(|c| normalize_text(&c.render()))
            .collect();
        let non_empty = texts.iter().filter(|t| !t.is_empty()).count();
        if non_empty == 0 {
            continue;
        }
        let matches = texts.iter().filter(|t| is_strict_iso(t)).count();
        if (matches as f64 / non_empty as f64) < threshold {
            continue;
        }

        let parsed = parse_iso_column(&texts, non_empty);
        let parsed_count = resolved_count(&parsed);
        debug!(
            "ISO fast path on column {} ({:?}): {}/{} strict matches, {} parsed",
            col, table.table.labels[col], matches, non_empty, parsed_count
        );
        if parsed_count > best_count {
            best_count = parsed_count;
            best = Some(parsed);
        }
    }
    best
}

fn nearby_date(
    anchors: &[Option<DateTime<Utc>>],
    row: usize,
    window: usize,
) -> Option<chrono::NaiveDate> {
    (1..=window).find_map(|offset| {
        let above = row
            .checked_sub(offset)
            .and_then(|i| anchors.get(i).copied().flatten());
        let below = anchors.get(row + offset).copied().flatten();
        above.or(below).map(|dt| dt.date_naive())
    })
}

/// Date order the chain fixed for each date-bearing column, by column index.
fn decided_orders(table: &RoleTable, config: &NormalizerConfig) -> Vec<Option<DateOrder>> {
    let mut orders = vec![None; table.table.width()];
    for role in [ColumnRole::Timestamp, ColumnRole::Date, ColumnRole::Time] {
        let cols = table.roles.columns_for(role);
        if cols.is_empty() {
            continue;
        }
        let order = column_order(&table.table.unified_column(&cols), config);
        for col in cols {
            if let Some(slot) = orders.get_mut(col) {
                *slot = order;
            }
        }
    }
    orders
}

/// Cells of a column with a decided order are only read with that order.
fn parse_in_column(
    text: &str,
    decided: Option<DateOrder>,
    fallback: [DateOrder; 2],
) -> Option<DateTime<Utc>> {
    match decided {
        Some(order) => parse_datetime(text, order),
        None => fallback.iter().find_map(|&order| parse_datetime(text, order)),
    }
}

fn recover_row(
    table: &RawTable,
    row: usize,
    anchors: &[Option<DateTime<Utc>>],
    orders: &[Option<DateOrder>],
    config: &NormalizerConfig,
) -> Option<DateTime<Utc>> {
    let texts: Vec<String> = table
        .rows
        .get(row)?
        .iter()
        .map(|c| normalize_text(&c.render()))
        .collect();
    let order_of = |col: usize| orders.get(col).copied().flatten();

    // Date and time split across neighbouring cells
    for (col, pair) in texts.windows(2).enumerate() {
        if pair[0].is_empty() || pair[1].is_empty() {
            continue;
        }
        let joined = format!("{} {}", pair[0], pair[1]);
        let parsed = parse_in_column(
            &joined,
            order_of(col),
            [DateOrder::DayFirst, DateOrder::MonthFirst],
        );
        if parsed.is_some() {
            return parsed;
        }
    }

    // Time of day anchored on the closest resolved row
    for text in &texts {
        if let Some(time) = parse_time_of_day(text) {
            if let Some(date) = nearby_date(anchors, row, config.nearby_date_window) {
                return Some(as_utc(date.and_time(time)));
            }
        }
    }

    texts
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.is_empty())
        .find_map(|(col, text)| {
            parse_in_column(
                text,
                order_of(col),
                [DateOrder::MonthFirst, DateOrder::DayFirst],
            )
        })
}

/// Fill still-unresolved rows from the raw cells. Anchor dates come from the
/// series as it was before recovery. Returns the number of rows recovered.
pub fn recover_rows(
    table: &RoleTable,
    series: &mut TimestampSeries,
    config: &NormalizerConfig,
) -> usize {
    let anchors = series.clone();
    let orders = decided_orders(table, config);
    let mut recovered = 0;
    for (row, slot) in series.iter_mut().enumerate() {
        if slot.is_some() {
            continue;
        }
        if let Some(ts) = recover_row(&table.table, row, &anchors, &orders, config) {
            *slot = Some(ts);
            recovered += 1;
        }
    }
    recovered
}

/// Outcome of the whole disambiguation pipeline for one table.
#[derive(Debug, Clone)]
pub struct Disambiguation {
    pub series: TimestampSeries,
    pub strategy: &'static str,
    /// Rows resolved by the role-driven chain alone
    pub chain_resolved: usize,
    pub iso_fast_path: bool,
    pub recovered: usize,
}

impl Disambiguation {
    pub fn resolved(&self) -> usize {
        resolved_count(&self.series)
    }
}

pub fn disambiguate(table: &RoleTable, config: &NormalizerConfig) -> Disambiguation {
    let rows = table.table.height();
    let (strategy, mut series) = default_chain()
        .iter()
        .find_map(|s| match s.resolve(table, config) {
            StrategyOutcome::Resolved(series) => Some((s.name(), series)),
            StrategyOutcome::Pass => None,
        })
        .unwrap_or(("none", vec![None; rows]));
    let chain_resolved = resolved_count(&series);

    let iso = iso_fast_path(table, &series, config);
    let iso_fast_path = iso.is_some();
    if let Some(iso) = iso {
        series = iso;
    }

    let recovered = recover_rows(table, &mut series, config);
    debug!(
        "Disambiguation via {}: {}/{} resolved (iso fast path: {}, recovered: {})",
        strategy,
        resolved_count(&series),
        rows,
        iso_fast_path,
        recovered
    );

    Disambiguation {
        series,
        strategy,
        chain_resolved,
        iso_fast_path,
        recovered,
    }
}
