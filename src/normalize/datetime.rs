//! Date/time parsing primitives: Excel serials, the generic day-first /
//! month-first parser, strict ISO matching and column-level order detection.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Utc,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

use super::text::normalize_text;
use crate::config::NormalizerConfig;
use crate::table::Cell;

/// One entry per table row; `None` marks an unresolved row.
pub type TimestampSeries = Vec<Option<DateTime<Utc>>>;

pub const MILLIS_PER_DAY: f64 = 86_400_000.0;
/// 9999-12-31, the last day Excel can represent
const MAX_EXCEL_SERIAL: f64 = 2_958_466.0;

const TIME_PART: &str = r"(?P<hour>\d{1,2}):(?P<minute>\d{2})(?::(?P<second>\d{2})(?:[.,](?P<frac>\d{1,9}))?)?(?:\s*(?P<meridiem>[AaPp]\.?[Mm]\.?))?(?:\s*(?P<offset>Z|[+-]\d{2}:?\d{2}))?";

static YEAR_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?P<y>\d{{4}})[-/.](?P<p1>\d{{1,2}})[-/.](?P<p2>\d{{1,2}})(?:(?:T|\s+|,\s*){TIME_PART})?$"
    ))
    .unwrap()
});
static TWO_PART_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?P<p1>\d{{1,2}})[-/.](?P<p2>\d{{1,2}})[-/.](?P<y>\d{{4}}|\d{{2}})(?:(?:T|\s+|,\s*){TIME_PART})?$"
    ))
    .unwrap()
});
static STRICT_ISO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}:\d{2}(?:\.\d+)?$").unwrap());
static BARE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<hour>\d{1,2}):(?P<minute>\d{2})(?::(?P<second>\d{2}))?$").unwrap()
});
static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<hour>\d+):(?P<minute>\d{2})(?::(?P<second>\d{2})(?:\.(?P<frac>\d{1,9}))?)?$")
        .unwrap()
});

const NAMED_MONTH_DATETIME_FORMATS: &[&str] = &[
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d-%b-%Y %H:%M:%S",
    "%d-%b-%Y %H:%M",
    "%b %d %Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
    "%b %d %Y %H:%M",
    "%b %d, %Y %H:%M",
    "%a %b %d %H:%M:%S %Y",
];
const NAMED_MONTH_DATE_FORMATS: &[&str] = &["%d %b %Y", "%d-%b-%Y", "%b %d %Y", "%b %d, %Y"];

/// Ordering of the first two components of an ambiguous numeric date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    DayFirst,
    MonthFirst,
}

pub fn as_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc)
}

pub fn resolved_count(series: &[Option<DateTime<Utc>>]) -> usize {
    series.iter().filter(|ts| ts.is_some()).count()
}

fn excel_epoch() -> NaiveDateTime {
    // 1899-12-30 absorbs Excel's phantom 1900-02-29
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN)
}

/// Convert an Excel serial (days since 1899-12-30, fraction = time of day)
/// to a naive datetime, rounded to the millisecond.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let millis = (serial * MILLIS_PER_DAY).round() as i64;
    excel_epoch().checked_add_signed(Duration::milliseconds(millis))
}

/// A serial that carries a calendar date. Values below one day are pure
/// times of day and have no date to offer.
pub fn full_serial_to_utc(serial: f64) -> Option<DateTime<Utc>> {
    if serial < 1.0 {
        return None;
    }
    excel_serial_to_datetime(serial).map(as_utc)
}

pub fn datetime_to_excel_serial(dt: NaiveDateTime) -> f64 {
    dt.signed_duration_since(excel_epoch()).num_milliseconds() as f64 / MILLIS_PER_DAY
}

fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    Some(match raw.len() {
        2 if year < 69 => 2000 + year,
        2 => 1900 + year,
        _ => year,
    })
}

fn parse_offset(raw: &str) -> Option<FixedOffset> {
    if raw == "Z" {
        return FixedOffset::east_opt(0);
    }
    let sign = if raw.starts_with('-') { -1 } else { 1 };
    let digits: String = raw[1..].chars().filter(|c| c.is_ascii_digit()).collect();
    let hours: i32 = digits.get(0..2)?.parse().ok()?;
    let minutes: i32 = digits.get(2..4)?.parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn nanos_from_fraction(raw: &str) -> Option<u32> {
    let mut padded = raw.to_string();
    padded.truncate(9);
    while padded.len() < 9 {
        padded.push('0');
    }
    padded.parse().ok()
}

/// Time of day plus optional UTC offset from the shared time captures.
fn time_from_captures(caps: &Captures) -> Option<(NaiveTime, Option<FixedOffset>)> {
    let Some(hour) = caps.name("hour") else {
        return Some((NaiveTime::MIN, None));
    };
    let mut hour: u32 = hour.as_str().parse().ok()?;
    let minute: u32 = caps.name("minute")?.as_str().parse().ok()?;
    let second: u32 = match caps.name("second") {
        Some(s) => s.as_str().parse().ok()?,
        None => 0,
    };
    let nanos = match caps.name("frac") {
        Some(f) => nanos_from_fraction(f.as_str())?,
        None => 0,
    };

    if let Some(meridiem) = caps.name("meridiem") {
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = meridiem.as_str().to_ascii_lowercase().starts_with('p');
        hour = match (pm, hour) {
            (false, 12) => 0,
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, h) => h,
        };
    }

    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)?;
    let offset = match caps.name("offset") {
        Some(o) => Some(parse_offset(o.as_str())?),
        None => None,
    };
    Some((time, offset))
}

fn build_instant(date: NaiveDate, caps: &Captures) -> Option<DateTime<Utc>> {
    let (time, offset) = time_from_captures(caps)?;
    let naive = date.and_time(time);
    match offset {
        None => Some(as_utc(naive)),
        Some(offset) => offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

fn parse_named_month(text: &str) -> Option<DateTime<Utc>> {
    if !text.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    for fmt in NAMED_MONTH_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(as_utc(dt));
        }
    }
    for fmt in NAMED_MONTH_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(as_utc(date.and_time(NaiveTime::MIN)));
        }
    }
    None
}

/// Generic date/time parser. Year-first and named-month forms are
/// unambiguous; for `A/B/YYYY` forms `order` decides which of A and B is the
/// day. Invalid combinations under `order` are unresolved, never swapped.
/// Naive results are taken as UTC, offset-bearing ones converted to UTC.
pub fn parse_datetime(raw: &str, order: DateOrder) -> Option<DateTime<Utc>> {
    let text = normalize_text(raw);
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = YEAR_FIRST.captures(&text) {
        let year: i32 = caps["y"].parse().ok()?;
        let month: u32 = caps["p1"].parse().ok()?;
        let day: u32 = caps["p2"].parse().ok()?;
        return build_instant(NaiveDate::from_ymd_opt(year, month, day)?, &caps);
    }

    if let Some(caps) = TWO_PART_FIRST.captures(&text) {
        let year = expand_year(&caps["y"])?;
        let first: u32 = caps["p1"].parse().ok()?;
        let second: u32 = caps["p2"].parse().ok()?;
        let (day, month) = match order {
            DateOrder::DayFirst => (first, second),
            DateOrder::MonthFirst => (second, first),
        };
        return build_instant(NaiveDate::from_ymd_opt(year, month, day)?, &caps);
    }

    parse_named_month(&text)
}

pub fn is_strict_iso(text: &str) -> bool {
    STRICT_ISO.is_match(text)
}

/// Exact `%Y-%m-%d %H:%M:%S` parse (with `T` accepted as separator),
/// optionally with fractional seconds.
pub fn parse_iso_exact(text: &str, with_fraction: bool) -> Option<DateTime<Utc>> {
    let text = normalize_text(text).replacen('T', " ", 1);
    let fmt = if with_fraction {
        "%Y-%m-%d %H:%M:%S%.f"
    } else {
        "%Y-%m-%d %H:%M:%S"
    };
    NaiveDateTime::parse_from_str(&text, fmt).ok().map(as_utc)
}

/// Strict bare `HH:MM[:SS]`.
pub fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    let caps = BARE_TIME.captures(text.trim())?;
    let hour: u32 = caps["hour"].parse().ok()?;
    let minute: u32 = caps["minute"].parse().ok()?;
    let second: u32 = caps.name("second").map_or(Some(0), |s| s.as_str().parse().ok())?;
    NaiveTime::from_hms_opt(hour, minute, second)
}

pub fn is_bare_time(text: &str) -> bool {
    BARE_TIME.is_match(text.trim())
}

/// `HH:MM[:SS[.f]]` as an elapsed duration; hours may exceed 23. Hour
/// counts beyond chrono's range are unresolved.
pub fn parse_duration_text(text: &str) -> Option<Duration> {
    let caps = DURATION.captures(text.trim())?;
    let hours: i64 = caps["hour"].parse().ok()?;
    let minutes: i64 = caps["minute"].parse().ok()?;
    let seconds: i64 = caps.name("second").map_or(Some(0), |s| s.as_str().parse().ok())?;
    let nanos = match caps.name("frac") {
        Some(f) => nanos_from_fraction(f.as_str())? as i64,
        None => 0,
    };
    if minutes > 59 || seconds > 59 {
        return None;
    }
    Duration::try_hours(hours)?
        .checked_add(&Duration::try_minutes(minutes)?)?
        .checked_add(&Duration::try_seconds(seconds)?)?
        .checked_add(&Duration::nanoseconds(nanos))
}

/// Pick the ordering that yields more plausible years over a sample of the
/// column's values. Ties go to day-first.
pub fn detect_date_order<'a, I>(values: I, config: &NormalizerConfig) -> DateOrder
where
    I: IntoIterator<Item = &'a str>,
{
    let sample: Vec<&str> = values
        .into_iter()
        .filter(|v| !v.trim().is_empty())
        .take(config.date_order_sample)
        .collect();

    let score = |order: DateOrder| {
        sample
            .iter()
            .filter_map(|v| parse_datetime(v, order))
            .filter(|dt| config.is_plausible_year(dt.year()))
            .count()
    };

    if score(DateOrder::DayFirst) >= score(DateOrder::MonthFirst) {
        DateOrder::DayFirst
    } else {
        DateOrder::MonthFirst
    }
}

/// A column counts as numeric when every non-empty cell is a number.
pub fn is_numeric_column(cells: &[&Cell]) -> bool {
    cells
        .iter()
        .filter(|c| !c.is_empty())
        .all(|c| matches!(c, Cell::Number(_)))
}

pub fn parse_cell(cell: &Cell, order: DateOrder) -> Option<DateTime<Utc>> {
    match cell {
        Cell::DateTime(dt) => Some(as_utc(*dt)),
        Cell::Text(s) => parse_datetime(s, order),
        Cell::Number(_) | Cell::Empty => None,
    }
}

/// Result of resolving one (possibly unified) date-bearing column.
#[derive(Debug, Clone)]
pub struct ColumnParse {
    pub series: TimestampSeries,
    /// `None` for numeric serial columns
    pub order: Option<DateOrder>,
}

/// The date order a column is read with; `None` for numeric serial columns.
pub fn column_order(cells: &[&Cell], config: &NormalizerConfig) -> Option<DateOrder> {
    if is_numeric_column(cells) {
        return None;
    }
    Some(detect_date_order(
        cells.iter().filter_map(|c| match c {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }),
        config,
    ))
}

/// Numeric columns decode as Excel serials; anything else is parsed with a
/// date order chosen once for the whole column.
pub fn resolve_column(cells: &[&Cell], config: &NormalizerConfig) -> ColumnParse {
    let Some(order) = column_order(cells, config) else {
        let series = cells
            .iter()
            .map(|c| match c {
                Cell::Number(f) => full_serial_to_utc(*f),
                _ => None,
            })
            .collect();
        return ColumnParse {
            series,
            order: None,
        };
    };
    ColumnParse {
        series: cells.iter().map(|c| parse_cell(c, order)).collect(),
        order: Some(order),
    }
}
