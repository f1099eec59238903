use std::env;
use std::str::FromStr;

/// Tuning knobs for the normalization heuristics.
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Rows scanned when looking for a shifted header row
    pub header_scan_rows: usize,
    /// Non-empty values sampled when choosing day-first vs month-first
    pub date_order_sample: usize,
    pub plausible_year_min: i32,
    pub plausible_year_max: i32,
    /// Share of rows that must decode as full serials for a numeric time column
    pub full_serial_ratio: f64,
    /// ISO fast path threshold when the table has classified date/time columns
    pub iso_column_ratio: f64,
    /// ISO fast path threshold when nothing was classified as date/time
    pub iso_table_ratio: f64,
    /// Rows searched above/below for an anchor date
    pub nearby_date_window: usize,
    pub column_scan_rows: usize,
    pub column_scan_ratio: f64,
    pub max_gap_samples: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        NormalizerConfig {
            header_scan_rows: 200,
            date_order_sample: 500,
            plausible_year_min: 2000,
            plausible_year_max: 2100,
            full_serial_ratio: 0.7,
            iso_column_ratio: 0.3,
            iso_table_ratio: 0.15,
            nearby_date_window: 10,
            column_scan_rows: 2000,
            column_scan_ratio: 0.2,
            max_gap_samples: 200,
        }
    }
}

impl NormalizerConfig {
    /// Defaults overridden by `NORMALIZER_*` environment variables.
    /// Values that fail to parse keep their default.
    pub fn from_env() -> Self {
        let defaults = NormalizerConfig::default();
        NormalizerConfig {
            header_scan_rows: env_or("NORMALIZER_HEADER_SCAN_ROWS", defaults.header_scan_rows),
            date_order_sample: env_or("NORMALIZER_DATE_ORDER_SAMPLE", defaults.date_order_sample),
            plausible_year_min: env_or(
                "NORMALIZER_PLAUSIBLE_YEAR_MIN",
                defaults.plausible_year_min,
            ),
            plausible_year_max: env_or(
                "NORMALIZER_PLAUSIBLE_YEAR_MAX",
                defaults.plausible_year_max,
            ),
            full_serial_ratio: env_or("NORMALIZER_FULL_SERIAL_RATIO", defaults.full_serial_ratio),
            iso_column_ratio: env_or("NORMALIZER_ISO_COLUMN_RATIO", defaults.iso_column_ratio),
            iso_table_ratio: env_or("NORMALIZER_ISO_TABLE_RATIO", defaults.iso_table_ratio),
            nearby_date_window: env_or(
                "NORMALIZER_NEARBY_DATE_WINDOW",
                defaults.nearby_date_window,
            ),
            column_scan_rows: env_or("NORMALIZER_COLUMN_SCAN_ROWS", defaults.column_scan_rows),
            column_scan_ratio: env_or("NORMALIZER_COLUMN_SCAN_RATIO", defaults.column_scan_ratio),
            max_gap_samples: env_or("NORMALIZER_MAX_GAP_SAMPLES", defaults.max_gap_samples),
        }
    }

    pub fn is_plausible_year(&self, year: i32) -> bool {
        (self.plausible_year_min..=self.plausible_year_max).contains(&year)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
