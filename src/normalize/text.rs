//! Character normalization applied before every text parse.

use once_cell::sync::Lazy;
use regex::Regex;

static INVISIBLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x00-\x1f\x7f\u{00A0}\u{200E}\u{200F}\u{202A}-\u{202E}\u{FEFF}]").unwrap()
});
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Replace control/invisible characters with spaces, fold the Unicode minus
/// and full-width period/colon to ASCII, collapse whitespace and trim.
pub fn normalize_text(raw: &str) -> String {
    let cleaned = INVISIBLE.replace_all(raw, " ");
    let folded: String = cleaned
        .chars()
        .map(|c| match c {
            '\u{2212}' => '-',
            '\u{FF0E}' => '.',
            '\u{FF1A}' => ':',
            other => other,
        })
        .collect();
    WHITESPACE_RUN.replace_all(&folded, " ").trim().to_string()
}
