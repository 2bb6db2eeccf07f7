//! Price-string normalization
//!
//! Two formats meet here. The source page prints `€123.45` (point decimal,
//! one amount per line), while the remote index replies with Dutch locale
//! amounts such as `1.234,56` or `120,-` (point thousands, comma decimal,
//! `,-` for whole euros). Both normalize to plain `f64` amounts; anything
//! unparseable is simply no price, never an error.

use once_cell::sync::Lazy;
use regex::Regex;

static LISTING_PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^€([\d.]+)$").expect("listing price regex is valid")
});

/// Parse a monetary cell from the source page, e.g. `"€123.45"`.
///
/// The cell text may span several lines; the first line that is exactly a
/// euro amount wins. Returns `None` for blank or non-monetary cells.
pub fn parse_listing_price(raw: &str) -> Option<f64> {
    raw.lines().find_map(|line| {
        let captures = LISTING_PRICE_RE.captures(line.trim())?;
        captures[1].parse::<f64>().ok()
    })
}

/// Normalize a locale-formatted index amount to a numeric value.
///
/// Strips any leading currency marker, drops the `,-` whole-euro suffix and
/// the `.` thousands separators, and turns the decimal comma into a point:
/// `"€1.234,56"` becomes `1234.56`, `"120,-"` becomes `120.0`.
pub fn normalize_index_price(raw: &str) -> Option<f64> {
    let amount = raw
        .trim()
        .trim_start_matches(|c: char| !(c.is_ascii_digit() || c == '-'));

    let normalized = amount.replace(",-", "").replace('.', "").replace(',', ".");
    if normalized.is_empty() {
        return None;
    }

    normalized.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// Format an amount the way the comparison view prints it.
pub fn format_eur(amount: f64) -> String {
    format!("€{amount:.2}")
}
