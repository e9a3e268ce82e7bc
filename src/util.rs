// Numeric helpers shared by the engine and the report layer.
//
// Parsing is forgiving about the formatting found in hand-edited CSV
// exports; formatting inserts thousands separators for display.
use num_format::{Locale, ToFormattedString};

/// Month abbreviations in calendar order. Spanish names first since that is
/// what the utility prints; English ones are accepted as well.
const MONTHS: [[&str; 2]; 12] = [
    ["ene", "jan"],
    ["feb", "feb"],
    ["mar", "mar"],
    ["abr", "apr"],
    ["may", "may"],
    ["jun", "jun"],
    ["jul", "jul"],
    ["ago", "aug"],
    ["sep", "sep"],
    ["oct", "oct"],
    ["nov", "nov"],
    ["dic", "dec"],
];

/// Zero-based calendar index of an abbreviated (or full) month name.
///
/// Only the first three characters are compared, so `"Enero"`, `"ene"` and
/// `"Ene."` all map to 0. Unknown names return `None`.
pub fn month_index(name: &str) -> Option<u32> {
    let key: String = name.trim().chars().take(3).collect::<String>().to_lowercase();
    MONTHS
        .iter()
        .position(|aliases| aliases.contains(&key.as_str()))
        .map(|i| i as u32)
}

/// `numerator / denominator`, or 0 when the denominator is zero or the
/// result is not finite.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let r = numerator / denominator;
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

/// Rounds half away from zero on positive values, like a spreadsheet does.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports.
///
/// - Trims whitespace and a leading currency sign.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim().trim_start_matches('$');
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i32>().ok()
}

pub fn parse_bool_safe(s: Option<&str>) -> bool {
    matches!(
        s.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "1" | "yes" | "y" | "x")
    )
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format to a plain fixed-decimal string first, then let `num-format`
    // insert separators into the integer part.
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    // Avoid printing "-0" for values that round to zero.
    let is_zero = res.chars().all(|c| matches!(c, '0' | '.' | ','));
    if n.is_sign_negative() && !is_zero {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_currency(n: f64) -> String {
    if n.is_sign_negative() && n.round() != 0.0 {
        format!("-${}", format_number(n.abs(), 0))
    } else {
        format!("${}", format_number(n.abs(), 0))
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
