use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use churn_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a relative epsilon so exact midpoints round away from zero.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // "0.50" -> ".50"
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a dollar amount with thousands separators and no cents.
///
/// # Examples
///
/// ```
/// use churn_core::formatting::format_money;
///
/// assert_eq!(format_money(1234.56), "$1,235");
/// assert_eq!(format_money(0.0), "$0");
/// assert_eq!(format_money(-9000.0), "-$9,000");
/// ```
pub fn format_money(amount: f64) -> String {
    let digits = format_number(amount.abs(), 0);
    if amount < 0.0 && digits != "0" {
        format!("-${}", digits)
    } else {
        format!("${}", digits)
    }
}

/// Format a fraction as a percentage with one decimal place.
///
/// # Examples
///
/// ```
/// use churn_core::formatting::format_pct;
///
/// assert_eq!(format_pct(0.125), "12.5%");
/// assert_eq!(format_pct(-0.5), "-50.0%");
/// ```
pub fn format_pct(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Render a last-updated timestamp in `tz_name`, or `"Unknown"`.
///
/// Unrecognised timezone names fall back to UTC.
pub fn format_last_updated(ts: Option<DateTime<Utc>>, tz_name: &str) -> String {
    let Some(ts) = ts else {
        return "Unknown".to_string();
    };
    let tz: Tz = tz_name.parse().unwrap_or(Tz::UTC);
    ts.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z").to_string()
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
