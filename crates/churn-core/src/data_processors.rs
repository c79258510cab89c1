use std::sync::OnceLock;

use regex::Regex;

// ── AmountNormalizer ──────────────────────────────────────────────────────────

/// Turns spreadsheet currency cells into signed amounts.
///
/// Normalization never fails: anything that cannot be read as a number
/// becomes `0.0`.
pub struct AmountNormalizer;

impl AmountNormalizer {
    /// Parse a single cell.
    ///
    /// Handles:
    /// * whitespace anywhere in the cell (`" 1 200 "`)
    /// * dollar signs (`"$1,234"`)
    /// * the lone dash used for zero (`"-"`)
    /// * accounting negatives in parentheses (`"(500)"`)
    /// * thousands separators (`"1,234,567.89"`)
    ///
    /// Only the leading numeric part is read, so `"12.5%"` yields `12.5`.
    pub fn parse(value: &str) -> f64 {
        let compact: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '$')
            .collect();
        if compact.is_empty() || compact == "-" {
            return 0.0;
        }

        let negative = compact.contains('(') && compact.contains(')');
        let cleaned: String = compact
            .chars()
            .filter(|c| !matches!(c, '(' | ')' | ','))
            .collect();

        let Some(amount) = Self::leading_number(&cleaned) else {
            return 0.0;
        };
        if negative {
            -amount
        } else {
            amount
        }
    }

    /// Read the longest numeric prefix of `s`.
    fn leading_number(s: &str) -> Option<f64> {
        static NUMBER: OnceLock<Regex> = OnceLock::new();
        let re = NUMBER.get_or_init(|| {
            Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number regex")
        });
        let m = re.find(s)?;
        m.as_str().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// Shorthand for [`AmountNormalizer::parse`].
pub fn parse_money(value: &str) -> f64 {
    AmountNormalizer::parse(value)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
