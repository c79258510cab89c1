use std::sync::OnceLock;

use regex::Regex;

use crate::models::PartnerRow;

/// Interface for any revenue-bearing line the metrics can be computed over.
pub trait RevenueLine {
    /// Projected amount for the given month label (0.0 when absent).
    fn month_value(&self, month: &str) -> f64;
    /// Reference revenue.
    fn baseline(&self) -> f64;
    /// Baseline × 12 reference figure.
    fn baseline_annualized(&self) -> f64;
    /// Projected total revenue for the year.
    fn total_revenue(&self) -> f64;
}

impl RevenueLine for PartnerRow {
    fn month_value(&self, month: &str) -> f64 {
        PartnerRow::month_value(self, month)
    }

    fn baseline(&self) -> f64 {
        self.baseline
    }

    fn baseline_annualized(&self) -> f64 {
        self.baseline_annualized
    }

    fn total_revenue(&self) -> f64 {
        self.total_revenue
    }
}

impl<T: RevenueLine + ?Sized> RevenueLine for &T {
    fn month_value(&self, month: &str) -> f64 {
        (**self).month_value(month)
    }

    fn baseline(&self) -> f64 {
        (**self).baseline()
    }

    fn baseline_annualized(&self) -> f64 {
        (**self).baseline_annualized()
    }

    fn total_revenue(&self) -> f64 {
        (**self).total_revenue()
    }
}

// ── Series ────────────────────────────────────────────────────────────────────

/// Sum each month across `rows`, one value per entry of `months`.
pub fn total_by_month<R: RevenueLine>(rows: &[R], months: &[String]) -> Vec<f64> {
    months
        .iter()
        .map(|month| rows.iter().map(|r| r.month_value(month)).sum())
        .collect()
}

/// Sum of the row baselines.
pub fn total_baseline<R: RevenueLine>(rows: &[R]) -> f64 {
    rows.iter().map(|r| r.baseline()).sum()
}

/// Fractional drop of each value below `baseline`.
///
/// Every entry is `0.0` when `baseline` is zero.
pub fn baseline_change_pct(series: &[f64], baseline: f64) -> Vec<f64> {
    if baseline == 0.0 {
        return vec![0.0; series.len()];
    }
    series.iter().map(|v| (baseline - v) / baseline).collect()
}

/// Absolute shortfall of each value below `baseline`.
pub fn baseline_drop(series: &[f64], baseline: f64) -> Vec<f64> {
    series.iter().map(|v| baseline - v).collect()
}

/// Difference to the previous entry; the first entry is always `0.0`.
pub fn month_over_month_delta(series: &[f64]) -> Vec<f64> {
    series
        .iter()
        .enumerate()
        .map(|(i, v)| if i == 0 { 0.0 } else { v - series[i - 1] })
        .collect()
}

/// Relative change to the previous entry.
///
/// `0.0` for the first entry and wherever the previous value is zero.
pub fn month_over_month_pct(series: &[f64]) -> Vec<f64> {
    series
        .iter()
        .enumerate()
        .map(|(i, v)| {
            if i == 0 {
                return 0.0;
            }
            let prev = series[i - 1];
            if prev == 0.0 {
                0.0
            } else {
                (v - prev) / prev
            }
        })
        .collect()
}

/// Revenue expected to be lost over the year: Σ (annualized baseline − total).
pub fn projected_annual_churn<R: RevenueLine>(rows: &[R]) -> f64 {
    rows.iter()
        .map(|r| r.baseline_annualized() - r.total_revenue())
        .sum()
}

/// Index of the most recent month carrying data.
///
/// Scans backwards for the first non-zero value. An all-zero series yields
/// the last index, an empty series yields `0`.
pub fn latest_active_month_index(series: &[f64]) -> usize {
    if series.is_empty() {
        return 0;
    }
    series
        .iter()
        .rposition(|v| *v != 0.0)
        .unwrap_or(series.len() - 1)
}

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

// ── Routing keys ──────────────────────────────────────────────────────────────

/// Lowercase `name` and collapse every run of characters outside `[a-z0-9]`
/// into one hyphen, trimming hyphens at both ends.
///
/// Distinct names may share a slug; callers resolve by first match.
pub fn slugify(name: &str) -> String {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let re = SEPARATORS.get_or_init(|| Regex::new("[^a-z0-9]+").expect("valid slug regex"));
    re.replace_all(&name.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_months;
    use std::collections::BTreeMap;

    fn make_row(baseline: f64, monthly: &[f64], total: f64, annualized: f64) -> PartnerRow {
        let months: BTreeMap<String, f64> = default_months()
            .into_iter()
            .zip(monthly.iter().copied().chain(std::iter::repeat(0.0)))
            .collect();
        PartnerRow {
            active: true,
            director: "North".to_string(),
            partner: "Acme".to_string(),
            baseline,
            months,
            total_revenue: total,
            baseline_annualized: annualized,
            variance: 0.0,
        }
    }

    // ── total_by_month ───────────────────────────────────────────────────────

    #[test]
    fn test_total_by_month_sums_rows() {
        let months = default_months();
        let rows = vec![
            make_row(0.0, &[1.0, 2.0, 3.0], 0.0, 0.0),
            make_row(0.0, &[10.0, 20.0], 0.0, 0.0),
        ];
        let series = total_by_month(&rows, &months);
        assert_eq!(series.len(), 12);
        assert_eq!(&series[..3], &[11.0, 22.0, 3.0]);
        assert!(series[3..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_total_by_month_matches_row_sums() {
        let months = default_months();
        let rows = vec![
            make_row(0.0, &[1.5, -2.0, 3.0, 4.0, 5.0, 6.0], 0.0, 0.0),
            make_row(0.0, &[7.0; 12], 0.0, 0.0),
            make_row(0.0, &[], 0.0, 0.0),
        ];
        let series_total = sum(&total_by_month(&rows, &months));
        let row_total: f64 = rows.iter().map(|r| r.months.values().sum::<f64>()).sum();
        assert!((series_total - row_total).abs() < 1e-9);
    }

    #[test]
    fn test_total_by_month_over_borrowed_subset() {
        let months = default_months();
        let rows = vec![
            make_row(0.0, &[5.0], 0.0, 0.0),
            make_row(0.0, &[7.0], 0.0, 0.0),
        ];
        let subset: Vec<&PartnerRow> = rows.iter().skip(1).collect();
        assert_eq!(total_by_month(&subset, &months)[0], 7.0);
    }

    #[test]
    fn test_total_by_month_empty_rows() {
        let months = default_months();
        let rows: Vec<PartnerRow> = vec![];
        assert_eq!(total_by_month(&rows, &months), vec![0.0; 12]);
    }

    // ── baseline ─────────────────────────────────────────────────────────────

    #[test]
    fn test_baseline_change_pct() {
        let pct = baseline_change_pct(&[100.0, 50.0, 150.0], 100.0);
        assert_eq!(pct, vec![0.0, 0.5, -0.5]);
    }

    #[test]
    fn test_baseline_change_pct_zero_baseline() {
        let pct = baseline_change_pct(&[100.0, -3.0, 0.0, 1e9], 0.0);
        assert_eq!(pct, vec![0.0; 4]);
    }

    #[test]
    fn test_baseline_drop() {
        assert_eq!(baseline_drop(&[80.0, 120.0], 100.0), vec![20.0, -20.0]);
    }

    #[test]
    fn test_total_baseline() {
        let rows = vec![make_row(100.0, &[], 0.0, 0.0), make_row(-25.0, &[], 0.0, 0.0)];
        assert_eq!(total_baseline(&rows), 75.0);
    }

    // ── month over month ─────────────────────────────────────────────────────

    #[test]
    fn test_delta_first_is_zero() {
        assert_eq!(month_over_month_delta(&[42.0, 40.0, 45.0]), vec![0.0, -2.0, 5.0]);
    }

    #[test]
    fn test_delta_constant_series() {
        assert_eq!(month_over_month_delta(&[7.0; 5]), vec![0.0; 5]);
    }

    #[test]
    fn test_delta_empty() {
        assert!(month_over_month_delta(&[]).is_empty());
    }

    #[test]
    fn test_mom_pct_skips_zero_previous() {
        assert_eq!(month_over_month_pct(&[0.0, 10.0, 15.0, 0.0]), vec![0.0, 0.0, 0.5, -1.0]);
    }

    // ── projected_annual_churn ───────────────────────────────────────────────

    #[test]
    fn test_projected_annual_churn() {
        let rows = vec![
            make_row(0.0, &[], 3_000.0, 12_000.0),
            make_row(0.0, &[], 5_000.0, 4_000.0),
        ];
        assert_eq!(projected_annual_churn(&rows), 9_000.0 - 1_000.0);
    }

    // ── latest_active_month_index ────────────────────────────────────────────

    #[test]
    fn test_latest_index_finds_last_non_zero() {
        assert_eq!(latest_active_month_index(&[0.0, 0.0, 5.0, 0.0]), 2);
    }

    #[test]
    fn test_latest_index_all_zero_falls_back_to_last() {
        assert_eq!(latest_active_month_index(&[0.0, 0.0, 0.0]), 2);
    }

    #[test]
    fn test_latest_index_empty_is_zero() {
        assert_eq!(latest_active_month_index(&[]), 0);
    }

    #[test]
    fn test_latest_index_negative_counts_as_data() {
        assert_eq!(latest_active_month_index(&[1.0, -4.0, 0.0]), 1);
    }

    // ── slugify ──────────────────────────────────────────────────────────────

    #[test]
    fn test_slugify_punctuation() {
        assert_eq!(slugify("Jane D'Arc & Co."), "jane-d-arc-co");
    }

    #[test]
    fn test_slugify_trims_and_collapses() {
        assert_eq!(slugify("  --North  West--  "), "north-west");
        assert_eq!(slugify("Team 42"), "team-42");
    }

    #[test]
    fn test_slugify_non_ascii_is_separator() {
        assert_eq!(slugify("José Núñez"), "jos-n-ez");
    }

    #[test]
    fn test_slugify_only_symbols() {
        assert_eq!(slugify("&&&"), "");
    }

    #[test]
    fn test_sum() {
        assert_eq!(sum(&[1.0, 2.5, -0.5]), 3.0);
        assert_eq!(sum(&[]), 0.0);
    }
}
