//! Per-view churn summaries.
//!
//! A [`ChurnSummary`] bundles every derived figure a company or director view
//! shows, computed from scratch over a row subset.

use serde::Serialize;

use crate::metrics::{
    baseline_change_pct, baseline_drop, latest_active_month_index, month_over_month_delta,
    month_over_month_pct, projected_annual_churn, slugify, sum, total_baseline, total_by_month,
    RevenueLine,
};
use crate::models::{Dataset, PartnerRow};

/// One line of the baseline drop timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropPoint {
    pub month: String,
    pub projected: f64,
    pub drop: f64,
    pub drop_pct: f64,
}

/// Derived churn figures for a set of partner rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChurnSummary {
    pub months: Vec<String>,
    /// Projected revenue per month.
    pub series: Vec<f64>,
    /// Relative month-over-month change of `series`.
    pub series_mom_pct: Vec<f64>,
    pub baseline: f64,
    pub change_pct: Vec<f64>,
    pub drop_series: Vec<f64>,
    pub drop_mom: Vec<f64>,
    pub projected_total: f64,
    pub latest_index: usize,
    pub latest_month: Option<String>,
    pub latest_change_pct: f64,
    pub latest_drop: f64,
    pub latest_drop_mom: f64,
    pub projected_annual_churn: f64,
    pub partners: usize,
}

impl ChurnSummary {
    /// Compute the summary of `rows` over `months`.
    pub fn for_rows<R: RevenueLine>(rows: &[R], months: &[String]) -> Self {
        let series = total_by_month(rows, months);
        let baseline = total_baseline(rows);
        let change_pct = baseline_change_pct(&series, baseline);
        let drop_series = baseline_drop(&series, baseline);
        let drop_mom = month_over_month_delta(&drop_series);
        let latest_index = latest_active_month_index(&series);

        Self {
            months: months.to_vec(),
            projected_total: sum(&series),
            latest_month: months.get(latest_index).cloned(),
            latest_change_pct: change_pct.get(latest_index).copied().unwrap_or(0.0),
            latest_drop: drop_series.get(latest_index).copied().unwrap_or(0.0),
            latest_drop_mom: drop_mom.get(latest_index).copied().unwrap_or(0.0),
            projected_annual_churn: projected_annual_churn(rows),
            partners: rows.len(),
            series_mom_pct: month_over_month_pct(&series),
            series,
            baseline,
            change_pct,
            drop_series,
            drop_mom,
            latest_index,
        }
    }

    /// Month-by-month projected revenue against the baseline.
    pub fn drop_timeline(&self) -> Vec<DropPoint> {
        self.months
            .iter()
            .enumerate()
            .map(|(i, month)| {
                let projected = self.series.get(i).copied().unwrap_or(0.0);
                let drop = self.baseline - projected;
                let drop_pct = if self.baseline == 0.0 {
                    0.0
                } else {
                    drop / self.baseline
                };
                DropPoint {
                    month: month.clone(),
                    projected,
                    drop,
                    drop_pct,
                }
            })
            .collect()
    }
}

/// A director's summary together with its routing slug.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectorSummary {
    pub name: String,
    pub slug: String,
    pub summary: ChurnSummary,
}

impl Dataset {
    /// Summary over every row.
    pub fn company_summary(&self) -> ChurnSummary {
        ChurnSummary::for_rows(&self.rows, &self.months)
    }

    /// Summary over a single director's rows.
    pub fn director_summary(&self, director: &str) -> DirectorSummary {
        let rows: Vec<&PartnerRow> = self.rows_for_director(director);
        DirectorSummary {
            name: director.to_string(),
            slug: slugify(director),
            summary: ChurnSummary::for_rows(&rows, &self.months),
        }
    }

    /// One summary per director, in sorted director order.
    pub fn director_summaries(&self) -> Vec<DirectorSummary> {
        self.directors
            .iter()
            .map(|d| self.director_summary(d))
            .collect()
    }
}
