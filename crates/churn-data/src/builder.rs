//! Row-to-dataset mapping.
//!
//! Turns parsed spreadsheet rows into a [`Dataset`]: resolves the month order
//! from the header row, maps each data row onto a [`PartnerRow`] and drops
//! rows that do not identify both a director and a partner.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::ops::Range;

use churn_core::data_processors::parse_money;
use churn_core::models::{default_months, Dataset, DatasetMeta, PartnerRow};
use churn_core::{ChurnError, Result};
use tracing::debug;

use crate::parser::parse_rows;

// ── Layout ────────────────────────────────────────────────────────────────────

/// Row carrying the candidate month labels. Row 0 is a banner.
const HEADER_ROW: usize = 1;
/// First row holding partner data.
const FIRST_DATA_ROW: usize = 2;
/// Columns holding the twelve monthly projections.
const MONTH_COLUMNS: Range<usize> = 4..16;
/// Director values that mark a broken spreadsheet reference.
const INVALID_DIRECTORS: &[&str] = &["", "#REF!", "#N/A"];

/// Fixed positions in a data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Active,
    Director,
    Partner,
    Baseline,
    TotalRevenue,
    BaselineAnnualized,
    Variance,
}

impl Column {
    pub fn index(self) -> usize {
        match self {
            Column::Active => 0,
            Column::Director => 1,
            Column::Partner => 2,
            Column::Baseline => 3,
            Column::TotalRevenue => 16,
            Column::BaselineAnnualized => 17,
            Column::Variance => 18,
        }
    }
}

// ── SheetRecord ───────────────────────────────────────────────────────────────

/// Bounds-checked view over one parsed data row.
///
/// Construction fails when the row cannot hold the identity columns; cells
/// beyond the row's width read as `None` rather than as empty text.
#[derive(Debug, Clone, Copy)]
pub struct SheetRecord<'a> {
    fields: &'a [String],
}

impl<'a> SheetRecord<'a> {
    /// Active marker, director and partner.
    pub const MIN_COLUMNS: usize = 3;

    pub fn new(fields: &'a [String]) -> Result<Self> {
        if fields.len() < Self::MIN_COLUMNS {
            return Err(ChurnError::RowShape {
                columns: fields.len(),
                required: Self::MIN_COLUMNS,
            });
        }
        Ok(Self { fields })
    }

    pub fn width(&self) -> usize {
        self.fields.len()
    }

    /// Trimmed text of `column`, `None` when the row is too short.
    pub fn text(&self, column: Column) -> Option<&'a str> {
        self.cell(column.index())
    }

    /// Normalized amount of `column`, `None` when the row is too short.
    pub fn amount(&self, column: Column) -> Option<f64> {
        self.cell(column.index()).map(parse_money)
    }

    /// The twelve monthly amounts in column order.
    pub fn month_amounts(&self) -> Vec<Option<f64>> {
        MONTH_COLUMNS
            .map(|i| self.cell(i).map(parse_money))
            .collect()
    }

    fn cell(&self, index: usize) -> Option<&'a str> {
        self.fields.get(index).map(|f| f.trim())
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse `raw` and build a [`Dataset`] carrying `meta`.
pub fn build_dataset_from_text(raw: &str, meta: DatasetMeta) -> Dataset {
    build_dataset(&parse_rows(raw), meta)
}

/// Build a [`Dataset`] from parsed rows.
///
/// Inputs with fewer than three rows (banner, header, data) produce the
/// empty dataset.
pub fn build_dataset(rows: &[Vec<String>], meta: DatasetMeta) -> Dataset {
    if rows.len() <= FIRST_DATA_ROW {
        debug!("Only {} rows parsed; returning empty dataset", rows.len());
        return Dataset::empty(meta);
    }

    let months = resolve_months(&rows[HEADER_ROW]);

    let mut partner_rows: Vec<PartnerRow> = Vec::new();
    let mut rows_dropped = 0u64;
    let mut rows_misshapen = 0u64;

    for (offset, fields) in rows[FIRST_DATA_ROW..].iter().enumerate() {
        let record = match SheetRecord::new(fields) {
            Ok(r) => r,
            Err(e) => {
                debug!("Skipping row {}: {}", offset + FIRST_DATA_ROW, e);
                rows_misshapen += 1;
                continue;
            }
        };
        match map_to_partner_row(&record, &months) {
            Some(row) => partner_rows.push(row),
            None => rows_dropped += 1,
        }
    }

    let directors: Vec<String> = partner_rows
        .iter()
        .map(|r| r.director.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    debug!(
        "Dataset built: {} rows kept, {} dropped, {} misshapen, {} directors",
        partner_rows.len(),
        rows_dropped,
        rows_misshapen,
        directors.len(),
    );

    Dataset {
        months,
        rows: partner_rows,
        directors,
        meta,
    }
}

/// Month order from the header row.
///
/// The header's month columns are used verbatim when they yield exactly
/// twelve distinct non-blank labels; otherwise the calendar order is used.
///
/// Duplicates also force the calendar order. Month values are keyed by label,
/// so a repeated label would collapse two columns into one entry and leave
/// the row with fewer than twelve months.
pub fn resolve_months(header: &[String]) -> Vec<String> {
    let labels: Vec<String> = MONTH_COLUMNS
        .filter_map(|i| header.get(i))
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .collect();

    let distinct: HashSet<&str> = labels.iter().map(|l| l.as_str()).collect();
    if labels.len() == MONTH_COLUMNS.len() && distinct.len() == labels.len() {
        labels
    } else {
        debug!(
            "Header yielded {} usable month labels; using calendar order",
            distinct.len()
        );
        default_months()
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Returns `true` when the director cell names a real director.
fn is_valid_director(director: &str) -> bool {
    !INVALID_DIRECTORS.contains(&director)
}

/// Map one record to a [`PartnerRow`], returning `None` when the row lacks a
/// usable director or partner.
fn map_to_partner_row(record: &SheetRecord<'_>, months: &[String]) -> Option<PartnerRow> {
    let director = record.text(Column::Director).unwrap_or_default();
    let partner = record.text(Column::Partner).unwrap_or_default();
    if !is_valid_director(director) || partner.is_empty() {
        return None;
    }

    let month_values: BTreeMap<String, f64> = months
        .iter()
        .cloned()
        .zip(record.month_amounts().into_iter().map(|v| v.unwrap_or(0.0)))
        .collect();

    Some(PartnerRow {
        active: record.text(Column::Active) == Some("TRUE"),
        director: director.to_string(),
        partner: partner.to_string(),
        baseline: record.amount(Column::Baseline).unwrap_or(0.0),
        months: month_values,
        total_revenue: record.amount(Column::TotalRevenue).unwrap_or(0.0),
        baseline_annualized: record.amount(Column::BaselineAnnualized).unwrap_or(0.0),
        variance: record.amount(Column::Variance).unwrap_or(0.0),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
