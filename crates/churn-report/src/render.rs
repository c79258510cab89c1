//! Text and JSON renderings of the churn reports.
//!
//! Every function returns the finished report; `main` only prints it.

use churn_core::formatting::{format_last_updated, format_money, format_pct};
use churn_core::models::{Dataset, DatasetMeta, PartnerRow};
use churn_core::summary::{ChurnSummary, DirectorSummary};
use churn_data::history::HistoryEntry;
use serde_json::{json, Value};

// ── Text ──────────────────────────────────────────────────────────────────────

fn source_line(meta: &DatasetMeta, tz: &str) -> String {
    let mut line = format!(
        "Source: {}  |  Last updated: {}",
        meta.source,
        format_last_updated(meta.last_updated, tz)
    );
    if let Some(id) = &meta.snapshot_id {
        line.push_str(&format!("  |  Snapshot: {}", id));
    }
    line
}

fn summary_lines(summary: &ChurnSummary) -> Vec<String> {
    let latest = summary.latest_month.as_deref().unwrap_or("-");
    vec![
        format!("  Partners:               {}", summary.partners),
        format!("  Monthly baseline:       {}", format_money(summary.baseline)),
        format!("  Projected (12 months):  {}", format_money(summary.projected_total)),
        format!("  Latest month:           {}", latest),
        format!(
            "  Projected MoM change:   {}",
            format_pct(
                summary
                    .series_mom_pct
                    .get(summary.latest_index)
                    .copied()
                    .unwrap_or(0.0)
            )
        ),
        format!(
            "  Change vs baseline:     {}",
            format_pct(summary.latest_change_pct)
        ),
        format!("  Drop vs baseline:       {}", format_money(summary.latest_drop)),
        format!("  Drop month over month:  {}", format_money(summary.latest_drop_mom)),
        format!(
            "  Projected annual churn: {}",
            format_money(summary.projected_annual_churn)
        ),
    ]
}

/// Company summary followed by one line per director.
pub fn company_text(dataset: &Dataset, tz: &str) -> String {
    let mut out = vec![
        "Company churn".to_string(),
        source_line(&dataset.meta, tz),
        String::new(),
    ];

    if dataset.is_empty() {
        out.push("  No partner rows.".to_string());
        return out.join("\n");
    }

    out.extend(summary_lines(&dataset.company_summary()));
    out.push(String::new());
    out.push(format!(
        "  {:<24} {:<24} {:>8} {:>14} {:>16}",
        "Director", "Slug", "Partners", "Latest drop", "Annual churn"
    ));
    for d in dataset.director_summaries() {
        out.push(format!(
            "  {:<24} {:<24} {:>8} {:>14} {:>16}",
            d.name,
            d.slug,
            d.summary.partners,
            format_money(d.summary.latest_drop),
            format_money(d.summary.projected_annual_churn),
        ));
    }
    out.join("\n")
}

/// Director summary, drop timeline and partner table.
pub fn director_text(
    dataset: &Dataset,
    director: &DirectorSummary,
    rows: &[&PartnerRow],
    tz: &str,
) -> String {
    let mut out = vec![
        format!("Director: {} ({})", director.name, director.slug),
        source_line(&dataset.meta, tz),
        String::new(),
    ];
    out.extend(summary_lines(&director.summary));

    out.push(String::new());
    out.push(format!(
        "  {:<12} {:>14} {:>14} {:>8}",
        "Month", "Projected", "Drop", "Drop %"
    ));
    for point in director.summary.drop_timeline() {
        out.push(format!(
            "  {:<12} {:>14} {:>14} {:>8}",
            point.month,
            format_money(point.projected),
            format_money(point.drop),
            format_pct(point.drop_pct),
        ));
    }

    let latest_label = director.summary.latest_month.as_deref().unwrap_or("Latest");
    out.push(String::new());
    out.push(format!(
        "  {:<28} {:>6} {:>12} {:>12} {:>14} {:>14} {:>12}",
        "Partner", "Active", "Baseline", latest_label, "Total", "Baseline x12", "Variance"
    ));
    for row in rows {
        let latest = row
            .month_series(&dataset.months)
            .get(director.summary.latest_index)
            .copied()
            .unwrap_or(0.0);
        out.push(format!(
            "  {:<28} {:>6} {:>12} {:>12} {:>14} {:>14} {:>12}",
            row.partner,
            if row.active { "yes" } else { "no" },
            format_money(row.baseline),
            format_money(latest),
            format_money(row.total_revenue),
            format_money(row.baseline_annualized),
            format_money(row.variance),
        ));
    }

    out.push(String::new());
    out.extend(pulse_lines(&dataset.months, rows));
    out.join("\n")
}

/// Month-by-month projections per partner, one compact cell per month.
fn pulse_lines(months: &[String], rows: &[&PartnerRow]) -> Vec<String> {
    let mut header = format!("  {:<28}", "Monthly");
    for month in months {
        let short: String = month.chars().take(3).collect();
        header.push_str(&format!(" {:>7}", short));
    }
    let mut out = vec![header];
    for row in rows {
        let mut line = format!("  {:<28}", row.partner);
        for value in row.month_series(months) {
            line.push_str(&format!(" {:>7}", compact_amount(value)));
        }
        out.push(line);
    }
    out
}

/// `1300.0` → `1.3k`, `2500000.0` → `2.5M`, small amounts unchanged.
fn compact_amount(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else {
        format!("{:.0}", value)
    }
}

/// Recorded snapshots, most recent first.
pub fn history_text(entries: &[HistoryEntry], tz: &str) -> String {
    if entries.is_empty() {
        return "No snapshots recorded.".to_string();
    }
    let mut out = vec![format!("  {:<26} {:<22} {}", "Snapshot", "Uploaded", "File")];
    for e in entries {
        out.push(format!(
            "  {:<26} {:<22} {}",
            e.id,
            format_last_updated(Some(e.uploaded_at), tz),
            e.filename
        ));
    }
    out.join("\n")
}

pub fn upload_text(entry: &HistoryEntry, tz: &str) -> String {
    format!(
        "Recorded {} as snapshot {} at {}",
        entry.filename,
        entry.id,
        format_last_updated(Some(entry.uploaded_at), tz)
    )
}

// ── JSON ──────────────────────────────────────────────────────────────────────

pub fn company_json(dataset: &Dataset) -> Value {
    json!({
        "meta": dataset.meta,
        "months": dataset.months,
        "directors": dataset.directors,
        "summary": dataset.company_summary(),
        "director_summaries": dataset.director_summaries(),
    })
}

pub fn director_json(dataset: &Dataset, director: &DirectorSummary, rows: &[&PartnerRow]) -> Value {
    json!({
        "meta": dataset.meta,
        "director": director,
        "timeline": director.summary.drop_timeline(),
        "partners": rows,
    })
}

pub fn history_json(entries: &[HistoryEntry]) -> Value {
    json!({ "entries": entries })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
