use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::metrics::slugify;

/// Canonical month order used whenever the header row does not supply
/// exactly twelve usable labels.
pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Owned copy of [`MONTHS`].
pub fn default_months() -> Vec<String> {
    MONTHS.iter().map(|m| m.to_string()).collect()
}

/// Which raw source supplied a [`Dataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// The on-disk source file.
    Local,
    /// The configured remote URL.
    Remote,
    /// A recorded historical snapshot.
    Snapshot,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Local => "local",
            SourceKind::Remote => "remote",
            SourceKind::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of a [`Dataset`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub source: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
}

impl DatasetMeta {
    pub fn local(last_updated: Option<DateTime<Utc>>) -> Self {
        Self {
            source: SourceKind::Local,
            last_updated,
            snapshot_id: None,
        }
    }
}

/// One validated partner line from the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerRow {
    /// `true` when the upstream marker cell reads exactly `TRUE`.
    pub active: bool,
    pub director: String,
    pub partner: String,
    /// Reference revenue used as the denominator for drop figures.
    pub baseline: f64,
    /// Projected amount per month label; holds every key of the dataset's
    /// month order.
    pub months: BTreeMap<String, f64>,
    pub total_revenue: f64,
    /// Baseline × 12 as recorded in the source.
    pub baseline_annualized: f64,
    pub variance: f64,
}

impl PartnerRow {
    /// Projected amount for `month`, `0.0` when the key is unknown.
    pub fn month_value(&self, month: &str) -> f64 {
        self.months.get(month).copied().unwrap_or(0.0)
    }

    /// Monthly amounts laid out in `months` order.
    pub fn month_series(&self, months: &[String]) -> Vec<f64> {
        months.iter().map(|m| self.month_value(m)).collect()
    }
}

/// The normalized view of one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Exactly twelve distinct month labels.
    pub months: Vec<String>,
    pub rows: Vec<PartnerRow>,
    /// Distinct director names, sorted.
    pub directors: Vec<String>,
    pub meta: DatasetMeta,
}

impl Dataset {
    /// Dataset with the default months and no rows.
    pub fn empty(meta: DatasetMeta) -> Self {
        Self {
            months: default_months(),
            rows: Vec::new(),
            directors: Vec::new(),
            meta,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows belonging to `director`, in file order.
    pub fn rows_for_director(&self, director: &str) -> Vec<&PartnerRow> {
        self.rows.iter().filter(|r| r.director == director).collect()
    }

    /// Resolve a routing slug back to a director name.
    ///
    /// When two directors share a slug the first in sorted order wins.
    pub fn find_director_by_slug(&self, slug: &str) -> Option<&str> {
        self.directors
            .iter()
            .find(|d| slugify(d) == slug)
            .map(|d| d.as_str())
    }

    /// Resolve either an exact director name or its slug.
    pub fn resolve_director(&self, name_or_slug: &str) -> Option<&str> {
        self.directors
            .iter()
            .find(|d| d.as_str() == name_or_slug)
            .map(|d| d.as_str())
            .or_else(|| self.find_director_by_slug(name_or_slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(director: &str, partner: &str) -> PartnerRow {
        PartnerRow {
            active: true,
            director: director.to_string(),
            partner: partner.to_string(),
            baseline: 100.0,
            months: default_months().into_iter().map(|m| (m, 10.0)).collect(),
            total_revenue: 120.0,
            baseline_annualized: 1200.0,
            variance: 0.0,
        }
    }

    fn dataset(rows: Vec<PartnerRow>, directors: &[&str]) -> Dataset {
        Dataset {
            months: default_months(),
            rows,
            directors: directors.iter().map(|d| d.to_string()).collect(),
            meta: DatasetMeta::local(None),
        }
    }

    #[test]
    fn test_default_months_has_twelve_entries() {
        let months = default_months();
        assert_eq!(months.len(), 12);
        assert_eq!(months[0], "January");
        assert_eq!(months[11], "December");
    }

    #[test]
    fn test_empty_dataset_keeps_meta() {
        let meta = DatasetMeta {
            source: SourceKind::Snapshot,
            last_updated: None,
            snapshot_id: Some("2024-01-01T00-00-00-000".to_string()),
        };
        let ds = Dataset::empty(meta.clone());
        assert!(ds.is_empty());
        assert!(ds.directors.is_empty());
        assert_eq!(ds.months.len(), 12);
        assert_eq!(ds.meta, meta);
    }

    #[test]
    fn test_month_value_unknown_key_is_zero() {
        let r = row("North", "Acme");
        assert_eq!(r.month_value("March"), 10.0);
        assert_eq!(r.month_value("Smarch"), 0.0);
    }

    #[test]
    fn test_rows_for_director() {
        let ds = dataset(
            vec![row("North", "Acme"), row("South", "Bolt"), row("North", "Crux")],
            &["North", "South"],
        );
        let partners: Vec<&str> = ds
            .rows_for_director("North")
            .iter()
            .map(|r| r.partner.as_str())
            .collect();
        assert_eq!(partners, vec!["Acme", "Crux"]);
    }

    #[test]
    fn test_find_director_by_slug() {
        let ds = dataset(vec![], &["Jane D'Arc & Co.", "North"]);
        assert_eq!(ds.find_director_by_slug("jane-d-arc-co"), Some("Jane D'Arc & Co."));
        assert_eq!(ds.find_director_by_slug("south"), None);
    }

    #[test]
    fn test_resolve_director_prefers_exact_name() {
        let ds = dataset(vec![], &["North", "north"]);
        assert_eq!(ds.resolve_director("north"), Some("north"));
        assert_eq!(ds.resolve_director("North"), Some("North"));
    }

    #[test]
    fn test_source_kind_serializes_lowercase() {
        let json = serde_json::to_string(&SourceKind::Remote).unwrap();
        assert_eq!(json, "\"remote\"");
        assert_eq!(SourceKind::Snapshot.to_string(), "snapshot");
    }
}
