use clap::{Parser, Subcommand};
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Partner revenue churn reporting
#[derive(Parser, Debug, Clone)]
#[command(
    name = "churn-report",
    about = "Partner revenue churn reporting",
    version
)]
pub struct Settings {
    /// Directory holding churn.csv, last-update.json and history/
    #[arg(long, env = "CHURN_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Remote CSV export to read instead of the local file
    #[arg(long, env = "SHEET_CSV_URL")]
    pub sheet_url: Option<String>,

    /// Remote fetch timeout in seconds (transport default when unset)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=600))]
    pub fetch_timeout: Option<u64>,

    /// Snapshot id to report on instead of the current source
    #[arg(long, global = true)]
    pub snapshot: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Timezone for timestamps (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// What to report.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Company-wide summary with one line per director
    Company,
    /// Summary, drop timeline and partner table for one director
    Director {
        /// Director name or its slug
        name: String,
    },
    /// List recorded snapshots
    History,
    /// Record a CSV export as the new local source and as a snapshot
    Upload {
        /// Path to the CSV file
        file: PathBuf,
    },
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and resolve `"auto"` values.
    pub fn load() -> Self {
        Self::resolve_auto_values(Settings::parse())
    }

    /// Same as [`Settings::load`] with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::resolve_auto_values(Settings::parse_from(args))
    }

    /// Whether reports should be emitted as JSON.
    pub fn json_output(&self) -> bool {
        self.format == "json"
    }

    /// Resolve the `"auto"` timezone and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::time_utils::get_system_timezone();
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        // An empty URL in the environment means "not configured".
        if settings
            .sheet_url
            .as_deref()
            .is_some_and(|u| u.trim().is_empty())
        {
            settings.sheet_url = None;
        }

        settings
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn load(args: &[&str]) -> Settings {
        let mut full = vec!["churn-report"];
        full.extend_from_slice(args);
        Settings::load_from_args(full)
    }

    #[test]
    fn test_defaults() {
        let s = load(&["--timezone", "UTC", "company"]);
        assert_eq!(s.data_dir, PathBuf::from("data"));
        assert_eq!(s.format, "text");
        assert_eq!(s.log_level, "INFO");
        assert_eq!(s.timezone, "UTC");
        assert_eq!(s.command, Command::Company);
        assert!(!s.json_output());
    }

    #[test]
    fn test_auto_timezone_is_resolved() {
        let s = load(&["company"]);
        assert_ne!(s.timezone, "auto");
        assert!(!s.timezone.is_empty());
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let s = load(&["--debug", "--log-level", "ERROR", "history"]);
        assert_eq!(s.log_level, "DEBUG");
        assert_eq!(s.command, Command::History);
    }

    #[test]
    fn test_director_command_and_global_flags() {
        let s = load(&[
            "--sheet-url",
            "https://example.com/export.csv",
            "director",
            "north",
            "--snapshot",
            "2024-05-01T10-20-30-123",
            "--format",
            "json",
        ]);
        assert_eq!(
            s.command,
            Command::Director {
                name: "north".to_string()
            }
        );
        assert_eq!(s.snapshot.as_deref(), Some("2024-05-01T10-20-30-123"));
        assert_eq!(s.sheet_url.as_deref(), Some("https://example.com/export.csv"));
        assert!(s.json_output());
    }

    #[test]
    fn test_blank_sheet_url_is_unset() {
        let s = load(&["--sheet-url", "  ", "company"]);
        assert!(s.sheet_url.is_none());
    }

    #[test]
    fn test_upload_command() {
        let s = load(&["upload", "/tmp/export.csv"]);
        assert_eq!(
            s.command,
            Command::Upload {
                file: PathBuf::from("/tmp/export.csv")
            }
        );
    }

    #[test]
    fn test_invalid_format_rejected() {
        let result = Settings::try_parse_from(["churn-report", "--format", "xml", "company"]);
        assert!(result.is_err());
    }
}
