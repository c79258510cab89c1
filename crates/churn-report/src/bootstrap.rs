use std::sync::Arc;
use std::time::Duration;

use churn_core::settings::Settings;
use churn_data::history::FileHistory;
use churn_data::layout::DataLayout;
use churn_runtime::resolver::{SnapshotResolver, SourceConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` name onto an [`EnvFilter`] directive.
fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        other => other.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Log lines go to stderr so that report output on stdout stays parseable.
/// Falls back to `"info"` if the level string is not recognised.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Source wiring ──────────────────────────────────────────────────────────────

/// Resolver configuration for the data directory and remote URL in `settings`.
pub fn source_config(settings: &Settings, layout: &DataLayout) -> SourceConfig {
    SourceConfig::from_layout(layout).with_remote(
        settings.sheet_url.clone(),
        settings.fetch_timeout.map(Duration::from_secs),
    )
}

/// Build the resolver backed by the data directory's snapshot history.
pub fn build_resolver(settings: &Settings, layout: &DataLayout) -> anyhow::Result<SnapshotResolver> {
    let history = Arc::new(FileHistory::new(layout.history_dir()));
    Ok(SnapshotResolver::new(source_config(settings, layout), history)?)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_level_directive() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("info"), "info");
        assert_eq!(level_directive("WARNING"), "warn");
        assert_eq!(level_directive("ERROR"), "error");
        assert_eq!(level_directive("TRACE"), "trace");
    }

    #[test]
    fn test_source_config_from_settings() {
        let settings = Settings::load_from_args([
            "churn-report",
            "--data-dir",
            "/srv/churn",
            "--sheet-url",
            "https://example.com/export.csv",
            "--fetch-timeout",
            "15",
            "company",
        ]);
        let layout = DataLayout::new(&settings.data_dir);

        let config = source_config(&settings, &layout);

        assert_eq!(config.local_source_path, PathBuf::from("/srv/churn/churn.csv"));
        assert_eq!(
            config.last_update_path,
            PathBuf::from("/srv/churn/last-update.json")
        );
        assert_eq!(
            config.remote_source_url.as_deref(),
            Some("https://example.com/export.csv")
        );
        assert_eq!(config.fetch_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_build_resolver_without_remote() {
        let settings = Settings::load_from_args([
            "churn-report",
            "--sheet-url",
            "",
            "history",
        ]);
        let layout = DataLayout::new("data");
        let resolver = build_resolver(&settings, &layout).unwrap();
        assert_eq!(resolver.config().remote_source_url, None);
        assert_eq!(resolver.config().fetch_timeout, None);
    }
}
