mod bootstrap;
mod render;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use churn_core::models::Dataset;
use churn_core::settings::{Command, Settings};
use churn_core::ChurnError;
use churn_data::history::{FileHistory, SnapshotHistory};
use churn_data::layout::DataLayout;
use churn_data::upload::record_upload;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("churn-report v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!(
        "Data dir: {}, remote: {}, timezone: {}",
        settings.data_dir.display(),
        settings.sheet_url.as_deref().unwrap_or("none"),
        settings.timezone
    );

    let layout = DataLayout::new(&settings.data_dir);

    let output = match &settings.command {
        Command::Company => {
            let dataset = load_dataset(&settings, &layout).await?;
            if settings.json_output() {
                to_json(&render::company_json(&dataset))?
            } else {
                render::company_text(&dataset, &settings.timezone)
            }
        }

        Command::Director { name } => {
            let dataset = load_dataset(&settings, &layout).await?;
            let director = dataset
                .resolve_director(name)
                .ok_or_else(|| ChurnError::UnknownDirector(name.clone()))?;
            let summary = dataset.director_summary(director);
            let rows = dataset.rows_for_director(director);
            if settings.json_output() {
                to_json(&render::director_json(&dataset, &summary, &rows))?
            } else {
                render::director_text(&dataset, &summary, &rows, &settings.timezone)
            }
        }

        Command::History => {
            let entries = FileHistory::new(layout.history_dir()).list();
            if settings.json_output() {
                to_json(&render::history_json(&entries))?
            } else {
                render::history_text(&entries, &settings.timezone)
            }
        }

        Command::Upload { file } => {
            let entry = upload_file(&layout, file)?;
            if settings.json_output() {
                to_json(&entry)?
            } else {
                render::upload_text(&entry, &settings.timezone)
            }
        }
    };

    println!("{}", output);
    Ok(())
}

async fn load_dataset(settings: &Settings, layout: &DataLayout) -> Result<Dataset> {
    let resolver = bootstrap::build_resolver(settings, layout)?;
    let dataset = resolver
        .load_dataset(settings.snapshot.as_deref())
        .await
        .with_context(|| format!("loading data from {}", layout.root().display()))?;
    Ok(dataset)
}

fn upload_file(layout: &DataLayout, file: &Path) -> Result<churn_data::history::HistoryEntry> {
    let contents =
        std::fs::read(file).with_context(|| format!("reading upload {}", file.display()))?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(record_upload(layout, &filename, &contents, Utc::now())?)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
