//! Config command implementation.

use anyhow::Context;
use netsec_training::Settings;
use std::path::Path;

/// Print the settings after file and environment overrides are applied.
pub fn execute(config: Option<&Path>) -> anyhow::Result<()> {
    let mut settings = Settings::load(config).context("Failed to load settings")?;
    if settings.ingestion.mongodb_url.is_some() {
        settings.ingestion.mongodb_url = Some("<redacted>".to_string());
    }
    let rendered = toml::to_string_pretty(&settings).context("Failed to render settings")?;
    print!("{rendered}");
    Ok(())
}
