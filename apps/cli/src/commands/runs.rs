//! Runs command implementation.

use anyhow::Context;
use colored::Colorize;
use netsec_training::{discover_runs, resolve_run_model, Settings};
use std::path::Path;

/// Execute the runs command.
pub fn execute(config: Option<&Path>, json: bool, model: Option<&str>) -> anyhow::Result<()> {
    let settings = Settings::load(config).context("Failed to load settings")?;
    let root = settings.pipeline.artifact_root.as_path();

    if let Some(run_id) = model {
        let path = resolve_run_model(root, run_id)?;
        println!("{}", path.display());
        return Ok(());
    }

    let runs = discover_runs(root).with_context(|| format!("Failed to scan {}", root.display()))?;

    if json {
        let manifests: Vec<_> = runs.iter().map(|r| &r.manifest).collect();
        println!("{}", serde_json::to_string_pretty(&manifests)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!("{}", format!("No completed runs under {}", root.display()).yellow());
        return Ok(());
    }

    println!("{}", format!("Runs under {}", root.display()).bold().cyan());
    println!();
    for run in &runs {
        let m = &run.manifest;
        let drift = if m.drift_detected { "drift".yellow() } else { "no drift".green() };
        println!(
            "  {} {}  test f1={:.4}  train f1={:.4}  {}",
            "•".dimmed(),
            run.run_id.bold(),
            m.test_metrics.f1_score,
            m.train_metrics.f1_score,
            drift
        );
    }
    println!();
    println!("{}", format!("{} run(s)", runs.len()).dimmed());

    Ok(())
}
