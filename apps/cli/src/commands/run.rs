//! Run command implementation.

use anyhow::Context;
use colored::Colorize;
use netsec_training::{NoopProgressSink, ProgressSink, Settings, StdoutProgressSink, TrainingPipeline};
use std::path::Path;
use tracing::error;

/// Execute the run command.
///
/// Builds the configured document source, runs all four stages and prints
/// the trained model's scores.
pub fn execute(config: Option<&Path>, seed: Option<u64>, quiet: bool) -> anyhow::Result<()> {
    let mut settings = Settings::load(config)
        .inspect_err(|err| error!(phase = "setup", error = %err, "failed to load settings"))
        .context("Failed to load settings")?;
    if seed.is_some() {
        settings.ingestion.seed = seed;
    }

    let source = settings
        .ingestion
        .document_source()
        .inspect_err(|err| error!(phase = "setup", error = %err, "failed to build document source"))
        .context("Failed to build document source")?;
    let pipeline = TrainingPipeline::new(settings, source.as_ref());

    println!("{}", "netsec run".bold().cyan());
    println!("  {} Artifacts: {}", "•".dimmed(), pipeline.config().artifact_dir().display());
    println!();

    let sink: &dyn ProgressSink = if quiet { &NoopProgressSink } else { &StdoutProgressSink };
    let outcome = pipeline.run(sink).context("Training pipeline failed")?;

    let train = outcome.trainer.train_metric_artifact;
    let test = outcome.trainer.test_metric_artifact;

    println!();
    println!("{}", "✓ Training complete".green().bold());
    println!("  {} Model: {}", "•".dimmed(), outcome.trainer.trained_model_file_path.display());
    println!(
        "  {} Train: f1={:.4} precision={:.4} recall={:.4} accuracy={:.4}",
        "•".dimmed(),
        train.f1_score,
        train.precision_score,
        train.recall_score,
        train.accuracy
    );
    println!(
        "  {} Test:  f1={:.4} precision={:.4} recall={:.4} accuracy={:.4}",
        "•".dimmed(),
        test.f1_score,
        test.precision_score,
        test.recall_score,
        test.accuracy
    );
    if outcome.validation.drift_detected {
        println!("  {} {}", "!".yellow(), "Drift detected between train and test splits".yellow());
    }

    Ok(())
}
