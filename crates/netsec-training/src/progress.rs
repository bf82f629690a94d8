use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    DataIngestion,
    DataValidation,
    DataTransformation,
    ModelTrainer,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::DataIngestion => "data ingestion",
            Self::DataValidation => "data validation",
            Self::DataTransformation => "data transformation",
            Self::ModelTrainer => "model trainer",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started { run_id: String },
    StageStarted { run_id: String, stage: Stage },
    StageCompleted { run_id: String, stage: Stage, artifact: serde_json::Value },
    Finished { run_id: String },
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

/// Prints each stage's artifact as it is produced.
#[derive(Debug, Default)]
pub struct StdoutProgressSink;

impl ProgressSink for StdoutProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { run_id } => println!("[run:{run_id}] started"),
            ProgressEvent::StageStarted { run_id, stage } => println!("[run:{run_id}] {stage} started"),
            ProgressEvent::StageCompleted { run_id, stage, artifact } => {
                let body = serde_json::to_string_pretty(&artifact).unwrap_or_else(|_| artifact.to_string());
                println!("[run:{run_id}] {stage} completed\n{body}");
            }
            ProgressEvent::Finished { run_id } => println!("[run:{run_id}] finished"),
        }
    }
}

#[derive(Debug, Default)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn on_event(&self, _event: ProgressEvent) {}
}
