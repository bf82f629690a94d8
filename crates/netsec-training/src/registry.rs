use crate::artifacts::{ArtifactKind, RunManifest};
use crate::config::RUN_MANIFEST_FILE_NAME;
use crate::error::{PipelineError, PipelineResult};
use crate::fsio::read_json;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A completed run found under the artifact root.
#[derive(Debug, Clone)]
pub struct RunEntry {
    pub run_id: String,
    pub run_dir: PathBuf,
    pub manifest: RunManifest,
}

impl RunEntry {
    #[must_use]
    pub fn model_path(&self) -> Option<&Path> {
        self.manifest.artifact(&ArtifactKind::Model).map(|a| a.path.as_path())
    }
}

/// Lists runs under `artifact_root` that wrote a manifest, oldest first.
///
/// Run directories without a manifest (failed or in-progress runs) are skipped.
pub fn discover_runs(artifact_root: &Path) -> PipelineResult<Vec<RunEntry>> {
    let mut out = Vec::new();

    let dir = match std::fs::read_dir(artifact_root) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(PipelineError::persistence(artifact_root, e)),
    };

    for entry in dir {
        let entry = entry.map_err(|e| PipelineError::persistence(artifact_root, e))?;
        let run_dir = entry.path();
        if !run_dir.is_dir() {
            continue;
        }
        let manifest_path = run_dir.join(RUN_MANIFEST_FILE_NAME);
        if !manifest_path.exists() {
            continue;
        }
        let manifest: RunManifest = read_json(&manifest_path)?;
        out.push(RunEntry { run_id: manifest.run_id.clone(), run_dir, manifest });
    }

    out.sort_by(|a, b| a.manifest.created_at.cmp(&b.manifest.created_at));
    debug!(root = %artifact_root.display(), runs = out.len(), "discovered runs");
    Ok(out)
}

/// Path of the trained model written by run `run_id`.
pub fn resolve_run_model(artifact_root: &Path, run_id: &str) -> PipelineResult<PathBuf> {
    let manifest_path = artifact_root.join(run_id).join(RUN_MANIFEST_FILE_NAME);
    if !manifest_path.exists() {
        return Err(PipelineError::InvalidConfig(format!("run not found (missing manifest): {run_id}")));
    }
    let manifest: RunManifest = read_json(&manifest_path)?;
    manifest
        .artifact(&ArtifactKind::Model)
        .map(|a| a.path.clone())
        .ok_or_else(|| PipelineError::DataFormat(format!("run {run_id} manifest lists no model")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{ClassificationMetricArtifact, RunArtifact};
    use crate::fsio::write_json;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn manifest(run_id: &str, hour: u32) -> RunManifest {
        RunManifest {
            run_id: run_id.to_string(),
            pipeline_name: "NetworkSecurity".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, hour, 0, 0).unwrap(),
            validation_status: true,
            drift_detected: false,
            train_metrics: ClassificationMetricArtifact::default(),
            test_metrics: ClassificationMetricArtifact::default(),
            quality_gate_passed: true,
            artifacts: vec![RunArtifact {
                kind: ArtifactKind::Model,
                path: PathBuf::from(format!("{run_id}/model.json")),
                sha256: String::new(),
            }],
        }
    }

    #[test]
    fn test_missing_root_has_no_runs() {
        let temp = TempDir::new().unwrap();
        assert!(discover_runs(&temp.path().join("Artifacts")).unwrap().is_empty());
    }

    #[test]
    fn test_discovers_runs_oldest_first_and_skips_incomplete() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_json(&root.join("b").join(RUN_MANIFEST_FILE_NAME), &manifest("b", 5)).unwrap();
        write_json(&root.join("a").join(RUN_MANIFEST_FILE_NAME), &manifest("a", 9)).unwrap();
        std::fs::create_dir_all(root.join("failed")).unwrap();

        let runs = discover_runs(root).unwrap();
        let ids: Vec<_> = runs.iter().map(|r| r.run_id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(runs[0].model_path(), Some(Path::new("b/model.json")));
    }

    #[test]
    fn test_resolve_run_model() {
        let temp = TempDir::new().unwrap();
        write_json(&temp.path().join("r1").join(RUN_MANIFEST_FILE_NAME), &manifest("r1", 1)).unwrap();

        assert_eq!(resolve_run_model(temp.path(), "r1").unwrap(), PathBuf::from("r1/model.json"));
        assert!(resolve_run_model(temp.path(), "nope").is_err());
    }
}
