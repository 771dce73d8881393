//! Persisted run artifacts with digest verification.
//!
//! Layout of an output directory:
//! - `curriculum.json`: the emitted curriculum
//! - `optimization_trace.json`: the loop trace
//! - `manifest.json`: sha256 of both files plus run metadata

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{content_digest, Curriculum, CurriculumError, Result};
use crate::optimizer::OptimizeResult;
use crate::trace::{OptimizationTrace, StopReason};

pub const CURRICULUM_FILE: &str = "curriculum.json";
pub const TRACE_FILE: &str = "optimization_trace.json";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub topic: String,
    pub best_score: u32,
    pub accepted: bool,
    pub stop_reason: StopReason,
    pub curriculum_digest: String,
    pub trace_digest: String,
    pub generated_at: DateTime<Utc>,
}

/// Write the three artifact files into `dir`, creating it if needed.
pub fn write_artifacts(result: &OptimizeResult, dir: &Path) -> Result<ArtifactManifest> {
    std::fs::create_dir_all(dir)?;

    let curriculum_json = serde_json::to_vec_pretty(&result.curriculum)?;
    let trace_json = serde_json::to_vec_pretty(&result.trace)?;
    let manifest = ArtifactManifest {
        topic: result.curriculum.topic.clone(),
        best_score: result.trace.best_score,
        accepted: result.trace.accepted,
        stop_reason: result.trace.stop_reason,
        curriculum_digest: content_digest(&curriculum_json),
        trace_digest: content_digest(&trace_json),
        generated_at: Utc::now(),
    };

    std::fs::write(dir.join(CURRICULUM_FILE), &curriculum_json)?;
    std::fs::write(dir.join(TRACE_FILE), &trace_json)?;
    std::fs::write(dir.join(MANIFEST_FILE), serde_json::to_vec_pretty(&manifest)?)?;

    tracing::debug!(dir = %dir.display(), digest = %manifest.curriculum_digest, "artifacts written");
    Ok(manifest)
}

/// Check both artifact files against the manifest digests.
pub fn verify_artifacts(dir: &Path) -> Result<ArtifactManifest> {
    let manifest: ArtifactManifest = serde_json::from_slice(&read_artifact(dir, MANIFEST_FILE)?)?;
    check_digest(&read_artifact(dir, CURRICULUM_FILE)?, &manifest.curriculum_digest)?;
    check_digest(&read_artifact(dir, TRACE_FILE)?, &manifest.trace_digest)?;
    Ok(manifest)
}

/// Read and verify `curriculum.json`.
pub fn read_curriculum_artifact(dir: &Path) -> Result<Curriculum> {
    let manifest: ArtifactManifest = serde_json::from_slice(&read_artifact(dir, MANIFEST_FILE)?)?;
    let bytes = read_artifact(dir, CURRICULUM_FILE)?;
    check_digest(&bytes, &manifest.curriculum_digest)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Read and verify `optimization_trace.json`.
pub fn read_trace_artifact(dir: &Path) -> Result<OptimizationTrace> {
    let manifest: ArtifactManifest = serde_json::from_slice(&read_artifact(dir, MANIFEST_FILE)?)?;
    let bytes = read_artifact(dir, TRACE_FILE)?;
    check_digest(&bytes, &manifest.trace_digest)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn read_artifact(dir: &Path, name: &str) -> Result<Vec<u8>> {
    let path = dir.join(name);
    std::fs::read(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CurriculumError::NotFound(path.display().to_string()),
        _ => CurriculumError::Io(e),
    })
}

fn check_digest(bytes: &[u8], expected: &str) -> Result<()> {
    let actual = content_digest(bytes);
    if actual != expected.trim() {
        return Err(CurriculumError::DigestMismatch {
            expected: expected.trim().to_string(),
            actual,
        });
    }
    Ok(())
}
