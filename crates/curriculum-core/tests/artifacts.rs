use curriculum_core::{
    read_curriculum_artifact, read_trace_artifact, verify_artifacts, write_artifacts,
    CurriculumEngine, CurriculumError, TopicSpec,
};
use serde_json::json;
use tempfile::tempdir;

fn optimized() -> curriculum_core::OptimizeResult {
    let topic = TopicSpec::from_value(&json!({
        "goal": "Understand columnar storage formats",
        "scope_in": ["encodings", "compression"],
        "evidence_mode": "strict",
    }))
    .expect("topic spec");
    CurriculumEngine::internal().optimize(&topic).expect("optimize")
}

#[test]
fn artifacts_round_trip_through_digest_check() {
    let dir = tempdir().expect("tempdir");
    let result = optimized();
    let manifest = write_artifacts(&result, dir.path()).expect("write");

    assert_eq!(manifest.topic, "Understand columnar storage formats");
    assert_eq!(manifest.best_score, result.trace.best_score);
    assert_eq!(manifest.curriculum_digest.len(), 64);

    let verified = verify_artifacts(dir.path()).expect("verify");
    assert_eq!(verified, manifest);
    assert_eq!(read_curriculum_artifact(dir.path()).expect("curriculum"), result.curriculum);
    assert_eq!(read_trace_artifact(dir.path()).expect("trace"), result.trace);
}

#[test]
fn tampered_curriculum_fails_digest_check() {
    let dir = tempdir().expect("tempdir");
    write_artifacts(&optimized(), dir.path()).expect("write");

    let path = dir.path().join("curriculum.json");
    let mut text = std::fs::read_to_string(&path).expect("read");
    text = text.replacen("\"N1\"", "\"N0\"", 1);
    std::fs::write(&path, text).expect("tamper");

    let err = read_curriculum_artifact(dir.path()).unwrap_err();
    assert!(matches!(err, CurriculumError::DigestMismatch { .. }));
    assert!(verify_artifacts(dir.path()).is_err());
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn missing_manifest_is_not_found() {
    let dir = tempdir().expect("tempdir");
    let err = verify_artifacts(dir.path()).unwrap_err();
    assert!(matches!(err, CurriculumError::NotFound(_)));
    assert_eq!(err.exit_code(), 3);
}
