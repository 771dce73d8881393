use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use curriculum_core::generation::compact_curriculum;
use curriculum_core::{
    CurriculumEngine, CurriculumError, GenerationRequest, GeneratorFailure, ModelPolicy,
    ModelProvider, TextGenerator, TopicSpec,
};
use serde_json::{json, Value};

fn remote_policy(retry_budget: u32) -> ModelPolicy {
    ModelPolicy {
        provider: ModelProvider::RemoteLlm,
        model_id: "stub-model".into(),
        retry_budget,
        ..ModelPolicy::default()
    }
}

fn topic() -> TopicSpec {
    TopicSpec::from_value(&json!({
        "goal": "Harden container runtimes",
        "scope_in": ["namespaces", "seccomp"],
    }))
    .expect("topic spec")
}

/// Returns the submitted draft unchanged after `failures` transient errors.
struct EchoDraft {
    calls: AtomicU32,
    failures: u32,
}

impl TextGenerator for EchoDraft {
    fn run(&self, request: &GenerationRequest) -> Result<Value, GeneratorFailure> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            return Err(GeneratorFailure::Retryable("upstream timeout".into()));
        }
        assert_eq!(request.stage, "proposer");
        assert_eq!(request.model_id, "stub-model");
        Ok(json!({"curriculum": request.payload["draft_curriculum"].clone()}))
    }
}

#[test]
fn compact_draft_is_rejected_as_ill_shaped() {
    let generator = Arc::new(EchoDraft {
        calls: AtomicU32::new(0),
        failures: 1,
    });
    let engine = CurriculumEngine::new(remote_policy(1), None, Some(generator.clone()))
        .expect("engine");
    let err = engine.optimize(&topic()).unwrap_err();

    assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    match err {
        CurriculumError::Internal { stage, .. } => assert_eq!(stage, "proposer"),
        other => panic!("expected Internal, got {other:?}"),
    }
}

/// Returns a fully shaped curriculum.
struct FullDraft(Value);

impl TextGenerator for FullDraft {
    fn run(&self, _request: &GenerationRequest) -> Result<Value, GeneratorFailure> {
        Ok(json!({"curriculum": self.0.clone()}))
    }
}

#[test]
fn well_shaped_external_draft_enters_the_loop() {
    let internal = CurriculumEngine::internal().optimize(&topic()).expect("internal");
    let mut external = internal.curriculum.clone();
    external.topic = "Harden container runtimes (revised)".into();
    let generator = Arc::new(FullDraft(serde_json::to_value(&external).expect("json")));

    let engine = CurriculumEngine::new(remote_policy(0), None, Some(generator)).expect("engine");
    let result = engine.optimize(&topic()).expect("optimize");
    assert_eq!(result.curriculum.topic, "Harden container runtimes (revised)");
    assert_eq!(result.trace.iterations[0].model_policy["provider"], "remote_llm");
    assert!(compact_curriculum(&result.curriculum)["nodes"].is_array());
}

#[test]
fn exhausted_retries_surface_generation_error() {
    let generator = Arc::new(EchoDraft {
        calls: AtomicU32::new(0),
        failures: 10,
    });
    let engine = CurriculumEngine::new(remote_policy(2), None, Some(generator.clone()))
        .expect("engine");
    let err = engine.optimize(&topic()).unwrap_err();

    assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
    assert!(matches!(err, CurriculumError::Generation { attempts: 3, .. }));
    assert_eq!(err.exit_code(), 10);
}

#[test]
fn fatal_failure_is_not_retried() {
    struct Refuses;
    impl TextGenerator for Refuses {
        fn run(&self, _request: &GenerationRequest) -> Result<Value, GeneratorFailure> {
            Err(GeneratorFailure::Fatal("quota exceeded".into()))
        }
    }
    let engine = CurriculumEngine::new(remote_policy(5), None, Some(Arc::new(Refuses)))
        .expect("engine");
    let err = engine.optimize(&topic()).unwrap_err();
    assert!(matches!(err, CurriculumError::Generation { attempts: 1, .. }));
    assert!(err.to_string().contains("quota exceeded"));
}
