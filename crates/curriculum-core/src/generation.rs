//! Boundary to an optional external text-generation collaborator.
//!
//! The engine never talks to a model directly. A [`TextGenerator`] is
//! injected by the caller and wrapped in a [`GenerationClient`] that applies
//! the policy's timeout and retry budget.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};

use crate::domain::{Curriculum, CurriculumError, Result, TopicSpec};
use crate::policy::ModelPolicy;

/// One structured request to a generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub stage: String,
    pub schema_name: String,
    pub payload: Value,
    pub model_id: String,
    pub timeout: Duration,
}

/// Failure reported by a generator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorFailure {
    /// Transient; the client may try again within its budget.
    #[error("retryable: {0}")]
    Retryable(String),
    #[error("fatal: {0}")]
    Fatal(String),
}

/// Produces a JSON object for a stage request.
pub trait TextGenerator: Send + Sync {
    fn run(&self, request: &GenerationRequest) -> std::result::Result<Value, GeneratorFailure>;
}

/// Deterministic echo used by the internal provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct InternalTextGenerator;

impl TextGenerator for InternalTextGenerator {
    fn run(&self, request: &GenerationRequest) -> std::result::Result<Value, GeneratorFailure> {
        Ok(json!({
            "stage": request.stage,
            "schema_name": request.schema_name,
            "model": request.model_id,
            "status": "ok",
        }))
    }
}

/// Generator wrapped with the policy's timeout and retry budget.
#[derive(Clone)]
pub struct GenerationClient {
    generator: Arc<dyn TextGenerator>,
    model_id: String,
    timeout: Duration,
    retry_budget: u32,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("model_id", &self.model_id)
            .field("timeout", &self.timeout)
            .field("retry_budget", &self.retry_budget)
            .finish_non_exhaustive()
    }
}

impl GenerationClient {
    pub fn new(generator: Arc<dyn TextGenerator>, policy: &ModelPolicy) -> Self {
        Self {
            generator,
            model_id: policy.model_id.clone(),
            timeout: Duration::from_secs(policy.timeout_seconds),
            retry_budget: policy.retry_budget,
        }
    }

    /// Run one stage request and return the response object.
    ///
    /// Retryable failures are retried up to `retry_budget` times. A fatal
    /// failure, an exhausted budget, or a non-object response ends the call.
    pub fn run_json(
        &self,
        stage: &str,
        schema_name: &str,
        payload: Value,
    ) -> Result<Map<String, Value>> {
        let request = GenerationRequest {
            stage: stage.to_string(),
            schema_name: schema_name.to_string(),
            payload,
            model_id: self.model_id.clone(),
            timeout: self.timeout,
        };
        let max_attempts = self.retry_budget.saturating_add(1);
        let mut last_failure = String::new();

        for attempt in 1..=max_attempts {
            match self.generator.run(&request) {
                Ok(Value::Object(map)) => return Ok(map),
                Ok(other) => {
                    return Err(CurriculumError::internal(
                        stage,
                        format!("generator returned non-object payload ({})", kind_of(&other)),
                    ))
                }
                Err(GeneratorFailure::Fatal(detail)) => {
                    return Err(CurriculumError::Generation {
                        stage: stage.to_string(),
                        attempts: attempt,
                        detail,
                    })
                }
                Err(GeneratorFailure::Retryable(detail)) => {
                    tracing::debug!(stage, attempt, max_attempts, %detail, "generator attempt failed");
                    last_failure = detail;
                }
            }
        }

        Err(CurriculumError::Generation {
            stage: stage.to_string(),
            attempts: max_attempts,
            detail: last_failure,
        })
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Project a draft to the fields a generator needs to revise it.
pub fn compact_curriculum(curriculum: &Curriculum) -> Value {
    let nodes: Vec<Value> = curriculum
        .nodes
        .iter()
        .map(|node| {
            json!({
                "id": node.id,
                "title": node.title,
                "prerequisites": node.prerequisites,
                "estimate_minutes": node.estimate_minutes,
            })
        })
        .collect();
    let mut compact = json!({"topic": curriculum.topic, "nodes": nodes});
    if let Some(questions) = &curriculum.open_questions {
        compact["open_questions"] = json!(questions);
    }
    compact
}

fn capped(items: &[String], limit: usize) -> Vec<&str> {
    items.iter().take(limit).map(String::as_str).collect()
}

/// Project a topic spec to stable, size-bounded fields.
pub fn compact_topic_spec(spec: &TopicSpec) -> Value {
    let mut compact = json!({
        "goal": spec.goal,
        "audience": spec.audience,
        "domain_mode": spec.domain_mode,
        "evidence_mode": spec.evidence_mode,
        "spec_version": spec.spec_version,
        "constraints": spec.constraints,
        "misconceptions": capped(&spec.misconceptions, 16),
        "prerequisites": capped(&spec.prerequisites, 24),
        "scope_in": capped(&spec.scope_in, 60),
        "scope_out": capped(&spec.scope_out, 24),
    });
    if let Some(pack) = &spec.context_pack {
        let mut context = json!({
            "focus_terms": capped(&pack.focus_terms, 24),
            "required_outcomes": capped(&pack.required_outcomes, 24),
            "local_paths": capped(&pack.local_paths, 16),
        });
        if let Some(domain) = &pack.domain {
            context["domain"] = json!(domain);
        }
        compact["context_pack"] = context;
    }
    compact
}
