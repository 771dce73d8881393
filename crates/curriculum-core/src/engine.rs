//! Engine facade: one entry point per topic spec.

use std::sync::Arc;

use crate::domain::{Curriculum, CurriculumError, Result, TopicSpec};
use crate::generation::{GenerationClient, TextGenerator};
use crate::optimizer::{LoopController, OptimizeResult};
use crate::planning::GenerationSpec;
use crate::policy::ModelPolicy;
use crate::quality::{critique, evaluate, PedagogyCritique, QualityReport};
use crate::resources::{default_resource_resolver, ResourceResolver};

/// Curriculum engine configured once and reused across topic specs.
///
/// Holds no mutable state, so one engine can serve parallel `optimize`
/// calls from worker threads.
#[derive(Clone)]
pub struct CurriculumEngine {
    policy: ModelPolicy,
    resolver: Option<Arc<dyn ResourceResolver>>,
    client: Option<GenerationClient>,
}

impl std::fmt::Debug for CurriculumEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurriculumEngine")
            .field("policy", &self.policy)
            .field("custom_resolver", &self.resolver.is_some())
            .field("client", &self.client)
            .finish()
    }
}

impl CurriculumEngine {
    /// Build an engine.
    ///
    /// Without a resolver each topic spec gets [`default_resource_resolver`].
    /// A non-internal provider requires `generator`.
    pub fn new(
        policy: ModelPolicy,
        resolver: Option<Arc<dyn ResourceResolver>>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Result<Self> {
        policy.validate()?;
        if !policy.provider.is_internal() && generator.is_none() {
            return Err(CurriculumError::Config(format!(
                "provider {} requires a text generator",
                policy.provider.as_str()
            )));
        }
        let client = generator.map(|g| GenerationClient::new(g, &policy));
        Ok(Self {
            policy,
            resolver,
            client,
        })
    }

    /// Engine with the default policy and resolvers.
    pub fn internal() -> Self {
        Self {
            policy: ModelPolicy::default(),
            resolver: None,
            client: None,
        }
    }

    pub fn policy(&self) -> &ModelPolicy {
        &self.policy
    }

    pub fn optimize(&self, topic_spec: &TopicSpec) -> Result<OptimizeResult> {
        let spec = GenerationSpec::from_topic_spec(topic_spec);
        let resolver = self
            .resolver
            .clone()
            .unwrap_or_else(|| default_resource_resolver(topic_spec));
        LoopController::new(&self.policy, resolver.as_ref(), self.client.as_ref()).run(&spec)
    }

    /// Parse a raw topic spec payload and optimize it.
    pub fn generate_curriculum(&self, raw_topic_spec: &serde_json::Value) -> Result<OptimizeResult> {
        let topic_spec = TopicSpec::from_value(raw_topic_spec)?;
        self.optimize(&topic_spec)
    }
}

/// Critique and judge an existing curriculum without modifying it.
pub fn score_curriculum(
    curriculum: &Curriculum,
    topic_spec: &TopicSpec,
) -> (PedagogyCritique, QualityReport) {
    let pedagogy = critique(curriculum, topic_spec);
    let report = evaluate(curriculum, topic_spec, &pedagogy);
    (pedagogy, report)
}
