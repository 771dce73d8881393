//! Draft proposal: assemble every node, optionally revised by a generator.

use std::collections::BTreeSet;

use serde_json::json;

use crate::domain::{node_id, Curriculum, CurriculumError, OpenQuestion, Result};
use crate::generation::{compact_curriculum, compact_topic_spec, GenerationClient};
use crate::planning::node_builder::build_node;
use crate::planning::spec::GenerationSpec;
use crate::policy::ModelPolicy;
use crate::resources::ResourceResolver;

const STAGE: &str = "proposer";
const SCHEMA: &str = "proposer_curriculum_v1";

/// Build the deterministic draft for `spec`.
///
/// URLs picked for earlier nodes are passed to the resolver for later ones
/// so it can avoid repeats.
pub fn draft_curriculum(spec: &GenerationSpec, resolver: &dyn ResourceResolver) -> Curriculum {
    let mut used_urls = BTreeSet::new();
    let mut nodes = Vec::with_capacity(spec.target_nodes);
    for index in 0..spec.target_nodes {
        let node = build_node(index, spec, resolver, &used_urls);
        used_urls.extend(node.resources.iter().map(|r| r.url.clone()));
        nodes.push(node);
    }

    let open_questions = spec.strict_mode.then(|| {
        let last = spec.target_nodes.saturating_sub(1);
        vec![OpenQuestion {
            question: "Which claims remain weakly evidenced or contradictory for this topic \
                       under current references?"
                .to_string(),
            related_nodes: vec![node_id(last.saturating_sub(1)), node_id(last)],
            status: "open".to_string(),
        }]
    });

    Curriculum {
        topic: spec.topic_label.clone(),
        nodes,
        open_questions,
    }
}

/// Proposal stage of the loop.
pub struct Proposer<'a> {
    client: Option<&'a GenerationClient>,
}

impl<'a> Proposer<'a> {
    pub fn new(client: Option<&'a GenerationClient>) -> Self {
        Self { client }
    }

    /// Propose the initial draft.
    ///
    /// With the internal provider the deterministic draft is returned as is.
    /// Otherwise the draft is sent to the generator, whose response must hold
    /// a `curriculum` object of the draft's shape.
    pub fn propose(
        &self,
        spec: &GenerationSpec,
        resolver: &dyn ResourceResolver,
        policy: &ModelPolicy,
    ) -> Result<Curriculum> {
        let draft = draft_curriculum(spec, resolver);
        if policy.provider.is_internal() {
            return Ok(draft);
        }
        let client = self.client.ok_or_else(|| {
            CurriculumError::Config(format!(
                "provider {} requires a text generator",
                policy.provider.as_str()
            ))
        })?;

        let payload = json!({
            "topic_spec": compact_topic_spec(&spec.topic_spec),
            "draft_curriculum": compact_curriculum(&draft),
            "requirements": {
                "strict_atomic_nodes": true,
                "must_remain_dag": true,
            },
        });
        let response = client.run_json(STAGE, SCHEMA, payload)?;
        match response.get("curriculum") {
            Some(candidate) if candidate.is_object() => Curriculum::from_value(STAGE, candidate),
            _ => Err(CurriculumError::internal(
                STAGE,
                "generator returned invalid curriculum payload",
            )),
        }
    }
}
