//! Synthesis of a single curriculum node from its ordinal position.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{node_id, index_from_id, CurriculumNode, MasteryCheck, Resource};
use crate::obs;
use crate::planning::spec::GenerationSpec;
use crate::resources::{meets_evidence_contract, ResourceRequest, ResourceResolver};

/// Pedagogical stage derived from a node's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStage {
    Foundation,
    Application,
    Integration,
    Validation,
}

impl NodeStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Foundation => "foundation",
            Self::Application => "application",
            Self::Integration => "integration",
            Self::Validation => "validation",
        }
    }

    fn core_idea(self) -> &'static str {
        match self {
            Self::Foundation => "Vocabulary and conceptual boundaries for reliable reasoning.",
            Self::Application => "Implementation mechanics and failure surface of the approach.",
            Self::Integration => "Dependency interactions and coupling management across nodes.",
            Self::Validation => "Verification criteria, regression checks, and evidence traceability.",
        }
    }

    fn pitfall(self) -> &'static str {
        match self {
            Self::Foundation => "Skipping precise definitions and relying on vague intuition.",
            Self::Application => "Implementing quickly without evaluating constraints and edge cases.",
            Self::Integration => "Combining components without explicit interface contracts.",
            Self::Validation => "Declaring success without reproducible quality checks.",
        }
    }
}

/// Stage for position `index` of `total` nodes, by quartile.
pub fn stage_for_index(index: usize, total: usize) -> NodeStage {
    if total <= 3 {
        return [
            NodeStage::Foundation,
            NodeStage::Application,
            NodeStage::Validation,
        ][index.min(2)];
    }
    if index <= (total / 4).max(1) {
        NodeStage::Foundation
    } else if index <= (total * 2 / 4).max(2) {
        NodeStage::Application
    } else if index <= (total * 3 / 4).max(3) {
        NodeStage::Integration
    } else {
        NodeStage::Validation
    }
}

/// Prerequisite ids for position `index`.
///
/// Always the immediate predecessor; a second hop once integration starts
/// (from the fourth node on) and a third hop in validation (from the sixth
/// node on). Capped at `max_prerequisites`.
pub fn node_prerequisites(index: usize, total: usize, max_prerequisites: usize) -> Vec<String> {
    if index == 0 {
        return Vec::new();
    }
    let stage = stage_for_index(index, total);
    let mut prerequisites = vec![node_id(index - 1)];
    if max_prerequisites >= 2
        && index >= 3
        && matches!(stage, NodeStage::Integration | NodeStage::Validation)
    {
        prerequisites.push(node_id(index - 2));
    }
    if max_prerequisites >= 3 && index >= 5 && stage == NodeStage::Validation {
        prerequisites.push(node_id(index - 4));
    }
    let mut seen = BTreeSet::new();
    prerequisites.retain(|id| seen.insert(id.clone()));
    prerequisites.truncate(max_prerequisites);
    prerequisites
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn node_capability(title: &str, stage: NodeStage) -> String {
    let cleaned = collapse_whitespace(title).to_lowercase();
    match stage {
        NodeStage::Foundation => format!("Define {cleaned} with precise concepts and assumptions."),
        NodeStage::Application => format!("Implement {cleaned} in a runnable workflow."),
        NodeStage::Integration => format!("Integrate {cleaned} with prior components."),
        NodeStage::Validation => {
            format!("Validate {cleaned} end-to-end with explicit quality criteria and evidence.")
        }
    }
}

pub fn node_core_ideas(title: &str, stage: NodeStage) -> Vec<String> {
    let lower = title.to_lowercase();
    vec![
        format!("Core mechanism of {lower}."),
        format!("Assumptions and constraints behind {lower}."),
        stage.core_idea().to_string(),
    ]
}

/// Two pitfalls, round-robin from the misconception pool when it is non-empty.
pub fn node_pitfalls(index: usize, misconceptions: &[String], stage: NodeStage) -> Vec<String> {
    if misconceptions.is_empty() {
        return vec![
            stage.pitfall().to_string(),
            "Confusing familiarity with demonstrated mastery.".to_string(),
        ];
    }
    let n = misconceptions.len();
    vec![
        misconceptions[index % n].clone(),
        misconceptions[(index + 1) % n].clone(),
    ]
}

/// Stage-templated mastery check, anchored to context-pack outcomes and paths.
pub fn node_mastery(id: &str, title: &str, stage: NodeStage, spec: &GenerationSpec) -> MasteryCheck {
    let ordinal = index_from_id(id).unwrap_or(0);
    let pack = spec.topic_spec.context_pack.as_ref();

    let outcome_hint = match pack.filter(|p| !p.required_outcomes.is_empty()) {
        Some(p) => format!(
            "produce `{}`",
            p.required_outcomes[ordinal % p.required_outcomes.len()]
        ),
        None => "produce a concrete artifact".to_string(),
    };
    let local_hint = match pack.filter(|p| !p.local_paths.is_empty()) {
        Some(p) => format!(
            " using `{}` as a primary reference",
            p.local_paths[ordinal % p.local_paths.len()]
        ),
        None => String::new(),
    };

    let (task, pass_criteria) = match stage {
        NodeStage::Foundation => (
            format!(
                "Write a concise technical note for {title}{local_hint} and {outcome_hint} \
                 that states assumptions and one counterexample."
            ),
            "Pass criteria: must include precise definitions, explicit assumptions, \
             and one counterexample that demonstrates a real boundary condition.",
        ),
        NodeStage::Application => (
            format!(
                "Implement a minimal working example for {title}{local_hint}, execute it, \
                 and document one failure mode with mitigation."
            ),
            "Pass criteria: implementation must run successfully, include interpretable \
             output, and document mitigation for the stated failure mode.",
        ),
        NodeStage::Integration => (
            format!(
                "Integrate {title} with outputs from prerequisite nodes{local_hint}, then \
                 write an interface decision record covering trade-offs."
            ),
            "Pass criteria: integration must be functional, dependencies must be explicit, \
             and trade-offs must include concrete evidence.",
        ),
        NodeStage::Validation => (
            format!(
                "Run a verification pass for {title}{local_hint}: include tests, a quality \
                 checklist, and a short risk memo with next actions."
            ),
            "Pass criteria: include tests/checks, explicit acceptance criteria, and a risk memo. \
             Failures must be explained and next actions prioritized.",
        ),
    };

    MasteryCheck {
        task,
        pass_criteria: pass_criteria.to_string(),
    }
}

/// Ask `resolver` for a node's resources; warns when the evidence contract is unmet.
pub fn resolve_resources(
    resolver: &dyn ResourceResolver,
    request: &ResourceRequest<'_>,
) -> Vec<Resource> {
    let resources = resolver.resolve(request);
    if !meets_evidence_contract(&resources, request.evidence_mode) {
        obs::emit_resolver_contract_violation(
            request.node_id,
            request.evidence_mode.as_str(),
            resources.len(),
        );
    }
    resources
}

/// Build node `index` of the plan.
pub fn build_node(
    index: usize,
    spec: &GenerationSpec,
    resolver: &dyn ResourceResolver,
    used_resource_urls: &BTreeSet<String>,
) -> CurriculumNode {
    let id = node_id(index);
    let title = spec
        .titles
        .get(index)
        .cloned()
        .unwrap_or_else(|| format!("Applied implementation cycle {}", index + 1));
    let stage = stage_for_index(index, spec.target_nodes);
    let prerequisites =
        node_prerequisites(index, spec.target_nodes, spec.max_prerequisites_per_node);

    let resources = resolve_resources(
        resolver,
        &ResourceRequest {
            topic_spec: &spec.topic_spec,
            node_id: &id,
            node_index: index,
            node_title: &title,
            prerequisites: &prerequisites,
            evidence_mode: spec.evidence_mode,
            used_resource_urls,
        },
    );

    let estimate_confidence = spec
        .strict_mode
        .then(|| round2((0.6 + index as f64 * 0.025).min(0.9)));

    CurriculumNode {
        capability: node_capability(&title, stage),
        core_ideas: node_core_ideas(&title, stage),
        pitfalls: node_pitfalls(index, &spec.misconceptions, stage),
        mastery_check: node_mastery(&id, &title, stage, spec),
        estimate_minutes: spec.minutes.get(index).copied().unwrap_or(90),
        id,
        title,
        prerequisites,
        resources,
        estimate_confidence,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
