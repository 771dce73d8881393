//! Pedagogy critic: learner-path defects a novice would trip over.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Curriculum, CurriculumNode, TopicSpec};
use crate::quality::tokens;
use crate::quality::types::{Diagnostic, PedagogyCritique, RuleId, Severity};

const MIN_CRITIC_SCORE: u32 = 72;
const WORKLOAD_JUMP_FACTOR: f64 = 2.2;

fn peak_prerequisite_estimate(node: &CurriculumNode, by_id: &BTreeMap<&str, &CurriculumNode>) -> u32 {
    node.prerequisites
        .iter()
        .filter_map(|id| by_id.get(id.as_str()))
        .map(|parent| parent.estimate_minutes)
        .max()
        .unwrap_or(0)
}

/// Critique a draft. Pure; diagnostics are never hard fails here.
///
/// Score is `max(0, 100 - 18*high - 9*medium - 4*low)`, with critical
/// counted as high. Minimum quality needs no high findings and score >= 72.
/// The current rules read only the curriculum graph, not `_topic_spec`.
pub fn critique(curriculum: &Curriculum, _topic_spec: &TopicSpec) -> PedagogyCritique {
    let by_id: BTreeMap<&str, &CurriculumNode> = curriculum
        .nodes
        .iter()
        .map(|node| (node.id.as_str(), node))
        .collect();
    let mut diagnostics = Vec::new();

    for node in &curriculum.nodes {
        let title_tokens = tokens(&node.title);
        let capability_tokens = tokens(&node.capability);

        if node.prerequisites.is_empty()
            && (capability_tokens.contains("integrate")
                || capability_tokens.contains("validate")
                || title_tokens.contains("integration"))
        {
            diagnostics.push(
                Diagnostic::new(
                    RuleId::HiddenPrerequisite,
                    Severity::High,
                    "Node appears advanced but has no prerequisites.",
                )
                .for_node(&node.id),
            );
        }

        if node.prerequisites.len() >= 3 {
            diagnostics.push(
                Diagnostic::new(
                    RuleId::PrerequisiteOverload,
                    Severity::Medium,
                    "Too many prerequisites may increase novice confusion.",
                )
                .for_node(&node.id),
            );
        }

        if !node.prerequisites.is_empty() {
            let bridged = node
                .prerequisites
                .iter()
                .filter_map(|id| by_id.get(id.as_str()))
                .any(|parent| {
                    let parent_tokens: BTreeSet<String> = tokens(&parent.title)
                        .into_iter()
                        .chain(tokens(&parent.capability))
                        .collect();
                    !title_tokens.is_disjoint(&parent_tokens)
                });
            if !bridged {
                diagnostics.push(
                    Diagnostic::new(
                        RuleId::ConceptJump,
                        Severity::Medium,
                        "Weak lexical bridge with prerequisites suggests a concept jump.",
                    )
                    .for_node(&node.id),
                );
            }
        }

        let peak = peak_prerequisite_estimate(node, &by_id);
        if peak > 0 && f64::from(node.estimate_minutes) > (f64::from(peak) * WORKLOAD_JUMP_FACTOR).floor() {
            diagnostics.push(
                Diagnostic::new(
                    RuleId::WorkloadJump,
                    Severity::Medium,
                    "Workload jump versus prerequisites may be too abrupt.",
                )
                .for_node(&node.id),
            );
        }
    }

    let count = |pred: fn(Severity) -> bool| {
        u32::try_from(diagnostics.iter().filter(|d| pred(d.severity)).count()).unwrap_or(u32::MAX)
    };
    let high = count(Severity::is_high_or_critical);
    let medium = count(|s| s == Severity::Medium);
    let low = count(|s| s == Severity::Low);
    let penalty = high
        .saturating_mul(18)
        .saturating_add(medium.saturating_mul(9))
        .saturating_add(low.saturating_mul(4));
    let score = 100u32.saturating_sub(penalty);
    let min_quality_met = high == 0 && score >= MIN_CRITIC_SCORE;
    let summary = if min_quality_met {
        "Pedagogy critique indicates acceptable novice progression."
    } else {
        "Pedagogy critique found progression/coherence issues."
    };

    PedagogyCritique {
        score,
        min_quality_met,
        summary: summary.to_string(),
        diagnostics,
    }
}
