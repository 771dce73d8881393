//! Deterministic quality judge: the acceptance authority of the loop.

use crate::domain::{Curriculum, TopicSpec};
use crate::quality::content_rules::{
    score_effort_coherence, score_learner_coherence, score_mastery_actionability,
    score_redundancy, score_resource_relevance,
};
use crate::quality::structure_rules::{score_atomicity, score_progression, score_structural};
use crate::quality::types::{PedagogyCritique, QualityDimensions, QualityReport};

/// Score a draft across the eight quality dimensions.
///
/// Pure: the draft is never modified. A non-zero `hard_fail_count` blocks
/// acceptance whatever the total.
pub fn evaluate(
    curriculum: &Curriculum,
    topic_spec: &TopicSpec,
    pedagogy: &PedagogyCritique,
) -> QualityReport {
    let nodes = &curriculum.nodes;
    let mut diagnostics = Vec::new();

    let dimensions = QualityDimensions {
        structural_validity: score_structural(nodes, &mut diagnostics),
        atomicity: score_atomicity(nodes, &mut diagnostics),
        pedagogical_progression: score_progression(nodes, &mut diagnostics),
        resource_relevance: score_resource_relevance(nodes, topic_spec, &mut diagnostics),
        mastery_actionability: score_mastery_actionability(nodes, &mut diagnostics),
        effort_coherence: score_effort_coherence(nodes, &mut diagnostics),
        redundancy: score_redundancy(nodes, &mut diagnostics),
        learner_path_coherence: score_learner_coherence(pedagogy, &mut diagnostics),
    };

    let hard_fail_count = diagnostics.iter().filter(|d| d.hard_fail).count();
    QualityReport {
        total_score: dimensions.weighted_total(),
        dimensions,
        hard_fail_count,
        diagnostics,
    }
}
