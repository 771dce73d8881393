//! Compile diagnostics into a ranked, budget-capped action list.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::quality::{Diagnostic, PedagogyCritique, QualityReport, RuleId, Severity};
use crate::repair::actions::{RepairAction, RepairActionType};

/// Below this total the planner always proposes something.
const FALLBACK_SCORE_CEILING: u32 = 85;

/// Action that addresses `rule`, or `None` when no repair applies.
///
/// Structural defects have no repair of their own; they clear once the
/// rewire and rewrite actions regenerate the graph.
pub fn action_for_rule(rule: RuleId) -> Option<RepairActionType> {
    match rule {
        RuleId::DuplicateNodeIds | RuleId::MissingPrerequisite | RuleId::Cycle => None,
        RuleId::CompoundCapability | RuleId::AtomicityThreshold => Some(RepairActionType::RewriteNode),
        RuleId::AllRoots | RuleId::DepthTooShallow => Some(RepairActionType::RewirePrereqs),
        RuleId::ResourceMissing | RuleId::WeakRelevance | RuleId::RepetitiveAnchor => {
            Some(RepairActionType::RetargetResources)
        }
        RuleId::NonActionableTask | RuleId::NonMeasurableCriteria => {
            Some(RepairActionType::RewriteNode)
        }
        RuleId::FlatDistribution | RuleId::EffortOutlier => Some(RepairActionType::RetimeNode),
        RuleId::TitleRepetition => Some(RepairActionType::RewriteNode),
        RuleId::HiddenPrerequisite | RuleId::PrerequisiteOverload => {
            Some(RepairActionType::RewirePrereqs)
        }
        RuleId::ConceptJump => Some(RepairActionType::RewriteNode),
        RuleId::WorkloadJump => Some(RepairActionType::RetimeNode),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairPlanner {
    pub max_actions_per_iteration: usize,
}

impl RepairPlanner {
    pub fn new(max_actions_per_iteration: usize) -> Self {
        Self {
            max_actions_per_iteration,
        }
    }

    /// Plan actions for one iteration.
    ///
    /// Deduplicated by `(action_type, node_id)` keeping the most severe,
    /// ordered by severity desc, node id, then action type. Actions the
    /// executor cannot apply are dropped before the budget is taken.
    pub fn plan(&self, report: &QualityReport, pedagogy: &PedagogyCritique) -> Vec<RepairAction> {
        let mut deduped: BTreeMap<(RepairActionType, Option<String>), RepairAction> = BTreeMap::new();
        for diagnostic in report.diagnostics.iter().chain(&pedagogy.diagnostics) {
            let Some(action) = action_from(diagnostic) else {
                continue;
            };
            let key = (action.action_type, action.node_id.clone());
            match deduped.get(&key) {
                Some(current) if current.severity >= action.severity => {}
                _ => {
                    deduped.insert(key, action);
                }
            }
        }

        let mut ordered: Vec<RepairAction> = deduped
            .into_values()
            .filter(RepairAction::is_applicable)
            .collect();
        ordered.sort_by(|a, b| {
            let key = |x: &RepairAction| {
                (
                    Reverse(x.severity),
                    x.node_id.clone().unwrap_or_default(),
                    x.action_type.as_str(),
                )
            };
            key(a).cmp(&key(b))
        });
        ordered.truncate(self.max_actions_per_iteration);

        if ordered.is_empty() && report.total_score < FALLBACK_SCORE_CEILING {
            ordered.push(RepairAction::new(
                RepairActionType::ReorderNodes,
                "No targeted actions available; normalize progression order.",
                Severity::Low,
            ));
        }
        ordered
    }
}

fn action_from(diagnostic: &Diagnostic) -> Option<RepairAction> {
    let action_type = action_for_rule(diagnostic.rule_id)?;
    Some(
        RepairAction::new(action_type, diagnostic.message.clone(), diagnostic.severity)
            .targeting(diagnostic.node_id.clone()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::QualityDimensions;

    fn report(total: u32, diagnostics: Vec<Diagnostic>) -> QualityReport {
        let dims = QualityDimensions {
            structural_validity: 100,
            atomicity: 100,
            pedagogical_progression: 100,
            resource_relevance: 100,
            mastery_actionability: 100,
            effort_coherence: 100,
            redundancy: 100,
            learner_path_coherence: 100,
        };
        QualityReport {
            dimensions: dims,
            total_score: total,
            hard_fail_count: diagnostics.iter().filter(|d| d.hard_fail).count(),
            diagnostics,
        }
    }

    fn pedagogy(diagnostics: Vec<Diagnostic>) -> PedagogyCritique {
        PedagogyCritique {
            score: 100,
            min_quality_met: true,
            summary: String::new(),
            diagnostics,
        }
    }

    #[test]
    fn test_dedupes_keeping_higher_severity_and_orders() {
        let quality = vec![
            Diagnostic::new(RuleId::WeakRelevance, Severity::Medium, "weak").for_node("N2"),
            Diagnostic::new(RuleId::CompoundCapability, Severity::High, "compound").for_node("N3"),
            Diagnostic::new(RuleId::NonActionableTask, Severity::High, "task").for_node("N1"),
            Diagnostic::new(RuleId::Cycle, Severity::Critical, "cycle"),
        ];
        let critic = vec![
            Diagnostic::new(RuleId::ConceptJump, Severity::Medium, "jump").for_node("N3"),
            Diagnostic::new(RuleId::HiddenPrerequisite, Severity::High, "hidden").for_node("N2"),
        ];
        let actions = RepairPlanner::new(10).plan(&report(70, quality), &pedagogy(critic));
        let summary: Vec<(RepairActionType, Option<&str>, Severity)> = actions
            .iter()
            .map(|a| (a.action_type, a.node_id.as_deref(), a.severity))
            .collect();
        assert_eq!(
            summary,
            vec![
                (RepairActionType::RewriteNode, Some("N1"), Severity::High),
                (RepairActionType::RewirePrereqs, Some("N2"), Severity::High),
                (RepairActionType::RewriteNode, Some("N3"), Severity::High),
                (RepairActionType::RetargetResources, Some("N2"), Severity::Medium),
            ]
        );
        assert_eq!(actions[2].reason, "compound");
    }

    #[test]
    fn test_budget_caps_actions() {
        let quality: Vec<Diagnostic> = (1..=6)
            .map(|i| Diagnostic::new(RuleId::WeakRelevance, Severity::Medium, "w").for_node(format!("N{i}")))
            .collect();
        let actions = RepairPlanner::new(4).plan(&report(80, quality), &pedagogy(vec![]));
        assert_eq!(actions.len(), 4);
        assert_eq!(actions[0].node_id.as_deref(), Some("N1"));
    }

    #[test]
    fn test_fallback_reorder_below_ceiling_only() {
        let planner = RepairPlanner::new(4);
        let actions = planner.plan(&report(84, vec![]), &pedagogy(vec![]));
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, RepairActionType::ReorderNodes);
        assert_eq!(actions[0].severity, Severity::Low);
        assert!(actions[0].node_id.is_none());

        assert!(planner.plan(&report(85, vec![]), &pedagogy(vec![])).is_empty());
        let structural = vec![Diagnostic::new(RuleId::Cycle, Severity::Critical, "c").hard_fail()];
        assert_eq!(
            planner.plan(&report(60, structural), &pedagogy(vec![]))[0].action_type,
            RepairActionType::ReorderNodes
        );
    }

    #[test]
    fn test_untargeted_rewrite_and_retime_do_not_consume_budget() {
        let quality = vec![
            Diagnostic::new(RuleId::AtomicityThreshold, Severity::High, "atomicity"),
            Diagnostic::new(RuleId::FlatDistribution, Severity::Medium, "flat"),
            Diagnostic::new(RuleId::WeakRelevance, Severity::Medium, "weak").for_node("N2"),
        ];
        let actions = RepairPlanner::new(1).plan(&report(70, quality), &pedagogy(vec![]));
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, RepairActionType::RetargetResources);
        assert_eq!(actions[0].node_id.as_deref(), Some("N2"));

        let untargeted = vec![Diagnostic::new(RuleId::EffortOutlier, Severity::Medium, "outlier")];
        let actions = RepairPlanner::new(4).plan(&report(70, untargeted), &pedagogy(vec![]));
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, RepairActionType::ReorderNodes);
    }
}
