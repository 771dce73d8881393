//! Graph-oriented scoring rules: structure, atomicity, progression.

use std::collections::BTreeSet;

use crate::dag;
use crate::domain::CurriculumNode;
use crate::quality::types::{Diagnostic, RuleId, Severity};

pub fn score_structural(nodes: &[CurriculumNode], diagnostics: &mut Vec<Diagnostic>) -> u32 {
    let mut score: i64 = 100;
    let ids: BTreeSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    if ids.len() != nodes.len() {
        diagnostics.push(
            Diagnostic::new(
                RuleId::DuplicateNodeIds,
                Severity::Critical,
                "Duplicate node IDs detected.",
            )
            .hard_fail(),
        );
        score -= 60;
    }

    for node in nodes {
        for prereq in &node.prerequisites {
            if !ids.contains(prereq.as_str()) {
                diagnostics.push(
                    Diagnostic::new(
                        RuleId::MissingPrerequisite,
                        Severity::Critical,
                        format!("Prerequisite {prereq} does not exist."),
                    )
                    .for_node(&node.id)
                    .hard_fail(),
                );
                score -= 15;
            }
        }
    }

    if !nodes.is_empty() && !dag::is_acyclic(nodes) {
        diagnostics.push(
            Diagnostic::new(
                RuleId::Cycle,
                Severity::Critical,
                "Cycle detected in prerequisite graph.",
            )
            .hard_fail(),
        );
        score -= 50;
    }
    clamp(score)
}

pub fn score_atomicity(nodes: &[CurriculumNode], diagnostics: &mut Vec<Diagnostic>) -> u32 {
    let mut score: i64 = 100;
    let mut offenders = 0usize;
    for node in nodes {
        let capability = node.capability.to_lowercase();
        if capability.contains(" and ") || capability.contains(';') {
            offenders += 1;
            score -= 12;
            diagnostics.push(
                Diagnostic::new(
                    RuleId::CompoundCapability,
                    Severity::High,
                    "Capability appears compound; should target one primary skill.",
                )
                .for_node(&node.id),
            );
        }
    }
    if !nodes.is_empty() && offenders > (nodes.len() / 4).max(1) {
        diagnostics.push(
            Diagnostic::new(
                RuleId::AtomicityThreshold,
                Severity::Critical,
                "Too many non-atomic nodes.",
            )
            .hard_fail(),
        );
    }
    clamp(score)
}

pub fn score_progression(nodes: &[CurriculumNode], diagnostics: &mut Vec<Diagnostic>) -> u32 {
    let mut score: i64 = 100;
    let all_roots = nodes.iter().all(|n| n.prerequisites.is_empty());
    if nodes.len() >= 4 && all_roots {
        score -= 45;
        diagnostics.push(Diagnostic::new(
            RuleId::AllRoots,
            Severity::High,
            "All nodes are roots; progression is weak.",
        ));
    }
    if nodes.len() >= 6 && dag::max_depth(nodes) < 2 {
        score -= 40;
        diagnostics.push(Diagnostic::new(
            RuleId::DepthTooShallow,
            Severity::High,
            "Graph depth is too shallow for curriculum size.",
        ));
    }
    clamp(score)
}

pub(crate) fn clamp(score: i64) -> u32 {
    u32::try_from(score.clamp(0, 100)).unwrap_or(0)
}
