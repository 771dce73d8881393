//! Apply repair actions to a draft.
//!
//! Each action is applied in list order to a private copy of the draft. An
//! action whose target is missing is skipped rather than failing the batch.

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::{index_from_id, Curriculum, CurriculumNode};
use crate::planning::{
    node_core_ideas, node_mastery, node_pitfalls, node_prerequisites, resolve_resources,
    stage_for_index, GenerationSpec,
};
use crate::repair::actions::{RepairAction, RepairActionType};
use crate::resources::{ResourceRequest, ResourceResolver};

const COMPOUND_SEPARATORS: &[&str] = &[" and ", ";", " / ", " + "];
const DEFAULT_MINUTES: u32 = 90;
const MAX_RETIMED_MINUTES: u32 = 220;
const PREREQUISITE_MARGIN_MINUTES: u32 = 10;

pub struct RepairExecutor<'a> {
    spec: &'a GenerationSpec,
    resolver: &'a dyn ResourceResolver,
}

impl<'a> RepairExecutor<'a> {
    pub fn new(spec: &'a GenerationSpec, resolver: &'a dyn ResourceResolver) -> Self {
        Self { spec, resolver }
    }

    /// Return a repaired copy of `curriculum`. The input is never modified.
    pub fn apply(&self, curriculum: &Curriculum, actions: &[RepairAction]) -> Curriculum {
        let mut draft = curriculum.clone();
        for action in actions {
            match action.action_type {
                RepairActionType::ReorderNodes => reorder(&mut draft),
                RepairActionType::SplitNode | RepairActionType::MergeNodes => {
                    debug!(
                        action = action.action_type.as_str(),
                        "structural rewrite not supported; skipping"
                    );
                }
                action_type => {
                    for id in self.targets(&draft, action) {
                        self.apply_to_node(&mut draft, action_type, &id);
                    }
                }
            }
        }
        draft
    }

    /// Node ids an action applies to. Rewire and retarget without a node id
    /// cover the whole graph; rewrite and retime need an explicit node.
    fn targets(&self, draft: &Curriculum, action: &RepairAction) -> Vec<String> {
        match (&action.node_id, action.action_type) {
            (Some(id), _) => vec![id.clone()],
            (None, RepairActionType::RewirePrereqs | RepairActionType::RetargetResources) => {
                draft.nodes.iter().map(|n| n.id.clone()).collect()
            }
            (None, other) => {
                debug!(action = other.as_str(), "action has no target node; skipping");
                Vec::new()
            }
        }
    }

    fn apply_to_node(&self, draft: &mut Curriculum, action_type: RepairActionType, id: &str) {
        let Some(position) = draft.position(id) else {
            debug!(node_id = id, action = action_type.as_str(), "target node missing; skipping");
            return;
        };
        let index = index_from_id(id).unwrap_or(position);

        let updated = match action_type {
            RepairActionType::RewriteNode => self.rewrite(&draft.nodes[position], index),
            RepairActionType::RewirePrereqs => self.rewire(draft, position, index),
            RepairActionType::RetargetResources => self.retarget(draft, position, index),
            RepairActionType::RetimeNode => self.retime(draft, position, index),
            _ => return,
        };
        draft.nodes[position] = updated;
    }

    fn rewrite(&self, node: &CurriculumNode, index: usize) -> CurriculumNode {
        let title = atomic_phrase(&node.title)
            .or_else(|| self.spec.titles.get(index).cloned())
            .unwrap_or_else(|| node.title.clone());
        let stage = stage_for_index(index, self.spec.titles.len());
        let capability = atomic_phrase(&node.capability)
            .unwrap_or_else(|| format!("Implement {}.", title.to_lowercase()));

        CurriculumNode {
            capability,
            core_ideas: node_core_ideas(&title, stage),
            pitfalls: node_pitfalls(index, &self.spec.misconceptions, stage),
            mastery_check: node_mastery(&node.id, &title, stage, self.spec),
            title,
            ..node.clone()
        }
    }

    fn rewire(&self, draft: &Curriculum, position: usize, index: usize) -> CurriculumNode {
        let node = &draft.nodes[position];
        let existing: BTreeSet<&str> = draft.nodes.iter().map(|n| n.id.as_str()).collect();
        let prerequisites = node_prerequisites(
            index,
            draft.nodes.len(),
            self.spec.max_prerequisites_per_node,
        )
        .into_iter()
        .filter(|p| p != &node.id && existing.contains(p.as_str()))
        .collect();
        CurriculumNode {
            prerequisites,
            ..node.clone()
        }
    }

    fn retarget(&self, draft: &Curriculum, position: usize, index: usize) -> CurriculumNode {
        let node = &draft.nodes[position];
        let used: BTreeSet<String> = draft
            .nodes
            .iter()
            .filter(|other| other.id != node.id)
            .flat_map(|other| other.resources.iter().map(|r| r.url.clone()))
            .collect();
        let resources = resolve_resources(
            self.resolver,
            &ResourceRequest {
                topic_spec: &self.spec.topic_spec,
                node_id: &node.id,
                node_index: index,
                node_title: &node.title,
                prerequisites: &node.prerequisites,
                evidence_mode: self.spec.evidence_mode,
                used_resource_urls: &used,
            },
        );
        CurriculumNode {
            resources,
            ..node.clone()
        }
    }

    fn retime(&self, draft: &Curriculum, position: usize, index: usize) -> CurriculumNode {
        let node = &draft.nodes[position];
        let base = self.spec.minutes.get(index).copied().unwrap_or(DEFAULT_MINUTES);
        let longest_prerequisite = node
            .prerequisites
            .iter()
            .filter_map(|p| draft.node(p))
            .map(|p| p.estimate_minutes)
            .max();
        let estimate_minutes = match longest_prerequisite {
            Some(longest) => base
                .max(longest.saturating_add(PREREQUISITE_MARGIN_MINUTES))
                .min(MAX_RETIMED_MINUTES),
            None => base,
        };
        CurriculumNode {
            estimate_minutes,
            ..node.clone()
        }
    }
}

/// Stable sort by prerequisite count, then id.
fn reorder(draft: &mut Curriculum) {
    draft
        .nodes
        .sort_by(|a, b| (a.prerequisites.len(), &a.id).cmp(&(b.prerequisites.len(), &b.id)));
}

/// Leading clause of a compound phrase, capitalized. `None` when empty.
fn atomic_phrase(text: &str) -> Option<String> {
    let text = text.trim();
    let lowered = text.to_ascii_lowercase();
    let head = COMPOUND_SEPARATORS
        .iter()
        .find_map(|sep| lowered.find(sep).map(|at| &text[..at]))
        .unwrap_or(text)
        .trim();
    let mut chars = head.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MasteryCheck, Resource, ResourceKind, ResourceRole, TopicSpec};

    struct Fixed;

    impl ResourceResolver for Fixed {
        fn resolve(&self, request: &ResourceRequest<'_>) -> Vec<Resource> {
            vec![Resource {
                title: format!("Guide for {}", request.node_title),
                url: format!("https://example.org/{}", request.node_id),
                kind: ResourceKind::Doc,
                role: ResourceRole::Definition,
                citation: None,
            }]
        }
    }

    fn spec() -> GenerationSpec {
        let topic = TopicSpec::from_value(&serde_json::json!({
            "goal": "Build a compiler",
            "constraints": {"total_hours_min": 6, "total_hours_max": 6}
        }))
        .expect("spec");
        GenerationSpec::from_topic_spec(&topic)
    }

    fn node(id: &str, minutes: u32, prereqs: &[&str]) -> CurriculumNode {
        CurriculumNode {
            id: id.into(),
            title: format!("Lexing and parsing {id}"),
            capability: "tokenize input and build trees".into(),
            prerequisites: prereqs.iter().map(|p| p.to_string()).collect(),
            core_ideas: vec![],
            pitfalls: vec![],
            mastery_check: MasteryCheck {
                task: String::new(),
                pass_criteria: String::new(),
            },
            estimate_minutes: minutes,
            resources: vec![],
            estimate_confidence: None,
        }
    }

    fn curriculum(nodes: Vec<CurriculumNode>) -> Curriculum {
        Curriculum {
            topic: "Build a compiler".into(),
            nodes,
            open_questions: None,
        }
    }

    #[test]
    fn test_atomic_phrase_takes_leading_clause() {
        assert_eq!(atomic_phrase("lexing AND parsing").as_deref(), Some("Lexing"));
        assert_eq!(atomic_phrase("plan; execute").as_deref(), Some("Plan"));
        assert_eq!(atomic_phrase("read / write").as_deref(), Some("Read"));
        assert_eq!(atomic_phrase("single"), Some("Single".to_string()));
        assert_eq!(atomic_phrase("  "), None);
    }

    #[test]
    fn test_empty_action_list_is_identity() {
        let spec = spec();
        let draft = curriculum(vec![node("N1", 30, &[]), node("N2", 40, &["N1"])]);
        let repaired = RepairExecutor::new(&spec, &Fixed).apply(&draft, &[]);
        assert_eq!(repaired, draft);
    }

    #[test]
    fn test_rewrite_makes_capability_atomic() {
        let spec = spec();
        let draft = curriculum(vec![node("N1", 30, &[])]);
        let action = RepairAction::new(RepairActionType::RewriteNode, "compound", crate::quality::Severity::High)
            .targeting(Some("N1".into()));
        let repaired = RepairExecutor::new(&spec, &Fixed).apply(&draft, &[action]);
        let n1 = &repaired.nodes[0];
        assert_eq!(n1.title, "Lexing");
        assert_eq!(n1.capability, "Tokenize input");
        assert_eq!(n1.core_ideas.len(), 3);
        assert!(!n1.mastery_check.task.is_empty());
        assert_eq!(draft.nodes[0].capability, "tokenize input and build trees");
    }

    #[test]
    fn test_retime_uses_prerequisite_floor_and_cap() {
        let spec = spec();
        let base = spec.minutes[2];
        let draft = curriculum(vec![
            node("N1", 100, &[]),
            node("N2", 300, &[]),
            node("N3", 10, &["N1"]),
        ]);
        let retime = |id: &str| {
            RepairAction::new(RepairActionType::RetimeNode, "r", crate::quality::Severity::Medium)
                .targeting(Some(id.into()))
        };
        let repaired = RepairExecutor::new(&spec, &Fixed).apply(&draft, &[retime("N3")]);
        assert_eq!(repaired.nodes[2].estimate_minutes, base.max(110).min(220));

        let mut capped = draft.clone();
        capped.nodes[2].prerequisites = vec!["N2".into()];
        let repaired = RepairExecutor::new(&spec, &Fixed).apply(&capped, &[retime("N3")]);
        assert_eq!(repaired.nodes[2].estimate_minutes, 220);

        let mut huge = draft.clone();
        huge.nodes[0].estimate_minutes = u32::MAX;
        let repaired = RepairExecutor::new(&spec, &Fixed).apply(&huge, &[retime("N3")]);
        assert_eq!(repaired.nodes[2].estimate_minutes, 220);
    }

    #[test]
    fn test_graph_scoped_rewire_links_every_node() {
        let spec = spec();
        let draft = curriculum((1..=5).map(|i| node(&format!("N{i}"), 30, &[])).collect());
        let action = RepairAction::new(RepairActionType::RewirePrereqs, "roots", crate::quality::Severity::High);
        let repaired = RepairExecutor::new(&spec, &Fixed).apply(&draft, &[action]);
        assert!(repaired.nodes[0].prerequisites.is_empty());
        assert_eq!(repaired.nodes[1].prerequisites, vec!["N1".to_string()]);
        assert!(repaired.nodes[4].prerequisites.contains(&"N4".to_string()));
    }

    #[test]
    fn test_retarget_and_missing_target() {
        let spec = spec();
        let draft = curriculum(vec![node("N1", 30, &[])]);
        let actions = vec![
            RepairAction::new(RepairActionType::RetargetResources, "weak", crate::quality::Severity::Medium)
                .targeting(Some("N1".into())),
            RepairAction::new(RepairActionType::RewriteNode, "gone", crate::quality::Severity::High)
                .targeting(Some("N9".into())),
            RepairAction::new(RepairActionType::SplitNode, "split", crate::quality::Severity::High)
                .targeting(Some("N1".into())),
        ];
        let repaired = RepairExecutor::new(&spec, &Fixed).apply(&draft, &actions);
        assert_eq!(repaired.nodes.len(), 1);
        assert_eq!(repaired.nodes[0].resources[0].url, "https://example.org/N1");
        assert_eq!(repaired.nodes[0].title, draft.nodes[0].title);
    }

    #[test]
    fn test_reorder_sorts_by_prerequisite_count_then_id() {
        let spec = spec();
        let draft = curriculum(vec![
            node("N3", 30, &["N1", "N2"]),
            node("N2", 30, &["N1"]),
            node("N1", 30, &[]),
        ]);
        let action = RepairAction::new(RepairActionType::ReorderNodes, "order", crate::quality::Severity::Low);
        let repaired = RepairExecutor::new(&spec, &Fixed).apply(&draft, &[action]);
        let ids: Vec<&str> = repaired.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["N1", "N2", "N3"]);
    }
}
