use std::sync::Arc;

use curriculum_core::{
    critique, draft_curriculum, evaluate, score_curriculum, Curriculum, CurriculumEngine,
    CurriculumNode, GenerationRequest, GenerationSpec, GeneratorFailure, MasteryCheck,
    ModelPolicy, ModelProvider, RepairAction, RepairActionType, RepairExecutor, RepairPlanner,
    Resource, ResourceKind, ResourceRequest, ResourceResolver, ResourceRole, RuleId, Severity,
    StopReason, TextGenerator, TopicSpec,
};
use serde_json::{json, Value};

/// Always returns the same definition and example pair.
struct StubResolver;

impl ResourceResolver for StubResolver {
    fn resolve(&self, _request: &ResourceRequest<'_>) -> Vec<Resource> {
        stub_resources()
    }
}

fn stub_resources() -> Vec<Resource> {
    vec![
        Resource {
            title: "Stream processing definitions".into(),
            url: "https://stub.example/definition".into(),
            kind: ResourceKind::Doc,
            role: ResourceRole::Definition,
            citation: None,
        },
        Resource {
            title: "Stream processing worked example".into(),
            url: "https://stub.example/example".into(),
            kind: ResourceKind::Paper,
            role: ResourceRole::Example,
            citation: None,
        },
    ]
}

fn stream_topic() -> TopicSpec {
    TopicSpec::from_value(&json!({
        "goal": "Operate stream processing pipelines",
        "scope_in": ["windowing", "watermarks"],
        "constraints": {"node_count_min": 6, "node_count_max": 8},
        "evidence_mode": "standard",
    }))
    .expect("topic spec")
}

fn plain_node(index: usize) -> CurriculumNode {
    CurriculumNode {
        id: format!("N{}", index + 1),
        title: format!("Stream stage {}", index + 1),
        capability: format!("Implement stream stage {}.", index + 1),
        prerequisites: vec![],
        core_ideas: vec!["Core mechanism".into(), "Constraints".into()],
        pitfalls: vec!["Skipping definitions".into()],
        mastery_check: MasteryCheck {
            task: "Build a working stream stage with tests.".into(),
            pass_criteria: "Pass criteria: must include at least one benchmark.".into(),
        },
        estimate_minutes: 60 + index as u32 * 5,
        resources: stub_resources(),
        estimate_confidence: None,
    }
}

#[test]
fn standard_mode_with_stub_resolver_yields_bounded_evidenced_nodes() {
    let engine = CurriculumEngine::new(ModelPolicy::default(), Some(Arc::new(StubResolver)), None)
        .expect("engine");
    let result = engine.optimize(&stream_topic()).expect("optimize");

    let count = result.curriculum.nodes.len();
    assert!((6..=8).contains(&count), "node count {count}");
    for node in &result.curriculum.nodes {
        assert!(node.resources.len() >= 2, "{} has too few resources", node.id);
        assert!(node.resources.iter().any(|r| r.role == ResourceRole::Definition));
        assert!(node.resources.iter().any(|r| r.role == ResourceRole::Example));
    }
    assert!(!result.trace.iterations.is_empty());
}

#[test]
fn identical_inputs_produce_identical_bytes() {
    let engine = CurriculumEngine::internal();
    let topic = stream_topic();
    let first = engine.optimize(&topic).expect("first");
    let second = engine.optimize(&topic).expect("second");

    let a = serde_json::to_vec(&first.curriculum).expect("serialize");
    let b = serde_json::to_vec(&second.curriculum).expect("serialize");
    assert_eq!(a, b);
    assert_eq!(first.trace, second.trace);
}

#[test]
fn emitted_curriculum_never_scores_below_initial_draft() {
    let policies = [
        ModelPolicy::default(),
        ModelPolicy {
            max_iterations: 1,
            target_score: 100,
            ..ModelPolicy::default()
        },
        ModelPolicy {
            max_actions_per_iteration: 1,
            ..ModelPolicy::default()
        },
    ];
    let topic = TopicSpec::from_value(&json!({
        "goal": "Design fault tolerant distributed storage and replication",
        "scope_in": ["consensus and quorum", "anti-entropy", "hinted handoff"],
        "misconceptions": ["Replication alone guarantees durability"],
        "evidence_mode": "strict",
    }))
    .expect("topic spec");

    for policy in policies {
        let engine = CurriculumEngine::new(policy, None, None).expect("engine");
        let result = engine.optimize(&topic).expect("optimize");

        let spec = GenerationSpec::from_topic_spec(&topic);
        let resolver = curriculum_core::default_resource_resolver(&topic);
        let initial = draft_curriculum(&spec, resolver.as_ref());
        let (_, initial_report) = score_curriculum(&initial, &topic);
        let (_, final_report) = score_curriculum(&result.curriculum, &topic);

        assert!(final_report.total_score >= initial_report.total_score);
        assert_eq!(final_report.total_score, result.trace.best_score);
    }
}

#[test]
fn all_root_curriculum_gets_progression_diagnostic_and_rewire() {
    let curriculum = Curriculum {
        topic: "Operate stream processing pipelines".into(),
        nodes: (0..5).map(plain_node).collect(),
        open_questions: None,
    };
    let topic = stream_topic();
    let pedagogy = critique(&curriculum, &topic);
    let report = evaluate(&curriculum, &topic, &pedagogy);

    assert!(report.diagnostics.iter().any(|d| d.rule_id == RuleId::AllRoots));
    let actions = RepairPlanner::new(4).plan(&report, &pedagogy);
    assert!(actions
        .iter()
        .any(|a| a.action_type == RepairActionType::RewirePrereqs));

    let spec = GenerationSpec::from_topic_spec(&topic);
    let repaired = RepairExecutor::new(&spec, &StubResolver).apply(&curriculum, &actions);
    let roots = repaired
        .nodes
        .iter()
        .filter(|n| n.prerequisites.is_empty())
        .count();
    assert_eq!(roots, 1);
}

#[test]
fn retime_anchors_to_prerequisite_estimate() {
    let topic = stream_topic();
    let spec = GenerationSpec::from_topic_spec(&topic);
    let mut first = plain_node(0);
    first.estimate_minutes = 100;
    let mut second = plain_node(1);
    second.prerequisites = vec!["N1".into()];
    second.estimate_minutes = 5;
    let curriculum = Curriculum {
        topic: "t".into(),
        nodes: vec![first, second],
        open_questions: None,
    };

    let action = RepairAction::new(RepairActionType::RetimeNode, "workload", Severity::Medium)
        .targeting(Some("N2".into()));
    let repaired = RepairExecutor::new(&spec, &StubResolver).apply(&curriculum, &[action]);
    assert_eq!(
        repaired.nodes[1].estimate_minutes,
        spec.minutes[1].max(110).min(220)
    );
}

#[test]
fn empty_action_list_is_idempotent() {
    let topic = stream_topic();
    let spec = GenerationSpec::from_topic_spec(&topic);
    let draft = draft_curriculum(&spec, &StubResolver);
    let repaired = RepairExecutor::new(&spec, &StubResolver).apply(&draft, &[]);
    assert_eq!(repaired, draft);
}

#[test]
fn single_iteration_budget_stops_with_max_iterations() {
    let policy = ModelPolicy {
        max_iterations: 1,
        target_score: 100,
        ..ModelPolicy::default()
    };
    let topic = TopicSpec::from_value(&json!({"goal": "Learn lock-free data structures"}))
        .expect("topic spec");
    let result = CurriculumEngine::new(policy, None, None)
        .expect("engine")
        .optimize(&topic)
        .expect("optimize");

    assert_eq!(result.trace.iterations.len(), 1);
    if !result.trace.accepted {
        assert!(matches!(
            result.trace.stop_reason,
            StopReason::MaxIterationsReached | StopReason::NoActionsAvailable
        ));
    }
}

/// Finds nothing, so every retarget strips a node's resources.
struct EmptyResolver;

impl ResourceResolver for EmptyResolver {
    fn resolve(&self, _request: &ResourceRequest<'_>) -> Vec<Resource> {
        Vec::new()
    }
}

/// Off-topic anchors that reuse the first three windowing node URLs.
struct OffTopicResolver;

impl ResourceResolver for OffTopicResolver {
    fn resolve(&self, _request: &ResourceRequest<'_>) -> Vec<Resource> {
        off_topic_resources()
    }
}

fn off_topic_resources() -> Vec<Resource> {
    (1..=3)
        .map(|i| Resource {
            title: "Unrelated poetry anthology".into(),
            url: format!("https://stub.example/n{i}"),
            kind: ResourceKind::Doc,
            role: ResourceRole::Example,
            citation: None,
        })
        .collect()
}

/// Serves a fixed curriculum as the proposal.
struct ServesDraft(Value);

impl TextGenerator for ServesDraft {
    fn run(&self, _request: &GenerationRequest) -> Result<Value, GeneratorFailure> {
        Ok(json!({"curriculum": self.0.clone()}))
    }
}

const WINDOWING_TITLES: [&str; 4] = [
    "Windowing fundamentals",
    "Windowing with watermarks",
    "Windowing late events",
    "Windowing production pipelines",
];

/// Four-node chain that the critic accepts; `urls(i)` picks node i's anchors.
fn windowing_draft(urls: impl Fn(usize) -> Vec<String>) -> Curriculum {
    let nodes = WINDOWING_TITLES
        .iter()
        .enumerate()
        .map(|(i, title)| CurriculumNode {
            id: format!("N{}", i + 1),
            title: title.to_string(),
            capability: format!("Implement {}.", title.to_lowercase()),
            prerequisites: if i == 0 { vec![] } else { vec![format!("N{i}")] },
            core_ideas: vec!["Event time".into(), "Window bounds".into()],
            pitfalls: vec!["Mixing processing time with event time".into()],
            mastery_check: MasteryCheck {
                task: "Build a windowed stream job with tests.".into(),
                pass_criteria: "Pass criteria: must include at least one benchmark.".into(),
            },
            estimate_minutes: 40 + 20 * i as u32,
            resources: urls(i)
                .into_iter()
                .map(|url| Resource {
                    title: format!("Stream windowing reference {}", i + 1),
                    url,
                    kind: ResourceKind::Doc,
                    role: ResourceRole::Definition,
                    citation: None,
                })
                .collect(),
            estimate_confidence: None,
        })
        .collect();
    Curriculum {
        topic: "Operate stream processing pipelines".into(),
        nodes,
        open_questions: None,
    }
}

fn serving_engine(
    policy: ModelPolicy,
    resolver: Arc<dyn ResourceResolver>,
    draft: &Curriculum,
) -> CurriculumEngine {
    let policy = ModelPolicy {
        provider: ModelProvider::RemoteLlm,
        model_id: "stub-model".into(),
        ..policy
    };
    let generator = Arc::new(ServesDraft(serde_json::to_value(draft).expect("json")));
    CurriculumEngine::new(policy, Some(resolver), Some(generator)).expect("engine")
}

#[test]
fn clean_draft_is_accepted_on_first_iteration() {
    let topic = stream_topic();
    let clean = windowing_draft(|i| vec![format!("https://stub.example/n{}", i + 1)]);
    let (pedagogy, report) = score_curriculum(&clean, &topic);
    assert!(pedagogy.min_quality_met);
    assert_eq!(report.hard_fail_count, 0);

    let result = serving_engine(ModelPolicy::default(), Arc::new(StubResolver), &clean)
        .optimize(&topic)
        .expect("optimize");

    assert!(result.trace.accepted);
    assert_eq!(result.trace.stop_reason, StopReason::AcceptedThresholdMet);
    assert_eq!(result.trace.iterations.len(), 1);
    assert_eq!(result.trace.best_score, report.total_score);
    assert_eq!(result.curriculum, clean);
}

#[test]
fn worse_repair_keeps_earlier_best_draft() {
    let topic = stream_topic();
    let shared = windowing_draft(|_| vec!["https://stub.example/shared".to_string()]);
    let (_, initial) = score_curriculum(&shared, &topic);
    assert_eq!(initial.hard_fail_count, 0);
    assert!(initial.total_score < 100);

    let policy = ModelPolicy {
        max_iterations: 3,
        target_score: 100,
        ..ModelPolicy::default()
    };
    let result = serving_engine(policy, Arc::new(EmptyResolver), &shared)
        .optimize(&topic)
        .expect("optimize");

    let first = &result.trace.iterations[0];
    assert!(first
        .selected_actions
        .iter()
        .any(|a| a.action_type == RepairActionType::RetargetResources && a.node_id.is_none()));
    assert!(first.post_score_summary.total_score < initial.total_score);
    assert!(first.post_score_summary.hard_fail_count > 0);

    assert_eq!(result.trace.stop_reason, StopReason::MaxIterationsReached);
    assert!(!result.trace.accepted);
    assert_eq!(result.trace.best_score, initial.total_score);
    assert_eq!(result.curriculum, shared);
}

#[test]
fn zero_action_budget_stops_when_nothing_is_planned() {
    let topic = stream_topic();
    let shared = windowing_draft(|_| vec!["https://stub.example/shared".to_string()]);
    let (_, initial) = score_curriculum(&shared, &topic);
    assert!(initial.total_score >= 85 && initial.total_score < 100);

    let policy = ModelPolicy {
        target_score: 100,
        max_actions_per_iteration: 0,
        ..ModelPolicy::default()
    };
    let result = serving_engine(policy, Arc::new(StubResolver), &shared)
        .optimize(&topic)
        .expect("optimize");

    assert_eq!(result.trace.stop_reason, StopReason::NoActionsAvailable);
    assert_eq!(result.trace.iterations.len(), 1);
    assert!(result.trace.iterations[0].selected_actions.is_empty());
    assert!(!result.trace.accepted);
    assert_eq!(result.curriculum, shared);
}

#[test]
fn accepted_draft_wins_a_tie_with_hard_failing_best() {
    let topic = stream_topic();
    let draft = windowing_draft(|i| {
        if i < 3 {
            vec![format!("https://stub.example/n{}", i + 1)]
        } else {
            Vec::new()
        }
    });
    let (_, initial) = score_curriculum(&draft, &topic);
    assert_eq!(initial.hard_fail_count, 1);

    let policy = ModelPolicy {
        target_score: initial.total_score,
        ..ModelPolicy::default()
    };
    let result = serving_engine(policy, Arc::new(OffTopicResolver), &draft)
        .optimize(&topic)
        .expect("optimize");

    assert!(result.trace.accepted);
    assert_eq!(result.trace.stop_reason, StopReason::AcceptedThresholdMet);
    assert_eq!(result.trace.iterations.len(), 2);
    assert_eq!(result.trace.best_score, initial.total_score);
    assert_eq!(result.curriculum.nodes[3].resources, off_topic_resources());
    let (_, emitted) = score_curriculum(&result.curriculum, &topic);
    assert_eq!(emitted.hard_fail_count, 0);
    assert_eq!(emitted.total_score, initial.total_score);
}
