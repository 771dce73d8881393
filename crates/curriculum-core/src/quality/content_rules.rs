//! Content-oriented scoring rules: resources, mastery checks, effort,
//! redundancy, and learner-path coherence.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{CurriculumNode, TopicSpec};
use crate::quality::structure_rules::clamp;
use crate::quality::tokens;
use crate::quality::types::{Diagnostic, PedagogyCritique, RuleId, Severity};

const ACTION_VERBS: &[&str] = &[
    "analyze",
    "build",
    "compare",
    "define",
    "design",
    "document",
    "explain",
    "implement",
    "integrate",
    "measure",
    "run",
    "simulate",
    "test",
    "validate",
    "write",
];

const MEASURABLE_SIGNALS: &[&str] = &["must ", "at least", "include", "pass", "threshold", "criteria"];

const MIN_MASTERY_CHARS: usize = 20;

pub fn score_resource_relevance(
    nodes: &[CurriculumNode],
    topic_spec: &TopicSpec,
    diagnostics: &mut Vec<Diagnostic>,
) -> u32 {
    let mut score: i64 = 100;
    let corpus_tokens = tokens(&topic_spec.relevance_corpus());
    let mut seen_urls = BTreeSet::new();
    let mut duplicate_urls = 0usize;

    for node in nodes {
        if node.resources.is_empty() {
            score -= 18;
            diagnostics.push(
                Diagnostic::new(RuleId::ResourceMissing, Severity::High, "Node has no resources.")
                    .for_node(&node.id)
                    .hard_fail(),
            );
            continue;
        }
        let material = node
            .resources
            .iter()
            .map(|r| format!("{} {}", r.title, r.url))
            .collect::<Vec<_>>()
            .join(" ");
        if !corpus_tokens.is_empty() && tokens(&material).is_disjoint(&corpus_tokens) {
            score -= 8;
            diagnostics.push(
                Diagnostic::new(
                    RuleId::WeakRelevance,
                    Severity::Medium,
                    "Weak overlap between resources and topic context.",
                )
                .for_node(&node.id),
            );
        }
        for resource in &node.resources {
            if !seen_urls.insert(resource.url.as_str()) {
                duplicate_urls += 1;
            }
        }
    }

    if duplicate_urls > (nodes.len() / 2).max(2) {
        diagnostics.push(Diagnostic::new(
            RuleId::RepetitiveAnchor,
            Severity::Medium,
            "Resource anchors are highly repetitive across nodes.",
        ));
        score -= 10;
    }
    clamp(score)
}

pub fn score_mastery_actionability(nodes: &[CurriculumNode], diagnostics: &mut Vec<Diagnostic>) -> u32 {
    let mut score: i64 = 100;
    for node in nodes {
        let task = node.mastery_check.task.trim().to_lowercase();
        let criteria = node.mastery_check.pass_criteria.trim().to_lowercase();

        let actionable = task.chars().count() >= MIN_MASTERY_CHARS
            && ACTION_VERBS.iter().any(|verb| task.contains(&format!("{verb} ")));
        if !actionable {
            score -= 12;
            diagnostics.push(
                Diagnostic::new(
                    RuleId::NonActionableTask,
                    Severity::High,
                    "Mastery task is not specific enough for implementation.",
                )
                .for_node(&node.id)
                .hard_fail(),
            );
        }

        let measurable = criteria.chars().count() >= MIN_MASTERY_CHARS
            && MEASURABLE_SIGNALS.iter().any(|signal| criteria.contains(signal));
        if !measurable {
            score -= 12;
            diagnostics.push(
                Diagnostic::new(
                    RuleId::NonMeasurableCriteria,
                    Severity::High,
                    "Pass criteria lacks measurable acceptance signals.",
                )
                .for_node(&node.id)
                .hard_fail(),
            );
        }
    }
    clamp(score)
}

fn median(sorted: &[u32]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        f64::from(sorted[n / 2])
    } else {
        (f64::from(sorted[n / 2 - 1]) + f64::from(sorted[n / 2])) / 2.0
    }
}

pub fn score_effort_coherence(nodes: &[CurriculumNode], diagnostics: &mut Vec<Diagnostic>) -> u32 {
    if nodes.is_empty() {
        return 0;
    }
    let mut score: i64 = 100;
    let mut estimates: Vec<u32> = nodes.iter().map(|n| n.estimate_minutes).collect();
    estimates.sort_unstable();

    let unique: BTreeSet<u32> = estimates.iter().copied().collect();
    if estimates.len() >= 6 && unique.len() <= 2 {
        score -= 25;
        diagnostics.push(Diagnostic::new(
            RuleId::FlatDistribution,
            Severity::Medium,
            "Estimate distribution is too flat for curriculum size.",
        ));
    }

    let med = median(&estimates);
    if med > 0.0 && estimates.iter().any(|e| f64::from(*e) > med * 3.0) {
        score -= 10;
        diagnostics.push(Diagnostic::new(
            RuleId::EffortOutlier,
            Severity::Low,
            "Detected very large estimate outliers.",
        ));
    }
    clamp(score)
}

fn title_words() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[a-z0-9]+").expect("Invalid title word regex"))
}

/// First five lowercase words of a title.
fn title_prefix(title: &str) -> String {
    let lowered = title.to_lowercase();
    title_words()
        .find_iter(&lowered)
        .take(5)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn score_redundancy(nodes: &[CurriculumNode], diagnostics: &mut Vec<Diagnostic>) -> u32 {
    let mut score: i64 = 100;
    let prefixes: BTreeSet<String> = nodes.iter().map(|n| title_prefix(&n.title)).collect();
    if nodes.len() >= 6 && prefixes.len() <= (nodes.len() / 3).max(2) {
        score -= 25;
        diagnostics.push(Diagnostic::new(
            RuleId::TitleRepetition,
            Severity::Medium,
            "Node titles are overly repetitive.",
        ));
    }
    clamp(score)
}

/// Fold critic findings into the judge. Hidden prerequisites become hard fails.
pub fn score_learner_coherence(pedagogy: &PedagogyCritique, diagnostics: &mut Vec<Diagnostic>) -> u32 {
    let mut score: i64 = 100;
    for item in &pedagogy.diagnostics {
        if item.rule_id == RuleId::HiddenPrerequisite {
            diagnostics.push(item.clone().hard_fail());
            score -= 25;
            continue;
        }
        score -= match item.severity {
            Severity::High | Severity::Critical => 15,
            Severity::Medium => 8,
            Severity::Low => 3,
        };
    }
    clamp(score)
}
