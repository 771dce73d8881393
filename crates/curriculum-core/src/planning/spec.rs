//! GenerationSpec: the per-request plan derived once from a topic spec.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::{EvidenceMode, TopicSpec};

const LABEL_MAX_CHARS: usize = 72;
const DEFAULT_MIN_NODES: usize = 8;
const DEFAULT_MAX_NODES: usize = 16;
const DEFAULT_MAX_PREREQUISITES: usize = 3;
const FLOOR_MINUTES: u32 = 20;

const KEYWORD_BOOSTS: &[(&str, f64)] = &[
    ("integration", 0.25),
    ("verification", 0.25),
    ("reliability", 0.2),
    ("trade-off", 0.15),
    ("deliverable", 0.1),
    ("architecture", 0.2),
    ("orchestration", 0.2),
    ("testing", 0.2),
];

/// Immutable plan for one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSpec {
    pub topic_spec: TopicSpec,
    pub topic_label: String,
    pub evidence_mode: EvidenceMode,
    pub strict_mode: bool,
    pub target_nodes: usize,
    pub max_prerequisites_per_node: usize,
    /// One title per node, in node order.
    pub titles: Vec<String>,
    /// One estimate per node; sums to [`total_minutes`] exactly.
    pub minutes: Vec<u32>,
    pub misconceptions: Vec<String>,
}

impl GenerationSpec {
    pub fn from_topic_spec(topic_spec: &TopicSpec) -> Self {
        let count = target_nodes(topic_spec);
        let titles = seed_titles(topic_spec, count);
        let minutes = distribute_minutes(total_minutes(topic_spec), &titles);
        let evidence_mode = topic_spec.evidence_mode;
        let max_prerequisites_per_node = topic_spec
            .constraints
            .max_prerequisites_per_node
            .map(|n| n as usize)
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_PREREQUISITES)
            .max(1);

        Self {
            topic_spec: topic_spec.clone(),
            topic_label: topic_label(&topic_spec.goal),
            evidence_mode,
            strict_mode: evidence_mode == EvidenceMode::Strict,
            target_nodes: count,
            max_prerequisites_per_node,
            titles,
            minutes,
            misconceptions: topic_spec.misconceptions.clone(),
        }
    }
}

/// The goal, shortened to 72 characters with an ellipsis when longer.
pub fn topic_label(goal: &str) -> String {
    if goal.chars().count() <= LABEL_MAX_CHARS {
        return goal.to_string();
    }
    let head: String = goal.chars().take(LABEL_MAX_CHARS - 3).collect();
    format!("{}...", head.trim_end())
}

/// `clamp(min, max, max(6, |scope_in| + 3))` with defaults 8 and 16.
pub fn target_nodes(topic_spec: &TopicSpec) -> usize {
    let constraints = &topic_spec.constraints;
    let min_nodes = constraints
        .node_count_min
        .map_or(DEFAULT_MIN_NODES, |n| n as usize);
    let max_nodes = constraints
        .node_count_max
        .map_or(min_nodes.max(DEFAULT_MAX_NODES), |n| n as usize)
        .max(min_nodes);
    let wanted = (topic_spec.scope_in.len() + 3).max(6);
    wanted.min(max_nodes).max(min_nodes)
}

/// Total study minutes: the midpoint of the hour range.
pub fn total_minutes(topic_spec: &TopicSpec) -> u32 {
    let min_hours = topic_spec.constraints.total_hours_min;
    let max_hours = topic_spec.constraints.total_hours_max.max(min_hours);
    let minutes = ((min_hours + max_hours) / 2.0 * 60.0).round_ties_even();
    if minutes.is_finite() && minutes > 0.0 {
        minutes.min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Ordered, case-insensitively deduplicated node titles of length `target`.
pub fn seed_titles(topic_spec: &TopicSpec, target: usize) -> Vec<String> {
    let mut seeds = vec!["Capability framing and success criteria".to_string()];
    if !topic_spec.prerequisites.is_empty() {
        seeds.push("Prerequisite bridge and terminology alignment".to_string());
    }
    seeds.extend(topic_spec.scope_in.iter().cloned());
    if let Some(pack) = &topic_spec.context_pack {
        seeds.extend(
            pack.required_outcomes
                .iter()
                .map(|outcome| format!("Deliverable: {outcome}")),
        );
    }
    seeds.push("Interface integration strategy".to_string());
    seeds.push("Verification checklist design".to_string());

    let mut seen = BTreeSet::new();
    let mut titles: Vec<String> = seeds
        .into_iter()
        .filter(|title| seen.insert(title.to_lowercase()))
        .collect();
    while titles.len() < target {
        titles.push(format!("Applied implementation cycle {}", titles.len() + 1));
    }
    titles.truncate(target);
    titles
}

fn title_weight(index: usize, count: usize, title: &str) -> f64 {
    let ratio = index as f64 / count.saturating_sub(1).max(1) as f64;
    let lowered = title.to_lowercase();
    let mut weight = 1.0 + 0.4 * ratio;
    for (keyword, boost) in KEYWORD_BOOSTS {
        if lowered.contains(keyword) {
            weight += boost;
        }
    }
    if index + 1 == count {
        weight += 0.15;
    }
    weight
}

/// Split `total` minutes across `titles`, conserving the total exactly.
///
/// Each node gets a floor of `min(20, total / count)`. The remainder is
/// shared by title weight; truncation leftovers go to the largest
/// fractional shortfalls, ties by ascending index.
pub fn distribute_minutes(total: u32, titles: &[String]) -> Vec<u32> {
    let count = titles.len();
    if count == 0 {
        return Vec::new();
    }
    let count_u32 = u32::try_from(count).unwrap_or(u32::MAX);
    let minimum = if total >= count_u32 {
        FLOOR_MINUTES.min(total / count_u32)
    } else {
        0
    };
    let remainder = total - minimum * count_u32;

    let weights: Vec<f64> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| title_weight(i, count, title))
        .collect();
    let weight_sum: f64 = weights.iter().sum();
    let shares: Vec<f64> = weights
        .iter()
        .map(|w| f64::from(remainder) * w / weight_sum)
        .collect();
    let mut increments: Vec<u32> = shares.iter().map(|s| s.floor() as u32).collect();

    let mut distributed: u32 = increments.iter().sum();
    // Float rounding can push the floors a unit over the remainder.
    while distributed > remainder {
        if let Some(slot) = increments.iter_mut().rev().find(|v| **v > 0) {
            *slot -= 1;
            distributed -= 1;
        } else {
            break;
        }
    }
    if distributed < remainder {
        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by(|&a, &b| {
            let short_a = shares[a] - f64::from(increments[a]);
            let short_b = shares[b] - f64::from(increments[b]);
            short_b.total_cmp(&short_a).then(a.cmp(&b))
        });
        for idx in order.iter().cycle().take((remainder - distributed) as usize) {
            increments[*idx] += 1;
        }
    }

    increments.into_iter().map(|extra| minimum + extra).collect()
}
