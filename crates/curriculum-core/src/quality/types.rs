//! Shared types for critique and deterministic scoring.

use serde::{Deserialize, Serialize};

/// Diagnostic severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn is_high_or_critical(self) -> bool {
        self >= Self::High
    }
}

/// Every rule the critic and judge can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RuleId {
    #[serde(rename = "structure.duplicate_node_ids")]
    DuplicateNodeIds,
    #[serde(rename = "structure.missing_prerequisite")]
    MissingPrerequisite,
    #[serde(rename = "structure.cycle")]
    Cycle,
    #[serde(rename = "atomicity.compound_capability")]
    CompoundCapability,
    #[serde(rename = "atomicity.threshold")]
    AtomicityThreshold,
    #[serde(rename = "progression.all_roots")]
    AllRoots,
    #[serde(rename = "progression.depth_too_shallow")]
    DepthTooShallow,
    #[serde(rename = "resource.missing")]
    ResourceMissing,
    #[serde(rename = "resource.weak_relevance")]
    WeakRelevance,
    #[serde(rename = "resource.repetitive_anchor")]
    RepetitiveAnchor,
    #[serde(rename = "mastery.non_actionable_task")]
    NonActionableTask,
    #[serde(rename = "mastery.non_measurable_criteria")]
    NonMeasurableCriteria,
    #[serde(rename = "effort.flat_distribution")]
    FlatDistribution,
    #[serde(rename = "effort.outlier")]
    EffortOutlier,
    #[serde(rename = "redundancy.title_repetition")]
    TitleRepetition,
    #[serde(rename = "learner.hidden_prerequisite")]
    HiddenPrerequisite,
    #[serde(rename = "learner.prerequisite_overload")]
    PrerequisiteOverload,
    #[serde(rename = "learner.concept_jump")]
    ConceptJump,
    #[serde(rename = "learner.workload_jump")]
    WorkloadJump,
}

impl RuleId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateNodeIds => "structure.duplicate_node_ids",
            Self::MissingPrerequisite => "structure.missing_prerequisite",
            Self::Cycle => "structure.cycle",
            Self::CompoundCapability => "atomicity.compound_capability",
            Self::AtomicityThreshold => "atomicity.threshold",
            Self::AllRoots => "progression.all_roots",
            Self::DepthTooShallow => "progression.depth_too_shallow",
            Self::ResourceMissing => "resource.missing",
            Self::WeakRelevance => "resource.weak_relevance",
            Self::RepetitiveAnchor => "resource.repetitive_anchor",
            Self::NonActionableTask => "mastery.non_actionable_task",
            Self::NonMeasurableCriteria => "mastery.non_measurable_criteria",
            Self::FlatDistribution => "effort.flat_distribution",
            Self::EffortOutlier => "effort.outlier",
            Self::TitleRepetition => "redundancy.title_repetition",
            Self::HiddenPrerequisite => "learner.hidden_prerequisite",
            Self::PrerequisiteOverload => "learner.prerequisite_overload",
            Self::ConceptJump => "learner.concept_jump",
            Self::WorkloadJump => "learner.workload_jump",
        }
    }

    /// Rules produced by the pedagogy critic.
    pub fn is_learner_path(self) -> bool {
        matches!(
            self,
            Self::HiddenPrerequisite
                | Self::PrerequisiteOverload
                | Self::ConceptJump
                | Self::WorkloadJump
        )
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding about a draft. Recomputed on every pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub rule_id: RuleId,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default)]
    pub hard_fail: bool,
}

impl Diagnostic {
    pub fn new(rule_id: RuleId, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule_id,
            severity,
            message: message.into(),
            node_id: None,
            hard_fail: false,
        }
    }

    pub fn for_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    pub fn hard_fail(mut self) -> Self {
        self.hard_fail = true;
        self
    }
}

/// Output of the pedagogy critic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedagogyCritique {
    pub score: u32,
    pub min_quality_met: bool,
    pub summary: String,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedagogySummary {
    pub score: u32,
    pub min_quality_met: bool,
    pub summary: String,
    pub diagnostic_count: usize,
    pub high_severity_count: usize,
}

impl PedagogyCritique {
    pub fn summary(&self) -> PedagogySummary {
        PedagogySummary {
            score: self.score,
            min_quality_met: self.min_quality_met,
            summary: self.summary.clone(),
            diagnostic_count: self.diagnostics.len(),
            high_severity_count: self
                .diagnostics
                .iter()
                .filter(|d| d.severity.is_high_or_critical())
                .count(),
        }
    }
}

/// Per-dimension scores, each in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityDimensions {
    pub structural_validity: u32,
    pub atomicity: u32,
    pub pedagogical_progression: u32,
    pub resource_relevance: u32,
    pub mastery_actionability: u32,
    pub effort_coherence: u32,
    pub redundancy: u32,
    pub learner_path_coherence: u32,
}

impl QualityDimensions {
    /// Weighted sum rounded to the nearest integer.
    pub fn weighted_total(&self) -> u32 {
        let weighted = [
            (self.structural_validity, 0.22),
            (self.atomicity, 0.14),
            (self.pedagogical_progression, 0.14),
            (self.resource_relevance, 0.12),
            (self.mastery_actionability, 0.14),
            (self.effort_coherence, 0.08),
            (self.redundancy, 0.08),
            (self.learner_path_coherence, 0.08),
        ]
        .iter()
        .map(|(score, weight)| f64::from(*score) * weight)
        .sum::<f64>();
        weighted.round_ties_even() as u32
    }
}

/// Output of the quality judge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    pub dimensions: QualityDimensions,
    pub total_score: u32,
    pub hard_fail_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub dimensions: QualityDimensions,
    pub total_score: u32,
    pub hard_fail_count: usize,
    pub diagnostic_count: usize,
}

impl QualityReport {
    pub fn passed(&self) -> bool {
        self.hard_fail_count == 0
    }

    pub fn score_summary(&self) -> ScoreSummary {
        ScoreSummary {
            dimensions: self.dimensions,
            total_score: self.total_score,
            hard_fail_count: self.hard_fail_count,
            diagnostic_count: self.diagnostics.len(),
        }
    }

    /// Learner-path diagnostics the judge folded into its report.
    pub fn learner_path_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.rule_id.is_learner_path())
            .cloned()
            .collect()
    }
}
