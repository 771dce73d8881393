//! Optimization trace: the per-iteration audit record of one run.

use serde::{Deserialize, Serialize};

use crate::quality::{Diagnostic, PedagogySummary, ScoreSummary};
use crate::repair::RepairAction;

pub const TRACE_SCHEMA_VERSION: &str = "1.0";

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    AcceptedThresholdMet,
    NoActionsAvailable,
    MaxIterationsReached,
}

impl StopReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AcceptedThresholdMet => "accepted_threshold_met",
            Self::NoActionsAvailable => "no_actions_available",
            Self::MaxIterationsReached => "max_iterations_reached",
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One critique/judge/repair round.
///
/// `post_score_summary` equals `score_summary` when the round ended the loop
/// without repairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationTrace {
    pub iteration: u32,
    pub model_policy: serde_json::Value,
    pub pedagogy_summary: PedagogySummary,
    pub score_summary: ScoreSummary,
    pub learner_path_diagnostics: Vec<Diagnostic>,
    pub selected_actions: Vec<RepairAction>,
    pub post_score_summary: ScoreSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationTrace {
    pub schema_version: String,
    pub stop_reason: StopReason,
    pub best_score: u32,
    pub accepted: bool,
    pub iterations: Vec<IterationTrace>,
}
