//! Propose, critique, judge, repair: the bounded optimization loop.
//!
//! The loop tracks the best-scoring draft it has seen. That draft, not
//! necessarily the last one, is what [`LoopController::run`] returns.

use tracing::debug;

use crate::domain::{Curriculum, Result};
use crate::generation::GenerationClient;
use crate::metrics::METRICS;
use crate::obs;
use crate::planning::{GenerationSpec, Proposer};
use crate::policy::ModelPolicy;
use crate::quality::{critique, evaluate, PedagogyCritique, QualityReport};
use crate::repair::{RepairExecutor, RepairPlanner};
use crate::resources::ResourceResolver;
use crate::trace::{IterationTrace, OptimizationTrace, StopReason, TRACE_SCHEMA_VERSION};

/// Emitted curriculum plus its audit trace.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeResult {
    pub curriculum: Curriculum,
    pub trace: OptimizationTrace,
}

/// A draft with the critique and report computed for it.
struct Judged {
    curriculum: Curriculum,
    pedagogy: PedagogyCritique,
    report: QualityReport,
}

impl Judged {
    fn new(curriculum: Curriculum, spec: &GenerationSpec) -> Self {
        let pedagogy = critique(&curriculum, &spec.topic_spec);
        let report = evaluate(&curriculum, &spec.topic_spec, &pedagogy);
        Self {
            curriculum,
            pedagogy,
            report,
        }
    }

    fn accepted(&self, target_score: u32) -> bool {
        self.report.hard_fail_count == 0
            && self.report.total_score >= target_score
            && self.pedagogy.min_quality_met
    }
}

pub struct LoopController<'a> {
    policy: &'a ModelPolicy,
    resolver: &'a dyn ResourceResolver,
    client: Option<&'a GenerationClient>,
}

impl<'a> LoopController<'a> {
    pub fn new(
        policy: &'a ModelPolicy,
        resolver: &'a dyn ResourceResolver,
        client: Option<&'a GenerationClient>,
    ) -> Self {
        Self {
            policy,
            resolver,
            client,
        }
    }

    /// Run the loop for one generation plan.
    ///
    /// Only proposal can fail. Quality defects end up in the trace; the loop
    /// always returns its best draft.
    pub fn run(&self, spec: &GenerationSpec) -> Result<OptimizeResult> {
        let _span = obs::OptimizeSpan::enter(&spec.topic_label);
        obs::emit_optimize_started(&spec.topic_label, spec.target_nodes, self.policy.max_iterations);
        METRICS.inc_optimizations();

        let planner = RepairPlanner::new(self.policy.max_actions_per_iteration);
        let executor = RepairExecutor::new(spec, self.resolver);
        let policy_snapshot = self.policy.snapshot();

        let draft = Proposer::new(self.client).propose(spec, self.resolver, self.policy)?;
        let mut current = Judged::new(draft, spec);
        let mut best = current.curriculum.clone();
        let mut best_score = current.report.total_score;
        let mut iterations = Vec::new();
        let mut stop_reason = StopReason::MaxIterationsReached;
        let mut accepted = false;

        for iteration in 1..=self.policy.max_iterations {
            METRICS.inc_iterations();
            obs::emit_iteration_scored(
                iteration,
                current.report.total_score,
                current.report.hard_fail_count,
            );
            if current.report.total_score > best_score {
                best = current.curriculum.clone();
                best_score = current.report.total_score;
            }

            let actions = planner.plan(&current.report, &current.pedagogy);
            let mut record = IterationTrace {
                iteration,
                model_policy: policy_snapshot.clone(),
                pedagogy_summary: current.pedagogy.summary(),
                score_summary: current.report.score_summary(),
                learner_path_diagnostics: current.report.learner_path_diagnostics(),
                selected_actions: actions.clone(),
                post_score_summary: current.report.score_summary(),
            };

            if current.accepted(self.policy.target_score) {
                if current.report.total_score >= best_score {
                    best = current.curriculum.clone();
                    best_score = current.report.total_score;
                }
                accepted = true;
                stop_reason = StopReason::AcceptedThresholdMet;
                iterations.push(record);
                METRICS.inc_accepted();
                break;
            }
            if actions.is_empty() {
                stop_reason = StopReason::NoActionsAvailable;
                iterations.push(record);
                break;
            }

            let repaired = Judged::new(executor.apply(&current.curriculum, &actions), spec);
            METRICS.add_repair_actions(actions.len() as u64);
            obs::emit_repair_applied(iteration, actions.len(), repaired.report.total_score);
            record.post_score_summary = repaired.report.score_summary();
            iterations.push(record);

            if repaired.report.total_score > best_score {
                best = repaired.curriculum.clone();
                best_score = repaired.report.total_score;
            }
            current = repaired;
        }

        debug!(iterations = iterations.len(), best_score, "optimization loop finished");
        obs::emit_optimize_finished(stop_reason.as_str(), best_score, accepted, iterations.len());

        Ok(OptimizeResult {
            curriculum: best,
            trace: OptimizationTrace {
                schema_version: TRACE_SCHEMA_VERSION.to_string(),
                stop_reason,
                best_score,
                accepted,
                iterations,
            },
        })
    }
}
