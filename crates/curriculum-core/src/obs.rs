//! Structured observability hooks for the optimization loop.
//!
//! - `OptimizeSpan` RAII guard scoping every event of one `optimize` call
//! - `emit_*` functions for the loop's lifecycle events
//!
//! Events are emitted at `info!` unless noted; filter with `RUST_LOG`.

use tracing::info;

/// RAII guard that enters a span tagged with the topic label.
///
/// ```ignore
/// let _span = OptimizeSpan::enter("Learn Rust ownership");
/// ```
pub struct OptimizeSpan {
    _span: tracing::span::EnteredSpan,
}

impl OptimizeSpan {
    pub fn enter(topic: &str) -> Self {
        let span = tracing::info_span!("curriculum.optimize", topic = %topic);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_optimize_started(topic: &str, target_nodes: usize, max_iterations: u32) {
    info!(
        event = "optimize.started",
        topic = %topic,
        target_nodes = target_nodes,
        max_iterations = max_iterations,
    );
}

/// Emit event: one draft was critiqued and judged.
pub fn emit_iteration_scored(iteration: u32, total_score: u32, hard_fail_count: usize) {
    info!(
        event = "optimize.iteration_scored",
        iteration = iteration,
        total_score = total_score,
        hard_fail_count = hard_fail_count,
    );
}

pub fn emit_repair_applied(iteration: u32, actions: usize, post_score: u32) {
    info!(
        event = "optimize.repair_applied",
        iteration = iteration,
        actions = actions,
        post_score = post_score,
    );
}

pub fn emit_optimize_finished(stop_reason: &str, best_score: u32, accepted: bool, iterations: usize) {
    info!(
        event = "optimize.finished",
        stop_reason = %stop_reason,
        best_score = best_score,
        accepted = accepted,
        iterations = iterations,
    );
}

/// Emit event: a resolver returned resources below the evidence contract (warning level).
pub fn emit_resolver_contract_violation(node_id: &str, evidence_mode: &str, returned: usize) {
    tracing::warn!(
        event = "resolver.contract_violation",
        node_id = %node_id,
        evidence_mode = %evidence_mode,
        returned = returned,
    );
}
