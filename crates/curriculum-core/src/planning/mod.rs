//! Draft construction: generation plan, node synthesis, and proposal.

pub mod node_builder;
pub mod proposer;
pub mod spec;

pub use node_builder::{
    build_node, node_capability, node_core_ideas, node_mastery, node_pitfalls, node_prerequisites,
    resolve_resources, stage_for_index, NodeStage,
};
pub use proposer::{draft_curriculum, Proposer};
pub use spec::{distribute_minutes, seed_titles, target_nodes, topic_label, total_minutes, GenerationSpec};
