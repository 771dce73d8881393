//! Typed repair actions.

use serde::{Deserialize, Serialize};

use crate::quality::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairActionType {
    SplitNode,
    MergeNodes,
    RewriteNode,
    RewirePrereqs,
    RetargetResources,
    RetimeNode,
    ReorderNodes,
}

impl RepairActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SplitNode => "split_node",
            Self::MergeNodes => "merge_nodes",
            Self::RewriteNode => "rewrite_node",
            Self::RewirePrereqs => "rewire_prereqs",
            Self::RetargetResources => "retarget_resources",
            Self::RetimeNode => "retime_node",
            Self::ReorderNodes => "reorder_nodes",
        }
    }
}

/// One targeted mutation. `node_id` is absent for graph-scoped actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairAction {
    pub action_type: RepairActionType,
    pub reason: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_a: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_b: Option<String>,
}

impl RepairAction {
    pub fn new(action_type: RepairActionType, reason: impl Into<String>, severity: Severity) -> Self {
        Self {
            action_type,
            reason: reason.into(),
            severity,
            node_id: None,
            node_a: None,
            node_b: None,
        }
    }

    pub fn targeting(mut self, node_id: Option<String>) -> Self {
        self.node_id = node_id;
        self
    }

    /// Whether [`RepairExecutor`](crate::repair::RepairExecutor) can act on this.
    ///
    /// Split and merge are never applied. Rewrite and retime need a node.
    pub fn is_applicable(&self) -> bool {
        match self.action_type {
            RepairActionType::SplitNode | RepairActionType::MergeNodes => false,
            RepairActionType::RewriteNode | RepairActionType::RetimeNode => self.node_id.is_some(),
            RepairActionType::RewirePrereqs
            | RepairActionType::RetargetResources
            | RepairActionType::ReorderNodes => true,
        }
    }
}
