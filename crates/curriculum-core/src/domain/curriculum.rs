//! Curriculum artifact: an ordered list of learning nodes forming a DAG.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::error::{CurriculumError, Result};

/// Kind of learning resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Doc,
    Paper,
    Video,
    Book,
    Spec,
    #[serde(other)]
    Other,
}

/// Pedagogical role a resource plays for its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceRole {
    Definition,
    Example,
    Reference,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
    pub kind: ResourceKind,
    pub role: ResourceRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

/// Task a learner completes to demonstrate mastery, plus how it is judged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryCheck {
    pub task: String,
    pub pass_criteria: String,
}

/// One node of the curriculum DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumNode {
    pub id: String,
    pub title: String,
    pub capability: String,
    pub prerequisites: Vec<String>,
    pub core_ideas: Vec<String>,
    pub pitfalls: Vec<String>,
    pub mastery_check: MasteryCheck,
    #[serde(deserialize_with = "minutes_from_number")]
    pub estimate_minutes: u32,
    pub resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate_confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenQuestion {
    pub question: String,
    pub related_nodes: Vec<String>,
    pub status: String,
}

/// The produced artifact. Replaced wholesale each iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curriculum {
    pub topic: String,
    pub nodes: Vec<CurriculumNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_questions: Option<Vec<OpenQuestion>>,
}

impl Curriculum {
    /// Parse a draft returned by an external collaborator.
    ///
    /// Any shape mismatch is an internal error attributed to `stage`.
    pub fn from_value(stage: &str, value: &serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(CurriculumError::internal(
                stage,
                "curriculum payload must be an object",
            ));
        }
        serde_json::from_value(value.clone())
            .map_err(|e| CurriculumError::internal(stage, format!("ill-shaped curriculum: {e}")))
    }

    pub fn node(&self, id: &str) -> Option<&CurriculumNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Sum of all node estimates, in minutes.
    pub fn total_minutes(&self) -> u64 {
        self.nodes.iter().map(|n| u64::from(n.estimate_minutes)).sum()
    }
}

/// Node id for a zero-based ordinal (`0 -> "N1"`).
pub fn node_id(index: usize) -> String {
    format!("N{}", index + 1)
}

/// Zero-based ordinal encoded in an `N<k>` id, if any.
pub fn index_from_id(id: &str) -> Option<usize> {
    let digits = id.strip_prefix('N')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<usize>().ok()?.checked_sub(1)
}

fn minutes_from_number<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() || raw < 0.0 || raw > f64::from(u32::MAX) {
        return Err(serde::de::Error::custom(
            "estimate_minutes must be a non-negative number",
        ));
    }
    if raw.fract() != 0.0 {
        return Err(serde::de::Error::custom(format!(
            "estimate_minutes must be a whole number of minutes, got {raw}"
        )));
    }
    Ok(raw as u32)
}
