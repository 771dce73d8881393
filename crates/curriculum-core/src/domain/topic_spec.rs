//! Topic spec: the immutable, declarative input to curriculum generation.

use serde::{Deserialize, Serialize};

use crate::domain::error::{CurriculumError, Result};

/// Evidence policy controlling resource count, roles, and citations per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceMode {
    #[default]
    Minimal,
    Standard,
    Strict,
}

impl EvidenceMode {
    /// Lenient parse: unknown or missing values fall back to `Minimal`.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("standard") => Self::Standard,
            Some("strict") => Self::Strict,
            _ => Self::Minimal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Standard => "standard",
            Self::Strict => "strict",
        }
    }
}

/// Maturity of the subject area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DomainMode {
    #[default]
    Mature,
    Frontier,
}

impl DomainMode {
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("frontier") => Self::Frontier,
            _ => Self::Mature,
        }
    }
}

/// Requested depth of treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    Survey,
    #[default]
    Practical,
    Mastery,
}

impl Depth {
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("survey") => Self::Survey,
            Some("mastery") => Self::Mastery,
            _ => Self::Practical,
        }
    }
}

/// Time and shape constraints for the curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    pub hours_per_week: f64,
    pub total_hours_min: f64,
    pub total_hours_max: f64,
    pub depth: Depth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_count_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_count_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_prerequisites_per_node: Option<u32>,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            hours_per_week: 6.0,
            total_hours_min: 8.0,
            total_hours_max: 40.0,
            depth: Depth::Practical,
            node_count_min: None,
            node_count_max: None,
            max_prerequisites_per_node: None,
        }
    }
}

/// Optional grounding material supplied with the topic spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContextPack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub focus_terms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_resource_kinds: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_outcomes: Vec<String>,
}

/// Normalized topic spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSpec {
    pub spec_version: String,
    pub goal: String,
    pub audience: String,
    pub prerequisites: Vec<String>,
    pub scope_in: Vec<String>,
    pub scope_out: Vec<String>,
    pub constraints: Constraints,
    pub domain_mode: DomainMode,
    pub evidence_mode: EvidenceMode,
    pub misconceptions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_pack: Option<ContextPack>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawConstraints {
    hours_per_week: Option<f64>,
    total_hours_min: Option<f64>,
    total_hours_max: Option<f64>,
    depth: Option<String>,
    node_count_min: Option<u32>,
    node_count_max: Option<u32>,
    max_prerequisites_per_node: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawContextPack {
    domain: Option<String>,
    focus_terms: Vec<String>,
    local_paths: Vec<String>,
    preferred_resource_kinds: Vec<String>,
    required_outcomes: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawTopicSpec {
    spec_version: Option<String>,
    goal: Option<String>,
    audience: Option<String>,
    prerequisites: Vec<String>,
    scope_in: Vec<String>,
    scope_out: Vec<String>,
    constraints: Option<RawConstraints>,
    domain_mode: Option<String>,
    evidence_mode: Option<String>,
    misconceptions: Vec<String>,
    context_pack: Option<RawContextPack>,
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

impl TopicSpec {
    /// Parse and normalize a raw topic spec payload.
    ///
    /// Missing optional fields take defaults; inverted ranges are widened so
    /// `max >= min`. A non-object payload, mistyped fields, or an empty goal
    /// are rejected as invalid arguments.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(CurriculumError::InvalidArgument(
                "topic_spec must be a JSON object".to_string(),
            ));
        }
        let raw: RawTopicSpec = serde_json::from_value(value.clone())
            .map_err(|e| CurriculumError::InvalidArgument(format!("topic_spec: {e}")))?;

        let goal = raw.goal.unwrap_or_default().trim().to_string();
        if goal.is_empty() {
            return Err(CurriculumError::InvalidArgument(
                "topic_spec.goal must be a non-empty string".to_string(),
            ));
        }

        let rc = raw.constraints.unwrap_or_default();
        let defaults = Constraints::default();
        let total_hours_min = rc.total_hours_min.unwrap_or(defaults.total_hours_min);
        let total_hours_max = rc
            .total_hours_max
            .unwrap_or(defaults.total_hours_max)
            .max(total_hours_min);
        if !(total_hours_min.is_finite() && total_hours_min >= 0.0) {
            return Err(CurriculumError::InvalidArgument(
                "constraints.total_hours_min must be a non-negative number".to_string(),
            ));
        }
        let constraints = Constraints {
            hours_per_week: rc.hours_per_week.unwrap_or(defaults.hours_per_week),
            total_hours_min,
            total_hours_max,
            depth: Depth::parse_lenient(rc.depth.as_deref()),
            node_count_min: rc.node_count_min.filter(|n| *n > 0),
            node_count_max: rc.node_count_max.filter(|n| *n > 0),
            max_prerequisites_per_node: rc.max_prerequisites_per_node,
        };

        let context_pack = raw.context_pack.map(|pack| ContextPack {
            domain: pack
                .domain
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            focus_terms: clean_list(pack.focus_terms),
            local_paths: clean_list(pack.local_paths),
            preferred_resource_kinds: clean_list(pack.preferred_resource_kinds),
            required_outcomes: clean_list(pack.required_outcomes),
        });

        Ok(Self {
            spec_version: raw.spec_version.unwrap_or_else(|| "1.0".to_string()),
            goal,
            audience: raw.audience.unwrap_or_default().trim().to_string(),
            prerequisites: clean_list(raw.prerequisites),
            scope_in: clean_list(raw.scope_in),
            scope_out: clean_list(raw.scope_out),
            constraints,
            domain_mode: DomainMode::parse_lenient(raw.domain_mode.as_deref()),
            evidence_mode: EvidenceMode::parse_lenient(raw.evidence_mode.as_deref()),
            misconceptions: clean_list(raw.misconceptions),
            context_pack,
        })
    }

    /// Text the resource and relevance heuristics match against.
    pub fn relevance_corpus(&self) -> String {
        let mut corpus = self.goal.clone();
        for item in &self.scope_in {
            corpus.push(' ');
            corpus.push_str(item);
        }
        if let Some(pack) = &self.context_pack {
            for term in &pack.focus_terms {
                corpus.push(' ');
                corpus.push_str(term);
            }
        }
        corpus.to_lowercase()
    }
}
