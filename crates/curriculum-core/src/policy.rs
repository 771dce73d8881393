//! Model policy: loop budgets, acceptance threshold, and collaborator settings.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{CurriculumError, Result};

/// Source of natural-language drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelProvider {
    /// Deterministic heuristics only; no external collaborator.
    #[default]
    Internal,
    RemoteLlm,
    CodingAgent,
}

impl ModelProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::RemoteLlm => "remote_llm",
            Self::CodingAgent => "coding_agent",
        }
    }

    pub fn is_internal(self) -> bool {
        matches!(self, Self::Internal)
    }
}

impl FromStr for ModelProvider {
    type Err = CurriculumError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "internal" => Ok(Self::Internal),
            "remote_llm" => Ok(Self::RemoteLlm),
            "coding_agent" => Ok(Self::CodingAgent),
            other => Err(CurriculumError::Config(format!(
                "unsupported provider '{other}' (expected internal, remote_llm, coding_agent)"
            ))),
        }
    }
}

/// Policy governing one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPolicy {
    pub provider: ModelProvider,
    #[serde(rename = "model")]
    pub model_id: String,
    pub temperature: f64,
    pub max_iterations: u32,
    pub max_actions_per_iteration: usize,
    pub target_score: u32,
    pub timeout_seconds: u64,
    pub retry_budget: u32,
    pub schema_version: String,
}

impl Default for ModelPolicy {
    fn default() -> Self {
        Self {
            provider: ModelProvider::Internal,
            model_id: "internal-heuristic-v1".to_string(),
            temperature: 0.0,
            max_iterations: 4,
            max_actions_per_iteration: 4,
            target_score: 82,
            timeout_seconds: 30,
            retry_budget: 1,
            schema_version: "1.0".to_string(),
        }
    }
}

impl ModelPolicy {
    /// Defaults overlaid with `AGENT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`. Blank values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut policy = Self::default();

        if let Some(provider) = get("AGENT_PROVIDER") {
            policy.provider = provider.parse()?;
        }
        if let Some(model) = get("AGENT_MODEL") {
            policy.model_id = model;
        }
        if let Some(raw) = get("AGENT_MAX_ITERATIONS") {
            policy.max_iterations = parse_var("AGENT_MAX_ITERATIONS", &raw)?;
        }
        if let Some(raw) = get("AGENT_MAX_ACTIONS") {
            policy.max_actions_per_iteration = parse_var("AGENT_MAX_ACTIONS", &raw)?;
        }
        if let Some(raw) = get("AGENT_TARGET_SCORE") {
            policy.target_score = parse_var("AGENT_TARGET_SCORE", &raw)?;
        }
        if let Some(raw) = get("AGENT_TIMEOUT_SECONDS") {
            policy.timeout_seconds = parse_var("AGENT_TIMEOUT_SECONDS", &raw)?;
        }
        if let Some(raw) = get("AGENT_RETRY_BUDGET") {
            policy.retry_budget = parse_var("AGENT_RETRY_BUDGET", &raw)?;
        }
        policy.validate()?;
        Ok(policy)
    }

    /// Reject budgets the loop cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(CurriculumError::Config(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.target_score > 100 {
            return Err(CurriculumError::Config(format!(
                "target_score {} exceeds 100",
                self.target_score
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(CurriculumError::Config(
                "timeout_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Serializable snapshot recorded in each trace iteration.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "provider": self.provider.as_str(),
            "model": self.model_id,
            "temperature": self.temperature,
            "max_iterations": self.max_iterations,
            "max_actions_per_iteration": self.max_actions_per_iteration,
            "target_score": self.target_score,
            "timeout_seconds": self.timeout_seconds,
            "retry_budget": self.retry_budget,
            "schema_version": self.schema_version,
        })
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse::<T>()
        .map_err(|_| CurriculumError::Config(format!("{key} has invalid value '{raw}'")))
}
