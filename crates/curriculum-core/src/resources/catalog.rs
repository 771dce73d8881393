//! Deterministic reference catalogs and the default resolver built on them.

use std::collections::BTreeSet;

use crate::domain::{EvidenceMode, Resource, ResourceKind, ResourceRole};
use crate::resources::{ResourceRequest, ResourceResolver};

/// A fixed catalog reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: &'static str,
    pub url: &'static str,
    pub kind: ResourceKind,
    pub citation: &'static str,
}

const QUANTUM: &[CatalogEntry] = &[
    CatalogEntry {
        title: "Quantum Computation and Quantum Information (Nielsen & Chuang)",
        url: "https://doi.org/10.1017/CBO9780511976667",
        kind: ResourceKind::Book,
        citation: "Chapter 2",
    },
    CatalogEntry {
        title: "Variational Quantum Algorithms",
        url: "https://arxiv.org/abs/2012.09265",
        kind: ResourceKind::Paper,
        citation: "Sections 2-3",
    },
];

const MACHINE_LEARNING: &[CatalogEntry] = &[
    CatalogEntry {
        title: "Deep Learning (Goodfellow, Bengio, Courville)",
        url: "https://www.deeplearningbook.org/",
        kind: ResourceKind::Book,
        citation: "Chapters 6-8",
    },
    CatalogEntry {
        title: "PennyLane Demo: Variational classifier",
        url: "https://pennylane.ai/qml/demos/tutorial_variational_classifier",
        kind: ResourceKind::Doc,
        citation: "Demo implementation",
    },
];

const AGENTIC_SYSTEMS: &[CatalogEntry] = &[
    CatalogEntry {
        title: "Designing LLM Agentic Workflows",
        url: "https://www.anthropic.com/engineering/building-effective-agents",
        kind: ResourceKind::Doc,
        citation: "Workflow patterns section",
    },
    CatalogEntry {
        title: "OpenAI Cookbook: Structured Outputs",
        url: "https://cookbook.openai.com/",
        kind: ResourceKind::Doc,
        citation: "JSON schema generation examples",
    },
    CatalogEntry {
        title: "Google SRE Workbook",
        url: "https://sre.google/workbook/table-of-contents/",
        kind: ResourceKind::Book,
        citation: "SLO and incident response chapters",
    },
];

const GENERAL: &[CatalogEntry] = &[
    CatalogEntry {
        title: "Stanford Encyclopedia of Philosophy",
        url: "https://plato.stanford.edu/",
        kind: ResourceKind::Doc,
        citation: "Relevant entry",
    },
    CatalogEntry {
        title: "Wikipedia",
        url: "https://en.wikipedia.org/",
        kind: ResourceKind::Doc,
        citation: "Relevant article",
    },
];

const SEARCH_BASE: &str = "https://en.wikipedia.org/w/index.php?search=";
const MAX_QUERY_TERMS: usize = 8;

/// Catalog matching the topic corpus; the first matching domain wins.
pub fn resource_pool_for_corpus(corpus: &str) -> &'static [CatalogEntry] {
    let lowered = corpus.to_lowercase();
    let any = |terms: &[&str]| terms.iter().any(|t| lowered.contains(t));
    if any(&["quantum", "qubit", "qnn", "nisq"]) {
        QUANTUM
    } else if any(&["neural", "machine learning", "optimization", "model"]) {
        MACHINE_LEARNING
    } else if any(&["agent", "orchestration", "reliability", "validator", "dag"]) {
        AGENTIC_SYSTEMS
    } else {
        GENERAL
    }
}

fn search_terms(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Default resolver: a title-anchored encyclopedia search for the
/// `definition` role plus a catalog reference for the `example` role.
///
/// Catalog entries rotate by node index and unused URLs are preferred.
/// Output depends only on the request, so runs are reproducible.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicResourceResolver;

impl DeterministicResourceResolver {
    fn definition(request: &ResourceRequest<'_>, strict: bool) -> Resource {
        let mut seen = BTreeSet::new();
        let terms: Vec<String> = search_terms(request.node_title)
            .into_iter()
            .chain(search_terms(&request.topic_spec.goal))
            .filter(|t| seen.insert(t.clone()))
            .take(MAX_QUERY_TERMS)
            .collect();
        Resource {
            title: format!("Encyclopedia search: {}", terms.join(" ")),
            url: format!("{SEARCH_BASE}{}", terms.join("+")),
            kind: ResourceKind::Doc,
            role: ResourceRole::Definition,
            citation: strict.then(|| "Overview and terminology sections".to_string()),
        }
    }

    fn example(request: &ResourceRequest<'_>, strict: bool) -> Resource {
        let pool = resource_pool_for_corpus(&request.topic_spec.relevance_corpus());
        let start = request.node_index % pool.len();
        let entry = (0..pool.len())
            .map(|offset| &pool[(start + offset) % pool.len()])
            .find(|entry| !request.used_resource_urls.contains(entry.url))
            .unwrap_or(&pool[start]);
        Resource {
            title: entry.title.to_string(),
            url: entry.url.to_string(),
            kind: entry.kind,
            role: ResourceRole::Example,
            citation: strict.then(|| entry.citation.to_string()),
        }
    }
}

impl ResourceResolver for DeterministicResourceResolver {
    fn resolve(&self, request: &ResourceRequest<'_>) -> Vec<Resource> {
        let strict = request.evidence_mode == EvidenceMode::Strict;
        vec![Self::definition(request, strict), Self::example(request, strict)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TopicSpec;
    use crate::resources::meets_evidence_contract;

    fn spec(goal: &str, mode: &str) -> TopicSpec {
        TopicSpec::from_value(&serde_json::json!({"goal": goal, "evidence_mode": mode}))
            .expect("spec")
    }

    fn request<'a>(
        spec: &'a TopicSpec,
        index: usize,
        title: &'a str,
        used: &'a BTreeSet<String>,
    ) -> ResourceRequest<'a> {
        ResourceRequest {
            topic_spec: spec,
            node_id: "N1",
            node_index: index,
            node_title: title,
            prerequisites: &[],
            evidence_mode: spec.evidence_mode,
            used_resource_urls: used,
        }
    }

    #[test]
    fn test_pool_selection_by_corpus() {
        assert_eq!(resource_pool_for_corpus("Intro to QUBIT control")[0].kind, ResourceKind::Book);
        assert_eq!(
            resource_pool_for_corpus("agent orchestration").len(),
            AGENTIC_SYSTEMS.len()
        );
        assert_eq!(resource_pool_for_corpus("medieval poetry")[1].url, "https://en.wikipedia.org/");
    }

    #[test]
    fn test_definition_search_is_title_anchored() {
        let spec = spec("Learn graph theory", "standard");
        let used = BTreeSet::new();
        let resources =
            DeterministicResourceResolver.resolve(&request(&spec, 0, "Shortest paths & heaps", &used));
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].role, ResourceRole::Definition);
        assert!(resources[0]
            .url
            .ends_with("search=shortest+paths+heaps+learn+graph+theory"));
        assert_eq!(resources[1].role, ResourceRole::Example);
        assert!(meets_evidence_contract(&resources, spec.evidence_mode));
    }

    #[test]
    fn test_example_prefers_unused_urls() {
        let spec = spec("Build agent orchestration", "strict");
        let used: BTreeSet<String> = [AGENTIC_SYSTEMS[1].url.to_string()].into_iter().collect();
        let resources = DeterministicResourceResolver.resolve(&request(&spec, 1, "Routing", &used));
        assert_eq!(resources[1].url, AGENTIC_SYSTEMS[2].url);
        assert!(resources.iter().all(|r| r.citation.is_some()));
        assert!(meets_evidence_contract(&resources, EvidenceMode::Strict));
    }

    #[test]
    fn test_example_falls_back_when_pool_exhausted() {
        let spec = spec("Read poetry", "minimal");
        let used: BTreeSet<String> = GENERAL.iter().map(|e| e.url.to_string()).collect();
        let resources = DeterministicResourceResolver.resolve(&request(&spec, 3, "Meter", &used));
        assert_eq!(resources[1].url, GENERAL[1].url);
        assert!(resources[1].citation.is_none());
    }
}
