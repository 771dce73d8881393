//! Resolver for reference files named in the topic spec's context pack.

use crate::domain::{EvidenceMode, Resource, ResourceKind, ResourceRole};
use crate::resources::{ResourceRequest, ResourceResolver};

/// Attaches one local path per node, rotating through `context_pack.local_paths`.
///
/// Paths are passed through verbatim; the files are not read.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepoLocalResolver;

impl ResourceResolver for RepoLocalResolver {
    fn resolve(&self, request: &ResourceRequest<'_>) -> Vec<Resource> {
        let Some(pack) = request.topic_spec.context_pack.as_ref() else {
            return Vec::new();
        };
        if pack.local_paths.is_empty() {
            return Vec::new();
        }
        let path = &pack.local_paths[request.node_index % pack.local_paths.len()];
        vec![Resource {
            title: format!("Local reference: {path}"),
            url: path.clone(),
            kind: ResourceKind::Doc,
            role: ResourceRole::Reference,
            citation: (request.evidence_mode == EvidenceMode::Strict)
                .then(|| "Repository file".to_string()),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TopicSpec;
    use std::collections::BTreeSet;

    #[test]
    fn test_rotates_through_local_paths() {
        let spec = TopicSpec::from_value(&serde_json::json!({
            "goal": "g",
            "context_pack": {"local_paths": ["README.md", "docs/guide.md"]}
        }))
        .expect("spec");
        let used = BTreeSet::new();
        let mut request = ResourceRequest {
            topic_spec: &spec,
            node_id: "N2",
            node_index: 1,
            node_title: "t",
            prerequisites: &[],
            evidence_mode: EvidenceMode::Minimal,
            used_resource_urls: &used,
        };
        assert_eq!(RepoLocalResolver.resolve(&request)[0].url, "docs/guide.md");
        request.node_index = 2;
        let resources = RepoLocalResolver.resolve(&request);
        assert_eq!(resources[0].url, "README.md");
        assert_eq!(resources[0].role, ResourceRole::Reference);
    }

    #[test]
    fn test_no_context_pack_yields_nothing() {
        let spec = TopicSpec::from_value(&serde_json::json!({"goal": "g"})).expect("spec");
        let used = BTreeSet::new();
        let request = ResourceRequest {
            topic_spec: &spec,
            node_id: "N1",
            node_index: 0,
            node_title: "t",
            prerequisites: &[],
            evidence_mode: EvidenceMode::Strict,
            used_resource_urls: &used,
        };
        assert!(RepoLocalResolver.resolve(&request).is_empty());
    }
}
