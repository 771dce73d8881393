//! Resource resolution for curriculum nodes.
//!
//! Resolvers are injected into the engine; nothing here performs network
//! I/O. The evidence contract per mode:
//!
//! | mode     | entries | roles                   | citation      |
//! |----------|---------|-------------------------|---------------|
//! | minimal  | >= 1    | any                     | optional      |
//! | standard | >= 2    | `definition`, `example` | optional      |
//! | strict   | >= 2    | `definition`, `example` | every entry   |

pub mod catalog;
pub mod local;

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::{EvidenceMode, Resource, ResourceRole, TopicSpec};

pub use catalog::{resource_pool_for_corpus, CatalogEntry, DeterministicResourceResolver};
pub use local::RepoLocalResolver;

/// Everything a resolver may use to pick resources for one node.
#[derive(Debug, Clone, Copy)]
pub struct ResourceRequest<'a> {
    pub topic_spec: &'a TopicSpec,
    pub node_id: &'a str,
    pub node_index: usize,
    pub node_title: &'a str,
    pub prerequisites: &'a [String],
    pub evidence_mode: EvidenceMode,
    /// URLs already attached to other nodes; sorted.
    pub used_resource_urls: &'a BTreeSet<String>,
}

/// Supplies resources for a node.
pub trait ResourceResolver: Send + Sync {
    fn resolve(&self, request: &ResourceRequest<'_>) -> Vec<Resource>;
}

impl<R: ResourceResolver + ?Sized> ResourceResolver for Arc<R> {
    fn resolve(&self, request: &ResourceRequest<'_>) -> Vec<Resource> {
        (**self).resolve(request)
    }
}

/// Runs resolvers in order and keeps the first entry for each URL.
pub struct CompositeResourceResolver {
    resolvers: Vec<Arc<dyn ResourceResolver>>,
}

impl CompositeResourceResolver {
    pub fn new(resolvers: Vec<Arc<dyn ResourceResolver>>) -> Self {
        Self { resolvers }
    }
}

impl ResourceResolver for CompositeResourceResolver {
    fn resolve(&self, request: &ResourceRequest<'_>) -> Vec<Resource> {
        let mut seen = BTreeSet::new();
        let mut merged = Vec::new();
        for resolver in &self.resolvers {
            for resource in resolver.resolve(request) {
                if seen.insert(resource.url.clone()) {
                    merged.push(resource);
                }
            }
        }
        merged
    }
}

/// Resolver used when the caller injects none.
///
/// Topic specs that name local reference files get those files appended to
/// the catalog resources.
pub fn default_resource_resolver(topic_spec: &TopicSpec) -> Arc<dyn ResourceResolver> {
    let has_local_paths = topic_spec
        .context_pack
        .as_ref()
        .is_some_and(|pack| !pack.local_paths.is_empty());
    if has_local_paths {
        Arc::new(CompositeResourceResolver::new(vec![
            Arc::new(DeterministicResourceResolver),
            Arc::new(RepoLocalResolver),
        ]))
    } else {
        Arc::new(DeterministicResourceResolver)
    }
}

/// Whether `resources` satisfy the evidence contract for `mode`.
pub fn meets_evidence_contract(resources: &[Resource], mode: EvidenceMode) -> bool {
    let has_role = |role: ResourceRole| resources.iter().any(|r| r.role == role);
    match mode {
        EvidenceMode::Minimal => !resources.is_empty(),
        EvidenceMode::Standard => {
            resources.len() >= 2 && has_role(ResourceRole::Definition) && has_role(ResourceRole::Example)
        }
        EvidenceMode::Strict => {
            resources.len() >= 2
                && has_role(ResourceRole::Definition)
                && has_role(ResourceRole::Example)
                && resources
                    .iter()
                    .all(|r| r.citation.as_deref().is_some_and(|c| !c.trim().is_empty()))
        }
    }
}
