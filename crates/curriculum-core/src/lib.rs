//! Curriculum Core Library
//!
//! Turns a declarative topic spec into a validated curriculum DAG through a
//! bounded propose, critique, judge, repair loop.

pub mod artifacts;
pub mod dag;
pub mod domain;
pub mod engine;
pub mod generation;
pub mod metrics;
pub mod obs;
pub mod optimizer;
pub mod planning;
pub mod policy;
pub mod quality;
pub mod repair;
pub mod resources;
pub mod telemetry;
pub mod trace;

pub use domain::{
    content_digest, index_from_id, node_id, value_digest, Constraints, ContextPack, Curriculum,
    CurriculumError, CurriculumNode, Depth, DomainMode, ErrorCode, EvidenceMode, MasteryCheck,
    OpenQuestion, Resource, ResourceKind, ResourceRole, Result, TopicSpec,
};

pub use artifacts::{
    read_curriculum_artifact, read_trace_artifact, verify_artifacts, write_artifacts,
    ArtifactManifest,
};
pub use dag::{is_acyclic, max_depth, reachable_from_roots, topological_order, DagNode};
pub use engine::{score_curriculum, CurriculumEngine};
pub use generation::{
    GenerationClient, GenerationRequest, GeneratorFailure, InternalTextGenerator, TextGenerator,
};
pub use optimizer::{LoopController, OptimizeResult};
pub use planning::{draft_curriculum, GenerationSpec, NodeStage, Proposer};
pub use policy::{ModelPolicy, ModelProvider};
pub use quality::{
    critique, evaluate, Diagnostic, PedagogyCritique, QualityDimensions, QualityReport, RuleId,
    ScoreSummary, Severity,
};
pub use repair::{RepairAction, RepairActionType, RepairExecutor, RepairPlanner};
pub use resources::{
    default_resource_resolver, meets_evidence_contract, CompositeResourceResolver,
    DeterministicResourceResolver, RepoLocalResolver, ResourceRequest, ResourceResolver,
};
pub use trace::{IterationTrace, OptimizationTrace, StopReason};

pub use metrics::METRICS;
pub use obs::OptimizeSpan;
pub use telemetry::init_tracing;

/// Curriculum engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
