//! Domain models for the curriculum engine.
//!
//! Canonical definitions for the core entities:
//! - `TopicSpec`: immutable declarative input
//! - `Curriculum`: the produced DAG of learning nodes
//! - `CurriculumError`: error taxonomy shared by every stage

pub mod curriculum;
pub mod digest;
pub mod error;
pub mod topic_spec;

pub use curriculum::{
    index_from_id, node_id, Curriculum, CurriculumNode, MasteryCheck, OpenQuestion, Resource,
    ResourceKind, ResourceRole,
};
pub use digest::{content_digest, value_digest};
pub use error::{CurriculumError, ErrorCode, Result};
pub use topic_spec::{Constraints, ContextPack, Depth, DomainMode, EvidenceMode, TopicSpec};
