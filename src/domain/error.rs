//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::record::NodeId;

/// Domain errors represent violations of the tree's invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node handle is no longer in the tree")]
    InvalidHandle,

    #[error("parent handle is no longer in the tree")]
    InvalidParent,

    #[error("shared node {alias} references missing master {master}")]
    DanglingAlias { alias: NodeId, master: NodeId },

    #[error("shared node {alias} references master {master} which is itself shared")]
    AliasChain { alias: NodeId, master: NodeId },

    #[error("node id {0} is used more than once")]
    DuplicateId(NodeId),

    #[error("bookmark references removed node {0}")]
    StaleBookmark(NodeId),

    #[error("cannot place node {node} below its own descendant {parent}")]
    CycleDetected { node: NodeId, parent: NodeId },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
