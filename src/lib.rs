//! Hierarchical note store.
//!
//! A tree of content-bearing nodes with stable ids, per-parent ordering,
//! shared (aliased) nodes, bookmarks, a tag index and inherited search
//! exclusion. The store reports what changed through
//! [`infrastructure::traits::PendingEditSink`]; it never touches storage.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{BufferEvent, ImportNode, NodeStore};
pub use domain::{NodeHandle, NodeId, NodeRecord};
