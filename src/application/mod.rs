//! Application layer: the node store orchestrating the domain components
//!
//! This layer owns the tree and reports changes through the I/O boundary traits.

pub mod error;
pub mod store;

pub use error::{ApplicationError, ApplicationResult};
pub use store::{BufferEvent, ImportNode, NodeStore};
