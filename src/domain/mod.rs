//! Domain layer: node records and the components that keep the tree consistent
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod bookmarks;
pub mod error;
pub mod exclusion;
pub mod identity;
pub mod record;
pub mod sequence;
pub mod shared;
pub mod summary;
pub mod tags;

pub use arena::{NodeHandle, TreeArena, TreeNode};
pub use bookmarks::BookmarkRegistry;
pub use error::{DomainError, DomainResult};
pub use exclusion::{SearchExclusionResolver, TraversalReport};
pub use identity::{IdRemapping, IdentityAllocator};
pub use record::*;
pub use shared::{IdIndex, SharedMap, SharedNodeRegistry};
pub use summary::SummaryInfo;
pub use tags::{tokenize_tags, TagIndex};
