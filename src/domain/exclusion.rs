//! Search exclusion: own flag OR any ancestor's child-exclusion flag

use generational_arena::Index;

use crate::domain::arena::TreeArena;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::record::NodeRecord;
use crate::domain::shared::{IdIndex, SharedNodeRegistry};

/// Outcome of a traversal that honours exclusion flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalReport {
    /// Nodes handed to the visitor
    pub visited: usize,
    /// Nodes skipped because they are excluded
    pub skipped: usize,
}

impl TraversalReport {
    pub fn hit_exclusion(&self) -> bool {
        self.skipped > 0
    }
}

/// Evaluates effective exclusion, reading flags through the data holder.
pub struct SearchExclusionResolver<'a> {
    arena: &'a TreeArena,
    shared: SharedNodeRegistry<'a>,
}

impl<'a> SearchExclusionResolver<'a> {
    pub fn new(arena: &'a TreeArena, ids: &'a IdIndex) -> Self {
        Self {
            arena,
            shared: SharedNodeRegistry::new(arena, ids),
        }
    }

    fn holder_record(&self, idx: Index) -> DomainResult<&'a NodeRecord> {
        let holder = self.shared.resolve_data_holder(idx)?;
        let arena: &'a TreeArena = self.arena;
        arena
            .get_node(holder)
            .map(|n| &n.record)
            .ok_or(DomainError::InvalidHandle)
    }

    /// Own flag, then each ancestor's child flag up to the root.
    pub fn is_excluded(&self, idx: Index) -> DomainResult<bool> {
        if self.holder_record(idx)?.exclude_me_from_search {
            return Ok(true);
        }
        let mut current = self.arena.parent(idx);
        while let Some(ancestor) = current {
            if self.holder_record(ancestor)?.exclude_children_from_search {
                return Ok(true);
            }
            current = self.arena.parent(ancestor);
        }
        Ok(false)
    }

    /// Preorder walk that skips excluded nodes and whole excluded subtrees.
    ///
    /// A node with only `exclude_children_from_search` is visited itself;
    /// its descendants are counted as skipped.
    pub fn walk(&self, mut visit: impl FnMut(Index, &NodeRecord)) -> DomainResult<TraversalReport> {
        let mut report = TraversalReport::default();
        let mut stack: Vec<(Index, bool)> =
            self.arena.roots().iter().rev().map(|&r| (r, false)).collect();
        while let Some((idx, inherited)) = stack.pop() {
            let Some(node) = self.arena.get_node(idx) else {
                continue;
            };
            let holder = self.holder_record(idx)?;
            if inherited || holder.exclude_me_from_search {
                report.skipped += 1;
            } else {
                report.visited += 1;
                visit(idx, &node.record);
            }
            let excluded_below = inherited || holder.exclude_children_from_search;
            for &child in node.children.iter().rev() {
                stack.push((child, excluded_below));
            }
        }
        Ok(report)
    }
}
