//! Integrity checks and explicit reconciliation passes

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use super::{EditBatch, NodeStore};
use crate::domain::{DomainError, DomainResult, NodeId, SharedNodeRegistry, SummaryInfo};
use crate::infrastructure::traits::PendingEdit;

impl NodeStore {
    /// Every integrity violation found by a full scan.
    ///
    /// Reports repeated ids, aliases whose master is missing or shared, and
    /// bookmarks of removed nodes.
    #[instrument(level = "debug", skip(self))]
    pub fn integrity_issues(&self) -> Vec<DomainError> {
        let mut issues = Vec::new();

        let mut seen: HashSet<NodeId> = HashSet::new();
        for (_, node) in self.arena.iter() {
            let id = node.record.id;
            if id <= 0 || !seen.insert(id) {
                issues.push(DomainError::DuplicateId(id));
            }
        }

        let shared = SharedNodeRegistry::new(&self.arena, &self.ids);
        for (idx, node) in self.arena.iter() {
            if node.record.is_shared() {
                if let Err(e) = shared.resolve_data_holder(idx) {
                    issues.push(e);
                }
            }
        }

        for &id in self.bookmarks.list() {
            if self.get_node_from_node_id(id).is_none() {
                issues.push(DomainError::StaleBookmark(id));
            }
        }

        if !issues.is_empty() {
            warn!(count = issues.len(), "integrity issues found");
        }
        issues
    }

    /// First integrity violation, if any. Duplicate ids are reported first.
    pub fn validate(&self) -> DomainResult<()> {
        let mut issues = self.integrity_issues();
        issues.sort_by_key(|e| !matches!(e, DomainError::DuplicateId(_)));
        match issues.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Drop bookmarks of nodes no longer in the tree; returns the dropped ids.
    #[instrument(level = "debug", skip(self))]
    pub fn reconcile_bookmarks(&mut self) -> Vec<NodeId> {
        let live = &self.ids;
        let arena = &self.arena;
        let dropped = self
            .bookmarks
            .retain(|id| live.get(&id).is_some_and(|&idx| arena.contains(idx)));
        if !dropped.is_empty() {
            debug!(?dropped, "stale bookmarks dropped");
            let mut batch = EditBatch::default();
            batch.push(PendingEdit::BookmarksChanged);
            self.flush(batch);
        }
        dropped
    }

    pub fn summary_info(&self) -> SummaryInfo {
        SummaryInfo::collect(&self.arena)
    }
}
