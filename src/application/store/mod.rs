//! Node store: owns the tree and keeps identity, ordering, sharing,
//! bookmarks and tags consistent across every structural edit.

mod content;
mod import;
mod integrity;

use std::cell::Cell;
use std::collections::BTreeSet;
use std::sync::Arc;

use generational_arena::Index;
use tracing::{debug, instrument, trace};

use crate::config::StoreConfig;
use crate::domain::sequence;
use crate::domain::{
    weight_from_is_bold, BookmarkRegistry, DomainError, DomainResult, IdIndex,
    IdentityAllocator, NodeHandle, NodeId, NodeRecord, SearchExclusionResolver, SharedMap,
    SharedNodeRegistry, TagIndex, TraversalReport, TreeArena,
};
use crate::infrastructure::traits::{PendingEdit, PendingEditSink};

pub use content::BufferEvent;
pub use import::ImportNode;

/// Notifications gathered during one operation, deduplicated in arrival order.
#[derive(Debug, Default)]
struct EditBatch {
    edits: Vec<PendingEdit>,
}

impl EditBatch {
    fn push(&mut self, edit: PendingEdit) {
        if !self.edits.contains(&edit) {
            self.edits.push(edit);
        }
    }
}

/// Hierarchical node store.
///
/// Nodes live in a generational arena; `NodeHandle`s go stale when their node
/// is removed. Every content read or write goes through
/// [`NodeStore::resolve_data_holder`], so shared nodes always see their
/// master's data.
pub struct NodeStore {
    arena: TreeArena,
    ids: IdIndex,
    allocator: IdentityAllocator,
    tags: TagIndex,
    bookmarks: BookmarkRegistry,
    config: StoreConfig,
    sink: Arc<dyn PendingEditSink>,
    muted: bool,
    // Store-scoped, not process-wide. Set by `walk_searchable`, reset only by
    // `clear_hit_exclusion_flag`, so callers must clear it before each traversal
    // they want to inspect.
    hit_exclusion: Cell<bool>,
}

impl NodeStore {
    pub fn new(sink: Arc<dyn PendingEditSink>) -> Self {
        Self::with_config(sink, StoreConfig::default())
    }

    pub fn with_config(sink: Arc<dyn PendingEditSink>, config: StoreConfig) -> Self {
        Self {
            arena: TreeArena::new(),
            ids: IdIndex::new(),
            allocator: IdentityAllocator::new(),
            tags: TagIndex::new(),
            bookmarks: BookmarkRegistry::new(),
            config,
            sink,
            muted: false,
            hit_exclusion: Cell::new(false),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    // ------------------------------------------------------------------
    // internals
    // ------------------------------------------------------------------

    fn flush(&self, batch: EditBatch) {
        if self.muted {
            trace!(count = batch.edits.len(), "pending edits muted");
            return;
        }
        for edit in batch.edits {
            self.sink.pending_edit(edit);
        }
    }

    fn idx(&self, handle: NodeHandle) -> DomainResult<Index> {
        let idx = handle.index();
        if self.arena.contains(idx) {
            Ok(idx)
        } else {
            Err(DomainError::InvalidHandle)
        }
    }

    fn parent_idx(&self, parent: Option<NodeHandle>) -> DomainResult<Option<Index>> {
        match parent {
            Some(p) if self.arena.contains(p.index()) => Ok(Some(p.index())),
            Some(_) => Err(DomainError::InvalidParent),
            None => Ok(None),
        }
    }

    fn id_of(&self, idx: Index) -> NodeId {
        self.arena.get_node(idx).map(|n| n.record.id).unwrap_or(0)
    }

    /// Id used in `HierarchyChanged`: the parent's id, `0` for the top level.
    fn parent_id(&self, parent: Option<Index>) -> NodeId {
        parent.map(|p| self.id_of(p)).unwrap_or(0)
    }

    fn record(&self, idx: Index) -> DomainResult<&NodeRecord> {
        self.arena
            .get_node(idx)
            .map(|n| &n.record)
            .ok_or(DomainError::InvalidHandle)
    }

    fn holder_idx(&self, idx: Index) -> DomainResult<Index> {
        SharedNodeRegistry::new(&self.arena, &self.ids).resolve_data_holder(idx)
    }

    /// Record holding the content fields of `handle`.
    fn content_record(&self, handle: NodeHandle) -> Option<&NodeRecord> {
        let idx = self.idx(handle).ok()?;
        let holder = self.holder_idx(idx).ok()?;
        self.arena.get_node(holder).map(|n| &n.record)
    }

    /// Reject a master that is missing, shared itself, or the node itself.
    fn check_master(&self, node_id: NodeId, master_id: NodeId) -> DomainResult<()> {
        if master_id == 0 {
            return Ok(());
        }
        if master_id == node_id {
            return Err(DomainError::AliasChain {
                alias: node_id,
                master: master_id,
            });
        }
        let master = self
            .get_node_from_node_id(master_id)
            .and_then(|h| self.arena.get_node(h.index()))
            .ok_or(DomainError::DanglingAlias {
                alias: node_id,
                master: master_id,
            })?;
        if master.record.is_shared() {
            return Err(DomainError::AliasChain {
                alias: node_id,
                master: master_id,
            });
        }
        Ok(())
    }

    /// Reserve the id `record` will get, then validate its master against
    /// that id; the reservation is dropped again when validation fails.
    fn reserve_checked_id(&mut self, record: &NodeRecord) -> DomainResult<NodeId> {
        let id = self.allocator.allocate_node_id(Some(record.id));
        if let Err(e) = self.check_master(id, record.shared_master_id) {
            self.allocator.release(id);
            return Err(e);
        }
        Ok(id)
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    /// Insert a record whose id is already allocated.
    fn insert_allocated(
        &mut self,
        mut record: NodeRecord,
        parent: Option<Index>,
        position: Option<usize>,
        batch: &mut EditBatch,
    ) -> Index {
        if self.config.stamp_new_nodes && record.creation_timestamp == 0 {
            record.creation_timestamp = Self::now();
        }
        if !record.is_shared() {
            self.tags.register_tags(&record.tags);
        }
        let id = record.id;
        let idx = self.arena.insert_node(record, parent, position);
        self.ids.insert(id, idx);
        self.allocator.observe(id);
        batch.push(PendingEdit::NewNode(id));
        batch.push(PendingEdit::HierarchyChanged(self.parent_id(parent)));
        idx
    }

    // ------------------------------------------------------------------
    // insertion
    // ------------------------------------------------------------------

    /// Insert `record` as the last child of `parent`, or as a new top-level node.
    ///
    /// A non-zero `record.id` is kept when free; otherwise a fresh id is used.
    #[instrument(level = "debug", skip(self, record), fields(name = %record.name))]
    pub fn append_node(
        &mut self,
        mut record: NodeRecord,
        parent: Option<NodeHandle>,
    ) -> DomainResult<NodeHandle> {
        let parent = self.parent_idx(parent)?;
        record.id = self.reserve_checked_id(&record)?;
        record.sequence = sequence::next_sequence(&self.arena, parent, self.config.sequence_base);

        let mut batch = EditBatch::default();
        let idx = self.insert_allocated(record, parent, None, &mut batch);
        self.flush(batch);
        Ok(NodeHandle(idx))
    }

    /// Insert `record` as the sibling directly following `after`.
    ///
    /// Siblings after the insertion point move up by one sequence value.
    #[instrument(level = "debug", skip(self, record), fields(name = %record.name))]
    pub fn insert_node_after(
        &mut self,
        mut record: NodeRecord,
        after: NodeHandle,
    ) -> DomainResult<NodeHandle> {
        let after = self.idx(after)?;
        let parent = self.arena.parent(after);
        let pos = self
            .arena
            .position_in_parent(after)
            .ok_or(DomainError::InvalidHandle)?
            + 1;
        let after_sequence = self.record(after)?.sequence;

        record.id = self.reserve_checked_id(&record)?;
        record.sequence = after_sequence + 1;

        let mut batch = EditBatch::default();
        sequence::shift_following(&mut self.arena, parent, pos);
        let idx = self.insert_allocated(record, parent, Some(pos), &mut batch);
        self.flush(batch);
        Ok(NodeHandle(idx))
    }

    // ------------------------------------------------------------------
    // record access
    // ------------------------------------------------------------------

    /// Effective record: content fields from the data holder, identity and
    /// sequence from the node itself. `include_content = false` leaves the
    /// buffer and anchored objects out.
    pub fn get_node_data(
        &self,
        handle: NodeHandle,
        include_content: bool,
    ) -> DomainResult<NodeRecord> {
        let idx = self.idx(handle)?;
        let mut data = self.record(idx)?.clone();
        let holder = self.holder_idx(idx)?;
        if holder != idx {
            data.take_content_from(self.record(holder)?, include_content);
        } else if !include_content {
            data.content = None;
            data.anchored_objects.clear();
        }
        Ok(data)
    }

    /// Write the content fields of `record` to the data holder of `handle`.
    ///
    /// `record.sequence` is applied to the node itself; `id` and
    /// `shared_master_id` are not changed here. A record without a buffer
    /// leaves the stored buffer and anchored objects untouched.
    #[instrument(level = "debug", skip(self, record))]
    pub fn update_node_data(&mut self, handle: NodeHandle, record: &NodeRecord) -> DomainResult<()> {
        let idx = self.idx(handle)?;
        let holder = self.holder_idx(idx)?;
        let mut batch = EditBatch::default();

        let holder_id = {
            let target = &mut self
                .arena
                .get_node_mut(holder)
                .ok_or(DomainError::InvalidHandle)?
                .record;
            let before_content = target.content;
            let keep_buffer = record.content.is_none();
            let saved_objects = std::mem::take(&mut target.anchored_objects);
            target.take_content_from(record, true);
            if keep_buffer {
                target.content = before_content;
                target.anchored_objects = saved_objects;
            }
            batch.push(PendingEdit::PropertyChanged(target.id));
            if target.content != before_content {
                batch.push(PendingEdit::ContentChanged(target.id));
            }
            target.id
        };
        let reordered_under = match self.arena.get_node_mut(idx) {
            Some(node) if node.record.sequence != record.sequence => {
                node.record.sequence = record.sequence;
                Some(node.parent)
            }
            _ => None,
        };
        if let Some(parent) = reordered_under {
            batch.push(PendingEdit::HierarchyChanged(self.parent_id(parent)));
        }
        self.tags.register_tags(&record.tags);
        debug!(holder_id, "node data updated");
        self.flush(batch);
        Ok(())
    }

    /// Apply `change` to the data holder; emits `PropertyChanged` when it
    /// reports a modification.
    fn modify_holder(
        &mut self,
        handle: NodeHandle,
        change: impl FnOnce(&mut NodeRecord) -> bool,
    ) -> DomainResult<()> {
        let idx = self.idx(handle)?;
        let holder = self.holder_idx(idx)?;
        let record = &mut self
            .arena
            .get_node_mut(holder)
            .ok_or(DomainError::InvalidHandle)?
            .record;
        if change(record) {
            let mut batch = EditBatch::default();
            batch.push(PendingEdit::PropertyChanged(record.id));
            self.flush(batch);
        }
        Ok(())
    }

    pub fn set_node_name(&mut self, handle: NodeHandle, name: &str) -> DomainResult<()> {
        self.modify_holder(handle, |r| {
            let changed = r.name != name;
            r.name = name.to_string();
            changed
        })
    }

    pub fn set_node_read_only(&mut self, handle: NodeHandle, read_only: bool) -> DomainResult<()> {
        self.modify_holder(handle, |r| {
            let changed = r.is_read_only != read_only;
            r.is_read_only = read_only;
            changed
        })
    }

    pub fn set_node_exclusion(
        &mut self,
        handle: NodeHandle,
        exclude_me: bool,
        exclude_children: bool,
    ) -> DomainResult<()> {
        self.modify_holder(handle, |r| {
            let changed = r.exclude_me_from_search != exclude_me
                || r.exclude_children_from_search != exclude_children;
            r.exclude_me_from_search = exclude_me;
            r.exclude_children_from_search = exclude_children;
            changed
        })
    }

    pub fn set_node_modification_time(&mut self, handle: NodeHandle, ts: i64) -> DomainResult<()> {
        self.modify_holder(handle, |r| {
            let changed = r.last_save_timestamp != ts;
            r.last_save_timestamp = ts;
            changed
        })
    }

    /// Turn a node into an alias of `master_id`, or back into a regular node with `0`.
    ///
    /// Fails when the master is missing or shared, or when the node is itself
    /// the master of other aliases.
    pub fn set_node_shared_master_id(
        &mut self,
        handle: NodeHandle,
        master_id: NodeId,
    ) -> DomainResult<()> {
        let idx = self.idx(handle)?;
        let node_id = self.id_of(idx);
        self.check_master(node_id, master_id)?;
        if master_id != 0 && self.build_shared_map().contains_key(&node_id) {
            return Err(DomainError::AliasChain {
                alias: node_id,
                master: master_id,
            });
        }
        let node = self.arena.get_node_mut(idx).ok_or(DomainError::InvalidHandle)?;
        if node.record.shared_master_id == master_id {
            return Ok(());
        }
        node.record.shared_master_id = master_id;
        let mut batch = EditBatch::default();
        batch.push(PendingEdit::PropertyChanged(node_id));
        self.flush(batch);
        Ok(())
    }

    // ------------------------------------------------------------------
    // lookups
    // ------------------------------------------------------------------

    pub fn get_node_from_node_id(&self, id: NodeId) -> Option<NodeHandle> {
        self.ids
            .get(&id)
            .copied()
            .filter(|&idx| self.arena.contains(idx))
            .map(NodeHandle)
    }

    /// First node in preorder whose effective name equals `name`.
    pub fn get_node_from_node_name(&self, name: &str) -> Option<NodeHandle> {
        self.arena
            .iter()
            .map(|(idx, _)| NodeHandle(idx))
            .find(|&h| self.node_name(h).as_deref() == Some(name))
    }

    pub fn get_node_name_from_node_id(&self, id: NodeId) -> Option<String> {
        self.get_node_from_node_id(id)
            .and_then(|h| self.node_name(h))
    }

    pub fn get_children_node_ids(&self, handle: NodeHandle) -> DomainResult<Vec<NodeId>> {
        let idx = self.idx(handle)?;
        Ok(self
            .arena
            .children_of(Some(idx))
            .iter()
            .map(|&c| self.id_of(c))
            .collect())
    }

    pub fn root_node_ids(&self) -> Vec<NodeId> {
        self.arena.roots().iter().map(|&r| self.id_of(r)).collect()
    }

    // ------------------------------------------------------------------
    // navigation
    // ------------------------------------------------------------------

    pub fn roots(&self) -> Vec<NodeHandle> {
        self.arena.roots().iter().copied().map(NodeHandle).collect()
    }

    pub fn first_root(&self) -> Option<NodeHandle> {
        self.arena.roots().first().copied().map(NodeHandle)
    }

    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.arena.parent(handle.index()).map(NodeHandle)
    }

    pub fn first_child(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.arena
            .get_node(handle.index())
            .and_then(|n| n.children.first().copied())
            .map(NodeHandle)
    }

    pub fn last_child(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.arena
            .get_node(handle.index())
            .and_then(|n| n.children.last().copied())
            .map(NodeHandle)
    }

    pub fn next_sibling(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.arena.next_sibling(handle.index()).map(NodeHandle)
    }

    pub fn prev_sibling(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.arena.prev_sibling(handle.index()).map(NodeHandle)
    }

    /// Edges between the node and its top-level ancestor.
    pub fn node_depth(&self, handle: NodeHandle) -> Option<usize> {
        let idx = self.idx(handle).ok()?;
        Some(self.arena.node_depth(idx))
    }

    /// Ids from the top-level ancestor down to the node.
    pub fn node_path_ids(&self, handle: NodeHandle) -> Option<Vec<NodeId>> {
        let mut current = Some(self.idx(handle).ok()?);
        let mut path = Vec::new();
        while let Some(idx) = current {
            path.push(self.id_of(idx));
            current = self.arena.parent(idx);
        }
        path.reverse();
        Some(path)
    }

    /// Number of levels in the deepest tree.
    pub fn depth(&self) -> usize {
        self.arena.depth()
    }

    /// Preorder over stored (not effective) records.
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &NodeRecord)> + '_ {
        self.arena.iter().map(|(idx, n)| (NodeHandle(idx), &n.record))
    }

    /// Postorder over stored (not effective) records.
    pub fn iter_postorder(&self) -> impl Iterator<Item = (NodeHandle, &NodeRecord)> + '_ {
        self.arena
            .iter_postorder()
            .map(|(idx, n)| (NodeHandle(idx), &n.record))
    }

    // ------------------------------------------------------------------
    // effective accessors
    // ------------------------------------------------------------------

    pub fn node_name(&self, handle: NodeHandle) -> Option<String> {
        self.content_record(handle).map(|r| r.name.clone())
    }

    pub fn node_syntax(&self, handle: NodeHandle) -> Option<String> {
        self.content_record(handle).map(|r| r.syntax.clone())
    }

    pub fn node_tags(&self, handle: NodeHandle) -> Option<String> {
        self.content_record(handle).map(|r| r.tags.clone())
    }

    pub fn node_custom_icon_id(&self, handle: NodeHandle) -> Option<u32> {
        self.content_record(handle).map(|r| r.custom_icon_id)
    }

    pub fn node_is_bold(&self, handle: NodeHandle) -> Option<bool> {
        self.content_record(handle).map(|r| r.is_bold)
    }

    pub fn node_weight(&self, handle: NodeHandle) -> Option<i32> {
        self.node_is_bold(handle).map(weight_from_is_bold)
    }

    pub fn node_foreground(&self, handle: NodeHandle) -> Option<String> {
        self.content_record(handle)
            .map(|r| r.foreground_color.clone())
    }

    pub fn node_is_read_only(&self, handle: NodeHandle) -> Option<bool> {
        self.content_record(handle).map(|r| r.is_read_only)
    }

    pub fn node_is_rich_text(&self, handle: NodeHandle) -> Option<bool> {
        self.content_record(handle).map(NodeRecord::is_rich_text)
    }

    pub fn node_is_plain_text(&self, handle: NodeHandle) -> Option<bool> {
        self.content_record(handle).map(NodeRecord::is_plain_text)
    }

    pub fn node_is_text(&self, handle: NodeHandle) -> Option<bool> {
        self.content_record(handle).map(NodeRecord::is_text)
    }

    pub fn node_is_code(&self, handle: NodeHandle) -> Option<bool> {
        self.content_record(handle).map(NodeRecord::is_code)
    }

    pub fn node_creation_time(&self, handle: NodeHandle) -> Option<i64> {
        self.content_record(handle).map(|r| r.creation_timestamp)
    }

    pub fn node_modification_time(&self, handle: NodeHandle) -> Option<i64> {
        self.content_record(handle).map(|r| r.last_save_timestamp)
    }

    // ------------------------------------------------------------------
    // shared nodes
    // ------------------------------------------------------------------

    /// The master of a shared node, or the node itself.
    pub fn resolve_data_holder(&self, handle: NodeHandle) -> DomainResult<NodeHandle> {
        let idx = self.idx(handle)?;
        self.holder_idx(idx).map(NodeHandle)
    }

    pub fn get_node_id_data_holder(&self, handle: NodeHandle) -> DomainResult<NodeId> {
        let holder = self.resolve_data_holder(handle)?;
        Ok(self.id_of(holder.index()))
    }

    /// Master id → alias ids, rebuilt by a full scan on every call.
    pub fn build_shared_map(&self) -> SharedMap {
        SharedNodeRegistry::new(&self.arena, &self.ids).build_shared_map()
    }

    // ------------------------------------------------------------------
    // removal and moves
    // ------------------------------------------------------------------

    /// Detach and drop the node with all descendants; returns the removed ids
    /// in preorder.
    ///
    /// Bookmarks and aliases pointing into the removed subtree are left as they
    /// are: see [`NodeStore::reconcile_bookmarks`] and [`NodeStore::validate`].
    #[instrument(level = "debug", skip(self))]
    pub fn remove_subtree(&mut self, handle: NodeHandle) -> DomainResult<Vec<NodeId>> {
        let idx = self.idx(handle)?;
        let parent = self.arena.parent(idx);
        let parent_id = self.parent_id(parent);

        let removed = self.arena.remove_subtree(idx);
        let mut ids: Vec<NodeId> = Vec::with_capacity(removed.len());
        let mut released = 0;
        for node in removed.into_iter().rev() {
            let id = node.record.id;
            if self.ids.get(&id).is_some_and(|i| !self.arena.contains(*i)) {
                self.ids.remove(&id);
            }
            self.allocator.retire(id);
            released += node.record.anchored_objects.len();
            ids.push(id);
        }
        debug!(count = ids.len(), released, "subtree removed");

        let mut batch = EditBatch::default();
        batch.push(PendingEdit::NodesRemoved(ids.clone()));
        batch.push(PendingEdit::HierarchyChanged(parent_id));
        if self.config.renumber_on_remove {
            sequence::renumber_children(&mut self.arena, parent, false, self.config.sequence_base);
        }
        self.flush(batch);
        Ok(ids)
    }

    fn check_destination(&self, idx: Index, parent: Option<Index>) -> DomainResult<()> {
        if let Some(p) = parent {
            if self.arena.is_ancestor_or_self(idx, p) {
                return Err(DomainError::CycleDetected {
                    node: self.id_of(idx),
                    parent: self.id_of(p),
                });
            }
        }
        Ok(())
    }

    /// Move a node (with its subtree) to the end of `new_parent`'s children.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(
        &mut self,
        handle: NodeHandle,
        new_parent: Option<NodeHandle>,
    ) -> DomainResult<()> {
        let idx = self.idx(handle)?;
        let new_parent = self.parent_idx(new_parent)?;
        self.check_destination(idx, new_parent)?;
        let old_parent = self.arena.parent(idx);

        self.arena.detach(idx);
        let seq = sequence::next_sequence(&self.arena, new_parent, self.config.sequence_base);
        self.arena.attach_at(idx, new_parent, None);
        if let Some(node) = self.arena.get_node_mut(idx) {
            node.record.sequence = seq;
        }

        let mut batch = EditBatch::default();
        batch.push(PendingEdit::HierarchyChanged(self.parent_id(old_parent)));
        batch.push(PendingEdit::HierarchyChanged(self.parent_id(new_parent)));
        self.flush(batch);
        Ok(())
    }

    /// Move a node (with its subtree) to directly after `sibling`.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node_after(&mut self, handle: NodeHandle, sibling: NodeHandle) -> DomainResult<()> {
        let idx = self.idx(handle)?;
        let sibling = self.idx(sibling)?;
        if self.arena.is_ancestor_or_self(idx, sibling) {
            return Err(DomainError::CycleDetected {
                node: self.id_of(idx),
                parent: self.id_of(sibling),
            });
        }
        let new_parent = self.arena.parent(sibling);
        let old_parent = self.arena.parent(idx);

        self.arena.detach(idx);
        let pos = self
            .arena
            .position_in_parent(sibling)
            .ok_or(DomainError::InvalidHandle)?
            + 1;
        let seq = self.record(sibling)?.sequence + 1;
        sequence::shift_following(&mut self.arena, new_parent, pos);
        self.arena.attach_at(idx, new_parent, Some(pos));
        if let Some(node) = self.arena.get_node_mut(idx) {
            node.record.sequence = seq;
        }

        let mut batch = EditBatch::default();
        batch.push(PendingEdit::HierarchyChanged(self.parent_id(old_parent)));
        batch.push(PendingEdit::HierarchyChanged(self.parent_id(new_parent)));
        self.flush(batch);
        Ok(())
    }

    // ------------------------------------------------------------------
    // sequences
    // ------------------------------------------------------------------

    /// Reassign `sequence = base + position` under `parent` (`None` for the
    /// top level), optionally for every descendant child list too.
    ///
    /// Returns how many child lists changed.
    #[instrument(level = "debug", skip(self))]
    pub fn renumber_children(
        &mut self,
        parent: Option<NodeHandle>,
        recursive: bool,
    ) -> DomainResult<usize> {
        let parent = self.parent_idx(parent)?;
        let touched = sequence::renumber_children(
            &mut self.arena,
            parent,
            recursive,
            self.config.sequence_base,
        );
        let mut batch = EditBatch::default();
        for p in &touched {
            batch.push(PendingEdit::HierarchyChanged(self.parent_id(*p)));
        }
        self.flush(batch);
        Ok(touched.len())
    }

    /// True when the children of `parent` carry `base..base+N` in order.
    pub fn sequences_are_contiguous(&self, parent: Option<NodeHandle>) -> bool {
        self.parent_idx(parent)
            .map(|p| sequence::is_contiguous(&self.arena, p, self.config.sequence_base))
            .unwrap_or(false)
    }

    // ------------------------------------------------------------------
    // search exclusion
    // ------------------------------------------------------------------

    pub fn is_excluded(&self, handle: NodeHandle) -> DomainResult<bool> {
        let idx = self.idx(handle)?;
        SearchExclusionResolver::new(&self.arena, &self.ids).is_excluded(idx)
    }

    /// Reset both exclusion flags on every data holder; returns how many
    /// records actually changed.
    #[instrument(level = "debug", skip(self))]
    pub fn clear_all_exclusions(&mut self) -> usize {
        let targets: Vec<Index> = self
            .arena
            .iter()
            .filter(|(_, n)| {
                !n.record.is_shared()
                    && (n.record.exclude_me_from_search || n.record.exclude_children_from_search)
            })
            .map(|(idx, _)| idx)
            .collect();

        let mut batch = EditBatch::default();
        for idx in &targets {
            if let Some(node) = self.arena.get_node_mut(*idx) {
                node.record.exclude_me_from_search = false;
                node.record.exclude_children_from_search = false;
                batch.push(PendingEdit::PropertyChanged(node.record.id));
            }
        }
        debug!(count = targets.len(), "exclusions cleared");
        self.flush(batch);
        targets.len()
    }

    /// Preorder walk over searchable nodes.
    ///
    /// The returned report says how many nodes were skipped; the store-level
    /// hit flag is also raised when anything was skipped.
    pub fn walk_searchable(
        &self,
        mut visit: impl FnMut(NodeHandle, &NodeRecord),
    ) -> DomainResult<TraversalReport> {
        let report = SearchExclusionResolver::new(&self.arena, &self.ids)
            .walk(|idx, record| visit(NodeHandle(idx), record))?;
        if report.hit_exclusion() {
            self.hit_exclusion.set(true);
        }
        Ok(report)
    }

    /// Whether any `walk_searchable` since the last clear skipped a node.
    pub fn hit_exclusion_flag(&self) -> bool {
        self.hit_exclusion.get()
    }

    pub fn clear_hit_exclusion_flag(&self) {
        self.hit_exclusion.set(false);
    }

    // ------------------------------------------------------------------
    // bookmarks
    // ------------------------------------------------------------------

    /// Bookmark a live node; `Ok(false)` when it already was.
    pub fn bookmarks_add(&mut self, id: NodeId) -> DomainResult<bool> {
        if self.get_node_from_node_id(id).is_none() {
            return Err(DomainError::StaleBookmark(id));
        }
        let added = self.bookmarks.add(id);
        if added {
            let mut batch = EditBatch::default();
            batch.push(PendingEdit::BookmarksChanged);
            self.flush(batch);
        }
        Ok(added)
    }

    pub fn bookmarks_remove(&mut self, id: NodeId) -> bool {
        let removed = self.bookmarks.remove(id);
        if removed {
            let mut batch = EditBatch::default();
            batch.push(PendingEdit::BookmarksChanged);
            self.flush(batch);
        }
        removed
    }

    pub fn bookmarks(&self) -> &[NodeId] {
        self.bookmarks.list()
    }

    pub fn bookmarks_set(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.bookmarks.replace_all(ids);
        let mut batch = EditBatch::default();
        batch.push(PendingEdit::BookmarksChanged);
        self.flush(batch);
    }

    pub fn is_node_bookmarked(&self, id: NodeId) -> bool {
        self.bookmarks.is_bookmarked(id)
    }

    // ------------------------------------------------------------------
    // tags
    // ------------------------------------------------------------------

    pub fn add_used_tags(&mut self, tags: &str) {
        self.tags.register_tags(tags);
    }

    pub fn used_tags(&self) -> &BTreeSet<String> {
        self.tags.all_tags()
    }

    /// Rebuild the tag index from the current data holders, dropping stale tags.
    pub fn rebuild_tags(&mut self) {
        self.tags.clear();
        for (_, node) in self.arena.iter() {
            if !node.record.is_shared() {
                self.tags.register_tags(&node.record.tags);
            }
        }
    }
}
