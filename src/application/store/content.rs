//! Content buffer references, dirty tracking and anchored objects

use std::ops::Range;

use tracing::trace;

use super::{EditBatch, NodeStore};
use crate::domain::{AnchoredObject, BufferHandle, DomainError, DomainResult, NodeHandle};
use crate::infrastructure::traits::PendingEdit;

/// Change reported by the content collaborator for a node's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferEvent {
    Insert,
    Erase,
    /// Buffer's modified flag toggled
    Modified(bool),
    /// Cursor or selection mark moved
    MarkSet,
}

impl NodeStore {
    /// Attach a materialized buffer to the data holder of `handle`.
    ///
    /// Replacing an existing, different buffer counts as a content change;
    /// a changed syntax counts as a property change.
    pub fn set_node_content(
        &mut self,
        handle: NodeHandle,
        buffer: BufferHandle,
        syntax: &str,
    ) -> DomainResult<()> {
        let idx = self.idx(handle)?;
        let holder = self.holder_idx(idx)?;
        let node = self
            .arena
            .get_node_mut(holder)
            .ok_or(DomainError::InvalidHandle)?;

        let mut batch = EditBatch::default();
        if node.record.content.is_some_and(|old| old != buffer) {
            batch.push(PendingEdit::ContentChanged(node.record.id));
        }
        if node.record.syntax != syntax {
            node.record.syntax = syntax.to_string();
            batch.push(PendingEdit::PropertyChanged(node.record.id));
        }
        node.record.content = Some(buffer);
        node.content_dirty = false;
        self.flush(batch);
        Ok(())
    }

    /// Buffer of the data holder; `None` until it is materialized.
    pub fn get_node_content(&self, handle: NodeHandle) -> DomainResult<Option<BufferHandle>> {
        let idx = self.idx(handle)?;
        let holder = self.holder_idx(idx)?;
        Ok(self.record(holder)?.content)
    }

    pub fn is_buffer_loaded(&self, handle: NodeHandle) -> bool {
        matches!(self.get_node_content(handle), Ok(Some(_)))
    }

    /// Synchronous callback from the content collaborator.
    pub fn on_buffer_event(&mut self, handle: NodeHandle, event: BufferEvent) -> DomainResult<()> {
        let idx = self.idx(handle)?;
        let holder = self.holder_idx(idx)?;
        let node = self
            .arena
            .get_node_mut(holder)
            .ok_or(DomainError::InvalidHandle)?;
        trace!(id = node.record.id, ?event, "buffer event");

        let dirty = match event {
            BufferEvent::Insert | BufferEvent::Erase | BufferEvent::Modified(true) => true,
            BufferEvent::Modified(false) => {
                node.content_dirty = false;
                false
            }
            BufferEvent::MarkSet => false,
        };
        if dirty {
            node.content_dirty = true;
            let mut batch = EditBatch::default();
            batch.push(PendingEdit::ContentChanged(node.record.id));
            self.flush(batch);
        }
        Ok(())
    }

    pub fn is_content_dirty(&self, handle: NodeHandle) -> DomainResult<bool> {
        let idx = self.idx(handle)?;
        let holder = self.holder_idx(idx)?;
        self.arena
            .get_node(holder)
            .map(|n| n.content_dirty)
            .ok_or(DomainError::InvalidHandle)
    }

    pub fn add_anchored_objects(
        &mut self,
        handle: NodeHandle,
        objects: impl IntoIterator<Item = AnchoredObject>,
    ) -> DomainResult<()> {
        let idx = self.idx(handle)?;
        let holder = self.holder_idx(idx)?;
        let record = &mut self
            .arena
            .get_node_mut(holder)
            .ok_or(DomainError::InvalidHandle)?
            .record;
        let before = record.anchored_objects.len();
        record.anchored_objects.extend(objects);
        if record.anchored_objects.len() == before {
            return Ok(());
        }
        record.anchored_objects.sort_by_key(|o| o.offset);
        let mut batch = EditBatch::default();
        batch.push(PendingEdit::ContentChanged(record.id));
        self.flush(batch);
        Ok(())
    }

    /// Anchored objects sorted by offset, optionally limited to `range`.
    pub fn anchored_objects(
        &self,
        handle: NodeHandle,
        range: Option<Range<i32>>,
    ) -> DomainResult<Vec<AnchoredObject>> {
        let idx = self.idx(handle)?;
        let holder = self.holder_idx(idx)?;
        let mut objects: Vec<AnchoredObject> = self
            .record(holder)?
            .anchored_objects
            .iter()
            .filter(|o| range.as_ref().map_or(true, |r| r.contains(&o.offset)))
            .cloned()
            .collect();
        objects.sort_by_key(|o| o.offset);
        Ok(objects)
    }

    /// Drop every anchored object of the data holder; returns how many.
    pub fn remove_all_anchored_objects(&mut self, handle: NodeHandle) -> DomainResult<usize> {
        let idx = self.idx(handle)?;
        let holder = self.holder_idx(idx)?;
        let record = &mut self
            .arena
            .get_node_mut(holder)
            .ok_or(DomainError::InvalidHandle)?
            .record;
        let removed = std::mem::take(&mut record.anchored_objects).len();
        if removed > 0 {
            let mut batch = EditBatch::default();
            batch.push(PendingEdit::ContentChanged(record.id));
            self.flush(batch);
        }
        Ok(removed)
    }
}
