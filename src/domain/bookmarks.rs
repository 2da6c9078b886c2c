//! Ordered bookmark set

use crate::domain::record::NodeId;

/// Duplicate-free list of bookmarked node ids in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkRegistry {
    ids: Vec<NodeId>,
}

impl BookmarkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if `id` was already bookmarked.
    pub fn add(&mut self, id: NodeId) -> bool {
        if self.is_bookmarked(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Returns false if `id` was not bookmarked.
    pub fn remove(&mut self, id: NodeId) -> bool {
        match self.ids.iter().position(|&b| b == id) {
            Some(pos) => {
                self.ids.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn list(&self) -> &[NodeId] {
        &self.ids
    }

    /// Replace the whole list, keeping the given order and dropping repeats.
    pub fn replace_all(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.ids.clear();
        for id in ids {
            self.add(id);
        }
    }

    pub fn is_bookmarked(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    /// Drop every id for which `keep` is false, returning the dropped ids.
    pub fn retain(&mut self, mut keep: impl FnMut(NodeId) -> bool) -> Vec<NodeId> {
        let (kept, dropped): (Vec<NodeId>, Vec<NodeId>) =
            self.ids.iter().partition(|&&id| keep(id));
        self.ids = kept;
        dropped
    }
}
