//! Node id allocation with collision remapping

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::domain::record::NodeId;

/// Mapping from an original id to the id actually assigned.
pub type IdRemapping = HashMap<NodeId, NodeId>;

/// Issues unique node ids.
///
/// Tracks the ids of live nodes, ids of removed nodes, and a monotonic
/// counter seeded from the highest id ever observed. Neither fresh nor
/// retired ids are ever reissued.
#[derive(Debug, Clone)]
pub struct IdentityAllocator {
    next: NodeId,
    live: HashSet<NodeId>,
    retired: HashSet<NodeId>,
}

impl Default for IdentityAllocator {
    fn default() -> Self {
        Self {
            next: 1,
            live: HashSet::new(),
            retired: HashSet::new(),
        }
    }
}

impl IdentityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an id that is in use (load path, or after insertion).
    pub fn observe(&mut self, id: NodeId) {
        if id <= 0 {
            return;
        }
        self.live.insert(id);
        if id >= self.next {
            self.next = id + 1;
        }
    }

    /// Mark a removed node's id; it stays unavailable for the store's lifetime.
    pub fn retire(&mut self, id: NodeId) {
        if self.live.remove(&id) {
            self.retired.insert(id);
        }
    }

    /// Undo a reservation for an id that never reached the tree.
    pub fn release(&mut self, id: NodeId) {
        self.live.remove(&id);
    }

    /// Live or retired.
    pub fn is_used(&self, id: NodeId) -> bool {
        self.live.contains(&id) || self.retired.contains(&id)
    }

    fn fresh(&mut self) -> NodeId {
        let id = self.next;
        self.next += 1;
        self.live.insert(id);
        id
    }

    /// Allocate an id, optionally trying to keep `original`.
    ///
    /// - `None` or `0`: next unused id from the counter.
    /// - `original` in `remapping`: the mapped id.
    /// - `original` unused: `original` itself.
    /// - `original` already used: a fresh id, recorded in `remapping`.
    ///
    /// The returned id is reserved immediately.
    pub fn allocate(&mut self, original: Option<NodeId>, remapping: &mut IdRemapping) -> NodeId {
        let original = match original {
            Some(id) if id > 0 => id,
            _ => {
                let id = self.fresh();
                trace!(id, "allocated fresh id");
                return id;
            }
        };

        if let Some(&mapped) = remapping.get(&original) {
            trace!(original, mapped, "id taken from remapping");
            return mapped;
        }

        if !self.is_used(original) {
            self.observe(original);
            return original;
        }

        let id = self.fresh();
        debug!(original, id, "id collision resolved");
        remapping.insert(original, id);
        id
    }

    /// Allocate the id of one inserted node.
    ///
    /// Unlike [`allocate`](Self::allocate) this never consults a remapping: a
    /// used `original` always yields a fresh id, so repeated originals within
    /// one batch still get distinct ids.
    pub fn allocate_node_id(&mut self, original: Option<NodeId>) -> NodeId {
        match original {
            Some(id) if id > 0 && self.is_used(id) => {
                let fresh = self.fresh();
                debug!(original = id, fresh, "node id collision resolved");
                fresh
            }
            Some(id) if id > 0 => {
                self.observe(id);
                id
            }
            _ => self.fresh(),
        }
    }
}
