//! Shared node resolution: aliases borrow their content from a master node

use std::collections::{BTreeMap, HashMap};

use generational_arena::Index;

use crate::domain::arena::TreeArena;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::record::NodeId;

/// Lookup from node id to arena position.
pub type IdIndex = HashMap<NodeId, Index>;

/// Master id → alias ids (aliases in preorder).
pub type SharedMap = BTreeMap<NodeId, Vec<NodeId>>;

/// Read-only view resolving aliases to the node that owns their data.
pub struct SharedNodeRegistry<'a> {
    arena: &'a TreeArena,
    ids: &'a IdIndex,
}

impl<'a> SharedNodeRegistry<'a> {
    pub fn new(arena: &'a TreeArena, ids: &'a IdIndex) -> Self {
        Self { arena, ids }
    }

    /// The master of a shared node, or the node itself.
    pub fn resolve_data_holder(&self, idx: Index) -> DomainResult<Index> {
        let node = self.arena.get_node(idx).ok_or(DomainError::InvalidHandle)?;
        let master_id = node.record.shared_master_id;
        if master_id == 0 {
            return Ok(idx);
        }
        let alias = node.record.id;
        let master_idx = self
            .ids
            .get(&master_id)
            .copied()
            .filter(|&m| self.arena.contains(m))
            .ok_or(DomainError::DanglingAlias {
                alias,
                master: master_id,
            })?;
        match self.arena.get_node(master_idx) {
            Some(master) if master.record.is_shared() => Err(DomainError::AliasChain {
                alias,
                master: master_id,
            }),
            Some(_) => Ok(master_idx),
            None => Err(DomainError::DanglingAlias {
                alias,
                master: master_id,
            }),
        }
    }

    /// Full scan producing the master → aliases index.
    pub fn build_shared_map(&self) -> SharedMap {
        let mut map = SharedMap::new();
        for (_, node) in self.arena.iter() {
            if node.record.is_shared() {
                map.entry(node.record.shared_master_id)
                    .or_default()
                    .push(node.record.id);
            }
        }
        map
    }
}
