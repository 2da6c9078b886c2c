//! Bulk insertion: import with id remapping, subtree duplication, loading

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use tracing::{debug, instrument};

use super::{EditBatch, NodeStore};
use crate::application::ApplicationResult;
use crate::domain::sequence;
use crate::domain::{DomainError, DomainResult, IdRemapping, NodeHandle, NodeId, NodeRecord};

/// A record plus its children, as handed over by importers and loaders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportNode {
    pub record: NodeRecord,
    pub children: Vec<ImportNode>,
}

impl ImportNode {
    pub fn new(record: NodeRecord) -> Self {
        Self {
            record,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<ImportNode>) -> Self {
        self.children = children;
        self
    }

    /// Number of nodes in this subtree.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ImportNode::count).sum::<usize>()
    }

    fn visit_mut(&mut self, f: &mut impl FnMut(&mut NodeRecord)) {
        f(&mut self.record);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    fn visit(&self, f: &mut impl FnMut(&NodeRecord)) {
        f(&self.record);
        for child in &self.children {
            child.visit(f);
        }
    }
}

impl NodeStore {
    /// Insert an imported forest under `parent`.
    ///
    /// Ids are kept when free and remapped on collision; `shared_master_id`
    /// values are rewritten through the same remapping so aliases inside the
    /// import keep pointing at their imported master. Fails without inserting
    /// anything when an alias would end up dangling or chained.
    #[instrument(level = "debug", skip(self, nodes), fields(count = nodes.len()))]
    pub fn import_subtree(
        &mut self,
        nodes: Vec<ImportNode>,
        parent: Option<NodeHandle>,
    ) -> DomainResult<(Vec<NodeHandle>, IdRemapping)> {
        let parent = self.parent_idx(parent)?;
        self.import_inner(nodes, parent, true, false)
    }

    /// Clone the subtree at `source` under `parent` with fresh ids.
    ///
    /// Copies start without a content buffer; anchored objects are copied.
    #[instrument(level = "debug", skip(self))]
    pub fn duplicate_subtree(
        &mut self,
        source: NodeHandle,
        parent: Option<NodeHandle>,
    ) -> DomainResult<NodeHandle> {
        let idx = self.idx(source)?;
        let parent = self.parent_idx(parent)?;
        let snapshot = self.snapshot(idx)?;
        let (handles, remap) = self.import_inner(vec![snapshot], parent, true, false)?;
        debug!(remapped = remap.len(), "subtree duplicated");
        handles.into_iter().next().ok_or(DomainError::InvalidHandle)
    }

    /// Persistence-loader path.
    ///
    /// Inserts without emitting pending edits, keeps stored sequence values,
    /// replaces the bookmark list and rebuilds the tag index, then validates.
    /// An integrity failure is returned as the load error; the caller should
    /// discard the store in that case.
    #[instrument(level = "debug", skip(self, nodes, bookmarks))]
    pub fn load(
        &mut self,
        nodes: Vec<ImportNode>,
        bookmarks: impl IntoIterator<Item = NodeId>,
    ) -> ApplicationResult<IdRemapping> {
        self.muted = true;
        let result = self
            .import_inner(nodes, None, false, true)
            .and_then(|(_, remap)| {
                let bookmarks: Vec<NodeId> = bookmarks
                    .into_iter()
                    .map(|id| remap.get(&id).copied().unwrap_or(id))
                    .collect();
                self.bookmarks.replace_all(bookmarks);
                self.rebuild_tags();
                self.validate().map(|_| remap)
            });
        self.muted = false;
        Ok(result?)
    }

    fn snapshot(&self, idx: Index) -> DomainResult<ImportNode> {
        let node = self.arena.get_node(idx).ok_or(DomainError::InvalidHandle)?;
        let mut record = node.record.clone();
        record.content = None;
        let children = node
            .children
            .iter()
            .map(|&c| self.snapshot(c))
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(ImportNode::new(record).with_children(children))
    }

    fn import_inner(
        &mut self,
        mut nodes: Vec<ImportNode>,
        parent: Option<Index>,
        check_masters: bool,
        keep_sequences: bool,
    ) -> DomainResult<(Vec<NodeHandle>, IdRemapping)> {
        // References follow the first node carrying an original id.
        let mut remap = IdRemapping::new();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut reserved = Vec::new();
        for node in &mut nodes {
            let allocator = &mut self.allocator;
            node.visit_mut(&mut |record| {
                let original = record.id;
                let id = allocator.allocate_node_id(Some(original));
                if original > 0 && seen.insert(original) && id != original {
                    remap.insert(original, id);
                }
                record.id = id;
                reserved.push(id);
            });
        }
        for node in &mut nodes {
            node.visit_mut(&mut |record| {
                if let Some(&mapped) = remap.get(&record.shared_master_id) {
                    record.shared_master_id = mapped;
                }
            });
        }

        if check_masters {
            if let Err(e) = self.check_import_masters(&nodes) {
                for id in reserved {
                    self.allocator.release(id);
                }
                return Err(e);
            }
        }

        let mut batch = EditBatch::default();
        let handles = nodes
            .into_iter()
            .map(|n| NodeHandle(self.insert_import(n, parent, keep_sequences, &mut batch)))
            .collect();
        self.flush(batch);
        Ok((handles, remap))
    }

    fn check_import_masters(&self, nodes: &[ImportNode]) -> DomainResult<()> {
        let mut imported: HashMap<NodeId, bool> = HashMap::new();
        for node in nodes {
            node.visit(&mut |r| {
                imported.insert(r.id, r.is_shared());
            });
        }
        let mut outcome: DomainResult<()> = Ok(());
        for node in nodes {
            node.visit(&mut |r| {
                if outcome.is_err() || !r.is_shared() {
                    return;
                }
                let master_is_shared = match imported.get(&r.shared_master_id) {
                    Some(&shared) => Some(shared),
                    None => self
                        .get_node_from_node_id(r.shared_master_id)
                        .and_then(|h| self.arena.get_node(h.index()))
                        .map(|n| n.record.is_shared()),
                };
                outcome = match master_is_shared {
                    None => Err(DomainError::DanglingAlias {
                        alias: r.id,
                        master: r.shared_master_id,
                    }),
                    Some(true) => Err(DomainError::AliasChain {
                        alias: r.id,
                        master: r.shared_master_id,
                    }),
                    Some(false) => Ok(()),
                };
            });
        }
        outcome
    }

    fn insert_import(
        &mut self,
        node: ImportNode,
        parent: Option<Index>,
        keep_sequence: bool,
        batch: &mut EditBatch,
    ) -> Index {
        let ImportNode {
            mut record,
            children,
        } = node;
        if !keep_sequence || record.sequence <= 0 {
            record.sequence =
                sequence::next_sequence(&self.arena, parent, self.config.sequence_base);
        }
        let idx = self.insert_allocated(record, parent, None, batch);
        for child in children {
            self.insert_import(child, Some(idx), keep_sequence, batch);
        }
        idx
    }
}
