use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::domain::record::NodeRecord;

/// Stable reference to one tree position.
///
/// Handles are generational: once the node is removed the handle stays stale
/// even if its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub(crate) Index);

impl NodeHandle {
    pub(crate) fn index(self) -> Index {
        self.0
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{}.{}", slot, generation)
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    /// Attributes stored at this position
    pub record: NodeRecord,
    /// Index of parent node in the arena, None for top-level nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in sibling order
    pub children: Vec<Index>,
    /// Content buffer changed since the last save
    pub content_dirty: bool,
}

/// Arena-based forest of ordered trees.
///
/// Parent/child relations are arena indices, so back-references to the parent
/// carry no ownership. Top-level nodes are kept in `roots` in sibling order.
#[derive(Debug, Default)]
pub struct TreeArena {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Top-level nodes in sibling order
    roots: Vec<Index>,
}

impl TreeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, idx: Index) -> bool {
        self.arena.contains(idx)
    }

    /// Insert `record` under `parent` at `position` (appends when `None`).
    ///
    /// The caller guarantees `parent` is live.
    #[instrument(level = "trace", skip(self, record), fields(id = record.id))]
    pub fn insert_node(
        &mut self,
        record: NodeRecord,
        parent: Option<Index>,
        position: Option<usize>,
    ) -> Index {
        let node = TreeNode {
            record,
            parent,
            children: Vec::new(),
            content_dirty: false,
        };
        let node_idx = self.arena.insert(node);
        self.attach_at(node_idx, parent, position);
        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    /// Children of `parent`, or the top-level list for `None`.
    pub fn children_of(&self, parent: Option<Index>) -> &[Index] {
        match parent {
            Some(p) => self
                .arena
                .get(p)
                .map(|n| n.children.as_slice())
                .unwrap_or(&[]),
            None => &self.roots,
        }
    }

    fn siblings_mut(&mut self, parent: Option<Index>) -> Option<&mut Vec<Index>> {
        match parent {
            Some(p) => self.arena.get_mut(p).map(|n| &mut n.children),
            None => Some(&mut self.roots),
        }
    }

    pub fn parent(&self, idx: Index) -> Option<Index> {
        self.arena.get(idx).and_then(|n| n.parent)
    }

    /// Position of `idx` among its siblings.
    pub fn position_in_parent(&self, idx: Index) -> Option<usize> {
        let node = self.arena.get(idx)?;
        self.children_of(node.parent).iter().position(|&c| c == idx)
    }

    pub fn next_sibling(&self, idx: Index) -> Option<Index> {
        let node = self.arena.get(idx)?;
        let pos = self.position_in_parent(idx)?;
        self.children_of(node.parent).get(pos + 1).copied()
    }

    pub fn prev_sibling(&self, idx: Index) -> Option<Index> {
        let node = self.arena.get(idx)?;
        let pos = self.position_in_parent(idx)?;
        pos.checked_sub(1)
            .and_then(|p| self.children_of(node.parent).get(p).copied())
    }

    /// Unlink `idx` from its sibling list, keeping its subtree intact.
    pub fn detach(&mut self, idx: Index) {
        let Some(parent) = self.arena.get(idx).map(|n| n.parent) else {
            return;
        };
        if let Some(siblings) = self.siblings_mut(parent) {
            siblings.retain(|&c| c != idx);
        }
        if let Some(node) = self.arena.get_mut(idx) {
            node.parent = None;
        }
    }

    /// Link a detached `idx` under `parent` at `position` (appends when `None`).
    pub fn attach_at(&mut self, idx: Index, parent: Option<Index>, position: Option<usize>) {
        if let Some(node) = self.arena.get_mut(idx) {
            node.parent = parent;
        }
        if let Some(siblings) = self.siblings_mut(parent) {
            let at = position.unwrap_or(siblings.len()).min(siblings.len());
            siblings.insert(at, idx);
        }
    }

    /// True when `ancestor` is `node` or lies on the path from `node` to its root.
    pub fn is_ancestor_or_self(&self, ancestor: Index, node: Index) -> bool {
        let mut current = Some(node);
        while let Some(idx) = current {
            if idx == ancestor {
                return true;
            }
            current = self.parent(idx);
        }
        false
    }

    /// Indices of `idx` and all its descendants in preorder.
    pub fn subtree(&self, idx: Index) -> Vec<Index> {
        let mut out = Vec::new();
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.get(current) {
                out.push(current);
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Detach `idx` and drop it with all descendants, returning the removed
    /// nodes in reverse preorder (every child before its parent).
    #[instrument(level = "trace", skip(self))]
    pub fn remove_subtree(&mut self, idx: Index) -> Vec<TreeNode> {
        let mut order = self.subtree(idx);
        self.detach(idx);
        order.reverse();
        order
            .into_iter()
            .filter_map(|i| self.arena.remove(i))
            .collect()
    }

    /// Number of edges between `idx` and its root.
    pub fn node_depth(&self, idx: Index) -> usize {
        let mut depth = 0;
        let mut current = self.parent(idx);
        while let Some(p) = current {
            depth += 1;
            current = self.parent(p);
        }
        depth
    }

    /// Number of levels in the deepest tree of the forest.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }
}

/// Preorder traversal over the whole forest.
pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let stack = arena.roots().iter().rev().copied().collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

/// Postorder traversal over the whole forest.
pub struct PostOrderIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let stack = arena.roots().iter().rev().map(|&r| (r, false)).collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
