//! Per-parent sibling ordering

use generational_arena::Index;
use tracing::trace;

use crate::domain::arena::TreeArena;

/// Sequence value for a node appended under `parent`.
pub fn next_sequence(arena: &TreeArena, parent: Option<Index>, base: i64) -> i64 {
    arena
        .children_of(parent)
        .iter()
        .filter_map(|&c| arena.get_node(c).map(|n| n.record.sequence))
        .max()
        .map(|max| max.max(base - 1) + 1)
        .unwrap_or(base)
}

/// Reassign `sequence = base + position` to the children of `parent`.
///
/// Returns the indices of parents whose child list actually changed; with
/// `recursive` every descendant's child list is fixed as well.
pub fn renumber_children(
    arena: &mut TreeArena,
    parent: Option<Index>,
    recursive: bool,
    base: i64,
) -> Vec<Option<Index>> {
    let mut touched = Vec::new();
    let mut pending = vec![parent];
    while let Some(current) = pending.pop() {
        let children = arena.children_of(current).to_vec();
        let mut changed = false;
        for (pos, &child) in children.iter().enumerate() {
            let expected = base + pos as i64;
            if let Some(node) = arena.get_node_mut(child) {
                if node.record.sequence != expected {
                    trace!(id = node.record.id, from = node.record.sequence, to = expected, "sequence fix");
                    node.record.sequence = expected;
                    changed = true;
                }
            }
        }
        if changed {
            touched.push(current);
        }
        if recursive {
            pending.extend(children.into_iter().rev().map(Some));
        }
    }
    touched
}

/// Shift the sequence of every sibling from `from_pos` onward by one.
pub fn shift_following(arena: &mut TreeArena, parent: Option<Index>, from_pos: usize) -> bool {
    let following = arena
        .children_of(parent)
        .iter()
        .skip(from_pos)
        .copied()
        .collect::<Vec<_>>();
    for &idx in &following {
        if let Some(node) = arena.get_node_mut(idx) {
            node.record.sequence += 1;
        }
    }
    !following.is_empty()
}

/// True when the children of `parent` carry `base..base+N` in order.
pub fn is_contiguous(arena: &TreeArena, parent: Option<Index>, base: i64) -> bool {
    arena
        .children_of(parent)
        .iter()
        .enumerate()
        .all(|(pos, &c)| {
            arena
                .get_node(c)
                .is_some_and(|n| n.record.sequence == base + pos as i64)
        })
}
