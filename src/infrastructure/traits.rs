//! I/O boundary traits for testability
//!
//! The store never touches storage itself. It reports what changed through
//! these traits and lets the persistence side decide when and how to save.

use std::fmt;
use std::sync::Mutex;

use tracing::debug;

use crate::domain::NodeId;

/// One category of change for the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PendingEdit {
    NewNode(NodeId),
    PropertyChanged(NodeId),
    ContentChanged(NodeId),
    /// Child list of the given parent changed (`0` for the top level)
    HierarchyChanged(NodeId),
    NodesRemoved(Vec<NodeId>),
    BookmarksChanged,
}

impl fmt::Display for PendingEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingEdit::NewNode(id) => write!(f, "new node {}", id),
            PendingEdit::PropertyChanged(id) => write!(f, "properties of {}", id),
            PendingEdit::ContentChanged(id) => write!(f, "content of {}", id),
            PendingEdit::HierarchyChanged(id) => write!(f, "children of {}", id),
            PendingEdit::NodesRemoved(ids) => write!(f, "removed {:?}", ids),
            PendingEdit::BookmarksChanged => write!(f, "bookmarks"),
        }
    }
}

/// Receiver of pending-edit notifications (fire-and-forget).
pub trait PendingEditSink: Send + Sync {
    fn pending_edit(&self, edit: PendingEdit);
}

/// Sink that only logs, for callers without a save subsystem.
#[derive(Debug, Default)]
pub struct TracingSink;

impl PendingEditSink for TracingSink {
    fn pending_edit(&self, edit: PendingEdit) {
        debug!(%edit, "pending edit");
    }
}

/// Sink that keeps every notification in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    edits: Mutex<Vec<PendingEdit>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far.
    pub fn edits(&self) -> Vec<PendingEdit> {
        self.edits.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Drain the received notifications.
    pub fn take(&self) -> Vec<PendingEdit> {
        self.edits
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }
}

impl PendingEditSink for RecordingSink {
    fn pending_edit(&self, edit: PendingEdit) {
        if let Ok(mut edits) = self.edits.lock() {
            edits.push(edit);
        }
    }
}
