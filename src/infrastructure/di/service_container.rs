//! Service container for dependency injection
//!
//! Wires the node store to its settings and pending-edit sink.

use std::sync::Arc;

use tracing::info;

use crate::application::{ApplicationResult, NodeStore};
use crate::config::Settings;
use crate::infrastructure::outline::Outline;
use crate::infrastructure::traits::{PendingEditSink, TracingSink};

/// Container holding settings and shared collaborators.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Receiver of pending-edit notifications
    pub sink: Arc<dyn PendingEditSink>,
}

impl ServiceContainer {
    /// Create a container whose sink only logs.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(TracingSink))
    }

    /// Create a container with a custom sink (for testing).
    pub fn with_deps(settings: Settings, sink: Arc<dyn PendingEditSink>) -> Self {
        Self {
            settings: Arc::new(settings),
            sink,
        }
    }

    /// Empty store configured from the settings.
    pub fn store(&self) -> NodeStore {
        NodeStore::with_config(self.sink.clone(), self.settings.store.clone())
    }

    /// Store loaded from an outline through the persistence-loader path.
    pub fn load_store(&self, outline: Outline) -> ApplicationResult<NodeStore> {
        let mut store = self.store();
        let count = outline.node_count();
        store.load(outline.nodes, outline.bookmarks)?;
        info!(count, "store loaded");
        Ok(store)
    }
}
