//! Helpers shared by unit and integration tests.

use std::env;
use std::sync::{Arc, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::NodeStore;
use crate::domain::NodeRecord;
use crate::infrastructure::traits::RecordingSink;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Empty store wired to a sink that keeps every flushed edit.
pub fn recording_store() -> (NodeStore, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let store = NodeStore::new(sink.clone());
    (store, sink)
}

/// Record with a name and explicit id.
pub fn named(name: &str, id: i64) -> NodeRecord {
    NodeRecord {
        id,
        ..NodeRecord::named(name)
    }
}
