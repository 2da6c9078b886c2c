//! Integration tests for bookmarks and the tag index.

use notetree::domain::{DomainError, NodeRecord};
use notetree::infrastructure::traits::PendingEdit;
use notetree::util::testing::{init_test_setup, named, recording_store};

// ============================================================
// bookmarks
// ============================================================

#[test]
fn given_live_nodes_when_bookmarking_then_order_kept_and_idempotent() {
    init_test_setup();
    // Arrange
    let (mut store, sink) = recording_store();
    for id in [1, 2, 3] {
        store.append_node(named("N", id), None).unwrap();
    }
    sink.take();

    // Act
    assert!(store.bookmarks_add(3).unwrap());
    assert!(store.bookmarks_add(1).unwrap());
    assert!(!store.bookmarks_add(3).unwrap());

    // Assert
    assert_eq!(store.bookmarks(), &[3, 1]);
    assert!(store.is_node_bookmarked(1));
    assert!(!store.is_node_bookmarked(2));
    assert_eq!(
        sink.take(),
        vec![PendingEdit::BookmarksChanged, PendingEdit::BookmarksChanged]
    );
}

#[test]
fn given_unknown_id_when_bookmarking_then_stale_bookmark() {
    // Arrange
    let (mut store, _sink) = recording_store();

    // Act
    let result = store.bookmarks_add(9);

    // Assert
    assert_eq!(result.unwrap_err(), DomainError::StaleBookmark(9));
    assert!(store.bookmarks().is_empty());
}

#[test]
fn given_bookmark_when_removing_twice_then_second_is_noop() {
    // Arrange
    let (mut store, _sink) = recording_store();
    store.append_node(named("N", 1), None).unwrap();
    store.bookmarks_add(1).unwrap();

    // Act / Assert
    assert!(store.bookmarks_remove(1));
    assert!(!store.bookmarks_remove(1));
}

#[test]
fn given_removed_bookmarked_node_when_reconciling_then_dropped() {
    // Arrange
    let (mut store, _sink) = recording_store();
    let a = store.append_node(named("A", 1), None).unwrap();
    store.append_node(named("B", 2), None).unwrap();
    store.bookmarks_set([1, 2]);
    store.remove_subtree(a).unwrap();
    assert_eq!(
        store.integrity_issues(),
        vec![DomainError::StaleBookmark(1)]
    );

    // Act
    let dropped = store.reconcile_bookmarks();

    // Assert
    assert_eq!(dropped, vec![1]);
    assert_eq!(store.bookmarks(), &[2]);
    assert!(store.integrity_issues().is_empty());
}

// ============================================================
// tags
// ============================================================

#[test]
fn given_tagged_nodes_when_listing_then_distinct_sorted_tags() {
    // Arrange
    let (mut store, _sink) = recording_store();
    let tagged = |name: &str, tags: &str| NodeRecord {
        tags: tags.to_string(),
        ..NodeRecord::named(name)
    };

    // Act
    store.append_node(tagged("A", "work, home"), None).unwrap();
    store.append_node(tagged("B", "home  urgent"), None).unwrap();

    // Assert
    let tags: Vec<&str> = store.used_tags().iter().map(String::as_str).collect();
    assert_eq!(tags, vec!["home", "urgent", "work"]);
}

#[test]
fn given_stale_tags_when_rebuilding_then_only_live_tags_remain() {
    // Arrange
    let (mut store, _sink) = recording_store();
    let gone = store
        .append_node(
            NodeRecord {
                tags: "old".to_string(),
                ..named("Gone", 1)
            },
            None,
        )
        .unwrap();
    store.add_used_tags("manual");
    store.remove_subtree(gone).unwrap();
    assert!(store.used_tags().contains("old"));

    // Act
    store.rebuild_tags();

    // Assert
    assert!(store.used_tags().is_empty());
}
