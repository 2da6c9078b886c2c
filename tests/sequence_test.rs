//! Integration tests for per-parent sibling ordering.

use notetree::config::StoreConfig;
use notetree::domain::NodeRecord;
use notetree::infrastructure::traits::{PendingEdit, RecordingSink};
use notetree::util::testing::{init_test_setup, named, recording_store};
use notetree::NodeStore;
use rstest::rstest;
use std::sync::Arc;

#[test]
fn given_gap_after_remove_when_renumbering_then_contiguous_again() {
    init_test_setup();
    // Arrange
    let (mut store, sink) = recording_store();
    let p = store.append_node(named("P", 1), None).unwrap();
    let c1 = store.append_node(named("C1", 2), Some(p)).unwrap();
    let c2 = store.append_node(named("C2", 3), Some(p)).unwrap();
    let c3 = store.append_node(named("C3", 4), Some(p)).unwrap();
    store.remove_subtree(c2).unwrap();
    assert!(!store.sequences_are_contiguous(Some(p)));
    sink.take();

    // Act
    let changed = store.renumber_children(Some(p), false).unwrap();

    // Assert
    assert_eq!(changed, 1);
    assert_eq!(store.get_node_data(c1, false).unwrap().sequence, 1);
    assert_eq!(store.get_node_data(c3, false).unwrap().sequence, 2);
    assert!(store.sequences_are_contiguous(Some(p)));
    assert_eq!(sink.take(), vec![PendingEdit::HierarchyChanged(1)]);
}

#[test]
fn given_contiguous_children_when_renumbering_then_nothing_changes() {
    // Arrange
    let (mut store, sink) = recording_store();
    let p = store.append_node(named("P", 1), None).unwrap();
    store.append_node(named("C1", 2), Some(p)).unwrap();
    sink.take();

    // Act
    let changed = store.renumber_children(Some(p), true).unwrap();

    // Assert
    assert_eq!(changed, 0);
    assert!(sink.take().is_empty());
}

#[test]
fn given_nested_gaps_when_renumbering_recursively_then_all_levels_fixed() {
    // Arrange
    let (mut store, _sink) = recording_store();
    let p = store.append_node(named("P", 1), None).unwrap();
    let a = store.append_node(named("A", 2), Some(p)).unwrap();
    let gone = store.append_node(named("Gone", 3), Some(a)).unwrap();
    let kept = store.append_node(named("Kept", 4), Some(a)).unwrap();
    store.remove_subtree(gone).unwrap();

    // Act
    let changed = store.renumber_children(None, true).unwrap();

    // Assert
    assert_eq!(changed, 1);
    assert_eq!(store.get_node_data(kept, false).unwrap().sequence, 1);
    assert!(store.sequences_are_contiguous(Some(a)));
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(10)]
fn given_sequence_base_when_appending_then_first_child_uses_base(#[case] base: i64) {
    // Arrange
    let config = StoreConfig {
        sequence_base: base,
        ..StoreConfig::default()
    };
    let mut store = NodeStore::with_config(Arc::new(RecordingSink::new()), config);

    // Act
    let first = store.append_node(NodeRecord::named("First"), None).unwrap();
    let second = store.append_node(NodeRecord::named("Second"), None).unwrap();

    // Assert
    assert_eq!(store.get_node_data(first, false).unwrap().sequence, base);
    assert_eq!(store.get_node_data(second, false).unwrap().sequence, base + 1);
    assert!(store.sequences_are_contiguous(None));
}

#[test]
fn given_renumber_on_remove_when_removing_then_gap_closed() {
    // Arrange
    let config = StoreConfig {
        renumber_on_remove: true,
        ..StoreConfig::default()
    };
    let mut store = NodeStore::with_config(Arc::new(RecordingSink::new()), config);
    let p = store.append_node(named("P", 1), None).unwrap();
    let c1 = store.append_node(named("C1", 2), Some(p)).unwrap();
    store.append_node(named("C2", 3), Some(p)).unwrap();
    let c3 = store.append_node(named("C3", 4), Some(p)).unwrap();

    // Act
    store.remove_subtree(c1).unwrap();

    // Assert
    assert_eq!(store.get_node_data(c3, false).unwrap().sequence, 2);
    assert!(store.sequences_are_contiguous(Some(p)));
}

#[test]
fn given_sequence_in_update_when_applied_then_node_keeps_new_value() {
    // Arrange
    let (mut store, sink) = recording_store();
    let p = store.append_node(named("P", 1), None).unwrap();
    let c = store.append_node(named("C", 2), Some(p)).unwrap();
    let mut data = store.get_node_data(c, false).unwrap();
    data.sequence = 7;
    sink.take();

    // Act
    store.update_node_data(c, &data).unwrap();

    // Assert
    assert_eq!(store.get_node_data(c, false).unwrap().sequence, 7);
    assert_eq!(
        sink.take(),
        vec![
            PendingEdit::PropertyChanged(2),
            PendingEdit::HierarchyChanged(1)
        ]
    );
}
