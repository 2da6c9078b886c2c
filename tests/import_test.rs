//! Integration tests for importing, duplicating and loading subtrees.

use notetree::domain::{DomainError, NodeRecord};
use notetree::util::testing::{init_test_setup, named, recording_store};
use notetree::ImportNode;

fn node(name: &str, id: i64) -> ImportNode {
    ImportNode::new(named(name, id))
}

fn alias(name: &str, id: i64, master: i64) -> ImportNode {
    ImportNode::new(NodeRecord {
        shared_master_id: master,
        ..named(name, id)
    })
}

// ============================================================
// import_subtree
// ============================================================

#[test]
fn given_colliding_ids_when_importing_then_remapped_and_aliases_rewritten() {
    init_test_setup();
    // Arrange
    let (mut store, _sink) = recording_store();
    let root = store.append_node(named("Existing", 1), None).unwrap();
    store.append_node(named("Existing2", 2), Some(root)).unwrap();
    let import = vec![node("Imported", 1).with_children(vec![alias("Copy", 2, 1)])];

    // Act
    let (handles, remap) = store.import_subtree(import, Some(root)).unwrap();

    // Assert
    assert_eq!(handles.len(), 1);
    let new_root_id = remap[&1];
    let new_alias_id = remap[&2];
    assert_ne!(new_root_id, 1);
    assert_ne!(new_alias_id, 2);
    let alias_handle = store.get_node_from_node_id(new_alias_id).unwrap();
    let data = store.get_node_data(alias_handle, false).unwrap();
    assert_eq!(data.shared_master_id, new_root_id);
    assert_eq!(data.name, "Imported");
    assert_eq!(store.parent(handles[0]), Some(root));
    assert!(store.validate().is_ok());
}

#[test]
fn given_free_ids_when_importing_then_ids_kept_and_remap_empty() {
    // Arrange
    let (mut store, _sink) = recording_store();
    let import = vec![node("A", 10).with_children(vec![node("B", 11)])];

    // Act
    let (_, remap) = store.import_subtree(import, None).unwrap();

    // Assert
    assert!(remap.is_empty());
    assert!(store.get_node_from_node_id(11).is_some());
    assert_eq!(store.len(), 2);
}

#[test]
fn given_alias_to_missing_master_when_importing_then_nothing_inserted() {
    // Arrange
    let (mut store, _sink) = recording_store();
    let import = vec![node("A", 10).with_children(vec![alias("Lost", 11, 99)])];

    // Act
    let result = store.import_subtree(import, None);

    // Assert
    assert_eq!(
        result.unwrap_err(),
        DomainError::DanglingAlias {
            alias: 11,
            master: 99
        }
    );
    assert!(store.is_empty());
    // reserved ids were released again
    let h = store.append_node(named("Retry", 10), None).unwrap();
    assert_eq!(store.get_node_data(h, false).unwrap().id, 10);
}

#[test]
fn given_alias_to_store_master_when_importing_then_accepted() {
    // Arrange
    let (mut store, _sink) = recording_store();
    store.append_node(named("Master", 1), None).unwrap();

    // Act
    let (handles, _) = store.import_subtree(vec![alias("A", 5, 1)], None).unwrap();

    // Assert
    assert_eq!(store.node_name(handles[0]).as_deref(), Some("Master"));
}

// ============================================================
// duplicate_subtree
// ============================================================

#[test]
fn given_subtree_when_duplicating_then_fresh_ids_same_shape() {
    // Arrange
    let (mut store, _sink) = recording_store();
    let root = store.append_node(named("Root", 1), None).unwrap();
    let src = store.append_node(named("Src", 2), Some(root)).unwrap();
    store.append_node(named("Leaf", 3), Some(src)).unwrap();
    store.append_node(
        NodeRecord {
            shared_master_id: 2,
            ..named("Alias", 4)
        },
        Some(src),
    )
    .unwrap();

    // Act
    let copy = store.duplicate_subtree(src, Some(root)).unwrap();

    // Assert
    assert_eq!(store.len(), 7);
    let copy_id = store.get_node_data(copy, false).unwrap().id;
    assert!(copy_id > 4);
    let child_ids = store.get_children_node_ids(copy).unwrap();
    assert_eq!(child_ids.len(), 2);
    assert!(child_ids.iter().all(|&id| id > 4));
    let alias_copy = store.last_child(copy).unwrap();
    assert_eq!(
        store.get_node_data(alias_copy, false).unwrap().shared_master_id,
        copy_id
    );
    assert_eq!(store.get_node_data(copy, false).unwrap().sequence, 2);
    assert!(store.validate().is_ok());
}

// ============================================================
// load
// ============================================================

#[test]
fn given_stored_tree_when_loading_then_sequences_kept_and_silent() {
    // Arrange
    let (mut store, sink) = recording_store();
    let mut first = named("First", 1);
    first.sequence = 5;
    let mut second = named("Second", 2);
    second.sequence = 9;
    second.tags = "kept".to_string();

    // Act
    store
        .load(
            vec![ImportNode::new(first), ImportNode::new(second)],
            vec![2],
        )
        .unwrap();

    // Assert
    assert!(sink.edits().is_empty());
    let h = store.get_node_from_node_id(2).unwrap();
    assert_eq!(store.get_node_data(h, false).unwrap().sequence, 9);
    assert_eq!(store.bookmarks(), &[2]);
    assert!(store.used_tags().contains("kept"));
    assert!(!store.sequences_are_contiguous(None));
}

#[test]
fn given_dangling_alias_when_loading_then_error_reported() {
    // Arrange
    let (mut store, sink) = recording_store();

    // Act
    let result = store.load(vec![node("A", 1), alias("B", 2, 50)], Vec::new());

    // Assert
    let err = result.unwrap_err();
    assert!(err.to_string().contains("50"));
    assert!(sink.edits().is_empty());
}

#[test]
fn given_duplicate_ids_in_source_when_loading_then_second_gets_fresh_id() {
    // Arrange
    let (mut store, _sink) = recording_store();

    // Act
    let remap = store
        .load(vec![node("A", 1), node("B", 1)], Vec::new())
        .unwrap();

    // Assert
    assert_eq!(store.len(), 2);
    assert!(remap.is_empty(), "first copy keeps its id, nothing to rewrite");
    assert!(store.validate().is_ok());
}

#[test]
fn given_same_id_three_times_when_importing_then_all_ids_distinct() {
    // Arrange
    let (mut store, _sink) = recording_store();
    let import = vec![node("A", 7), node("B", 7), node("C", 7)];

    // Act
    let (handles, remap) = store.import_subtree(import, None).unwrap();

    // Assert
    let mut ids: Vec<i64> = handles
        .iter()
        .map(|&h| store.get_node_data(h, false).unwrap().id)
        .collect();
    assert_eq!(ids[0], 7);
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    assert!(remap.is_empty());
    for &h in &handles {
        let id = store.get_node_data(h, false).unwrap().id;
        assert_eq!(store.get_node_from_node_id(id), Some(h));
    }
    assert!(store.integrity_issues().is_empty());
}

#[test]
fn given_repeated_master_id_when_importing_then_alias_follows_first_copy() {
    // Arrange
    let (mut store, _sink) = recording_store();
    store.append_node(named("Existing", 7), None).unwrap();
    let import = vec![node("First", 7), node("Second", 7), alias("Alias", 9, 7)];

    // Act
    let (handles, remap) = store.import_subtree(import, None).unwrap();

    // Assert
    let first_id = store.get_node_data(handles[0], false).unwrap().id;
    assert_eq!(remap.get(&7), Some(&first_id));
    assert_eq!(store.node_name(handles[2]).as_deref(), Some("First"));
    assert!(store.integrity_issues().is_empty());
}
