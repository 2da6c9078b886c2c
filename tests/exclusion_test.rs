//! Integration tests for inherited search exclusion and searchable traversal.

use notetree::domain::{NodeHandle, NodeRecord};
use notetree::util::testing::{init_test_setup, named, recording_store};
use notetree::NodeStore;
use rstest::rstest;

fn flagged(name: &str, id: i64, me: bool, children: bool) -> NodeRecord {
    NodeRecord {
        exclude_me_from_search: me,
        exclude_children_from_search: children,
        ..named(name, id)
    }
}

/// Root(1) -> Hidden(2, exclude-children) -> Child(3) -> Grandchild(4); Visible(5) under Root.
fn fixture() -> (NodeStore, Vec<NodeHandle>) {
    init_test_setup();
    let (mut store, _sink) = recording_store();
    let root = store.append_node(named("Root", 1), None).unwrap();
    let hidden = store
        .append_node(flagged("Hidden", 2, false, true), Some(root))
        .unwrap();
    let child = store.append_node(named("Child", 3), Some(hidden)).unwrap();
    let grandchild = store.append_node(named("Grandchild", 4), Some(child)).unwrap();
    let visible = store.append_node(named("Visible", 5), Some(root)).unwrap();
    (store, vec![root, hidden, child, grandchild, visible])
}

#[rstest]
#[case(0, false)]
#[case(1, false)]
#[case(2, true)]
#[case(3, true)]
#[case(4, false)]
fn given_exclude_children_when_checking_then_descendants_inherit(
    #[case] pos: usize,
    #[case] excluded: bool,
) {
    // Arrange
    let (store, handles) = fixture();

    // Act / Assert
    assert_eq!(store.is_excluded(handles[pos]).unwrap(), excluded);
}

#[test]
fn given_exclude_me_when_checking_then_only_node_itself_excluded() {
    // Arrange
    let (mut store, _sink) = recording_store();
    let me = store
        .append_node(flagged("Me", 1, true, false), None)
        .unwrap();
    let child = store.append_node(named("Child", 2), Some(me)).unwrap();

    // Act / Assert
    assert!(store.is_excluded(me).unwrap());
    assert!(!store.is_excluded(child).unwrap());
}

#[test]
fn given_excluded_nodes_when_walking_then_skipped_and_flag_raised() {
    // Arrange
    let (store, _handles) = fixture();
    let mut seen = Vec::new();

    // Act
    let report = store
        .walk_searchable(|_, record| seen.push(record.id))
        .unwrap();

    // Assert
    assert_eq!(seen, vec![1, 2, 5]);
    assert_eq!(report.visited, 3);
    assert_eq!(report.skipped, 2);
    assert!(report.hit_exclusion());
    assert!(store.hit_exclusion_flag());
}

#[test]
fn given_raised_flag_when_clean_walk_then_flag_stays_until_cleared() {
    // Arrange
    let (mut store, handles) = fixture();
    store.walk_searchable(|_, _| {}).unwrap();
    store.clear_all_exclusions();

    // Act
    let report = store.walk_searchable(|_, _| {}).unwrap();

    // Assert
    assert!(!report.hit_exclusion());
    assert!(store.hit_exclusion_flag());
    store.clear_hit_exclusion_flag();
    assert!(!store.hit_exclusion_flag());
    assert!(!store.is_excluded(handles[3]).unwrap());
}

#[test]
fn given_flags_on_two_nodes_when_clearing_all_then_count_returned() {
    // Arrange
    let (mut store, _sink) = recording_store();
    store.append_node(flagged("A", 1, true, false), None).unwrap();
    store.append_node(flagged("B", 2, true, true), None).unwrap();
    store.append_node(named("C", 3), None).unwrap();

    // Act
    let cleared = store.clear_all_exclusions();

    // Assert
    assert_eq!(cleared, 2);
    assert_eq!(store.clear_all_exclusions(), 0);
}

#[test]
fn given_alias_of_excluded_master_when_checking_then_alias_excluded() {
    // Arrange
    let (mut store, _sink) = recording_store();
    store
        .append_node(flagged("Master", 1, true, false), None)
        .unwrap();
    let alias = store
        .append_node(
            NodeRecord {
                shared_master_id: 1,
                ..named("Alias", 2)
            },
            None,
        )
        .unwrap();

    // Act / Assert
    assert!(store.is_excluded(alias).unwrap());
}

#[test]
fn given_setter_when_toggling_exclusion_then_walk_reflects_it() {
    // Arrange
    let (mut store, _sink) = recording_store();
    let a = store.append_node(named("A", 1), None).unwrap();
    store.append_node(named("B", 2), Some(a)).unwrap();

    // Act
    store.set_node_exclusion(a, false, true).unwrap();
    let report = store.walk_searchable(|_, _| {}).unwrap();

    // Assert
    assert_eq!(report.visited, 1);
    assert_eq!(report.skipped, 1);
}
