use super::*;
use crate::content::dsl::{block, flow, lines, marker};

fn record(class: &str, marker: u32, owner: u32, first: bool, last: bool) -> MarkerRecord {
    MarkerRecord {
        class_name: class.to_string(),
        marker: NodeId(marker),
        owner: NodeId(owner),
        page: 1,
        is_first: first,
        is_last: last,
        finalized: true,
    }
}

fn flat_tree() -> ContentTree {
    ContentTree::from_def(&flow().child(block()).build()).unwrap().0
}

#[test]
fn carryover_returns_smallest_registration_index() {
    let mut reg = MarkerRegistry::new();
    reg.register(record("h", 10, 1, false, true));
    reg.register(record("other", 11, 2, true, true));
    reg.register(record("h", 12, 3, true, true));
    let tree = flat_tree();
    let hit = reg
        .search(&tree, "h", RetrievePosition::FirstIncludingCarryover, MarkerTieBreak::Latest)
        .unwrap();
    assert_eq!(hit.marker, NodeId(10));
}

#[test]
fn positions_filter_on_first_and_last() {
    let mut reg = MarkerRegistry::new();
    reg.register(record("h", 10, 1, false, true));
    reg.register(record("h", 12, 3, true, false));
    reg.register(record("h", 14, 5, true, true));
    reg.register(record("h", 16, 7, true, false));
    let tree = flat_tree();
    let find = |pos| {
        reg.search(&tree, "h", pos, MarkerTieBreak::Latest)
            .map(|r| r.marker)
    };
    assert_eq!(find(RetrievePosition::FirstStartingWithinPage), Some(NodeId(12)));
    assert_eq!(find(RetrievePosition::LastStartingWithinPage), Some(NodeId(16)));
    assert_eq!(find(RetrievePosition::LastEndingWithinPage), Some(NodeId(14)));
    assert!(
        reg.search(&tree, "none", RetrievePosition::FirstIncludingCarryover, MarkerTieBreak::Latest)
            .is_none()
    );
}

#[test]
fn earliest_tie_break_prefers_the_enclosing_owner() {
    // flow > outer(block: marker, inner(block: marker, lines))
    let def = flow()
        .child(
            block()
                .child(marker("h"))
                .child(block().child(marker("h")).child(lines().line("x", 5.0))),
        )
        .build();
    let (tree, root) = ContentTree::from_def(&def).unwrap();
    let outer = tree.child(root, 0).unwrap();
    let outer_marker = tree.child(outer, 0).unwrap();
    let inner = tree.child(outer, 1).unwrap();
    let inner_marker = tree.child(inner, 0).unwrap();

    let mut reg = MarkerRegistry::new();
    reg.register(record("h", outer_marker.0, outer.0, true, true));
    reg.register(record("h", inner_marker.0, inner.0, true, true));

    let latest = reg
        .search(&tree, "h", RetrievePosition::LastEndingWithinPage, MarkerTieBreak::Latest)
        .unwrap();
    assert_eq!(latest.marker, inner_marker);
    let earliest = reg
        .search(&tree, "h", RetrievePosition::LastEndingWithinPage, MarkerTieBreak::Earliest)
        .unwrap();
    assert_eq!(earliest.marker, outer_marker);
}

#[test]
fn finalize_only_touches_pending_records_of_the_owner() {
    let mut reg = MarkerRegistry::new();
    let mut pending = record("h", 10, 1, true, false);
    pending.finalized = false;
    reg.register(pending);
    reg.register(record("h", 12, 2, true, false));
    reg.finalize(NodeId(1), false, true);
    reg.finalize(NodeId(2), false, true);
    assert!(reg.records()[0].is_last && !reg.records()[0].is_first);
    assert!(!reg.records()[1].is_last);
}

#[test]
fn truncate_drops_later_registrations() {
    let mut reg = MarkerRegistry::new();
    reg.register(record("a", 1, 1, true, true));
    let len = reg.len();
    reg.register(record("b", 2, 2, true, true));
    reg.truncate(len);
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.records()[0].class_name, "a");
}

#[test]
fn history_scans_back_within_the_sequence() {
    let mut history = MarkerHistory::new();
    let mut p1 = MarkerRegistry::new();
    p1.register(record("h", 1, 1, true, true));
    p1.register(record("h", 2, 2, true, true));
    history.push_page(1, 0, p1);
    history.push_page(2, 0, MarkerRegistry::new());
    let mut p3 = MarkerRegistry::new();
    p3.register(record("h", 3, 3, true, true));
    history.push_page(3, 1, p3);

    assert_eq!(history.search_back("h", None).unwrap().marker, NodeId(3));
    assert!(history.search_back("h", Some(0)).is_none());
    history.push_page(4, 1, MarkerRegistry::new());
    assert_eq!(history.search_back("h", Some(1)).unwrap().marker, NodeId(3));
    assert_eq!(history.len(), 4);
}
