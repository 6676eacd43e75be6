use super::*;
use crate::content::def::NodeDef;
use crate::content::dsl::{
    block, block_container, flow, item_body, item_label, list_block, list_item, marker,
    table_cell, text_block,
};
use crate::layout::context::{LayoutEnv, LayoutOpts};
use crate::marker::registry::MarkerRegistry;

fn tree_of(def: impl Into<NodeDef>) -> (ContentTree, NodeId) {
    ContentTree::from_def(&def.into()).unwrap()
}

fn column(height: f64) -> Area {
    Area::new(AreaKind::Column, 100.0, height)
}

#[test]
fn resumed_block_matches_a_single_pass() {
    let texts = ["a", "b", "c", "d", "e"];
    let (mut tree, root) = tree_of(block().child(text_block(10.0, texts)));
    let mut env = LayoutEnv::new(LayoutOpts::default());
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(1, 0, &mut markers, &mut env);

    let mut first = column(25.0);
    assert_eq!(layout(&mut tree, root, &mut first, &mut ctx).unwrap(), Status::AreaFullSome);
    assert!(!first.children[0].is_last);
    let mut second = column(100.0);
    assert_eq!(layout(&mut tree, root, &mut second, &mut ctx).unwrap(), Status::Ok);
    assert!(!second.children[0].is_first);
    assert!(second.children[0].is_last);

    let (mut fresh, fresh_root) = tree_of(block().child(text_block(10.0, texts)));
    let mut whole = column(100.0);
    assert_eq!(layout(&mut fresh, fresh_root, &mut whole, &mut ctx).unwrap(), Status::Ok);

    let mut split = first.texts();
    split.extend(second.texts());
    assert_eq!(split, whole.texts());
    assert_eq!(first.height + second.height, whole.height);
}

#[test]
fn keep_with_next_withdraws_the_kept_block() {
    let (mut tree, root) = tree_of(block().children([
        text_block(30.0, ["a"]),
        text_block(40.0, ["b"]).keep_with_next(),
        text_block(40.0, ["c"]),
    ]));
    let mut env = LayoutEnv::new(LayoutOpts::default());
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(1, 0, &mut markers, &mut env);

    let mut first = column(100.0);
    assert_eq!(layout(&mut tree, root, &mut first, &mut ctx).unwrap(), Status::AreaFullSome);
    assert_eq!(first.texts(), vec!["a"]);
    assert_eq!(first.height, 30.0);
    assert_eq!(ctx.env.counters.keep_rollbacks, 1);

    let mut second = column(100.0);
    assert_eq!(layout(&mut tree, root, &mut second, &mut ctx).unwrap(), Status::Ok);
    assert_eq!(second.texts(), vec!["b", "c"]);
}

#[test]
fn markers_of_a_call_that_placed_nothing_are_unwound() {
    let (mut tree, root) = tree_of(block().child(marker("h")).child(text_block(30.0, ["x"])));
    let mut env = LayoutEnv::new(LayoutOpts::default());
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(1, 0, &mut markers, &mut env);

    let mut short = column(20.0);
    assert_eq!(layout(&mut tree, root, &mut short, &mut ctx).unwrap(), Status::AreaFullNone);
    assert!(ctx.markers.is_empty());
    assert!(tree.cursor(tree.child(root, 0).unwrap()).is_start());

    let mut tall = column(100.0);
    assert_eq!(layout(&mut tree, root, &mut tall, &mut ctx).unwrap(), Status::Ok);
    assert_eq!(ctx.markers.len(), 1);
    let record = &ctx.markers.records()[0];
    assert!(record.is_first && record.is_last && record.finalized);
}

#[test]
fn zero_progress_trips_the_loop_guard() {
    let (mut tree, root) = tree_of(text_block(200.0, ["too tall"]));
    let mut env = LayoutEnv::new(LayoutOpts {
        max_stalled_calls: 3,
        ..LayoutOpts::default()
    });
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(1, 0, &mut markers, &mut env);

    for _ in 0..2 {
        let mut area = column(100.0);
        assert_eq!(layout(&mut tree, root, &mut area, &mut ctx).unwrap(), Status::AreaFullNone);
        assert!(area.is_empty());
    }
    let err = layout(&mut tree, root, &mut column(100.0), &mut ctx).unwrap_err();
    assert!(matches!(err, LayoutError::NonTermination { attempts: 3, .. }));
}

#[test]
fn page_break_before_is_suppressed_at_the_page_top() {
    let (mut tree, root) = tree_of(text_block(10.0, ["x"]).break_before("page"));
    let mut env = LayoutEnv::new(LayoutOpts::default());
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(1, 0, &mut markers, &mut env);

    let mut top = column(100.0);
    top.page_top = true;
    assert_eq!(layout(&mut tree, root, &mut top, &mut ctx).unwrap(), Status::Ok);
    assert_eq!(top.texts(), vec!["x"]);
}

#[test]
fn page_break_before_fires_once_below_content() {
    let (mut tree, root) = tree_of(text_block(10.0, ["x"]).break_before("page"));
    let mut env = LayoutEnv::new(LayoutOpts::default());
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(1, 0, &mut markers, &mut env);

    let mut area = column(100.0);
    area.attach(Area::line("earlier", 100.0, 10.0));
    assert_eq!(layout(&mut tree, root, &mut area, &mut ctx).unwrap(), Status::ForcePageBreak);
    assert_eq!(area.children.len(), 1);

    let mut next = column(100.0);
    assert_eq!(layout(&mut tree, root, &mut next, &mut ctx).unwrap(), Status::Ok);
    assert_eq!(next.texts(), vec!["x"]);
}

#[test]
fn breaks_are_ignored_below_column_level() {
    let (mut tree, root) = tree_of(text_block(10.0, ["x"]).break_before("column"));
    let mut env = LayoutEnv::new(LayoutOpts::default());
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(1, 0, &mut markers, &mut env);

    let mut area = Area::new(AreaKind::Block, 100.0, 100.0);
    area.attach(Area::line("earlier", 100.0, 10.0));
    assert_eq!(layout(&mut tree, root, &mut area, &mut ctx).unwrap(), Status::Ok);
}

#[test]
fn break_after_parks_the_node_until_the_next_call() {
    let (mut tree, root) = tree_of(text_block(10.0, ["x"]).break_after("column"));
    let mut env = LayoutEnv::new(LayoutOpts::default());
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(1, 0, &mut markers, &mut env);

    let mut area = column(100.0);
    assert_eq!(layout(&mut tree, root, &mut area, &mut ctx).unwrap(), Status::ForceColumnBreak);
    assert_eq!(tree.cursor(root).position, CursorPosition::BreakAfter);

    let mut next = column(100.0);
    assert_eq!(layout(&mut tree, root, &mut next, &mut ctx).unwrap(), Status::Ok);
    assert!(next.is_empty());
    assert!(tree.cursor(root).is_complete());
}

#[test]
fn space_before_is_emitted_once() {
    let (mut tree, root) =
        tree_of(text_block(10.0, ["a", "b"]).space_before(5.0).space_after(3.0));
    let mut env = LayoutEnv::new(LayoutOpts::default());
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(1, 0, &mut markers, &mut env);

    let mut first = column(16.0);
    assert_eq!(layout(&mut tree, root, &mut first, &mut ctx).unwrap(), Status::AreaFullSome);
    assert_eq!(first.children[0].kind, AreaKind::DisplaySpace);
    assert_eq!(first.height, 15.0);

    let mut second = column(100.0);
    assert_eq!(layout(&mut tree, root, &mut second, &mut ctx).unwrap(), Status::Ok);
    assert_eq!(second.children[0].kind, AreaKind::Block);
    assert_eq!(second.height, 13.0);
}

#[test]
fn unexpected_children_are_skipped_with_a_diagnostic() {
    let (mut tree, root) = tree_of(
        list_block()
            .child(text_block(10.0, ["stray"]))
            .child(list_item(
                item_label().child(text_block(10.0, ["1."])),
                item_body().child(text_block(10.0, ["one"])),
            )),
    );
    let mut env = LayoutEnv::new(LayoutOpts::default());
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(1, 0, &mut markers, &mut env);

    let mut area = column(100.0);
    assert_eq!(layout(&mut tree, root, &mut area, &mut ctx).unwrap(), Status::Ok);
    assert_eq!(area.texts(), vec!["1.", "one"]);
    assert_eq!(env.diagnostics.len(), 1);
    assert!(env.diagnostics[0].message.contains("skipped"));
}

#[test]
fn fixed_height_container_is_unbreakable() {
    let (mut tree, root) = tree_of(
        block_container()
            .prop("height", 50.0)
            .child(text_block(10.0, ["a"])),
    );
    let mut env = LayoutEnv::new(LayoutOpts::default());
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(1, 0, &mut markers, &mut env);

    let mut short = column(40.0);
    assert_eq!(layout(&mut tree, root, &mut short, &mut ctx).unwrap(), Status::AreaFullNone);
    assert!(short.is_empty());

    let mut tall = column(100.0);
    assert_eq!(layout(&mut tree, root, &mut tall, &mut ctx).unwrap(), Status::Ok);
    assert_eq!(tall.children[0].kind, AreaKind::BlockContainer);
    assert_eq!(tall.height, 50.0);
}

#[test]
fn overflowing_fixed_container_completes_with_a_warning() {
    let (mut tree, root) = tree_of(
        block_container()
            .prop("height", 50.0)
            .prop("width", 40.0)
            .child(text_block(30.0, ["a", "b", "c"])),
    );
    let mut env = LayoutEnv::new(LayoutOpts::default());
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(1, 0, &mut markers, &mut env);

    let mut area = column(100.0);
    assert_eq!(layout(&mut tree, root, &mut area, &mut ctx).unwrap(), Status::Ok);
    assert_eq!(area.children[0].content_width, 40.0);
    assert_eq!(area.height, 50.0);
    assert_eq!(env.diagnostics.len(), 1);
}

#[test]
fn ids_are_created_and_configured() {
    let (mut tree, root) = tree_of(text_block(10.0, ["x"]).id("intro"));
    let mut env = LayoutEnv::new(LayoutOpts::default());
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(7, 0, &mut markers, &mut env);

    layout(&mut tree, root, &mut column(100.0), &mut ctx).unwrap();
    assert_eq!(env.ids.page_of("intro"), Some(7));
}

#[test]
fn duplicate_ids_are_structural() {
    let (mut tree, root) = tree_of(
        block()
            .child(text_block(10.0, ["a"]).id("dup"))
            .child(text_block(10.0, ["b"]).id("dup")),
    );
    let mut env = LayoutEnv::new(LayoutOpts::default());
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(1, 0, &mut markers, &mut env);

    let err = layout(&mut tree, root, &mut column(100.0), &mut ctx).unwrap_err();
    assert!(matches!(err, LayoutError::Structural { .. }));
}

#[test]
fn a_flow_cannot_be_laid_out_as_a_child() {
    let (mut tree, root) = tree_of(flow().child(text_block(10.0, ["a"])));
    let mut env = LayoutEnv::new(LayoutOpts::default());
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(1, 0, &mut markers, &mut env);

    let err = layout(&mut tree, root, &mut column(100.0), &mut ctx).unwrap_err();
    assert!(err.to_string().contains("page-sequence"));
}

#[test]
fn table_cell_forces_list_geometry() {
    let (mut tree, root) = tree_of(table_cell(10.0, 50.0).child(list_block().child(list_item(
        item_label().child(text_block(10.0, ["1."])),
        item_body().child(text_block(10.0, ["one"])),
    ))));
    let mut env = LayoutEnv::new(LayoutOpts::default());
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(1, 0, &mut markers, &mut env);

    let mut area = column(100.0);
    assert_eq!(layout(&mut tree, root, &mut area, &mut ctx).unwrap(), Status::Ok);
    let list = &area.children[0].children[0];
    assert_eq!(list.offset.x, 10.0);
    assert_eq!(list.content_width, 50.0);
}
