use super::*;
use crate::area::model::{Area, AreaKind};
use crate::content::dsl::{block, marker, text_block};
use crate::layout::context::{LayoutEnv, LayoutOpts};
use crate::layout::engine;
use crate::layout::status::Status;
use crate::marker::registry::MarkerRegistry;

fn column(height: f64) -> Area {
    Area::new(AreaKind::Column, 100.0, height)
}

#[test]
fn rollback_restores_cursors_ids_and_markers() {
    let def = block()
        .child(text_block(10.0, ["a", "b"]).id("first"))
        .child(
            block()
                .id("second")
                .child(marker("m"))
                .child(text_block(10.0, ["c", "d"])),
        )
        .build();
    let (mut tree, root) = ContentTree::from_def(&def).unwrap();
    let first = tree.child(root, 0).unwrap();
    let second = tree.child(root, 1).unwrap();
    let mut env = LayoutEnv::new(LayoutOpts::default());
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(1, 0, &mut markers, &mut env);

    let status = engine::layout(&mut tree, root, &mut column(15.0), &mut ctx).unwrap();
    assert_eq!(status, Status::AreaFullSome);

    let snapshot = CursorSnapshot::capture(&tree, root, &ctx);
    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot.cursor_of(first), Some(tree.cursor(first)));
    assert!(snapshot.cursor_of(second).is_none());
    let saved_root = tree.cursor(root);

    let mut attempt = column(100.0);
    assert_eq!(engine::layout(&mut tree, root, &mut attempt, &mut ctx).unwrap(), Status::Ok);
    assert!(ctx.env.ids.contains("second"));
    assert_eq!(ctx.markers.len(), 1);

    snapshot.rollback(&mut tree, &mut ctx);
    assert_eq!(tree.cursor(root), saved_root);
    assert!(tree.cursor(second).is_start());
    assert!(!ctx.env.ids.contains("second"));
    assert!(ctx.env.ids.contains("first"));
    assert!(ctx.markers.is_empty());
    assert_eq!(ctx.env.counters.rollbacks, 1);

    let mut again = column(100.0);
    assert_eq!(engine::layout(&mut tree, root, &mut again, &mut ctx).unwrap(), Status::Ok);
    assert_eq!(again.texts(), attempt.texts());
    assert_eq!(again.texts(), vec!["b", "c", "d"]);
}

#[test]
fn snapshot_of_an_untouched_root_resets_everything() {
    let def = block().child(text_block(10.0, ["a"])).build();
    let (mut tree, root) = ContentTree::from_def(&def).unwrap();
    let mut env = LayoutEnv::new(LayoutOpts::default());
    let mut markers = MarkerRegistry::new();
    let mut ctx = LayoutContext::new(1, 0, &mut markers, &mut env);

    let snapshot = CursorSnapshot::capture(&tree, root, &ctx);
    assert_eq!(snapshot.len(), 1);
    engine::layout(&mut tree, root, &mut column(100.0), &mut ctx).unwrap();
    assert!(tree.cursor(root).is_complete());

    snapshot.rollback(&mut tree, &mut ctx);
    let leaf = tree.child(tree.child(root, 0).unwrap(), 0).unwrap();
    assert!(tree.cursor(root).is_start());
    assert!(tree.cursor(leaf).is_start());
}
