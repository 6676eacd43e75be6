use super::*;

fn block(h: Length, node: u32) -> Area {
    let mut a = Area::new(AreaKind::Block, 100.0, h).generated_by(NodeId(node));
    a.height = h;
    a
}

#[test]
fn attach_grows_by_exactly_the_child_height() {
    let mut col = Area::new(AreaKind::Column, 100.0, 100.0);
    col.attach(block(40.0, 1));
    col.attach(block(25.0, 2));
    assert_eq!(col.height, 65.0);
    assert_eq!(col.children[1].offset.y, 40.0);
    assert_eq!(col.space_left(), 35.0);
}

#[test]
fn add_child_does_not_grow() {
    let mut col = Area::new(AreaKind::Column, 100.0, 100.0);
    col.add_child(block(40.0, 1));
    assert_eq!(col.height, 0.0);
    col.increase_height(40.0);
    assert_eq!(col.space_left(), 60.0);
}

#[test]
fn beside_takes_the_tallest_child() {
    let mut item = Area::new(AreaKind::ListItem, 100.0, 100.0).with_stacking(Stacking::Beside);
    item.attach(block(10.0, 1));
    item.attach(block(30.0, 2));
    assert_eq!(item.height, 30.0);
    assert_eq!(item.children[1].offset.y, 0.0);
}

#[test]
fn remove_generated_by_restacks() {
    let mut col = Area::new(AreaKind::Column, 100.0, 100.0);
    col.add_display_space(5.0, Some(NodeId(1)));
    col.attach(block(20.0, 1));
    col.attach(block(30.0, 2));
    let given_back = col.remove_generated_by(NodeId(1));
    assert_eq!(given_back, 25.0);
    assert_eq!(col.height, 30.0);
    assert_eq!(col.children.len(), 1);
    assert_eq!(col.children[0].offset.y, 0.0);
    assert_eq!(col.children[0].generator(), Some(NodeId(2)));
}

#[test]
fn display_space_is_not_content() {
    let mut col = Area::new(AreaKind::Column, 100.0, 100.0);
    col.add_display_space(6.0, None);
    col.add_display_space(0.0, None);
    assert_eq!(col.children.len(), 1);
    assert!(!col.has_content());
    assert_eq!(col.content_children(), 0);
}

#[test]
fn texts_follow_reading_order() {
    let mut b = Area::new(AreaKind::Block, 100.0, 100.0);
    b.attach(Area::line("one", 100.0, 10.0));
    b.attach(Area::line("two", 100.0, 10.0));
    let mut col = Area::new(AreaKind::Column, 100.0, 100.0);
    col.attach(b);
    col.attach(Area::line("three", 100.0, 10.0));
    assert_eq!(col.texts(), vec!["one", "two", "three"]);
    assert_eq!(col.children[1].bounds().y0, 20.0);
}

#[test]
fn start_end_bracket_the_area() {
    let mut a = Area::new(AreaKind::Block, 10.0, 10.0);
    assert!(!a.open);
    assert!(!a.add_id_ref("early"));
    a.start();
    assert!(a.open);
    assert!(a.add_id_ref("inside"));
    a.end();
    assert!(!a.open);
    assert!(!a.add_id_ref("late"));
    assert_eq!(a.id_refs, vec!["inside".to_string()]);
}

#[test]
fn serializes_without_internal_fields() {
    let mut a = Area::new(AreaKind::Block, 10.0, 10.0).generated_by(NodeId(3));
    a.attach(Area::line("x", 10.0, 4.0));
    let v = serde_json::to_value(&a).unwrap();
    assert_eq!(v["kind"], "block");
    assert!(v.get("generated_by").is_none());
    assert_eq!(v["children"][0]["text"], "x");
}
