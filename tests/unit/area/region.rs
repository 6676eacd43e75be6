use super::*;

fn fill(body: &mut RegionBody, h: Length, node: u32) {
    let col = body.current_column_mut().unwrap();
    let mut b = Area::new(AreaKind::Block, col.content_width, h).generated_by(NodeId(node));
    b.height = h;
    col.attach(b);
}

#[test]
fn columns_split_the_width_with_gaps() {
    let mut body = RegionBody::new(210.0, 100.0, 2, 10.0);
    assert!(body.needs_span(SpanKind::None));
    assert!(body.add_span_area(SpanKind::None));
    assert!(!body.needs_span(SpanKind::None));
    let area = body.clone().into_area();
    let cols = &area.children[0].children;
    assert_eq!(cols.len(), 2);
    assert_eq!(cols[0].content_width, 100.0);
    assert_eq!(cols[1].offset.x, 110.0);
    assert!(cols[0].page_top);
    assert!(!cols[1].page_top);
}

#[test]
fn spans_stack_and_consume_height() {
    let mut body = RegionBody::new(200.0, 100.0, 2, 0.0);
    body.add_span_area(SpanKind::All);
    fill(&mut body, 30.0, 1);
    assert!(body.needs_span(SpanKind::None));
    assert_eq!(body.remaining_height(), 70.0);
    body.add_span_area(SpanKind::None);
    assert_eq!(body.current_column().unwrap().max_height, 70.0);
    assert!(!body.current_column().unwrap().page_top);
    let area = body.into_area();
    assert_eq!(area.children[1].offset.y, 30.0);
}

#[test]
fn column_walk_stops_at_the_last_column() {
    let mut body = RegionBody::new(300.0, 100.0, 3, 0.0);
    body.add_span_area(SpanKind::None);
    assert!(!body.is_last_column());
    assert!(body.advance_column());
    assert!(body.advance_column());
    assert!(body.is_last_column());
    assert!(!body.advance_column());
    assert_eq!(body.current_column_index(), Some(2));
}

#[test]
fn balancing_shrinks_to_an_even_share() {
    let mut body = RegionBody::new(200.0, 100.0, 2, 0.0);
    body.add_span_area(SpanKind::None);
    fill(&mut body, 60.0, 1);
    body.advance_column();
    fill(&mut body, 20.0, 2);
    assert!(body.is_balancing_required(SpanKind::All));
    assert!(!body.is_balancing_required(SpanKind::None));

    let h = body.reset_span_area(2.0);
    assert_eq!(h, 42.0);
    assert!(body.is_new_span_area());
    assert_eq!(body.current_column_index(), Some(0));
    assert!(body.is_balanced());
    assert!(!body.is_balancing_required(SpanKind::All));

    body.restore_span_area();
    assert!(body.is_restored());
    assert_eq!(body.current_column().unwrap().max_height, 100.0);
}

#[test]
fn balanced_height_is_capped_by_the_unbalanced_height() {
    let mut body = RegionBody::new(200.0, 50.0, 2, 0.0);
    body.add_span_area(SpanKind::None);
    fill(&mut body, 50.0, 1);
    body.advance_column();
    fill(&mut body, 50.0, 2);
    assert_eq!(body.reset_span_area(10.0), 50.0);
}

#[test]
fn full_body_refuses_a_new_span() {
    let mut body = RegionBody::new(200.0, 40.0, 2, 0.0);
    body.add_span_area(SpanKind::All);
    fill(&mut body, 40.0, 1);
    assert!(!body.add_span_area(SpanKind::None));
}

#[test]
fn remove_generated_by_spans_all_columns() {
    let mut body = RegionBody::new(200.0, 100.0, 2, 0.0);
    body.add_span_area(SpanKind::None);
    fill(&mut body, 10.0, 7);
    body.advance_column();
    fill(&mut body, 15.0, 7);
    fill(&mut body, 5.0, 8);
    assert_eq!(body.column_of(NodeId(7)), Some(0));
    assert_eq!(body.remove_generated_by(NodeId(7)), 25.0);
    assert_eq!(body.column_of(NodeId(7)), None);
    assert_eq!(body.column_of(NodeId(8)), Some(1));
}
