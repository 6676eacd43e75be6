use super::*;
use crate::content::metrics::FixedMetrics;
use crate::content::properties::PropertyMap;

fn props(json: &str) -> PropertyMap {
    serde_json::from_str(json).unwrap()
}

#[test]
fn defaults_without_properties() {
    let p = LayoutParams::resolve(
        &PropertyMap::new(),
        &FixedMetrics::default(),
        &SourceLocation::default(),
    )
    .unwrap();
    assert_eq!(p.break_before, BreakKind::Auto);
    assert!(!p.keep_with_next);
    assert_eq!(p.span, SpanKind::None);
    assert!((p.line_height - 14.4).abs() < 1e-9);
    assert_eq!(p.provisional_distance, 24.0);
    assert!(p.cell.is_none());
}

#[test]
fn keep_accepts_always_and_integers() {
    let m = FixedMetrics::default();
    let loc = SourceLocation::default();
    for (json, expected) in [
        (r#"{"keep-with-next": "always"}"#, true),
        (r#"{"keep-with-next": 1}"#, true),
        (r#"{"keep-with-next": "auto"}"#, false),
        (r#"{"keep-with-next": true}"#, true),
    ] {
        let p = LayoutParams::resolve(&props(json), &m, &loc).unwrap();
        assert_eq!(p.keep_with_next, expected, "{json}");
    }
}

#[test]
fn unknown_break_is_structural() {
    let err = LayoutParams::resolve(
        &props(r#"{"break-before": "sideways"}"#),
        &FixedMetrics::default(),
        &SourceLocation::new("d.fo", 9, 1),
    )
    .unwrap_err();
    assert!(matches!(err, LayoutError::Structural { .. }));
    assert!(err.to_string().contains("sideways"));
}

#[test]
fn table_cell_role_yields_override() {
    let p = LayoutParams::resolve(
        &props(r#"{"container-role": "table-cell", "cell-start-offset": 10, "cell-width": 80}"#),
        &FixedMetrics::default(),
        &SourceLocation::default(),
    )
    .unwrap();
    assert_eq!(
        p.cell,
        Some(CellOverride {
            start_offset: 10.0,
            width: 80.0
        })
    );
}

#[test]
fn break_statuses() {
    assert_eq!(BreakKind::Auto.status(), None);
    assert_eq!(BreakKind::Column.status(), Some(Status::ForceColumnBreak));
    assert_eq!(BreakKind::OddPage.status(), Some(Status::ForcePageBreakOdd));
}
