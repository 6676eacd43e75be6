use super::*;

#[test]
fn display_prefixes_are_stable() {
    let loc = SourceLocation::new("doc.fo", 3, 7);
    assert!(
        LayoutError::structural("x", loc.clone())
            .to_string()
            .contains("structural error at doc.fo:3:7")
    );
    assert!(
        LayoutError::non_termination("x", loc, 17)
            .to_string()
            .contains("non-termination at")
    );
    assert!(
        LayoutError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        LayoutError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LayoutError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert!(!err.is_fatal_layout());
}

#[test]
fn unknown_location_renders_placeholder() {
    assert_eq!(SourceLocation::default().to_string(), "<unknown>");
    assert_eq!(SourceLocation::new("", 4, 2).to_string(), "<input>:4:2");
}

#[test]
fn fatal_kinds_expose_location() {
    let loc = SourceLocation::new("a.fo", 1, 1);
    let err = LayoutError::structural("bad arity", loc.clone());
    assert!(err.is_fatal_layout());
    assert_eq!(err.location(), Some(&loc));
    assert!(LayoutError::validation("x").location().is_none());
}
