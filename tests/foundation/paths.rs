//! Integration tests for FieldPath parsing

use stagehand_foundation::{ErrorKind, FieldPath};

#[test]
fn pipe_and_dot_name_the_same_field() {
    let piped = FieldPath::parse("Box Configuration|Dimensions").unwrap();
    let dotted = FieldPath::parse("Box Configuration.Dimensions").unwrap();
    assert_eq!(piped, dotted);
    assert_eq!(piped.segments(), ["Box Configuration", "Dimensions"]);
    assert_eq!(piped.leaf(), "Dimensions");
}

#[test]
fn labels_are_trimmed() {
    let path = FieldPath::parse(" Configuration | Mass ").unwrap();
    assert_eq!(path.segments(), ["Configuration", "Mass"]);
}

#[test]
fn empty_labels_are_rejected() {
    for raw in ["", "|Mass", "Configuration||Mass", "Configuration."] {
        let err = FieldPath::parse(raw).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidFieldPath(_)), "{raw:?}");
    }
}

#[test]
fn prefix_matching_is_by_whole_label() {
    let full = FieldPath::parse("Shape Configuration|Box|Dimensions").unwrap();
    let prefix = FieldPath::parse("Shape Configuration|Box").unwrap();
    let partial = FieldPath::parse("Shape Configuration|Bo").unwrap();
    assert!(full.starts_with(&prefix));
    assert!(full.starts_with(&full));
    assert!(!full.starts_with(&partial));
    assert!(!prefix.starts_with(&full));
}
