use std::path::Path;

use super::super::apply_edits;
use super::resolved;
use crate::error::SnapError;

#[test]
fn empty_edit_list_returns_the_source_unchanged() {
    let output = apply_edits(Path::new("spec.js"), "check(1)", Vec::new())
        .expect("empty edit list should apply");
    assert_eq!(output, "check(1)");
}

#[test]
fn each_range_is_textually_substituted() {
    let source = "check(x, `a`);\ncheck(y, `b`);\n";
    let edits = vec![
        resolved(9, 12, "`one`", "stack-a"),
        resolved(24, 27, "`two`", "stack-b"),
    ];

    let output = apply_edits(Path::new("spec.js"), source, edits).expect("edits should apply");
    assert_eq!(output, "check(x, `one`);\ncheck(y, `two`);\n");
}

#[test]
fn input_order_does_not_affect_the_output() {
    let source = "check(x, `a`);\ncheck(y, `b`);\n";
    let forward = vec![
        resolved(9, 12, "`one`", "stack-a"),
        resolved(24, 27, "`two`", "stack-b"),
    ];
    let reversed = forward.iter().rev().cloned().collect::<Vec<_>>();

    let forward_output =
        apply_edits(Path::new("spec.js"), source, forward).expect("forward order should apply");
    let reversed_output =
        apply_edits(Path::new("spec.js"), source, reversed).expect("reversed order should apply");
    assert_eq!(forward_output, reversed_output);
}

#[test]
fn zero_width_insertion_splices_without_consuming_source() {
    let source = "check(1)";
    let edits = vec![resolved(7, 7, ", `1`", "stack")];

    let output = apply_edits(Path::new("spec.js"), source, edits).expect("insertion should apply");
    assert_eq!(output, "check(1, `1`)");
}

#[test]
fn adjacent_non_empty_ranges_are_allowed() {
    let edits = vec![
        resolved(0, 3, "AAA", "stack-a"),
        resolved(3, 6, "BBB", "stack-b"),
    ];

    let output =
        apply_edits(Path::new("spec.js"), "abcdef", edits).expect("adjacent ranges should apply");
    assert_eq!(output, "AAABBB");
}

#[test]
fn insertions_at_the_same_point_conflict() {
    let source = "abcdefghijklmnop";
    let edits = vec![
        resolved(10, 10, ", `a`", "stack-a"),
        resolved(10, 10, ", `b`", "stack-b"),
    ];

    let error = apply_edits(Path::new("spec.js"), source, edits)
        .expect_err("same-point insertions should conflict");
    assert!(matches!(error, SnapError::Conflict { .. }));
}

#[test]
fn overlapping_ranges_conflict() {
    let edits = vec![
        resolved(2, 8, "X", "stack-a"),
        resolved(5, 10, "Y", "stack-b"),
    ];

    let error = apply_edits(Path::new("spec.js"), "abcdefghijkl", edits)
        .expect_err("overlapping ranges should conflict");
    assert!(matches!(error, SnapError::Conflict { .. }));
}

#[test]
fn insertion_touching_a_range_boundary_conflicts() {
    let edits = vec![
        resolved(2, 8, "X", "stack-a"),
        resolved(8, 8, "Y", "stack-b"),
    ];

    let error = apply_edits(Path::new("spec.js"), "abcdefghijkl", edits)
        .expect_err("insertion touching a range should conflict");
    assert!(matches!(error, SnapError::Conflict { .. }));
}

#[test]
fn conflict_error_surfaces_both_captured_stacks() {
    let edits = vec![
        resolved(2, 8, "X", "first recorded here"),
        resolved(5, 10, "Y", "second recorded here"),
    ];

    let error = apply_edits(Path::new("spec.js"), "abcdefghijkl", edits)
        .expect_err("overlapping ranges should conflict");
    let message = error.to_string();
    assert!(message.contains("first recorded here"), "got: {message}");
    assert!(message.contains("second recorded here"), "got: {message}");
}

#[test]
fn range_beyond_the_source_is_rejected() {
    let edits = vec![resolved(4, 99, "X", "stack")];

    let error = apply_edits(Path::new("spec.js"), "abcdef", edits)
        .expect_err("out-of-bounds range should be rejected");
    assert!(matches!(error, SnapError::InvalidSpan { .. }));
}

#[test]
fn range_splitting_a_multibyte_codepoint_is_rejected() {
    let source = "a😀b";
    let edits = vec![resolved(2, 5, "X", "stack")];

    let error = apply_edits(Path::new("spec.js"), source, edits)
        .expect_err("range inside a multibyte codepoint should be rejected");
    assert!(matches!(error, SnapError::InvalidSpan { .. }));
}
