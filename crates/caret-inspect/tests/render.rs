//! Type checker problems rendered for the terminal.

use caret_diagnostics::render::{render_to_string, SourceCache};
use caret_inspect::{inspect_source, Inspection, TypeCheckerInspection};
use pretty_assertions::assert_eq;

const SOURCE: &str = "class A {\n    void take(int n) {}\n    void run() { take(\"five\"); }\n}\n";

#[test]
fn test_rendered_argument_mismatch() {
    let problems = inspect_source(&TypeCheckerInspection, "Take.java", SOURCE);
    assert_eq!(problems.len(), 1);

    let mut sources = SourceCache::new();
    sources.add_source("Take.java", SOURCE);
    let output = render_to_string(&problems[0], &sources).unwrap();
    let underline = format!("   | {}~~~~~~", " ".repeat(22));
    let parameter = format!("   | {}- parameter declared here", " ".repeat(18));
    let expected = [
        "warning[W0001]: Expected type 'int', got 'String' instead",
        " --> Take.java:3:23",
        "   |",
        " 3 |     void run() { take(\"five\"); }",
        underline.as_str(),
        " 2 |     void take(int n) {}",
        parameter.as_str(),
        "",
        "",
    ]
    .join("\n");
    assert_eq!(output, expected);
}

#[test]
fn test_display_name() {
    assert_eq!(TypeCheckerInspection.display_name(), "Type checker");
    insta::assert_snapshot!(TypeCheckerInspection.code(), @"W0001");
}

#[test]
fn test_clean_file_has_no_problems() {
    let source = "class A { int twice(int n) { return n + n; } void run() { twice(2); } }";
    assert!(inspect_source(&TypeCheckerInspection, "Clean.java", source).is_empty());
}
