//! End-to-end completion scenarios over small Java-style sources.
//!
//! `<caret>` marks the caret position and is removed before completion.

use caret_completion::{
    CandidateIcon, CompletionConfig, CompletionContributor, CompletionResult, ParseFailure,
    ProbeExpression, ProbeParser, SemanticEngine, SharedDocument, StandardParser, TailPolicy,
    TextChange,
};
use caret_syntax::NodeId;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

const CARET: &str = "<caret>";

fn split_caret(text: &str) -> (String, usize) {
    let offset = text.find(CARET).expect("source has no caret marker");
    (text.replacen(CARET, "", 1), offset)
}

fn complete_with<P: ProbeParser>(
    contributor: &CompletionContributor<P, SemanticEngine>,
    text: &str,
    invocation_count: u32,
) -> CompletionResult {
    let (source, offset) = split_caret(text);
    let document = SharedDocument::new(&source);
    contributor
        .complete(&document, offset, invocation_count)
        .expect("caret offset is valid")
}

fn complete(text: &str, invocation_count: u32) -> CompletionResult {
    complete_with(&CompletionContributor::default(), text, invocation_count)
}

fn lookup_set(result: &CompletionResult) -> BTreeSet<String> {
    result.lookup_strings().into_iter().map(String::from).collect()
}

// ============================================================================
// Scenario A: throw operand
// ============================================================================

const THROW: &str = r#"class Worker {
    int compute() { return 1; }

    void fail(Exception err) {
        throw <caret>
    }
}"#;

#[test]
fn test_throw_operand_offers_everything_with_semicolon() {
    let result = complete(THROW, 1);
    assert!(result.contains("err"), "got {:?}", result.lookup_strings());
    assert!(result.contains("compute"));
    assert!(result.contains("Worker"));
    assert!(result.candidates().iter().all(|c| c.tail == TailPolicy::Semicolon));

    let err = result.find("err").unwrap();
    assert_eq!(err.insertion_text(), "err;");
    assert_eq!(err.icon, Some(CandidateIcon::Variable));
    assert_eq!(result.find("compute").unwrap().icon, Some(CandidateIcon::Method));
}

// ============================================================================
// Scenario B: directly after a cast
// ============================================================================

const CAST: &str = r#"class Shape {
    int width;

    int area() {
        return (int) <caret>;
    }
}"#;

#[test]
fn test_after_cast_is_empty() {
    assert!(complete(CAST, 1).is_empty());
    assert!(complete(CAST, 2).is_empty());
}

// ============================================================================
// Scenario C: qualifier expansion
// ============================================================================

const CALL_ARGUMENT: &str = r#"class Store {
    List list;

    void foo(Object item) {}

    void run() {
        foo(<caret>);
    }
}"#;

#[test]
fn test_first_invocation_offers_plain_names() {
    let result = complete(CALL_ARGUMENT, 1);
    assert!(result.contains("list"));
    assert!(result.contains("foo"));
    assert!(!result.candidates().iter().any(|c| c.is_synthesized()));
    // `item` belongs to another method
    assert!(!result.contains("item"));
}

#[test]
fn test_second_invocation_adds_member_accesses() {
    let result = complete(CALL_ARGUMENT, 2);
    assert!(result.contains("list"));
    for expected in ["list.size()", "list.isEmpty()", "list.hashCode()", "list.toString()"] {
        assert!(result.contains(expected), "missing {} in {:?}", expected, result.lookup_strings());
    }
    for absent in ["list.get()", "list.add()", "list.clear()", "list.equals()"] {
        assert!(!result.contains(absent));
    }

    let size = result.find("list.size()").unwrap();
    assert_eq!(size.tail, TailPolicy::None);
    assert_eq!(size.icon, Some(CandidateIcon::Method));

    // every first-pass candidate precedes every synthesized one
    let candidates = result.candidates();
    let first_synthesized = candidates.iter().position(|c| c.is_synthesized()).unwrap();
    assert!(candidates[first_synthesized..].iter().all(|c| c.is_synthesized()));
}

#[test]
fn test_first_invocation_equals_first_pass_of_second() {
    let plain = lookup_set(&complete(CALL_ARGUMENT, 1));
    let expanded = complete(CALL_ARGUMENT, 2);
    let first_pass: BTreeSet<String> = expanded
        .candidates()
        .iter()
        .filter(|c| !c.is_synthesized())
        .map(|c| c.lookup_string().to_string())
        .collect();
    assert_eq!(plain, first_pass);
}

#[test]
fn test_configured_threshold() {
    let contributor = CompletionContributor::new(CompletionConfig::default().with_expansion_threshold(3));
    assert!(!complete_with(&contributor, CALL_ARGUMENT, 2).contains("list.size()"));
    assert!(complete_with(&contributor, CALL_ARGUMENT, 3).contains("list.size()"));
}

#[test]
fn test_completion_is_idempotent() {
    assert_eq!(
        lookup_set(&complete(CALL_ARGUMENT, 2)),
        lookup_set(&complete(CALL_ARGUMENT, 2))
    );
}

// ============================================================================
// Scenario D: a probe that does not parse
// ============================================================================

const TWO_QUALIFIERS: &str = r#"class Store {
    List list;
    String name;

    void foo(Object item) {}

    void run() {
        foo(<caret>);
    }
}"#;

struct RejectingParser(&'static str);

impl ProbeParser for RejectingParser {
    fn parse_expression(&self, text: &str, anchor: NodeId) -> Result<ProbeExpression, ParseFailure> {
        if text == self.0 {
            return Err(ParseFailure::Invalid {
                text: text.to_string(),
                reason: "rejected".to_string(),
            });
        }
        StandardParser.parse_expression(text, anchor)
    }
}

#[test]
fn test_failed_probe_is_skipped_silently() {
    let contributor = CompletionContributor::with_collaborators(
        CompletionConfig::default(),
        RejectingParser("list.xxx"),
        SemanticEngine,
    );
    let result = complete_with(&contributor, TWO_QUALIFIERS, 2);
    assert!(result.contains("list"));
    assert!(!result.lookup_strings().iter().any(|s| s.starts_with("list.")));
    assert!(result.contains("name.length()"));
}

// ============================================================================
// Filtering by context
// ============================================================================

#[test]
fn test_variable_initializer_excludes_the_variable() {
    let result = complete(
        r#"class Account {
    int balance;

    void deposit(int amount) {
        int total = <caret>;
    }
}"#,
        1,
    );
    assert!(!result.contains("total"));
    assert!(result.contains("balance"));
    assert!(result.contains("amount"));
}

#[test]
fn test_field_initializer_excludes_the_field() {
    let result = complete("class Account { int limit; int balance = <caret>; }", 1);
    assert!(!result.contains("balance"));
    assert!(result.contains("limit"));
}

#[test]
fn test_assignment_excludes_its_target() {
    let result = complete(
        r#"class Account {
    int balance;

    void deposit(int amount) {
        balance = <caret>;
    }
}"#,
        1,
    );
    assert!(!result.contains("balance"));
    assert!(result.contains("amount"));
}

#[test]
fn test_assignment_keeps_target_inside_larger_expressions() {
    let source = "class A { int balance; int amount; int twice(int n) { return n; } void m() { balance = balance + <caret>; } }";
    let result = complete(source, 1);
    assert!(result.contains("balance"), "got {:?}", result.lookup_strings());
    assert!(result.contains("amount"));

    let source = "class A { int balance; int twice(int n) { return n; } void m() { balance = twice(<caret>); } }";
    assert!(complete(source, 1).contains("balance"));

    let source = "class A { int balance; int amount; void m() { balance = <caret>; } }";
    let result = complete(source, 1);
    assert!(!result.contains("balance"));
    assert!(result.contains("amount"));
}

#[test]
fn test_return_excludes_the_current_method() {
    let result = complete(
        r#"class Account {
    int balance;

    int current() { return <caret>; }

    int other() { return 0; }
}"#,
        1,
    );
    assert!(!result.contains("current"));
    assert!(result.contains("other"));
    assert!(result.contains("balance"));
    assert!(result.candidates().iter().all(|c| c.tail == TailPolicy::Unknown));
}

#[test]
fn test_annotation_argument_offers_constants_only() {
    let result = complete(
        r#"class Limits {
    static final int MAX = 3;
    static int counter;
    int plain;

    @Limit(<caret>) int value;
}"#,
        1,
    );
    assert_eq!(result.lookup_strings(), vec!["MAX"]);
}

#[test]
fn test_typed_prefix_filters_first_pass() {
    let result = complete("class A { int count; int total; void m() { co<caret> } }", 1);
    assert_eq!(result.lookup_strings(), vec!["count"]);
}

#[test]
fn test_caret_outside_a_reference_yields_nothing() {
    assert!(complete("class A { String s = \"ab<caret>\"; }", 2).is_empty());
}

#[test]
fn test_max_candidates() {
    let contributor = CompletionContributor::new(CompletionConfig::default().with_max_candidates(2));
    let result = complete_with(&contributor, THROW, 1);
    assert_eq!(result.len(), 2);
    assert!(result.is_incomplete);
}

#[test]
fn test_completion_follows_edits() {
    let (source, offset) = split_caret(CALL_ARGUMENT);
    let document = SharedDocument::new(&source);
    let contributor = CompletionContributor::default();
    assert!(contributor.complete(&document, offset, 1).unwrap().contains("list"));

    // the field is declared before the caret, which moves by one byte
    let edited = source.replacen("List list;", "List items;", 1);
    document.edit(&[TextChange::full(edited)], 1).unwrap();
    let result = contributor.complete(&document, offset + 1, 1).unwrap();
    assert!(result.contains("items"));
    assert!(!result.contains("list"));
}
