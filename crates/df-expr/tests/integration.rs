//! Integration tests for df-expr.

use std::collections::HashMap;

use df_expr::parser::MAX_NESTING;
use df_expr::{Analyzer, ParseError, free_variables, substitute};

fn mapping(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn node_expressions_drive_inlet_names() {
    assert_eq!(free_variables("a + b").unwrap(), vec!["a", "b"]);
    assert_eq!(free_variables("x*x").unwrap(), vec!["x"]);
    assert_eq!(free_variables("x*y").unwrap(), vec!["x", "y"]);
    assert_eq!(free_variables("sqrt(dx**2 + dy**2)").unwrap(), vec!["sqrt", "dx", "dy"]);
}

#[test]
fn mixed_scopes() {
    let source = "max(v for v in values if v > floor) + (lambda k=scale: k * offset)()";
    assert_eq!(
        free_variables(source).unwrap(),
        vec!["max", "values", "floor", "scale", "offset"]
    );
}

#[test]
fn multi_line_expressions_parse() {
    let source = "(a +\n b) * c  # weighted";
    assert_eq!(free_variables(source).unwrap(), vec!["a", "b", "c"]);
    assert_eq!(substitute(source, &mapping(&[])).unwrap(), "(a + b) * c");
}

#[test]
fn substitution_into_node_names() {
    let analyzer = Analyzer::parse("x * x + [x for x in range(n)][0]").unwrap();
    assert_eq!(analyzer.free_variables(), ["x", "range", "n"]);
    assert_eq!(
        analyzer.substitute(&mapping(&[("x", "A"), ("n", "N")])),
        "A * A + [x for x in range(N)][0]"
    );
}

#[test]
fn parse_errors_carry_offsets() {
    let err: ParseError = free_variables("a + * b").unwrap_err();
    assert_eq!(err.offset, 4);
    assert!(err.to_string().contains("offset 4"));
}

fn wrapped(open: &str, close: &str, depth: usize) -> String {
    format!("{}x{}", open.repeat(depth), close.repeat(depth))
}

fn too_deep(source: &str) -> bool {
    matches!(free_variables(source), Err(err) if err.message.contains("nested too deeply"))
}

#[test]
fn nesting_up_to_the_limit_is_analyzed() {
    let parens = wrapped("(", ")", MAX_NESTING);
    assert_eq!(free_variables(&parens).unwrap(), vec!["x"]);
    assert_eq!(substitute(&parens, &mapping(&[("x", "A")])).unwrap(), "A");

    let lists = wrapped("[", "]", MAX_NESTING);
    assert_eq!(free_variables(&lists).unwrap(), vec!["x"]);

    let calls = wrapped("f(", ")", MAX_NESTING);
    assert_eq!(free_variables(&calls).unwrap(), vec!["f", "x"]);

    let unary = format!("{}x", "-".repeat(MAX_NESTING));
    assert!(Analyzer::parse(&unary).is_ok());

    let sum = vec!["x"; MAX_NESTING + 1].join(" + ");
    assert_eq!(free_variables(&sum).unwrap(), vec!["x"]);
}

#[test]
fn nesting_past_the_limit_is_a_parse_error() {
    assert!(too_deep(&wrapped("(", ")", MAX_NESTING + 1)));
    assert!(too_deep(&wrapped("[", "]", MAX_NESTING + 1)));
    assert!(too_deep(&wrapped("{", "}", MAX_NESTING + 1)));
    assert!(too_deep(&wrapped("f(", ")", MAX_NESTING + 1)));
    assert!(too_deep(&wrapped("a[", "]", MAX_NESTING + 1)));
    assert!(too_deep(&format!("{}x", "-".repeat(MAX_NESTING + 1))));
    assert!(too_deep(&format!("{}x", "not ".repeat(MAX_NESTING + 1))));
    assert!(too_deep(&vec!["x"; MAX_NESTING + 2].join(" + ")));
    assert!(too_deep(&vec!["x"; MAX_NESTING + 2].join(" ** ")));
    assert!(too_deep(&format!("x{}", ".y".repeat(MAX_NESTING + 1))));
    assert!(too_deep(&format!("{}x", "lambda: ".repeat(MAX_NESTING + 1))));
    assert!(too_deep(&format!(
        "[0 for {}v{} in vs]",
        "(".repeat(MAX_NESTING + 1),
        ")".repeat(MAX_NESTING + 1)
    )));
}

#[test]
fn absurd_nesting_fails_without_exhausting_the_stack() {
    assert!(too_deep(&wrapped("(", ")", 100_000)));
    assert!(too_deep(&"-".repeat(100_000)));
    assert!(too_deep(&format!("{}x", "[".repeat(100_000))));
}
