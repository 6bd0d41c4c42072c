// tests/expression_tests.rs

use jsonpath_dialect::ast::{ExprNode, Literal, Operator, Priority};
use jsonpath_dialect::{Builder, ErrorKind, EvalError, Evaluator, Expected, Options, Value};
use serde_json::json;

fn build(expr: &str) -> ExprNode {
    Builder::new(&Options::default())
        .build(expr)
        .unwrap()
        .expect("expression should not be empty")
}

fn eval_in(expr: &str, root: serde_json::Value, current: serde_json::Value) -> Result<Value, EvalError> {
    let options = Options::default();
    let node = Builder::new(&options)
        .build(expr)?
        .expect("expression should not be empty");
    Evaluator::new(&options).eval_expr(&node, &Value::from(root), &Value::from(current))
}

fn eval_at(expr: &str, current: serde_json::Value) -> Result<Value, EvalError> {
    eval_in(expr, json!(null), current)
}

fn eval(expr: &str) -> Value {
    eval_at(expr, json!(null)).unwrap()
}

// ============================================================================
// Building
// ============================================================================

#[test]
fn test_empty_expression_builds_nothing() {
    let options = Options::default();
    assert_eq!(Builder::new(&options).build("   ").unwrap(), None);
}

#[test]
fn test_selectors() {
    let ExprNode::Selector { query, .. } = build("@.price") else {
        panic!("expected a selector");
    };
    assert_eq!(query.to_string(), "@['price']");

    let ExprNode::Selector { query, .. } = build("$.limits['max']") else {
        panic!("expected a selector");
    };
    assert_eq!(query.to_string(), "$['limits']['max']");
}

#[test]
fn test_comparison_splits_around_selector() {
    let ExprNode::Binary { op, left, right } = build("@.price < 10") else {
        panic!("expected a comparison");
    };
    assert_eq!(op, Operator::Lt);
    assert!(matches!(*left, ExprNode::Selector { .. }));
    assert_eq!(*right, ExprNode::Literal(Literal::Integer(10)));
}

#[test]
fn test_compound_operators_are_not_split() {
    assert!(matches!(build("@.a != 1"), ExprNode::Binary { op: Operator::Ne, .. }));
    assert!(matches!(build("@.a <= 1"), ExprNode::Binary { op: Operator::Le, .. }));
    assert!(matches!(build("@.a >= 1"), ExprNode::Binary { op: Operator::Ge, .. }));
    assert!(matches!(build("2 ** 3"), ExprNode::Binary { op: Operator::Pow, .. }));
}

#[test]
fn test_literals() {
    assert_eq!(build("nil"), ExprNode::Literal(Literal::Null));
    assert_eq!(build("null"), ExprNode::Literal(Literal::Null));
    assert_eq!(build("true"), ExprNode::Literal(Literal::Boolean(true)));
    assert_eq!(build("-3"), ExprNode::Literal(Literal::Integer(-3)));
    assert_eq!(build("2.5"), ExprNode::Literal(Literal::Float(2.5)));
    assert_eq!(build("1e3"), ExprNode::Literal(Literal::Float(1000.0)));
    assert_eq!(build("'a b'"), ExprNode::Literal(Literal::String("a b".into())));
    assert_eq!(build(r#""quoted""#), ExprNode::Literal(Literal::String("quoted".into())));
}

#[test]
fn test_json_literals_decoded_eagerly() {
    assert_eq!(
        build(r#"{"a": [1, 2]}"#),
        ExprNode::Literal(Literal::Json(Value::from(json!({"a": [1, 2]}))))
    );
}

#[test]
fn test_operators_inside_quotes_ignored() {
    assert_eq!(build("'a && b'"), ExprNode::Literal(Literal::String("a && b".into())));
    let ExprNode::Binary { op: Operator::Eq, right, .. } = build("@.op == '<='") else {
        panic!("expected equality");
    };
    assert_eq!(*right, ExprNode::Literal(Literal::String("<=".into())));
}

#[test]
fn test_build_errors() {
    let options = Options::default();
    let builder = Builder::new(&options);
    assert_eq!(builder.build("@.a ^ 2").unwrap_err().kind(), ErrorKind::UnsupportedOperator);
    assert_eq!(builder.build("@.a b").unwrap_err().kind(), ErrorKind::InvalidExpression);
    assert_eq!(builder.build("'open").unwrap_err().kind(), ErrorKind::InvalidExpression);
    assert_eq!(builder.build("[1,").unwrap_err().kind(), ErrorKind::InvalidExpression);
}

#[test]
fn test_custom_priorities() {
    // with '*' searched before '+', 1 + 2 * 3 splits at '*'
    let options = Options::default().with_priorities(vec![
        Priority::Operator(Operator::Mul),
        Priority::Operator(Operator::Add),
    ]);
    let node = Builder::new(&options).build("1 + 2 * 3").unwrap().unwrap();
    assert!(matches!(node, ExprNode::Binary { op: Operator::Mul, .. }));
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
fn test_priority_list_precedence() {
    assert_eq!(eval("1 + 2 * 3"), Value::Integer(7));
    // '**' is searched before '*'
    assert_eq!(eval("2 * 3 ** 2"), Value::Integer(36));
    // the first occurrence splits, so subtraction groups to the right
    assert_eq!(eval("5 - 3 - 1"), Value::Integer(3));
}

#[test]
fn test_parentheses_reset_precedence() {
    assert_eq!(eval("(5 - 3) - 1"), Value::Integer(1));
    assert_eq!(eval("2 * (3 ** 2)"), Value::Integer(18));
    assert_eq!(eval("((1 + 2))"), Value::Integer(3));
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_integer_arithmetic() {
    assert_eq!(eval("7 + 3"), Value::Integer(10));
    assert_eq!(eval("10 / 5"), Value::Integer(2));
    assert_eq!(eval("7 % 3"), Value::Integer(1));
    assert_eq!(eval("2 ** 10"), Value::Integer(1024));
}

#[test]
fn test_negative_operands() {
    assert_eq!(eval("2 * -3"), Value::Integer(-6));
    assert_eq!(eval("3 - 2 * -1"), Value::Integer(5));
    assert_eq!(eval_at("@.n * -2", json!({"n": 4})).unwrap(), Value::Integer(-8));
}

#[test]
fn test_float_arithmetic() {
    assert_eq!(eval("10 / 4"), Value::Float(2.5));
    assert_eq!(eval("0.1 + 0.2"), Value::Float(0.3));
    assert_eq!(eval("1.5 * 2"), Value::Integer(3));
    assert_eq!(eval("2 ** 0.5"), Value::Float(2f64.powf(0.5)));
}

#[test]
fn test_numeric_strings_coerce() {
    assert_eq!(eval("'4' * 2"), Value::Integer(8));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(eval("'ab' + 'cd'"), Value::String("abcd".into()));
}

#[test]
fn test_arithmetic_errors() {
    let err = eval_at("7 / 0", json!(null)).unwrap_err();
    assert_eq!(err, EvalError::DivisionByZero);
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = eval_at("7 % 2.5", json!(null)).unwrap_err();
    assert!(matches!(err, EvalError::InvalidArgument { expected: Expected::Integer, .. }));

    let err = eval_at("'abc' * 2", json!(null)).unwrap_err();
    assert!(matches!(err, EvalError::InvalidArgument { expected: Expected::Number, .. }));

    let err = eval_at("nil + 1", json!(null)).unwrap_err();
    assert!(matches!(err, EvalError::InvalidArgument { expected: Expected::NonNil, .. }));
}

// ============================================================================
// Comparison and logic
// ============================================================================

#[test]
fn test_numeric_equality_normalises() {
    assert_eq!(eval("1 == 1.0"), Value::Boolean(true));
    assert_eq!(eval("[1, 2] == [1, 2.0]"), Value::Boolean(true));
    assert_eq!(eval("'1' == 1"), Value::Boolean(false));
    assert_eq!(eval("nil == null"), Value::Boolean(true));
}

#[test]
fn test_ordering() {
    assert_eq!(eval("1 < 2"), Value::Boolean(true));
    assert_eq!(eval("2.5 >= 2.5"), Value::Boolean(true));
    assert_eq!(eval("'abc' < 'abd'"), Value::Boolean(true));
    assert_eq!(eval("'10' > 9"), Value::Boolean(true));
}

#[test]
fn test_logical_operators_use_truthiness() {
    assert_eq!(eval("1 && 'x'"), Value::Boolean(true));
    assert_eq!(eval("'' || nil"), Value::Boolean(false));
    assert_eq!(eval("!nil"), Value::Boolean(true));
    assert_eq!(eval("!0"), Value::Boolean(false));
}

#[test]
fn test_logical_operators_short_circuit() {
    // the missing key on the right is never looked up
    assert_eq!(eval_at("@.a && @.missing", json!({"a": false})).unwrap(), Value::Boolean(false));
    assert_eq!(eval_at("@.a || @.missing", json!({"a": 1})).unwrap(), Value::Boolean(true));
    assert!(eval_at("@.a && @.missing", json!({"a": true})).is_err());
}

#[test]
fn test_or_binds_loosest() {
    assert_eq!(
        eval_at("@.a == 1 || @.b == 2 && @.c == 3", json!({"a": 1, "b": 0, "c": 0})).unwrap(),
        Value::Boolean(true)
    );
}

// ============================================================================
// Regex
// ============================================================================

#[test]
fn test_regex_match() {
    let book = json!({"author": "Nigel Rees"});
    assert_eq!(eval_at("@.author =~ /^Nig/", book.clone()).unwrap(), Value::Boolean(true));
    assert_eq!(eval_at("@.author =~ /rees$/", book.clone()).unwrap(), Value::Boolean(false));
    assert_eq!(eval_at("@.author =~ '(?i)rees$'", book).unwrap(), Value::Boolean(true));
}

#[test]
fn test_regex_pattern_may_contain_operators() {
    let book = json!({"isbn": "0-553-21311-3"});
    assert_eq!(
        eval_at("@.isbn =~ /^\\d-\\d+-\\d+-\\d$/", book).unwrap(),
        Value::Boolean(true)
    );
}

#[test]
fn test_malformed_regex() {
    let err = eval_at("@.a =~ /(/", json!({"a": "x"})).unwrap_err();
    assert!(matches!(err, EvalError::InvalidRegex { .. }));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

// ============================================================================
// Selectors
// ============================================================================

#[test]
fn test_current_and_root_selectors() {
    let root = json!({"limit": 10});
    let item = json!({"price": 8});
    assert_eq!(eval_in("@.price < $.limit", root, item).unwrap(), Value::Boolean(true));
}

#[test]
fn test_selector_arithmetic() {
    let item = json!({"price": 1.1, "qty": 100});
    assert_eq!(eval_at("@.price * @.qty", item).unwrap(), Value::Integer(110));
}

#[test]
fn test_selector_errors_propagate() {
    let err = eval_at("@.missing > 1", json!({})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyNotFound);
}

#[test]
fn test_current_selector_needs_a_segment() {
    assert_eq!(eval_at("@.length", json!([1, 2, 3])).unwrap(), Value::Integer(3));
    assert_eq!(eval_at("@[0] > 1", json!([3])).unwrap(), Value::Boolean(true));

    let options = Options::default();
    let builder = Builder::new(&options);
    assert_eq!(builder.build("@ > 1").unwrap_err().kind(), ErrorKind::InvalidQuerySyntax);
    assert_eq!(builder.build("@==42").unwrap_err().kind(), ErrorKind::InvalidQuerySyntax);
}
