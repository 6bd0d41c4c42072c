//! Run a path against JSON input

use super::CliError;
use crate::{Evaluator, Options, Parser, decode_str};

/// Options for a single query run
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// The path to evaluate
    pub path: String,
    /// JSON input string
    pub input: Option<String>,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
    /// Compile and evaluation settings
    pub options: Options,
}

/// Result of a query run
#[derive(Debug)]
pub enum QueryResult {
    /// Syntax validation passed; carries the canonical form of the path
    SyntaxValid(String),
    /// Query executed successfully with JSON output
    Success(serde_json::Value),
}

/// Compile the path and, unless only checking syntax, evaluate it
pub fn execute(request: &QueryOptions) -> Result<QueryResult, CliError> {
    let query = Parser::new(&request.options).parse_query(&request.path)?;

    if request.syntax_only {
        return Ok(QueryResult::SyntaxValid(query.to_string()));
    }

    let json = request.input.as_deref().ok_or(CliError::NoInput)?;
    let document = decode_str(json)?;

    let result = Evaluator::new(&request.options).evaluate(&query, &document)?;
    Ok(QueryResult::Success(result.into()))
}

#[test]
fn test_execute_runs_query() {
    let request = QueryOptions {
        path: "$.a[1]".into(),
        input: Some(r#"{"a": [1, 2, 3]}"#.into()),
        ..Default::default()
    };
    match execute(&request).unwrap() {
        QueryResult::Success(value) => assert_eq!(value, serde_json::json!(2)),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_syntax_only_needs_no_input() {
    let request = QueryOptions {
        path: "$.a.b".into(),
        syntax_only: true,
        ..Default::default()
    };
    assert!(matches!(
        execute(&request).unwrap(),
        QueryResult::SyntaxValid(canonical) if canonical == "$['a']['b']"
    ));
    assert!(matches!(
        execute(&QueryOptions { path: "$.a".into(), ..Default::default() }),
        Err(CliError::NoInput)
    ));
}
