//! A JSONPath dialect with script expressions.
//!
//! Queries compile once into a [`Query`] and evaluate any number of times
//! against a [`Value`] tree, or against native data through [`HostValue`].
//!
//! ```
//! use jsonpath_dialect::{compile, decode_str, evaluate, Value};
//!
//! let doc = decode_str(r#"{"store": {"book": [{"price": 8.95}, {"price": 22.99}]}}"#).unwrap();
//! let query = compile("$.store.book[?(@.price < 10)].price").unwrap();
//!
//! assert_eq!(evaluate(&query, &doc).unwrap(), Value::Array(vec![Value::Float(8.95)]));
//! ```

pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod convert;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod host;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod value;

pub use ast::{ExprNode, Query, Token};
pub use convert::{decode, decode_str};
pub use error::{CompileError, ErrorKind, EvalError, Expected};
pub use evaluator::Evaluator;
pub use expression::Builder;
pub use host::{HostKind, HostValue};
pub use lexer::Lexer;
pub use options::Options;
pub use parser::Parser;
pub use value::{Value, ValueKind};

/// Compiles a query with default options.
pub fn compile(path: &str) -> Result<Query, CompileError> {
    compile_with(path, &Options::default())
}

pub fn compile_with(path: &str, options: &Options) -> Result<Query, CompileError> {
    let query = Parser::new(options).parse_query(path)?;
    tracing::debug!(path, tokens = query.len(), "compiled query");
    Ok(query)
}

/// Evaluates a compiled query with default options.
pub fn evaluate(query: &Query, document: &Value) -> Result<Value, EvalError> {
    evaluate_with(query, document, &Options::default())
}

pub fn evaluate_with(query: &Query, document: &Value, options: &Options) -> Result<Value, EvalError> {
    Evaluator::new(options).evaluate(query, document)
}

/// Evaluates a compiled query against native data.
pub fn evaluate_host(query: &Query, host: &dyn HostValue, options: &Options) -> Result<Value, EvalError> {
    let document = Value::from_host(host, options.max_host_depth)?;
    evaluate_with(query, &document, options)
}
