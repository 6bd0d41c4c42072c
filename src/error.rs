//! Error types for compiling and evaluating queries.
//!
//! Compile-time failures are [`CompileError`]s and abort compilation
//! entirely. Evaluation failures are [`EvalError`]s. Both map onto a small
//! closed set of [`ErrorKind`]s so callers can match on the kind of failure
//! without inspecting message text, including through wrapped causes.

use std::fmt;

use thiserror::Error;

use crate::value::ValueKind;

/// Classification shared by every compile and evaluation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidQuerySyntax,
    UnsupportedOperator,
    InvalidExpression,
    TargetTypeMismatch,
    KeyNotFound,
    IndexOutOfRange,
    InvalidArgument,
    UnexpectedExpressionResult,
}

/// Errors raised while lexing, parsing, or building expressions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("empty query")]
    EmptyQuery,

    #[error("query must start with '$' or '@', found '{0}'")]
    InvalidFirstCharacter(char),

    #[error("'@' is only valid inside a filter or script expression")]
    CurrentOutsideExpression,

    #[error("unexpected character '{found}' after '{anchor}'")]
    InvalidCharacterAfterAnchor { anchor: char, found: char },

    #[error("'{0}' inside an expression must be followed by '.' or '['")]
    BareAnchor(char),

    #[error("unexpected character '{found}' at position {position}")]
    UnexpectedCharacter { found: char, position: usize },

    #[error("unclosed '[' starting at position {0}")]
    UnclosedBracket(usize),

    #[error("invalid segment '{segment}': {reason}")]
    InvalidSegment { segment: String, reason: &'static str },

    #[error("'{0}' is an index; indices require bracket form")]
    IntegerKey(String),

    #[error("unexpected whitespace in segment '{0}'")]
    UnexpectedWhitespace(String),

    #[error("unexpected trailing input '{0}'")]
    TrailingInput(String),

    #[error("unsupported operator in '{0}'")]
    UnsupportedOperator(String),

    #[error("invalid expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: &'static str },
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::UnsupportedOperator(_) => ErrorKind::UnsupportedOperator,
            CompileError::InvalidExpression { .. } => ErrorKind::InvalidExpression,
            _ => ErrorKind::InvalidQuerySyntax,
        }
    }

    pub(crate) fn invalid_expression(expression: &str, reason: &'static str) -> Self {
        CompileError::InvalidExpression {
            expression: expression.to_string(),
            reason,
        }
    }

    pub(crate) fn invalid_segment(segment: &str, reason: &'static str) -> Self {
        CompileError::InvalidSegment {
            segment: segment.to_string(),
            reason,
        }
    }
}

/// What an operand was expected to coerce to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Number,
    Integer,
    Boolean,
    String,
    Regex,
    NonNil,
    NonZero,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Expected::Number => "number",
            Expected::Integer => "integer",
            Expected::Boolean => "boolean",
            Expected::String => "string",
            Expected::Regex => "regular expression",
            Expected::NonNil => "non-nil value",
            Expected::NonZero => "non-zero number",
        };
        f.write_str(name)
    }
}

fn kinds(expected: &[ValueKind]) -> String {
    expected
        .iter()
        .map(ValueKind::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Errors raised while evaluating a compiled query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// An operator the expression evaluator cannot apply
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("{operation} expects {}, got {actual}", kinds(.expected))]
    TypeMismatch {
        operation: &'static str,
        expected: &'static [ValueKind],
        actual: ValueKind,
    },

    #[error("key '{0}' not found")]
    KeyNotFound(String),

    #[error("keys not found: {}", .0.join(", "))]
    KeysNotFound(Vec<String>),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("invalid argument: expected {expected}, got {found}")]
    InvalidArgument { expected: Expected, found: String },

    #[error("invalid regular expression '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("expression result {found} cannot be used as {expected}")]
    UnexpectedResult { expected: &'static str, found: String },

    #[error("{context}: {source}")]
    Bound {
        context: &'static str,
        #[source]
        source: Box<EvalError>,
    },

    #[error("host value nesting exceeds depth {0}")]
    DepthExceeded(usize),
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::Compile(e) => e.kind(),
            EvalError::TypeMismatch { .. } => ErrorKind::TargetTypeMismatch,
            EvalError::KeyNotFound(_) | EvalError::KeysNotFound(_) => ErrorKind::KeyNotFound,
            EvalError::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            EvalError::InvalidArgument { .. }
            | EvalError::InvalidRegex { .. }
            | EvalError::DivisionByZero
            | EvalError::DepthExceeded(_) => ErrorKind::InvalidArgument,
            EvalError::UnexpectedResult { .. } | EvalError::Bound { .. } => {
                ErrorKind::UnexpectedExpressionResult
            }
        }
    }

    /// The innermost error of a wrapped chain.
    pub fn root_cause(&self) -> &EvalError {
        match self {
            EvalError::Bound { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// True when this error or any error it wraps has the given kind.
    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        if self.kind() == kind {
            return true;
        }
        match self {
            EvalError::Bound { source, .. } => source.has_kind(kind),
            _ => false,
        }
    }

    pub(crate) fn mismatch(
        operation: &'static str,
        expected: &'static [ValueKind],
        actual: ValueKind,
    ) -> Self {
        EvalError::TypeMismatch {
            operation,
            expected,
            actual,
        }
    }

    pub(crate) fn bound(context: &'static str, source: EvalError) -> Self {
        EvalError::Bound {
            context,
            source: Box::new(source),
        }
    }
}

#[test]
fn test_wrapped_chain_matches_inner_kind() {
    let inner = EvalError::KeyNotFound("missing".into());
    let wrapped = EvalError::bound("range start", inner.clone());

    assert_eq!(wrapped.kind(), ErrorKind::UnexpectedExpressionResult);
    assert!(wrapped.has_kind(ErrorKind::KeyNotFound));
    assert!(!wrapped.has_kind(ErrorKind::IndexOutOfRange));
    assert_eq!(wrapped.root_cause(), &inner);
}
