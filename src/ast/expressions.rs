use std::fmt;

use crate::{
    ast::{Anchor, Operator, Query, tokens::quote_key},
    value::Value,
};

/// Node of a compiled filter or script expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    /// Literal value
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 'text'
    /// [1, 2, 3]
    /// ```
    Literal(Literal),

    /// Embedded path evaluated against the root or the current value
    ///
    /// # Examples
    /// ```text
    /// @.price
    /// $.expensive
    /// ```
    Selector { query: Query, anchor: Anchor },

    /// Unary operation (`!`)
    Unary { op: Operator, arg: Box<ExprNode> },

    /// Binary operation (arithmetic, comparison, logical, regex)
    Binary {
        op: Operator,
        left: Box<ExprNode>,
        right: Box<ExprNode>,
    },
}

/// Typed literal stored directly in the expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Array or object literal, decoded when the expression is built
    Json(Value),
}

impl Literal {
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Integer(n) => Value::Integer(*n),
            Literal::Float(n) => Value::Float(*n),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Json(v) => v.clone(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Float(n) => write!(f, "{:?}", n),
            Literal::String(s) => f.write_str(&quote_key(s)),
            Literal::Json(v) => write!(f, "{}", v),
        }
    }
}

impl ExprNode {
    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprNode::Unary { .. } | ExprNode::Binary { .. } => write!(f, "({})", self),
            // a bare leading '-' would be taken for subtraction
            ExprNode::Literal(Literal::Integer(n)) if *n < 0 => write!(f, "({})", self),
            ExprNode::Literal(Literal::Float(n)) if n.is_sign_negative() => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

impl fmt::Display for ExprNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprNode::Literal(lit) => write!(f, "{}", lit),
            ExprNode::Selector { query, .. } => write!(f, "{}", query),
            ExprNode::Unary { op, arg } => {
                write!(f, "{}", op)?;
                arg.fmt_operand(f)
            }
            ExprNode::Binary { op, left, right } => {
                left.fmt_operand(f)?;
                write!(f, " {} ", op)?;
                right.fmt_operand(f)
            }
        }
    }
}
