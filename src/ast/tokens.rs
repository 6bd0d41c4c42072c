use std::fmt;

use crate::ast::ExprNode;

/// One compiled path segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Root document reference
    ///
    /// # Examples
    /// ```text
    /// $
    /// $.store
    /// ```
    Root,

    /// Current value reference, only inside filter and script expressions
    ///
    /// # Examples
    /// ```text
    /// @.price
    /// @['isbn']
    /// ```
    Current,

    /// All elements of an array or all values of an object
    ///
    /// # Examples
    /// ```text
    /// $.store.*
    /// $.book[*]
    /// ```
    Wildcard,

    /// Recursive descent over the current value and all its descendants
    ///
    /// # Examples
    /// ```text
    /// $..author
    /// $..*
    /// ```
    Recursive,

    /// Object field access
    ///
    /// # Examples
    /// ```text
    /// $.store
    /// $['store']
    /// ```
    Key(String),

    /// Array or string index access (negative counts from the end)
    ///
    /// # Examples
    /// ```text
    /// $.book[0]
    /// $.book[-1]
    /// ```
    Index(i64),

    /// Element count, unless an object carries its own `length` field
    ///
    /// # Example
    /// ```text
    /// $.book.length
    /// ```
    Length,

    /// Slice with optional start, end, and step
    ///
    /// # Examples
    /// ```text
    /// $.book[1:3]
    /// $.book[-1:]
    /// $.book[::-1]
    /// $.book[(@.length-2):]
    /// ```
    Range {
        from: Option<Bound>,
        to: Option<Bound>,
        step: Option<Bound>,
    },

    /// Several indices or keys at once, in order, duplicates kept
    ///
    /// # Examples
    /// ```text
    /// $.book[0,2]
    /// $['title','price']
    /// ```
    Union(Vec<UnionItem>),

    /// Keeps the elements for which the expression is truthy
    ///
    /// The expression text is built when the filter is evaluated.
    ///
    /// # Example
    /// ```text
    /// $.book[?(@.price < 10)]
    /// ```
    Filter(String),

    /// Computed subscript: a string result is a key, an integer an index
    ///
    /// # Example
    /// ```text
    /// $.book[(@.length-1)]
    /// ```
    Script(ExprNode),
}

/// A range slot: a literal integer or an expression evaluating to one.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Literal(i64),
    Expression(ExprNode),
}

/// One member of a union segment.
#[derive(Debug, Clone, PartialEq)]
pub enum UnionItem {
    Index(i64),
    Key(String),
    Expression(ExprNode),
}

pub(crate) fn quote_key(key: &str) -> String {
    let mut quoted = String::with_capacity(key.len() + 2);
    quoted.push('\'');
    for ch in key.chars() {
        if ch == '\'' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('\'');
    quoted
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Literal(n) => write!(f, "{}", n),
            Bound::Expression(expr) => write!(f, "({})", expr),
        }
    }
}

impl fmt::Display for UnionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnionItem::Index(n) => write!(f, "{}", n),
            UnionItem::Key(key) => f.write_str(&quote_key(key)),
            UnionItem::Expression(expr) => write!(f, "({})", expr),
        }
    }
}

/// Canonical rendering of a single segment, e.g. `['store']` or `[1:3]`.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Root => f.write_str("$"),
            Token::Current => f.write_str("@"),
            Token::Wildcard => f.write_str("[*]"),
            Token::Recursive => f.write_str(".."),
            Token::Key(key) => write!(f, "[{}]", quote_key(key)),
            Token::Index(n) => write!(f, "[{}]", n),
            Token::Length => f.write_str(".length"),
            Token::Range { from, to, step } => {
                let slot = |b: &Option<Bound>| b.as_ref().map(Bound::to_string).unwrap_or_default();
                write!(f, "[{}:{}", slot(from), slot(to))?;
                if step.is_some() {
                    write!(f, ":{}", slot(step))?;
                }
                f.write_str("]")
            }
            Token::Union(items) => {
                let items: Vec<String> = items.iter().map(UnionItem::to_string).collect();
                write!(f, "[{}]", items.join(","))
            }
            Token::Filter(expr) => write!(f, "[?({})]", expr),
            Token::Script(expr) => write!(f, "[({})]", expr),
        }
    }
}
