use std::fmt;

use crate::ast::Token;

/// A compiled path: an immutable sequence of tokens starting with
/// [`Token::Root`] or [`Token::Current`].
///
/// Displaying a query renders its canonical form, which compiles back to a
/// query that evaluates identically.
///
/// ```
/// let query = jsonpath_dialect::compile("$.store.book[*].author").unwrap();
/// assert_eq!(query.to_string(), "$['store']['book'][*]['author']");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    tokens: Vec<Token>,
}

impl Query {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Query { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tokens.iter().try_for_each(|token| write!(f, "{}", token))
    }
}
