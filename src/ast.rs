//! # Compiled query representation
//!
//! A path such as `$.store.book[?(@.price < 10)].title` compiles into a
//! [`Query`]: an immutable, ordered list of [`Token`]s, one per path segment.
//! Filter and script subscripts carry expressions of the embedded expression
//! language, represented as [`ExprNode`] trees.
//!
//! ## Submodules
//!
//! - **[tokens]** - path segments (`Token`, range `Bound`s, `UnionItem`s)
//! - **[query]** - the compiled `Query` and its canonical rendering
//! - **[expressions]** - expression nodes and typed literals
//! - **[operators]** - expression operators, selector anchors, priorities
//!
//! ## Canonical form
//!
//! Every node renders back to path text. Keys always render in quoted
//! bracket form, so `$.store.book[*].author` renders as
//! `$['store']['book'][*]['author']` and `$..x` as `$..['x']`.
pub mod expressions;
pub mod operators;
pub mod query;
pub mod tokens;

pub use expressions::{ExprNode, Literal};
pub use operators::{Anchor, DEFAULT_PRIORITIES, Operator, Priority};
pub use query::Query;
pub use tokens::{Bound, Token, UnionItem};
