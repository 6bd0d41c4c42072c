//! The filter and script expression language.
//!
//! Expressions appear in `[?( ... )]` filters and `[( ... )]` computed
//! subscripts. [`Builder`] compiles expression text into an
//! [`ExprNode`](crate::ast::ExprNode) tree; evaluation lives on
//! [`Evaluator`](crate::Evaluator) so that embedded `$`/`@` selectors can
//! re-enter the path walk.
//!
//! ## Grammar
//!
//! ```text
//! literals     42  -1.5  'text'  "text"  true  nil  [1, 2]  {"a": 1}  /regex/
//! selectors    @.price  @['isbn']  $.limits.max  @.length
//! arithmetic   +  -  *  /  %  **
//! comparison   ==  !=  <  <=  >  >=  =~
//! logical      &&  ||  !
//! grouping     ( ... )
//! ```
//!
//! Precedence follows the builder's priority list, not the usual
//! arithmetic rules: `2 * 3 ** 2` is `(2 * 3) ** 2` and `5 - 3 - 1` is
//! `5 - (3 - 1)`. Use parentheses to force grouping.
pub mod builder;
mod eval;

pub use builder::Builder;
