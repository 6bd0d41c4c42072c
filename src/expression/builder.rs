use crate::{
    ast::{Anchor, ExprNode, Literal, Operator, Priority},
    convert::decode_str,
    error::CompileError,
    lexer::{Lexed, Lexer, is_script_operator},
    options::Options,
    parser::Parser,
};

/// Compiles expression text into an [`ExprNode`] tree.
///
/// The builder does not use a precedence grammar. It walks the configured
/// priority list and splits the expression at the first top-level
/// occurrence of the first entry found, then builds both sides the same way.
/// Parentheses reset the search to the top of the list.
pub struct Builder<'a> {
    options: &'a Options,
}

impl<'a> Builder<'a> {
    pub fn new(options: &'a Options) -> Self {
        Builder { options }
    }

    /// Builds `expr`, returning `None` for empty (all-whitespace) input.
    pub fn build(&self, expr: &str) -> Result<Option<ExprNode>, CompileError> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Ok(None);
        }
        if let Some(inner) = strip_wrapping_parens(expr) {
            return self.build(inner);
        }

        let chars: Vec<char> = expr.chars().collect();
        let top_level = top_level_mask(&chars);

        for priority in &self.options.priorities {
            for position in occurrences(&chars, &top_level, priority.symbol()) {
                if let Some(node) = self.split_at(expr, &chars, *priority, position)? {
                    return Ok(Some(node));
                }
            }
        }

        parse_literal(expr).map(|lit| Some(ExprNode::Literal(lit)))
    }

    /// Tries to build a node by splitting at `position`. Returns `None`
    /// when a required operand would be empty.
    fn split_at(
        &self,
        expr: &str,
        chars: &[char],
        priority: Priority,
        position: usize,
    ) -> Result<Option<ExprNode>, CompileError> {
        let left: String = chars[..position].iter().collect();
        let right: String = chars[position + priority.symbol().len()..].iter().collect();

        let op = match priority {
            Priority::Selector(anchor) => {
                // a '$' or '@' inside a word such as `@.$ref` does not start one
                if !left.trim().is_empty() {
                    return Ok(None);
                }
                return self.build_selector(expr, anchor).map(Some);
            }
            Priority::Operator(op) => op,
        };

        if op.is_unary() {
            if !left.trim().is_empty() || right.trim().is_empty() {
                return Ok(None);
            }
            let Some(arg) = self.build(&right)? else {
                return Ok(None);
            };
            return Ok(Some(ExprNode::Unary {
                op,
                arg: Box::new(arg),
            }));
        }

        if left.trim().is_empty() || right.trim().is_empty() {
            return Ok(None);
        }

        // `2 * -3` first meets the '-', leaving `2 *` as a left side that
        // cannot stand alone; keep searching instead of failing
        let Ok(Some(left)) = self.build(&left) else {
            return Ok(None);
        };
        let right = if op == Operator::Regex {
            ExprNode::Literal(parse_literal(right.trim())?)
        } else {
            match self.build(&right)? {
                Some(node) => node,
                None => return Ok(None),
            }
        };

        Ok(Some(ExprNode::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }))
    }

    fn build_selector(&self, expr: &str, anchor: Anchor) -> Result<ExprNode, CompileError> {
        let Lexed { tokens, remainder } = Lexer::for_selector(expr).tokenize()?;
        let remainder = remainder.trim();
        if !remainder.is_empty() {
            return Err(match remainder.chars().next() {
                Some(ch) if is_script_operator(ch) || ch.is_ascii_punctuation() => {
                    CompileError::UnsupportedOperator(remainder.to_string())
                }
                _ => CompileError::invalid_expression(expr, "unexpected text after selector"),
            });
        }
        let query = Parser::new(self.options).parse_tokens(&tokens)?;
        Ok(ExprNode::Selector { query, anchor })
    }
}

/// Strips one pair of parentheses when they enclose the whole expression.
fn strip_wrapping_parens(expr: &str) -> Option<&str> {
    let inner = expr.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in inner.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' => depth += 1,
            // the opening paren closed before the final character
            ')' if depth == 0 => return None,
            ')' => depth -= 1,
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}

/// Marks the characters that sit outside quotes, brackets, parentheses,
/// braces, and a `/…/` pattern following `=~`.
fn top_level_mask(chars: &[char]) -> Vec<bool> {
    let mut mask = vec![false; chars.len()];
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if let Some(q) = quote {
            if ch == '\\' {
                i += 1;
            } else if ch == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '/' if depth == 0 && follows_regex_operator(chars, i) => quote = Some('/'),
            _ => mask[i] = depth == 0,
        }
        i += 1;
    }
    mask
}

fn follows_regex_operator(chars: &[char], position: usize) -> bool {
    let before: String = chars[..position].iter().collect();
    before.trim_end().ends_with("=~")
}

/// Top-level positions where `symbol` occurs as that operator and not as
/// part of a longer operator, a wildcard, or a number's exponent.
fn occurrences(chars: &[char], top_level: &[bool], symbol: &str) -> Vec<usize> {
    let symbol: Vec<char> = symbol.chars().collect();
    let before = |i: usize| i.checked_sub(1).and_then(|p| chars.get(p).copied());

    (0..chars.len())
        .filter(|&i| {
            chars[i..].starts_with(&symbol) && (i..i + symbol.len()).all(|p| top_level[p])
        })
        .filter(|&i| {
            let after = chars.get(i + symbol.len()).copied();
            match symbol.as_slice() {
                ['!'] | ['<'] | ['>'] => after != Some('='),
                ['*'] => after != Some('*') && before(i) != Some('*') && before(i) != Some('.'),
                ['+'] | ['-'] => !is_exponent_sign(chars, i),
                _ => true,
            }
        })
        .collect()
}

fn is_exponent_sign(chars: &[char], position: usize) -> bool {
    position >= 2
        && matches!(chars[position - 1], 'e' | 'E')
        && chars[position - 2].is_ascii_digit()
}

/// Parses literal syntax: `nil`/`null`, booleans, numbers, quoted strings,
/// `/pattern/`, JSON arrays and objects, and bare identifiers.
pub(crate) fn parse_literal(text: &str) -> Result<Literal, CompileError> {
    match text {
        "nil" | "null" => return Ok(Literal::Null),
        "true" => return Ok(Literal::Boolean(true)),
        "false" => return Ok(Literal::Boolean(false)),
        _ => {}
    }
    if let Ok(n) = text.parse::<i64>() {
        return Ok(Literal::Integer(n));
    }
    if looks_numeric(text)
        && let Ok(n) = text.parse::<f64>()
    {
        // infinities have no literal form to render back to
        if !n.is_finite() {
            return Err(CompileError::invalid_expression(text, "number out of range"));
        }
        return Ok(Literal::Float(n));
    }

    let first = text.chars().next();
    match first {
        Some(q @ ('\'' | '"')) => unquote(text, q)
            .map(Literal::String)
            .ok_or_else(|| CompileError::invalid_expression(text, "unterminated string literal")),
        Some('/') if text.len() >= 2 && text.ends_with('/') => Ok(Literal::String(text.to_string())),
        Some('[') | Some('{') => decode_str(text)
            .map(Literal::Json)
            .map_err(|_| CompileError::invalid_expression(text, "malformed array or object literal")),
        Some(_) if text.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.')) => {
            Ok(Literal::String(text.to_string()))
        }
        _ => Err(CompileError::invalid_expression(text, "unrecognised literal")),
    }
}

fn looks_numeric(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    digits.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
}

/// Removes the surrounding quotes and resolves backslash escapes. Returns
/// `None` when the closing quote is missing or not last.
fn unquote(text: &str, quote: char) -> Option<String> {
    let mut chars = text.chars().skip(1);
    let mut out = String::new();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                other => out.push(other),
            },
            c if c == quote => return chars.next().is_none().then_some(out),
            c => out.push(c),
        }
    }
    None
}

#[cfg(test)]
fn build(expr: &str) -> ExprNode {
    Builder::new(&Options::default()).build(expr).unwrap().unwrap()
}

#[test]
fn test_parentheses_reset_priority() {
    let node = build("(1 + 2) * 3");
    assert!(matches!(node, ExprNode::Binary { op: Operator::Mul, .. }));
}

#[test]
fn test_first_occurrence_splits() {
    // 5 - 3 - 1 splits at the first '-', giving 5 - (3 - 1)
    let ExprNode::Binary { op: Operator::Sub, left, right } = build("5 - 3 - 1") else {
        panic!("expected subtraction");
    };
    assert_eq!(*left, ExprNode::Literal(Literal::Integer(5)));
    assert!(matches!(*right, ExprNode::Binary { op: Operator::Sub, .. }));
}

#[test]
fn test_negative_literal_is_not_subtraction() {
    assert_eq!(build("-1"), ExprNode::Literal(Literal::Integer(-1)));
    let ExprNode::Binary { op: Operator::Sub, left, .. } = build("-1 - 2") else {
        panic!("expected subtraction");
    };
    assert_eq!(*left, ExprNode::Literal(Literal::Integer(-1)));
}

#[test]
fn test_negative_right_operand() {
    let ExprNode::Binary { op: Operator::Mul, left, right } = build("2 * -3") else {
        panic!("expected multiplication");
    };
    assert_eq!(*left, ExprNode::Literal(Literal::Integer(2)));
    assert_eq!(*right, ExprNode::Literal(Literal::Integer(-3)));
}

#[test]
fn test_literal_shapes() {
    assert_eq!(parse_literal("nil").unwrap(), Literal::Null);
    assert_eq!(parse_literal("1.5e3").unwrap(), Literal::Float(1500.0));
    assert_eq!(parse_literal(r"'it\'s'").unwrap(), Literal::String("it's".into()));
    assert!(matches!(parse_literal("[1, 2]").unwrap(), Literal::Json(_)));
    assert!(parse_literal("'open").is_err());
    assert!(parse_literal("[1,").is_err());
    assert!(parse_literal("1e999").is_err());
    assert!(parse_literal("-1e999").is_err());
}
