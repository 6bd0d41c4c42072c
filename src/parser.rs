use crate::{
    ast::{Bound, ExprNode, Query, Token, UnionItem},
    error::CompileError,
    expression::Builder,
    lexer::{Lexed, Lexer},
    options::Options,
};

/// Raw argument of a bracketed segment, before typing.
#[derive(Debug, Clone, PartialEq)]
enum RawArg {
    /// `'key'` with escapes resolved
    Quoted(String),
    /// `(expression)` without the outer parentheses
    Paren(String),
    /// Anything unquoted, e.g. an integer or `*`
    Bare(String),
}

/// Turns segment strings produced by the [`Lexer`] into [`Token`]s.
pub struct Parser<'a> {
    options: &'a Options,
}

impl<'a> Parser<'a> {
    pub fn new(options: &'a Options) -> Self {
        Parser { options }
    }

    /// Parse a complete top-level path starting with `$`.
    pub fn parse_query(&self, path: &str) -> Result<Query, CompileError> {
        let Lexed { tokens, remainder } = Lexer::new(path).tokenize()?;
        if !remainder.is_empty() {
            return Err(CompileError::TrailingInput(remainder));
        }
        self.parse_tokens(&tokens)
    }

    pub fn parse_tokens(&self, tokens: &[String]) -> Result<Query, CompileError> {
        let tokens = tokens
            .iter()
            .map(|token| self.parse_token(token))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Query::new(tokens))
    }

    /// Parse a single segment string such as `store`, `..`, or `[1:3]`.
    pub fn parse_token(&self, token: &str) -> Result<Token, CompileError> {
        match token {
            "$" => Ok(Token::Root),
            "@" => Ok(Token::Current),
            "*" => Ok(Token::Wildcard),
            ".." => Ok(Token::Recursive),
            "length" => Ok(Token::Length),
            "" => Err(CompileError::invalid_segment(token, "empty segment")),
            t if t.starts_with('[') => self.parse_bracket(t),
            t if t.parse::<i64>().is_ok() => Err(CompileError::IntegerKey(t.to_string())),
            t => Ok(Token::Key(t.to_string())),
        }
    }

    fn parse_bracket(&self, segment: &str) -> Result<Token, CompileError> {
        let inner = segment
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| CompileError::invalid_segment(segment, "unbalanced brackets"))?;

        if let Some(filter) = inner.strip_prefix('?') {
            return self.parse_filter(segment, filter);
        }

        let (args, separators) = self.split_arguments(segment, inner)?;

        if separators.is_empty() {
            return match args.into_iter().next().flatten() {
                None => Err(CompileError::invalid_segment(segment, "empty brackets")),
                Some(RawArg::Quoted(key)) => Ok(Token::Key(key)),
                Some(RawArg::Paren(expr)) => Ok(Token::Script(self.build(&expr)?)),
                Some(RawArg::Bare(text)) if text == "*" => Ok(Token::Wildcard),
                Some(RawArg::Bare(text)) => text.parse::<i64>().map(Token::Index).map_err(|_| {
                    CompileError::invalid_segment(segment, "expected an index, quoted key, or expression")
                }),
            };
        }

        if separators.iter().all(|&sep| sep == ',') {
            let items = args
                .into_iter()
                .map(|arg| self.union_item(segment, arg))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Token::Union(items));
        }

        if separators.iter().all(|&sep| sep == ':') && separators.len() <= 2 {
            let mut bounds = args
                .into_iter()
                .map(|arg| self.range_bound(segment, arg))
                .collect::<Result<Vec<_>, _>>()?
                .into_iter();
            let from = bounds.next().flatten();
            let to = bounds.next().flatten();
            let step = bounds.next().flatten();
            return Ok(Token::Range { from, to, step });
        }

        if separators.iter().all(|&sep| sep == ':') {
            Err(CompileError::invalid_segment(segment, "a range takes at most two ':'"))
        } else {
            Err(CompileError::invalid_segment(segment, "cannot mix ':' and ','"))
        }
    }

    fn parse_filter(&self, segment: &str, filter: &str) -> Result<Token, CompileError> {
        let chars: Vec<char> = filter.chars().collect();
        if chars.first() != Some(&'(') {
            return Err(CompileError::invalid_segment(segment, "a filter must be written ?(...)"));
        }
        let (expr, next) = read_parens(&chars, 0, segment)?;
        if next != chars.len() {
            return Err(CompileError::invalid_segment(segment, "unexpected text after filter"));
        }
        if expr.trim().is_empty() {
            return Err(CompileError::invalid_expression(&expr, "empty filter"));
        }
        Ok(Token::Filter(expr))
    }

    fn union_item(&self, segment: &str, arg: Option<RawArg>) -> Result<UnionItem, CompileError> {
        match arg {
            None => Err(CompileError::invalid_segment(segment, "empty union member")),
            Some(RawArg::Quoted(key)) => Ok(UnionItem::Key(key)),
            Some(RawArg::Paren(expr)) => Ok(UnionItem::Expression(self.build(&expr)?)),
            Some(RawArg::Bare(text)) => text.parse::<i64>().map(UnionItem::Index).map_err(|_| {
                CompileError::invalid_segment(segment, "union members must be indices, quoted keys, or expressions")
            }),
        }
    }

    fn range_bound(&self, segment: &str, arg: Option<RawArg>) -> Result<Option<Bound>, CompileError> {
        match arg {
            None => Ok(None),
            Some(RawArg::Paren(expr)) => Ok(Some(Bound::Expression(self.build(&expr)?))),
            Some(RawArg::Bare(text)) => text.parse::<i64>().map(|n| Some(Bound::Literal(n))).map_err(|_| {
                CompileError::invalid_segment(segment, "range bounds must be integers or expressions")
            }),
            Some(RawArg::Quoted(_)) => Err(CompileError::invalid_segment(
                segment,
                "range bounds must be integers or expressions",
            )),
        }
    }

    fn build(&self, expr: &str) -> Result<ExprNode, CompileError> {
        Builder::new(self.options)
            .build(expr)?
            .ok_or_else(|| CompileError::invalid_expression(expr, "empty expression"))
    }

    /// Splits bracket content into arguments and the `:`/`,` separators
    /// between them. A missing argument between separators is `None`.
    fn split_arguments(
        &self,
        segment: &str,
        inner: &str,
    ) -> Result<(Vec<Option<RawArg>>, Vec<char>), CompileError> {
        let chars: Vec<char> = inner.chars().collect();
        let mut args = Vec::new();
        let mut separators = Vec::new();
        let mut current: Option<RawArg> = None;
        // set once the current argument can take no more characters
        let mut sealed = false;
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            match ch {
                '\'' | '"' | '(' => {
                    if current.is_some() {
                        return Err(CompileError::invalid_segment(segment, "unexpected quote or parenthesis"));
                    }
                    let (arg, next) = if ch == '(' {
                        let (text, next) = read_parens(&chars, i, segment)?;
                        (RawArg::Paren(text), next)
                    } else {
                        let (text, next) = read_quoted(&chars, i, segment)?;
                        (RawArg::Quoted(text), next)
                    };
                    current = Some(arg);
                    sealed = true;
                    i = next;
                    continue;
                }
                ':' | ',' => {
                    args.push(current.take());
                    separators.push(ch);
                    sealed = false;
                }
                c if c.is_whitespace() => {
                    if !self.options.lenient_whitespace {
                        return Err(CompileError::UnexpectedWhitespace(segment.to_string()));
                    }
                    sealed = current.is_some();
                }
                c => match &mut current {
                    None => current = Some(RawArg::Bare(c.to_string())),
                    Some(RawArg::Bare(text)) if !sealed => text.push(c),
                    Some(_) => {
                        return Err(CompileError::invalid_segment(segment, "unexpected character in brackets"));
                    }
                },
            }
            i += 1;
        }

        args.push(current);
        Ok((args, separators))
    }
}

/// Reads a quoted key starting at `start`, resolving `\'`, `\"`, and `\\`.
/// Returns the key and the index just past the closing quote.
fn read_quoted(chars: &[char], start: usize, segment: &str) -> Result<(String, usize), CompileError> {
    let quote = chars[start];
    let mut text = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                match chars.get(i + 1) {
                    Some(&escaped) if escaped == quote || escaped == '\\' => text.push(escaped),
                    Some(&other) => {
                        text.push('\\');
                        text.push(other);
                    }
                    None => break,
                }
                i += 2;
            }
            ch if ch == quote => return Ok((text, i + 1)),
            ch => {
                text.push(ch);
                i += 1;
            }
        }
    }

    Err(CompileError::invalid_segment(segment, "unterminated quoted key"))
}

/// Reads a parenthesised expression starting at `start`, honouring nested
/// parentheses and quoted text. Returns the text between the outer
/// parentheses and the index just past the closing one.
fn read_parens(chars: &[char], start: usize, segment: &str) -> Result<(String, usize), CompileError> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut i = start;

    while i < chars.len() {
        let ch = chars[i];
        if let Some(q) = quote {
            if ch == '\\' {
                i += 1;
            } else if ch == q {
                quote = None;
            }
        } else {
            match ch {
                '\'' | '"' => quote = Some(ch),
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        let text = chars[start + 1..i].iter().collect();
                        return Ok((text, i + 1));
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }

    Err(CompileError::invalid_segment(segment, "unterminated parenthesis"))
}

#[cfg(test)]
fn parse(token: &str) -> Result<Token, CompileError> {
    Parser::new(&Options::default()).parse_token(token)
}

#[test]
fn test_bare_words() {
    assert_eq!(parse("store").unwrap(), Token::Key("store".into()));
    assert_eq!(parse("length").unwrap(), Token::Length);
    assert!(matches!(parse("3"), Err(CompileError::IntegerKey(_))));
}

#[test]
fn test_quoted_key_with_escape() {
    assert_eq!(parse(r"['it\'s']").unwrap(), Token::Key("it's".into()));
    assert_eq!(parse("['a,b:c']").unwrap(), Token::Key("a,b:c".into()));
}

#[test]
fn test_range_slots() {
    assert_eq!(
        parse("[1:]").unwrap(),
        Token::Range { from: Some(Bound::Literal(1)), to: None, step: None }
    );
    assert_eq!(
        parse("[::-1]").unwrap(),
        Token::Range { from: None, to: None, step: Some(Bound::Literal(-1)) }
    );
    assert!(parse("[1:2:3:4]").is_err());
    assert!(parse("[1:2,3]").is_err());
}
