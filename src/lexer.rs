use crate::error::CompileError;

/// Characters of the expression language that end a path outside brackets.
pub(crate) const SCRIPT_OPERATORS: &[char] = &['+', '-', '/', '%', '>', '<', '=', '!', '*'];

pub(crate) fn is_script_operator(ch: char) -> bool {
    SCRIPT_OPERATORS.contains(&ch)
}

/// A path split into segment strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexed {
    /// Segment strings in order, e.g. `["$", "store", "..", "[0]"]`
    pub tokens: Vec<String>,
    /// Input left unconsumed after the first script operator or whitespace
    /// found outside a bracket, empty when the whole input was consumed
    pub remainder: String,
}

/// Splits a raw path into segment strings.
///
/// `.` separates segments and is dropped, `..` is kept as the recursive
/// descent segment, and bracketed segments are kept whole including their
/// brackets.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    allow_current: bool,
}

impl Lexer {
    /// Lexer for a top-level query, which must start with `$`.
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            allow_current: false,
        }
    }

    /// Lexer for a selector embedded in an expression, which may also start
    /// with `@`.
    pub fn for_selector(input: &str) -> Self {
        Lexer {
            allow_current: true,
            ..Lexer::new(input)
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn previous_char(&self) -> Option<char> {
        self.position
            .checked_sub(1)
            .and_then(|i| self.input.get(i).copied())
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    pub fn tokenize(mut self) -> Result<Lexed, CompileError> {
        let anchor = match self.current_char() {
            None => return Err(CompileError::EmptyQuery),
            Some('$') => '$',
            Some('@') if self.allow_current => '@',
            Some('@') => return Err(CompileError::CurrentOutsideExpression),
            Some(ch) => return Err(CompileError::InvalidFirstCharacter(ch)),
        };
        self.advance();

        // an embedded selector must name at least one segment
        match self.current_char() {
            Some('.') | Some('[') => {}
            None if !self.allow_current => {}
            None => return Err(CompileError::BareAnchor(anchor)),
            Some(found) => {
                return Err(CompileError::InvalidCharacterAfterAnchor { anchor, found });
            }
        }

        let mut tokens = vec![anchor.to_string()];

        while let Some(ch) = self.current_char() {
            match ch {
                '.' => {
                    if self.peek_char(1) == Some('.') {
                        tokens.push("..".to_string());
                        self.advance();
                        self.advance();
                    } else {
                        // a lone '.' only separates, so it must lead somewhere
                        match self.peek_char(1) {
                            Some(next) if next != ']' && !next.is_whitespace() => self.advance(),
                            _ => {
                                return Err(CompileError::UnexpectedCharacter {
                                    found: '.',
                                    position: self.position,
                                });
                            }
                        }
                    }
                }
                '[' => tokens.push(self.read_bracket()?),
                ']' => {
                    return Err(CompileError::UnexpectedCharacter {
                        found: ']',
                        position: self.position,
                    });
                }
                '*' if self.is_wildcard() => {
                    tokens.push("*".to_string());
                    self.advance();
                }
                ch if is_script_operator(ch) || ch.is_whitespace() => break,
                _ => tokens.push(self.read_word()),
            }
        }

        let remainder = self.input[self.position..].iter().collect();
        Ok(Lexed { tokens, remainder })
    }

    /// A `*` directly after a separator that ends the segment on its own.
    fn is_wildcard(&self) -> bool {
        if self.previous_char() != Some('.') {
            return false;
        }
        match self.peek_char(1) {
            None | Some('.') | Some('[') => true,
            Some(next) => next != '*' && (is_script_operator(next) || next.is_whitespace()),
        }
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(ch) = self.current_char() {
            if matches!(ch, '.' | '[' | ']') || is_script_operator(ch) || ch.is_whitespace() {
                break;
            }
            word.push(ch);
            self.advance();
        }
        word
    }

    /// Reads a bracketed segment up to its balancing `]`, skipping over
    /// nested brackets, parentheses, and quoted text.
    fn read_bracket(&mut self) -> Result<String, CompileError> {
        let start = self.position;
        let mut segment = String::new();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;

        while let Some(ch) = self.current_char() {
            segment.push(ch);
            self.advance();

            if let Some(q) = quote {
                if ch == '\\' {
                    if let Some(escaped) = self.current_char() {
                        segment.push(escaped);
                        self.advance();
                    }
                } else if ch == q {
                    quote = None;
                }
                continue;
            }

            match ch {
                '\'' | '"' => quote = Some(ch),
                '[' | '(' | '{' => depth += 1,
                ']' | ')' | '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        if ch == ']' {
                            return Ok(segment);
                        }
                        break;
                    }
                }
                _ => {}
            }
        }

        Err(CompileError::UnclosedBracket(start))
    }
}

#[cfg(test)]
fn lex(input: &str) -> Lexed {
    Lexer::for_selector(input).tokenize().unwrap()
}

#[test]
fn test_dot_and_bracket_segments() {
    let lexed = lex("$.store.book[0]['title']");
    assert_eq!(lexed.tokens, vec!["$", "store", "book", "[0]", "['title']"]);
    assert!(lexed.remainder.is_empty());
}

#[test]
fn test_recursive_and_wildcard() {
    assert_eq!(lex("$..*").tokens, vec!["$", "..", "*"]);
    assert_eq!(lex("$..author").tokens, vec!["$", "..", "author"]);
    assert_eq!(lex("@.*.price").tokens, vec!["@", "*", "price"]);
}

#[test]
fn test_operator_ends_selector() {
    let lexed = lex("@.price<10");
    assert_eq!(lexed.tokens, vec!["@", "price"]);
    assert_eq!(lexed.remainder, "<10");

    let lexed = lex("@.a * 2");
    assert_eq!(lexed.tokens, vec!["@", "a"]);
    assert_eq!(lexed.remainder, " * 2");
}

#[test]
fn test_anchor_followed_by_operator() {
    let err = Lexer::for_selector("@==42").tokenize().unwrap_err();
    assert_eq!(err, CompileError::InvalidCharacterAfterAnchor { anchor: '@', found: '=' });
    assert_eq!(Lexer::for_selector("@").tokenize().unwrap_err(), CompileError::BareAnchor('@'));
    assert_eq!(Lexer::new("$").tokenize().unwrap().tokens, vec!["$"]);
}
