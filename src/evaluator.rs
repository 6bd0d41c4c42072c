use crate::{
    ast::{Bound, Query, Token, UnionItem},
    error::{CompileError, EvalError, Expected},
    expression::Builder,
    options::Options,
    value::{Value, ValueKind},
};

const OBJECT: &[ValueKind] = &[ValueKind::Object];
const COLLECTION: &[ValueKind] = &[ValueKind::Array, ValueKind::Object];
const SEQUENCE: &[ValueKind] = &[ValueKind::Array, ValueKind::String];
const SEQUENCE_OR_OBJECT: &[ValueKind] = &[ValueKind::Array, ValueKind::String, ValueKind::Object];

/// Result of slicing: elements of a collection, or a substring.
enum Slice<'v> {
    Items(Vec<&'v Value>),
    Text(String),
}

/// Walks compiled queries over a document.
///
/// Evaluation is a right-recursive walk over the token slice: each token
/// transforms the current value and hands it to the rest of the chain.
/// Tokens that produce several values pass each of them through the rest of
/// the chain on its own, dropping the ones that fail.
pub struct Evaluator<'a> {
    options: &'a Options,
}

impl<'a> Evaluator<'a> {
    pub fn new(options: &'a Options) -> Self {
        Evaluator { options }
    }

    /// Evaluates a compiled query against a document.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonpath_dialect::{compile, decode_str, Evaluator, Options, Value};
    ///
    /// let doc = decode_str(r#"{"items": [{"price": 8}, {"price": 12}]}"#).unwrap();
    /// let query = compile("$.items[?(@.price > 10)].price").unwrap();
    ///
    /// let options = Options::default();
    /// let result = Evaluator::new(&options).evaluate(&query, &doc).unwrap();
    /// assert_eq!(result, Value::Array(vec![Value::Integer(12)]));
    /// ```
    pub fn evaluate(&self, query: &Query, document: &Value) -> Result<Value, EvalError> {
        tracing::debug!(query = %query, "evaluating query");
        self.apply(query.tokens(), document, document)
    }

    /// Applies `tokens` to `current`; `root` stays the whole document.
    pub(crate) fn apply(&self, tokens: &[Token], root: &Value, current: &Value) -> Result<Value, EvalError> {
        let Some((token, rest)) = tokens.split_first() else {
            return Ok(current.clone());
        };

        match token {
            Token::Root => self.apply(rest, root, root),
            Token::Current => self.apply(rest, root, current),
            Token::Key(key) => self.apply(rest, root, self.key(current, key)?),
            Token::Index(index) => {
                let value = self.index(current, *index)?;
                self.apply(rest, root, &value)
            }
            Token::Length => {
                let value = self.length(current)?;
                self.apply(rest, root, &value)
            }
            Token::Wildcard => {
                let items = self.wildcard(current)?;
                self.continue_sequence(items, rest, root)
            }
            Token::Recursive => {
                let mut nodes = Vec::new();
                descendants(current, &mut nodes);
                self.continue_recursive(nodes, rest, root)
            }
            Token::Range { from, to, step } => match self.range(current, from, to, step, root)? {
                Slice::Items(items) => self.continue_sequence(items, rest, root),
                Slice::Text(text) => self.apply(rest, root, &Value::String(text)),
            },
            Token::Union(items) => {
                let items = self.union(current, items, root)?;
                self.continue_sequence(items, rest, root)
            }
            Token::Filter(expr) => {
                let items = self.filter(current, expr, root)?;
                self.continue_sequence(items, rest, root)
            }
            Token::Script(expr) => match self.eval_expr(expr, root, current)? {
                Value::String(key) => self.apply(rest, root, self.key(current, &key)?),
                result => match result.as_int() {
                    Some(index) => {
                        let value = self.index(current, index)?;
                        self.apply(rest, root, &value)
                    }
                    None => Err(EvalError::UnexpectedResult {
                        expected: "a key or an index",
                        found: result.to_string(),
                    }),
                },
            },
        }
    }

    /// Passes each element through the rest of the chain, dropping the ones
    /// that fail. A following index applies to the sequence itself.
    fn continue_sequence(&self, items: Vec<&Value>, rest: &[Token], root: &Value) -> Result<Value, EvalError> {
        if rest.is_empty() {
            return Ok(Value::Array(items.into_iter().cloned().collect()));
        }
        if matches!(rest.first(), Some(Token::Index(_))) {
            let sequence = Value::Array(items.into_iter().cloned().collect());
            return self.apply(rest, root, &sequence);
        }

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            match self.apply(rest, root, item) {
                Ok(value) => results.push(value),
                Err(e) => tracing::trace!(error = %e, "dropping element from sequence"),
            }
        }
        Ok(Value::Array(results))
    }

    /// Like [`Self::continue_sequence`] over recursive-descent nodes, but
    /// array results are spliced into the output one level deep.
    fn continue_recursive(&self, nodes: Vec<&Value>, rest: &[Token], root: &Value) -> Result<Value, EvalError> {
        if rest.is_empty() || matches!(rest.first(), Some(Token::Index(_))) {
            return self.continue_sequence(nodes, rest, root);
        }

        let mut results = Vec::new();
        for node in nodes {
            match self.apply(rest, root, node) {
                Ok(Value::Array(values)) => results.extend(values),
                Ok(value) => results.push(value),
                Err(e) => tracing::trace!(error = %e, "dropping descendant"),
            }
        }
        Ok(Value::Array(results))
    }

    fn key<'v>(&self, current: &'v Value, key: &str) -> Result<&'v Value, EvalError> {
        match current {
            Value::Object(map) => map.get(key).ok_or_else(|| EvalError::KeyNotFound(key.to_string())),
            other => Err(EvalError::mismatch("key lookup", OBJECT, other.kind())),
        }
    }

    fn index(&self, current: &Value, index: i64) -> Result<Value, EvalError> {
        match current {
            Value::Array(arr) => {
                let i = normalize_index(index, arr.len())?;
                Ok(arr[i].clone())
            }
            Value::String(s) => {
                let len = s.chars().count();
                let i = normalize_index(index, len)?;
                Ok(s.chars().nth(i).map(String::from).map(Value::String).unwrap_or(Value::Null))
            }
            Value::Object(map) if self.options.index_objects => {
                let i = normalize_index(index, map.len())?;
                Ok(map.values().nth(i).cloned().unwrap_or(Value::Null))
            }
            other => Err(EvalError::mismatch("index", self.indexable(), other.kind())),
        }
    }

    fn indexable(&self) -> &'static [ValueKind] {
        if self.options.index_objects { SEQUENCE_OR_OBJECT } else { SEQUENCE }
    }

    fn length(&self, current: &Value) -> Result<Value, EvalError> {
        match current {
            Value::Object(map) => match map.get("length") {
                Some(explicit) => Ok(explicit.clone()),
                None => Ok(Value::Integer(map.len() as i64)),
            },
            Value::Array(_) | Value::String(_) => Ok(Value::Integer(current.len().unwrap_or(0) as i64)),
            other => Err(EvalError::mismatch(
                "length",
                &[ValueKind::Array, ValueKind::Object, ValueKind::String],
                other.kind(),
            )),
        }
    }

    fn wildcard<'v>(&self, current: &'v Value) -> Result<Vec<&'v Value>, EvalError> {
        match current {
            Value::Array(arr) => Ok(arr.iter().collect()),
            Value::Object(map) => Ok(map.values().collect()),
            other => Err(EvalError::mismatch("wildcard", COLLECTION, other.kind())),
        }
    }

    fn range<'v>(
        &self,
        current: &'v Value,
        from: &Option<Bound>,
        to: &Option<Bound>,
        step: &Option<Bound>,
        root: &Value,
    ) -> Result<Slice<'v>, EvalError> {
        let len = match current {
            Value::Array(_) | Value::String(_) => current.len().unwrap_or(0),
            Value::Object(map) if self.options.index_objects => map.len(),
            other => return Err(EvalError::mismatch("range", self.indexable(), other.kind())),
        };

        let from = self.resolve_bound(from, root, current, "range start")?;
        let to = self.resolve_bound(to, root, current, "range end")?;
        let step = self.resolve_bound(step, root, current, "range step")?;
        let indices = slice_indices(len, from, to, step.unwrap_or(1))?;

        Ok(match current {
            Value::Array(arr) => Slice::Items(indices.into_iter().map(|i| &arr[i]).collect()),
            Value::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                Slice::Text(indices.into_iter().map(|i| chars[i]).collect())
            }
            Value::Object(map) => {
                let values: Vec<&Value> = map.values().collect();
                Slice::Items(indices.into_iter().map(|i| values[i]).collect())
            }
            _ => Slice::Items(Vec::new()),
        })
    }

    fn resolve_bound(
        &self,
        bound: &Option<Bound>,
        root: &Value,
        current: &Value,
        context: &'static str,
    ) -> Result<Option<i64>, EvalError> {
        match bound {
            None => Ok(None),
            Some(Bound::Literal(n)) => Ok(Some(*n)),
            Some(Bound::Expression(expr)) => {
                let value = self
                    .eval_expr(expr, root, current)
                    .map_err(|e| EvalError::bound(context, e))?;
                value.as_int().map(Some).ok_or_else(|| EvalError::UnexpectedResult {
                    expected: "an integer bound",
                    found: value.to_string(),
                })
            }
        }
    }

    fn union<'v>(&self, current: &'v Value, items: &[UnionItem], root: &Value) -> Result<Vec<&'v Value>, EvalError> {
        // expression members resolve to plain keys or indices first
        let mut members = Vec::with_capacity(items.len());
        for item in items {
            let member = match item {
                UnionItem::Expression(expr) => {
                    let value = self
                        .eval_expr(expr, root, current)
                        .map_err(|e| EvalError::bound("union member", e))?;
                    match value {
                        Value::String(key) => UnionItem::Key(key),
                        other => match other.as_int() {
                            Some(index) => UnionItem::Index(index),
                            None => {
                                return Err(EvalError::UnexpectedResult {
                                    expected: "a key or an index",
                                    found: other.to_string(),
                                });
                            }
                        },
                    }
                }
                plain => plain.clone(),
            };
            members.push(member);
        }

        match current {
            Value::Array(arr) => members
                .iter()
                .map(|member| match member {
                    UnionItem::Index(index) => Ok(&arr[normalize_index(*index, arr.len())?]),
                    _ => Err(EvalError::mismatch("union key", OBJECT, ValueKind::Array)),
                })
                .collect(),
            Value::Object(map) => {
                let mut found = Vec::with_capacity(members.len());
                let mut missing = Vec::new();
                for member in &members {
                    match member {
                        UnionItem::Key(key) => match map.get(key) {
                            Some(value) => found.push(value),
                            None => missing.push(key.clone()),
                        },
                        UnionItem::Index(index) if self.options.index_objects => {
                            let i = normalize_index(*index, map.len())?;
                            found.extend(map.values().nth(i));
                        }
                        _ => {
                            return Err(EvalError::mismatch(
                                "union index",
                                &[ValueKind::Array],
                                ValueKind::Object,
                            ));
                        }
                    }
                }
                if missing.is_empty() {
                    Ok(found)
                } else {
                    Err(EvalError::KeysNotFound(missing))
                }
            }
            other => Err(EvalError::mismatch("union", COLLECTION, other.kind())),
        }
    }

    fn filter<'v>(&self, current: &'v Value, expr: &str, root: &Value) -> Result<Vec<&'v Value>, EvalError> {
        let candidates: Vec<&Value> = match current {
            Value::Array(arr) => arr.iter().collect(),
            Value::Object(map) => map.values().collect(),
            other => return Err(EvalError::mismatch("filter", COLLECTION, other.kind())),
        };

        // a filter that cannot be built fails for every element alike
        let node = match Builder::new(self.options).build(expr) {
            Ok(Some(node)) => node,
            Ok(None) => return Err(CompileError::invalid_expression(expr, "empty filter").into()),
            Err(e) => {
                tracing::trace!(error = %e, filter = expr, "filter dropped every element");
                return Ok(Vec::new());
            }
        };

        let mut kept = Vec::new();
        for candidate in candidates {
            match self.eval_expr(&node, root, candidate) {
                Ok(result) if result.is_truthy() => kept.push(candidate),
                Ok(_) => {}
                Err(e) => tracing::trace!(error = %e, "filter dropped element"),
            }
        }
        Ok(kept)
    }
}

/// Pre-order: the value itself, then every array element and object value,
/// depth first.
fn descendants<'v>(value: &'v Value, out: &mut Vec<&'v Value>) {
    out.push(value);
    match value {
        Value::Array(arr) => arr.iter().for_each(|v| descendants(v, out)),
        Value::Object(map) => map.values().for_each(|v| descendants(v, out)),
        _ => {}
    }
}

/// Resolves a possibly negative index against `len`.
fn normalize_index(index: i64, len: usize) -> Result<usize, EvalError> {
    let effective = if index < 0 { len as i64 + index } else { index };
    if effective < 0 || effective >= len as i64 {
        return Err(EvalError::IndexOutOfRange { index, len });
    }
    Ok(effective as usize)
}

/// Indices selected by a slice. Negative bounds count from the end and
/// bounds outside the sequence are clamped, so a slice never fails for
/// being out of range.
fn slice_indices(len: usize, from: Option<i64>, to: Option<i64>, step: i64) -> Result<Vec<usize>, EvalError> {
    if step == 0 {
        return Err(EvalError::InvalidArgument {
            expected: Expected::NonZero,
            found: "0".to_string(),
        });
    }

    let len = len as i64;
    let normalize = |bound: i64| if bound < 0 { len + bound } else { bound };

    let mut indices = Vec::new();
    if step > 0 {
        let start = from.map(normalize).unwrap_or(0).clamp(0, len);
        let end = to.map(normalize).unwrap_or(len).clamp(0, len);
        let mut i = start;
        while i < end {
            indices.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    } else {
        // -1 stands for "before the first element"
        let start = from.map(normalize).unwrap_or(len - 1).clamp(-1, len - 1);
        let end = to.map(normalize).unwrap_or(-1).clamp(-1, len - 1);
        let mut i = start;
        while i > end {
            indices.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    }
    Ok(indices)
}

#[test]
fn test_slice_huge_step() {
    assert_eq!(slice_indices(3, Some(1), Some(3), i64::MAX).unwrap(), vec![1]);
    assert_eq!(slice_indices(3, None, None, i64::MIN).unwrap(), vec![2]);
}

#[test]
fn test_slice_indices() {
    assert_eq!(slice_indices(4, Some(-1), None, 1).unwrap(), vec![3]);
    assert_eq!(slice_indices(4, Some(1), Some(10), 1).unwrap(), vec![1, 2, 3]);
    assert_eq!(slice_indices(4, None, None, -1).unwrap(), vec![3, 2, 1, 0]);
    assert_eq!(slice_indices(4, None, None, 2).unwrap(), vec![0, 2]);
    assert_eq!(slice_indices(4, Some(-10), Some(2), 1).unwrap(), vec![0, 1]);
    assert!(slice_indices(4, Some(3), Some(1), 1).unwrap().is_empty());
    assert!(slice_indices(4, None, None, 0).is_err());
}

#[test]
fn test_normalize_index() {
    assert_eq!(normalize_index(-1, 3).unwrap(), 2);
    assert!(matches!(
        normalize_index(-4, 3),
        Err(EvalError::IndexOutOfRange { index: -4, len: 3 })
    ));
}
