use std::{collections::BTreeMap, fmt};

/// A JSON value walked by compiled queries.
///
/// Integers and floats are kept apart so that results keep their literal
/// shape (`42` stays `42`), while every numeric comparison normalises both
/// sides to `f64` (`1 == 1.0`).
///
/// Objects are stored in a [`BTreeMap`], so iterating one is always
/// key-sorted ascending. Wildcard and recursive-descent results over objects
/// are set-like and callers should not rely on their order; index-like
/// operations over objects rely on the sorted order.
///
/// # Examples
///
/// ```
/// use jsonpath_dialect::Value;
/// use std::collections::BTreeMap;
///
/// let mut obj = BTreeMap::new();
/// obj.insert("key".to_string(), Value::String("value".to_string()));
///
/// let array = Value::Array(vec![Value::Integer(1), Value::Object(obj)]);
/// assert_eq!(array.len(), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Ordered sequence of values
    Array(Vec<Value>),

    /// String-keyed map of values
    Object(BTreeMap<String, Value>),
}

/// The kind of a [`Value`], used when reporting structural mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) | Value::Float(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Truthiness used by filters and logical operators.
    ///
    /// `true`, any string that is not blank, and every other value that is
    /// neither null nor `false` counts as truthy. Numbers are truthy even
    /// when zero, and so are empty arrays and objects.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as integer, accepting floats only when they hold a whole number
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Float(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Element count for arrays and objects, character count for strings.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Array(arr) => Some(arr.len()),
            Value::Object(obj) => Some(obj.len()),
            Value::String(s) => Some(s.chars().count()),
            _ => None,
        }
    }

    /// Equality with numeric normalisation: numbers compare by their `f64`
    /// value at any depth, everything else compares with strict kinds.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_number() && b.is_number() => a.as_float() == b.as_float(),
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.loose_eq(vb))
            }
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::Value::from(self.clone());
        write!(f, "{}", json)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

#[test]
fn test_truthiness() {
    assert!(Value::Boolean(true).is_truthy());
    assert!(!Value::Boolean(false).is_truthy());
    assert!(!Value::Null.is_truthy());
    assert!(!Value::String("  ".into()).is_truthy());
    assert!(Value::String("x".into()).is_truthy());
    assert!(Value::Integer(0).is_truthy());
    assert!(Value::Array(vec![]).is_truthy());
}

#[test]
fn test_loose_eq_normalises_numbers() {
    assert!(Value::Integer(1).loose_eq(&Value::Float(1.0)));
    assert!(!Value::Integer(42).loose_eq(&Value::String("42".into())));
    assert!(
        Value::Array(vec![Value::Integer(2)]).loose_eq(&Value::Array(vec![Value::Float(2.0)]))
    );
}
