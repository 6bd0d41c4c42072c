//! Querying native Rust data without building JSON first.
//!
//! [`HostValue`] describes anything that looks like a JSON tree: records
//! with named fields, sequences with positional elements, and scalars.
//! [`Value::from_host`] walks such a tree into a [`Value`] so the regular
//! evaluator can run over it.

use std::collections::{BTreeMap, HashMap};

use crate::{error::EvalError, value::Value};

/// Shape of a host value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    Null,
    Scalar,
    Sequence,
    Record,
}

/// Read access to a host data structure.
///
/// Scalars answer [`scalar`](HostValue::scalar); sequences answer
/// [`length`](HostValue::length) and [`element_at`](HostValue::element_at);
/// records answer [`field_names`](HostValue::field_names) and
/// [`field_by_name`](HostValue::field_by_name).
pub trait HostValue {
    fn kind(&self) -> HostKind;

    fn scalar(&self) -> Option<Value> {
        None
    }

    fn field_by_name(&self, _name: &str) -> Option<&dyn HostValue> {
        None
    }

    fn element_at(&self, _index: usize) -> Option<&dyn HostValue> {
        None
    }

    fn length(&self) -> usize {
        0
    }

    fn field_names(&self) -> Vec<String> {
        Vec::new()
    }
}

impl Value {
    /// Materialises a host tree. Nesting deeper than `max_depth` fails with
    /// [`EvalError::DepthExceeded`], which also stops self-referencing hosts.
    pub fn from_host(host: &dyn HostValue, max_depth: usize) -> Result<Value, EvalError> {
        materialise(host, 0, max_depth)
    }
}

fn materialise(host: &dyn HostValue, depth: usize, max_depth: usize) -> Result<Value, EvalError> {
    if depth > max_depth {
        return Err(EvalError::DepthExceeded(max_depth));
    }

    match host.kind() {
        HostKind::Null => Ok(Value::Null),
        HostKind::Scalar => Ok(host.scalar().unwrap_or(Value::Null)),
        HostKind::Sequence => (0..host.length())
            .map(|i| match host.element_at(i) {
                Some(element) => materialise(element, depth + 1, max_depth),
                None => Ok(Value::Null),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        HostKind::Record => {
            let mut map = BTreeMap::new();
            for name in host.field_names() {
                if let Some(field) = host.field_by_name(&name) {
                    let value = materialise(field, depth + 1, max_depth)?;
                    map.insert(name, value);
                }
            }
            Ok(Value::Object(map))
        }
    }
}

impl HostValue for Value {
    fn kind(&self) -> HostKind {
        match self {
            Value::Null => HostKind::Null,
            Value::Array(_) => HostKind::Sequence,
            Value::Object(_) => HostKind::Record,
            _ => HostKind::Scalar,
        }
    }

    fn scalar(&self) -> Option<Value> {
        match self {
            Value::Boolean(_) | Value::Integer(_) | Value::Float(_) | Value::String(_) => Some(self.clone()),
            _ => None,
        }
    }

    fn field_by_name(&self, name: &str) -> Option<&dyn HostValue> {
        match self {
            Value::Object(map) => map.get(name).map(|v| v as &dyn HostValue),
            _ => None,
        }
    }

    fn element_at(&self, index: usize) -> Option<&dyn HostValue> {
        match self {
            Value::Array(arr) => arr.get(index).map(|v| v as &dyn HostValue),
            _ => None,
        }
    }

    fn length(&self) -> usize {
        match self {
            Value::Array(arr) => arr.len(),
            Value::Object(map) => map.len(),
            _ => 0,
        }
    }

    fn field_names(&self) -> Vec<String> {
        match self {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

impl HostValue for serde_json::Value {
    fn kind(&self) -> HostKind {
        match self {
            serde_json::Value::Null => HostKind::Null,
            serde_json::Value::Array(_) => HostKind::Sequence,
            serde_json::Value::Object(_) => HostKind::Record,
            _ => HostKind::Scalar,
        }
    }

    fn scalar(&self) -> Option<Value> {
        match self {
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
            scalar => Some(Value::from(scalar.clone())),
        }
    }

    fn field_by_name(&self, name: &str) -> Option<&dyn HostValue> {
        self.as_object()?.get(name).map(|v| v as &dyn HostValue)
    }

    fn element_at(&self, index: usize) -> Option<&dyn HostValue> {
        self.as_array()?.get(index).map(|v| v as &dyn HostValue)
    }

    fn length(&self) -> usize {
        match self {
            serde_json::Value::Array(arr) => arr.len(),
            serde_json::Value::Object(map) => map.len(),
            _ => 0,
        }
    }

    fn field_names(&self) -> Vec<String> {
        self.as_object()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl<T: HostValue> HostValue for Vec<T> {
    fn kind(&self) -> HostKind {
        HostKind::Sequence
    }

    fn element_at(&self, index: usize) -> Option<&dyn HostValue> {
        self.get(index).map(|v| v as &dyn HostValue)
    }

    fn length(&self) -> usize {
        self.len()
    }
}

impl<T: HostValue> HostValue for BTreeMap<String, T> {
    fn kind(&self) -> HostKind {
        HostKind::Record
    }

    fn field_by_name(&self, name: &str) -> Option<&dyn HostValue> {
        self.get(name).map(|v| v as &dyn HostValue)
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn field_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

impl<T: HostValue> HostValue for HashMap<String, T> {
    fn kind(&self) -> HostKind {
        HostKind::Record
    }

    fn field_by_name(&self, name: &str) -> Option<&dyn HostValue> {
        self.get(name).map(|v| v as &dyn HostValue)
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn field_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

impl<T: HostValue> HostValue for Option<T> {
    fn kind(&self) -> HostKind {
        self.as_ref().map_or(HostKind::Null, HostValue::kind)
    }

    fn scalar(&self) -> Option<Value> {
        self.as_ref()?.scalar()
    }

    fn field_by_name(&self, name: &str) -> Option<&dyn HostValue> {
        self.as_ref()?.field_by_name(name)
    }

    fn element_at(&self, index: usize) -> Option<&dyn HostValue> {
        self.as_ref()?.element_at(index)
    }

    fn length(&self) -> usize {
        self.as_ref().map_or(0, HostValue::length)
    }

    fn field_names(&self) -> Vec<String> {
        self.as_ref().map(HostValue::field_names).unwrap_or_default()
    }
}

macro_rules! scalar_host {
    ($($ty:ty => |$v:ident| $convert:expr),* $(,)?) => {
        $(
            impl HostValue for $ty {
                fn kind(&self) -> HostKind {
                    HostKind::Scalar
                }

                fn scalar(&self) -> Option<Value> {
                    let $v = self;
                    Some($convert)
                }
            }
        )*
    };
}

scalar_host! {
    bool => |v| Value::Boolean(*v),
    i64 => |v| Value::Integer(*v),
    f64 => |v| Value::Float(*v),
    String => |v| Value::String(v.clone()),
    &str => |v| Value::String(v.to_string()),
}

#[test]
fn test_nested_host_materialises() {
    let mut record: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    record.insert("ids".into(), vec![1, 2]);

    let value = Value::from_host(&record, 8).unwrap();
    assert_eq!(value.to_string(), r#"{"ids":[1,2]}"#);
}

#[test]
fn test_depth_limit() {
    let nested = vec![vec![vec![1i64]]];
    assert!(Value::from_host(&nested, 3).is_ok());
    assert!(matches!(Value::from_host(&nested, 2), Err(EvalError::DepthExceeded(2))));
}
