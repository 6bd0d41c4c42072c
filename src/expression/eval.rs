use std::cmp::Ordering;

use regex::Regex;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};

use crate::{
    ast::{ExprNode, Operator},
    error::{CompileError, EvalError, Expected},
    evaluator::Evaluator,
    value::Value,
};

impl Evaluator<'_> {
    /// Evaluates an expression with `$` bound to `root` and `@` to
    /// `current`. Selectors re-enter the path evaluator.
    pub fn eval_expr(&self, node: &ExprNode, root: &Value, current: &Value) -> Result<Value, EvalError> {
        match node {
            ExprNode::Literal(lit) => Ok(lit.to_value()),
            ExprNode::Selector { query, .. } => self.apply(query.tokens(), root, current),
            ExprNode::Unary { op, arg } => {
                let value = self.eval_expr(arg, root, current)?;
                match op {
                    Operator::Not => Ok(Value::Boolean(!value.is_truthy())),
                    other => Err(EvalError::Compile(CompileError::UnsupportedOperator(
                        other.symbol().to_string(),
                    ))),
                }
            }
            ExprNode::Binary { op, left, right } => match op {
                Operator::And => {
                    let left = self.eval_expr(left, root, current)?;
                    if !left.is_truthy() {
                        return Ok(Value::Boolean(false));
                    }
                    let right = self.eval_expr(right, root, current)?;
                    Ok(Value::Boolean(right.is_truthy()))
                }
                Operator::Or => {
                    let left = self.eval_expr(left, root, current)?;
                    if left.is_truthy() {
                        return Ok(Value::Boolean(true));
                    }
                    let right = self.eval_expr(right, root, current)?;
                    Ok(Value::Boolean(right.is_truthy()))
                }
                _ => {
                    let left = self.eval_expr(left, root, current)?;
                    let right = self.eval_expr(right, root, current)?;
                    apply_binop(*op, &left, &right)
                }
            },
        }
    }
}

fn apply_binop(op: Operator, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        Operator::Eq => Ok(Value::Boolean(left.loose_eq(right))),
        Operator::Ne => Ok(Value::Boolean(!left.loose_eq(right))),
        Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
            let ordering = match (left, right) {
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => to_number(left)?.partial_cmp(&to_number(right)?),
            };
            // NaN compares false against everything
            let Some(ordering) = ordering else {
                return Ok(Value::Boolean(false));
            };
            let result = match op {
                Operator::Lt => ordering == Ordering::Less,
                Operator::Le => ordering != Ordering::Greater,
                Operator::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Boolean(result))
        }
        Operator::Regex => {
            let text = to_text(left)?;
            let pattern = to_text(right)?;
            let regex = compile_pattern(&pattern)?;
            Ok(Value::Boolean(regex.is_match(&text)))
        }
        Operator::Add => match (left, right) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
            _ => arithmetic(op, &to_numeric(left)?, &to_numeric(right)?),
        },
        Operator::Sub | Operator::Mul | Operator::Div | Operator::Pow => {
            arithmetic(op, &to_numeric(left)?, &to_numeric(right)?)
        }
        Operator::Mod => {
            let a = to_integer(left)?;
            let b = to_integer(right)?;
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            a.checked_rem(b)
                .map(Value::Integer)
                .ok_or_else(|| invalid(Expected::Integer, right))
        }
        Operator::And | Operator::Or | Operator::Not => Err(EvalError::Compile(
            CompileError::UnsupportedOperator(op.symbol().to_string()),
        )),
    }
}

/// Numeric arithmetic on integer or float operands.
///
/// Integer pairs stay integers unless they overflow. Anything involving a
/// float goes through `Decimal` and comes back as an integer when the result
/// is whole, so `100 * 1.1` is `110` rather than `110.00000000000001`.
fn arithmetic(op: Operator, left: &Value, right: &Value) -> Result<Value, EvalError> {
    if let (Value::Integer(a), Value::Integer(b)) = (left, right) {
        let exact = match op {
            Operator::Add => a.checked_add(*b),
            Operator::Sub => a.checked_sub(*b),
            Operator::Mul => a.checked_mul(*b),
            Operator::Div if *b == 0 => return Err(EvalError::DivisionByZero),
            Operator::Div => a.checked_rem(*b).filter(|r| *r == 0).and_then(|_| a.checked_div(*b)),
            Operator::Pow => u32::try_from(*b).ok().and_then(|exp| a.checked_pow(exp)),
            _ => None,
        };
        if let Some(n) = exact {
            return Ok(Value::Integer(n));
        }
    }

    let (a, b) = match (left.as_float(), right.as_float()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(invalid(Expected::Number, if left.is_number() { right } else { left })),
    };
    if op == Operator::Div && b == 0.0 {
        return Err(EvalError::DivisionByZero);
    }

    if op != Operator::Pow
        && let (Some(ad), Some(bd)) = (Decimal::from_f64(a), Decimal::from_f64(b))
    {
        let rd = match op {
            Operator::Add => ad.checked_add(bd),
            Operator::Sub => ad.checked_sub(bd),
            Operator::Mul => ad.checked_mul(bd),
            _ => ad.checked_div(bd),
        };
        if let Some(rd) = rd {
            if rd.is_integer()
                && let Some(r) = rd.to_i64()
            {
                return Ok(Value::Integer(r));
            } else if let Some(r) = rd.to_f64() {
                return Ok(Value::Float(r));
            }
        }
    }

    let result = match op {
        Operator::Add => a + b,
        Operator::Sub => a - b,
        Operator::Mul => a * b,
        Operator::Div => a / b,
        _ => a.powf(b),
    };
    Ok(Value::Float(result))
}

fn invalid(expected: Expected, found: &Value) -> EvalError {
    let expected = if matches!(found, Value::Null) { Expected::NonNil } else { expected };
    EvalError::InvalidArgument {
        expected,
        found: found.to_string(),
    }
}

/// Number coercion: numbers as-is, numeric strings parsed.
fn to_numeric(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Integer(_) | Value::Float(_) => Ok(value.clone()),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(Value::Integer)
                .or_else(|_| s.parse::<f64>().map(Value::Float))
                .map_err(|_| invalid(Expected::Number, value))
        }
        _ => Err(invalid(Expected::Number, value)),
    }
}

fn to_number(value: &Value) -> Result<f64, EvalError> {
    to_numeric(value)?
        .as_float()
        .ok_or_else(|| invalid(Expected::Number, value))
}

fn to_integer(value: &Value) -> Result<i64, EvalError> {
    to_numeric(value)?
        .as_int()
        .ok_or_else(|| invalid(Expected::Integer, value))
}

/// String coercion used by regex matching.
fn to_text(value: &Value) -> Result<String, EvalError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Err(invalid(Expected::String, value)),
        other => Ok(other.to_string()),
    }
}

/// Compiles a pattern, stripping optional `/.../` delimiters.
fn compile_pattern(pattern: &str) -> Result<Regex, EvalError> {
    let body = pattern
        .strip_prefix('/')
        .and_then(|p| p.strip_suffix('/'))
        .unwrap_or(pattern);
    Regex::new(body).map_err(|e| EvalError::InvalidRegex {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

#[test]
fn test_decimal_arithmetic_keeps_integers() {
    let result = arithmetic(Operator::Mul, &Value::Integer(100), &Value::Float(1.1)).unwrap();
    assert_eq!(result, Value::Integer(110));

    let result = arithmetic(Operator::Add, &Value::Float(0.1), &Value::Float(0.2)).unwrap();
    assert_eq!(result, Value::Float(0.3));

    let result = arithmetic(Operator::Div, &Value::Integer(7), &Value::Integer(2)).unwrap();
    assert_eq!(result, Value::Float(3.5));
}

#[test]
fn test_modulo_requires_integers() {
    let err = apply_binop(Operator::Mod, &Value::Float(7.5), &Value::Integer(2)).unwrap_err();
    assert!(matches!(err, EvalError::InvalidArgument { expected: Expected::Integer, .. }));
    assert_eq!(
        apply_binop(Operator::Mod, &Value::Integer(7), &Value::Integer(2)).unwrap(),
        Value::Integer(1)
    );
}

#[test]
fn test_regex_delimiters_and_malformed_pattern() {
    let matched = apply_binop(Operator::Regex, &Value::from("Nigel"), &Value::from("/^Ni/")).unwrap();
    assert_eq!(matched, Value::Boolean(true));

    let missed = apply_binop(Operator::Regex, &Value::from("Evelyn"), &Value::from("^Ni")).unwrap();
    assert_eq!(missed, Value::Boolean(false));

    let err = apply_binop(Operator::Regex, &Value::from("x"), &Value::from("/(/")).unwrap_err();
    assert!(matches!(err, EvalError::InvalidRegex { .. }));
}
