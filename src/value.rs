//! The tagged-union value model every stage of the engine operates on.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Number as JsonNumber;

use crate::ast::Ast;
use crate::functions::Functions;

/// A value produced or consumed by the engine. Immutable after construction;
/// evaluation never mutates its input.
///
/// `Array` and `Object` hold `Rvalue` (`Rc<Value>`) elements so that
/// projections can share subtrees of the input instead of deep-cloning them.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Rvalue>),
    /// Insertion-ordered: iteration of values for projection yields values
    /// in that order.
    Object(IndexMap<String, Rvalue>),
    /// A first-class handle to an AST subtree plus the function registry it
    /// should evaluate against, produced by the `&expr` syntax.
    Expression(Expr),
}

/// Reference-counted `Value`, used for every array element and object value
/// so that sharing a subtree during a projection is a refcount bump, not a
/// clone of the underlying JSON tree.
pub type Rvalue = Rc<Value>;

/// An expression reference: an unevaluated AST node closing over the
/// function registry that was active when `&expr` was evaluated, so that a
/// `*_by` function invoking it later sees the same set of built-ins
/// (including any `fn_dispatcher` override).
#[derive(Clone)]
pub struct Expr {
    pub(crate) ast: Rc<Ast>,
    pub(crate) functions: Functions,
}

impl Expr {
    pub fn new(ast: Rc<Ast>, functions: Functions) -> Self {
        Expr { ast, functions }
    }

    /// Evaluates the captured AST against `data`.
    pub fn evaluate(&self, data: &Rvalue) -> Result<Rvalue, crate::error::RuntimeError> {
        crate::interpreter::eval(&self.ast, data, &self.functions, 0)
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expression({:?})", self.ast)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            // Object equality is unordered on keys, per spec: two objects
            // with the same key/value pairs in different orders are equal.
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).is_some_and(|bv| bv == v))
            }
            // Expressions are opaque; they're never compared for equality.
            _ => false,
        }
    }
}

impl Value {
    pub fn null() -> Rvalue {
        Rc::new(Value::Null)
    }

    pub fn bool(b: bool) -> Rvalue {
        Rc::new(Value::Bool(b))
    }

    pub fn number(n: f64) -> Rvalue {
        Rc::new(Value::Number(n))
    }

    pub fn string(s: impl Into<String>) -> Rvalue {
        Rc::new(Value::String(s.into()))
    }

    pub fn array(items: Vec<Rvalue>) -> Rvalue {
        Rc::new(Value::Array(items))
    }

    /// "Absent" and `Null` are the same value: a field lookup that would
    /// return nothing yields `Null`, never a distinct "undefined".
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Truthiness used by `or` and `[?...]` filters: `Null`, `false`, `""`,
    /// `[]`, and `{}` are falsy; everything else (including `0`) is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(_) => true,
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
            Value::Expression(_) => true,
        }
    }

    pub fn as_array(&self) -> Option<&[Rvalue]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Rvalue>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            Value::Expression(e) => Some(e),
            _ => None,
        }
    }

    /// The name `type(x)` returns for this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Expression(_) => "expression",
        }
    }

    /// Ordering used only by `sort`/`sort_by`/`max`/`min` over a single
    /// concrete element type (number or string); not a general `Ord`.
    pub fn partial_cmp_typed(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(|v| Rc::new(Value::from(v))).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Rc::new(Value::from(v))))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from(&json)
    }
}

/// Encodes a number the way JSON literals are written: whole-valued floats
/// (that fit an `i64`) as bare integers (`3`, not `3.0`), everything else
/// through `from_f64`.
fn json_number(n: f64) -> Option<JsonNumber> {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Some(JsonNumber::from(n as i64))
    } else {
        JsonNumber::from_f64(n)
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => json_number(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|v| serde_json::Value::from(&**v))
                    .collect(),
            ),
            Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(&**v)))
                    .collect(),
            ),
            Value::Expression(_) => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_json::Value::from(self))
    }
}
