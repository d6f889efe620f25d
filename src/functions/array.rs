//! `contains`, `join`, `map`, `max`, `max_by`, `min`, `min_by`,
//! `reverse`, `sort`, `sort_by`, `to_array`.

use std::cmp::Ordering;
use std::rc::Rc;

use super::{define_function, ArgumentType, Function, Registry};
use crate::error::RuntimeError;
use crate::value::{Rvalue, Value};

pub fn register(registry: &mut Registry) {
    registry.insert("contains", Box::new(ContainsFn::new()));
    registry.insert("join", Box::new(JoinFn::new()));
    registry.insert("map", Box::new(MapFn::new()));
    registry.insert("max", Box::new(MaxFn::new()));
    registry.insert("max_by", Box::new(MaxByFn::new()));
    registry.insert("min", Box::new(MinFn::new()));
    registry.insert("min_by", Box::new(MinByFn::new()));
    registry.insert("reverse", Box::new(ReverseFn::new()));
    registry.insert("sort", Box::new(SortFn::new()));
    registry.insert("sort_by", Box::new(SortByFn::new()));
    registry.insert("to_array", Box::new(ToArrayFn::new()));
}

define_function!(
    ContainsFn,
    vec![ArgumentType::StringOrArray, ArgumentType::Any],
    None
);

impl Function for ContainsFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("contains", args)?;
        let found = match &*args[0] {
            Value::Array(items) => items.iter().any(|v| **v == *args[1]),
            Value::String(s) => match args[1].as_str() {
                Some(needle) => s.contains(needle),
                None => false,
            },
            _ => unreachable!("validated as string|array"),
        };
        Ok(Value::bool(found))
    }
}

define_function!(
    JoinFn,
    vec![ArgumentType::String, ArgumentType::ArrayOfString],
    None
);

impl Function for JoinFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("join", args)?;
        let glue = args[0].as_str().unwrap();
        let parts: Vec<&str> = args[1]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        Ok(Value::string(parts.join(glue)))
    }
}

define_function!(
    MapFn,
    vec![ArgumentType::Expression, ArgumentType::Array],
    None
);

impl Function for MapFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("map", args)?;
        let expr = args[0].as_expr().unwrap();
        let items = args[1].as_array().unwrap();
        let mapped = items
            .iter()
            .map(|item| expr.evaluate(item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::array(mapped))
    }
}

define_function!(MaxFn, vec![ArgumentType::ArrayOfNumberOrString], None);

impl Function for MaxFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("max", args)?;
        extreme(args[0].as_array().unwrap(), Ordering::Greater)
    }
}

define_function!(
    MaxByFn,
    vec![ArgumentType::Array, ArgumentType::Expression],
    None
);

impl Function for MaxByFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("max_by", args)?;
        extreme_by(
            args[0].as_array().unwrap(),
            args[1].as_expr().unwrap(),
            Ordering::Greater,
        )
    }
}

define_function!(MinFn, vec![ArgumentType::ArrayOfNumberOrString], None);

impl Function for MinFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("min", args)?;
        extreme(args[0].as_array().unwrap(), Ordering::Less)
    }
}

define_function!(
    MinByFn,
    vec![ArgumentType::Array, ArgumentType::Expression],
    None
);

impl Function for MinByFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("min_by", args)?;
        extreme_by(
            args[0].as_array().unwrap(),
            args[1].as_expr().unwrap(),
            Ordering::Less,
        )
    }
}

define_function!(ReverseFn, vec![ArgumentType::StringOrArray], None);

impl Function for ReverseFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("reverse", args)?;
        match &*args[0] {
            Value::Array(items) => {
                let mut reversed = items.clone();
                reversed.reverse();
                Ok(Value::array(reversed))
            }
            Value::String(s) => Ok(Value::string(s.chars().rev().collect::<String>())),
            _ => unreachable!("validated as string|array"),
        }
    }
}

define_function!(SortFn, vec![ArgumentType::ArrayOfNumberOrString], None);

impl Function for SortFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("sort", args)?;
        let mut items = args[0].as_array().unwrap().to_vec();
        items.sort_by(|a, b| a.partial_cmp_typed(b).unwrap_or(Ordering::Equal));
        Ok(Value::array(items))
    }
}

define_function!(
    SortByFn,
    vec![ArgumentType::Array, ArgumentType::Expression],
    None
);

impl Function for SortByFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("sort_by", args)?;
        let expr = args[1].as_expr().unwrap();
        let items = args[0].as_array().unwrap();
        let mut keyed: Vec<(Rvalue, Rvalue)> = items
            .iter()
            .map(|item| expr.evaluate(item).map(|key| (key, item.clone())))
            .collect::<Result<_, _>>()?;
        for (key, _) in &keyed {
            if !matches!(**key, Value::Number(_) | Value::String(_)) {
                return Err(RuntimeError::InvalidType {
                    name: "sort_by".to_string(),
                    position: 2,
                    expected: "number|string".to_string(),
                    actual: key.type_name().to_string(),
                });
            }
        }
        keyed.sort_by(|(a, _), (b, _)| a.partial_cmp_typed(b).unwrap_or(Ordering::Equal));
        Ok(Value::array(keyed.into_iter().map(|(_, v)| v).collect()))
    }
}

define_function!(ToArrayFn, vec![ArgumentType::Any], None);

impl Function for ToArrayFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("to_array", args)?;
        match &*args[0] {
            Value::Array(_) => Ok(args[0].clone()),
            _ => Ok(Value::array(vec![args[0].clone()])),
        }
    }
}

fn extreme(items: &[Rvalue], want: Ordering) -> Result<Rvalue, RuntimeError> {
    let mut best: Option<&Rvalue> = None;
    for item in items {
        best = match best {
            None => Some(item),
            Some(current) => {
                if item.partial_cmp_typed(current) == Some(want) {
                    Some(item)
                } else {
                    Some(current)
                }
            }
        };
    }
    Ok(best.cloned().unwrap_or_else(|| Rc::new(Value::Null)))
}

fn extreme_by(
    items: &[Rvalue],
    expr: &crate::value::Expr,
    want: Ordering,
) -> Result<Rvalue, RuntimeError> {
    let mut best: Option<(Rvalue, Rvalue)> = None;
    for item in items {
        let key = expr.evaluate(item)?;
        if !matches!(*key, Value::Number(_) | Value::String(_)) {
            return Err(RuntimeError::InvalidType {
                name: "max_by/min_by".to_string(),
                position: 2,
                expected: "number|string".to_string(),
                actual: key.type_name().to_string(),
            });
        }
        best = match best {
            None => Some((key, item.clone())),
            Some((best_key, best_item)) => {
                if key.partial_cmp_typed(&best_key) == Some(want) {
                    Some((key, item.clone()))
                } else {
                    Some((best_key, best_item))
                }
            }
        };
    }
    Ok(best.map(|(_, v)| v).unwrap_or_else(|| Rc::new(Value::Null)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::Functions;

    #[test]
    fn contains_array_and_string() {
        let f = Functions::new();
        let arr = Value::array(vec![Value::number(1.0), Value::string("x")]);
        let result = f.call("contains", &[arr, Value::string("x")]).unwrap();
        assert_eq!(*result, Value::Bool(true));

        let s = Value::string("hello world");
        let result = f.call("contains", &[s, Value::string("world")]).unwrap();
        assert_eq!(*result, Value::Bool(true));
    }

    #[test]
    fn join_requires_string_elements() {
        let f = Functions::new();
        let arr = Value::array(vec![Value::string("a"), Value::string("b")]);
        let result = f.call("join", &[Value::string(", "), arr]).unwrap();
        assert_eq!(result.as_str(), Some("a, b"));
    }

    #[test]
    fn max_and_min() {
        let f = Functions::new();
        let arr = Value::array(vec![
            Value::number(3.0),
            Value::number(1.0),
            Value::number(2.0),
        ]);
        assert_eq!(
            f.call("max", &[arr.clone()]).unwrap().as_number(),
            Some(3.0)
        );
        assert_eq!(f.call("min", &[arr]).unwrap().as_number(), Some(1.0));
    }

    #[test]
    fn sort_is_stable_ascending() {
        let f = Functions::new();
        let arr = Value::array(vec![Value::string("b"), Value::string("a")]);
        let sorted = f.call("sort", &[arr]).unwrap();
        let items = sorted.as_array().unwrap();
        assert_eq!(items[0].as_str(), Some("a"));
        assert_eq!(items[1].as_str(), Some("b"));
    }

    #[test]
    fn to_array_wraps_non_arrays() {
        let f = Functions::new();
        let wrapped = f.call("to_array", &[Value::number(5.0)]).unwrap();
        assert_eq!(wrapped.as_array().unwrap().len(), 1);
        let arr = Value::array(vec![Value::number(1.0)]);
        let passthrough = f.call("to_array", &[arr.clone()]).unwrap();
        assert_eq!(passthrough, arr);
    }
}
