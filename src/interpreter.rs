//! Tree-walking evaluator. One exhaustive `match` over `Ast`, so adding a
//! variant without handling it here is a compile error rather than a
//! silently-wrong result.

use std::rc::Rc;

use crate::ast::{Ast, Comparator};
use crate::error::RuntimeError;
use crate::functions::Functions;
use crate::value::{Expr, Rvalue, Value};

const MAX_EVAL_DEPTH: usize = 200;

pub fn eval(
    ast: &Ast,
    data: &Rvalue,
    functions: &Functions,
    depth: usize,
) -> Result<Rvalue, RuntimeError> {
    if depth > MAX_EVAL_DEPTH {
        return Err(RuntimeError::TooDeep);
    }
    match ast {
        Ast::Current => Ok(data.clone()),
        Ast::Literal(v) => Ok(v.clone()),
        Ast::Field(name) => Ok(field(data, name)),
        Ast::Index(n) => Ok(index(data, *n)),
        Ast::Slice { start, stop, step } => slice(data, *start, *stop, *step),
        Ast::Expref(inner) => Ok(Rc::new(Value::Expression(Expr::new(
            Rc::new((**inner).clone()),
            functions.clone(),
        )))),
        Ast::Subexpression(left, right) | Ast::Pipe(left, right) => {
            let lv = eval(left, data, functions, depth + 1)?;
            eval(right, &lv, functions, depth + 1)
        }
        Ast::Or(left, right) => {
            let lv = eval(left, data, functions, depth + 1)?;
            if lv.is_truthy() {
                Ok(lv)
            } else {
                eval(right, data, functions, depth + 1)
            }
        }
        Ast::And(left, right) => {
            let lv = eval(left, data, functions, depth + 1)?;
            if !lv.is_truthy() {
                Ok(lv)
            } else {
                eval(right, data, functions, depth + 1)
            }
        }
        Ast::Not(inner) => {
            let v = eval(inner, data, functions, depth + 1)?;
            Ok(Value::bool(!v.is_truthy()))
        }
        Ast::Flatten(inner) => {
            let v = eval(inner, data, functions, depth + 1)?;
            Ok(match &*v {
                Value::Array(items) => {
                    let mut flat = Vec::with_capacity(items.len());
                    for item in items {
                        match &**item {
                            Value::Array(nested) => flat.extend(nested.iter().cloned()),
                            _ => flat.push(item.clone()),
                        }
                    }
                    Value::array(flat)
                }
                _ => Rc::new(Value::Null),
            })
        }
        Ast::ArrayProjection(left, right) => {
            let lv = eval(left, data, functions, depth + 1)?;
            match &*lv {
                Value::Array(items) => {
                    let mut results = Vec::new();
                    for item in items {
                        let projected = eval(right, item, functions, depth + 1)?;
                        if !projected.is_null() {
                            results.push(projected);
                        }
                    }
                    Ok(Value::array(results))
                }
                _ => Ok(Rc::new(Value::Null)),
            }
        }
        Ast::ObjectProjection(left, right) => {
            let lv = eval(left, data, functions, depth + 1)?;
            match &*lv {
                Value::Object(map) => {
                    let mut results = Vec::new();
                    for value in map.values() {
                        let projected = eval(right, value, functions, depth + 1)?;
                        if !projected.is_null() {
                            results.push(projected);
                        }
                    }
                    Ok(Value::array(results))
                }
                _ => Ok(Rc::new(Value::Null)),
            }
        }
        Ast::Comparator(op, left, right) => {
            let lv = eval(left, data, functions, depth + 1)?;
            let rv = eval(right, data, functions, depth + 1)?;
            Ok(compare(*op, &lv, &rv))
        }
        Ast::Condition(predicate, then) => {
            let pv = eval(predicate, data, functions, depth + 1)?;
            if pv.is_truthy() {
                eval(then, data, functions, depth + 1)
            } else {
                Ok(Rc::new(Value::Null))
            }
        }
        Ast::MultiSelectList(items) => {
            if data.is_null() {
                return Ok(Rc::new(Value::Null));
            }
            let values = items
                .iter()
                .map(|item| eval(item, data, functions, depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::array(values))
        }
        Ast::MultiSelectHash(pairs) => {
            if data.is_null() {
                return Ok(Rc::new(Value::Null));
            }
            let mut map = indexmap::IndexMap::new();
            for (key, value_ast) in pairs {
                let value = eval(value_ast, data, functions, depth + 1)?;
                map.insert(key.clone(), value);
            }
            Ok(Rc::new(Value::Object(map)))
        }
        Ast::Function(name, arg_asts) => {
            let args = arg_asts
                .iter()
                .map(|a| eval(a, data, functions, depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            functions.call(name, &args)
        }
    }
}

fn field(data: &Rvalue, name: &str) -> Rvalue {
    match &**data {
        Value::Object(map) => map
            .get(name)
            .cloned()
            .unwrap_or_else(|| Rc::new(Value::Null)),
        _ => Rc::new(Value::Null),
    }
}

fn index(data: &Rvalue, n: i64) -> Rvalue {
    match &**data {
        Value::Array(items) => {
            let len = items.len() as i64;
            let idx = if n < 0 { n + len } else { n };
            if idx >= 0 && idx < len {
                items[idx as usize].clone()
            } else {
                Rc::new(Value::Null)
            }
        }
        _ => Rc::new(Value::Null),
    }
}

fn slice(
    data: &Rvalue,
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
) -> Result<Rvalue, RuntimeError> {
    let items = match &**data {
        Value::Array(items) => items,
        _ => return Ok(Rc::new(Value::Null)),
    };
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err(RuntimeError::InvalidSliceStep);
    }
    let len = items.len() as i64;
    let (mut cursor, stop) = slice_bounds(len, start, stop, step);
    let mut result = Vec::new();
    if step > 0 {
        while cursor < stop {
            result.push(items[cursor as usize].clone());
            cursor += step;
        }
    } else {
        while cursor > stop {
            result.push(items[cursor as usize].clone());
            cursor += step;
        }
    }
    Ok(Value::array(result))
}

/// Resolves `start`/`stop` (possibly negative, possibly absent) into
/// concrete bounds, the same way Python's `slice.indices()` does.
fn slice_bounds(len: i64, start: Option<i64>, stop: Option<i64>, step: i64) -> (i64, i64) {
    if step > 0 {
        let start = match start {
            None => 0,
            Some(s) if s < 0 => (s + len).max(0),
            Some(s) => s.min(len),
        };
        let stop = match stop {
            None => len,
            Some(s) if s < 0 => (s + len).max(0),
            Some(s) => s.min(len),
        };
        (start, stop)
    } else {
        let start = match start {
            None => len - 1,
            Some(s) if s < 0 => (s + len).max(-1),
            Some(s) => s.min(len - 1),
        };
        let stop = match stop {
            None => -1,
            Some(s) if s < 0 => (s + len).max(-1),
            Some(s) => s.min(len - 1),
        };
        (start, stop)
    }
}

fn compare(op: Comparator, l: &Value, r: &Value) -> Rvalue {
    match op {
        Comparator::Eq => Value::bool(l == r),
        Comparator::Ne => Value::bool(l != r),
        _ => match (l, r) {
            (Value::Number(a), Value::Number(b)) => {
                let result = match op {
                    Comparator::Lt => a < b,
                    Comparator::Lte => a <= b,
                    Comparator::Gt => a > b,
                    Comparator::Gte => a >= b,
                    Comparator::Eq | Comparator::Ne => unreachable!(),
                };
                Value::bool(result)
            }
            _ => Rc::new(Value::Null),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn run(expr: &str, data: &str) -> Rvalue {
        let ast = parse(expr).unwrap();
        let data: serde_json::Value = serde_json::from_str(data).unwrap();
        let data = Rc::new(Value::from(&data));
        eval(&ast, &data, &Functions::new(), 0).unwrap()
    }

    #[test]
    fn field_and_dot_chain() {
        let v = run("a.b", r#"{"a":{"b":1}}"#);
        assert_eq!(v.as_number(), Some(1.0));
    }

    #[test]
    fn missing_field_is_null() {
        let v = run("a.missing", r#"{"a":{}}"#);
        assert!(v.is_null());
    }

    #[test]
    fn negative_index() {
        let v = run("[-1]", "[1,2,3]");
        assert_eq!(v.as_number(), Some(3.0));
    }

    #[test]
    fn slice_reverse() {
        let v = run("[::-1]", "[1,2,3]");
        let items: Vec<f64> = v
            .as_array()
            .unwrap()
            .iter()
            .map(|x| x.as_number().unwrap())
            .collect();
        assert_eq!(items, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn slice_with_bounds() {
        let v = run("[1:-1]", "[1,2,3,4]");
        let items: Vec<f64> = v
            .as_array()
            .unwrap()
            .iter()
            .map(|x| x.as_number().unwrap())
            .collect();
        assert_eq!(items, vec![2.0, 3.0]);
    }

    #[test]
    fn array_projection_filters_nulls() {
        let v = run(
            "people[*].age",
            r#"{"people":[{"age":1},{"name":"x"},{"age":3}]}"#,
        );
        let items: Vec<f64> = v
            .as_array()
            .unwrap()
            .iter()
            .map(|x| x.as_number().unwrap())
            .collect();
        assert_eq!(items, vec![1.0, 3.0]);
    }

    #[test]
    fn flatten_merges_one_level() {
        let v = run("[]", "[[1,2],[3],4]");
        let items: Vec<f64> = v
            .as_array()
            .unwrap()
            .iter()
            .map(|x| x.as_number().unwrap())
            .collect();
        assert_eq!(items, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn pipe_closes_projection_before_index() {
        let v = run("people[*].age | [0]", r#"{"people":[{"age":1},{"age":2}]}"#);
        assert_eq!(v.as_number(), Some(1.0));
    }

    #[test]
    fn or_falls_through_on_falsy() {
        assert_eq!(run("a || b", r#"{"a":null,"b":2}"#).as_number(), Some(2.0));
        assert_eq!(run("a || b", r#"{"a":1,"b":2}"#).as_number(), Some(1.0));
    }

    #[test]
    fn filter_keeps_matching_elements() {
        let v = run(
            "people[?age > `1`].name",
            r#"{"people":[{"age":1,"name":"a"},{"age":2,"name":"b"}]}"#,
        );
        let items: Vec<&str> = v
            .as_array()
            .unwrap()
            .iter()
            .map(|x| x.as_str().unwrap())
            .collect();
        assert_eq!(items, vec!["b"]);
    }

    #[test]
    fn multi_select_hash_and_list() {
        let v = run("{a: x, b: y}", r#"{"x":1,"y":2}"#);
        let obj = v.as_object().unwrap();
        assert_eq!(obj.get("a").unwrap().as_number(), Some(1.0));
        assert_eq!(obj.get("b").unwrap().as_number(), Some(2.0));

        let v = run("[x, y]", r#"{"x":1,"y":2}"#);
        let items: Vec<f64> = v
            .as_array()
            .unwrap()
            .iter()
            .map(|x| x.as_number().unwrap())
            .collect();
        assert_eq!(items, vec![1.0, 2.0]);
    }

    #[test]
    fn multi_select_on_null_is_null() {
        let v = run("missing.[a, b]", r#"{}"#);
        assert!(v.is_null());
    }

    #[test]
    fn function_call_dispatches() {
        let v = run("length(people)", r#"{"people":[1,2,3]}"#);
        assert_eq!(v.as_number(), Some(3.0));
    }

    #[test]
    fn sort_by_uses_expref() {
        let v = run(
            "sort_by(people, &age)[*].name",
            r#"{"people":[{"age":2,"name":"b"},{"age":1,"name":"a"}]}"#,
        );
        let items: Vec<&str> = v
            .as_array()
            .unwrap()
            .iter()
            .map(|x| x.as_str().unwrap())
            .collect();
        assert_eq!(items, vec!["a", "b"]);
    }

    #[test]
    fn invalid_slice_step_errors() {
        let ast = parse("[::0]").unwrap();
        let data = Rc::new(Value::Array(vec![]));
        let err = eval(&ast, &data, &Functions::new(), 0).unwrap_err();
        assert_eq!(err, RuntimeError::InvalidSliceStep);
    }

    #[test]
    fn unknown_function_errors() {
        let ast = parse("nope(@)").unwrap();
        let data = Rc::new(Value::Null);
        let err = eval(&ast, &data, &Functions::new(), 0).unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownFunction { .. }));
    }
}
