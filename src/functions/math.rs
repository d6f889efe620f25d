//! `abs`, `avg`, `ceil`, `floor`, `sum`.

use std::rc::Rc;

use super::{define_function, ArgumentType, Function, Registry};
use crate::error::RuntimeError;
use crate::value::{Rvalue, Value};

pub fn register(registry: &mut Registry) {
    registry.insert("abs", Box::new(AbsFn::new()));
    registry.insert("avg", Box::new(AvgFn::new()));
    registry.insert("ceil", Box::new(CeilFn::new()));
    registry.insert("floor", Box::new(FloorFn::new()));
    registry.insert("sum", Box::new(SumFn::new()));
}

fn numbers(args: &[Rvalue]) -> Vec<f64> {
    args[0]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_number().unwrap())
        .collect()
}

define_function!(AbsFn, vec![ArgumentType::Number], None);

impl Function for AbsFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("abs", args)?;
        Ok(Value::number(args[0].as_number().unwrap().abs()))
    }
}

define_function!(AvgFn, vec![ArgumentType::ArrayOfNumber], None);

impl Function for AvgFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("avg", args)?;
        let ns = numbers(args);
        if ns.is_empty() {
            return Ok(Rc::new(Value::Null));
        }
        Ok(Value::number(ns.iter().sum::<f64>() / ns.len() as f64))
    }
}

define_function!(CeilFn, vec![ArgumentType::Number], None);

impl Function for CeilFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("ceil", args)?;
        Ok(Value::number(args[0].as_number().unwrap().ceil()))
    }
}

define_function!(FloorFn, vec![ArgumentType::Number], None);

impl Function for FloorFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("floor", args)?;
        Ok(Value::number(args[0].as_number().unwrap().floor()))
    }
}

define_function!(SumFn, vec![ArgumentType::ArrayOfNumber], None);

impl Function for SumFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("sum", args)?;
        Ok(Value::number(numbers(args).iter().sum()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::Functions;

    #[test]
    fn abs_ceil_floor() {
        let f = Functions::new();
        assert_eq!(
            f.call("abs", &[Value::number(-3.0)]).unwrap().as_number(),
            Some(3.0)
        );
        assert_eq!(
            f.call("ceil", &[Value::number(1.2)]).unwrap().as_number(),
            Some(2.0)
        );
        assert_eq!(
            f.call("floor", &[Value::number(1.8)]).unwrap().as_number(),
            Some(1.0)
        );
    }

    #[test]
    fn sum_and_avg() {
        let f = Functions::new();
        let arr = Value::array(vec![
            Value::number(1.0),
            Value::number(2.0),
            Value::number(3.0),
        ]);
        assert_eq!(
            f.call("sum", &[arr.clone()]).unwrap().as_number(),
            Some(6.0)
        );
        assert_eq!(f.call("avg", &[arr]).unwrap().as_number(), Some(2.0));
    }

    #[test]
    fn avg_of_empty_is_null() {
        let f = Functions::new();
        let result = f.call("avg", &[Value::array(vec![])]).unwrap();
        assert!(result.is_null());
    }
}
