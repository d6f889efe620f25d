//! `to_number`, `to_string`, `type`.

use std::rc::Rc;

use super::{define_function, ArgumentType, Function, Registry};
use crate::error::RuntimeError;
use crate::value::{Rvalue, Value};

pub fn register(registry: &mut Registry) {
    registry.insert("to_number", Box::new(ToNumberFn::new()));
    registry.insert("to_string", Box::new(ToStringFn::new()));
    registry.insert("type", Box::new(TypeFn::new()));
}

define_function!(ToNumberFn, vec![ArgumentType::Any], None);

impl Function for ToNumberFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("to_number", args)?;
        match &*args[0] {
            Value::Number(_) => Ok(args[0].clone()),
            Value::String(s) => match s.parse::<f64>() {
                Ok(n) => Ok(Value::number(n)),
                Err(_) => Ok(Rc::new(Value::Null)),
            },
            _ => Ok(Rc::new(Value::Null)),
        }
    }
}

define_function!(ToStringFn, vec![ArgumentType::Any], None);

impl Function for ToStringFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("to_string", args)?;
        match &*args[0] {
            Value::String(_) => Ok(args[0].clone()),
            other => Ok(Value::string(other.to_string())),
        }
    }
}

define_function!(TypeFn, vec![ArgumentType::Any], None);

impl Function for TypeFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("type", args)?;
        Ok(Value::string(args[0].type_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::Functions;

    #[test]
    fn type_names() {
        let f = Functions::new();
        assert_eq!(
            f.call("type", &[Value::number(1.0)]).unwrap().as_str(),
            Some("number")
        );
        assert_eq!(
            f.call("type", &[Value::string("x")]).unwrap().as_str(),
            Some("string")
        );
        assert_eq!(
            f.call("type", &[Rc::new(Value::Null)]).unwrap().as_str(),
            Some("null")
        );
    }

    #[test]
    fn to_number_parses_or_nulls() {
        let f = Functions::new();
        assert_eq!(
            f.call("to_number", &[Value::string("3.5")])
                .unwrap()
                .as_number(),
            Some(3.5)
        );
        assert!(f
            .call("to_number", &[Value::string("nope")])
            .unwrap()
            .is_null());
    }

    #[test]
    fn to_string_passes_through_strings() {
        let f = Functions::new();
        let s = Value::string("x");
        assert_eq!(f.call("to_string", &[s.clone()]).unwrap(), s);
        assert_eq!(
            f.call("to_string", &[Value::number(3.0)]).unwrap().as_str(),
            Some("3")
        );
    }
}
