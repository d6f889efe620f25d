//! `length`, `not_null`.

use std::rc::Rc;

use super::{define_function, ArgumentType, Function, Registry};
use crate::error::RuntimeError;
use crate::value::{Rvalue, Value};

pub fn register(registry: &mut Registry) {
    registry.insert("length", Box::new(LengthFn::new()));
    registry.insert("not_null", Box::new(NotNullFn::new()));
}

define_function!(LengthFn, vec![ArgumentType::Any], None);

impl Function for LengthFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("length", args)?;
        let len = match &*args[0] {
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            other => {
                return Err(RuntimeError::InvalidType {
                    name: "length".to_string(),
                    position: 1,
                    expected: "string|array|object".to_string(),
                    actual: other.type_name().to_string(),
                })
            }
        };
        Ok(Value::number(len as f64))
    }
}

define_function!(NotNullFn, vec![ArgumentType::Any], Some(ArgumentType::Any));

impl Function for NotNullFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("not_null", args)?;
        Ok(args
            .iter()
            .find(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| Rc::new(Value::Null)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::Functions;

    #[test]
    fn length_counts_chars_items_and_keys() {
        let f = Functions::new();
        assert_eq!(
            f.call("length", &[Value::string("héllo")])
                .unwrap()
                .as_number(),
            Some(5.0)
        );
        let arr = Value::array(vec![Value::number(1.0), Value::number(2.0)]);
        assert_eq!(f.call("length", &[arr]).unwrap().as_number(), Some(2.0));
    }

    #[test]
    fn length_rejects_number() {
        let f = Functions::new();
        assert!(f.call("length", &[Value::number(1.0)]).is_err());
    }

    #[test]
    fn not_null_returns_first_non_null() {
        let f = Functions::new();
        let result = f
            .call(
                "not_null",
                &[
                    Rc::new(Value::Null),
                    Rc::new(Value::Null),
                    Value::number(4.0),
                ],
            )
            .unwrap();
        assert_eq!(result.as_number(), Some(4.0));
    }
}
