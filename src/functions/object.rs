//! `keys`, `values`.

use super::{define_function, ArgumentType, Function, Registry};
use crate::error::RuntimeError;
use crate::value::{Rvalue, Value};

pub fn register(registry: &mut Registry) {
    registry.insert("keys", Box::new(KeysFn::new()));
    registry.insert("values", Box::new(ValuesFn::new()));
}

define_function!(KeysFn, vec![ArgumentType::Object], None);

impl Function for KeysFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("keys", args)?;
        let keys = args[0]
            .as_object()
            .unwrap()
            .keys()
            .map(|k| Value::string(k.clone()))
            .collect();
        Ok(Value::array(keys))
    }
}

define_function!(ValuesFn, vec![ArgumentType::Object], None);

impl Function for ValuesFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("values", args)?;
        let values = args[0].as_object().unwrap().values().cloned().collect();
        Ok(Value::array(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::Functions;
    use indexmap::IndexMap;
    use std::rc::Rc;

    #[test]
    fn keys_and_values_preserve_order() {
        let f = Functions::new();
        let mut map = IndexMap::new();
        map.insert("b".to_string(), Value::number(1.0));
        map.insert("a".to_string(), Value::number(2.0));
        let obj = Rc::new(Value::Object(map));

        let keys = f.call("keys", &[obj.clone()]).unwrap();
        let keys: Vec<&str> = keys
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["b", "a"]);

        let values = f.call("values", &[obj]).unwrap();
        let values: Vec<f64> = values
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_number().unwrap())
            .collect();
        assert_eq!(values, vec![1.0, 2.0]);
    }
}
