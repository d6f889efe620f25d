//! `ends_with`, `starts_with`.

use super::{define_function, ArgumentType, Function, Registry};
use crate::error::RuntimeError;
use crate::value::{Rvalue, Value};

pub fn register(registry: &mut Registry) {
    registry.insert("ends_with", Box::new(EndsWithFn::new()));
    registry.insert("starts_with", Box::new(StartsWithFn::new()));
}

define_function!(
    EndsWithFn,
    vec![ArgumentType::String, ArgumentType::String],
    None
);

impl Function for EndsWithFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("ends_with", args)?;
        let haystack = args[0].as_str().unwrap();
        let suffix = args[1].as_str().unwrap();
        Ok(Value::bool(haystack.ends_with(suffix)))
    }
}

define_function!(
    StartsWithFn,
    vec![ArgumentType::String, ArgumentType::String],
    None
);

impl Function for StartsWithFn {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        self.signature.validate("starts_with", args)?;
        let haystack = args[0].as_str().unwrap();
        let prefix = args[1].as_str().unwrap();
        Ok(Value::bool(haystack.starts_with(prefix)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::Functions;

    #[test]
    fn prefix_and_suffix() {
        let f = Functions::new();
        assert_eq!(
            *f.call(
                "starts_with",
                &[Value::string("hello"), Value::string("he")]
            )
            .unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            *f.call("ends_with", &[Value::string("hello"), Value::string("lo")])
                .unwrap(),
            Value::Bool(true)
        );
    }
}
