//! The built-in function registry. Each function is a small struct carrying
//! a `Signature`, in the same per-function shape as the teacher's extension
//! functions (`define_function!` + `impl Function`), minus the dependency on
//! an external crate's `Context`/`Variable` types — built-ins here operate
//! directly on this crate's `Rvalue`.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::value::{Rvalue, Value};

pub mod array;
pub mod math;
pub mod object;
pub mod string;
pub mod type_conv;
pub mod utility;

/// The type constraint a single argument position accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentType {
    Any,
    Number,
    String,
    Array,
    Object,
    Expression,
    /// `string` or `array` — accepted by `contains`, `length`, `reverse`.
    StringOrArray,
    /// An array whose elements are all numbers, all strings, or empty —
    /// accepted by `max`, `min`, `sort`.
    ArrayOfNumberOrString,
    /// An array whose elements are all numbers (empty allowed).
    ArrayOfNumber,
    /// An array whose elements are all strings (empty allowed).
    ArrayOfString,
}

impl ArgumentType {
    fn matches(self, value: &Value) -> bool {
        match self {
            ArgumentType::Any => true,
            ArgumentType::Number => matches!(value, Value::Number(_)),
            ArgumentType::String => matches!(value, Value::String(_)),
            ArgumentType::Array => matches!(value, Value::Array(_)),
            ArgumentType::Object => matches!(value, Value::Object(_)),
            ArgumentType::Expression => matches!(value, Value::Expression(_)),
            ArgumentType::StringOrArray => {
                matches!(value, Value::String(_) | Value::Array(_))
            }
            ArgumentType::ArrayOfNumberOrString => match value {
                Value::Array(items) => {
                    items.iter().all(|v| matches!(**v, Value::Number(_)))
                        || items.iter().all(|v| matches!(**v, Value::String(_)))
                }
                _ => false,
            },
            ArgumentType::ArrayOfNumber => match value {
                Value::Array(items) => items.iter().all(|v| matches!(**v, Value::Number(_))),
                _ => false,
            },
            ArgumentType::ArrayOfString => match value {
                Value::Array(items) => items.iter().all(|v| matches!(**v, Value::String(_))),
                _ => false,
            },
        }
    }

    fn name(self) -> &'static str {
        match self {
            ArgumentType::Any => "any",
            ArgumentType::Number => "number",
            ArgumentType::String => "string",
            ArgumentType::Array => "array",
            ArgumentType::Object => "object",
            ArgumentType::Expression => "expression",
            ArgumentType::StringOrArray => "string|array",
            ArgumentType::ArrayOfNumberOrString => "array[number]|array[string]",
            ArgumentType::ArrayOfNumber => "array[number]",
            ArgumentType::ArrayOfString => "array[string]",
        }
    }
}

/// How many arguments a function takes and what each position requires.
/// `variadic_tail`, if set, is the type every argument past the required
/// list must satisfy (there is no upper bound on how many may follow).
pub struct Signature {
    required: Vec<ArgumentType>,
    variadic_tail: Option<ArgumentType>,
}

impl Signature {
    pub fn new(required: Vec<ArgumentType>, variadic_tail: Option<ArgumentType>) -> Self {
        Signature {
            required,
            variadic_tail,
        }
    }

    pub fn validate(&self, name: &str, args: &[Rvalue]) -> Result<(), RuntimeError> {
        let min = self.required.len();
        if args.len() < min || (self.variadic_tail.is_none() && args.len() > min) {
            let expected = if self.variadic_tail.is_some() {
                format!("at least {min}")
            } else {
                min.to_string()
            };
            return Err(RuntimeError::InvalidArity {
                name: name.to_string(),
                expected,
                actual: args.len(),
            });
        }
        for (i, expected) in self.required.iter().enumerate() {
            if !expected.matches(&args[i]) {
                return Err(RuntimeError::InvalidType {
                    name: name.to_string(),
                    position: i + 1,
                    expected: expected.name().to_string(),
                    actual: args[i].type_name().to_string(),
                });
            }
        }
        if let Some(tail) = self.variadic_tail {
            for (i, arg) in args.iter().enumerate().skip(min) {
                if !tail.matches(arg) {
                    return Err(RuntimeError::InvalidType {
                        name: name.to_string(),
                        position: i + 1,
                        expected: tail.name().to_string(),
                        actual: arg.type_name().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// One built-in's implementation. Signature validation happens before
/// `evaluate` is called, via `Functions::call`.
pub trait Function {
    fn evaluate(&self, args: &[Rvalue]) -> Result<Rvalue, RuntimeError>;
}

/// Creates a per-function struct holding a `Signature` and a `new()`
/// constructor, matching the shape of the teacher's `define_function!`.
macro_rules! define_function {
    ($name:ident, $required:expr, $variadic_tail:expr) => {
        pub struct $name {
            signature: $crate::functions::Signature,
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            pub fn new() -> $name {
                $name {
                    signature: $crate::functions::Signature::new($required, $variadic_tail),
                }
            }
        }
    };
}
pub(crate) use define_function;

type Registry = HashMap<&'static str, Box<dyn Function>>;

/// The function registry an `Expr` closes over: cheaply cloneable (a shared
/// `Rc` underneath) so every `&expr` capture and every `runtime()` instance
/// can carry its own handle without re-registering the built-ins.
#[derive(Clone)]
pub struct Functions(Rc<Inner>);

struct Inner {
    builtins: Registry,
    dispatcher: Option<Dispatcher>,
}

/// A caller-supplied override consulted before the built-in table. Returning
/// `None` falls through to the built-ins; returning `Some` short-circuits.
pub type Dispatcher = Rc<dyn Fn(&str, &[Rvalue]) -> Option<Result<Rvalue, RuntimeError>>>;

impl Functions {
    pub fn new() -> Self {
        let mut builtins: Registry = HashMap::new();
        math::register(&mut builtins);
        array::register(&mut builtins);
        string::register(&mut builtins);
        object::register(&mut builtins);
        type_conv::register(&mut builtins);
        utility::register(&mut builtins);
        Functions(Rc::new(Inner {
            builtins,
            dispatcher: None,
        }))
    }

    /// Installs a custom dispatcher consulted before the built-in table,
    /// letting a caller override or extend individual function names.
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        let inner = Rc::make_mut(&mut self.0);
        inner.dispatcher = Some(dispatcher);
        self
    }

    pub fn call(&self, name: &str, args: &[Rvalue]) -> Result<Rvalue, RuntimeError> {
        if let Some(dispatcher) = &self.0.dispatcher {
            if let Some(result) = dispatcher(name, args) {
                return result;
            }
        }
        match self.0.builtins.get(name) {
            Some(f) => f.evaluate(args),
            None => Err(RuntimeError::UnknownFunction {
                name: name.to_string(),
            }),
        }
    }
}

impl Default for Functions {
    fn default() -> Self {
        Functions::new()
    }
}

// `Inner` isn't `Clone`; `with_dispatcher` only runs during setup before any
// other clone of this `Functions` has been taken, so `make_mut` never
// actually needs to deep-copy the registry in practice. Implementing `Clone`
// honestly (rebuilding the builtins) keeps `Rc::make_mut` sound either way.
impl Clone for Inner {
    fn clone(&self) -> Self {
        let mut builtins: Registry = HashMap::new();
        math::register(&mut builtins);
        array::register(&mut builtins);
        string::register(&mut builtins);
        object::register(&mut builtins);
        type_conv::register(&mut builtins);
        utility::register(&mut builtins);
        Inner {
            builtins,
            dispatcher: self.dispatcher.clone(),
        }
    }
}
