//! A bound, cached entry point: compiling the same expression string twice
//! reuses the AST, and a custom function dispatcher can be installed to
//! override or extend the built-ins.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::Ast;
use crate::error::{Error, ParseError};
use crate::functions::{Dispatcher, Functions};
use crate::interpreter;
use crate::parser;
use crate::value::{Rvalue, Value};

/// Tuning knobs for a `Runtime`. `cache_capacity` bounds the compiled-AST
/// cache; once full, the whole cache resets rather than evicting piecemeal
/// (a compiled expression is cheap to reproduce, and a full reset avoids
/// tracking per-entry recency for a cache meant to catch repeated literal
/// expression strings, not approximate a general-purpose LRU).
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    pub cache_capacity: usize,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        RuntimeOptions {
            cache_capacity: 1024,
        }
    }
}

pub struct Runtime {
    functions: Functions,
    cache: RefCell<HashMap<String, Rc<Ast>>>,
    cache_capacity: usize,
}

/// Builds a `Runtime` with the given options and the default function set.
pub fn runtime(options: RuntimeOptions) -> Runtime {
    Runtime::new(options)
}

impl Runtime {
    pub fn new(options: RuntimeOptions) -> Self {
        Runtime {
            functions: Functions::new(),
            cache: RefCell::new(HashMap::new()),
            cache_capacity: options.cache_capacity.max(1),
        }
    }

    /// Installs a dispatcher consulted before the built-in functions for
    /// every expression this runtime evaluates.
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.functions = self.functions.with_dispatcher(dispatcher);
        self
    }

    /// Compiles `expr`, reusing a cached AST when this exact string has been
    /// compiled before.
    pub fn compile(&self, expr: &str) -> Result<Rc<Ast>, ParseError> {
        if let Some(cached) = self.cache.borrow().get(expr) {
            return Ok(cached.clone());
        }
        let ast = Rc::new(parser::parse(expr)?);
        let mut cache = self.cache.borrow_mut();
        if cache.len() >= self.cache_capacity {
            cache.clear();
        }
        cache.insert(expr.to_string(), ast.clone());
        Ok(ast)
    }

    pub fn search(&self, expr: &str, data: &Value) -> Result<Rvalue, Error> {
        let ast = self.compile(expr)?;
        let data = Rc::new(data.clone());
        Ok(interpreter::eval(&ast, &data, &self.functions, 0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caches_repeated_expressions() {
        let rt = Runtime::new(RuntimeOptions::default());
        let data: serde_json::Value = serde_json::from_str(r#"{"a":1}"#).unwrap();
        let data = Value::from(&data);
        assert_eq!(rt.search("a", &data).unwrap().as_number(), Some(1.0));
        assert_eq!(rt.cache.borrow().len(), 1);
        assert_eq!(rt.search("a", &data).unwrap().as_number(), Some(1.0));
        assert_eq!(rt.cache.borrow().len(), 1);
    }

    #[test]
    fn cache_resets_once_capacity_is_reached() {
        let rt = Runtime::new(RuntimeOptions { cache_capacity: 2 });
        let data: serde_json::Value = serde_json::from_str(r#"{"a":1}"#).unwrap();
        let data = Value::from(&data);
        rt.search("a", &data).unwrap();
        rt.search("b", &data).unwrap();
        assert_eq!(rt.cache.borrow().len(), 2);
        rt.search("c", &data).unwrap();
        assert_eq!(rt.cache.borrow().len(), 1);
    }

    #[test]
    fn custom_dispatcher_overrides_builtins() {
        let rt = Runtime::new(RuntimeOptions::default()).with_dispatcher(Rc::new(
            |name: &str, _args: &[Rvalue]| {
                if name == "length" {
                    Some(Ok(Value::number(42.0)))
                } else {
                    None
                }
            },
        ));
        let data = Value::Null;
        assert_eq!(
            rt.search("length(@)", &data).unwrap().as_number(),
            Some(42.0)
        );
    }
}
