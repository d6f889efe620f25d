//! # jmespath
//!
//! A JMESPath query engine: a lexer, a Pratt-parsing parser, and a
//! tree-walking interpreter over a JSON-shaped value model.
//!
//! [JMESPath](https://jmespath.org) is a declarative expression language for
//! extracting and transforming subtrees of JSON-shaped data. An expression
//! like `people[?age > \`30\`].name` is parsed once into an AST and can then
//! be evaluated against any number of input values.
//!
//! # Quick Start
//!
//! ```rust
//! use jmespath::{Value, search};
//!
//! let data: Value = serde_json::json!({"people": [{"name": "a", "age": 1}]}).into();
//! let result = search("people[0].name", &data).unwrap();
//! assert_eq!(result.as_str(), Some("a"));
//! ```
//!
//! For repeated evaluation of the same expression string, prefer a
//! [`runtime`] instance, which caches the compiled AST:
//!
//! ```rust
//! use jmespath::{runtime, RuntimeOptions, Value};
//!
//! let rt = runtime(RuntimeOptions::default());
//! let data: Value = serde_json::json!({"a": 1}).into();
//! assert_eq!(rt.search("a", &data).unwrap().as_number(), Some(1.0));
//! ```
//!
//! # Pipeline
//!
//! `string → `[`lexer::tokenize`]` → [Token] → `[`parser::parse`]` → Ast →
//! eval(data) → Value`. Each stage is its own module:
//!
//! - [`lexer`] — character stream to token stream.
//! - [`parser`] — token stream to [`ast::Ast`] via Pratt (nud/led) parsing.
//! - [`interpreter`] — walks the AST against a [`Value`], consulting
//!   [`functions`] for built-in function calls.
//!
//! # Errors
//!
//! [`error::LexError`], [`error::ParseError`], and [`error::RuntimeError`]
//! are the three error families; [`error::Error`] unifies them for
//! [`search`]/[`Runtime::search`]. All three carry a 1-based source
//! position (0 for runtime errors, which don't originate in the source
//! text) and a human-readable message.

pub mod ast;
pub mod error;
pub mod functions;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod token;
pub mod value;

pub use ast::Ast;
pub use error::{Error, LexError, ParseError, RuntimeError};
pub use functions::Dispatcher;
pub use runtime::{runtime, Runtime, RuntimeOptions};
pub use token::{Token, TokenKind};
pub use value::{Rvalue, Value};

use std::rc::Rc;

/// Tokenizes `expr`, primarily useful for tests and tooling built on this
/// crate; [`parse`] and [`search`] already tokenize internally.
pub fn tokenize(expr: &str) -> Result<Vec<Token>, LexError> {
    lexer::tokenize(expr)
}

/// Parses `expr` into an AST.
pub fn parse(expr: &str) -> Result<Ast, ParseError> {
    parser::parse(expr)
}

/// Parses `expr` and evaluates it against `data` in one call. Prefer
/// [`runtime`] when evaluating the same expression string repeatedly, since
/// it caches the compiled AST across calls.
pub fn search(expr: &str, data: &Value) -> Result<Rvalue, Error> {
    let ast = parse(expr)?;
    let data = Rc::new(data.clone());
    Ok(interpreter::eval(
        &ast,
        &data,
        &functions::Functions::new(),
        0,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_projection() {
        let data: Value = serde_json::json!({"a": 1}).into();
        assert_eq!(*search("@", &data).unwrap(), data);
    }

    #[test]
    fn pipe_and_dot_agree_without_projections() {
        let data: Value = serde_json::json!({"a": {"b": "foo"}}).into();
        assert_eq!(
            search("a.b", &data).unwrap(),
            search("a | b", &data).unwrap()
        );
    }

    #[test]
    fn empty_expression_errors_at_position_one() {
        let err = parse("").unwrap_err();
        assert_eq!(err.pos, 1);
    }

    #[test]
    fn multi_level_projection_chain_applies_per_element() {
        let data: Value = serde_json::json!({"a": [{"b": {"c": 1}}, {"b": {"c": 2}}]}).into();
        let result = search("a[*].b.c", &data).unwrap();
        let values: Vec<f64> = result
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_number().unwrap())
            .collect();
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[test]
    fn concrete_scenarios_from_the_reference_table() {
        let data: Value = serde_json::json!({"a": [10, 20, 30]}).into();
        assert_eq!(search("a[1]", &data).unwrap().as_number(), Some(20.0));
        assert_eq!(search("a[-1]", &data).unwrap().as_number(), Some(30.0));

        let data: Value = serde_json::json!({"x": 1, "y": 2}).into();
        let keys = search("keys(@)", &data).unwrap();
        let keys: Vec<&str> = keys
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["x", "y"]);

        assert!(search("`null`", &Value::Null).unwrap().is_null());
    }
}
