//! Abstract syntax tree produced by the parser and walked by the
//! interpreter. A tagged-union match, not a string-keyed visitor dispatch:
//! every variant below is exhaustively handled in `interpreter::eval`, so a
//! missing arm is a compile error rather than a silent no-op.

use crate::value::Rvalue;

/// `==`, `!=`, `<`, `<=`, `>`, `>=`. `<`/`<=`/`>`/`>=` are only defined
/// between two numbers; any other pairing evaluates to `Null`, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// `@`
    Current,
    /// A literal produced by backtick syntax or a JSON literal token.
    Literal(Rvalue),
    /// `foo`, `"foo"` — an object-key lookup against the current node.
    Field(String),
    /// `[n]` — an array index, negative indices counted from the end.
    Index(i64),
    /// `[start:stop:step]`, any part optional.
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },
    /// `&expr` — an expression reference.
    Expref(Box<Ast>),
    /// `a.b`, and also the desugaring of `.[a,b]` and `[idx]` postfix access.
    Subexpression(Box<Ast>, Box<Ast>),
    /// `a | b` — closes any open projection; `b` sees the whole value `a`
    /// produced, not a per-element stream.
    Pipe(Box<Ast>, Box<Ast>),
    /// `a || b`
    Or(Box<Ast>, Box<Ast>),
    /// `a && b` — reserved: not reachable from the grammar in spec.md §4.2,
    /// kept so the AST and interpreter stay exhaustive if the grammar grows.
    And(Box<Ast>, Box<Ast>),
    /// `!a` — reserved, see `And`.
    Not(Box<Ast>),
    /// `a[]` — one level of array flattening.
    Flatten(Box<Ast>),
    /// `left[*]right` / `left[]right` — left must be an array; right is
    /// evaluated once per element, `Null` results dropped.
    ArrayProjection(Box<Ast>, Box<Ast>),
    /// `left.*right` — left must be an object; iterates values in
    /// insertion order.
    ObjectProjection(Box<Ast>, Box<Ast>),
    Comparator(Comparator, Box<Ast>, Box<Ast>),
    /// `[?predicate]right` — used as the right side of an `ArrayProjection`.
    Condition(Box<Ast>, Box<Ast>),
    /// `[a, b, c]`
    MultiSelectList(Vec<Ast>),
    /// `{k1: a, k2: b}` — key order is the first-occurrence order.
    MultiSelectHash(Vec<(String, Ast)>),
    Function(String, Vec<Ast>),
}

impl Ast {
    pub fn subexpression(left: Ast, right: Ast) -> Ast {
        Ast::Subexpression(Box::new(left), Box::new(right))
    }
}
