//! Pratt parser: turns a token stream into an `Ast`. Grounded in the classic
//! direct recursive-descent `nud`/`led` style (no operator stack), extended
//! with comparators, filters, function calls, expression references, and
//! multi-select hashes per the full grammar.

use crate::ast::Ast;
use crate::error::ParseError;
use crate::token::{Token, TokenKind};

/// Guards against a pathologically nested expression blowing the native
/// stack; `expr` is the only recursive entry point, so counting its calls is
/// sufficient.
const MAX_DEPTH: usize = 200;

/// Binding precedence table. Anything not listed binds at 0.
fn lbp(kind: TokenKind) -> usize {
    use TokenKind::*;
    match kind {
        Pipe => 1,
        Comparator => 2,
        Or => 5,
        Flatten => 6,
        Star => 20,
        Dot => 40,
        Lbrace | Filter | Lbracket => 50,
        Lparen => 60,
        _ => 0,
    }
}

pub fn parse(expr: &str) -> Result<Ast, ParseError> {
    let tokens = crate::lexer::tokenize(expr).map_err(ParseError::from)?;
    let mut parser = Parser {
        source: expr,
        tokens,
        pos: 0,
        depth: 0,
    };
    let ast = parser.expr(0)?;
    if parser.cur().kind != TokenKind::Eof {
        return Err(parser.err(format!(
            "unexpected trailing token: {:?}",
            parser.cur().kind
        )));
    }
    Ok(ast)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn cur(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn err(&self, message: impl Into<String>) -> ParseError {
        self.err_at(self.cur().pos, message)
    }

    fn err_at(&self, pos: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(self.source, pos, message)
    }

    fn expect(&self, kind: TokenKind, message: impl Into<String>) -> Result<(), ParseError> {
        if self.cur().kind == kind {
            Ok(())
        } else {
            Err(self.err(message))
        }
    }

    /// The main Pratt loop: consume a prefix (`nud`) position, then keep
    /// absorbing infix/postfix (`led`) tokens whose binding power exceeds
    /// `rbp`.
    fn expr(&mut self, rbp: usize) -> Result<Ast, ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            self.depth -= 1;
            return Err(self.err("expression nested too deeply"));
        }
        let result = self.expr_inner(rbp);
        self.depth -= 1;
        result
    }

    fn expr_inner(&mut self, rbp: usize) -> Result<Ast, ParseError> {
        let token = self.cur().clone();
        self.advance();
        let mut left = self.nud(token)?;
        while rbp < lbp(self.cur().kind) {
            let token = self.cur().clone();
            self.advance();
            left = self.led(token, left)?;
        }
        Ok(left)
    }

    fn nud(&mut self, token: Token) -> Result<Ast, ParseError> {
        match token.kind {
            TokenKind::Current => Ok(Ast::Current),
            TokenKind::Identifier => self.parse_identifier(token.as_str().unwrap().to_string()),
            TokenKind::QuotedIdentifier => Ok(Ast::Field(token.as_str().unwrap().to_string())),
            TokenKind::Literal => Ok(Ast::Literal(token.as_literal().unwrap().clone())),
            TokenKind::Star => self.parse_object_projection(),
            TokenKind::Flatten => self.parse_flatten(Ast::Current),
            TokenKind::Lbracket => self.parse_nud_lbracket(),
            TokenKind::Filter => self.parse_filter(Ast::Current),
            TokenKind::Expref => {
                let inner = self.expr(0)?;
                Ok(Ast::Expref(Box::new(inner)))
            }
            TokenKind::Lbrace => self.parse_multi_select_hash(),
            TokenKind::Eof => Err(self.err_at(token.pos, "unexpected end of expression")),
            other => Err(self.err_at(
                token.pos,
                format!("unexpected token in expression position: {other:?}"),
            )),
        }
    }

    fn led(&mut self, token: Token, left: Ast) -> Result<Ast, ParseError> {
        match token.kind {
            TokenKind::Dot => self.parse_dot(left),
            TokenKind::Or => {
                let rhs = self.expr(lbp(TokenKind::Or))?;
                Ok(Ast::Or(Box::new(left), Box::new(rhs)))
            }
            TokenKind::Pipe => {
                let rhs = self.expr(lbp(TokenKind::Pipe))?;
                Ok(Ast::Pipe(Box::new(left), Box::new(rhs)))
            }
            TokenKind::Comparator => {
                let cmp = token.as_comparator().unwrap();
                let rhs = self.expr(lbp(TokenKind::Comparator))?;
                Ok(Ast::Comparator(cmp, Box::new(left), Box::new(rhs)))
            }
            TokenKind::Flatten => self.parse_flatten(left),
            TokenKind::Lbracket => self.parse_led_lbracket(left),
            TokenKind::Filter => self.parse_filter(left),
            other => Err(self.err_at(
                token.pos,
                format!("unexpected token in operator position: {other:?}"),
            )),
        }
    }

    fn parse_identifier(&mut self, name: String) -> Result<Ast, ParseError> {
        if self.cur().kind == TokenKind::Lparen {
            self.advance();
            let args = self.parse_function_args()?;
            Ok(Ast::Function(name, args))
        } else {
            Ok(Ast::Field(name))
        }
    }

    fn parse_function_args(&mut self) -> Result<Vec<Ast>, ParseError> {
        let mut args = Vec::new();
        if self.cur().kind == TokenKind::Rparen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.expr(0)?);
            match self.cur().kind {
                TokenKind::Comma => self.advance(),
                TokenKind::Rparen => {
                    self.advance();
                    break;
                }
                _ => return Err(self.err("expected ',' or ')' in function arguments")),
            }
        }
        Ok(args)
    }

    /// `.` has already been consumed; `self.cur()` is whatever follows it.
    fn parse_dot(&mut self, left: Ast) -> Result<Ast, ParseError> {
        match self.cur().kind {
            TokenKind::Lbracket => {
                self.advance();
                let list = self.parse_multi_select_list()?;
                Ok(Ast::subexpression(left, list))
            }
            TokenKind::Identifier
            | TokenKind::QuotedIdentifier
            | TokenKind::Star
            | TokenKind::Lbrace => {
                let rhs = self.expr(lbp(TokenKind::Dot))?;
                Ok(Ast::subexpression(left, rhs))
            }
            _ => Err(self.err("expected identifier, '*', '{', or '[' after '.'")),
        }
    }

    /// The dot-continuation of a projection's right side: unlike
    /// `parse_dot`, there is no `left` node to attach to — a projection's
    /// `.` just extends what gets evaluated per element. `rbp` is the
    /// originating projection operator's own binding power (star, flatten,
    /// or filter), not dot's — using dot's own bp here would stop the
    /// continuation at the very next `.` instead of absorbing it.
    fn parse_projection_dot(&mut self, rbp: usize) -> Result<Ast, ParseError> {
        if self.cur().kind == TokenKind::Lbracket {
            self.advance();
            self.parse_multi_select_list()
        } else {
            self.expr(rbp)
        }
    }

    /// `[` has already been consumed, seen only in nud position (nothing
    /// preceded it), so a multi-select-list is also reachable here.
    fn parse_nud_lbracket(&mut self) -> Result<Ast, ParseError> {
        match self.cur().kind {
            TokenKind::Number | TokenKind::Colon => self.parse_bracket_index(Ast::Current),
            TokenKind::Star => self.parse_bracket_star(Ast::Current),
            _ => self.parse_multi_select_list(),
        }
    }

    /// `[` has already been consumed with something before it; only an
    /// index, slice, or wildcard is legal (a multi-select-list here needs a
    /// leading `.`).
    fn parse_led_lbracket(&mut self, left: Ast) -> Result<Ast, ParseError> {
        match self.cur().kind {
            TokenKind::Number | TokenKind::Colon => self.parse_bracket_index(left),
            TokenKind::Star => self.parse_bracket_star(left),
            _ => Err(self.err("expected a number, ':', or '*' after '['")),
        }
    }

    fn parse_bracket_star(&mut self, left: Ast) -> Result<Ast, ParseError> {
        self.advance(); // consume '*'
        self.expect(TokenKind::Rbracket, "expected ']' after '[*'")?;
        self.advance();
        let rhs = self.projection_rhs(lbp(TokenKind::Star))?;
        Ok(Ast::ArrayProjection(Box::new(left), Box::new(rhs)))
    }

    /// Consumes `N`, `:`, or `]` tokens until the closing `]`, producing
    /// either a plain index or a slice (which always projects).
    fn parse_bracket_index(&mut self, left: Ast) -> Result<Ast, ParseError> {
        let mut parts: [Option<i64>; 3] = [None, None, None];
        let mut colons = 0usize;
        loop {
            match self.cur().kind {
                TokenKind::Number => {
                    parts[colons] = self.cur().as_num();
                    self.advance();
                }
                TokenKind::Colon => {
                    colons += 1;
                    if colons > 2 {
                        return Err(self.err("too many ':' in slice expression"));
                    }
                    self.advance();
                }
                TokenKind::Rbracket => {
                    self.advance();
                    break;
                }
                _ => return Err(self.err("expected a number, ':', or ']' in index expression")),
            }
        }
        if colons == 0 {
            let index = parts[0].ok_or_else(|| self.err("expected an index value"))?;
            Ok(Ast::subexpression(left, Ast::Index(index)))
        } else {
            let slice = Ast::Slice {
                start: parts[0],
                stop: parts[1],
                step: parts[2],
            };
            let rhs = self.projection_rhs(lbp(TokenKind::Star))?;
            Ok(Ast::ArrayProjection(
                Box::new(Ast::subexpression(left, slice)),
                Box::new(rhs),
            ))
        }
    }

    /// `[` has already been consumed (either directly or via `parse_dot`);
    /// parses a comma-separated list up to `]`.
    fn parse_multi_select_list(&mut self) -> Result<Ast, ParseError> {
        if self.cur().kind == TokenKind::Rbracket {
            return Err(self.err("a multi-select list must not be empty"));
        }
        let mut items = Vec::new();
        loop {
            items.push(self.expr(0)?);
            match self.cur().kind {
                TokenKind::Comma => self.advance(),
                TokenKind::Rbracket => {
                    self.advance();
                    break;
                }
                _ => return Err(self.err("expected ',' or ']' in multi-select list")),
            }
        }
        Ok(Ast::MultiSelectList(items))
    }

    /// `{` has already been consumed.
    fn parse_multi_select_hash(&mut self) -> Result<Ast, ParseError> {
        let mut pairs = Vec::new();
        loop {
            let key = match self.cur().kind {
                TokenKind::Identifier | TokenKind::QuotedIdentifier => {
                    self.cur().as_str().unwrap().to_string()
                }
                _ => return Err(self.err("expected an identifier as a multi-select-hash key")),
            };
            self.advance();
            self.expect(TokenKind::Colon, "expected ':' after multi-select-hash key")?;
            self.advance();
            let value = self.expr(0)?;
            pairs.push((key, value));
            match self.cur().kind {
                TokenKind::Comma => self.advance(),
                TokenKind::Rbrace => {
                    self.advance();
                    break;
                }
                _ => return Err(self.err("expected ',' or '}' in multi-select-hash")),
            }
        }
        Ok(Ast::MultiSelectHash(pairs))
    }

    fn parse_object_projection(&mut self) -> Result<Ast, ParseError> {
        let rhs = self.projection_rhs(lbp(TokenKind::Star))?;
        Ok(Ast::ObjectProjection(Box::new(Ast::Current), Box::new(rhs)))
    }

    /// `[]` (the flatten token) has already been consumed.
    fn parse_flatten(&mut self, left: Ast) -> Result<Ast, ParseError> {
        let rhs = self.projection_rhs(lbp(TokenKind::Flatten))?;
        Ok(Ast::ArrayProjection(
            Box::new(Ast::Flatten(Box::new(left))),
            Box::new(rhs),
        ))
    }

    /// `[?` has already been consumed; parses the predicate up to the
    /// matching `]`.
    fn parse_filter(&mut self, left: Ast) -> Result<Ast, ParseError> {
        let predicate = self.expr(0)?;
        self.expect(
            TokenKind::Rbracket,
            "expected ']' to close filter expression",
        )?;
        self.advance();
        let rhs = self.projection_rhs(lbp(TokenKind::Filter))?;
        Ok(Ast::ArrayProjection(
            Box::new(left),
            Box::new(Ast::Condition(Box::new(predicate), Box::new(rhs))),
        ))
    }

    /// What a projection applies per element. Only an explicit continuation
    /// (`.`, `[`, `[]`, `[?`) extends it; anything else (`|`, `||`,
    /// comparators, a closing delimiter, EOF) means "yield the element
    /// itself" and lets that token close the projection at the outer level.
    /// `rbp` is the originating operator's own binding power (star, flatten,
    /// or filter), threaded through so a `.`-continuation keeps absorbing
    /// further dots instead of stopping at the first one.
    fn projection_rhs(&mut self, rbp: usize) -> Result<Ast, ParseError> {
        match self.cur().kind {
            TokenKind::Dot => {
                self.advance();
                self.parse_projection_dot(rbp)
            }
            TokenKind::Lbracket => {
                self.advance();
                self.parse_led_lbracket(Ast::Current)
            }
            TokenKind::Flatten => {
                self.advance();
                self.parse_flatten(Ast::Current)
            }
            TokenKind::Filter => {
                self.advance();
                self.parse_filter(Ast::Current)
            }
            _ => Ok(Ast::Current),
        }
    }
}
