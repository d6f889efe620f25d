//! Scans a JMESPath expression string into a vector of tokens terminated by
//! `Eof`. Single-pass over `char_indices`, grounded in the classic
//! jmespath.rs lexer's character-class dispatch (whitespace, simple
//! single-char tokens, identifiers, numbers, quoted spans) but returning a
//! `Result` instead of an in-band `Error` token variant.

use std::str::CharIndices;

use crate::ast::Comparator;
use crate::error::LexError;
use crate::token::{Token, TokenKind, TokenValue};
use crate::value::Value;

/// Tokenizes `expr`. The final token has kind `Eof` at `pos = expr.len() + 1`.
pub fn tokenize(expr: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(expr).run()
}

struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Lexer {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(&(byte_pos, ch)) = self.chars.peek() {
            let pos = byte_pos + 1;
            match ch {
                ' ' | '\n' | '\r' | '\t' => {
                    self.chars.next();
                }
                '.' => tokens.push(self.simple(pos, TokenKind::Dot)),
                '*' => tokens.push(self.simple(pos, TokenKind::Star)),
                ',' => tokens.push(self.simple(pos, TokenKind::Comma)),
                ':' => tokens.push(self.simple(pos, TokenKind::Colon)),
                '{' => tokens.push(self.simple(pos, TokenKind::Lbrace)),
                '}' => tokens.push(self.simple(pos, TokenKind::Rbrace)),
                ']' => tokens.push(self.simple(pos, TokenKind::Rbracket)),
                '(' => tokens.push(self.simple(pos, TokenKind::Lparen)),
                ')' => tokens.push(self.simple(pos, TokenKind::Rparen)),
                '@' => tokens.push(self.simple(pos, TokenKind::Current)),
                '&' => tokens.push(self.simple(pos, TokenKind::Expref)),
                '[' => {
                    self.chars.next();
                    tokens.push(self.lex_lbracket(pos));
                }
                '|' => {
                    self.chars.next();
                    tokens.push(self.lex_alt(pos, '|', TokenKind::Or, TokenKind::Pipe));
                }
                '<' => {
                    self.chars.next();
                    tokens.push(self.lex_comparator(
                        pos,
                        '<',
                        '=',
                        Comparator::Lte,
                        Comparator::Lt,
                    ));
                }
                '>' => {
                    self.chars.next();
                    tokens.push(self.lex_comparator(
                        pos,
                        '>',
                        '=',
                        Comparator::Gte,
                        Comparator::Gt,
                    ));
                }
                '=' => {
                    self.chars.next();
                    match self.chars.peek() {
                        Some(&(_, '=')) => {
                            self.chars.next();
                            tokens.push(Token::new(
                                TokenKind::Comparator,
                                pos,
                                TokenValue::Comparator(Comparator::Eq),
                            ));
                        }
                        _ => return Err(LexError::new(self.source, pos, "Did you mean \"==\"?")),
                    }
                }
                '!' => {
                    self.chars.next();
                    match self.chars.peek() {
                        Some(&(_, '=')) => {
                            self.chars.next();
                            tokens.push(Token::new(
                                TokenKind::Comparator,
                                pos,
                                TokenValue::Comparator(Comparator::Ne),
                            ));
                        }
                        _ => {
                            return Err(LexError::new(
                                self.source,
                                pos,
                                "Unexpected character '!': did you mean \"!=\"?",
                            ))
                        }
                    }
                }
                '"' => tokens.push(self.lex_quoted_identifier(pos)?),
                '`' => tokens.push(self.lex_literal(pos)?),
                c if is_identifier_start(c) => tokens.push(self.lex_identifier(pos)),
                '-' | '0'..='9' => tokens.push(self.lex_number(pos)?),
                c => {
                    return Err(LexError::new(
                        self.source,
                        pos,
                        format!("Unexpected character: {c:?}"),
                    ))
                }
            }
        }
        tokens.push(Token::new(
            TokenKind::Eof,
            self.source.len() + 1,
            TokenValue::None,
        ));
        Ok(tokens)
    }

    fn simple(&mut self, pos: usize, kind: TokenKind) -> Token {
        self.chars.next();
        Token::new(kind, pos, TokenValue::None)
    }

    /// `[` alone, `[]` (flatten), or `[?` (filter).
    fn lex_lbracket(&mut self, pos: usize) -> Token {
        match self.chars.peek() {
            Some(&(_, ']')) => {
                self.chars.next();
                Token::new(TokenKind::Flatten, pos, TokenValue::None)
            }
            Some(&(_, '?')) => {
                self.chars.next();
                Token::new(TokenKind::Filter, pos, TokenValue::None)
            }
            _ => Token::new(TokenKind::Lbracket, pos, TokenValue::None),
        }
    }

    fn lex_alt(
        &mut self,
        pos: usize,
        expect: char,
        matched: TokenKind,
        otherwise: TokenKind,
    ) -> Token {
        match self.chars.peek() {
            Some(&(_, c)) if c == expect => {
                self.chars.next();
                Token::new(matched, pos, TokenValue::None)
            }
            _ => Token::new(otherwise, pos, TokenValue::None),
        }
    }

    fn lex_comparator(
        &mut self,
        pos: usize,
        _self_char: char,
        expect: char,
        matched: Comparator,
        otherwise: Comparator,
    ) -> Token {
        match self.chars.peek() {
            Some(&(_, c)) if c == expect => {
                self.chars.next();
                Token::new(TokenKind::Comparator, pos, TokenValue::Comparator(matched))
            }
            _ => Token::new(
                TokenKind::Comparator,
                pos,
                TokenValue::Comparator(otherwise),
            ),
        }
    }

    fn lex_identifier(&mut self, pos: usize) -> Token {
        let mut ident = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if is_identifier_start(c) || c.is_ascii_digit() || c == '-' {
                ident.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        Token::new(TokenKind::Identifier, pos, TokenValue::Str(ident))
    }

    fn lex_number(&mut self, pos: usize) -> Result<Token, LexError> {
        let mut lexeme = String::new();
        if let Some(&(_, '-')) = self.chars.peek() {
            lexeme.push('-');
            self.chars.next();
        }
        let mut saw_digit = false;
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                saw_digit = true;
                lexeme.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if !saw_digit {
            return Err(LexError::new(self.source, pos, "Expected digits after '-'"));
        }
        let value: i64 = lexeme
            .parse()
            .map_err(|_| LexError::new(self.source, pos, format!("Invalid number: {lexeme}")))?;
        Ok(Token::new(TokenKind::Number, pos, TokenValue::Num(value)))
    }

    /// Consumes characters up to the matching `wrapper`, honoring `\wrapper`
    /// as an escaped delimiter. Returns the raw (still-escaped) text.
    fn consume_delimited(&mut self, pos: usize, wrapper: char) -> Result<String, LexError> {
        self.chars.next(); // opening delimiter
        let mut buffer = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == wrapper => return Ok(buffer),
                Some((_, '\\')) => {
                    buffer.push('\\');
                    match self.chars.next() {
                        Some((_, c)) => buffer.push(c),
                        None => break,
                    }
                }
                Some((_, c)) => buffer.push(c),
                None => break,
            }
        }
        Err(LexError::new(
            self.source,
            pos,
            format!("Unclosed {wrapper} delimiter"),
        ))
    }

    fn lex_quoted_identifier(&mut self, pos: usize) -> Result<Token, LexError> {
        let raw = self.consume_delimited(pos, '"')?;
        let decoded: String = serde_json::from_str(&format!("\"{raw}\"")).map_err(|e| {
            LexError::new(self.source, pos, format!("Invalid quoted identifier: {e}"))
        })?;
        Ok(Token::new(
            TokenKind::QuotedIdentifier,
            pos,
            TokenValue::Str(decoded),
        ))
    }

    /// Literal tokens (`` `…` ``) JSON-decode per spec.md §4.1: JSON
    /// directly if the trimmed content looks like a JSON value, the bare
    /// keywords `null`/`true`/`false`, or else a bare string wrapped in
    /// quotes.
    fn lex_literal(&mut self, pos: usize) -> Result<Token, LexError> {
        let raw = self.consume_delimited(pos, '`')?;
        let unescaped = raw.replace("\\`", "`");
        let trimmed = unescaped.trim();
        let json_text: std::borrow::Cow<'_, str> = if trimmed.is_empty() {
            return Err(LexError::new(self.source, pos, "Empty literal"));
        } else if matches!(trimmed, "null" | "true" | "false") {
            std::borrow::Cow::Borrowed(trimmed)
        } else {
            match trimmed.chars().next().unwrap() {
                '"' | '[' | '{' | '-' | '0'..='9' => std::borrow::Cow::Borrowed(trimmed),
                _ => std::borrow::Cow::Owned(format!("\"{trimmed}\"")),
            }
        };
        let json: serde_json::Value = serde_json::from_str(&json_text).map_err(|e| {
            LexError::new(
                self.source,
                pos,
                format!("Unable to parse literal JSON: {e}"),
            )
        })?;
        Ok(Token::new(
            TokenKind::Literal,
            pos,
            TokenValue::Literal(std::rc::Rc::new(Value::from(&json))),
        ))
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(expr: &str) -> Vec<TokenKind> {
        tokenize(expr)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn tokenizes_simple_tokens() {
        use TokenKind::*;
        assert_eq!(kinds("."), vec![Dot, Eof]);
        assert_eq!(kinds("*"), vec![Star, Eof]);
        assert_eq!(kinds("@"), vec![Current, Eof]);
        assert_eq!(kinds("[]"), vec![Flatten, Eof]);
        assert_eq!(kinds("[?"), vec![Filter, Eof]);
        assert_eq!(kinds("["), vec![Lbracket, Eof]);
    }

    #[test]
    fn tokenizes_pipe_and_or() {
        assert_eq!(kinds("|"), vec![TokenKind::Pipe, TokenKind::Eof]);
        assert_eq!(kinds("||"), vec![TokenKind::Or, TokenKind::Eof]);
    }

    #[test]
    fn tokenizes_comparators() {
        let toks = tokenize("< <= > >= == !=").unwrap();
        let comparators: Vec<Comparator> = toks.iter().filter_map(|t| t.as_comparator()).collect();
        assert_eq!(
            comparators,
            vec![
                Comparator::Lt,
                Comparator::Lte,
                Comparator::Gt,
                Comparator::Gte,
                Comparator::Eq,
                Comparator::Ne
            ]
        );
    }

    #[test]
    fn bare_equals_is_an_error() {
        let err = tokenize("a=b").unwrap_err();
        assert_eq!(err.pos, 2);
    }

    #[test]
    fn unterminated_literal_errors() {
        assert!(tokenize("`foo").is_err());
        assert!(tokenize("\"foo").is_err());
    }

    #[test]
    fn identifiers_and_numbers() {
        let toks = tokenize("foo_bar-1 -42").unwrap();
        assert_eq!(toks[0].as_str(), Some("foo_bar-1"));
        assert_eq!(toks[1].as_num(), Some(-42));
    }

    #[test]
    fn quoted_identifier_unescapes() {
        let toks = tokenize("\"a\\nb\"").unwrap();
        assert_eq!(toks[0].as_str(), Some("a\nb"));
    }

    #[test]
    fn literal_decoding_rules() {
        let toks = tokenize("`null` `true` `\"a\"` `[1,2]` `-5`").unwrap();
        let literal_strs: Vec<String> = toks
            .iter()
            .filter_map(|t| t.as_literal())
            .map(|v| v.to_string())
            .collect();
        assert_eq!(literal_strs, vec!["null", "true", "\"a\"", "[1,2]", "-5"]);
    }

    #[test]
    fn positions_are_one_based_and_eof_is_len_plus_one() {
        let toks = tokenize("ab").unwrap();
        assert_eq!(toks[0].pos, 1);
        assert_eq!(toks.last().unwrap().pos, 3);
        assert_eq!(toks.last().unwrap().kind, TokenKind::Eof);
    }
}
