/*
 * lexer.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Tokenizer for the expression language.

use crate::error::{ExprResult, ExpressionError};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Question,
    Colon,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Eof,
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Split `source` into tokens, ending with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> ExprResult<Vec<Token>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        let start = pos;

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let (kind, end) = lex_number(source, pos)?;
            tokens.push(Token {
                kind,
                offset: start,
            });
            pos = end;
            continue;
        }

        if is_ident_start(c) {
            while pos < bytes.len() && is_ident_continue(bytes[pos]) {
                pos += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident(source[start..pos].to_string()),
                offset: start,
            });
            continue;
        }

        if c == b'"' || c == b'\'' {
            let (text, end) = lex_string(source, pos)?;
            tokens.push(Token {
                kind: TokenKind::Str(text),
                offset: start,
            });
            pos = end;
            continue;
        }

        let next = bytes.get(pos + 1).copied();
        let (kind, width) = match (c, next) {
            (b'=', Some(b'=')) => {
                // `===` is accepted as an alias of `==`
                let width = if bytes.get(pos + 2) == Some(&b'=') { 3 } else { 2 };
                (TokenKind::EqEq, width)
            }
            (b'!', Some(b'=')) => {
                let width = if bytes.get(pos + 2) == Some(&b'=') { 3 } else { 2 };
                (TokenKind::NotEq, width)
            }
            (b'<', Some(b'=')) => (TokenKind::LtEq, 2),
            (b'>', Some(b'=')) => (TokenKind::GtEq, 2),
            (b'&', Some(b'&')) => (TokenKind::AndAnd, 2),
            (b'|', Some(b'|')) => (TokenKind::OrOr, 2),
            (b'(', _) => (TokenKind::LParen, 1),
            (b')', _) => (TokenKind::RParen, 1),
            (b'[', _) => (TokenKind::LBracket, 1),
            (b']', _) => (TokenKind::RBracket, 1),
            (b',', _) => (TokenKind::Comma, 1),
            (b'.', _) => (TokenKind::Dot, 1),
            (b'?', _) => (TokenKind::Question, 1),
            (b':', _) => (TokenKind::Colon, 1),
            (b'+', _) => (TokenKind::Plus, 1),
            (b'-', _) => (TokenKind::Minus, 1),
            (b'*', _) => (TokenKind::Star, 1),
            (b'/', _) => (TokenKind::Slash, 1),
            (b'%', _) => (TokenKind::Percent, 1),
            (b'!', _) => (TokenKind::Bang, 1),
            (b'<', _) => (TokenKind::Lt, 1),
            (b'>', _) => (TokenKind::Gt, 1),
            (b'=', _) => {
                return Err(ExpressionError::syntax(
                    "assignment is not supported (did you mean '=='?)",
                    start,
                ));
            }
            _ => {
                let ch = source[start..].chars().next().unwrap_or('?');
                return Err(ExpressionError::syntax(
                    format!("unexpected character '{ch}'"),
                    start,
                ));
            }
        };
        tokens.push(Token {
            kind,
            offset: start,
        });
        pos += width;
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        offset: source.len(),
    });
    Ok(tokens)
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$'
}

fn lex_number(source: &str, start: usize) -> ExprResult<(TokenKind, usize)> {
    let bytes = source.as_bytes();
    let mut pos = start;
    let mut is_float = false;

    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    // A dot only belongs to the number when a digit follows it
    if pos + 1 < bytes.len() && bytes[pos] == b'.' && bytes[pos + 1].is_ascii_digit() {
        is_float = true;
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut exp = pos + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        if exp < bytes.len() && bytes[exp].is_ascii_digit() {
            is_float = true;
            pos = exp;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }

    let text = &source[start..pos];
    if !is_float {
        if let Ok(n) = text.parse::<i64>() {
            return Ok((TokenKind::Int(n), pos));
        }
    }
    text.parse::<f64>()
        .map(|f| (TokenKind::Float(f), pos))
        .map_err(|_| ExpressionError::syntax(format!("invalid number '{text}'"), start))
}

fn lex_string(source: &str, start: usize) -> ExprResult<(String, usize)> {
    let mut chars = source[start..].char_indices();
    let quote = match chars.next() {
        Some((_, q)) => q,
        None => return Err(ExpressionError::syntax("expected string", start)),
    };
    let mut text = String::new();

    while let Some((i, ch)) = chars.next() {
        match ch {
            c if c == quote => return Ok((text, start + i + c.len_utf8())),
            '\\' => {
                let (j, escaped) = chars
                    .next()
                    .ok_or_else(|| ExpressionError::syntax("unterminated string", start))?;
                match escaped {
                    'n' => text.push('\n'),
                    't' => text.push('\t'),
                    'r' => text.push('\r'),
                    '0' => text.push('\0'),
                    '\\' | '\'' | '"' => text.push(escaped),
                    other => {
                        return Err(ExpressionError::syntax(
                            format!("unknown escape '\\{other}'"),
                            start + j,
                        ));
                    }
                }
            }
            c => text.push(c),
        }
    }
    Err(ExpressionError::syntax("unterminated string", start))
}
