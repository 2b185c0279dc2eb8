/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Pratt parser for the expression language.
//!
//! Binding powers, loosest first:
//!
//! | level | operators                 |
//! |-------|---------------------------|
//! | 1     | `?:` (right associative)  |
//! | 2     | `\|\|`                    |
//! | 3     | `&&`                      |
//! | 4     | `==` `!=`                 |
//! | 5     | `<` `<=` `>` `>=`         |
//! | 6     | `+` `-`                   |
//! | 7     | `*` `/` `%`               |
//! | 8     | prefix `!` `-` `+`        |
//! | 9     | `.` `[]` `()`             |

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{ExprResult, ExpressionError};
use crate::lexer::{Token, TokenKind, tokenize};
use crate::value::Value;

const TERNARY_BP: u8 = 1;
const PREFIX_BP: u8 = 8;
const POSTFIX_BP: u8 = 9;

/// Maximum nesting of sub-expressions before parsing is refused.
const MAX_NESTING: usize = 64;

/// Maximum height of the syntax tree.
///
/// Operator and postfix chains grow the tree without recursing in the
/// parser, so this bounds evaluation depth for inputs like `1+1+...+1`.
const MAX_HEIGHT: usize = 256;

/// Parse a complete expression.
pub fn parse(source: &str) -> ExprResult<Expr> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let node = parser.parse_expr(0)?;
    let trailing = parser.peek();
    if trailing.kind != TokenKind::Eof {
        return Err(ExpressionError::syntax(
            "unexpected token after end of expression",
            trailing.offset,
        ));
    }
    Ok(node.expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

/// A parsed sub-expression with the height of its tree.
struct Node {
    expr: Expr,
    height: usize,
}

impl Node {
    fn leaf(expr: Expr) -> Self {
        Node { expr, height: 1 }
    }
}

impl Parser {
    fn peek(&self) -> &Token {
        // `tokenize` always ends with Eof and `advance` never moves past it
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> ExprResult<()> {
        let token = self.advance();
        if token.kind == kind {
            Ok(())
        } else {
            Err(ExpressionError::syntax(format!("expected {what}"), token.offset))
        }
    }

    /// Wrap `expr` whose tallest child has height `child_height`.
    fn branch(&self, expr: Expr, child_height: usize) -> ExprResult<Node> {
        let height = child_height + 1;
        if height > MAX_HEIGHT {
            return Err(ExpressionError::syntax(
                "expression too long",
                self.peek().offset,
            ));
        }
        Ok(Node { expr, height })
    }

    fn parse_expr(&mut self, min_bp: u8) -> ExprResult<Node> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ExpressionError::syntax(
                "expression nested too deeply",
                self.peek().offset,
            ));
        }
        let result = self.parse_expr_inner(min_bp);
        self.depth -= 1;
        result
    }

    fn parse_expr_inner(&mut self, min_bp: u8) -> ExprResult<Node> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let kind = self.peek().kind.clone();
            match kind {
                TokenKind::Dot | TokenKind::LBracket | TokenKind::LParen
                    if POSTFIX_BP >= min_bp =>
                {
                    lhs = self.parse_postfix(lhs)?;
                }
                TokenKind::Question if TERNARY_BP >= min_bp => {
                    self.advance();
                    let consequent = self.parse_expr(0)?;
                    self.expect(TokenKind::Colon, "':' in conditional expression")?;
                    let alternate = self.parse_expr(TERNARY_BP)?;
                    let height = lhs.height.max(consequent.height).max(alternate.height);
                    lhs = self.branch(
                        Expr::Conditional {
                            test: Box::new(lhs.expr),
                            consequent: Box::new(consequent.expr),
                            alternate: Box::new(alternate.expr),
                        },
                        height,
                    )?;
                }
                _ => {
                    let Some((op, l_bp, r_bp)) = infix_binding_power(&kind) else {
                        break;
                    };
                    if l_bp < min_bp {
                        break;
                    }
                    self.advance();
                    let rhs = self.parse_expr(r_bp)?;
                    let height = lhs.height.max(rhs.height);
                    lhs = self.branch(
                        Expr::Binary {
                            op,
                            left: Box::new(lhs.expr),
                            right: Box::new(rhs.expr),
                        },
                        height,
                    )?;
                }
            }
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> ExprResult<Node> {
        let token = self.advance();
        match token.kind {
            TokenKind::Int(n) => Ok(Node::leaf(Expr::Literal(Value::Int(n)))),
            TokenKind::Float(f) => Ok(Node::leaf(Expr::Literal(Value::Float(f)))),
            TokenKind::Str(s) => Ok(Node::leaf(Expr::Literal(Value::String(s)))),
            TokenKind::Ident(name) => Ok(Node::leaf(match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" => Expr::Literal(Value::Null),
                _ => Expr::Ident(name),
            })),
            TokenKind::LParen => {
                let inner = self.parse_expr(0)?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                let (items, height) = self.parse_list(TokenKind::RBracket, "']'")?;
                self.branch(Expr::Array(items), height)
            }
            TokenKind::Bang | TokenKind::Minus | TokenKind::Plus => {
                let op = match token.kind {
                    TokenKind::Bang => UnaryOp::Not,
                    TokenKind::Minus => UnaryOp::Neg,
                    _ => UnaryOp::Plus,
                };
                let operand = self.parse_expr(PREFIX_BP)?;
                self.branch(
                    Expr::Unary {
                        op,
                        operand: Box::new(operand.expr),
                    },
                    operand.height,
                )
            }
            TokenKind::Eof => Err(ExpressionError::syntax(
                "unexpected end of expression",
                token.offset,
            )),
            _ => Err(ExpressionError::syntax("unexpected token", token.offset)),
        }
    }

    fn parse_postfix(&mut self, lhs: Node) -> ExprResult<Node> {
        let token = self.advance();
        match token.kind {
            TokenKind::Dot => {
                let name = self.advance();
                match name.kind {
                    TokenKind::Ident(property) => self.branch(
                        Expr::Member {
                            object: Box::new(lhs.expr),
                            property,
                        },
                        lhs.height,
                    ),
                    _ => Err(ExpressionError::syntax(
                        "expected property name after '.'",
                        name.offset,
                    )),
                }
            }
            TokenKind::LBracket => {
                let index = self.parse_expr(0)?;
                self.expect(TokenKind::RBracket, "']'")?;
                self.branch(
                    Expr::Index {
                        object: Box::new(lhs.expr),
                        index: Box::new(index.expr),
                    },
                    lhs.height.max(index.height),
                )
            }
            TokenKind::LParen => {
                let (args, height) = self.parse_list(TokenKind::RParen, "')'")?;
                self.branch(
                    Expr::Call {
                        callee: Box::new(lhs.expr),
                        args,
                    },
                    lhs.height.max(height),
                )
            }
            _ => Err(ExpressionError::syntax("unexpected token", token.offset)),
        }
    }

    /// Comma-separated expressions up to and including `close`, with the
    /// height of the tallest one.
    fn parse_list(&mut self, close: TokenKind, what: &str) -> ExprResult<(Vec<Expr>, usize)> {
        let mut items = Vec::new();
        let mut height = 0;
        if self.peek().kind == close {
            self.advance();
            return Ok((items, height));
        }
        loop {
            let item = self.parse_expr(0)?;
            height = height.max(item.height);
            items.push(item.expr);
            let token = self.advance();
            if token.kind == close {
                return Ok((items, height));
            }
            if token.kind != TokenKind::Comma {
                return Err(ExpressionError::syntax(
                    format!("expected ',' or {what}"),
                    token.offset,
                ));
            }
        }
    }
}

fn infix_binding_power(kind: &TokenKind) -> Option<(BinaryOp, u8, u8)> {
    let (op, bp) = match kind {
        TokenKind::OrOr => (BinaryOp::Or, 2),
        TokenKind::AndAnd => (BinaryOp::And, 3),
        TokenKind::EqEq => (BinaryOp::Eq, 4),
        TokenKind::NotEq => (BinaryOp::NotEq, 4),
        TokenKind::Lt => (BinaryOp::Lt, 5),
        TokenKind::LtEq => (BinaryOp::LtEq, 5),
        TokenKind::Gt => (BinaryOp::Gt, 5),
        TokenKind::GtEq => (BinaryOp::GtEq, 5),
        TokenKind::Plus => (BinaryOp::Add, 6),
        TokenKind::Minus => (BinaryOp::Sub, 6),
        TokenKind::Star => (BinaryOp::Mul, 7),
        TokenKind::Slash => (BinaryOp::Div, 7),
        TokenKind::Percent => (BinaryOp::Mod, 7),
        _ => return None,
    };
    // Left associative: the right side binds one step tighter
    Some((op, bp, bp + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ident(name: &str) -> Box<Expr> {
        Box::new(Expr::Ident(name.to_string()))
    }

    fn int(n: i64) -> Box<Expr> {
        Box::new(Expr::Literal(Value::Int(n)))
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            parse("1 + 2 * 3").unwrap(),
            Expr::Binary {
                op: BinaryOp::Add,
                left: int(1),
                right: Box::new(Expr::Binary {
                    op: BinaryOp::Mul,
                    left: int(2),
                    right: int(3),
                }),
            }
        );
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(
            parse("8 - 4 - 2").unwrap(),
            Expr::Binary {
                op: BinaryOp::Sub,
                left: Box::new(Expr::Binary {
                    op: BinaryOp::Sub,
                    left: int(8),
                    right: int(4),
                }),
                right: int(2),
            }
        );
    }

    #[test]
    fn test_postfix_chain() {
        assert_eq!(
            parse("a.$b(1)[0]").unwrap(),
            Expr::Index {
                object: Box::new(Expr::Call {
                    callee: Box::new(Expr::Member {
                        object: ident("a"),
                        property: "$b".to_string(),
                    }),
                    args: vec![Expr::Literal(Value::Int(1))],
                }),
                index: int(0),
            }
        );
    }

    #[test]
    fn test_unary_binds_looser_than_member() {
        assert_eq!(
            parse("-a.b").unwrap(),
            Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(Expr::Member {
                    object: ident("a"),
                    property: "b".to_string(),
                }),
            }
        );
    }

    #[test]
    fn test_ternary_is_right_associative() {
        assert_eq!(
            parse("a ? 1 : b ? 2 : 3").unwrap(),
            Expr::Conditional {
                test: ident("a"),
                consequent: int(1),
                alternate: Box::new(Expr::Conditional {
                    test: ident("b"),
                    consequent: int(2),
                    alternate: int(3),
                }),
            }
        );
    }

    #[test]
    fn test_keywords_and_arrays() {
        assert_eq!(
            parse("[true, null, 'x']").unwrap(),
            Expr::Array(vec![
                Expr::Literal(Value::Bool(true)),
                Expr::Literal(Value::Null),
                Expr::Literal(Value::from("x")),
            ])
        );
        assert_eq!(parse("[]").unwrap(), Expr::Array(vec![]));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(
            parse("").unwrap_err(),
            ExpressionError::Syntax { offset: 0, .. }
        ));
        assert!(matches!(
            parse("1 +").unwrap_err(),
            ExpressionError::Syntax { offset: 3, .. }
        ));
        assert!(matches!(
            parse("a b").unwrap_err(),
            ExpressionError::Syntax { offset: 2, .. }
        ));
        assert!(matches!(
            parse("(1").unwrap_err(),
            ExpressionError::Syntax { .. }
        ));
        assert!(matches!(
            parse("a.1").unwrap_err(),
            ExpressionError::Syntax { .. }
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let source = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert!(matches!(
            parse(&source).unwrap_err(),
            ExpressionError::Syntax { .. }
        ));
    }

    #[test]
    fn test_long_operator_chain_is_rejected() {
        let source = vec!["1"; 20_000].join("+");
        assert!(matches!(
            parse(&source).unwrap_err(),
            ExpressionError::Syntax { .. }
        ));

        let source = format!("a{}", ".b".repeat(20_000));
        assert!(matches!(
            parse(&source).unwrap_err(),
            ExpressionError::Syntax { .. }
        ));
    }

    #[test]
    fn test_moderate_chain_is_accepted() {
        let source = vec!["1"; 200].join(" + ");
        assert!(parse(&source).is_ok());
    }
}
