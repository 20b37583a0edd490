//! Recursive-descent parser.
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary | <implicit> power)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('^' unary)?
//! primary := number | constant | symbol | func '(' expr ')' | '(' expr ')'
//! ```
//!
//! Implicit multiplication applies only after a number or a closing
//! parenthesis, so `2x` and `(a)(b)` parse while `x y` does not.

use crate::ast::{BinOp, Constant, Expr, Func};
use crate::error::ParseError;
use crate::lexer::{tokenize, Token, TokenKind};

/// Deepest expression tree, and deepest nesting, the parser accepts.
///
/// Evaluation, rendering and dropping an [`Expr`] all recurse, so the bound
/// is enforced while the tree is built.
pub const MAX_DEPTH: usize = 256;

pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    let node = parser.parse_expr()?;
    match parser.peek() {
        None => Ok(node.expr),
        Some(token) => Err(ParseError::unexpected(token.kind.describe(), token.offset)),
    }
}

/// An expression with the height of its tree.
struct Node {
    expr: Expr,
    depth: usize,
}

impl Node {
    fn leaf(expr: Expr) -> Self {
        Self { expr, depth: 1 }
    }

    fn unary(inner: Node, build: impl FnOnce(Expr) -> Expr) -> Result<Self, ParseError> {
        Ok(Self {
            depth: deeper(inner.depth)?,
            expr: build(inner.expr),
        })
    }

    fn binary(
        lhs: Node,
        rhs: Node,
        build: impl FnOnce(Expr, Expr) -> Expr,
    ) -> Result<Self, ParseError> {
        Ok(Self {
            depth: deeper(lhs.depth.max(rhs.depth))?,
            expr: build(lhs.expr, rhs.expr),
        })
    }
}

fn deeper(depth: usize) -> Result<usize, ParseError> {
    if depth >= MAX_DEPTH {
        return Err(ParseError::TooDeep { limit: MAX_DEPTH });
    }
    Ok(depth + 1)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    nesting: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            nesting: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn previous(&self) -> Option<&Token> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().map(|t| &t.kind) == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_expr(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_term()?;
            lhs = Node::binary(lhs, rhs, |l, r| Expr::binary(op, l, r))?;
        }
    }

    fn parse_term(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Star) => {
                    self.pos += 1;
                    let rhs = self.parse_unary()?;
                    lhs = Node::binary(lhs, rhs, Expr::mul)?;
                }
                Some(TokenKind::Slash) => {
                    self.pos += 1;
                    let rhs = self.parse_unary()?;
                    lhs = Node::binary(lhs, rhs, Expr::div)?;
                }
                Some(TokenKind::Ident(_)) | Some(TokenKind::LParen) if self.allows_implicit() => {
                    let rhs = self.parse_power()?;
                    lhs = Node::binary(lhs, rhs, Expr::mul)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn allows_implicit(&self) -> bool {
        matches!(
            self.previous().map(|t| &t.kind),
            Some(TokenKind::Number(_)) | Some(TokenKind::RParen)
        )
    }

    // every recursive cycle of the grammar passes through here
    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        if self.nesting >= MAX_DEPTH {
            return Err(ParseError::TooDeep { limit: MAX_DEPTH });
        }
        self.nesting += 1;
        let node = self.parse_signed();
        self.nesting -= 1;
        node
    }

    fn parse_signed(&mut self) -> Result<Node, ParseError> {
        if self.eat(&TokenKind::Minus) {
            let inner = self.parse_unary()?;
            return Node::unary(inner, Expr::neg);
        }
        if self.eat(&TokenKind::Plus) {
            return self.parse_unary();
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Node, ParseError> {
        let base = self.parse_primary()?;
        if self.eat(&TokenKind::Caret) {
            let exponent = self.parse_unary()?;
            return Node::binary(base, exponent, Expr::pow);
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let token = self.advance().ok_or(ParseError::UnexpectedEnd)?;
        match token.kind {
            TokenKind::Number(value) => Ok(Node::leaf(Expr::Number(value))),
            TokenKind::Ident(name) => self.parse_identifier(name, token.offset),
            TokenKind::LParen => {
                let inner = self.parse_expr()?;
                if self.eat(&TokenKind::RParen) {
                    Ok(inner)
                } else {
                    Err(ParseError::UnmatchedParen {
                        offset: token.offset,
                    })
                }
            }
            other => Err(ParseError::unexpected(other.describe(), token.offset)),
        }
    }

    fn parse_identifier(&mut self, name: String, offset: usize) -> Result<Node, ParseError> {
        let followed_by_paren = matches!(self.peek().map(|t| &t.kind), Some(TokenKind::LParen));

        if let Some(func) = Func::from_name(&name) {
            if !followed_by_paren {
                return Err(ParseError::MissingCall { name });
            }
            let open = self.advance().map(|t| t.offset).unwrap_or(offset);
            let arg = self.parse_expr()?;
            if !self.eat(&TokenKind::RParen) {
                return Err(ParseError::UnmatchedParen { offset: open });
            }
            return Node::unary(arg, |arg| Expr::call(func, arg));
        }

        if followed_by_paren {
            return Err(ParseError::UnknownFunction { name, offset });
        }

        match Constant::from_name(&name) {
            Some(constant) => Ok(Node::leaf(Expr::Constant(constant))),
            None => Ok(Node::leaf(Expr::Symbol(name))),
        }
    }
}
