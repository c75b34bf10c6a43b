//! Recursive-descent parser for the supported FEEL subset
//!
//! Two entry points: [`parse_expression`] for decision logic and
//! [`parse_unary_tests`] for decision-table cells, where `-` (or empty
//! text) marks an irrelevant cell and bare comparison operators form
//! unary tests.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::ast::{BinaryOp, Expression};
use crate::error::{FeelError, Result};
use crate::lexer::{lex, Spanned, Token};
use crate::range::RangeBoundary;
use crate::value::{UnaryTestOp, Value};

/// Parse a complete expression.
pub fn parse_expression(text: &str) -> Result<Expression> {
    let mut parser = Parser::new(text)?;
    let expr = parser.expression()?;
    parser.expect_eof()?;
    Ok(expr)
}

/// Parse a comma-separated list of unary tests.
///
/// Each element is a comparison test (`< 10`), a range, or a plain
/// expression used as an equality test. The irrelevance marker `-` and
/// blank text yield an empty list.
pub fn parse_unary_tests(text: &str) -> Result<Vec<Expression>> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(Vec::new());
    }
    let mut parser = Parser::new(text)?;
    let mut tests = vec![parser.unary_test()?];
    while parser.eat(&Token::Comma) {
        tests.push(parser.unary_test()?);
    }
    parser.expect_eof()?;
    Ok(tests)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn new(text: &str) -> Result<Parser> {
        Ok(Parser {
            tokens: lex(text)?,
            pos: 0,
        })
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn position(&self) -> usize {
        self.tokens[self.pos].position
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].token.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Token::Name(name) if name == keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, what: &str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(FeelError::syntax(
                self.position(),
                format!("expected {what}, found {:?}", self.peek()),
            ))
        }
    }

    fn expect_eof(&mut self) -> Result<()> {
        match self.peek() {
            Token::Eof => Ok(()),
            other => Err(FeelError::syntax(
                self.position(),
                format!("unexpected trailing {other:?}"),
            )),
        }
    }

    fn expect_name(&mut self, what: &str) -> Result<String> {
        match self.peek().clone() {
            Token::Name(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(FeelError::syntax(
                self.position(),
                format!("expected {what}, found {other:?}"),
            )),
        }
    }

    /// A single cell test: a bare comparison operator forms a unary test,
    /// anything else is a plain expression.
    fn unary_test(&mut self) -> Result<Expression> {
        let op = match self.peek() {
            Token::Lt => Some(UnaryTestOp::Lt),
            Token::Le => Some(UnaryTestOp::Le),
            Token::Gt => Some(UnaryTestOp::Gt),
            Token::Ge => Some(UnaryTestOp::Ge),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.additive()?;
            return Ok(Expression::UnaryTest {
                op,
                operand: Arc::new(operand),
            });
        }
        self.expression()
    }

    // precedence, loosest first: or, and, comparison/in, + -, * /, unary -,
    // postfix (path, call), primary
    fn expression(&mut self) -> Result<Expression> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expression> {
        let mut left = self.and_expr()?;
        while self.eat_keyword("or") {
            let right = self.and_expr()?;
            left = Expression::Binary {
                op: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expression> {
        let mut left = self.comparison()?;
        while self.eat_keyword("and") {
            let right = self.comparison()?;
            left = Expression::Binary {
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// Comparisons do not associate: `a < b < c` is a syntax error.
    fn comparison(&mut self) -> Result<Expression> {
        let left = self.additive()?;
        let op = match self.peek() {
            Token::Eq => Some(BinaryOp::Eq),
            Token::Ne => Some(BinaryOp::Ne),
            Token::Lt => Some(BinaryOp::Lt),
            Token::Le => Some(BinaryOp::Le),
            Token::Gt => Some(BinaryOp::Gt),
            Token::Ge => Some(BinaryOp::Ge),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let right = self.additive()?;
            return Ok(Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        if self.eat_keyword("in") {
            let target = self.additive()?;
            return Ok(Expression::In {
                value: Box::new(left),
                target: Box::new(target),
            });
        }
        Ok(left)
    }

    fn additive(&mut self) -> Result<Expression> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.multiplicative()?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Expression> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.unary()?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expression> {
        if self.eat(&Token::Minus) {
            let inner = self.unary()?;
            return Ok(Expression::Negation(Box::new(inner)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expression> {
        let mut expr = self.primary()?;
        loop {
            if self.eat(&Token::Dot) {
                let segment = self.expect_name("member name after '.'")?;
                expr = match expr {
                    Expression::Path { base, mut segments } => {
                        segments.push(segment);
                        Expression::Path { base, segments }
                    }
                    other => Expression::Path {
                        base: Box::new(other),
                        segments: vec![segment],
                    },
                };
            } else if self.eat(&Token::LParen) {
                let mut args = Vec::new();
                if !self.eat(&Token::RParen) {
                    args.push(self.expression()?);
                    while self.eat(&Token::Comma) {
                        args.push(self.expression()?);
                    }
                    self.expect(&Token::RParen, "')' after arguments")?;
                }
                expr = Expression::FunctionCall {
                    function: Box::new(expr),
                    args,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expression> {
        let position = self.position();
        match self.advance() {
            Token::Number(text) => match Decimal::from_str(&text) {
                Ok(n) => Ok(Expression::Literal(Value::Number(n))),
                Err(_) => Err(FeelError::syntax(
                    position,
                    format!("invalid number literal '{text}'"),
                )),
            },
            Token::Str(text) => Ok(Expression::Literal(Value::String(text))),
            Token::Name(name) => match name.as_str() {
                "true" => Ok(Expression::Literal(Value::Boolean(true))),
                "false" => Ok(Expression::Literal(Value::Boolean(false))),
                "null" => Ok(Expression::Literal(Value::Null)),
                "if" => self.if_expr(),
                _ => Ok(Expression::Name(name)),
            },
            Token::LParen => self.after_lparen(),
            Token::LBracket => self.after_lbracket(),
            Token::LBrace => self.context_literal(),
            other => Err(FeelError::syntax(
                position,
                format!("unexpected {other:?}"),
            )),
        }
    }

    fn if_expr(&mut self) -> Result<Expression> {
        let condition = self.expression()?;
        if !self.eat_keyword("then") {
            return Err(FeelError::syntax(self.position(), "expected 'then'"));
        }
        let then_branch = self.expression()?;
        if !self.eat_keyword("else") {
            return Err(FeelError::syntax(self.position(), "expected 'else'"));
        }
        let else_branch = self.expression()?;
        Ok(Expression::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    /// `(` begins either a grouped expression or a range open at the start.
    fn after_lparen(&mut self) -> Result<Expression> {
        let first = self.expression()?;
        if self.eat(&Token::DotDot) {
            return self.range_rest(RangeBoundary::Open, first);
        }
        self.expect(&Token::RParen, "')'")?;
        Ok(first)
    }

    /// `[` begins either a list or a range closed at the start.
    fn after_lbracket(&mut self) -> Result<Expression> {
        if self.eat(&Token::RBracket) {
            return Ok(Expression::List(Vec::new()));
        }
        let first = self.expression()?;
        if self.eat(&Token::DotDot) {
            return self.range_rest(RangeBoundary::Closed, first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            items.push(self.expression()?);
        }
        self.expect(&Token::RBracket, "']' after list")?;
        Ok(Expression::List(items))
    }

    fn range_rest(&mut self, start_kind: RangeBoundary, start: Expression) -> Result<Expression> {
        let end = self.expression()?;
        let end_kind = match self.advance() {
            Token::RBracket => RangeBoundary::Closed,
            Token::RParen => RangeBoundary::Open,
            other => {
                return Err(FeelError::syntax(
                    self.position(),
                    format!("expected ']' or ')' to close range, found {other:?}"),
                ))
            }
        };
        Ok(Expression::Range {
            start_kind,
            start: Box::new(start),
            end: Box::new(end),
            end_kind,
        })
    }

    fn context_literal(&mut self) -> Result<Expression> {
        let mut entries = Vec::new();
        if self.eat(&Token::RBrace) {
            return Ok(Expression::ContextLit(entries));
        }
        loop {
            let key = match self.advance() {
                Token::Name(name) => name,
                Token::Str(text) => text,
                other => {
                    return Err(FeelError::syntax(
                        self.position(),
                        format!("expected context key, found {other:?}"),
                    ))
                }
            };
            self.expect(&Token::Colon, "':' after context key")?;
            let value = self.expression()?;
            entries.push((key, value));
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBrace, "'}' after context")?;
        Ok(Expression::ContextLit(entries))
    }
}
