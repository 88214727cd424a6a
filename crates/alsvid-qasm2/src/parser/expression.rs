//! Parameter expression parsing.

use super::Parser;
use crate::ast::{BinOp, ExprKind, Expression};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    /// expressions: (expression (',' expression)*)?
    ///
    /// Used for gate-call parameter lists; the list may be empty.
    pub(crate) fn parse_expressions(&mut self) -> ParseResult<Vec<Expression>> {
        let starts_expression = matches!(
            self.peek(),
            Some(
                Token::LParen
                    | Token::Plus
                    | Token::Minus
                    | Token::Integer(_)
                    | Token::Real(_)
                    | Token::Name(_)
            )
        );
        if !starts_expression {
            return Ok(Vec::new());
        }

        let mut expressions = vec![self.parse_expression()?];
        while self.consume(&Token::Comma) {
            expressions.push(self.parse_expression()?);
        }
        Ok(expressions)
    }

    /// expression: product (('+'|'-') product)*
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expression> {
        let mut expression = self.parse_product()?;

        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            let coordinate = self.coordinate();
            self.advance();
            let right = self.parse_product()?;
            expression = Expression {
                coordinate,
                kind: ExprKind::Operation {
                    op,
                    left: Box::new(expression),
                    right: Box::new(right),
                },
            };
        }

        Ok(expression)
    }

    /// product: power (('*'|'/') power)*
    fn parse_product(&mut self) -> ParseResult<Expression> {
        let mut expression = self.parse_power()?;

        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => break,
            };
            let coordinate = self.coordinate();
            self.advance();
            let right = self.parse_power()?;
            expression = Expression {
                coordinate,
                kind: ExprKind::Operation {
                    op,
                    left: Box::new(expression),
                    right: Box::new(right),
                },
            };
        }

        Ok(expression)
    }

    /// power: atom ('^' atom)?
    ///
    /// At most one exponentiation; `a^b^c` is a syntax error downstream.
    fn parse_power(&mut self) -> ParseResult<Expression> {
        let expression = self.parse_atom()?;

        if self.check(&Token::Caret) {
            let coordinate = self.coordinate();
            self.advance();
            let right = self.parse_atom()?;
            return Ok(Expression {
                coordinate,
                kind: ExprKind::Operation {
                    op: BinOp::Pow,
                    left: Box::new(expression),
                    right: Box::new(right),
                },
            });
        }

        Ok(expression)
    }

    /// atom: '(' expression ')' | ('+'|'-') expression
    ///     | INTEGER | REAL | NAME ('(' expression ')')?
    ///
    /// A leading sign folds into `0 ± <expression>` and deliberately binds
    /// the whole following expression, not just the next atom.
    #[allow(clippy::cast_precision_loss)]
    fn parse_atom(&mut self) -> ParseResult<Expression> {
        let coordinate = self.coordinate();

        match self.peek() {
            Some(Token::LParen) => {
                self.advance();
                let expression = self.parse_expression()?;
                self.expect(&Token::RParen)?;
                Ok(expression)
            }
            Some(Token::Plus | Token::Minus) => {
                let op = if matches!(self.peek(), Some(Token::Plus)) {
                    BinOp::Add
                } else {
                    BinOp::Sub
                };
                self.advance();
                let expression = self.parse_expression()?;
                Ok(Expression {
                    coordinate: coordinate.clone(),
                    kind: ExprKind::Operation {
                        op,
                        left: Box::new(Expression {
                            coordinate,
                            kind: ExprKind::Value(0.0),
                        }),
                        right: Box::new(expression),
                    },
                })
            }
            Some(Token::Integer(v)) => {
                let value = *v as f64;
                self.advance();
                Ok(Expression {
                    coordinate,
                    kind: ExprKind::Value(value),
                })
            }
            Some(Token::Real(v)) => {
                let value = *v;
                self.advance();
                Ok(Expression {
                    coordinate,
                    kind: ExprKind::Value(value),
                })
            }
            Some(Token::Name(_)) => {
                let (name, coordinate) = self.parse_name()?;
                if self.consume(&Token::LParen) {
                    let arg = self.parse_expression()?;
                    self.expect(&Token::RParen)?;
                    Ok(Expression {
                        coordinate,
                        kind: ExprKind::Function {
                            name,
                            arg: Box::new(arg),
                        },
                    })
                } else {
                    Ok(Expression {
                        coordinate,
                        kind: ExprKind::Constant(name),
                    })
                }
            }
            Some(other) => Err(ParseError::UnexpectedToken {
                coordinate,
                expected: "expression".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("expression".into())),
        }
    }
}
