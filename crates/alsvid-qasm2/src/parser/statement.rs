//! Command parsing for QASM 2.0.

use super::Parser;
use crate::ast::{Command, CommandKind, GateCall, GateDecl, RegRef};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    /// command: include | creg_decl | qreg_decl | gate_decl | opaque_decl
    ///        | gate_call | barrier | reset | measure | condition
    pub(crate) fn parse_command(&mut self) -> ParseResult<Command> {
        match self.peek() {
            Some(Token::Include) => self.parse_include(),
            Some(Token::Creg) => self.parse_creg_decl(),
            Some(Token::Qreg) => self.parse_qreg_decl(),
            Some(Token::Gate) => self.parse_gate_decl(),
            Some(Token::Opaque) => self.parse_opaque_decl(),
            Some(Token::Name(_)) => self.parse_gate_call(),
            Some(Token::Barrier) => self.parse_barrier(),
            Some(Token::Reset) => self.parse_reset(),
            Some(Token::Measure) => self.parse_measure(),
            Some(Token::If) => self.parse_condition(),
            Some(other) => Err(ParseError::UnexpectedToken {
                coordinate: self.coordinate(),
                expected: "command".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("command".into())),
        }
    }

    /// include: 'include' STRING ';'
    ///
    /// The referenced file is read and parsed on the spot; its commands
    /// become this node's children.
    fn parse_include(&mut self) -> ParseResult<Command> {
        let coordinate = self.expect(&Token::Include)?.coordinate;
        let file = self.parse_string()?;
        self.expect(&Token::Semicolon)?;

        let path = self.resolve_include(&file);
        let commands = self.parse_included(&path, coordinate.clone())?;

        Ok(Command {
            coordinate,
            kind: CommandKind::Include { commands },
        })
    }

    /// creg_decl: 'creg' NAME '[' INTEGER ']' ';'
    fn parse_creg_decl(&mut self) -> ParseResult<Command> {
        let coordinate = self.expect(&Token::Creg)?.coordinate;
        let (name, _) = self.parse_name()?;
        self.expect(&Token::LBracket)?;
        let size = self.parse_integer()?;
        self.expect(&Token::RBracket)?;
        self.expect(&Token::Semicolon)?;

        Ok(Command {
            coordinate,
            kind: CommandKind::CregDecl { name, size },
        })
    }

    /// qreg_decl: 'qreg' NAME '[' INTEGER ']' ';'
    fn parse_qreg_decl(&mut self) -> ParseResult<Command> {
        let coordinate = self.expect(&Token::Qreg)?.coordinate;
        let (name, _) = self.parse_name()?;
        self.expect(&Token::LBracket)?;
        let size = self.parse_integer()?;
        self.expect(&Token::RBracket)?;
        self.expect(&Token::Semicolon)?;

        Ok(Command {
            coordinate,
            kind: CommandKind::QregDecl { name, size },
        })
    }

    /// gate_decl: 'gate' NAME ('(' params? ')')? args '{' (gate_call|barrier)* '}'
    fn parse_gate_decl(&mut self) -> ParseResult<Command> {
        let coordinate = self.expect(&Token::Gate)?.coordinate;
        let (name, _) = self.parse_name()?;
        let params = self.parse_formal_params()?;
        let args = self.parse_name_list()?;

        self.expect(&Token::LBrace)?;
        let mut body = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Name(_)) => body.push(self.parse_gate_call()?),
                Some(Token::Barrier) => body.push(self.parse_barrier()?),
                _ => break,
            }
        }
        self.expect(&Token::RBrace)?;

        Ok(Command {
            coordinate,
            kind: CommandKind::GateDecl(GateDecl {
                name,
                params,
                args,
                body,
            }),
        })
    }

    /// opaque_decl: 'opaque' NAME ('(' params? ')')? args ';'
    fn parse_opaque_decl(&mut self) -> ParseResult<Command> {
        let coordinate = self.expect(&Token::Opaque)?.coordinate;
        let (name, _) = self.parse_name()?;
        let params = self.parse_formal_params()?;
        let args = self.parse_name_list()?;
        self.expect(&Token::Semicolon)?;

        Ok(Command {
            coordinate,
            kind: CommandKind::OpaqueDecl { name, params, args },
        })
    }

    /// gate_call: NAME ('(' expressions? ')')? regrefs ';'
    fn parse_gate_call(&mut self) -> ParseResult<Command> {
        let (name, coordinate) = self.parse_name()?;

        let params = if self.consume(&Token::LParen) {
            let params = self.parse_expressions()?;
            self.expect(&Token::RParen)?;
            params
        } else {
            Vec::new()
        };

        let args = self.parse_regrefs()?;
        self.expect(&Token::Semicolon)?;

        Ok(Command {
            coordinate,
            kind: CommandKind::GateCall(GateCall { name, params, args }),
        })
    }

    /// barrier: 'barrier' regrefs ';'
    fn parse_barrier(&mut self) -> ParseResult<Command> {
        let coordinate = self.expect(&Token::Barrier)?.coordinate;
        let args = self.parse_regrefs()?;
        self.expect(&Token::Semicolon)?;

        Ok(Command {
            coordinate,
            kind: CommandKind::Barrier { args },
        })
    }

    /// reset: 'reset' regref ';'
    fn parse_reset(&mut self) -> ParseResult<Command> {
        let coordinate = self.expect(&Token::Reset)?.coordinate;
        let target = self.parse_regref()?;
        self.expect(&Token::Semicolon)?;

        Ok(Command {
            coordinate,
            kind: CommandKind::Reset { target },
        })
    }

    /// measure: 'measure' regref '->' regref ';'
    fn parse_measure(&mut self) -> ParseResult<Command> {
        let coordinate = self.expect(&Token::Measure)?.coordinate;
        let source = self.parse_regref()?;
        self.expect(&Token::Arrow)?;
        let target = self.parse_regref()?;
        self.expect(&Token::Semicolon)?;

        Ok(Command {
            coordinate,
            kind: CommandKind::Measure { source, target },
        })
    }

    /// condition: 'if' '(' regref '==' INTEGER ')' (gate_call|reset|measure)
    fn parse_condition(&mut self) -> ParseResult<Command> {
        let coordinate = self.expect(&Token::If)?.coordinate;
        self.expect(&Token::LParen)?;
        let reg = self.parse_regref()?;
        self.expect(&Token::EqEq)?;
        let criteria = self.parse_integer()?;
        self.expect(&Token::RParen)?;

        let command = match self.peek() {
            Some(Token::Name(_)) => self.parse_gate_call()?,
            Some(Token::Reset) => self.parse_reset()?,
            Some(Token::Measure) => self.parse_measure()?,
            Some(other) => {
                return Err(ParseError::UnexpectedToken {
                    coordinate: self.coordinate(),
                    expected: "gate call, reset or measure".into(),
                    found: other.to_string(),
                });
            }
            None => return Err(ParseError::UnexpectedEof("guarded command".into())),
        };

        Ok(Command {
            coordinate,
            kind: CommandKind::Condition {
                reg,
                criteria,
                command: Box::new(command),
            },
        })
    }

    /// regref: NAME ('[' INTEGER ']')?
    fn parse_regref(&mut self) -> ParseResult<RegRef> {
        let (name, coordinate) = self.parse_name()?;

        if self.consume(&Token::LBracket) {
            let index = self.parse_integer()?;
            self.expect(&Token::RBracket)?;
            Ok(RegRef::indexed(coordinate, name, index))
        } else {
            Ok(RegRef::whole(coordinate, name))
        }
    }

    /// regrefs: regref (',' regref)*
    fn parse_regrefs(&mut self) -> ParseResult<Vec<RegRef>> {
        let mut refs = vec![self.parse_regref()?];
        while self.consume(&Token::Comma) {
            refs.push(self.parse_regref()?);
        }
        Ok(refs)
    }

    /// names: NAME (',' NAME)*
    fn parse_name_list(&mut self) -> ParseResult<Vec<String>> {
        let mut names = vec![self.parse_name()?.0];
        while self.consume(&Token::Comma) {
            names.push(self.parse_name()?.0);
        }
        Ok(names)
    }

    /// Optional parenthesized formal parameter names; the list itself may be
    /// empty (`gate g() a { }`).
    fn parse_formal_params(&mut self) -> ParseResult<Vec<String>> {
        if !self.consume(&Token::LParen) {
            return Ok(Vec::new());
        }

        let mut params = Vec::new();
        if matches!(self.peek(), Some(Token::Name(_))) {
            params.push(self.parse_name()?.0);
            while self.consume(&Token::Comma) {
                params.push(self.parse_name()?.0);
            }
        }
        self.expect(&Token::RParen)?;
        Ok(params)
    }
}
