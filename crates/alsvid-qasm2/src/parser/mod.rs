//! Recursive descent parser for `OpenQASM` 2.0.

mod expression;
mod statement;

use std::fs;
use std::path::{Path, PathBuf};

use crate::ast::Program;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{SpannedToken, Token, tokenize};

/// Parse a QASM 2.0 file, resolving includes relative to its directory.
pub fn parse_file(path: impl AsRef<Path>) -> ParseResult<Program> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_source(&source, &path.to_string_lossy())
}

/// Parse a QASM 2.0 source string.
///
/// `file` names the source in coordinates and error messages, and serves as
/// the base for resolving relative `include` paths.
pub fn parse_source(source: &str, file: &str) -> ParseResult<Program> {
    let tokens = tokenize(source, file)?;
    Parser::new(tokens, PathBuf::from(file)).parse_program()
}

/// Parser state for one source file.
///
/// Includes spawn a child parser over the included file's tokens, so the
/// coordinates of included commands keep pointing at their own file.
pub(crate) struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    file: PathBuf,
}

impl Parser {
    fn new(tokens: Vec<SpannedToken>, file: PathBuf) -> Self {
        Self {
            tokens,
            pos: 0,
            file,
        }
    }

    /// program: OPENQASM REAL ';' command* EOF
    fn parse_program(mut self) -> ParseResult<Program> {
        let header = self.expect(&Token::OpenQasm)?;
        let version = self.parse_real()?;
        self.expect(&Token::Semicolon)?;

        let mut commands = Vec::new();
        while !self.is_eof() {
            commands.push(self.parse_command()?);
        }

        Ok(Program {
            version,
            commands,
            coordinate: header.coordinate,
        })
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Peek at the current token.
    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Coordinate of the current token, or of the end of input.
    pub(crate) fn coordinate(&self) -> crate::Coordinate {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or_else(
                || crate::Coordinate::new(self.file.to_string_lossy(), 1, 1),
                |t| t.coordinate.clone(),
            )
    }

    /// Advance and return the current token.
    pub(crate) fn advance(&mut self) -> Option<SpannedToken> {
        if self.is_eof() {
            return None;
        }
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        Some(token)
    }

    /// Expect a token with the same discriminant as `expected`.
    pub(crate) fn expect(&mut self, expected: &Token) -> ParseResult<SpannedToken> {
        let coordinate = self.coordinate();
        let found = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof(format!("{expected}")))?;

        if std::mem::discriminant(&found.token) != std::mem::discriminant(expected) {
            return Err(ParseError::UnexpectedToken {
                coordinate,
                expected: expected.to_string(),
                found: found.token.to_string(),
            });
        }
        Ok(found)
    }

    /// Check whether the current token matches.
    pub(crate) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    /// Consume the current token if it matches.
    pub(crate) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Parse a NAME token, returning its text and coordinate.
    pub(crate) fn parse_name(&mut self) -> ParseResult<(String, crate::Coordinate)> {
        let coordinate = self.coordinate();
        match self.advance() {
            Some(SpannedToken {
                token: Token::Name(s),
                coordinate,
            }) => Ok((s, coordinate)),
            Some(other) => Err(ParseError::UnexpectedToken {
                coordinate,
                expected: "identifier".into(),
                found: other.token.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("identifier".into())),
        }
    }

    /// Parse an INTEGER token.
    pub(crate) fn parse_integer(&mut self) -> ParseResult<u64> {
        let coordinate = self.coordinate();
        match self.advance() {
            Some(SpannedToken {
                token: Token::Integer(v),
                ..
            }) => Ok(v),
            Some(other) => Err(ParseError::UnexpectedToken {
                coordinate,
                expected: "integer".into(),
                found: other.token.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("integer".into())),
        }
    }

    /// Parse a REAL token.
    pub(crate) fn parse_real(&mut self) -> ParseResult<f64> {
        let coordinate = self.coordinate();
        match self.advance() {
            Some(SpannedToken {
                token: Token::Real(v),
                ..
            }) => Ok(v),
            Some(other) => Err(ParseError::UnexpectedToken {
                coordinate,
                expected: "real number".into(),
                found: other.token.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("real number".into())),
        }
    }

    /// Parse a STRING token.
    pub(crate) fn parse_string(&mut self) -> ParseResult<String> {
        let coordinate = self.coordinate();
        match self.advance() {
            Some(SpannedToken {
                token: Token::Str(s),
                ..
            }) => Ok(s),
            Some(other) => Err(ParseError::UnexpectedToken {
                coordinate,
                expected: "string".into(),
                found: other.token.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("string".into())),
        }
    }

    /// Resolve an include path against the current file's directory.
    ///
    /// Absolute paths are used as-is; relative paths are joined onto the
    /// directory of the including file.
    pub(crate) fn resolve_include(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.file
                .parent()
                .map_or_else(|| path.to_path_buf(), |dir| dir.join(path))
        }
    }

    /// Parse an included file's commands with a child parser.
    pub(crate) fn parse_included(
        &self,
        path: &Path,
        coordinate: crate::Coordinate,
    ) -> ParseResult<Vec<crate::ast::Command>> {
        let source = fs::read_to_string(path).map_err(|source| ParseError::Include {
            coordinate,
            path: path.to_path_buf(),
            source,
        })?;
        let tokens = tokenize(&source, &path.to_string_lossy())?;

        let mut child = Parser::new(tokens, path.to_path_buf());
        let mut commands = Vec::new();
        while !child.is_eof() {
            commands.push(child.parse_command()?);
        }
        Ok(commands)
    }
}
