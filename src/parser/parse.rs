//! Parser context and entry point
//!
//! This module provides the [`Parser`] struct and core parsing
//! infrastructure: the error type, shared helper methods, and the public
//! [`parse_type`] entry point.
//!
//! # Parser Architecture
//!
//! Recursive descent over the token stream, split across modules using
//! `impl Parser` blocks:
//! - This module: the per-parse context and coordination
//! - `base_type`: qualifier/modifier handling and base-type resolution
//! - `declarator`: the "sequel" — pointers, grouping parens, parameter
//!   lists, array dimensions
//!
//! A `Parser` lives for exactly one input string. Errors are threaded as
//! `Result` through every parse function; the first error propagates out via
//! `?` and aborts the parse, so there is no out-of-band sticky state and no
//! partial-result mode.

use crate::opcode::{Opcode, OpcodeBuffer};
use crate::parser::lexer::{Lexer, TokenKind};
use crate::tables::{ConstantResolver, NameTables};
use thiserror::Error;

/// A failed parse: a static diagnostic plus the byte offset into the input
/// where the offending token starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("parse error at offset {position}: {message}")]
pub struct ParseError {
    pub message: &'static str,
    pub position: usize,
}

/// Parse one C type declaration into `output` and return the index of the
/// entry-point opcode representing the complete type.
///
/// `input` may contain a placeholder identifier standing in for the declared
/// name (`"int (*fn)(void)"` parses the same as `"int (*)(void)"`). The
/// whole input must be consumed; trailing tokens are an error.
///
/// The tables and the constant resolver are read-only collaborators; the
/// buffer is owned exclusively by this call for its duration. Parsing the
/// same input with the same tables always yields the same opcode sequence
/// and entry index.
pub fn parse_type(
    input: &str,
    tables: NameTables<'_>,
    consts: &dyn ConstantResolver,
    output: &mut OpcodeBuffer,
) -> Result<usize, ParseError> {
    let mut parser = Parser::new(input, tables, consts, output);
    let index = parser.parse_complete_type()?;
    if parser.kind() != TokenKind::End {
        return Err(parser.error("unexpected symbol"));
    }
    Ok(index)
}

/// Per-parse context: the token stream plus borrowed collaborators.
pub(crate) struct Parser<'a, 'b> {
    pub(crate) lexer: Lexer<'a>,
    pub(crate) tables: NameTables<'b>,
    pub(crate) consts: &'b dyn ConstantResolver,
    pub(crate) output: &'b mut OpcodeBuffer,
}

impl<'a, 'b> Parser<'a, 'b> {
    pub(crate) fn new(
        input: &'a str,
        tables: NameTables<'b>,
        consts: &'b dyn ConstantResolver,
        output: &'b mut OpcodeBuffer,
    ) -> Self {
        Self {
            lexer: Lexer::new(input),
            tables,
            consts,
            output,
        }
    }

    // ===== Helper methods =====

    /// Kind of the current token.
    pub(crate) fn kind(&self) -> TokenKind {
        self.lexer.token().kind
    }

    /// Text of the current token, borrowed from the input string.
    pub(crate) fn text(&self) -> &'a str {
        self.lexer.token().text
    }

    /// An error positioned at the current token.
    pub(crate) fn error(&self, message: &'static str) -> ParseError {
        ParseError {
            message,
            position: self.lexer.token().pos,
        }
    }

    /// Append an opcode, turning buffer exhaustion into a parse error at the
    /// current position.
    pub(crate) fn write(&mut self, op: Opcode) -> Result<usize, ParseError> {
        self.output
            .push(op)
            .map_err(|_| self.error("internal type complexity limit reached"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Primitive;
    use crate::tables::ConstantValue;

    fn no_consts(_: usize) -> ConstantValue {
        ConstantValue::Disagreement
    }

    #[test]
    fn test_parse_simple_primitive() {
        let mut buf = OpcodeBuffer::with_capacity(8);
        let entry =
            parse_type("int", NameTables::default(), &no_consts, &mut buf)
                .unwrap();
        assert_eq!(entry, 0);
        assert_eq!(buf.ops(), &[Opcode::Primitive(Primitive::Int)]);
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let mut buf = OpcodeBuffer::with_capacity(8);
        let err =
            parse_type("int int", NameTables::default(), &no_consts, &mut buf)
                .unwrap_err();
        assert_eq!(err.message, "unexpected symbol");
        assert_eq!(err.position, 4);
    }

    #[test]
    fn test_empty_input_rejected() {
        let mut buf = OpcodeBuffer::with_capacity(8);
        let err =
            parse_type("", NameTables::default(), &no_consts, &mut buf)
                .unwrap_err();
        assert_eq!(err.message, "identifier expected");
        assert_eq!(err.position, 0);
    }

    #[test]
    fn test_error_display() {
        let err = ParseError {
            message: "undefined type name",
            position: 7,
        };
        assert_eq!(
            err.to_string(),
            "parse error at offset 7: undefined type name"
        );
    }
}
