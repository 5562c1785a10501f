//! Declarator ("sequel") parsing
//!
//! Parses everything after the base type: pointers, grouping parentheses,
//! function parameter lists, and array dimensions. C declarators wrap from
//! the inside out, so the function takes the base type's opcode index
//! (`outer`) and returns the index of the *innermost* opcode, which is the
//! entry point for the complete type.
//!
//! Pieces are chained through a single dangling forward reference: each new
//! postfix piece (function, array) is patched into the reference left open
//! by the previous piece, and the last open reference is finally patched to
//! point at `outer`. This keeps the nesting of pointer-to-array-of-function
//! declarations correct without building an intermediate tree.

use crate::opcode::{CallFlags, Opcode};
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};
use crate::tables::{ConstantValue, GlobalKind};

impl Parser<'_, '_> {
    /// Parse the declarator that follows the base type at `outer`. Returns
    /// the entry-point index of the complete type.
    pub(crate) fn parse_declarator(
        &mut self,
        mut outer: usize,
    ) -> Result<usize, ParseError> {
        // A recorded calling convention must eventually reach a function
        // declarator; __cdecl maps to the default flags.
        let mut abi: Option<CallFlags> = None;

        loop {
            match self.kind() {
                TokenKind::Star => {
                    outer = self.write(Opcode::Pointer { item: outer })?;
                    self.lexer.next();
                }
                TokenKind::Const | TokenKind::Volatile => self.lexer.next(),
                TokenKind::Cdecl => {
                    abi = Some(CallFlags::Default);
                    self.lexer.next();
                }
                TokenKind::Stdcall => {
                    abi = Some(CallFlags::StdCall);
                    self.lexer.next();
                }
                _ => break,
            }
        }

        let mut grouping_allowed = true;
        if self.kind() == TokenKind::Identifier {
            // Skip a declared variable name; after it, a '(' can only start
            // a parameter list.
            self.lexer.next();
            grouping_allowed = false;
        }

        // Entry point of the sequel and the opcode whose forward reference
        // is still dangling.
        let mut entry: Option<usize> = None;
        let mut tail: Option<usize> = None;

        while self.kind() == TokenKind::OpenParen {
            self.lexer.next();
            match self.kind() {
                TokenKind::Cdecl => {
                    abi = Some(CallFlags::Default);
                    self.lexer.next();
                }
                TokenKind::Stdcall => {
                    abi = Some(CallFlags::StdCall);
                    self.lexer.next();
                }
                _ => {}
            }

            let grouping = grouping_allowed
                && matches!(
                    self.kind(),
                    TokenKind::Star
                        | TokenKind::Const
                        | TokenKind::Volatile
                        | TokenKind::OpenBracket
                );
            grouping_allowed = false;

            if grouping {
                // Parentheses for grouping: the inner declarator wraps a
                // NOOP placeholder, and later pieces chain through it.
                let noop = self.write(Opcode::Noop { target: 0 })?;
                let inner = self.parse_declarator(noop)?;
                entry = Some(inner);
                tail = Some(noop);
            } else {
                self.parse_parameter_list(&mut entry, &mut tail, &mut abi)?;
            }

            if self.kind() != TokenKind::CloseParen {
                return Err(self.error("expected ')'"));
            }
            self.lexer.next();
        }

        if abi.is_some() {
            // A calling convention was recorded but no parameter list ever
            // consumed it.
            return Err(self.error("expected '('"));
        }

        while self.kind() == TokenKind::OpenBracket {
            self.lexer.next();
            let piece = if self.kind() == TokenKind::CloseBracket {
                self.write(Opcode::OpenArray { item: 0 })?
            } else {
                let length = self.parse_array_length()?;
                self.write(Opcode::Array { item: 0, length })?
            };
            self.link(&mut entry, &mut tail, piece);
            if self.kind() != TokenKind::CloseBracket {
                return Err(self.error("expected ']'"));
            }
            self.lexer.next();
        }

        if let Some(slot) = tail {
            self.output.set_target(slot, outer);
        }
        Ok(entry.unwrap_or(outer))
    }

    /// Parse a function parameter list, the opening paren already consumed.
    ///
    /// The parameter count is over-estimated by scanning ahead for top-level
    /// commas, so that exactly that many slots plus a terminator can be
    /// reserved contiguously right after the FUNCTION opcode. Parameters are
    /// then written into the reserved slots, keeping the function layout
    /// position-addressable. Slots the estimate reserved but no parameter
    /// used stay NOOP placeholders past the terminator.
    fn parse_parameter_list(
        &mut self,
        entry: &mut Option<usize>,
        tail: &mut Option<usize>,
        abi: &mut Option<CallFlags>,
    ) -> Result<(), ParseError> {
        let mut flags = abi.take().unwrap_or(CallFlags::Default);

        // '(void)' with nothing else means zero parameters.
        if self.kind() == TokenKind::Void
            && self.lexer.following_char() == Some(b')')
        {
            self.lexer.next();
        }

        let arg_total = self.lexer.count_top_level_commas() + 1;

        let base = self.write(Opcode::Function { result: 0 })?;
        self.link(entry, tail, base);
        for _ in 0..=arg_total {
            self.write(Opcode::Noop { target: 0 })?;
        }

        let mut arg_next = base + 1;
        if self.kind() != TokenKind::CloseParen {
            loop {
                if self.kind() == TokenKind::DotDotDot {
                    // Variadic functions are always the default calling
                    // convention; this overwrites a recorded __stdcall.
                    flags = CallFlags::Variadic;
                    self.lexer.next();
                    break;
                }
                let mut arg = self.parse_complete_type()?;
                // Function-parameter decay: arrays become pointers to their
                // element type, functions become pointers to the function.
                arg = match self.output.get(arg) {
                    Some(Opcode::Array { item, .. })
                    | Some(Opcode::OpenArray { item }) => {
                        self.write(Opcode::Pointer { item })?
                    }
                    Some(Opcode::Function { .. }) => {
                        self.write(Opcode::Pointer { item: arg })?
                    }
                    _ => arg,
                };
                self.output.set(arg_next, Opcode::Noop { target: arg });
                arg_next += 1;
                if self.kind() != TokenKind::Comma {
                    break;
                }
                self.lexer.next();
            }
        }
        self.output.set(arg_next, Opcode::FunctionEnd { flags });
        Ok(())
    }

    /// An array bound: a decimal/hex literal, or an identifier naming an
    /// integer constant in the globals table.
    fn parse_array_length(&mut self) -> Result<u64, ParseError> {
        let value = match self.kind() {
            TokenKind::Integer => {
                parse_integer(self.text()).map_err(|msg| self.error(msg))?
            }
            TokenKind::Identifier => self.resolve_constant_bound()?,
            _ => {
                return Err(
                    self.error("expected a positive integer constant")
                )
            }
        };
        if value > isize::MAX as u64 {
            return Err(self.error("number too large"));
        }
        self.lexer.next();
        Ok(value)
    }

    fn resolve_constant_bound(&mut self) -> Result<u64, ParseError> {
        let gindex = self
            .tables
            .search_global(self.text())
            .ok_or_else(|| self.error("expected a positive integer constant"))?;
        match self.tables.globals[gindex].kind {
            GlobalKind::ConstantInt | GlobalKind::EnumConstant => {}
            GlobalKind::Other => {
                return Err(
                    self.error("expected a positive integer constant")
                );
            }
        }
        match self.consts.constant_value(gindex) {
            ConstantValue::Positive(value) => Ok(value),
            ConstantValue::Negative(_) => {
                Err(self.error("expected a positive integer constant"))
            }
            ConstantValue::Disagreement => {
                Err(self.error("disagreement about this constant's value"))
            }
        }
    }

    /// Chain a new piece into the sequel: patch the dangling reference of
    /// the previous piece (or make this piece the entry point), then leave
    /// this piece's own reference dangling.
    fn link(
        &mut self,
        entry: &mut Option<usize>,
        tail: &mut Option<usize>,
        index: usize,
    ) {
        match *tail {
            Some(slot) => self.output.set_target(slot, index),
            None => *entry = Some(index),
        }
        *tail = Some(index);
    }
}

/// Convert an integer literal with overflow detection. The lexer's greedy
/// scan means `text` may contain stray hex digits or `x`s; they surface as
/// "invalid number" here.
fn parse_integer(text: &str) -> Result<u64, &'static str> {
    let (digits, radix) = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(rest) => (rest, 16),
        None => (text, 10),
    };
    if digits.is_empty() {
        return Err("invalid number");
    }
    match u64::from_str_radix(digits, radix) {
        Ok(value) => Ok(value),
        Err(err)
            if matches!(err.kind(), std::num::IntErrorKind::PosOverflow) =>
        {
            Err("number too large")
        }
        Err(_) => Err("invalid number"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::{OpcodeBuffer, Primitive};
    use crate::parser::parse::parse_type;
    use crate::tables::{GlobalDef, NameTables};

    fn no_consts(_: usize) -> ConstantValue {
        ConstantValue::Disagreement
    }

    fn parse(input: &str) -> Result<(Vec<Opcode>, usize), ParseError> {
        let mut buf = OpcodeBuffer::with_capacity(64);
        let entry =
            parse_type(input, NameTables::default(), &no_consts, &mut buf)?;
        Ok((buf.ops().to_vec(), entry))
    }

    #[test]
    fn test_pointer_chain() {
        let (ops, entry) = parse("int***").unwrap();
        assert_eq!(
            ops,
            vec![
                Opcode::Primitive(Primitive::Int),
                Opcode::Pointer { item: 0 },
                Opcode::Pointer { item: 1 },
                Opcode::Pointer { item: 2 },
            ]
        );
        assert_eq!(entry, 3);
    }

    #[test]
    fn test_qualified_pointers() {
        // Qualifiers between stars are consumed and ignored.
        let (ops, entry) = parse("char * const volatile *").unwrap();
        assert_eq!(
            ops,
            vec![
                Opcode::Primitive(Primitive::Char),
                Opcode::Pointer { item: 0 },
                Opcode::Pointer { item: 1 },
            ]
        );
        assert_eq!(entry, 2);
    }

    #[test]
    fn test_fixed_array() {
        let (ops, entry) = parse("int[10]").unwrap();
        assert_eq!(
            ops,
            vec![
                Opcode::Primitive(Primitive::Int),
                Opcode::Array {
                    item: 0,
                    length: 10
                },
            ]
        );
        assert_eq!(entry, 1);
    }

    #[test]
    fn test_hex_array_bound() {
        let (ops, entry) = parse("int[0x10]").unwrap();
        assert_eq!(
            ops[entry],
            Opcode::Array {
                item: 0,
                length: 16
            }
        );
    }

    #[test]
    fn test_open_array() {
        let (ops, entry) = parse("int[]").unwrap();
        assert_eq!(
            ops,
            vec![
                Opcode::Primitive(Primitive::Int),
                Opcode::OpenArray { item: 0 },
            ]
        );
        assert_eq!(entry, 1);
    }

    #[test]
    fn test_array_of_arrays_nests_outermost_first() {
        let (ops, entry) = parse("int[2][3]").unwrap();
        // Entry is the [2] dimension, which wraps the [3] dimension.
        assert_eq!(
            ops[entry],
            Opcode::Array {
                item: 2,
                length: 2
            }
        );
        assert_eq!(
            ops[2],
            Opcode::Array {
                item: 0,
                length: 3
            }
        );
        assert_eq!(ops[0], Opcode::Primitive(Primitive::Int));
    }

    #[test]
    fn test_declared_name_is_skipped() {
        let (ops_anon, entry_anon) = parse("int*[4]").unwrap();
        let (ops_named, entry_named) = parse("int *values[4]").unwrap();
        assert_eq!(ops_anon, ops_named);
        assert_eq!(entry_anon, entry_named);
    }

    #[test]
    fn test_function_pointer() {
        let (ops, entry) = parse("int(*)(int,int)").unwrap();
        assert_eq!(
            ops,
            vec![
                Opcode::Primitive(Primitive::Int),
                Opcode::Noop { target: 3 },
                Opcode::Pointer { item: 1 },
                Opcode::Function { result: 0 },
                Opcode::Noop { target: 7 },
                Opcode::Noop { target: 8 },
                Opcode::FunctionEnd {
                    flags: CallFlags::Default
                },
                Opcode::Primitive(Primitive::Int),
                Opcode::Primitive(Primitive::Int),
            ]
        );
        assert_eq!(entry, 2);
    }

    #[test]
    fn test_function_zero_parameters() {
        let (ops, entry) = parse("int(void)").unwrap();
        assert_eq!(ops[entry], Opcode::Function { result: 0 });
        assert_eq!(
            ops[entry + 1],
            Opcode::FunctionEnd {
                flags: CallFlags::Default
            }
        );
    }

    #[test]
    fn test_void_parameter_only_special_with_close_paren() {
        // 'void' followed by anything but ')' is a real parameter type.
        let (ops, entry) = parse("int(void *)").unwrap();
        assert_eq!(ops[entry], Opcode::Function { result: 0 });
        let param = match ops[entry + 1] {
            Opcode::Noop { target } => target,
            other => panic!("expected parameter slot, got {}", other),
        };
        assert_eq!(ops[param], Opcode::Pointer { item: param - 1 });
        assert_eq!(ops[param - 1], Opcode::Primitive(Primitive::Void));
    }

    #[test]
    fn test_variadic_function() {
        let (ops, _) = parse("int(int,...)").unwrap();
        assert!(ops.contains(&Opcode::FunctionEnd {
            flags: CallFlags::Variadic
        }));
    }

    #[test]
    fn test_ellipsis_must_be_last() {
        let err = parse("int(...,int)").unwrap_err();
        assert_eq!(err.message, "expected ')'");
    }

    #[test]
    fn test_parameter_decay() {
        // Array parameters decay to pointers to the element type.
        let (ops, entry) = parse("void(int[10])").unwrap();
        let param = match ops[entry + 1] {
            Opcode::Noop { target } => target,
            other => panic!("expected parameter slot, got {}", other),
        };
        match ops[param] {
            Opcode::Pointer { item } => {
                assert_eq!(ops[item], Opcode::Primitive(Primitive::Int));
            }
            other => panic!("expected decayed pointer, got {}", other),
        }

        // Open arrays decay the same way.
        let (ops, entry) = parse("void(char[])").unwrap();
        let param = match ops[entry + 1] {
            Opcode::Noop { target } => target,
            other => panic!("expected parameter slot, got {}", other),
        };
        match ops[param] {
            Opcode::Pointer { item } => {
                assert_eq!(ops[item], Opcode::Primitive(Primitive::Char));
            }
            other => panic!("expected decayed pointer, got {}", other),
        }
    }

    #[test]
    fn test_function_parameter_decays_to_function_pointer() {
        let (ops, entry) = parse("void(int(char))").unwrap();
        let param = match ops[entry + 1] {
            Opcode::Noop { target } => target,
            other => panic!("expected parameter slot, got {}", other),
        };
        match ops[param] {
            Opcode::Pointer { item } => {
                // The inner function returns the int written at index 4.
                assert_eq!(ops[item], Opcode::Function { result: 4 });
            }
            other => panic!("expected pointer to function, got {}", other),
        }
    }

    #[test]
    fn test_grouping_parens() {
        // Pointer to array of 8 ints.
        let (ops, entry) = parse("int(*)[8]").unwrap();
        match ops[entry] {
            Opcode::Pointer { item } => match ops[item] {
                Opcode::Noop { target } => {
                    assert_eq!(
                        ops[target],
                        Opcode::Array {
                            item: 0,
                            length: 8
                        }
                    );
                    assert_eq!(ops[0], Opcode::Primitive(Primitive::Int));
                }
                other => panic!("expected grouping noop, got {}", other),
            },
            other => panic!("expected pointer, got {}", other),
        }
    }

    #[test]
    fn test_array_of_function_pointers() {
        let (ops, entry) = parse("int(*[4])(char)").unwrap();
        // Entry: array of 4 wrapping pointer wrapping noop -> function.
        let pointer = match ops[entry] {
            Opcode::Array { item, length: 4 } => item,
            other => panic!("expected array, got {}", other),
        };
        let noop = match ops[pointer] {
            Opcode::Pointer { item } => item,
            other => panic!("expected pointer, got {}", other),
        };
        let func = match ops[noop] {
            Opcode::Noop { target } => target,
            other => panic!("expected noop, got {}", other),
        };
        assert_eq!(ops[func], Opcode::Function { result: 0 });
    }

    #[test]
    fn test_stdcall_function() {
        let (ops, _) = parse("int __stdcall(int)").unwrap();
        assert!(ops.contains(&Opcode::FunctionEnd {
            flags: CallFlags::StdCall
        }));

        let (ops, _) = parse("int (__stdcall *)(int)").unwrap();
        assert!(ops.contains(&Opcode::FunctionEnd {
            flags: CallFlags::StdCall
        }));
    }

    #[test]
    fn test_cdecl_is_default_flags() {
        let (ops, _) = parse("int __cdecl(int)").unwrap();
        assert!(ops.contains(&Opcode::FunctionEnd {
            flags: CallFlags::Default
        }));
    }

    #[test]
    fn test_variadic_overrides_stdcall() {
        let (ops, _) = parse("int __stdcall(int,...)").unwrap();
        assert!(ops.contains(&Opcode::FunctionEnd {
            flags: CallFlags::Variadic
        }));
    }

    #[test]
    fn test_dangling_calling_convention() {
        let err = parse("int __stdcall").unwrap_err();
        assert_eq!(err.message, "expected '('");
        let err = parse("int __cdecl *x").unwrap_err();
        assert_eq!(err.message, "expected '('");
    }

    #[test]
    fn test_unclosed_brackets_and_parens() {
        let err = parse("int[10").unwrap_err();
        assert_eq!(err.message, "expected ']'");
        let err = parse("int(*").unwrap_err();
        assert_eq!(err.message, "expected ')'");
    }

    #[test]
    fn test_bad_array_bounds() {
        let err = parse("int[12ff]").unwrap_err();
        assert_eq!(err.message, "invalid number");
        let err = parse("int[0x]").unwrap_err();
        assert_eq!(err.message, "invalid number");
        let err = parse("int[99999999999999999999999]").unwrap_err();
        assert_eq!(err.message, "number too large");
        // Fits in u64 but exceeds the signed-size bound.
        let err = parse("int[0xffffffffffffffff]").unwrap_err();
        assert_eq!(err.message, "number too large");
    }

    #[test]
    fn test_named_constant_bound() {
        let globals = [
            GlobalDef {
                name: "BUFSIZE",
                kind: GlobalKind::ConstantInt,
            },
            GlobalDef {
                name: "E_LAST",
                kind: GlobalKind::EnumConstant,
            },
            GlobalDef {
                name: "NEG",
                kind: GlobalKind::ConstantInt,
            },
            GlobalDef {
                name: "WOBBLY",
                kind: GlobalKind::ConstantInt,
            },
            GlobalDef {
                name: "printf",
                kind: GlobalKind::Other,
            },
        ];
        let tables = NameTables::new(&globals, &[], &[], &[]);
        let consts = |index: usize| match index {
            0 => ConstantValue::Positive(640),
            1 => ConstantValue::Positive(3),
            2 => ConstantValue::Negative(1),
            _ => ConstantValue::Disagreement,
        };

        let mut buf = OpcodeBuffer::with_capacity(16);
        let entry =
            parse_type("int[BUFSIZE]", tables, &consts, &mut buf).unwrap();
        assert_eq!(
            buf.get(entry),
            Some(Opcode::Array {
                item: 0,
                length: 640
            })
        );

        let mut buf = OpcodeBuffer::with_capacity(16);
        let entry =
            parse_type("int[E_LAST]", tables, &consts, &mut buf).unwrap();
        assert_eq!(
            buf.get(entry),
            Some(Opcode::Array {
                item: 0,
                length: 3
            })
        );

        let mut buf = OpcodeBuffer::with_capacity(16);
        let err = parse_type("int[NEG]", tables, &consts, &mut buf)
            .unwrap_err();
        assert_eq!(err.message, "expected a positive integer constant");

        let mut buf = OpcodeBuffer::with_capacity(16);
        let err = parse_type("int[WOBBLY]", tables, &consts, &mut buf)
            .unwrap_err();
        assert_eq!(err.message, "disagreement about this constant's value");

        // A global that is not a constant cannot size an array.
        let mut buf = OpcodeBuffer::with_capacity(16);
        let err = parse_type("int[printf]", tables, &consts, &mut buf)
            .unwrap_err();
        assert_eq!(err.message, "expected a positive integer constant");

        // An unknown identifier either.
        let mut buf = OpcodeBuffer::with_capacity(16);
        let err = parse_type("int[mystery]", tables, &consts, &mut buf)
            .unwrap_err();
        assert_eq!(err.message, "expected a positive integer constant");
        assert_eq!(err.position, 4);
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("0"), Ok(0));
        assert_eq!(parse_integer("42"), Ok(42));
        assert_eq!(parse_integer("0x2a"), Ok(42));
        assert_eq!(parse_integer("0X2A"), Ok(42));
        assert_eq!(parse_integer("0x"), Err("invalid number"));
        assert_eq!(parse_integer("1x0"), Err("invalid number"));
        assert_eq!(
            parse_integer("18446744073709551616"),
            Err("number too large")
        );
    }
}
