//! Base-type parsing
//!
//! Handles everything before the declarator: `const`/`volatile` qualifiers
//! (consumed and ignored — they do not appear in the opcode stream),
//! `short`/`long`/`signed`/`unsigned` modifier runs, explicit type keywords,
//! typedef and tag references, and platform alias substitution.
//!
//! Identifier resolution order: user typedef table, then the fixed table of
//! standard `<stdint.h>`-style names, then the common-type alias table
//! (which triggers a recursive parse of the replacement spelling), and
//! finally "undefined type name".

use crate::commontypes::lookup_common_type;
use crate::opcode::{Opcode, Primitive, IO_FILE_STRUCT};
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser<'_, '_> {
    /// Parse one complete type: qualifiers, base type, then the declarator.
    /// Returns the entry-point opcode index for the whole type.
    pub(crate) fn parse_complete_type(&mut self) -> Result<usize, ParseError> {
        while matches!(self.kind(), TokenKind::Const | TokenKind::Volatile) {
            self.lexer.next();
        }

        // -1 = short, 0 = none, 1 = long, 2 = long long
        let mut length_mod: i32 = 0;
        // 1 = signed, -1 = unsigned
        let mut sign_mod: i32 = 0;
        loop {
            match self.kind() {
                TokenKind::Short => {
                    if length_mod != 0 {
                        return Err(self
                            .error("'short' after another 'short' or 'long'"));
                    }
                    length_mod = -1;
                    self.lexer.next();
                }
                TokenKind::Long => {
                    if length_mod < 0 {
                        return Err(self.error("'long' after 'short'"));
                    }
                    if length_mod >= 2 {
                        return Err(self.error("'long long long' is too long"));
                    }
                    length_mod += 1;
                    self.lexer.next();
                }
                TokenKind::Signed => {
                    if sign_mod != 0 {
                        return Err(
                            self.error("multiple 'signed' or 'unsigned'")
                        );
                    }
                    sign_mod = 1;
                    self.lexer.next();
                }
                TokenKind::Unsigned => {
                    if sign_mod != 0 {
                        return Err(
                            self.error("multiple 'signed' or 'unsigned'")
                        );
                    }
                    sign_mod = -1;
                    self.lexer.next();
                }
                _ => break,
            }
        }

        let base = if length_mod != 0 || sign_mod != 0 {
            Opcode::Primitive(self.modified_integer(length_mod, sign_mod)?)
        } else {
            match self.kind() {
                TokenKind::Void => {
                    self.lexer.next();
                    Opcode::Primitive(Primitive::Void)
                }
                TokenKind::Bool => {
                    self.lexer.next();
                    Opcode::Primitive(Primitive::Bool)
                }
                TokenKind::Char => {
                    self.lexer.next();
                    Opcode::Primitive(Primitive::Char)
                }
                TokenKind::Int => {
                    self.lexer.next();
                    Opcode::Primitive(Primitive::Int)
                }
                TokenKind::Float => {
                    self.lexer.next();
                    Opcode::Primitive(Primitive::Float)
                }
                TokenKind::Double => {
                    self.lexer.next();
                    Opcode::Primitive(Primitive::Double)
                }
                TokenKind::Identifier => {
                    let name = self.text();
                    if let Some(n) = self.tables.search_typename(name) {
                        self.lexer.next();
                        Opcode::Typename { index: n }
                    } else if let Some(prim) = standard_typename(name) {
                        self.lexer.next();
                        Opcode::Primitive(prim)
                    } else if let Some(replacement) = lookup_common_type(name)
                    {
                        // The alias expands into the same buffer; the parsed
                        // entry index is used directly as the base type, so
                        // an alias encodes identically to its replacement.
                        let index =
                            self.parse_common_type_replacement(replacement)?;
                        self.lexer.next();
                        return self.parse_declarator(index);
                    } else {
                        return Err(self.error("undefined type name"));
                    }
                }
                TokenKind::Struct | TokenKind::Union => {
                    self.parse_struct_union_reference()?
                }
                TokenKind::Enum => self.parse_enum_reference()?,
                _ => return Err(self.error("identifier expected")),
            }
        };

        // A trailing '_Complex' promotes float/double; no other base type
        // can be complex.
        let base = if self.kind() == TokenKind::Complex {
            let promoted = match base {
                Opcode::Primitive(Primitive::Float) => {
                    Opcode::Primitive(Primitive::FloatComplex)
                }
                Opcode::Primitive(Primitive::Double) => {
                    Opcode::Primitive(Primitive::DoubleComplex)
                }
                _ => {
                    return Err(
                        self.error("_Complex type combination unsupported")
                    )
                }
            };
            self.lexer.next();
            promoted
        } else {
            base
        };

        let index = self.write(base)?;
        self.parse_declarator(index)
    }

    /// Resolve a nonempty modifier run to a primitive, consuming the type
    /// keyword that follows it (if any — `unsigned x` means `unsigned int x`).
    fn modified_integer(
        &mut self,
        length_mod: i32,
        sign_mod: i32,
    ) -> Result<Primitive, ParseError> {
        match self.kind() {
            TokenKind::Char => {
                // 'short char' and 'long char' do not exist.
                if length_mod != 0 {
                    return Err(self.error("invalid combination of types"));
                }
                self.lexer.next();
                Ok(if sign_mod > 0 {
                    Primitive::SChar
                } else {
                    Primitive::UChar
                })
            }
            TokenKind::Double => {
                if sign_mod != 0 || length_mod != 1 {
                    return Err(self.error("invalid combination of types"));
                }
                self.lexer.next();
                Ok(Primitive::LongDouble)
            }
            TokenKind::Float => {
                Err(self.error("invalid combination of types"))
            }
            other => {
                if other == TokenKind::Int {
                    self.lexer.next(); // 'long int', 'unsigned int', ...
                }
                let unsigned = sign_mod < 0;
                Ok(match (length_mod, unsigned) {
                    (-1, false) => Primitive::Short,
                    (-1, true) => Primitive::UShort,
                    (1, false) => Primitive::Long,
                    (1, true) => Primitive::ULong,
                    (2, false) => Primitive::LongLong,
                    (2, true) => Primitive::ULongLong,
                    (_, false) => Primitive::Int,
                    (_, true) => Primitive::UInt,
                })
            }
        }
    }

    /// `struct NAME` / `union NAME`: the tag must exist in the struct/union
    /// table with the matching kind. `struct _IO_FILE` is accepted even when
    /// undeclared.
    fn parse_struct_union_reference(&mut self) -> Result<Opcode, ParseError> {
        let is_union = self.kind() == TokenKind::Union;
        self.lexer.next();
        if self.kind() != TokenKind::Identifier {
            return Err(self.error("struct or union name expected"));
        }
        let name = self.text();
        let index = match self.tables.search_struct_union(name) {
            Some(n) => {
                if self.tables.struct_unions[n].is_union != is_union {
                    return Err(
                        self.error("wrong kind of tag: struct vs union")
                    );
                }
                n
            }
            None if !is_union && name == "_IO_FILE" => IO_FILE_STRUCT,
            None => {
                return Err(self.error("undefined struct/union name"));
            }
        };
        self.lexer.next();
        Ok(Opcode::StructUnion { index })
    }

    /// `enum NAME`: the tag must exist in the enum table.
    fn parse_enum_reference(&mut self) -> Result<Opcode, ParseError> {
        self.lexer.next();
        if self.kind() != TokenKind::Identifier {
            return Err(self.error("enum name expected"));
        }
        let index = self
            .tables
            .search_enum(self.text())
            .ok_or_else(|| self.error("undefined enum name"))?;
        self.lexer.next();
        Ok(Opcode::Enum { index })
    }

    /// Parse a common-type replacement spelling into the same output buffer
    /// and return its entry index. The replacement comes from our own static
    /// table, so a failure here (other than running out of buffer) means the
    /// table itself is broken.
    fn parse_common_type_replacement(
        &mut self,
        replacement: &'static str,
    ) -> Result<usize, ParseError> {
        let position = self.lexer.token().pos;
        let mut sub = Parser::new(
            replacement,
            self.tables,
            self.consts,
            self.output,
        );
        sub.parse_complete_type().map_err(|err| ParseError {
            // Offsets inside the replacement text mean nothing to the
            // caller; keep the capacity message, collapse the rest.
            message: if err.message
                == "internal type complexity limit reached"
            {
                err.message
            } else {
                "invalid common type replacement"
            },
            position,
        })
    }
}

/// Standard fixed-width and pointer-sized C typenames, recognized by direct
/// string dispatch ahead of the common-type alias table.
fn standard_typename(name: &str) -> Option<Primitive> {
    Some(match name {
        "int8_t" => Primitive::Int8,
        "uint8_t" => Primitive::UInt8,
        "int16_t" => Primitive::Int16,
        "uint16_t" => Primitive::UInt16,
        "int32_t" => Primitive::Int32,
        "uint32_t" => Primitive::UInt32,
        "int64_t" => Primitive::Int64,
        "uint64_t" => Primitive::UInt64,
        "int_least8_t" => Primitive::IntLeast8,
        "uint_least8_t" => Primitive::UIntLeast8,
        "int_least16_t" => Primitive::IntLeast16,
        "uint_least16_t" => Primitive::UIntLeast16,
        "int_least32_t" => Primitive::IntLeast32,
        "uint_least32_t" => Primitive::UIntLeast32,
        "int_least64_t" => Primitive::IntLeast64,
        "uint_least64_t" => Primitive::UIntLeast64,
        "int_fast8_t" => Primitive::IntFast8,
        "uint_fast8_t" => Primitive::UIntFast8,
        "int_fast16_t" => Primitive::IntFast16,
        "uint_fast16_t" => Primitive::UIntFast16,
        "int_fast32_t" => Primitive::IntFast32,
        "uint_fast32_t" => Primitive::UIntFast32,
        "int_fast64_t" => Primitive::IntFast64,
        "uint_fast64_t" => Primitive::UIntFast64,
        "intptr_t" => Primitive::IntPtr,
        "uintptr_t" => Primitive::UIntPtr,
        "ptrdiff_t" => Primitive::PtrDiff,
        "size_t" => Primitive::Size,
        "ssize_t" => Primitive::SSize,
        "intmax_t" => Primitive::IntMax,
        "uintmax_t" => Primitive::UIntMax,
        "wchar_t" => Primitive::WChar,
        "char16_t" => Primitive::Char16,
        "char32_t" => Primitive::Char32,
        _ => return None,
    })
}
