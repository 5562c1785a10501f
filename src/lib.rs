//! # Introduction
//!
//! `ctypec` is a small compiler front-end for C type declarations: it parses
//! a declaration given as a string (`"int(*)(char*, long[10])"`,
//! `"struct Point *"`, `"unsigned long long"`) and emits a compact, linear,
//! position-addressable opcode encoding of that type. An FFI runtime can
//! later walk the encoding to build type descriptors, compute layouts, and
//! marshal call arguments without re-parsing the text.
//!
//! ## Pipeline
//!
//! ```text
//! Declaration string → Lexer → recursive-descent parser → OpcodeBuffer
//! ```
//!
//! 1. [`parser`] — tokenises the input and parses base type + declarator.
//! 2. [`opcode`] — the output encoding: [`Opcode`] entries in a
//!    fixed-capacity [`OpcodeBuffer`], referencing each other by index.
//! 3. [`tables`] — caller-supplied sorted name tables (typedefs,
//!    struct/union tags, enum tags, named constants) and the
//!    [`ConstantResolver`] callback for array bounds.
//! 4. [`commontypes`] — static substitution table resolving platform
//!    aliases (`DWORD`, `HANDLE`, ...) to canonical spellings.
//!
//! ## Example
//!
//! ```
//! use ctypec::{parse_type, ConstantValue, NameTables, Opcode, OpcodeBuffer, Primitive};
//!
//! let no_consts = |_: usize| ConstantValue::Disagreement;
//! let mut buf = OpcodeBuffer::with_capacity(16);
//! let entry = parse_type("unsigned int *", NameTables::default(), &no_consts, &mut buf)
//!     .unwrap();
//! assert_eq!(buf.get(entry), Some(Opcode::Pointer { item: 0 }));
//! assert_eq!(buf.get(0), Some(Opcode::Primitive(Primitive::UInt)));
//! ```
//!
//! Parsing is synchronous, CPU-bound, and allocation-free apart from the
//! caller's buffer; the tables are immutable and safe to share across
//! concurrent parses.

pub mod commontypes;
pub mod opcode;
pub mod parser;
pub mod tables;

pub use commontypes::{common_types, lookup_common_type};
pub use opcode::{
    CallFlags, CapacityError, Opcode, OpcodeBuffer, Primitive,
    IO_FILE_STRUCT,
};
pub use parser::parse::{parse_type, ParseError};
pub use tables::{
    ConstantResolver, ConstantValue, EnumDef, GlobalDef, GlobalKind,
    NameTables, StructUnionDef, TypenameDef,
};
