//! C type declaration parser
//!
//! This module transforms one C type declaration string into opcodes:
//! - [`lexer`]: Tokenization (source text → tokens, one lookahead)
//! - [`parse`]: The parse context, error type, and entry point
//! - `base_type`: Qualifiers, modifiers, and base-type resolution
//! - `declarator`: Pointers, grouping parens, parameter lists, arrays
//!
//! # Supported grammar
//!
//! One type declaration per call, optionally with a placeholder identifier
//! for the declared name. Qualifiers are accepted and ignored. No
//! declaration lists, initializers, `_Generic`, or attributes beyond
//! `const`/`volatile` and the `__cdecl`/`__stdcall` keywords.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent; declarator parsing calls back into
//! base-type parsing for function parameters. No external parser generator
//! dependencies.

mod base_type;
mod declarator;
pub(crate) mod lexer;
pub mod parse;
