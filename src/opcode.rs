//! Opcode encoding for parsed C types
//!
//! A parsed declaration is emitted as a flat sequence of [`Opcode`]s inside an
//! [`OpcodeBuffer`]. Opcodes reference each other by buffer index, so the
//! encoding is linear and position-addressable: an FFI runtime can walk it to
//! build type descriptors without re-parsing the source text.
//!
//! # Encoding
//!
//! - The parser returns the index of the *entry point* opcode, which
//!   represents the complete type.
//! - Composite opcodes ([`Opcode::Pointer`], [`Opcode::Array`], ...) hold the
//!   index of the opcode they wrap.
//! - A function type occupies a contiguous run of slots: `Function` (return
//!   type), one `Noop` per parameter (each pointing at the parameter's type),
//!   and a `FunctionEnd` terminator carrying the call flags.

use std::fmt;
use thiserror::Error;

/// Sentinel struct/union table index for `struct _IO_FILE`.
///
/// `FILE`-based APIs are common enough that the tag is accepted even when it
/// was never declared; consumers must treat this index specially.
pub const IO_FILE_STRUCT: usize = usize::MAX;

/// Primitive C type ids carried by [`Opcode::Primitive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Void,
    Bool,
    Char,
    SChar,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
    LongDouble,
    FloatComplex,
    DoubleComplex,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    IntLeast8,
    UIntLeast8,
    IntLeast16,
    UIntLeast16,
    IntLeast32,
    UIntLeast32,
    IntLeast64,
    UIntLeast64,
    IntFast8,
    UIntFast8,
    IntFast16,
    UIntFast16,
    IntFast32,
    UIntFast32,
    IntFast64,
    UIntFast64,
    IntPtr,
    UIntPtr,
    PtrDiff,
    Size,
    SSize,
    IntMax,
    UIntMax,
    WChar,
    Char16,
    Char32,
}

/// Flags carried by the [`Opcode::FunctionEnd`] terminator.
///
/// Variadic functions are always the default calling convention: an ellipsis
/// in the parameter list overwrites a previously recorded `StdCall`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallFlags {
    /// Plain, fixed-arity, default calling convention.
    Default,
    /// Variadic function (`...` in the parameter list).
    Variadic,
    /// `__stdcall` calling convention.
    StdCall,
}

/// One entry in the output encoding of a parsed type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Pointer to the type at `item`.
    Pointer { item: usize },
    /// Fixed-length array of the type at `item`.
    Array { item: usize, length: u64 },
    /// Array with unspecified length (`[]`) of the type at `item`.
    OpenArray { item: usize },
    /// Function returning the type at `result`. The parameter slots and the
    /// `FunctionEnd` terminator follow contiguously.
    Function { result: usize },
    /// Marks the end of a function's parameter list.
    FunctionEnd { flags: CallFlags },
    /// Grouping indirection: refers to the type at `target`. Also used as a
    /// reserved parameter slot inside a function run.
    Noop { target: usize },
    /// A primitive C type.
    Primitive(Primitive),
    /// Index into the struct/union tag table (or [`IO_FILE_STRUCT`]).
    StructUnion { index: usize },
    /// Index into the enum tag table.
    Enum { index: usize },
    /// Index into the typedef name table.
    Typename { index: usize },
}

/// Returned by [`OpcodeBuffer::push`] when the caller-supplied capacity is
/// exhausted. The parser reports it as a hard parse error; the buffer never
/// reallocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("internal type complexity limit reached")]
pub struct CapacityError;

/// Append-only opcode array with a fixed, caller-supplied capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeBuffer {
    ops: Vec<Opcode>,
    capacity: usize,
}

impl OpcodeBuffer {
    /// Create an empty buffer that can hold at most `capacity` opcodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ops: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an opcode, returning the index it was written at.
    pub fn push(&mut self, op: Opcode) -> Result<usize, CapacityError> {
        if self.ops.len() >= self.capacity {
            return Err(CapacityError);
        }
        self.ops.push(op);
        Ok(self.ops.len() - 1)
    }

    /// Number of opcodes written so far (also the index the next `push`
    /// would return).
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The caller-supplied maximum length.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, index: usize) -> Option<Opcode> {
        self.ops.get(index).copied()
    }

    /// The opcodes written so far, in buffer order.
    pub fn ops(&self) -> &[Opcode] {
        &self.ops
    }

    /// Overwrite a previously reserved slot in place.
    pub(crate) fn set(&mut self, index: usize, op: Opcode) {
        self.ops[index] = op;
    }

    /// Patch the forward reference of the opcode at `index` to point at
    /// `target`. Only called on opcodes that carry a reference; a
    /// `FunctionEnd` or `Primitive` here would be a parser bug.
    pub(crate) fn set_target(&mut self, index: usize, target: usize) {
        match &mut self.ops[index] {
            Opcode::Pointer { item }
            | Opcode::Array { item, .. }
            | Opcode::OpenArray { item } => *item = target,
            Opcode::Function { result } => *result = target,
            Opcode::Noop { target: t } => *t = target,
            Opcode::FunctionEnd { .. }
            | Opcode::Primitive(_)
            | Opcode::StructUnion { .. }
            | Opcode::Enum { .. }
            | Opcode::Typename { .. } => {
                debug_assert!(false, "set_target on a leaf opcode");
            }
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::Pointer { item } => write!(f, "POINTER -> {}", item),
            Opcode::Array { item, length } => {
                write!(f, "ARRAY[{}] -> {}", length, item)
            }
            Opcode::OpenArray { item } => write!(f, "OPEN_ARRAY -> {}", item),
            Opcode::Function { result } => write!(f, "FUNCTION -> {}", result),
            Opcode::FunctionEnd { flags } => {
                write!(f, "FUNCTION_END ({:?})", flags)
            }
            Opcode::Noop { target } => write!(f, "NOOP -> {}", target),
            Opcode::Primitive(prim) => write!(f, "PRIMITIVE {:?}", prim),
            Opcode::StructUnion { index } => {
                if *index == IO_FILE_STRUCT {
                    write!(f, "STRUCT_UNION _IO_FILE")
                } else {
                    write!(f, "STRUCT_UNION #{}", index)
                }
            }
            Opcode::Enum { index } => write!(f, "ENUM #{}", index),
            Opcode::Typename { index } => write!(f, "TYPENAME #{}", index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_returns_index() {
        let mut buf = OpcodeBuffer::with_capacity(4);
        assert_eq!(buf.push(Opcode::Primitive(Primitive::Int)), Ok(0));
        assert_eq!(buf.push(Opcode::Pointer { item: 0 }), Ok(1));
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_push_past_capacity_fails() {
        let mut buf = OpcodeBuffer::with_capacity(1);
        assert_eq!(buf.push(Opcode::Primitive(Primitive::Int)), Ok(0));
        assert_eq!(
            buf.push(Opcode::Pointer { item: 0 }),
            Err(CapacityError)
        );
        // The failed push must not grow the buffer.
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn test_set_target_patches_references() {
        let mut buf = OpcodeBuffer::with_capacity(8);
        let p = buf.push(Opcode::Pointer { item: 0 }).unwrap();
        let a = buf
            .push(Opcode::Array {
                item: 0,
                length: 10,
            })
            .unwrap();
        let func = buf.push(Opcode::Function { result: 0 }).unwrap();
        let n = buf.push(Opcode::Noop { target: 0 }).unwrap();

        buf.set_target(p, 7);
        buf.set_target(a, 6);
        buf.set_target(func, 5);
        buf.set_target(n, 4);

        assert_eq!(buf.get(p), Some(Opcode::Pointer { item: 7 }));
        assert_eq!(
            buf.get(a),
            Some(Opcode::Array {
                item: 6,
                length: 10
            })
        );
        assert_eq!(buf.get(func), Some(Opcode::Function { result: 5 }));
        assert_eq!(buf.get(n), Some(Opcode::Noop { target: 4 }));
    }

    #[test]
    fn test_zero_capacity_buffer() {
        let mut buf = OpcodeBuffer::with_capacity(0);
        assert!(buf.is_empty());
        assert_eq!(
            buf.push(Opcode::Primitive(Primitive::Void)),
            Err(CapacityError)
        );
    }
}
