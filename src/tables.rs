//! Name-resolution tables consumed by the parser
//!
//! The parser does not own any declarations itself; the caller supplies four
//! pre-built tables of names it may reference:
//!
//! - globals (named integer constants usable as array lengths)
//! - struct/union tags
//! - typedef names
//! - enum tags
//!
//! Each table is a slice sorted by byte-wise name order, searched with exact
//! string comparison via binary search. The tables are never mutated, so they
//! can be shared freely across concurrently-running parses.

/// What a globals-table entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalKind {
    /// A plain named integer constant.
    ConstantInt,
    /// A constant backed by an enum member.
    EnumConstant,
    /// Anything else living in the globals table (functions, variables).
    /// Not usable as an array length.
    Other,
}

/// One globals-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalDef<'a> {
    pub name: &'a str,
    pub kind: GlobalKind,
}

/// One struct/union tag table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructUnionDef<'a> {
    pub name: &'a str,
    /// `true` for a `union` tag, `false` for a `struct` tag.
    pub is_union: bool,
}

/// One typedef name table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypenameDef<'a> {
    pub name: &'a str,
}

/// One enum tag table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumDef<'a> {
    pub name: &'a str,
}

/// The result of resolving a named integer constant.
///
/// The resolver reports a magnitude plus a three-way sign discriminant. The
/// `Disagreement` case guards against a resolver whose computed sign does not
/// match what the table claimed about the constant (e.g. a negative value for
/// a constant registered as nonnegative).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantValue {
    /// A nonnegative value.
    Positive(u64),
    /// A negative value; the magnitude is reported.
    Negative(u64),
    /// The resolver and the table disagree about this constant's value.
    Disagreement,
}

/// Callback used to resolve named integer constants appearing as array
/// lengths. Invoked with the constant's globals-table index.
pub trait ConstantResolver {
    fn constant_value(&self, index: usize) -> ConstantValue;
}

impl<F> ConstantResolver for F
where
    F: Fn(usize) -> ConstantValue,
{
    fn constant_value(&self, index: usize) -> ConstantValue {
        self(index)
    }
}

/// The four sorted lookup tables, borrowed for the lifetime of the parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameTables<'a> {
    pub globals: &'a [GlobalDef<'a>],
    pub struct_unions: &'a [StructUnionDef<'a>],
    pub typenames: &'a [TypenameDef<'a>],
    pub enums: &'a [EnumDef<'a>],
}

impl<'a> NameTables<'a> {
    /// Build a table set. Each slice must be sorted by byte-wise name order;
    /// lookups are binary searches and misbehave on unsorted input.
    pub fn new(
        globals: &'a [GlobalDef<'a>],
        struct_unions: &'a [StructUnionDef<'a>],
        typenames: &'a [TypenameDef<'a>],
        enums: &'a [EnumDef<'a>],
    ) -> Self {
        debug_assert!(is_sorted(globals.iter().map(|g| g.name)));
        debug_assert!(is_sorted(struct_unions.iter().map(|s| s.name)));
        debug_assert!(is_sorted(typenames.iter().map(|t| t.name)));
        debug_assert!(is_sorted(enums.iter().map(|e| e.name)));
        Self {
            globals,
            struct_unions,
            typenames,
            enums,
        }
    }

    pub fn search_global(&self, name: &str) -> Option<usize> {
        search_sorted(self.globals, name, |g| g.name)
    }

    pub fn search_struct_union(&self, name: &str) -> Option<usize> {
        search_sorted(self.struct_unions, name, |s| s.name)
    }

    pub fn search_typename(&self, name: &str) -> Option<usize> {
        search_sorted(self.typenames, name, |t| t.name)
    }

    pub fn search_enum(&self, name: &str) -> Option<usize> {
        search_sorted(self.enums, name, |e| e.name)
    }
}

/// Binary search over a name-sorted slice. Matches require equal length and
/// content, so `"INT"` never matches a stored `"INTX"`.
fn search_sorted<T>(table: &[T], name: &str, key: impl Fn(&T) -> &str) -> Option<usize> {
    table
        .binary_search_by(|entry| key(entry).as_bytes().cmp(name.as_bytes()))
        .ok()
}

fn is_sorted<'a>(names: impl Iterator<Item = &'a str>) -> bool {
    let mut prev: Option<&str> = None;
    for name in names {
        if let Some(p) = prev {
            if p >= name {
                return false;
            }
        }
        prev = Some(name);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tables() -> NameTables<'static> {
        static GLOBALS: &[GlobalDef<'static>] = &[
            GlobalDef {
                name: "BUFSIZE",
                kind: GlobalKind::ConstantInt,
            },
            GlobalDef {
                name: "E_LAST",
                kind: GlobalKind::EnumConstant,
            },
            GlobalDef {
                name: "printf",
                kind: GlobalKind::Other,
            },
        ];
        static TAGS: &[StructUnionDef<'static>] = &[
            StructUnionDef {
                name: "Point",
                is_union: false,
            },
            StructUnionDef {
                name: "Value",
                is_union: true,
            },
        ];
        static TYPENAMES: &[TypenameDef<'static>] = &[
            TypenameDef { name: "INT" },
            TypenameDef { name: "INTX" },
        ];
        static ENUMS: &[EnumDef<'static>] = &[EnumDef { name: "color" }];
        NameTables::new(GLOBALS, TAGS, TYPENAMES, ENUMS)
    }

    #[test]
    fn test_search_finds_exact_match() {
        let tables = sample_tables();
        assert_eq!(tables.search_global("BUFSIZE"), Some(0));
        assert_eq!(tables.search_global("printf"), Some(2));
        assert_eq!(tables.search_struct_union("Value"), Some(1));
        assert_eq!(tables.search_enum("color"), Some(0));
    }

    #[test]
    fn test_search_requires_full_length_match() {
        let tables = sample_tables();
        // "INT" and "INTX" are distinct entries; prefixes must not match.
        assert_eq!(tables.search_typename("INT"), Some(0));
        assert_eq!(tables.search_typename("INTX"), Some(1));
        assert_eq!(tables.search_typename("IN"), None);
        assert_eq!(tables.search_typename("INTXY"), None);
    }

    #[test]
    fn test_search_misses() {
        let tables = sample_tables();
        assert_eq!(tables.search_global("bogus"), None);
        assert_eq!(tables.search_struct_union("point"), None); // case matters
    }

    #[test]
    fn test_empty_tables() {
        let tables = NameTables::default();
        assert_eq!(tables.search_global("anything"), None);
        assert_eq!(tables.search_typename("anything"), None);
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |index: usize| match index {
            0 => ConstantValue::Positive(16),
            _ => ConstantValue::Disagreement,
        };
        assert_eq!(resolver.constant_value(0), ConstantValue::Positive(16));
        assert_eq!(resolver.constant_value(1), ConstantValue::Disagreement);
    }
}
