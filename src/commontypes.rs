//! Platform type alias ("common type") substitution table
//!
//! Windows headers spell most of their types as aliases (`DWORD`, `HANDLE`,
//! `LPCSTR`, ...). Rather than requiring every caller to register them as
//! typedefs, the parser resolves them through this static table: a hit yields
//! a canonical replacement spelling which is re-parsed in place of the alias.
//!
//! Entries may chain (`DWORD_PTR` -> `ULONG_PTR` -> `uintptr_t`); every chain
//! ends at a spelling made of keywords or standard typenames. The table is
//! sorted by byte-wise name order and searched with binary search, so lookups
//! are read-only and safe to run from concurrent parses.

/// Alias spellings and their canonical replacements, sorted by name.
///
/// The `*_PTR` family maps to `intptr_t`/`uintptr_t` rather than a
/// pointer-sized integer keyword, so the substitution is the same on every
/// target.
static COMMON_TYPES: &[(&str, &str)] = &[
    ("BOOL", "int"),
    ("BOOLEAN", "unsigned char"),
    ("BYTE", "unsigned char"),
    ("CCHAR", "char"),
    ("CHAR", "char"),
    ("COLORREF", "DWORD"),
    ("DWORD", "unsigned long"),
    ("DWORD32", "unsigned int"),
    ("DWORD64", "unsigned long long"),
    ("DWORDLONG", "ULONGLONG"),
    ("DWORD_PTR", "ULONG_PTR"),
    ("FLOAT", "float"),
    ("HACCEL", "HANDLE"),
    ("HANDLE", "PVOID"),
    ("HBITMAP", "HANDLE"),
    ("HBRUSH", "HANDLE"),
    ("HCURSOR", "HICON"),
    ("HDC", "HANDLE"),
    ("HFILE", "int"),
    ("HGLOBAL", "HANDLE"),
    ("HICON", "HANDLE"),
    ("HINSTANCE", "HANDLE"),
    ("HKEY", "HANDLE"),
    ("HLOCAL", "HANDLE"),
    ("HMENU", "HANDLE"),
    ("HMODULE", "HINSTANCE"),
    ("HRESULT", "LONG"),
    ("HWND", "HANDLE"),
    ("INT", "int"),
    ("INT16", "short"),
    ("INT32", "int"),
    ("INT64", "long long"),
    ("INT8", "signed char"),
    ("INT_PTR", "intptr_t"),
    ("LANGID", "WORD"),
    ("LCID", "DWORD"),
    ("LONG", "long"),
    ("LONG32", "int"),
    ("LONG64", "long long"),
    ("LONGLONG", "long long"),
    ("LONG_PTR", "intptr_t"),
    ("LPARAM", "LONG_PTR"),
    ("LPBOOL", "BOOL *"),
    ("LPBYTE", "BYTE *"),
    ("LPCSTR", "const char *"),
    ("LPCVOID", "const void *"),
    ("LPCWSTR", "const WCHAR *"),
    ("LPDWORD", "DWORD *"),
    ("LPHANDLE", "HANDLE *"),
    ("LPINT", "int *"),
    ("LPLONG", "long *"),
    ("LPSTR", "CHAR *"),
    ("LPVOID", "void *"),
    ("LPWORD", "WORD *"),
    ("LPWSTR", "WCHAR *"),
    ("LRESULT", "LONG_PTR"),
    ("PBYTE", "BYTE *"),
    ("PCHAR", "CHAR *"),
    ("PCSTR", "const char *"),
    ("PCWSTR", "const WCHAR *"),
    ("PDWORD", "DWORD *"),
    ("PHANDLE", "HANDLE *"),
    ("PVOID", "void *"),
    ("PWORD", "WORD *"),
    ("SC_HANDLE", "HANDLE"),
    ("SHORT", "short"),
    ("SIZE_T", "ULONG_PTR"),
    ("SSIZE_T", "LONG_PTR"),
    ("UCHAR", "unsigned char"),
    ("UINT", "unsigned int"),
    ("UINT16", "unsigned short"),
    ("UINT32", "unsigned int"),
    ("UINT64", "unsigned long long"),
    ("UINT8", "unsigned char"),
    ("UINT_PTR", "uintptr_t"),
    ("ULONG", "unsigned long"),
    ("ULONG32", "unsigned int"),
    ("ULONG64", "unsigned long long"),
    ("ULONGLONG", "unsigned long long"),
    ("ULONG_PTR", "uintptr_t"),
    ("USHORT", "unsigned short"),
    ("USN", "LONGLONG"),
    ("VOID", "void"),
    ("WCHAR", "wchar_t"),
    ("WORD", "unsigned short"),
    ("WPARAM", "UINT_PTR"),
];

/// Look up the canonical replacement for a platform alias spelling.
pub fn lookup_common_type(name: &str) -> Option<&'static str> {
    COMMON_TYPES
        .binary_search_by(|(alias, _)| alias.as_bytes().cmp(name.as_bytes()))
        .ok()
        .map(|i| COMMON_TYPES[i].1)
}

/// The whole alias table, for enumeration by tooling.
pub fn common_types() -> &'static [(&'static str, &'static str)] {
    COMMON_TYPES
}
