//! Tokenizer for C type declarations
//!
//! Converts the input string into a stream of classified [`Token`]s with one
//! token of lookahead: the lexer always holds the current token, and
//! [`Lexer::next`] replaces it with the following one. Advancing never fails;
//! bytes the grammar has no use for become [`TokenKind::Unknown`] tokens and
//! are rejected by the parser at the point where they appear.
//!
//! Integer literals are scanned greedily: after a leading digit, every hex
//! digit and `x`/`X` is consumed regardless of the declared base, so a
//! malformed number like `0x12z3` or `12ff` is diagnosed later during value
//! conversion rather than split into surprising tokens here.

/// Classification of one lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// End of input.
    End,
    /// A name that is not one of the keywords below.
    Identifier,
    /// A decimal or hex integer literal (unvalidated).
    Integer,
    /// The ellipsis `...`.
    DotDotDot,

    // Punctuation the grammar uses.
    Star,
    Comma,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,

    // Keywords.
    Bool,
    Char,
    Const,
    Double,
    Enum,
    Float,
    Int,
    Long,
    Short,
    Signed,
    Struct,
    Union,
    Unsigned,
    Void,
    Volatile,
    Complex,
    Cdecl,
    Stdcall,

    /// Any other byte; never matches anything the parser expects.
    Unknown,
}

/// One token: its kind, the slice of the input it covers, and the byte
/// offset it starts at (used for error reporting).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub pos: usize,
}

/// Streaming tokenizer with one token of lookahead.
pub(crate) struct Lexer<'a> {
    input: &'a str,
    cursor: usize,
    token: Token<'a>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer positioned on the first token of `input`.
    pub(crate) fn new(input: &'a str) -> Self {
        let mut lexer = Self {
            input,
            cursor: 0,
            token: Token {
                kind: TokenKind::End,
                text: "",
                pos: 0,
            },
        };
        lexer.next();
        lexer
    }

    /// The current token.
    pub(crate) fn token(&self) -> Token<'a> {
        self.token
    }

    /// Advance past whitespace and classify the next lexeme.
    pub(crate) fn next(&mut self) {
        let bytes = self.input.as_bytes();
        let mut pos = self.cursor;
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            self.token = Token {
                kind: TokenKind::End,
                text: "",
                pos,
            };
            self.cursor = pos;
            return;
        }

        let start = pos;
        let kind = match bytes[pos] {
            b'0'..=b'9' => {
                pos += 1;
                while pos < bytes.len()
                    && (bytes[pos].is_ascii_hexdigit()
                        || bytes[pos] == b'x'
                        || bytes[pos] == b'X')
                {
                    pos += 1;
                }
                TokenKind::Integer
            }
            b'A'..=b'Z' | b'a'..=b'z' | b'_' | b'$' => {
                pos += 1;
                while pos < bytes.len()
                    && (bytes[pos].is_ascii_alphanumeric()
                        || bytes[pos] == b'_'
                        || bytes[pos] == b'$')
                {
                    pos += 1;
                }
                keyword_or_identifier(&self.input[start..pos])
            }
            b'.' if bytes.get(pos + 1) == Some(&b'.')
                && bytes.get(pos + 2) == Some(&b'.') =>
            {
                pos += 3;
                TokenKind::DotDotDot
            }
            b'*' => {
                pos += 1;
                TokenKind::Star
            }
            b',' => {
                pos += 1;
                TokenKind::Comma
            }
            b'(' => {
                pos += 1;
                TokenKind::OpenParen
            }
            b')' => {
                pos += 1;
                TokenKind::CloseParen
            }
            b'[' => {
                pos += 1;
                TokenKind::OpenBracket
            }
            b']' => {
                pos += 1;
                TokenKind::CloseBracket
            }
            _ => {
                // Consume one whole character so the text slice stays on a
                // UTF-8 boundary even for non-ASCII garbage.
                let len = self.input[pos..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                pos += len;
                TokenKind::Unknown
            }
        };

        self.token = Token {
            kind,
            text: &self.input[start..pos],
            pos: start,
        };
        self.cursor = pos;
    }

    /// Count commas between the current position and the matching close
    /// paren (or end of input), ignoring commas nested inside inner parens.
    /// Used to over-estimate a function's parameter count before reserving
    /// slots; it never under-counts because every parameter separator sits
    /// at nesting level zero.
    pub(crate) fn count_top_level_commas(&self) -> usize {
        let mut nesting = 0usize;
        let mut count = 0;
        for &b in &self.input.as_bytes()[self.token.pos..] {
            match b {
                b',' if nesting == 0 => count += 1,
                b'(' => nesting += 1,
                b')' => {
                    if nesting == 0 {
                        return count;
                    }
                    nesting -= 1;
                }
                _ => {}
            }
        }
        count
    }

    /// Peek at the first non-whitespace byte after the current token,
    /// without consuming anything. Lets the parser spot `void)` with a
    /// single token of lookahead.
    pub(crate) fn following_char(&self) -> Option<u8> {
        let end = self.token.pos + self.token.text.len();
        self.input.as_bytes()[end..]
            .iter()
            .copied()
            .find(|b| !b.is_ascii_whitespace())
    }
}

/// Keyword recognition by exact string match.
fn keyword_or_identifier(text: &str) -> TokenKind {
    match text {
        "_Bool" => TokenKind::Bool,
        "char" => TokenKind::Char,
        "const" => TokenKind::Const,
        "double" => TokenKind::Double,
        "enum" => TokenKind::Enum,
        "float" => TokenKind::Float,
        "int" => TokenKind::Int,
        "long" => TokenKind::Long,
        "short" => TokenKind::Short,
        "signed" => TokenKind::Signed,
        "struct" => TokenKind::Struct,
        "union" => TokenKind::Union,
        "unsigned" => TokenKind::Unsigned,
        "void" => TokenKind::Void,
        "volatile" => TokenKind::Volatile,
        "_Complex" => TokenKind::Complex,
        "__cdecl" => TokenKind::Cdecl,
        "__stdcall" => TokenKind::Stdcall,
        _ => TokenKind::Identifier,
    }
}
