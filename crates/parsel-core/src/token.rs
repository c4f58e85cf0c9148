//! The token stream abstraction: a positional, possibly on-demand sequence
//! of tokens the recognition engine reads from.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer code identifying a token's lexical class.
///
/// A character literal in a host grammar is a `TokenCode` equal to its
/// integer value (e.g. the ASCII code of `'+'`).
pub type TokenCode = u32;

/// A single lexical token: `{ code, text, lineno, columno }`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    pub code: TokenCode,
    pub text: String,
    pub lineno: u32,
    pub columno: u32,
}

impl Token {
    pub fn new(code: TokenCode, text: impl Into<String>, lineno: u32, columno: u32) -> Self {
        Self {
            code,
            text: text.into(),
            lineno,
            columno,
        }
    }
}

/// The engine's only view of its input.
///
/// A conformant stream may be eager (fully tokenized up front) or on-demand
/// (lazy, filling as `has`/`at` are called, with a sticky EOF flag).
/// `has(pos)` must be monotonic: once it returns `false` it may only become
/// `true` after more input is appended; once a token exists at a position it
/// never changes. `at(pos)` is only ever called where `has(pos)` holds.
pub trait TokenStream {
    /// Whether a token exists at `pos`.
    fn has(&self, pos: usize) -> bool;

    /// The token at `pos`. Only called where `has(pos)` is `true`.
    fn at(&self, pos: usize) -> Token;
}

/// An eager, fully materialized token stream over an in-memory `Vec<Token>`.
///
/// The common case for tests and small host programs: the lexer has already
/// run to completion and produced the whole sequence.
#[derive(Clone, Debug, Default)]
pub struct VecTokenStream {
    tokens: Vec<Token>,
}

impl VecTokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Build a stream from bare `(code, text)` pairs, synthesizing
    /// line/column positions left-to-right on a single line. Convenient for
    /// grammars that don't care about source positions (most of the
    /// scenarios in this crate's tests).
    pub fn from_codes(codes: impl IntoIterator<Item = (TokenCode, &'static str)>) -> Self {
        let tokens = codes
            .into_iter()
            .enumerate()
            .map(|(i, (code, text))| Token::new(code, text, 1, i as u32 + 1))
            .collect();
        Self { tokens }
    }
}

impl TokenStream for VecTokenStream {
    fn has(&self, pos: usize) -> bool {
        pos < self.tokens.len()
    }

    fn at(&self, pos: usize) -> Token {
        self.tokens[pos].clone()
    }
}
