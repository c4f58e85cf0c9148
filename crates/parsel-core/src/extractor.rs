//! Token-to-value extraction: the per-type conversion consulted when a
//! typed terminal use-site binds a matched token's lexeme to an output
//! attribute.

use crate::token::TokenCode;
use std::str::FromStr;

/// Converts a matched token's `(code, text)` into an attribute value of
/// type `T`, or signals an extraction failure.
///
/// An extraction failure is indistinguishable from a token-code mismatch:
/// the engine treats both as "this `Tok` use-site did not match" and fails
/// the sub-match without advancing the cursor.
///
/// Hosts that need the nonterminal's *inherited* input attribute while
/// extracting simply close over the `Var` holding it directly — ordinary
/// Rust closure capture, rather than engine-level plumbing, is how that
/// value reaches the extractor.
pub trait Extractor<T> {
    fn extract(&self, code: TokenCode, text: &str) -> Option<T>;
}

impl<T, F> Extractor<T> for F
where
    F: Fn(TokenCode, &str) -> Option<T>,
{
    fn extract(&self, code: TokenCode, text: &str) -> Option<T> {
        self(code, text)
    }
}

/// The default extractor: parses the lexeme via `FromStr`, ignoring the
/// token code.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultExtractor;

impl<T: FromStr> Extractor<T> for DefaultExtractor {
    fn extract(&self, _code: TokenCode, text: &str) -> Option<T> {
        text.parse().ok()
    }
}
