#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the parsel combinator engine: tokens, the
//! parse tree, flow-variable storage, and token-to-value extraction.
//!
//! This crate has no notion of a grammar, a combinator, or recognition —
//! that lives in `parsel`. It exists so that the same `Token`, `TreeNode`,
//! `Var`, and `Extractor` types can be shared by the engine and by any host
//! tooling (a printer, a test harness) without pulling in the combinator
//! arena.

mod attr;
mod extractor;
mod interner;
mod token;
mod tree;

#[cfg(test)]
mod interner_tests;
#[cfg(test)]
mod tree_tests;

pub use attr::{AttrCell, Var};
pub use extractor::{DefaultExtractor, Extractor};
pub use interner::{Interner, Symbol};
pub use token::{Token, TokenCode, TokenStream, VecTokenStream};
pub use tree::TreeNode;
