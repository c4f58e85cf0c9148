#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! An embedded parser-combinator library with attributed grammar semantics.
//!
//! Build a grammar out of token matches, semantic actions, sequencing,
//! ordered choice, and recursive nonterminal definitions joined by
//! `&`/`|`/`-`/`!` and a handful of repetition methods, then recognize it
//! against a [`parsel_core::TokenStream`] with a backtracking engine that
//! threads inherited/synthesized attributes through the match and builds an
//! ordered parse tree as it goes.
//!
//! This crate has no lexer and no pretty-printer: it consumes an already
//! tokenized stream and hands back an accept/reject outcome, an optional
//! parse tree, and whatever a grammar's own flow variables were written
//! with along the way.

mod error;
mod grammar;

pub mod engine;

#[cfg(test)]
mod grammar_tests;

pub use error::{GrammarError, RuntimeError};
pub use grammar::{BoundRef, Bounds, Expr, Grammar, Max, Nonterminal};

pub use parsel_core::{
    AttrCell, DefaultExtractor, Extractor, Token, TokenCode, TokenStream, TreeNode, Var,
    VecTokenStream,
};
