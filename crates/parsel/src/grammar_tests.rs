use parsel_core::Var;

use crate::grammar::{Bounds, Max};
use crate::{Grammar, GrammarError};

#[test]
fn bounds_helpers_match_the_encoding_table() {
    assert_eq!(Bounds::ONE, Bounds { min: 1, max: Max::Bounded(1) });
    assert_eq!(Bounds::star(), Bounds { min: 0, max: Max::Unbounded });
    assert_eq!(Bounds::plus(), Bounds { min: 1, max: Max::Unbounded });
    assert_eq!(Bounds::optional(), Bounds { min: 0, max: Max::Bounded(1) });
    assert_eq!(Bounds::positive_lookahead(), Bounds { min: 1, max: Max::Bounded(0) });
    assert_eq!(Bounds::negative_lookahead(), Bounds { min: 0, max: Max::Bounded(0) });
    assert!(Bounds::positive_lookahead().is_lookahead());
    assert!(Bounds::negative_lookahead().is_lookahead());
    assert!(!Bounds::star().is_lookahead());
}

#[test]
fn and_chain_flattens_into_one_seq() {
    let g = Grammar::new();
    let expr = g.token(1) & g.token(2) & g.token(3);
    match g.node_kind(expr.id) {
        crate::grammar::NodeKind::Seq(bounds, children) => {
            assert_eq!(bounds, Bounds::ONE);
            assert_eq!(children.len(), 3);
        }
        _ => panic!("expected a flattened Seq"),
    }
}

#[test]
fn or_chain_flattens_into_one_alt() {
    let g = Grammar::new();
    let expr = g.token(1) | g.token(2) | g.token(3);
    match g.node_kind(expr.id) {
        crate::grammar::NodeKind::Alt(bounds, children) => {
            assert_eq!(bounds, Bounds::ONE);
            assert_eq!(children.len(), 3);
        }
        _ => panic!("expected a flattened Alt"),
    }
}

#[test]
fn star_reuses_the_wrapping_seq_instead_of_double_wrapping() {
    let g = Grammar::new();
    let tok = g.token(1);
    let tok_id = tok.id;
    let starred = tok.star();
    // A single-child construct gets wrapped once, not twice: the same arena
    // slot is mutated in place.
    assert_eq!(starred.id, tok_id);
    match g.node_kind(starred.id) {
        crate::grammar::NodeKind::Seq(bounds, children) => {
            assert_eq!(bounds, Bounds::star());
            assert_eq!(children, vec![tok_id]);
        }
        _ => panic!("expected Tok wrapped in a Seq"),
    }
}

#[test]
fn redefining_a_nonterminal_with_a_different_input_cell_is_rejected() {
    let g = Grammar::new();
    let nt = g.nonterminal::<i32, ()>("thing");
    let a = Var::new(0);
    let b = Var::new(0);
    let body = g.token(1);
    nt.with_input(&a).define(body).unwrap();

    let other_body = g.token(2);
    let err = nt.with_input(&b).define(other_body).unwrap_err();
    assert!(matches!(err, GrammarError::InputRebound { .. }));
}

#[test]
fn redefining_a_nonterminal_with_the_same_cell_is_fine() {
    let g = Grammar::new();
    let nt = g.nonterminal::<i32, ()>("thing");
    let a = Var::new(0);
    nt.with_input(&a).define(g.token(1)).unwrap();
    nt.with_input(&a).define(g.token(2)).unwrap();
    match g.node_kind(nt.node_id()) {
        crate::grammar::NodeKind::Def(slot) => assert_eq!(slot.alternatives.len(), 2),
        _ => panic!("expected a Def"),
    }
}

#[test]
fn using_a_typed_nonterminal_without_an_input_binding_is_rejected() {
    let g = Grammar::new();
    let nt = g.nonterminal::<i32, ()>("needs_input");
    let out = Var::new(());
    let err = nt.with_output(&out).define(g.token(1)).unwrap_err();
    assert!(matches!(err, GrammarError::MissingInputBinding { .. }));
}
