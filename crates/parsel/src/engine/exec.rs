//! The backtracking recursive-descent recognition engine.
//!
//! One function per grammar node kind, each taking the cursor by `&mut
//! usize` and threading a [`TreeScratch`] for its parent to commit or
//! discard. Backtracking rides the native call stack: there is no explicit
//! checkpoint stack, because every combinator that can fail already saves
//! the one thing it needs (the cursor position) in a local and restores it
//! inline before returning `Ok(false)`.

use parsel_core::{TokenStream, TreeNode};

use crate::error::RuntimeError;
use crate::grammar::{Bounds, Expr, Grammar, NodeId, NodeKind};

use super::fuel::{Fuel, FuelLimits};
use super::trace::{NoopTracer, Tracer};
use super::tree_scratch::TreeScratch;

impl Expr {
    /// Recognize `self` against `tokens` starting at `*pos`, advancing
    /// `*pos` past the match on success and leaving it unchanged on
    /// failure. Uses [`NoopTracer`] and the default [`FuelLimits`].
    pub fn parse(&self, tokens: &dyn TokenStream, pos: &mut usize) -> Result<bool, RuntimeError> {
        self.parse_with(tokens, pos, &mut NoopTracer, FuelLimits::default(), None)
    }

    /// Like [`parse`](Self::parse), also building the parse tree into
    /// `tree` on acceptance (left untouched on rejection).
    pub fn parse_tree(
        &self,
        tokens: &dyn TokenStream,
        pos: &mut usize,
        tree: &mut Vec<TreeNode>,
    ) -> Result<bool, RuntimeError> {
        self.parse_with(
            tokens,
            pos,
            &mut NoopTracer,
            FuelLimits::default(),
            Some(tree),
        )
    }

    /// The fully configurable entry point: an explicit [`Tracer`],
    /// [`FuelLimits`], and optional tree output.
    pub fn parse_with(
        &self,
        tokens: &dyn TokenStream,
        pos: &mut usize,
        tracer: &mut dyn Tracer,
        limits: FuelLimits,
        tree: Option<&mut Vec<TreeNode>>,
    ) -> Result<bool, RuntimeError> {
        let mut fuel = Fuel::new(limits);
        let mut scratch = TreeScratch::new();
        let accepted = exec(&self.grammar, self.id, pos, &mut scratch, tokens, tracer, &mut fuel)?;
        if accepted
            && let Some(out) = tree
        {
            out.clear();
            out.extend(scratch.into_vec());
        }
        Ok(accepted)
    }
}

fn exec(
    grammar: &Grammar,
    id: NodeId,
    pos: &mut usize,
    tree: &mut TreeScratch,
    tokens: &dyn TokenStream,
    tracer: &mut dyn Tracer,
    fuel: &mut Fuel,
) -> Result<bool, RuntimeError> {
    fuel.step()?;
    match grammar.node_kind(id) {
        NodeKind::Tok(binding) => {
            tracer.trace_tok_attempt(binding.code, *pos);
            if !tokens.has(*pos) {
                tracer.trace_tok_failure(*pos);
                return Ok(false);
            }
            let tok = tokens.at(*pos);
            if tok.code != binding.code {
                tracer.trace_tok_failure(*pos);
                return Ok(false);
            }
            if let Some(extract) = &binding.extract
                && !extract(tok.code, &tok.text)
            {
                tracer.trace_tok_failure(*pos);
                return Ok(false);
            }
            tracer.trace_tok_success(&tok);
            tree.push_leaf(tok.text);
            *pos += 1;
            Ok(true)
        }
        NodeKind::Act(binding) => {
            let ok = (binding.0)();
            tracer.trace_act(ok);
            Ok(ok)
        }
        NodeKind::Seq(bounds, children) => {
            exec_seq(grammar, &children, bounds, pos, tree, tokens, tracer, fuel)
        }
        NodeKind::Alt(bounds, children) => {
            exec_alt(grammar, &children, bounds, pos, tree, tokens, tracer, fuel)
        }
        NodeKind::Def(slot) => {
            fuel.enter_call()?;
            let name = grammar.resolve_name(slot.name);
            tracer.trace_def_enter(&name);
            let snapshot = grammar.snapshot_output_cells(slot.own_output_cell_id);

            let start = *pos;
            let mut accepted_scratch = None;
            let mut err = None;
            for &alt in &slot.alternatives {
                *pos = start;
                let mut scratch = TreeScratch::new();
                match exec(grammar, alt, pos, &mut scratch, tokens, tracer, fuel) {
                    Ok(true) => {
                        accepted_scratch = Some(scratch);
                        break;
                    }
                    Ok(false) => continue,
                    Err(e) => {
                        err = Some(e);
                        break;
                    }
                }
            }
            fuel.exit_call();

            if let Some(e) = err {
                return Err(e);
            }

            let accepted = accepted_scratch.is_some();
            if accepted_scratch.is_none() {
                *pos = start;
            }
            // Every non-caller output cell goes back to its Def-entry value
            // whether this Def accepted or rejected: synthesized work on the
            // winning path is preserved only for this Def's own output, not
            // for every other cell a losing or nested alternative happened
            // to write along the way.
            grammar.restore_output_cells(snapshot);
            if let Some(scratch) = accepted_scratch {
                tree.push_interior(name.clone(), scratch.into_vec());
            }
            tracer.trace_def_exit(&name, accepted);
            Ok(accepted)
        }
        NodeKind::Ref(slot) => {
            if let Some(f) = &slot.swap_in {
                f();
            }
            if let Some(f) = &slot.swap_out {
                f();
            }
            let result = exec(grammar, slot.target, pos, tree, tokens, tracer, fuel);
            // The same two closures undo the swap on the way out: calling a
            // self-inverse function twice is the identity.
            if let Some(f) = &slot.swap_in {
                f();
            }
            if let Some(f) = &slot.swap_out {
                f();
            }
            result
        }
    }
}

fn exec_chain(
    grammar: &Grammar,
    children: &[NodeId],
    pos: &mut usize,
    scratch: &mut TreeScratch,
    tokens: &dyn TokenStream,
    tracer: &mut dyn Tracer,
    fuel: &mut Fuel,
) -> Result<bool, RuntimeError> {
    for &child in children {
        if !exec(grammar, child, pos, scratch, tokens, tracer, fuel)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[allow(clippy::too_many_arguments)]
fn exec_seq(
    grammar: &Grammar,
    children: &[NodeId],
    bounds: Bounds,
    pos: &mut usize,
    tree: &mut TreeScratch,
    tokens: &dyn TokenStream,
    tracer: &mut dyn Tracer,
    fuel: &mut Fuel,
) -> Result<bool, RuntimeError> {
    if bounds.is_lookahead() {
        let start = *pos;
        let mut local_pos = start;
        let mut scratch = TreeScratch::new();
        let matched = exec_chain(grammar, children, &mut local_pos, &mut scratch, tokens, tracer, fuel)?;
        *pos = start;
        let positive = bounds.min > 0;
        let accept = if positive { matched } else { !matched };
        tracer.trace_seq_iteration(0, accept);
        if accept && positive {
            tree.hoist(scratch);
        }
        return Ok(accept);
    }

    let max = bounds.max_value();
    let seq_start = *pos;
    let mut committed = 0u32;
    loop {
        if committed >= max {
            break;
        }
        let iter_start = *pos;
        let mut scratch = TreeScratch::new();
        let chain_ok = exec_chain(grammar, children, pos, &mut scratch, tokens, tracer, fuel)?;
        tracer.trace_seq_iteration(committed, chain_ok);
        if chain_ok {
            committed += 1;
            let zero_width = *pos == iter_start;
            tree.hoist(scratch);
            if zero_width {
                break;
            }
        } else {
            *pos = iter_start;
            break;
        }
    }
    if committed < bounds.min {
        // Full rewind: a Seq that ultimately fails must be a no-op from its
        // parent's point of view, so an enclosing Alt or Def can try its
        // next branch from the position it called this Seq at.
        *pos = seq_start;
        return Ok(false);
    }
    Ok(true)
}

#[allow(clippy::too_many_arguments)]
fn exec_alt(
    grammar: &Grammar,
    children: &[NodeId],
    bounds: Bounds,
    pos: &mut usize,
    tree: &mut TreeScratch,
    tokens: &dyn TokenStream,
    tracer: &mut dyn Tracer,
    fuel: &mut Fuel,
) -> Result<bool, RuntimeError> {
    if bounds.is_lookahead() {
        let start = *pos;
        let mut matched = false;
        let mut scratch = TreeScratch::new();
        for (i, &child) in children.iter().enumerate() {
            let mut local_pos = start;
            let mut attempt = TreeScratch::new();
            if exec(grammar, child, &mut local_pos, &mut attempt, tokens, tracer, fuel)? {
                tracer.trace_alt_try(i, true);
                matched = true;
                scratch = attempt;
                break;
            }
            tracer.trace_alt_try(i, false);
        }
        *pos = start;
        let positive = bounds.min > 0;
        let accept = if positive { matched } else { !matched };
        if accept && positive {
            tree.hoist(scratch);
        }
        return Ok(accept);
    }

    let max = bounds.max_value();
    let alt_start = *pos;
    let mut committed = 0u32;
    loop {
        if committed >= max {
            break;
        }
        let iter_start = *pos;
        let mut matched_this_iter = false;
        let mut scratch = TreeScratch::new();
        for (i, &child) in children.iter().enumerate() {
            *pos = iter_start;
            scratch = TreeScratch::new();
            if exec(grammar, child, pos, &mut scratch, tokens, tracer, fuel)? {
                tracer.trace_alt_try(i, true);
                matched_this_iter = true;
                break;
            }
            tracer.trace_alt_try(i, false);
        }
        if matched_this_iter {
            committed += 1;
            let zero_width = *pos == iter_start;
            tree.hoist(scratch);
            if zero_width {
                break;
            }
        } else {
            *pos = iter_start;
            break;
        }
    }
    if committed < bounds.min {
        *pos = alt_start;
        return Ok(false);
    }
    Ok(true)
}
