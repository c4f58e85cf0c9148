//! The grammar expression algebra: an arena of grammar nodes built up through
//! operator overloads and a small set of builder methods, with nonterminal
//! definitions carrying the flow-variable bindings the engine swaps in and
//! out of as it calls and returns from them.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use parsel_core::{AttrCell, Extractor, Symbol, TokenCode, Var};

use crate::error::{GrammarError, Result};

/// An index into a [`Grammar`]'s node arena.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct NodeId(u32);

/// The repeat-bound of a `Seq` or `Alt` node: `[min, max]` with `max == 0`
/// reserved to mark a lookahead (the body is tried, its cursor effect always
/// discarded, and a positive/negative lookahead distinguished by `min`).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Max {
    Bounded(u32),
    Unbounded,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min: u32,
    pub max: Max,
}

impl Bounds {
    /// `[1,1]`: the default for a plain `&`/`|` chain, matched exactly once.
    pub const ONE: Bounds = Bounds {
        min: 1,
        max: Max::Bounded(1),
    };

    pub fn star() -> Self {
        Bounds {
            min: 0,
            max: Max::Unbounded,
        }
    }

    pub fn plus() -> Self {
        Bounds {
            min: 1,
            max: Max::Unbounded,
        }
    }

    pub fn optional() -> Self {
        Bounds {
            min: 0,
            max: Max::Bounded(1),
        }
    }

    pub fn positive_lookahead() -> Self {
        Bounds {
            min: 1,
            max: Max::Bounded(0),
        }
    }

    pub fn negative_lookahead() -> Self {
        Bounds {
            min: 0,
            max: Max::Bounded(0),
        }
    }

    pub fn exactly(n: u32) -> Self {
        Bounds {
            min: n,
            max: Max::Bounded(n),
        }
    }

    pub fn between(min: u32, max: u32) -> Self {
        Bounds {
            min,
            max: Max::Bounded(max),
        }
    }

    pub fn is_lookahead(&self) -> bool {
        matches!(self.max, Max::Bounded(0))
    }

    pub(crate) fn max_value(&self) -> u32 {
        match self.max {
            Max::Bounded(n) => n,
            Max::Unbounded => u32::MAX,
        }
    }
}

#[derive(Clone)]
pub(crate) struct TokBinding {
    pub code: TokenCode,
    pub extract: Option<Rc<dyn Fn(TokenCode, &str) -> bool>>,
}

#[derive(Clone)]
pub(crate) struct ActBinding(pub Rc<dyn Fn() -> bool>);

#[derive(Clone)]
pub(crate) struct DefSlot {
    pub name: Symbol,
    /// Identity of this definition's own declared output cell, if any -- the
    /// one cell the Def-entry save/restore sweep must leave untouched, since
    /// producing a fresh value into it is the point of entering the Def.
    pub own_output_cell_id: Option<usize>,
    pub alternatives: Vec<NodeId>,
}

#[derive(Clone)]
pub(crate) struct RefSlot {
    pub target: NodeId,
    pub swap_in: Option<Rc<dyn Fn()>>,
    pub swap_out: Option<Rc<dyn Fn()>>,
}

#[derive(Clone)]
pub(crate) enum NodeKind {
    Tok(TokBinding),
    Act(ActBinding),
    Seq(Bounds, Vec<NodeId>),
    Alt(Bounds, Vec<NodeId>),
    Def(DefSlot),
    Ref(RefSlot),
}

pub(crate) struct GrammarInner {
    pub nodes: RefCell<Vec<NodeKind>>,
    pub interner: RefCell<parsel_core::Interner>,
    /// Every declared output cell registered by a `define`, used for the
    /// Def-entry save/restore sweep. Conservative: this is every output cell
    /// in the whole grammar, not just those reachable from one Def's
    /// subtree, which is always safe, only more cautious than strictly
    /// necessary.
    pub output_cells: RefCell<Vec<Rc<dyn AttrCell>>>,
}

/// A grammar: an arena of nodes plus the display-name interner for its
/// definitions. Cloning a `Grammar` clones the handle, not the arena -- all
/// clones share the same nodes.
///
/// `Grammar` is `!Send`/`!Sync` because it is built on `Rc`/`RefCell`: a
/// grammar may not be parsed from two threads at once, enforced at compile
/// time rather than merely documented.
pub struct Grammar {
    pub(crate) inner: Rc<GrammarInner>,
}

impl Clone for Grammar {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(GrammarInner {
                nodes: RefCell::new(Vec::new()),
                interner: RefCell::new(parsel_core::Interner::new()),
                output_cells: RefCell::new(Vec::new()),
            }),
        }
    }

    fn push_node(&self, kind: NodeKind) -> NodeId {
        let mut nodes = self.inner.nodes.borrow_mut();
        let id = NodeId(nodes.len() as u32);
        nodes.push(kind);
        id
    }

    pub(crate) fn node_kind(&self, id: NodeId) -> NodeKind {
        self.inner.nodes.borrow()[id.0 as usize].clone()
    }

    pub(crate) fn resolve_name(&self, sym: Symbol) -> String {
        self.inner.interner.borrow().resolve(sym).to_string()
    }

    pub(crate) fn same(&self, other: &Grammar) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn snapshot_output_cells(
        &self,
        exclude: Option<usize>,
    ) -> Vec<(Rc<dyn AttrCell>, Box<dyn Any>)> {
        self.inner
            .output_cells
            .borrow()
            .iter()
            .filter(|c| Some(c.cell_id()) != exclude)
            .map(|c| (Rc::clone(c), c.snapshot()))
            .collect()
    }

    pub(crate) fn restore_output_cells(&self, snapshot: Vec<(Rc<dyn AttrCell>, Box<dyn Any>)>) {
        for (cell, value) in snapshot {
            cell.restore(value);
        }
    }

    /// A terminal matching token `code`, with no attribute binding.
    pub fn token(&self, code: TokenCode) -> Expr {
        let id = self.push_node(NodeKind::Tok(TokBinding { code, extract: None }));
        Expr {
            grammar: self.clone(),
            id,
        }
    }

    /// A terminal matching token `code`, extracting its lexeme into `out`
    /// via `T::from_str`.
    pub fn token_with<T>(&self, code: TokenCode, out: &Var<T>) -> Expr
    where
        T: Clone + std::str::FromStr + 'static,
    {
        self.token_extract(code, out, parsel_core::DefaultExtractor)
    }

    /// A terminal matching token `code`, extracting its lexeme into `out`
    /// via a caller-supplied [`Extractor`]. Extraction failure is
    /// indistinguishable from a code mismatch: both just fail the match.
    pub fn token_extract<T, E>(&self, code: TokenCode, out: &Var<T>, extractor: E) -> Expr
    where
        T: Clone + 'static,
        E: Extractor<T> + 'static,
    {
        let out = out.clone();
        let extract: Rc<dyn Fn(TokenCode, &str) -> bool> = Rc::new(move |code, text| {
            match extractor.extract(code, text) {
                Some(value) => {
                    out.set(value);
                    true
                }
                None => false,
            }
        });
        let id = self.push_node(NodeKind::Tok(TokBinding {
            code,
            extract: Some(extract),
        }));
        Expr {
            grammar: self.clone(),
            id,
        }
    }

    /// A semantic action: runs `f` with no cursor effect. Returning `false`
    /// signals a parsing failure at this point, indistinguishable from a
    /// terminal mismatch to everything above it.
    pub fn action(&self, f: impl Fn() -> bool + 'static) -> Expr {
        let id = self.push_node(NodeKind::Act(ActBinding(Rc::new(f))));
        Expr {
            grammar: self.clone(),
            id,
        }
    }

    /// Declare a nonterminal with display name `name`. The returned handle
    /// has no alternatives yet -- build its right-hand side with `&`/`|`
    /// and friends, then attach it with [`Nonterminal::define`] (or
    /// [`BoundRef::define`] for a typed nonterminal).
    pub fn nonterminal<In, Out>(&self, name: impl Into<String>) -> Nonterminal<In, Out>
    where
        In: Clone + 'static,
        Out: Clone + 'static,
    {
        let name = self.inner.interner.borrow_mut().intern_owned(name.into());
        let id = self.push_node(NodeKind::Def(DefSlot {
            name,
            own_output_cell_id: None,
            alternatives: Vec::new(),
        }));
        Nonterminal {
            grammar: self.clone(),
            id,
            in_slot: Rc::new(RefCell::new(None)),
            out_slot: Rc::new(RefCell::new(None)),
        }
    }

    fn make_ref<In, Out>(
        &self,
        target: NodeId,
        in_slot: Rc<RefCell<Option<Var<In>>>>,
        out_slot: Rc<RefCell<Option<Var<Out>>>>,
        input: Option<Var<In>>,
        output: Option<Var<Out>>,
    ) -> Expr
    where
        In: Clone + 'static,
        Out: Clone + 'static,
    {
        let swap_in = input.map(|caller| make_swap(in_slot, caller));
        let swap_out = output.map(|caller| make_swap(out_slot, caller));
        let id = self.push_node(NodeKind::Ref(RefSlot {
            target,
            swap_in,
            swap_out,
        }));
        Expr {
            grammar: self.clone(),
            id,
        }
    }

    fn pin_and_define<In, Out>(
        &self,
        nt: &Nonterminal<In, Out>,
        input: Option<Var<In>>,
        output: Option<Var<Out>>,
        rhs: NodeId,
    ) -> Result<()>
    where
        In: Clone + 'static,
        Out: Clone + 'static,
    {
        if let Some(input) = input {
            pin_slot(&nt.in_slot, input, || GrammarError::InputRebound {
                name: self.resolve_name(self.def_name(nt.id)),
            })?;
        }
        if let Some(output) = output {
            let newly_pinned = pin_slot(&nt.out_slot, output.clone(), || GrammarError::OutputRebound {
                name: self.resolve_name(self.def_name(nt.id)),
            })?;
            if newly_pinned {
                self.register_output_cell(nt.id, output);
            }
        }
        let mut nodes = self.inner.nodes.borrow_mut();
        if let NodeKind::Def(slot) = &mut nodes[nt.id.0 as usize] {
            slot.alternatives.push(rhs);
        }
        Ok(())
    }

    fn def_name(&self, id: NodeId) -> Symbol {
        match &self.inner.nodes.borrow()[id.0 as usize] {
            NodeKind::Def(slot) => slot.name,
            _ => unreachable!("Nonterminal always wraps a Def node"),
        }
    }

    fn register_output_cell<T: Clone + 'static>(&self, def_id: NodeId, var: Var<T>) {
        let cell: Rc<dyn AttrCell> = Rc::new(var);
        let id = cell.cell_id();
        self.inner.output_cells.borrow_mut().push(cell);
        let mut nodes = self.inner.nodes.borrow_mut();
        if let NodeKind::Def(slot) = &mut nodes[def_id.0 as usize] {
            slot.own_output_cell_id = Some(id);
        }
    }

    fn seq_and(&self, lhs: NodeId, rhs: NodeId) -> NodeId {
        let mut nodes = self.inner.nodes.borrow_mut();
        if let NodeKind::Seq(bounds, children) = &mut nodes[lhs.0 as usize]
            && *bounds == Bounds::ONE
        {
            children.push(rhs);
            return lhs;
        }
        drop(nodes);
        self.push_node(NodeKind::Seq(Bounds::ONE, vec![lhs, rhs]))
    }

    fn alt_or(&self, lhs: NodeId, rhs: NodeId) -> NodeId {
        let mut nodes = self.inner.nodes.borrow_mut();
        if let NodeKind::Alt(bounds, children) = &mut nodes[lhs.0 as usize]
            && *bounds == Bounds::ONE
        {
            children.push(rhs);
            return lhs;
        }
        drop(nodes);
        self.push_node(NodeKind::Alt(Bounds::ONE, vec![lhs, rhs]))
    }

    fn wrap_bounds(&self, id: NodeId, bounds: Bounds) -> NodeId {
        let mut nodes = self.inner.nodes.borrow_mut();
        match &mut nodes[id.0 as usize] {
            NodeKind::Seq(b, _) | NodeKind::Alt(b, _) => {
                *b = bounds;
                id
            }
            _ => {
                drop(nodes);
                self.push_node(NodeKind::Seq(bounds, vec![id]))
            }
        }
    }
}

/// Exchange `caller`'s value with whatever is in `slot` when invoked, unless
/// they already name the same cell. Calling the same closure a second time
/// undoes the first: the swap is its own inverse, which is exactly the
/// entry/exit protocol a `Ref` needs.
fn make_swap<T: Clone + 'static>(
    slot: Rc<RefCell<Option<Var<T>>>>,
    caller: Var<T>,
) -> Rc<dyn Fn()> {
    Rc::new(move || {
        let declared = slot
            .borrow()
            .clone()
            .expect("nonterminal referenced before its attribute was bound by `define`");
        if !caller.same_cell(&declared) {
            let a = caller.get();
            let b = declared.get();
            caller.set(b);
            declared.set(a);
        }
    })
}

/// Pin `slot` to `var` the first time it's set; on a later call, require the
/// same cell. Returns whether this call is the one that pinned it.
fn pin_slot<T: Clone + 'static>(
    slot: &Rc<RefCell<Option<Var<T>>>>,
    var: Var<T>,
    mismatch: impl FnOnce() -> GrammarError,
) -> Result<bool> {
    let mut slot = slot.borrow_mut();
    match &*slot {
        Some(existing) if !existing.same_cell(&var) => Err(mismatch()),
        Some(_) => Ok(false),
        None => {
            *slot = Some(var);
            Ok(true)
        }
    }
}

/// A combinable grammar fragment: the handle every operator and builder
/// method returns. Two `Expr`s from different `Grammar`s must never meet --
/// combining them panics rather than silently mixing arenas.
#[derive(Clone)]
pub struct Expr {
    pub(crate) grammar: Grammar,
    pub(crate) id: NodeId,
}

impl Expr {
    /// `~X`: positive lookahead. Tries `self`, always restores the cursor,
    /// accepts iff `self` matched.
    pub fn lookahead(self) -> Expr {
        let id = self.grammar.wrap_bounds(self.id, Bounds::positive_lookahead());
        Expr {
            grammar: self.grammar,
            id,
        }
    }

    /// `*X`: zero or more.
    pub fn star(self) -> Expr {
        let id = self.grammar.wrap_bounds(self.id, Bounds::star());
        Expr {
            grammar: self.grammar,
            id,
        }
    }

    /// `+X`: one or more.
    pub fn plus(self) -> Expr {
        let id = self.grammar.wrap_bounds(self.id, Bounds::plus());
        Expr {
            grammar: self.grammar,
            id,
        }
    }

    /// `n - m * X`: between `n` and `m` repetitions, inclusive.
    pub fn repeat(self, min: u32, max: u32) -> Expr {
        let id = self.grammar.wrap_bounds(self.id, Bounds::between(min, max));
        Expr {
            grammar: self.grammar,
            id,
        }
    }

    /// `n * X`: exactly `n` repetitions.
    pub fn exactly(self, n: u32) -> Expr {
        let id = self.grammar.wrap_bounds(self.id, Bounds::exactly(n));
        Expr {
            grammar: self.grammar,
            id,
        }
    }
}

impl std::ops::BitAnd for Expr {
    type Output = Expr;

    /// `X & Y`: sequencing. Appends to `self` in place when it is already a
    /// plain (`[1,1]`) `Seq`, which is how a left-associative `&` chain
    /// builds one flat `Seq` instead of nesting.
    fn bitand(self, rhs: Expr) -> Expr {
        assert!(self.grammar.same(&rhs.grammar), "Expr from different grammars combined");
        let id = self.grammar.seq_and(self.id, rhs.id);
        Expr {
            grammar: self.grammar,
            id,
        }
    }
}

impl std::ops::BitOr for Expr {
    type Output = Expr;

    /// `X | Y`: ordered choice, flattened in place the same way `&` is.
    fn bitor(self, rhs: Expr) -> Expr {
        assert!(self.grammar.same(&rhs.grammar), "Expr from different grammars combined");
        let id = self.grammar.alt_or(self.id, rhs.id);
        Expr {
            grammar: self.grammar,
            id,
        }
    }
}

impl std::ops::Neg for Expr {
    type Output = Expr;

    /// `-X`: optional, `[0,1]`.
    fn neg(self) -> Expr {
        let id = self.grammar.wrap_bounds(self.id, Bounds::optional());
        Expr {
            grammar: self.grammar,
            id,
        }
    }
}

impl std::ops::Not for Expr {
    type Output = Expr;

    /// `!X`: negative lookahead, `[0,0]`.
    fn not(self) -> Expr {
        let id = self.grammar.wrap_bounds(self.id, Bounds::negative_lookahead());
        Expr {
            grammar: self.grammar,
            id,
        }
    }
}

impl std::ops::Mul<Expr> for usize {
    type Output = Expr;

    /// `n * X`: exactly `n` repetitions.
    fn mul(self, rhs: Expr) -> Expr {
        rhs.exactly(self as u32)
    }
}

/// A nonterminal definition: the `In`/`Out` generic parameters are the types
/// of its inherited input and synthesized output attributes, or `()` for
/// neither.
pub struct Nonterminal<In = (), Out = ()> {
    grammar: Grammar,
    id: NodeId,
    in_slot: Rc<RefCell<Option<Var<In>>>>,
    out_slot: Rc<RefCell<Option<Var<Out>>>>,
}

impl<In, Out> Clone for Nonterminal<In, Out> {
    fn clone(&self) -> Self {
        Self {
            grammar: self.grammar.clone(),
            id: self.id,
            in_slot: Rc::clone(&self.in_slot),
            out_slot: Rc::clone(&self.out_slot),
        }
    }
}

impl<In, Out> Nonterminal<In, Out> {
    #[cfg(test)]
    pub(crate) fn node_id(&self) -> NodeId {
        self.id
    }
}

impl<In, Out> Nonterminal<In, Out>
where
    In: Clone + 'static,
    Out: Clone + 'static,
{
    /// A use-site binding only the input attribute (`nt(in)`).
    pub fn with_input(&self, input: &Var<In>) -> BoundRef<In, Out> {
        BoundRef {
            nt: self.clone(),
            input: Some(input.clone()),
            output: None,
        }
    }

    /// A use-site binding only the output attribute (`nt >> out`).
    pub fn with_output(&self, output: &Var<Out>) -> BoundRef<In, Out> {
        BoundRef {
            nt: self.clone(),
            input: None,
            output: Some(output.clone()),
        }
    }

    /// A use-site binding both attributes (`nt(in) >> out`).
    pub fn with_io(&self, input: &Var<In>, output: &Var<Out>) -> BoundRef<In, Out> {
        BoundRef {
            nt: self.clone(),
            input: Some(input.clone()),
            output: Some(output.clone()),
        }
    }
}

impl Nonterminal<(), ()> {
    /// A bare use-site reference, for a nonterminal with no attributes.
    pub fn reference(&self) -> Expr {
        let id = self.grammar.push_node(NodeKind::Ref(RefSlot {
            target: self.id,
            swap_in: None,
            swap_out: None,
        }));
        Expr {
            grammar: self.grammar.clone(),
            id,
        }
    }

    /// `nt = rhs`: append an alternative, with no attribute binding.
    pub fn define(&self, rhs: Expr) {
        assert!(self.grammar.same(&rhs.grammar), "Expr from a different grammar");
        let mut nodes = self.grammar.inner.nodes.borrow_mut();
        if let NodeKind::Def(slot) = &mut nodes[self.id.0 as usize] {
            slot.alternatives.push(rhs.id);
        }
    }
}

/// A nonterminal use-site with attribute bindings attached, produced by
/// [`Nonterminal::with_input`]/`with_output`/`with_io`. Call [`into_expr`]
/// to use it as a reference elsewhere, or [`define`] to attach it as this
/// nonterminal's definition.
///
/// [`into_expr`]: BoundRef::into_expr
/// [`define`]: BoundRef::define
pub struct BoundRef<In, Out> {
    nt: Nonterminal<In, Out>,
    input: Option<Var<In>>,
    output: Option<Var<Out>>,
}

impl<In, Out> BoundRef<In, Out>
where
    In: Clone + 'static,
    Out: Clone + 'static,
{
    fn check_input_required(&self) -> Result<()> {
        if self.input.is_none()
            && std::any::TypeId::of::<In>() != std::any::TypeId::of::<()>()
        {
            return Err(GrammarError::MissingInputBinding {
                name: self.nt.grammar.resolve_name(self.nt.grammar.def_name(self.nt.id)),
            });
        }
        Ok(())
    }

    pub fn try_into_expr(self) -> Result<Expr> {
        self.check_input_required()?;
        let grammar = self.nt.grammar.clone();
        Ok(grammar.make_ref(
            self.nt.id,
            Rc::clone(&self.nt.in_slot),
            Rc::clone(&self.nt.out_slot),
            self.input,
            self.output,
        ))
    }

    /// Like [`try_into_expr`](Self::try_into_expr), panicking on a missing
    /// required input binding instead of returning an error -- the
    /// convenient spelling for the common case where the binding was
    /// supplied.
    pub fn into_expr(self) -> Expr {
        self.try_into_expr()
            .expect("nonterminal use-site missing its required input binding")
    }

    /// `nt(in) >> out = rhs`: pin this nonterminal's declared attribute
    /// cells to the bound locations (or check they match what was already
    /// pinned) and append `rhs` as an alternative.
    pub fn define(self, rhs: Expr) -> Result<()> {
        self.check_input_required()?;
        assert!(self.nt.grammar.same(&rhs.grammar), "Expr from a different grammar");
        let grammar = self.nt.grammar.clone();
        grammar.pin_and_define(&self.nt, self.input, self.output, rhs.id)
    }
}
