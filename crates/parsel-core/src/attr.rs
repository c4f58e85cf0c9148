//! Flow-variable storage: a host-side location bound to a nonterminal's
//! input or output slot at a use-site.
//!
//! `Var<T>` is a cheap, cloneable handle (`Rc<RefCell<T>>`) the host creates
//! once and threads into one or more combinator use-sites. Two clones of the
//! same `Var` refer to the same storage, which is exactly the aliasing the
//! engine's attribute-propagation protocol needs to detect (§4.2: "if the
//! declared in-slot and out-slot alias").

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A single flow-variable storage location of type `T`.
pub struct Var<T>(Rc<RefCell<T>>);

impl<T> Var<T> {
    pub fn new(initial: T) -> Self {
        Self(Rc::new(RefCell::new(initial)))
    }

    /// Whether `self` and `other` name the *same* storage location (as
    /// opposed to merely equal values).
    pub fn same_cell(&self, other: &Var<T>) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Clone> Var<T> {
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }

    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }
}

impl<T> Clone for Var<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Var<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Var").field(&*self.0.borrow()).finish()
    }
}

/// Type-erased save/restore for one flow-variable cell.
///
/// The engine's `Def`-entry bookkeeping (§4.2: "save the current value of
/// every output attribute reachable from this `Def`'s subtree") needs to
/// hold a heterogeneous collection of output cells belonging to different
/// nonterminals with different `Out` types. `AttrCell` is the type-erased
/// handle that makes that collection possible; the typed swap performed on
/// `Ref` entry/exit never goes through this trait; only the coarser
/// snapshot/restore discipline does.
pub trait AttrCell {
    /// Snapshot the current value.
    fn snapshot(&self) -> Box<dyn Any>;
    /// Restore a value previously returned by `snapshot`.
    fn restore(&self, snapshot: Box<dyn Any>);
    /// Identity of the underlying storage, for deduplicating the reachable
    /// set and for recognizing the caller's pass-through slot.
    fn cell_id(&self) -> usize;
}

impl<T: Clone + 'static> AttrCell for Var<T> {
    fn snapshot(&self) -> Box<dyn Any> {
        Box::new(self.get())
    }

    fn restore(&self, snapshot: Box<dyn Any>) {
        let value = *snapshot
            .downcast::<T>()
            .expect("AttrCell::restore: snapshot type mismatch");
        self.set(value);
    }

    fn cell_id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}
