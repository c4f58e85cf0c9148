//! The recognition engine: a backtracking recursive-descent interpreter
//! over a [`crate::Grammar`]'s node arena, with attribute flow, parse-tree
//! hoisting, fuel limits, and tracing.

mod exec;
mod fuel;
mod trace;
mod tree_scratch;


pub use fuel::FuelLimits;
pub use trace::{NoopTracer, PrintTracer, Tracer, Verbosity};
