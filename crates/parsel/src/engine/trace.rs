//! Engine instrumentation.
//!
//! [`NoopTracer`]'s methods are `#[inline(always)]` no-ops, so a release
//! build compiles the tracing calls away entirely. [`PrintTracer`] routes
//! the same events through the `log` crate instead of formatting its own
//! output, so a host can capture engine diagnostics with whatever
//! subscriber it already uses.

use parsel_core::{Token, TokenCode};

/// How much a [`PrintTracer`] logs. Each level is a superset of the one
/// before it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// `Def` call/return only.
    #[default]
    Default,
    /// Adds token matches and alternative attempts.
    Verbose,
    /// Adds every terminal attempt, including failed ones, and every `Seq`
    /// iteration.
    VeryVerbose,
}

/// Hooks the engine calls while recognizing a grammar against a token
/// stream. Implement this to observe matching without changing it.
pub trait Tracer {
    fn trace_tok_attempt(&mut self, code: TokenCode, pos: usize);
    fn trace_tok_success(&mut self, token: &Token);
    fn trace_tok_failure(&mut self, pos: usize);
    fn trace_act(&mut self, ok: bool);
    fn trace_seq_iteration(&mut self, iteration: u32, ok: bool);
    fn trace_alt_try(&mut self, branch: usize, ok: bool);
    fn trace_def_enter(&mut self, name: &str);
    fn trace_def_exit(&mut self, name: &str, ok: bool);
}

/// The default tracer: every method is an inlined no-op.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_tok_attempt(&mut self, _code: TokenCode, _pos: usize) {}
    #[inline(always)]
    fn trace_tok_success(&mut self, _token: &Token) {}
    #[inline(always)]
    fn trace_tok_failure(&mut self, _pos: usize) {}
    #[inline(always)]
    fn trace_act(&mut self, _ok: bool) {}
    #[inline(always)]
    fn trace_seq_iteration(&mut self, _iteration: u32, _ok: bool) {}
    #[inline(always)]
    fn trace_alt_try(&mut self, _branch: usize, _ok: bool) {}
    #[inline(always)]
    fn trace_def_enter(&mut self, _name: &str) {}
    #[inline(always)]
    fn trace_def_exit(&mut self, _name: &str, _ok: bool) {}
}

/// A tracer that logs engine events through the `log` crate at the chosen
/// [`Verbosity`].
pub struct PrintTracer {
    verbosity: Verbosity,
}

impl PrintTracer {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

impl Tracer for PrintTracer {
    fn trace_tok_attempt(&mut self, code: TokenCode, pos: usize) {
        if self.verbosity == Verbosity::VeryVerbose {
            log::trace!("tok({code}) @ {pos}");
        }
    }

    fn trace_tok_success(&mut self, token: &Token) {
        if self.verbosity != Verbosity::Default {
            log::debug!(
                "match {:?} ({}:{})",
                token.text,
                token.lineno,
                token.columno
            );
        }
    }

    fn trace_tok_failure(&mut self, pos: usize) {
        if self.verbosity == Verbosity::VeryVerbose {
            log::trace!("no match @ {pos}");
        }
    }

    fn trace_act(&mut self, ok: bool) {
        if self.verbosity != Verbosity::Default {
            log::debug!("action -> {ok}");
        }
    }

    fn trace_seq_iteration(&mut self, iteration: u32, ok: bool) {
        if self.verbosity == Verbosity::VeryVerbose {
            log::trace!("seq iteration {iteration} -> {ok}");
        }
    }

    fn trace_alt_try(&mut self, branch: usize, ok: bool) {
        if self.verbosity != Verbosity::Default {
            log::debug!("alt branch {branch} -> {ok}");
        }
    }

    fn trace_def_enter(&mut self, name: &str) {
        log::debug!("-> {name}");
    }

    fn trace_def_exit(&mut self, name: &str, ok: bool) {
        log::debug!("<- {name} ({ok})");
    }
}
