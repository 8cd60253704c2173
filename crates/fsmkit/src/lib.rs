//! Finite-state automata for lexers, regex engines and pattern matchers.
//!
//! This crate provides:
//! - [`NFA`]: non-deterministic transitions plus lambda transitions, as a
//!   plain data structure
//! - [`DFA`]: deterministic transitions, a step-by-step [`Walker`] and
//!   minimization with pluggable compare/merge hooks
//!
//! Both embed the same automaton core ([`Fsm`]), reached through the
//! [`Automaton`] trait. Symbols are caller-defined; see [`Symbol`].
//!
//! ```
//! use fsmkit::{Automaton, create_dfa};
//!
//! let mut dfa = create_dfa();
//! let q0 = dfa.initial_state();
//! let q1 = dfa.create_state();
//! dfa.mark_final(q1);
//! dfa.add_transition(q0, 'a', q1);
//! dfa.add_transition(q1, 'a', q1);
//!
//! let minimized = dfa.minimize();
//! assert!(minimized.accepts("aaa".chars()));
//! assert!(!minimized.accepts("".chars()));
//! ```

mod dfa;
mod error;
mod fsm;
mod minimize;
mod nfa;
mod state;
mod symbol;

pub use dfa::{DFA, Walker};
pub use error::WalkError;
pub use fsm::{Automaton, Fsm};
pub use minimize::{CompareFn, MergeFn, MinimizeOptions, Predecessors, Refinement};
pub use nfa::NFA;
pub use state::{State, StateId, StateSet};
pub use symbol::Symbol;

/// Create an empty DFA owning only its initial state.
pub fn create_dfa<S: Symbol>() -> DFA<S> {
    DFA::new()
}

/// Create an empty NFA owning only its initial state.
pub fn create_nfa<S: Symbol>() -> NFA<S> {
    NFA::new()
}
