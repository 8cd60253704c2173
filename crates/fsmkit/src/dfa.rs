//! Deterministic Finite Automaton (DFA) implementation and its walker.

use crate::error::WalkError;
use crate::fsm::{Automaton, Fsm};
use crate::minimize::{self, MinimizeOptions};
use crate::state::{State, StateSet};
use crate::symbol::Symbol;
use indexmap::{IndexMap, IndexSet};
use std::borrow::Borrow;
use std::collections::VecDeque;

/// A Deterministic Finite Automaton.
///
/// Transitions are partial: a missing transition rejects the input, there is
/// no implicit trap state.
#[derive(Debug, Clone)]
pub struct DFA<S> {
    fsm: Fsm,
    /// Transitions: source -> symbol -> destination
    transitions: IndexMap<State, IndexMap<S, State>>,
    /// All symbols used, in order of first use
    alphabet: IndexSet<S>,
}

impl<S: Symbol> DFA<S> {
    /// Create a new DFA owning only its initial state.
    pub fn new() -> Self {
        Self {
            fsm: Fsm::new(),
            transitions: IndexMap::new(),
            alphabet: IndexSet::new(),
        }
    }

    /// Add a transition.
    ///
    /// A second transition for the same (source, symbol) pair replaces the
    /// first; the replaced destination is returned.
    pub fn add_transition(
        &mut self,
        source: State,
        symbol: S,
        destination: State,
    ) -> Option<State> {
        if !self.alphabet.contains(&symbol) {
            self.alphabet.insert(symbol.clone());
        }
        self.transitions
            .entry(source)
            .or_default()
            .insert(symbol, destination)
    }

    /// Get the transition from a state on a symbol.
    pub fn transition(&self, source: State, symbol: &S) -> Option<State> {
        self.transitions.get(&source)?.get(symbol).copied()
    }

    /// Get the outgoing transitions of a single state.
    pub fn transitions_from(&self, source: State) -> impl Iterator<Item = (&S, State)> + '_ {
        self.transitions
            .get(&source)
            .into_iter()
            .flat_map(|by_symbol| by_symbol.iter().map(|(sym, &dst)| (sym, dst)))
    }

    /// Get all transitions as an iterator, in insertion order of their sources.
    pub fn transitions(&self) -> impl Iterator<Item = (State, &S, State)> + '_ {
        self.transitions.iter().flat_map(|(&src, by_symbol)| {
            by_symbol.iter().map(move |(sym, &dst)| (src, sym, dst))
        })
    }

    pub fn num_transitions(&self) -> usize {
        self.transitions.values().map(IndexMap::len).sum()
    }

    /// Get the alphabet.
    pub fn alphabet(&self) -> &IndexSet<S> {
        &self.alphabet
    }

    /// Find all states reachable from the initial state.
    pub fn reachable_states(&self) -> StateSet {
        let mut reachable = StateSet::with_capacity(self.num_states());
        let mut queue = VecDeque::new();
        reachable.insert(self.initial_state());
        queue.push_back(self.initial_state());

        while let Some(state) = queue.pop_front() {
            for (_, next) in self.transitions_from(state) {
                if reachable.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        reachable
    }

    /// Check if the DFA is empty (accepts no strings).
    pub fn is_empty(&self) -> bool {
        !self.reachable_states().intersects(self.final_states())
    }

    /// Run `input` from the initial state and report whether it is accepted.
    pub fn accepts<I>(&self, input: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<S>,
    {
        let mut walker = self.walker();
        walker.walk(input).is_ok() && walker.is_in_final_state()
    }

    /// Get a walker positioned at the initial state.
    pub fn walker(&self) -> Walker<'_, S> {
        self.walker_from(self.initial_state())
    }

    /// Get a walker positioned at `state`.
    pub fn walker_from(&self, state: State) -> Walker<'_, S> {
        Walker {
            dfa: self,
            current_state: state,
        }
    }

    /// Minimize with the default options: every pair of language-equivalent
    /// states is merged and nothing is transferred onto the new states.
    pub fn minimize(&self) -> DFA<S> {
        self.minimize_with(MinimizeOptions::default())
    }

    /// Build a new, independent DFA accepting the same language, with
    /// indistinguishable states collapsed and unreachable or dead states
    /// dropped. See [`MinimizeOptions`] for the hooks.
    pub fn minimize_with(&self, options: MinimizeOptions<'_>) -> DFA<S> {
        minimize::minimize(self, options)
    }
}

impl<S> Automaton for DFA<S> {
    fn core(&self) -> &Fsm {
        &self.fsm
    }

    fn core_mut(&mut self) -> &mut Fsm {
        &mut self.fsm
    }
}

impl<S: Symbol> Default for DFA<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Step-by-step simulation of a [`DFA`].
///
/// The walker only moves forward; build a new one to start over.
#[derive(Debug, Clone)]
pub struct Walker<'a, S> {
    dfa: &'a DFA<S>,
    current_state: State,
}

impl<S: Symbol> Walker<'_, S> {
    /// Follow the transition on `symbol`.
    ///
    /// Returns `false` and stays put if the current state has no such
    /// transition.
    pub fn go(&mut self, symbol: &S) -> bool {
        match self.dfa.transition(self.current_state, symbol) {
            Some(next) => {
                self.current_state = next;
                true
            }
            None => false,
        }
    }

    /// Feed every symbol of `input`, stopping at the first one without a
    /// transition.
    pub fn walk<I>(&mut self, input: I) -> Result<(), WalkError<S>>
    where
        I: IntoIterator,
        I::Item: Borrow<S>,
    {
        for (position, symbol) in input.into_iter().enumerate() {
            let symbol: &S = symbol.borrow();
            if !self.go(symbol) {
                return Err(WalkError::NoTransition {
                    state: self.current_state,
                    symbol: symbol.clone(),
                    position,
                });
            }
        }
        Ok(())
    }

    pub fn current_state(&self) -> State {
        self.current_state
    }

    pub fn is_in_final_state(&self) -> bool {
        self.dfa.is_final_state(self.current_state)
    }
}
