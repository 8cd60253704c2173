//! Non-deterministic Finite Automaton (NFA) with lambda transitions.
//!
//! This is a plain data structure: it records transitions but computes no
//! closures and performs no determinization.

use crate::fsm::{Automaton, Fsm};
use crate::state::{State, StateSet};
use crate::symbol::Symbol;
use indexmap::{IndexMap, IndexSet};

/// A Non-deterministic Finite Automaton.
#[derive(Debug, Clone)]
pub struct NFA<S> {
    fsm: Fsm,
    /// Transitions: source -> symbol -> set of destination states
    transitions: IndexMap<State, IndexMap<S, StateSet>>,
    /// Lambda transitions: source -> directly reachable states
    lambda_transitions: IndexMap<State, StateSet>,
    /// All symbols used, in order of first use
    alphabet: IndexSet<S>,
}

impl<S: Symbol> NFA<S> {
    /// Create a new NFA owning only its initial state.
    pub fn new() -> Self {
        Self {
            fsm: Fsm::new(),
            transitions: IndexMap::new(),
            lambda_transitions: IndexMap::new(),
            alphabet: IndexSet::new(),
        }
    }

    /// Add a transition from source to destination on the given symbol.
    /// Returns `false` if the transition already existed.
    pub fn add_transition(&mut self, source: State, symbol: S, destination: State) -> bool {
        if !self.alphabet.contains(&symbol) {
            self.alphabet.insert(symbol.clone());
        }
        self.transitions
            .entry(source)
            .or_default()
            .entry(symbol)
            .or_default()
            .insert(destination)
    }

    /// Add a lambda (epsilon) transition from source to destination.
    /// Returns `false` if the transition already existed.
    pub fn add_lambda_transition(&mut self, source: State, destination: State) -> bool {
        self.lambda_transitions
            .entry(source)
            .or_default()
            .insert(destination)
    }

    /// Get the destinations of `source` on `symbol`.
    pub fn transitions_on(&self, source: State, symbol: &S) -> Option<&StateSet> {
        self.transitions.get(&source)?.get(symbol)
    }

    /// Get the states directly reachable from `source` by one lambda transition.
    pub fn lambda_transitions_from(&self, source: State) -> Option<&StateSet> {
        self.lambda_transitions.get(&source)
    }

    /// Get all symbol transitions as an iterator.
    pub fn transitions(&self) -> impl Iterator<Item = (State, &S, State)> + '_ {
        self.transitions.iter().flat_map(|(&src, by_symbol)| {
            by_symbol
                .iter()
                .flat_map(move |(sym, dests)| dests.iter().map(move |dst| (src, sym, dst)))
        })
    }

    /// Get all lambda transitions as an iterator.
    pub fn lambda_transitions(&self) -> impl Iterator<Item = (State, State)> + '_ {
        self.lambda_transitions
            .iter()
            .flat_map(|(&src, dests)| dests.iter().map(move |dst| (src, dst)))
    }

    /// Count symbol transitions, one per (source, symbol, destination).
    pub fn num_transitions(&self) -> usize {
        self.transitions
            .values()
            .flat_map(IndexMap::values)
            .map(StateSet::len)
            .sum()
    }

    /// Get the alphabet (all symbols used, lambda excluded).
    pub fn alphabet(&self) -> &IndexSet<S> {
        &self.alphabet
    }
}

impl<S> Automaton for NFA<S> {
    fn core(&self) -> &Fsm {
        &self.fsm
    }

    fn core_mut(&mut self) -> &mut Fsm {
        &mut self.fsm
    }
}

impl<S: Symbol> Default for NFA<S> {
    fn default() -> Self {
        Self::new()
    }
}
