//! The automaton core shared by [`NFA`](crate::NFA) and [`DFA`](crate::DFA).

use crate::state::{State, StateId, StateSet};

/// State bookkeeping common to every automaton: id allocation, the initial
/// state and the set of final states.
///
/// The initial state is created together with the core and never changes.
#[derive(Debug, Clone)]
pub struct Fsm {
    /// Next id to hand out
    next_id: StateId,
    /// Initial state, always a member of `states`
    initial_state: State,
    /// Every state ever created on this core
    states: StateSet,
    /// Final (accepting) states
    final_states: StateSet,
}

impl Fsm {
    /// Create a core owning only its initial state.
    pub fn new() -> Self {
        let mut states = StateSet::with_capacity(16);
        let initial_state = State::new(0);
        states.insert(initial_state);
        Self {
            next_id: 1,
            initial_state,
            states,
            final_states: StateSet::with_capacity(16),
        }
    }

    /// Add a new state and return it. Ids are strictly increasing.
    pub fn create_state(&mut self) -> State {
        let state = State::new(self.next_id);
        self.next_id += 1;
        self.states.insert(state);
        state
    }

    pub fn initial_state(&self) -> State {
        self.initial_state
    }

    pub fn states(&self) -> &StateSet {
        &self.states
    }

    pub fn final_states(&self) -> &StateSet {
        &self.final_states
    }

    /// Set or clear the final flag of a state.
    pub fn mark_state_as_final(&mut self, state: State, is_final: bool) {
        if is_final {
            self.final_states.insert(state);
        } else {
            self.final_states.remove(state);
        }
    }

    pub fn is_final_state(&self, state: State) -> bool {
        self.final_states.contains(state)
    }
}

impl Default for Fsm {
    fn default() -> Self {
        Self::new()
    }
}

/// Behavior shared by NFAs and DFAs through their embedded [`Fsm`].
pub trait Automaton {
    fn core(&self) -> &Fsm;

    fn core_mut(&mut self) -> &mut Fsm;

    /// Add a new state and return it.
    fn create_state(&mut self) -> State {
        self.core_mut().create_state()
    }

    /// Get the initial state.
    fn initial_state(&self) -> State {
        self.core().initial_state()
    }

    /// Get every state created on this automaton, including the initial one.
    fn states(&self) -> &StateSet {
        self.core().states()
    }

    /// Get the final states.
    fn final_states(&self) -> &StateSet {
        self.core().final_states()
    }

    /// Get the number of states.
    fn num_states(&self) -> usize {
        self.core().states().len()
    }

    /// Set or clear the final flag of a state.
    fn mark_state_as_final(&mut self, state: State, is_final: bool) {
        self.core_mut().mark_state_as_final(state, is_final);
    }

    /// Mark a state as final.
    fn mark_final(&mut self, state: State) {
        self.mark_state_as_final(state, true);
    }

    /// Check whether a state is final.
    fn is_final_state(&self, state: State) -> bool {
        self.core().is_final_state(state)
    }
}
