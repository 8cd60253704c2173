//! State types for automata.

use fixedbitset::FixedBitSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A state identifier represented as a u32.
pub type StateId = u32;

/// An automaton state.
///
/// States are identity tokens handed out by the automaton that created them;
/// two states are equal exactly when their ids are. A state is only meaningful
/// for the automaton it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct State(StateId);

impl State {
    pub(crate) fn new(id: StateId) -> Self {
        Self(id)
    }

    /// Get the id of this state.
    pub fn id(self) -> StateId {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state #{}", self.0)
    }
}

/// A set of states implemented using a growable bit set.
///
/// The element count is maintained on every insertion and removal, so `len`
/// does not scan the bits.
#[derive(Clone, Default)]
pub struct StateSet {
    bits: FixedBitSet,
    len: usize,
}

impl StateSet {
    /// Create a new empty state set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty state set with room for ids below `capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(capacity),
            len: 0,
        }
    }

    /// Create a state set containing a single state.
    pub fn singleton(state: State) -> Self {
        let mut set = Self::with_capacity(state.index() + 1);
        set.insert(state);
        set
    }

    /// Insert a state into the set. Returns `true` if it was not present.
    pub fn insert(&mut self, state: State) -> bool {
        let idx = state.index();
        if idx >= self.bits.len() {
            self.bits.grow(idx + 1);
        }
        let present = self.bits.put(idx);
        if !present {
            self.len += 1;
        }
        !present
    }

    /// Insert every state of `other`.
    pub fn insert_all(&mut self, other: &StateSet) {
        for state in other.iter() {
            self.insert(state);
        }
    }

    /// Remove a state from the set. Returns `true` if it was present.
    pub fn remove(&mut self, state: State) -> bool {
        if !self.contains(state) {
            return false;
        }
        self.bits.set(state.index(), false);
        self.len -= 1;
        true
    }

    /// Remove every state of `other`.
    pub fn remove_all(&mut self, other: &StateSet) {
        for state in other.iter() {
            self.remove(state);
        }
    }

    /// Check if the set contains a state.
    pub fn contains(&self, state: State) -> bool {
        self.contains_id(state.id())
    }

    /// Check if the set contains a state with the given id.
    pub fn contains_id(&self, id: StateId) -> bool {
        let idx = id as usize;
        idx < self.bits.len() && self.bits.contains(idx)
    }

    /// Look up the state with the given id.
    pub fn find_by_id(&self, id: StateId) -> Option<State> {
        self.contains_id(id).then(|| State::new(id))
    }

    /// Get an arbitrary member of the set.
    pub fn any(&self) -> Option<State> {
        if self.len == 0 {
            return None;
        }
        self.iter().next()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the number of states in the set.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Iterate over all states in the set.
    ///
    /// The order is ascending by id, but callers should treat it as unspecified.
    pub fn iter(&self) -> impl Iterator<Item = State> + '_ {
        self.bits.ones().map(|i| State::new(i as StateId))
    }

    /// Union this set with another, modifying self in place.
    pub fn union_with(&mut self, other: &StateSet) {
        if other.bits.len() > self.bits.len() {
            self.bits.grow(other.bits.len());
        }
        self.bits.union_with(&other.bits);
        self.len = self.bits.count_ones(..);
    }

    /// Check if this set intersects with another.
    pub fn intersects(&self, other: &StateSet) -> bool {
        !self.bits.is_disjoint(&other.bits)
    }

    /// Create a new set that is the intersection of this set and another.
    pub fn intersection(&self, other: &StateSet) -> StateSet {
        let mut bits = self.bits.clone();
        bits.intersect_with(&other.bits);
        let len = bits.count_ones(..);
        StateSet { bits, len }
    }

    /// Create a new set with states not in other.
    pub fn difference(&self, other: &StateSet) -> StateSet {
        let mut bits = self.bits.clone();
        bits.difference_with(&other.bits);
        let len = bits.count_ones(..);
        StateSet { bits, len }
    }

    /// Remove all states from the set.
    pub fn clear(&mut self) {
        self.bits.clear();
        self.len = 0;
    }

    /// Collect the members into a vector, sorted by id.
    pub fn to_vec(&self) -> Vec<State> {
        self.iter().collect()
    }
}

// Equality and hashing go by members, not by bit capacity.
impl PartialEq for StateSet {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for StateSet {}

impl Hash for StateSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for member in self.iter() {
            member.hash(state);
        }
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(State::id)).finish()
    }
}

impl FromIterator<State> for StateSet {
    fn from_iter<I: IntoIterator<Item = State>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<State> for StateSet {
    fn extend<I: IntoIterator<Item = State>>(&mut self, iter: I) {
        for state in iter {
            self.insert(state);
        }
    }
}

impl<'a> IntoIterator for &'a StateSet {
    type Item = State;
    type IntoIter = Box<dyn Iterator<Item = State> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
