//! DFA minimization by backward partition refinement.
//!
//! The walk starts from the reachable final states and moves to predecessors
//! one batch at a time. Each batch is split into equivalence classes, every
//! class becomes one state of the result, and the predecessors of the class
//! form the next batch. Transitions are rebuilt at the end between mapped
//! states only, which drops every state that is unreachable or cannot reach a
//! final state.
//!
//! Classes are formed in two steps: members are grouped by a structural
//! fingerprint (see [`Refinement`]), then each group is split with the
//! caller's `compare` predicate by comparing one representative against the
//! rest of the group.

use crate::dfa::DFA;
use crate::fsm::Automaton;
use crate::state::{State, StateSet};
use crate::symbol::Symbol;
use indexmap::IndexMap;
use log::{debug, trace};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Equivalence predicate over states of the source DFA.
pub type CompareFn<'a> = Box<dyn FnMut(State, State) -> bool + 'a>;

/// Hook receiving each class of source states and the result state built for it.
pub type MergeFn<'a> = Box<dyn FnMut(&StateSet, State) + 'a>;

/// How batch members are grouped before `compare` is consulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Refinement {
    /// Group by language equivalence, computed with Hopcroft's algorithm over
    /// the live states. The starting partition is split by `compare`, so its
    /// distinctions carry over to predecessors. With the default `compare`
    /// the result is the minimal DFA.
    #[default]
    Language,
    /// Group by the set of symbols labelling transitions into each state.
    ///
    /// This reproduces the output of older releases. It is not sound: two
    /// accepting states reached on the same symbols are merged even when
    /// their outgoing behavior differs, which can change the accepted
    /// language.
    IncomingSymbols,
}

/// Which predecessors the reverse-transition index yields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Predecessors {
    /// Every source state with a transition into the state.
    #[default]
    All,
    /// Only the most recently added source per (destination, symbol) pair.
    ///
    /// Reproduces older releases. States that are never recorded as a
    /// predecessor are dropped from the result together with their
    /// transitions.
    LastRecorded,
}

/// Options for [`DFA::minimize_with`].
pub struct MinimizeOptions<'a> {
    compare: CompareFn<'a>,
    merge: MergeFn<'a>,
    refinement: Refinement,
    predecessors: Predecessors,
}

impl<'a> MinimizeOptions<'a> {
    pub fn new() -> Self {
        Self {
            compare: Box::new(|_, _| true),
            merge: Box::new(|_, _| {}),
            refinement: Refinement::default(),
            predecessors: Predecessors::default(),
        }
    }

    /// Set the equivalence predicate; states it reports as different are
    /// never merged.
    ///
    /// `compare` is only evaluated between one representative of a group and
    /// the remaining members, so it must be reflexive, symmetric and
    /// transitive. Otherwise the classes depend on iteration order.
    pub fn compare<F>(mut self, compare: F) -> Self
    where
        F: FnMut(State, State) -> bool + 'a,
    {
        self.compare = Box::new(compare);
        self
    }

    /// Set the hook called once per class, after the result state has been
    /// created and its finality set.
    pub fn merge<F>(mut self, merge: F) -> Self
    where
        F: FnMut(&StateSet, State) + 'a,
    {
        self.merge = Box::new(merge);
        self
    }

    pub fn refinement(mut self, refinement: Refinement) -> Self {
        self.refinement = refinement;
        self
    }

    pub fn predecessors(mut self, predecessors: Predecessors) -> Self {
        self.predecessors = predecessors;
        self
    }
}

impl Default for MinimizeOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MinimizeOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinimizeOptions")
            .field("refinement", &self.refinement)
            .field("predecessors", &self.predecessors)
            .finish_non_exhaustive()
    }
}

/// Reverse transitions between reachable states: destination -> symbol -> sources.
///
/// Sources are kept in the order their transitions were added. Determinism
/// means a state occurs at most once per (destination, symbol) pair.
#[derive(Debug)]
struct ReverseIndex<S> {
    incoming: IndexMap<State, IndexMap<S, Vec<State>>>,
}

impl<S: Symbol> ReverseIndex<S> {
    fn build(dfa: &DFA<S>, reachable: &StateSet) -> Self {
        let mut incoming: IndexMap<State, IndexMap<S, Vec<State>>> = IndexMap::new();
        for (src, symbol, dst) in dfa.transitions() {
            if !reachable.contains(src) || !reachable.contains(dst) {
                continue;
            }
            incoming
                .entry(dst)
                .or_default()
                .entry(symbol.clone())
                .or_default()
                .push(src);
        }
        Self { incoming }
    }

    fn entries(&self, state: State) -> impl Iterator<Item = (&S, &Vec<State>)> + '_ {
        self.incoming.get(&state).into_iter().flat_map(IndexMap::iter)
    }

    /// Symbols with a transition into `state`, sorted.
    fn incoming_symbols(&self, state: State) -> Vec<S> {
        let mut symbols: Vec<S> = self.entries(state).map(|(sym, _)| sym.clone()).collect();
        symbols.sort_unstable();
        symbols
    }

    /// Predecessors of `state`, possibly repeated once per symbol.
    fn predecessors(&self, state: State, mode: Predecessors) -> impl Iterator<Item = State> + '_ {
        let per_symbol = match mode {
            Predecessors::All => usize::MAX,
            Predecessors::LastRecorded => 1,
        };
        self.entries(state)
            .flat_map(move |(_, sources)| sources.iter().rev().take(per_symbol).copied())
    }

    /// Sources of the transitions entering `target` on `symbol`.
    fn sources_on(&self, target: State, symbol: &S) -> &[State] {
        self.incoming
            .get(&target)
            .and_then(|by_symbol| by_symbol.get(symbol))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Find all states from which some state of `targets` is reachable.
    fn co_reachable(&self, targets: &StateSet) -> StateSet {
        let mut result = targets.clone();
        let mut stack: Vec<State> = targets.iter().collect();
        while let Some(state) = stack.pop() {
            for (_, sources) in self.entries(state) {
                for &pred in sources {
                    if result.insert(pred) {
                        stack.push(pred);
                    }
                }
            }
        }
        result
    }
}

/// Grouping key applied to batch members before `compare`.
#[derive(Debug, PartialEq, Eq, Hash)]
enum Fingerprint<S> {
    Block(Option<usize>),
    Incoming(Vec<S>),
}

pub(crate) fn minimize<S: Symbol>(dfa: &DFA<S>, options: MinimizeOptions<'_>) -> DFA<S> {
    let MinimizeOptions {
        mut compare,
        mut merge,
        refinement,
        predecessors,
    } = options;
    let mut result = DFA::new();

    let reachable = dfa.reachable_states();
    let reverse = ReverseIndex::build(dfa, &reachable);
    let final_states = dfa.final_states().intersection(&reachable);
    debug!(
        "minimizing DFA: {} of {} states reachable, {} final, {:?}, {:?}",
        reachable.len(),
        dfa.num_states(),
        final_states.len(),
        refinement,
        predecessors,
    );

    if final_states.is_empty() {
        debug!("no reachable final state, result accepts nothing");
        return result;
    }

    let blocks = match refinement {
        Refinement::Language => {
            let live = reverse.co_reachable(&final_states);
            Some(language_blocks(dfa, &live, &reverse, &mut *compare))
        }
        Refinement::IncomingSymbols => None,
    };
    let fingerprint = |state: State| match &blocks {
        Some(blocks) => Fingerprint::Block(blocks.get(&state).copied()),
        None => Fingerprint::Incoming(reverse.incoming_symbols(state)),
    };

    let mut old_to_new: HashMap<State, State> = HashMap::new();
    // A state is marked when first enqueued, so it enters the queue once.
    let mut seen = final_states.clone();
    let mut queue = VecDeque::from([final_states]);

    while let Some(batch) = queue.pop_front() {
        let batch_len = batch.len();
        let classes = split_into_classes(batch, &fingerprint, &mut *compare);
        trace!("batch of {batch_len} states split into {} classes", classes.len());

        for class in classes {
            let new_state = if class.contains(dfa.initial_state()) {
                result.initial_state()
            } else {
                result.create_state()
            };
            if class.iter().any(|state| dfa.is_final_state(state)) {
                result.mark_final(new_state);
            }
            merge(&class, new_state);

            let mut inputs = StateSet::new();
            for state in class.iter() {
                old_to_new.insert(state, new_state);
                for pred in reverse.predecessors(state, predecessors) {
                    if seen.insert(pred) {
                        inputs.insert(pred);
                    }
                }
            }
            if !inputs.is_empty() {
                queue.push_back(inputs);
            }
        }
    }

    for (src, symbol, dst) in dfa.transitions() {
        if let (Some(&new_src), Some(&new_dst)) = (old_to_new.get(&src), old_to_new.get(&dst)) {
            result.add_transition(new_src, symbol.clone(), new_dst);
        }
    }

    debug!(
        "minimized DFA: {} states, {} transitions",
        result.num_states(),
        result.num_transitions()
    );
    result
}

fn split_into_classes<S, F>(
    batch: StateSet,
    fingerprint: F,
    compare: &mut dyn FnMut(State, State) -> bool,
) -> Vec<StateSet>
where
    S: Symbol,
    F: Fn(State) -> Fingerprint<S>,
{
    if batch.len() <= 1 {
        return vec![batch];
    }

    let mut groups: IndexMap<Fingerprint<S>, StateSet> = IndexMap::new();
    for state in batch.iter() {
        groups.entry(fingerprint(state)).or_default().insert(state);
    }

    let mut classes = Vec::new();
    for mut group in groups.into_values() {
        while let Some(representative) = group.any() {
            group.remove(representative);
            let mut class = StateSet::singleton(representative);
            class.extend(group.iter().filter(|&member| compare(representative, member)));
            group.remove_all(&class);
            classes.push(class);
        }
    }
    classes
}

/// Live states grouped into blocks, with O(1) lookup of a state's block and
/// O(1) moves between blocks.
struct Partition {
    blocks: Vec<Vec<State>>,
    /// Block of each state, indexed by id; `None` for states outside the partition
    block_of: Vec<Option<usize>>,
    /// Position of each state inside its block
    position: Vec<usize>,
}

impl Partition {
    fn new(blocks: Vec<Vec<State>>, num_states: usize) -> Self {
        let mut block_of = vec![None; num_states];
        let mut position = vec![0; num_states];
        for (idx, block) in blocks.iter().enumerate() {
            for (pos, state) in block.iter().enumerate() {
                block_of[slot(*state)] = Some(idx);
                position[slot(*state)] = pos;
            }
        }
        Self {
            blocks,
            block_of,
            position,
        }
    }

    fn block_of(&self, state: State) -> Option<usize> {
        self.block_of.get(slot(state)).copied().flatten()
    }

    fn size(&self, block: usize) -> usize {
        self.blocks[block].len()
    }

    /// Move `states`, all members of `block`, into a new block and return
    /// its index.
    fn split_off(&mut self, block: usize, states: &[State]) -> usize {
        let new_block = self.blocks.len();
        self.blocks.push(Vec::with_capacity(states.len()));
        for &state in states {
            let pos = self.position[slot(state)];
            let members = &mut self.blocks[block];
            members.swap_remove(pos);
            if let Some(&moved) = members.get(pos) {
                self.position[slot(moved)] = pos;
            }
            self.position[slot(state)] = self.blocks[new_block].len();
            self.block_of[slot(state)] = Some(new_block);
            self.blocks[new_block].push(state);
        }
        new_block
    }
}

fn slot(state: State) -> usize {
    state.id() as usize
}

/// Split `states` into `compare` classes by comparing one representative
/// against the remaining states.
fn compare_classes(
    mut states: Vec<State>,
    compare: &mut dyn FnMut(State, State) -> bool,
) -> Vec<Vec<State>> {
    let mut classes = Vec::new();
    while let Some(&representative) = states.first() {
        let (class, rest): (Vec<State>, Vec<State>) = states
            .into_iter()
            .partition(|&member| member == representative || compare(representative, member));
        classes.push(class);
        states = rest;
    }
    classes
}

/// Partition the live states into blocks with Hopcroft's algorithm and
/// return the block index of every live state.
///
/// The starting partition separates accepting from rejecting states and
/// splits both by `compare`, so two states share a block only if every word
/// leads them to states that agree on finality and on `compare`. Missing
/// transitions and transitions into dead states behave as edges into an
/// implicit sink that is never used as a splitter.
fn language_blocks<S: Symbol>(
    dfa: &DFA<S>,
    live: &StateSet,
    reverse: &ReverseIndex<S>,
    compare: &mut dyn FnMut(State, State) -> bool,
) -> HashMap<State, usize> {
    let (accepting, rejecting): (Vec<State>, Vec<State>) =
        live.iter().partition(|&state| dfa.is_final_state(state));
    let mut initial = compare_classes(accepting, compare);
    initial.extend(compare_classes(rejecting, compare));
    let mut partition = Partition::new(initial, dfa.num_states());

    let symbols: Vec<&S> = dfa.alphabet().iter().collect();
    let mut pending: Vec<Vec<bool>> = vec![vec![true; symbols.len()]; partition.blocks.len()];
    let mut worklist: VecDeque<(usize, usize)> = (0..partition.blocks.len())
        .flat_map(|block| (0..symbols.len()).map(move |sym| (block, sym)))
        .collect();

    while let Some((splitter, sym)) = worklist.pop_front() {
        pending[splitter][sym] = false;

        // Predecessors of the splitter on `sym`, grouped by their block
        let mut touched: IndexMap<usize, Vec<State>> = IndexMap::new();
        for &target in &partition.blocks[splitter] {
            for &pred in reverse.sources_on(target, symbols[sym]) {
                if let Some(block) = partition.block_of(pred) {
                    touched.entry(block).or_default().push(pred);
                }
            }
        }

        for (block, marked) in touched {
            if marked.len() == partition.size(block) {
                continue;
            }
            let new_block = partition.split_off(block, &marked);
            pending.push(vec![false; symbols.len()]);
            let new_is_smaller = partition.size(new_block) <= partition.size(block);
            for s in 0..symbols.len() {
                // Keep the larger half in place unless the block is already pending
                let add = if pending[block][s] || new_is_smaller {
                    new_block
                } else {
                    block
                };
                if !pending[add][s] {
                    pending[add][s] = true;
                    worklist.push_back((add, s));
                }
            }
        }
    }

    trace!("{} live states form {} blocks", live.len(), partition.blocks.len());
    partition
        .blocks
        .iter()
        .enumerate()
        .flat_map(|(idx, block)| block.iter().map(move |&state| (state, idx)))
        .collect()
}
