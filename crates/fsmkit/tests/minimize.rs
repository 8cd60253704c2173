use fsmkit::{Automaton, DFA, MinimizeOptions, State, create_dfa};
use itertools::Itertools;
use quickcheck::quickcheck;
use std::collections::{HashMap, VecDeque};

const ALPHABET: [u8; 3] = [0, 1, 2];
const MAX_WORD_LEN: usize = 6;

/// Build a DFA with 1..=6 states from arbitrary edge and final-state lists.
fn build_dfa(num_states: u8, edges: &[(u8, u8, u8)], finals: &[u8]) -> DFA<u8> {
    let n = usize::from(num_states % 6) + 1;
    let mut dfa = create_dfa();
    let mut states = vec![dfa.initial_state()];
    for _ in 1..n {
        states.push(dfa.create_state());
    }
    for &(src, sym, dst) in edges {
        let symbol = ALPHABET[usize::from(sym) % ALPHABET.len()];
        dfa.add_transition(
            states[usize::from(src) % n],
            symbol,
            states[usize::from(dst) % n],
        );
    }
    for &state in finals {
        dfa.mark_final(states[usize::from(state) % n]);
    }
    dfa
}

/// Every word over `ALPHABET` of length at most `MAX_WORD_LEN`.
fn words() -> impl Iterator<Item = Vec<u8>> {
    std::iter::once(Vec::new()).chain((1..=MAX_WORD_LEN).flat_map(|len| {
        std::iter::repeat_n(ALPHABET.iter().copied(), len).multi_cartesian_product()
    }))
}

fn same_language(a: &DFA<u8>, b: &DFA<u8>) -> bool {
    words().all(|word| a.accepts(&word) == b.accepts(&word))
}

/// Renumber states in breadth-first order from the initial state, visiting
/// symbols in sorted order, and list edges and final flags under that
/// numbering. Isomorphic DFAs give equal shapes.
fn shape<S: fsmkit::Symbol>(dfa: &DFA<S>) -> (Vec<(usize, S, usize)>, Vec<bool>) {
    let mut numbering: HashMap<State, usize> = HashMap::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::from([dfa.initial_state()]);
    numbering.insert(dfa.initial_state(), 0);

    while let Some(state) = queue.pop_front() {
        order.push(state);
        let outgoing: Vec<_> = dfa
            .transitions_from(state)
            .sorted_by(|a, b| a.0.cmp(b.0))
            .collect();
        for (_, next) in outgoing {
            if !numbering.contains_key(&next) {
                numbering.insert(next, numbering.len());
                queue.push_back(next);
            }
        }
    }

    let mut edges: Vec<(usize, S, usize)> = dfa
        .transitions()
        .filter_map(|(src, sym, dst)| {
            Some((*numbering.get(&src)?, sym.clone(), *numbering.get(&dst)?))
        })
        .collect();
    edges.sort();
    let finals = order.iter().map(|&state| dfa.is_final_state(state)).collect();
    (edges, finals)
}

#[test]
fn test_scenario_single_symbol_loop() {
    let mut dfa = create_dfa();
    let q0 = dfa.initial_state();
    let q1 = dfa.create_state();
    dfa.mark_final(q1);
    dfa.add_transition(q0, 'a', q1);
    dfa.add_transition(q1, 'a', q1);

    let minimized = dfa.minimize();
    assert_eq!(minimized.num_states(), 2);

    for (word, accepted) in [("a", true), ("aa", true), ("", false), ("b", false)] {
        let mut walker = minimized.walker();
        for symbol in word.chars() {
            walker.go(&symbol);
        }
        assert_eq!(walker.is_in_final_state(), accepted, "{word:?}");
    }
}

#[test]
fn test_scenario_isomorphic_inputs() {
    // Same shape, but the second DFA's ids are shifted by unused states
    let mut first = create_dfa();
    let a0 = first.initial_state();
    let a1 = first.create_state();
    let a2 = first.create_state();
    let a3 = first.create_state();
    first.add_transition(a0, 'x', a1);
    first.add_transition(a0, 'y', a2);
    first.add_transition(a1, 'z', a3);
    first.add_transition(a2, 'z', a3);
    first.add_transition(a3, 'x', a0);
    first.mark_final(a3);

    let mut second = create_dfa();
    let b0 = second.initial_state();
    for _ in 0..7 {
        second.create_state();
    }
    let b3 = second.create_state();
    let b2 = second.create_state();
    let b1 = second.create_state();
    second.mark_final(b3);
    second.add_transition(b3, 'x', b0);
    second.add_transition(b2, 'z', b3);
    second.add_transition(b1, 'z', b3);
    second.add_transition(b0, 'y', b2);
    second.add_transition(b0, 'x', b1);

    let min_first = first.minimize();
    let min_second = second.minimize();
    assert_eq!(min_first.num_states(), min_second.num_states());
    assert_eq!(min_first.num_transitions(), min_second.num_transitions());
    assert_eq!(shape(&min_first), shape(&min_second));
}

#[test]
fn test_token_tags_survive_minimization() {
    // 0 -i-> 1, then 'f' and 'n' reach keyword states, 't' an identifier state
    let mut dfa = create_dfa();
    let s0 = dfa.initial_state();
    let s1 = dfa.create_state();
    let kw_if = dfa.create_state();
    let kw_in = dfa.create_state();
    let ident = dfa.create_state();
    dfa.add_transition(s0, 'i', s1);
    dfa.add_transition(s1, 'f', kw_if);
    dfa.add_transition(s1, 'n', kw_in);
    dfa.add_transition(s1, 't', ident);
    for state in [kw_if, kw_in, ident] {
        dfa.mark_final(state);
    }

    let tags: HashMap<State, &str> =
        HashMap::from([(kw_if, "keyword"), (kw_in, "keyword"), (ident, "identifier")]);
    let mut new_tags: HashMap<State, &str> = HashMap::new();

    let plain = dfa.minimize();
    assert_eq!(plain.num_states(), 3);

    let tagged = dfa.minimize_with(
        MinimizeOptions::new()
            .compare(|a, b| tags.get(&a) == tags.get(&b))
            .merge(|old, new| {
                if let Some(tag) = old.iter().find_map(|state| tags.get(&state)) {
                    new_tags.insert(new, *tag);
                }
            }),
    );
    assert_eq!(tagged.num_states(), 4);

    let tag_after = |word: &str| {
        let mut walker = tagged.walker();
        walker.walk(word.chars()).ok()?;
        new_tags.get(&walker.current_state()).copied()
    };
    assert_eq!(tag_after("if"), Some("keyword"));
    assert_eq!(tag_after("in"), Some("keyword"));
    assert_eq!(tag_after("it"), Some("identifier"));
    assert_eq!(tag_after("i"), None);
    assert_eq!(tag_after("ix"), None);
}

#[test]
fn test_tags_propagate_through_shared_predecessors() {
    // p and r are untagged and share the 'b' target, but their 'a' targets
    // carry different tags, so they must not be merged
    let mut dfa = create_dfa();
    let q0 = dfa.initial_state();
    let p = dfa.create_state();
    let r = dfa.create_state();
    let f1 = dfa.create_state();
    let f2 = dfa.create_state();
    let g = dfa.create_state();
    for state in [f1, f2, g] {
        dfa.mark_final(state);
    }
    dfa.add_transition(q0, 'c', p);
    dfa.add_transition(q0, 'd', r);
    dfa.add_transition(p, 'a', f1);
    dfa.add_transition(r, 'a', f2);
    dfa.add_transition(p, 'b', g);
    dfa.add_transition(r, 'b', g);

    let tags: HashMap<State, &str> = HashMap::from([(f1, "A"), (g, "A"), (f2, "B")]);
    let mut new_tags: HashMap<State, &str> = HashMap::new();
    let tagged = dfa.minimize_with(
        MinimizeOptions::new()
            .compare(|a, b| tags.get(&a) == tags.get(&b))
            .merge(|old, new| {
                if let Some(tag) = old.iter().find_map(|state| tags.get(&state)) {
                    new_tags.insert(new, *tag);
                }
            }),
    );
    assert_eq!(tagged.num_states(), 5);

    let tag_after = |word: &str| {
        let mut walker = tagged.walker();
        walker.walk(word.chars()).ok()?;
        new_tags.get(&walker.current_state()).copied()
    };
    assert_eq!(tag_after("ca"), Some("A"));
    assert_eq!(tag_after("cb"), Some("A"));
    assert_eq!(tag_after("da"), Some("B"));
    assert_eq!(tag_after("db"), Some("A"));
    assert_eq!(tag_after("c"), None);
}

quickcheck! {
    fn prop_minimize_preserves_language(num_states: u8, edges: Vec<(u8, u8, u8)>, finals: Vec<u8>) -> bool {
        let dfa = build_dfa(num_states, &edges, &finals);
        same_language(&dfa, &dfa.minimize())
    }

    fn prop_minimize_never_grows(num_states: u8, edges: Vec<(u8, u8, u8)>, finals: Vec<u8>) -> bool {
        let dfa = build_dfa(num_states, &edges, &finals);
        let minimized = dfa.minimize();
        minimized.num_states() <= dfa.reachable_states().len()
            && minimized.num_transitions() <= dfa.num_transitions()
    }

    fn prop_minimize_is_idempotent(num_states: u8, edges: Vec<(u8, u8, u8)>, finals: Vec<u8>) -> bool {
        let once = build_dfa(num_states, &edges, &finals).minimize();
        let twice = once.minimize();
        once.num_states() == twice.num_states()
            && once.num_transitions() == twice.num_transitions()
            && shape(&once) == shape(&twice)
            && same_language(&once, &twice)
    }

    fn prop_empty_language_gives_bare_automaton(num_states: u8, edges: Vec<(u8, u8, u8)>, finals: Vec<u8>) -> bool {
        let dfa = build_dfa(num_states, &edges, &finals);
        let minimized = dfa.minimize();
        if !dfa.is_empty() {
            return !minimized.is_empty();
        }
        minimized.num_states() == 1
            && minimized.num_transitions() == 0
            && minimized.final_states().is_empty()
    }

    fn prop_minimize_keeps_compare_tags(num_states: u8, edges: Vec<(u8, u8, u8)>, finals: Vec<u8>, tags: Vec<u8>) -> bool {
        let dfa = build_dfa(num_states, &edges, &finals);
        let tag_of = |state: State| tags.get(state.id() as usize).map_or(0, |tag| tag % 3);
        let mut new_tags: HashMap<State, u8> = HashMap::new();
        let minimized = dfa.minimize_with(
            MinimizeOptions::new()
                .compare(|a, b| tag_of(a) == tag_of(b))
                .merge(|old, new| {
                    if let Some(state) = old.any() {
                        new_tags.insert(new, tag_of(state));
                    }
                }),
        );

        words().all(|word| {
            let mut source = dfa.walker();
            if source.walk(&word).is_err() || !source.is_in_final_state() {
                return true;
            }
            let mut target = minimized.walker();
            target.walk(&word).is_ok()
                && new_tags.get(&target.current_state()) == Some(&tag_of(source.current_state()))
        })
    }

    fn prop_walker_rejection_keeps_state(num_states: u8, edges: Vec<(u8, u8, u8)>, word: Vec<u8>) -> bool {
        let dfa = build_dfa(num_states, &edges, &[]);
        let mut walker = dfa.walker();
        word.iter().all(|&raw| {
            let symbol = ALPHABET[usize::from(raw) % ALPHABET.len()];
            let before = walker.current_state();
            let moved = walker.go(&symbol);
            moved || walker.current_state() == before
        })
    }
}
