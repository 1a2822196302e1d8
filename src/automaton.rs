use std::fmt;

use itertools::Itertools;

use crate::error::AutomatonError;
use crate::math::{Bijection, OrderedMap, OrderedSet};

/// States are identified by opaque, caller-chosen names.
pub type StateId = String;
/// Input symbols are opaque, non-empty tokens.
pub type Symbol = String;

/// The reserved pseudo-symbol for transitions that consume no input. It is never a member of
/// the alphabet.
pub const EPSILON: &str = "";

/// The transition relation: each `(state, symbol)` pair maps to the set of possible successor
/// states. A key whose symbol is [`EPSILON`] describes epsilon transitions out of the state.
pub type TransitionMap = OrderedMap<(StateId, Symbol), OrderedSet<StateId>>;

/// The determinism classification of an automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Determinism {
    /// Every `(state, symbol)` pair has exactly one successor and no epsilon transition exists.
    Deterministic,
    /// Some pair is missing, has multiple successors, or an epsilon transition is present.
    NonDeterministic,
}

/// A finite automaton: states, alphabet, initial state, final states and a transition relation.
///
/// Values are immutable once constructed and construction never produces a partially valid
/// instance. Whether the automaton is deterministic is computed at construction time and
/// queryable via [`Automaton::classify`]; deterministic and nondeterministic automata share this
/// one representation. All conversion algorithms return fresh automata and leave their input
/// untouched.
///
/// The derived equality is exact, i.e. it distinguishes automata that differ only in state
/// names. Comparison up to a consistent renaming of states is provided by
/// [`Automaton::isomorphic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    states: OrderedSet<StateId>,
    alphabet: OrderedSet<Symbol>,
    initial: StateId,
    finals: OrderedSet<StateId>,
    transitions: TransitionMap,
    deterministic: bool,
}

impl Automaton {
    /// Constructs an automaton from its components, where transitions are given as
    /// `(source, symbol, target)` triples. Multiple triples with the same source and symbol
    /// accumulate into one successor set; an empty symbol denotes an epsilon transition.
    ///
    /// Fails with [`AutomatonError::InvalidAutomaton`] if the initial state or a final state is
    /// not a member of the state set, if a transition uses an unknown source, target or symbol,
    /// if the state set is empty, or if the alphabet contains the reserved empty symbol.
    pub fn new<Q, A, F, T, X, Y, Z>(
        states: Q,
        alphabet: A,
        initial: impl Into<StateId>,
        finals: F,
        transitions: T,
    ) -> Result<Self, AutomatonError>
    where
        Q: IntoIterator,
        Q::Item: Into<StateId>,
        A: IntoIterator,
        A::Item: Into<Symbol>,
        F: IntoIterator,
        F::Item: Into<StateId>,
        T: IntoIterator<Item = (X, Y, Z)>,
        X: Into<StateId>,
        Y: Into<Symbol>,
        Z: Into<StateId>,
    {
        let mut map = TransitionMap::new();
        for (source, symbol, target) in transitions {
            map.entry((source.into(), symbol.into()))
                .or_default()
                .insert(target.into());
        }
        Self::from_components(
            states.into_iter().map(Into::into).collect(),
            alphabet.into_iter().map(Into::into).collect(),
            initial.into(),
            finals.into_iter().map(Into::into).collect(),
            map,
        )
    }

    /// Constructs an automaton from already collected components. This is the form the
    /// conversion algorithms and the storage decoder use internally.
    pub(crate) fn from_components(
        states: OrderedSet<StateId>,
        alphabet: OrderedSet<Symbol>,
        initial: StateId,
        finals: OrderedSet<StateId>,
        transitions: TransitionMap,
    ) -> Result<Self, AutomatonError> {
        if let Some(violation) =
            Self::validity_error(&states, &alphabet, &initial, &finals, &transitions)
        {
            return Err(AutomatonError::InvalidAutomaton(violation));
        }
        let deterministic = Self::classify_components(&states, &alphabet, &transitions)
            == Determinism::Deterministic;
        Ok(Self {
            states,
            alphabet,
            initial,
            finals,
            transitions,
            deterministic,
        })
    }

    /// Checks all validity invariants without constructing anything. Returns `false` exactly
    /// when [`Automaton::new`] would reject the same components.
    pub fn validate(
        states: &OrderedSet<StateId>,
        alphabet: &OrderedSet<Symbol>,
        initial: &str,
        finals: &OrderedSet<StateId>,
        transitions: &TransitionMap,
    ) -> bool {
        Self::validity_error(states, alphabet, initial, finals, transitions).is_none()
    }

    fn validity_error(
        states: &OrderedSet<StateId>,
        alphabet: &OrderedSet<Symbol>,
        initial: &str,
        finals: &OrderedSet<StateId>,
        transitions: &TransitionMap,
    ) -> Option<String> {
        if states.is_empty() {
            return Some("the state set is empty".to_string());
        }
        if alphabet.contains(EPSILON) {
            return Some("the alphabet contains the reserved empty symbol".to_string());
        }
        if !states.contains(initial) {
            return Some(format!("initial state `{initial}` is not in the state set"));
        }
        if let Some(q) = finals.iter().find(|q| !states.contains(*q)) {
            return Some(format!("final state `{q}` is not in the state set"));
        }
        for ((source, symbol), targets) in transitions {
            if !states.contains(source) {
                return Some(format!("transition source `{source}` is not in the state set"));
            }
            if symbol != EPSILON && !alphabet.contains(symbol) {
                return Some(format!("transition symbol `{symbol}` is not in the alphabet"));
            }
            if let Some(target) = targets.iter().find(|q| !states.contains(*q)) {
                return Some(format!("transition target `{target}` is not in the state set"));
            }
        }
        None
    }

    /// Returns the determinism classification of this automaton.
    ///
    /// An automaton is deterministic iff for every state and every alphabet symbol there is
    /// exactly one successor. Any epsilon transition makes the automaton nondeterministic as
    /// well, even when every `(state, symbol)` pair is otherwise fully defined.
    pub fn classify(&self) -> Determinism {
        if self.deterministic {
            Determinism::Deterministic
        } else {
            Determinism::NonDeterministic
        }
    }

    fn classify_components(
        states: &OrderedSet<StateId>,
        alphabet: &OrderedSet<Symbol>,
        transitions: &TransitionMap,
    ) -> Determinism {
        if transitions.keys().any(|(_, symbol)| symbol == EPSILON) {
            return Determinism::NonDeterministic;
        }
        for state in states {
            for symbol in alphabet {
                match transitions.get(&(state.clone(), symbol.clone())) {
                    Some(targets) if targets.len() == 1 => {}
                    _ => return Determinism::NonDeterministic,
                }
            }
        }
        Determinism::Deterministic
    }

    /// Whether this automaton is a DFA.
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// The set of states.
    pub fn states(&self) -> &OrderedSet<StateId> {
        &self.states
    }

    /// The number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// The input alphabet, which never contains [`EPSILON`].
    pub fn alphabet(&self) -> &OrderedSet<Symbol> {
        &self.alphabet
    }

    /// The initial state.
    pub fn initial(&self) -> &StateId {
        &self.initial
    }

    /// The set of final (accepting) states, possibly empty.
    pub fn finals(&self) -> &OrderedSet<StateId> {
        &self.finals
    }

    /// The full transition relation.
    pub fn transitions(&self) -> &TransitionMap {
        &self.transitions
    }

    /// The successor set of `state` under `symbol`, if any transition is defined for the pair.
    /// Pass [`EPSILON`] as the symbol to obtain the epsilon successors.
    pub fn destinations(&self, state: &str, symbol: &str) -> Option<&OrderedSet<StateId>> {
        self.transitions.get(&(state.to_owned(), symbol.to_owned()))
    }

    /// The unique successor of `state` under `symbol`. For deterministic automata and alphabet
    /// symbols this is always defined; for nondeterministic automata it is the least successor,
    /// if one exists.
    pub fn successor(&self, state: &str, symbol: &str) -> Option<&StateId> {
        self.destinations(state, symbol).and_then(|targets| targets.first())
    }

    /// A one line human readable summary, e.g. `An NFA with 3 states, 2 inputs. Starts at q0.`
    pub fn describe(&self) -> String {
        let kind = if self.deterministic { "A DFA" } else { "An NFA" };
        format!(
            "{kind} with {} states, {} inputs. Starts at {}.",
            self.states.len(),
            self.alphabet.len(),
            self.initial
        )
    }

    /// Checks whether `self` and `other` are equal up to a consistent renaming of states, i.e.
    /// whether a bijection between the two state sets exists that maps initial to initial,
    /// finals onto finals and transitions onto transitions. Alphabets must match exactly, only
    /// states may be renamed.
    ///
    /// The search backtracks over candidate pairings, pruned by finals membership and the
    /// per-symbol successor counts of each state, which keeps it cheap for the automaton sizes
    /// this crate deals in.
    pub fn isomorphic(&self, other: &Self) -> bool {
        if self.states.len() != other.states.len()
            || self.alphabet != other.alphabet
            || self.finals.len() != other.finals.len()
            || self.transitions.len() != other.transitions.len()
        {
            return false;
        }
        if self.signature(&self.initial) != other.signature(&other.initial) {
            return false;
        }
        let mut pairing = Bijection::new();
        pairing.insert(self.initial.clone(), other.initial.clone());
        let unmapped: Vec<&StateId> =
            self.states.iter().filter(|q| **q != self.initial).collect();
        self.extend_pairing(other, &unmapped, 0, &mut pairing)
    }

    /// The renaming-invariant footprint of a state: finals membership plus the successor count
    /// for each symbol, epsilon included. States with different signatures can never be paired.
    fn signature(&self, state: &StateId) -> (bool, Vec<(Symbol, usize)>) {
        let degrees = self
            .transitions
            .iter()
            .filter(|((source, _), _)| source == state)
            .map(|((_, symbol), targets)| (symbol.clone(), targets.len()))
            .collect();
        (self.finals.contains(state), degrees)
    }

    fn extend_pairing(
        &self,
        other: &Self,
        unmapped: &[&StateId],
        depth: usize,
        pairing: &mut Bijection<StateId, StateId>,
    ) -> bool {
        let Some(state) = unmapped.get(depth) else {
            return self.pairing_respects_transitions(other, pairing);
        };
        for candidate in other.states.iter() {
            if pairing.contains_right(candidate)
                || self.signature(state) != other.signature(candidate)
            {
                continue;
            }
            pairing.insert((*state).clone(), candidate.clone());
            if self.extend_pairing(other, unmapped, depth + 1, pairing) {
                return true;
            }
            pairing.remove_by_left(*state);
        }
        false
    }

    /// Verifies that a complete pairing maps every transition of `self` onto the corresponding
    /// transition of `other`. Since both relations have the same number of entries, this
    /// equality in one direction suffices.
    fn pairing_respects_transitions(
        &self,
        other: &Self,
        pairing: &Bijection<StateId, StateId>,
    ) -> bool {
        self.transitions.iter().all(|((source, symbol), targets)| {
            let Some(image_source) = pairing.get_by_left(source) else {
                return false;
            };
            let image_targets: OrderedSet<StateId> = targets
                .iter()
                .filter_map(|q| pairing.get_by_left(q).cloned())
                .collect();
            image_targets.len() == targets.len()
                && other
                    .destinations(image_source, symbol)
                    .is_some_and(|expected| *expected == image_targets)
        })
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FA({{{}}}, {{{}}}, {}, {{{}}}, {} transitions)",
            self.states.iter().join(", "),
            self.alphabet.iter().join(", "),
            self.initial,
            self.finals.iter().join(", "),
            self.transitions.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::fa;

    fn build(
        states: &str,
        alphabet: &str,
        initial: &str,
        finals: &str,
        transitions: &[(&str, &str, &str)],
    ) -> Result<Automaton, AutomatonError> {
        Automaton::new(
            states.split_whitespace(),
            alphabet.split_whitespace(),
            initial,
            finals.split_whitespace(),
            transitions.iter().copied(),
        )
    }

    #[test_log::test]
    fn construction_rejects_invariant_violations() {
        for (states, alphabet, initial, finals, transitions) in [
            // initial not a state
            ("q0 q1", "a", "q2", "q1", vec![]),
            // final not a state
            ("q0 q1", "a", "q0", "q2", vec![]),
            // unknown transition source
            ("q0 q1", "a", "q0", "q1", vec![("q2", "a", "q0")]),
            // unknown transition symbol
            ("q0 q1", "a", "q0", "q1", vec![("q0", "b", "q1")]),
            // unknown transition target
            ("q0 q1", "a", "q0", "q1", vec![("q0", "a", "q2")]),
            // empty state set
            ("", "a", "q0", "", vec![]),
        ] {
            let result = build(states, alphabet, initial, finals, &transitions);
            assert!(
                matches!(result, Err(AutomatonError::InvalidAutomaton(_))),
                "expected rejection of {states:?} {initial:?} {finals:?} {transitions:?}"
            );
        }
    }

    #[test_log::test]
    fn construction_rejects_epsilon_in_alphabet() {
        let result = Automaton::new(["q0"], ["a", ""], "q0", ["q0"], [("q0", "a", "q0")]);
        assert!(matches!(result, Err(AutomatonError::InvalidAutomaton(_))));
    }

    #[test_log::test]
    fn epsilon_transitions_are_always_legal_to_declare() {
        let nfa = fa("q0 q1", "a", "q0", "q1", &[("q0", "", "q1")]);
        assert_eq!(nfa.classify(), Determinism::NonDeterministic);
    }

    #[test_log::test]
    fn total_single_valued_automaton_is_deterministic() {
        let dfa = fa(
            "q0 q1",
            "a b",
            "q0",
            "q1",
            &[
                ("q0", "a", "q1"),
                ("q0", "b", "q0"),
                ("q1", "a", "q0"),
                ("q1", "b", "q1"),
            ],
        );
        assert_eq!(dfa.classify(), Determinism::Deterministic);
        assert!(dfa.is_deterministic());
    }

    #[test_log::test]
    fn missing_pair_or_multiple_successors_is_nondeterministic() {
        let missing = fa("q0 q1", "a b", "q0", "q1", &[("q0", "a", "q1")]);
        assert_eq!(missing.classify(), Determinism::NonDeterministic);

        let branching = fa(
            "q0 q1",
            "a",
            "q0",
            "q1",
            &[("q0", "a", "q0"), ("q0", "a", "q1"), ("q1", "a", "q1")],
        );
        assert_eq!(branching.classify(), Determinism::NonDeterministic);
    }

    #[test_log::test]
    fn fully_defined_automaton_with_epsilon_is_still_nondeterministic() {
        // every (state, symbol) pair has exactly one successor, but the extra epsilon
        // transition disqualifies the automaton from being a DFA
        let fa = fa(
            "q0 q1",
            "a",
            "q0",
            "q1",
            &[("q0", "a", "q1"), ("q1", "a", "q0"), ("q0", "", "q1")],
        );
        assert_eq!(fa.classify(), Determinism::NonDeterministic);
    }

    #[test_log::test]
    fn describe_summarizes_kind_and_shape() {
        let nfa = fa("q0 q1 q2", "a b", "q0", "q2", &[("q0", "a", "q1")]);
        assert_eq!(nfa.describe(), "An NFA with 3 states, 2 inputs. Starts at q0.");
    }

    #[test_log::test]
    fn isomorphic_accepts_consistent_renaming() {
        let left = fa(
            "q0 q1",
            "a b",
            "q0",
            "q1",
            &[
                ("q0", "a", "q1"),
                ("q0", "b", "q0"),
                ("q1", "a", "q0"),
                ("q1", "b", "q1"),
            ],
        );
        let right = fa(
            "s1 s0",
            "a b",
            "s1",
            "s0",
            &[
                ("s1", "a", "s0"),
                ("s1", "b", "s1"),
                ("s0", "a", "s1"),
                ("s0", "b", "s0"),
            ],
        );
        assert!(left.isomorphic(&right));
        assert!(right.isomorphic(&left));
        assert_ne!(left, right);
    }

    #[test_log::test]
    fn isomorphic_rejects_structural_differences() {
        let left = fa("q0 q1", "a", "q0", "q1", &[("q0", "a", "q1"), ("q1", "a", "q1")]);
        // same shape but the final state is the initial one
        let right = fa("q0 q1", "a", "q0", "q0", &[("q0", "a", "q1"), ("q1", "a", "q1")]);
        assert!(!left.isomorphic(&right));

        // successor structure differs
        let looping = fa("q0 q1", "a", "q0", "q1", &[("q0", "a", "q1"), ("q1", "a", "q0")]);
        assert!(!left.isomorphic(&looping));
    }

    #[test_log::test]
    fn isomorphic_handles_nondeterministic_relations() {
        let left = fa(
            "q0 q1 q2",
            "a",
            "q0",
            "q2",
            &[("q0", "a", "q1"), ("q0", "a", "q2"), ("q1", "", "q2")],
        );
        let right = fa(
            "p2 p1 p0",
            "a",
            "p2",
            "p0",
            &[("p2", "a", "p1"), ("p2", "a", "p0"), ("p1", "", "p0")],
        );
        assert!(left.isomorphic(&right));
    }
}
