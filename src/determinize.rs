use std::collections::VecDeque;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::automaton::{Automaton, StateId, TransitionMap};
use crate::error::AutomatonError;
use crate::math::{OrderedMap, OrderedSet};

/// Records, for each subset of original states discovered by the subset construction, the name
/// it was assigned in the produced DFA. Purely presentational; correctness of the conversion
/// does not depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    assignments: OrderedMap<OrderedSet<StateId>, StateId>,
}

impl ConversionReport {
    /// The name the given subset of original states received, if it was discovered at all.
    pub fn name_of(&self, subset: &OrderedSet<StateId>) -> Option<&StateId> {
        self.assignments.get(subset)
    }

    /// All discovered subsets with their assigned names. The empty subset, if present, is the
    /// trap state of the produced DFA.
    pub fn assignments(&self) -> &OrderedMap<OrderedSet<StateId>, StateId> {
        &self.assignments
    }

    /// Renders the assignments as `{q0, q1} -> q'0` lines for display purposes.
    pub fn describe(&self) -> String {
        self.assignments
            .iter()
            .map(|(subset, name)| format!("{{{}}} -> {}", subset.iter().join(", "), name))
            .join("\n")
    }
}

impl Automaton {
    /// Converts this nondeterministic automaton into a language-equivalent DFA via the subset
    /// construction, returning the DFA together with the subset-to-name assignments.
    ///
    /// The initial state of the result is the epsilon closure of the original initial state.
    /// Subsets are processed in FIFO order and named `q'0`, `q'1`, ... in discovery order, so
    /// the naming is reproducible across runs and lives in a namespace of its own, disjoint
    /// from the original state names. The empty subset is materialized like any other and
    /// serves as the trap state, which keeps the result total: every state of the produced
    /// automaton has exactly one successor per alphabet symbol.
    ///
    /// Fails with [`AutomatonError::AlreadyDeterministic`] when `self` is already a DFA.
    pub fn determinize(&self) -> Result<(Automaton, ConversionReport), AutomatonError> {
        if self.is_deterministic() {
            return Err(AutomatonError::AlreadyDeterministic);
        }

        let mut assignments: OrderedMap<OrderedSet<StateId>, StateId> = OrderedMap::new();
        let mut queue: VecDeque<OrderedSet<StateId>> = VecDeque::new();
        let mut next_id = 0usize;
        let mut fresh_name = move || {
            let name = format!("q'{next_id}");
            next_id += 1;
            name
        };

        let initial_subset = self.epsilon_closure(self.initial());
        let initial_name = fresh_name();
        assignments.insert(initial_subset.clone(), initial_name.clone());
        queue.push_back(initial_subset);

        let mut transitions = TransitionMap::new();
        while let Some(subset) = queue.pop_front() {
            let name = assignments
                .get(&subset)
                .expect("every enqueued subset has been named")
                .clone();
            trace!("processing subset {{{}}} named {name}", subset.iter().join(", "));

            for symbol in self.alphabet() {
                let next = self.epsilon_closure_set(&self.symbol_move(&subset, symbol));
                let next_name = match assignments.get(&next) {
                    Some(existing) => existing.clone(),
                    None => {
                        let assigned = fresh_name();
                        trace!(
                            "discovered subset {{{}}}, naming it {assigned}",
                            next.iter().join(", ")
                        );
                        assignments.insert(next.clone(), assigned.clone());
                        queue.push_back(next);
                        assigned
                    }
                };
                transitions.insert(
                    (name.clone(), symbol.clone()),
                    OrderedSet::from([next_name]),
                );
            }
        }

        let states: OrderedSet<StateId> = assignments.values().cloned().collect();
        let finals: OrderedSet<StateId> = assignments
            .iter()
            .filter(|(subset, _)| subset.iter().any(|q| self.finals().contains(q)))
            .map(|(_, name)| name.clone())
            .collect();
        debug!(
            "subset construction produced {} states from {} original states",
            states.len(),
            self.size()
        );

        let dfa = Automaton::from_components(
            states,
            self.alphabet().clone(),
            initial_name,
            finals,
            transitions,
        )?;
        Ok((dfa, ConversionReport { assignments }))
    }
}
