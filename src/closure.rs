use crate::automaton::{Automaton, StateId, EPSILON};
use crate::math::OrderedSet;

/// The closure and move primitives underlying the subset construction. These are total
/// functions; epsilon cycles are handled by the visited-set guard in the traversal, so the
/// computation always reaches its fixed point.
impl Automaton {
    /// The set of states reachable from `state` using zero or more epsilon transitions,
    /// including `state` itself.
    pub fn epsilon_closure(&self, state: &str) -> OrderedSet<StateId> {
        let mut closure = OrderedSet::new();
        let mut stack = vec![state.to_owned()];
        while let Some(current) = stack.pop() {
            if !closure.insert(current.clone()) {
                continue;
            }
            if let Some(targets) = self.destinations(&current, EPSILON) {
                for target in targets {
                    if !closure.contains(target) {
                        stack.push(target.clone());
                    }
                }
            }
        }
        closure
    }

    /// The union of the epsilon closures of all given states.
    pub fn epsilon_closure_set<'a>(
        &self,
        states: impl IntoIterator<Item = &'a StateId>,
    ) -> OrderedSet<StateId> {
        states
            .into_iter()
            .flat_map(|state| self.epsilon_closure(state))
            .collect()
    }

    /// The union, over all given states, of the successors under `symbol`. The symbol must be a
    /// real alphabet symbol; epsilon successors are the business of [`Automaton::epsilon_closure`].
    pub fn symbol_move<'a>(
        &self,
        states: impl IntoIterator<Item = &'a StateId>,
        symbol: &str,
    ) -> OrderedSet<StateId> {
        states
            .into_iter()
            .filter_map(|state| self.destinations(state, symbol))
            .flatten()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures::fa;
    use crate::math::OrderedSet;

    fn set(elements: &str) -> OrderedSet<String> {
        elements.split_whitespace().map(str::to_owned).collect()
    }

    #[test_log::test]
    fn closure_contains_the_state_itself() {
        let nfa = fa("q0 q1", "a", "q0", "q1", &[("q0", "a", "q1")]);
        assert_eq!(nfa.epsilon_closure("q0"), set("q0"));
    }

    #[test_log::test]
    fn closure_follows_chained_epsilon_transitions() {
        let nfa = fa(
            "q0 q1 q2 q3",
            "a",
            "q0",
            "q3",
            &[("q0", "", "q1"), ("q1", "", "q2"), ("q2", "a", "q3")],
        );
        assert_eq!(nfa.epsilon_closure("q0"), set("q0 q1 q2"));
        assert_eq!(nfa.epsilon_closure("q2"), set("q2"));
    }

    #[test_log::test]
    fn closure_terminates_on_epsilon_cycles() {
        let nfa = fa(
            "q0 q1 q2",
            "a",
            "q0",
            "q2",
            &[("q0", "", "q1"), ("q1", "", "q0"), ("q1", "", "q2")],
        );
        assert_eq!(nfa.epsilon_closure("q0"), set("q0 q1 q2"));
    }

    #[test_log::test]
    fn closure_of_a_set_is_the_union_of_member_closures() {
        let nfa = fa(
            "q0 q1 q2",
            "a",
            "q0",
            "q2",
            &[("q0", "", "q1"), ("q2", "a", "q0")],
        );
        let states = set("q0 q2");
        assert_eq!(nfa.epsilon_closure_set(&states), set("q0 q1 q2"));
    }

    #[test_log::test]
    fn symbol_move_collects_successors_across_the_set() {
        let nfa = fa(
            "q0 q1 q2",
            "a",
            "q0",
            "q2",
            &[("q0", "a", "q1"), ("q1", "a", "q2"), ("q1", "", "q0")],
        );
        let states = set("q0 q1");
        assert_eq!(nfa.symbol_move(&states, "a"), set("q1 q2"));
        assert!(nfa.symbol_move(&states, "b").is_empty());
    }
}
