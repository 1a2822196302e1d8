use tracing::trace;

use crate::automaton::{Automaton, StateId, EPSILON};
use crate::math::Set;

/// The outcome of running an input word through an automaton. Borrows the tested automaton so
/// host layers can render the result next to its subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceResult<'a> {
    automaton: &'a Automaton,
    input: String,
    accepted: bool,
    terminal: Option<StateId>,
}

impl<'a> AcceptanceResult<'a> {
    /// The automaton the word was tested against.
    pub fn automaton(&self) -> &'a Automaton {
        self.automaton
    }

    /// The tested input word.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Whether some branch of the exploration reached a final state with the input exhausted.
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// The final state in which the accepting branch ended. `None` for rejected words, since
    /// rejection means every branch was exhausted and no single terminal state is meaningful.
    pub fn terminal(&self) -> Option<&StateId> {
        self.terminal.as_ref()
    }
}

impl Automaton {
    /// Tests whether the automaton accepts `input`, reading it one character at a time.
    ///
    /// The search explores every nondeterministic branch: at each position epsilon successors
    /// are tried before the symbol transition consuming the next character, and the first branch
    /// to reach a final state with no input left settles the outcome. The exploration is driven
    /// by an explicit stack over `(state, position)` pairs with a visited set over the same
    /// pairs, which caps the search at `|states| * (|input| + 1)` steps and in particular keeps
    /// epsilon cycles from looping.
    ///
    /// This function cannot fail; an empty input is accepted exactly when a final state lies in
    /// the epsilon closure of the initial state.
    pub fn check_string(&self, input: &str) -> AcceptanceResult<'_> {
        let word: Vec<String> = input.chars().map(String::from).collect();
        let mut visited: Set<(StateId, usize)> = Set::default();
        let mut stack: Vec<(StateId, usize)> = vec![(self.initial().clone(), 0)];

        while let Some((state, position)) = stack.pop() {
            if !visited.insert((state.clone(), position)) {
                continue;
            }
            trace!("exploring state {state} at input position {position}");

            if position == word.len() && self.finals().contains(&state) {
                return AcceptanceResult {
                    automaton: self,
                    input: input.to_owned(),
                    accepted: true,
                    terminal: Some(state),
                };
            }

            // pushed below the epsilon successors so that epsilon branches pop first
            if position < word.len() {
                if let Some(targets) = self.destinations(&state, &word[position]) {
                    for target in targets {
                        stack.push((target.clone(), position + 1));
                    }
                }
            }
            if let Some(targets) = self.destinations(&state, EPSILON) {
                for target in targets {
                    stack.push((target.clone(), position));
                }
            }
        }

        AcceptanceResult {
            automaton: self,
            input: input.to_owned(),
            accepted: false,
            terminal: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::automaton::Automaton;
    use crate::fixtures::fa;

    #[test_log::test]
    fn accepts_and_rejects_along_a_two_state_cycle() {
        let fa = fa(
            "q0 q1",
            "a b",
            "q0",
            "q1",
            &[("q0", "a", "q1"), ("q1", "b", "q0")],
        );

        let result = fa.check_string("a");
        assert!(result.is_accepted());
        assert_eq!(result.terminal().map(String::as_str), Some("q1"));

        assert!(!fa.check_string("ab").is_accepted());
        assert!(!fa.check_string("").is_accepted());
        assert!(fa.check_string("aba").is_accepted());
    }

    #[test_log::test]
    fn empty_input_is_accepted_iff_initial_is_final() {
        let accepting = fa("q0", "a", "q0", "q0", &[("q0", "a", "q0")]);
        assert!(accepting.check_string("").is_accepted());

        let rejecting = fa("q0", "a", "q0", "", &[("q0", "a", "q0")]);
        assert!(!rejecting.check_string("").is_accepted());
    }

    #[test_log::test]
    fn empty_alphabet_automata_are_valid_and_testable() {
        let no_inputs = |finals: &[&str]| {
            Automaton::new(
                ["q0"],
                Vec::<String>::new(),
                "q0",
                finals.iter().copied(),
                Vec::<(&str, &str, &str)>::new(),
            )
            .expect("an automaton without inputs is still valid")
        };

        let accepting = no_inputs(&["q0"]);
        // with no symbols to check, the automaton is vacuously deterministic
        assert!(accepting.is_deterministic());
        assert!(accepting.check_string("").is_accepted());

        let rejecting = no_inputs(&[]);
        assert!(!rejecting.check_string("").is_accepted());
    }

    #[test_log::test]
    fn epsilon_hop_before_consuming_a_symbol() {
        let fa = fa(
            "q0 q1 q2",
            "a",
            "q0",
            "q2",
            &[("q0", "", "q1"), ("q1", "a", "q2")],
        );
        assert!(fa.check_string("a").is_accepted());
        assert!(!fa.check_string("").is_accepted());
    }

    #[test_log::test]
    fn epsilon_reaches_a_final_state_after_the_last_symbol() {
        let fa = fa(
            "q0 q1 q2",
            "a",
            "q0",
            "q2",
            &[("q0", "a", "q1"), ("q1", "", "q2")],
        );
        let result = fa.check_string("a");
        assert!(result.is_accepted());
        assert_eq!(result.terminal().map(String::as_str), Some("q2"));
    }

    #[test_log::test]
    fn epsilon_cycles_do_not_hang_the_search() {
        let fa = fa(
            "q0 q1",
            "a",
            "q0",
            "q1",
            &[("q0", "", "q1"), ("q1", "", "q0"), ("q1", "a", "q1")],
        );
        assert!(fa.check_string("a").is_accepted());
        // the closure of q0 already contains the final state q1
        assert!(fa.check_string("").is_accepted());
        assert!(fa.check_string("aa").is_accepted());
    }

    #[test_log::test]
    fn branches_are_explored_exhaustively() {
        // only one of the two `a` successors can continue with `b`
        let fa = fa(
            "q0 q1 q2 q3",
            "a b",
            "q0",
            "q3",
            &[
                ("q0", "a", "q1"),
                ("q0", "a", "q2"),
                ("q2", "b", "q3"),
            ],
        );
        assert!(fa.check_string("ab").is_accepted());
        assert!(!fa.check_string("a").is_accepted());
    }
}
