use itertools::Itertools;
use tracing::trace;

use crate::automaton::{Automaton, EPSILON};

/// Escapes a state name or symbol for use inside a quoted DOT identifier.
fn quote_dot_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

impl Automaton {
    /// Computes the graphviz representation of the automaton; for more information on the DOT
    /// format, see the [graphviz documentation](https://graphviz.org/doc/info/lang.html).
    ///
    /// Final states are drawn as double circles, all others as plain circles, and a point-shaped
    /// phantom node marks the initial state with an unlabeled arrow. Epsilon transitions are
    /// labeled `ε`. Rendering the text to an image is left to the host layer.
    pub fn dot_representation(&self) -> String {
        let header = [
            "digraph fa {".to_string(),
            "  rankdir = LR".to_string(),
            "  __initial [shape = point, label = \"\"]".to_string(),
        ];

        let states = self.states().iter().map(|state| {
            let shape = if self.finals().contains(state) {
                "doublecircle"
            } else {
                "circle"
            };
            format!("  {} [shape = {shape}]", quote_dot_ident(state))
        });

        let initial_marker =
            std::iter::once(format!("  __initial -> {}", quote_dot_ident(self.initial())));

        let transitions = self
            .transitions()
            .iter()
            .flat_map(|((source, symbol), targets)| {
                let label = if symbol == EPSILON { "ε" } else { symbol };
                targets.iter().map(move |target| {
                    format!(
                        "  {} -> {} [label = {}]",
                        quote_dot_ident(source),
                        quote_dot_ident(target),
                        quote_dot_ident(label)
                    )
                })
            });

        let dot = header
            .into_iter()
            .chain(states)
            .chain(initial_marker)
            .chain(transitions)
            .chain(std::iter::once("}".to_string()))
            .join("\n");
        trace!("writing dot representation\n{}", dot);
        dot
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures::fa;

    #[test_log::test]
    fn dot_marks_finals_and_initial() {
        let nfa = fa(
            "q0 q1",
            "a",
            "q0",
            "q1",
            &[("q0", "a", "q1"), ("q0", "", "q1")],
        );
        let dot = nfa.dot_representation();
        assert!(dot.starts_with("digraph fa {"));
        assert!(dot.contains("\"q1\" [shape = doublecircle]"));
        assert!(dot.contains("\"q0\" [shape = circle]"));
        assert!(dot.contains("__initial -> \"q0\""));
        assert!(dot.contains("\"q0\" -> \"q1\" [label = \"a\"]"));
        assert!(dot.contains("[label = \"ε\"]"));
        assert!(dot.ends_with('}'));
    }
}
