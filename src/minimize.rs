use std::collections::VecDeque;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::automaton::{Automaton, StateId, TransitionMap};
use crate::error::AutomatonError;
use crate::math::{OrderedSet, Partition};

/// Describes what DFA minimization removed: the states that were unreachable from the initial
/// state (and therefore dropped before refinement) and all original state names that no longer
/// exist in the minimized result, the unreachable ones included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinimizationReport {
    unreachable: OrderedSet<StateId>,
    deleted: OrderedSet<StateId>,
}

impl MinimizationReport {
    /// States that could not be reached from the initial state.
    pub fn unreachable(&self) -> &OrderedSet<StateId> {
        &self.unreachable
    }

    /// Original state names absent from the minimized automaton, either because they were
    /// unreachable or because they were absorbed into a merged equivalence class.
    pub fn deleted(&self) -> &OrderedSet<StateId> {
        &self.deleted
    }
}

impl Automaton {
    /// The set of states reachable from the initial state by following alphabet symbols,
    /// computed with a simple worklist traversal.
    pub fn reachable_states(&self) -> OrderedSet<StateId> {
        let mut reachable = OrderedSet::new();
        let mut stack = vec![self.initial().clone()];
        while let Some(state) = stack.pop() {
            if !reachable.insert(state.clone()) {
                continue;
            }
            for symbol in self.alphabet() {
                if let Some(targets) = self.destinations(&state, symbol) {
                    for target in targets {
                        if !reachable.contains(target) {
                            stack.push(target.clone());
                        }
                    }
                }
            }
        }
        reachable
    }

    /// Reduces this DFA to its minimal language-equivalent form and reports which states were
    /// dropped along the way.
    ///
    /// Unreachable states are pruned first, then the remaining states are refined into
    /// Myhill-Nerode equivalence classes: starting from the final/non-final split, a worklist
    /// of candidate splitter blocks is drained, and for each splitter and symbol every block is
    /// divided into the states transitioning into the splitter and those that do not, until no
    /// block can be split any further. Each resulting class becomes one state of the minimal
    /// automaton, named after its least member so the block-to-name mapping stays bijective.
    ///
    /// Fails with [`AutomatonError::NotADFA`] when `self` is nondeterministic.
    pub fn minimize(&self) -> Result<(Automaton, MinimizationReport), AutomatonError> {
        if !self.is_deterministic() {
            return Err(AutomatonError::NotADFA);
        }

        let reachable = self.reachable_states();
        let unreachable: OrderedSet<StateId> =
            self.states().difference(&reachable).cloned().collect();
        if !unreachable.is_empty() {
            debug!("pruning unreachable states {{{}}}", unreachable.iter().join(", "));
        }

        let partition = self.refine(&reachable);
        debug!(
            "refinement stabilized with {} classes over {} reachable states",
            partition.size(),
            reachable.len()
        );

        // every reachable state lies in exactly one class, whose least member names it
        let class_name = |state: &StateId| -> StateId {
            partition
                .class_of(state)
                .and_then(|class| class.first())
                .expect("refinement covers every reachable state")
                .clone()
        };

        let mut transitions = TransitionMap::new();
        for class in &partition {
            let representative = class.first().expect("classes are non-empty");
            let source = class_name(representative);
            for symbol in self.alphabet() {
                if let Some(target) = self.successor(representative, symbol) {
                    transitions.insert(
                        (source.clone(), symbol.clone()),
                        OrderedSet::from([class_name(target)]),
                    );
                }
            }
        }

        let states: OrderedSet<StateId> = partition
            .iter()
            .filter_map(|class| class.first().cloned())
            .collect();
        let finals: OrderedSet<StateId> = partition
            .iter()
            .filter(|class| class.iter().any(|q| self.finals().contains(q)))
            .filter_map(|class| class.first().cloned())
            .collect();
        let initial = class_name(self.initial());

        let minimal = Automaton::from_components(
            states,
            self.alphabet().clone(),
            initial,
            finals,
            transitions,
        )?;
        let deleted: OrderedSet<StateId> = self
            .states()
            .difference(minimal.states())
            .cloned()
            .collect();
        Ok((minimal, MinimizationReport { unreachable, deleted }))
    }

    /// Whether running the full minimization pipeline on this DFA would shrink it. Determined
    /// by actually performing the computation, not by a cheaper pre-check.
    pub fn is_minimizable(&self) -> Result<bool, AutomatonError> {
        let (minimal, _) = self.minimize()?;
        Ok(minimal.size() < self.size())
    }

    /// Moore-style partition refinement over the reachable states, run to a global fixed point.
    fn refine(&self, reachable: &OrderedSet<StateId>) -> Partition<StateId> {
        let finals: OrderedSet<StateId> = reachable
            .iter()
            .filter(|q| self.finals().contains(*q))
            .cloned()
            .collect();
        let non_finals: OrderedSet<StateId> =
            reachable.difference(&finals).cloned().collect();

        let mut blocks: Vec<OrderedSet<StateId>> = [finals, non_finals]
            .into_iter()
            .filter(|block| !block.is_empty())
            .collect();
        let mut pending: VecDeque<OrderedSet<StateId>> = blocks.iter().cloned().collect();

        while let Some(splitter) = pending.pop_front() {
            for symbol in self.alphabet() {
                // states whose successor under `symbol` lands in the splitter
                let preimage: OrderedSet<StateId> = reachable
                    .iter()
                    .filter(|q| {
                        self.successor(q, symbol)
                            .is_some_and(|target| splitter.contains(target))
                    })
                    .cloned()
                    .collect();

                let mut refined = Vec::with_capacity(blocks.len());
                for block in blocks.drain(..) {
                    let (inside, outside): (OrderedSet<StateId>, OrderedSet<StateId>) =
                        block.iter().cloned().partition(|q| preimage.contains(q));
                    if inside.is_empty() || outside.is_empty() {
                        refined.push(block);
                        continue;
                    }
                    trace!(
                        "splitting {{{}}} on symbol {symbol} into {{{}}} / {{{}}}",
                        block.iter().join(", "),
                        inside.iter().join(", "),
                        outside.iter().join(", ")
                    );
                    pending.push_back(inside.clone());
                    pending.push_back(outside.clone());
                    refined.push(inside);
                    refined.push(outside);
                }
                blocks = refined;
            }
        }
        Partition::new(blocks)
    }
}
