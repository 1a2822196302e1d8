use thiserror::Error;

/// The recoverable error outcomes of constructing an automaton or converting one. These are
/// meant to be inspected by the caller, none of them indicates a bug in the library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutomatonError {
    /// Construction rejected the supplied components because an invariant was violated. No
    /// partially valid automaton is ever produced; the message names the first violation found.
    #[error("invalid automaton: {0}")]
    InvalidAutomaton(String),
    /// Determinization was requested for an automaton that is already deterministic.
    #[error("the automaton is already deterministic")]
    AlreadyDeterministic,
    /// A DFA-only operation (minimization) was requested for a nondeterministic automaton.
    #[error("the automaton is not deterministic")]
    NotADFA,
}
